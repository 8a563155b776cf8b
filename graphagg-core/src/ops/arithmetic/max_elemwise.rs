use crate::error::GraphAggError;
use crate::ops::arithmetic::{apply_binary_op, BinaryKind};
use crate::tensor::Tensor;

/// Element-wise maximum with broadcasting. On ties the gradient goes to `a`.
pub fn maximum_op(a: &Tensor, b: &Tensor) -> Result<Tensor, GraphAggError> {
    apply_binary_op(a, b, BinaryKind::Maximum)
}

/// Element-wise minimum with broadcasting. On ties the gradient goes to `a`.
pub fn minimum_op(a: &Tensor, b: &Tensor) -> Result<Tensor, GraphAggError> {
    apply_binary_op(a, b, BinaryKind::Minimum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::check_tensor_near;

    #[test]
    fn test_maximum_minimum_forward() -> Result<(), GraphAggError> {
        let a = Tensor::new(vec![1.0, 5.0, 3.0], vec![3])?;
        let b = Tensor::new(vec![2.0, 4.0, 3.0], vec![3])?;
        check_tensor_near(&maximum_op(&a, &b)?, &[3], &[2.0, 5.0, 3.0], 1e-6);
        check_tensor_near(&minimum_op(&a, &b)?, &[3], &[1.0, 4.0, 3.0], 1e-6);
        Ok(())
    }

    #[test]
    fn test_maximum_backward_routes_to_winner() -> Result<(), GraphAggError> {
        let a = Tensor::new(vec![1.0, 5.0, 3.0], vec![3])?;
        a.set_requires_grad(true)?;
        let b = Tensor::new(vec![2.0, 4.0, 3.0], vec![3])?;
        b.set_requires_grad(true)?;
        let out = maximum_op(&a, &b)?;
        out.backward(Some(crate::tensor::ones(&[3])?))?;
        check_tensor_near(&a.grad().unwrap(), &[3], &[0.0, 1.0, 1.0], 1e-6);
        check_tensor_near(&b.grad().unwrap(), &[3], &[1.0, 0.0, 0.0], 1e-6);
        Ok(())
    }
}
