use super::*;
use crate::autograd::grad_check::check_grad;
use crate::utils::testing::check_tensor_near;

#[test]
fn test_mul_broadcast_weight_column() -> Result<(), GraphAggError> {
    // Per-row weights broadcast over features.
    let x = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![3, 2])?;
    let w = Tensor::new(vec![0.5, 2.0, 0.0], vec![3, 1])?;
    let out = mul_op(&x, &w)?;
    check_tensor_near(&out, &[3, 2], &[0.5, 1.0, 6.0, 8.0, 0.0, 0.0], 1e-6);
    Ok(())
}

#[test]
fn test_mul_backward() -> Result<(), GraphAggError> {
    let a = Tensor::new(vec![1.0, 2.0, 3.0], vec![3])?;
    a.set_requires_grad(true)?;
    let b = Tensor::new(vec![4.0, 5.0, 6.0], vec![3])?;
    b.set_requires_grad(true)?;
    let out = mul_op(&a, &b)?;
    out.backward(Some(crate::tensor::ones(&[3])?))?;
    check_tensor_near(&a.grad().unwrap(), &[3], &[4.0, 5.0, 6.0], 1e-6);
    check_tensor_near(&b.grad().unwrap(), &[3], &[1.0, 2.0, 3.0], 1e-6);
    Ok(())
}

#[test]
fn test_mul_scalar() -> Result<(), GraphAggError> {
    let a = Tensor::new(vec![1.0, -2.0], vec![2])?;
    a.set_requires_grad(true)?;
    let out = mul_scalar_op(&a, 3.0)?;
    check_tensor_near(&out, &[2], &[3.0, -6.0], 1e-6);
    out.backward(Some(crate::tensor::ones(&[2])?))?;
    check_tensor_near(&a.grad().unwrap(), &[2], &[3.0, 3.0], 1e-6);
    Ok(())
}

#[test]
fn test_mul_grad_check_broadcast() {
    let a = Tensor::new(vec![0.5, -1.0, 2.0, 1.5, 0.2, -0.7], vec![3, 2]).unwrap();
    a.set_requires_grad(true).unwrap();
    let b = Tensor::new(vec![1.1, -0.3], vec![2]).unwrap();
    b.set_requires_grad(true).unwrap();
    let output_grad = crate::tensor::ones(&[3, 2]).unwrap();
    let result = check_grad(
        |inputs| mul_op(&inputs[0], &inputs[1]),
        &[a, b],
        &output_grad,
        1e-3,
        1e-2,
    );
    assert!(result.is_ok(), "mul grad check failed: {:?}", result.err());
}
