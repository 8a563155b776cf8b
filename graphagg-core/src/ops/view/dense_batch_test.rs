use super::*;
use crate::utils::testing::check_tensor_near;

fn rows(n: usize) -> Tensor {
    let data: Vec<f32> = (0..n * 2).map(|v| v as f32 + 1.0).collect();
    Tensor::new(data, vec![n, 2]).unwrap()
}

#[test]
fn test_dense_batch_layout_and_mask() -> Result<(), GraphAggError> {
    // Groups of sizes 2, 0, 1.
    let x = rows(3);
    let (dense, mask) = to_dense_batch_op(&x, &[0, 0, 2], Some(3), 0.0, None)?;
    check_tensor_near(
        &dense,
        &[3, 2, 2],
        &[
            1.0, 2.0, 3.0, 4.0, //
            0.0, 0.0, 0.0, 0.0, //
            5.0, 6.0, 0.0, 0.0,
        ],
        1e-6,
    );
    assert_eq!(mask, vec![true, true, false, false, true, false]);
    Ok(())
}

#[test]
fn test_dense_batch_fill_value_and_inferred_batch_size() -> Result<(), GraphAggError> {
    let x = rows(2);
    let (dense, mask) = to_dense_batch_op(&x, &[0, 1], None, -1.0, Some(2))?;
    check_tensor_near(
        &dense,
        &[2, 2, 2],
        &[1.0, 2.0, -1.0, -1.0, 3.0, 4.0, -1.0, -1.0],
        1e-6,
    );
    assert_eq!(mask, vec![true, false, true, false]);
    Ok(())
}

#[test]
fn test_dense_batch_drops_overflow() -> Result<(), GraphAggError> {
    let x = rows(3);
    x.set_requires_grad(true)?;
    let (dense, mask) = to_dense_batch_op(&x, &[0, 0, 0], Some(1), 0.0, Some(2))?;
    check_tensor_near(&dense, &[1, 2, 2], &[1.0, 2.0, 3.0, 4.0], 1e-6);
    assert_eq!(mask, vec![true, true]);

    dense.backward(Some(crate::tensor::ones(&[1, 2, 2])?))?;
    check_tensor_near(
        &x.grad().unwrap(),
        &[3, 2],
        &[1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
        1e-6,
    );
    Ok(())
}

#[test]
fn test_dense_batch_empty_input() -> Result<(), GraphAggError> {
    let x = Tensor::new(vec![], vec![0, 4])?;
    let (dense, mask) = to_dense_batch_op(&x, &[], Some(3), 0.0, None)?;
    assert_eq!(dense.shape(), vec![3, 0, 4]);
    assert!(mask.is_empty());
    Ok(())
}

#[test]
fn test_dense_batch_index_out_of_range() {
    let x = rows(2);
    assert_eq!(
        to_dense_batch_op(&x, &[0, 3], Some(2), 0.0, None).unwrap_err(),
        GraphAggError::IndexOutOfBounds {
            index: vec![3],
            shape: vec![2]
        }
    );
}
