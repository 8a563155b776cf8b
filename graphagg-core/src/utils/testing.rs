use crate::tensor::Tensor;

/// Checks if two tensors are approximately equal (shape and data within tolerance).
/// Panics if shapes differ or data differs significantly.
pub fn check_tensor_near(
    actual: &Tensor,
    expected_shape: &[usize],
    expected_data: &[f32],
    tolerance: f32,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");

    let actual_data_vec = actual.get_f32_data();
    assert_eq!(
        actual_data_vec.len(),
        expected_data.len(),
        "Data length mismatch"
    );

    for (i, (a, e)) in actual_data_vec.iter().zip(expected_data.iter()).enumerate() {
        let diff = (*a - *e).abs();
        if diff > tolerance || diff.is_nan() {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}

/// Routes `log` output of the code under test through the test harness.
/// Safe to call from every test.
#[cfg(test)]
pub(crate) fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
