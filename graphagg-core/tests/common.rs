use graphagg_core::tensor::{randn, Tensor};

/// Features of shape `[6, 16]` drawn from a standard normal distribution.
#[allow(dead_code)]
pub(crate) fn random_features() -> Tensor {
    randn(&[6, 16]).expect("Test tensor creation failed")
}

/// Sorted group assignment of six elements into three groups, as an index and
/// as the equivalent offset vector.
#[allow(dead_code)]
pub(crate) const INDEX: [usize; 6] = [0, 0, 1, 1, 1, 2];
#[allow(dead_code)]
pub(crate) const PTR: [usize; 4] = [0, 2, 5, 6];

#[allow(dead_code)]
pub(crate) fn assert_all_close(a: &Tensor, b: &Tensor, tolerance: f32) {
    assert_eq!(a.shape(), b.shape(), "Shape mismatch");
    for (i, (x, y)) in a
        .get_f32_data()
        .iter()
        .zip(b.get_f32_data().iter())
        .enumerate()
    {
        assert!(
            (x - y).abs() <= tolerance,
            "Data mismatch at index {}: {} vs {}",
            i,
            x,
            y
        );
    }
}
