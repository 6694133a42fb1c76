#![allow(dead_code)]

/// Asserts two matrices are approximately equal using **assert_approx_equal_distance**
/// on every row of both matrices.
///
/// # Panics
///
/// Panics if the amount of rows differ, or if any pair of rows is not close enough.
pub(crate) fn assert_approx_equal_matrix(a: &[Vec<f32>], b: &[Vec<f32>], max_dist: f32) {
    assert_eq!(a.len(), b.len());
    for (row_a, row_b) in a.iter().zip(b) {
        assert_approx_equal_distance(row_a, row_b, max_dist);
    }
}

/// Asserts if the vectors **a** and **b** are approximately equal
/// being at most **max_dist** of a difference.
///
/// # Panics
///
/// Panics if the length of both vectors are not equal.
pub(crate) fn assert_approx_equal_distance(a: &[f32], b: &[f32], max_dist: f32) {
    assert_eq!(a.len(), b.len());

    a.iter().zip(b).for_each(|(x, y)| {
        assert!(
            (x - y).abs() <= max_dist,
            "{} and {} are further apart than {}",
            x,
            y,
            max_dist
        );
    });
}
