//! Assertion utilities for testing.
//!
//! Floating-point and masked-field comparisons used across the
//! integration tests.

use wrfinterp::MaskedField;

/// Default epsilon for floating-point comparisons
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Assert that two floating-point values are approximately equal.
///
/// # Panics
///
/// Panics if the absolute difference between `actual` and `expected` is greater than `epsilon`.
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    let diff = (actual - expected).abs();

    assert!(
        diff <= epsilon,
        "Values not approximately equal: actual = {}, expected = {}, diff = {}, epsilon = {}",
        actual,
        expected,
        diff,
        epsilon
    );
}

/// Assert that every present cell of a field is approximately `expected`
/// and that at least `min_present` cells are present.
pub fn assert_present_cells_eq(field: &MaskedField, expected: f64, min_present: usize) {
    let present: Vec<f64> = field.values().iter().flatten().copied().collect();
    assert!(
        present.len() >= min_present,
        "Only {} cells present, expected at least {}",
        present.len(),
        min_present
    );
    for value in present {
        assert_approx_eq(value, expected, None);
    }
}

/// Assert that a value lies within bounds (inclusive).
pub fn assert_in_range(actual: f64, min: f64, max: f64) {
    assert!(
        actual >= min && actual <= max,
        "Value not in range: actual = {}, min = {}, max = {}",
        actual,
        min,
        max
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0, None);
        assert_approx_eq(1.0, 1.0000001, None);
        assert_approx_eq(1.0, 1.001, Some(0.01));
    }

    #[test]
    fn test_assert_present_cells_eq() {
        let field = MaskedField::new(array![[Some(2.0), None], [Some(2.0000001), None]]);
        assert_present_cells_eq(&field, 2.0, 2);
    }

    #[test]
    fn test_assert_in_range() {
        assert_in_range(5.0, 0.0, 10.0);
        assert_in_range(10.0, 0.0, 10.0);
    }
}
