//! Interpolated fields with explicit missing cells.
//!
//! In memory a cell outside the source hull is `None`. The numeric sentinel
//! only appears when a field crosses the file boundary.

use ndarray::{Array2, ArrayView2};

use super::FILL_VALUE;

/// A 2-D field whose cells may be missing
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedField {
    values: Array2<Option<f64>>,
}

impl MaskedField {
    /// Wrap an array of optional values
    pub fn new(values: Array2<Option<f64>>) -> Self {
        Self { values }
    }

    /// Build a field from a sentinel-filled array.
    ///
    /// Only cells exactly equal to `fill` become missing; values that merely
    /// come close stay present.
    pub fn from_filled(filled: ArrayView2<f64>, fill: f64) -> Self {
        Self {
            values: filled.mapv(|v| if v == fill { None } else { Some(v) }),
        }
    }

    /// Shape as (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Borrow the underlying optional values
    pub fn values(&self) -> ArrayView2<'_, Option<f64>> {
        self.values.view()
    }

    /// Value at (row, column), `None` when missing or out of range
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get((row, col)).copied().flatten()
    }

    /// Replace missing cells with `fill`
    pub fn to_filled(&self, fill: f64) -> Array2<f64> {
        self.values.mapv(|v| v.unwrap_or(fill))
    }

    /// Replace missing cells with the standard 9e9 sentinel
    pub fn to_sentinel_filled(&self) -> Array2<f64> {
        self.to_filled(FILL_VALUE)
    }

    /// Replace missing cells with NaN, the form used for rendering
    pub fn to_nan_filled(&self) -> Array2<f64> {
        self.to_filled(f64::NAN)
    }

    /// Number of cells that are present
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Minimum and maximum over present, finite cells
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .flatten()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Largest present, finite value (NaN-ignoring maximum)
    pub fn max(&self) -> Option<f64> {
        self.finite_range().map(|(_, hi)| hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sentinel_round_trip_is_exact() {
        let filled = array![[1.0, FILL_VALUE], [FILL_VALUE - 1.0, 4.0]];
        let field = MaskedField::from_filled(filled.view(), FILL_VALUE);

        assert_eq!(field.get(0, 0), Some(1.0));
        assert_eq!(field.get(0, 1), None);
        // Close to, but not equal to, the sentinel is a real value
        assert_eq!(field.get(1, 0), Some(FILL_VALUE - 1.0));
        assert_eq!(field.to_sentinel_filled(), filled);
    }

    #[test]
    fn test_finite_range_ignores_missing_and_nan() {
        let field = MaskedField::new(array![[Some(3.0), None], [Some(f64::NAN), Some(-2.0)]]);

        assert_eq!(field.finite_range(), Some((-2.0, 3.0)));
        assert_eq!(field.max(), Some(3.0));
        assert_eq!(field.valid_count(), 3);
    }

    #[test]
    fn test_all_missing_has_no_range() {
        let field = MaskedField::new(Array2::from_elem((2, 3), None));
        assert_eq!(field.finite_range(), None);
        assert_eq!(field.shape(), (2, 3));
        assert!(field.to_nan_filled().iter().all(|v| v.is_nan()));
    }
}
