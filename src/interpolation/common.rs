//! Common utilities for interpolation.
//!
//! Shape checks and index helpers shared by the interpolator and its callers.

use crate::error::{Result, WrfInterpError};

/// Row-major flat index of `(row, col)` in a grid with `ncols` columns
pub fn flat_index(row: usize, col: usize, ncols: usize) -> usize {
    row * ncols + col
}

/// Fail with a shape mismatch unless two grid shapes agree
pub fn ensure_same_shape(
    left_name: &str,
    left: (usize, usize),
    right_name: &str,
    right: (usize, usize),
) -> Result<()> {
    if left != right {
        return Err(WrfInterpError::ShapeMismatch {
            message: format!(
                "{} has shape {:?} but {} has shape {:?}",
                left_name, left, right_name, right
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_index() {
        assert_eq!(flat_index(0, 0, 4), 0);
        assert_eq!(flat_index(1, 0, 4), 4);
        assert_eq!(flat_index(2, 3, 4), 11);
    }

    #[test]
    fn test_ensure_same_shape() {
        assert!(ensure_same_shape("a", (2, 3), "b", (2, 3)).is_ok());
        let err = ensure_same_shape("a", (2, 3), "b", (3, 2)).unwrap_err();
        assert!(err.to_string().contains("a has shape (2, 3)"));
    }
}
