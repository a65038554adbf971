//! Comparison and inspection helpers.
//!
//! Floating-point results are compared with a tolerance rather than exactly;
//! these helpers treat two missing values as equal, which is what every
//! alignment check wants.
//!
//! # Example
//!
//! ```
//! use rolling_ta::utils::{approx_eq, series_approx_eq, EPSILON};
//! use rolling_ta::Series;
//!
//! assert!(approx_eq(1.0 / 3.0, 0.333_333_333_333_333, EPSILON));
//!
//! let a = Series::new(vec![f64::NAN, 1.0]);
//! let b = Series::new(vec![f64::NAN, 1.0 + 1e-12]);
//! assert!(series_approx_eq(&a, &b, EPSILON));
//! ```

use crate::series::Series;
use crate::traits::SeriesElement;

/// Tolerance for results of a handful of operations.
pub const EPSILON: f64 = 1e-10;

/// Tolerance for results of long recurrences or accumulated sums.
pub const LOOSE_EPSILON: f64 = 1e-6;

/// Absolute comparison; two missing values compare equal.
#[inline]
#[must_use]
pub fn approx_eq<T: SeriesElement>(a: T, b: T, tolerance: T) -> bool {
    if a.is_nan() && b.is_nan() {
        return true;
    }
    if a.is_nan() || b.is_nan() {
        return false;
    }
    (a - b).abs() < tolerance
}

/// Relative comparison; two missing values compare equal.
#[inline]
#[must_use]
pub fn approx_eq_relative<T: SeriesElement>(a: T, b: T, rel_tolerance: T) -> bool {
    if a.is_nan() && b.is_nan() {
        return true;
    }
    if a.is_nan() || b.is_nan() {
        return false;
    }
    let diff = (a - b).abs();
    let scale = a.abs().max(b.abs());
    if scale == T::zero() {
        return diff == T::zero();
    }
    diff / scale < rel_tolerance
}

/// Elementwise [`approx_eq`] over two series of the same length.
#[must_use]
pub fn series_approx_eq<T: SeriesElement>(a: &Series<T>, b: &Series<T>, tolerance: f64) -> bool {
    let tol = T::from_f64(tolerance).unwrap_or_else(|_| T::epsilon());
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(&x, &y)| approx_eq(x, y, tol))
}

/// Number of missing values.
#[must_use]
pub fn count_nans<T: SeriesElement>(data: &[T]) -> usize {
    data.iter().filter(|v| v.is_nan()).count()
}

/// Length of the leading run of missing values (the warm-up).
#[must_use]
pub fn count_nan_prefix<T: SeriesElement>(data: &[T]) -> usize {
    data.iter().take_while(|v| v.is_nan()).count()
}
