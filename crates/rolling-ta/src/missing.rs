//! Missing-value policy shared by every primitive.
//!
//! The missing marker is NaN. A missing value never raises: it propagates
//! through any further elementwise or windowed computation. Undefined
//! arithmetic (division by zero, `0/0`, log or square root of a value outside
//! the domain) resolves to the missing marker rather than to a signed
//! infinity, so downstream comparisons cannot mistake it for "greater than
//! everything".
//!
//! # Example
//!
//! ```
//! use rolling_ta::missing::{safe_div, is_missing};
//!
//! assert_eq!(safe_div(6.0_f64, 3.0), 2.0);
//! assert!(is_missing(safe_div(1.0_f64, 0.0)));
//! assert!(is_missing(safe_div(0.0_f64, 0.0)));
//! ```

use crate::traits::SeriesElement;

/// Returns the missing marker.
#[inline]
#[must_use]
pub fn missing<T: SeriesElement>() -> T {
    T::nan()
}

/// Returns `true` if `value` is the missing marker.
#[inline]
#[must_use]
pub fn is_missing<T: SeriesElement>(value: T) -> bool {
    value.is_nan()
}

/// Maps any non-finite value (NaN, +inf, -inf) to the missing marker.
#[inline]
#[must_use]
pub fn finite_or_missing<T: SeriesElement>(value: T) -> T {
    if value.is_finite() {
        value
    } else {
        T::nan()
    }
}

/// Division where a zero denominator or a non-finite quotient is missing.
#[inline]
#[must_use]
pub fn safe_div<T: SeriesElement>(numerator: T, denominator: T) -> T {
    if denominator == T::zero() {
        return T::nan();
    }
    finite_or_missing(numerator / denominator)
}

/// Natural logarithm, missing for non-positive input.
#[inline]
#[must_use]
pub fn safe_ln<T: SeriesElement>(value: T) -> T {
    if value > T::zero() {
        finite_or_missing(value.ln())
    } else {
        T::nan()
    }
}

/// Square root, missing for negative input.
#[inline]
#[must_use]
pub fn safe_sqrt<T: SeriesElement>(value: T) -> T {
    if value >= T::zero() {
        value.sqrt()
    } else {
        T::nan()
    }
}

/// Returns `true` if any value in the slice is missing.
#[inline]
#[must_use]
pub fn any_missing<T: SeriesElement>(values: &[T]) -> bool {
    values.iter().any(|v| v.is_nan())
}
