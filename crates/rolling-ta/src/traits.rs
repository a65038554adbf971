//! Numeric element trait and parameter validation.
//!
//! [`SeriesElement`] abstracts over `f32` and `f64` so every primitive is
//! generic over the float width. The validation helpers here are the single
//! place where configuration errors are raised; they run before any
//! computation starts.
//!
//! # Example
//!
//! ```
//! use rolling_ta::traits::{validate_period, SeriesElement};
//!
//! fn mean_of_first<T: SeriesElement>(data: &[T], period: usize) -> rolling_ta::Result<T> {
//!     validate_period(period)?;
//!     let n = T::from_usize(period)?;
//!     Ok(data.iter().take(period).fold(T::zero(), |acc, &x| acc + x) / n)
//! }
//!
//! let m = mean_of_first(&[1.0_f64, 2.0, 3.0, 4.0], 3).unwrap();
//! assert!((m - 2.0).abs() < 1e-12);
//! ```

use num_traits::{Float, NumCast};

use crate::error::{Error, Result};

/// One input to a recurrence step.
///
/// Scalars are missing when NaN; compound inputs are missing when any part
/// is.
pub trait Observation: Copy {
    /// Returns `true` if this input cannot be folded into a state.
    fn is_missing(&self) -> bool;
}

impl Observation for f32 {
    fn is_missing(&self) -> bool {
        self.is_nan()
    }
}

impl Observation for f64 {
    fn is_missing(&self) -> bool {
        self.is_nan()
    }
}

impl<T: SeriesElement> Observation for (T, T) {
    fn is_missing(&self) -> bool {
        self.0.is_nan() || self.1.is_nan()
    }
}

/// A floating-point type usable as a series value.
///
/// NaN is the missing marker, so only IEEE float types qualify. The trait is
/// blanket-implemented for every type meeting the bounds.
pub trait SeriesElement:
    Float + NumCast + Observation + Copy + Default + Send + Sync + std::fmt::Debug + 'static
{
    /// Creates a series element from a `usize` value.
    ///
    /// # Errors
    ///
    /// Returns `Error::NumericConversion` if the value cannot be represented in this type.
    #[inline]
    fn from_usize(value: usize) -> Result<Self> {
        <Self as NumCast>::from(value).ok_or(Error::NumericConversion {
            context: "usize to series element",
        })
    }

    /// Creates a series element from an `f64` value.
    ///
    /// # Errors
    ///
    /// Returns `Error::NumericConversion` if the value cannot be represented in this type.
    #[inline]
    fn from_f64(value: f64) -> Result<Self> {
        <Self as NumCast>::from(value).ok_or(Error::NumericConversion {
            context: "f64 to series element",
        })
    }

    /// Lossy conversion to `f64`, used for error messages.
    #[inline]
    #[must_use]
    fn as_f64(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }

    /// Returns the constant 2 as this type.
    #[inline]
    #[must_use]
    fn two() -> Self {
        Self::one() + Self::one()
    }
}

impl<T> SeriesElement for T where
    T: Float + NumCast + Observation + Copy + Default + Send + Sync + std::fmt::Debug + 'static
{
}

/// Validates a window size, span or period.
///
/// # Errors
///
/// Returns `Error::InvalidPeriod` if the period is zero.
#[inline]
pub const fn validate_period(period: usize) -> Result<()> {
    if period == 0 {
        Err(Error::InvalidPeriod {
            period,
            reason: "period must be at least 1",
        })
    } else {
        Ok(())
    }
}

/// Adds `offset` to a period, rejecting configurations that overflow.
///
/// # Errors
///
/// Returns `Error::InvalidPeriod` if the sum does not fit in `usize`.
#[inline]
pub const fn checked_period(period: usize, offset: usize) -> Result<usize> {
    match period.checked_add(offset) {
        Some(total) => Ok(total),
        None => Err(Error::InvalidPeriod {
            period,
            reason: "period is too large",
        }),
    }
}

/// Validates that `min_periods` lies in `[1, size]`.
///
/// # Errors
///
/// Returns `Error::InvalidPeriod` for a zero size and
/// `Error::InvalidMinPeriods` for an out-of-range minimum.
#[inline]
pub fn validate_min_periods(size: usize, min_periods: usize) -> Result<()> {
    validate_period(size)?;
    if min_periods == 0 || min_periods > size {
        Err(Error::InvalidMinPeriods { min_periods, size })
    } else {
        Ok(())
    }
}

/// Validates a smoothing factor: finite and in `(0, 1]`.
///
/// # Errors
///
/// Returns `Error::InvalidParameter` otherwise.
pub fn validate_alpha<T: SeriesElement>(alpha: T) -> Result<()> {
    if alpha.is_finite() && alpha > T::zero() && alpha <= T::one() {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name: "alpha",
            value: format!("{}", alpha.as_f64()),
            reason: "must be finite and in (0, 1]",
        })
    }
}

/// Validates that two aligned inputs have the same length.
///
/// # Errors
///
/// Returns `Error::LengthMismatch` if they differ.
#[inline]
pub const fn validate_same_length(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::LengthMismatch { expected, actual })
    }
}
