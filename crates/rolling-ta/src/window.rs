//! Sliding-window configuration.

use crate::error::Result;
use crate::traits::{validate_min_periods, validate_period};

/// Size and warm-up rule of a trailing window.
///
/// The window ending at position `t` covers `[t - size + 1, t]`, clipped at
/// the start of the series. A clipped window with fewer than `min_periods`
/// observations produces a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    size: usize,
    min_periods: usize,
}

impl Window {
    /// A full window: `min_periods == size`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPeriod` if `size` is zero.
    pub fn new(size: usize) -> Result<Self> {
        validate_period(size)?;
        Ok(Self {
            size,
            min_periods: size,
        })
    }

    /// A window that starts emitting once `min_periods` observations exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPeriod` if `size` is zero and
    /// `Error::InvalidMinPeriods` unless `1 <= min_periods <= size`.
    pub fn with_min_periods(size: usize, min_periods: usize) -> Result<Self> {
        validate_min_periods(size, min_periods)?;
        Ok(Self { size, min_periods })
    }

    /// Maximum number of observations in the window.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Minimum number of observations required to emit a value.
    #[inline]
    #[must_use]
    pub const fn min_periods(&self) -> usize {
        self.min_periods
    }

    /// First position of the window ending at `t`.
    #[inline]
    #[must_use]
    pub const fn start(&self, t: usize) -> usize {
        (t + 1).saturating_sub(self.size)
    }

    /// Number of observations in the clipped window ending at `t`.
    #[inline]
    #[must_use]
    pub const fn len_at(&self, t: usize) -> usize {
        t + 1 - self.start(t)
    }

    /// Returns `true` if the window ending at `t` has enough observations.
    #[inline]
    #[must_use]
    pub const fn is_ready(&self, t: usize) -> bool {
        self.len_at(t) >= self.min_periods
    }
}
