//! The ordered, index-aligned numeric series every primitive consumes.
//!
//! A [`Series`] is an immutable value: operations borrow it and return a new
//! series of the same length carrying the same index. Positions without a
//! defined value hold the missing marker (NaN). Non-finite inputs are
//! normalised to missing on construction.
//!
//! # Example
//!
//! ```
//! use rolling_ta::Series;
//!
//! let close = Series::new(vec![10.0_f64, 11.0, 12.0, 11.0]);
//!
//! let lagged = close.shift(1);
//! assert!(lagged[0].is_nan());
//! assert_eq!(lagged[1], 10.0);
//!
//! let returns = close.pct_change(1);
//! assert!((returns[1] - 0.1).abs() < 1e-12);
//!
//! let doubled = &close * 2.0;
//! assert_eq!(doubled[3], 22.0);
//! ```

use std::ops::{Add, Div, Index, Mul, Neg, Sub};

use crate::error::{Error, Result};
use crate::missing::{finite_or_missing, safe_div, safe_ln, safe_sqrt};
use crate::traits::{validate_same_length, SeriesElement};

/// An ordered list of `(index, value)` pairs.
///
/// The index is optional; without one, positions `0..len` act as labels.
#[derive(Debug, Clone, Default)]
pub struct Series<T> {
    index: Option<Vec<i64>>,
    values: Vec<T>,
}

impl<T: SeriesElement> Series<T> {
    /// Creates a series from values, using positions as the index.
    ///
    /// Infinite values are stored as missing.
    #[must_use]
    pub fn new(values: Vec<T>) -> Self {
        Self {
            index: None,
            values: normalize(values),
        }
    }

    /// Creates a series with an explicit index (timestamps or positions).
    ///
    /// # Errors
    ///
    /// Returns `Error::LengthMismatch` if the index and values differ in
    /// length, and `Error::InvalidIndex` if the index decreases anywhere.
    pub fn with_index(index: Vec<i64>, values: Vec<T>) -> Result<Self> {
        validate_same_length(values.len(), index.len())?;
        if let Some(position) = index.windows(2).position(|w| w[1] < w[0]) {
            return Err(Error::InvalidIndex {
                position: position + 1,
            });
        }
        Ok(Self {
            index: Some(index),
            values: normalize(values),
        })
    }

    /// Builds a series aligned with `self` from freshly computed values.
    pub(crate) fn derive(&self, values: Vec<T>) -> Self {
        debug_assert_eq!(values.len(), self.values.len());
        Self {
            index: self.index.clone(),
            values: normalize(values),
        }
    }

    /// Number of positions, missing ones included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the series has no positions.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values, missing positions as NaN.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// The explicit index, if one was supplied.
    #[inline]
    #[must_use]
    pub fn index(&self) -> Option<&[i64]> {
        self.index.as_deref()
    }

    /// The value at position `i`, or `None` past the end.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize) -> Option<T> {
        self.values.get(i).copied()
    }

    /// Iterates over the values.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Consumes the series and returns its values.
    #[must_use]
    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    /// Number of missing positions.
    #[must_use]
    pub fn count_missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Position of the first non-missing value.
    #[must_use]
    pub fn first_valid(&self) -> Option<usize> {
        self.values.iter().position(|v| !v.is_nan())
    }

    /// Applies `f` to every value. Non-finite results become missing.
    #[must_use]
    pub fn map<F: Fn(T) -> T>(&self, f: F) -> Self {
        self.derive(self.values.iter().map(|&v| f(v)).collect())
    }

    /// Combines two aligned series elementwise.
    ///
    /// # Errors
    ///
    /// Returns `Error::LengthMismatch` if the lengths differ and
    /// `Error::IndexMismatch` if both carry an index and the labels differ.
    pub fn zip_with<F: Fn(T, T) -> T>(&self, other: &Self, f: F) -> Result<Self> {
        self.check_aligned(other)?;
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(&a, &b)| f(a, b))
            .collect();
        let index = self.index.clone().or_else(|| other.index.clone());
        Ok(Self {
            index,
            values: normalize(values),
        })
    }

    pub(crate) fn check_aligned(&self, other: &Self) -> Result<()> {
        validate_same_length(self.len(), other.len())?;
        if let (Some(a), Some(b)) = (&self.index, &other.index) {
            if let Some(position) = a.iter().zip(b).position(|(x, y)| x != y) {
                return Err(Error::IndexMismatch { position });
            }
        }
        Ok(())
    }

    /// Elementwise sum of two aligned series.
    ///
    /// # Errors
    ///
    /// See [`zip_with`](Self::zip_with).
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Elementwise difference of two aligned series.
    ///
    /// # Errors
    ///
    /// See [`zip_with`](Self::zip_with).
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Elementwise product of two aligned series.
    ///
    /// # Errors
    ///
    /// See [`zip_with`](Self::zip_with).
    pub fn try_mul(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Elementwise quotient; a zero denominator gives missing.
    ///
    /// # Errors
    ///
    /// See [`zip_with`](Self::zip_with).
    pub fn try_div(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, safe_div)
    }

    /// Absolute value of every element.
    #[must_use]
    pub fn abs(&self) -> Self {
        self.map(num_traits::Float::abs)
    }

    /// Square root; negative values become missing.
    #[must_use]
    pub fn sqrt(&self) -> Self {
        self.map(safe_sqrt)
    }

    /// Natural logarithm; non-positive values become missing.
    #[must_use]
    pub fn ln(&self) -> Self {
        self.map(safe_ln)
    }

    /// `1.0` where `self > other`, `0.0` where not, missing where either side is missing.
    ///
    /// # Errors
    ///
    /// See [`zip_with`](Self::zip_with).
    pub fn gt(&self, other: &Self) -> Result<Self> {
        self.compare(other, |a, b| a > b)
    }

    /// `1.0` where `self < other`, with the same missing rule as [`gt`](Self::gt).
    ///
    /// # Errors
    ///
    /// See [`zip_with`](Self::zip_with).
    pub fn lt(&self, other: &Self) -> Result<Self> {
        self.compare(other, |a, b| a < b)
    }

    /// `1.0` where `self >= other`.
    ///
    /// # Errors
    ///
    /// See [`zip_with`](Self::zip_with).
    pub fn ge(&self, other: &Self) -> Result<Self> {
        self.compare(other, |a, b| a >= b)
    }

    /// `1.0` where `self <= other`.
    ///
    /// # Errors
    ///
    /// See [`zip_with`](Self::zip_with).
    pub fn le(&self, other: &Self) -> Result<Self> {
        self.compare(other, |a, b| a <= b)
    }

    /// `1.0` where the values are equal.
    ///
    /// # Errors
    ///
    /// See [`zip_with`](Self::zip_with).
    pub fn eq_series(&self, other: &Self) -> Result<Self> {
        self.compare(other, |a, b| a == b)
    }

    fn compare<F: Fn(T, T) -> bool>(&self, other: &Self, pred: F) -> Result<Self> {
        self.zip_with(other, |a, b| {
            if a.is_nan() || b.is_nan() {
                T::nan()
            } else if pred(a, b) {
                T::one()
            } else {
                T::zero()
            }
        })
    }

    /// Shifts values by `k` positions while keeping the index in place.
    ///
    /// A positive `k` lags the series (the first `k` positions become
    /// missing); a negative `k` leads it (the last `|k|` positions become
    /// missing). Shifting past either end yields all missing.
    #[must_use]
    pub fn shift(&self, k: isize) -> Self {
        let n = self.len();
        let offset = k.unsigned_abs();
        let mut out = vec![T::nan(); n];
        if offset < n {
            if k >= 0 {
                out[offset..].copy_from_slice(&self.values[..n - offset]);
            } else {
                out[..n - offset].copy_from_slice(&self.values[offset..]);
            }
        }
        self.derive(out)
    }

    /// `v[t] - v[t-k]`; the first `k` positions are missing.
    #[must_use]
    pub fn diff(&self, k: usize) -> Self {
        let out = (0..self.len())
            .map(|t| {
                if t < k {
                    T::nan()
                } else {
                    self.values[t] - self.values[t - k]
                }
            })
            .collect();
        self.derive(out)
    }

    /// `v[t] / v[t-k] - 1`; a zero base value gives missing.
    #[must_use]
    pub fn pct_change(&self, k: usize) -> Self {
        let out = (0..self.len())
            .map(|t| {
                if t < k {
                    T::nan()
                } else {
                    safe_div(self.values[t], self.values[t - k]) - T::one()
                }
            })
            .collect();
        self.derive(out)
    }
}

fn normalize<T: SeriesElement>(mut values: Vec<T>) -> Vec<T> {
    for v in &mut values {
        *v = finite_or_missing(*v);
    }
    values
}

impl<T: SeriesElement> From<Vec<T>> for Series<T> {
    fn from(values: Vec<T>) -> Self {
        Self::new(values)
    }
}

impl<T: SeriesElement> From<&[T]> for Series<T> {
    fn from(values: &[T]) -> Self {
        Self::new(values.to_vec())
    }
}

impl<T: SeriesElement> FromIterator<T> for Series<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> Index<usize> for Series<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.values[i]
    }
}

impl<T> AsRef<[T]> for Series<T> {
    fn as_ref(&self) -> &[T] {
        &self.values
    }
}

impl<'a, T> IntoIterator for &'a Series<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<T: SeriesElement> Neg for &Series<T> {
    type Output = Series<T>;

    fn neg(self) -> Series<T> {
        self.map(|v| -v)
    }
}

impl<T: SeriesElement> Add<T> for &Series<T> {
    type Output = Series<T>;

    fn add(self, rhs: T) -> Series<T> {
        self.map(|v| v + rhs)
    }
}

impl<T: SeriesElement> Sub<T> for &Series<T> {
    type Output = Series<T>;

    fn sub(self, rhs: T) -> Series<T> {
        self.map(|v| v - rhs)
    }
}

impl<T: SeriesElement> Mul<T> for &Series<T> {
    type Output = Series<T>;

    fn mul(self, rhs: T) -> Series<T> {
        self.map(|v| v * rhs)
    }
}

impl<T: SeriesElement> Div<T> for &Series<T> {
    type Output = Series<T>;

    fn div(self, rhs: T) -> Series<T> {
        self.map(|v| safe_div(v, rhs))
    }
}
