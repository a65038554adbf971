//! Running statistics using Welford's algorithm.
//!
//! [`RunningStat`] keeps count, mean, sum and the sum of squared deviations
//! of the values folded into it. Values enter one at a time with
//! [`update`](RunningStat::update); two accumulators combine with
//! [`merge`](RunningStat::merge), which is how the rolling reducers slide a
//! window through [`SlidingAggregate`](super::sliding_aggregate::SlidingAggregate)
//! without ever subtracting a value back out.
//!
//! # Formula
//!
//! ```text
//! update(x):  count += 1
//!             delta  = x - mean
//!             mean  += delta / count
//!             m2    += delta * (x - mean)
//!
//! merge(a, b):  n     = a.count + b.count
//!               delta = b.mean - a.mean
//!               mean  = a.mean + delta * b.count / n
//!               m2    = a.m2 + b.m2 + delta² * a.count * b.count / n
//! ```
//!
//! Both leave `mean` and `m2` untouched when the new values equal the
//! current mean, so a constant window has an exact mean and an exact zero
//! variance.
//!
//! Missing values are not folded into the moments. They are counted
//! separately so the caller can report a window as missing while it holds
//! one.
//!
//! # Example
//!
//! ```
//! use rolling_ta::kernels::running_stat::RunningStat;
//!
//! let mut left: RunningStat<f64> = RunningStat::new();
//! left.update(1.0);
//! left.update(2.0);
//! let mut right: RunningStat<f64> = RunningStat::new();
//! right.update(3.0);
//! right.update(4.0);
//!
//! let all = left.merge(&right);
//! assert!((all.mean() - 2.5).abs() < 1e-12);
//! assert!((all.sample_variance() - 5.0 / 3.0).abs() < 1e-12);
//! ```
//!
//! # References
//!
//! - Welford, B. P. (1962). "Note on a method for calculating corrected sums
//!   of squares and products". Technometrics. 4 (3): 419-420.
//! - Chan, T. F., Golub, G. H., LeVeque, R. J. (1979). "Updating formulae
//!   and a pairwise algorithm for computing sample variances".

use super::sliding_aggregate::Aggregate;
use crate::traits::SeriesElement;

/// Welford accumulator.
#[derive(Debug, Clone, Copy)]
pub struct RunningStat<T> {
    count: usize,
    missing: usize,
    mean: T,
    m2: T,
    sum: T,
}

impl<T: SeriesElement> Default for RunningStat<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SeriesElement> RunningStat<T> {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            count: 0,
            missing: 0,
            mean: T::zero(),
            m2: T::zero(),
            sum: T::zero(),
        }
    }

    /// Adds a value. Missing values only bump the missing counter.
    pub fn update(&mut self, value: T) {
        if value.is_nan() {
            self.missing += 1;
            return;
        }

        self.count += 1;
        self.sum = self.sum + value;
        if self.count == 1 {
            self.mean = value;
            self.m2 = T::zero();
            return;
        }

        let n = count_as::<T>(self.count);
        let delta = value - self.mean;
        self.mean = self.mean + delta / n;
        self.m2 = self.m2 + delta * (value - self.mean);
    }

    /// Combines two accumulators into the summary of all their values.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let missing = self.missing + other.missing;
        if other.count == 0 {
            return Self { missing, ..*self };
        }
        if self.count == 0 {
            return Self { missing, ..*other };
        }

        let count = self.count + other.count;
        let (na, nb, n) = (
            count_as::<T>(self.count),
            count_as::<T>(other.count),
            count_as::<T>(count),
        );
        let delta = other.mean - self.mean;
        Self {
            count,
            missing,
            mean: self.mean + delta * nb / n,
            m2: self.m2 + other.m2 + delta * delta * na * nb / n,
            sum: self.sum + other.sum,
        }
    }

    /// Number of non-missing values held.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Number of missing values held.
    #[inline]
    #[must_use]
    pub const fn missing(&self) -> usize {
        self.missing
    }

    /// Returns `true` if any held value is missing.
    #[inline]
    #[must_use]
    pub const fn has_missing(&self) -> bool {
        self.missing > 0
    }

    /// Mean of the held values, missing when empty.
    #[must_use]
    pub fn mean(&self) -> T {
        if self.count == 0 {
            T::nan()
        } else {
            self.mean
        }
    }

    /// Sum of the held values.
    #[must_use]
    pub fn sum(&self) -> T {
        self.sum
    }

    /// Population variance `m2 / n`, missing when empty.
    #[must_use]
    pub fn variance(&self) -> T {
        if self.count == 0 {
            return T::nan();
        }
        self.m2 / count_as::<T>(self.count)
    }

    /// Sample variance `m2 / (n - 1)`, missing below two values.
    #[must_use]
    pub fn sample_variance(&self) -> T {
        if self.count < 2 {
            return T::nan();
        }
        self.m2 / count_as::<T>(self.count - 1)
    }

    /// Population standard deviation.
    #[must_use]
    pub fn stddev(&self) -> T {
        self.variance().sqrt()
    }

    /// Sample standard deviation.
    #[must_use]
    pub fn sample_stddev(&self) -> T {
        self.sample_variance().sqrt()
    }
}

impl<T: SeriesElement> Aggregate for RunningStat<T> {
    type Item = T;

    fn empty() -> Self {
        Self::new()
    }

    fn insert(&mut self, value: T) {
        self.update(value);
    }

    fn merge(&self, other: &Self) -> Self {
        Self::merge(self, other)
    }
}

/// Converts a count to `T`; window sizes are always representable in `f32`.
#[inline]
pub(crate) fn count_as<T: SeriesElement>(count: usize) -> T {
    T::from_usize(count).unwrap_or_else(|_| T::nan())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_empty_is_missing() {
        let stat: RunningStat<f64> = RunningStat::new();
        assert_eq!(stat.count(), 0);
        assert!(stat.mean().is_nan());
        assert!(stat.variance().is_nan());
        assert!(stat.sample_variance().is_nan());
    }

    #[test]
    fn test_single_value() {
        let mut stat: RunningStat<f64> = RunningStat::new();
        stat.update(5.0);
        assert_eq!(stat.mean(), 5.0);
        assert_eq!(stat.variance(), 0.0);
        assert!(stat.sample_variance().is_nan());
    }

    #[test]
    fn test_known_moments() {
        let mut stat: RunningStat<f64> = RunningStat::new();
        for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stat.update(x);
        }
        assert!((stat.mean() - 5.0).abs() < 1e-12);
        assert!((stat.variance() - 4.0).abs() < 1e-12);
        assert!((stat.stddev() - 2.0).abs() < 1e-12);
        assert!((stat.sample_variance() - 32.0 / 7.0).abs() < 1e-12);
        assert_eq!(stat.sum(), 40.0);
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let data = [3.0_f64, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let mut whole: RunningStat<f64> = RunningStat::new();
        for &x in &data {
            whole.update(x);
        }
        for split in 0..=data.len() {
            let (mut left, mut right) = (RunningStat::new(), RunningStat::new());
            data[..split].iter().for_each(|&x| left.update(x));
            data[split..].iter().for_each(|&x| right.update(x));
            let merged = left.merge(&right);
            assert_eq!(merged.count(), whole.count());
            assert!((merged.mean() - whole.mean()).abs() < 1e-12);
            assert!((merged.sample_variance() - whole.sample_variance()).abs() < 1e-10);
            assert_eq!(merged.sum(), whole.sum());
        }
    }

    #[test]
    fn test_constant_merge_is_exact() {
        let c = 0.1_f64 + 0.2;
        let (mut a, mut b) = (RunningStat::new(), RunningStat::new());
        for _ in 0..7 {
            a.update(c);
        }
        for _ in 0..3 {
            b.update(c);
        }
        let merged = a.merge(&b);
        assert_eq!(merged.mean(), c);
        assert_eq!(merged.variance(), 0.0);
    }

    #[test]
    fn test_missing_values_are_counted() {
        let mut stat: RunningStat<f64> = RunningStat::new();
        stat.update(1.0);
        stat.update(f64::NAN);
        stat.update(3.0);
        assert!(stat.has_missing());
        assert_eq!(stat.count(), 2);
        assert_eq!(stat.mean(), 2.0);

        let mut gap: RunningStat<f64> = RunningStat::new();
        gap.update(f64::NAN);
        let merged = RunningStat::new().merge(&gap);
        assert_eq!(merged.missing(), 1);
        assert!(merged.mean().is_nan());
        assert_eq!(stat.merge(&gap).missing(), 2);
    }
}
