//! Incremental co-moment for rolling covariance and correlation.
//!
//! Bivariate extension of the Welford update: alongside the two means and
//! sums of squared deviations it tracks `cxy = Σ (x - mean_x)(y - mean_y)`.
//! Two co-moments merge with the pairwise formula
//! `cxy = cxy_a + cxy_b + dx·dy·n_a·n_b / n`, which lets rolling windows
//! slide through [`SlidingAggregate`](super::sliding_aggregate::SlidingAggregate).
//! A pair is missing when either side is missing; missing pairs are counted
//! and kept out of the moments.

use crate::kernels::running_stat::count_as;
use crate::kernels::sliding_aggregate::Aggregate;
use crate::traits::SeriesElement;

/// Running co-moment of paired observations.
#[derive(Debug, Clone, Copy)]
pub struct CoMoment<T> {
    count: usize,
    missing: usize,
    mean_x: T,
    mean_y: T,
    m2_x: T,
    m2_y: T,
    cxy: T,
}

impl<T: SeriesElement> Default for CoMoment<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SeriesElement> CoMoment<T> {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            count: 0,
            missing: 0,
            mean_x: T::zero(),
            mean_y: T::zero(),
            m2_x: T::zero(),
            m2_y: T::zero(),
            cxy: T::zero(),
        }
    }

    /// Adds the pair `(x, y)`.
    pub fn update(&mut self, x: T, y: T) {
        if x.is_nan() || y.is_nan() {
            self.missing += 1;
            return;
        }
        self.count += 1;
        let n = count_as::<T>(self.count);
        let dx = x - self.mean_x;
        let dy = y - self.mean_y;
        self.mean_x = self.mean_x + dx / n;
        self.mean_y = self.mean_y + dy / n;
        self.m2_x = self.m2_x + dx * (x - self.mean_x);
        self.m2_y = self.m2_y + dy * (y - self.mean_y);
        self.cxy = self.cxy + dx * (y - self.mean_y);
    }

    /// Combines two co-moments into the summary of all their pairs.
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
        let dx = other.mean_x - self.mean_x;
        let dy = other.mean_y - self.mean_y;
        let weight = na * nb / n;
        Self {
            count,
            missing,
            mean_x: self.mean_x + dx * nb / n,
            mean_y: self.mean_y + dy * nb / n,
            m2_x: self.m2_x + other.m2_x + dx * dx * weight,
            m2_y: self.m2_y + other.m2_y + dy * dy * weight,
            cxy: self.cxy + other.cxy + dx * dy * weight,
        }
    }

    /// Number of complete pairs held.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Returns `true` if any held pair has a missing side.
    #[inline]
    #[must_use]
    pub const fn has_missing(&self) -> bool {
        self.missing > 0
    }

    /// Covariance with divisor `n - ddof`; missing if that is not positive.
    #[must_use]
    pub fn covariance(&self, ddof: usize) -> T {
        if self.count <= ddof {
            return T::nan();
        }
        self.cxy / count_as::<T>(self.count - ddof)
    }

    /// Pearson correlation; missing if either side has zero variance.
    #[must_use]
    pub fn correlation(&self) -> T {
        if self.count < 2 {
            return T::nan();
        }
        let denom = (self.m2_x * self.m2_y).sqrt();
        if denom == T::zero() || denom.is_nan() {
            return T::nan();
        }
        // Clamp rounding overshoot
        (self.cxy / denom).max(-T::one()).min(T::one())
    }
}

impl<T: SeriesElement> Aggregate for CoMoment<T> {
    type Item = (T, T);

    fn empty() -> Self {
        Self::new()
    }

    fn insert(&mut self, (x, y): (T, T)) {
        self.update(x, y);
    }

    fn merge(&self, other: &Self) -> Self {
        Self::merge(self, other)
    }
}
