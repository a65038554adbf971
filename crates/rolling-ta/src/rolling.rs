//! Rolling (sliding-window) reductions.
//!
//! [`evaluate`] applies a [`Reducer`] to the trailing window ending at every
//! position of a series. The output is aligned with the input:
//!
//! - the window ending at `t` covers `[t - size + 1, t]`, clipped at 0
//! - a clipped window with fewer than `min_periods` observations is missing
//! - a window containing any missing value is missing
//!
//! Mean, sum, variance and standard deviation slide Welford accumulators
//! through a two-stack window in amortized O(1) per step, so nothing is ever
//! subtracted back out; min and max use a monotonic deque. The remaining
//! reducers recompute each window.
//!
//! # Example
//!
//! ```
//! use rolling_ta::rolling::{evaluate, Reducer};
//! use rolling_ta::{Series, Window};
//!
//! let close = Series::new(vec![10.0_f64, 11.0, 12.0, 11.0, 10.0]);
//! let sma = evaluate(&close, Window::new(3).unwrap(), Reducer::Mean).unwrap();
//!
//! assert!(sma[0].is_nan());
//! assert!(sma[1].is_nan());
//! assert!((sma[2] - 11.0).abs() < 1e-12);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::kernels::comoment::CoMoment;
use crate::kernels::rolling_extrema::{rolling_extrema, Extremum};
use crate::kernels::running_stat::{count_as, RunningStat};
use crate::kernels::sliding_aggregate::{Aggregate, SlidingAggregate};
use crate::missing::{any_missing, finite_or_missing};
use crate::series::Series;
use crate::traits::SeriesElement;
use crate::window::Window;

/// Divisor convention for variance-like reducers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Estimator {
    /// Divide by `n`.
    Population,
    /// Divide by `n - 1`; a single observation gives missing.
    #[default]
    Sample,
}

impl Estimator {
    /// Degrees of freedom subtracted from the count.
    #[must_use]
    pub const fn ddof(self) -> usize {
        match self {
            Self::Population => 0,
            Self::Sample => 1,
        }
    }
}

/// The closed set of window reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    /// Arithmetic mean.
    Mean,
    /// Sum.
    Sum,
    /// Variance.
    Variance(Estimator),
    /// Standard deviation.
    StdDev(Estimator),
    /// Minimum.
    Min,
    /// Maximum.
    Max,
    /// Mean absolute deviation around the window mean.
    MeanAbsDeviation,
    /// Median; the mean of the two middle values for an even count.
    Median,
    /// Offset of the first maximum from the window start.
    ArgMax,
    /// Offset of the first minimum from the window start.
    ArgMin,
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Variance(Estimator::Sample) => "var",
            Self::Variance(Estimator::Population) => "var:pop",
            Self::StdDev(Estimator::Sample) => "std",
            Self::StdDev(Estimator::Population) => "std:pop",
            Self::Min => "min",
            Self::Max => "max",
            Self::MeanAbsDeviation => "mad",
            Self::Median => "median",
            Self::ArgMax => "argmax",
            Self::ArgMin => "argmin",
        };
        f.write_str(name)
    }
}

impl FromStr for Reducer {
    type Err = Error;

    /// Parses `mean`, `sum`, `var`, `std`, `min`, `max`, `mad`, `median`,
    /// `argmax`, `argmin`. Variance and deviation accept a `:pop` or
    /// `:sample` suffix.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let (name, estimator) = match lower.split_once(':') {
            Some((name, "pop" | "population")) => (name, Some(Estimator::Population)),
            Some((name, "sample")) => (name, Some(Estimator::Sample)),
            Some(_) => return Err(Error::UnknownMethod { name: s.to_string() }),
            None => (lower.as_str(), None),
        };
        let estimator_only = |r: Reducer| match estimator {
            None => Ok(r),
            Some(_) => Err(Error::UnknownMethod { name: s.to_string() }),
        };
        match name {
            "mean" | "avg" => estimator_only(Self::Mean),
            "sum" => estimator_only(Self::Sum),
            "var" | "variance" => Ok(Self::Variance(estimator.unwrap_or_default())),
            "std" | "stddev" => Ok(Self::StdDev(estimator.unwrap_or_default())),
            "min" => estimator_only(Self::Min),
            "max" => estimator_only(Self::Max),
            "mad" => estimator_only(Self::MeanAbsDeviation),
            "median" => estimator_only(Self::Median),
            "argmax" => estimator_only(Self::ArgMax),
            "argmin" => estimator_only(Self::ArgMin),
            _ => Err(Error::UnknownMethod { name: s.to_string() }),
        }
    }
}

// =============================================================================
// Single-series reductions
// =============================================================================

/// Applies `reducer` over every trailing window of `series`.
///
/// # Errors
///
/// Returns `Error::NumericConversion` if a window offset cannot be
/// represented in `T` (only reachable for `ArgMax`/`ArgMin` with `f32` and
/// astronomically large windows).
pub fn evaluate<T: SeriesElement>(
    series: &Series<T>,
    window: Window,
    reducer: Reducer,
) -> Result<Series<T>> {
    let data = series.values();
    let values = match reducer {
        Reducer::Mean => sliding_moments(data, window, |s| s.mean()),
        Reducer::Sum => sliding_moments(data, window, |s| s.sum()),
        Reducer::Variance(Estimator::Population) => sliding_moments(data, window, |s| s.variance()),
        Reducer::Variance(Estimator::Sample) => {
            sliding_moments(data, window, |s| s.sample_variance())
        }
        Reducer::StdDev(Estimator::Population) => sliding_moments(data, window, |s| s.stddev()),
        Reducer::StdDev(Estimator::Sample) => sliding_moments(data, window, |s| s.sample_stddev()),
        Reducer::Min => rolling_extrema(data, window, Extremum::Min),
        Reducer::Max => rolling_extrema(data, window, Extremum::Max),
        Reducer::MeanAbsDeviation => recompute(data, window, mean_abs_deviation),
        Reducer::Median => recompute(data, window, median),
        Reducer::ArgMax => try_recompute(data, window, |w| arg_extreme(w, Extremum::Max))?,
        Reducer::ArgMin => try_recompute(data, window, |w| arg_extreme(w, Extremum::Min))?,
    };
    Ok(series.derive(values))
}

/// Evaluates an arbitrary function on each window slice.
///
/// Warm-up and missing rules are the same as [`evaluate`]: `f` is only
/// called on windows that are ready and contain no missing value.
/// Non-finite results are stored as missing.
///
/// # Example
///
/// ```
/// use rolling_ta::rolling::apply;
/// use rolling_ta::{Series, Window};
///
/// let s = Series::new(vec![1.0_f64, 5.0, 2.0, 8.0]);
/// let range = apply(&s, Window::new(2).unwrap(), |w| w[1] - w[0]);
/// assert_eq!(range.values()[1..], [4.0, -3.0, 6.0]);
/// ```
pub fn apply<T, F>(series: &Series<T>, window: Window, f: F) -> Series<T>
where
    T: SeriesElement,
    F: Fn(&[T]) -> T,
{
    series.derive(recompute(series.values(), window, f))
}

fn sliding_moments<T, F>(data: &[T], window: Window, read: F) -> Vec<T>
where
    T: SeriesElement,
    F: Fn(&RunningStat<T>) -> T,
{
    slide(data.iter().copied(), window, |stat: &RunningStat<T>| {
        if stat.has_missing() {
            T::nan()
        } else {
            read(stat)
        }
    })
}

/// Pushes every item through a window of `window.size()` and reads each
/// ready window.
fn slide<T, A, I, F>(items: I, window: Window, read: F) -> Vec<T>
where
    T: SeriesElement,
    A: Aggregate,
    I: ExactSizeIterator<Item = A::Item>,
    F: Fn(&A) -> T,
{
    let mut out = vec![T::nan(); items.len()];
    let mut held = SlidingAggregate::with_capacity(window.size().min(out.len()));
    for (t, item) in items.enumerate() {
        held.push(item);
        if held.len() > window.size() {
            held.evict();
        }
        if window.is_ready(t) {
            out[t] = finite_or_missing(read(&held.aggregate()));
        }
    }
    out
}

fn recompute<T, F>(data: &[T], window: Window, f: F) -> Vec<T>
where
    T: SeriesElement,
    F: Fn(&[T]) -> T,
{
    (0..data.len())
        .map(|t| {
            let slice = &data[window.start(t)..=t];
            if window.is_ready(t) && !any_missing(slice) {
                finite_or_missing(f(slice))
            } else {
                T::nan()
            }
        })
        .collect()
}

fn try_recompute<T, F>(data: &[T], window: Window, f: F) -> Result<Vec<T>>
where
    T: SeriesElement,
    F: Fn(&[T]) -> Result<T>,
{
    let mut out = vec![T::nan(); data.len()];
    for (t, slot) in out.iter_mut().enumerate() {
        let slice = &data[window.start(t)..=t];
        if window.is_ready(t) && !any_missing(slice) {
            *slot = f(slice)?;
        }
    }
    Ok(out)
}

fn mean_abs_deviation<T: SeriesElement>(window: &[T]) -> T {
    let n = count_as::<T>(window.len());
    let mean = window.iter().fold(T::zero(), |acc, &v| acc + v) / n;
    window.iter().fold(T::zero(), |acc, &v| acc + (v - mean).abs()) / n
}

fn median<T: SeriesElement>(window: &[T]) -> T {
    let mut sorted = window.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / T::two()
    }
}

fn arg_extreme<T: SeriesElement>(window: &[T], kind: Extremum) -> Result<T> {
    let mut best = 0;
    for (i, &v) in window.iter().enumerate().skip(1) {
        let better = match kind {
            Extremum::Max => v > window[best],
            Extremum::Min => v < window[best],
        };
        if better {
            best = i;
        }
    }
    T::from_usize(best)
}

// =============================================================================
// Pairwise reductions
// =============================================================================

/// Rolling covariance of two aligned series.
///
/// # Errors
///
/// Returns `Error::LengthMismatch` or `Error::IndexMismatch` if the series
/// are not aligned.
pub fn cov<T: SeriesElement>(
    a: &Series<T>,
    b: &Series<T>,
    window: Window,
    estimator: Estimator,
) -> Result<Series<T>> {
    let ddof = estimator.ddof();
    pairwise(a, b, window, |c| c.covariance(ddof))
}

/// Rolling Pearson correlation of two aligned series.
///
/// Windows where either side has zero variance are missing.
///
/// # Errors
///
/// Returns `Error::LengthMismatch` or `Error::IndexMismatch` if the series
/// are not aligned.
pub fn corr<T: SeriesElement>(a: &Series<T>, b: &Series<T>, window: Window) -> Result<Series<T>> {
    pairwise(a, b, window, CoMoment::correlation)
}

fn pairwise<T, F>(a: &Series<T>, b: &Series<T>, window: Window, read: F) -> Result<Series<T>>
where
    T: SeriesElement,
    F: Fn(&CoMoment<T>) -> T,
{
    a.check_aligned(b)?;
    let pairs = a.iter().copied().zip(b.iter().copied());
    let out = slide(pairs, window, |moments: &CoMoment<T>| {
        if moments.has_missing() {
            T::nan()
        } else {
            read(moments)
        }
    });
    Ok(a.derive(out))
}
