//! Stateful recurrence filters.
//!
//! A recurrence carries state from one position to the next:
//! `state[t] = step(state[t-1], input[t])`. Every filter implements
//! [`Recurrence`] and is driven by [`run`], which owns the shared missing
//! value rules:
//!
//! - the leading run of missing inputs is warm-up and is emitted as missing
//! - the filter seeds at the first non-missing input
//! - once seeded, a missing input yields missing for that position and
//!   every later one, exactly as a NaN would flow through the arithmetic
//!
//! # Filters
//!
//! - [`ExponentialFilter`]: EMA family (span, Wilder period or raw alpha;
//!   adjusted or recursive weights)
//! - [`AdaptiveFilter`]: Kaufman adaptive moving average
//! - [`ParabolicSar`]: Wilder's parabolic stop-and-reverse
//!
//! # Example
//!
//! ```
//! use rolling_ta::recurrence::ExponentialFilter;
//! use rolling_ta::Series;
//!
//! let close = Series::new(vec![10.0_f64, 11.0, 12.0, 13.0]);
//! let ema = ExponentialFilter::span(3).unwrap().apply(&close);
//!
//! assert_eq!(ema[0], 10.0);
//! assert!((ema[1] - 10.5).abs() < 1e-12);
//! ```

use crate::error::{Error, Result};
use crate::missing::{finite_or_missing, safe_div};
use crate::rolling::{evaluate, Reducer};
use crate::series::Series;
pub use crate::traits::Observation;
use crate::traits::{checked_period, validate_alpha, validate_period, SeriesElement};
use crate::window::Window;

// =============================================================================
// Recurrence driver
// =============================================================================

/// A filter expressed as seed, step and read-out over an explicit state.
pub trait Recurrence<T: SeriesElement> {
    /// Per-position input.
    type Input: Observation;
    /// State carried between positions.
    type State: Copy;

    /// State after the first non-missing input.
    fn seed(&self, input: Self::Input) -> Self::State;

    /// State after folding `input` into `state`.
    fn step(&self, state: Self::State, input: Self::Input) -> Self::State;

    /// Output value for `state`.
    fn value(&self, state: &Self::State) -> T;
}

/// Drives `filter` over `inputs`, returning one output per input.
pub fn run<T, R, I>(filter: &R, inputs: I) -> Vec<T>
where
    T: SeriesElement,
    R: Recurrence<T>,
    I: IntoIterator<Item = R::Input>,
{
    resume(filter, None, inputs)
}

/// Like [`run`], but continues from an existing state when one is given.
fn resume<T, R, I>(filter: &R, initial: Option<R::State>, inputs: I) -> Vec<T>
where
    T: SeriesElement,
    R: Recurrence<T>,
    I: IntoIterator<Item = R::Input>,
{
    let inputs = inputs.into_iter();
    let mut out = Vec::with_capacity(inputs.size_hint().0);
    let mut state = initial;
    let mut poisoned = false;

    for input in inputs {
        let value = match state {
            _ if poisoned => T::nan(),
            None if input.is_missing() => T::nan(),
            None => {
                let seeded = filter.seed(input);
                state = Some(seeded);
                filter.value(&seeded)
            }
            Some(_) if input.is_missing() => {
                poisoned = true;
                T::nan()
            }
            Some(prev) => {
                let next = filter.step(prev, input);
                state = Some(next);
                filter.value(&next)
            }
        };
        out.push(finite_or_missing(value));
    }
    out
}

// =============================================================================
// Exponential filter
// =============================================================================

/// How the smoothing factor of an [`ExponentialFilter`] is specified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Smoothing {
    /// `alpha = 2 / (n + 1)`.
    Span(usize),
    /// Wilder's smoothing, `alpha = 1 / n`.
    Period(usize),
    /// Explicit `alpha` in `(0, 1]`.
    Alpha(f64),
}

/// Weighting scheme of an [`ExponentialFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Adjust {
    /// Recursive form: `y[0] = x[0]`, `y[t] = a·x[t] + (1 - a)·y[t-1]`.
    #[default]
    NoAdjust,
    /// Bias-corrected form: `y[t] = Σ (1-a)^i x[t-i] / Σ (1-a)^i`.
    Adjust,
}

/// How the first defined output of an [`ExponentialFilter`] is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Seed {
    /// Start from the first non-missing value.
    #[default]
    FirstValue,
    /// Start from the simple average of the first `n` non-missing values;
    /// the `n - 1` positions before it are missing.
    Average(usize),
}

/// State of the exponential filter.
///
/// `weight_sum` is `Σ (1-a)^i` over the folded inputs; it stays at 1 in the
/// recursive form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmaState<T> {
    /// Current smoothed value.
    pub mean: T,
    /// Accumulated weight.
    pub weight_sum: T,
}

/// Exponentially weighted moving average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialFilter<T> {
    alpha: T,
    adjust: Adjust,
    seed: Seed,
}

impl<T: SeriesElement> ExponentialFilter<T> {
    /// Creates a filter from a smoothing choice and weighting mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPeriod` for a zero span or period and
    /// `Error::InvalidParameter` for an alpha outside `(0, 1]`.
    pub fn new(smoothing: Smoothing, adjust: Adjust) -> Result<Self> {
        let alpha = match smoothing {
            Smoothing::Span(n) => {
                validate_period(n)?;
                T::two() / T::from_usize(checked_period(n, 1)?)?
            }
            Smoothing::Period(n) => {
                validate_period(n)?;
                T::one() / T::from_usize(n)?
            }
            Smoothing::Alpha(a) => {
                let alpha = T::from_f64(a)?;
                validate_alpha(alpha)?;
                alpha
            }
        };
        Ok(Self {
            alpha,
            adjust,
            seed: Seed::FirstValue,
        })
    }

    /// Span-based EMA with recursive weights.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPeriod` if `span` is zero.
    pub fn span(span: usize) -> Result<Self> {
        Self::new(Smoothing::Span(span), Adjust::NoAdjust)
    }

    /// Wilder's smoothing: `alpha = 1 / period`, recursive weights.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPeriod` if `period` is zero.
    pub fn wilder(period: usize) -> Result<Self> {
        Self::new(Smoothing::Period(period), Adjust::NoAdjust)
    }

    /// Replaces the seeding rule.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPeriod` for `Seed::Average(0)` and
    /// `Error::InvalidParameter` when an average seed is combined with
    /// adjusted weights, which already define every position.
    pub fn with_seed(mut self, seed: Seed) -> Result<Self> {
        if let Seed::Average(n) = seed {
            validate_period(n)?;
            if self.adjust == Adjust::Adjust {
                return Err(Error::InvalidParameter {
                    name: "seed",
                    value: format!("average({n})"),
                    reason: "an average seed requires recursive (no-adjust) weights",
                });
            }
        }
        self.seed = seed;
        Ok(self)
    }

    /// The smoothing factor.
    #[must_use]
    pub fn alpha(&self) -> T {
        self.alpha
    }

    /// The weighting mode.
    #[must_use]
    pub fn adjust(&self) -> Adjust {
        self.adjust
    }

    /// Smooths `series`.
    #[must_use]
    pub fn apply(&self, series: &Series<T>) -> Series<T> {
        let values = match self.seed {
            Seed::FirstValue => run(self, series.values().iter().copied()),
            Seed::Average(n) => self.run_average_seeded(series.values(), n),
        };
        series.derive(values)
    }

    fn run_average_seeded(&self, data: &[T], n: usize) -> Vec<T> {
        let mut out = vec![T::nan(); data.len()];
        let Some(first) = data.iter().position(|v| !v.is_nan()) else {
            return out;
        };
        let Some(seed_end) = first.checked_add(n - 1).filter(|&end| end < data.len()) else {
            return out;
        };
        let head = &data[first..=seed_end];
        if head.iter().any(|v| v.is_nan()) {
            return out;
        }
        let count = T::from_usize(n).unwrap_or_else(|_| T::nan());
        let average = head.iter().fold(T::zero(), |acc, &v| acc + v) / count;
        out[seed_end] = finite_or_missing(average);

        let state = EmaState {
            mean: average,
            weight_sum: T::one(),
        };
        let rest = resume(self, Some(state), data[seed_end + 1..].iter().copied());
        out[seed_end + 1..].copy_from_slice(&rest);
        out
    }
}

impl<T: SeriesElement> Recurrence<T> for ExponentialFilter<T> {
    type Input = T;
    type State = EmaState<T>;

    fn seed(&self, x: T) -> EmaState<T> {
        EmaState {
            mean: x,
            weight_sum: T::one(),
        }
    }

    fn step(&self, state: EmaState<T>, x: T) -> EmaState<T> {
        match self.adjust {
            Adjust::NoAdjust => EmaState {
                mean: state.mean + self.alpha * (x - state.mean),
                weight_sum: state.weight_sum,
            },
            // num = x + (1-a)·num, den = 1 + (1-a)·den, rewritten on the mean
            Adjust::Adjust => {
                let weight_sum = T::one() + (T::one() - self.alpha) * state.weight_sum;
                EmaState {
                    mean: state.mean + (x - state.mean) / weight_sum,
                    weight_sum,
                }
            }
        }
    }

    fn value(&self, state: &EmaState<T>) -> T {
        state.mean
    }
}

// =============================================================================
// Adaptive (Kaufman) filter
// =============================================================================

/// Kaufman adaptive moving average.
///
/// Per step the smoothing factor is
/// `alpha = (ER·(fast_sc - slow_sc) + slow_sc)²` with `fast_sc = 2/(fast+1)`,
/// `slow_sc = 2/(slow+1)` and the efficiency ratio
/// `ER = |x[t] - x[t-n]| / Σ |x[i] - x[i-1]|` over the last `n` changes.
/// A flat window (no movement at all) has `ER = 0`.
///
/// The first `er_window` positions have no efficiency ratio and are
/// warm-up; the level seeds with the price at position `er_window`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveFilter<T> {
    er_window: usize,
    fast_sc: T,
    slow_sc: T,
}

/// State of the adaptive filter: the previous level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveState<T> {
    /// Current level.
    pub level: T,
}

impl<T: SeriesElement> AdaptiveFilter<T> {
    /// Creates a Kaufman filter.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPeriod` if any window is zero.
    pub fn new(er_window: usize, fast_span: usize, slow_span: usize) -> Result<Self> {
        validate_period(er_window)?;
        validate_period(fast_span)?;
        validate_period(slow_span)?;
        Ok(Self {
            er_window,
            fast_sc: T::two() / T::from_usize(checked_period(fast_span, 1)?)?,
            slow_sc: T::two() / T::from_usize(checked_period(slow_span, 1)?)?,
        })
    }

    /// The efficiency ratio of every window, missing during warm-up.
    #[must_use]
    pub fn efficiency_ratio(&self, series: &Series<T>) -> Series<T> {
        let change = series.diff(self.er_window).abs();
        let steps = series.diff(1).abs();
        // er_window >= 1 was validated on construction
        let volatility = Window::new(self.er_window)
            .and_then(|w| evaluate(&steps, w, Reducer::Sum))
            .unwrap_or_else(|_| series.map(|_| T::nan()));
        change
            .zip_with(&volatility, |c, v| {
                if c.is_nan() || v.is_nan() {
                    T::nan()
                } else if v <= T::zero() {
                    T::zero()
                } else {
                    safe_div(c, v).min(T::one())
                }
            })
            .unwrap_or_else(|_| series.map(|_| T::nan()))
    }

    /// Per-position smoothing factor derived from the efficiency ratio.
    #[must_use]
    pub fn smoothing_factors(&self, series: &Series<T>) -> Series<T> {
        self.efficiency_ratio(series).map(|er| {
            let sc = er * (self.fast_sc - self.slow_sc) + self.slow_sc;
            sc * sc
        })
    }

    /// Smooths `series`.
    #[must_use]
    pub fn apply(&self, series: &Series<T>) -> Series<T> {
        let alphas = self.smoothing_factors(series);
        let inputs = series.iter().copied().zip(alphas.iter().copied());
        series.derive(run(self, inputs))
    }
}

impl<T: SeriesElement> Recurrence<T> for AdaptiveFilter<T> {
    /// `(price, alpha)`.
    type Input = (T, T);
    type State = AdaptiveState<T>;

    fn seed(&self, (x, _): (T, T)) -> AdaptiveState<T> {
        AdaptiveState { level: x }
    }

    fn step(&self, state: AdaptiveState<T>, (x, alpha): (T, T)) -> AdaptiveState<T> {
        AdaptiveState {
            level: state.level + alpha * (x - state.level),
        }
    }

    fn value(&self, state: &AdaptiveState<T>) -> T {
        state.level
    }
}

// =============================================================================
// Parabolic SAR
// =============================================================================

/// Direction of the current SAR trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// SAR trails below price.
    Up,
    /// SAR trails above price.
    Down,
}

/// Named state of the parabolic SAR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SarState<T> {
    /// Current stop-and-reverse level.
    pub sar: T,
    /// Current trend direction.
    pub trend: Trend,
    /// Current acceleration factor.
    pub af: T,
    /// Extreme point of the current trend.
    pub extreme: T,
    /// Lows of the previous two bars, most recent first.
    pub prev_low: [T; 2],
    /// Highs of the previous two bars, most recent first.
    pub prev_high: [T; 2],
}

/// Wilder's parabolic stop-and-reverse with configurable acceleration.
///
/// The same type covers SAR (`start == increment`) and the extended form
/// with independent start, increment and ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParabolicSar<T> {
    start: T,
    increment: T,
    max: T,
}

impl<T: SeriesElement> ParabolicSar<T> {
    /// Creates a SAR with the given acceleration start, increment and ceiling.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if any factor is non-finite or not
    /// positive, or if `start > max`.
    pub fn new(start: f64, increment: f64, max: f64) -> Result<Self> {
        for (name, value) in [("start", start), ("increment", increment), ("max", max)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidParameter {
                    name,
                    value: value.to_string(),
                    reason: "acceleration factors must be finite and positive",
                });
            }
        }
        if start > max {
            return Err(Error::InvalidParameter {
                name: "start",
                value: start.to_string(),
                reason: "must not exceed max",
            });
        }
        Ok(Self {
            start: T::from_f64(start)?,
            increment: T::from_f64(increment)?,
            max: T::from_f64(max)?,
        })
    }

    /// Wilder's defaults: start 0.02, increment 0.02, max 0.20.
    ///
    /// # Errors
    ///
    /// Returns `Error::NumericConversion` if the defaults cannot be
    /// represented in `T`.
    pub fn standard() -> Result<Self> {
        Self::new(0.02, 0.02, 0.2)
    }

    /// Computes the SAR over aligned high and low series.
    ///
    /// # Errors
    ///
    /// Returns `Error::LengthMismatch` or `Error::IndexMismatch` if the
    /// series are not aligned.
    pub fn apply(&self, high: &Series<T>, low: &Series<T>) -> Result<Series<T>> {
        high.check_aligned(low)?;
        let bars = high.iter().copied().zip(low.iter().copied());
        Ok(high.derive(run(self, bars)))
    }
}

impl<T: SeriesElement> Recurrence<T> for ParabolicSar<T> {
    /// `(high, low)`.
    type Input = (T, T);
    type State = SarState<T>;

    fn seed(&self, (high, low): (T, T)) -> SarState<T> {
        SarState {
            sar: low,
            trend: Trend::Up,
            af: self.start,
            extreme: high,
            prev_low: [low, low],
            prev_high: [high, high],
        }
    }

    fn step(&self, s: SarState<T>, (high, low): (T, T)) -> SarState<T> {
        let mut sar = s.sar + s.af * (s.extreme - s.sar);
        let mut trend = s.trend;
        let mut af = s.af;
        let mut extreme = s.extreme;

        match s.trend {
            Trend::Up => {
                // Never above the prior two lows
                sar = sar.min(s.prev_low[0]).min(s.prev_low[1]);
                if low < sar {
                    trend = Trend::Down;
                    sar = s.extreme;
                    extreme = low;
                    af = self.start;
                } else if high > extreme {
                    extreme = high;
                    af = (af + self.increment).min(self.max);
                }
            }
            Trend::Down => {
                // Never below the prior two highs
                sar = sar.max(s.prev_high[0]).max(s.prev_high[1]);
                if high > sar {
                    trend = Trend::Up;
                    sar = s.extreme;
                    extreme = high;
                    af = self.start;
                } else if low < extreme {
                    extreme = low;
                    af = (af + self.increment).min(self.max);
                }
            }
        }

        SarState {
            sar,
            trend,
            af,
            extreme,
            prev_low: [low, s.prev_low[0]],
            prev_high: [high, s.prev_high[0]],
        }
    }

    fn value(&self, state: &SarState<T>) -> T {
        state.sar
    }
}
