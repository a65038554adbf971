//! The moving-average family as a closed enumeration.
//!
//! [`MovingAverage`] names every supported smoother with its parameters.
//! Parsing a `"kind:params"` string validates both the kind and the
//! parameters, so an unsupported method fails before any data is touched.
//!
//! | Spec                  | Variant                                   |
//! |-----------------------|-------------------------------------------|
//! | `sma:20`              | `Sma(20)`                                 |
//! | `ema:20`              | `Ema(20)`                                 |
//! | `smma:14`             | `Smma(14)` (Wilder, `alpha = 1/n`)        |
//! | `wma:20`              | `Wma(20)`                                 |
//! | `dema:20`             | `Dema(20)`                                |
//! | `tema:20`             | `Tema(20)`                                |
//! | `trima:20`            | `Trima(20)`                               |
//! | `kama:10[,2,30]`      | `Kama { er_window, fast, slow }`          |
//! | `t3:5[,0.7]`          | `T3 { span, volume_factor }`              |
//!
//! # Example
//!
//! ```
//! use rolling_ta::moving_average::MovingAverage;
//! use rolling_ta::Series;
//!
//! let ma: MovingAverage = "sma:3".parse().unwrap();
//! let out = ma.apply(&Series::new(vec![1.0_f64, 2.0, 3.0, 4.0])).unwrap();
//! assert!((out[3] - 3.0).abs() < 1e-12);
//!
//! assert!("hma:9".parse::<MovingAverage>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::recurrence::{AdaptiveFilter, ExponentialFilter};
use crate::rolling::{apply, evaluate, Reducer};
use crate::series::Series;
use crate::traits::{checked_period, validate_period, SeriesElement};
use crate::window::Window;

/// Default Kaufman fast span.
pub const KAMA_FAST: usize = 2;
/// Default Kaufman slow span.
pub const KAMA_SLOW: usize = 30;
/// Default T3 volume factor.
pub const T3_VOLUME_FACTOR: f64 = 0.7;

/// A moving-average method with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovingAverage {
    /// Simple moving average over `size` points.
    Sma(usize),
    /// Exponential moving average, `alpha = 2 / (span + 1)`.
    Ema(usize),
    /// Smoothed (Wilder) moving average, `alpha = 1 / period`.
    Smma(usize),
    /// Linearly weighted moving average, newest point weighted `size`.
    Wma(usize),
    /// Double EMA: `2·e1 - e2`.
    Dema(usize),
    /// Triple EMA: `3·e1 - 3·e2 + e3`.
    Tema(usize),
    /// Triangular moving average: an SMA of an SMA.
    Trima(usize),
    /// Kaufman adaptive moving average.
    Kama {
        /// Efficiency-ratio window.
        er_window: usize,
        /// Fast smoothing span.
        fast: usize,
        /// Slow smoothing span.
        slow: usize,
    },
    /// Tillson T3: six chained EMAs combined with volume-factor weights.
    T3 {
        /// EMA span.
        span: usize,
        /// Volume factor in `[0, 1]`.
        volume_factor: f64,
    },
}

impl MovingAverage {
    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPeriod` for a zero size or span and
    /// `Error::InvalidParameter` for a T3 volume factor outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Sma(n)
            | Self::Ema(n)
            | Self::Smma(n)
            | Self::Wma(n)
            | Self::Dema(n)
            | Self::Tema(n)
            | Self::Trima(n) => validate_period(n),
            Self::Kama {
                er_window,
                fast,
                slow,
            } => {
                validate_period(er_window)?;
                validate_period(fast)?;
                validate_period(slow)
            }
            Self::T3 {
                span,
                volume_factor,
            } => {
                validate_period(span)?;
                if (0.0..=1.0).contains(&volume_factor) {
                    Ok(())
                } else {
                    Err(Error::InvalidParameter {
                        name: "volume_factor",
                        value: volume_factor.to_string(),
                        reason: "must be in [0, 1]",
                    })
                }
            }
        }
    }

    /// Smooths `series`.
    ///
    /// # Errors
    ///
    /// Returns the configuration errors of [`validate`](Self::validate).
    pub fn apply<T: SeriesElement>(&self, series: &Series<T>) -> Result<Series<T>> {
        self.validate()?;
        match *self {
            Self::Sma(n) => evaluate(series, Window::new(n)?, Reducer::Mean),
            Self::Ema(n) => Ok(ExponentialFilter::span(n)?.apply(series)),
            Self::Smma(n) => Ok(ExponentialFilter::wilder(n)?.apply(series)),
            Self::Wma(n) => wma(series, n),
            Self::Dema(n) => {
                let ema = ExponentialFilter::span(n)?;
                let e1 = ema.apply(series);
                let e2 = ema.apply(&e1);
                (&e1 * T::two()).try_sub(&e2)
            }
            Self::Tema(n) => {
                let ema = ExponentialFilter::span(n)?;
                let e1 = ema.apply(series);
                let e2 = ema.apply(&e1);
                let e3 = ema.apply(&e2);
                let three = T::from_usize(3)?;
                (&e1 * three).try_sub(&(&e2 * three))?.try_add(&e3)
            }
            Self::Trima(n) => {
                let first = n / 2 + n % 2;
                let second = n - first + 1;
                let inner = evaluate(series, Window::new(first)?, Reducer::Mean)?;
                evaluate(&inner, Window::new(second)?, Reducer::Mean)
            }
            Self::Kama {
                er_window,
                fast,
                slow,
            } => Ok(AdaptiveFilter::new(er_window, fast, slow)?.apply(series)),
            Self::T3 {
                span,
                volume_factor,
            } => t3(series, span, T::from_f64(volume_factor)?),
        }
    }
}

fn wma<T: SeriesElement>(series: &Series<T>, n: usize) -> Result<Series<T>> {
    let window = Window::new(n)?;
    if n > series.len() {
        return Ok(series.derive(vec![T::nan(); series.len()]));
    }
    let weights = (1..=n).map(T::from_usize).collect::<Result<Vec<T>>>()?;
    let total = T::from_usize(n)? * T::from_usize(checked_period(n, 1)?)? / T::two();
    Ok(apply(series, window, |w| {
        w.iter()
            .zip(&weights)
            .fold(T::zero(), |acc, (&v, &weight)| acc + v * weight)
            / total
    }))
}

fn t3<T: SeriesElement>(series: &Series<T>, span: usize, v: T) -> Result<Series<T>> {
    let ema = ExponentialFilter::span(span)?;
    let mut chain = Vec::with_capacity(6);
    let mut current = series.clone();
    for _ in 0..6 {
        current = ema.apply(&current);
        chain.push(current.clone());
    }

    let three = T::from_usize(3)?;
    let six = T::from_usize(6)?;
    let (v2, v3) = (v * v, v * v * v);
    let c1 = -v3;
    let c2 = three * v2 + three * v3;
    let c3 = -six * v2 - three * v - three * v3;
    let c4 = T::one() + three * v + v3 + three * v2;

    (&chain[5] * c1)
        .try_add(&(&chain[4] * c2))?
        .try_add(&(&chain[3] * c3))?
        .try_add(&(&chain[2] * c4))
}

impl fmt::Display for MovingAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sma(n) => write!(f, "sma:{n}"),
            Self::Ema(n) => write!(f, "ema:{n}"),
            Self::Smma(n) => write!(f, "smma:{n}"),
            Self::Wma(n) => write!(f, "wma:{n}"),
            Self::Dema(n) => write!(f, "dema:{n}"),
            Self::Tema(n) => write!(f, "tema:{n}"),
            Self::Trima(n) => write!(f, "trima:{n}"),
            Self::Kama {
                er_window,
                fast,
                slow,
            } => write!(f, "kama:{er_window},{fast},{slow}"),
            Self::T3 {
                span,
                volume_factor,
            } => write!(f, "t3:{span},{volume_factor}"),
        }
    }
}

impl FromStr for MovingAverage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || Error::UnknownMethod {
            name: s.to_string(),
        };
        let lower = s.trim().to_ascii_lowercase();
        let (kind, params) = lower.split_once(':').ok_or_else(unknown)?;
        let params: Vec<&str> = params.split(',').map(str::trim).collect();

        let int = |i: usize| -> Result<Option<usize>> {
            params
                .get(i)
                .map(|p| p.parse::<usize>().map_err(|_| unknown()))
                .transpose()
        };
        let size = || -> Result<usize> { int(0)?.ok_or_else(unknown) };
        let single = |make: fn(usize) -> Self| -> Result<Self> {
            if params.len() != 1 {
                return Err(unknown());
            }
            Ok(make(size()?))
        };

        let ma = match kind {
            "sma" => single(Self::Sma)?,
            "ema" => single(Self::Ema)?,
            "smma" | "wilder" => single(Self::Smma)?,
            "wma" => single(Self::Wma)?,
            "dema" => single(Self::Dema)?,
            "tema" => single(Self::Tema)?,
            "trima" => single(Self::Trima)?,
            "kama" if matches!(params.len(), 1 | 3) => Self::Kama {
                er_window: size()?,
                fast: int(1)?.unwrap_or(KAMA_FAST),
                slow: int(2)?.unwrap_or(KAMA_SLOW),
            },
            "t3" if params.len() <= 2 => Self::T3 {
                span: size()?,
                volume_factor: params
                    .get(1)
                    .map(|p| p.parse::<f64>().map_err(|_| unknown()))
                    .transpose()?
                    .unwrap_or(T3_VOLUME_FACTOR),
            },
            _ => return Err(unknown()),
        };
        ma.validate()?;
        Ok(ma)
    }
}
