//! rolling-ta: sliding-window evaluation engine for technical analysis
//!
//! This crate provides the numerical core shared by technical indicators:
//! rolling statistics, exponential smoothing filters, adaptive and
//! multi-field recurrences, and rolling linear regression, all over an
//! index-aligned [`Series`] with explicit missing-value semantics.
//!
//! # Features
//!
//! - **Alignment**: every primitive returns a series of the input's length,
//!   with missing values (NaN) wherever history is insufficient
//! - **No numeric panics**: division by zero, `0/0` and out-of-domain
//!   logs resolve to missing; only configuration errors are returned
//! - **Incremental kernels**: O(1) Welford updates and O(n) monotonic-deque
//!   extrema
//! - **Generics**: works with both `f32` and `f64`
//!
//! # Quick Start
//!
//! ```
//! use rolling_ta::prelude::*;
//!
//! let close = Series::new(vec![10.0_f64, 11.0, 12.0, 11.0, 10.0, 9.0, 10.0, 11.0, 12.0, 13.0]);
//! let sma = evaluate(&close, Window::new(3).unwrap(), Reducer::Mean).unwrap();
//!
//! // Warm-up
//! assert!(sma[0].is_nan());
//! assert!(sma[1].is_nan());
//! assert!((sma[2] - 11.0).abs() < 1e-10);
//! assert!((sma[9] - 12.0).abs() < 1e-10);
//! ```
//!
//! # Modules
//!
//! - [`series`]: the [`Series`] value type and elementwise operations
//! - [`rolling`]: windowed reducers, arbitrary window callables, cov/corr
//! - [`recurrence`]: EMA family, Kaufman adaptive filter, parabolic SAR
//! - [`regression`]: per-window least-squares fit
//! - [`moving_average`]: the moving-average family as one enum
//! - [`ohlcv`]: canonical field resolution for tabular input
//! - [`batch`]: fan-out of independent jobs (Rayon with `parallel`)
//!
//! # Error Handling
//!
//! Invalid configuration is rejected before any computation:
//!
//! ```
//! use rolling_ta::{Error, Window};
//!
//! assert!(matches!(Window::new(0), Err(Error::InvalidPeriod { .. })));
//! assert!(matches!(
//!     Window::with_min_periods(5, 6),
//!     Err(Error::InvalidMinPeriods { .. })
//! ));
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::nursery)]
#![warn(clippy::needless_collect)]
#![warn(clippy::or_fun_call)]
#![warn(clippy::inefficient_to_string)]
#![warn(clippy::useless_conversion)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod error;
pub mod kernels;
pub mod missing;
pub mod moving_average;
pub mod ohlcv;
pub mod prelude;
pub mod recurrence;
pub mod regression;
pub mod rolling;
pub mod series;
pub mod traits;
pub mod utils;
pub mod window;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use series::Series;
pub use traits::SeriesElement;
pub use utils::{approx_eq, approx_eq_relative, count_nan_prefix, count_nans, EPSILON, LOOSE_EPSILON};
pub use window::Window;
