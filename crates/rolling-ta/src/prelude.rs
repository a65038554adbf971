//! Commonly used types and traits for convenient importing.
//!
//! ```
//! use rolling_ta::prelude::*;
//!
//! let close = Series::new(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0]);
//! let window = Window::new(3).unwrap();
//!
//! let sma = evaluate(&close, window, Reducer::Mean).unwrap();
//! let ema = ExponentialFilter::span(3).unwrap().apply(&close);
//! let fit = linear_regression(&close, window, 1).unwrap();
//!
//! assert_eq!(sma.len(), ema.len());
//! assert!((fit.slope[4] - 1.0).abs() < 1e-12);
//! ```

// Error types
pub use crate::error::{Error, Result};

// Core values
pub use crate::series::Series;
pub use crate::traits::SeriesElement;
pub use crate::window::Window;

// Primitives
pub use crate::recurrence::{
    AdaptiveFilter, Adjust, ExponentialFilter, ParabolicSar, Recurrence, Seed, Smoothing,
};
pub use crate::regression::{linear_regression, RegressionFit, RegressionOutput};
pub use crate::rolling::{apply, corr, cov, evaluate, Estimator, Reducer};

// Selection and ingestion
pub use crate::moving_average::MovingAverage;
pub use crate::ohlcv::{Field, Ohlcv};
