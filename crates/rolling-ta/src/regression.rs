//! Rolling least-squares linear regression.
//!
//! Each window is fitted once with `y = m·x + b` over `x = 0..len-1`, where
//! `len` is the number of observations in the (possibly clipped) window.
//! Slope, intercept, fitted endpoint, forecast, angle and correlation are
//! all read off that single fit.
//!
//! # Mathematical Conventions
//!
//! - `endpoint = m·(len-1) + b` (the fitted value at the newest point)
//! - `forecast = m·(len+h-1) + b` for horizon `h`
//! - `angle = atan(m)` in degrees
//! - windows with fewer than 2 points, or with a missing value, are missing
//!
//! The fit centres `x` on its mean, so `Σ(x - x̄)² = len·(len²-1)/12` is
//! closed-form and each window costs one pass over `y`.
//!
//! # Example
//!
//! ```
//! use rolling_ta::regression::linear_regression;
//! use rolling_ta::{Series, Window};
//!
//! let y = Series::new(vec![1.0_f64, 3.0, 5.0, 7.0, 9.0]);
//! let out = linear_regression(&y, Window::new(3).unwrap(), 1).unwrap();
//!
//! assert!((out.slope[4] - 2.0).abs() < 1e-12);
//! assert!((out.endpoint[4] - 9.0).abs() < 1e-12);
//! assert!((out.forecast[4] - 11.0).abs() < 1e-12);
//! ```

use crate::error::{Error, Result};
use crate::kernels::running_stat::count_as;
use crate::missing::finite_or_missing;
use crate::series::Series;
use crate::traits::SeriesElement;
use crate::window::Window;

/// Ordinary least-squares fit of one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionFit<T> {
    /// Slope `m`.
    pub slope: T,
    /// Intercept `b` at `x = 0` (the oldest point of the window).
    pub intercept: T,
    /// Pearson correlation between `x` and `y`; missing if `y` is constant.
    pub r_value: T,
    /// Number of points fitted.
    pub len: usize,
}

impl<T: SeriesElement> RegressionFit<T> {
    /// Fits `y` against `x = 0..y.len()`.
    ///
    /// Fewer than two points, or any missing value, gives an undefined fit
    /// whose fields are all missing.
    #[must_use]
    pub fn fit(y: &[T]) -> Self {
        let len = y.len();
        if len < 2 || y.iter().any(|v| v.is_nan()) {
            return Self::undefined(len);
        }

        let n = count_as::<T>(len);
        let x_mean = (n - T::one()) / T::two();
        let y_mean = y.iter().fold(T::zero(), |acc, &v| acc + v) / n;

        let mut sxy = T::zero();
        let mut syy = T::zero();
        for (i, &v) in y.iter().enumerate() {
            let dx = count_as::<T>(i) - x_mean;
            let dy = v - y_mean;
            sxy = sxy + dx * dy;
            syy = syy + dy * dy;
        }
        let sxx = n * (n * n - T::one()) / count_as::<T>(12);

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;
        let r_value = if syy > T::zero() {
            (sxy / (sxx * syy).sqrt()).max(-T::one()).min(T::one())
        } else {
            T::nan()
        };

        Self {
            slope,
            intercept,
            r_value,
            len,
        }
    }

    fn undefined(len: usize) -> Self {
        Self {
            slope: T::nan(),
            intercept: T::nan(),
            r_value: T::nan(),
            len,
        }
    }

    /// Returns `true` if the fit produced a line.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        !self.slope.is_nan()
    }

    /// Fitted value at `x`.
    #[must_use]
    pub fn value_at(&self, x: T) -> T {
        self.slope * x + self.intercept
    }

    /// Fitted value at the newest point, `m·(len-1) + b`.
    #[must_use]
    pub fn endpoint(&self) -> T {
        self.value_at(count_as::<T>(self.len.saturating_sub(1)))
    }

    /// Projected value `horizon` steps past the newest point.
    #[must_use]
    pub fn forecast(&self, horizon: usize) -> T {
        self.value_at(count_as::<T>(self.len) + count_as::<T>(horizon) - T::one())
    }

    /// Slope angle in degrees.
    #[must_use]
    pub fn angle_degrees(&self) -> T {
        self.slope.atan().to_degrees()
    }
}

/// Every quantity of a rolling regression, aligned with the input.
#[derive(Debug, Clone)]
pub struct RegressionOutput<T> {
    /// Slope of each window.
    pub slope: Series<T>,
    /// Intercept of each window, at the window's oldest point.
    pub intercept: Series<T>,
    /// Fitted value at each window's newest point.
    pub endpoint: Series<T>,
    /// Projection `horizon` steps ahead.
    pub forecast: Series<T>,
    /// Slope angle in degrees.
    pub angle: Series<T>,
    /// Pearson correlation of each window.
    pub r_value: Series<T>,
}

/// Fits every trailing window of `series` and projects `horizon` steps ahead.
///
/// # Errors
///
/// Returns `Error::InvalidParameter` if the window size plus `horizon`
/// overflows and `Error::NumericConversion` if it cannot be represented in
/// `T`.
pub fn linear_regression<T: SeriesElement>(
    series: &Series<T>,
    window: Window,
    horizon: usize,
) -> Result<RegressionOutput<T>> {
    let reach = window.size().checked_add(horizon).ok_or_else(|| Error::InvalidParameter {
        name: "horizon",
        value: horizon.to_string(),
        reason: "window size plus horizon overflows",
    })?;
    T::from_usize(reach)?;

    let data = series.values();
    let n = data.len();
    let mut slope = vec![T::nan(); n];
    let mut intercept = vec![T::nan(); n];
    let mut endpoint = vec![T::nan(); n];
    let mut forecast = vec![T::nan(); n];
    let mut angle = vec![T::nan(); n];
    let mut r_value = vec![T::nan(); n];

    for t in 0..n {
        if !window.is_ready(t) {
            continue;
        }
        let fit = RegressionFit::fit(&data[window.start(t)..=t]);
        if !fit.is_defined() {
            continue;
        }
        slope[t] = finite_or_missing(fit.slope);
        intercept[t] = finite_or_missing(fit.intercept);
        endpoint[t] = finite_or_missing(fit.endpoint());
        forecast[t] = finite_or_missing(fit.forecast(horizon));
        angle[t] = finite_or_missing(fit.angle_degrees());
        r_value[t] = finite_or_missing(fit.r_value);
    }

    Ok(RegressionOutput {
        slope: series.derive(slope),
        intercept: series.derive(intercept),
        endpoint: series.derive(endpoint),
        forecast: series.derive(forecast),
        angle: series.derive(angle),
        r_value: series.derive(r_value),
    })
}

/// Rolling regression slope.
///
/// # Errors
///
/// See [`linear_regression`].
pub fn slope<T: SeriesElement>(series: &Series<T>, window: Window) -> Result<Series<T>> {
    Ok(linear_regression(series, window, 0)?.slope)
}

/// Rolling regression intercept.
///
/// # Errors
///
/// See [`linear_regression`].
pub fn intercept<T: SeriesElement>(series: &Series<T>, window: Window) -> Result<Series<T>> {
    Ok(linear_regression(series, window, 0)?.intercept)
}

/// Rolling fitted endpoint (TA-Lib `LINEARREG`).
///
/// # Errors
///
/// See [`linear_regression`].
pub fn endpoint<T: SeriesElement>(series: &Series<T>, window: Window) -> Result<Series<T>> {
    Ok(linear_regression(series, window, 0)?.endpoint)
}

/// Rolling forecast `horizon` steps ahead; `horizon = 1` is TA-Lib `TSF`.
///
/// # Errors
///
/// See [`linear_regression`].
pub fn forecast<T: SeriesElement>(
    series: &Series<T>,
    window: Window,
    horizon: usize,
) -> Result<Series<T>> {
    Ok(linear_regression(series, window, horizon)?.forecast)
}

/// Rolling slope angle in degrees.
///
/// # Errors
///
/// See [`linear_regression`].
pub fn angle<T: SeriesElement>(series: &Series<T>, window: Window) -> Result<Series<T>> {
    Ok(linear_regression(series, window, 0)?.angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::EPSILON;

    fn approx_eq(a: f64, b: f64) -> bool {
        crate::utils::approx_eq(a, b, EPSILON)
    }

    #[test]
    fn test_fit_exact_line() {
        let y: Vec<f64> = (0..6).map(|x| 3.0 * f64::from(x) - 2.0).collect();
        let fit = RegressionFit::fit(&y);
        assert!(approx_eq(fit.slope, 3.0));
        assert!(approx_eq(fit.intercept, -2.0));
        assert!(approx_eq(fit.r_value, 1.0));
        assert!(approx_eq(fit.endpoint(), 13.0));
        assert!(approx_eq(fit.forecast(2), 19.0));
    }

    #[test]
    fn test_fit_constant() {
        let fit = RegressionFit::fit(&[4.0_f64, 4.0, 4.0]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 4.0);
        assert!(fit.r_value.is_nan());
        assert_eq!(fit.angle_degrees(), 0.0);
    }

    #[test]
    fn test_fit_too_few_points() {
        assert!(!RegressionFit::fit(&[1.0_f64]).is_defined());
        assert!(!RegressionFit::<f64>::fit(&[]).is_defined());
        assert!(!RegressionFit::fit(&[1.0_f64, f64::NAN, 2.0]).is_defined());
    }

    #[test]
    fn test_angle() {
        let fit = RegressionFit::fit(&[0.0_f64, 1.0, 2.0]);
        assert!(approx_eq(fit.angle_degrees(), 45.0));
    }

    #[test]
    fn test_rolling_warm_up() {
        let s = Series::new(vec![1.0_f64, 2.0, 4.0, 8.0]);
        let out = linear_regression(&s, Window::new(3).unwrap(), 1).unwrap();
        assert!(out.slope[0].is_nan() && out.slope[1].is_nan());
        // y = [1, 2, 4]: slope 1.5, intercept 5/6
        assert!(approx_eq(out.slope[2], 1.5));
        assert!(approx_eq(out.intercept[2], 5.0 / 6.0));
        assert!(approx_eq(out.endpoint[2], 3.0 + 5.0 / 6.0));
        assert!(approx_eq(out.forecast[2], 4.5 + 5.0 / 6.0));
    }

    #[test]
    fn test_partial_windows_need_two_points() {
        let s = Series::new(vec![5.0_f64, 7.0, 9.0]);
        let w = Window::with_min_periods(3, 1).unwrap();
        let out = linear_regression(&s, w, 0).unwrap();
        assert!(out.slope[0].is_nan());
        assert!(approx_eq(out.slope[1], 2.0));
        assert!(approx_eq(out.endpoint[1], 7.0));
        assert!(approx_eq(out.endpoint[2], 9.0));
    }

    #[test]
    fn test_single_output_helpers_agree() {
        let s = Series::new(vec![3.0_f64, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
        let w = Window::new(4).unwrap();
        let all = linear_regression(&s, w, 3).unwrap();
        assert_eq!(slope(&s, w).unwrap().count_missing(), 3);
        for t in 3..s.len() {
            assert!(approx_eq(slope(&s, w).unwrap()[t], all.slope[t]));
            assert!(approx_eq(intercept(&s, w).unwrap()[t], all.intercept[t]));
            assert!(approx_eq(endpoint(&s, w).unwrap()[t], all.endpoint[t]));
            assert!(approx_eq(forecast(&s, w, 3).unwrap()[t], all.forecast[t]));
            assert!(approx_eq(angle(&s, w).unwrap()[t], all.angle[t]));
        }
    }

    #[test]
    fn test_oversized_horizon_is_rejected() {
        let s = Series::new(vec![1.0_f64, 2.0, 3.0]);
        assert!(matches!(
            linear_regression(&s, Window::new(2).unwrap(), usize::MAX),
            Err(Error::InvalidParameter { name: "horizon", .. })
        ));
    }

    #[test]
    fn test_overflowing_fit_is_missing() {
        let s = Series::new(vec![-1e308_f64, 1e308]);
        let out = linear_regression(&s, Window::new(2).unwrap(), 1).unwrap();
        assert!(out.slope[1].is_nan());
        assert!(out.intercept[1].is_nan());
        assert!(out.endpoint[1].is_nan());
        assert!(out.forecast[1].is_nan());
        for values in [&out.slope, &out.intercept, &out.angle, &out.r_value] {
            assert!(values.iter().all(|v| v.is_finite() || v.is_nan()));
        }
    }
}
