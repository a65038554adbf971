//! Property-based tests using proptest.
//!
//! These verify invariants that must hold for arbitrary inputs, including
//! inputs with scattered missing values.

use proptest::prelude::*;

use rolling_ta::kernels::rolling_extrema::rolling_extrema_naive;
use rolling_ta::kernels::Extremum;
use rolling_ta::prelude::*;
use rolling_ta::{approx_eq, approx_eq_relative, LOOSE_EPSILON};

// ==================== Test Data Generators ====================

/// Random positive price series.
fn arb_price_series(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..1000.0_f64, min_len..=max_len)
}

/// Random price series where roughly one value in ten is missing.
fn arb_gappy_series(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![9 => (1.0..1000.0_f64), 1 => Just(f64::NAN)],
        min_len..=max_len,
    )
}

/// Mostly small prices with occasional spikes eight orders of magnitude larger.
fn arb_spiky_series(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![8 => (1.0..10.0_f64), 1 => (1e8..1e9_f64)],
        min_len..=max_len,
    )
}

fn two_pass_sample_variance(w: &[f64]) -> f64 {
    let n = w.len() as f64;
    let mean = w.iter().sum::<f64>() / n;
    w.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0)
}

fn close_enough(a: f64, b: f64) -> bool {
    approx_eq(a, b, LOOSE_EPSILON) || approx_eq_relative(a, b, LOOSE_EPSILON)
}

fn same(a: f64, b: f64, eps: f64) -> bool {
    (a.is_nan() && b.is_nan()) || (a - b).abs() <= eps * a.abs().max(b.abs()).max(1.0)
}

// ==================== Rolling windows ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Every reducer returns one value per input.
    #[test]
    fn prop_rolling_output_length(data in arb_gappy_series(0, 80), size in 1usize..=12) {
        let s = Series::new(data);
        let window = Window::new(size).unwrap();
        for reducer in [Reducer::Mean, Reducer::Sum, Reducer::Max, Reducer::Median, Reducer::ArgMin] {
            prop_assert_eq!(evaluate(&s, window, reducer).unwrap().len(), s.len());
        }
    }

    /// A window is missing exactly when it is short or holds a missing value.
    #[test]
    fn prop_rolling_missing_pattern(
        data in arb_gappy_series(1, 80),
        size in 1usize..=10,
        min_periods in 1usize..=10,
    ) {
        let min_periods = min_periods.min(size);
        let window = Window::with_min_periods(size, min_periods).unwrap();
        let out = evaluate(&Series::new(data.clone()), window, Reducer::Mean).unwrap();
        for t in 0..data.len() {
            let slice = &data[window.start(t)..=t];
            let expect_missing = slice.len() < min_periods || slice.iter().any(|v| v.is_nan());
            prop_assert_eq!(out[t].is_nan(), expect_missing, "t={}", t);
        }
    }

    /// Sliding moments agree with recomputing each window.
    #[test]
    fn prop_sliding_mean_matches_recompute(data in arb_gappy_series(1, 120), size in 1usize..=15) {
        let s = Series::new(data);
        let window = Window::new(size).unwrap();
        let fast = evaluate(&s, window, Reducer::Mean).unwrap();
        let slow = apply(&s, window, |w| w.iter().sum::<f64>() / w.len() as f64);
        for t in 0..s.len() {
            prop_assert!(same(fast[t], slow[t], 1e-9), "t={}: {} vs {}", t, fast[t], slow[t]);
        }
    }

    /// Large values leave no residue in the sliding moments once they exit.
    #[test]
    fn prop_sliding_moments_survive_spikes(data in arb_spiky_series(2, 120), size in 2usize..=12) {
        let s = Series::new(data);
        let window = Window::new(size).unwrap();
        let var = evaluate(&s, window, Reducer::Variance(Estimator::Sample)).unwrap();
        let sum = evaluate(&s, window, Reducer::Sum).unwrap();
        let var_ref = apply(&s, window, two_pass_sample_variance);
        let sum_ref = apply(&s, window, |w| w.iter().sum::<f64>());
        for t in 0..s.len() {
            prop_assert!(close_enough(var[t], var_ref[t]), "var t={}: {} vs {}", t, var[t], var_ref[t]);
            prop_assert!(close_enough(sum[t], sum_ref[t]), "sum t={}: {} vs {}", t, sum[t], sum_ref[t]);
        }
    }

    /// Variance is never negative.
    #[test]
    fn prop_variance_non_negative(data in arb_price_series(2, 120), size in 2usize..=15) {
        let s = Series::new(data);
        let var = evaluate(&s, Window::new(size).unwrap(), Reducer::Variance(Estimator::Population)).unwrap();
        for v in var.iter().filter(|v| !v.is_nan()) {
            prop_assert!(*v >= 0.0);
        }
    }

    /// Deque extrema equal the naive scan.
    #[test]
    fn prop_extrema_match_naive(data in arb_gappy_series(0, 100), size in 1usize..=20) {
        let window = Window::new(size).unwrap();
        let s = Series::new(data.clone());
        let max = evaluate(&s, window, Reducer::Max).unwrap();
        let min = evaluate(&s, window, Reducer::Min).unwrap();
        let naive_max = rolling_extrema_naive(&data, window, Extremum::Max);
        let naive_min = rolling_extrema_naive(&data, window, Extremum::Min);
        for t in 0..data.len() {
            prop_assert!(same(max[t], naive_max[t], 0.0));
            prop_assert!(same(min[t], naive_min[t], 0.0));
        }
    }

    /// Mean lies between min and max of the window.
    #[test]
    fn prop_mean_bounded_by_extrema(data in arb_price_series(1, 80), size in 1usize..=10) {
        let s = Series::new(data);
        let window = Window::new(size).unwrap();
        let mean = evaluate(&s, window, Reducer::Mean).unwrap();
        let lo = evaluate(&s, window, Reducer::Min).unwrap();
        let hi = evaluate(&s, window, Reducer::Max).unwrap();
        for t in (size - 1)..s.len() {
            prop_assert!(mean[t] >= lo[t] - 1e-9 && mean[t] <= hi[t] + 1e-9);
        }
    }

    /// Correlation stays within [-1, 1].
    #[test]
    fn prop_corr_bounded(
        pairs in prop::collection::vec((1.0..100.0_f64, 1.0..100.0_f64), 2..60),
        size in 2usize..=10,
    ) {
        let (a, b): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let rho = corr(&Series::new(a), &Series::new(b), Window::new(size).unwrap()).unwrap();
        for r in rho.iter().filter(|v| !v.is_nan()) {
            prop_assert!((-1.0..=1.0).contains(r));
        }
    }
}

// ==================== Recurrences ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// EMA seeds at the first value and stays within the input range.
    #[test]
    fn prop_ema_bounded(data in arb_price_series(1, 150), span in 1usize..=30, adjust in any::<bool>()) {
        let adjust = if adjust { Adjust::Adjust } else { Adjust::NoAdjust };
        let ema = ExponentialFilter::new(Smoothing::Span(span), adjust).unwrap().apply(&Series::new(data.clone()));
        let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(ema[0], data[0]);
        for v in ema.iter() {
            prop_assert!(*v >= lo - 1e-9 && *v <= hi + 1e-9);
        }
    }

    /// Leading missing inputs are warm-up, not poison.
    #[test]
    fn prop_ema_leading_missing(data in arb_price_series(1, 50), lead in 0usize..10, span in 1usize..=10) {
        let mut padded = vec![f64::NAN; lead];
        padded.extend_from_slice(&data);
        let ema = ExponentialFilter::span(span).unwrap();
        let shifted = ema.apply(&Series::new(padded));
        let plain = ema.apply(&Series::new(data));
        prop_assert_eq!(shifted.count_missing(), lead);
        for (i, v) in plain.iter().enumerate() {
            prop_assert_eq!(shifted[lead + i], *v);
        }
    }

    /// KAMA never leaves the input range after seeding.
    #[test]
    fn prop_kama_bounded(data in arb_price_series(12, 150), er_window in 1usize..=10) {
        let kama = AdaptiveFilter::new(er_window, 2, 30).unwrap().apply(&Series::new(data.clone()));
        let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(kama.count_missing(), er_window);
        for v in kama.iter().skip(er_window) {
            prop_assert!(*v >= lo - 1e-9 && *v <= hi + 1e-9);
        }
    }

    /// SAR is always defined and stays inside the price range seen so far.
    #[test]
    fn prop_sar_within_range(bars in prop::collection::vec((10.0..100.0_f64, 0.1..5.0_f64), 2..120)) {
        let high: Series<f64> = bars.iter().map(|&(base, range)| base + range).collect();
        let low: Series<f64> = bars.iter().map(|&(base, _)| base).collect();
        let sar = ParabolicSar::standard().unwrap().apply(&high, &low).unwrap();
        prop_assert_eq!(sar.count_missing(), 0);
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for t in 0..sar.len() {
            lo = lo.min(low[t]);
            hi = hi.max(high[t]);
            prop_assert!(sar[t] >= lo - 1e-9 && sar[t] <= hi + 1e-9, "t={}", t);
        }
    }
}

// ==================== Regression ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Any exact line is recovered by every full window.
    #[test]
    fn prop_regression_exact_line(
        slope in -10.0..10.0_f64,
        intercept in -100.0..100.0_f64,
        len in 3usize..60,
        size in 2usize..=10,
    ) {
        let line: Series<f64> = (0..len).map(|i| slope * i as f64 + intercept).collect();
        let fit = linear_regression(&line, Window::new(size).unwrap(), 1).unwrap();
        for t in (size - 1)..len {
            prop_assert!(same(fit.slope[t], slope, 1e-8));
            prop_assert!(same(fit.endpoint[t], line[t], 1e-8));
            prop_assert!(same(fit.forecast[t], line[t] + slope, 1e-8));
        }
    }
}
