//! Dispatch of a parsed command onto the library.

use rolling_ta::moving_average::MovingAverage;
use rolling_ta::ohlcv::Field;
use rolling_ta::recurrence::{AdaptiveFilter, Adjust, ExponentialFilter, ParabolicSar, Smoothing};
use rolling_ta::regression::linear_regression;
use rolling_ta::rolling::{evaluate, Reducer};
use rolling_ta::{Series, Window};

use crate::args::{parse_field, parse_kama_params, parse_sar_params, Args, Command, EmaMode, SeriesOptions};
use crate::csv_parser::{parse_csv, PriceTable};
use crate::csv_writer::{write_to, OutputDest, OutputTable};
use crate::error::Result;

/// Runs `args` end to end: read, compute, write.
///
/// # Errors
///
/// Returns any I/O, parse, argument or library error.
pub fn run(args: &Args) -> Result<()> {
    let input = args.input_path();
    tracing::info!(input, "reading price table");
    let table = parse_csv(input)?;

    let output = execute(&args.command, &table)?;
    tracing::debug!(
        rows = output.len(),
        columns = output.columns.len(),
        "computed output"
    );

    write_to(&output, &OutputDest::from_option(args.output_path()))
}

/// Computes the output of `command` over an already parsed `table`.
///
/// # Errors
///
/// Returns argument errors (unknown field, malformed parameters) and
/// library configuration errors.
pub fn execute(command: &Command, table: &PriceTable) -> Result<OutputTable> {
    let columns = match command {
        Command::Rolling {
            reducer,
            size,
            min_periods,
            options,
            ..
        } => {
            let reducer: Reducer = reducer.parse()?;
            let window = match *min_periods {
                Some(m) => Window::with_min_periods(*size, m)?,
                None => Window::new(*size)?,
            };
            let (field, series) = select(table, options)?;
            tracing::debug!(%reducer, size, %field, "rolling");
            vec![(
                format!("{}_{size}", reducer.to_string().replace(':', "_")),
                evaluate(series, window, reducer)?,
            )]
        }
        Command::Ema {
            span,
            mode,
            options,
            ..
        } => {
            let filter = match mode {
                EmaMode::NoAdjust => ExponentialFilter::new(Smoothing::Span(*span), Adjust::NoAdjust)?,
                EmaMode::Adjust => ExponentialFilter::new(Smoothing::Span(*span), Adjust::Adjust)?,
                EmaMode::Wilder => ExponentialFilter::wilder(*span)?,
            };
            let (_, series) = select(table, options)?;
            tracing::debug!(span, ?mode, alpha = filter.alpha(), "ema");
            vec![(format!("ema_{span}"), filter.apply(series))]
        }
        Command::Kama {
            params, options, ..
        } => {
            let (er_window, fast, slow) = parse_kama_params(params)?;
            let filter = AdaptiveFilter::new(er_window, fast, slow)?;
            let (_, series) = select(table, options)?;
            vec![(format!("kama_{er_window}"), filter.apply(series))]
        }
        Command::Linreg {
            size,
            horizon,
            options,
            ..
        } => {
            let (_, series) = select(table, options)?;
            let fit = linear_regression(series, Window::new(*size)?, *horizon)?;
            vec![
                ("slope".to_string(), fit.slope),
                ("intercept".to_string(), fit.intercept),
                ("endpoint".to_string(), fit.endpoint),
                (format!("forecast_{horizon}"), fit.forecast),
                ("angle".to_string(), fit.angle),
                ("r".to_string(), fit.r_value),
            ]
        }
        Command::Ma { spec, options, .. } => {
            let method: MovingAverage = spec.parse()?;
            let (_, series) = select(table, options)?;
            tracing::debug!(%method, "moving average");
            vec![(method.to_string().replace([':', ','], "_"), method.apply(series)?)]
        }
        Command::Sar { params, .. } => {
            let (start, increment, max) = parse_sar_params(params)?;
            let sar = ParabolicSar::new(start, increment, max)?;
            table.ohlcv.require(&[Field::High, Field::Low])?;
            vec![(
                "sar".to_string(),
                sar.apply(table.ohlcv.high()?, table.ohlcv.low()?)?,
            )]
        }
    };

    Ok(OutputTable {
        dates: table.dates.clone(),
        columns,
    })
}

fn select<'a>(table: &'a PriceTable, options: &SeriesOptions) -> Result<(Field, &'a Series<f64>)> {
    let field = parse_field(&options.field)?;
    Ok((field, table.ohlcv.get(field)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_parser::parse_csv_from_reader;
    use crate::error::CliError;
    use clap::Parser;

    const CSV: &str = "Date,Open,HIGH,low,Close,Volume\n\
        d1,10,10.5,9.8,10,100\n\
        d2,10,11.2,10.4,11,100\n\
        d3,11,12.0,11.1,12,100\n\
        d4,12,12.6,11.9,11,100\n\
        d5,11,12.4,11.6,10,100\n\
        d6,10,11.8,10.9,9,100\n\
        d7,9,11.0,10.2,10,100\n\
        d8,10,10.6,9.7,11,100\n\
        d9,11,10.9,10.1,12,100\n\
        d10,12,11.7,10.8,13,100\n";

    fn table() -> PriceTable {
        parse_csv_from_reader(CSV.as_bytes()).unwrap()
    }

    fn command(args: &[&str]) -> Command {
        let mut full = vec!["rolling-ta"];
        full.extend_from_slice(args);
        Args::try_parse_from(full).unwrap().command
    }

    #[test]
    fn test_rolling_mean_scenario() {
        let out = execute(&command(&["rolling", "in.csv", "mean", "3"]), &table()).unwrap();
        assert_eq!(out.len(), 10);
        assert_eq!(out.columns[0].0, "mean_3");
        let sma = &out.columns[0].1;
        assert!(sma[0].is_nan() && sma[1].is_nan());
        assert!((sma[2] - 11.0).abs() < 1e-10);
        assert!((sma[9] - 12.0).abs() < 1e-10);
        assert_eq!(out.dates.as_ref().map(Vec::len), Some(10));
    }

    #[test]
    fn test_field_selection() {
        let out = execute(&command(&["rolling", "in.csv", "max", "2", "--field", "high"]), &table()).unwrap();
        assert_eq!(out.columns[0].1[1], 11.2);

        let err = execute(&command(&["rolling", "in.csv", "max", "2", "--field", "date"]), &table());
        assert!(matches!(err, Err(CliError::InvalidArgument { .. })));
    }

    #[test]
    fn test_ema_modes() {
        let first = |mode: &str| {
            let out = execute(&command(&["ema", "in.csv", "3", "--mode", mode]), &table()).unwrap();
            out.columns[0].1[1]
        };
        assert!((first("no-adjust") - 10.5).abs() < 1e-12);
        assert!((first("adjust") - (10.0 + 1.0 / 1.5)).abs() < 1e-12);
        assert!((first("wilder") - (10.0 + 1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_linreg_columns() {
        let out = execute(&command(&["linreg", "in.csv", "4", "--horizon", "2"]), &table()).unwrap();
        let names: Vec<&str> = out.columns.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["slope", "intercept", "endpoint", "forecast_2", "angle", "r"]);
        assert!(out.columns.iter().all(|(_, s)| s.len() == 10));
    }

    #[test]
    fn test_ma_spec() {
        let out = execute(&command(&["ma", "in.csv", "wma:3"]), &table()).unwrap();
        assert_eq!(out.columns[0].0, "wma_3");

        let err = execute(&command(&["ma", "in.csv", "hull:3"]), &table());
        assert!(matches!(err, Err(CliError::Library(rolling_ta::Error::UnknownMethod { .. }))));
    }

    #[test]
    fn test_sar_requires_high_low() {
        let out = execute(&command(&["sar", "in.csv"]), &table()).unwrap();
        assert_eq!(out.columns[0].1[0], 9.8);

        let close_only = parse_csv_from_reader("close\n1\n2\n".as_bytes()).unwrap();
        let err = execute(&command(&["sar", "in.csv"]), &close_only);
        assert!(matches!(
            err,
            Err(CliError::Library(rolling_ta::Error::MissingField { field: "High" }))
        ));
    }

    #[test]
    fn test_kama_invalid_params() {
        let err = execute(&command(&["kama", "in.csv", "10,0,30"]), &table());
        assert!(matches!(err, Err(CliError::Library(rolling_ta::Error::InvalidPeriod { .. }))));
    }
}
