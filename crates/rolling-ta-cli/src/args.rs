//! CLI argument parsing module.
//!
//! The CLI follows the pattern `rolling-ta <command> <input.csv> [params] [-o output.csv]`.
//!
//! # Examples
//!
//! ```bash
//! # 20-bar rolling sample standard deviation of the close
//! rolling-ta rolling prices.csv std 20
//!
//! # Rolling mean that starts emitting after 5 observations
//! rolling-ta rolling prices.csv mean 20 --min-periods 5
//!
//! # Bias-corrected EMA of the high, written to a file
//! rolling-ta ema prices.csv 10 --mode adjust --field high -o ema.csv
//!
//! # Kaufman adaptive moving average
//! rolling-ta kama prices.csv 10,2,30
//!
//! # Rolling regression with a one-step forecast
//! rolling-ta linreg prices.csv 14 --horizon 1
//!
//! # Any moving average by spec
//! rolling-ta ma prices.csv t3:5,0.7
//!
//! # Parabolic SAR
//! rolling-ta sar prices.csv 0.02,0.02,0.2
//! ```

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use rolling_ta::ohlcv::Field;

use crate::error::{CliError, Result};

/// rolling-ta: sliding-window technical analysis over CSV price tables
#[derive(Parser, Debug)]
#[command(name = "rolling-ta")]
#[command(author, version, about = "Sliding-window and recurrence primitives over CSV price data")]
#[command(long_about = "rolling-ta reads a CSV price table with a header row, resolves \
    the open/high/low/close/volume columns by name, runs one primitive and writes an \
    aligned CSV to stdout or a file. Missing values are written as empty cells.")]
pub struct Args {
    /// The primitive to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging (otherwise RUST_LOG, default warn)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Options shared by every single-series command.
#[derive(ClapArgs, Debug, Clone)]
pub struct SeriesOptions {
    /// Output CSV file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Price field to read (open, high, low, close, volume)
    #[arg(short, long, default_value = "close")]
    pub field: String,
}

/// EMA weighting presets.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmaMode {
    /// Recursive weights, `alpha = 2/(span+1)`
    NoAdjust,
    /// Bias-corrected weights, `alpha = 2/(span+1)`
    Adjust,
    /// Wilder smoothing, `alpha = 1/span`
    Wilder,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Rolling window reduction
    #[command(about = "Rolling window reduction (mean, sum, var, std, min, max, mad, median, argmax, argmin)")]
    Rolling {
        /// Input CSV file
        input: String,

        /// Reducer name, e.g. mean or std:pop
        reducer: String,

        /// Window size
        #[arg(default_value = "20")]
        size: usize,

        /// Minimum observations for a partial window (defaults to size)
        #[arg(long)]
        min_periods: Option<usize>,

        #[command(flatten)]
        options: SeriesOptions,
    },

    /// Exponential moving average
    #[command(about = "Exponential moving average (EMA)")]
    Ema {
        /// Input CSV file
        input: String,

        /// Span (or period for Wilder smoothing)
        #[arg(default_value = "20")]
        span: usize,

        /// Weighting preset
        #[arg(long, value_enum, default_value_t = EmaMode::NoAdjust)]
        mode: EmaMode,

        #[command(flatten)]
        options: SeriesOptions,
    },

    /// Kaufman adaptive moving average
    #[command(about = "Kaufman adaptive moving average (KAMA)")]
    Kama {
        /// Input CSV file
        input: String,

        /// Parameters: er_window,fast,slow (e.g., 10,2,30)
        #[arg(default_value = "10,2,30")]
        params: String,

        #[command(flatten)]
        options: SeriesOptions,
    },

    /// Rolling linear regression
    #[command(about = "Rolling linear regression (slope, intercept, endpoint, forecast, angle, r)")]
    Linreg {
        /// Input CSV file
        input: String,

        /// Window size
        #[arg(default_value = "14")]
        size: usize,

        /// Forecast horizon in bars
        #[arg(long, default_value = "1")]
        horizon: usize,

        #[command(flatten)]
        options: SeriesOptions,
    },

    /// Moving average by spec
    #[command(about = "Moving average by spec, e.g. sma:20, ema:12, kama:10,2,30, t3:5,0.7")]
    Ma {
        /// Input CSV file
        input: String,

        /// Method spec
        spec: String,

        #[command(flatten)]
        options: SeriesOptions,
    },

    /// Parabolic SAR
    #[command(about = "Parabolic stop-and-reverse (needs high and low columns)")]
    Sar {
        /// Input CSV file
        input: String,

        /// Parameters: start,increment,max (e.g., 0.02,0.02,0.2)
        #[arg(default_value = "0.02,0.02,0.2")]
        params: String,

        /// Output CSV file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Args {
    /// Get the input file path from the command.
    #[must_use]
    pub fn input_path(&self) -> &str {
        match &self.command {
            Command::Rolling { input, .. }
            | Command::Ema { input, .. }
            | Command::Kama { input, .. }
            | Command::Linreg { input, .. }
            | Command::Ma { input, .. }
            | Command::Sar { input, .. } => input,
        }
    }

    /// Get the output file path from the command, if specified.
    #[must_use]
    pub fn output_path(&self) -> Option<&str> {
        match &self.command {
            Command::Rolling { options, .. }
            | Command::Ema { options, .. }
            | Command::Kama { options, .. }
            | Command::Linreg { options, .. }
            | Command::Ma { options, .. } => options.output.as_deref(),
            Command::Sar { output, .. } => output.as_deref(),
        }
    }
}

/// Resolve the `--field` argument.
///
/// # Errors
///
/// Returns `CliError::InvalidArgument` if the name is not a price field.
pub fn parse_field(name: &str) -> Result<Field> {
    Field::resolve(name).ok_or_else(|| CliError::InvalidArgument {
        argument: "field".to_string(),
        reason: format!("unknown field '{name}'"),
        suggestion: Some("Use one of open, high, low, close, volume".to_string()),
    })
}

fn split_params<'a>(params: &'a str, name: &str, expected: usize, example: &str) -> Result<Vec<&'a str>> {
    let parts: Vec<&str> = params.split(',').map(str::trim).collect();
    if parts.len() != expected {
        return Err(CliError::InvalidArgument {
            argument: "params".to_string(),
            reason: format!("{name} requires {expected} parameters, got {}", parts.len()),
            suggestion: Some(format!("Use format: {example}")),
        });
    }
    Ok(parts)
}

/// Parse KAMA parameters from string "er_window,fast,slow".
///
/// # Errors
///
/// Returns `CliError::InvalidArgument` for a wrong count or a non-integer.
pub fn parse_kama_params(params: &str) -> Result<(usize, usize, usize)> {
    let parts = split_params(params, "KAMA", 3, "er_window,fast,slow (e.g., 10,2,30)")?;
    let mut values = [0_usize; 3];
    for ((slot, part), name) in values.iter_mut().zip(&parts).zip(["er_window", "fast", "slow"]) {
        *slot = part.parse().map_err(|_| CliError::InvalidArgument {
            argument: name.to_string(),
            reason: format!("cannot parse '{part}' as integer"),
            suggestion: Some("Use a positive integer".to_string()),
        })?;
    }
    Ok((values[0], values[1], values[2]))
}

/// Parse SAR parameters from string "start,increment,max".
///
/// # Errors
///
/// Returns `CliError::InvalidArgument` for a wrong count or a non-number.
pub fn parse_sar_params(params: &str) -> Result<(f64, f64, f64)> {
    let parts = split_params(params, "SAR", 3, "start,increment,max (e.g., 0.02,0.02,0.2)")?;
    let mut values = [0.0_f64; 3];
    for ((slot, part), name) in values.iter_mut().zip(&parts).zip(["start", "increment", "max"]) {
        *slot = part.parse().map_err(|_| CliError::InvalidArgument {
            argument: name.to_string(),
            reason: format!("cannot parse '{part}' as number"),
            suggestion: Some("Use a positive number like 0.02".to_string()),
        })?;
    }
    Ok((values[0], values[1], values[2]))
}
