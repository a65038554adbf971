//! CSV parsing module for reading price tables.
//!
//! Column headers are resolved with [`Field::resolve`], so `Close`, `CLOSE`,
//! `adj close` and `price` all land on the close field. Columns that resolve
//! to no field are skipped, except the first date-like column, which is kept
//! as text and echoed in the output.
//!
//! Empty cells are read as missing values.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use rolling_ta::ohlcv::{Field, Ohlcv};

use crate::error::{CliError, Result};

/// A parsed price table.
#[derive(Debug, Clone)]
pub struct PriceTable {
    /// Original header names, in file order.
    pub headers: Vec<String>,
    /// Date/time column values, if the file has one.
    pub dates: Option<Vec<String>>,
    /// Resolved price and volume series.
    pub ohlcv: Ohlcv<f64>,
}

impl PriceTable {
    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ohlcv.len()
    }

    /// Returns `true` if the file had no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ohlcv.is_empty()
    }
}

/// Check if a header represents a date column.
fn is_date_column(header: &str) -> bool {
    matches!(
        header.trim().to_ascii_lowercase().as_str(),
        "date" | "time" | "datetime" | "timestamp" | "dt"
    )
}

/// Parse a cell to f64, treating empty as missing.
fn parse_value(value: &str, line: usize) -> Result<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed.parse::<f64>().map_err(|_| CliError::CsvParseError {
        message: format!("cannot parse '{trimmed}' as number"),
        line: Some(line),
    })
}

/// Parse a CSV file into a [`PriceTable`].
///
/// # Errors
///
/// Returns `CliError::IoError` if the file cannot be opened and
/// `CliError::CsvParseError` if the CSV is malformed.
pub fn parse_csv<P: AsRef<Path>>(path: P) -> Result<PriceTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| CliError::IoError {
        source: e,
        path: Some(path.display().to_string()),
    })?;
    parse_csv_from_reader(BufReader::new(file))
}

/// Parse CSV data from any reader.
///
/// # Errors
///
/// Returns `CliError::CsvParseError` if the header is missing, no column
/// resolves to a price field, or a cell is not a number.
pub fn parse_csv_from_reader<R: Read>(reader: R) -> Result<PriceTable> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| CliError::CsvParseError {
            message: e.to_string(),
            line: Some(1),
        })?
        .iter()
        .map(String::from)
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CliError::CsvParseError {
            message: "CSV file has no headers".to_string(),
            line: Some(1),
        });
    }

    let date_column = headers.iter().position(|h| is_date_column(h));
    let numeric: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| Field::resolve(h).is_some())
        .map(|(idx, _)| idx)
        .collect();

    if numeric.is_empty() {
        return Err(CliError::CsvParseError {
            message: format!(
                "no price column found in header [{}] (expected open, high, low, close or volume)",
                headers.join(", ")
            ),
            line: Some(1),
        });
    }
    tracing::debug!(?headers, ?date_column, "resolved CSV header");

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); numeric.len()];
    let mut dates: Vec<String> = Vec::new();

    for (row, result) in csv_reader.records().enumerate() {
        // +2 for the header and 1-based lines
        let line = row + 2;
        let record = result.map_err(|e| CliError::CsvParseError {
            message: e.to_string(),
            line: Some(line),
        })?;

        if let Some(idx) = date_column {
            dates.push(record.get(idx).unwrap_or_default().to_string());
        }
        for (values, &idx) in columns.iter_mut().zip(&numeric) {
            values.push(parse_value(record.get(idx).unwrap_or(""), line)?);
        }
    }

    let labels: Vec<&str> = numeric.iter().map(|&idx| headers[idx].as_str()).collect();
    let ohlcv = Ohlcv::from_columns(&labels, columns)?;
    tracing::debug!(rows = ohlcv.len(), "parsed price table");

    Ok(PriceTable {
        headers,
        dates: date_column.map(|_| dates),
        ohlcv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_case_headers() {
        let data = "Date,OPEN,High,low,Adj Close,Volume\n\
                    2024-01-01,10,11,9,10.5,1000\n\
                    2024-01-02,10.5,12,10,11.5,1200\n";
        let table = parse_csv_from_reader(data.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.dates.as_deref(),
            Some(&["2024-01-01".to_string(), "2024-01-02".to_string()][..])
        );
        for field in Field::ALL {
            assert!(table.ohlcv.has(field), "{field}");
        }
        assert_eq!(table.ohlcv.close().unwrap().values(), &[10.5, 11.5]);
    }

    #[test]
    fn test_close_only_without_dates() {
        let data = "close\n1\n2\n3\n";
        let table = parse_csv_from_reader(data.as_bytes()).unwrap();
        assert!(table.dates.is_none());
        assert_eq!(table.ohlcv.close().unwrap().values(), &[1.0, 2.0, 3.0]);
        assert!(table.ohlcv.high().is_err());
    }

    #[test]
    fn test_empty_cells_are_missing() {
        let data = "date,close\nd1,1\nd2,\nd3,3\n";
        let table = parse_csv_from_reader(data.as_bytes()).unwrap();
        let close = table.ohlcv.close().unwrap();
        assert_eq!(close[0], 1.0);
        assert!(close[1].is_nan());
        assert_eq!(close[2], 3.0);
    }

    #[test]
    fn test_unrelated_text_columns_are_ignored() {
        let data = "symbol,close,dividends\nAAPL,1,x\nAAPL,2,y\n";
        let table = parse_csv_from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.ohlcv.close().unwrap().len(), 2);
        assert_eq!(table.headers.len(), 3);
    }

    #[test]
    fn test_invalid_number_reports_line() {
        let data = "close\n1\nabc\n";
        match parse_csv_from_reader(data.as_bytes()) {
            Err(CliError::CsvParseError { line, message }) => {
                assert_eq!(line, Some(3));
                assert!(message.contains("abc"));
            }
            other => panic!("Expected CsvParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_no_price_columns() {
        let data = "date,symbol\nd1,X\n";
        assert!(matches!(
            parse_csv_from_reader(data.as_bytes()),
            Err(CliError::CsvParseError { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_csv("/nonexistent/prices.csv").unwrap_err();
        assert!(matches!(err, CliError::IoError { path: Some(_), .. }));
    }
}
