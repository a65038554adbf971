//! CSV output module.
//!
//! Every input row produces one output row, so the result lines up with the
//! input file line for line. Missing values (warm-up included) are written as
//! empty cells. Cells holding a comma, a quote or a line break are quoted.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use rolling_ta::Series;

use crate::error::{CliError, Result};

/// Output destination: either stdout or a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDest {
    /// Write to stdout.
    Stdout,
    /// Write to a file at the given path.
    File(String),
}

impl OutputDest {
    /// Destination for an optional `-o` path.
    #[must_use]
    pub fn from_option(path: Option<&str>) -> Self {
        path.map_or(Self::Stdout, |p| Self::File(p.to_string()))
    }

    /// Create a writer for this output destination.
    ///
    /// # Errors
    ///
    /// Returns `CliError::IoError` if the file cannot be created.
    pub fn writer(&self) -> Result<Box<dyn Write>> {
        match self {
            Self::Stdout => Ok(Box::new(io::stdout().lock())),
            Self::File(path) => {
                let file = File::create(path).map_err(|e| CliError::IoError {
                    source: e,
                    path: Some(path.clone()),
                })?;
                Ok(Box::new(BufWriter::new(file)))
            }
        }
    }
}

/// Named output columns aligned with the input rows.
#[derive(Debug, Clone, Default)]
pub struct OutputTable {
    /// Date column copied from the input, if any.
    pub dates: Option<Vec<String>>,
    /// `(header, values)` pairs.
    pub columns: Vec<(String, Series<f64>)>,
}

impl OutputTable {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |(_, s)| s.len())
    }

    /// Returns `true` if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Quotes `cell` if it would otherwise split or break the row.
fn escape_cell(cell: &str) -> Cow<'_, str> {
    if cell.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}

fn write_record<W: Write, S: AsRef<str>>(out: &mut W, cells: &[S]) -> io::Result<()> {
    let escaped: Vec<Cow<'_, str>> = cells.iter().map(|c| escape_cell(c.as_ref())).collect();
    writeln!(out, "{}", escaped.join(","))
}

/// Write `table` as CSV to `out`.
///
/// # Errors
///
/// Returns `CliError::IoError` if writing fails.
pub fn write_table<W: Write>(table: &OutputTable, mut out: W) -> Result<()> {
    let mut header: Vec<&str> = Vec::with_capacity(table.columns.len() + 1);
    if table.dates.is_some() {
        header.push("date");
    }
    header.extend(table.columns.iter().map(|(name, _)| name.as_str()));
    write_record(&mut out, &header)?;

    for row in 0..table.len() {
        let mut record: Vec<String> = Vec::with_capacity(header.len());
        if let Some(dates) = &table.dates {
            record.push(dates.get(row).cloned().unwrap_or_default());
        }
        record.extend(
            table
                .columns
                .iter()
                .map(|(_, series)| series.get(row).map_or_else(String::new, format_value)),
        );
        write_record(&mut out, &record)?;
    }

    out.flush()?;
    Ok(())
}

/// Write `table` to `dest`.
///
/// # Errors
///
/// See [`OutputDest::writer`] and [`write_table`].
pub fn write_to(table: &OutputTable, dest: &OutputDest) -> Result<()> {
    write_table(table, dest.writer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_parser::parse_csv_from_reader;
    use rolling_ta::ohlcv::Field;

    fn render(table: &OutputTable) -> String {
        let mut buf = Vec::new();
        write_table(table, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_missing_written_as_empty_cells() {
        let table = OutputTable {
            dates: None,
            columns: vec![(
                "sma_3".to_string(),
                Series::new(vec![f64::NAN, f64::NAN, 11.0, 11.5]),
            )],
        };
        assert_eq!(render(&table), "sma_3\n\n\n11\n11.5\n");
    }

    #[test]
    fn test_dates_and_multiple_columns() {
        let table = OutputTable {
            dates: Some(vec!["d1".to_string(), "d2".to_string()]),
            columns: vec![
                ("slope".to_string(), Series::new(vec![f64::NAN, 1.0])),
                ("endpoint".to_string(), Series::new(vec![f64::NAN, 2.5])),
            ],
        };
        let lines: Vec<String> = render(&table).lines().map(String::from).collect();
        assert_eq!(lines, ["date,slope,endpoint", "d1,,", "d2,1,2.5"]);
    }

    #[test]
    fn test_every_row_is_written() {
        let table = OutputTable {
            dates: None,
            columns: vec![("x".to_string(), Series::new(vec![f64::NAN; 5]))],
        };
        assert_eq!(render(&table).lines().count(), 6);
    }

    #[test]
    fn test_cells_with_separators_are_quoted() {
        let table = OutputTable {
            dates: Some(vec!["Jan 1, 2024".to_string(), "Jan 2, 2024".to_string()]),
            columns: vec![(
                "close".to_string(),
                Series::new(vec![10.0, 11.5]),
            )],
        };
        let text = render(&table);
        assert_eq!(
            text,
            "date,close\n\"Jan 1, 2024\",10\n\"Jan 2, 2024\",11.5\n"
        );

        let parsed = parse_csv_from_reader(text.as_bytes()).unwrap();
        assert_eq!(
            parsed.dates,
            Some(vec!["Jan 1, 2024".to_string(), "Jan 2, 2024".to_string()])
        );
        assert_eq!(parsed.ohlcv.get(Field::Close).unwrap().values(), &[10.0, 11.5]);
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("plain"), "plain");
        assert_eq!(escape_cell(""), "");
        assert_eq!(escape_cell("a,b"), "\"a,b\"");
        assert_eq!(escape_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_cell("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_output_dest_from_option() {
        assert_eq!(OutputDest::from_option(None), OutputDest::Stdout);
        assert_eq!(
            OutputDest::from_option(Some("out.csv")),
            OutputDest::File("out.csv".to_string())
        );
    }

    #[test]
    fn test_write_to_file() {
        let path = std::env::temp_dir().join("rolling_ta_writer_test.csv");
        let table = OutputTable {
            dates: None,
            columns: vec![("ema_2".to_string(), Series::new(vec![1.0, 1.5]))],
        };
        write_to(&table, &OutputDest::File(path.display().to_string())).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "ema_2\n1\n1.5\n");
        std::fs::remove_file(&path).ok();
    }
}
