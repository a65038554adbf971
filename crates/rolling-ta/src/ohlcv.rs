//! Canonical price/volume fields and tabular ingestion.
//!
//! Labels are resolved once, on ingestion, against the fixed
//! [`Field`] schema: case-insensitively, ignoring surrounding whitespace and
//! accepting a few common aliases. Primitives downstream only ever see
//! [`Series`] values and never look at labels again.
//!
//! # Example
//!
//! ```
//! use rolling_ta::ohlcv::{Field, Ohlcv};
//!
//! assert_eq!(Field::resolve(" CLOSE "), Some(Field::Close));
//! assert_eq!(Field::resolve("Adj Close"), Some(Field::Close));
//! assert_eq!(Field::resolve("date"), None);
//!
//! let table = Ohlcv::from_columns(
//!     &["Date", "high", "LOW", "Close"],
//!     vec![vec![1.0_f64, 2.0], vec![11.0, 12.0], vec![9.0, 10.0], vec![10.0, 11.0]],
//! )
//! .unwrap();
//! assert_eq!(table.close().unwrap().values(), &[10.0, 11.0]);
//! assert!(table.volume().is_err());
//! ```

use std::fmt;

use crate::error::{Error, Result};
use crate::series::Series;
use crate::traits::{validate_same_length, SeriesElement};

/// One of the fixed OHLCV fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Lowest price.
    Low,
    /// Closing price.
    Close,
    /// Traded volume.
    Volume,
}

impl Field {
    /// Every field, in canonical order.
    pub const ALL: [Self; 5] = [Self::Open, Self::High, Self::Low, Self::Close, Self::Volume];

    /// Canonical capitalised name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::Volume => "Volume",
        }
    }

    /// Resolves a column label to a field.
    ///
    /// Matching ignores case and surrounding whitespace. `adj close`,
    /// `adj_close` and `price` resolve to `Close`; `vol` resolves to
    /// `Volume`. Unrelated labels (dates, dividends) resolve to `None`.
    #[must_use]
    pub fn resolve(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        let field = match normalized.as_str() {
            "open" | "o" => Self::Open,
            "high" | "h" => Self::High,
            "low" | "l" => Self::Low,
            "close" | "c" | "adj close" | "adj_close" | "adjclose" | "price" => Self::Close,
            "volume" | "vol" | "v" => Self::Volume,
            _ => return None,
        };
        Some(field)
    }

    /// Returns `true` if `label` is the canonical name (in any case).
    fn is_exact(self, label: &str) -> bool {
        label.trim().eq_ignore_ascii_case(self.name())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A table of aligned OHLCV series.
///
/// Any subset of fields may be present; accessors return
/// `Error::MissingField` for absent ones.
#[derive(Debug, Clone, Default)]
pub struct Ohlcv<T> {
    len: usize,
    index: Option<Vec<i64>>,
    fields: [Option<Series<T>>; 5],
}

impl<T: SeriesElement> Ohlcv<T> {
    /// Builds a table from labelled columns.
    ///
    /// Labels that do not resolve to a [`Field`] are skipped. When two
    /// labels resolve to the same field, the canonical name wins over an
    /// alias; otherwise the first one wins.
    ///
    /// # Errors
    ///
    /// Returns `Error::LengthMismatch` if the number of labels and columns
    /// differ or the columns are ragged.
    pub fn from_columns<S: AsRef<str>>(labels: &[S], columns: Vec<Vec<T>>) -> Result<Self> {
        Self::build(labels, columns, None)
    }

    /// Like [`from_columns`](Self::from_columns), with an explicit index.
    ///
    /// # Errors
    ///
    /// Additionally returns `Error::InvalidIndex` for a decreasing index.
    pub fn from_columns_with_index<S: AsRef<str>>(
        labels: &[S],
        columns: Vec<Vec<T>>,
        index: Vec<i64>,
    ) -> Result<Self> {
        Self::build(labels, columns, Some(index))
    }

    fn build<S: AsRef<str>>(
        labels: &[S],
        columns: Vec<Vec<T>>,
        index: Option<Vec<i64>>,
    ) -> Result<Self> {
        validate_same_length(labels.len(), columns.len())?;
        let len = columns
            .first()
            .map(Vec::len)
            .or_else(|| index.as_ref().map(Vec::len))
            .unwrap_or(0);

        let mut slots: [Option<(usize, bool)>; 5] = [None; 5];
        for (col, label) in labels.iter().enumerate() {
            validate_same_length(len, columns[col].len())?;
            let label = label.as_ref();
            let Some(field) = Field::resolve(label) else {
                continue;
            };
            let exact = field.is_exact(label);
            let slot = &mut slots[field as usize];
            match *slot {
                Some((_, true)) => {}
                Some((_, false)) if !exact => {}
                _ => *slot = Some((col, exact)),
            }
        }

        let mut columns: Vec<Option<Vec<T>>> = columns.into_iter().map(Some).collect();
        let mut fields: [Option<Series<T>>; 5] = Default::default();
        for (field, slot) in fields.iter_mut().zip(slots) {
            if let Some((col, _)) = slot {
                let values = columns[col].take().unwrap_or_default();
                *field = Some(match &index {
                    Some(index) => Series::with_index(index.clone(), values)?,
                    None => Series::new(values),
                });
            }
        }

        Ok(Self { len, index, fields })
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The explicit index, if one was supplied.
    #[must_use]
    pub fn index(&self) -> Option<&[i64]> {
        self.index.as_deref()
    }

    /// Returns `true` if `field` is present.
    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        self.fields[field as usize].is_some()
    }

    /// The series for `field`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingField` if the field was not ingested.
    pub fn get(&self, field: Field) -> Result<&Series<T>> {
        self.fields[field as usize]
            .as_ref()
            .ok_or(Error::MissingField {
                field: field.name(),
            })
    }

    /// Checks that every field in `required` is present.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingField` for the first absent field.
    pub fn require(&self, required: &[Field]) -> Result<()> {
        for &field in required {
            self.get(field)?;
        }
        Ok(())
    }

    /// Opening prices.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingField` if absent.
    pub fn open(&self) -> Result<&Series<T>> {
        self.get(Field::Open)
    }

    /// High prices.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingField` if absent.
    pub fn high(&self) -> Result<&Series<T>> {
        self.get(Field::High)
    }

    /// Low prices.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingField` if absent.
    pub fn low(&self) -> Result<&Series<T>> {
        self.get(Field::Low)
    }

    /// Closing prices.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingField` if absent.
    pub fn close(&self) -> Result<&Series<T>> {
        self.get(Field::Close)
    }

    /// Volume.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingField` if absent.
    pub fn volume(&self) -> Result<&Series<T>> {
        self.get(Field::Volume)
    }
}
