use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::error::ParseError;

// ---------------------------------------------------------------------------
// Column – the fields every source must provide
// ---------------------------------------------------------------------------

/// Required input columns, named as they appear in the header / schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Date,
    Price,
    City,
    Bedrooms,
    Bathrooms,
    SqftLiving,
    SqftLot,
    Floors,
    Condition,
    Waterfront,
    YrBuilt,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::Date,
        Column::Price,
        Column::City,
        Column::Bedrooms,
        Column::Bathrooms,
        Column::SqftLiving,
        Column::SqftLot,
        Column::Floors,
        Column::Condition,
        Column::Waterfront,
        Column::YrBuilt,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::Price => "price",
            Column::City => "city",
            Column::Bedrooms => "bedrooms",
            Column::Bathrooms => "bathrooms",
            Column::SqftLiving => "sqft_living",
            Column::SqftLot => "sqft_lot",
            Column::Floors => "floors",
            Column::Condition => "condition",
            Column::Waterfront => "waterfront",
            Column::YrBuilt => "yr_built",
        }
    }

    /// Position inside [`Column::ALL`], used to index per-column lookups.
    pub fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Cell – one raw value, independent of the file format it came from
// ---------------------------------------------------------------------------

/// A dynamically-typed raw cell. CSV yields `Text`, JSON and Parquet may
/// yield typed numbers and dates directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Date(NaiveDate),
    Null,
}

/// Text layouts accepted for the `date` column.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y%m%dT%H%M%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

impl<'a> Cell<'a> {
    fn describe(&self) -> String {
        match self {
            Cell::Text(s) => s.to_string(),
            Cell::Number(v) => v.to_string(),
            Cell::Date(d) => d.to_string(),
            Cell::Null => String::new(),
        }
    }

    pub fn text(self, col: Column) -> Result<String, ParseError> {
        match self {
            Cell::Text(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            Cell::Text(_) | Cell::Null => Err(ParseError::Missing { field: col.name() }),
            other => Ok(other.describe()),
        }
    }

    pub fn number(self, col: Column) -> Result<f64, ParseError> {
        let value = match self {
            Cell::Number(v) => v,
            Cell::Text(s) if s.trim().is_empty() => {
                return Err(ParseError::Missing { field: col.name() })
            }
            Cell::Text(s) => s.trim().parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                field: col.name(),
                value: s.to_string(),
            })?,
            Cell::Null => return Err(ParseError::Missing { field: col.name() }),
            Cell::Date(d) => {
                return Err(ParseError::InvalidNumber {
                    field: col.name(),
                    value: d.to_string(),
                })
            }
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ParseError::InvalidNumber {
                field: col.name(),
                value: value.to_string(),
            })
        }
    }

    /// A whole number within `[min, max]`; `3.0` is accepted as `3`.
    pub fn integer(self, col: Column, min: i64, max: i64) -> Result<i64, ParseError> {
        let value = self.number(col)?;
        if value.fract() != 0.0 || value < min as f64 || value > max as f64 {
            return Err(ParseError::OutOfRange {
                field: col.name(),
                value: value.to_string(),
            });
        }
        Ok(value as i64)
    }

    /// `0`/`1` or `true`/`false`.
    pub fn flag(self, col: Column) -> Result<bool, ParseError> {
        match self {
            Cell::Text(s) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
            Cell::Text(s) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
            other => Ok(other.integer(col, 0, 1)? == 1),
        }
    }

    pub fn date(self, col: Column) -> Result<NaiveDate, ParseError> {
        let text = match self {
            Cell::Date(d) => return Ok(d),
            Cell::Text(s) if !s.trim().is_empty() => s.trim(),
            Cell::Number(v) => {
                return Err(ParseError::InvalidDate {
                    field: col.name(),
                    value: v.to_string(),
                })
            }
            _ => return Err(ParseError::Missing { field: col.name() }),
        };
        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok().map(|dt| dt.date()))
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
            })
            .ok_or_else(|| ParseError::InvalidDate {
                field: col.name(),
                value: text.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Record – one housing sale
// ---------------------------------------------------------------------------

/// A single sale observation (one row of the source table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    /// Sale price in dollars.
    pub price: f64,
    pub city: String,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub sqft_living: u32,
    pub sqft_lot: u32,
    pub floors: f64,
    /// Ordinal condition grade, 1 (poor) to 5 (excellent).
    pub condition: u8,
    pub waterfront: bool,
    pub yr_built: i32,
}

impl Record {
    /// Parse a record by pulling each required column from `cell`.
    pub fn from_cells<'a>(mut cell: impl FnMut(Column) -> Cell<'a>) -> Result<Self, ParseError> {
        let date = cell(Column::Date).date(Column::Date)?;
        let price = cell(Column::Price).number(Column::Price)?;
        let city = cell(Column::City).text(Column::City)?;
        let bedrooms = cell(Column::Bedrooms).integer(Column::Bedrooms, 0, u32::MAX as i64)? as u32;
        let bathrooms = non_negative(cell(Column::Bathrooms), Column::Bathrooms)?;
        let sqft_living = cell(Column::SqftLiving).integer(Column::SqftLiving, 1, u32::MAX as i64)? as u32;
        let sqft_lot = cell(Column::SqftLot).integer(Column::SqftLot, 1, u32::MAX as i64)? as u32;
        let floors = non_negative(cell(Column::Floors), Column::Floors)?;
        let condition = cell(Column::Condition).integer(Column::Condition, 1, 5)? as u8;
        let waterfront = cell(Column::Waterfront).flag(Column::Waterfront)?;
        let yr_built = cell(Column::YrBuilt).integer(Column::YrBuilt, 0, 9999)? as i32;

        Ok(Record {
            date,
            price,
            city,
            bedrooms,
            bathrooms,
            sqft_living,
            sqft_lot,
            floors,
            condition,
            waterfront,
            yr_built,
        })
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth::from(self.date)
    }
}

fn non_negative(cell: Cell<'_>, col: Column) -> Result<f64, ParseError> {
    let value = cell.number(col)?;
    if value < 0.0 {
        return Err(ParseError::OutOfRange {
            field: col.name(),
            value: value.to_string(),
        });
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// YearMonth – monthly grouping key
// ---------------------------------------------------------------------------

/// Calendar month; orders chronologically (year first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Counters describing what happened while a dataset was loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Data rows encountered in the source.
    pub rows_read: usize,
    /// Rows dropped because a field could not be parsed.
    pub rows_skipped: usize,
    /// Rows dropped by the minimum-price rule.
    pub rows_below_min_price: usize,
}

/// The cleaned, immutable record table with pre-computed indices for the
/// filter widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    cities: BTreeSet<String>,
    bedroom_counts: BTreeSet<u32>,
    price_bounds: Option<(f64, f64)>,
    report: LoadReport,
}

impl Dataset {
    /// Build the indices from already-cleaned records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let report = LoadReport {
            rows_read: records.len(),
            ..LoadReport::default()
        };
        Self::with_report(records, report)
    }

    pub(crate) fn with_report(records: Vec<Record>, report: LoadReport) -> Self {
        let cities = records.iter().map(|r| r.city.clone()).collect();
        let bedroom_counts = records.iter().map(|r| r.bedrooms).collect();
        let price_bounds = records.iter().map(|r| r.price).fold(None, |acc, p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((f64::min(lo, p), f64::max(hi, p))),
        });
        Dataset {
            records,
            cities,
            bedroom_counts,
            price_bounds,
            report,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Sorted unique city names.
    pub fn cities(&self) -> &BTreeSet<String> {
        &self.cities
    }

    /// Sorted unique bedroom counts.
    pub fn bedroom_counts(&self) -> &BTreeSet<u32> {
        &self.bedroom_counts
    }

    /// `(min, max)` price, `None` for an empty dataset.
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        self.price_bounds
    }

    pub fn report(&self) -> LoadReport {
        self.report
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
