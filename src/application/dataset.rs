//! Dataset loading: CSV rows parsed and validated into typed records.
//!
//! Validation happens once, here. Rows with unparsable years or without a
//! country or continent are dropped and reported, never coerced.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Appeal, Record};
use crate::infrastructure::traits::DatasetReader;

pub const COL_START_YEAR: &str = "Start Year";
pub const COL_YEAR: &str = "Year";
pub const COL_APPEAL: &str = "Appeal";
pub const COL_COUNTRY: &str = "Country";
pub const COL_CONTINENT: &str = "Continent";

/// Why a row was not turned into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    #[error("invalid year in '{column}': {value:?}")]
    InvalidYear { column: &'static str, value: String },

    #[error("missing value in '{column}'")]
    MissingField { column: &'static str },

    #[error("malformed row: {message}")]
    Malformed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Kept,
    Dropped(DropReason),
}

/// Outcome of a single data row. Rows are numbered from 1, header excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowReport {
    pub row: usize,
    pub outcome: RowOutcome,
}

/// Per-row validation outcomes of one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows: Vec<RowReport>,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn kept(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.outcome == RowOutcome::Kept)
            .count()
    }

    pub fn dropped(&self) -> usize {
        self.total() - self.kept()
    }

    /// Dropped rows with their reasons, in row order.
    pub fn dropped_rows(&self) -> impl Iterator<Item = (usize, &DropReason)> {
        self.rows.iter().filter_map(|r| match &r.outcome {
            RowOutcome::Dropped(reason) => Some((r.row, reason)),
            RowOutcome::Kept => None,
        })
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows: {} kept, {} dropped",
            self.total(),
            self.kept(),
            self.dropped()
        )
    }
}

/// Validated records together with the report that produced them.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub report: LoadReport,
}

/// Column positions of the required fields.
struct Columns {
    start_year: usize,
    year: usize,
    appeal: usize,
    country: usize,
    continent: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> ApplicationResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| ApplicationError::MissingColumn {
                    column: name.to_string(),
                })
        };

        Ok(Self {
            start_year: find(COL_START_YEAR)?,
            year: find(COL_YEAR)?,
            appeal: find(COL_APPEAL)?,
            country: find(COL_COUNTRY)?,
            continent: find(COL_CONTINENT)?,
        })
    }

    fn parse(&self, row: &csv::StringRecord) -> Result<Record, DropReason> {
        let field = |idx: usize| row.get(idx).map(str::trim).unwrap_or("");

        let year = |idx: usize, column: &'static str| {
            let value = field(idx);
            value.parse::<i32>().map_err(|_| DropReason::InvalidYear {
                column,
                value: value.to_string(),
            })
        };

        let text = |idx: usize, column: &'static str| {
            let value = field(idx);
            if value.is_empty() {
                Err(DropReason::MissingField { column })
            } else {
                Ok(value.to_string())
            }
        };

        Ok(Record {
            start_year: year(self.start_year, COL_START_YEAR)?,
            year: year(self.year, COL_YEAR)?,
            appeal: Appeal::from_field(field(self.appeal)),
            country: text(self.country, COL_COUNTRY)?,
            continent: text(self.continent, COL_CONTINENT)?,
        })
    }
}

/// Parse CSV content with a header row into validated records.
///
/// Fails only if the header cannot be read or a required column is missing.
pub fn parse_dataset(content: &str) -> ApplicationResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ApplicationError::Csv {
            context: "read header row".into(),
            source: e,
        })?
        .clone();
    let columns = Columns::locate(&headers)?;

    let mut dataset = Dataset::default();
    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let parsed = result
            .map_err(|e| DropReason::Malformed {
                message: e.to_string(),
            })
            .and_then(|r| columns.parse(&r));

        let outcome = match parsed {
            Ok(record) => {
                dataset.records.push(record);
                RowOutcome::Kept
            }
            Err(reason) => {
                debug!("dropping row {}: {}", row, reason);
                RowOutcome::Dropped(reason)
            }
        };
        dataset.report.rows.push(RowReport { row, outcome });
    }

    info!("dataset parsed: {}", dataset.report);
    Ok(dataset)
}

/// Read the dataset at `location` and parse it.
#[instrument(skip(reader))]
pub fn load_dataset(reader: &dyn DatasetReader, location: &str) -> ApplicationResult<Dataset> {
    let content = reader
        .read(location)
        .map_err(|e| ApplicationError::DatasetUnavailable {
            location: location.to_string(),
            source: e,
        })?;
    debug!("read {} bytes from {}", content.len(), location);
    parse_dataset(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_reordered_columns_when_parsing_then_locates_by_name() {
        let csv = "Country,Extra,Continent,Appeal,Year,Start Year\nChad,x,Africa,Yes,2001,2000\n";

        let dataset = parse_dataset(csv).unwrap();

        assert_eq!(
            dataset.records,
            vec![Record::new(2000, 2001, Appeal::Yes, "Chad", "Africa")]
        );
    }

    #[test]
    fn given_short_row_when_parsing_then_drops_row() {
        let csv = "Start Year,Year,Appeal,Country,Continent\n2000,2000,Yes\n";

        let dataset = parse_dataset(csv).unwrap();

        assert!(dataset.records.is_empty());
        assert_eq!(dataset.report.dropped(), 1);
    }
}
