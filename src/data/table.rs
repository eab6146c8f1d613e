//! Wide passenger-count table as read from CSV.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Default name of the date column.
pub const DEFAULT_DATE_COLUMN: &str = "Date";

/// Date formats accepted in the date column, day-first before month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
    "%d/%m/%y",
];

/// Raw table: one date column plus one text column per service.
///
/// Cells are kept as text so that each service column is parsed (and can fail)
/// independently of the others.
#[derive(Debug, Clone)]
pub struct RawTable {
    date_column: String,
    headers: Vec<String>,
    date_idx: usize,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from headers and rows already in memory.
    pub fn new(date_column: &str, headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let date_idx = headers
            .iter()
            .position(|h| h.trim() == date_column)
            .ok_or_else(|| {
                ForecastError::Data(format!("date column '{}' not found", date_column))
            })?;

        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(ForecastError::Data(format!(
                    "row {} has {} fields, expected {}",
                    i + 1,
                    row.len(),
                    headers.len()
                )));
            }
        }

        Ok(Self {
            date_column: date_column.to_string(),
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            date_idx,
            rows,
        })
    }

    /// Read a CSV file with a header row.
    pub fn from_csv_path(path: impl AsRef<Path>, date_column: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ForecastError::Io(format!("failed to open {}: {}", path.display(), e))
        })?;
        let table = Self::from_reader(BufReader::new(file), date_column)?;
        debug!(
            path = %path.display(),
            rows = table.num_rows(),
            columns = table.headers.len(),
            "loaded raw table"
        );
        Ok(table)
    }

    /// Read CSV from any reader.
    pub fn from_reader<R: Read>(reader: R, date_column: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }

        Self::new(date_column, headers, rows)
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Names of all non-date columns.
    pub fn service_columns(&self) -> Vec<&str> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.date_idx)
            .map(|(_, h)| h.as_str())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Parsed dates in row order, rejecting unparsable and duplicate dates.
    pub fn date_index(&self) -> Result<Vec<NaiveDate>> {
        let mut seen = HashSet::with_capacity(self.rows.len());
        let mut dates = Vec::with_capacity(self.rows.len());

        for (i, row) in self.rows.iter().enumerate() {
            let raw = &row[self.date_idx];
            let date = parse_date(raw).ok_or_else(|| {
                ForecastError::Data(format!("row {}: cannot parse date '{}'", i + 1, raw))
            })?;
            if !seen.insert(date) {
                return Err(ForecastError::Data(format!("duplicate date {}", date)));
            }
            dates.push(date);
        }

        Ok(dates)
    }

    /// Raw cells of a named column in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ForecastError::Data(format!("column '{}' not found", name)))?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }
}

/// Parse a date in any of the accepted formats. A trailing time part is ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.split([' ', 'T']).next().unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Date,Local Route,Light Rail,School
01/07/2019,15987,5077,
02/07/2019,16895,5409,12
03/07/2019,16613,5047,7
";

    #[test]
    fn reads_csv_from_reader() {
        let table = RawTable::from_reader(CSV.as_bytes(), DEFAULT_DATE_COLUMN).unwrap();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(
            table.service_columns(),
            vec!["Local Route", "Light Rail", "School"]
        );
        assert!(table.has_column("School"));
        assert!(!table.has_column("Other"));
    }

    #[test]
    fn parses_day_first_dates() {
        let table = RawTable::from_reader(CSV.as_bytes(), DEFAULT_DATE_COLUMN).unwrap();
        let dates = table.date_index().unwrap();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2019, 7, 1).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2019, 7, 3).unwrap());
    }

    #[test]
    fn parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 12, 25);
        assert_eq!(parse_date("2020-12-25"), expected);
        assert_eq!(parse_date("25/12/2020"), expected);
        assert_eq!(parse_date("25-12-2020"), expected);
        assert_eq!(parse_date("2020-12-25 00:00:00"), expected);
        assert_eq!(parse_date("2020-12-25T00:00:00"), expected);
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn missing_date_column_is_data_error() {
        let result = RawTable::from_reader("Day,School\n2020-01-01,3\n".as_bytes(), "Date");
        assert!(matches!(result, Err(ForecastError::Data(_))));
    }

    #[test]
    fn duplicate_dates_rejected() {
        let csv = "Date,School\n2020-01-01,3\n01/01/2020,4\n";
        let table = RawTable::from_reader(csv.as_bytes(), "Date").unwrap();
        assert!(matches!(table.date_index(), Err(ForecastError::Data(_))));
    }

    #[test]
    fn unparsable_date_rejected() {
        let csv = "Date,School\n2020-01-01,3\nyesterday,4\n";
        let table = RawTable::from_reader(csv.as_bytes(), "Date").unwrap();
        assert!(matches!(table.date_index(), Err(ForecastError::Data(_))));
    }

    #[test]
    fn ragged_rows_rejected() {
        let result = RawTable::new(
            "Date",
            vec!["Date".into(), "School".into()],
            vec![vec!["2020-01-01".into()]],
        );
        assert!(matches!(result, Err(ForecastError::Data(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = RawTable::from_csv_path("/definitely/not/here.csv", "Date");
        assert!(matches!(result, Err(ForecastError::Io(_))));
    }
}
