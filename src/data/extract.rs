//! Per-service series extraction with zero gap-filling.

use crate::core::{consecutive_dates, TimeSeries};
use crate::data::table::RawTable;
use crate::error::{ForecastError, Result};
use std::collections::HashMap;

/// Markers treated as "no recorded ridership".
const MISSING_MARKERS: &[&str] = &["", "na", "n/a", "nan", "null", "none", "-"];

/// Extract one service column as a contiguous daily series.
///
/// The series spans the first to the last date present in the table. Days not
/// in the table and missing cells are filled with zero.
pub fn extract_series(table: &RawTable, service: &str) -> Result<TimeSeries> {
    let cells = table.column(service)?;
    let dates = table.date_index()?;

    let (Some(&start), Some(&end)) = (dates.iter().min(), dates.iter().max()) else {
        return Err(ForecastError::Data(format!(
            "table has no rows for service '{}'",
            service
        )));
    };

    let mut by_date = HashMap::with_capacity(dates.len());
    for (date, cell) in dates.iter().zip(cells) {
        by_date.insert(*date, parse_count(cell, service, *date)?);
    }

    let n_days = (end - start).num_days() as usize + 1;
    let full_dates = consecutive_dates(start, n_days);
    let values = full_dates
        .iter()
        .map(|d| by_date.get(d).copied().unwrap_or(0.0))
        .collect();

    TimeSeries::new(service, full_dates, values)
}

fn parse_count(cell: &str, service: &str, date: chrono::NaiveDate) -> Result<f64> {
    let trimmed = cell.trim();
    if MISSING_MARKERS
        .iter()
        .any(|m| trimmed.eq_ignore_ascii_case(m))
    {
        return Ok(0.0);
    }

    let value: f64 = trimmed.replace(',', "").parse().map_err(|_| {
        ForecastError::Data(format!(
            "service '{}' on {}: '{}' is not a number",
            service, date, cell
        ))
    })?;

    if !value.is_finite() || value < 0.0 {
        return Err(ForecastError::Data(format!(
            "service '{}' on {}: count {} must be non-negative",
            service, date, value
        )));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table(csv: &str) -> RawTable {
        RawTable::from_reader(csv.as_bytes(), "Date").unwrap()
    }

    #[test]
    fn extracts_named_column() {
        let t = table("Date,A,B\n2024-01-01,1,10\n2024-01-02,2,20\n2024-01-03,3,30\n");
        let ts = extract_series(&t, "B").unwrap();
        assert_eq!(ts.name(), "B");
        assert_eq!(ts.values(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn unsorted_rows_are_ordered() {
        let t = table("Date,A\n2024-01-03,3\n2024-01-01,1\n2024-01-02,2\n");
        let ts = extract_series(&t, "A").unwrap();
        assert_eq!(ts.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(ts.first_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn gaps_and_missing_cells_become_zero() {
        let t = table("Date,A\n2024-01-01,5\n2024-01-02,\n2024-01-05,NaN\n2024-01-06,7\n");
        let ts = extract_series(&t, "A").unwrap();
        assert_eq!(ts.len(), 6);
        assert_eq!(ts.values(), &[5.0, 0.0, 0.0, 0.0, 0.0, 7.0]);
    }

    #[test]
    fn missing_column_is_data_error() {
        let t = table("Date,A\n2024-01-01,5\n");
        assert!(matches!(
            extract_series(&t, "School"),
            Err(ForecastError::Data(_))
        ));
    }

    #[test]
    fn duplicate_dates_are_data_error() {
        let t = table("Date,A\n2024-01-01,5\n01/01/2024,6\n");
        assert!(matches!(
            extract_series(&t, "A"),
            Err(ForecastError::Data(_))
        ));
    }

    #[test]
    fn garbage_and_negative_cells_rejected() {
        let t = table("Date,A,B\n2024-01-01,abc,-4\n");
        assert!(matches!(extract_series(&t, "A"), Err(ForecastError::Data(_))));
        assert!(matches!(extract_series(&t, "B"), Err(ForecastError::Data(_))));
    }

    #[test]
    fn thousands_separator_accepted() {
        let t = table("Date,A\n2024-01-01,\"1,250\"\n");
        let ts = extract_series(&t, "A").unwrap();
        assert_eq!(ts.values(), &[1250.0]);
    }

    #[test]
    fn empty_table_is_data_error() {
        let t = table("Date,A\n");
        assert!(matches!(extract_series(&t, "A"), Err(ForecastError::Data(_))));
    }
}
