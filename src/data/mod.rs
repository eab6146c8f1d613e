//! Raw table loading and per-service series extraction.

mod extract;
mod table;

pub use extract::extract_series;
pub use table::{parse_date, RawTable, DEFAULT_DATE_COLUMN};
