//! Destinations for per-service outcomes.
//!
//! Records are keyed by run date and service slug. Writing the same service
//! again replaces the earlier record; a different service whose name slugs
//! to the same key is rejected.

mod json;
mod memory;

pub use json::JsonFileSink;
pub use memory::MemorySink;

use crate::error::{ForecastError, Result};
use crate::pipeline::ServiceOutcome;
use chrono::NaiveDate;

/// Storage for forecast and skip records.
pub trait ResultSink {
    /// Store one service outcome, replacing any record with the same
    /// service and run date.
    fn write(&mut self, run_date: NaiveDate, outcome: &ServiceOutcome) -> Result<()>;

    /// Store the run-level summary of all outcomes.
    fn write_summary(&mut self, run_date: NaiveDate, outcomes: &[ServiceOutcome]) -> Result<()>;
}

/// File-name friendly form of a service name: `"Local Route"` becomes `"local-route"`.
pub fn service_slug(service: &str) -> String {
    let mut slug = String::with_capacity(service.len());
    for c in service.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("service");
    }
    slug
}

/// Fails when a record stored under one slug is claimed by another service.
pub(crate) fn ensure_same_service(stored: &str, requested: &str) -> Result<()> {
    if stored == requested {
        return Ok(());
    }
    Err(ForecastError::InvalidParameter(format!(
        "services '{}' and '{}' share the record key '{}'",
        stored,
        requested,
        service_slug(requested)
    )))
}
