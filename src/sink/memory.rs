//! In-memory sink.

use super::{ensure_same_service, service_slug, ResultSink};
use crate::error::Result;
use crate::pipeline::ServiceOutcome;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Keeps outcomes in memory, keyed by run date and service slug like
/// [`JsonFileSink`](super::JsonFileSink).
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: BTreeMap<(NaiveDate, String), ServiceOutcome>,
    summaries: BTreeMap<NaiveDate, Vec<ServiceOutcome>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, run_date: NaiveDate, service: &str) -> Option<&ServiceOutcome> {
        self.records
            .get(&(run_date, service_slug(service)))
            .filter(|outcome| outcome.service() == service)
    }

    pub fn summary(&self, run_date: NaiveDate) -> Option<&[ServiceOutcome]> {
        self.summaries.get(&run_date).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ResultSink for MemorySink {
    fn write(&mut self, run_date: NaiveDate, outcome: &ServiceOutcome) -> Result<()> {
        let key = (run_date, service_slug(outcome.service()));
        if let Some(stored) = self.records.get(&key) {
            ensure_same_service(stored.service(), outcome.service())?;
        }
        self.records.insert(key, outcome.clone());
        Ok(())
    }

    fn write_summary(&mut self, run_date: NaiveDate, outcomes: &[ServiceOutcome]) -> Result<()> {
        self.summaries.insert(run_date, outcomes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForecastError;

    #[test]
    fn last_write_wins() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let mut sink = MemorySink::new();

        let first = ServiceOutcome::skipped("Other", day, &ForecastError::Convergence { iterations: 5 });
        let second = ServiceOutcome::skipped("Other", day, &ForecastError::Data("bad".into()));
        sink.write(day, &first).unwrap();
        sink.write(day, &second).unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get(day, "Other"), Some(&second));
        assert!(sink.summary(day).is_none());
    }

    #[test]
    fn shares_file_sink_keying() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let mut sink = MemorySink::new();
        let peak = ServiceOutcome::skipped("Peak/Service", day, &ForecastError::Data("x".into()));
        let clash = ServiceOutcome::skipped("Peak Service", day, &ForecastError::Data("y".into()));

        sink.write(day, &peak).unwrap();
        assert!(matches!(
            sink.write(day, &clash),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get(day, "Peak/Service"), Some(&peak));
        assert!(sink.get(day, "Peak Service").is_none());
    }
}
