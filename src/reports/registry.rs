//! Per-turn report tracking

use crate::api::Report;
use std::collections::HashSet;

/// Reports seen within a single turn, deduplicated by `report_id`.
///
/// The first snapshot of an id wins; later duplicates are dropped, as are
/// reports without an id since they can never be resolved.
#[derive(Debug, Default)]
pub struct ReportRegistry {
    seen: HashSet<String>,
    reports: Vec<Report>,
}

impl ReportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a report. Returns `false` if it was dropped.
    pub fn observe(&mut self, report: Report) -> bool {
        let Some(id) = report.id() else {
            tracing::debug!(status = report.status.as_str(), "Dropping report without id");
            return false;
        };

        if !self.seen.insert(id.to_string()) {
            tracing::debug!(report_id = id, "Dropping duplicate report");
            return false;
        }

        self.reports.push(report);
        true
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn into_reports(self) -> Vec<Report> {
        self.reports
    }
}

/// Deduplicate one response's reports, preserving first-seen order
pub fn dedupe_reports(reports: impl IntoIterator<Item = Report>) -> Vec<Report> {
    let mut registry = ReportRegistry::new();
    for report in reports {
        registry.observe(report);
    }
    registry.into_reports()
}
