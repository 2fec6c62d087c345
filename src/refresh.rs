use tracing::{info, warn};

use crate::models::AggregationSummary;

/// Guards the bulk "fetch all jobs" action. Only one aggregation may be
/// outstanding; further triggers are ignored until it finishes. The
/// resulting summary is held for display only and never feeds back into
/// the filter or the grid; re-querying is the user's move.
pub struct BulkRefreshTrigger {
    in_flight: bool,
    last_summary: Option<AggregationSummary>,
    last_error: Option<String>,
}

impl Default for BulkRefreshTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl BulkRefreshTrigger {
    pub fn new() -> Self {
        Self {
            in_flight: false,
            last_summary: None,
            last_error: None,
        }
    }

    /// Arm a refresh. Returns false (and does nothing) while a prior one
    /// is still outstanding; the caller only issues the request on true.
    pub fn try_begin(&mut self) -> bool {
        if self.in_flight {
            warn!("bulk refresh already in flight, ignoring trigger");
            return false;
        }
        self.in_flight = true;
        self.last_error = None;
        true
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn complete(&mut self, summary: AggregationSummary) {
        info!(
            job_count = summary.job_count,
            sources = ?summary.source_names(),
            "bulk refresh finished"
        );
        self.last_summary = Some(summary);
        self.in_flight = false;
    }

    /// Record a failure and re-arm the trigger.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
        self.in_flight = false;
    }

    pub fn last_summary(&self) -> Option<&AggregationSummary> {
        self.last_summary.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// One-line status for the UI footer.
    pub fn status_line(&self) -> Option<String> {
        if self.in_flight {
            return Some("refreshing providers...".to_string());
        }
        if let Some(err) = &self.last_error {
            return Some(format!("refresh failed: {err}"));
        }
        self.last_summary.as_ref().map(|s| {
            format!(
                "refreshed {} jobs from {}",
                s.job_count,
                s.source_names().join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn summary(count: u64) -> AggregationSummary {
        let mut per_source = BTreeMap::new();
        per_source.insert("adzuna".to_string(), serde_json::json!([]));
        per_source.insert("usa_jobs".to_string(), serde_json::json!([]));
        AggregationSummary {
            job_count: count,
            per_source,
        }
    }

    #[test]
    fn only_one_refresh_may_be_outstanding() {
        let mut trigger = BulkRefreshTrigger::new();
        assert!(trigger.try_begin());
        assert!(!trigger.try_begin());
        assert!(!trigger.try_begin());

        trigger.complete(summary(5));
        assert!(trigger.try_begin());
    }

    #[test]
    fn failure_re_arms_the_trigger() {
        let mut trigger = BulkRefreshTrigger::new();
        assert!(trigger.try_begin());
        trigger.fail("timeout");
        assert!(!trigger.is_in_flight());
        assert_eq!(trigger.last_error(), Some("timeout"));
        assert!(trigger.try_begin());
        assert!(trigger.last_error().is_none());
    }

    #[test]
    fn status_line_reports_the_latest_outcome() {
        let mut trigger = BulkRefreshTrigger::new();
        assert!(trigger.status_line().is_none());

        trigger.try_begin();
        assert_eq!(trigger.status_line().unwrap(), "refreshing providers...");

        trigger.complete(summary(12));
        assert_eq!(
            trigger.status_line().unwrap(),
            "refreshed 12 jobs from adzuna, usa_jobs"
        );
    }
}
