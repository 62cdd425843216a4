use tracing::debug;

use fwscope_types::{FilterCriteria, LogEntry, LogPage};

use crate::plan::ResolvedPlan;

/// Locally filtered result set for one (criteria, page size) pair.
///
/// Built from a single bulk fetch and reused across offset changes. Any change
/// to the criteria or the page size makes it stale.
#[derive(Clone, Debug)]
pub struct LocalFilterCache {
    /// Criteria the cache was built for
    criteria: FilterCriteria,

    /// Page size the cache was built for
    limit: usize,

    /// Records that passed the risk predicate, in fetch order
    entries: Vec<LogEntry>,

    /// Records the bulk fetch returned before filtering
    fetched: usize,

    /// Whether the service held more records than the ceiling allowed
    truncated: bool,
}

impl LocalFilterCache {
    /// Filter a bulk page into a new cache
    pub fn build(
        criteria: FilterCriteria,
        limit: usize,
        ceiling: usize,
        plan: &ResolvedPlan,
        bulk: LogPage,
    ) -> Self {
        let fetched = bulk.logs.len();
        let truncated = bulk.has_more || bulk.total > fetched;
        let (entries, total) = plan.filter_local(bulk);

        if truncated {
            // Matches past the ceiling are never seen; totals are a lower bound
            debug!(ceiling, fetched, matched = total, "local filter ran over a truncated bulk fetch");
        } else {
            debug!(fetched, matched = total, "rebuilt local filter cache");
        }

        Self {
            criteria,
            limit,
            entries,
            fetched,
            truncated,
        }
    }

    /// Check if the cache still serves the given criteria and page size
    pub fn is_valid_for(&self, criteria: &FilterCriteria, limit: usize) -> bool {
        self.limit == limit && self.criteria == *criteria
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of matching records
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Records examined by the predicate
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    /// Whether matches beyond the fetch ceiling may be missing
    pub fn is_possibly_incomplete(&self) -> bool {
        self.truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::resolve;
    use fwscope_types::{Decision, Position, Risk, Severity};

    fn entry(id: i64, severity: Option<Severity>) -> LogEntry {
        let risks = severity
            .map(|severity| {
                vec![Risk {
                    risk_type: "PII".to_string(),
                    severity,
                    matched: String::new(),
                    position: Position::default(),
                    explanation: String::new(),
                }]
            })
            .unwrap_or_default();
        LogEntry::new(id, format!("r{}", id), "t", Decision::Warn).with_risks(risks)
    }

    fn high_only() -> FilterCriteria {
        FilterCriteria::new().with_severity(Some(Severity::High))
    }

    #[test]
    fn test_build_filters_in_fetch_order() {
        let bulk = LogPage {
            logs: vec![
                entry(5, Some(Severity::High)),
                entry(4, None),
                entry(3, Some(Severity::High)),
            ],
            total: 3,
            limit: 1000,
            offset: 0,
            has_more: false,
        };

        let cache = LocalFilterCache::build(high_only(), 2, 1000, &resolve(&high_only()), bulk);

        assert_eq!(cache.entries().iter().map(|e| e.id).collect::<Vec<_>>(), vec![5, 3]);
        assert_eq!(cache.total(), 2);
        assert_eq!(cache.fetched(), 3);
        assert!(!cache.is_possibly_incomplete());
    }

    #[test]
    fn test_validity_tracks_criteria_and_limit() {
        let cache = LocalFilterCache::build(
            high_only(),
            10,
            1000,
            &resolve(&high_only()),
            LogPage::default(),
        );

        assert!(cache.is_valid_for(&high_only(), 10));
        assert!(!cache.is_valid_for(&high_only(), 20));
        assert!(!cache.is_valid_for(&FilterCriteria::new().with_severity(Some(Severity::Low)), 10));
    }

    #[test]
    fn test_matches_past_the_ceiling_are_missing() {
        // The service holds 5 date-matching records but only 3 fit the ceiling;
        // the high-severity record at position 4 is never examined.
        let stored: Vec<LogEntry> = vec![
            entry(1, Some(Severity::High)),
            entry(2, None),
            entry(3, None),
            entry(4, Some(Severity::High)),
            entry(5, None),
        ];
        let bulk = LogPage {
            logs: stored[..3].to_vec(),
            total: stored.len(),
            limit: 3,
            offset: 0,
            has_more: true,
        };

        let cache = LocalFilterCache::build(high_only(), 50, 3, &resolve(&high_only()), bulk);

        assert_eq!(cache.total(), 1);
        assert!(cache.is_possibly_incomplete());
    }
}
