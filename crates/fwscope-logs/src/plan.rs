use tracing::debug;

use fwscope_client::{ClientResult, LogQuery, LogSource};
use fwscope_types::{FilterCriteria, LogEntry, LogPage, PageState, QueryMode};

use crate::cache::LocalFilterCache;
use crate::filter::RiskFilter;

/// Records requested by a local-mode bulk fetch.
///
/// Local results are only complete when the date-filtered set is no larger
/// than this. Anything past it is never seen by the local predicate.
pub const DEFAULT_FETCH_CEILING: usize = 1000;

/// How a set of criteria will be satisfied.
///
/// The service faults when risk type or severity are combined with its other
/// predicates, so those two are never sent. When either is present the
/// service gets only the date range and the risk constraints run locally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPlan {
    pub mode: QueryMode,

    /// Criteria the service is allowed to see
    pub remote_criteria: FilterCriteria,

    /// Predicate to run over the bulk fetch (local mode only)
    pub local_filter: Option<RiskFilter>,
}

/// Decide where filtering happens for `criteria`
pub fn resolve(criteria: &FilterCriteria) -> ResolvedPlan {
    let plan = match criteria.mode() {
        QueryMode::Local => ResolvedPlan {
            mode: QueryMode::Local,
            remote_criteria: criteria.date_only(),
            local_filter: Some(RiskFilter::from_criteria(criteria)),
        },
        QueryMode::Remote => ResolvedPlan {
            mode: QueryMode::Remote,
            remote_criteria: criteria.clone(),
            local_filter: None,
        },
    };

    debug!(mode = plan.mode.label(), criteria = %criteria.describe(), "resolved log query");
    plan
}

impl ResolvedPlan {
    /// The page request this plan sends to the service
    pub fn page_query(&self, page: PageState, ceiling: usize) -> LogQuery {
        match self.mode {
            QueryMode::Remote => LogQuery::new(self.remote_criteria.clone(), page.limit, page.offset),
            QueryMode::Local => self.bulk_query(ceiling),
        }
    }

    /// Unfiltered-by-risk request for the first `ceiling` records
    pub fn bulk_query(&self, ceiling: usize) -> LogQuery {
        LogQuery::new(self.remote_criteria.clone(), ceiling, 0)
    }

    /// Run the local predicate over a bulk page
    pub fn filter_local(&self, bulk: LogPage) -> (Vec<LogEntry>, usize) {
        match &self.local_filter {
            Some(filter) => filter.apply(bulk.logs),
            None => {
                let total = bulk.logs.len();
                (bulk.logs, total)
            }
        }
    }
}

/// Result set produced by executing a plan
#[derive(Clone, Debug)]
pub enum Fetched {
    /// The service's page, authoritative as returned
    Remote(LogPage),
    /// The locally filtered bulk set
    Local(LocalFilterCache),
}

/// Execute `plan` against the source for the given page position
pub async fn fetch_set(
    source: &dyn LogSource,
    criteria: &FilterCriteria,
    plan: &ResolvedPlan,
    page: PageState,
    ceiling: usize,
) -> ClientResult<Fetched> {
    let query = plan.page_query(page, ceiling);
    let response = source.fetch_page(&query).await?;

    match plan.mode {
        QueryMode::Remote => Ok(Fetched::Remote(response)),
        QueryMode::Local => Ok(Fetched::Local(LocalFilterCache::build(
            criteria.clone(),
            page.limit,
            ceiling,
            plan,
            response,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fwscope_types::Severity;

    fn dated() -> FilterCriteria {
        FilterCriteria::new().with_date_range(
            NaiveDate::from_ymd_opt(2024, 2, 1),
            NaiveDate::from_ymd_opt(2024, 2, 29),
        )
    }

    #[test]
    fn test_date_only_criteria_go_remote() {
        let plan = resolve(&dated());
        assert_eq!(plan.mode, QueryMode::Remote);
        assert_eq!(plan.remote_criteria, dated());
        assert!(plan.local_filter.is_none());

        let page = PageState::new(25).with_offset(75);
        assert_eq!(plan.page_query(page, 1000), LogQuery::new(dated(), 25, 75));
    }

    #[test]
    fn test_risk_criteria_are_stripped_for_local_mode() {
        let criteria = dated()
            .with_risk_type(Some("PII"))
            .with_severity(Some(Severity::High));
        let plan = resolve(&criteria);

        assert_eq!(plan.mode, QueryMode::Local);
        assert_eq!(plan.remote_criteria, dated());
        assert_eq!(
            plan.local_filter,
            Some(RiskFilter::new().with_risk_type("PII").with_severity(Severity::High))
        );

        // Page position never reaches the service in local mode
        let page = PageState::new(25).with_offset(75);
        assert_eq!(plan.page_query(page, 1000), LogQuery::new(dated(), 1000, 0));
    }

    #[test]
    fn test_severity_alone_selects_local_mode() {
        let criteria = FilterCriteria::new().with_severity(Some(Severity::Low));
        assert_eq!(resolve(&criteria).mode, QueryMode::Local);
        assert_eq!(resolve(&criteria).bulk_query(200).limit, 200);
    }
}
