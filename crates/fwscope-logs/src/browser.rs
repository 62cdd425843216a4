use tracing::debug;

use fwscope_client::{ClientError, ClientResult, LogSource};
use fwscope_types::{FilterCriteria, PageState, QueryMode};

use crate::cache::LocalFilterCache;
use crate::pager::{PageView, Pager};
use crate::plan::{Fetched, ResolvedPlan, fetch_set, resolve};

/// A fetch the browser has started and is waiting on.
///
/// Owns everything it needs, so it can be moved onto a task and its outcome
/// handed back through [`LogBrowser::apply`].
#[derive(Clone, Debug)]
pub struct FetchTicket {
    generation: u64,
    criteria: FilterCriteria,
    plan: ResolvedPlan,
    page: PageState,
    ceiling: usize,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mode(&self) -> QueryMode {
        self.plan.mode
    }

    /// Execute against the source
    pub async fn run(self, source: &dyn LogSource) -> FetchOutcome {
        let result = fetch_set(source, &self.criteria, &self.plan, self.page, self.ceiling).await;
        FetchOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// Completed fetch, tagged with the generation that started it
#[derive(Debug)]
pub struct FetchOutcome {
    generation: u64,
    result: ClientResult<Fetched>,
}

impl FetchOutcome {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Criteria and page position in, one consistent page view out.
///
/// Every change that needs the service returns a [`FetchTicket`]; only the
/// outcome of the most recent ticket is ever applied. Offset changes in local
/// mode are served from the cache without a ticket.
#[derive(Debug)]
pub struct LogBrowser {
    criteria: FilterCriteria,
    page: PageState,
    ceiling: usize,

    /// Authoritative set in local mode
    cache: Option<LocalFilterCache>,

    /// Currently displayed slice
    view: Option<PageView>,

    /// Failure of the last fetch, shown instead of the table
    error: Option<ClientError>,

    loading: bool,

    /// Bumped for every started fetch
    generation: u64,
}

impl LogBrowser {
    pub fn new(criteria: FilterCriteria, page: PageState, ceiling: usize) -> Self {
        Self {
            criteria,
            page,
            ceiling,
            cache: None,
            view: None,
            error: None,
            loading: false,
            generation: 0,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn page(&self) -> PageState {
        self.page
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn mode(&self) -> QueryMode {
        self.criteria.mode()
    }

    pub fn view(&self) -> Option<&PageView> {
        self.view.as_ref()
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn cache(&self) -> Option<&LocalFilterCache> {
        self.cache.as_ref()
    }

    /// Navigation stays off while a fetch is pending
    pub fn can_previous(&self) -> bool {
        !self.loading && Pager::can_previous(self.page)
    }

    pub fn can_next(&self) -> bool {
        !self.loading && self.view.as_ref().is_some_and(|v| v.has_more)
    }

    /// Start a fetch for the current criteria and page
    fn begin(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;

        FetchTicket {
            generation: self.generation,
            criteria: self.criteria.clone(),
            plan: resolve(&self.criteria),
            page: self.page,
            ceiling: self.ceiling,
        }
    }

    /// Drop the current set and fetch again
    pub fn refresh(&mut self) -> FetchTicket {
        self.cache = None;
        self.view = None;
        self.begin()
    }

    /// Replace the filters; returns to the first page
    pub fn set_criteria(&mut self, criteria: FilterCriteria) -> FetchTicket {
        self.criteria = criteria;
        self.page = self.page.with_offset(0);
        self.refresh()
    }

    /// Change the page size; returns to the first page
    pub fn set_limit(&mut self, limit: usize) -> FetchTicket {
        self.page = PageState::new(limit);
        self.refresh()
    }

    /// Move to `offset`, re-slicing the local cache when it still applies
    pub fn set_offset(&mut self, offset: usize) -> Option<FetchTicket> {
        self.page = self.page.with_offset(offset);

        if let Some(cache) = &self.cache {
            if cache.is_valid_for(&self.criteria, self.page.limit) {
                debug!(offset, "re-slicing local filter cache");
                self.view = Some(Pager::local(cache, self.page));
                return None;
            }
        }

        Some(self.begin())
    }

    /// Go to the next page; does nothing while there are no more records
    pub fn next_page(&mut self) -> Option<FetchTicket> {
        let next = Pager::next(self.page, self.can_next())?;
        self.set_offset(next.offset)
    }

    /// Go to the previous page; does nothing on the first page
    pub fn previous_page(&mut self) -> Option<FetchTicket> {
        if !self.can_previous() {
            return None;
        }
        self.set_offset(Pager::previous(self.page).offset)
    }

    /// Apply a completed fetch. Returns false when a newer fetch superseded it.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.generation != self.generation {
            debug!(
                stale = outcome.generation,
                current = self.generation,
                "discarding superseded log response"
            );
            return false;
        }

        self.loading = false;

        match outcome.result {
            Ok(Fetched::Remote(response)) => {
                self.cache = None;
                self.error = None;
                self.view = Some(Pager::remote(response, self.page));
            }
            Ok(Fetched::Local(cache)) => {
                self.error = None;
                self.view = Some(Pager::local(&cache, self.page));
                self.cache = Some(cache);
            }
            Err(e) => {
                debug!(error = %e, "failed to load logs");
                self.cache = None;
                self.view = None;
                self.error = Some(e);
            }
        }

        true
    }

    /// Run a ticket inline and apply its outcome
    pub async fn load(&mut self, source: &dyn LogSource, ticket: FetchTicket) -> bool {
        let outcome = ticket.run(source).await;
        self.apply(outcome)
    }
}
