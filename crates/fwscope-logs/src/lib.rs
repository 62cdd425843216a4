//! Log query routing, paging and export for fwscope
//!
//! Decides per query whether the service can filter on its own or whether a
//! bounded bulk fetch must be filtered locally, then pages and exports
//! whichever set that produced.

mod browser;
mod cache;
mod error;
mod export;
mod filter;
mod pager;
mod plan;

#[cfg(test)]
mod testing;

pub use browser::{FetchOutcome, FetchTicket, LogBrowser};
pub use cache::LocalFilterCache;
pub use error::{ExportError, ExportResult};
pub use export::{CSV_HEADER, ExportArtifact, Exporter, export_file_name, to_csv, to_json};
pub use filter::RiskFilter;
pub use pager::{PageView, Pager};
pub use plan::{DEFAULT_FETCH_CEILING, Fetched, ResolvedPlan, fetch_set, resolve};

// Re-export types used in our public API
pub use fwscope_client::{ClientError, LogQuery, LogSource};
pub use fwscope_types::{ExportFormat, FilterCriteria, LogEntry, LogPage, PageState, QueryMode};
