//! Prompt Firewall log API client for fwscope
//!
//! This crate provides the remote log source: paged log queries and the
//! export endpoint, behind the [`LogSource`] trait.

mod config;
mod error;
mod http;
mod source;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpLogSource;
pub use source::{LogQuery, LogSource};

// Re-export types used in our public API
pub use fwscope_types::{ExportFormat, FilterCriteria, LogEntry, LogPage};
