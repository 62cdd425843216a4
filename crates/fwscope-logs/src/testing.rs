//! In-memory log source for tests

use async_trait::async_trait;
use parking_lot::Mutex;

use fwscope_client::{ClientError, ClientResult, LogQuery, LogSource};
use fwscope_types::{ExportFormat, FilterCriteria, LogEntry, LogPage, Position, Risk, Severity};

pub fn risk(risk_type: &str, severity: Severity) -> Risk {
    Risk {
        risk_type: risk_type.to_string(),
        severity,
        matched: "m".to_string(),
        position: Position { start: 0, end: 1 },
        explanation: "test".to_string(),
    }
}

/// Serves pages from a fixed record list and records every call.
///
/// Like the real service it rejects queries carrying risk constraints.
pub struct FakeSource {
    records: Vec<LogEntry>,
    export_body: String,
    failure: Option<(u16, String)>,
    page_queries: Mutex<Vec<LogQuery>>,
    export_calls: Mutex<Vec<(FilterCriteria, ExportFormat)>>,
}

impl FakeSource {
    pub fn new(records: Vec<LogEntry>) -> Self {
        Self {
            records,
            export_body: String::new(),
            failure: None,
            page_queries: Mutex::new(Vec::new()),
            export_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_export_body(mut self, body: &str) -> Self {
        self.export_body = body.to_string();
        self
    }

    pub fn failing(mut self, status: u16, detail: &str) -> Self {
        self.failure = Some((status, detail.to_string()));
        self
    }

    pub fn page_calls(&self) -> usize {
        self.page_queries.lock().len()
    }

    pub fn page_queries(&self) -> Vec<LogQuery> {
        self.page_queries.lock().clone()
    }

    pub fn export_calls(&self) -> Vec<(FilterCriteria, ExportFormat)> {
        self.export_calls.lock().clone()
    }

    fn check(&self, criteria: &FilterCriteria) -> ClientResult<()> {
        if let Some((status, detail)) = &self.failure {
            return Err(ClientError::Request {
                status: *status,
                message: detail.clone(),
            });
        }
        if criteria.has_risk_constraint() {
            return Err(ClientError::Request {
                status: 500,
                message: "Internal server error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LogSource for FakeSource {
    async fn fetch_page(&self, query: &LogQuery) -> ClientResult<LogPage> {
        self.page_queries.lock().push(query.clone());
        self.check(&query.criteria)?;

        let total = self.records.len();
        let logs: Vec<LogEntry> = self
            .records
            .iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect();

        Ok(LogPage {
            logs,
            total,
            limit: query.limit,
            offset: query.offset,
            has_more: query.offset + query.limit < total,
        })
    }

    async fn fetch_export(
        &self,
        criteria: &FilterCriteria,
        format: ExportFormat,
    ) -> ClientResult<String> {
        self.export_calls
            .lock()
            .push((criteria.clone(), format));
        self.check(criteria)?;
        Ok(self.export_body.clone())
    }
}
