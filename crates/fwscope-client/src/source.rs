use std::sync::Arc;

use async_trait::async_trait;

use fwscope_types::{ExportFormat, FilterCriteria, LogPage};

use crate::ClientResult;

/// A request for one page of logs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogQuery {
    pub criteria: FilterCriteria,
    pub limit: usize,
    pub offset: usize,
}

impl LogQuery {
    pub fn new(criteria: FilterCriteria, limit: usize, offset: usize) -> Self {
        Self {
            criteria,
            limit,
            offset,
        }
    }

    /// Query string pairs for `GET /v1/logs`
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = criteria_params(&self.criteria);
        params.push(("limit", self.limit.to_string()));
        params.push(("offset", self.offset.to_string()));
        params.push(("format", ExportFormat::Json.as_str().to_string()));
        params
    }
}

/// Query string pairs for the filter fields that are set
pub(crate) fn criteria_params(criteria: &FilterCriteria) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(risk_type) = &criteria.risk_type {
        params.push(("type", risk_type.clone()));
    }
    if let Some(severity) = criteria.severity {
        params.push(("severity", severity.as_str().to_string()));
    }
    if let Some(from) = criteria.date_from {
        params.push(("date_from", from.format("%Y-%m-%d").to_string()));
    }
    if let Some(to) = criteria.date_to {
        params.push(("date_to", to.format("%Y-%m-%d").to_string()));
    }
    params
}

/// Remote source of recorded firewall decisions
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Fetch one page; the service applies every filter it is given
    async fn fetch_page(&self, query: &LogQuery) -> ClientResult<LogPage>;

    /// Fetch the service's own export payload for the whole filtered set
    async fn fetch_export(&self, criteria: &FilterCriteria, format: ExportFormat)
        -> ClientResult<String>;
}

#[async_trait]
impl<T: LogSource + ?Sized> LogSource for Arc<T> {
    async fn fetch_page(&self, query: &LogQuery) -> ClientResult<LogPage> {
        (**self).fetch_page(query).await
    }

    async fn fetch_export(
        &self,
        criteria: &FilterCriteria,
        format: ExportFormat,
    ) -> ClientResult<String> {
        (**self).fetch_export(criteria, format).await
    }
}
