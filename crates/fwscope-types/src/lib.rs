//! Shared types for fwscope
//!
//! This crate contains the log record model returned by the Prompt Firewall
//! service and the query values used across the other fwscope crates.

use chrono::NaiveDate;
use ratatui::style::Color;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest page size the log endpoint accepts
pub const MIN_PAGE_LIMIT: usize = 1;

/// Largest page size the log endpoint accepts
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Page size used when nothing else is configured
pub const DEFAULT_PAGE_LIMIT: usize = 50;

// ============================================================================
// Log Record Types
// ============================================================================

/// Outcome the firewall reached for a request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Block,
    Redact,
    Warn,
    Allow,
}

impl Decision {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Redact => "redact",
            Self::Warn => "warn",
            Self::Allow => "allow",
        }
    }

    /// Get display color for this decision
    pub fn color(&self) -> Color {
        match self {
            Self::Block => Color::Red,
            Self::Redact => Color::Magenta,
            Self::Warn => Color::Yellow,
            Self::Allow => Color::Green,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Self::High, Self::Medium, Self::Low];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Get display color for this severity
    pub fn color(&self) -> Color {
        match self {
            Self::High => Color::Red,
            Self::Medium => Color::Yellow,
            Self::Low => Color::Cyan,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown severity '{}' (expected high, medium or low)", other)),
        }
    }
}

/// Risk categories the firewall's detectors emit.
///
/// Risk types travel as plain strings so records carrying other categories
/// still load; this list only drives the UI's filter cycling.
pub const KNOWN_RISK_TYPES: [&str; 4] = ["PII", "PHI", "PROMPT_INJECTION", "OTHER"];

/// Half-open `[start, end)` span into the inspected text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

/// A single finding within a log record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    #[serde(rename = "type")]
    pub risk_type: String,

    pub severity: Severity,

    /// Matched text
    #[serde(rename = "match", default)]
    pub matched: String,

    #[serde(default)]
    pub position: Position,

    #[serde(default)]
    pub explanation: String,
}

/// One request processed by the firewall
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,

    pub request_id: String,

    /// ISO-8601, kept exactly as the service sent it
    pub timestamp: String,

    pub decision: Decision,

    /// Findings in detection order (absent or null is treated as empty)
    #[serde(default, deserialize_with = "null_as_default")]
    pub risks: Vec<Risk>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl LogEntry {
    /// Create an entry with no risks or metadata
    pub fn new(id: i64, request_id: impl Into<String>, timestamp: impl Into<String>, decision: Decision) -> Self {
        Self {
            id,
            request_id: request_id.into(),
            timestamp: timestamp.into(),
            decision,
            risks: Vec::new(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Attach findings
    pub fn with_risks(mut self, risks: Vec<Risk>) -> Self {
        self.risks = risks;
        self
    }

    pub fn risk_count(&self) -> usize {
        self.risks.len()
    }

    /// Check whether any finding has the given category
    pub fn has_risk_type(&self, risk_type: &str) -> bool {
        self.risks.iter().any(|r| r.risk_type == risk_type)
    }

    /// Check whether any finding has the given severity
    pub fn has_severity(&self, severity: Severity) -> bool {
        self.risks.iter().any(|r| r.severity == severity)
    }

    /// Distinct risk categories, in first-seen order
    pub fn risk_types(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for risk in &self.risks {
            if !seen.contains(&risk.risk_type.as_str()) {
                seen.push(&risk.risk_type);
            }
        }
        seen
    }

    /// Highest severity among the findings
    pub fn max_severity(&self) -> Option<Severity> {
        Severity::ALL.into_iter().find(|s| self.has_severity(*s))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of records as the log endpoint returns it
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogPage {
    pub logs: Vec<LogEntry>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

impl LogPage {
    /// Wrap a complete result set as a single unpaged page
    pub fn whole(logs: Vec<LogEntry>) -> Self {
        let total = logs.len();
        Self {
            logs,
            total,
            limit: total,
            offset: 0,
            has_more: false,
        }
    }
}

// ============================================================================
// Query Types
// ============================================================================

/// Operator-supplied constraints on the log set.
///
/// Present fields combine with AND. The risk type and severity constraints
/// are each satisfied when any risk on the entry matches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FilterCriteria {
    pub risk_type: Option<String>,
    pub severity: Option<Severity>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the risk type constraint (blank clears it)
    pub fn with_risk_type(mut self, risk_type: Option<impl Into<String>>) -> Self {
        self.risk_type = risk_type
            .map(Into::into)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }

    pub fn with_severity(mut self, severity: Option<Severity>) -> Self {
        self.severity = severity;
        self
    }

    /// Set the inclusive date range
    pub fn with_date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    /// Whether a constraint on the nested risks is present
    pub fn has_risk_constraint(&self) -> bool {
        self.risk_type.is_some() || self.severity.is_some()
    }

    /// Query mode these criteria require
    pub fn mode(&self) -> QueryMode {
        if self.has_risk_constraint() {
            QueryMode::Local
        } else {
            QueryMode::Remote
        }
    }

    /// Copy keeping only the date range
    pub fn date_only(&self) -> Self {
        Self {
            risk_type: None,
            severity: None,
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }

    /// Check if no constraint is set
    pub fn is_empty(&self) -> bool {
        !self.has_risk_constraint() && self.date_from.is_none() && self.date_to.is_none()
    }

    /// Short human-readable summary for headers
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(t) = &self.risk_type {
            parts.push(format!("type={}", t));
        }
        if let Some(s) = self.severity {
            parts.push(format!("severity={}", s));
        }
        if let Some(d) = self.date_from {
            parts.push(format!("from={}", d));
        }
        if let Some(d) = self.date_to {
            parts.push(format!("to={}", d));
        }
        if parts.is_empty() {
            "all".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Where filtering happens for a given set of criteria
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryMode {
    /// Filtering and paging delegated to the service
    Remote,
    /// Bounded bulk fetch, filtered and paged in memory
    Local,
}

impl QueryMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

/// Pagination position of the log table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageState {
    pub limit: usize,
    pub offset: usize,
}

impl PageState {
    /// First page with the given size, clamped to the endpoint's bounds
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.clamp(MIN_PAGE_LIMIT, MAX_PAGE_LIMIT),
            offset: 0,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// One-based page number for display
    pub fn page_number(&self) -> usize {
        self.offset / self.limit.max(1) + 1
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}

/// Export payload format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Value of the `format` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown export format '{}' (expected csv or json)", other)),
        }
    }
}
