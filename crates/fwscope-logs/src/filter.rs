use fwscope_types::{FilterCriteria, LogEntry, Severity};

/// In-memory predicate over an entry's risks.
///
/// A record matches when (no type is set OR some risk has that type) AND
/// (no severity is set OR some risk has that severity). The two constraints
/// may be satisfied by different risks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RiskFilter {
    /// Risk type to require (None = any)
    risk_type: Option<String>,

    /// Severity to require (None = any)
    severity: Option<Severity>,
}

impl RiskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the risk constraints out of a criteria set
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        Self {
            risk_type: criteria.risk_type.clone(),
            severity: criteria.severity,
        }
    }

    pub fn with_risk_type(mut self, risk_type: impl Into<String>) -> Self {
        self.risk_type = Some(risk_type.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Check if a log entry matches this filter
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(risk_type) = &self.risk_type {
            if !entry.has_risk_type(risk_type) {
                return false;
            }
        }

        if let Some(severity) = self.severity {
            if !entry.has_severity(severity) {
                return false;
            }
        }

        true
    }

    /// Keep matching records in their original order, with the match count
    pub fn apply(&self, records: Vec<LogEntry>) -> (Vec<LogEntry>, usize) {
        let filtered: Vec<LogEntry> = records.into_iter().filter(|e| self.matches(e)).collect();
        let total = filtered.len();
        (filtered, total)
    }
}
