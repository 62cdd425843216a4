use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use fwscope_client::LogSource;
use fwscope_types::{ExportFormat, FilterCriteria, LogEntry, LogPage, QueryMode};

use crate::error::ExportResult;
use crate::plan::{DEFAULT_FETCH_CEILING, resolve};

/// Header line of the CSV export, shared with the service
pub const CSV_HEADER: &str = "id,request_id,timestamp,decision,risk_count";

/// A finished export, ready to be written
#[derive(Clone, Debug, PartialEq)]
pub struct ExportArtifact {
    /// `logs-<YYYY-MM-DD>.<ext>`
    pub file_name: String,
    pub format: ExportFormat,
    pub body: String,
    /// Mode that produced the body
    pub mode: QueryMode,
    /// Exported record count, when built locally
    pub record_count: Option<usize>,
}

impl ExportArtifact {
    /// Write into `dir`, replacing any file of the same name.
    ///
    /// The body goes to a hidden sibling first and is renamed into place, so
    /// a failed write never leaves a partial export behind.
    pub fn write_to(&self, dir: &Path) -> ExportResult<PathBuf> {
        let path = dir.join(&self.file_name);
        let partial = dir.join(format!(".{}.part", self.file_name));

        if let Err(e) = fs::write(&partial, &self.body).and_then(|_| fs::rename(&partial, &path)) {
            let _ = fs::remove_file(&partial);
            return Err(e.into());
        }

        info!(path = %path.display(), bytes = self.body.len(), "wrote log export");
        Ok(path)
    }
}

/// Download file name for an export made on `date`
pub fn export_file_name(format: ExportFormat, date: NaiveDate) -> String {
    format!("logs-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Serialize records the way the service's CSV export does
pub fn to_csv(entries: &[LogEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for entry in entries {
        lines.push(format!(
            "{},{},{},{},{}",
            entry.id,
            quoted(&entry.request_id),
            quoted(&entry.timestamp),
            quoted(entry.decision.as_str()),
            entry.risk_count()
        ));
    }

    lines.join("\n")
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Serialize records as a single unpaged log page
pub fn to_json(entries: Vec<LogEntry>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&LogPage::whole(entries))
}

/// Builds exports of the full filtered set, independent of what is on screen
#[derive(Clone, Copy, Debug)]
pub struct Exporter {
    ceiling: usize,
}

impl Exporter {
    /// Local-mode exports fetch at most `ceiling` records, the same bound the
    /// table uses, so both agree on what matches.
    pub fn new(ceiling: usize) -> Self {
        Self { ceiling }
    }

    /// Export with today's UTC date in the file name
    pub async fn export_now(
        &self,
        source: &dyn LogSource,
        criteria: &FilterCriteria,
        format: ExportFormat,
    ) -> ExportResult<ExportArtifact> {
        self.export(source, criteria, format, Utc::now().date_naive())
            .await
    }

    /// Build the export for `criteria`
    pub async fn export(
        &self,
        source: &dyn LogSource,
        criteria: &FilterCriteria,
        format: ExportFormat,
        date: NaiveDate,
    ) -> ExportResult<ExportArtifact> {
        let plan = resolve(criteria);
        let file_name = export_file_name(format, date);

        match plan.mode {
            QueryMode::Remote => {
                let body = source.fetch_export(&plan.remote_criteria, format).await?;
                debug!(%format, bytes = body.len(), "passing through service export");
                Ok(ExportArtifact {
                    file_name,
                    format,
                    body,
                    mode: QueryMode::Remote,
                    record_count: None,
                })
            }
            QueryMode::Local => {
                let bulk = source.fetch_page(&plan.bulk_query(self.ceiling)).await?;
                let (entries, total) = plan.filter_local(bulk);
                debug!(%format, total, "serializing locally filtered export");

                let body = match format {
                    ExportFormat::Csv => to_csv(&entries),
                    ExportFormat::Json => to_json(entries)?,
                };

                Ok(ExportArtifact {
                    file_name,
                    format,
                    body,
                    mode: QueryMode::Local,
                    record_count: Some(total),
                })
            }
        }
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_CEILING)
    }
}
