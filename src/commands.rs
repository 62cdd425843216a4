//! Non-interactive `list` and `export` commands

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result, bail};

use fwscope_logs::{ExportArtifact, ExportResult, Exporter, LogBrowser, LogSource, PageView};
use fwscope_types::{ExportFormat, FilterCriteria, LogEntry, PageState};

/// Load one page through the same pipeline the table uses and format it
pub async fn list(
    source: &dyn LogSource,
    criteria: FilterCriteria,
    page: PageState,
    ceiling: usize,
) -> Result<String> {
    let mut browser = LogBrowser::new(criteria, page, ceiling);
    let ticket = browser.refresh();
    browser.load(source, ticket).await;

    if let Some(e) = browser.error() {
        bail!("failed to load logs: {}", e);
    }
    let view = browser.view().context("no logs loaded")?;

    Ok(format_page(view, browser.page(), browser.mode().label()))
}

/// Build the export for `criteria` and write it into `dir`
pub async fn export(
    source: &dyn LogSource,
    criteria: &FilterCriteria,
    format: ExportFormat,
    ceiling: usize,
    dir: &Path,
) -> Result<String> {
    Ok(export_to(source, &Exporter::new(ceiling), criteria, format, dir).await?)
}

/// Export and write, returning the line reported to the operator
pub async fn export_to(
    source: &dyn LogSource,
    exporter: &Exporter,
    criteria: &FilterCriteria,
    format: ExportFormat,
    dir: &Path,
) -> ExportResult<String> {
    let artifact = exporter.export_now(source, criteria, format).await?;
    let path = artifact.write_to(dir)?;
    Ok(export_summary(&artifact, &path))
}

pub fn export_summary(artifact: &ExportArtifact, path: &Path) -> String {
    match artifact.record_count {
        Some(count) => format!("Exported {} logs to {}", count, path.display()),
        None => format!("Exported to {}", path.display()),
    }
}

fn format_page(view: &PageView, page: PageState, mode: &str) -> String {
    let mut out = String::new();
    for entry in &view.logs {
        let _ = writeln!(out, "{}", format_row(entry));
    }

    let position = match view.range() {
        Some((start, end)) => format!("{}-{} of {}", start + 1, end, view.total),
        None => format!("0 of {}", view.total),
    };
    let _ = writeln!(
        out,
        "-- page {} · {} · {} filtering{}",
        page.page_number(),
        position,
        mode,
        if view.has_more { " · more available" } else { "" }
    );
    out
}

fn format_row(entry: &LogEntry) -> String {
    format!(
        "{:>8}  {}  {}  {:<6}  {:>2}  {}",
        entry.id,
        entry.timestamp,
        entry.request_id,
        entry.decision.as_str(),
        entry.risk_count(),
        entry.risk_types().join(",")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwscope_client::{ClientConfig, HttpLogSource};
    use std::io;
    use std::sync::Arc;

    use fwscope_types::Decision;
    use mockito::Matcher;
    use parking_lot::Mutex;

    const BULK_BODY: &str = r#"{
        "logs": [
            {"id": 1, "request_id": "req-1", "timestamp": "2024-07-01T08:00:00Z", "decision": "redact",
             "risks": [{"type": "PII", "severity": "high", "match": "a@b.c",
                        "position": {"start": 0, "end": 5}, "explanation": "Email"}],
             "metadata": {}},
            {"id": 2, "request_id": "req-2", "timestamp": "2024-07-01T09:00:00Z", "decision": "allow",
             "risks": null, "metadata": {}}
        ],
        "total": 2, "limit": 1000, "offset": 0, "has_more": false
    }"#;

    fn source_for(server: &mockito::ServerGuard) -> HttpLogSource {
        HttpLogSource::new(&ClientConfig::new(server.url())).unwrap()
    }

    /// Collects formatted log output
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_format_row() {
        let entry = LogEntry::new(42, "req-42", "2024-07-01T08:00:00Z", Decision::Block);
        assert_eq!(
            format_row(&entry),
            "      42  2024-07-01T08:00:00Z  req-42  block    0  "
        );
    }

    #[tokio::test]
    async fn test_list_filters_locally() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/logs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "1000".into()),
                Matcher::UrlEncoded("offset".into(), "0".into()),
            ]))
            .with_status(200)
            .with_body(BULK_BODY)
            .create_async()
            .await;

        let criteria = FilterCriteria::new().with_risk_type(Some("PII"));
        let output = list(&source_for(&server), criteria, PageState::new(10), 1000)
            .await
            .unwrap();

        mock.assert_async().await;
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("req-1"));
        assert_eq!(lines[1], "-- page 1 · 1-1 of 1 · local filtering");
    }

    #[tokio::test]
    async fn test_list_reports_request_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/logs")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"detail":"Invalid authentication credentials"}"#)
            .create_async()
            .await;

        let err = list(&source_for(&server), FilterCriteria::new(), PageState::new(10), 1000)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid authentication credentials"));
    }

    #[tokio::test]
    async fn test_request_failures_stay_below_warn() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/logs")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"detail":"Not authenticated"}"#)
            .create_async()
            .await;
        let rejected = list(&source_for(&server), FilterCriteria::new(), PageState::new(10), 1000).await;

        let unreachable =
            HttpLogSource::new(&ClientConfig::new("http://127.0.0.1:9").with_timeout(2)).unwrap();
        let offline = list(&unreachable, FilterCriteria::new(), PageState::new(10), 1000).await;

        assert!(rejected.is_err());
        assert!(offline.is_err());
        // Anything at warn or above would land on the TUI's screen
        assert_eq!(String::from_utf8_lossy(&captured.0.lock()), "");
    }

    #[tokio::test]
    async fn test_export_writes_service_csv() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/logs")
            .match_query(Matcher::UrlEncoded("format".into(), "csv".into()))
            .with_status(200)
            .with_body("id,request_id,timestamp,decision,risk_count\n1,\"req-1\",\"t\",\"allow\",0")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let summary = export(
            &source_for(&server),
            &FilterCriteria::new(),
            ExportFormat::Csv,
            1000,
            dir.path(),
        )
        .await
        .unwrap();

        assert!(summary.starts_with("Exported to "));
        let written: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(written.len(), 1);
    }
}
