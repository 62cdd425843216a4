//! HTTP implementation of the log source

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use fwscope_types::{ExportFormat, FilterCriteria, LogPage};

use crate::source::criteria_params;
use crate::{ClientConfig, ClientError, ClientResult, LogQuery, LogSource};

const LOGS_PATH: &str = "v1/logs";

/// Log source backed by the Prompt Firewall REST API
#[derive(Debug, Clone)]
pub struct HttpLogSource {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpLogSource {
    /// Create a new source from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// GET the log endpoint and return the body of a successful response
    async fn get_logs(&self, params: &[(&'static str, String)]) -> ClientResult<String> {
        let url = format!("{}/{}", self.base_url, LOGS_PATH);
        let mut request = self.client.get(&url).query(params);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await.inspect_err(|e| {
            debug!(error = %e, "log request did not complete");
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = ClientError::from_status(status.as_u16(), &body);
            debug!(status = status.as_u16(), error = %err, "log request rejected");
            return Err(err);
        }

        Ok(body)
    }
}

#[async_trait]
impl LogSource for HttpLogSource {
    async fn fetch_page(&self, query: &LogQuery) -> ClientResult<LogPage> {
        debug!(limit = query.limit, offset = query.offset, "fetching log page");
        let body = self.get_logs(&query.to_params()).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_export(
        &self,
        criteria: &FilterCriteria,
        format: ExportFormat,
    ) -> ClientResult<String> {
        debug!(%format, "fetching service export");
        let mut params = criteria_params(criteria);
        params.push(("format", format.as_str().to_string()));
        self.get_logs(&params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwscope_types::{Decision, Severity};
    use mockito::Matcher;

    const PAGE_BODY: &str = r#"{
        "logs": [{
            "id": 3,
            "request_id": "req-3",
            "timestamp": "2024-05-01T12:00:00Z",
            "decision": "block",
            "risks": [{"type": "PROMPT_INJECTION", "severity": "high", "match": "ignore previous",
                       "position": {"start": 0, "end": 15}, "explanation": "Injection attempt"}],
            "metadata": {}
        }],
        "total": 41,
        "limit": 1,
        "offset": 2,
        "has_more": true
    }"#;

    fn source_for(server: &mockito::ServerGuard) -> HttpLogSource {
        HttpLogSource::new(&ClientConfig::new(server.url()).with_token("secret")).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_page_sends_params_and_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/logs")
            .match_header("authorization", "Bearer secret")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("date_from".into(), "2024-05-01".into()),
                Matcher::UrlEncoded("limit".into(), "1".into()),
                Matcher::UrlEncoded("offset".into(), "2".into()),
                Matcher::UrlEncoded("format".into(), "json".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PAGE_BODY)
            .create_async()
            .await;

        let criteria = FilterCriteria::new()
            .with_date_range(chrono::NaiveDate::from_ymd_opt(2024, 5, 1), None);
        let page = source_for(&server)
            .fetch_page(&LogQuery::new(criteria, 1, 2))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.total, 41);
        assert!(page.has_more);
        assert_eq!(page.logs[0].decision, Decision::Block);
        assert_eq!(page.logs[0].risks[0].severity, Severity::High);
    }

    #[tokio::test]
    async fn test_error_detail_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/logs")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"detail":"Internal server error"}"#)
            .create_async()
            .await;

        let err = source_for(&server)
            .fetch_page(&LogQuery::new(FilterCriteria::new(), 50, 0))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[tokio::test]
    async fn test_malformed_page_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/logs")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"items": []}"#)
            .create_async()
            .await;

        let err = source_for(&server)
            .fetch_page(&LogQuery::new(FilterCriteria::new(), 50, 0))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_export_passes_body_through() {
        let csv = "id,request_id,timestamp,decision,risk_count\n1,\"r1\",\"t\",\"allow\",0";
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/logs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("date_to".into(), "2024-06-30".into()),
                Matcher::UrlEncoded("format".into(), "csv".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "text/csv")
            .with_body(csv)
            .create_async()
            .await;

        let criteria = FilterCriteria::new()
            .with_date_range(None, chrono::NaiveDate::from_ymd_opt(2024, 6, 30));
        let body = source_for(&server)
            .fetch_export(&criteria, ExportFormat::Csv)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(body, csv);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Port 9 (discard) is not served in the test environment
        let source = HttpLogSource::new(&ClientConfig::new("http://127.0.0.1:9").with_timeout(2)).unwrap();
        let err = source
            .fetch_page(&LogQuery::new(FilterCriteria::new(), 50, 0))
            .await
            .unwrap_err();

        assert!(err.is_network());
    }
}
