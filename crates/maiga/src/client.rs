use crate::error::MaigaError;
use crate::models::describe_status_failure;
use anyhow::Result;
use maiga_core::config::AppConfig;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::{self, Value};
use tracing::{debug, info, instrument};

pub const PARTNER_TOKEN_HEADER: &str = "x-partner-token";

/// Client for the Maiga partner API.
///
/// Every call is a single `POST` with a JSON body; nothing is retried or cached, so one
/// instance can be shared freely across concurrent tool calls.
#[derive(Clone)]
pub struct MaigaRestClient {
    http: Client,
    base_url: String,
    api_token: String,
    debug: bool,
}

impl std::fmt::Debug for MaigaRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaigaRestClient")
            .field("base_url", &self.base_url)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl MaigaRestClient {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let token = config.require_api_token()?;
        Ok(Self::new(config.api_base_url.clone(), token)?.with_debug(config.debug))
    }

    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("maiga-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MaigaError::from)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            debug: false,
        })
    }

    /// Log request and response bodies at `info` level.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `endpoint` and return the decoded JSON response.
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn post<B>(&self, endpoint: &str, body: &B) -> Result<Value, MaigaError>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.prepare_request(endpoint, body)?;
        self.execute(builder).await
    }

    fn prepare_request<B>(&self, endpoint: &str, body: &B) -> Result<RequestBuilder, MaigaError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let payload = serde_json::to_string(body)?;

        if self.debug {
            info!(%url, body = %payload, "partner API request");
        } else {
            debug!(%url, "partner API request");
        }

        let mut token = HeaderValue::from_str(&self.api_token)?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(PARTNER_TOKEN_HEADER, token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(self.http.post(url).headers(headers).body(payload))
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Value, MaigaError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if self.debug {
            info!(status = status.as_u16(), %body, "partner API response");
        } else {
            debug!(status = status.as_u16(), "partner API response");
        }

        if !status.is_success() {
            return Err(MaigaError::HttpStatus {
                status,
                message: describe_status_failure(status, &body),
            });
        }

        serde_json::from_str::<Value>(&body).map_err(|_| MaigaError::Deserialize { body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maiga_test_support::{unreachable_base_url, MockUpstream};
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn post_sends_token_header_and_json_body() {
        let upstream = MockUpstream::start(200, r#"{"ok":true}"#).await.unwrap();
        let client = MaigaRestClient::new(upstream.base_url(), "partner-secret").unwrap();

        let value = client
            .post("/partner/analyse", &json!({"identifier": "BTC"}))
            .await
            .unwrap();
        assert_eq!(value, json!({"ok": true}));

        let request = upstream.only_request();
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/partner/analyse");
        assert_eq!(request.header("x-partner-token"), Some("partner-secret"));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.json_body(), json!({"identifier": "BTC"}));
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_ignored() {
        let upstream = MockUpstream::start(200, "{}").await.unwrap();
        let base = format!("{}/", upstream.base_url());
        let client = MaigaRestClient::new(base, "t").unwrap();

        client.post("/partner/kol", &json!({})).await.unwrap();
        assert_eq!(upstream.only_request().path, "/partner/kol");
    }

    #[tokio::test]
    async fn server_error_with_plain_body_surfaces_raw_text() {
        let upstream = MockUpstream::start(500, "oops").await.unwrap();
        let client = MaigaRestClient::new(upstream.base_url(), "t").unwrap();

        let err = client.post("/partner/report", &json!({})).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(err.to_string(), "oops");
    }

    #[tokio::test]
    async fn rate_limit_is_reported_with_retry_hint() {
        let upstream = MockUpstream::start(
            429,
            r#"{"message":"slow down","retry_after_seconds":30}"#,
        )
        .await
        .unwrap();
        let client = MaigaRestClient::new(upstream.base_url(), "t").unwrap();

        let err = client.post("/partner/mindshare", &json!({})).await.unwrap_err();
        let text = err.to_string();
        assert!(text.contains("slow down"), "{text}");
        assert!(text.contains("30"), "{text}");
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_parse_failure() {
        let upstream = MockUpstream::start(200, "{not json").await.unwrap();
        let client = MaigaRestClient::new(upstream.base_url(), "t").unwrap();

        let err = client.post("/partner/token-info", &json!({})).await.unwrap_err();
        assert!(matches!(err, MaigaError::Deserialize { .. }));
        assert_eq!(err.to_string(), "Failed to parse API response: {not json");
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        let client = MaigaRestClient::new(unreachable_base_url().unwrap(), "t").unwrap();

        let err = client.post("/partner/analyse", &json!({})).await.unwrap_err();
        assert!(matches!(err, MaigaError::HttpClient(_)));
        assert!(err.to_string().starts_with("API request failed: "));
    }

    #[tokio::test]
    async fn debug_mode_logs_exchange_without_token() {
        let upstream = MockUpstream::start(200, r#"{"ok":true}"#).await.unwrap();
        let client = MaigaRestClient::new(upstream.base_url(), "partner-secret")
            .unwrap()
            .with_debug(true);

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();
        // The test runtime is single-threaded, so the thread-local default covers the await.
        let _guard = tracing::subscriber::set_default(subscriber);

        client
            .post("/partner/analyse", &json!({"identifier": "BTC"}))
            .await
            .unwrap();

        let output = logs.contents();
        assert!(
            output.contains(&format!("{}/partner/analyse", upstream.base_url())),
            "{output}"
        );
        assert!(output.contains(r#"{"identifier":"BTC"}"#), "{output}");
        assert!(output.contains("status=200"), "{output}");
        assert!(output.contains(r#"{"ok":true}"#), "{output}");
        assert!(!output.contains("partner-secret"), "{output}");
    }

    #[test]
    fn debug_output_does_not_leak_token() {
        let client = MaigaRestClient::new("http://localhost", "partner-secret").unwrap();
        assert!(!format!("{client:?}").contains("partner-secret"));
    }

    #[test]
    fn from_config_requires_token() {
        assert!(MaigaRestClient::from_config(&AppConfig::default()).is_err());

        let config = AppConfig::default()
            .with_api_token("t")
            .with_base_url("http://localhost:1/");
        let client = MaigaRestClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1");
    }
}
