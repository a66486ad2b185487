use fortiplug::FirmwareVersion;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use super::common::{cmdb_path, ApiQueryParams, CmdbResponse};
use super::error::ApiError;

/// FortiOS REST API client
///
/// Cheap to clone; clones share the HTTP connection pool and the cached
/// device firmware version.
#[derive(Clone)]
pub struct FortiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
    retry_config: RetryConfig,
    device_version: RwLock<Option<FirmwareVersion>>,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra attempts after the first one, for transient failures only
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub insecure: bool,
    pub max_idle_connections: usize,
    pub idle_timeout: Duration,
    pub connection_timeout: Duration,
    pub tcp_keepalive: Option<Duration>,
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            insecure: false,
            max_idle_connections: 10,
            idle_timeout: Duration::from_secs(90),
            connection_timeout: Duration::from_secs(10),
            tcp_keepalive: Some(Duration::from_secs(30)),
            retry: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    fn build_http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(self.insecure)
            .timeout(Duration::from_secs(self.retry.timeout_seconds))
            .connect_timeout(self.connection_timeout)
            .pool_idle_timeout(self.idle_timeout)
            .pool_max_idle_per_host(self.max_idle_connections);

        if let Some(keepalive) = self.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        builder.build()
    }
}

/// Normalizes a configured hostname into a base URL; `https` is assumed
/// when no scheme is given.
fn base_url(hostname: &str) -> Result<String, ApiError> {
    let trimmed = hostname.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::InvalidUrl("hostname is empty".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = url::Url::parse(&candidate)
        .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", hostname, e)))?;
    if url.host_str().is_none() {
        return Err(ApiError::InvalidUrl(format!("{}: missing host", hostname)));
    }

    Ok(candidate)
}

impl FortiClient {
    /// Create a new API client with default configuration
    pub fn new(hostname: &str, token: &str, insecure: bool) -> Result<Self, ApiError> {
        Self::with_config(
            hostname,
            token,
            ClientConfig {
                insecure,
                ..Default::default()
            },
        )
    }

    pub fn with_config(hostname: &str, token: &str, config: ClientConfig) -> Result<Self, ApiError> {
        let base_url = base_url(hostname)?;
        let http_client = config.build_http_client()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_header: format!("Bearer {}", token),
                retry_config: config.retry,
                device_version: RwLock::new(None),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Last firmware version seen, if any
    pub fn cached_device_version(&self) -> Option<FirmwareVersion> {
        self.inner
            .device_version
            .read()
            .ok()
            .and_then(|guard| guard.clone())
    }

    pub(crate) fn store_device_version(&self, version: FirmwareVersion) {
        if let Ok(mut guard) = self.inner.device_version.write() {
            *guard = Some(version);
        }
    }

    fn url(&self, path: &str, params: &ApiQueryParams) -> String {
        format!("{}{}{}", self.inner.base_url, path, params.to_query_string())
    }

    /// GET a CMDB table or object
    pub async fn cmdb_get(
        &self,
        path: &str,
        mkey: Option<&str>,
        params: &ApiQueryParams,
    ) -> Result<CmdbResponse, ApiError> {
        let url = self.url(&cmdb_path(path, mkey), params);
        self.execute_with_retry(
            || async {
                tracing::debug!("GET request to: {}", url);

                self.inner
                    .http_client
                    .get(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .send()
                    .await
            },
            path,
        )
        .await
    }

    /// POST a new table entry
    pub async fn cmdb_post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        params: &ApiQueryParams,
    ) -> Result<CmdbResponse, ApiError> {
        let url = self.url(&cmdb_path(path, None), params);
        self.execute_with_retry(
            || async {
                tracing::debug!("POST request to: {}", url);

                self.inner
                    .http_client
                    .post(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .json(body)
                    .send()
                    .await
            },
            path,
        )
        .await
    }

    /// PUT an existing entry, or a singleton when `mkey` is `None`
    pub async fn cmdb_put<B: Serialize + Sync>(
        &self,
        path: &str,
        mkey: Option<&str>,
        body: &B,
        params: &ApiQueryParams,
    ) -> Result<CmdbResponse, ApiError> {
        let url = self.url(&cmdb_path(path, mkey), params);
        self.execute_with_retry(
            || async {
                tracing::debug!("PUT request to: {}", url);

                self.inner
                    .http_client
                    .put(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .json(body)
                    .send()
                    .await
            },
            path,
        )
        .await
    }

    pub async fn cmdb_delete(
        &self,
        path: &str,
        mkey: &str,
        params: &ApiQueryParams,
    ) -> Result<CmdbResponse, ApiError> {
        let url = self.url(&cmdb_path(path, Some(mkey)), params);
        self.execute_with_retry(
            || async {
                tracing::debug!("DELETE request to: {}", url);

                self.inner
                    .http_client
                    .delete(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .send()
                    .await
            },
            path,
        )
        .await
    }

    /// GET a monitor endpoint, e.g. `system/status`
    pub async fn monitor_get(&self, path: &str) -> Result<CmdbResponse, ApiError> {
        let url = format!("{}/api/v2/monitor/{}", self.inner.base_url, path);
        self.execute_with_retry(
            || async {
                tracing::debug!("GET request to: {}", url);

                self.inner
                    .http_client
                    .get(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .send()
                    .await
            },
            path,
        )
        .await
    }

    /// Execute request with retry logic
    ///
    /// Only rate limiting, gateway errors, timeouts and connection failures
    /// are retried. Device-side rejections are returned immediately.
    async fn execute_with_retry<F, Fut>(
        &self,
        request_fn: F,
        path: &str,
    ) -> Result<CmdbResponse, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.inner.retry_config.max_retries {
            if attempt > 0 {
                let backoff = std::cmp::min(
                    self.inner
                        .retry_config
                        .initial_backoff_ms
                        .saturating_mul(2_u64.saturating_pow(attempt - 1)),
                    self.inner.retry_config.max_backoff_ms,
                );
                tracing::debug!(
                    "Retrying request to {} after {}ms (attempt {})",
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let error = match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return self.parse_success_response(response).await;
                    }

                    match status {
                        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                            ApiError::AuthError
                        }
                        reqwest::StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
                        reqwest::StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
                        reqwest::StatusCode::BAD_GATEWAY
                        | reqwest::StatusCode::SERVICE_UNAVAILABLE
                        | reqwest::StatusCode::GATEWAY_TIMEOUT => ApiError::ServiceUnavailable,
                        _ => match self.handle_error_response(response).await {
                            Ok(parsed) => return Ok(parsed),
                            Err(e) => e,
                        },
                    }
                }
                Err(e) if e.is_timeout() => {
                    ApiError::Timeout(self.inner.retry_config.timeout_seconds)
                }
                Err(e) if e.is_connect() => ApiError::ServiceUnavailable,
                Err(e) => ApiError::RequestError(e),
            };

            if !error.is_retryable() {
                return Err(error);
            }
            last_error = Some(error);
            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    /// Parse successful response
    async fn parse_success_response(
        &self,
        response: reqwest::Response,
    ) -> Result<CmdbResponse, ApiError> {
        let status = response.status().as_u16();
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        if text.trim().is_empty() {
            return Ok(CmdbResponse::default());
        }

        let parsed: CmdbResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })?;

        if parsed.is_error() {
            tracing::error!("API error response: {}", text);
            return Err(ApiError::Device {
                status: parsed.http_status.unwrap_or(status),
                code: parsed.error,
                cli_error: parsed.cli_error,
                message: text,
            });
        }

        Ok(parsed)
    }

    /// Handle error response
    async fn handle_error_response(
        &self,
        response: reqwest::Response,
    ) -> Result<CmdbResponse, ApiError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::error!("API error response: {}", text);

        let (code, cli_error) = match serde_json::from_str::<CmdbResponse>(&text) {
            Ok(envelope) => (envelope.error, envelope.cli_error),
            Err(_) => (None, None),
        };

        Err(ApiError::Device {
            status,
            code,
            cli_error,
            message: text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn fast_retry_client(url: &str, max_retries: u32) -> FortiClient {
        FortiClient::with_config(
            url,
            "secret-token",
            ClientConfig {
                retry: RetryConfig {
                    max_retries,
                    initial_backoff_ms: 1,
                    max_backoff_ms: 5,
                    timeout_seconds: 5,
                },
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn hostname_without_scheme_defaults_to_https() {
        let client = FortiClient::new("192.168.1.99", "token", true).unwrap();
        assert_eq!(client.base_url(), "https://192.168.1.99");

        let client = FortiClient::new("http://127.0.0.1:8080/", "token", true).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn empty_hostname_is_rejected() {
        assert!(matches!(
            FortiClient::new("  ", "token", true),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn sends_bearer_token_and_vdom() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/cmdb/firewall/address/web")
            .match_header("authorization", "Bearer secret-token")
            .match_query(Matcher::UrlEncoded("vdom".into(), "root".into()))
            .with_body(r#"{"status":"success","http_status":200,"results":[{"name":"web"}]}"#)
            .create_async()
            .await;

        let client = fast_retry_client(&server.url(), 0);
        let response = client
            .cmdb_get(
                "firewall/address",
                Some("web"),
                &ApiQueryParams::new().add("vdom", "root"),
            )
            .await
            .unwrap();

        assert_eq!(response.result_objects().len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_error_without_retry() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/cmdb/firewall/address")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;

        let client = fast_retry_client(&server.url(), 2);
        let result = client
            .cmdb_get("firewall/address", None, &ApiQueryParams::new())
            .await;
        assert!(matches!(result, Err(ApiError::AuthError)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rate_limit_is_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/monitor/system/status")
            .with_status(429)
            .expect(2)
            .create_async()
            .await;

        let client = fast_retry_client(&server.url(), 1);
        let result = client.monitor_get("system/status").await;

        assert!(matches!(result, Err(ApiError::RateLimited)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn not_found_maps_to_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/cmdb/firewall/address/gone")
            .with_status(404)
            .with_body(r#"{"status":"error","http_status":404,"error":-3}"#)
            .create_async()
            .await;

        let client = fast_retry_client(&server.url(), 0);
        let result = client
            .cmdb_get("firewall/address", Some("gone"), &ApiQueryParams::new())
            .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn device_errors_carry_code_and_cli_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/cmdb/firewall/address")
            .with_status(500)
            .with_body(
                r#"{"status":"error","http_status":500,"error":-5,"cli_error":"entry already exists"}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let client = fast_retry_client(&server.url(), 3);
        let result = client
            .cmdb_post(
                "firewall/address",
                &serde_json::json!({"name": "web"}),
                &ApiQueryParams::new(),
            )
            .await;

        match result {
            Err(ApiError::Device {
                status,
                code,
                cli_error,
                ..
            }) => {
                assert_eq!(status, 500);
                assert_eq!(code, Some(-5));
                assert_eq!(cli_error.as_deref(), Some("entry already exists"));
            }
            other => panic!("expected device error, got {:?}", other.map(|_| ())),
        }
        // not retried
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_inside_success_envelope() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/api/v2/cmdb/system/vxlan/vx1")
            .with_body(r#"{"status":"error","http_status":424,"error":-651}"#)
            .create_async()
            .await;

        let client = fast_retry_client(&server.url(), 0);
        let result = client
            .cmdb_put(
                "system/vxlan",
                Some("vx1"),
                &serde_json::json!({"vni": 1}),
                &ApiQueryParams::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(ApiError::Device {
                status: 424,
                code: Some(-651),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn service_unavailable_is_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/monitor/system/status")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let client = fast_retry_client(&server.url(), 2);
        let result = client.monitor_get("system/status").await;

        assert!(matches!(result, Err(ApiError::ServiceUnavailable)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn connection_failures_are_reported_after_retries() {
        let client = fast_retry_client("http://127.0.0.1:1", 1);
        let result = client.monitor_get("system/status").await;

        assert!(matches!(
            result,
            Err(ApiError::ServiceUnavailable) | Err(ApiError::RequestError(_))
        ));
    }
}
