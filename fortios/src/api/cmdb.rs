//! CMDB transport
//!
//! Resources talk to the device only through [`CmdbTransport`]. The
//! production implementation is [`FortiClient`]; tests can inject their own.

use super::client::FortiClient;
use super::common::ApiQueryParams;
use super::error::ApiError;
use super::monitor::SystemStatus;
use async_trait::async_trait;
use fortiplug::FirmwareVersion;
use serde_json::{Map, Value};

/// Outcome of a create or update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteResult {
    /// Key echoed by the device, if any
    pub mkey: Option<String>,
}

#[async_trait]
pub trait CmdbTransport: Send + Sync {
    /// `POST /api/v2/cmdb/{path}`
    async fn create(
        &self,
        path: &str,
        body: &Map<String, Value>,
        vdom: Option<&str>,
    ) -> Result<WriteResult, ApiError>;

    /// Reads one table entry, or the singleton when `mkey` is `None`.
    /// `Ok(None)` means the object does not exist.
    async fn read(
        &self,
        path: &str,
        mkey: Option<&str>,
        vdom: Option<&str>,
    ) -> Result<Option<Map<String, Value>>, ApiError>;

    /// `PUT /api/v2/cmdb/{path}[/{mkey}]`
    async fn update(
        &self,
        path: &str,
        mkey: Option<&str>,
        body: &Map<String, Value>,
        vdom: Option<&str>,
    ) -> Result<WriteResult, ApiError>;

    async fn delete(&self, path: &str, mkey: &str, vdom: Option<&str>) -> Result<(), ApiError>;

    /// All entries of a table, optionally narrowed by a FortiOS filter
    /// expression such as `name=@web`.
    async fn list(
        &self,
        path: &str,
        filter: Option<&str>,
        vdom: Option<&str>,
    ) -> Result<Vec<Map<String, Value>>, ApiError>;

    async fn system_status(&self) -> Result<SystemStatus, ApiError>;

    /// Refreshes and caches the device firmware version.
    async fn update_device_version(&self) -> Result<FirmwareVersion, ApiError>;

    /// Cached firmware version, `None` until a refresh succeeded.
    fn device_version(&self) -> Option<FirmwareVersion>;
}

fn vdom_params(vdom: Option<&str>) -> ApiQueryParams {
    ApiQueryParams::new().add_optional("vdom", vdom.filter(|v| !v.is_empty()))
}

#[async_trait]
impl CmdbTransport for FortiClient {
    async fn create(
        &self,
        path: &str,
        body: &Map<String, Value>,
        vdom: Option<&str>,
    ) -> Result<WriteResult, ApiError> {
        let response = self.cmdb_post(path, body, &vdom_params(vdom)).await?;
        Ok(WriteResult {
            mkey: response.mkey_string(),
        })
    }

    async fn read(
        &self,
        path: &str,
        mkey: Option<&str>,
        vdom: Option<&str>,
    ) -> Result<Option<Map<String, Value>>, ApiError> {
        match self.cmdb_get(path, mkey, &vdom_params(vdom)).await {
            Ok(response) => Ok(response.result_objects().into_iter().next()),
            Err(ApiError::NotFound(_)) => {
                tracing::debug!(path, mkey, "Object not found on device");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn update(
        &self,
        path: &str,
        mkey: Option<&str>,
        body: &Map<String, Value>,
        vdom: Option<&str>,
    ) -> Result<WriteResult, ApiError> {
        let response = self.cmdb_put(path, mkey, body, &vdom_params(vdom)).await?;
        Ok(WriteResult {
            mkey: response.mkey_string(),
        })
    }

    async fn delete(&self, path: &str, mkey: &str, vdom: Option<&str>) -> Result<(), ApiError> {
        self.cmdb_delete(path, mkey, &vdom_params(vdom)).await?;
        Ok(())
    }

    async fn list(
        &self,
        path: &str,
        filter: Option<&str>,
        vdom: Option<&str>,
    ) -> Result<Vec<Map<String, Value>>, ApiError> {
        let params = vdom_params(vdom).add_optional("filter", filter.filter(|f| !f.is_empty()));
        match self.cmdb_get(path, None, &params).await {
            Ok(response) => Ok(response.result_objects()),
            Err(ApiError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn system_status(&self) -> Result<SystemStatus, ApiError> {
        let response = self.monitor_get("system/status").await?;
        SystemStatus::from_response(response)
    }

    async fn update_device_version(&self) -> Result<FirmwareVersion, ApiError> {
        let version = self.system_status().await?.firmware_version()?;
        tracing::debug!(%version, "Device firmware version");
        self.store_device_version(version.clone());
        Ok(version)
    }

    fn device_version(&self) -> Option<FirmwareVersion> {
        self.cached_device_version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::create_test_client;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn read_returns_first_result() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/cmdb/firewall/address/web%2Fsrv")
            .match_query(Matcher::UrlEncoded("vdom".into(), "dmz".into()))
            .with_body(r#"{"status":"success","results":[{"name":"web/srv","subnet":"10.0.0.0 255.255.255.0"}]}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let object = client
            .read("firewall/address", Some("web/srv"), Some("dmz"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(object["subnet"], json!("10.0.0.0 255.255.255.0"));
    }

    #[tokio::test]
    async fn read_not_found_is_none() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/cmdb/firewall/address/gone")
            .with_status(404)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        assert!(client
            .read("firewall/address", Some("gone"), None)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn read_empty_results_is_none() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/cmdb/firewall/address/web")
            .with_body(r#"{"status":"success","results":[]}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        assert!(client
            .read("firewall/address", Some("web"), None)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn create_posts_body_and_returns_mkey() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/cmdb/router/static")
            .match_body(Matcher::Json(json!({"dst": "10.0.0.0/8", "device": "port1"})))
            .with_body(r#"{"status":"success","http_status":200,"mkey":7,"revision":"abc"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let body = json!({"dst": "10.0.0.0/8", "device": "port1"});
        let result = client
            .create("router/static", body.as_object().unwrap(), None)
            .await
            .unwrap();

        assert_eq!(result.mkey.as_deref(), Some("7"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn singleton_update_has_no_key_segment() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/v2/cmdb/log.fortianalyzer/override-setting")
            .with_body(r#"{"status":"success","http_status":200}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let body = json!({"status": "enable"});
        let result = client
            .update(
                "log.fortianalyzer/override-setting",
                None,
                body.as_object().unwrap(),
                None,
            )
            .await
            .unwrap();

        assert_eq!(result.mkey, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn list_passes_filter() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/cmdb/system/vxlan")
            .match_query(Matcher::UrlEncoded("filter".into(), "vni>100".into()))
            .with_body(r#"{"status":"success","results":[{"name":"a"},{"name":"b"}]}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let entries = client
            .list("system/vxlan", Some("vni>100"), None)
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn update_device_version_caches_result() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/monitor/system/status")
            .with_body(r#"{"status":"success","version":"v6.4.12","serial":"FGT","build":2060,"results":{"hostname":"fgt"}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        assert_eq!(CmdbTransport::device_version(&client), None);

        let version = client.update_device_version().await.unwrap();
        assert_eq!(version, FirmwareVersion::new(6, 4, 12));

        let clone = client.clone();
        assert_eq!(
            CmdbTransport::device_version(&clone),
            Some(FirmwareVersion::new(6, 4, 12))
        );
    }
}
