//! Common types and utilities for the FortiOS REST API

use serde::Deserialize;
use serde_json::{Map, Value};

/// Envelope returned by every FortiOS REST call
///
/// Reads carry `results` (an array for tables, an object for singletons);
/// writes carry `mkey`; failures carry `error` and
/// sometimes `cli_error`.
#[derive(Debug, Deserialize, Default)]
pub struct CmdbResponse {
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub results: Option<Value>,
    #[serde(default)]
    pub vdom: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mkey: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub http_status: Option<u16>,
    #[serde(default)]
    pub error: Option<i64>,
    #[serde(default)]
    pub cli_error: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub build: Option<i64>,
}

impl CmdbResponse {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }

    /// Write responses echo the key as a string or a number
    pub fn mkey_string(&self) -> Option<String> {
        self.mkey.as_ref().and_then(mkey_to_string)
    }

    /// Objects in `results`, whether the device sent a list or a single object
    pub fn result_objects(self) -> Vec<Map<String, Value>> {
        match self.results {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(obj) => Some(obj),
                    _ => None,
                })
                .collect(),
            Some(Value::Object(obj)) => vec![obj],
            _ => Vec::new(),
        }
    }
}

/// Key value as it appears in a URL path segment
pub fn mkey_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i.to_string()),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| (f as i64).to_string()),
        },
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

/// `/api/v2/cmdb/{path}[/{mkey}]` with the key percent-encoded
pub fn cmdb_path(path: &str, mkey: Option<&str>) -> String {
    match mkey {
        Some(key) => format!("/api/v2/cmdb/{}/{}", path, urlencoding::encode(key)),
        None => format!("/api/v2/cmdb/{}", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_read_envelope() {
        let body = json!({
            "http_method": "GET",
            "results": [{"name": "web", "subnet": "10.0.0.0 255.255.255.0"}],
            "vdom": "root",
            "path": "firewall",
            "name": "address",
            "status": "success",
            "http_status": 200,
            "serial": "FGVM02TM00000000",
            "version": "v7.2.4",
            "build": 1396
        });

        let response: CmdbResponse = serde_json::from_value(body).unwrap();
        assert!(!response.is_error());
        assert_eq!(response.version.as_deref(), Some("v7.2.4"));

        let objects = response.result_objects();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0]["name"], json!("web"));
    }

    #[test]
    fn singleton_results_are_objects() {
        let response: CmdbResponse =
            serde_json::from_value(json!({"results": {"status": "enable"}})).unwrap();
        assert_eq!(response.result_objects().len(), 1);
    }

    #[test]
    fn write_mkey_as_string_or_number() {
        let named: CmdbResponse = serde_json::from_value(json!({"mkey": "web"})).unwrap();
        assert_eq!(named.mkey_string().as_deref(), Some("web"));

        let numbered: CmdbResponse = serde_json::from_value(json!({"mkey": 12})).unwrap();
        assert_eq!(numbered.mkey_string().as_deref(), Some("12"));

        let float: CmdbResponse = serde_json::from_value(json!({"mkey": 12.0})).unwrap();
        assert_eq!(float.mkey_string().as_deref(), Some("12"));

        let missing = CmdbResponse::default();
        assert_eq!(missing.mkey_string(), None);
    }

    #[test]
    fn error_envelope() {
        let response: CmdbResponse = serde_json::from_value(json!({
            "status": "error",
            "http_status": 500,
            "error": -5,
            "cli_error": "entry already exists"
        }))
        .unwrap();

        assert!(response.is_error());
        assert_eq!(response.error, Some(-5));
    }

    #[test]
    fn cmdb_paths_encode_keys() {
        assert_eq!(cmdb_path("firewall/address", None), "/api/v2/cmdb/firewall/address");
        assert_eq!(
            cmdb_path("firewall/address", Some("web/srv 1")),
            "/api/v2/cmdb/firewall/address/web%2Fsrv%201"
        );
    }

    #[test]
    fn query_params() {
        let params = ApiQueryParams::new()
            .add("vdom", "root")
            .add_optional("filter", Some("name=@web"))
            .add_optional("none", None::<String>);

        let query = params.to_query_string();
        assert_eq!(query, "?vdom=root&filter=name%3D%40web");
        assert_eq!(ApiQueryParams::new().to_query_string(), "");
    }
}
