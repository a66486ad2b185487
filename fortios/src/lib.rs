//! FortiOS provider
//!
//! Manages FortiGate configuration through the FortiOS CMDB REST API.
//! Resources and data sources are generated from the schema tables in
//! [`resources`].

pub mod api;
pub mod data_sources;
pub mod provider_data;
pub mod resources;

pub use provider_data::FortiosProviderData;

use api::{ClientConfig, FortiClient, RetryConfig};
use async_trait::async_trait;
use data_sources::{CmdbDataSource, CmdbListDataSource, SystemStatusDataSource};
use fortiplug::data_source::{ConfigureDataSourceRequest, DataSourceWithConfigure};
use fortiplug::provider::{ConfigureProviderRequest, ConfigureProviderResponse};
use fortiplug::resource::{ConfigureResourceRequest, ResourceWithConfigure};
use fortiplug::schema::SchemaBuilder;
use fortiplug::{
    DataSource, Diagnostic, Dynamic, Field, PlugError, Provider, Resource, Result, Schema,
};
use resources::CmdbResource;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

pub const HOSTNAME_ENV: &str = "FORTIOS_ACCESS_HOSTNAME";
pub const TOKEN_ENV: &str = "FORTIOS_ACCESS_TOKEN";
pub const INSECURE_ENV: &str = "FORTIOS_INSECURE";
pub const VDOM_ENV: &str = "FORTIOS_VDOM";
pub const RETRIES_ENV: &str = "FORTIOS_RETRIES";

#[derive(Default)]
pub struct FortiosProvider {
    provider_data: Option<FortiosProviderData>,
}

impl FortiosProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider already wired to a transport, bypassing `configure`.
    pub fn with_provider_data(provider_data: FortiosProviderData) -> Self {
        Self {
            provider_data: Some(provider_data),
        }
    }

    pub fn provider_data(&self) -> Option<&FortiosProviderData> {
        self.provider_data.as_ref()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manage FortiGate configuration through the FortiOS REST API")
            .field(
                Field::string("hostname")
                    .optional()
                    .description("Device address, optionally with a port. Can also be set with FORTIOS_ACCESS_HOSTNAME.")
                    .build(),
            )
            .field(
                Field::string("token")
                    .optional()
                    .sensitive()
                    .description("REST API administrator token. Can also be set with FORTIOS_ACCESS_TOKEN.")
                    .build(),
            )
            .field(
                Field::bool("insecure")
                    .optional()
                    .description("Skip TLS certificate verification")
                    .build(),
            )
            .field(
                Field::string("vdom")
                    .optional()
                    .description("Default virtual domain for all resources")
                    .build(),
            )
            .field(
                Field::integer("retries")
                    .optional()
                    .int_between(0, 10)
                    .description("Retries for transient API failures (default 1)")
                    .build(),
            )
            .build()
    }

    /// Configured resource instance with its concrete type, for callers that
    /// need planning or import.
    pub async fn resource(&self, name: &str) -> Result<CmdbResource> {
        let data = self.shared_data()?;
        let spec = resources::lookup(name)
            .ok_or_else(|| PlugError::ResourceNotFound(name.to_string()))?;

        let mut resource = CmdbResource::new(spec);
        let response = resource
            .configure(ConfigureResourceRequest {
                provider_data: Some(data),
            })
            .await;
        first_error(&response.diagnostics)?;

        Ok(resource)
    }

    fn shared_data(&self) -> Result<Arc<dyn Any + Send + Sync>> {
        match &self.provider_data {
            Some(data) => Ok(Arc::new(data.clone())),
            None => Err(PlugError::ProviderNotConfigured),
        }
    }
}

fn first_error(diagnostics: &[Diagnostic]) -> Result<()> {
    match diagnostics.iter().find(|d| d.is_error()) {
        Some(diag) => Err(PlugError::Custom(format!("{}: {}", diag.summary, diag.detail))),
        None => Ok(()),
    }
}

fn config_string(config: &HashMap<String, Dynamic>, key: &str, env: &str) -> Option<String> {
    config
        .get(key)
        .and_then(Dynamic::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(env).ok().filter(|s| !s.is_empty()))
}

#[async_trait]
impl Provider for FortiosProvider {
    fn type_name(&self) -> &str {
        "fortios"
    }

    fn schema(&self) -> Schema {
        Self::schema_static()
    }

    async fn configure(&mut self, request: ConfigureProviderRequest) -> ConfigureProviderResponse {
        let mut diagnostics = vec![];

        let config = match request.config.to_fields() {
            Ok(config) => config,
            Err(e) => {
                diagnostics.push(Diagnostic::error("Invalid provider configuration", e.to_string()));
                return ConfigureProviderResponse { diagnostics };
            }
        };

        let hostname = config_string(&config, "hostname", HOSTNAME_ENV);
        let token = config_string(&config, "token", TOKEN_ENV);
        let vdom = config_string(&config, "vdom", VDOM_ENV);

        let insecure = config
            .get("insecure")
            .and_then(Dynamic::as_bool)
            .or_else(|| {
                std::env::var(INSECURE_ENV)
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok())
            })
            .unwrap_or(false);

        let retries = match config.get("retries").and_then(Dynamic::as_i64) {
            Some(retries) => Some(retries),
            None => match std::env::var(RETRIES_ENV) {
                Ok(value) => match value.parse::<i64>() {
                    Ok(retries) => Some(retries),
                    Err(_) => {
                        diagnostics.push(Diagnostic::error(
                            "Invalid retries",
                            format!("{} must be a non-negative integer, got '{}'", RETRIES_ENV, value),
                        ));
                        None
                    }
                },
                Err(_) => None,
            },
        };
        let max_retries = match retries.map(u32::try_from) {
            Some(Ok(retries)) => retries,
            Some(Err(_)) => {
                diagnostics.push(Diagnostic::error(
                    "Invalid retries",
                    "retries must be a non-negative integer",
                ));
                RetryConfig::default().max_retries
            }
            None => RetryConfig::default().max_retries,
        };

        let (hostname, token) = match (hostname, token) {
            (Some(hostname), Some(token)) => (hostname, token),
            (None, _) => {
                diagnostics.push(Diagnostic::error(
                    "hostname is required (set in provider config or FORTIOS_ACCESS_HOSTNAME env var)",
                    "The provider needs the address of the FortiGate to manage",
                ));
                return ConfigureProviderResponse { diagnostics };
            }
            (_, None) => {
                diagnostics.push(Diagnostic::error(
                    "token is required (set in provider config or FORTIOS_ACCESS_TOKEN env var)",
                    "The provider authenticates with a REST API administrator token",
                ));
                return ConfigureProviderResponse { diagnostics };
            }
        };

        if diagnostics.iter().any(Diagnostic::is_error) {
            return ConfigureProviderResponse { diagnostics };
        }

        let client_config = ClientConfig {
            insecure,
            retry: RetryConfig {
                max_retries,
                ..Default::default()
            },
            ..Default::default()
        };

        match FortiClient::with_config(&hostname, &token, client_config) {
            Ok(client) => {
                tracing::info!(
                    base_url = client.base_url(),
                    vdom = vdom.as_deref().unwrap_or("(default)"),
                    "Configured FortiOS provider"
                );
                self.provider_data = Some(FortiosProviderData::new(client, vdom));
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    format!("Failed to create API client: {}", e),
                    e.to_string(),
                ));
            }
        }

        ConfigureProviderResponse { diagnostics }
    }

    async fn create_resource(&self, name: &str) -> Result<Box<dyn Resource>> {
        Ok(Box::new(self.resource(name).await?))
    }

    async fn create_data_source(&self, name: &str) -> Result<Box<dyn DataSource>> {
        let data = self.shared_data()?;
        let request = ConfigureDataSourceRequest {
            provider_data: Some(data),
        };

        if name == data_sources::system_status::TYPE_NAME {
            let mut ds = SystemStatusDataSource::new();
            first_error(&ds.configure(request).await.diagnostics)?;
            return Ok(Box::new(ds));
        }

        if let Some(spec) = resources::lookup(name) {
            let mut ds = CmdbDataSource::new(spec);
            first_error(&ds.configure(request).await.diagnostics)?;
            return Ok(Box::new(ds));
        }

        let list = resources::CATALOG
            .iter()
            .copied()
            .filter_map(CmdbListDataSource::new)
            .find(|ds| ds.type_name() == name);
        match list {
            Some(mut ds) => {
                first_error(&ds.configure(request).await.diagnostics)?;
                Ok(Box::new(ds))
            }
            None => Err(PlugError::DataSourceNotFound(name.to_string())),
        }
    }

    async fn resource_schemas(&self) -> HashMap<String, Schema> {
        static SCHEMAS: OnceLock<HashMap<String, Schema>> = OnceLock::new();

        SCHEMAS
            .get_or_init(|| {
                resources::CATALOG
                    .iter()
                    .map(|spec| (spec.type_name.to_string(), CmdbResource::schema_for(spec)))
                    .collect()
            })
            .clone()
    }

    async fn data_source_schemas(&self) -> HashMap<String, Schema> {
        static SCHEMAS: OnceLock<HashMap<String, Schema>> = OnceLock::new();

        SCHEMAS
            .get_or_init(|| {
                let mut schemas = HashMap::new();
                schemas.insert(
                    data_sources::system_status::TYPE_NAME.to_string(),
                    SystemStatusDataSource::schema_static(),
                );
                for spec in resources::CATALOG {
                    schemas.insert(spec.type_name.to_string(), CmdbDataSource::schema_for(spec));
                    if !spec.is_singleton() {
                        schemas.insert(
                            CmdbListDataSource::type_name_for(spec),
                            CmdbListDataSource::schema_for(spec),
                        );
                    }
                }
                schemas
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortiplug::DynamicValue;
    use serial_test::serial;

    fn clear_env() {
        for var in [HOSTNAME_ENV, TOKEN_ENV, INSECURE_ENV, VDOM_ENV, RETRIES_ENV] {
            std::env::remove_var(var);
        }
    }

    fn empty_config() -> ConfigureProviderRequest {
        ConfigureProviderRequest {
            config: DynamicValue::null(),
        }
    }

    #[tokio::test]
    #[serial]
    async fn provider_configures_from_env_vars() {
        clear_env();
        std::env::set_var(HOSTNAME_ENV, "192.168.1.99");
        std::env::set_var(TOKEN_ENV, "secret-token");
        std::env::set_var(INSECURE_ENV, "true");
        std::env::set_var(VDOM_ENV, "dmz");

        let mut provider = FortiosProvider::new();
        let response = provider.configure(empty_config()).await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let data = provider.provider_data().unwrap();
        assert_eq!(data.vdom.as_deref(), Some("dmz"));

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_config_takes_precedence_over_env() {
        clear_env();
        std::env::set_var(VDOM_ENV, "from-env");

        let mut provider = FortiosProvider::new();
        let config = DynamicValue::object(HashMap::from([
            ("hostname".to_string(), Dynamic::string("fgt.example.com:8443")),
            ("token".to_string(), Dynamic::string("abc")),
            ("vdom".to_string(), Dynamic::string("root")),
            ("retries".to_string(), Dynamic::Int(3)),
        ]));
        let response = provider
            .configure(ConfigureProviderRequest { config })
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(provider.provider_data().unwrap().vdom.as_deref(), Some("root"));

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_hostname() {
        clear_env();
        std::env::set_var(TOKEN_ENV, "secret-token");

        let mut provider = FortiosProvider::new();
        let response = provider.configure(empty_config()).await;

        assert!(response.diagnostics[0].summary.contains("hostname is required"));
        assert!(provider.provider_data().is_none());

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_token() {
        clear_env();
        std::env::set_var(HOSTNAME_ENV, "192.168.1.99");

        let mut provider = FortiosProvider::new();
        let response = provider.configure(empty_config()).await;

        assert!(response.diagnostics[0].summary.contains("token is required"));

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_rejects_invalid_retries() {
        clear_env();
        std::env::set_var(HOSTNAME_ENV, "192.168.1.99");
        std::env::set_var(TOKEN_ENV, "secret-token");
        std::env::set_var(RETRIES_ENV, "many");

        let mut provider = FortiosProvider::new();
        let response = provider.configure(empty_config()).await;

        assert_eq!(response.diagnostics[0].summary, "Invalid retries");
        assert!(provider.provider_data().is_none());

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_creates_resources_after_configuration() {
        clear_env();
        std::env::set_var(HOSTNAME_ENV, "192.168.1.99");
        std::env::set_var(TOKEN_ENV, "secret-token");

        let mut provider = FortiosProvider::new();
        provider.configure(empty_config()).await;

        for spec in resources::CATALOG {
            let resource = provider.create_resource(spec.type_name).await.unwrap();
            assert_eq!(resource.type_name(), spec.type_name);
        }
        assert!(matches!(
            provider.create_resource("fortios_unknown").await,
            Err(PlugError::ResourceNotFound(_))
        ));

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_creates_data_sources_after_configuration() {
        clear_env();
        std::env::set_var(HOSTNAME_ENV, "192.168.1.99");
        std::env::set_var(TOKEN_ENV, "secret-token");

        let mut provider = FortiosProvider::new();
        provider.configure(empty_config()).await;

        let schemas = provider.data_source_schemas().await;
        for name in schemas.keys() {
            let ds = provider.create_data_source(name).await.unwrap();
            assert_eq!(ds.type_name(), name);
        }
        assert!(matches!(
            provider.create_data_source("fortios_log_fortianalyzer_override_setting_list").await,
            Err(PlugError::DataSourceNotFound(_))
        ));

        clear_env();
    }

    #[tokio::test]
    async fn provider_fails_to_create_resources_before_configuration() {
        let provider = FortiosProvider::new();

        let resource = provider.create_resource("fortios_firewall_address").await;
        assert!(matches!(resource, Err(PlugError::ProviderNotConfigured)));
    }

    #[tokio::test]
    async fn provider_schemas_cover_catalog() {
        let provider = FortiosProvider::new();

        let resource_schemas = provider.resource_schemas().await;
        assert_eq!(resource_schemas.len(), resources::CATALOG.len());
        assert!(resource_schemas["fortios_system_vxlan"].field("vdomparam").is_some());

        let data_source_schemas = provider.data_source_schemas().await;
        assert!(data_source_schemas.contains_key("fortios_system_status"));
        assert!(data_source_schemas.contains_key("fortios_router_static_list"));
        assert!(!data_source_schemas.contains_key("fortios_log_fortianalyzer_override_setting_list"));
    }
}
