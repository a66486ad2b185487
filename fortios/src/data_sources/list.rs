//! Key listing for CMDB tables

use crate::resources::meta::{self, ResourceOptions};
use crate::resources::ResourceSpec;
use crate::FortiosProviderData;
use async_trait::async_trait;
use fortiplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use fortiplug::schema::SchemaBuilder;
use fortiplug::validator::validate_config;
use fortiplug::{coerce_integer, AttributePath, Diagnostic, Dynamic, DynamicValue, Field, Schema};
use serde_json::Value;
use std::collections::HashMap;

pub const FILTER: &str = "filter";

/// `<type>_list`: the keys of every entry in a table, optionally narrowed
/// by a FortiOS filter expression such as `name=@web`.
pub struct CmdbListDataSource {
    spec: &'static ResourceSpec,
    type_name: String,
    provider_data: Option<FortiosProviderData>,
}

impl CmdbListDataSource {
    /// `None` for singletons, which have nothing to list.
    pub fn new(spec: &'static ResourceSpec) -> Option<Self> {
        spec.mkey?;
        Some(Self {
            spec,
            type_name: Self::type_name_for(spec),
            provider_data: None,
        })
    }

    pub fn type_name_for(spec: &ResourceSpec) -> String {
        format!("{}_list", spec.type_name)
    }

    fn list_attribute(spec: &ResourceSpec) -> String {
        format!("{}list", spec.mkey.unwrap_or("name"))
    }

    fn fields(spec: &ResourceSpec) -> Vec<Field> {
        let list_name = Self::list_attribute(spec);
        let list = if spec.mkey_is_integer() {
            Field::integer_list(&list_name)
        } else {
            Field::string_list(&list_name)
        };

        vec![
            Field::string(meta::ID).computed().build(),
            Field::string(FILTER)
                .optional()
                .description("Filter expression, e.g. name=@web.")
                .build(),
            Field::string(meta::VDOMPARAM).optional().max_length(31).build(),
            list.computed()
                .description("Keys of the matching entries.")
                .build(),
        ]
    }

    pub fn schema_for(spec: &ResourceSpec) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description(&format!("Lists {} entries.", spec.name))
            .fields(Self::fields(spec))
            .build()
    }

    fn key_value(&self, object: &serde_json::Map<String, Value>) -> Option<Dynamic> {
        let field = self.spec.mkey_field()?;
        let value = object.get(&field.wire_name)?;
        if self.spec.mkey_is_integer() {
            return coerce_integer(value).map(Dynamic::Int);
        }
        match value {
            Value::String(s) => Some(Dynamic::string(s.clone())),
            Value::Number(n) => Some(Dynamic::string(n.to_string())),
            _ => None,
        }
    }
}

#[async_trait]
impl DataSource for CmdbListDataSource {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn schema(&self, _request: DataSourceSchemaRequest) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_for(self.spec),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        let diagnostics = match request.config.to_fields() {
            Ok(config) => validate_config(&Self::fields(self.spec), &config, &AttributePath::root()),
            Err(e) => vec![Diagnostic::error("Invalid configuration", e.to_string())],
        };
        ValidateDataSourceConfigResponse { diagnostics }
    }

    async fn read(&self, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = self.provider_data.as_ref() else {
            diagnostics.push(super::not_configured());
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics,
            };
        };

        let config = match request.config.to_fields() {
            Ok(config) => config,
            Err(e) => {
                diagnostics.push(Diagnostic::error("Invalid configuration", e.to_string()));
                return ReadDataSourceResponse {
                    state: request.config,
                    diagnostics,
                };
            }
        };

        let filter = config
            .get(FILTER)
            .and_then(Dynamic::as_str)
            .unwrap_or_default()
            .to_string();
        let options = ResourceOptions::from_values(&config);
        let vdom = options.vdom(data.vdom.as_deref());

        let filter_arg = (!filter.is_empty()).then_some(filter.as_str());

        let entries = match data.client.list(self.spec.path, filter_arg, vdom).await {
            Ok(entries) => entries,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    format!("Error describing {} List from API: {}", self.spec.name, e),
                    e.to_string(),
                ));
                return ReadDataSourceResponse {
                    state: request.config,
                    diagnostics,
                };
            }
        };

        let keys: Vec<Dynamic> = entries.iter().filter_map(|e| self.key_value(e)).collect();
        tracing::debug!(data_source = %self.type_name, count = keys.len(), "Listed entries");

        let mut state: HashMap<String, Dynamic> = HashMap::new();
        state.insert(
            meta::ID.to_string(),
            Dynamic::string(format!("DataSource{}List{}", self.spec.name, filter)),
        );
        state.insert(Self::list_attribute(self.spec), Dynamic::List(keys));
        if !filter.is_empty() {
            state.insert(FILTER.to_string(), Dynamic::string(filter));
        }
        meta::copy_meta(&config, &mut state);

        ReadDataSourceResponse {
            state: DynamicValue::object(state),
            diagnostics,
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for CmdbListDataSource {
    async fn configure(
        &mut self,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        super::configure_provider_data(&self.type_name, request, &mut self.provider_data)
    }
}
