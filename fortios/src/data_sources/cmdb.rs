//! Single-object lookup for any CMDB table

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
use fortiplug::{
    flatten, AttributePath, Diagnostic, Dynamic, DynamicValue, Field, FlattenOptions, Schema,
};

/// Reads one object by key (or the singleton) with every field computed.
pub struct CmdbDataSource {
    spec: &'static ResourceSpec,
    provider_data: Option<FortiosProviderData>,
}

impl CmdbDataSource {
    pub fn new(spec: &'static ResourceSpec) -> Self {
        Self {
            spec,
            provider_data: None,
        }
    }

    fn fields(spec: &ResourceSpec) -> Vec<Field> {
        let mut fields: Vec<Field> = spec
            .fields()
            .iter()
            .map(|field| {
                if Some(field.name.as_str()) == spec.mkey {
                    Field {
                        required: true,
                        optional: false,
                        computed: false,
                        force_new: false,
                        plan_modifiers: Vec::new(),
                        ..field.clone()
                    }
                } else {
                    field.as_computed()
                }
            })
            .collect();

        fields.push(
            Field::string(meta::ID)
                .computed()
                .description("Identifier of the object on the device.")
                .build(),
        );
        fields.push(Field::string(meta::VDOMPARAM).optional().max_length(31).build());
        fields
    }

    pub fn schema_for(spec: &ResourceSpec) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description(spec.description)
            .fields(Self::fields(spec))
            .build()
    }
}

#[async_trait]
impl DataSource for CmdbDataSource {
    fn type_name(&self) -> &str {
        self.spec.type_name
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

        let mkey = match self.spec.mkey.and_then(|name| config.get(name)) {
            Some(Dynamic::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Dynamic::Int(i)) => Some(i.to_string()),
            _ => None,
        };
        if !self.spec.is_singleton() && mkey.is_none() {
            diagnostics.push(Diagnostic::error(
                format!("Error describing {} from API", self.spec.name),
                format!("{} is required", self.spec.mkey.unwrap_or_default()),
            ));
            return ReadDataSourceResponse {
                state: request.config,
                diagnostics,
            };
        }

        let options = ResourceOptions::from_values(&config);
        let vdom = options.vdom(data.vdom.as_deref());

        let object = match data
            .client
            .read(self.spec.path, mkey.as_deref(), vdom)
            .await
        {
            Ok(Some(object)) => object,
            Ok(None) => {
                diagnostics.push(Diagnostic::warning(
                    format!("{} not found", self.spec.name),
                    format!(
                        "No object at {} with key {}",
                        self.spec.path,
                        mkey.as_deref().unwrap_or("(singleton)")
                    ),
                ));
                return ReadDataSourceResponse {
                    state: request.config,
                    diagnostics,
                };
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    format!("Error describing {} from API: {}", self.spec.name, e),
                    e.to_string(),
                ));
                return ReadDataSourceResponse {
                    state: request.config,
                    diagnostics,
                };
            }
        };

        let flatten_options = FlattenOptions {
            get_all_tables: true,
            ..Default::default()
        };
        let mut state = match flatten(self.spec.fields(), &object, Some(&config), &flatten_options)
        {
            Ok(state) => state,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    format!("Error describing {} from API: {}", self.spec.name, e),
                    e.to_string(),
                ));
                return ReadDataSourceResponse {
                    state: request.config,
                    diagnostics,
                };
            }
        };

        let id = mkey.unwrap_or_else(|| self.spec.name.to_string());
        state.insert(meta::ID.to_string(), Dynamic::string(id));
        meta::copy_meta(&config, &mut state);

        ReadDataSourceResponse {
            state: DynamicValue::object(state),
            diagnostics,
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for CmdbDataSource {
    async fn configure(
        &mut self,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        super::configure_provider_data(self.spec.type_name, request, &mut self.provider_data)
    }
}
