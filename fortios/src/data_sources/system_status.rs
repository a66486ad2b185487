//! Device status data source

use crate::FortiosProviderData;
use async_trait::async_trait;
use fortiplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use fortiplug::schema::SchemaBuilder;
use fortiplug::types::{AttributePath, Diagnostic, DynamicValue};
use fortiplug::{Field, Schema};

pub const TYPE_NAME: &str = "fortios_system_status";

#[derive(Default)]
pub struct SystemStatusDataSource {
    provider_data: Option<FortiosProviderData>,
}

impl SystemStatusDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Gets the FortiOS system status")
            .field(Field::string("id").computed().build())
            .field(
                Field::string("version")
                    .computed()
                    .description("Firmware version, e.g. v7.2.4")
                    .build(),
            )
            .field(Field::string("serial").computed().build())
            .field(Field::integer("build").computed().build())
            .field(Field::string("hostname").computed().build())
            .field(Field::string("model").computed().build())
            .field(Field::string("model_name").computed().build())
            .field(Field::string("model_number").computed().build())
            .build()
    }
}

#[async_trait]
impl DataSource for SystemStatusDataSource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn schema(&self, _request: DataSourceSchemaRequest) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn read(&self, _request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = self.provider_data.as_ref() else {
            diagnostics.push(super::not_configured());
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics,
            };
        };

        match provider_data.client.system_status().await {
            Ok(status) => {
                let mut state = DynamicValue::null();
                let _ = state.set_string(&AttributePath::new("id"), TYPE_NAME.to_string());
                let _ = state.set_string(&AttributePath::new("version"), status.version);
                let _ = state.set_string(&AttributePath::new("serial"), status.serial);
                let _ = state.set_int(&AttributePath::new("build"), status.build);
                let _ = state.set_string(&AttributePath::new("hostname"), status.hostname);
                let _ = state.set_string(&AttributePath::new("model"), status.model);
                let _ = state.set_string(&AttributePath::new("model_name"), status.model_name);
                let _ = state.set_string(&AttributePath::new("model_number"), status.model_number);

                ReadDataSourceResponse { state, diagnostics }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to get system status",
                    format!("API error: {}", e),
                ));
                ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                }
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for SystemStatusDataSource {
    async fn configure(
        &mut self,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        super::configure_provider_data(TYPE_NAME, request, &mut self.provider_data)
    }
}
