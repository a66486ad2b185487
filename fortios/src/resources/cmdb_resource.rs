//! Generic CMDB resource
//!
//! Runs the create/read/update/delete lifecycle for any [`ResourceSpec`].
//! Every write is followed by a read so the new state always reflects what
//! the device stored.

use super::meta::{self, ResourceOptions};
use super::ResourceSpec;
use crate::api::ApiError;
use crate::FortiosProviderData;
use async_trait::async_trait;
use fortiplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ModifyPlanRequest,
    ModifyPlanResponse, ReadResourceRequest, ReadResourceResponse, ResourceSchemaRequest,
    ResourceSchemaResponse, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use fortiplug::schema::SchemaBuilder;
use fortiplug::validator::validate_config;
use fortiplug::{
    expand, flatten, import_state_passthrough_id, plan_resource_change, reset_object,
    AttributePath, Diagnostic, Dynamic, DynamicValue, ExpandOptions, FirmwareVersion,
    FlattenOptions, Resource, ResourceWithConfigure, ResourceWithImportState,
    ResourceWithModifyPlan, Schema,
};
use std::collections::HashMap;

pub struct CmdbResource {
    spec: &'static ResourceSpec,
    provider_data: Option<FortiosProviderData>,
}

impl CmdbResource {
    pub fn new(spec: &'static ResourceSpec) -> Self {
        Self {
            spec,
            provider_data: None,
        }
    }

    pub fn with_provider_data(spec: &'static ResourceSpec, data: FortiosProviderData) -> Self {
        Self {
            spec,
            provider_data: Some(data),
        }
    }

    pub fn spec(&self) -> &'static ResourceSpec {
        self.spec
    }

    pub fn schema_for(spec: &ResourceSpec) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description(spec.description)
            .fields(spec.resource_fields().iter().cloned())
            .build()
    }

    fn not_configured(&self) -> Diagnostic {
        Diagnostic::error(
            "Provider not configured",
            format!(
                "The {} resource was used before the provider was configured",
                self.spec.type_name
            ),
        )
    }

    fn failure(&self, verb: &str, cause: impl std::fmt::Display) -> Diagnostic {
        let message = format!("Error {} {} resource: {}", verb, self.spec.name, cause);
        Diagnostic::error(message.clone(), message)
    }

    fn expand_failure(&self, verb: &str, cause: impl std::fmt::Display) -> Diagnostic {
        let message = format!(
            "Error {} {} resource while getting object: {}",
            verb, self.spec.name, cause
        );
        Diagnostic::error(message.clone(), message)
    }

    /// Key value as configured, for collections whose key the user sets.
    fn configured_mkey(&self, values: &HashMap<String, Dynamic>) -> Option<String> {
        match values.get(self.spec.mkey?)? {
            Dynamic::String(s) if !s.is_empty() => Some(s.clone()),
            Dynamic::Int(i) => Some(i.to_string()),
            _ => None,
        }
    }

    async fn device_version(&self, data: &FortiosProviderData) -> Option<FirmwareVersion> {
        if let Some(version) = data.client.device_version() {
            return Some(version);
        }
        match data.client.update_device_version().await {
            Ok(version) => Some(version),
            Err(e) => {
                tracing::warn!("Could not determine device firmware version: {}", e);
                None
            }
        }
    }

    /// Reads the object back and flattens it with `hints` as the prior state.
    /// `Ok(None)` means the device no longer has it.
    async fn read_state(
        &self,
        data: &FortiosProviderData,
        id: &str,
        hints: &HashMap<String, Dynamic>,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let options = ResourceOptions::from_values(hints);
        let vdom = options.vdom(data.vdom.as_deref());
        let mkey = (!self.spec.is_singleton()).then_some(id);

        let object = data
            .client
            .read(self.spec.path, mkey, vdom)
            .await
            .map_err(|e| self.failure("reading", e))?;

        let Some(object) = object else {
            return Ok(None);
        };

        let flatten_options = FlattenOptions {
            sort: options.sort,
            get_all_tables: options.get_all_tables,
        };
        let mut state = flatten(self.spec.fields(), &object, Some(hints), &flatten_options)
            .map_err(|e| self.failure("reading", format!("{} from API", e)))?;

        state.insert(meta::ID.to_string(), Dynamic::string(id));
        meta::copy_meta(hints, &mut state);

        Ok(Some(DynamicValue::object(state)))
    }

    /// Shared tail of create and update.
    async fn read_after_write(
        &self,
        data: &FortiosProviderData,
        id: String,
        mut hints: HashMap<String, Dynamic>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> DynamicValue {
        hints.insert(meta::ID.to_string(), Dynamic::string(id.clone()));

        match self.read_state(data, &id, &hints).await {
            Ok(Some(state)) => state,
            Ok(None) => {
                diagnostics.push(self.failure(
                    "reading",
                    format!("object {} not found after write", id),
                ));
                DynamicValue::object(hints)
            }
            Err(diag) => {
                diagnostics.push(diag);
                DynamicValue::object(hints)
            }
        }
    }
}

#[async_trait]
impl Resource for CmdbResource {
    fn type_name(&self) -> &str {
        self.spec.type_name
    }

    async fn schema(&self, _request: ResourceSchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_for(self.spec),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let diagnostics = match request.config.to_fields() {
            Ok(config) => {
                validate_config(self.spec.resource_fields(), &config, &AttributePath::root())
            }
            Err(e) => vec![Diagnostic::error("Invalid configuration", e.to_string())],
        };

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = self.provider_data.as_ref() else {
            diagnostics.push(self.not_configured());
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        };

        let planned = match request.planned_state.to_fields() {
            Ok(planned) => planned,
            Err(e) => {
                diagnostics.push(self.expand_failure("creating", e));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let options = ResourceOptions::from_values(&planned);
        let vdom = options.vdom(data.vdom.as_deref());
        let expand_options = ExpandOptions {
            prior: None,
            device_version: self.device_version(data).await,
        };

        let object = match expand(self.spec.fields(), &planned, &expand_options) {
            Ok(object) => object,
            Err(e) => {
                diagnostics.push(self.expand_failure("creating", e));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        tracing::debug!(
            resource = self.spec.type_name,
            path = self.spec.path,
            "Creating object"
        );

        let result = if self.spec.is_singleton() {
            data.client.update(self.spec.path, None, &object, vdom).await
        } else {
            data.client.create(self.spec.path, &object, vdom).await
        };

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                diagnostics.push(self.failure("creating", e));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let id = result
            .mkey
            .or_else(|| self.configured_mkey(&planned))
            .unwrap_or_else(|| self.spec.name.to_string());
        tracing::info!(resource = self.spec.type_name, id = %id, "Created object");

        let new_state = self.read_after_write(data, id, planned, &mut diagnostics).await;
        CreateResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn read(&self, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = self.provider_data.as_ref() else {
            diagnostics.push(self.not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
            };
        };

        let current = match request.current_state.to_fields() {
            Ok(current) => current,
            Err(e) => {
                diagnostics.push(self.failure("reading", e));
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        let Some(id) = current
            .get(meta::ID)
            .and_then(Dynamic::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
        else {
            return ReadResourceResponse {
                new_state: None,
                diagnostics,
            };
        };

        if let Err(e) = data.client.update_device_version().await {
            tracing::warn!("Failed to update device version: {}", e);
        }

        match self.read_state(data, &id, &current).await {
            Ok(Some(state)) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics,
            },
            Ok(None) => {
                tracing::warn!(
                    resource = self.spec.type_name,
                    id = %id,
                    "Object not found on device, removing from state"
                );
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(diag) => {
                diagnostics.push(diag);
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(&self, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = self.provider_data.as_ref() else {
            diagnostics.push(self.not_configured());
            return UpdateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        };

        let (prior, planned) = match (
            request.prior_state.to_fields(),
            request.planned_state.to_fields(),
        ) {
            (Ok(prior), Ok(planned)) => (prior, planned),
            (Err(e), _) | (_, Err(e)) => {
                diagnostics.push(self.expand_failure("updating", e));
                return UpdateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let id = prior
            .get(meta::ID)
            .and_then(Dynamic::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| self.configured_mkey(&planned))
            .unwrap_or_else(|| self.spec.name.to_string());

        let options = ResourceOptions::from_values(&planned);
        let vdom = options.vdom(data.vdom.as_deref());
        let expand_options = ExpandOptions {
            prior: Some(&prior),
            device_version: self.device_version(data).await,
        };

        let object = match expand(self.spec.fields(), &planned, &expand_options) {
            Ok(object) => object,
            Err(e) => {
                diagnostics.push(self.expand_failure("updating", e));
                return UpdateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let mkey = (!self.spec.is_singleton()).then_some(id.as_str());
        tracing::debug!(
            resource = self.spec.type_name,
            id = %id,
            fields = object.len(),
            "Updating object"
        );

        let result = match data.client.update(self.spec.path, mkey, &object, vdom).await {
            Ok(result) => result,
            Err(e) => {
                diagnostics.push(self.failure("updating", e));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let id = match result.mkey {
            Some(mkey) => mkey,
            None if self.spec.is_singleton() => self.spec.name.to_string(),
            None => id,
        };

        let new_state = self.read_after_write(data, id, planned, &mut diagnostics).await;
        UpdateResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn delete(&self, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = self.provider_data.as_ref() else {
            diagnostics.push(self.not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let prior = match request.prior_state.to_fields() {
            Ok(prior) => prior,
            Err(e) => {
                diagnostics.push(self.failure("deleting", e));
                return DeleteResourceResponse { diagnostics };
            }
        };

        let options = ResourceOptions::from_values(&prior);
        let vdom = options.vdom(data.vdom.as_deref());

        if self.spec.is_singleton() {
            let object = reset_object(self.spec.fields(), data.client.device_version().as_ref());
            if let Err(e) = data.client.update(self.spec.path, None, &object, vdom).await {
                diagnostics.push(self.failure("clearing", e));
            }
            return DeleteResourceResponse { diagnostics };
        }

        let Some(id) = prior
            .get(meta::ID)
            .and_then(Dynamic::as_str)
            .filter(|id| !id.is_empty())
        else {
            tracing::debug!(resource = self.spec.type_name, "No identifier in state, nothing to delete");
            return DeleteResourceResponse { diagnostics };
        };

        match data.client.delete(self.spec.path, id, vdom).await {
            Ok(()) => {
                tracing::info!(resource = self.spec.type_name, id = %id, "Deleted object");
            }
            Err(ApiError::NotFound(_)) => {
                tracing::debug!(resource = self.spec.type_name, id = %id, "Object already gone");
            }
            Err(e) => diagnostics.push(self.failure("deleting", e)),
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for CmdbResource {
    async fn configure(&mut self, request: ConfigureResourceRequest) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<FortiosProviderData>() {
                self.provider_data = Some(provider_data.clone());
                tracing::debug!(resource = self.spec.type_name, "Configured resource");
            } else {
                tracing::error!("Failed to downcast provider data to FortiosProviderData");
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract FortiosProviderData from provider data",
                ));
            }
        } else {
            tracing::warn!(resource = self.spec.type_name, "No provider data provided");
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            ));
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithModifyPlan for CmdbResource {
    async fn modify_plan(&self, request: ModifyPlanRequest) -> ModifyPlanResponse {
        // Destroy plans carry a null config.
        if request.config.is_null() {
            return ModifyPlanResponse {
                planned_state: request.proposed_new_state,
                requires_replace: vec![],
                diagnostics: vec![],
            };
        }

        let (config, prior) = match (request.config.to_fields(), request.prior_state.to_fields()) {
            (Ok(config), Ok(prior)) => (config, prior),
            (Err(e), _) | (_, Err(e)) => {
                return ModifyPlanResponse {
                    planned_state: request.proposed_new_state,
                    requires_replace: vec![],
                    diagnostics: vec![Diagnostic::error("Invalid plan", e.to_string())],
                };
            }
        };

        let prior = (!request.prior_state.is_null()).then_some(&prior);
        let change = plan_resource_change(self.spec.resource_fields(), prior, &config);

        ModifyPlanResponse {
            planned_state: DynamicValue::object(change.planned_state),
            requires_replace: change.requires_replace,
            diagnostics: change.diagnostics,
        }
    }
}

#[async_trait]
impl ResourceWithImportState for CmdbResource {
    async fn import_state(
        &self,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };

        import_state_passthrough_id(AttributePath::new(meta::ID), &request, &mut response);

        let Some(key_field) = self.spec.mkey else {
            return response;
        };
        let key = if self.spec.mkey_is_integer() {
            match request.id.parse::<i64>() {
                Ok(key) => Dynamic::Int(key),
                Err(_) => {
                    response.imported_resources.clear();
                    response.diagnostics.push(
                        Diagnostic::error(
                            "Invalid import ID",
                            format!(
                                "{} is keyed by an integer, got '{}'",
                                self.spec.type_name, request.id
                            ),
                        )
                        .with_attribute(AttributePath::new(key_field)),
                    );
                    return response;
                }
            }
        } else {
            Dynamic::string(request.id.clone())
        };

        for imported in &mut response.imported_resources {
            if let Err(e) = imported
                .state
                .set_value(&AttributePath::new(key_field), key.clone())
            {
                response
                    .diagnostics
                    .push(Diagnostic::error("Failed to set import key", e.to_string()));
            }
        }

        response
    }
}
