//! Data source implementations

pub mod cmdb;
pub mod list;
pub mod system_status;

pub use cmdb::CmdbDataSource;
pub use list::CmdbListDataSource;
pub use system_status::SystemStatusDataSource;

use crate::FortiosProviderData;
use fortiplug::data_source::{ConfigureDataSourceRequest, ConfigureDataSourceResponse};
use fortiplug::Diagnostic;

/// Extracts [`FortiosProviderData`] from the untyped configure payload.
pub(crate) fn configure_provider_data(
    type_name: &str,
    request: ConfigureDataSourceRequest,
    target: &mut Option<FortiosProviderData>,
) -> ConfigureDataSourceResponse {
    let mut diagnostics = vec![];

    if let Some(data) = request.provider_data {
        if let Some(provider_data) = data.downcast_ref::<FortiosProviderData>() {
            *target = Some(provider_data.clone());
            tracing::debug!(data_source = type_name, "Configured data source");
        } else {
            tracing::error!("Failed to downcast provider data to FortiosProviderData");
            diagnostics.push(Diagnostic::error(
                "Invalid provider data",
                "Failed to extract FortiosProviderData from provider data",
            ));
        }
    } else {
        tracing::warn!(data_source = type_name, "No provider data provided");
        diagnostics.push(Diagnostic::error(
            "No provider data",
            "No provider data was provided to the data source",
        ));
    }

    ConfigureDataSourceResponse { diagnostics }
}

pub(crate) fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}
