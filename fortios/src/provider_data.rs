//! Provider data structure passed to resources and data sources

use crate::api::CmdbTransport;
use std::sync::Arc;

#[derive(Clone)]
pub struct FortiosProviderData {
    pub client: Arc<dyn CmdbTransport>,
    /// Provider-level administrative domain; resources may override it
    pub vdom: Option<String>,
}

impl FortiosProviderData {
    pub fn new(client: impl CmdbTransport + 'static, vdom: Option<String>) -> Self {
        Self {
            client: Arc::new(client),
            vdom,
        }
    }
}
