//! fortiplug - schema-driven state mapping for FortiOS resources
//!
//! Resources are declared as static field tables. The same tables drive
//! validation, planning and the two mapping directions: [`expand`] turns a
//! local configuration tree into a FortiOS wire object and [`flatten`]
//! turns a device response back into local state.

// Core modules
pub mod error;
pub mod schema;
pub mod types;
pub mod version;

// Mapping
pub mod cidr;
pub mod expand;
pub mod flatten;
pub mod sort;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod import;
pub mod plan_modifier;
pub mod validator;

// Re-exports for convenience
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{PlugError, Result};
pub use expand::{expand, reset_object, ExpandOptions};
pub use flatten::{coerce_integer, flatten, FlattenOptions};
pub use import::{import_state_passthrough_id, import_state_passthrough_value};
pub use plan_modifier::{plan_resource_change, PlannedChange};
pub use provider::Provider;
pub use resource::{
    Resource, ResourceWithConfigure, ResourceWithImportState, ResourceWithModifyPlan,
};
pub use schema::{Field, FieldBuilder, FieldKind, Schema, SchemaBuilder};
pub use sort::SortMode;
pub use types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
pub use version::FirmwareVersion;
