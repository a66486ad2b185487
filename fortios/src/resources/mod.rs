//! Resource implementations
//!
//! Every FortiOS object type is a [`ResourceSpec`]: its CMDB path, key and
//! field table. One generic [`CmdbResource`] runs the lifecycle for all of
//! them.

pub mod cmdb_resource;
pub mod emailfilter;
pub mod firewall;
pub mod log;
pub mod meta;
pub mod router;
pub mod system;

pub use cmdb_resource::CmdbResource;

use fortiplug::schema::{FieldKind, ScalarType};
use fortiplug::Field;
use std::sync::OnceLock;

pub(crate) const ENABLE_DISABLE: &[&str] = &["enable", "disable"];

/// Static description of one CMDB object type
pub struct ResourceSpec {
    /// Terraform type name, e.g. `fortios_firewall_address`
    pub type_name: &'static str,
    /// Object name used in messages and as the fallback identifier
    pub name: &'static str,
    /// CMDB path below `/api/v2/cmdb/`
    pub path: &'static str,
    /// Local name of the key field; `None` for singletons
    pub mkey: Option<&'static str>,
    pub description: &'static str,
    build_fields: fn() -> Vec<Field>,
    fields: OnceLock<Vec<Field>>,
    resource_fields: OnceLock<Vec<Field>>,
}

impl ResourceSpec {
    pub const fn new(
        type_name: &'static str,
        name: &'static str,
        path: &'static str,
        mkey: Option<&'static str>,
        description: &'static str,
        build_fields: fn() -> Vec<Field>,
    ) -> Self {
        Self {
            type_name,
            name,
            path,
            mkey,
            description,
            build_fields,
            fields: OnceLock::new(),
            resource_fields: OnceLock::new(),
        }
    }

    /// Fields mapped to and from the device
    pub fn fields(&self) -> &[Field] {
        self.fields.get_or_init(self.build_fields)
    }

    /// Device fields plus the local meta fields
    pub fn resource_fields(&self) -> &[Field] {
        self.resource_fields.get_or_init(|| {
            self.fields()
                .iter()
                .cloned()
                .chain(meta::resource_meta_fields())
                .collect()
        })
    }

    pub fn is_singleton(&self) -> bool {
        self.mkey.is_none()
    }

    pub fn mkey_field(&self) -> Option<&Field> {
        let mkey = self.mkey?;
        self.fields().iter().find(|f| f.name == mkey)
    }

    pub(crate) fn mkey_is_integer(&self) -> bool {
        self.mkey_field()
            .is_some_and(|f| matches!(f.kind, FieldKind::Scalar(ScalarType::Integer)))
    }
}

pub static CATALOG: &[&ResourceSpec] = &[
    &firewall::FIREWALL_ADDRESS,
    &router::ROUTER_STATIC,
    &system::SYSTEM_SNMP_USER,
    &system::SYSTEM_VXLAN,
    &emailfilter::EMAILFILTER_BWORD,
    &log::LOG_FORTIANALYZER_OVERRIDE_SETTING,
];

pub fn lookup(type_name: &str) -> Option<&'static ResourceSpec> {
    CATALOG.iter().copied().find(|spec| spec.type_name == type_name)
}
