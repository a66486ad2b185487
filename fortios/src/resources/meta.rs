//! Local-only fields shared by every resource
//!
//! These never reach the device. They steer how a single resource talks to
//! it: which VDOM to address, how nested tables are ordered and whether
//! tables the user never configured are still read back.

use fortiplug::{Dynamic, Field, SortMode};
use std::collections::HashMap;

pub const ID: &str = "id";
pub const VDOMPARAM: &str = "vdomparam";
pub const DYNAMIC_SORT_SUBTABLE: &str = "dynamic_sort_subtable";
pub const GET_ALL_TABLES: &str = "get_all_tables";

const META_FIELDS: &[&str] = &[VDOMPARAM, DYNAMIC_SORT_SUBTABLE, GET_ALL_TABLES];

pub fn resource_meta_fields() -> Vec<Field> {
    vec![
        Field::string(ID)
            .computed()
            .description("Identifier of the object on the device.")
            .build(),
        Field::string(VDOMPARAM)
            .optional()
            .max_length(31)
            .description("Virtual domain for this resource. Overrides the provider vdom.")
            .build(),
        Field::string(DYNAMIC_SORT_SUBTABLE)
            .optional()
            .one_of(&["false", "true", "natural"])
            .description("Sort nested tables by their key after every read.")
            .build(),
        Field::string(GET_ALL_TABLES)
            .optional()
            .one_of(&["false", "true"])
            .description("Read nested tables even when they are not configured.")
            .build(),
    ]
}

/// Per-resource settings taken from the meta fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceOptions {
    pub vdom: Option<String>,
    pub sort: SortMode,
    pub get_all_tables: bool,
}

impl ResourceOptions {
    pub fn from_values(values: &HashMap<String, Dynamic>) -> Self {
        let text = |name: &str| {
            values
                .get(name)
                .and_then(Dynamic::as_str)
                .filter(|s| !s.is_empty())
        };

        let sort = match text(DYNAMIC_SORT_SUBTABLE) {
            Some(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!("Ignoring {}: {}", DYNAMIC_SORT_SUBTABLE, e);
                SortMode::Disabled
            }),
            None => SortMode::Disabled,
        };

        Self {
            vdom: text(VDOMPARAM).map(str::to_string),
            sort,
            get_all_tables: text(GET_ALL_TABLES) == Some("true"),
        }
    }

    /// Resource override first, then the provider default.
    pub fn vdom<'a>(&'a self, provider_vdom: Option<&'a str>) -> Option<&'a str> {
        self.vdom.as_deref().or(provider_vdom)
    }
}

/// Carries the meta fields from the configuration into a new state.
pub fn copy_meta(from: &HashMap<String, Dynamic>, to: &mut HashMap<String, Dynamic>) {
    for name in META_FIELDS {
        if let Some(value) = from.get(*name).filter(|v| v.is_set()) {
            to.insert(name.to_string(), value.clone());
        }
    }
}
