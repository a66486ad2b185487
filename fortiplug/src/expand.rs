//! Local configuration tree to FortiOS wire object.

use crate::error::{PlugError, Result};
use crate::schema::{Field, FieldKind, ScalarType};
use crate::types::{AttributePath, Dynamic};
use crate::version::FirmwareVersion;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ExpandOptions<'a> {
    /// Prior local state; unset fields that were set here are cleared
    pub prior: Option<&'a HashMap<String, Dynamic>>,
    /// Firmware version of the target device, when known
    pub device_version: Option<FirmwareVersion>,
}

/// Builds the wire object for a create or update request.
///
/// Unset fields are omitted unless the prior state had them set, in which
/// case an explicit clear marker is sent (`null` for scalars, `[]` for
/// lists and tables). Computed-only fields are never sent.
pub fn expand(
    fields: &[Field],
    config: &HashMap<String, Dynamic>,
    opts: &ExpandOptions<'_>,
) -> Result<Map<String, Value>> {
    expand_object(
        fields,
        config,
        opts.prior,
        opts.device_version.as_ref(),
        &AttributePath::root(),
    )
}

/// Wire object that clears every writable field, used to "delete" singletons.
pub fn reset_object(
    fields: &[Field],
    device_version: Option<&FirmwareVersion>,
) -> Map<String, Value> {
    fields
        .iter()
        .filter(|f| f.is_writable() && supported(f, device_version))
        .map(|f| (f.wire_name.clone(), clear_marker(f)))
        .collect()
}

fn expand_object(
    fields: &[Field],
    config: &HashMap<String, Dynamic>,
    prior: Option<&HashMap<String, Dynamic>>,
    device_version: Option<&FirmwareVersion>,
    path: &AttributePath,
) -> Result<Map<String, Value>> {
    let mut out = Map::new();

    for field in fields.iter().filter(|f| f.is_writable()) {
        let value = config.get(&field.name).unwrap_or(&Dynamic::Null);

        if !supported(field, device_version) {
            if value.is_set() {
                tracing::warn!(
                    field = %field.name,
                    since = ?field.since,
                    device = ?device_version,
                    "Field not supported by device firmware, skipping"
                );
            }
            continue;
        }

        let field_path = path.child(&field.name);
        if value.is_set() {
            let wire = expand_value(field, value, device_version, &field_path)?;
            out.insert(field.wire_name.clone(), wire);
        } else if prior
            .and_then(|p| p.get(&field.name))
            .is_some_and(Dynamic::is_set)
        {
            tracing::debug!(field = %field_path, "Clearing field removed from configuration");
            out.insert(field.wire_name.clone(), clear_marker(field));
        }
    }

    Ok(out)
}

fn expand_value(
    field: &Field,
    value: &Dynamic,
    device_version: Option<&FirmwareVersion>,
    path: &AttributePath,
) -> Result<Value> {
    match &field.kind {
        FieldKind::Scalar(scalar) => expand_scalar(*scalar, value, path),
        FieldKind::List(scalar) => {
            let items = value
                .as_list()
                .ok_or_else(|| PlugError::type_mismatch(path, "list", value.type_name()))?;
            items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.is_set())
                .map(|(idx, item)| expand_scalar(*scalar, item, &path.clone().index(idx as i64)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        FieldKind::Block(block) => {
            let items = value
                .as_list()
                .ok_or_else(|| PlugError::type_mismatch(path, "list", value.type_name()))?;
            let mut out = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                let item_path = path.clone().index(idx as i64);
                match item {
                    Dynamic::Map(entry) => out.push(Value::Object(expand_object(
                        &block.fields,
                        entry,
                        None,
                        device_version,
                        &item_path,
                    )?)),
                    Dynamic::Null | Dynamic::Unknown => {}
                    other => {
                        return Err(PlugError::type_mismatch(
                            item_path,
                            "block",
                            other.type_name(),
                        ))
                    }
                }
            }
            Ok(Value::Array(out))
        }
    }
}

fn expand_scalar(scalar: ScalarType, value: &Dynamic, path: &AttributePath) -> Result<Value> {
    let mismatch = || PlugError::type_mismatch(path, scalar.name(), value.type_name());
    match scalar {
        ScalarType::String => match value {
            Dynamic::String(s) => Ok(Value::String(s.clone())),
            Dynamic::Int(i) => Ok(Value::String(i.to_string())),
            Dynamic::Number(n) => Ok(Value::String(n.to_string())),
            Dynamic::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err(mismatch()),
        },
        ScalarType::Integer => match value {
            Dynamic::String(s) => s.trim().parse::<i64>().map(Value::from).map_err(|_| mismatch()),
            other => other.as_i64().map(Value::from).ok_or_else(mismatch),
        },
        ScalarType::Bool => value.as_bool().map(Value::Bool).ok_or_else(mismatch),
    }
}

fn clear_marker(field: &Field) -> Value {
    match field.kind {
        FieldKind::Scalar(_) => Value::Null,
        FieldKind::List(_) | FieldKind::Block(_) => Value::Array(Vec::new()),
    }
}

fn supported(field: &Field, device_version: Option<&FirmwareVersion>) -> bool {
    match (field.since.as_ref(), device_version) {
        (Some(since), Some(device)) => device >= since,
        _ => true,
    }
}
