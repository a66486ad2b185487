//! FortiOS wire object to local state tree.

use crate::cidr::normalize_ipv4_subnet;
use crate::error::{PlugError, Result};
use crate::schema::{Block, Field, FieldKind, Normalization, ScalarType};
use crate::sort::{sort_by_key, SortMode};
use crate::types::{AttributePath, Dynamic};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenOptions {
    pub sort: SortMode,
    /// Materialize top-level tables even when the prior state lacks them
    pub get_all_tables: bool,
}

/// Converts a device object into local state, using the prior local state
/// as hints.
///
/// - sensitive fields keep their prior value and never take the device's
/// - missing or `null` wire keys are omitted, unknown wire keys ignored
/// - top-level tables are only read when `get_all_tables` is on or the
///   prior state already holds entries
/// - subnets are rewritten to CIDR when the prior value is written that way
pub fn flatten(
    fields: &[Field],
    wire: &Map<String, Value>,
    prior: Option<&HashMap<String, Dynamic>>,
    opts: &FlattenOptions,
) -> Result<HashMap<String, Dynamic>> {
    flatten_object(fields, wire, prior, opts, &AttributePath::root())
}

fn flatten_object(
    fields: &[Field],
    wire: &Map<String, Value>,
    prior: Option<&HashMap<String, Dynamic>>,
    opts: &FlattenOptions,
    path: &AttributePath,
) -> Result<HashMap<String, Dynamic>> {
    let top_level = path.steps.is_empty();
    let mut out = HashMap::new();

    for field in fields {
        let hint = prior.and_then(|p| p.get(&field.name));

        if field.sensitive {
            if let Some(kept) = hint.filter(|h| h.is_set()) {
                out.insert(field.name.clone(), kept.clone());
            }
            continue;
        }

        let value = match wire.get(&field.wire_name) {
            None | Some(Value::Null) => continue,
            Some(value) => value,
        };

        if top_level
            && matches!(field.kind, FieldKind::Block(_))
            && !opts.get_all_tables
            && !hint.is_some_and(Dynamic::is_set)
        {
            tracing::debug!(field = %field.name, "Skipping table not present in prior state");
            continue;
        }

        let field_path = path.child(&field.name);
        out.insert(
            field.name.clone(),
            flatten_value(field, value, hint, opts, &field_path)?,
        );
    }

    Ok(out)
}

fn flatten_value(
    field: &Field,
    value: &Value,
    hint: Option<&Dynamic>,
    opts: &FlattenOptions,
    path: &AttributePath,
) -> Result<Dynamic> {
    match &field.kind {
        FieldKind::Scalar(scalar) => {
            flatten_scalar(*scalar, field.normalization, value, hint, path)
        }
        FieldKind::List(scalar) => {
            let items = value
                .as_array()
                .ok_or_else(|| PlugError::type_mismatch(path, "list", json_type(value)))?;
            let hints = hint.and_then(Dynamic::as_list).unwrap_or_default();
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    flatten_scalar(
                        *scalar,
                        field.normalization,
                        item,
                        hints.get(idx),
                        &path.clone().index(idx as i64),
                    )
                })
                .collect::<Result<Vec<_>>>()
                .map(Dynamic::List)
        }
        FieldKind::Block(block) => {
            let items = value
                .as_array()
                .ok_or_else(|| PlugError::type_mismatch(path, "list", json_type(value)))?;
            let hints = hint.and_then(Dynamic::as_list).unwrap_or_default();

            let mut out = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                let item_path = path.clone().index(idx as i64);
                let entry = item
                    .as_object()
                    .ok_or_else(|| PlugError::type_mismatch(&item_path, "object", json_type(item)))?;
                let item_hint = match element_key(block, entry) {
                    Some((key, value)) => hints
                        .iter()
                        .filter_map(Dynamic::as_map)
                        .find(|h| h.get(key) == Some(&value)),
                    None => hints.get(idx).and_then(Dynamic::as_map),
                };
                out.push(Dynamic::Map(flatten_object(
                    &block.fields,
                    entry,
                    item_hint,
                    opts,
                    &item_path,
                )?));
            }

            if let Some(key) = &block.sort_key {
                sort_by_key(&mut out, key, opts.sort);
            }
            Ok(Dynamic::List(out))
        }
    }
}

/// Sort key of a device table element, so the element can be matched with
/// its prior counterpart regardless of order.
fn element_key<'b>(block: &'b Block, entry: &Map<String, Value>) -> Option<(&'b str, Dynamic)> {
    let key = block.sort_key.as_deref()?;
    let field = block.fields.iter().find(|f| f.name == key)?;
    let value = match (&field.kind, entry.get(&field.wire_name)?) {
        (FieldKind::Scalar(ScalarType::Integer), wire) => Dynamic::Int(coerce_integer(wire)?),
        (_, Value::String(s)) => Dynamic::String(s.clone()),
        (_, Value::Number(n)) => Dynamic::String(n.to_string()),
        _ => return None,
    };
    Some((key, value))
}

/// Integer from a JSON integer, an integral float or a numeric string.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn flatten_scalar(
    scalar: ScalarType,
    normalization: Normalization,
    value: &Value,
    hint: Option<&Dynamic>,
    path: &AttributePath,
) -> Result<Dynamic> {
    let mismatch = || PlugError::type_mismatch(path, scalar.name(), json_type(value));
    match scalar {
        ScalarType::String => {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(mismatch()),
            };
            Ok(match normalization {
                Normalization::Ipv4Cidr => {
                    Dynamic::String(normalize_ipv4_subnet(&text, hint.and_then(Dynamic::as_str)))
                }
                Normalization::None => Dynamic::String(text),
            })
        }
        ScalarType::Integer => coerce_integer(value).map(Dynamic::Int).ok_or_else(mismatch),
        ScalarType::Bool => match value {
            Value::Bool(b) => Ok(Dynamic::Bool(*b)),
            Value::String(s) => s.parse::<bool>().map(Dynamic::Bool).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
