//! Value constraints declared on fields, and config validation against a
//! field table.

use crate::schema::{Field, FieldKind, ScalarType};
use crate::types::{AttributePath, Diagnostic, Dynamic};
use std::collections::HashMap;

pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>);
}

pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for StringLengthValidator {
    fn description(&self) -> String {
        format!("string length between {:?} and {:?}", self.min, self.max)
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let Some(s) = value.as_str() else {
            return;
        };
        let len = s.chars().count();
        if let Some(min) = self.min {
            if len < min {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must have minimum length of {}", path, min),
                        format!("Got length {}", len),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
        if let Some(max) = self.max {
            if len > max {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must have maximum length of {}", path, max),
                        format!("Got length {}", len),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

pub struct StringPatternValidator {
    pub pattern: regex::Regex,
    pub description: String,
}

impl Validator for StringPatternValidator {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_str() {
            if !self.pattern.is_match(s) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must match {}", path, self.description),
                        format!("Value '{}' does not match pattern", s),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

/// Inclusive integer range, the FortiOS `IntBetween` constraint.
pub struct IntRangeValidator {
    pub min: i64,
    pub max: i64,
}

impl Validator for IntRangeValidator {
    fn description(&self) -> String {
        format!("integer between {} and {}", self.min, self.max)
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(n) = value.as_i64() {
            if n < self.min || n > self.max {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must be between {} and {}", path, self.min, self.max),
                        format!("Got {}", n),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

/// Restricts a string to a fixed set of options (`enable`/`disable`, ...).
pub struct OneOfValidator {
    pub allowed: Vec<String>,
}

impl Validator for OneOfValidator {
    fn description(&self) -> String {
        format!("one of {:?}", self.allowed)
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_str() {
            if !self.allowed.iter().any(|a| a == s) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must be one of: {}", path, self.allowed.join(", ")),
                        format!("Got '{}'", s),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

/// Checks a configuration object against a field table: required fields,
/// computed-only fields, value shapes and declared constraints. Unknown
/// values are skipped since they are only resolved at apply time.
pub fn validate_config(
    fields: &[Field],
    config: &HashMap<String, Dynamic>,
    path: &AttributePath,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for field in fields {
        let field_path = path.child(&field.name);
        let value = config.get(&field.name).unwrap_or(&Dynamic::Null);

        if value.is_unknown() {
            continue;
        }

        if value.is_null() {
            if field.required {
                diagnostics.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("The argument \"{}\" is required", field_path),
                    )
                    .with_attribute(field_path),
                );
            }
            continue;
        }

        if field.is_computed_only() {
            diagnostics.push(
                Diagnostic::error(
                    "Value for unconfigurable attribute",
                    format!("\"{}\" is computed by the device and cannot be set", field_path),
                )
                .with_attribute(field_path),
            );
            continue;
        }

        check_shape(field, value, &field_path, &mut diagnostics);
    }

    diagnostics
}

fn check_shape(
    field: &Field,
    value: &Dynamic,
    path: &AttributePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match &field.kind {
        FieldKind::Scalar(scalar) => {
            if !scalar_accepts(*scalar, value) {
                diagnostics.push(shape_error(path, scalar.name(), value));
                return;
            }
            run_validators(field, value, path, diagnostics);
        }
        FieldKind::List(scalar) => {
            let Some(items) = value.as_list() else {
                diagnostics.push(shape_error(path, "list", value));
                return;
            };
            for (idx, item) in items.iter().enumerate() {
                if !item.is_unknown() && !scalar_accepts(*scalar, item) {
                    diagnostics.push(shape_error(&path.clone().index(idx as i64), scalar.name(), item));
                }
            }
            run_validators(field, value, path, diagnostics);
        }
        FieldKind::Block(block) => {
            let Some(items) = value.as_list() else {
                diagnostics.push(shape_error(path, "list of blocks", value));
                return;
            };
            run_validators(field, value, path, diagnostics);
            for (idx, item) in items.iter().enumerate() {
                let item_path = path.clone().index(idx as i64);
                match item {
                    Dynamic::Map(entry) => {
                        diagnostics.extend(validate_config(&block.fields, entry, &item_path))
                    }
                    Dynamic::Unknown => {}
                    other => diagnostics.push(shape_error(&item_path, "block", other)),
                }
            }
        }
    }
}

fn run_validators(
    field: &Field,
    value: &Dynamic,
    path: &AttributePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for validator in &field.validators {
        validator.validate(value, path, diagnostics);
    }
}

fn scalar_accepts(scalar: ScalarType, value: &Dynamic) -> bool {
    match scalar {
        ScalarType::String => matches!(
            value,
            Dynamic::String(_) | Dynamic::Int(_) | Dynamic::Number(_)
        ),
        ScalarType::Integer => {
            value.as_i64().is_some()
                || value.as_str().is_some_and(|s| s.trim().parse::<i64>().is_ok())
        }
        ScalarType::Bool => value.as_bool().is_some(),
    }
}

fn shape_error(path: &AttributePath, expected: &str, value: &Dynamic) -> Diagnostic {
    Diagnostic::error(
        "Incorrect attribute value type",
        format!("{} must be a {}, got {}", path, expected, value.type_name()),
    )
    .with_attribute(path.clone())
}
