//! Field descriptors and schema builders
//!
//! A resource is described by a static table of [`Field`]s. Each field
//! knows its local name, its wire name on the FortiOS API, its kind and
//! the mutability flags that drive validation, planning and mapping.

use crate::plan_modifier::{PlanModifier, RequiresReplaceIfChanged, UseStateForUnknown};
use crate::validator::{
    IntRangeValidator, OneOfValidator, StringLengthValidator, StringPatternValidator, Validator,
};
use crate::version::FirmwareVersion;
use std::fmt;
use std::sync::Arc;

/// Scalar value types understood by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Integer,
    Bool,
}

impl ScalarType {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Integer => "integer",
            ScalarType::Bool => "bool",
        }
    }
}

/// Shape of a field's value
#[derive(Debug, Clone)]
pub enum FieldKind {
    Scalar(ScalarType),
    /// Ordered list of scalars
    List(ScalarType),
    /// Ordered list of nested objects (a FortiOS table)
    Block(Block),
}

/// Nested field table for a list of objects
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub fields: Vec<Field>,
    /// Local name of the field used to order elements when sorting is on
    pub sort_key: Option<String>,
}

/// Device-side value rewriting applied by flatten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    #[default]
    None,
    /// `"addr mask"` becomes `"addr/len"` when the prior value uses that form
    Ipv4Cidr,
}

#[derive(Clone)]
pub struct Field {
    pub name: String,
    pub wire_name: String,
    pub kind: FieldKind,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub force_new: bool,
    pub sensitive: bool,
    pub normalization: Normalization,
    /// First firmware version that knows this field
    pub since: Option<FirmwareVersion>,
    pub validators: Vec<Arc<dyn Validator>>,
    pub plan_modifiers: Vec<Arc<dyn PlanModifier>>,
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("wire_name", &self.wire_name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("force_new", &self.force_new)
            .field("sensitive", &self.sensitive)
            .field("normalization", &self.normalization)
            .field("since", &self.since)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .field(
                "plan_modifiers",
                &format!("{} plan modifiers", self.plan_modifiers.len()),
            )
            .finish()
    }
}

impl Field {
    pub fn string(name: &str) -> FieldBuilder {
        FieldBuilder::new(name, FieldKind::Scalar(ScalarType::String))
    }

    pub fn integer(name: &str) -> FieldBuilder {
        FieldBuilder::new(name, FieldKind::Scalar(ScalarType::Integer))
    }

    pub fn bool(name: &str) -> FieldBuilder {
        FieldBuilder::new(name, FieldKind::Scalar(ScalarType::Bool))
    }

    pub fn string_list(name: &str) -> FieldBuilder {
        FieldBuilder::new(name, FieldKind::List(ScalarType::String))
    }

    pub fn integer_list(name: &str) -> FieldBuilder {
        FieldBuilder::new(name, FieldKind::List(ScalarType::Integer))
    }

    pub fn block(name: &str, fields: Vec<Field>) -> FieldBuilder {
        FieldBuilder::new(
            name,
            FieldKind::Block(Block {
                fields,
                sort_key: None,
            }),
        )
    }

    /// Whether the user may write this field.
    pub fn is_writable(&self) -> bool {
        self.required || self.optional
    }

    /// Computed by the device and never sent.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.is_writable()
    }

    pub fn block_fields(&self) -> Option<&[Field]> {
        match &self.kind {
            FieldKind::Block(block) => Some(&block.fields),
            _ => None,
        }
    }

    /// Read-only copy of this field, used for data sources.
    pub fn as_computed(&self) -> Field {
        let kind = match &self.kind {
            FieldKind::Block(block) => FieldKind::Block(Block {
                fields: block.fields.iter().map(Field::as_computed).collect(),
                sort_key: block.sort_key.clone(),
            }),
            other => other.clone(),
        };

        Field {
            kind,
            required: false,
            optional: false,
            computed: true,
            force_new: false,
            validators: Vec::new(),
            plan_modifiers: Vec::new(),
            ..self.clone()
        }
    }
}

/// Fluent builder for [`Field`]
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            field: Field {
                name: name.to_string(),
                wire_name: name.replace('_', "-"),
                kind,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                force_new: false,
                sensitive: false,
                normalization: Normalization::None,
                since: None,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
            },
        }
    }

    /// Overrides the wire name derived from the local name.
    pub fn wire(mut self, wire_name: &str) -> Self {
        self.field.wire_name = wire_name.to_string();
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.field.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.field.required = true;
        self.field.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.field.optional = true;
        self.field.required = false;
        self
    }

    /// Device fills the value when the user leaves it unset.
    pub fn computed(mut self) -> Self {
        self.field.computed = true;
        self.field.plan_modifiers.push(Arc::new(UseStateForUnknown));
        self
    }

    pub fn force_new(mut self) -> Self {
        self.field.force_new = true;
        self.field
            .plan_modifiers
            .push(Arc::new(RequiresReplaceIfChanged));
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.field.sensitive = true;
        self
    }

    pub fn int_between(mut self, min: i64, max: i64) -> Self {
        self.field
            .validators
            .push(Arc::new(IntRangeValidator { min, max }));
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.field.validators.push(Arc::new(StringLengthValidator {
            min: None,
            max: Some(max),
        }));
        self
    }

    pub fn one_of(mut self, allowed: &[&str]) -> Self {
        self.field.validators.push(Arc::new(OneOfValidator {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }));
        self
    }

    /// Adds a regex constraint. Invalid patterns are a programming error in a
    /// schema table and are reported when the table is built.
    pub fn pattern(mut self, pattern: &str, description: &str) -> Self {
        match regex::Regex::new(pattern) {
            Ok(pattern) => self.field.validators.push(Arc::new(StringPatternValidator {
                pattern,
                description: description.to_string(),
            })),
            Err(e) => tracing::error!(field = %self.field.name, "Invalid field pattern: {}", e),
        }
        self
    }

    pub fn cidr(mut self) -> Self {
        self.field.normalization = Normalization::Ipv4Cidr;
        self
    }

    /// Orders block elements by the given nested field when sorting is on.
    pub fn sort_by(mut self, key: &str) -> Self {
        if let FieldKind::Block(block) = &mut self.field.kind {
            block.sort_key = Some(key.to_string());
        }
        self
    }

    pub fn since(mut self, major: u64, minor: u64, patch: u64) -> Self {
        self.field.since = Some(FirmwareVersion::new(major, minor, patch));
        self
    }

    pub fn build(self) -> Field {
        self.field
    }
}

/// Schema of a resource, data source or provider
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Builder for [`Schema`]
#[derive(Default)]
pub struct SchemaBuilder {
    version: i64,
    description: String,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            version: self.version,
            description: self.description,
            fields: self.fields,
        }
    }
}
