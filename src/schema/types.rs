//! Schema type definitions
//!
//! The schema language is a closed set of six kinds:
//! - boolean, number, string: leaf constraints
//! - object: an ordered list of named field definitions
//! - array: either constant-type (one schema for every element) or
//!   constant-length (one schema per index)
//! - reference: a pointer to another schema document, resolved at
//!   construction time
//!
//! Schema trees are immutable once constructed. The only way to derive a
//! changed node is through [`SchemaBuilder`](crate::schema::SchemaBuilder),
//! which re-runs the construction invariants.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::document::SchemaDocument;
use crate::errors::{SchemaError, SchemaResult};

/// The discriminator tag of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// A JSON boolean
    Boolean,
    /// A JSON numeric
    Number,
    /// A JSON string
    String,
    /// A JSON object with declared fields
    Object,
    /// A JSON array, constant-type or constant-length
    Array,
    /// A reference to an external schema document
    Reference,
}

impl SchemaKind {
    /// Returns the wire name used by the `type` discriminator
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Boolean => "boolean",
            SchemaKind::Number => "number",
            SchemaKind::String => "string",
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
            SchemaKind::Reference => "reference",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata common to every schema node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metadata {
    /// Human-readable documentation, no semantic effect
    pub doc: Option<String>,
    /// Whether a null/absent value is acceptable at this position
    pub optional: bool,
    /// The field name, required when the node is a direct field of an object
    pub name: Option<String>,
    /// Unrecognized keys, preserved verbatim for re-serialization and for
    /// custom-validator inspection
    pub extensions: BTreeMap<String, Value>,
}

impl Metadata {
    /// Metadata with only a field name set
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Metadata with a field name and the optional flag set
    pub fn named_optional(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            optional: true,
            ..Self::default()
        }
    }

    /// Metadata with only the optional flag set
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Self::default()
        }
    }
}

/// The two mutually exclusive forms of an array schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayItems {
    /// Every element of a data array must conform to this one schema
    ConstType(Box<Schema>),
    /// A data array must have exactly this length; element *i* must conform
    /// to the schema at index *i*
    ConstLength(Vec<Schema>),
}

/// A single node of the schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// A JSON boolean
    Boolean(Metadata),
    /// A JSON numeric
    Number(Metadata),
    /// A JSON string
    String(Metadata),
    /// A JSON object with an ordered field list
    Object {
        /// Common metadata
        meta: Metadata,
        /// Field definitions, in declared order
        fields: Vec<Schema>,
    },
    /// A JSON array
    Array {
        /// Common metadata
        meta: Metadata,
        /// Exactly one of the two array forms
        items: ArrayItems,
    },
    /// A reference to another schema document
    Reference {
        /// Common metadata
        meta: Metadata,
        /// The URL the resolved document was fetched from, if any
        locator: Option<String>,
        /// The validated document this reference points at
        resolved: Box<SchemaDocument>,
    },
}

impl Schema {
    /// Creates a boolean leaf schema
    pub fn boolean(meta: Metadata) -> Self {
        Schema::Boolean(meta)
    }

    /// Creates a number leaf schema
    pub fn number(meta: Metadata) -> Self {
        Schema::Number(meta)
    }

    /// Creates a string leaf schema
    pub fn string(meta: Metadata) -> Self {
        Schema::String(meta)
    }

    /// Creates an object schema from an ordered field list. An empty list is
    /// valid and means "no fields".
    pub fn object(meta: Metadata, fields: Vec<Schema>) -> Self {
        Schema::Object { meta, fields }
    }

    /// Creates an array schema from whichever of the two forms was supplied.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::AmbiguousArrayForm`] when both or neither of
    /// `const_type` and `const_length` are given.
    pub fn array(
        meta: Metadata,
        const_type: Option<Schema>,
        const_length: Option<Vec<Schema>>,
    ) -> SchemaResult<Self> {
        let items = match (const_type, const_length) {
            (Some(element), None) => ArrayItems::ConstType(Box::new(element)),
            (None, Some(elements)) => ArrayItems::ConstLength(elements),
            _ => return Err(SchemaError::AmbiguousArrayForm),
        };
        Ok(Schema::Array { meta, items })
    }

    /// Creates a constant-type array schema
    pub fn array_const_type(meta: Metadata, element: Schema) -> Self {
        Schema::Array {
            meta,
            items: ArrayItems::ConstType(Box::new(element)),
        }
    }

    /// Creates a constant-length array schema
    pub fn array_const_length(meta: Metadata, elements: Vec<Schema>) -> Self {
        Schema::Array {
            meta,
            items: ArrayItems::ConstLength(elements),
        }
    }

    /// Creates a reference schema backed by an already-constructed document,
    /// for in-memory composition. References built from a URL go through
    /// [`ReferenceResolver`](crate::reference::ReferenceResolver).
    pub fn reference(meta: Metadata, resolved: SchemaDocument) -> Self {
        Schema::Reference {
            meta,
            locator: None,
            resolved: Box::new(resolved),
        }
    }

    /// Returns the discriminator tag of this node
    pub fn kind(&self) -> SchemaKind {
        match self {
            Schema::Boolean(_) => SchemaKind::Boolean,
            Schema::Number(_) => SchemaKind::Number,
            Schema::String(_) => SchemaKind::String,
            Schema::Object { .. } => SchemaKind::Object,
            Schema::Array { .. } => SchemaKind::Array,
            Schema::Reference { .. } => SchemaKind::Reference,
        }
    }

    /// Returns the common metadata of this node
    pub fn meta(&self) -> &Metadata {
        match self {
            Schema::Boolean(meta) | Schema::Number(meta) | Schema::String(meta) => meta,
            Schema::Object { meta, .. }
            | Schema::Array { meta, .. }
            | Schema::Reference { meta, .. } => meta,
        }
    }

    /// Returns the documentation string, if any
    pub fn doc(&self) -> Option<&str> {
        self.meta().doc.as_deref()
    }

    /// Returns whether a null/absent value is acceptable at this position
    pub fn is_optional(&self) -> bool {
        self.meta().optional
    }

    /// Returns the field name, if any
    pub fn name(&self) -> Option<&str> {
        self.meta().name.as_deref()
    }

    /// Returns the preserved unrecognized keys
    pub fn extensions(&self) -> &BTreeMap<String, Value> {
        &self.meta().extensions
    }

    /// Returns the direct children of this node, in order.
    ///
    /// Leaves have none; objects yield their fields; arrays yield the single
    /// constant-type element or the constant-length sequence; references are
    /// structurally transparent and delegate to their resolved root.
    pub fn sub_schemas(&self) -> &[Schema] {
        match self {
            Schema::Boolean(_) | Schema::Number(_) | Schema::String(_) => &[],
            Schema::Object { fields, .. } => fields,
            Schema::Array { items, .. } => match items {
                ArrayItems::ConstType(element) => std::slice::from_ref(element),
                ArrayItems::ConstLength(elements) => elements,
            },
            Schema::Reference { resolved, .. } => resolved.root().sub_schemas(),
        }
    }

    /// Returns the field list of an object schema
    pub fn fields(&self) -> Option<&[Schema]> {
        match self {
            Schema::Object { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Returns the array form of an array schema
    pub fn items(&self) -> Option<&ArrayItems> {
        match self {
            Schema::Array { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Returns the locator of a reference schema, if it was built from a URL
    pub fn locator(&self) -> Option<&str> {
        match self {
            Schema::Reference { locator, .. } => locator.as_deref(),
            _ => None,
        }
    }

    /// Returns the resolved document of a reference schema
    pub fn resolved(&self) -> Option<&SchemaDocument> {
        match self {
            Schema::Reference { resolved, .. } => Some(resolved),
            _ => None,
        }
    }

    /// Returns the flattened field names this node surfaces.
    ///
    /// For an object, each nameless reference field is replaced by the field
    /// names of its resolved object schema. For a reference, its own name is
    /// used when present; otherwise the resolved root must itself be an
    /// object whose flattened names are surfaced.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaInvalid`] when an object field is neither
    /// named nor a reference, or when a nameless reference resolves to
    /// something other than an object.
    pub fn field_names(&self) -> SchemaResult<Vec<String>> {
        match self {
            Schema::Object { fields, .. } => {
                let mut names = Vec::with_capacity(fields.len());
                for field in fields {
                    match field.name() {
                        Some(name) => names.push(name.to_string()),
                        None => match field {
                            Schema::Reference { .. } => names.extend(field.field_names()?),
                            _ => {
                                return Err(SchemaError::schema_invalid(format!(
                                    "a '{}' field of an object must have a name",
                                    field.kind()
                                )))
                            }
                        },
                    }
                }
                Ok(names)
            }
            Schema::Reference { resolved, .. } => match self.name() {
                Some(name) => Ok(vec![name.to_string()]),
                None => {
                    let root = resolved.root();
                    if root.kind() == SchemaKind::Object {
                        root.field_names()
                    } else {
                        Err(SchemaError::schema_invalid(
                            "a nameless reference must resolve to an object",
                        ))
                    }
                }
            },
            _ => Err(SchemaError::schema_invalid(format!(
                "'{}' schemas have no field names",
                self.kind()
            ))),
        }
    }
}
