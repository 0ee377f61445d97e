//! Replace-via-builder for schema nodes
//!
//! Schema nodes are immutable. To derive a changed node, snapshot it into a
//! [`SchemaBuilder`], adjust the fields, and build a brand-new node. Building
//! re-runs the construction invariants, so a builder cannot produce a node
//! that direct construction would have rejected.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::document::SchemaDocument;
use crate::errors::{SchemaError, SchemaResult};
use crate::schema::types::{ArrayItems, Metadata, Schema, SchemaKind};

/// A mutable snapshot of a schema node's fields.
///
/// The kind is fixed at seeding time; everything else can be changed before
/// [`build`](SchemaBuilder::build) produces a new, validated node.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    kind: SchemaKind,
    doc: Option<String>,
    optional: bool,
    name: Option<String>,
    extensions: BTreeMap<String, Value>,
    fields: Option<Vec<Schema>>,
    const_type: Option<Box<Schema>>,
    const_length: Option<Vec<Schema>>,
    locator: Option<String>,
    resolved: Option<Box<SchemaDocument>>,
}

impl Schema {
    /// Snapshots this node's fields into a builder.
    pub fn to_builder(&self) -> SchemaBuilder {
        let meta = self.meta();
        let mut builder = SchemaBuilder {
            kind: self.kind(),
            doc: meta.doc.clone(),
            optional: meta.optional,
            name: meta.name.clone(),
            extensions: meta.extensions.clone(),
            fields: None,
            const_type: None,
            const_length: None,
            locator: None,
            resolved: None,
        };

        match self {
            Schema::Boolean(_) | Schema::Number(_) | Schema::String(_) => {}
            Schema::Object { fields, .. } => {
                builder.fields = Some(fields.clone());
            }
            Schema::Array { items, .. } => match items {
                ArrayItems::ConstType(element) => builder.const_type = Some(element.clone()),
                ArrayItems::ConstLength(elements) => {
                    builder.const_length = Some(elements.clone())
                }
            },
            Schema::Reference {
                locator, resolved, ..
            } => {
                builder.locator = locator.clone();
                builder.resolved = Some(resolved.clone());
            }
        }

        builder
    }
}

impl SchemaBuilder {
    /// Sets the documentation string
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Clears the documentation string
    pub fn clear_doc(mut self) -> Self {
        self.doc = None;
        self
    }

    /// Sets the optional flag
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Sets the field name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Clears the field name
    pub fn clear_name(mut self) -> Self {
        self.name = None;
        self
    }

    /// Adds or replaces an extension key
    pub fn extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// Replaces the field list of an object node
    pub fn fields(mut self, fields: Vec<Schema>) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Appends a field to an object node
    pub fn push_field(mut self, field: Schema) -> Self {
        self.fields.get_or_insert_with(Vec::new).push(field);
        self
    }

    /// Sets the constant-type element of an array node
    pub fn const_type(mut self, element: Schema) -> Self {
        self.const_type = Some(Box::new(element));
        self
    }

    /// Clears the constant-type element of an array node
    pub fn clear_const_type(mut self) -> Self {
        self.const_type = None;
        self
    }

    /// Sets the constant-length sequence of an array node
    pub fn const_length(mut self, elements: Vec<Schema>) -> Self {
        self.const_length = Some(elements);
        self
    }

    /// Clears the constant-length sequence of an array node
    pub fn clear_const_length(mut self) -> Self {
        self.const_length = None;
        self
    }

    /// Replaces the resolved document of a reference node
    pub fn resolved(mut self, document: SchemaDocument) -> Self {
        self.resolved = Some(Box::new(document));
        self
    }

    /// Builds a new node from the current state, re-running the construction
    /// invariants of the node's kind.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingFields`] for an object with no field
    /// list, [`SchemaError::AmbiguousArrayForm`] for an array with both or
    /// neither form, and [`SchemaError::SchemaInvalid`] for a reference with
    /// no resolved document.
    pub fn build(self) -> SchemaResult<Schema> {
        let meta = Metadata {
            doc: self.doc,
            optional: self.optional,
            name: self.name,
            extensions: self.extensions,
        };

        match self.kind {
            SchemaKind::Boolean => Ok(Schema::Boolean(meta)),
            SchemaKind::Number => Ok(Schema::Number(meta)),
            SchemaKind::String => Ok(Schema::String(meta)),
            SchemaKind::Object => {
                let fields = self.fields.ok_or(SchemaError::MissingFields)?;
                Ok(Schema::Object { meta, fields })
            }
            SchemaKind::Array => {
                let items = match (self.const_type, self.const_length) {
                    (Some(element), None) => ArrayItems::ConstType(element),
                    (None, Some(elements)) => ArrayItems::ConstLength(elements),
                    _ => return Err(SchemaError::AmbiguousArrayForm),
                };
                Ok(Schema::Array { meta, items })
            }
            SchemaKind::Reference => {
                let resolved = self.resolved.ok_or_else(|| {
                    SchemaError::schema_invalid("a reference must have a resolved document")
                })?;
                Ok(Schema::Reference {
                    meta,
                    locator: self.locator,
                    resolved,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_object() -> Schema {
        Schema::object(
            Metadata {
                doc: Some("a sample".into()),
                optional: false,
                name: None,
                extensions: [("x-tag".to_string(), json!("v1"))].into_iter().collect(),
            },
            vec![
                Schema::number(Metadata::named_optional("age")),
                Schema::string(Metadata::named("label")),
            ],
        )
    }

    #[test]
    fn test_unchanged_rebuild_is_structurally_equal() {
        let original = sample_object();
        let rebuilt = original.to_builder().build().unwrap();
        assert_eq!(original, rebuilt);
    }

    #[test]
    fn test_unchanged_rebuild_of_every_leaf_kind() {
        for original in [
            Schema::boolean(Metadata::optional()),
            Schema::number(Metadata::named("n")),
            Schema::string(Metadata::default()),
        ] {
            let rebuilt = original.to_builder().build().unwrap();
            assert_eq!(original, rebuilt);
        }
    }

    #[test]
    fn test_unchanged_rebuild_of_both_array_forms() {
        let const_type =
            Schema::array_const_type(Metadata::default(), Schema::boolean(Metadata::default()));
        assert_eq!(const_type, const_type.to_builder().build().unwrap());

        let const_length = Schema::array_const_length(
            Metadata::default(),
            vec![
                Schema::boolean(Metadata::default()),
                Schema::string(Metadata::default()),
            ],
        );
        assert_eq!(const_length, const_length.to_builder().build().unwrap());
    }

    #[test]
    fn test_builder_changes_produce_new_node() {
        let original = sample_object();
        let changed = original.to_builder().doc("changed").build().unwrap();
        assert_ne!(original, changed);
        assert_eq!(changed.doc(), Some("changed"));
        // The original is untouched.
        assert_eq!(original.doc(), Some("a sample"));
    }

    #[test]
    fn test_builder_cannot_sneak_past_array_invariant() {
        let array =
            Schema::array_const_type(Metadata::default(), Schema::boolean(Metadata::default()));
        // Adding the second form without clearing the first must fail.
        let result = array
            .to_builder()
            .const_length(vec![Schema::string(Metadata::default())])
            .build();
        assert!(matches!(result, Err(SchemaError::AmbiguousArrayForm)));

        // Clearing the first form makes the same change valid.
        let swapped = array
            .to_builder()
            .clear_const_type()
            .const_length(vec![Schema::string(Metadata::default())])
            .build()
            .unwrap();
        assert!(matches!(
            swapped.items(),
            Some(ArrayItems::ConstLength(elements)) if elements.len() == 1
        ));
    }

    #[test]
    fn test_builder_preserves_extensions() {
        let original = sample_object();
        let rebuilt = original
            .to_builder()
            .extension("x-extra", json!(7))
            .build()
            .unwrap();
        assert_eq!(rebuilt.extensions().get("x-tag"), Some(&json!("v1")));
        assert_eq!(rebuilt.extensions().get("x-extra"), Some(&json!(7)));
    }
}
