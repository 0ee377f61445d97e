//! Re-serialization of schema trees back into document values.
//!
//! Output round-trips through the loader: for a schema with no remote
//! references, `load(to_value(s))` reproduces `s`, including preserved
//! extensions. References serialize as their `$ref` locator when they were
//! built from a URL, or as an inline `definition` otherwise.

use serde_json::{Map, Value};

use crate::document::SchemaDocument;
use crate::schema::types::{ArrayItems, Schema};

impl Schema {
    /// Serializes this schema tree into a document value.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();

        // References carry no `type`; their kind is implied by `$ref` or
        // `definition`, matching what the loader accepts.
        if !matches!(self, Schema::Reference { .. }) {
            out.insert("type".to_string(), Value::String(self.kind().as_str().into()));
        }

        let meta = self.meta();
        if let Some(doc) = &meta.doc {
            out.insert("doc".to_string(), Value::String(doc.clone()));
        }
        if meta.optional {
            out.insert("optional".to_string(), Value::Bool(true));
        }
        if let Some(name) = &meta.name {
            out.insert("name".to_string(), Value::String(name.clone()));
        }

        match self {
            Schema::Boolean(_) | Schema::Number(_) | Schema::String(_) => {}
            Schema::Object { fields, .. } => {
                let fields = fields.iter().map(Schema::to_value).collect();
                out.insert("fields".to_string(), Value::Array(fields));
            }
            Schema::Array { items, .. } => match items {
                ArrayItems::ConstType(element) => {
                    out.insert("constType".to_string(), element.to_value());
                }
                ArrayItems::ConstLength(elements) => {
                    let elements = elements.iter().map(Schema::to_value).collect();
                    out.insert("constLength".to_string(), Value::Array(elements));
                }
            },
            Schema::Reference {
                locator, resolved, ..
            } => match locator {
                Some(url) => {
                    out.insert("$ref".to_string(), Value::String(url.clone()));
                }
                None => {
                    out.insert("definition".to_string(), resolved.to_value());
                }
            },
        }

        for (key, value) in &meta.extensions {
            out.insert(key.clone(), value.clone());
        }

        Value::Object(out)
    }
}

impl SchemaDocument {
    /// Serializes this document's schema into a document value.
    pub fn to_value(&self) -> Value {
        self.root().to_value()
    }
}
