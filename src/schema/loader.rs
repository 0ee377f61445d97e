//! Schema loader: document value to schema tree.
//!
//! The grammar over document values:
//! - a schema definition is a JSON object with a mandatory `type`
//!   discriminator (`boolean|number|string|object|array`), or an implicit
//!   reference when `$ref` (or an inline `definition`) is present and `type`
//!   is absent;
//! - `doc` and `name` must be strings and `optional` a boolean when present,
//!   with no coercion;
//! - `object` requires `fields`, `array` requires exactly one of `constType`
//!   and `constLength`, `reference` requires `$ref` or `definition`;
//! - every other key is preserved verbatim as an extension.
//!
//! References are resolved during loading: each `$ref` is fetched, parsed,
//! and validated as a full schema document before the enclosing schema can
//! finish construction.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::errors::{SchemaError, SchemaResult};
use crate::reference::{Fetch, ReferenceResolver};
use crate::schema::types::{Metadata, Schema, SchemaKind};

const KEY_TYPE: &str = "type";
const KEY_DOC: &str = "doc";
const KEY_OPTIONAL: &str = "optional";
const KEY_NAME: &str = "name";
const KEY_FIELDS: &str = "fields";
const KEY_CONST_TYPE: &str = "constType";
const KEY_CONST_LENGTH: &str = "constLength";
const KEY_REF: &str = "$ref";
const KEY_DEFINITION: &str = "definition";

/// Parses schema definitions from document values, resolving references
/// through the configured fetch capability.
pub struct SchemaLoader {
    resolver: ReferenceResolver,
}

impl SchemaLoader {
    /// Creates a loader whose references resolve through `fetcher`.
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            resolver: ReferenceResolver::new(fetcher),
        }
    }

    /// Parses one schema definition, recursing into sub-definitions and
    /// resolving any references encountered.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaInvalid`] for grammar violations,
    /// [`SchemaError::MissingFields`] / [`SchemaError::AmbiguousArrayForm`]
    /// for the object and array construction invariants, and
    /// [`SchemaError::ReferenceUnreachable`] for failed reference
    /// resolution.
    pub fn load(&self, value: &Value) -> SchemaResult<Schema> {
        let Some(definition) = value.as_object() else {
            return Err(SchemaError::schema_invalid(
                "a schema definition must be a JSON object",
            ));
        };

        let kind = discriminate(definition)?;
        let meta = metadata(definition, kind)?;

        match kind {
            SchemaKind::Boolean => Ok(Schema::boolean(meta)),
            SchemaKind::Number => Ok(Schema::number(meta)),
            SchemaKind::String => Ok(Schema::string(meta)),
            SchemaKind::Object => self.load_object(definition, meta),
            SchemaKind::Array => self.load_array(definition, meta),
            SchemaKind::Reference => self.load_reference(definition, meta),
        }
    }

    fn load_object(&self, definition: &Map<String, Value>, meta: Metadata) -> SchemaResult<Schema> {
        let fields = match definition.get(KEY_FIELDS) {
            None => return Err(SchemaError::MissingFields),
            Some(Value::Array(entries)) => entries
                .iter()
                .map(|entry| self.load(entry))
                .collect::<SchemaResult<Vec<Schema>>>()?,
            Some(_) => {
                return Err(SchemaError::schema_invalid("'fields' must be an array"));
            }
        };
        Ok(Schema::object(meta, fields))
    }

    fn load_array(&self, definition: &Map<String, Value>, meta: Metadata) -> SchemaResult<Schema> {
        match (
            definition.get(KEY_CONST_TYPE),
            definition.get(KEY_CONST_LENGTH),
        ) {
            (Some(const_type), None) => {
                let element = self.load(const_type)?;
                Ok(Schema::array_const_type(meta, element))
            }
            (None, Some(Value::Array(entries))) => {
                let elements = entries
                    .iter()
                    .map(|entry| {
                        if entry.is_null() {
                            Err(SchemaError::schema_invalid(
                                "an index schema in 'constLength' must not be null",
                            ))
                        } else {
                            self.load(entry)
                        }
                    })
                    .collect::<SchemaResult<Vec<Schema>>>()?;
                Ok(Schema::array_const_length(meta, elements))
            }
            (None, Some(_)) => Err(SchemaError::schema_invalid(
                "'constLength' must be an array",
            )),
            _ => Err(SchemaError::AmbiguousArrayForm),
        }
    }

    fn load_reference(
        &self,
        definition: &Map<String, Value>,
        meta: Metadata,
    ) -> SchemaResult<Schema> {
        match (definition.get(KEY_REF), definition.get(KEY_DEFINITION)) {
            (Some(Value::String(url)), None) => self.resolver.resolve_schema(meta, url),
            (Some(_), None) => Err(SchemaError::schema_invalid("'$ref' must be a URL string")),
            (None, Some(inline)) => {
                let resolved = crate::document::SchemaDocument::from_value_with(
                    inline,
                    crate::validator::ValidationController::default_controller(),
                    self.resolver.fetcher(),
                )?;
                Ok(Schema::reference(meta, resolved))
            }
            (Some(_), Some(_)) => Err(SchemaError::schema_invalid(
                "a reference must define exactly one of '$ref' or 'definition'",
            )),
            (None, None) => Err(SchemaError::schema_invalid(
                "a reference requires a '$ref'",
            )),
        }
    }
}

/// Determines the kind of a definition from its `type` discriminator, or
/// implicitly `reference` when only a `$ref`/`definition` is present.
fn discriminate(definition: &Map<String, Value>) -> SchemaResult<SchemaKind> {
    match definition.get(KEY_TYPE) {
        Some(Value::String(name)) => match name.as_str() {
            "boolean" => Ok(SchemaKind::Boolean),
            "number" => Ok(SchemaKind::Number),
            "string" => Ok(SchemaKind::String),
            "object" => Ok(SchemaKind::Object),
            "array" => Ok(SchemaKind::Array),
            other => Err(SchemaError::schema_invalid(format!(
                "unknown schema type '{}'",
                other
            ))),
        },
        Some(_) => Err(SchemaError::schema_invalid("'type' must be a string")),
        None => {
            if definition.contains_key(KEY_REF) || definition.contains_key(KEY_DEFINITION) {
                Ok(SchemaKind::Reference)
            } else {
                Err(SchemaError::schema_invalid(
                    "a schema definition requires a 'type' or a '$ref'",
                ))
            }
        }
    }
}

/// Parses the common metadata keys, strictly: no type coercion is performed
/// on `doc`, `optional`, or `name`.
fn metadata(definition: &Map<String, Value>, kind: SchemaKind) -> SchemaResult<Metadata> {
    let doc = match definition.get(KEY_DOC) {
        None => None,
        Some(Value::String(doc)) => Some(doc.clone()),
        Some(_) => return Err(SchemaError::schema_invalid("'doc' must be a string")),
    };
    let optional = match definition.get(KEY_OPTIONAL) {
        None => false,
        Some(Value::Bool(optional)) => *optional,
        Some(_) => return Err(SchemaError::schema_invalid("'optional' must be a boolean")),
    };
    let name = match definition.get(KEY_NAME) {
        None => None,
        Some(Value::String(name)) => Some(name.clone()),
        Some(_) => return Err(SchemaError::schema_invalid("'name' must be a string")),
    };

    let mut extensions = BTreeMap::new();
    for (key, value) in definition {
        if !recognized(kind, key) {
            extensions.insert(key.clone(), value.clone());
        }
    }

    Ok(Metadata {
        doc,
        optional,
        name,
        extensions,
    })
}

/// Returns whether a key belongs to the core grammar for the given kind.
fn recognized(kind: SchemaKind, key: &str) -> bool {
    match key {
        KEY_TYPE | KEY_DOC | KEY_OPTIONAL | KEY_NAME => true,
        KEY_FIELDS => kind == SchemaKind::Object,
        KEY_CONST_TYPE | KEY_CONST_LENGTH => kind == SchemaKind::Array,
        KEY_REF | KEY_DEFINITION => kind == SchemaKind::Reference,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::HttpFetch;
    use serde_json::json;

    fn loader() -> SchemaLoader {
        SchemaLoader::new(Arc::new(HttpFetch::new()))
    }

    #[test]
    fn test_load_every_leaf_kind() {
        let loader = loader();
        for (definition, kind) in [
            (json!({ "type": "boolean" }), SchemaKind::Boolean),
            (json!({ "type": "number" }), SchemaKind::Number),
            (json!({ "type": "string" }), SchemaKind::String),
        ] {
            assert_eq!(loader.load(&definition).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_load_metadata() {
        let schema = loader()
            .load(&json!({
                "type": "number",
                "doc": "an age",
                "optional": true,
                "name": "age"
            }))
            .unwrap();
        assert_eq!(schema.doc(), Some("an age"));
        assert!(schema.is_optional());
        assert_eq!(schema.name(), Some("age"));
    }

    #[test]
    fn test_metadata_is_strict_about_types() {
        let loader = loader();
        for definition in [
            json!({ "type": "number", "doc": 3 }),
            json!({ "type": "number", "optional": "true" }),
            json!({ "type": "number", "optional": 1 }),
            json!({ "type": "number", "name": false }),
        ] {
            assert!(matches!(
                loader.load(&definition),
                Err(SchemaError::SchemaInvalid(_))
            ));
        }
    }

    #[test]
    fn test_unknown_keys_become_extensions() {
        let schema = loader()
            .load(&json!({
                "type": "string",
                "x-unit": "meters",
                "fields": "not consumed by a string schema"
            }))
            .unwrap();
        assert_eq!(schema.extensions().get("x-unit"), Some(&json!("meters")));
        // `fields` is only part of the grammar for objects.
        assert!(schema.extensions().contains_key("fields"));
    }

    #[test]
    fn test_definition_must_be_an_object() {
        let loader = loader();
        for definition in [json!(null), json!(true), json!([]), json!("boolean")] {
            assert!(matches!(
                loader.load(&definition),
                Err(SchemaError::SchemaInvalid(_))
            ));
        }
    }

    #[test]
    fn test_type_is_required_without_a_ref() {
        assert!(matches!(
            loader().load(&json!({ "doc": "no type" })),
            Err(SchemaError::SchemaInvalid(_))
        ));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(matches!(
            loader().load(&json!({ "type": "integer" })),
            Err(SchemaError::SchemaInvalid(_))
        ));
    }

    #[test]
    fn test_object_requires_fields() {
        assert!(matches!(
            loader().load(&json!({ "type": "object" })),
            Err(SchemaError::MissingFields)
        ));

        // An empty list is valid and means "no fields".
        let empty = loader().load(&json!({ "type": "object", "fields": [] })).unwrap();
        assert_eq!(empty.fields().unwrap().len(), 0);
    }

    #[test]
    fn test_object_fields_keep_declared_order() {
        let schema = loader()
            .load(&json!({
                "type": "object",
                "fields": [
                    { "type": "number", "name": "b" },
                    { "type": "number", "name": "a" }
                ]
            }))
            .unwrap();
        assert_eq!(schema.field_names().unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_array_form_exclusivity() {
        let loader = loader();
        let both = json!({
            "type": "array",
            "constType": { "type": "number" },
            "constLength": [{ "type": "number" }]
        });
        assert!(matches!(
            loader.load(&both),
            Err(SchemaError::AmbiguousArrayForm)
        ));

        let neither = json!({ "type": "array" });
        assert!(matches!(
            loader.load(&neither),
            Err(SchemaError::AmbiguousArrayForm)
        ));
    }

    #[test]
    fn test_const_length_rejects_null_index_schema() {
        let definition = json!({
            "type": "array",
            "constLength": [{ "type": "number" }, null]
        });
        assert!(matches!(
            loader().load(&definition),
            Err(SchemaError::SchemaInvalid(_))
        ));
    }

    #[test]
    fn test_reference_requires_a_string_ref() {
        assert!(matches!(
            loader().load(&json!({ "$ref": 42 })),
            Err(SchemaError::SchemaInvalid(_))
        ));
    }

    #[test]
    fn test_inline_definition_reference() {
        let schema = loader()
            .load(&json!({
                "definition": {
                    "type": "object",
                    "fields": [{ "type": "string", "name": "x" }]
                }
            }))
            .unwrap();
        assert_eq!(schema.kind(), SchemaKind::Reference);
        assert!(schema.locator().is_none());
        assert_eq!(schema.field_names().unwrap(), vec!["x"]);
    }
}
