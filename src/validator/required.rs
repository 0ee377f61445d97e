//! Required per-kind validators
//!
//! One validator per schema kind, implementing both the schema-validity and
//! the data-conformance rules. Every controller installs these before any
//! custom validators.
//!
//! Data rules share the null/optional short-circuit: an absent value is
//! represented as JSON `null`, and a `null` at an optional position is valid
//! regardless of the kind-specific rule.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::{SchemaError, SchemaResult};
use crate::schema::{ArrayItems, Schema, SchemaKind};
use crate::validator::controller::{DataValidator, SchemaValidator, ValidationController};

/// Returns the required schema and data validator for each of the six kinds.
pub(crate) fn validators(
) -> Vec<(SchemaKind, Arc<dyn SchemaValidator>, Arc<dyn DataValidator>)> {
    let boolean = Arc::new(BooleanValidator);
    let number = Arc::new(NumberValidator);
    let string = Arc::new(StringValidator);
    let object = Arc::new(ObjectValidator);
    let array = Arc::new(ArrayValidator);
    let reference = Arc::new(ReferenceValidator);

    vec![
        (
            SchemaKind::Boolean,
            boolean.clone() as Arc<dyn SchemaValidator>,
            boolean as Arc<dyn DataValidator>,
        ),
        (
            SchemaKind::Number,
            number.clone() as Arc<dyn SchemaValidator>,
            number as Arc<dyn DataValidator>,
        ),
        (
            SchemaKind::String,
            string.clone() as Arc<dyn SchemaValidator>,
            string as Arc<dyn DataValidator>,
        ),
        (
            SchemaKind::Object,
            object.clone() as Arc<dyn SchemaValidator>,
            object as Arc<dyn DataValidator>,
        ),
        (
            SchemaKind::Array,
            array.clone() as Arc<dyn SchemaValidator>,
            array as Arc<dyn DataValidator>,
        ),
        (
            SchemaKind::Reference,
            reference.clone() as Arc<dyn SchemaValidator>,
            reference as Arc<dyn DataValidator>,
        ),
    ]
}

/// Returns the JSON type name of a value, for error messages
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The shared null/optional short-circuit. Returns `Some` when the value is
/// absent and the decision is final, `None` when kind-specific checking must
/// continue.
fn check_missing(schema: &Schema, value: &Value) -> Option<SchemaResult<()>> {
    if !value.is_null() {
        return None;
    }
    if schema.is_optional() {
        Some(Ok(()))
    } else {
        let position = match schema.name() {
            Some(name) => format!(" for field '{}'", name),
            None => String::new(),
        };
        Some(Err(SchemaError::data_invalid(format!(
            "value missing but not optional{}",
            position
        ))))
    }
}

fn mismatch(schema: &Schema, value: &Value) -> SchemaError {
    SchemaError::data_invalid(format!(
        "expected a {} value, got {}",
        schema.kind(),
        json_type_name(value)
    ))
}

/// Required validator for boolean schemas.
pub struct BooleanValidator;

impl SchemaValidator for BooleanValidator {
    fn validate_schema(&self, _: &Schema, _: &ValidationController) -> SchemaResult<()> {
        // No boolean-specific structural constraints.
        Ok(())
    }
}

impl DataValidator for BooleanValidator {
    fn validate_data(
        &self,
        schema: &Schema,
        value: &Value,
        _: &ValidationController,
    ) -> SchemaResult<()> {
        if let Some(decision) = check_missing(schema, value) {
            return decision;
        }
        if value.is_boolean() {
            Ok(())
        } else {
            Err(mismatch(schema, value))
        }
    }
}

/// Required validator for number schemas.
pub struct NumberValidator;

impl SchemaValidator for NumberValidator {
    fn validate_schema(&self, _: &Schema, _: &ValidationController) -> SchemaResult<()> {
        Ok(())
    }
}

impl DataValidator for NumberValidator {
    fn validate_data(
        &self,
        schema: &Schema,
        value: &Value,
        _: &ValidationController,
    ) -> SchemaResult<()> {
        if let Some(decision) = check_missing(schema, value) {
            return decision;
        }
        if value.is_number() {
            Ok(())
        } else {
            Err(mismatch(schema, value))
        }
    }
}

/// Required validator for string schemas.
pub struct StringValidator;

impl SchemaValidator for StringValidator {
    fn validate_schema(&self, _: &Schema, _: &ValidationController) -> SchemaResult<()> {
        Ok(())
    }
}

impl DataValidator for StringValidator {
    fn validate_data(
        &self,
        schema: &Schema,
        value: &Value,
        _: &ValidationController,
    ) -> SchemaResult<()> {
        if let Some(decision) = check_missing(schema, value) {
            return decision;
        }
        if value.is_string() {
            Ok(())
        } else {
            Err(mismatch(schema, value))
        }
    }
}

/// Required validator for object schemas.
pub struct ObjectValidator;

impl SchemaValidator for ObjectValidator {
    fn validate_schema(
        &self,
        schema: &Schema,
        controller: &ValidationController,
    ) -> SchemaResult<()> {
        let Schema::Object { fields, .. } = schema else {
            return Err(SchemaError::schema_invalid(
                "object validator applied to a non-object schema",
            ));
        };

        // Every field must validate, and every resolved field name must be
        // unique across direct fields and names surfaced from nameless
        // references.
        let mut names: HashSet<String> = HashSet::with_capacity(fields.len());
        for field in fields {
            controller.validate_schema(field)?;

            let surfaced = match field.name() {
                Some(name) => vec![name.to_string()],
                // Nameless fields must be references; their resolved object's
                // names spread into this object's namespace.
                None => match field {
                    Schema::Reference { .. } => field.field_names()?,
                    _ => {
                        return Err(SchemaError::schema_invalid(format!(
                            "a '{}' field of an object must have a name",
                            field.kind()
                        )))
                    }
                },
            };
            for name in surfaced {
                if !names.insert(name.clone()) {
                    return Err(SchemaError::schema_invalid(format!(
                        "duplicate field name: {}",
                        name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl DataValidator for ObjectValidator {
    fn validate_data(
        &self,
        schema: &Schema,
        value: &Value,
        controller: &ValidationController,
    ) -> SchemaResult<()> {
        if let Some(decision) = check_missing(schema, value) {
            return decision;
        }
        let Some(data) = value.as_object() else {
            return Err(mismatch(schema, value));
        };
        let Schema::Object { fields, .. } = schema else {
            return Err(SchemaError::schema_invalid(
                "object validator applied to a non-object schema",
            ));
        };

        for field in fields {
            match field.name() {
                // A named field validates against the value at its key; an
                // absent key is treated as null.
                Some(name) => {
                    let field_value = data.get(name).unwrap_or(&Value::Null);
                    controller.validate_data(field, field_value)?;
                }
                // A nameless field is a reference whose fields spread into
                // this object's namespace, so it sees the whole object.
                None => controller.validate_data(field, value)?,
            }
        }
        Ok(())
    }
}

/// Required validator for array schemas.
pub struct ArrayValidator;

impl SchemaValidator for ArrayValidator {
    fn validate_schema(
        &self,
        schema: &Schema,
        controller: &ValidationController,
    ) -> SchemaResult<()> {
        let Schema::Array { items, .. } = schema else {
            return Err(SchemaError::schema_invalid(
                "array validator applied to a non-array schema",
            ));
        };

        match items {
            ArrayItems::ConstType(element) => controller.validate_schema(element),
            ArrayItems::ConstLength(elements) => {
                for element in elements {
                    controller.validate_schema(element)?;
                }
                Ok(())
            }
        }
    }
}

impl DataValidator for ArrayValidator {
    fn validate_data(
        &self,
        schema: &Schema,
        value: &Value,
        controller: &ValidationController,
    ) -> SchemaResult<()> {
        if let Some(decision) = check_missing(schema, value) {
            return decision;
        }
        let Some(data) = value.as_array() else {
            return Err(mismatch(schema, value));
        };
        let Schema::Array { items, .. } = schema else {
            return Err(SchemaError::schema_invalid(
                "array validator applied to a non-array schema",
            ));
        };

        match items {
            ArrayItems::ConstType(element) => {
                for entry in data {
                    controller.validate_data(element, entry)?;
                }
                Ok(())
            }
            ArrayItems::ConstLength(elements) => {
                if elements.len() != data.len() {
                    return Err(SchemaError::data_invalid(format!(
                        "length mismatch: expected {} elements, got {}",
                        elements.len(),
                        data.len()
                    )));
                }
                for (element, entry) in elements.iter().zip(data) {
                    controller.validate_data(element, entry)?;
                }
                Ok(())
            }
        }
    }
}

/// Required validator for reference schemas.
pub struct ReferenceValidator;

impl SchemaValidator for ReferenceValidator {
    fn validate_schema(&self, _: &Schema, _: &ValidationController) -> SchemaResult<()> {
        // Validity of the target was established when it was resolved.
        Ok(())
    }
}

impl DataValidator for ReferenceValidator {
    fn validate_data(
        &self,
        schema: &Schema,
        value: &Value,
        controller: &ValidationController,
    ) -> SchemaResult<()> {
        // The reference's own optionality is checked first; the resolved
        // root then applies its own null/optional rule on recursion.
        if let Some(decision) = check_missing(schema, value) {
            return decision;
        }
        let Schema::Reference { resolved, .. } = schema else {
            return Err(SchemaError::schema_invalid(
                "reference validator applied to a non-reference schema",
            ));
        };
        controller.validate_data(resolved.root(), value)
    }
}
