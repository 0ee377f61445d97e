//! Validation controller: the single point of dispatch for schema
//! well-formedness checks and data conformance checks.
//!
//! A controller owns, per schema kind, an ordered list of schema validators
//! and an ordered list of data validators. The required validator for each
//! kind is always installed first; caller-supplied custom validators run
//! after it, in registration order. Dispatch fails fast on the first error.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::errors::SchemaResult;
use crate::schema::{Schema, SchemaKind};
use crate::validator::required;

/// Checks that a schema node is well-formed.
///
/// A validator may call back into the controller to recurse into
/// sub-schemas. Failure is signaled by returning an error; the first failing
/// validator aborts the whole `validate_schema` call.
pub trait SchemaValidator: Send + Sync {
    /// Validates the given schema node
    fn validate_schema(&self, schema: &Schema, controller: &ValidationController)
        -> SchemaResult<()>;
}

/// Checks that a data value conforms to a schema node.
///
/// A validator may call back into the controller to recurse into sub-values.
pub trait DataValidator: Send + Sync {
    /// Validates the given value against the given schema node
    fn validate_data(
        &self,
        schema: &Schema,
        value: &Value,
        controller: &ValidationController,
    ) -> SchemaResult<()>;
}

impl<F> SchemaValidator for F
where
    F: Fn(&Schema, &ValidationController) -> SchemaResult<()> + Send + Sync,
{
    fn validate_schema(
        &self,
        schema: &Schema,
        controller: &ValidationController,
    ) -> SchemaResult<()> {
        self(schema, controller)
    }
}

impl<F> DataValidator for F
where
    F: Fn(&Schema, &Value, &ValidationController) -> SchemaResult<()> + Send + Sync,
{
    fn validate_data(
        &self,
        schema: &Schema,
        value: &Value,
        controller: &ValidationController,
    ) -> SchemaResult<()> {
        self(schema, value, controller)
    }
}

/// The process-wide default controller: required validators only, no
/// customs.
static DEFAULT_CONTROLLER: Lazy<Arc<ValidationController>> =
    Lazy::new(|| Arc::new(ControllerBuilder::new().build()));

/// Drives all recursive schema and data validation.
///
/// Immutable once built; construct one through [`ControllerBuilder`] or use
/// [`ValidationController::default_controller`].
pub struct ValidationController {
    schema_validators: HashMap<SchemaKind, Vec<Arc<dyn SchemaValidator>>>,
    data_validators: HashMap<SchemaKind, Vec<Arc<dyn DataValidator>>>,
}

impl ValidationController {
    /// Returns the shared default controller, which contains only the
    /// required validators for the six kinds.
    pub fn default_controller() -> Arc<ValidationController> {
        DEFAULT_CONTROLLER.clone()
    }

    /// Creates a builder for a controller with custom validators.
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::new()
    }

    /// Validates that a schema node is well-formed, running every validator
    /// registered for the node's kind in order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any validator.
    pub fn validate_schema(&self, schema: &Schema) -> SchemaResult<()> {
        for validator in self.schema_validators.get(&schema.kind()).into_iter().flatten() {
            validator.validate_schema(schema, self)?;
        }
        Ok(())
    }

    /// Validates that a value conforms to a schema node, running every data
    /// validator registered for the node's kind in order. Absent values are
    /// represented as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any validator.
    pub fn validate_data(&self, schema: &Schema, value: &Value) -> SchemaResult<()> {
        for validator in self.data_validators.get(&schema.kind()).into_iter().flatten() {
            validator.validate_data(schema, value, self)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ValidationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let schema_count: usize = self.schema_validators.values().map(Vec::len).sum();
        let data_count: usize = self.data_validators.values().map(Vec::len).sum();
        f.debug_struct("ValidationController")
            .field("schema_validators", &schema_count)
            .field("data_validators", &data_count)
            .finish()
    }
}

/// Accumulates custom validators, then freezes them into a
/// [`ValidationController`].
#[derive(Default)]
pub struct ControllerBuilder {
    schema_validators: HashMap<SchemaKind, Vec<Arc<dyn SchemaValidator>>>,
    data_validators: HashMap<SchemaKind, Vec<Arc<dyn DataValidator>>>,
}

impl ControllerBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a custom schema validator for one kind.
    pub fn schema_validator(
        mut self,
        kind: SchemaKind,
        validator: impl SchemaValidator + 'static,
    ) -> Self {
        self.schema_validators
            .entry(kind)
            .or_default()
            .push(Arc::new(validator));
        self
    }

    /// Registers a custom data validator for one kind.
    pub fn data_validator(
        mut self,
        kind: SchemaKind,
        validator: impl DataValidator + 'static,
    ) -> Self {
        self.data_validators
            .entry(kind)
            .or_default()
            .push(Arc::new(validator));
        self
    }

    /// Freezes the builder into a controller.
    ///
    /// The required validator for each of the six kinds is installed first;
    /// the accumulated custom validators follow in registration order, so a
    /// custom validator observes a node only after the required one passed.
    pub fn build(self) -> ValidationController {
        let mut schema_validators: HashMap<SchemaKind, Vec<Arc<dyn SchemaValidator>>> =
            HashMap::new();
        let mut data_validators: HashMap<SchemaKind, Vec<Arc<dyn DataValidator>>> = HashMap::new();

        for (kind, schema_validator, data_validator) in required::validators() {
            schema_validators.insert(kind, vec![schema_validator]);
            data_validators.insert(kind, vec![data_validator]);
        }

        for (kind, validators) in self.schema_validators {
            schema_validators.entry(kind).or_default().extend(validators);
        }
        for (kind, validators) in self.data_validators {
            data_validators.entry(kind).or_default().extend(validators);
        }

        ValidationController {
            schema_validators,
            data_validators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SchemaError;
    use crate::schema::Metadata;
    use serde_json::json;

    #[test]
    fn test_default_controller_accepts_every_leaf_kind() {
        let controller = ValidationController::default_controller();
        for schema in [
            Schema::boolean(Metadata::default()),
            Schema::number(Metadata::default()),
            Schema::string(Metadata::default()),
        ] {
            controller.validate_schema(&schema).unwrap();
        }
    }

    #[test]
    fn test_custom_schema_validator_runs_after_required() {
        let controller = ValidationController::builder()
            .schema_validator(
                SchemaKind::Boolean,
                |_: &Schema, _: &ValidationController| {
                    Err(SchemaError::schema_invalid("booleans are banned"))
                },
            )
            .build();

        let err = controller
            .validate_schema(&Schema::boolean(Metadata::default()))
            .unwrap_err();
        assert!(matches!(err, SchemaError::SchemaInvalid(reason) if reason.contains("banned")));

        // Other kinds are unaffected.
        controller
            .validate_schema(&Schema::number(Metadata::default()))
            .unwrap();
    }

    #[test]
    fn test_first_failing_custom_validator_wins() {
        let controller = ValidationController::builder()
            .data_validator(
                SchemaKind::String,
                |_: &Schema, _: &Value, _: &ValidationController| {
                    Err(SchemaError::data_invalid("first"))
                },
            )
            .data_validator(
                SchemaKind::String,
                |_: &Schema, _: &Value, _: &ValidationController| {
                    Err(SchemaError::data_invalid("second"))
                },
            )
            .build();

        let err = controller
            .validate_data(&Schema::string(Metadata::default()), &json!("ok"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::DataInvalid(reason) if reason == "first"));
    }

    #[test]
    fn test_required_validator_short_circuits_customs() {
        // The custom validator accepts everything; the required one must
        // still reject a non-string value before the custom runs.
        let controller = ValidationController::builder()
            .data_validator(
                SchemaKind::String,
                |_: &Schema, _: &Value, _: &ValidationController| Ok(()),
            )
            .build();

        let err = controller
            .validate_data(&Schema::string(Metadata::default()), &json!(3))
            .unwrap_err();
        assert!(matches!(err, SchemaError::DataInvalid(_)));
    }
}
