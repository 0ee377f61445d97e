//! Schema document: the root container for a validated schema tree.
//!
//! A document owns the root schema and the controller used to validate data
//! against it. Schema trees are immutable after construction; the controller
//! pointer is the one field that may change, and only through
//! [`SchemaDocument::set_controller`], which propagates the swap depth-first
//! into every resolved reference document.

use std::io::Read;
use std::sync::{Arc, RwLock};

use log::debug;
use serde_json::Value;

use crate::errors::{SchemaError, SchemaResult};
use crate::reference::{Fetch, HttpFetch};
use crate::schema::{Schema, SchemaKind, SchemaLoader};
use crate::validator::ValidationController;

/// A validated, immutable schema plus the controller that validates data
/// against it.
///
/// Root invariants, checked once at construction: the root kind must be
/// object or array, and the root must not be optional.
#[derive(Debug)]
pub struct SchemaDocument {
    root: Schema,
    controller: RwLock<Arc<ValidationController>>,
}

impl SchemaDocument {
    /// Builds a document from a parsed schema definition, using the default
    /// controller and the default HTTP fetcher for references.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaInvalid`] for grammar or well-formedness
    /// violations, [`SchemaError::ReferenceUnreachable`] for failed `$ref`
    /// resolution, and [`SchemaError::RootKind`] / [`SchemaError::RootOptional`]
    /// for root invariant violations.
    pub fn from_value(value: &Value) -> SchemaResult<Self> {
        Self::from_value_with(
            value,
            ValidationController::default_controller(),
            Arc::new(HttpFetch::new()),
        )
    }

    /// Builds a document from a parsed schema definition with a custom
    /// controller, using the default HTTP fetcher for references.
    pub fn with_controller(
        value: &Value,
        controller: Arc<ValidationController>,
    ) -> SchemaResult<Self> {
        Self::from_value_with(value, controller, Arc::new(HttpFetch::new()))
    }

    /// Builds a document from a parsed schema definition with a custom
    /// controller and fetch capability.
    pub fn from_value_with(
        value: &Value,
        controller: Arc<ValidationController>,
        fetcher: Arc<dyn Fetch>,
    ) -> SchemaResult<Self> {
        let root = SchemaLoader::new(fetcher).load(value)?;
        Self::from_schema(root, controller)
    }

    /// Builds a document from schema JSON text.
    pub fn from_json(schema: &str) -> SchemaResult<Self> {
        let value: Value = serde_json::from_str(schema)
            .map_err(|err| SchemaError::schema_invalid(format!("the schema is not JSON: {}", err)))?;
        Self::from_value(&value)
    }

    /// Builds a document from schema JSON bytes.
    pub fn from_slice(schema: &[u8]) -> SchemaResult<Self> {
        let value: Value = serde_json::from_slice(schema)
            .map_err(|err| SchemaError::schema_invalid(format!("the schema is not JSON: {}", err)))?;
        Self::from_value(&value)
    }

    /// Builds a document by reading schema JSON from `reader`.
    pub fn from_reader(reader: impl Read) -> SchemaResult<Self> {
        let value: Value = serde_json::from_reader(reader)
            .map_err(|err| SchemaError::schema_invalid(format!("the schema is not JSON: {}", err)))?;
        Self::from_value(&value)
    }

    /// Builds a document around an already-constructed schema tree.
    ///
    /// The controller validates the whole tree, then the root invariants are
    /// checked, then the controller is propagated through the tree.
    pub fn from_schema(root: Schema, controller: Arc<ValidationController>) -> SchemaResult<Self> {
        controller.validate_schema(&root)?;

        match root.kind() {
            SchemaKind::Object | SchemaKind::Array => {}
            kind => return Err(SchemaError::RootKind(kind)),
        }
        if root.is_optional() {
            return Err(SchemaError::RootOptional);
        }

        let document = Self {
            root,
            controller: RwLock::new(controller.clone()),
        };
        document.set_controller(controller);

        debug!(
            "schema document constructed with '{}' root",
            document.root.kind()
        );
        Ok(document)
    }

    /// Returns the root schema.
    pub fn root(&self) -> &Schema {
        &self.root
    }

    /// Returns the controller currently associated with this document.
    pub fn controller(&self) -> Arc<ValidationController> {
        self.controller.read().unwrap().clone()
    }

    /// Replaces the controller on this document and, depth-first, on every
    /// resolved reference document reachable from the root.
    ///
    /// This is the single sanctioned mutation of an otherwise-immutable
    /// structure. The walk is total and idempotent; the lock gives it
    /// single-writer discipline, so in-flight
    /// [`validate_data`](Self::validate_data) calls never observe a partial
    /// swap.
    pub fn set_controller(&self, controller: Arc<ValidationController>) {
        *self.controller.write().unwrap() = controller.clone();
        propagate(&self.root, &controller);
    }

    /// Validates a data value against this document's schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DataInvalid`] (or whatever a custom validator
    /// raised) at the first non-conforming position.
    pub fn validate_data(&self, value: &Value) -> SchemaResult<()> {
        let controller = self.controller();
        controller.validate_data(&self.root, value)
    }
}

/// Walks a schema tree, updating the controller of every resolved reference
/// document beneath it.
fn propagate(schema: &Schema, controller: &Arc<ValidationController>) {
    match schema {
        Schema::Reference { resolved, .. } => resolved.set_controller(controller.clone()),
        _ => {
            for child in schema.sub_schemas() {
                propagate(child, controller);
            }
        }
    }
}

impl Clone for SchemaDocument {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            controller: RwLock::new(self.controller()),
        }
    }
}

/// Documents compare by schema structure; controllers hold opaque validator
/// closures and take no part in equality.
impl PartialEq for SchemaDocument {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}
