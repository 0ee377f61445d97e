//! accord - a compact schema language and validation engine for JSON-shaped
//! data
//!
//! A schema document describes a type as a tree of six kinds (boolean,
//! number, string, object, array, reference). Construction validates the
//! schema itself, resolving any `$ref` to a remote document along the way;
//! the resulting [`SchemaDocument`] is immutable and validates arbitrary
//! data values against the tree.
//!
//! ```
//! use accord::SchemaDocument;
//! use serde_json::json;
//!
//! let document = SchemaDocument::from_value(&json!({
//!     "type": "object",
//!     "fields": [
//!         { "type": "number", "name": "age", "optional": true }
//!     ]
//! }))?;
//!
//! document.validate_data(&json!({ "age": 30 }))?;
//! assert!(document.validate_data(&json!({ "age": "x" })).is_err());
//! # Ok::<(), accord::SchemaError>(())
//! ```

pub mod document;
pub mod errors;
pub mod reference;
pub mod schema;
pub mod validator;

pub use document::SchemaDocument;
pub use errors::{ReferenceError, SchemaError, SchemaResult};
pub use reference::{Fetch, HttpFetch, ReferenceResolver};
pub use schema::{ArrayItems, Metadata, Schema, SchemaBuilder, SchemaKind, SchemaLoader};
pub use validator::{
    ControllerBuilder, DataValidator, SchemaValidator, ValidationController,
};
