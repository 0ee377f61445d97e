//! Schema model subsystem
//!
//! The tagged-variant schema tree and the machinery that moves it across the
//! document-value boundary:
//!
//! - [`types`]: the six schema kinds, their metadata, and tree traversal
//! - [`builder`]: replace-via-builder derivation of changed nodes
//! - [`loader`]: document value to schema tree, resolving references
//! - [`serializer`]: schema tree back to a document value

mod builder;
mod loader;
mod serializer;
mod types;

pub use builder::SchemaBuilder;
pub use loader::SchemaLoader;
pub use types::{ArrayItems, Metadata, Schema, SchemaKind};
