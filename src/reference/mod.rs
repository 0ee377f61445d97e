//! Reference resolution subsystem
//!
//! A `$ref` in a schema is resolved at construction time: the referenced
//! document is fetched, parsed, and validated under the same rules as any
//! other schema document, and the result becomes the reference's resolved
//! sub-document. The transport is abstracted behind the [`Fetch`] trait;
//! [`HttpFetch`] is the default implementation.

mod fetch;
mod resolver;

pub use fetch::{Fetch, HttpFetch};
pub use resolver::ReferenceResolver;
