//! Reference resolution: URL to validated sub-document.

use std::sync::Arc;

use log::{debug, warn};
use serde_json::Value;

use crate::document::SchemaDocument;
use crate::errors::{ReferenceError, SchemaError, SchemaResult};
use crate::reference::fetch::{Fetch, HttpFetch};
use crate::schema::{Metadata, Schema};
use crate::validator::ValidationController;

/// Turns a reference URL into a validated [`SchemaDocument`].
///
/// The fetched document goes through the full construction pipeline with the
/// process-default controller and this resolver's fetcher, so nested
/// references resolve the same way. There is no caching: resolving the same
/// URL twice performs two fetches and yields two independent documents.
///
/// Reference cycles are not detected. A schema that directly or transitively
/// references itself will recurse in the resolver until the fetch layer or
/// the stack gives out.
pub struct ReferenceResolver {
    fetcher: Arc<dyn Fetch>,
}

impl ReferenceResolver {
    /// Creates a resolver over the given fetch capability.
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self { fetcher }
    }

    /// Creates a resolver over the default HTTP fetcher.
    pub fn http() -> Self {
        Self::new(Arc::new(HttpFetch::new()))
    }

    /// Returns the fetch capability this resolver uses.
    pub(crate) fn fetcher(&self) -> Arc<dyn Fetch> {
        self.fetcher.clone()
    }

    /// Fetches, parses, and validates the schema document at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ReferenceUnreachable`] when the fetch fails,
    /// the body is empty or not JSON, or the document does not validate as a
    /// schema.
    pub fn resolve(&self, url: &str) -> SchemaResult<SchemaDocument> {
        debug!("resolving schema reference '{}'", url);

        let body = self.fetcher.fetch(url).map_err(|cause| {
            warn!("fetch for schema reference '{}' failed: {}", url, cause);
            SchemaError::unreachable(url, cause)
        })?;
        if body.is_empty() {
            return Err(SchemaError::unreachable(url, ReferenceError::EmptyBody));
        }

        let value: Value = serde_json::from_slice(&body)
            .map_err(|err| SchemaError::unreachable(url, ReferenceError::NotJson(err.to_string())))?;

        let document = SchemaDocument::from_value_with(
            &value,
            ValidationController::default_controller(),
            self.fetcher.clone(),
        )
        .map_err(|err| SchemaError::unreachable(url, ReferenceError::from(err)))?;

        debug!("resolved schema reference '{}'", url);
        Ok(document)
    }

    /// Builds a reference schema node pointing at the document at `url`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`resolve`](Self::resolve).
    pub fn resolve_schema(&self, meta: Metadata, url: &str) -> SchemaResult<Schema> {
        let resolved = self.resolve(url)?;
        Ok(Schema::Reference {
            meta,
            locator: Some(url.to_string()),
            resolved: Box::new(resolved),
        })
    }
}
