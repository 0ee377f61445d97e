//! Fetch capability consumed by the reference resolver.

use crate::errors::ReferenceError;

/// Retrieves the bytes behind a reference URL.
///
/// One attempt, blocking, no retry; any transport failure is terminal for
/// the schema construction that triggered the fetch.
pub trait Fetch: Send + Sync {
    /// Fetches the document at `url`
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ReferenceError>;
}

/// The default fetch implementation: a blocking HTTP(S) GET.
///
/// Non-success statuses are reported as [`ReferenceError::Fetch`].
pub struct HttpFetch {
    client: reqwest::blocking::Client,
}

impl HttpFetch {
    /// Creates a fetcher with a default HTTP client.
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpFetch {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for HttpFetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ReferenceError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| ReferenceError::Fetch(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReferenceError::Fetch(format!(
                "unexpected status {} from '{}'",
                status, url
            )));
        }

        let body = response
            .bytes()
            .map_err(|err| ReferenceError::Fetch(err.to_string()))?;
        Ok(body.to_vec())
    }
}
