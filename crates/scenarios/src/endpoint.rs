//! Target endpoint of the client REST API

use crate::record::ClientId;
use crate::ScenarioError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Collection endpoint targeted by the k6 load scripts
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/v1/client";

/// Base URL of the client collection, stored without a trailing slash
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    /// Parse and validate an http(s) collection URL.
    ///
    /// Queries and fragments are rejected since item URLs are built by
    /// appending a path segment.
    pub fn new(url: impl Into<String>) -> Result<Self, ScenarioError> {
        let raw = url.into();
        let invalid = |reason: String| ScenarioError::InvalidEndpoint(raw.clone(), reason);

        let mut base = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "unsupported scheme '{}', expected http or https",
                base.scheme()
            )));
        }
        if base.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        if base.query().is_some() || base.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed".to_string()));
        }

        let path = base.path().trim_end_matches('/').to_string();
        base.set_path(&path);

        Ok(Self { base })
    }

    pub fn as_str(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Collection URL, with or without the trailing slash.
    ///
    /// Both forms address the same logical collection.
    pub fn collection_url(&self, trailing_slash: bool) -> String {
        if trailing_slash {
            format!("{}/", self.as_str())
        } else {
            self.as_str().to_string()
        }
    }

    /// URL of a single client; the id is percent-encoded as one path segment
    pub fn item_url(&self, id: &ClientId) -> String {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id.as_str());
        }
        url.into()
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE_URL).expect("default endpoint is a valid URL"),
        }
    }
}

impl TryFrom<String> for Endpoint {
    type Error = ScenarioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.as_str().to_string()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
