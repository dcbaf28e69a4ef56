//! npm registry metadata lookup.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RegistryError;

/// Default base URL for the public npm registry.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Accept header preferring the abbreviated install metadata format, with a
/// fallback to the full packument.
const ACCEPT_INSTALL_METADATA: &str =
    "application/vnd.npm.install-v1+json; q=1.0, application/json; q=0.8, */*";

/// Result of a metadata lookup. A 404 means the package has never been
/// published, which is a terminal state of the run, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    NotPublished,
    Published(PackageMetadata),
}

/// Normalized view of the registry's package metadata. Absence of either
/// mapping is tolerated and represented as None, never as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub versions: Option<Vec<String>>,
    pub dist_tags: Option<HashMap<String, String>>,
}

pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("npm-version-check")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Encode a package name for the URL path. A scoped name keeps its
    /// leading `@` literal and encodes the separating slash.
    fn encode_package_name(package_name: &str) -> String {
        if package_name.starts_with('@') {
            // Scoped package: @scope/name -> @scope%2Fname
            package_name.replace('/', "%2F")
        } else {
            package_name.to_string()
        }
    }

    /// Fetch the package metadata, attaching a bearer token when one was
    /// resolved.
    pub async fn fetch_metadata(
        &self,
        package_name: &str,
        token: Option<&str>,
    ) -> Result<Lookup, RegistryError> {
        let url = format!(
            "{}/{}",
            self.base_url,
            Self::encode_package_name(package_name)
        );

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, ACCEPT_INSTALL_METADATA);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(%url, "no package has been published under this URL");
            return Ok(Lookup::NotPublished);
        }

        let text = response.text().await?;
        let body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) => {
                if !status.is_success() {
                    warn!(%status, %url, "registry returned unexpected status");
                    return Err(RegistryError::UnexpectedStatus(status));
                }
                return Err(RegistryError::InvalidResponse(e.to_string()));
            }
        };

        // Registries report failures through an error field regardless of
        // status; surface that message verbatim.
        if let Some(message) = body.get("error").and_then(Value::as_str) {
            return Err(RegistryError::Registry(message.to_string()));
        }
        if !status.is_success() {
            warn!(%status, %url, "registry returned unexpected status");
            return Err(RegistryError::UnexpectedStatus(status));
        }

        let metadata = normalize(&body);
        match &metadata.versions {
            Some(versions) => debug!(count = versions.len(), "published versions retrieved"),
            None => debug!("no versions data has been found"),
        }
        match &metadata.dist_tags {
            Some(tags) => debug!(count = tags.len(), "dist-tags retrieved"),
            None => debug!("no dist-tags data has been found"),
        }

        Ok(Lookup::Published(metadata))
    }
}

/// Extract the version key set and the tag mapping from the raw body.
/// Missing or non-object fields become None; dist-tag entries whose value
/// is not a string are dropped, so tag lookup on them falls through to
/// range matching.
fn normalize(body: &Value) -> PackageMetadata {
    let versions = body
        .get("versions")
        .and_then(Value::as_object)
        .map(|map| map.keys().cloned().collect());

    let dist_tags = body.get("dist-tags").and_then(Value::as_object).map(|map| {
        map.iter()
            .filter_map(|(tag, version)| {
                version.as_str().map(|v| (tag.clone(), v.to_string()))
            })
            .collect()
    });

    PackageMetadata {
        versions,
        dist_tags,
    }
}
