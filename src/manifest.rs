//! package.json loading.
//!
//! The path input may point at the manifest itself or at a directory
//! containing one. Parsing is deliberately permissive: fields are typed as
//! raw JSON values and validated only when consumed, so a manifest with an
//! odd `publishconfig` still loads and only the facts that actually need a
//! field can fail on it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::ManifestError;

pub const MANIFEST_FILE_NAME: &str = "package.json";

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    version: Option<Value>,
    #[serde(default)]
    publishconfig: Option<Value>,
}

impl Manifest {
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(text).map_err(|e| ManifestError::Parse(e.to_string()))
    }

    pub fn name(&self) -> Result<&str, ManifestError> {
        self.name
            .as_ref()
            .and_then(Value::as_str)
            .ok_or(ManifestError::MissingField("name"))
    }

    pub fn version(&self) -> Result<&str, ManifestError> {
        self.version
            .as_ref()
            .and_then(Value::as_str)
            .ok_or(ManifestError::MissingField("version"))
    }

    /// Registry override declared by the manifest: only honored when
    /// `publishconfig` is an object carrying a string `registry` field.
    pub fn publish_registry(&self) -> Option<&str> {
        self.publishconfig
            .as_ref()?
            .as_object()?
            .get("registry")?
            .as_str()
    }
}

/// Resolve the actual manifest file path. A directory gets the conventional
/// file name appended; a missing path is `NotFound`.
pub async fn locate(path: &Path) -> Result<PathBuf, ManifestError> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ManifestError::NotFound(path.display().to_string())
        } else {
            ManifestError::Read(e)
        }
    })?;

    if metadata.is_file() {
        Ok(path.to_path_buf())
    } else {
        Ok(path.join(MANIFEST_FILE_NAME))
    }
}

pub async fn load(path: &Path) -> Result<Manifest, ManifestError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ManifestError::NotFound(path.display().to_string())
        } else {
            ManifestError::Read(e)
        }
    })?;

    Manifest::parse(&text)
}
