use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest not found: {0}")]
    NotFound(String),

    #[error("Failed to read manifest: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse manifest: {0}")]
    Parse(String),

    #[error("Manifest has no usable {0} field")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Registry returned unexpected status: {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    // Message taken verbatim from the registry's error body.
    #[error("{0}")]
    Registry(String),

    #[error("Invalid registry response: {0}")]
    InvalidResponse(String),
}

/// Run-level error type: every fatal condition aborts the run with no
/// partial output set.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("The operator {0} cannot be processed")]
    UnsupportedOperator(String),

    #[error("Not a valid semver version: {0}")]
    InvalidVersion(String),
}
