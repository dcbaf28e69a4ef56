//! Command line and environment input capture.
//!
//! Every input is optional. The tool is usually invoked from a CI step, so
//! each flag also reads the GitHub-Actions-style `INPUT_*` environment
//! variable; empty values are treated as unset, matching how an Action
//! runner passes inputs that were not configured.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "npm-version-check")]
#[command(version, disable_version_flag = true, about = "Compare the committed package.json version against an npm registry")]
pub struct Cli {
    /// Comparison operator, applied as `retrieved OP committed` (default `>`)
    #[arg(long, env = "INPUT_OPERATOR")]
    operator: Option<String>,

    /// Path to package.json, or to a directory containing one
    #[arg(long, env = "INPUT_PATH")]
    path: Option<String>,

    /// Package scope override, without the leading `@`
    #[arg(long, env = "INPUT_SCOPE")]
    scope: Option<String>,

    /// Registry base URL override
    #[arg(long, env = "INPUT_REGISTRY")]
    registry: Option<String>,

    /// Bearer token for the registry
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Version expression to resolve on the registry: a dist-tag or a
    /// semver range (default `latest`)
    #[arg(long, env = "INPUT_VERSION")]
    version: Option<String>,

    /// Package name override
    #[arg(long, env = "INPUT_PACKAGE")]
    package: Option<String>,

    /// Resolve the version expression as a semver range only, ignoring
    /// dist-tags
    #[arg(long, env = "INPUT_RANGE")]
    range: bool,
}

/// Flat record of raw inputs, immutable once captured. Defaults that feed
/// the fact graph (operator `>`, target expression `latest`) are applied at
/// fact resolution, not here; only the manifest path defaults at capture.
#[derive(Debug, Clone)]
pub struct RawInput {
    pub operator: Option<String>,
    pub path: String,
    pub scope: Option<String>,
    pub registry: Option<String>,
    pub token: Option<String>,
    pub version: Option<String>,
    pub package: Option<String>,
    pub range: bool,
}

impl Default for RawInput {
    fn default() -> Self {
        Self {
            operator: None,
            path: ".".to_string(),
            scope: None,
            registry: None,
            token: None,
            version: None,
            package: None,
            range: false,
        }
    }
}

impl Cli {
    pub fn into_input(self) -> RawInput {
        RawInput {
            operator: normalize(self.operator),
            path: normalize(self.path).unwrap_or_else(|| ".".to_string()),
            scope: normalize(self.scope),
            registry: normalize(self.registry),
            token: normalize(self.token),
            version: normalize(self.version),
            package: normalize(self.package),
            range: self.range,
        }
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
