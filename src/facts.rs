//! The fact resolver graph.
//!
//! Seven configuration facts with cross-dependencies, each resolved at most
//! once. Every fact follows a strict priority order: explicit input first,
//! then whatever can be reconstructed from the manifest, other facts or the
//! collaborators. Resolution is pull-based: an accessor awaits the facts it
//! needs, in whatever order callers arrive. Each fact lives in a
//! `tokio::sync::OnceCell`, which serializes initializers, so a derivation
//! body runs exactly once even when two callers hit a cold cell
//! concurrently; facts that are never requested are never computed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use semver::Version;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::auth::{AuthLookup, ScopedRegistryLookup};
use crate::config::RawInput;
use crate::error::CheckError;
use crate::manifest::{self, Manifest};
use crate::registry::DEFAULT_REGISTRY_URL;
use crate::version::compare::Operator;
use crate::version::select::SelectionMode;

pub struct FactGraph {
    input: RawInput,
    auth: Arc<dyn AuthLookup>,
    scoped_registries: Arc<dyn ScopedRegistryLookup>,

    manifest_path: OnceCell<PathBuf>,
    manifest: OnceCell<Manifest>,
    name: OnceCell<String>,
    scope: OnceCell<Option<String>>,
    registry: OnceCell<String>,
    token: OnceCell<Option<String>>,
    target_version: OnceCell<String>,
    committed_version: OnceCell<Version>,
    operator: OnceCell<Operator>,
}

impl FactGraph {
    pub fn new(
        input: RawInput,
        auth: Arc<dyn AuthLookup>,
        scoped_registries: Arc<dyn ScopedRegistryLookup>,
    ) -> Self {
        Self {
            input,
            auth,
            scoped_registries,
            manifest_path: OnceCell::new(),
            manifest: OnceCell::new(),
            name: OnceCell::new(),
            scope: OnceCell::new(),
            registry: OnceCell::new(),
            token: OnceCell::new(),
            target_version: OnceCell::new(),
            committed_version: OnceCell::new(),
            operator: OnceCell::new(),
        }
    }

    pub async fn manifest_path(&self) -> Result<&Path, CheckError> {
        let path = self
            .manifest_path
            .get_or_try_init(|| async {
                let path = manifest::locate(Path::new(&self.input.path)).await?;
                debug!(path = %path.display(), "resolved manifest path");
                Ok::<_, CheckError>(path)
            })
            .await?;
        Ok(path)
    }

    pub async fn manifest(&self) -> Result<&Manifest, CheckError> {
        self.manifest
            .get_or_try_init(|| async {
                let path = self.manifest_path().await?;
                Ok::<_, CheckError>(manifest::load(path).await?)
            })
            .await
    }

    /// Package name: explicit input, else the manifest `name`.
    pub async fn name(&self) -> Result<&str, CheckError> {
        let name = self
            .name
            .get_or_try_init(|| async {
                let name = match &self.input.package {
                    Some(name) => name.clone(),
                    None => self.manifest().await?.name()?.to_string(),
                };
                debug!(%name, "resolved package name");
                Ok::<_, CheckError>(name)
            })
            .await?;
        Ok(name)
    }

    /// Scope: explicit input, else derived from a name of the form
    /// `@scope/rest`; null otherwise.
    pub async fn scope(&self) -> Result<Option<&str>, CheckError> {
        let scope = self
            .scope
            .get_or_try_init(|| async {
                let scope = match &self.input.scope {
                    Some(scope) => Some(scope.clone()),
                    None => scope_of(self.name().await?).map(str::to_string),
                };
                debug!(?scope, "resolved scope");
                Ok::<_, CheckError>(scope)
            })
            .await?;
        Ok(scope.as_deref())
    }

    /// Registry URL: explicit input, else the manifest's publishconfig
    /// registry, else the registry configured for the scope, else the
    /// public default.
    pub async fn registry(&self) -> Result<&str, CheckError> {
        let registry = self
            .registry
            .get_or_try_init(|| async {
                if let Some(registry) = &self.input.registry {
                    debug!(%registry, "resolved registry (explicit input)");
                    return Ok::<_, CheckError>(registry.clone());
                }
                if let Some(registry) = self.manifest().await?.publish_registry() {
                    debug!(%registry, "resolved registry (manifest publishconfig)");
                    return Ok(registry.to_string());
                }
                if let Some(scope) = self.scope().await?
                    && let Some(registry) =
                        self.scoped_registries.registry_for_scope(scope).await
                {
                    debug!(%registry, %scope, "resolved registry (scoped configuration)");
                    return Ok(registry);
                }
                debug!(registry = DEFAULT_REGISTRY_URL, "resolved registry (default)");
                Ok(DEFAULT_REGISTRY_URL.to_string())
            })
            .await?;
        Ok(registry)
    }

    /// Auth token: explicit input, else looked up for the resolved
    /// registry; only Bearer credentials are accepted.
    pub async fn token(&self) -> Result<Option<&str>, CheckError> {
        let token = self
            .token
            .get_or_try_init(|| async {
                if let Some(token) = &self.input.token {
                    debug!("resolved registry token (explicit input) => <hidden>");
                    return Ok::<_, CheckError>(Some(token.clone()));
                }
                let registry = self.registry().await?;
                match self.auth.token_for(registry).await {
                    Some(auth) if auth.scheme == "Bearer" => {
                        debug!("resolved registry token => <hidden>");
                        Ok(Some(auth.token))
                    }
                    Some(auth) => {
                        debug!(scheme = %auth.scheme, "ignoring non-bearer registry credential");
                        Ok(None)
                    }
                    None => {
                        debug!("no registry token configured");
                        Ok(None)
                    }
                }
            })
            .await?;
        Ok(token.as_deref())
    }

    /// Target version expression: explicit input, else `latest`. The bare
    /// shorthands `^` and `~` expand around the committed version.
    pub async fn target_version(&self) -> Result<&str, CheckError> {
        let target = self
            .target_version
            .get_or_try_init(|| async {
                let target = match &self.input.version {
                    Some(shorthand) if shorthand == "^" || shorthand == "~" => {
                        format!("{shorthand}{}", self.committed_version().await?)
                    }
                    Some(version) => version.clone(),
                    None => "latest".to_string(),
                };
                debug!(%target, "resolved target version expression");
                Ok::<_, CheckError>(target)
            })
            .await?;
        Ok(target)
    }

    /// Committed version: the explicit input when it is valid semver, else
    /// the manifest `version`, which must itself be valid semver.
    pub async fn committed_version(&self) -> Result<&Version, CheckError> {
        self.committed_version
            .get_or_try_init(|| async {
                if let Some(raw) = &self.input.version
                    && let Ok(version) = Version::parse(raw)
                {
                    debug!(%version, "resolved committed version (explicit input)");
                    return Ok(version);
                }
                let raw = self.manifest().await?.version()?;
                let version =
                    Version::parse(raw).map_err(|_| CheckError::InvalidVersion(raw.to_string()))?;
                debug!(%version, "resolved committed version (manifest)");
                Ok(version)
            })
            .await
    }

    /// Operator: explicit input, else `>`.
    pub async fn operator(&self) -> Result<Operator, CheckError> {
        self.operator
            .get_or_try_init(|| async {
                let operator = match &self.input.operator {
                    Some(raw) => raw.parse::<Operator>()?,
                    None => Operator::Gt,
                };
                debug!(?operator, "resolved operator");
                Ok::<_, CheckError>(operator)
            })
            .await
            .copied()
    }

    pub fn selection_mode(&self) -> SelectionMode {
        if self.input.range {
            SelectionMode::RangeOnly
        } else {
            SelectionMode::TagThenRange
        }
    }
}

fn scope_of(name: &str) -> Option<&str> {
    let rest = name.strip_prefix('@')?;
    let (scope, _) = rest.split_once('/')?;
    Some(scope)
}
