//! Registry credential and scoped-registry lookups.
//!
//! Both lookups are black boxes from the resolver's point of view: given a
//! registry URL they may produce a credential, given a scope they may
//! produce a registry URL. The production implementation reads npm's
//! `.npmrc` files; tests substitute mocks.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// A credential as declared in the npm configuration. Only `Bearer`
/// credentials are usable for registry lookups; the scheme is reported so
/// the caller can reject the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub scheme: String,
    pub token: String,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthLookup: Send + Sync {
    /// Look up a credential for a registry base URL, or None if the
    /// configuration declares nothing for it.
    async fn token_for(&self, registry_url: &str) -> Option<AuthToken>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScopedRegistryLookup: Send + Sync {
    /// Look up the registry URL configured for a package scope (without the
    /// leading `@`), or None if the scope has no dedicated registry.
    async fn registry_for_scope(&self, scope: &str) -> Option<String>;
}

/// npm configuration, merged from the user `~/.npmrc` and a project-local
/// `.npmrc` (project entries win). Supports `@scope:registry=<url>`,
/// `//host/path/:_authToken=<token>` and `//host/path/:_auth=<base64>`
/// entries, `${VAR}` value expansion and `#`/`;` comments.
#[derive(Debug, Clone, Default)]
pub struct Npmrc {
    entries: HashMap<String, String>,
}

impl Npmrc {
    pub async fn load() -> Self {
        let mut npmrc = Self::default();

        if let Some(home) = dirs::home_dir() {
            npmrc.merge_file(&home.join(".npmrc")).await;
        }
        npmrc.merge_file(Path::new(".npmrc")).await;

        npmrc
    }

    pub fn parse(text: &str) -> Self {
        let mut npmrc = Self::default();
        npmrc.merge(text);
        npmrc
    }

    async fn merge_file(&mut self, path: &Path) {
        if let Ok(text) = tokio::fs::read_to_string(path).await {
            self.merge(&text);
        }
    }

    fn merge(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            self.entries
                .insert(key.trim().to_string(), expand_env(value.trim()));
        }
    }

    fn credential(&self, prefix: &str) -> Option<AuthToken> {
        for (suffix, scheme) in [(":_authToken", "Bearer"), (":_auth", "Basic")] {
            // npmrc keys appear both with and without a trailing slash.
            for key in [format!("{prefix}/{suffix}"), format!("{prefix}{suffix}")] {
                if let Some(token) = self.entries.get(&key) {
                    return Some(AuthToken {
                        scheme: scheme.to_string(),
                        token: token.clone(),
                    });
                }
            }
        }
        None
    }
}

#[async_trait]
impl AuthLookup for Npmrc {
    async fn token_for(&self, registry_url: &str) -> Option<AuthToken> {
        // Walk from the most specific host+path prefix to the bare host.
        let mut parts = host_path_parts(registry_url);
        while !parts.is_empty() {
            if let Some(token) = self.credential(&format!("//{}", parts.join("/"))) {
                return Some(token);
            }
            parts.pop();
        }
        None
    }
}

#[async_trait]
impl ScopedRegistryLookup for Npmrc {
    async fn registry_for_scope(&self, scope: &str) -> Option<String> {
        self.entries.get(&format!("@{scope}:registry")).cloned()
    }
}

fn host_path_parts(registry_url: &str) -> Vec<&str> {
    let rest = registry_url
        .strip_prefix("https:")
        .or_else(|| registry_url.strip_prefix("http:"))
        .unwrap_or(registry_url);
    let rest = rest.strip_prefix("//").unwrap_or(rest);

    rest.trim_end_matches('/')
        .split('/')
        .filter(|p| !p.is_empty())
        .collect()
}

/// Expand `${VAR}` references from the process environment, the way npm
/// expands npmrc values. Unset variables expand to nothing.
fn expand_env(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find('}') {
            Some(end) => {
                let var = &rest[start + 2..start + 2 + end];
                if let Ok(expanded) = std::env::var(var) {
                    out.push_str(&expanded);
                }
                rest = &rest[start + 2 + end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }

    out.push_str(rest);
    out
}
