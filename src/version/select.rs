//! Selection of one published version from the registry metadata.

use tracing::debug;

use crate::registry::PackageMetadata;
use crate::version::range;

/// How the target version expression is resolved against the metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Try the dist-tag mapping first, fall back to range matching. This
    /// ordering is load-bearing: an expression equal to a tag name (such as
    /// `latest`) must resolve via the tag, never as a degenerate range.
    TagThenRange,
    /// Treat the expression strictly as a semver range.
    RangeOnly,
}

/// Outcome of version selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The expression named a dist-tag; its version wins.
    Tagged { tag: String, version: String },
    /// The expression matched as a range; the maximum satisfying version.
    Satisfied(String),
    /// No tag matched and no published version satisfies the range.
    NoMatch,
}

impl Selection {
    pub fn version(&self) -> Option<&str> {
        match self {
            Selection::Tagged { version, .. } | Selection::Satisfied(version) => Some(version),
            Selection::NoMatch => None,
        }
    }
}

pub fn select_version(target: &str, metadata: &PackageMetadata, mode: SelectionMode) -> Selection {
    if mode == SelectionMode::TagThenRange
        && let Some(tags) = &metadata.dist_tags
        && let Some(version) = tags.get(target)
    {
        debug!(tag = target, %version, "selected version via dist-tag");
        return Selection::Tagged {
            tag: target.to_string(),
            version: version.clone(),
        };
    }

    if let Some(versions) = &metadata.versions
        && let Some(version) = range::max_satisfying(versions, target)
    {
        debug!(range = target, %version, "selected version via range match");
        return Selection::Satisfied(version);
    }

    debug!(target, "no published version matched the target expression");
    Selection::NoMatch
}
