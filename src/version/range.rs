//! npm semver range evaluation.
//!
//! Supports the npm range grammar:
//! - `1.2.3` - exact match (partials like `1.2` pad to `1.2.0`)
//! - `^1.2.3` - compatible with version (>=1.2.3 <2.0.0, special 0.x cases)
//! - `~1.2.3` - approximately equivalent (>=1.2.3 <1.3.0)
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators
//! - `1.2.x`, `1.x`, `*` - wildcards
//! - `1.0.0 - 2.0.0` - hyphen ranges
//! - space-separated AND, `||`-separated OR compounds

use semver::Version;

/// Pick the maximum published version that satisfies `spec`, skipping
/// entries that are not parseable as semver. None when the spec itself does
/// not parse or nothing satisfies it.
pub fn max_satisfying(versions: &[String], spec: &str) -> Option<String> {
    let spec = VersionSpec::parse(spec)?;

    versions
        .iter()
        .filter_map(|raw| Version::parse(raw).ok().map(|parsed| (raw, parsed)))
        .filter(|(_, parsed)| spec.satisfies(parsed))
        .max_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(raw, _)| raw.clone())
}

/// Parse a version string, padding partial versions (`1` -> `1.0.0`,
/// `1.2` -> `1.2.0`) the way npm normalizes them.
fn parse_version(version: &str) -> Option<Version> {
    let normalized = match version.split('.').count() {
        1 => format!("{version}.0.0"),
        2 => format!("{version}.0"),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// A parsed range expression. OR has the lowest precedence, then
/// space-separated AND, then single ranges.
#[derive(Debug)]
enum VersionSpec {
    Single(VersionRange),
    And(Vec<VersionRange>),
    Or(Vec<VersionSpec>),
}

impl VersionSpec {
    fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return None;
        }

        if spec.contains("||") {
            let alternatives: Option<Vec<VersionSpec>> =
                spec.split("||").map(Self::parse_conjunction).collect();
            return alternatives.map(VersionSpec::Or);
        }

        Self::parse_conjunction(spec)
    }

    /// Parse a spec with no `||`: one range, or several ANDed together.
    /// Hyphen ranges consume three whitespace tokens (`from - to`).
    fn parse_conjunction(spec: &str) -> Option<Self> {
        let tokens: Vec<&str> = spec.split_whitespace().collect();
        let mut ranges = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            if i + 2 < tokens.len() && tokens[i + 1] == "-" {
                ranges.push(VersionRange::Hyphen {
                    from: parse_version(tokens[i])?,
                    to: parse_version(tokens[i + 2])?,
                });
                i += 3;
            } else {
                ranges.push(VersionRange::parse(tokens[i])?);
                i += 1;
            }
        }

        match ranges.len() {
            0 => None,
            1 => Some(VersionSpec::Single(ranges.into_iter().next().unwrap())),
            _ => Some(VersionSpec::And(ranges)),
        }
    }

    fn satisfies(&self, version: &Version) -> bool {
        match self {
            VersionSpec::Single(range) => range.satisfies(version),
            VersionSpec::And(ranges) => ranges.iter().all(|r| r.satisfies(version)),
            VersionSpec::Or(specs) => specs.iter().any(|s| s.satisfies(version)),
        }
    }
}

#[derive(Debug)]
enum VersionRange {
    Exact(Version),
    Caret(Version),
    Tilde(Version),
    Gte(Version),
    Gt(Version),
    Lte(Version),
    Lt(Version),
    Any,
    WildcardMajor(u64),
    WildcardMinor(u64, u64),
    Hyphen { from: Version, to: Version },
}

impl VersionRange {
    fn parse(spec: &str) -> Option<Self> {
        if let Some(rest) = spec.strip_prefix(">=") {
            parse_version(rest).map(VersionRange::Gte)
        } else if let Some(rest) = spec.strip_prefix('>') {
            parse_version(rest).map(VersionRange::Gt)
        } else if let Some(rest) = spec.strip_prefix("<=") {
            parse_version(rest).map(VersionRange::Lte)
        } else if let Some(rest) = spec.strip_prefix('<') {
            parse_version(rest).map(VersionRange::Lt)
        } else if let Some(rest) = spec.strip_prefix('^') {
            parse_version(rest).map(VersionRange::Caret)
        } else if let Some(rest) = spec.strip_prefix('~') {
            parse_version(rest).map(VersionRange::Tilde)
        } else if spec == "*" {
            Some(VersionRange::Any)
        } else if let Some(range) = Self::parse_wildcard(spec) {
            Some(range)
        } else {
            parse_version(spec).map(VersionRange::Exact)
        }
    }

    /// Wildcard patterns: `1.x` and `1.2.x` (case-insensitive `x`).
    fn parse_wildcard(spec: &str) -> Option<Self> {
        let parts: Vec<&str> = spec.split('.').collect();

        match parts.as_slice() {
            [major, x] if x.eq_ignore_ascii_case("x") => {
                major.parse().ok().map(VersionRange::WildcardMajor)
            }
            [major, minor, x] if x.eq_ignore_ascii_case("x") => {
                Some(VersionRange::WildcardMinor(
                    major.parse().ok()?,
                    minor.parse().ok()?,
                ))
            }
            _ => None,
        }
    }

    fn satisfies(&self, version: &Version) -> bool {
        match self {
            VersionRange::Exact(v) => version == v,
            VersionRange::Caret(v) => {
                if version < v {
                    return false;
                }
                // ^1.2.3 -> >=1.2.3 <2.0.0
                // ^0.2.3 -> >=0.2.3 <0.3.0
                // ^0.0.3 -> >=0.0.3 <0.0.4
                if v.major == 0 {
                    if v.minor == 0 {
                        version.major == 0 && version.minor == 0 && version.patch == v.patch
                    } else {
                        version.major == 0 && version.minor == v.minor
                    }
                } else {
                    version.major == v.major
                }
            }
            // ~1.2.3 -> >=1.2.3 <1.3.0
            VersionRange::Tilde(v) => {
                version >= v && version.major == v.major && version.minor == v.minor
            }
            VersionRange::Gte(v) => version >= v,
            VersionRange::Gt(v) => version > v,
            VersionRange::Lte(v) => version <= v,
            VersionRange::Lt(v) => version < v,
            VersionRange::Any => true,
            VersionRange::WildcardMajor(major) => version.major == *major,
            VersionRange::WildcardMinor(major, minor) => {
                version.major == *major && version.minor == *minor
            }
            VersionRange::Hyphen { from, to } => version >= from && version <= to,
        }
    }
}
