//! Named result outputs.
//!
//! Emission follows the GitHub Actions convention: when `GITHUB_OUTPUT`
//! names a file, `key=value` lines are appended to it; otherwise they are
//! printed to stdout (logs go to stderr, so stdout stays machine-readable).

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use semver::Version;

use crate::version::compare::ComparisonOutcome;
use crate::version::select::Selection;

pub const NOT_FOUND: &str = "NOT_FOUND";

/// Whether the committed version is absent from the published set.
/// `Unknown` when the registry response carried no version set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tristate {
    True,
    False,
    Unknown,
}

impl fmt::Display for Tristate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tristate::True => write!(f, "true"),
            Tristate::False => write!(f, "false"),
            Tristate::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outputs {
    pub is_published: bool,
    pub committed_version: String,
    pub retrieved_version: String,
    pub is_committed_version_free: Tristate,
    pub result: ComparisonOutcome,
}

impl Outputs {
    /// Output set for a registry 404: the package has never been published,
    /// so the committed version is trivially free and nothing was compared.
    pub fn not_published(committed: &Version) -> Self {
        Self {
            is_published: false,
            committed_version: committed.to_string(),
            retrieved_version: NOT_FOUND.to_string(),
            is_committed_version_free: Tristate::True,
            result: ComparisonOutcome::Unknown,
        }
    }

    /// Output set for a successful lookup.
    pub fn published(
        committed: &Version,
        selection: &Selection,
        versions: Option<&[String]>,
        result: ComparisonOutcome,
    ) -> Self {
        let committed_version = committed.to_string();
        let is_committed_version_free = match versions {
            Some(set) if set.iter().any(|v| *v == committed_version) => Tristate::False,
            Some(_) => Tristate::True,
            None => Tristate::Unknown,
        };

        Self {
            is_published: true,
            committed_version,
            retrieved_version: selection
                .version()
                .unwrap_or(NOT_FOUND)
                .to_string(),
            is_committed_version_free,
            result,
        }
    }

    pub fn pairs(&self) -> [(&'static str, String); 5] {
        [
            ("is-published", self.is_published.to_string()),
            ("committed-version", self.committed_version.clone()),
            ("retrieved-version", self.retrieved_version.clone()),
            (
                "is-committed-version-free",
                self.is_committed_version_free.to_string(),
            ),
            ("result", self.result.to_string()),
        ]
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (key, value) in self.pairs() {
            writeln!(writer, "{key}={value}")?;
        }
        Ok(())
    }

    pub fn append_to_file(&self, path: &Path) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        self.write_to(&mut file)
    }

    pub fn emit(&self) -> io::Result<()> {
        match std::env::var_os("GITHUB_OUTPUT") {
            Some(path) => self.append_to_file(Path::new(&path)),
            None => self.write_to(&mut io::stdout().lock()),
        }
    }
}
