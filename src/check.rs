//! Run orchestration: facts -> registry lookup -> selection -> comparison.

use std::sync::Arc;

use semver::Version;
use tracing::debug;

use crate::auth::{AuthLookup, ScopedRegistryLookup};
use crate::config::RawInput;
use crate::error::CheckError;
use crate::facts::FactGraph;
use crate::output::Outputs;
use crate::registry::{Lookup, RegistryClient};
use crate::version::compare;
use crate::version::select::select_version;

/// Execute one check. A pure function of the raw inputs and the two
/// collaborators; fatal errors abort with no partial output set, while
/// "never published" and "nothing selected" complete with full outputs.
pub async fn run(
    input: RawInput,
    auth: Arc<dyn AuthLookup>,
    scoped_registries: Arc<dyn ScopedRegistryLookup>,
) -> Result<Outputs, CheckError> {
    let facts = FactGraph::new(input, auth, scoped_registries);

    let name = facts.name().await?.to_string();
    let target = facts.target_version().await?.to_string();
    let registry = facts.registry().await?.to_string();
    let token = facts.token().await?.map(str::to_string);
    let committed = facts.committed_version().await?.clone();
    let operator = facts.operator().await?;
    let mode = facts.selection_mode();

    let client = RegistryClient::new(&registry);
    let metadata = match client.fetch_metadata(&name, token.as_deref()).await? {
        Lookup::NotPublished => {
            debug!(%name, "package has never been published");
            return Ok(Outputs::not_published(&committed));
        }
        Lookup::Published(metadata) => metadata,
    };

    let selection = select_version(&target, &metadata, mode);
    let outcome = match selection.version() {
        Some(raw) => {
            let selected = Version::parse(raw)
                .map_err(|_| CheckError::InvalidVersion(raw.to_string()))?;
            compare::compare(operator, Some(&selected), &committed)
        }
        None => compare::compare(operator, None, &committed),
    };

    Ok(Outputs::published(
        &committed,
        &selection,
        metadata.versions.as_deref(),
        outcome,
    ))
}
