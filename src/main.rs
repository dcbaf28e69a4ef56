use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use npm_version_check::auth::Npmrc;
use npm_version_check::check;
use npm_version_check::config::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Outputs go to stdout; logs must stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let outputs = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let npmrc = Arc::new(Npmrc::load().await);
            check::run(cli.into_input(), npmrc.clone(), npmrc).await
        })?;

    outputs.emit()?;

    Ok(())
}
