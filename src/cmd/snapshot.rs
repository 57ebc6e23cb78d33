//! Snapshot command: freezes catalog metadata into a JSON or YAML file.

use super::generate::{connect, load_config};
use super::SourceArgs;
use anyhow::{Context, Result};
use sqldoc::catalog::SnapshotCatalog;
use std::path::PathBuf;

pub fn run(source: SourceArgs, output: PathBuf) -> Result<()> {
    let config = load_config(&source)?;
    let catalog = connect(&config)?;

    let snapshot = SnapshotCatalog::capture(
        &catalog,
        &config.database.schemas,
        &config.database.exclude_tables,
    )
    .context("capturing catalog")?;
    snapshot.save(&output)?;

    eprintln!(
        "Snapshot of {} tables written to: {}",
        snapshot.table_count(),
        output.display()
    );
    Ok(())
}
