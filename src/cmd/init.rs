//! Init command: writes an example config file.

use anyhow::{bail, Context, Result};
use sqldoc::config::EXAMPLE_CONFIG;
use std::fs;
use std::path::PathBuf;

pub fn run(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    fs::write(&path, EXAMPLE_CONFIG)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Example config file written to {}", path.display());
    Ok(())
}
