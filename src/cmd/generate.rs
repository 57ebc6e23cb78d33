//! Generate command: documents a database (or a snapshot of one).

use super::{split_list, GenerateArgs, SourceArgs};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use sqldoc::catalog::{MetadataProvider, PostgresCatalog, SnapshotCatalog};
use sqldoc::config::Config;
use sqldoc::generate::{Generator, TerminalPreview};
use std::io::IsTerminal;
use std::time::Instant;

/// Load the config file and apply source flags on top of it
pub(crate) fn load_config(source: &SourceArgs) -> Result<Config> {
    let mut config = Config::load(source.config.as_deref())?;
    if let Some(url) = &source.database_url {
        config.database.url = Some(url.clone());
    }
    if let Some(schemas) = &source.schemas {
        config.database.schemas = split_list(schemas);
    }
    if let Some(exclude) = &source.exclude {
        config.database.exclude_tables = split_list(exclude);
    }
    Ok(config)
}

/// Connect to the configured database
pub(crate) fn connect(config: &Config) -> Result<PostgresCatalog> {
    let url = config.database_url()?;
    PostgresCatalog::connect(url).context("opening database")
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let mut config = load_config(&args.source)?;
    if let Some(strategy) = args.strategy {
        config.documentation.strategy = strategy;
    }
    if let Some(dir) = args.output_dir {
        config.documentation.directory = dir;
    }
    if let Some(filename) = args.filename {
        config.documentation.filename = filename;
    }
    if args.mermaid {
        config.documentation.mermaid = true;
    }
    if args.no_constraints {
        config.documentation.constraints = false;
    }
    if args.no_preview {
        config.documentation.stdout = false;
    }

    let generate_config = config.generate_config()?;

    let provider: Box<dyn MetadataProvider> = match &args.snapshot {
        Some(path) => Box::new(
            SnapshotCatalog::load(path).context("loading catalog snapshot")?,
        ),
        None => Box::new(connect(&config)?),
    };

    let start = Instant::now();
    let mut generator = Generator::new(provider, generate_config);
    if config.documentation.stdout {
        let colorize = std::io::stdout().is_terminal();
        generator = generator.with_preview(TerminalPreview::stdout(colorize));
    }
    if args.progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} tables {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        generator = generator.with_progress(pb);
    }

    let stats = generator.generate()?;

    eprintln!(
        "Documented {} tables ({} excluded) in {:.3}s",
        stats.tables_written,
        stats.tables_excluded,
        start.elapsed().as_secs_f64()
    );
    match stats.files.as_slice() {
        [single] => eprintln!("Documentation written to: {}", single.display()),
        files => eprintln!(
            "Documentation written to: {} ({} files)",
            generator.config().directory.display(),
            files.len()
        ),
    }
    Ok(())
}
