mod generate;
mod init;
mod snapshot;

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sqldoc")]
#[command(version)]
#[command(about = "Generate markdown documentation from a database catalog", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub generate: GenerateArgs,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Where catalog metadata comes from
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Config file path (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Database URL, overrides the config file and DATABASE_URL
    #[arg(long)]
    pub database_url: Option<String>,

    /// Schemas to document (comma-separated)
    #[arg(short, long)]
    pub schemas: Option<String>,

    /// Exclude specific tables (comma-separated)
    #[arg(short, long)]
    pub exclude: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Read catalog metadata from a snapshot file (.json, .yaml) instead of a database
    #[arg(long, conflicts_with = "database_url")]
    pub snapshot: Option<PathBuf>,

    /// Output strategy: unified, per_table
    #[arg(long)]
    pub strategy: Option<String>,

    /// Output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output file name for the unified strategy
    #[arg(short, long)]
    pub filename: Option<String>,

    /// Add a Mermaid erDiagram block to each table
    #[arg(long)]
    pub mermaid: bool,

    /// Leave out the constraints section
    #[arg(long)]
    pub no_constraints: bool,

    /// Do not print a terminal preview of each table
    #[arg(long)]
    pub no_preview: bool,

    /// Show progress while documenting tables
    #[arg(short, long)]
    pub progress: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate markdown documentation (default when no command is given)
    Generate(GenerateArgs),

    /// Capture catalog metadata from a database into a snapshot file
    Snapshot {
        #[command(flatten)]
        source: SourceArgs,

        /// Snapshot file to write (.json or .yaml)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write an example config file
    Init {
        /// Path of the config file to create
        #[arg(default_value = "sqldoc.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Split a comma-separated flag value into trimmed, non-empty items
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        None => generate::run(cli.generate),
        Some(Commands::Generate(args)) => generate::run(args),
        Some(Commands::Snapshot { source, output }) => snapshot::run(source, output),
        Some(Commands::Init { path, force }) => init::run(path, force),
        Some(Commands::Completions { shell }) => {
            generate(shell, &mut Cli::command(), "sqldoc", &mut io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("public, billing ,"), vec!["public", "billing"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_invocation_runs_generate() {
        let cli = Cli::try_parse_from(["sqldoc", "--snapshot", "db.json", "-o", "docs"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.generate.snapshot, Some(PathBuf::from("db.json")));
        assert_eq!(cli.generate.output_dir, Some(PathBuf::from("docs")));
    }

    #[test]
    fn test_snapshot_conflicts_with_database_url() {
        let result = Cli::try_parse_from([
            "sqldoc",
            "generate",
            "--snapshot",
            "db.json",
            "--database-url",
            "postgres://localhost/app",
        ]);
        assert!(result.is_err());
    }
}
