//! CLI for the ontofetch import refresher.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ontofetch_core::config;
use std::path::PathBuf;

use commands::{run_check, run_lift, run_list, run_refresh};

/// Top-level CLI for the ontofetch import refresher.
#[derive(Debug, Parser)]
#[command(name = "ontofetch")]
#[command(about = "ontofetch: refresh vendored reference ontologies into Turtle", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Refresh the configured sources: download, convert, clean up.
    Refresh {
        /// Refresh only the named source.
        #[arg(long, value_name = "NAME")]
        only: Option<String>,

        /// Write canonical files here instead of the configured import directory.
        #[arg(long, value_name = "DIR")]
        import_dir: Option<PathBuf>,
    },

    /// Lift the governance reference spreadsheet into a Turtle module.
    Lift {
        /// Path to the governance spreadsheet.
        #[arg(
            long,
            value_name = "XLSX",
            default_value = "reference/DataTypes-brief-Sept2025.xlsx"
        )]
        input: PathBuf,

        /// Worksheet to parse.
        #[arg(long, default_value = ontofetch_core::lift::DEFAULT_SHEET)]
        sheet: String,

        /// Destination Turtle file.
        #[arg(
            long,
            value_name = "TTL",
            default_value = "ontology/modules/governance_sage_ref.ttl"
        )]
        output: PathBuf,
    },

    /// List the configured import sources.
    List,

    /// Verify the conversion tool resolves (performs no network access).
    Check,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Refresh { only, import_dir } => {
                run_refresh(&cfg, only.as_deref(), import_dir.as_deref())?
            }
            CliCommand::Lift {
                input,
                sheet,
                output,
            } => run_lift(&input, &sheet, &output)?,
            CliCommand::List => run_list(&cfg),
            CliCommand::Check => run_check(&cfg)?,
        }

        Ok(())
    }
}
