//! Resume commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use skillgraph_core::document::parse_resume_document;
use skillgraph_core::SkillGraphConfig;
use skillgraph_graph::MatchMode;

use super::parse_mode;
use crate::output;
use crate::runtime::Runtime;

#[derive(Subcommand)]
pub enum ResumeCommands {
    /// Ingest parsed resume JSON and show matching jobs
    Sync {
        /// Parser output (JSON file)
        path: PathBuf,
        /// Resume id (generated when omitted)
        #[arg(long)]
        id: Option<String>,
        /// Reference to the original uploaded file
        #[arg(long)]
        file_ref: Option<String>,
        /// Scoring mode for the recommendations
        #[arg(long, default_value = "expanded", value_parser = parse_mode)]
        mode: MatchMode,
    },

    /// Remove a resume from the record store and the graph
    Delete {
        /// Resume id
        id: String,
    },
}

pub async fn execute(cmd: ResumeCommands, config: &SkillGraphConfig) -> Result<()> {
    let runtime = Runtime::open(config).await?;

    match cmd {
        ResumeCommands::Sync {
            path,
            id,
            file_ref,
            mode,
        } => {
            let content =
                std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            let value: serde_json::Value =
                serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))?;
            let record = parse_resume_document(&value, id.as_deref().unwrap_or_default(), file_ref)?;

            let report = runtime.engine.ingest_resume(record, mode).await?;
            output::print_sync("Resume", &report.resume_id, &report.sync);
            output::print_outcome(&report.expansion);
            println!();
            println!("{}", "Recommended jobs".bold());
            output::print_jobs(&report.recommendations);
        }
        ResumeCommands::Delete { id } => {
            if runtime.engine.delete_resume(&id).await? {
                println!("{} Resume {} deleted", "✓".green(), id.cyan());
            } else {
                println!("{} No resume {}", "!".yellow(), id);
            }
        }
    }

    runtime.close().await
}
