//! Job commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use skillgraph_core::document::parse_job_document;
use skillgraph_core::SkillGraphConfig;
use skillgraph_graph::MatchMode;

use super::parse_mode;
use crate::output;
use crate::runtime::Runtime;

#[derive(Subcommand)]
pub enum JobCommands {
    /// Ingest job JSON and show eligible applicants
    Sync {
        /// Job posting (JSON file)
        path: PathBuf,
        /// Job id (generated when omitted)
        #[arg(long)]
        id: Option<String>,
        /// Scoring mode for the applicant ranking
        #[arg(long, default_value = "expanded", value_parser = parse_mode)]
        mode: MatchMode,
    },

    /// Remove a job from the record store and the graph
    Delete {
        /// Job id
        id: String,
    },
}

pub async fn execute(cmd: JobCommands, config: &SkillGraphConfig) -> Result<()> {
    let runtime = Runtime::open(config).await?;

    match cmd {
        JobCommands::Sync { path, id, mode } => {
            let content =
                std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            let value: serde_json::Value =
                serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))?;
            let record = parse_job_document(&value, id.as_deref().unwrap_or_default())?;

            let report = runtime.engine.ingest_job(record, mode).await?;
            output::print_sync("Job", &report.job_id, &report.sync);
            output::print_outcome(&report.expansion);
            println!();
            println!("{}", "Eligible applicants".bold());
            output::print_applicants(&report.applicants);
        }
        JobCommands::Delete { id } => {
            if runtime.engine.delete_job(&id).await? {
                println!("{} Job {} deleted", "✓".green(), id.cyan());
            } else {
                println!("{} No job {}", "!".yellow(), id);
            }
        }
    }

    runtime.close().await
}
