//! Ontology commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use skillgraph_core::SkillGraphConfig;

use crate::output;
use crate::runtime::Runtime;

#[derive(Subcommand)]
pub enum OntologyCommands {
    /// Expand skills that are not yet expanded successfully
    Expand {
        /// Skill names
        #[arg(required = true)]
        skills: Vec<String>,
    },

    /// Reset every skill and expand the whole ontology again
    Rebuild {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show a skill's relations
    Explore {
        /// Skill name
        skill: String,
    },
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]")?);
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    Ok(bar)
}

pub async fn execute(cmd: OntologyCommands, config: &SkillGraphConfig) -> Result<()> {
    match cmd {
        OntologyCommands::Expand { skills } => {
            let runtime = Runtime::open(config).await?;
            let bar = spinner(&format!("Expanding {} skills", skills.len()))?;
            let report = runtime.engine.expand_ontology(&skills).await;
            bar.finish_and_clear();

            println!("{}", "Ontology expansion".bold());
            output::print_expansion(&report?);
            runtime.close().await
        }
        OntologyCommands::Rebuild { yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Reset every skill to unprocessed and re-run expansion?")
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("{}", "Rebuild cancelled.".dimmed());
                    return Ok(());
                }
            }

            let runtime = Runtime::open(config).await?;
            let bar = spinner("Rebuilding ontology")?;
            let report = runtime.engine.rebuild_ontology().await;
            bar.finish_and_clear();

            println!("{}", "Ontology rebuilt".green().bold());
            output::print_expansion(&report?);
            runtime.close().await
        }
        OntologyCommands::Explore { skill } => {
            let runtime = Runtime::open(config).await?;
            let exploration = runtime.engine.explore_skill(&skill).await?;
            output::print_exploration(&exploration);
            runtime.close().await
        }
    }
}
