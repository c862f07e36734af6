//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use skillgraph_core::SkillGraphConfig;
use skillgraph_graph::MatchMode;

pub mod init;
pub mod job;
pub mod matching;
pub mod ontology;
pub mod resume;
pub mod status;

/// Skill graph matching engine for resumes and jobs
#[derive(Parser)]
#[command(name = "skillgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./skillgraph.toml when present)
    #[arg(short, long, global = true, env = "SKILLGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create graph constraints and check collaborators
    Init,

    /// Show graph node, edge and ontology counts
    Status,

    /// Resume ingestion and removal
    #[command(subcommand)]
    Resume(resume::ResumeCommands),

    /// Job ingestion and removal
    #[command(subcommand)]
    Job(job::JobCommands),

    /// Recommend jobs for a resume
    Recommend(matching::RecommendArgs),

    /// Rank applicants for a job
    Applicants(matching::ApplicantsArgs),

    /// Explain why a resume matches a job
    Explain(matching::ExplainArgs),

    /// Ontology expansion and browsing
    #[command(subcommand)]
    Ontology(ontology::OntologyCommands),

    /// Re-mirror every stored resume and job into the graph
    Resync,
}

/// Parse `direct` or `expanded`.
pub fn parse_mode(s: &str) -> Result<MatchMode, String> {
    MatchMode::parse(s).ok_or_else(|| format!("unknown match mode '{}' (expected direct or expanded)", s))
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = SkillGraphConfig::load(self.config.as_deref())?;

        match self.command {
            Commands::Init => init::execute(&config).await,
            Commands::Status => status::execute(&config).await,
            Commands::Resume(cmd) => resume::execute(cmd, &config).await,
            Commands::Job(cmd) => job::execute(cmd, &config).await,
            Commands::Recommend(args) => matching::recommend(args, &config).await,
            Commands::Applicants(args) => matching::applicants(args, &config).await,
            Commands::Explain(args) => matching::explain(args, &config).await,
            Commands::Ontology(cmd) => ontology::execute(cmd, &config).await,
            Commands::Resync => status::resync(&config).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode("direct"), Ok(MatchMode::Direct));
        assert!(parse_mode("sideways").is_err());
    }

    #[test]
    fn test_recommend_arguments() {
        let cli = Cli::try_parse_from(["skillgraph", "recommend", "r1", "--limit", "3", "--mode", "direct"]).unwrap();
        match cli.command {
            Commands::Recommend(args) => {
                assert_eq!(args.resume_id, "r1");
                assert_eq!(args.limit, Some(3));
                assert_eq!(args.mode, MatchMode::Direct);
            }
            _ => panic!("expected recommend"),
        }
    }
}
