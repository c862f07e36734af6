//! Matching and explanation commands.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use skillgraph_core::SkillGraphConfig;
use skillgraph_graph::MatchMode;

use super::parse_mode;
use crate::output;
use crate::runtime::Runtime;

#[derive(Args)]
pub struct RecommendArgs {
    /// Resume id
    pub resume_id: String,
    /// Maximum number of jobs (defaults to matching.default_limit)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Scoring mode
    #[arg(long, default_value = "expanded", value_parser = parse_mode)]
    pub mode: MatchMode,
}

#[derive(Args)]
pub struct ApplicantsArgs {
    /// Job id
    pub job_id: String,
    /// Scoring mode
    #[arg(long, default_value = "expanded", value_parser = parse_mode)]
    pub mode: MatchMode,
}

#[derive(Args)]
pub struct ExplainArgs {
    /// Resume id
    pub resume_id: String,
    /// Job id
    pub job_id: String,
}

pub async fn recommend(args: RecommendArgs, config: &SkillGraphConfig) -> Result<()> {
    let runtime = Runtime::open(config).await?;
    let jobs = runtime
        .engine
        .recommend_jobs(&args.resume_id, args.limit, args.mode)
        .await?;

    println!(
        "{} {} ({})",
        "Jobs for".bold(),
        args.resume_id.cyan(),
        args.mode.as_str().dimmed()
    );
    output::print_jobs(&jobs);
    runtime.close().await
}

pub async fn applicants(args: ApplicantsArgs, config: &SkillGraphConfig) -> Result<()> {
    let runtime = Runtime::open(config).await?;
    let ranked = runtime.engine.eligible_applicants(&args.job_id, args.mode).await?;

    println!(
        "{} {} ({})",
        "Applicants for".bold(),
        args.job_id.yellow(),
        args.mode.as_str().dimmed()
    );
    output::print_applicants(&ranked);
    runtime.close().await
}

pub async fn explain(args: ExplainArgs, config: &SkillGraphConfig) -> Result<()> {
    let runtime = Runtime::open(config).await?;
    let explanation = runtime.engine.explain_match(&args.resume_id, &args.job_id).await?;
    output::print_explanation(&explanation);
    runtime.close().await
}
