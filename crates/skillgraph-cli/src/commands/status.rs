//! Graph status and full resync.

use anyhow::Result;
use colored::Colorize;

use skillgraph_core::SkillGraphConfig;

use crate::output;
use crate::runtime::Runtime;

pub async fn execute(config: &SkillGraphConfig) -> Result<()> {
    let runtime = Runtime::open(config).await?;
    let counts = runtime.engine.counts().await?;
    output::print_counts(&counts);
    runtime.close().await
}

/// Push every stored record back into the graph.
pub async fn resync(config: &SkillGraphConfig) -> Result<()> {
    let runtime = Runtime::open(config).await?;
    println!("{}", "Resyncing records into the graph...".bold());

    let result = runtime.engine.resync_all().await?;

    println!("\n{}", "Resync complete:".green().bold());
    println!("  Nodes synced:  {}", result.nodes_synced);
    println!("  Skill edges:   {}", result.edges_written);
    println!("  Unique skills: {}", result.skills.len());
    runtime.close().await
}
