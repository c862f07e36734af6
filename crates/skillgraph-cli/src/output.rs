//! Terminal output formatting.

use colored::{ColoredString, Colorize};

use skillgraph_core::OntologyStatus;
use skillgraph_graph::{
    ExpansionOutcome, ExpansionReport, GraphCounts, LinkDirection, MatchExplanation, MatchScore, RankedApplicant,
    RankedJob, SkillExploration, SyncResult,
};

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn score_label(score: &MatchScore) -> ColoredString {
    let text = format!("{:.1}", score.weighted_score);
    if score.related == 0 {
        text.green().bold()
    } else {
        text.yellow().bold()
    }
}

pub fn status_label(status: OntologyStatus) -> ColoredString {
    match status {
        OntologyStatus::Success => "success".green(),
        OntologyStatus::Failed => "failed".red(),
        OntologyStatus::Unprocessed => "unprocessed".dimmed(),
    }
}

fn print_match_skills(score: &MatchScore) {
    if !score.matched_skills.is_empty() {
        println!("      {} {}", "direct:".dimmed(), score.matched_skills.join(", "));
    }
    if !score.related_skills.is_empty() {
        println!("      {} {}", "related:".dimmed(), score.related_skills.join(", "));
    }
}

pub fn print_sync(label: &str, id: &str, result: &SyncResult) {
    println!(
        "{} {} {} ({} skills linked)",
        "✓".green(),
        label,
        id.cyan(),
        result.edges_written
    );
}

pub fn print_jobs(jobs: &[RankedJob]) {
    if jobs.is_empty() {
        println!("{}", "No matching jobs.".dimmed());
        return;
    }

    println!("{:<8} {:<38} {}", "Score", "Job", "Title");
    println!("{}", "─".repeat(80));
    for job in jobs {
        println!(
            "{:<8} {:<38} {}",
            score_label(&job.score),
            job.job_id,
            truncate(&job.title, 40)
        );
        print_match_skills(&job.score);
        if let Some(link) = &job.link {
            println!("      {}", link.dimmed());
        }
    }
}

pub fn print_applicants(applicants: &[RankedApplicant]) {
    if applicants.is_empty() {
        println!("{}", "No eligible applicants.".dimmed());
        return;
    }

    println!("{:<8} {:<38} {}", "Score", "Resume", "Name");
    println!("{}", "─".repeat(80));
    for applicant in applicants {
        println!(
            "{:<8} {:<38} {} {}",
            score_label(&applicant.score),
            applicant.resume_id,
            truncate(&applicant.name, 30),
            applicant.email.dimmed()
        );
        print_match_skills(&applicant.score);
    }
}

pub fn print_expansion(report: &ExpansionReport) {
    println!(
        "  {} relations added from {} skills: {} succeeded, {} failed, {} skipped",
        report.relations_added.to_string().bold(),
        report.processed(),
        report.skills_succeeded.len().to_string().green(),
        report.skills_failed.len().to_string().red(),
        report.skills_skipped.len()
    );
    if !report.skills_failed.is_empty() {
        println!("  {} {}", "failed:".red(), report.skills_failed.join(", "));
    }
    if !report.skills_deferred.is_empty() {
        println!(
            "  {} {} (deadline reached; picked up by the next batch)",
            "deferred:".yellow(),
            report.skills_deferred.join(", ")
        );
    }
}

pub fn print_outcome(outcome: &ExpansionOutcome) {
    match outcome {
        ExpansionOutcome::Completed(report) => {
            println!("{}", "Ontology expansion".bold());
            print_expansion(report);
        }
        ExpansionOutcome::Queued(skills) => {
            println!("{} {} skills queued for expansion", "→".dimmed(), skills.len());
        }
    }
}

pub fn print_explanation(explanation: &MatchExplanation) {
    println!(
        "{} {} {} {}",
        "Why".bold(),
        explanation.resume_id.cyan(),
        "matches".bold(),
        explanation.job_id.yellow()
    );
    println!("{}", "─".repeat(50));

    if explanation.explanations.is_empty() {
        println!("{}", "No skill relationship between this resume and job.".dimmed());
        return;
    }
    for sentence in &explanation.explanations {
        println!("  {} {}", "•".green(), sentence);
    }
}

pub fn print_exploration(exploration: &SkillExploration) {
    println!(
        "{} [{}]",
        exploration.skill.cyan().bold(),
        status_label(exploration.status)
    );
    if let Some(at) = exploration.last_processed_at {
        println!("{} {}", "Last processed:".dimmed(), at.to_rfc3339());
    }
    println!("{}", "─".repeat(50));

    if exploration.relations.is_empty() {
        println!("{}", "No ontology relations.".dimmed());
        return;
    }
    for link in &exploration.relations {
        let arrow = match link.direction {
            LinkDirection::Outgoing => "→",
            LinkDirection::Incoming => "←",
        };
        println!(
            "  {} {:<12} {:<30} {:.2} {}",
            arrow.dimmed(),
            link.relation.as_str().magenta(),
            link.other,
            link.confidence,
            link.source.dimmed()
        );
    }
}

pub fn print_counts(counts: &GraphCounts) {
    println!("{}", "Skill Graph Status".bold());
    println!("{}", "─".repeat(40));
    println!("  Skills:      {}", counts.skills.to_string().cyan());
    println!("  Resumes:     {}", counts.resumes.to_string().cyan());
    println!("  Jobs:        {}", counts.jobs.to_string().cyan());
    println!("  HAS:         {}", counts.has_edges);
    println!("  REQUIRES:    {}", counts.requires_edges);
    println!(
        "  Relations:   {} ({} RELATED_TO, {} IS_A)",
        counts.relation_edges, counts.related_to_edges, counts.is_a_edges
    );
    println!();
    println!("{}", "Ontology".bold());
    println!("  {:<12} {}", status_label(OntologyStatus::Success), counts.skills_success);
    println!("  {:<12} {}", status_label(OntologyStatus::Failed), counts.skills_failed);
    println!("  {:<12} {}", status_label(OntologyStatus::Unprocessed), counts.skills_unprocessed);
}
