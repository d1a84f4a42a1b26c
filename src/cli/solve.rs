use anyhow::{Context, Result};
use math_mentor::constants::truncate_safe;
use math_mentor::pipeline::{Feedback, Pipeline, SessionContext, SessionReport, StageOutcome};

use super::open_store;

pub fn run(problem: &str, feedback: Option<&str>) -> Result<()> {
    let feedback = feedback.map(|f| f.parse::<Feedback>()).transpose()?;

    let (config, conn) = open_store()?;
    let pipeline = Pipeline::from_config(&config);
    pipeline
        .retriever()
        .ensure_seeded_or_degrade(&conn, config.retrieval.kb_dir.as_deref())
        .context("Failed to seed knowledge corpus")?;

    let mut session = SessionContext::new();
    let report = pipeline
        .run(&conn, &mut session, problem)
        .context("Pipeline aborted")?;

    print_report(&report, &session);

    if let Some(fb) = feedback {
        match Pipeline::submit_feedback(&conn, &mut session, fb).context("Failed to record feedback")? {
            Some(record) => println!("\nFeedback recorded: {} (key {})", record.feedback, record.key),
            None => println!("\nFeedback skipped."),
        }
    }
    Ok(())
}

fn print_report(report: &SessionReport, session: &SessionContext) {
    println!("Problem: {}", report.problem_text);
    if let StageOutcome::Ok(parsed) = &report.parsed {
        if !parsed.topic.is_empty() {
            println!("Topic:   {}", parsed.topic);
        }
    }
    println!();

    match &report.solution {
        StageOutcome::Ok(solution) => {
            println!("Solution");
            println!("--------");
            println!("{}", solution.render());
            if solution.confidence > 0.0 {
                println!("(confidence {:.0}%)", solution.confidence * 100.0);
            }
        }
        StageOutcome::Failed(msg) => println!("Solution unavailable: {}", msg),
    }

    match &report.verification {
        StageOutcome::Ok(v) => {
            println!();
            println!(
                "Verification: {} ({:.0}%)",
                if v.is_correct { "correct" } else { "doubtful" },
                v.confidence * 100.0
            );
            for issue in &v.issues {
                println!("  issue: {}", issue);
            }
            if v.needs_human_review {
                println!("  human review requested");
            }
        }
        StageOutcome::Failed(msg) => println!("\nVerification unavailable: {}", msg),
    }

    match &report.explanation {
        StageOutcome::Ok(text) => println!("\nExplanation\n-----------\n{}", text),
        StageOutcome::Failed(msg) => println!("\nExplanation unavailable: {}", msg),
    }

    println!("\nAgent trace");
    println!("{}", "-".repeat(70));
    for entry in &session.trace {
        println!(
            "{} {:<16} {}  {}",
            entry.status.symbol(),
            entry.agent,
            entry.time,
            entry.details
        );
    }

    if !report.sources.is_empty() {
        println!("\nRetrieved sources");
        for (i, s) in report.sources.iter().enumerate() {
            println!("  {}. [{:.3}] {}", i + 1, s.score, truncate_safe(&s.text.replace('\n', " "), 100));
        }
    }

    if !report.similar.is_empty() {
        println!("\nSimilar solved problems");
        for s in &report.similar {
            println!("  [{:.0}%] {}", s.similarity * 100.0, truncate_safe(&s.problem, 80));
        }
    }
}
