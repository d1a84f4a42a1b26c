use anyhow::{Context, Result};
use math_mentor::attempt::FeedbackLabel;
use math_mentor::constants::truncate_safe;
use math_mentor::intelligence::attempt_memory::AttemptMemory;

use super::open_store;

/// `feedback <problem> <solution> <label>`: append an attempt directly.
/// Only `correct` marks the record verified.
pub fn feedback(problem: &str, solution: &str, label: &str) -> Result<()> {
    let label: FeedbackLabel = label.parse()?;
    let verified = label.is_useful();
    let (_, conn) = open_store()?;
    let record = AttemptMemory::save_labeled(&conn, problem, solution, label, verified)
        .context("Failed to save attempt")?;
    println!(
        "Saved attempt {} ({}, verified: {})",
        record.key, record.feedback, record.verified
    );
    Ok(())
}

/// `similar <problem>`: verified past problems above the threshold.
pub fn similar(problem: &str, threshold: Option<f64>) -> Result<()> {
    let (config, conn) = open_store()?;
    let threshold = threshold.unwrap_or(config.memory.similarity_threshold);
    let found = AttemptMemory::find_similar(&conn, problem, threshold)
        .context("Similarity search failed")?;

    if found.is_empty() {
        println!("No similar verified problems (threshold {:.2}).", threshold);
        return Ok(());
    }

    println!("{:<6}  {:<40}  {}", "SIM", "PROBLEM", "SOLUTION");
    println!("{}", "-".repeat(78));
    for s in &found {
        println!(
            "{:<6.3}  {:<40}  {}",
            s.similarity,
            truncate_safe(&s.problem.replace('\n', " "), 40),
            truncate_safe(&s.solution.replace('\n', " "), 30),
        );
    }
    println!("\nFound: {} attempts", found.len());
    Ok(())
}
