mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "math-mentor", version, about = "Math Mentor: retrieval-augmented math tutoring with attempt memory")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the knowledge corpus (built-in snippets or a directory of .txt files)
    Seed {
        /// Directory of .txt reference documents
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Show the reference snippets closest to a query
    Retrieve {
        query: String,
        /// Number of snippets (defaults to retrieval.k)
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Run the full solve pipeline on a problem
    Solve {
        problem: String,
        /// Record a verdict right away: correct | incorrect[:note] | skip
        #[arg(long)]
        feedback: Option<String>,
    },
    /// Record an attempt with its feedback label
    Feedback {
        problem: String,
        solution: String,
        /// pending | correct | incorrect[:note]
        label: String,
    },
    /// List verified past problems similar to this one
    Similar {
        problem: String,
        /// Minimum similarity in [0, 1] (defaults to memory.similarity_threshold)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Show corpus and memory status
    Status,
    /// Check OCR output before solving
    ReviewOcr {
        text: String,
        /// Recognizer confidence in [0, 1]
        #[arg(long, required_unless_present = "word_confidences", conflicts_with = "word_confidences")]
        confidence: Option<f64>,
        /// Per-word confidences (0-100, comma separated), averaged
        #[arg(long, value_delimiter = ',')]
        word_confidences: Option<Vec<f64>>,
    },
    /// Check a speech transcript for spoken math phrases
    ReviewTranscript { text: String },
    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display the full configuration
    Show,
    /// Get a config value (dot notation: retrieval.k)
    Get {
        /// Config key (dot notation)
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key (dot notation)
        key: String,
        /// Value (JSON: true, 42, 0.8, "string")
        value: String,
    },
}

fn main() {
    let app = App::parse();
    math_mentor::tracing_init::init_file_tracing();

    let result = match app.command {
        Commands::Seed { dir } => cli::seed::run(dir.as_deref()),
        Commands::Retrieve { query, k } => cli::retrieve::run(&query, k),
        Commands::Solve { problem, feedback } => cli::solve::run(&problem, feedback.as_deref()),
        Commands::Feedback { problem, solution, label } => {
            cli::memory::feedback(&problem, &solution, &label)
        }
        Commands::Similar { problem, threshold } => cli::memory::similar(&problem, threshold),
        Commands::Status => cli::status::run(),
        Commands::ReviewOcr {
            text,
            confidence,
            word_confidences,
        } => cli::review::ocr(&text, confidence, word_confidences.as_deref()),
        Commands::ReviewTranscript { text } => cli::review::transcript(&text),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::config::run_show(),
            ConfigAction::Get { key } => cli::config::run_get(&key),
            ConfigAction::Set { key, value } => cli::config::run_set(&key, &value),
        },
    };

    if let Err(e) = result {
        tracing::error!(error = %format!("{:#}", e), "Command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
