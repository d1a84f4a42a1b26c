//! Solve pipeline: parse, route, retrieve, solve, verify, explain, then memory.
//!
//! One sequential pass per submission. A stage that fails is recorded as a
//! labeled `StageOutcome::Failed` and the next stage runs on degraded input.
//! Only storage failures abort the pass.

pub mod outcome;
pub mod session;
pub mod stages;

use rusqlite::Connection;
use serde::Serialize;

use crate::attempt::{AttemptRecord, FeedbackLabel, SimilarAttempt};
use crate::config::MentorConfig;
use crate::constants::{CONTEXT_SEPARATOR, DEFAULT_RETRIEVAL_K, DEFAULT_SIMILARITY_THRESHOLD};
use crate::intelligence::attempt_memory::AttemptMemory;
use crate::intelligence::knowledge_retriever::KnowledgeRetriever;
use crate::knowledge::RetrievalResult;
use crate::processing::completion::{client_from_config, CompletionClient};
use crate::processing::json_extract::parse_json_reply;
use crate::{AiError, AiResult};

pub use outcome::StageOutcome;
pub use session::{PendingAttempt, SessionContext, SessionState, TraceEntry, TraceStatus};
pub use stages::{ParsedProblem, RouteDecision, Solution, SolutionStep, Verification};

pub const AGENT_PARSER: &str = "Parser Agent";
pub const AGENT_ROUTER: &str = "Intent Router";
pub const AGENT_RAG: &str = "RAG Pipeline";
pub const AGENT_SOLVER: &str = "Solver Agent";
pub const AGENT_VERIFIER: &str = "Verifier Agent";
pub const AGENT_EXPLAINER: &str = "Explainer Agent";
pub const AGENT_MEMORY: &str = "Memory";
pub const AGENT_FEEDBACK: &str = "Feedback";

/// User verdict on the last solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect(String),
    Skip,
}

impl std::str::FromStr for Feedback {
    type Err = AiError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "correct" => Ok(Self::Correct),
            "skip" => Ok(Self::Skip),
            "incorrect" => Ok(Self::Incorrect(String::new())),
            other => other
                .strip_prefix("incorrect:")
                .map(|note| Self::Incorrect(note.trim().to_string()))
                .ok_or_else(|| {
                    AiError::InvalidInput(format!(
                        "Unknown feedback: {} (expected correct|incorrect[:note]|skip)",
                        s
                    ))
                }),
        }
    }
}

/// Everything one submission produced, stage by stage.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub raw_input: String,
    /// Cleaned problem from the parser, or the raw input when parsing failed.
    pub problem_text: String,
    pub parsed: StageOutcome<ParsedProblem>,
    pub route: StageOutcome<RouteDecision>,
    pub sources: Vec<RetrievalResult>,
    pub solution: StageOutcome<Solution>,
    pub verification: StageOutcome<Verification>,
    pub explanation: StageOutcome<String>,
    pub similar: Vec<SimilarAttempt>,
}

impl SessionReport {
    /// Text handed to later stages and saved with feedback.
    pub fn solution_text(&self) -> String {
        solution_text(&self.solution)
    }
}

fn solution_text(solution: &StageOutcome<Solution>) -> String {
    match solution {
        StageOutcome::Ok(s) => s.render(),
        StageOutcome::Failed(msg) => format!("Error: {}", msg),
    }
}

pub struct Pipeline {
    client: Box<dyn CompletionClient>,
    retriever: KnowledgeRetriever,
    k: usize,
    similarity_threshold: f64,
}

impl Pipeline {
    pub fn new(client: Box<dyn CompletionClient>, retriever: KnowledgeRetriever) -> Self {
        Self {
            client,
            retriever,
            k: DEFAULT_RETRIEVAL_K,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn from_config(config: &MentorConfig) -> Self {
        Self::new(
            client_from_config(&config.completion),
            KnowledgeRetriever::from_config(&config.embedding),
        )
        .with_k(config.retrieval.k)
        .with_similarity_threshold(config.memory.similarity_threshold)
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn retriever(&self) -> &KnowledgeRetriever {
        &self.retriever
    }

    /// Run one full pass for `raw_input`. Leaves the session `AwaitingFeedback`.
    pub fn run(&self, conn: &Connection, session: &mut SessionContext, raw_input: &str) -> AiResult<SessionReport> {
        let raw = raw_input.trim();
        if raw.is_empty() {
            return Err(AiError::InvalidInput("problem text is empty".into()));
        }
        session.reset_for_submission();
        tracing::info!(session = %session.id, client = %self.client.id(), "Pipeline run starting");

        // 1. Parse
        session.state = SessionState::Parsing;
        let parsed = self.call_stage(
            session,
            AGENT_PARSER,
            &stages::parse_prompt(raw),
            |reply| parse_json_reply::<ParsedProblem>(reply),
            |p: &ParsedProblem| format!("topic: {}", p.topic),
        );
        let problem_text = parsed
            .ok()
            .map(|p| p.problem_text.trim())
            .filter(|t| !t.is_empty())
            .unwrap_or(raw)
            .to_string();
        let topic = parsed.ok().map(|p| p.topic.as_str()).unwrap_or("unknown");

        // 2. Route
        let route = self.call_stage(
            session,
            AGENT_ROUTER,
            &stages::route_prompt(&problem_text, topic),
            |reply| parse_json_reply::<RouteDecision>(reply),
            |r: &RouteDecision| format!("strategy: {}", r.strategy),
        );
        session.state = SessionState::Routed;

        // 3. Retrieve
        session.state = SessionState::Retrieving;
        let use_rag = route.ok().map(|r| r.use_rag).unwrap_or(true);
        let sources = if use_rag {
            self.retrieve_stage(conn, session, &problem_text)?
        } else {
            session.record(AGENT_RAG, TraceStatus::Skipped, "retrieval not requested");
            Vec::new()
        };
        session.retrieved_sources = sources.clone();
        let context = sources
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        // 4. Solve: a reply that is not JSON is kept as plain text
        session.state = SessionState::Solving;
        let solution = self.call_stage(
            session,
            AGENT_SOLVER,
            &stages::solve_prompt(&problem_text, &context),
            |reply| Ok(parse_json_reply::<Solution>(reply).unwrap_or_else(|_| Solution::from_text(reply))),
            |s: &Solution| format!("answer: {}", s.final_answer),
        );
        let solved = solution_text(&solution);

        // 5. Verify
        session.state = SessionState::Verifying;
        let verification = self.call_stage(
            session,
            AGENT_VERIFIER,
            &stages::verify_prompt(&problem_text, &solved),
            |reply| parse_json_reply::<Verification>(reply),
            |v: &Verification| format!("correct: {}, confidence: {:.2}", v.is_correct, v.confidence),
        );

        // 6. Explain
        session.state = SessionState::Explaining;
        let explanation = self.call_stage(
            session,
            AGENT_EXPLAINER,
            &stages::explain_prompt(&problem_text, &solved),
            |reply| Ok(reply.trim().to_string()),
            |e: &String| format!("{} chars", e.chars().count()),
        );

        // Memory
        let similar = AttemptMemory::find_similar(conn, &problem_text, self.similarity_threshold)?;
        session.similar_found = similar.len();
        session.record(
            AGENT_MEMORY,
            TraceStatus::Success,
            &format!("{} similar verified problems", similar.len()),
        );

        session.pending = Some(PendingAttempt {
            problem: problem_text.clone(),
            solution: solved,
        });
        session.state = SessionState::AwaitingFeedback;

        let failed = [
            parsed.is_ok(),
            route.is_ok(),
            solution.is_ok(),
            verification.is_ok(),
            explanation.is_ok(),
        ]
        .iter()
        .filter(|ok| !**ok)
        .count();
        tracing::info!(
            session = %session.id,
            sources = sources.len(),
            similar = similar.len(),
            failed_stages = failed,
            "Pipeline run complete"
        );

        Ok(SessionReport {
            raw_input: raw.to_string(),
            problem_text,
            parsed,
            route,
            sources,
            solution,
            verification,
            explanation,
            similar,
        })
    }

    /// Record the user's verdict on the pending solution.
    ///
    /// Returns the saved record, or `None` on `Skip`.
    pub fn submit_feedback(
        conn: &Connection,
        session: &mut SessionContext,
        feedback: Feedback,
    ) -> AiResult<Option<AttemptRecord>> {
        if session.state != SessionState::AwaitingFeedback {
            return Err(AiError::InvalidInput(format!(
                "no solution awaiting feedback (session is {})",
                session.state
            )));
        }
        let Some(pending) = session.pending.as_ref() else {
            return Err(AiError::InvalidInput("no pending solution in session".into()));
        };

        let (label, verified) = match feedback {
            Feedback::Skip => {
                session.pending = None;
                session.state = SessionState::Idle;
                session.record(AGENT_FEEDBACK, TraceStatus::Skipped, "no feedback given");
                return Ok(None);
            }
            Feedback::Correct => (FeedbackLabel::Correct, true),
            Feedback::Incorrect(note) => (FeedbackLabel::Incorrect(note), false),
        };

        let record = AttemptMemory::save_labeled(conn, &pending.problem, &pending.solution, label, verified)?;

        session.pending = None;
        session.stored_solutions += 1;
        session.state = SessionState::Recorded;
        session.record(AGENT_FEEDBACK, TraceStatus::Success, &record.feedback.as_string());
        Ok(Some(record))
    }

    fn retrieve_stage(
        &self,
        conn: &Connection,
        session: &mut SessionContext,
        problem_text: &str,
    ) -> AiResult<Vec<RetrievalResult>> {
        match self.retriever.retrieve(conn, problem_text, self.k) {
            Ok(results) => {
                session.record(
                    AGENT_RAG,
                    TraceStatus::Success,
                    &format!("{} sources retrieved", results.len()),
                );
                Ok(results)
            }
            Err(AiError::EmbeddingUnavailable(reason)) => {
                tracing::warn!(session = %session.id, reason = %reason, "Retrieval degraded to empty context");
                session.record(AGENT_RAG, TraceStatus::Failed, &format!("embedding unavailable: {}", reason));
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    fn call_stage<T>(
        &self,
        session: &mut SessionContext,
        agent: &str,
        prompt: &str,
        parse: impl FnOnce(&str) -> AiResult<T>,
        describe: impl FnOnce(&T) -> String,
    ) -> StageOutcome<T> {
        let result = self.client.complete(prompt).and_then(|reply| parse(&reply));
        match &result {
            Ok(value) => session.record(agent, TraceStatus::Success, &describe(value)),
            Err(e) => {
                tracing::warn!(session = %session.id, agent = agent, error = %e, "Stage failed");
                session.record(agent, TraceStatus::Failed, &e.to_string());
            }
        }
        StageOutcome::from_result(result.map_err(|e| format!("{} failed: {}", agent, e)))
    }
}
