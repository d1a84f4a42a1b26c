//! Per-session context: state machine, agent trace, retrieved sources, memory counters.
//!
//! One context per session, passed `&mut` through the stages. Never shared.

use serde::Serialize;

use crate::constants::{truncate_safe, TRACE_DETAIL_MAX};
use crate::id_gen;
use crate::knowledge::RetrievalResult;
use crate::time_utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Parsing,
    Routed,
    Retrieving,
    Solving,
    Verifying,
    Explaining,
    AwaitingFeedback,
    Recorded,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Parsing => "parsing",
            Self::Routed => "routed",
            Self::Retrieving => "retrieving",
            Self::Solving => "solving",
            Self::Verifying => "verifying",
            Self::Explaining => "explaining",
            Self::AwaitingFeedback => "awaiting_feedback",
            Self::Recorded => "recorded",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStatus {
    Success,
    Failed,
    Skipped,
}

impl TraceStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Failed => "✗",
            Self::Skipped => "-",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceEntry {
    pub agent: String,
    pub status: TraceStatus,
    /// HH:MM:SS
    pub time: String,
    pub details: String,
}

/// The problem/solution pair awaiting the user's verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingAttempt {
    pub problem: String,
    pub solution: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub id: String,
    pub state: SessionState,
    pub trace: Vec<TraceEntry>,
    pub retrieved_sources: Vec<RetrievalResult>,
    /// Attempts saved from this session.
    pub stored_solutions: usize,
    /// Similar verified problems found for the last submission.
    pub similar_found: usize,
    pub pending: Option<PendingAttempt>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            id: id_gen::session_id(),
            state: SessionState::Idle,
            trace: Vec::new(),
            retrieved_sources: Vec::new(),
            stored_solutions: 0,
            similar_found: 0,
            pending: None,
        }
    }

    /// Clear per-submission data. Counters of saved attempts survive.
    pub fn reset_for_submission(&mut self) {
        self.state = SessionState::Idle;
        self.trace.clear();
        self.retrieved_sources.clear();
        self.similar_found = 0;
        self.pending = None;
    }

    pub fn record(&mut self, agent: &str, status: TraceStatus, details: &str) {
        tracing::debug!(session = %self.id, agent = agent, status = ?status, "Stage traced");
        self.trace.push(TraceEntry {
            agent: agent.to_string(),
            status,
            time: time_utils::clock(&time_utils::now()),
            details: truncate_safe(details, TRACE_DETAIL_MAX).to_string(),
        });
    }

    pub fn trace_for(&self, agent: &str) -> Option<&TraceEntry> {
        self.trace.iter().find(|t| t.agent == agent)
    }
}
