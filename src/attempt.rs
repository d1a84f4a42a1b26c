use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AiError;

/// Feedback attached to a solution attempt.
///
/// Stored as text: `pending`, `correct`, `incorrect` or `incorrect:<note>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum FeedbackLabel {
    #[default]
    Pending,
    Correct,
    /// Empty note renders as a bare `incorrect`.
    Incorrect(String),
}

impl FeedbackLabel {
    pub fn as_string(&self) -> String {
        match self {
            Self::Pending => "pending".to_string(),
            Self::Correct => "correct".to_string(),
            Self::Incorrect(note) if note.is_empty() => "incorrect".to_string(),
            Self::Incorrect(note) => format!("incorrect:{}", note),
        }
    }

    /// A record is useful for learning when the user confirmed it correct.
    pub fn is_useful(&self) -> bool {
        matches!(self, Self::Correct)
    }
}

impl std::fmt::Display for FeedbackLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl std::str::FromStr for FeedbackLabel {
    type Err = AiError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "correct" => Ok(Self::Correct),
            "incorrect" => Ok(Self::Incorrect(String::new())),
            other => match other.strip_prefix("incorrect:") {
                Some(note) => Ok(Self::Incorrect(note.trim().to_string())),
                None => Err(AiError::InvalidInput(format!(
                    "Unknown feedback label: {} (expected pending|correct|incorrect:<note>)",
                    s
                ))),
            },
        }
    }
}

/// One immutable entry of the attempt log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptRecord {
    /// Insertion order in the log (0 until persisted).
    pub seq: i64,
    /// `{content_key}_{timestamp_micros}`
    pub key: String,
    pub timestamp: DateTime<Utc>,
    pub problem: String,
    pub solution: String,
    pub feedback: FeedbackLabel,
    pub verified: bool,
}

impl AttemptRecord {
    pub fn new(problem: &str, solution: &str, feedback: FeedbackLabel, verified: bool) -> Self {
        let timestamp = crate::time_utils::now();
        Self {
            seq: 0,
            key: crate::id_gen::attempt_key(problem, timestamp.timestamp_micros()),
            timestamp,
            problem: problem.to_string(),
            solution: solution.to_string(),
            feedback,
            verified,
        }
    }

    pub fn useful(&self) -> bool {
        self.feedback.is_useful()
    }
}

/// A past verified problem returned by a similarity scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarAttempt {
    pub problem: String,
    pub solution: String,
    pub similarity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse_and_render() {
        assert_eq!("pending".parse::<FeedbackLabel>().unwrap(), FeedbackLabel::Pending);
        assert_eq!("correct".parse::<FeedbackLabel>().unwrap(), FeedbackLabel::Correct);
        assert_eq!(
            "incorrect".parse::<FeedbackLabel>().unwrap(),
            FeedbackLabel::Incorrect(String::new())
        );
        let label: FeedbackLabel = "incorrect:wrong sign in step 2".parse().unwrap();
        assert_eq!(label, FeedbackLabel::Incorrect("wrong sign in step 2".into()));
        assert_eq!(label.to_string(), "incorrect:wrong sign in step 2");
        assert_eq!(FeedbackLabel::Incorrect(String::new()).to_string(), "incorrect");
    }

    #[test]
    fn test_label_rejects_unknown() {
        let err = "maybe".parse::<FeedbackLabel>().unwrap_err();
        assert!(matches!(err, AiError::InvalidInput(_)));
    }

    #[test]
    fn test_useful_only_when_correct() {
        assert!(AttemptRecord::new("p", "s", FeedbackLabel::Correct, true).useful());
        assert!(!AttemptRecord::new("p", "s", FeedbackLabel::Pending, false).useful());
    }

    #[test]
    fn test_new_record_key_is_content_derived() {
        let r = AttemptRecord::new("2+2=?", "4", FeedbackLabel::Correct, true);
        assert!(r.key.starts_with(&crate::id_gen::content_key("2+2=?")));
        assert_eq!(r.seq, 0);
    }
}
