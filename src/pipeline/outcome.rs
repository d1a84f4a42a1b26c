use serde::Serialize;

/// Result of one pipeline stage. A failure is data, not control flow:
/// the next stage still runs with degraded input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum StageOutcome<T> {
    Ok(T),
    Failed(String),
}

impl<T> StageOutcome<T> {
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Ok(v),
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn ok(&self) -> Option<&T> {
        match self {
            Self::Ok(v) => Some(v),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::Failed(msg) => Some(msg),
        }
    }
}
