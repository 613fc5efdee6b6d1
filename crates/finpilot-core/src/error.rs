use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinPilotError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid goal: {field} — {reason}")]
    InvalidGoal { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Unparseable goal: {0}")]
    UnparseableGoal(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FinPilotError {
    fn from(e: serde_json::Error) -> Self {
        FinPilotError::SerializationError(e.to_string())
    }
}
