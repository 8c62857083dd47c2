use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{}", labeled("Not found", .0))]
    NotFound(String),
    #[error("{}", labeled("Invalid input", .0))]
    InvalidInput(String),
    #[error("Out of range: position {position} (goals: {len})")]
    OutOfRange { position: usize, len: usize },
    #[error("Unknown goal type: {0}")]
    UnknownGoalType(String),
    #[error("Overflow: {0}")]
    Overflow(String),
}

fn labeled(label: &str, message: &str) -> String {
    if message.contains('\n') {
        format!("{label}:\n{message}")
    } else {
        format!("{label}: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiline_messages_start_on_next_line() {
        let err = AppError::InvalidInput("first\nsecond".to_string());
        assert_eq!(err.to_string(), "Invalid input:\nfirst\nsecond");

        let err = AppError::NotFound("goals.json".to_string());
        assert_eq!(err.to_string(), "Not found: goals.json");
    }
}
