use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Item source unavailable: {message}")]
    SourceUnavailable { message: String },

    #[error("Invalid state: cannot {operation} while {phase}")]
    InvalidState { operation: String, phase: String },

    #[error("Session busy: cannot {operation} while a previous operation is resolving")]
    Busy { operation: String },

    #[error("Validation error in '{field}': {reason} (value: '{value}')")]
    ValidationError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Persistence error: {message}")]
    PersistenceError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 錯誤分類，對應到呼叫端的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    SourceUnavailable,
    InvalidState,
    Validation,
    Persistence,
    Configuration,
    System,
}

impl GameError {
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        GameError::SourceUnavailable {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        GameError::PersistenceError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GameError::SourceUnavailable { .. } => ErrorCategory::SourceUnavailable,
            GameError::InvalidState { .. } | GameError::Busy { .. } => ErrorCategory::InvalidState,
            GameError::ValidationError { .. } => ErrorCategory::Validation,
            GameError::PersistenceError { .. } => ErrorCategory::Persistence,
            GameError::ConfigError { .. } => ErrorCategory::Configuration,
            GameError::IoError(_) | GameError::SerializationError(_) => ErrorCategory::System,
        }
    }

    /// 可在呼叫端直接重試的錯誤
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::SourceUnavailable | ErrorCategory::Persistence
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GameError::SourceUnavailable { .. } => {
                "Could not load a property right now.".to_string()
            }
            GameError::InvalidState { .. } | GameError::Busy { .. } => {
                "That action is not available right now.".to_string()
            }
            GameError::ValidationError { reason, .. } => reason.clone(),
            GameError::PersistenceError { .. } => "Failed to save your score.".to_string(),
            GameError::ConfigError { message } => format!("Invalid configuration: {}", message),
            GameError::IoError(e) => format!("File access failed: {}", e),
            GameError::SerializationError(e) => format!("Malformed data: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::SourceUnavailable => "Try again, or start a new game",
            ErrorCategory::InvalidState => "Wait for the current round to finish",
            ErrorCategory::Validation => "Correct the highlighted field and resubmit",
            ErrorCategory::Persistence => "Retry the submission",
            ErrorCategory::Configuration => "Check the config file and command-line flags",
            ErrorCategory::System => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
