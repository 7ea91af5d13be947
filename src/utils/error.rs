use thiserror::Error;

#[derive(Error, Debug)]
pub enum StaffingError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("LLM backend error: {message}")]
    LlmError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Input,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StaffingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StaffingError::ConfigValidationError { .. }
            | StaffingError::InvalidConfigValueError { .. }
            | StaffingError::MissingConfigError { .. } => ErrorCategory::Configuration,
            StaffingError::ApiError(_) | StaffingError::LlmError { .. } => ErrorCategory::Network,
            StaffingError::CsvError(_) | StaffingError::SerializationError(_) => {
                ErrorCategory::Input
            }
            StaffingError::ProcessingError { .. } => ErrorCategory::Processing,
            StaffingError::ZipError(_) | StaffingError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常重試即可
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::Processing => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StaffingError::MissingConfigError { .. } => {
                "Provide the missing value via CLI flag, environment variable or TOML config"
            }
            StaffingError::ConfigValidationError { .. }
            | StaffingError::InvalidConfigValueError { .. } => {
                "Check the configuration values and try again"
            }
            StaffingError::ApiError(_) | StaffingError::LlmError { .. } => {
                "Check the API endpoint, API key and network connection, then retry"
            }
            StaffingError::CsvError(_) => {
                "Make sure the project history CSV has a 'Projekte' column"
            }
            StaffingError::SerializationError(_) => "Check that the input JSON files are valid",
            StaffingError::ProcessingError { .. } => {
                "Inspect the raw LLM responses in the output directory and rerun"
            }
            StaffingError::ZipError(_) | StaffingError::IoError(_) => {
                "Check file permissions and available disk space"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StaffingError::MissingConfigError { field } => {
                format!("Missing configuration value: {}", field)
            }
            StaffingError::ApiError(_) | StaffingError::LlmError { .. } => {
                format!("Could not get a response from the language model ({})", self)
            }
            StaffingError::ProcessingError { message } => message.clone(),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StaffingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let missing = StaffingError::MissingConfigError {
            field: "api_key".to_string(),
        };
        assert_eq!(missing.category(), ErrorCategory::Configuration);
        assert_eq!(missing.severity(), ErrorSeverity::High);

        let llm = StaffingError::LlmError {
            message: "empty choices".to_string(),
        };
        assert_eq!(llm.category(), ErrorCategory::Network);
        assert_eq!(llm.severity(), ErrorSeverity::Medium);

        let io = StaffingError::IoError(std::io::Error::other("disk full"));
        assert_eq!(io.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_user_friendly_message() {
        let err = StaffingError::MissingConfigError {
            field: "api_key".to_string(),
        };
        assert_eq!(err.user_friendly_message(), "Missing configuration value: api_key");
    }
}
