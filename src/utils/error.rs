use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("HTTP {status} from {endpoint}: {body}")]
    HttpStatusError {
        status: u16,
        endpoint: String,
        body: String,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{kind} not found: {path}")]
    FileNotFoundError { kind: String, path: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => ErrorCategory::Network,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::FileNotFoundError { .. }
            | EtlError::TomlError(_)
            | EtlError::UrlError(_) => ErrorCategory::Configuration,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::ValidationError { .. } => ErrorCategory::Data,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.severity().exit_code()
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ApiError(_) => "Check network connectivity and that the endpoint is reachable",
            EtlError::HttpStatusError { status, .. } if *status == 401 || *status == 403 => {
                "Check that the access token or secret is valid for this endpoint"
            }
            EtlError::HttpStatusError { .. } => "Inspect the response body above for details",
            EtlError::MissingConfigError { .. } => {
                "Pass the value as a flag or set the matching environment variable"
            }
            EtlError::FileNotFoundError { .. } => "Check the input path and try again",
            EtlError::TomlError(_) => "Make sure the config file is valid TOML",
            EtlError::CsvError(_) => "Make sure the input is UTF-8 CSV with a header row",
            EtlError::SerializationError(_) => "Make sure the input contains one JSON object per line",
            EtlError::IoError(_) => "Check file permissions and free disk space",
            _ => "Review the arguments and input files",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingConfigError { .. } | EtlError::FileNotFoundError { .. } => {
                self.to_string()
            }
            other => format!("{:?} error: {}", other.category(), other),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        EtlError::MissingConfigError {
            field: field.into(),
        }
    }

    pub fn not_found(kind: impl Into<String>, path: impl Into<String>) -> Self {
        EtlError::FileNotFoundError {
            kind: kind.into(),
            path: path.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_message() {
        let e = EtlError::missing("SANITY_AUTH_TOKEN");
        assert_eq!(e.to_string(), "Missing SANITY_AUTH_TOKEN");
        assert_eq!(e.user_friendly_message(), "Missing SANITY_AUTH_TOKEN");
        assert_eq!(e.exit_code(), 1);
    }

    #[test]
    fn test_not_found_message() {
        let e = EtlError::not_found("CSV", "/tmp/copy.csv");
        assert_eq!(e.to_string(), "CSV not found: /tmp/copy.csv");
        assert_eq!(e.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_exit_codes_by_category() {
        let http = EtlError::HttpStatusError {
            status: 500,
            endpoint: "/api/revalidate".to_string(),
            body: "boom".to_string(),
        };
        assert_eq!(http.exit_code(), 2);

        let io = EtlError::IoError(std::io::Error::other("disk"));
        assert_eq!(io.exit_code(), 3);
        assert!(ErrorSeverity::Critical > ErrorSeverity::High);
    }
}
