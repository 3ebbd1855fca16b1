use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Google Maps returned HTTP {status} for {endpoint}")]
    HttpStatusError { endpoint: String, status: u16 },

    #[error("Google Maps API error {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    ApiError {
        status: String,
        message: Option<String>,
    },

    #[error("Google Maps query limit exceeded")]
    QuotaExceeded,

    #[error("Unexpected API response: {message}")]
    UnexpectedResponse { message: String },

    #[error("No Google Maps API key configured")]
    MissingApiKey,

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

    #[error("Server error: {message}")]
    ServerError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Api,
    Configuration,
    Data,
    Storage,
    Server,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LeadError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LeadError::HttpError(_) | LeadError::HttpStatusError { .. } => ErrorCategory::Network,
            LeadError::ApiError { .. }
            | LeadError::QuotaExceeded
            | LeadError::UnexpectedResponse { .. } => ErrorCategory::Api,
            LeadError::MissingApiKey
            | LeadError::ConfigValidationError { .. }
            | LeadError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            LeadError::CsvError(_) | LeadError::SerializationError(_) => ErrorCategory::Data,
            LeadError::IoError(_) => ErrorCategory::Storage,
            LeadError::ServerError { .. } => ErrorCategory::Server,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Api if self.is_retriable() => ErrorSeverity::Medium,
            ErrorCategory::Api | ErrorCategory::Data | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Storage | ErrorCategory::Server => ErrorSeverity::Critical,
        }
    }

    /// Transient failures worth another attempt: timeouts, connection
    /// problems, 5xx responses and quota throttling.
    pub fn is_retriable(&self) -> bool {
        match self {
            LeadError::HttpError(e) => e.is_timeout() || e.is_connect(),
            LeadError::HttpStatusError { status, .. } => *status >= 500 || *status == 429,
            LeadError::QuotaExceeded => true,
            _ => false,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LeadError::HttpError(e) if e.is_timeout() => {
                "The request to Google Maps timed out".to_string()
            }
            LeadError::HttpError(_) | LeadError::HttpStatusError { .. } => {
                "Could not reach the Google Maps web services".to_string()
            }
            LeadError::ApiError { status, .. } => {
                format!("Google Maps rejected the request ({})", status)
            }
            LeadError::QuotaExceeded => "Google Maps query quota exceeded".to_string(),
            LeadError::MissingApiKey => "No API key found".to_string(),
            LeadError::IoError(e) => format!("Could not write output: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LeadError::HttpError(_) | LeadError::HttpStatusError { .. } => {
                "Check your network connection and try again".to_string()
            }
            LeadError::ApiError { status, .. } if status == "REQUEST_DENIED" => {
                "Make sure the Places API and Geocoding API are enabled and billing is active for your project".to_string()
            }
            LeadError::ApiError { .. } | LeadError::UnexpectedResponse { .. } => {
                "Try a broader query, a larger radius, or another location".to_string()
            }
            LeadError::QuotaExceeded => {
                "Wait a moment or raise the quota in the Google Cloud console".to_string()
            }
            LeadError::MissingApiKey => {
                "Set GOOGLE_MAPS_API_KEY in the environment, a .env file, or config.toml".to_string()
            }
            LeadError::ConfigValidationError { .. } | LeadError::InvalidConfigValueError { .. } => {
                "Fix the reported value and run again".to_string()
            }
            LeadError::CsvError(_) | LeadError::SerializationError(_) | LeadError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            LeadError::ServerError { .. } => {
                "Check that the PORT is free and valid".to_string()
            }
        }
    }
}

impl From<toml::de::Error> for LeadError {
    fn from(e: toml::de::Error) -> Self {
        LeadError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        }
    }
}

/// Process exit code for a failed CLI run.
pub fn exit_code(severity: &ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

pub type Result<T> = std::result::Result<T, LeadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_errors_are_retriable() {
        assert!(LeadError::QuotaExceeded.is_retriable());
        assert_eq!(LeadError::QuotaExceeded.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_server_side_status_is_retriable() {
        let err = LeadError::HttpStatusError {
            endpoint: "geocode".to_string(),
            status: 503,
        };
        assert!(err.is_retriable());
        assert_eq!(err.category(), ErrorCategory::Network);

        let err = LeadError::HttpStatusError {
            endpoint: "geocode".to_string(),
            status: 403,
        };
        assert!(!err.is_retriable());
    }

    #[test]
    fn test_api_error_message() {
        let err = LeadError::ApiError {
            status: "REQUEST_DENIED".to_string(),
            message: Some("The provided API key is invalid.".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Google Maps API error REQUEST_DENIED: The provided API key is invalid."
        );
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("billing"));
    }

    #[test]
    fn test_missing_api_key_is_configuration() {
        let err = LeadError::MissingApiKey;
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.recovery_suggestion().contains("GOOGLE_MAPS_API_KEY"));
        assert_eq!(exit_code(&err.severity()), 1);
    }

    #[test]
    fn test_exit_codes_by_severity() {
        assert_eq!(exit_code(&ErrorSeverity::Low), 0);
        assert_eq!(exit_code(&ErrorSeverity::Medium), 2);
        assert_eq!(exit_code(&ErrorSeverity::High), 1);
        assert_eq!(exit_code(&ErrorSeverity::Critical), 3);
    }

    #[test]
    fn test_exit_codes_for_typical_failures() {
        assert_eq!(exit_code(&LeadError::QuotaExceeded.severity()), 2);
        let bad_port = LeadError::InvalidConfigValueError {
            field: "PORT".to_string(),
            value: "abc".to_string(),
            reason: "not a port".to_string(),
        };
        assert_eq!(exit_code(&bad_port.severity()), 1);
        let io = LeadError::IoError(std::io::Error::other("disk full"));
        assert_eq!(exit_code(&io.severity()), 3);
    }
}
