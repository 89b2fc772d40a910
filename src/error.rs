// src/error.rs

//! Unified error handling for the roster crawler.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed before a response was read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    /// Response body was not the JSON we expected
    #[error("Malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization/deserialization failed outside a request
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Snapshot backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Vision collaborator failed or gave no answer
    #[error("Captcha solver failed: {reason}")]
    Solver { reason: String },

    /// Solver answer is not a 4-character alphanumeric code
    #[error("Captcha solver returned malformed answer {answer:?}")]
    SolverFormat { answer: String },

    /// Validation endpoint rejected the answer
    #[error("Captcha answer {answer:?} did not match")]
    CaptchaMismatch { answer: String },

    /// Validation endpoint matched the answer but sent no session key
    #[error("Captcha answer {answer:?} matched but no session key came back")]
    CaptchaKeyMissing { answer: String },

    /// Every captcha attempt in the budget failed
    #[error("Captcha not solved after {attempts} attempts")]
    CaptchaExhausted {
        attempts: u32,
        #[source]
        last: Option<Box<AppError>>,
    },

    /// Server still demands a captcha after the allowed refreshes
    #[error("Captcha still required by {facility} after {requests} request(s)")]
    CaptchaRequired { facility: String, requests: u32 },

    /// Session-initiating roster call was rejected
    #[error("Session error for {facility}: {message}")]
    Session { facility: String, message: String },

    /// A single inmate could not be enriched
    #[error("Enrichment failed for inmate {arrest_no}")]
    Enrichment {
        arrest_no: String,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a storage error.
    pub fn storage(message: impl fmt::Display) -> Self {
        Self::Storage(message.to_string())
    }

    /// Create a solver error.
    pub fn solver(reason: impl fmt::Display) -> Self {
        Self::Solver {
            reason: reason.to_string(),
        }
    }

    /// Create a session error for a facility.
    pub fn session(facility: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Session {
            facility: facility.into(),
            message: message.to_string(),
        }
    }

    /// Wrap a per-inmate failure.
    pub fn enrichment(arrest_no: impl Into<String>, source: AppError) -> Self {
        Self::Enrichment {
            arrest_no: arrest_no.into(),
            source: Box::new(source),
        }
    }

    /// Network, status or body-decoding failure.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::Decode { .. }
        )
    }

    /// Failure that ends the whole session rather than a single inmate.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Enrichment { .. })
    }

    /// Render the error followed by its chain of causes.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(": ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}
