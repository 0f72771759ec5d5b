//! Error types for notify-router
//!
//! Every failure a caller can observe is one of these variants. Configuration
//! problems surface synchronously while a URL is parsed, delivery problems
//! surface from `send`, and nothing is reported only through the log.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Classification of a transport-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timed out",
            Self::Connect => "connection failed",
            Self::Other => "request failed",
        };
        f.write_str(name)
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum NotifyError {
    // Configuration errors
    #[error("unknown config key '{key}'")]
    UnknownKey { key: String },

    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    // Routing errors
    #[error("unknown service scheme '{scheme}'")]
    UnknownScheme { scheme: String },

    #[error("service '{service}' has not been initialized")]
    NotInitialized { service: String },

    // Delivery errors
    #[error("request to {url} {kind}")]
    Transport {
        url: String,
        kind: TransportErrorKind,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("{service}: HTTP {status}: {message}")]
    Backend {
        service: String,
        status: u16,
        message: String,
    },

    #[error("{service}: {reason}")]
    Validation { service: String, reason: String },

    #[error("{service}: {}", join_messages(.errors))]
    Multiple {
        service: String,
        errors: Vec<NotifyError>,
    },

    // Template and I/O errors
    #[error("Template error: {message}")]
    Template {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("File I/O error for '{path}': {operation}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

fn join_messages(errors: &[NotifyError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience type alias for Results using NotifyError
pub type NotifyResult<T> = Result<T, NotifyError>;

impl NotifyError {
    /// Create a new Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new Config error with source
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn unknown_key(key: impl Into<String>) -> Self {
        Self::UnknownKey { key: key.into() }
    }

    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            service: service.into(),
            reason: reason.into(),
        }
    }

    pub fn backend(service: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            service: service.into(),
            status,
            message: message.into(),
        }
    }

    pub fn not_initialized(service: impl Into<String>) -> Self {
        Self::NotInitialized {
            service: service.into(),
        }
    }

    pub fn transport(url: impl Into<String>, kind: TransportErrorKind) -> Self {
        Self::Transport {
            url: url.into(),
            kind,
            source: None,
        }
    }

    /// Create a new Transport error with source
    pub fn transport_with_source(
        url: impl Into<String>,
        kind: TransportErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            url: url.into(),
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Template error with source
    pub fn template_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Template {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new I/O error with source
    pub fn io_with_source(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Io {
            path: path.into(),
            operation: operation.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new Internal error with source
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True for malformed or out-of-range configuration input
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownKey { .. } | Self::InvalidValue { .. } | Self::Config { .. }
        )
    }

    /// Check if a later attempt could succeed without changing the input
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { kind, .. } => {
                matches!(kind, TransportErrorKind::Timeout | TransportErrorKind::Connect)
            }
            Self::Backend { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            Self::Multiple { errors, .. } => errors.iter().any(|e| e.is_retryable()),
            _ => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownKey { .. } | Self::InvalidValue { .. } | Self::Config { .. } => "config",
            Self::UnknownScheme { .. } | Self::NotInitialized { .. } => "routing",
            Self::Transport { .. } => "transport",
            Self::Backend { .. } | Self::Multiple { .. } => "backend",
            Self::Validation { .. } => "validation",
            Self::Template { .. } => "template",
            Self::Io { .. } => "io",
            Self::Internal { .. } => "internal",
        }
    }
}

/// `scheme://host[:port]` of `url`; paths, queries and userinfo carry tokens
pub fn endpoint(url: &url::Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(endpoint)
            .unwrap_or_else(|| "unknown".to_string());
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::transport_with_source(url, kind, err.without_url())
    }
}

impl From<url::ParseError> for NotifyError {
    fn from(err: url::ParseError) -> Self {
        Self::config_with_source(format!("invalid service URL: {err}"), err)
    }
}

impl From<serde_json::Error> for NotifyError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal_with_source("JSON serialization failed", err)
    }
}
