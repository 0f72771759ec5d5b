//! Error context helpers
//!
//! Attach notify-router context to foreign errors without losing the source chain.

use super::types::NotifyError;
use std::path::PathBuf;

/// Extension trait for converting foreign results into `NotifyError`
pub trait ErrorContextExt<T> {
    /// Wrap the error as a configuration error carrying `message`
    fn config_context(self, message: impl Into<String>) -> Result<T, NotifyError>;

    /// Wrap the error as an I/O error for `path`
    fn io_context(
        self,
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
    ) -> Result<T, NotifyError>;

    /// Wrap the error as a template error, building the message lazily
    fn template_context<F>(self, f: F) -> Result<T, NotifyError>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContextExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn config_context(self, message: impl Into<String>) -> Result<T, NotifyError> {
        self.map_err(|e| {
            let message = message.into();
            NotifyError::config_with_source(format!("{message}: {e}"), e)
        })
    }

    fn io_context(
        self,
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
    ) -> Result<T, NotifyError> {
        self.map_err(|e| NotifyError::io_with_source(path, operation, e))
    }

    fn template_context<F>(self, f: F) -> Result<T, NotifyError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let message = f();
            NotifyError::template_with_source(format!("{message}: {e}"), e)
        })
    }
}
