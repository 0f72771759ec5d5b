//! Centralized error handling module
//!
//! Library code returns `NotifyError`; the binary converts to `anyhow::Error`
//! at the outermost layer only.

pub mod context;
pub mod types;

pub use context::ErrorContextExt;
pub use types::{endpoint, NotifyError, NotifyResult, TransportErrorKind};
