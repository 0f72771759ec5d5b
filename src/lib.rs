//! Notify Router Library
//!
//! Fan-out notification dispatch driven by service URLs such as
//! `discord://token@id` or `ntfy://ntfy.sh/topic`. Each URL scheme maps to a
//! backend whose typed config marshals to and from the URL; the router holds
//! one initialized backend per URL and sends every message to all of them.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use notify_router::{ServiceRouter, TracingLogger};
//!
//! # async fn run() -> notify_router::NotifyResult<()> {
//! let router = ServiceRouter::new(
//!     Arc::new(TracingLogger::new()),
//!     &["ntfy://ntfy.sh/alerts", "logger://"],
//! )?;
//! for result in router.send("backup finished", None).await {
//!     result?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod format;
pub mod router;
pub mod services;
pub mod transport;
pub mod types;

use std::sync::Arc;

pub use config::{Config, ConfigManager};
pub use errors::{NotifyError, NotifyResult, TransportErrorKind};
pub use format::{ConfigFields, ConfigQueryResolver};
pub use router::{locate, ServiceRouter};
pub use services::{Service, ServiceConfig};
pub use types::{Params, StdLogger, TracingLogger};

/// Send one message to a single service URL
pub async fn send(url: &str, message: &str) -> NotifyResult<()> {
    let service = locate(url, Arc::new(TracingLogger::new()))?;
    service.send(message, None).await
}

/// Build a router for `urls` that logs through `tracing`
pub fn create_sender<S: AsRef<str>>(urls: &[S]) -> NotifyResult<ServiceRouter> {
    ServiceRouter::new(Arc::new(TracingLogger::new()), urls)
}
