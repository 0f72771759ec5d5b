use std::fmt;

/// Sink for diagnostic notices emitted by services
///
/// Services never report failures through this sink; it only carries
/// progress and warning text such as "TLS verification disabled".
pub trait StdLogger: Send + Sync {
    fn print(&self, message: &str);

    fn print_fmt(&self, args: fmt::Arguments<'_>) {
        self.print(&args.to_string());
    }
}

/// Forwards notices to the `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl StdLogger for TracingLogger {
    fn print(&self, message: &str) {
        tracing::info!(target: "notify_router::service", "{}", message);
    }
}

/// Drops every notice
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardLogger;

impl StdLogger for DiscardLogger {
    fn print(&self, _message: &str) {}
}
