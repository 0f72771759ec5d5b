//! CLI Context for dependency injection and shared state
//!
//! Centralizes configuration loading and logging setup so handlers only
//! deal with their command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use notify_router::{ConfigManager, StdLogger, TracingLogger};

/// CLI execution context containing shared dependencies and configuration
pub struct CliContext {
    pub verbose: bool,
    pub config_manager: ConfigManager,
    log_guard: Option<WorkerGuard>,
}

impl CliContext {
    pub fn new(config_path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let config_manager = ConfigManager::load(config_path)?;
        Ok(Self {
            verbose,
            config_manager,
            log_guard: None,
        })
    }

    /// Initialize logging based on verbosity and the `[logging]` section
    ///
    /// Console output goes to stderr so stdout stays clean for command output.
    pub fn init_logging(&mut self) -> Result<()> {
        let logging = &self.config_manager.config().logging;
        let log_level = if self.verbose { "debug" } else { logging.level.as_str() };
        let env_filter = EnvFilter::from_default_env().add_directive(
            log_level
                .parse()
                .unwrap_or_else(|_| tracing::Level::INFO.into()),
        );

        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(self.verbose);

        let file_layer = match &logging.file {
            Some(log_path) => {
                let directory = log_path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| std::path::Path::new("."));
                std::fs::create_dir_all(directory).context("Failed to create log directory")?;
                let file_name = log_path
                    .file_name()
                    .unwrap_or_else(|| std::ffi::OsStr::new("notify-router.log"));
                let file_appender = tracing_appender::rolling::daily(directory, file_name);
                let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
                self.log_guard = Some(guard);
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(file_writer)
                        .with_ansi(false),
                )
            }
            None => None,
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        tracing::debug!(
            config = %self.config_manager.config_path().display(),
            "Verbose logging enabled"
        );
        Ok(())
    }

    /// Logger handed to services for their diagnostic notices
    pub fn logger(&self) -> Arc<dyn StdLogger> {
        Arc::new(TracingLogger::new())
    }
}
