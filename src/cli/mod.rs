//! CLI module providing command-line interface functionality
//!
//! This module handles argument parsing, command validation, and routing
//! to appropriate handlers while maintaining separation of concerns.

pub mod commands;
pub mod context;
pub mod handlers;

use anyhow::Result;
use clap::Parser;

pub use commands::{Cli, Commands, ConfigAction};
pub use context::CliContext;
pub use handlers::CommandHandler;

/// Main CLI application
pub struct CliApp;

impl CliApp {
    /// Parse command line arguments and execute the requested command
    pub async fn run() -> Result<()> {
        let cli = Cli::parse();

        let mut context = CliContext::new(cli.config.clone(), cli.verbose)?;
        context.init_logging()?;

        let mut handler = CommandHandler::new(context);
        handler.handle_command(cli.command).await
    }
}
