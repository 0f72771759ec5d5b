//! Command definitions and structures for the CLI
//!
//! This module contains all the clap-based command line argument definitions,
//! including the main CLI structure and all subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser)]
#[command(name = "notify-router")]
#[command(about = "Send notifications to the services described by URLs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Send a message to one or more services
    Send {
        /// Service URL (repeatable)
        #[arg(short = 'u', long = "url")]
        urls: Vec<String>,

        /// Named service from the config file (repeatable)
        #[arg(short = 's', long = "service")]
        services: Vec<String>,

        /// Message text; read from stdin when omitted
        #[arg(short, long)]
        message: Option<String>,

        /// Per-call param as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },

    /// Check that a service URL parses and print its normalized form
    Verify {
        /// Service URL
        url: String,
    },

    /// List supported service schemes
    Services,

    /// Print the URL fields and query props of a service
    Docs {
        /// Service scheme, e.g. discord
        scheme: String,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration management actions
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Add or replace a named service
    Add {
        /// Name used with `send --service`
        name: String,
        /// Service URL
        url: String,
    },

    /// Remove a named service
    Remove {
        /// Service name
        name: String,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}
