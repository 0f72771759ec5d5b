//! Command handlers for all CLI operations
//!
//! This module contains the implementation of all command handlers,
//! providing clean separation between CLI parsing and business logic.

use super::{CliContext, Commands, ConfigAction};

use anyhow::{bail, Context, Result};
use notify_router::router::{lookup, schemes};
use notify_router::{locate, Params, ServiceRouter};
use std::io::{self, Read};
use tracing::{debug, info};

/// Coordinates all command handling operations with dependency injection via CliContext
pub struct CommandHandler {
    context: CliContext,
}

impl CommandHandler {
    /// Create a new command handler instance with the provided context
    pub fn new(context: CliContext) -> Self {
        Self { context }
    }

    /// Route commands to their appropriate handlers
    pub async fn handle_command(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Send {
                urls,
                services,
                message,
                params,
            } => self.handle_send(urls, services, message, params).await,
            Commands::Verify { url } => self.handle_verify(&url),
            Commands::Services => self.handle_services(),
            Commands::Docs { scheme } => self.handle_docs(&scheme),
            Commands::Init { force } => self.handle_init(force),
            Commands::Config { action } => self.handle_config(action),
        }
    }

    /// Send one message to every URL given directly or by config name
    async fn handle_send(
        &self,
        mut urls: Vec<String>,
        services: Vec<String>,
        message: Option<String>,
        params: Vec<(String, String)>,
    ) -> Result<()> {
        for name in &services {
            urls.push(self.context.config_manager.service_url(name)?.to_string());
        }
        if urls.is_empty() {
            bail!("No services given; use --url or --service");
        }

        let message = match message {
            Some(message) => message,
            None => {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read message from stdin")?;
                buffer.trim_end_matches(['\r', '\n']).to_string()
            }
        };
        if message.trim().is_empty() {
            bail!("Message is empty");
        }

        let params = merge_params(self.context.config_manager.config().default_params(), params);

        let router = ServiceRouter::new(self.context.logger(), &urls)?;
        debug!(services = ?router.services(), "dispatching message");
        let results = router.send(&message, params.as_ref()).await;

        let mut failures = 0;
        for (id, result) in router.services().into_iter().zip(&results) {
            match result {
                Ok(()) => println!("✓ {id}: sent"),
                Err(e) => {
                    failures += 1;
                    println!("✗ {id}: {e}");
                }
            }
        }

        if failures > 0 {
            bail!("{failures} of {} notifications failed", results.len());
        }
        info!(count = results.len(), "all notifications sent");
        Ok(())
    }

    fn handle_verify(&self, url: &str) -> Result<()> {
        let service = locate(url, self.context.logger())?;
        println!("✓ {} URL is valid", service.id());
        println!("{}", service.config_url()?);
        Ok(())
    }

    fn handle_services(&self) -> Result<()> {
        for scheme in schemes() {
            println!("{scheme}");
        }
        Ok(())
    }

    fn handle_docs(&self, scheme: &str) -> Result<()> {
        let entry = lookup(scheme).with_context(|| format!("Unknown service scheme '{scheme}'"))?;
        println!("{}", (entry.docs)());
        Ok(())
    }

    fn handle_init(&mut self, force: bool) -> Result<()> {
        let manager = &mut self.context.config_manager;
        if manager.init(force)? {
            println!(
                "Configuration initialized successfully at: {}",
                manager.config_path().display()
            );
        } else {
            println!(
                "Configuration already exists at: {}",
                manager.config_path().display()
            );
            println!("Use --force to overwrite");
        }
        Ok(())
    }

    fn handle_config(&mut self, action: ConfigAction) -> Result<()> {
        match action {
            ConfigAction::Show => {
                let content = toml::to_string_pretty(self.context.config_manager.config())
                    .context("Failed to serialize config")?;
                println!("{content}");
            }
            ConfigAction::Add { name, url } => {
                // Reject URLs that would fail at send time
                let service = locate(&url, self.context.logger())?;
                let manager = &mut self.context.config_manager;
                manager.config_mut().services.insert(name.clone(), url);
                manager.save()?;
                println!("Service '{name}' ({}) saved", service.id());
            }
            ConfigAction::Remove { name } => {
                let manager = &mut self.context.config_manager;
                if manager.config_mut().services.remove(&name).is_none() {
                    bail!("No service named '{name}' in config");
                }
                manager.save()?;
                println!("Service '{name}' removed");
            }
        }
        Ok(())
    }
}

/// Command-line params override `[params]` from the config file
fn merge_params(defaults: Params, overrides: Vec<(String, String)>) -> Option<Params> {
    let mut merged = defaults;
    for (key, value) in overrides {
        merged.insert(key, value);
    }
    (!merged.is_empty()).then_some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_params_override_config_params() {
        let defaults: Params = [("title", "Config"), ("priority", "3")].into_iter().collect();
        let merged = merge_params(defaults, vec![("title".into(), "Cli".into())]).unwrap();
        assert_eq!(merged.get("title"), Some("Cli"));
        assert_eq!(merged.get("priority"), Some("3"));
    }

    #[test]
    fn test_no_params_means_none() {
        assert!(merge_params(Params::new(), Vec::new()).is_none());
    }
}
