use std::fmt;
use std::path::Path;
use std::sync::Arc;

use handlebars::Handlebars;
use serde::Serialize;

use crate::errors::{ErrorContextExt, NotifyResult};
use crate::types::{DiscardLogger, StdLogger};

/// Logger and template registry shared by every backend through composition
#[derive(Clone)]
pub struct Standard {
    logger: Arc<dyn StdLogger>,
    templates: Handlebars<'static>,
}

impl Standard {
    pub fn new() -> Self {
        let mut templates = Handlebars::new();
        templates.set_strict_mode(false);
        templates.register_escape_fn(handlebars::no_escape);
        Self {
            logger: Arc::new(DiscardLogger),
            templates,
        }
    }

    pub fn set_logger(&mut self, logger: Arc<dyn StdLogger>) {
        self.logger = logger;
    }

    pub fn logger(&self) -> Arc<dyn StdLogger> {
        Arc::clone(&self.logger)
    }

    pub fn log(&self, message: &str) {
        self.logger.print(message);
    }

    pub fn log_fmt(&self, args: fmt::Arguments<'_>) {
        self.logger.print_fmt(args);
    }

    pub fn set_template_string(&mut self, id: &str, body: &str) -> NotifyResult<()> {
        self.templates
            .register_template_string(id, body)
            .template_context(|| format!("Failed to register template '{id}'"))
    }

    pub fn set_template_file(&mut self, id: &str, path: &Path) -> NotifyResult<()> {
        let body = std::fs::read_to_string(path).io_context(path, "read template file")?;
        self.set_template_string(id, &body)
    }

    pub fn has_template(&self, id: &str) -> bool {
        self.templates.has_template(id)
    }

    pub fn render<T: Serialize>(&self, id: &str, data: &T) -> NotifyResult<String> {
        self.templates
            .render(id, data)
            .template_context(|| format!("Failed to render template '{id}'"))
    }
}

impl Default for Standard {
    fn default() -> Self {
        Self::new()
    }
}
