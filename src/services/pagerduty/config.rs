use once_cell::sync::Lazy;
use url::Url;

use crate::errors::{NotifyError, NotifyResult};
use crate::format::{
    apply_query, build_query, decode_component, set_config_props_from_query, ConfigField,
    ConfigFields, UrlPart,
};
use crate::services::{base_url, ServiceConfig};
use crate::types::EnumFormatter;

pub const SCHEME: &str = "pagerduty";

pub const DEFAULT_HOST: &str = "events.pagerduty.com";
pub const DEFAULT_PORT: u16 = 443;

const KEY_LENGTH: usize = 32;

pub static SEVERITIES: EnumFormatter =
    EnumFormatter::new(&["critical", "error", "warning", "info"]);

pub static ACTIONS: EnumFormatter = EnumFormatter::new(&["trigger", "acknowledge", "resolve"]);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagerDutyConfig {
    pub integration_key: String,
    pub host: String,
    pub port: u16,
    pub severity: i64,
    pub source: String,
    pub action: i64,
    pub details: String,
    pub contexts: String,
    pub client: String,
    pub client_url: String,
}

impl PagerDutyConfig {
    pub fn severity_name(&self) -> &'static str {
        SEVERITIES.print(self.severity)
    }

    pub fn action_name(&self) -> &'static str {
        ACTIONS.print(self.action)
    }
}

type F = ConfigField<PagerDutyConfig>;

static FIELDS: Lazy<Vec<F>> = Lazy::new(|| {
    vec![
        F::text(
            "IntegrationKey",
            |c| c.integration_key.clone(),
            |c, v| c.integration_key = v,
        )
        .url(UrlPart::Path)
        .describe("The PagerDuty API integration key")
        .required(),
        F::text("Host", |c| c.host.clone(), |c, v| c.host = v)
            .url(UrlPart::Host)
            .default_value(DEFAULT_HOST)
            .describe("The PagerDuty API host"),
        F::unsigned("Port", |c| u64::from(c.port), |c, v| c.port = v as u16)
            .url(UrlPart::Port)
            .max(u64::from(u16::MAX))
            .default_value("443")
            .describe("The PagerDuty API port"),
        F::enumeration("Severity", &SEVERITIES, |c| c.severity, |c, v| c.severity = v)
            .keys(&["severity"])
            .default_value("error")
            .describe("The perceived severity of the status the event describes"),
        F::text("Source", |c| c.source.clone(), |c, v| c.source = v)
            .keys(&["source"])
            .default_value("default")
            .describe("The unique location of the affected system, preferably a hostname or FQDN"),
        F::enumeration("Action", &ACTIONS, |c| c.action, |c, v| c.action = v)
            .keys(&["action"])
            .default_value("trigger")
            .describe("The type of event"),
        F::text("Details", |c| c.details.clone(), |c, v| c.details = v)
            .keys(&["details"])
            .describe("Additional details about the incident, as JSON"),
        F::text("Contexts", |c| c.contexts.clone(), |c, v| c.contexts = v)
            .keys(&["contexts"])
            .describe("Additional context links or images"),
        F::text("Client", |c| c.client.clone(), |c, v| c.client = v)
            .keys(&["client"])
            .describe("The name of the monitoring client that is triggering this event"),
        F::text("ClientURL", |c| c.client_url.clone(), |c, v| c.client_url = v)
            .keys(&["clienturl"])
            .describe("The URL of the monitoring client that is triggering this event"),
    ]
});

impl ConfigFields for PagerDutyConfig {
    fn fields() -> &'static [ConfigField<Self>] {
        &FIELDS
    }
}

impl ServiceConfig for PagerDutyConfig {
    const SCHEME: &'static str = SCHEME;

    fn get_url(&self) -> NotifyResult<Url> {
        let host = if self.port == DEFAULT_PORT {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        };
        let mut url = base_url(SCHEME, &host)?;
        url.set_path(&format!("/{}", self.integration_key));
        apply_query(&mut url, &build_query(self)?);
        Ok(url)
    }

    fn set_url(&mut self, url: &Url) -> NotifyResult<()> {
        if let Some(host) = url.host_str().filter(|h| !h.is_empty()) {
            self.host = host.to_string();
        }
        if let Some(port) = url.port() {
            self.port = port;
        }
        self.integration_key = decode_component(url.path().trim_start_matches('/'));

        if self.integration_key.is_empty() {
            return Err(NotifyError::config("integration key missing from config URL"));
        }
        if self.integration_key.len() != KEY_LENGTH
            || !self.integration_key.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(NotifyError::config(format!(
                "integration key must be {KEY_LENGTH} hexadecimal characters"
            )));
        }

        set_config_props_from_query(self, url, &[])?;
        Ok(())
    }
}
