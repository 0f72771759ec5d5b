//! PagerDuty Events API v2 backend

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{NotifyError, NotifyResult};
use crate::services::{check_response, require_message, Service, ServiceCore};
use crate::transport::{HttpRequest, HttpResponse, TransportOptions};
use crate::types::{Params, StdLogger};

pub use config::{PagerDutyConfig, SCHEME};

/// Longest summary the Events API accepts
const MAX_SUMMARY_LENGTH: usize = 1024;

#[derive(Debug, Serialize)]
struct EventPayload {
    payload: Payload,
    routing_key: String,
    event_action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    contexts: Vec<EventContext>,
}

#[derive(Debug, Serialize)]
struct Payload {
    summary: String,
    severity: &'static str,
    source: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct EventContext {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<String>,
}

/// Contexts as a JSON array, or the shorthand `type:value,type:value`
fn parse_contexts(raw: &str) -> NotifyResult<Vec<EventContext>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    if let Ok(contexts) = serde_json::from_str(raw) {
        return Ok(contexts);
    }

    let mut contexts = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (kind, value) = entry
            .split_once(':')
            .map(|(k, v)| (k.trim(), v.trim()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .ok_or_else(|| {
                NotifyError::invalid_value("contexts", entry, "expected type:value")
            })?;
        let mut context = EventContext {
            kind: kind.to_string(),
            href: None,
            src: None,
            text: None,
        };
        match kind {
            "link" => context.href = Some(value.to_string()),
            "image" => context.src = Some(value.to_string()),
            _ => context.text = Some(value.to_string()),
        }
        contexts.push(context);
    }
    Ok(contexts)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Default)]
pub struct PagerDutyService {
    core: ServiceCore<PagerDutyConfig>,
}

impl PagerDutyService {
    pub fn new() -> Self {
        Self::default()
    }

    fn event_payload(config: &PagerDutyConfig, message: &str) -> NotifyResult<EventPayload> {
        let details = if config.details.is_empty() {
            None
        } else {
            Some(serde_json::from_str(&config.details).map_err(|e| {
                NotifyError::invalid_value("details", config.details.clone(), e.to_string())
            })?)
        };

        Ok(EventPayload {
            payload: Payload {
                summary: message.chars().take(MAX_SUMMARY_LENGTH).collect(),
                severity: config.severity_name(),
                source: config.source.clone(),
            },
            routing_key: config.integration_key.clone(),
            event_action: config.action_name(),
            details,
            client: non_empty(&config.client),
            client_url: non_empty(&config.client_url),
            contexts: parse_contexts(&config.contexts)?,
        })
    }

    fn decode_error(response: &HttpResponse) -> Option<String> {
        let body: ErrorBody = response.json()?;
        if body.message.is_empty() {
            return None;
        }
        Some(if body.errors.is_empty() {
            body.message
        } else {
            format!("{}: {}", body.message, body.errors.join(", "))
        })
    }
}

#[async_trait]
impl Service for PagerDutyService {
    delegate_to_core!();

    fn initialize(&mut self, url: &Url, logger: Arc<dyn StdLogger>) -> NotifyResult<()> {
        self.core.initialize(url, logger, |_| {
            TransportOptions::with_timeout(Duration::from_secs(30))
        })
    }

    async fn send(&self, message: &str, params: Option<&Params>) -> NotifyResult<()> {
        let config = self.core.effective_config(params, &[])?;
        require_message(SCHEME, message)?;

        let endpoint = Url::parse(&format!(
            "https://{}:{}/v2/enqueue",
            config.host, config.port
        ))?;
        let request = HttpRequest::post(endpoint).json(&Self::event_payload(&config, message)?)?;

        let response = self.core.transport()?.execute(request).await?;
        check_response(SCHEME, &response, Self::decode_error)
    }
}
