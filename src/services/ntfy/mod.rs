//! ntfy.sh publish backend

pub mod config;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::errors::NotifyResult;
use crate::services::{check_response, require_message, Service, ServiceCore};
use crate::transport::{HttpRequest, HttpResponse, TransportOptions};
use crate::types::{Params, StdLogger};

pub use config::{NtfyConfig, DEFAULT_PRIORITY, SCHEME};

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: i64,
    error: String,
    #[serde(default)]
    link: String,
}

#[derive(Default)]
pub struct NtfyService {
    core: ServiceCore<NtfyConfig>,
}

impl NtfyService {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_request(config: &NtfyConfig, message: &str) -> NotifyResult<HttpRequest> {
        let url = Url::parse(&format!("{}://{}/{}", config.scheme, config.host, config.topic))?;
        let mut request = HttpRequest::post(url)
            .header("Content-Type", "text/plain")
            .text(message);

        let optional = [
            ("Title", config.title.as_str()),
            ("Click", config.click.as_str()),
            ("Attach", config.attach.as_str()),
            ("Filename", config.filename.as_str()),
            ("Delay", config.delay.as_str()),
            ("Email", config.email.as_str()),
            ("Icon", config.icon.as_str()),
        ];
        for (name, value) in optional {
            if !value.is_empty() {
                request = request.header(name, value);
            }
        }
        if config.priority != DEFAULT_PRIORITY {
            request = request.header("Priority", config.priority.to_string());
        }
        if !config.tags.is_empty() {
            request = request.header("Tags", config.tags.join(","));
        }
        if !config.actions.is_empty() {
            request = request.header("Actions", config.actions.join("; "));
        }
        if !config.cache {
            request = request.header("Cache", "no");
        }
        if !config.firebase {
            request = request.header("Firebase", "no");
        }
        if !config.username.is_empty() {
            request = request.basic_auth(&config.username, &config.password);
        }
        Ok(request)
    }

    fn decode_error(response: &HttpResponse) -> Option<String> {
        let body: ErrorBody = response.json()?;
        let mut message = format!("{} (code {})", body.error, body.code);
        if !body.link.is_empty() {
            message.push_str(&format!(", see {}", body.link));
        }
        Some(message)
    }
}

#[async_trait]
impl Service for NtfyService {
    delegate_to_core!();

    fn initialize(&mut self, url: &Url, logger: Arc<dyn StdLogger>) -> NotifyResult<()> {
        self.core.initialize(url, logger, |config| {
            TransportOptions::default().accept_invalid_certs(config.disable_tls_verification)
        })
    }

    async fn send(&self, message: &str, params: Option<&Params>) -> NotifyResult<()> {
        let config = self.core.effective_config(params, &[])?;
        require_message(SCHEME, message)?;

        let request = Self::build_request(&config, message)?;
        let response = self.core.transport()?.execute(request).await?;
        check_response(SCHEME, &response, Self::decode_error)
    }
}
