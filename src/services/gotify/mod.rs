//! Gotify push backend

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{NotifyError, NotifyResult};
use crate::services::{check_response, require_message, Service, ServiceCore};
use crate::transport::{HttpRequest, HttpResponse, TransportOptions};
use crate::types::{Params, StdLogger};

pub use config::{GotifyConfig, SCHEME};

const EXTRAS_PARAM: &str = "extras";
const DATE_PARAM: &str = "date";
const TOKEN_HEADER: &str = "X-Gotify-Key";

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    title: &'a str,
    message: &'a str,
    priority: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    extras: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "errorCode")]
    error_code: u16,
    #[serde(rename = "errorDescription", default)]
    error_description: String,
}

#[derive(Default)]
pub struct GotifyService {
    core: ServiceCore<GotifyConfig>,
}

impl GotifyService {
    pub fn new() -> Self {
        Self::default()
    }

    fn endpoint(config: &GotifyConfig) -> NotifyResult<Url> {
        let mut url = Url::parse(&format!(
            "{}://{}{}/message",
            config.api_scheme(),
            config.host,
            config.path
        ))?;
        if !config.use_header {
            url.query_pairs_mut().append_pair("token", &config.token);
        }
        Ok(url)
    }

    fn decode_error(response: &HttpResponse) -> Option<String> {
        let body: ErrorBody = response.json()?;
        Some(format!(
            "server responded with {} ({}): {}",
            body.error, body.error_code, body.error_description
        ))
    }
}

fn parse_extras(raw: &str) -> NotifyResult<serde_json::Map<String, serde_json::Value>> {
    match serde_json::from_str(raw) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        _ => Err(NotifyError::invalid_value(
            EXTRAS_PARAM,
            raw,
            "expected a JSON object",
        )),
    }
}

/// Accepts RFC3339, RFC3339 without offset (UTC), unix seconds or `YYYY-MM-DD HH:MM:SS`
fn parse_date(raw: &str) -> NotifyResult<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(date) = trimmed
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
    {
        return Ok(date);
    }
    Err(NotifyError::invalid_value(
        DATE_PARAM,
        raw,
        "expected RFC3339, unix seconds or YYYY-MM-DD HH:MM:SS",
    ))
}

#[async_trait]
impl Service for GotifyService {
    delegate_to_core!();

    fn initialize(&mut self, url: &Url, logger: Arc<dyn StdLogger>) -> NotifyResult<()> {
        self.core.initialize(url, logger, |config| {
            TransportOptions::with_timeout(Duration::from_secs(10))
                .accept_invalid_certs(config.insecure_skip_verify)
        })?;
        if self.core.config()?.disable_tls {
            self.core
                .standard
                .log("gotify: TLS is disabled, the token is sent in clear text");
        }
        Ok(())
    }

    async fn send(&self, message: &str, params: Option<&Params>) -> NotifyResult<()> {
        let config = self
            .core
            .effective_config(params, &[EXTRAS_PARAM, DATE_PARAM])?;
        require_message(SCHEME, message)?;

        let extras = params
            .and_then(|p| p.get(EXTRAS_PARAM))
            .map(parse_extras)
            .transpose()?;
        let date = params
            .and_then(|p| p.get(DATE_PARAM))
            .map(parse_date)
            .transpose()?
            .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true));

        let body = MessageRequest {
            title: &config.title,
            message,
            priority: config.priority,
            extras,
            date,
        };
        let mut request = HttpRequest::post(Self::endpoint(&config)?).json(&body)?;
        if config.use_header {
            request = request.header(TOKEN_HEADER, config.token.as_str());
        }

        let response = self.core.transport()?.execute(request).await?;
        check_response(SCHEME, &response, Self::decode_error)
    }
}
