//! Discord webhook backend

pub mod config;
pub mod payload;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::errors::{NotifyError, NotifyResult};
use crate::services::{check_response, require_message, Service, ServiceCore};
use crate::transport::{HttpRequest, HttpResponse, TransportOptions};
use crate::types::{MessageLevel, Params, StdLogger};

pub use config::{DiscordConfig, SCHEME};
use payload::{create_payload, items_from_lines, partition_message};

const WEBHOOK_BASE: &str = "https://discord.com/api/webhooks";
const LEVEL_PARAM: &str = "level";

#[derive(Default)]
pub struct DiscordService {
    core: ServiceCore<DiscordConfig>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: i64,
}

impl DiscordService {
    pub fn new() -> Self {
        Self::default()
    }

    fn webhook_url(config: &DiscordConfig) -> NotifyResult<Url> {
        let mut url = Url::parse(WEBHOOK_BASE)?;
        url.path_segments_mut()
            .map_err(|_| NotifyError::internal("webhook base URL cannot take a path"))?
            .pop_if_empty()
            .push(&config.webhook_id)
            .push(&config.token);
        Ok(url)
    }

    fn message_level(params: Option<&Params>) -> NotifyResult<MessageLevel> {
        match params.and_then(|p| p.get(LEVEL_PARAM)) {
            Some(raw) => MessageLevel::parse(raw)
                .ok_or_else(|| NotifyError::invalid_value(LEVEL_PARAM, raw, "not a message level")),
            None => Ok(MessageLevel::Unknown),
        }
    }

    fn decode_error(response: &HttpResponse) -> Option<String> {
        let body: ErrorBody = response.json()?;
        Some(if body.code == 0 {
            body.message
        } else {
            format!("{} (code {})", body.message, body.code)
        })
    }
}

#[async_trait]
impl Service for DiscordService {
    delegate_to_core!();

    fn initialize(&mut self, url: &Url, logger: Arc<dyn StdLogger>) -> NotifyResult<()> {
        self.core.initialize(url, logger, |_| {
            TransportOptions::with_timeout(Duration::from_secs(30))
        })
    }

    async fn send(&self, message: &str, params: Option<&Params>) -> NotifyResult<()> {
        let config = self.core.effective_config(params, &[LEVEL_PARAM])?;
        let level = Self::message_level(params)?;
        require_message(SCHEME, message)?;

        let url = Self::webhook_url(&config)?;
        let request = if config.json {
            HttpRequest::post(url)
                .header("Content-Type", "application/json")
                .text(message)
        } else {
            let split = if config.split_lines {
                items_from_lines(message, level)
            } else {
                partition_message(message, level)
            };
            if split.omitted > 0 {
                self.core.standard.log_fmt(format_args!(
                    "discord: message too long, {} characters omitted",
                    split.omitted
                ));
            }
            let mut payload = create_payload(split.items, &config.title, config.level_colors())?;
            payload.username = config.username.clone();
            payload.avatar_url = config.avatar.clone();
            HttpRequest::post(url).json(&payload)?
        };

        let response = self.core.transport()?.execute(request).await?;
        check_response(SCHEME, &response, Self::decode_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ConfigQueryResolver;
    use crate::services::ServiceConfig;
    use crate::transport::RecordingTransport;
    use crate::types::DiscardLogger;

    fn service(url: &str) -> (DiscordService, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let mut service = DiscordService::new();
        service.set_transport(transport.clone());
        service
            .initialize(&Url::parse(url).unwrap(), Arc::new(DiscardLogger))
            .unwrap();
        (service, transport)
    }

    #[test]
    fn test_config_url_defaults_are_omitted() {
        let config = DiscordConfig::new("123", "abc").unwrap();
        assert_eq!(config.get_url().unwrap().as_str(), "discord://abc@123");
    }

    #[test]
    fn test_config_url_round_trip() {
        let url = Url::parse("discord://tok@42/raw?color=0xff0000&username=bot").unwrap();
        let config = DiscordConfig::from_url(&url).unwrap();
        assert!(config.json);
        assert_eq!(config.color, 0xff0000);
        assert_eq!(config.get("username").unwrap(), "bot");

        let again = DiscordConfig::from_url(&config.get_url().unwrap()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_config_url_errors() {
        for (url, expected) in [
            ("discord://42", "token missing"),
            ("discord://tok@42/other", "illegal argument"),
        ] {
            let err = DiscordConfig::from_url(&Url::parse(url).unwrap()).unwrap_err();
            assert!(err.to_string().contains(expected), "{url}: {err}");
        }
    }

    #[tokio::test]
    async fn test_plain_message_sent_as_content() {
        let (service, transport) = service("discord://tok@42");
        service.send("hello", None).await.unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.url.as_str(), "https://discord.com/api/webhooks/42/tok");
        assert!(request.body_text().contains(r#""content":"hello""#));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_title_and_level_produce_embeds() {
        let (service, transport) = service("discord://tok@42?title=Deploy");
        let params = Params::new().with("level", "error");
        service.send("it broke", Some(&params)).await.unwrap();

        let body: serde_json::Value =
            serde_json::from_slice(&transport.last_request().unwrap().body).unwrap();
        assert_eq!(body["embeds"][0]["title"], "Deploy");
        assert_eq!(body["embeds"][0]["description"], "it broke");
        assert_eq!(body["embeds"][0]["color"], 0xd60510);
        assert_eq!(body["embeds"][0]["footer"]["text"], "Error");
    }

    #[tokio::test]
    async fn test_unknown_param_rejected_before_request() {
        let (service, transport) = service("discord://tok@42");
        let params = Params::new().with("nope", "1");
        let err = service.send("hello", Some(&params)).await.unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_params_do_not_leak_between_calls() {
        let (service, transport) = service("discord://tok@42");
        let params = Params::new().with("title", "Once");
        service.send("a", Some(&params)).await.unwrap();
        service.send("b", None).await.unwrap();

        let body = transport.last_request().unwrap().body_text();
        assert!(!body.contains("Once"));
    }

    #[tokio::test]
    async fn test_error_body_decoded() {
        let (service, transport) = service("discord://tok@42");
        let body = r#"{"message":"Invalid Webhook Token","code":50027}"#;
        transport.respond("discord.com", 401, body);
        let err = service.send("hello", None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "discord: HTTP 401: Invalid Webhook Token (code 50027)"
        );
    }

    #[tokio::test]
    async fn test_json_mode_posts_raw_message() {
        let (service, transport) = service("discord://tok@42/raw");
        service.send(r#"{"content":"raw"}"#, None).await.unwrap();
        assert_eq!(
            transport.last_request().unwrap().body_text(),
            r#"{"content":"raw"}"#
        );
    }

    #[tokio::test]
    async fn test_send_before_initialize() {
        let service = DiscordService::new();
        let err = service.send("hello", None).await.unwrap_err();
        assert!(matches!(err, NotifyError::NotInitialized { .. }));
    }
}
