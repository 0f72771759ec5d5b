//! Generic webhook backend
//!
//! Unlike the other backends every per-call param is payload data here:
//! params that match a config key also override that key, the rest are
//! passed through to the webhook body.

pub mod config;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::errors::{NotifyError, NotifyResult};
use crate::format::ConfigQueryResolver;
use crate::services::{check_response, require_message, Service, ServiceCore};
use crate::transport::{HttpRequest, TransportOptions};
use crate::types::{Params, StdLogger, TITLE_KEY};

pub use config::{GenericConfig, SCHEME};

const JSON_TEMPLATE: &str = "json";

#[derive(Default)]
pub struct GenericService {
    core: ServiceCore<GenericConfig>,
}

impl GenericService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Params keyed for the webhook: title mapped to `titlekey`, message under `messagekey`
    fn send_params(
        config: &GenericConfig,
        params: Option<&Params>,
        message: &str,
    ) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        if !config.title.is_empty() {
            values.insert(config.title_key.clone(), config.title.clone());
        }
        for (key, value) in params.into_iter().flatten() {
            let key = if key == TITLE_KEY {
                config.title_key.clone()
            } else {
                key.clone()
            };
            values.insert(key, value.clone());
        }
        values.insert(config.message_key.clone(), message.to_string());
        values
    }

    fn payload(
        &self,
        config: &GenericConfig,
        mut values: BTreeMap<String, String>,
    ) -> NotifyResult<(Vec<u8>, String)> {
        if config.template.is_empty() {
            let message = values.remove(&config.message_key).unwrap_or_default();
            return Ok((message.into_bytes(), "text/plain".to_string()));
        }
        if config.template.eq_ignore_ascii_case(JSON_TEMPLATE) {
            values.extend(config.extra_data.clone());
            return Ok((serde_json::to_vec(&values)?, config.content_type.clone()));
        }

        let standard = &self.core.standard;
        if !standard.has_template(&config.template) {
            return Err(NotifyError::validation(
                SCHEME,
                format!("template '{}' has not been loaded", config.template),
            ));
        }
        let body = standard.render(&config.template, &values)?;
        Ok((body.into_bytes(), config.content_type.clone()))
    }
}

#[async_trait]
impl Service for GenericService {
    delegate_to_core!();

    fn initialize(&mut self, url: &Url, logger: Arc<dyn StdLogger>) -> NotifyResult<()> {
        self.core
            .initialize(url, logger, |_| TransportOptions::default())
    }

    async fn send(&self, message: &str, params: Option<&Params>) -> NotifyResult<()> {
        let mut config = self.core.config()?.clone();
        for (key, value) in params.into_iter().flatten() {
            if config.has_key(key) {
                config.set(key, value)?;
            }
        }
        require_message(SCHEME, message)?;

        let values = Self::send_params(&config, params, message);
        let (body, content_type) = self.payload(&config, values)?;

        let method = config.method.to_ascii_uppercase();
        let mut request = HttpRequest::new(method, config.webhook_url()?)
            .header("Content-Type", content_type.as_str())
            .header("Accept", content_type.as_str());
        request.body = body;
        for (name, value) in &config.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = self.core.transport()?.execute(request).await?;
        if response.is_success() && !response.body.is_empty() {
            self.core
                .standard
                .log_fmt(format_args!("generic: server response: {}", response.text()));
        }
        check_response(SCHEME, &response, |_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceConfig;
    use crate::transport::RecordingTransport;
    use crate::types::DiscardLogger;

    fn service(url: &str) -> (GenericService, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let mut service = GenericService::new();
        service.set_transport(transport.clone());
        service
            .initialize(&Url::parse(url).unwrap(), Arc::new(DiscardLogger))
            .unwrap();
        (service, transport)
    }

    #[test]
    fn test_header_key_normalization() {
        assert_eq!(config::normalized_header_key("contentType"), "Content-Type");
        assert_eq!(config::normalized_header_key("x-api-key"), "X-Api-Key");
        assert_eq!(config::normalized_header_key("Authorization"), "Authorization");
    }

    #[test]
    fn test_query_split_into_config_headers_extras_and_custom() {
        let url = Url::parse(
            "generic://hook.example.com:8080/api/notify?template=json&@authorization=Bearer%20x&$source=ci&foo=bar&__title=raw",
        )
        .unwrap();
        let config = GenericConfig::from_url(&url).unwrap();
        assert_eq!(config.host, "hook.example.com:8080");
        assert_eq!(config.path, "/api/notify");
        assert_eq!(config.template, "json");
        assert_eq!(config.headers["Authorization"], "Bearer x");
        assert_eq!(config.extra_data["source"], "ci");
        assert_eq!(
            config.custom_query,
            vec![
                ("foo".to_string(), "bar".to_string()),
                ("title".to_string(), "raw".to_string())
            ]
        );
        assert_eq!(
            config.webhook_url().unwrap().as_str(),
            "https://hook.example.com:8080/api/notify?foo=bar&title=raw"
        );

        let again = GenericConfig::from_url(&config.get_url().unwrap()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_from_webhook_url() {
        let config =
            GenericConfig::from_webhook_url(&Url::parse("http://local.test/hook").unwrap())
                .unwrap();
        assert!(config.disable_tls);
        assert_eq!(config.webhook_url().unwrap().as_str(), "http://local.test/hook");

        let config = GenericConfig::from_webhook_url(
            &Url::parse("generic+https://local.test/hook").unwrap(),
        )
        .unwrap();
        assert!(!config.disable_tls);
        assert!(GenericConfig::from_webhook_url(&Url::parse("ftp://x/y").unwrap()).is_err());
    }

    #[tokio::test]
    async fn test_plain_text_without_template() {
        let (service, transport) = service("generic://hook.example.com/notify");
        service.send("hello", None).await.unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.url.as_str(), "https://hook.example.com/notify");
        assert_eq!(request.body_text(), "hello");
        assert_eq!(request.header_value("Content-Type"), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_json_template_includes_params_and_extras() {
        let (service, transport) = service(
            "generic://hook.example.com/notify?template=json&titlekey=subject&$env=prod&@xApiKey=k",
        );
        let params = Params::new().with("title", "Deploy").with("build", "42");
        service.send("done", Some(&params)).await.unwrap();

        let request = transport.last_request().unwrap();
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["subject"], "Deploy");
        assert_eq!(body["message"], "done");
        assert_eq!(body["build"], "42");
        assert_eq!(body["env"], "prod");
        assert_eq!(request.header_value("Content-Type"), Some("application/json"));
        assert_eq!(request.header_value("X-Api-Key"), Some("k"));
    }

    #[tokio::test]
    async fn test_named_template() {
        let (mut service, transport) = service("generic://hook.example.com/notify?template=alert");
        service
            .set_template_string("alert", "{{title}}: {{message}}")
            .unwrap();
        let params = Params::new().with("title", "CPU");
        service.send("high load", Some(&params)).await.unwrap();
        assert_eq!(transport.last_request().unwrap().body_text(), "CPU: high load");
    }

    #[tokio::test]
    async fn test_missing_template_is_an_error() {
        let (service, transport) = service("generic://hook.example.com/notify?template=nope");
        let err = service.send("hi", None).await.unwrap_err();
        assert!(err.to_string().contains("has not been loaded"));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_method_override_and_error_status() {
        let (service, transport) = service("generic://hook.example.com/notify?method=put");
        transport.respond("hook.example.com", 500, "boom");
        let err = service.send("hi", None).await.unwrap_err();
        assert_eq!(transport.last_request().unwrap().method, "PUT");
        assert_eq!(err.to_string(), "generic: HTTP 500: boom");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected_before_request() {
        let (service, transport) = service("generic://hook.example.com/notify");
        let err = service.send("  ", None).await.unwrap_err();
        assert!(matches!(err, NotifyError::Validation { .. }));
        assert_eq!(transport.request_count(), 0);
    }
}
