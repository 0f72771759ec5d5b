//! Backend that writes messages to the injected logger

pub mod config;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::errors::NotifyResult;
use crate::services::{require_message, Service, ServiceCore};
use crate::types::{Params, StdLogger, MESSAGE_KEY};

pub use config::{LoggerConfig, SCHEME};

/// Template id used to format logged messages when registered
pub const MESSAGE_TEMPLATE: &str = "message";

#[derive(Default)]
pub struct LoggerService {
    core: ServiceCore<LoggerConfig>,
}

impl LoggerService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Service for LoggerService {
    delegate_to_core!();

    fn initialize(&mut self, url: &Url, logger: Arc<dyn StdLogger>) -> NotifyResult<()> {
        self.core.initialize_local(url, logger)
    }

    async fn send(&self, message: &str, params: Option<&Params>) -> NotifyResult<()> {
        self.core.config()?;
        require_message(SCHEME, message)?;
        let standard = &self.core.standard;
        if !standard.has_template(MESSAGE_TEMPLATE) {
            standard.log(message);
            return Ok(());
        }

        let mut data: BTreeMap<&str, &str> = params
            .into_iter()
            .flatten()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        data.insert(MESSAGE_KEY, message);
        standard.log(&standard.render(MESSAGE_TEMPLATE, &data)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NotifyError;
    use crate::transport::RecordingTransport;
    use crate::types::logger::capture::CaptureLogger;

    fn service(logger: Arc<CaptureLogger>) -> LoggerService {
        let mut service = LoggerService::new();
        service.set_transport(Arc::new(RecordingTransport::new()));
        service
            .initialize(&Url::parse("logger://").unwrap(), logger)
            .unwrap();
        service
    }

    #[tokio::test]
    async fn test_logs_plain_message() {
        let logger = Arc::new(CaptureLogger::default());
        let service = service(logger.clone());
        service.send("hello", None).await.unwrap();
        assert_eq!(logger.lines(), vec!["hello"]);
        assert_eq!(service.config_url().unwrap().as_str(), "logger://");
    }

    #[tokio::test]
    async fn test_message_template_sees_params() {
        let logger = Arc::new(CaptureLogger::default());
        let mut service = service(logger.clone());
        service
            .set_template_string(MESSAGE_TEMPLATE, "[{{level}}] {{message}}")
            .unwrap();
        let params = Params::new().with("level", "warn");
        service.send("disk low", Some(&params)).await.unwrap();
        assert_eq!(logger.lines(), vec!["[warn] disk low"]);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let logger = Arc::new(CaptureLogger::default());
        let service = service(logger.clone());
        let err = service.send("", None).await.unwrap_err();
        assert!(matches!(err, NotifyError::Validation { .. }));
        assert!(logger.lines().is_empty());
    }

    #[test]
    fn test_initialize_rejects_query_keys() {
        let mut service = LoggerService::new();
        let err = service
            .initialize(
                &Url::parse("logger://?doesnotexist=1").unwrap(),
                Arc::new(CaptureLogger::default()),
            )
            .unwrap_err();
        assert!(err.is_config_error());
        assert!(service.config_url().is_err());
    }

    #[tokio::test]
    async fn test_initialize_builds_no_http_client() {
        let logger = Arc::new(CaptureLogger::default());
        let mut service = LoggerService::new();
        service
            .initialize(&Url::parse("logger://").unwrap(), logger.clone())
            .unwrap();
        assert!(service.core.transport().is_err());
        service.send("no network", None).await.unwrap();
        assert_eq!(logger.lines(), vec!["no network"]);
    }
}
