use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::errors::{NotifyError, NotifyResult};

/// Per-service HTTP client policy
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl TransportOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            accept_invalid_certs: false,
        }
    }
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(options: TransportOptions) -> NotifyResult<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .user_agent(concat!("notify-router/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NotifyError::internal_with_source("Failed to create HTTP client", e))?;
        Ok(Self { client })
    }

    fn header_map(request: &HttpRequest) -> NotifyResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                NotifyError::config_with_source(format!("invalid header name '{name}'"), e)
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                NotifyError::config_with_source(format!("invalid value for header '{name}'"), e)
            })?;
            headers.append(name, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> NotifyResult<HttpResponse> {
        let method = Method::from_bytes(request.method.as_bytes()).map_err(|e| {
            NotifyError::config_with_source(format!("invalid HTTP method '{}'", request.method), e)
        })?;
        let headers = Self::header_map(&request)?;

        tracing::debug!(method = %method, url = %request.url, "sending request");
        let response = self
            .client
            .request(method, request.url)
            .headers(headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportErrorKind;
    use url::Url;

    #[test]
    fn test_client_creation() {
        assert!(ReqwestTransport::new(TransportOptions::default()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport = ReqwestTransport::new(TransportOptions {
            timeout: Duration::from_secs(2),
            accept_invalid_certs: false,
        })
        .unwrap();
        let request = HttpRequest::post(Url::parse("http://127.0.0.1:1/").unwrap());
        match transport.execute(request).await {
            Err(NotifyError::Transport { kind, .. }) => {
                assert!(matches!(kind, TransportErrorKind::Connect | TransportErrorKind::Other))
            }
            other => panic!("expected transport error, got {:?}", other.map(|r| r.status)),
        }
    }

    #[tokio::test]
    async fn test_invalid_header_rejected_before_sending() {
        let transport = ReqwestTransport::new(TransportOptions::default()).unwrap();
        let request = HttpRequest::post(Url::parse("http://127.0.0.1:1/").unwrap())
            .header("X-Bad", "line\nbreak");
        let err = transport.execute(request).await.unwrap_err();
        assert!(err.is_config_error());
    }
}
