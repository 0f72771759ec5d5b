//! Scheme-based dispatch across a set of configured services

pub mod registry;

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};
use url::Url;

use crate::errors::{NotifyError, NotifyResult};
use crate::services::generic::GenericConfig;
use crate::services::{Service, ServiceConfig};
use crate::transport::HttpTransport;
use crate::types::{Params, StdLogger};

pub use registry::{lookup, schemes, ServiceEntry};

const GENERIC_PREFIX: &str = "generic+";

/// Holds one initialized service per URL and fans messages out to all of them
pub struct ServiceRouter {
    services: Vec<Arc<dyn Service>>,
    logger: Arc<dyn StdLogger>,
    transport: Option<Arc<dyn HttpTransport>>,
    queue: Mutex<Vec<String>>,
}

impl ServiceRouter {
    /// Resolve every URL; fails without a partial router if any one fails
    pub fn new<S: AsRef<str>>(logger: Arc<dyn StdLogger>, urls: &[S]) -> NotifyResult<Self> {
        Self::build(logger, None, urls)
    }

    /// Like `new`, with `transport` injected into every service before initialization
    pub fn with_transport<S: AsRef<str>>(
        logger: Arc<dyn StdLogger>,
        transport: Arc<dyn HttpTransport>,
        urls: &[S],
    ) -> NotifyResult<Self> {
        Self::build(logger, Some(transport), urls)
    }

    fn build<S: AsRef<str>>(
        logger: Arc<dyn StdLogger>,
        transport: Option<Arc<dyn HttpTransport>>,
        urls: &[S],
    ) -> NotifyResult<Self> {
        let services = urls
            .iter()
            .map(|url| {
                resolve(url.as_ref(), Arc::clone(&logger), transport.clone()).map(Arc::from)
            })
            .collect::<NotifyResult<Vec<Arc<dyn Service>>>>()?;

        debug!(count = services.len(), "router initialized");
        Ok(Self {
            services,
            logger,
            transport,
            queue: Mutex::new(Vec::new()),
        })
    }

    /// Resolve a single URL with this router's logger and transport, without adding it
    pub fn locate(&self, url: &str) -> NotifyResult<Box<dyn Service>> {
        resolve(url, Arc::clone(&self.logger), self.transport.clone())
    }

    /// Send to every service concurrently
    ///
    /// The result at index `i` belongs to the service built from URL `i`.
    /// Every service is attempted regardless of the others' outcome.
    pub async fn send(&self, message: &str, params: Option<&Params>) -> Vec<NotifyResult<()>> {
        let handles: Vec<_> = self
            .services
            .iter()
            .map(|service| {
                let service = Arc::clone(service);
                let message = message.to_string();
                let params = params.cloned();
                tokio::spawn(async move { service.send(&message, params.as_ref()).await })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            let result = handle.await.unwrap_or_else(|e| {
                Err(NotifyError::internal_with_source(
                    "notification task failed",
                    e,
                ))
            });
            if let Err(e) = &result {
                warn!(
                    service = self.services[index].id(),
                    index,
                    category = e.category(),
                    error = %e,
                    "notification failed"
                );
            }
            results.push(result);
        }
        results
    }

    /// Queue a message for a later `flush`
    pub fn enqueue(&self, message: impl Into<String>) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push(message.into());
        }
    }

    /// Send every queued message as one newline-joined message and clear the queue
    ///
    /// Returns no results when nothing was queued.
    pub async fn flush(&self, params: Option<&Params>) -> Vec<NotifyResult<()>> {
        let pending = match self.queue.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => return vec![Err(NotifyError::internal("message queue is poisoned"))],
        };
        if pending.is_empty() {
            return Vec::new();
        }
        self.send(&pending.join("\n"), params).await
    }

    /// Scheme ids of the held services, in URL order
    pub fn services(&self) -> Vec<&'static str> {
        self.services.iter().map(|s| s.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Resolve a single URL into an initialized service
pub fn locate(url: &str, logger: Arc<dyn StdLogger>) -> NotifyResult<Box<dyn Service>> {
    resolve(url, logger, None)
}

fn resolve(
    raw: &str,
    logger: Arc<dyn StdLogger>,
    transport: Option<Arc<dyn HttpTransport>>,
) -> NotifyResult<Box<dyn Service>> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| NotifyError::config_with_source(format!("invalid service URL '{raw}'"), e))?;

    // generic+https://host/path is shorthand for a plain webhook URL
    if url.scheme().starts_with(GENERIC_PREFIX) {
        url = GenericConfig::from_webhook_url(&url)?.get_url()?;
    }

    let entry = lookup(url.scheme()).ok_or_else(|| NotifyError::UnknownScheme {
        scheme: url.scheme().to_string(),
    })?;

    let mut service = (entry.create)();
    if let Some(transport) = transport {
        service.set_transport(transport);
    }
    service.initialize(&url, logger)?;
    Ok(service)
}
