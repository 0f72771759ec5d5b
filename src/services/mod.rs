//! Service contracts and backend implementations
//!
//! A backend is a `ServiceConfig` (typed settings that marshal to and from a
//! URL) plus a `Service` (holds one config and performs the delivery). The
//! shared lifecycle lives in `ServiceCore` so backends only write their
//! URL mapping and their payload code.

/// Trait methods every backend forwards to its `core: ServiceCore<_>` field
macro_rules! delegate_to_core {
    () => {
        fn id(&self) -> &'static str {
            self.core.scheme()
        }

        fn set_transport(
            &mut self,
            transport: ::std::sync::Arc<dyn $crate::transport::HttpTransport>,
        ) {
            self.core.set_transport(transport)
        }

        fn config_url(&self) -> $crate::errors::NotifyResult<::url::Url> {
            self.core.config_url()
        }

        fn standard(&self) -> &$crate::services::Standard {
            &self.core.standard
        }

        fn standard_mut(&mut self) -> &mut $crate::services::Standard {
            &mut self.core.standard
        }
    };
}

pub mod discord;
pub mod generic;
pub mod gotify;
pub mod logger;
pub mod ntfy;
pub mod pagerduty;
pub mod standard;
pub mod twilio;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::errors::{NotifyError, NotifyResult};
use crate::format::{ConfigFields, ConfigQueryResolver};
use crate::transport::{default_transport, HttpResponse, HttpTransport, TransportOptions};
use crate::types::{Params, StdLogger};

pub use standard::Standard;

/// Typed backend settings that marshal to and from a service URL
pub trait ServiceConfig: ConfigFields + Clone + Default + fmt::Debug + Send + Sync {
    /// Scheme this config is registered under
    const SCHEME: &'static str;

    fn get_url(&self) -> NotifyResult<Url>;

    /// Bind URL-structural parts and apply the query; validates immediately
    fn set_url(&mut self, url: &Url) -> NotifyResult<()>;

    /// Fresh config with defaults applied, then `set_url`
    fn from_url(url: &Url) -> NotifyResult<Self> {
        let mut config = Self::default();
        config.set_default_props()?;
        config.set_url(url)?;
        Ok(config)
    }
}

/// A notification backend
#[async_trait]
pub trait Service: Send + Sync {
    /// Scheme this service was registered under
    fn id(&self) -> &'static str;

    /// Parse `url` into the stored config; state is untouched on failure
    fn initialize(&mut self, url: &Url, logger: Arc<dyn StdLogger>) -> NotifyResult<()>;

    async fn send(&self, message: &str, params: Option<&Params>) -> NotifyResult<()>;

    /// Replace the HTTP transport; takes precedence over the default one
    fn set_transport(&mut self, transport: Arc<dyn HttpTransport>);

    /// URL form of the stored config
    fn config_url(&self) -> NotifyResult<Url>;

    fn standard(&self) -> &Standard;

    fn standard_mut(&mut self) -> &mut Standard;

    fn set_template_string(&mut self, id: &str, body: &str) -> NotifyResult<()> {
        self.standard_mut().set_template_string(id, body)
    }

    fn set_template_file(&mut self, id: &str, path: &Path) -> NotifyResult<()> {
        self.standard_mut().set_template_file(id, path)
    }
}

/// Lifecycle state shared by every backend
pub struct ServiceCore<C> {
    pub standard: Standard,
    config: Option<C>,
    transport: Option<Arc<dyn HttpTransport>>,
    injected: bool,
}

impl<C: ServiceConfig> ServiceCore<C> {
    pub fn new() -> Self {
        Self {
            standard: Standard::new(),
            config: None,
            transport: None,
            injected: false,
        }
    }

    /// Parse the config and, unless one was injected, build the HTTP client
    /// with the policy `options` derives from the parsed config
    pub fn initialize(
        &mut self,
        url: &Url,
        logger: Arc<dyn StdLogger>,
        options: impl FnOnce(&C) -> TransportOptions,
    ) -> NotifyResult<()> {
        let config = C::from_url(url)?;
        if !self.injected {
            self.transport = Some(Arc::new(default_transport(options(&config))?));
        }
        self.install(config, logger);
        Ok(())
    }

    /// Parse the config for a backend that never makes HTTP requests
    pub fn initialize_local(
        &mut self,
        url: &Url,
        logger: Arc<dyn StdLogger>,
    ) -> NotifyResult<()> {
        let config = C::from_url(url)?;
        self.install(config, logger);
        Ok(())
    }

    fn install(&mut self, config: C, logger: Arc<dyn StdLogger>) {
        self.standard.set_logger(logger);
        self.config = Some(config);
    }

    pub fn scheme(&self) -> &'static str {
        C::SCHEME
    }

    pub fn config(&self) -> NotifyResult<&C> {
        self.config
            .as_ref()
            .ok_or_else(|| NotifyError::not_initialized(C::SCHEME))
    }

    /// Private copy of the stored config with `params` applied
    pub fn effective_config(
        &self,
        params: Option<&Params>,
        passthrough: &[&str],
    ) -> NotifyResult<C> {
        let mut config = self.config()?.clone();
        if let Some(params) = params {
            apply_params(&mut config, params, passthrough)?;
        }
        Ok(config)
    }

    pub fn transport(&self) -> NotifyResult<Arc<dyn HttpTransport>> {
        self.transport
            .clone()
            .ok_or_else(|| NotifyError::not_initialized(C::SCHEME))
    }

    pub fn set_transport(&mut self, transport: Arc<dyn HttpTransport>) {
        self.transport = Some(transport);
        self.injected = true;
    }

    pub fn config_url(&self) -> NotifyResult<Url> {
        self.config()?.get_url()
    }
}

impl<C: ServiceConfig> Default for ServiceCore<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Overlay `params` onto `config`, rejecting keys that are neither config
/// keys nor listed in `passthrough`
pub fn apply_params<R: ConfigQueryResolver + ?Sized>(
    config: &mut R,
    params: &Params,
    passthrough: &[&str],
) -> NotifyResult<()> {
    for (key, value) in params {
        if passthrough.iter().any(|p| p.eq_ignore_ascii_case(key)) {
            continue;
        }
        config.set(key, value)?;
    }
    Ok(())
}

/// Parse `scheme://host` as the base for a config URL
pub fn base_url(scheme: &str, host: &str) -> NotifyResult<Url> {
    Ok(Url::parse(&format!("{scheme}://{host}"))?)
}

/// Map a non-2xx response to `NotifyError::Backend`
///
/// `decode` extracts the backend's structured error text; when it yields
/// nothing the raw body (or the reason phrase for an empty body) is used.
pub fn check_response(
    service: &str,
    response: &HttpResponse,
    decode: impl FnOnce(&HttpResponse) -> Option<String>,
) -> NotifyResult<()> {
    if response.is_success() {
        return Ok(());
    }
    let message = decode(response).unwrap_or_else(|| {
        let body = response.text();
        let body = body.trim();
        if body.is_empty() {
            response.reason()
        } else {
            body.chars().take(512).collect()
        }
    });
    Err(NotifyError::backend(service, response.status, message))
}

/// Fail with a validation error when the message is empty
pub fn require_message(service: &str, message: &str) -> NotifyResult<()> {
    if message.trim().is_empty() {
        return Err(NotifyError::validation(service, "message is empty"));
    }
    Ok(())
}
