use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use url::{form_urlencoded, Url};

use crate::errors::{NotifyError, NotifyResult};
use crate::format::{
    apply_query, build_query_with_custom_fields, decode_component, query_pairs, unescape_key,
    ConfigField, ConfigFields, ConfigQueryResolver, UrlPart,
};
use crate::services::{base_url, ServiceConfig};

pub const SCHEME: &str = "generic";

/// Query keys starting with this become request headers
pub const HEADER_PREFIX: char = '@';
/// Query keys starting with this become extra payload fields
pub const EXTRA_PREFIX: char = '$';

/// Settings for posting to an arbitrary webhook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericConfig {
    /// Webhook host with optional `:port`
    pub host: String,
    pub path: String,
    /// Query pairs forwarded to the webhook as-is
    pub custom_query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub extra_data: BTreeMap<String, String>,
    pub content_type: String,
    pub disable_tls: bool,
    pub template: String,
    pub title: String,
    pub title_key: String,
    pub message_key: String,
    pub method: String,
}

impl GenericConfig {
    /// The URL requests are actually sent to
    pub fn webhook_url(&self) -> NotifyResult<Url> {
        let scheme = if self.disable_tls { "http" } else { "https" };
        let mut url = Url::parse(&format!("{scheme}://{}", self.host))?;
        url.set_path(&self.path);
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.custom_query)
            .finish();
        apply_query(&mut url, &query);
        Ok(url)
    }

    /// Build the service config from a plain webhook URL
    ///
    /// Accepts `https://...`, `http://...` (which disables TLS) and the
    /// `generic+https://...` form.
    pub fn from_webhook_url(webhook: &Url) -> NotifyResult<Self> {
        let scheme = webhook
            .scheme()
            .strip_prefix("generic+")
            .unwrap_or(webhook.scheme());
        if !matches!(scheme, "http" | "https") {
            return Err(NotifyError::config(format!(
                "unsupported webhook scheme '{scheme}'"
            )));
        }

        let mut config = Self::default();
        config.set_default_props()?;
        config.set_url(webhook)?;
        config.disable_tls = scheme == "http";
        Ok(config)
    }
}

/// `contentType` becomes `Content-Type`, `x-api-key` becomes `X-Api-Key`
pub fn normalized_header_key(key: &str) -> String {
    let mut normalized = String::with_capacity(key.len() * 2);
    let mut previous: Option<char> = None;
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if previous.is_some_and(|p| p != '-') {
                normalized.push('-');
            }
            normalized.push(c);
        } else if previous.map_or(true, |p| p == '-') {
            normalized.push(c.to_ascii_uppercase());
        } else {
            normalized.push(c);
        }
        previous = Some(c);
    }
    normalized
}

type F = ConfigField<GenericConfig>;

static FIELDS: Lazy<Vec<F>> = Lazy::new(|| {
    vec![
        F::text("Host", |c| c.host.clone(), |c, v| c.host = v)
            .url(UrlPart::Host)
            .describe("Webhook host and port")
            .required(),
        F::text("Path", |c| c.path.clone(), |c, v| c.path = v)
            .url(UrlPart::Path)
            .describe("Webhook path"),
        F::text("ContentType", |c| c.content_type.clone(), |c, v| c.content_type = v)
            .keys(&["contenttype"])
            .default_value("application/json")
            .describe("The value of the Content-Type header for templated payloads"),
        F::flag("DisableTLS", |c| c.disable_tls, |c, v| c.disable_tls = v)
            .keys(&["disabletls"])
            .default_value("No"),
        F::text("Template", |c| c.template.clone(), |c, v| c.template = v)
            .keys(&["template"])
            .describe("The template used for creating the request payload"),
        F::text("Title", |c| c.title.clone(), |c, v| c.title = v)
            .keys(&["title"])
            .default_value(""),
        F::text("TitleKey", |c| c.title_key.clone(), |c, v| c.title_key = v)
            .keys(&["titlekey"])
            .default_value("title")
            .describe("The key that will be used for the title value"),
        F::text("MessageKey", |c| c.message_key.clone(), |c, v| c.message_key = v)
            .keys(&["messagekey"])
            .default_value("message")
            .describe("The key that will be used for the message value"),
        F::text("RequestMethod", |c| c.method.clone(), |c, v| c.method = v)
            .keys(&["method"])
            .default_value("POST"),
    ]
});

impl ConfigFields for GenericConfig {
    fn fields() -> &'static [ConfigField<Self>] {
        &FIELDS
    }
}

impl ServiceConfig for GenericConfig {
    const SCHEME: &'static str = SCHEME;

    fn get_url(&self) -> NotifyResult<Url> {
        let mut url = base_url(SCHEME, &self.host)?;
        url.set_path(&self.path);

        let mut query = form_urlencoded::Serializer::new(build_query_with_custom_fields(
            self,
            &self.custom_query,
        )?);
        for (key, value) in &self.headers {
            query.append_pair(&format!("{HEADER_PREFIX}{key}"), value);
        }
        for (key, value) in &self.extra_data {
            query.append_pair(&format!("{EXTRA_PREFIX}{key}"), value);
        }
        apply_query(&mut url, &query.finish());
        Ok(url)
    }

    fn set_url(&mut self, url: &Url) -> NotifyResult<()> {
        let host = url.host_str().unwrap_or_default();
        if host.is_empty() {
            return Err(NotifyError::config("webhook host missing from config URL"));
        }
        self.host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        self.path = decode_component(url.path());

        self.custom_query.clear();
        self.headers.clear();
        self.extra_data.clear();
        for (key, value) in query_pairs(url) {
            let mut chars = key.chars();
            match (chars.next(), chars.as_str()) {
                (Some(HEADER_PREFIX), rest) if !rest.is_empty() => {
                    self.headers.insert(normalized_header_key(rest), value);
                }
                (Some(EXTRA_PREFIX), rest) if !rest.is_empty() => {
                    self.extra_data.insert(rest.to_string(), value);
                }
                _ if self.has_key(&key) => self.set(&key, &value)?,
                _ => self.custom_query.push((unescape_key(&key).to_string(), value)),
            }
        }
        Ok(())
    }
}
