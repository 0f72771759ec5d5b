use once_cell::sync::Lazy;
use url::Url;

use crate::errors::{NotifyError, NotifyResult};
use crate::format::{
    apply_query, build_query, decode_component, set_config_props_from_query, ConfigField,
    ConfigFields, UrlPart,
};
use crate::services::{base_url, ServiceConfig};

pub const SCHEME: &str = "gotify";

const TOKEN_LENGTH: usize = 15;
const TOKEN_PREFIX: char = 'A';

/// Settings for a Gotify server application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GotifyConfig {
    /// Host with optional `:port`
    pub host: String,
    /// Path prefix in front of the token, empty or starting with `/`
    pub path: String,
    pub token: String,
    pub priority: i64,
    pub title: String,
    pub disable_tls: bool,
    pub use_header: bool,
    pub insecure_skip_verify: bool,
}

impl GotifyConfig {
    /// `http` when TLS is disabled, `https` otherwise
    pub fn api_scheme(&self) -> &'static str {
        if self.disable_tls {
            "http"
        } else {
            "https"
        }
    }
}

/// Application tokens are 15 characters, start with `A` and use a URL-safe alphabet
pub fn is_token_valid(token: &str) -> bool {
    token.len() == TOKEN_LENGTH
        && token.starts_with(TOKEN_PREFIX)
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

type F = ConfigField<GotifyConfig>;

static FIELDS: Lazy<Vec<F>> = Lazy::new(|| {
    vec![
        F::text("Host", |c| c.host.clone(), |c, v| c.host = v)
            .url(UrlPart::Host)
            .describe("Server hostname (and optionally port)")
            .required(),
        F::text("Path", |c| c.path.clone(), |c, v| c.path = v)
            .url(UrlPart::Path)
            .describe("Server subpath"),
        F::text("Token", |c| c.token.clone(), |c, v| c.token = v)
            .url(UrlPart::Path)
            .describe("Application token")
            .required(),
        F::signed("Priority", |c| c.priority, |c, v| c.priority = v)
            .keys(&["priority"])
            .range(-2, 10)
            .default_value("0"),
        F::text("Title", |c| c.title.clone(), |c, v| c.title = v)
            .keys(&["title"])
            .default_value("Gotify notification"),
        F::flag("DisableTLS", |c| c.disable_tls, |c, v| c.disable_tls = v)
            .keys(&["disabletls"])
            .default_value("No"),
        F::flag("UseHeader", |c| c.use_header, |c, v| c.use_header = v)
            .keys(&["useheader"])
            .default_value("No")
            .describe("Enable sending the token in the X-Gotify-Key header"),
        F::flag(
            "InsecureSkipVerify",
            |c| c.insecure_skip_verify,
            |c, v| c.insecure_skip_verify = v,
        )
        .keys(&["insecureskipverify"])
        .default_value("No")
        .describe("Skip TLS certificate verification"),
    ]
});

impl ConfigFields for GotifyConfig {
    fn fields() -> &'static [ConfigField<Self>] {
        &FIELDS
    }
}

impl ServiceConfig for GotifyConfig {
    const SCHEME: &'static str = SCHEME;

    fn get_url(&self) -> NotifyResult<Url> {
        let mut url = base_url(SCHEME, &self.host)?;
        url.set_path(&format!("{}/{}", self.path, self.token));
        apply_query(&mut url, &build_query(self)?);
        Ok(url)
    }

    fn set_url(&mut self, url: &Url) -> NotifyResult<()> {
        let host = url.host_str().unwrap_or_default();
        if host.is_empty() {
            return Err(NotifyError::config("host missing from config URL"));
        }
        self.host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        let mut segments: Vec<String> = url
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode_component)
            .collect();
        self.token = segments.pop().unwrap_or_default();
        self.path = segments.iter().map(|s| format!("/{s}")).collect();

        if self.token.is_empty() {
            return Err(NotifyError::config("token missing from config URL"));
        }
        if !is_token_valid(&self.token) {
            return Err(NotifyError::config(format!(
                "invalid gotify token '{}'",
                self.token
            )));
        }

        set_config_props_from_query(self, url, &[])?;
        Ok(())
    }
}
