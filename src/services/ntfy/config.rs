use once_cell::sync::Lazy;
use url::Url;

use crate::errors::{NotifyError, NotifyResult};
use crate::format::{
    apply_query, build_query, decode_component, set_config_props_from_query, ConfigField,
    ConfigFields, UrlPart,
};
use crate::services::{base_url, ServiceConfig};
use crate::types::EnumFormatter;

pub const SCHEME: &str = "ntfy";

pub const DEFAULT_HOST: &str = "ntfy.sh";

pub static PRIORITIES: EnumFormatter =
    EnumFormatter::new(&["Min", "Low", "Default", "High", "Max"])
        .starting_at(1)
        .with_aliases(&[("urgent", 5)]);

pub const DEFAULT_PRIORITY: i64 = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NtfyConfig {
    pub host: String,
    pub topic: String,
    pub username: String,
    pub password: String,
    pub title: String,
    pub scheme: String,
    pub tags: Vec<String>,
    pub priority: i64,
    pub actions: Vec<String>,
    pub click: String,
    pub attach: String,
    pub filename: String,
    pub delay: String,
    pub email: String,
    pub icon: String,
    pub cache: bool,
    pub firebase: bool,
    pub disable_tls_verification: bool,
}

type F = ConfigField<NtfyConfig>;

static FIELDS: Lazy<Vec<F>> = Lazy::new(|| {
    vec![
        F::text("Host", |c| c.host.clone(), |c, v| c.host = v)
            .url(UrlPart::Host)
            .default_value(DEFAULT_HOST)
            .describe("Server hostname and port"),
        F::text("Topic", |c| c.topic.clone(), |c, v| c.topic = v)
            .url(UrlPart::Path)
            .describe("Target topic name")
            .required(),
        F::text("Username", |c| c.username.clone(), |c, v| c.username = v)
            .url(UrlPart::User)
            .describe("Auth username"),
        F::text("Password", |c| c.password.clone(), |c, v| c.password = v)
            .url(UrlPart::Password)
            .describe("Auth password"),
        F::text("Title", |c| c.title.clone(), |c, v| c.title = v)
            .keys(&["title"])
            .default_value(""),
        F::text("Scheme", |c| c.scheme.clone(), |c, v| c.scheme = v)
            .keys(&["scheme"])
            .default_value("https")
            .describe("Server protocol, http or https"),
        F::list("Tags", ',', |c| c.tags.clone(), |c, v| c.tags = v)
            .keys(&["tags"])
            .describe("List of tags that may or may not map to emojis"),
        F::enumeration("Priority", &PRIORITIES, |c| c.priority, |c, v| c.priority = v)
            .keys(&["priority"])
            .default_value("Default")
            .describe("Message priority with 1=min, 3=default and 5=max"),
        F::list("Actions", ';', |c| c.actions.clone(), |c, v| c.actions = v)
            .keys(&["actions"])
            .describe("Custom user action buttons for notifications"),
        F::text("Click", |c| c.click.clone(), |c, v| c.click = v)
            .keys(&["click"])
            .describe("Website opened when notification is clicked"),
        F::text("Attach", |c| c.attach.clone(), |c, v| c.attach = v)
            .keys(&["attach"])
            .describe("URL of an attachment"),
        F::text("Filename", |c| c.filename.clone(), |c, v| c.filename = v)
            .keys(&["filename"])
            .describe("File name of the attachment"),
        F::text("Delay", |c| c.delay.clone(), |c, v| c.delay = v)
            .keys(&["delay", "at", "in"])
            .describe("Timestamp or duration for delayed delivery"),
        F::text("Email", |c| c.email.clone(), |c, v| c.email = v)
            .keys(&["email"])
            .describe("E-mail address for e-mail notifications"),
        F::text("Icon", |c| c.icon.clone(), |c, v| c.icon = v)
            .keys(&["icon"])
            .describe("URL to use as notification icon"),
        F::flag("Cache", |c| c.cache, |c, v| c.cache = v)
            .keys(&["cache"])
            .default_value("Yes")
            .describe("Cache messages"),
        F::flag("Firebase", |c| c.firebase, |c, v| c.firebase = v)
            .keys(&["firebase"])
            .default_value("Yes")
            .describe("Send to firebase"),
        F::flag(
            "DisableTLSVerification",
            |c| c.disable_tls_verification,
            |c, v| c.disable_tls_verification = v,
        )
        .keys(&["disabletls"])
        .default_value("No")
        .describe("Disable TLS certificate verification"),
    ]
});

impl ConfigFields for NtfyConfig {
    fn fields() -> &'static [ConfigField<Self>] {
        &FIELDS
    }
}

impl ServiceConfig for NtfyConfig {
    const SCHEME: &'static str = SCHEME;

    fn get_url(&self) -> NotifyResult<Url> {
        let mut url = base_url(SCHEME, &self.host)?;
        if !self.username.is_empty() {
            url.set_username(&self.username)
                .map_err(|_| NotifyError::config("cannot set username on config URL"))?;
            if !self.password.is_empty() {
                url.set_password(Some(&self.password))
                    .map_err(|_| NotifyError::config("cannot set password on config URL"))?;
            }
        }
        url.set_path(&format!("/{}", self.topic));
        apply_query(&mut url, &build_query(self)?);
        Ok(url)
    }

    fn set_url(&mut self, url: &Url) -> NotifyResult<()> {
        let host = url.host_str().unwrap_or_default();
        self.host = match (host, url.port()) {
            ("", _) => DEFAULT_HOST.to_string(),
            (host, Some(port)) => format!("{host}:{port}"),
            (host, None) => host.to_string(),
        };
        self.username = decode_component(url.username());
        self.password = url.password().map(decode_component).unwrap_or_default();
        self.topic = decode_component(url.path().trim_matches('/'));

        if self.topic.is_empty() {
            return Err(NotifyError::config("topic missing from config URL"));
        }

        set_config_props_from_query(self, url, &[])?;

        if !matches!(self.scheme.as_str(), "http" | "https") {
            return Err(NotifyError::invalid_value(
                "scheme",
                self.scheme.clone(),
                "expected http or https",
            ));
        }
        Ok(())
    }
}
