use once_cell::sync::Lazy;
use url::Url;

use crate::errors::{NotifyError, NotifyResult};
use crate::format::{
    apply_query, build_query, decode_component, set_config_props_from_query, ConfigField,
    ConfigFields, ConfigQueryResolver, UrlPart,
};
use crate::services::{base_url, ServiceConfig};
use crate::types::MessageLevel;

pub const SCHEME: &str = "discord";

const RAW_PATH: &str = "/raw";

/// Settings for a Discord webhook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscordConfig {
    pub webhook_id: String,
    pub token: String,
    pub title: String,
    pub username: String,
    pub avatar: String,
    pub color: u32,
    pub color_error: u32,
    pub color_warn: u32,
    pub color_info: u32,
    pub color_debug: u32,
    pub split_lines: bool,
    pub json: bool,
}

impl DiscordConfig {
    pub fn new(webhook_id: impl Into<String>, token: impl Into<String>) -> NotifyResult<Self> {
        let mut config = Self::default();
        config.set_default_props()?;
        config.webhook_id = webhook_id.into();
        config.token = token.into();
        Ok(config)
    }

    /// Embed colour for each message level, indexed by `MessageLevel::index`
    pub fn level_colors(&self) -> [u32; MessageLevel::COUNT] {
        [
            self.color,
            self.color_error,
            self.color_warn,
            self.color_info,
            self.color_debug,
        ]
    }
}

type F = ConfigField<DiscordConfig>;

// Colors are stored as u32; the field layer range-checks before narrowing.
const COLOR_MAX: u64 = u32::MAX as u64;

static FIELDS: Lazy<Vec<F>> = Lazy::new(|| {
    vec![
        F::text("WebhookID", |c| c.webhook_id.clone(), |c, v| c.webhook_id = v)
            .url(UrlPart::Host)
            .describe("Webhook ID")
            .required(),
        F::text("Token", |c| c.token.clone(), |c, v| c.token = v)
            .url(UrlPart::User)
            .describe("Webhook token")
            .required(),
        F::text("Title", |c| c.title.clone(), |c, v| c.title = v)
            .keys(&["title"])
            .default_value(""),
        F::text("Username", |c| c.username.clone(), |c, v| c.username = v)
            .keys(&["username"])
            .default_value("")
            .describe("Override the webhook default username"),
        F::text("Avatar", |c| c.avatar.clone(), |c, v| c.avatar = v)
            .keys(&["avatar", "avatarurl"])
            .default_value("")
            .describe("Override the webhook default avatar with specified URL"),
        F::unsigned("Color", |c| u64::from(c.color), |c, v| c.color = v as u32)
            .keys(&["color"])
            .base(16)
            .max(COLOR_MAX)
            .default_value("0x50D9ff")
            .describe("The color of the left border for plain messages"),
        F::unsigned("ColorError", |c| u64::from(c.color_error), |c, v| c.color_error = v as u32)
            .keys(&["colorError"])
            .base(16)
            .max(COLOR_MAX)
            .default_value("0xd60510")
            .describe("The color of the left border for error messages"),
        F::unsigned("ColorWarn", |c| u64::from(c.color_warn), |c, v| c.color_warn = v as u32)
            .keys(&["colorWarn"])
            .base(16)
            .max(COLOR_MAX)
            .default_value("0xffc441")
            .describe("The color of the left border for warning messages"),
        F::unsigned("ColorInfo", |c| u64::from(c.color_info), |c, v| c.color_info = v as u32)
            .keys(&["colorInfo"])
            .base(16)
            .max(COLOR_MAX)
            .default_value("0x2488ff")
            .describe("The color of the left border for info messages"),
        F::unsigned("ColorDebug", |c| u64::from(c.color_debug), |c, v| c.color_debug = v as u32)
            .keys(&["colorDebug"])
            .base(16)
            .max(COLOR_MAX)
            .default_value("0x7b00ab")
            .describe("The color of the left border for debug messages"),
        F::flag("SplitLines", |c| c.split_lines, |c, v| c.split_lines = v)
            .keys(&["splitLines"])
            .default_value("Yes")
            .describe("Whether to send each line as a separate embedded item"),
        F::flag("JSON", |c| c.json, |c, v| c.json = v)
            .keys(&["json"])
            .url(UrlPart::Path)
            .default_value("No")
            .describe("Whether to send the whole message as the JSON payload"),
    ]
});

impl ConfigFields for DiscordConfig {
    fn fields() -> &'static [ConfigField<Self>] {
        &FIELDS
    }
}

impl ServiceConfig for DiscordConfig {
    const SCHEME: &'static str = SCHEME;

    fn get_url(&self) -> NotifyResult<Url> {
        let mut url = base_url(SCHEME, &self.webhook_id)?;
        url.set_username(&self.token)
            .map_err(|_| NotifyError::config("webhook ID missing from config"))?;
        if self.json {
            url.set_path(RAW_PATH);
        }
        apply_query(&mut url, &build_query(self)?);
        Ok(url)
    }

    fn set_url(&mut self, url: &Url) -> NotifyResult<()> {
        self.webhook_id = url.host_str().unwrap_or_default().to_string();
        self.token = decode_component(url.username());

        match url.path() {
            "" | "/" => {}
            RAW_PATH => self.json = true,
            _ => return Err(NotifyError::config("illegal argument in config URL")),
        }
        if self.webhook_id.is_empty() {
            return Err(NotifyError::config("webhook ID missing from config URL"));
        }
        if self.token.is_empty() {
            return Err(NotifyError::config("token missing from config URL"));
        }

        set_config_props_from_query(self, url, &[])?;
        Ok(())
    }
}
