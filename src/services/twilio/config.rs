use once_cell::sync::Lazy;
use url::Url;

use crate::errors::{NotifyError, NotifyResult};
use crate::format::{
    apply_query, build_query, decode_component, set_config_props_from_query, ConfigField,
    ConfigFields, UrlPart,
};
use crate::services::{base_url, ServiceConfig};

pub const SCHEME: &str = "twilio";

/// Senders with this prefix are Messaging Service SIDs rather than phone numbers
pub const MESSAGING_SERVICE_PREFIX: &str = "MG";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub to_numbers: Vec<String>,
    pub title: String,
}

impl TwilioConfig {
    pub fn uses_messaging_service(&self) -> bool {
        self.from_number.starts_with(MESSAGING_SERVICE_PREFIX)
    }

    fn validate(&self) -> NotifyResult<()> {
        if self.account_sid.is_empty() {
            return Err(NotifyError::config("account SID missing from config URL"));
        }
        if self.auth_token.is_empty() {
            return Err(NotifyError::config("auth token missing from config URL"));
        }
        if self.from_number.is_empty() {
            return Err(NotifyError::config(
                "from number or messaging service SID missing from config URL",
            ));
        }
        if self.to_numbers.is_empty() {
            return Err(NotifyError::config(
                "recipient phone number(s) missing from config URL",
            ));
        }
        // Twilio rejects messages where To == From
        if !self.uses_messaging_service() && self.to_numbers.contains(&self.from_number) {
            return Err(NotifyError::config(
                "to and from phone numbers must not be the same",
            ));
        }
        Ok(())
    }
}

/// Strip the formatting characters people commonly put in phone numbers
pub fn normalize_phone_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect()
}

type F = ConfigField<TwilioConfig>;

static FIELDS: Lazy<Vec<F>> = Lazy::new(|| {
    vec![
        F::text("AccountSID", |c| c.account_sid.clone(), |c, v| c.account_sid = v)
            .url(UrlPart::User)
            .describe("Twilio Account SID")
            .required(),
        F::text("AuthToken", |c| c.auth_token.clone(), |c, v| c.auth_token = v)
            .url(UrlPart::Password)
            .describe("Twilio Auth Token")
            .required(),
        F::text("FromNumber", |c| c.from_number.clone(), |c, v| c.from_number = v)
            .url(UrlPart::Host)
            .describe("Sender phone number or Messaging Service SID")
            .required(),
        F::list("ToNumbers", '/', |c| c.to_numbers.clone(), |c, v| c.to_numbers = v)
            .url(UrlPart::Path)
            .describe("Recipient phone number(s)")
            .required(),
        F::text("Title", |c| c.title.clone(), |c, v| c.title = v)
            .keys(&["title"])
            .default_value("")
            .describe("Notification title"),
    ]
});

impl ConfigFields for TwilioConfig {
    fn fields() -> &'static [ConfigField<Self>] {
        &FIELDS
    }
}

impl ServiceConfig for TwilioConfig {
    const SCHEME: &'static str = SCHEME;

    fn get_url(&self) -> NotifyResult<Url> {
        let mut url = base_url(SCHEME, &self.from_number)?;
        url.set_username(&self.account_sid)
            .and_then(|_| url.set_password(Some(&self.auth_token)))
            .map_err(|_| NotifyError::config("cannot set credentials on config URL"))?;
        url.set_path(&format!("/{}", self.to_numbers.join("/")));
        apply_query(&mut url, &build_query(self)?);
        Ok(url)
    }

    fn set_url(&mut self, url: &Url) -> NotifyResult<()> {
        self.account_sid = decode_component(url.username());
        self.auth_token = url.password().map(decode_component).unwrap_or_default();
        self.from_number =
            normalize_phone_number(&decode_component(url.host_str().unwrap_or_default()));
        self.to_numbers = url
            .path()
            .split('/')
            .map(|p| normalize_phone_number(decode_component(p).trim()))
            .filter(|p| !p.is_empty())
            .collect();

        set_config_props_from_query(self, url, &[])?;
        self.validate()
    }
}
