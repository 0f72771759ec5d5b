use once_cell::sync::Lazy;
use url::Url;

use crate::errors::NotifyResult;
use crate::format::{set_config_props_from_query, ConfigField, ConfigFields};
use crate::services::{base_url, ServiceConfig};

pub const SCHEME: &str = "logger";

/// The logger backend has no settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggerConfig;

static FIELDS: Lazy<Vec<ConfigField<LoggerConfig>>> = Lazy::new(Vec::new);

impl ConfigFields for LoggerConfig {
    fn fields() -> &'static [ConfigField<Self>] {
        &FIELDS
    }
}

impl ServiceConfig for LoggerConfig {
    const SCHEME: &'static str = SCHEME;

    fn get_url(&self) -> NotifyResult<Url> {
        base_url(SCHEME, "")
    }

    fn set_url(&mut self, url: &Url) -> NotifyResult<()> {
        // No fields, so any query key is unknown
        set_config_props_from_query(self, url, &[])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NotifyError;

    #[test]
    fn test_query_keys_are_rejected() {
        let url = Url::parse("logger://?nope=1").unwrap();
        match LoggerConfig::from_url(&url) {
            Err(NotifyError::UnknownKey { key }) => assert_eq!(key, "nope"),
            other => panic!("expected unknown key, got {other:?}"),
        }
        assert!(LoggerConfig::from_url(&Url::parse("logger://").unwrap()).is_ok());
    }
}
