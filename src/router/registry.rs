//! Immutable scheme table, populated on first use

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::format::render_markdown;
use crate::services::discord::{DiscordConfig, DiscordService};
use crate::services::generic::{GenericConfig, GenericService};
use crate::services::gotify::{GotifyConfig, GotifyService};
use crate::services::logger::{LoggerConfig, LoggerService};
use crate::services::ntfy::{NtfyConfig, NtfyService};
use crate::services::pagerduty::{PagerDutyConfig, PagerDutyService};
use crate::services::twilio::{TwilioConfig, TwilioService};
use crate::services::{discord, generic, gotify, logger, ntfy, pagerduty, twilio, Service};

/// Constructor and field docs for one scheme
#[derive(Clone, Copy)]
pub struct ServiceEntry {
    pub create: fn() -> Box<dyn Service>,
    pub docs: fn() -> String,
}

macro_rules! entry {
    ($scheme:path, $service:ty, $config:ty) => {
        (
            $scheme,
            ServiceEntry {
                create: || Box::new(<$service>::new()),
                docs: || render_markdown::<$config>($scheme),
            },
        )
    };
}

static REGISTRY: Lazy<BTreeMap<&'static str, ServiceEntry>> = Lazy::new(|| {
    BTreeMap::from([
        entry!(discord::SCHEME, DiscordService, DiscordConfig),
        entry!(generic::SCHEME, GenericService, GenericConfig),
        entry!(gotify::SCHEME, GotifyService, GotifyConfig),
        entry!(logger::SCHEME, LoggerService, LoggerConfig),
        entry!(ntfy::SCHEME, NtfyService, NtfyConfig),
        entry!(pagerduty::SCHEME, PagerDutyService, PagerDutyConfig),
        entry!(twilio::SCHEME, TwilioService, TwilioConfig),
    ])
});

/// Case-insensitive scheme lookup
pub fn lookup(scheme: &str) -> Option<ServiceEntry> {
    REGISTRY.get(scheme.to_ascii_lowercase().as_str()).copied()
}

/// Registered schemes in sorted order
pub fn schemes() -> Vec<&'static str> {
    REGISTRY.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_scheme_constructs_matching_service() {
        for scheme in schemes() {
            let service = (lookup(scheme).unwrap().create)();
            assert_eq!(service.id(), scheme);
        }
        assert_eq!(schemes().len(), 7);
    }

    #[test]
    fn test_lookup_ignores_case_and_rejects_unknown() {
        assert!(lookup("Discord").is_some());
        assert!(lookup("nosuchscheme").is_none());
    }

    #[test]
    fn test_docs_list_fields() {
        let docs = (lookup("gotify").unwrap().docs)();
        assert!(docs.contains("priority"));
        assert!(docs.contains("Token"));
    }
}
