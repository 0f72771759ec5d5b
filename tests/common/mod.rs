//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use notify_router::transport::RecordingTransport;
use notify_router::types::DiscardLogger;
use notify_router::ServiceRouter;

pub const GOTIFY_TOKEN: &str = "Aaa.bbb-ccc_ddd";
pub const PAGERDUTY_KEY: &str = "0123456789abcdef0123456789abcdef";

/// One URL per registered scheme
pub fn sample_urls() -> Vec<String> {
    vec![
        "discord://token@123456".to_string(),
        "ntfy://ntfy.example.com/alerts?priority=high&tags=a,b".to_string(),
        format!("gotify://push.example.com/sub/{GOTIFY_TOKEN}?priority=5"),
        "twilio://ACsid:secret@+15550001111/+15552223333".to_string(),
        format!("pagerduty:///{PAGERDUTY_KEY}?severity=warning"),
        "generic://hook.example.com/notify?template=json&@xApiKey=k".to_string(),
        "logger://".to_string(),
    ]
}

/// Router whose services all talk to a shared recording transport
pub fn recording_router(urls: &[&str]) -> (ServiceRouter, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::new());
    let router =
        ServiceRouter::with_transport(Arc::new(DiscardLogger), transport.clone(), urls).unwrap();
    (router, transport)
}
