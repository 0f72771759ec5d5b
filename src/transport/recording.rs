use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::errors::{endpoint, NotifyError, NotifyResult, TransportErrorKind};

#[derive(Debug, Clone)]
enum Scripted {
    Respond(HttpResponse),
    Fail(TransportErrorKind),
}

/// In-memory transport that records requests and replays scripted outcomes
///
/// Outcomes are scripted per host and consumed in order; the last outcome
/// for a host keeps answering once the others are used up. Hosts without a
/// script receive the default response (200, empty body).
pub struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    default_response: HttpResponse,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            scripts: Mutex::new(HashMap::new()),
            default_response: HttpResponse::new(200, Vec::new()),
        }
    }

    pub fn with_default_response(mut self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.default_response = HttpResponse::new(status, body);
        self
    }

    /// Queue a response for requests to `host`
    pub fn respond(&self, host: &str, status: u16, body: impl Into<Vec<u8>>) -> &Self {
        self.push(host, Scripted::Respond(HttpResponse::new(status, body)));
        self
    }

    /// Queue a transport failure for requests to `host`
    pub fn fail(&self, host: &str, kind: TransportErrorKind) -> &Self {
        self.push(host, Scripted::Fail(kind));
        self
    }

    fn push(&self, host: &str, outcome: Scripted) {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts
                .entry(host.to_ascii_lowercase())
                .or_default()
                .push_back(outcome);
        }
    }

    fn next_outcome(&self, host: &str) -> Scripted {
        let Ok(mut scripts) = self.scripts.lock() else {
            return Scripted::Respond(self.default_response.clone());
        };
        match scripts.get_mut(host) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| Scripted::Respond(self.default_response.clone())),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Scripted::Respond(self.default_response.clone())),
            None => Scripted::Respond(self.default_response.clone()),
        }
    }

    /// Every request executed so far, in arrival order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn execute(&self, request: HttpRequest) -> NotifyResult<HttpResponse> {
        let host = request
            .url
            .host_str()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let url = endpoint(&request.url);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        match self.next_outcome(&host) {
            Scripted::Respond(response) => Ok(response),
            Scripted::Fail(kind) => Err(NotifyError::transport(url, kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn request(host: &str) -> HttpRequest {
        HttpRequest::post(Url::parse(&format!("https://{host}/path")).unwrap())
    }

    #[tokio::test]
    async fn test_records_and_defaults() {
        let transport = RecordingTransport::new();
        let resp = transport.execute(request("a.example")).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(transport.request_count(), 1);
        assert_eq!(
            transport.last_request().unwrap().url.as_str(),
            "https://a.example/path"
        );
    }

    #[tokio::test]
    async fn test_scripted_outcomes_last_one_sticks() {
        let transport = RecordingTransport::new();
        transport
            .respond("a.example", 500, "boom")
            .respond("a.example", 204, "");
        transport.fail("down.example", TransportErrorKind::Connect);

        assert_eq!(transport.execute(request("a.example")).await.unwrap().status, 500);
        assert_eq!(transport.execute(request("a.example")).await.unwrap().status, 204);
        assert_eq!(transport.execute(request("a.example")).await.unwrap().status, 204);

        let err = transport.execute(request("down.example")).await.unwrap_err();
        assert!(matches!(err, NotifyError::Transport { kind: TransportErrorKind::Connect, .. }));
        assert_eq!(transport.request_count(), 4);
    }
}
