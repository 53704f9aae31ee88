//! HTTP transport implementation.
//!
//! This module provides the HTTP-based transport for the panel. The raw
//! HTTP client is abstracted via a trait so the same envelope handling runs
//! over `reqwest` in production and over an in-process loopback in tests.

use crate::error::{PanelError, PanelResult};
use crate::transport::PanelTransport;
use async_trait::async_trait;
use b3ctl_protocol::{
    Ack, Action, ActionRequest, ConfigSnapshot, ConfigUpdate, Envelope, TrackList, ACTION_ROUTE,
    CONFIG_ROUTE, FILE_ROUTE,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl HttpMethod {
    /// Returns the method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Implementations report network-level failures as `Err`; any response
/// that arrived, whatever its status, is `Ok`.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a request with an optional JSON body.
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, String>;
}

/// HTTP-based panel transport.
///
/// Uses JSON request bodies and decodes the `{ status }` envelope of every
/// response.
pub struct HttpTransport<C: HttpClient> {
    /// Base URL of the device (e.g., "http://b3.local:5000").
    base_url: String,
    /// HTTP client implementation.
    client: C,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a new HTTP transport.
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request<Res>(
        &self,
        method: HttpMethod,
        route: &str,
        body: Option<Vec<u8>>,
    ) -> PanelResult<Res>
    where
        Res: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, route);
        debug!(method = method.as_str(), %url, "sending request");

        let response = self
            .client
            .send(method, &url, body)
            .await
            .map_err(|e| PanelError::transport(route, e))?;

        if !response.is_success() {
            return Err(PanelError::transport(
                route,
                format!("HTTP {}", response.status),
            ));
        }

        match Envelope::<Res>::decode(&response.body) {
            Ok(Envelope::Success(payload)) => Ok(payload),
            Ok(Envelope::Failed(status)) => Err(PanelError::application(route, status)),
            Ok(Envelope::NoStatus) => Err(PanelError::protocol(route, "(no status)")),
            Err(e) => Err(PanelError::protocol(
                route,
                format!("malformed response: {e}"),
            )),
        }
    }
}

fn encode_json<T: Serialize>(route: &str, body: &T) -> PanelResult<Vec<u8>> {
    serde_json::to_vec(body)
        .map_err(|e| PanelError::protocol(route, format!("failed to encode request: {e}")))
}

#[async_trait]
impl<C: HttpClient> PanelTransport for HttpTransport<C> {
    async fn fetch_config(&self) -> PanelResult<ConfigSnapshot> {
        self.request(HttpMethod::Get, CONFIG_ROUTE, None).await
    }

    async fn push_config(&self, config: &ConfigUpdate) -> PanelResult<()> {
        let body = encode_json(CONFIG_ROUTE, config)?;
        self.request::<Ack>(HttpMethod::Post, CONFIG_ROUTE, Some(body))
            .await
            .map(|_| ())
    }

    async fn dispatch_action(&self, action: Action, track: &str) -> PanelResult<()> {
        let body = encode_json(ACTION_ROUTE, &ActionRequest::single(action, track))?;
        self.request::<Ack>(HttpMethod::Post, ACTION_ROUTE, Some(body))
            .await
            .map(|_| ())
    }

    async fn fetch_tracks(&self) -> PanelResult<Vec<String>> {
        self.request::<TrackList>(HttpMethod::Get, FILE_ROUTE, None)
            .await
            .map(|list| list.files)
    }
}

/// An [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> PanelResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PanelError::transport("http client", e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, String> {
        let mut builder = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        if let Some(body) = body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = builder.send().await.map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

/// Trait for servers that can handle loopback requests.
pub trait LoopbackServer {
    /// Handles a request for `path` and returns the response.
    fn handle(&self, method: HttpMethod, path: &str, body: &[u8]) -> HttpResponse;
}

/// A loopback HTTP client that routes requests directly to an in-process
/// server.
///
/// Useful for testing without actual network overhead.
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
}

impl<S: LoopbackServer + Send + Sync> LoopbackClient<S> {
    /// Creates a new loopback client connected to the given server.
    pub fn new(server: S) -> Self {
        Self { server }
    }

    /// Returns the server.
    pub fn server(&self) -> &S {
        &self.server
    }
}

#[async_trait]
impl<S: LoopbackServer + Send + Sync> HttpClient for LoopbackClient<S> {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, String> {
        // Extract path from URL
        let path = url.find("/api/").map(|i| &url[i..]).unwrap_or(url);
        Ok(self
            .server
            .handle(method, path, body.as_deref().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use b3ctl_protocol::{PlaybackState, LPF_CUTOFF};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct TestClient {
        response: Mutex<Option<Result<HttpResponse, String>>>,
        requests: Mutex<Vec<(HttpMethod, String, Option<Vec<u8>>)>>,
    }

    impl TestClient {
        fn respond(&self, status: u16, body: &str) {
            *self.response.lock() = Some(Ok(HttpResponse::new(status, body.as_bytes().to_vec())));
        }

        fn fail(&self, message: &str) {
            *self.response.lock() = Some(Err(message.to_string()));
        }
    }

    #[async_trait]
    impl HttpClient for TestClient {
        async fn send(
            &self,
            method: HttpMethod,
            url: &str,
            body: Option<Vec<u8>>,
        ) -> Result<HttpResponse, String> {
            self.requests.lock().push((method, url.to_string(), body));
            self.response
                .lock()
                .clone()
                .unwrap_or_else(|| Err("No response set".into()))
        }
    }

    fn transport() -> HttpTransport<TestClient> {
        HttpTransport::new("http://b3.local:5000/", TestClient::default())
    }

    #[test]
    fn transport_creation() {
        let transport = transport();
        assert_eq!(transport.base_url(), "http://b3.local:5000");
    }

    #[tokio::test]
    async fn fetch_config_success() {
        let transport = transport();
        transport.client.respond(
            200,
            r#"{"status":"success","config":{"lpf_cutoff":1000},"activesong":"a.wav","state":"play_pause","volume":0}"#,
        );

        let snapshot = transport.fetch_config().await.unwrap();
        assert_eq!(snapshot.value(LPF_CUTOFF), Some(1000.0));
        assert_eq!(snapshot.active_song(), Some("a.wav"));
        assert_eq!(snapshot.state, PlaybackState::Playing);

        let requests = transport.client.requests.lock().clone();
        assert_eq!(requests[0].0, HttpMethod::Get);
        assert_eq!(requests[0].1, "http://b3.local:5000/api/config");
        assert!(requests[0].2.is_none());
    }

    #[tokio::test]
    async fn application_error_status() {
        let transport = transport();
        transport.client.respond(200, r#"{"status":"error"}"#);

        let err = transport.fetch_config().await.unwrap_err();
        assert_eq!(err, PanelError::application(CONFIG_ROUTE, "error"));
        assert_eq!(err.to_string(), "/api/config: error");
    }

    #[tokio::test]
    async fn missing_status_is_protocol_error() {
        let transport = transport();
        transport.client.respond(200, r#"{"files":[]}"#);
        let err = transport.fetch_tracks().await.unwrap_err();
        assert_eq!(err, PanelError::protocol(FILE_ROUTE, "(no status)"));

        transport.client.respond(200, r#"{"status":null}"#);
        let err = transport.fetch_tracks().await.unwrap_err();
        assert_eq!(err, PanelError::protocol(FILE_ROUTE, "(no status)"));
    }

    #[tokio::test]
    async fn non_success_http_status_wins_over_body() {
        let transport = transport();
        transport.client.respond(500, r#"{"status":"success"}"#);
        let err = transport.push_config(&ConfigUpdate::new()).await.unwrap_err();
        assert_eq!(err, PanelError::transport(CONFIG_ROUTE, "HTTP 500"));
    }

    #[tokio::test]
    async fn network_failure_is_transport_error() {
        let transport = transport();
        transport.client.fail("connection refused");
        let err = transport.dispatch_action(Action::Stop, "").await.unwrap_err();
        assert_eq!(err, PanelError::transport(ACTION_ROUTE, "connection refused"));
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn malformed_body_is_protocol_error() {
        let transport = transport();
        transport.client.respond(200, "<html>oops</html>");
        let err = transport.fetch_config().await.unwrap_err();
        assert!(matches!(err, PanelError::Protocol { .. }));
    }

    #[tokio::test]
    async fn action_body_shape() {
        let transport = transport();
        transport
            .client
            .respond(200, r#"{"action":"play_pause","status":"success"}"#);
        transport
            .dispatch_action(Action::PlayPause, "song.mp3")
            .await
            .unwrap();

        let requests = transport.client.requests.lock().clone();
        let (method, url, body) = &requests[0];
        assert_eq!(*method, HttpMethod::Post);
        assert_eq!(url, "http://b3.local:5000/api/actions");
        let body: serde_json::Value = serde_json::from_slice(body.as_ref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "actions": [{ "action": "play_pause", "args": "song.mp3" }] })
        );
    }

    #[tokio::test]
    async fn push_sends_flat_mapping() {
        let transport = transport();
        transport.client.respond(200, r#"{"status":"success"}"#);

        let mut update = ConfigUpdate::new();
        update.insert(LPF_CUTOFF.into(), 1001.0);
        update.insert("body_threshold".into(), 0.3);
        transport.push_config(&update).await.unwrap();

        let requests = transport.client.requests.lock().clone();
        let body: serde_json::Value =
            serde_json::from_slice(requests[0].2.as_ref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "body_threshold": 0.3, "lpf_cutoff": 1001.0 })
        );
    }
}
