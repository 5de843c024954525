//! The HTTP gateway.
//!
//! Every network call goes through [`HttpGateway::send`], which injects the
//! bearer credential and classifies failures. Failure handling has three
//! parts: a notice for the user (for the kinds that get one), an
//! unauthorized signal to registered listeners on 401, and the typed error
//! returned to the caller in every case.

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use penwright_core::CredentialSource;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::notice::{
    server_message, Notice, Notifier, CONNECTION_TEXT, NOT_FOUND_TEXT, TIMEOUT_TEXT,
    UNAVAILABLE_TEXT,
};
use crate::request::OutboundRequest;

/// Subscriber to the gateway's unauthorized signal.
///
/// Listeners run synchronously, in registration order, before the failing
/// call returns its error.
pub trait UnauthorizedListener: Send + Sync {
    /// Called once for every 401 response.
    fn on_unauthorized(&self);
}

struct Inner {
    client: Client,
    config: GatewayConfig,
    credentials: Arc<dyn CredentialSource>,
    notifier: Arc<dyn Notifier>,
    listeners: RwLock<Vec<Arc<dyn UnauthorizedListener>>>,
}

/// Single choke point for calls to the writing server.
///
/// Cloning is cheap; clones share the HTTP client, credentials, notifier and
/// listeners.
#[derive(Clone)]
pub struct HttpGateway {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.inner.config.base_url)
            .field("listeners", &self.inner.listeners.read().len())
            .finish_non_exhaustive()
    }
}

impl HttpGateway {
    /// Create a gateway.
    ///
    /// # Arguments
    ///
    /// * `config` - Base URL and request deadline
    /// * `credentials` - Source of the bearer token, read on every call
    /// * `notifier` - Receives user-facing notices for failed calls
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Setup` if the HTTP client cannot be built.
    pub fn new(
        config: GatewayConfig,
        credentials: Arc<dyn CredentialSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GatewayError::Setup(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                config,
                credentials,
                notifier,
                listeners: RwLock::new(Vec::new()),
            }),
        })
    }

    /// Register a listener for 401 responses.
    pub fn on_unauthorized(&self, listener: Arc<dyn UnauthorizedListener>) {
        self.inner.listeners.write().push(listener);
    }

    /// The gateway configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Send a request.
    ///
    /// Adds `Authorization: Bearer <token>` when the credential source holds a
    /// token. A success response is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns the classified failure. Notices and the unauthorized signal
    /// have already been delivered when the error is returned.
    pub async fn send(&self, request: OutboundRequest) -> Result<Response> {
        let url = self.inner.config.url(&request.path);

        let mut builder = self.inner.client.request(request.method.clone(), &url);
        if let Some(token) = self.inner.credentials.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(upload) = &request.upload {
            let part = Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
            builder = builder.multipart(Form::new().part(upload.field.clone(), part));
        } else if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %request.method, path = %request.path, "Sending request");

        match builder.send().await {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => Err(self.classify_response(&request, response).await),
            Err(err) => Err(self.classify_transport(&request, &err)),
        }
    }

    /// Send a request and decode the JSON response body.
    ///
    /// # Errors
    ///
    /// Returns the classified failure, or `GatewayError::Decode` if the body
    /// does not match `T`.
    pub async fn fetch_json<T: DeserializeOwned>(&self, request: OutboundRequest) -> Result<T> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// `GET path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`HttpGateway::fetch_json`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.fetch_json(OutboundRequest::get(path)).await
    }

    /// `POST path` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`HttpGateway::fetch_json`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch_json(OutboundRequest::post(path).json(body)?)
            .await
    }

    /// `PUT path` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`HttpGateway::fetch_json`].
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch_json(OutboundRequest::put(path).json(body)?)
            .await
    }

    /// `DELETE path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`HttpGateway::fetch_json`].
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.fetch_json(OutboundRequest::delete(path)).await
    }

    /// Classify a failure where no response was received.
    fn classify_transport(&self, request: &OutboundRequest, err: &reqwest::Error) -> GatewayError {
        if err.is_builder() {
            // Nothing was sent, so the server is not to blame.
            tracing::error!(
                method = %request.method,
                path = %request.path,
                error = %err,
                "Request URL is invalid"
            );
            GatewayError::InvalidUrl(err.to_string())
        } else if err.is_timeout() {
            tracing::warn!(method = %request.method, path = %request.path, "Request timed out");
            self.notify(&Notice::error(TIMEOUT_TEXT));
            GatewayError::Timeout
        } else {
            tracing::warn!(
                method = %request.method,
                path = %request.path,
                error = %err,
                "Request failed without response"
            );
            self.notify(&Notice::error(CONNECTION_TEXT));
            GatewayError::Connect(err.to_string())
        }
    }

    /// Classify a non-success response.
    async fn classify_response(&self, request: &OutboundRequest, response: Response) -> GatewayError {
        let status = response.status();
        let body: Option<serde_json::Value> = match response.text().await {
            Ok(text) => serde_json::from_str(&text).ok(),
            Err(_) => None,
        };

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "Request rejected"
        );

        match status {
            StatusCode::UNAUTHORIZED => {
                tracing::info!(path = %request.path, "Credential rejected, signalling session expiry");
                self.signal_unauthorized();
                GatewayError::Unauthorized
            }
            StatusCode::BAD_REQUEST => {
                let message = server_message(body.as_ref());
                self.notify(&Notice::warning(message.clone()));
                GatewayError::BadRequest { message }
            }
            StatusCode::NOT_FOUND => {
                self.notify(&Notice::warning(NOT_FOUND_TEXT));
                GatewayError::NotFound
            }
            StatusCode::SERVICE_UNAVAILABLE => {
                self.notify(&Notice::error(UNAVAILABLE_TEXT));
                GatewayError::ServiceUnavailable
            }
            s if s.is_server_error() => {
                let message = server_message(body.as_ref());
                self.notify(&Notice::error(message.clone()));
                GatewayError::Server {
                    status: s.as_u16(),
                    message,
                }
            }
            s => GatewayError::Unclassified {
                status: s.as_u16(),
                body,
            },
        }
    }

    fn notify(&self, notice: &Notice) {
        self.inner.notifier.notify(notice);
    }

    fn signal_unauthorized(&self) {
        let listeners = self.inner.listeners.read().clone();
        for listener in listeners {
            listener.on_unauthorized();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::notice::{NoticeLevel, RecordingNotifier, DEFAULT_TEXT};

    struct StaticToken(Option<String>);

    impl CredentialSource for StaticToken {
        fn bearer_token(&self) -> Option<String> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct CountingListener(AtomicUsize);

    impl UnauthorizedListener for CountingListener {
        fn on_unauthorized(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn gateway(
        server: &MockServer,
        token: Option<&str>,
    ) -> (HttpGateway, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let gateway = HttpGateway::new(
            GatewayConfig::with_base_url(format!("{}/api", server.uri())),
            Arc::new(StaticToken(token.map(str::to_string))),
            notifier.clone(),
        )
        .unwrap();
        (gateway, notifier)
    }

    async fn respond_with(server: &MockServer, status: u16, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn attaches_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/materials"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let (gw, notifier) = gateway(&server, Some("secret"));
        let items: Vec<serde_json::Value> = gw.get_json("/materials").await.unwrap();
        assert!(items.is_empty());
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn omits_header_without_token() {
        let server = MockServer::start().await;
        respond_with(&server, 200, json!({"ok": true})).await;

        let (gw, _) = gateway(&server, None);
        gw.send(OutboundRequest::get("/ping")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn success_response_is_returned_raw() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("x-trace", "t-1")
                    .set_body_string("plain"),
            )
            .mount(&server)
            .await;

        let (gw, _) = gateway(&server, None);
        let response = gw.send(OutboundRequest::get("/ping")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-trace"], "t-1");
        assert_eq!(response.text().await.unwrap(), "plain");
    }

    #[tokio::test]
    async fn sends_query_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat/send"))
            .and(query_param("stream", "false"))
            .and(body_json(json!({"message": "hi", "session_id": 4})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "hello"})))
            .expect(1)
            .mount(&server)
            .await;

        let (gw, _) = gateway(&server, Some("t"));
        let request = OutboundRequest::post("/chat/send")
            .query_param("stream", false)
            .json(&json!({"message": "hi", "session_id": 4}))
            .unwrap();
        let reply: serde_json::Value = gw.fetch_json(request).await.unwrap();
        assert_eq!(reply["reply"], "hello");
    }

    #[tokio::test]
    async fn bad_request_surfaces_server_message() {
        let server = MockServer::start().await;
        respond_with(&server, 400, json!({"error": "用户名已存在", "detail": ""})).await;

        let (gw, notifier) = gateway(&server, Some("t"));
        let err = gw.send(OutboundRequest::get("/ping")).await.unwrap_err();

        assert!(matches!(&err, GatewayError::BadRequest { message } if message == "用户名已存在"));
        assert_eq!(notifier.notices(), vec![Notice::warning("用户名已存在")]);
    }

    #[tokio::test]
    async fn bad_request_falls_back_to_detail_then_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/detail"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "too short"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/empty"))
            .respond_with(ResponseTemplate::new(400).set_body_string("<html>"))
            .mount(&server)
            .await;

        let (gw, notifier) = gateway(&server, None);
        gw.send(OutboundRequest::get("/detail")).await.unwrap_err();
        gw.send(OutboundRequest::get("/empty")).await.unwrap_err();

        let texts: Vec<_> = notifier.notices().into_iter().map(|n| n.text).collect();
        assert_eq!(texts, vec!["too short".to_string(), DEFAULT_TEXT.to_string()]);
    }

    #[tokio::test]
    async fn not_found_ignores_server_message() {
        let server = MockServer::start().await;
        respond_with(&server, 404, json!({"error": "素材不存在"})).await;

        let (gw, notifier) = gateway(&server, Some("t"));
        let err = gw.send(OutboundRequest::get("/ping")).await.unwrap_err();

        assert!(matches!(err, GatewayError::NotFound));
        assert_eq!(notifier.notices(), vec![Notice::warning(NOT_FOUND_TEXT)]);
    }

    #[tokio::test]
    async fn service_unavailable_uses_fixed_text() {
        let server = MockServer::start().await;
        respond_with(&server, 503, json!({"error": "AI服务暂时不可用"})).await;

        let (gw, notifier) = gateway(&server, Some("t"));
        let err = gw.send(OutboundRequest::get("/ping")).await.unwrap_err();

        assert!(matches!(err, GatewayError::ServiceUnavailable));
        assert_eq!(notifier.notices(), vec![Notice::error(UNAVAILABLE_TEXT)]);
    }

    #[tokio::test]
    async fn server_errors_surface_server_message() {
        for status in [500_u16, 502] {
            let server = MockServer::start().await;
            respond_with(&server, status, json!({"error": "服务器内部错误"})).await;

            let (gw, notifier) = gateway(&server, Some("t"));
            let err = gw.send(OutboundRequest::get("/ping")).await.unwrap_err();

            assert_eq!(err.status(), Some(status));
            assert!(matches!(err, GatewayError::Server { .. }));
            let notices = notifier.notices();
            assert_eq!(notices.len(), 1);
            assert_eq!(notices[0].level, NoticeLevel::Error);
            assert_eq!(notices[0].text, "服务器内部错误");
        }
    }

    #[tokio::test]
    async fn classified_failures_never_signal_unauthorized() {
        for status in [400_u16, 404, 500, 502, 503] {
            let server = MockServer::start().await;
            respond_with(&server, status, json!({})).await;

            let (gw, _) = gateway(&server, Some("t"));
            let listener = Arc::new(CountingListener::default());
            gw.on_unauthorized(listener.clone());

            gw.send(OutboundRequest::get("/ping")).await.unwrap_err();
            assert_eq!(listener.0.load(Ordering::SeqCst), 0, "status {status}");
        }
    }

    #[tokio::test]
    async fn unauthorized_signals_listeners_without_notice() {
        let server = MockServer::start().await;
        respond_with(&server, 401, json!({"detail": "token expired"})).await;

        let (gw, notifier) = gateway(&server, Some("stale"));
        let first = Arc::new(CountingListener::default());
        let second = Arc::new(CountingListener::default());
        gw.on_unauthorized(first.clone());
        gw.on_unauthorized(second.clone());

        let err = gw.send(OutboundRequest::get("/ping")).await.unwrap_err();

        assert!(matches!(err, GatewayError::Unauthorized));
        assert_eq!(first.0.load(Ordering::SeqCst), 1);
        assert_eq!(second.0.load(Ordering::SeqCst), 1);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn unclassified_status_propagates_silently() {
        let server = MockServer::start().await;
        respond_with(&server, 403, json!({"detail": "无权访问该素材"})).await;

        let (gw, notifier) = gateway(&server, Some("t"));
        let err = gw.send(OutboundRequest::get("/ping")).await.unwrap_err();

        match err {
            GatewayError::Unclassified { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body.unwrap()["detail"], "无权访问该素材");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn timeout_is_reported_as_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let notifier = Arc::new(RecordingNotifier::new());
        let config = GatewayConfig {
            base_url: format!("{}/api", server.uri()),
            request_timeout_seconds: 1,
        };
        let gw = HttpGateway::new(config, Arc::new(StaticToken(None)), notifier.clone()).unwrap();

        let err = gw.send(OutboundRequest::get("/slow")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Timeout));
        assert_eq!(notifier.notices(), vec![Notice::error(TIMEOUT_TEXT)]);
    }

    #[tokio::test]
    async fn refused_connection_is_reported_as_connection_failure() {
        // Reserve a port, then close it so nothing is listening.
        let uri = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };

        let notifier = Arc::new(RecordingNotifier::new());
        let gw = HttpGateway::new(
            GatewayConfig::with_base_url(format!("{uri}/api")),
            Arc::new(StaticToken(Some("t".to_string()))),
            notifier.clone(),
        )
        .unwrap();

        let err = gw.send(OutboundRequest::get("/ping")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Connect(_)));
        assert_eq!(notifier.notices(), vec![Notice::error(CONNECTION_TEXT)]);
    }

    #[tokio::test]
    async fn malformed_base_url_is_not_a_connection_failure() {
        let notifier = Arc::new(RecordingNotifier::new());
        let gw = HttpGateway::new(
            GatewayConfig::with_base_url("not a url"),
            Arc::new(StaticToken(Some("t".to_string()))),
            notifier.clone(),
        )
        .unwrap();

        let err = gw.send(OutboundRequest::get("/ping")).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidUrl(_)));
        assert!(!err.is_transport());
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn undecodable_success_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let (gw, notifier) = gateway(&server, None);
        let err = gw.get_json::<Vec<u8>>("/ping").await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
        assert!(notifier.notices().is_empty());
    }
}
