use std::sync::Arc;
use std::time::Instant;

use devportal_domain::{AgentConfig, RetryPolicy};
use reqwest::{Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::agent::{Agent, AgentPool};
use super::error::FetchError;
use super::request::{FetchInput, PreparedRequest, RequestInit};
use crate::observability::metrics::TransportMetrics;

/// Fetch-compatible HTTP transport with per-attempt timeout and
/// exponential-backoff retry.
#[derive(Debug, Clone)]
pub struct RetryingTransport {
    pool: AgentPool,
    policy: Arc<RetryPolicy>,
    metrics: Option<Arc<TransportMetrics>>,
}

impl RetryingTransport {
    /// Transport building its agents from `agent_config` and retrying per
    /// `policy`.
    #[must_use]
    pub fn new(agent_config: &AgentConfig, policy: RetryPolicy) -> Self {
        Self { pool: AgentPool::new(agent_config), policy: Arc::new(policy), metrics: None }
    }

    /// Record attempt outcomes into `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<TransportMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Retry policy every fetch follows.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Counters attached with [`Self::with_metrics`], if any.
    #[must_use]
    pub fn metrics(&self) -> Option<&Arc<TransportMetrics>> {
        self.metrics.as_ref()
    }

    /// Perform one logical fetch.
    pub async fn fetch(
        &self,
        input: impl Into<FetchInput>,
        init: RequestInit,
    ) -> Result<Response, FetchError> {
        self.fetch_with_cancel(input, init, &CancellationToken::new()).await
    }

    /// Perform one logical fetch that `cancel` can abort at any point,
    /// including while waiting between attempts.
    pub async fn fetch_with_cancel(
        &self,
        input: impl Into<FetchInput>,
        init: RequestInit,
        cancel: &CancellationToken,
    ) -> Result<Response, FetchError> {
        let request = input.into().prepare(init)?;

        let mut attempts_remaining = self.policy.max_retries;
        let mut attempts_made: u32 = 0;

        loop {
            attempts_made += 1;

            let err = match self.attempt(&request, attempts_made, cancel).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }
            if attempts_remaining == 0 {
                warn!(
                    attempts = attempts_made,
                    method = %request.method,
                    url = %request.url,
                    error = %err,
                    "HTTP retries exhausted"
                );
                return Err(err);
            }

            let delay = self.policy.delay_for(attempts_made);
            warn!(
                attempt = attempts_made,
                method = %request.method,
                url = %request.url,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retrying HTTP request"
            );
            self.record(TransportMetrics::record_retry);

            if !delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        self.record(TransportMetrics::record_cancellation);
                        return Err(FetchError::Cancelled);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            attempts_remaining -= 1;
        }
    }

    /// One attempt: fresh agent, armed timer, classified outcome.
    async fn attempt(
        &self,
        request: &PreparedRequest,
        attempt: u32,
        cancel: &CancellationToken,
    ) -> Result<Response, FetchError> {
        if cancel.is_cancelled() {
            self.record(TransportMetrics::record_cancellation);
            return Err(FetchError::Cancelled);
        }

        let agent = self.agent_for(request)?;
        let timeout = self.policy.attempt_timeout();

        debug!(attempt, method = %request.method, url = %request.url, "sending HTTP request");
        let started = Instant::now();

        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                self.record(TransportMetrics::record_cancellation);
                return Err(FetchError::Cancelled);
            }
            outcome = tokio::time::timeout(timeout, agent.execute(request.to_request())) => outcome,
        };
        self.record(|metrics| metrics.record_attempt(started.elapsed()));

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                debug!(attempt, url = %request.url, error = %err, "HTTP attempt failed");
                self.record(TransportMetrics::record_network_failure);
                return Err(err);
            }
            Err(_) => {
                debug!(
                    attempt,
                    url = %request.url,
                    timeout_ms = self.policy.timeout,
                    "HTTP attempt timed out"
                );
                self.record(TransportMetrics::record_timeout);
                return Err(FetchError::Timeout { after: timeout });
            }
        };

        let status = response.status();
        debug!(
            attempt,
            method = %request.method,
            url = %request.url,
            %status,
            "received HTTP response"
        );
        self.classify(response)
    }

    /// Fresh agent for the scheme of `request`. HTTPS agents refuse plain
    /// HTTP URLs.
    fn agent_for(&self, request: &PreparedRequest) -> Result<Agent, FetchError> {
        let scheme = request.scheme();
        self.pool.select_agent(scheme).map_err(|err| {
            FetchError::InvalidRequest(format!("failed to build {scheme} agent: {err}"))
        })
    }

    fn classify(&self, response: Response) -> Result<Response, FetchError> {
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let message = status_text(status);
        if self.policy.is_retryable_status(status_code) {
            self.record(TransportMetrics::record_transient);
            Err(FetchError::Transient { status_code, message })
        } else {
            self.record(TransportMetrics::record_permanent);
            Err(FetchError::Permanent { status_code, message })
        }
    }

    fn record(&self, update: impl FnOnce(&TransportMetrics)) {
        if let Some(metrics) = &self.metrics {
            update(metrics);
        }
    }
}

fn status_text(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use reqwest::{Method, Request};
    use url::Url;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::http::agent::Scheme;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy { max_retries, initial_delay: 5, timeout: 2_000, ..RetryPolicy::default() }
    }

    fn transport(max_retries: u32) -> RetryingTransport {
        RetryingTransport::new(&AgentConfig::default(), policy(max_retries))
    }

    #[tokio::test]
    async fn returns_successful_response_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let response =
            transport(3).fetch(server.uri(), RequestInit::new()).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn redirect_status_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(304))
            .expect(1)
            .mount(&server)
            .await;

        let response =
            transport(3).fetch(server.uri(), RequestInit::new()).await.expect("response");
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn persistent_transient_status_uses_whole_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let result = transport(2).fetch(server.uri(), RequestInit::new()).await;

        match result {
            Err(FetchError::Transient { status_code, message }) => {
                assert_eq!(status_code, 503);
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("expected transient error, got {other:?}"),
        }
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn zero_retries_means_one_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;

        let result = transport(0).fetch(server.uri(), RequestInit::new()).await;
        assert!(matches!(result, Err(FetchError::Transient { status_code: 502, .. })));
    }

    #[tokio::test]
    async fn retries_transient_status_until_success() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                if attempts_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                    ResponseTemplate::new(503)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(2)
            .mount(&server)
            .await;

        let response =
            transport(3).fetch(server.uri(), RequestInit::new()).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_status_is_never_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let result = transport(5).fetch(server.uri(), RequestInit::new()).await;

        match result {
            Err(FetchError::Permanent { status_code, message }) => {
                assert_eq!(status_code, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("expected permanent error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn custom_retryable_codes_replace_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(418))
            .expect(2)
            .mount(&server)
            .await;

        let policy = RetryPolicy { retryable_status_codes: vec![418], ..policy(1) };
        let transport = RetryingTransport::new(&AgentConfig::default(), policy);

        let result = transport.fetch(server.uri(), RequestInit::new()).await;
        assert!(matches!(result, Err(FetchError::Transient { status_code: 418, .. })));
    }

    #[tokio::test]
    async fn exhausted_network_failures_surface_raw_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let metrics = Arc::new(TransportMetrics::new());
        let transport = transport(2).with_metrics(metrics.clone());

        let result = transport.fetch(format!("http://{addr}"), RequestInit::new()).await;

        match result {
            Err(FetchError::Network(err)) => assert!(err.is_connect()),
            other => panic!("expected network error, got {other:?}"),
        }
        assert_eq!(metrics.get_attempt_count(), 3);
        assert_eq!(metrics.get_network_failure_count(), 3);
        assert_eq!(metrics.get_retry_count(), 2);
    }

    #[tokio::test]
    async fn slow_attempts_time_out_and_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .expect(2)
            .mount(&server)
            .await;

        let policy = RetryPolicy { timeout: 50, ..policy(1) };
        let transport = RetryingTransport::new(&AgentConfig::default(), policy);

        let result = transport.fetch(server.uri(), RequestInit::new()).await;
        assert!(matches!(
            result,
            Err(FetchError::Timeout { after }) if after == Duration::from_millis(50)
        ));
    }

    #[tokio::test]
    async fn cancellation_aborts_backoff_sleep() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let policy = RetryPolicy { initial_delay: 60_000, ..policy(3) };
        let transport = RetryingTransport::new(&AgentConfig::default(), policy);
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let result = transport.fetch_with_cancel(server.uri(), RequestInit::new(), &cancel).await;

        assert!(matches!(result, Err(FetchError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn already_cancelled_token_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result =
            transport(3).fetch_with_cancel(server.uri(), RequestInit::new(), &cancel).await;
        assert!(matches!(result, Err(FetchError::Cancelled)));
    }

    #[tokio::test]
    async fn request_body_is_replayed_on_every_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/users/u1"))
            .and(body_string(r#"{"email":"a@b.c"}"#))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let init = RequestInit::new()
            .method(Method::PUT)
            .json(&serde_json::json!({ "email": "a@b.c" }))
            .unwrap();

        let result = transport(1).fetch(format!("{}/users/u1", server.uri()), init).await;
        assert!(matches!(result, Err(FetchError::Transient { status_code: 500, .. })));
    }

    #[tokio::test]
    async fn invalid_url_makes_no_attempt() {
        let metrics = Arc::new(TransportMetrics::new());
        let transport = transport(3).with_metrics(metrics.clone());

        let result = transport.fetch("::not a url::", RequestInit::new()).await;

        assert!(matches!(result, Err(FetchError::InvalidRequest(_))));
        assert_eq!(metrics.get_attempt_count(), 0);
    }

    fn prepared(url: &str) -> PreparedRequest {
        let request = Request::new(Method::GET, Url::parse(url).unwrap());
        FetchInput::from(request).prepare(RequestInit::new()).unwrap()
    }

    #[test]
    fn request_input_selects_agent_by_scheme() {
        let transport = transport(0);

        let https = transport.agent_for(&prepared("https://example.com/a")).unwrap();
        let upper = transport.agent_for(&prepared("HTTPS://example.com/a")).unwrap();
        let http = transport.agent_for(&prepared("http://example.com/a")).unwrap();

        assert_eq!(https.scheme(), Scheme::Https);
        assert_eq!(upper.scheme(), Scheme::Https);
        assert_eq!(http.scheme(), Scheme::Http);
    }

    #[tokio::test]
    async fn plain_http_request_input_is_served() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/health", server.uri())).unwrap();
        let request = Request::new(Method::GET, url);

        let response = transport(0).fetch(request, RequestInit::new()).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn https_request_input_goes_through_tls_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        // same plain HTTP server, addressed as https: the TLS handshake fails
        let url = Url::parse(&server.uri().replacen("http://", "https://", 1)).unwrap();
        let request = Request::new(Method::GET, url);

        let result = transport(0).fetch(request, RequestInit::new()).await;

        assert!(matches!(result, Err(FetchError::Network(_))));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
