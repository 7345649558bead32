//! Request forwarding.
//!
//! # Responsibilities
//! - Rewrite an inbound request for the chosen backend, streaming its body
//! - Issue it under the configured deadline
//! - Stream the response back while counting body bytes
//! - Add the counted bytes to the backend's ledger entry
//!
//! # Design Decisions
//! - Status and headers are committed before the body streams
//! - A body that fails or is abandoned midway still records what was sent
//! - No retry against another backend

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderValue, Request, Response, StatusCode, header},
};
use futures_util::{Stream, StreamExt};

use crate::config::BalancerConfig;
use crate::http::response::{copy_headers, tag_backend};
use crate::load_balancer::{Scheme, TrafficLedger, backend::Backend};
use crate::observability::metrics;

/// Why a request could not be relayed.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("invalid upstream target {url}: {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to get response from {backend}: {source}")]
    Upstream {
        backend: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ForwardError {
    /// Status returned to the client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForwardError::InvalidTarget { .. } | ForwardError::Upstream { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

/// Forwarding behaviour shared by every request.
#[derive(Debug, Clone)]
pub struct ForwardSettings {
    pub scheme: Scheme,
    pub timeout: Duration,
    pub trace: bool,
}

impl ForwardSettings {
    pub fn from_config(config: &BalancerConfig) -> Self {
        Self {
            scheme: config.scheme(),
            timeout: config.timeouts.request(),
            trace: config.backends.trace,
        }
    }
}

/// Relays requests to backends and reports traffic into the ledger.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    ledger: Arc<TrafficLedger>,
    settings: ForwardSettings,
}

impl Forwarder {
    pub fn new(client: reqwest::Client, ledger: Arc<TrafficLedger>, settings: ForwardSettings) -> Self {
        Self {
            client,
            ledger,
            settings,
        }
    }

    /// Forward `request` to `backend`.
    ///
    /// On success the returned response streams the backend body; the
    /// ledger is updated once that stream ends or is dropped. On error the
    /// ledger is left untouched. The request body is streamed to the backend
    /// as it arrives; a client that aborts its upload surfaces as an
    /// upstream error.
    pub async fn forward(&self, backend: &Backend, request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        let (parts, body) = request.into_parts();

        let path_and_query = parts.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        let url = backend.url(self.settings.scheme, path_and_query);

        let mut headers = HeaderMap::with_capacity(parts.headers.len());
        copy_headers(&parts.headers, &mut headers);
        match HeaderValue::from_str(backend.address()) {
            Ok(host) => {
                headers.insert(header::HOST, host);
            }
            Err(_) => {
                headers.remove(header::HOST);
            }
        }

        let outbound = self
            .client
            .request(parts.method, url.as_str())
            .headers(headers)
            .body(reqwest::Body::wrap_stream(body.into_data_stream()))
            .timeout(self.settings.timeout)
            .build()
            .map_err(|source| ForwardError::InvalidTarget {
                url: url.clone(),
                source,
            })?;

        let upstream = match self.client.execute(outbound).await {
            Ok(response) => response,
            Err(source) => {
                tracing::error!(backend = %backend, error = %source, "Failed to get response");
                return Err(ForwardError::Upstream {
                    backend: backend.to_string(),
                    source,
                });
            }
        };

        let status = upstream.status();
        tracing::info!(status = status.as_u16(), url = %upstream.url(), "fwd");

        let mut response_headers = HeaderMap::with_capacity(upstream.headers().len() + 1);
        copy_headers(upstream.headers(), &mut response_headers);
        if self.settings.trace {
            tag_backend(&mut response_headers, backend.address());
        }

        let meter = TrafficMeter::new(self.ledger.clone(), backend.address());
        let body = MeteredBody {
            inner: Box::pin(upstream.bytes_stream()),
            meter,
        };

        let mut response = Response::new(Body::from_stream(body));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        Ok(response)
    }
}

/// Counts body bytes handed to the client and adds them to the ledger
/// exactly once.
struct TrafficMeter {
    ledger: Arc<TrafficLedger>,
    backend: String,
    bytes: u64,
    finished: bool,
}

impl TrafficMeter {
    fn new(ledger: Arc<TrafficLedger>, backend: &str) -> Self {
        Self {
            ledger,
            backend: backend.to_string(),
            bytes: 0,
            finished: false,
        }
    }

    fn count(&mut self, len: usize) {
        self.bytes = self.bytes.saturating_add(len as u64);
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        self.ledger.add(&self.backend, i64::try_from(self.bytes).unwrap_or(i64::MAX));
        metrics::record_forwarded_bytes(&self.backend, self.bytes);
        tracing::debug!(backend = %self.backend, bytes = self.bytes, "Response relayed");
    }
}

impl Drop for TrafficMeter {
    fn drop(&mut self) {
        self.finish();
    }
}

type UpstreamStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// Backend response body with byte accounting.
struct MeteredBody {
    inner: UpstreamStream,
    meter: TrafficMeter,
}

impl Stream for MeteredBody {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.meter.finished {
            return Poll::Ready(None);
        }

        match this.inner.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(chunk))) => {
                this.meter.count(chunk.len());
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                tracing::warn!(backend = %this.meter.backend, error = %e, "Failed to write response");
                this.meter.finish();
                Poll::Ready(Some(Err(io::Error::other(e))))
            }
            Poll::Ready(None) => {
                this.meter.finish();
                Poll::Ready(None)
            }
        }
    }
}
