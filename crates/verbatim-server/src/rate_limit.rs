use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{HeaderName, Request, StatusCode};
use dashmap::DashMap;
use tower::{Layer, Service};
use tracing::{debug, warn};

const LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Per-client token bucket. Clients are identified by the last entry of a
/// configurable header, the one appended by the trusted proxy; requests
/// without it are not limited. Buckets idle long enough to have refilled are
/// swept.
#[derive(Clone)]
pub struct RateLimiter<S> {
    inner: S,
    limits: Limits,
}

#[derive(Clone)]
pub struct RateLimiterLayer {
    limits: Limits,
}

#[derive(Clone)]
struct Limits {
    rate_per_sec: f64,
    burst: f64,
    idle_after: Duration,
    client_header: HeaderName,
    buckets: Arc<DashMap<String, Bucket>>,
    dropped_since_log: Arc<AtomicU64>,
    last_log: Arc<Mutex<Instant>>,
    last_sweep: Arc<Mutex<Instant>>,
}

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiterLayer {
    pub fn new(rate_per_sec: u32, burst: u32, client_header: HeaderName) -> Self {
        let rate_per_sec = rate_per_sec as f64;
        let burst = burst as f64;
        // An idle bucket is full again after burst / rate seconds.
        let idle_after =
            Duration::try_from_secs_f64(burst / rate_per_sec).unwrap_or(Duration::MAX);
        Self {
            limits: Limits {
                rate_per_sec,
                burst,
                idle_after,
                client_header,
                buckets: Arc::new(DashMap::new()),
                dropped_since_log: Arc::new(AtomicU64::new(0)),
                last_log: Arc::new(Mutex::new(Instant::now())),
                last_sweep: Arc::new(Mutex::new(Instant::now())),
            },
        }
    }

    /// Number of clients currently holding a bucket.
    pub fn tracked_clients(&self) -> usize {
        self.limits.buckets.len()
    }
}

impl<S> Layer<S> for RateLimiterLayer {
    type Service = RateLimiter<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimiter {
            inner,
            limits: self.limits.clone(),
        }
    }
}

impl<S, ReqBody> Service<Request<ReqBody>> for RateLimiter<S>
where
    S: Service<Request<ReqBody>, Response = axum::http::Response<Body>> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        self.limits.sweep_if_needed();
        if let Some(client) = client_id(&req, &self.limits.client_header)
            && !self.limits.check_and_consume(&client)
        {
            self.limits.dropped_since_log.fetch_add(1, Ordering::Relaxed);
            self.limits.log_drops_if_needed();
            return Box::pin(async move {
                let mut response = axum::http::Response::new(Body::from("rate limited"));
                *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
                Ok(response)
            });
        }

        let fut = self.inner.call(req);
        Box::pin(fut)
    }
}

fn client_id<B>(req: &Request<B>, header: &HeaderName) -> Option<String> {
    req.headers()
        .get(header)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.rsplit(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Limits {
    fn check_and_consume(&self, client: &str) -> bool {
        let mut entry = self
            .buckets
            .entry(client.to_string())
            .or_insert(Bucket {
                tokens: self.burst,
                last_refill: Instant::now(),
            });
        let now = Instant::now();
        let elapsed = now
            .saturating_duration_since(entry.last_refill)
            .as_secs_f64();
        if elapsed > 0.0 {
            entry.tokens = (entry.tokens + elapsed * self.rate_per_sec).min(self.burst);
            entry.last_refill = now;
        }
        if entry.tokens >= 1.0 {
            entry.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn sweep_if_needed(&self) {
        let now = Instant::now();
        let mut last = self.last_sweep.lock().unwrap_or_else(|e| e.into_inner());
        if now.saturating_duration_since(*last) < self.idle_after {
            return;
        }
        *last = now;
        drop(last);
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| {
            now.saturating_duration_since(bucket.last_refill) < self.idle_after
        });
        debug!(
            "rate limiter swept {} idle clients",
            before.saturating_sub(self.buckets.len())
        );
    }

    fn log_drops_if_needed(&self) {
        let now = Instant::now();
        let mut last = self.last_log.lock().unwrap_or_else(|e| e.into_inner());
        if now.saturating_duration_since(*last) >= LOG_INTERVAL {
            let dropped = self.dropped_since_log.swap(0, Ordering::Relaxed);
            if dropped > 0 {
                warn!("rate limiter dropped {dropped} requests in the last minute");
            }
            *last = now;
        }
    }
}
