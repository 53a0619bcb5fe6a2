//! HTTP middleware - rate limiting, security headers, request logging

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Per-IP fixed-window rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    /// Map of IP -> (request count, window start)
    requests: DashMap<String, (u32, Instant)>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            requests: DashMap::new(),
            limit: requests_per_minute,
            window: Duration::from_secs(60),
        }
    }

    /// Returns (allowed, remaining, reset_after_secs) and updates the counter.
    pub fn check_request(&self, ip: &str) -> (bool, u32, u64) {
        let now = Instant::now();

        let mut entry = self.requests.entry(ip.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        if now.duration_since(*window_start) >= self.window {
            *count = 0;
            *window_start = now;
        }

        let remaining = self.limit.saturating_sub(*count);
        let reset_after = self
            .window
            .checked_sub(now.duration_since(*window_start))
            .map(|d| d.as_secs())
            .unwrap_or(0);

        if *count >= self.limit {
            return (false, 0, reset_after);
        }

        *count += 1;
        (true, remaining.saturating_sub(1), reset_after)
    }

    /// Drop expired windows (call periodically).
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.requests
            .retain(|_, (_, window_start)| now.duration_since(*window_start) < self.window * 2);
    }
}

#[derive(Clone)]
pub struct RateLimitState {
    pub limiter: Arc<RateLimiter>,
    pub limit: u32,
}

impl RateLimitState {
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::new(requests_per_minute)),
            limit: requests_per_minute,
        }
    }
}

/// Client IP, preferring proxy headers over the socket address.
fn get_client_ip(headers: &HeaderMap, addr: Option<&SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(ip) = value.split(',').next() {
                return ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip) = real_ip.to_str() {
            return ip.trim().to_string();
        }
    }

    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let client_ip = get_client_ip(&headers, Some(&addr));
    let (allowed, remaining, reset_after) = state.limiter.check_request(&client_ip);

    if !allowed {
        warn!(
            client_ip = %client_ip,
            path = %request.uri().path(),
            "Rate limit exceeded"
        );

        let mut response = StatusCode::TOO_MANY_REQUESTS.into_response();
        let headers = response.headers_mut();
        headers.insert("X-RateLimit-Limit", HeaderValue::from(state.limit));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from(0u32));
        headers.insert("Retry-After", HeaderValue::from(reset_after));
        return Err(response);
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(state.limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(remaining));
    Ok(response)
}

pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "Cache-Control",
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );
    headers.remove("Server");

    response
}

/// Request logging keyed on outcome severity.
pub async fn logging_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client_ip = get_client_ip(&headers, Some(&addr));

    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            client_ip = %client_ip,
            "Request failed"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            client_ip = %client_ip,
            "Client error"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            client_ip = %client_ip,
            "Request completed"
        );
    }

    response
}
