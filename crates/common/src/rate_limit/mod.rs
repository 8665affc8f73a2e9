//! Per-address admission control for the public contact API
//!
//! A fixed-window counter keyed by resolved client address. This is a
//! best-effort mechanism: state is per-process and in-memory, so it
//! resets on restart and does not coordinate across instances, and two
//! concurrent requests from one address may race on the counter. That
//! inaccuracy is accepted; the limiter bounds volume approximately.

use axum::http::HeaderMap;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Address used when no identifying header is present. All such clients
/// share a single bucket; accepted tradeoff.
pub const UNKNOWN_ADDR: &str = "unknown";

#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    window_start: Instant,
}

/// Fixed-window request limiter, constructed at startup and owned by the
/// application state.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request from `addr` and report whether it is admitted.
    /// The request that pushes the count strictly above the maximum is
    /// the first rejected one; later requests in the same window are
    /// rejected until the window elapses. Never fails.
    pub fn check(&self, addr: &str) -> bool {
        self.check_at(addr, Instant::now())
    }

    fn check_at(&self, addr: &str, now: Instant) -> bool {
        let mut buckets = self.buckets.lock().expect("rate limiter lock poisoned");

        match buckets.get_mut(addr) {
            None => {
                buckets.insert(
                    addr.to_string(),
                    Bucket { count: 1, window_start: now },
                );
                true
            }
            Some(bucket) => {
                if now.duration_since(bucket.window_start) > self.window {
                    bucket.count = 1;
                    bucket.window_start = now;
                    true
                } else {
                    bucket.count += 1;
                    bucket.count <= self.max_requests
                }
            }
        }
    }

    /// Drop buckets whose window has fully elapsed. Nothing prunes on
    /// the request path, so the server runs this periodically to keep
    /// the per-address map bounded.
    pub fn sweep(&self) {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) {
        let mut buckets = self.buckets.lock().expect("rate limiter lock poisoned");
        buckets.retain(|_, b| now.duration_since(b.window_start) <= self.window);
    }

    /// Number of live buckets, for diagnostics.
    pub fn bucket_count(&self) -> usize {
        self.buckets.lock().expect("rate limiter lock poisoned").len()
    }
}

/// Resolve the client address from proxy headers: the first
/// comma-separated `x-forwarded-for` entry, then `x-real-ip`, else
/// [`UNKNOWN_ADDR`].
pub fn client_addr(headers: &HeaderMap) -> String {
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = xff.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    UNKNOWN_ADDR.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn limiter() -> RateLimiter {
        RateLimiter::new(Duration::from_secs(60), 5)
    }

    #[test]
    fn test_admits_up_to_max_then_rejects() {
        let rl = limiter();
        let t0 = Instant::now();
        for _ in 0..5 {
            assert!(rl.check_at("203.0.113.9", t0));
        }
        // Sixth request in the same window is the first rejection.
        assert!(!rl.check_at("203.0.113.9", t0));
        assert!(!rl.check_at("203.0.113.9", t0));
    }

    #[test]
    fn test_window_reset_readmits() {
        let rl = limiter();
        let t0 = Instant::now();
        for _ in 0..6 {
            rl.check_at("203.0.113.9", t0);
        }
        assert!(!rl.check_at("203.0.113.9", t0));

        // Strictly past the window: bucket resets and the address is
        // admitted again.
        let later = t0 + Duration::from_secs(61);
        assert!(rl.check_at("203.0.113.9", later));
    }

    #[test]
    fn test_addresses_have_independent_buckets() {
        let rl = limiter();
        let t0 = Instant::now();
        for _ in 0..6 {
            rl.check_at("a", t0);
        }
        assert!(!rl.check_at("a", t0));
        assert!(rl.check_at("b", t0));
    }

    #[test]
    fn test_sweep_drops_expired_buckets() {
        let rl = limiter();
        let t0 = Instant::now();
        rl.check_at("a", t0);
        rl.check_at("b", t0 + Duration::from_secs(50));
        assert_eq!(rl.bucket_count(), 2);

        rl.sweep_at(t0 + Duration::from_secs(65));
        assert_eq!(rl.bucket_count(), 1);
    }

    #[test]
    fn test_client_addr_resolution() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("198.51.100.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("192.0.2.1"));
        assert_eq!(client_addr(&headers), "198.51.100.7");

        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("192.0.2.1"));
        assert_eq!(client_addr(&headers), "192.0.2.1");

        assert_eq!(client_addr(&HeaderMap::new()), UNKNOWN_ADDR);
    }

    #[test]
    fn test_clients_without_headers_share_one_bucket() {
        let rl = limiter();
        let t0 = Instant::now();
        for _ in 0..5 {
            assert!(rl.check_at(UNKNOWN_ADDR, t0));
        }
        // A different header-less client lands in the same bucket.
        assert!(!rl.check_at(UNKNOWN_ADDR, t0));
    }
}
