use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    Error, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::collections::HashMap;
use std::future::{ready, Ready};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Fenêtre glissante par IP, état local au processus (pas distribué).
pub struct SlidingWindow {
    max_requests: usize,
    window: Duration,
    hits: Mutex<HashMap<String, Vec<Instant>>>,
}

impl SlidingWindow {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Records a hit for the key and tells whether it is still under the limit.
    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let Ok(mut hits) = self.hits.lock() else {
            return true;
        };

        let window = self.window;
        let entry = hits.entry(key.to_string()).or_default();
        entry.retain(|t| now.duration_since(*t) < window);

        if entry.len() >= self.max_requests {
            return false;
        }
        entry.push(now);
        true
    }

    /// Oublie les IP sans requête dans la fenêtre, sinon la table grossit
    /// d'une clé par IP distincte pour toute la vie du processus.
    /// Retourne combien de clés ont été retirées.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let Ok(mut hits) = self.hits.lock() else {
            return 0;
        };
        let before = hits.len();
        let window = self.window;
        hits.retain(|_, stamps| stamps.iter().any(|t| now.duration_since(*t) < window));
        before - hits.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.hits.lock().map(|h| h.len()).unwrap_or(0)
    }
}

/// Rate limiter middleware over an injectable shared window state.
pub struct RateLimiter {
    state: Arc<SlidingWindow>,
}

impl RateLimiter {
    pub fn new(state: Arc<SlidingWindow>) -> Self {
        Self { state }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimiterService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterService {
            service,
            state: Arc::clone(&self.state),
        }))
    }
}

pub struct RateLimiterService<S> {
    service: S,
    state: Arc<SlidingWindow>,
}

impl<S, B> Service<ServiceRequest> for RateLimiterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let ip = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        if !self.state.allow(&ip) {
            log::warn!("🚦 Rate limit exceeded for {}", ip);
            let response = HttpResponse::TooManyRequests().json(serde_json::json!({
                "success": false,
                "error": "Too many requests, please slow down",
            }));
            return Box::pin(async move {
                Err(InternalError::from_response("rate limited", response).into())
            });
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_under_limit() {
        let window = SlidingWindow::new(3, Duration::from_secs(60));
        assert!(window.allow("1.2.3.4"));
        assert!(window.allow("1.2.3.4"));
        assert!(window.allow("1.2.3.4"));
    }

    #[test]
    fn test_blocks_over_limit() {
        let window = SlidingWindow::new(2, Duration::from_secs(60));
        assert!(window.allow("1.2.3.4"));
        assert!(window.allow("1.2.3.4"));
        assert!(!window.allow("1.2.3.4"));
        // other IPs have their own window
        assert!(window.allow("5.6.7.8"));
    }

    #[test]
    fn test_sweep_reclaims_idle_keys() {
        let window = SlidingWindow::new(5, Duration::from_millis(10));
        for i in 0..50 {
            assert!(window.allow(&format!("10.0.0.{}", i)));
        }
        assert_eq!(window.tracked_keys(), 50);

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(window.sweep(), 50);
        assert_eq!(window.tracked_keys(), 0);
    }

    #[test]
    fn test_sweep_keeps_active_keys() {
        let window = SlidingWindow::new(5, Duration::from_secs(60));
        window.allow("1.2.3.4");

        assert_eq!(window.sweep(), 0);
        assert_eq!(window.tracked_keys(), 1);
    }

    #[test]
    fn test_window_slides() {
        let window = SlidingWindow::new(1, Duration::from_millis(20));
        assert!(window.allow("1.2.3.4"));
        assert!(!window.allow("1.2.3.4"));
        std::thread::sleep(Duration::from_millis(30));
        assert!(window.allow("1.2.3.4"));
    }
}
