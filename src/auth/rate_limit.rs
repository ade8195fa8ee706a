use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use chrono::{DateTime, Utc, Duration};

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window_size: Duration,
    pub max_attempts: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_size: Duration::minutes(1),
            max_attempts: 10,
        }
    }
}

#[derive(Debug)]
struct RequestWindow {
    timestamps: Vec<DateTime<Utc>>,
}

impl RequestWindow {
    fn new() -> Self {
        Self {
            timestamps: Vec::new(),
        }
    }

    fn cleanup_old_requests(&mut self, window_size: Duration) {
        let cutoff = Utc::now() - window_size;
        self.timestamps.retain(|ts| *ts > cutoff);
    }

    fn add_request(&mut self) {
        self.timestamps.push(Utc::now());
    }

    fn request_count(&self) -> usize {
        self.timestamps.len()
    }
}

/// Sliding-window limiter for login attempts, keyed by email so a burst of
/// failures against one account cannot lock out the rest.
pub struct RateLimiter {
    windows: Arc<RwLock<HashMap<String, RequestWindow>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    pub async fn check_rate_limit(&self, email: &str) -> bool {
        let mut windows = self.windows.write().await;

        // Get or create window for this email
        let window = windows
            .entry(email.to_string())
            .or_insert_with(RequestWindow::new);

        // Cleanup old requests
        window.cleanup_old_requests(self.config.window_size);

        // Check if under limit
        if window.request_count() < self.config.max_attempts as usize {
            window.add_request();
            true
        } else {
            false
        }
    }

    pub async fn cleanup(&self) {
        let mut windows = self.windows.write().await;

        // Remove windows with no recent requests
        windows.retain(|_, window| {
            window.cleanup_old_requests(self.config.window_size);
            !window.timestamps.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Duration as TokioDuration};

    #[tokio::test]
    async fn test_rate_limiter() {
        let mut config = RateLimitConfig::default();
        // Use a shorter window for testing
        config.window_size = Duration::seconds(1);
        let limiter = RateLimiter::new(config);

        // Should allow requests up to limit
        for _ in 0..10 {
            assert!(limiter.check_rate_limit("dev@example.com").await);
        }

        // Should deny requests over limit
        assert!(!limiter.check_rate_limit("dev@example.com").await);

        // Other emails are unaffected
        assert!(limiter.check_rate_limit("other@example.com").await);

        // Wait for window to pass
        sleep(TokioDuration::from_millis(1100)).await;

        // Should allow requests again
        assert!(limiter.check_rate_limit("dev@example.com").await);
    }

    #[tokio::test]
    async fn test_cleanup_drops_idle_windows() {
        let mut config = RateLimitConfig::default();
        config.window_size = Duration::milliseconds(50);
        let limiter = RateLimiter::new(config);

        assert!(limiter.check_rate_limit("dev@example.com").await);
        sleep(TokioDuration::from_millis(100)).await;
        limiter.cleanup().await;

        let windows = limiter.windows.read().await;
        assert!(windows.is_empty());
    }
}
