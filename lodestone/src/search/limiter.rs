//! Concurrency limiter for native generator invocations.
//!
//! Generator backends are external processes; running one per chunk of a
//! wide search would fork-bomb the host. Every invocation, across all
//! concurrent queries, first takes a permit from this limiter, so the
//! whole engine never exceeds its configured process budget even when
//! many searches fan out at once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Fallback permit count when core detection fails.
pub const FALLBACK_PERMITS: usize = 4;

/// Engine-wide limiter over concurrent generator processes.
#[derive(Debug)]
pub struct GeneratorLimiter {
    semaphore: Arc<Semaphore>,
    permits: usize,
    /// Uses Arc so permits can be 'static and move into spawned tasks.
    in_flight: Arc<AtomicUsize>,
    label: String,
}

impl GeneratorLimiter {
    /// Creates a limiter with an explicit permit count.
    ///
    /// # Arguments
    ///
    /// * `permits` - Maximum concurrent generator processes
    /// * `label` - Human-readable label for logging
    pub fn new(permits: usize, label: impl Into<String>) -> Self {
        assert!(permits > 0, "permits must be > 0");

        let label: String = label.into();
        tracing::info!(permits, label = %label, "Created generator limiter");

        Self {
            semaphore: Arc::new(Semaphore::new(permits)),
            permits,
            in_flight: Arc::new(AtomicUsize::new(0)),
            label,
        }
    }

    /// Creates a limiter sized to the host: one permit per core.
    pub fn with_defaults(label: impl Into<String>) -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(FALLBACK_PERMITS);

        Self::new(cpus, label)
    }

    /// Acquires a permit, waiting while the engine is at capacity.
    pub async fn acquire(&self) -> GeneratorPermit {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("generator semaphore closed");

        self.in_flight.fetch_add(1, Ordering::Relaxed);
        GeneratorPermit {
            _permit: permit,
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Returns the label for this limiter.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the configured permit count.
    pub fn permits(&self) -> usize {
        self.permits
    }

    /// Returns the number of permits not currently held.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Returns the number of invocations currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }
}

/// A permit for one generator invocation.
///
/// Released back to the limiter when dropped.
pub struct GeneratorPermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for GeneratorPermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_limiter_exposes_its_size() {
        let limiter = GeneratorLimiter::new(6, "test");
        assert_eq!(limiter.permits(), 6);
        assert_eq!(limiter.available(), 6);
        assert_eq!(limiter.in_flight(), 0);
        assert_eq!(limiter.label(), "test");
    }

    #[test]
    fn test_defaults_always_have_capacity() {
        let limiter = GeneratorLimiter::with_defaults("test");
        assert!(limiter.permits() >= 1);
    }

    #[tokio::test]
    async fn test_acquire_tracks_in_flight() {
        let limiter = GeneratorLimiter::new(2, "test");

        let first = limiter.acquire().await;
        let second = limiter.acquire().await;
        assert_eq!(limiter.in_flight(), 2);
        assert_eq!(limiter.available(), 0);

        drop(first);
        assert_eq!(limiter.in_flight(), 1);
        assert_eq!(limiter.available(), 1);

        drop(second);
        assert_eq!(limiter.in_flight(), 0);
        assert_eq!(limiter.available(), 2);
    }

    #[tokio::test]
    async fn test_waiter_resumes_on_release() {
        let limiter = Arc::new(GeneratorLimiter::new(1, "test"));

        let held = limiter.acquire().await;

        let waiter = {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move {
                let _permit = limiter.acquire().await;
            })
        };

        // The waiter cannot finish while the only permit is held.
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(held);
        waiter.await.unwrap();
        assert_eq!(limiter.in_flight(), 0);
    }
}
