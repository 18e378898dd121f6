use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("connection attempt timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection failed: {0}")]
    Failure(String),
}

/// Reconnect policy shared by every fresh connect.
#[derive(Debug, Clone)]
pub struct ConnectionPolicy {
    /// A cached handle older than this is closed and replaced.
    pub freshness: Duration,
    pub connect_timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for ConnectionPolicy {
    fn default() -> Self {
        Self {
            freshness: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            max_retries: 1,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_millis(2000),
        }
    }
}

impl ConnectionPolicy {
    /// Delay before retry number `attempt` (0-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

#[async_trait]
pub trait DbHandle: Clone + Send + Sync + 'static {
    /// Driver-side liveness, answered without a network round-trip.
    fn is_connected(&self) -> bool;
    /// Retires the handle from the cache. Clones already lent to requests must stay
    /// usable; driver resources are released when the last clone drops.
    async fn close(&self) -> Result<(), ConnectionError>;
}

#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Handle: DbHandle;
    async fn connect(&self) -> Result<Self::Handle, ConnectionError>;
}

/// Anything that can hand a ready database handle to a request.
#[async_trait]
pub trait ConnectionProvider: Send + Sync + 'static {
    type Handle: Send;
    async fn get_connection(&self) -> Result<Self::Handle, ConnectionError>;
}

#[async_trait]
impl<T: ConnectionProvider + ?Sized> ConnectionProvider for Arc<T> {
    type Handle = T::Handle;

    async fn get_connection(&self) -> Result<T::Handle, ConnectionError> {
        (**self).get_connection().await
    }
}

struct CachedHandle<H> {
    handle: H,
    acquired_at: Instant,
}

struct Slot<H> {
    cached: Option<CachedHandle<H>>,
    last_failure: Option<ConnectionError>,
}

/// Process-wide handle cache. Reconnects are serialized by the inner mutex, and
/// callers queued behind an attempt receive that attempt's outcome instead of
/// starting their own.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    policy: ConnectionPolicy,
    /// Completed connect cycles; only bumped while `slot` is locked.
    attempts: AtomicU64,
    slot: Mutex<Slot<C::Handle>>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, policy: ConnectionPolicy) -> Self {
        Self {
            connector,
            policy,
            attempts: AtomicU64::new(0),
            slot: Mutex::new(Slot {
                cached: None,
                last_failure: None,
            }),
        }
    }

    async fn connect_with_retry(&self) -> Result<C::Handle, ConnectionError> {
        let mut attempt: u32 = 0;
        loop {
            let result =
                match tokio::time::timeout(self.policy.connect_timeout, self.connector.connect())
                    .await
                {
                    Ok(inner) => inner,
                    Err(_) => Err(ConnectionError::Timeout(self.policy.connect_timeout)),
                };

            match result {
                Ok(handle) => return Ok(handle),
                Err(e) if attempt < self.policy.max_retries => {
                    let delay = self.policy.backoff_for(attempt);
                    log::warn!(
                        "⚠️  Database connect attempt {} failed: {} (retrying in {:?})",
                        attempt + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    log::error!(
                        "❌ Database connect failed after {} attempt(s): {}",
                        attempt + 1,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl<C: Connector> ConnectionProvider for ConnectionManager<C> {
    type Handle = C::Handle;

    async fn get_connection(&self) -> Result<C::Handle, ConnectionError> {
        let seen = self.attempts.load(Ordering::Acquire);
        let mut slot = self.slot.lock().await;

        if let Some(entry) = slot.cached.as_ref() {
            if entry.handle.is_connected() && entry.acquired_at.elapsed() < self.policy.freshness
            {
                return Ok(entry.handle.clone());
            }
        }

        // An attempt finished while this caller was queued: share its failure
        if self.attempts.load(Ordering::Acquire) != seen {
            if let Some(e) = slot.last_failure.clone() {
                return Err(e);
            }
        }

        if let Some(stale) = slot.cached.take() {
            log::debug!(
                "♻️  Discarding database handle acquired {:?} ago",
                stale.acquired_at.elapsed()
            );
            if let Err(e) = stale.handle.close().await {
                log::warn!("⚠️  Failed to close stale database handle: {}", e);
            }
        }

        let result = self.connect_with_retry().await;
        self.attempts.fetch_add(1, Ordering::Release);

        match result {
            Ok(handle) => {
                slot.last_failure = None;
                slot.cached = Some(CachedHandle {
                    handle: handle.clone(),
                    acquired_at: Instant::now(),
                });
                Ok(handle)
            }
            Err(e) => {
                slot.last_failure = Some(e.clone());
                Err(e)
            }
        }
    }
}
