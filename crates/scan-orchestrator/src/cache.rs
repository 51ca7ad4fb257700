use dashmap::DashMap;
use scanner_core::{Interval, ScanError, ScanRequest};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::Instant;

/// Memoization key of a full scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanKey {
    pub limit_symbols: usize,
    pub top_n: usize,
    pub interval: Interval,
}

impl From<&ScanRequest> for ScanKey {
    fn from(request: &ScanRequest) -> Self {
        Self {
            limit_symbols: request.limit_symbols,
            top_n: request.top_n,
            interval: request.interval,
        }
    }
}

type Slot<T> = Arc<OnceCell<(Instant, Arc<T>)>>;

/// TTL cache with single-flight semantics: concurrent callers for the same
/// key wait on one computation. Failed computations are not stored.
pub struct ScanCache<T> {
    slots: DashMap<ScanKey, Slot<T>>,
    ttl: Duration,
}

impl<T> ScanCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            ttl,
        }
    }

    fn slot(&self, key: ScanKey) -> Slot<T> {
        let mut entry = self.slots.entry(key).or_default();
        let expired = entry
            .get()
            .map(|(computed_at, _)| computed_at.elapsed() >= self.ttl)
            .unwrap_or(false);
        if expired {
            tracing::debug!("Scan cache entry for {:?} expired", key);
            *entry = Arc::new(OnceCell::new());
        }
        Arc::clone(entry.value())
    }

    pub async fn get_or_compute<F, Fut>(&self, key: ScanKey, compute: F) -> Result<Arc<T>, ScanError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ScanError>>,
    {
        let slot = self.slot(key);
        let (_, value) = slot
            .get_or_try_init(|| async {
                let value = compute().await?;
                Ok::<_, ScanError>((Instant::now(), Arc::new(value)))
            })
            .await?;
        Ok(Arc::clone(value))
    }

    pub fn invalidate(&self) {
        self.slots.clear();
    }

    /// Number of keys holding a finished result that has not expired
    pub fn live_entries(&self) -> usize {
        self.slots
            .iter()
            .filter(|e| {
                e.value()
                    .get()
                    .map(|(at, _)| at.elapsed() < self.ttl)
                    .unwrap_or(false)
            })
            .count()
    }
}
