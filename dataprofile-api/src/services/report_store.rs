use dataprofile_core::ReportArtifact;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Generated reports kept in memory so they can be opened or downloaded later.
/// The least recently used report is evicted once `capacity` is reached.
pub struct ReportStore {
    reports: Mutex<LruCache<Uuid, Arc<ReportArtifact>>>,
}

impl ReportStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            reports: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn insert(&self, artifact: ReportArtifact) -> Uuid {
        let id = Uuid::new_v4();
        let mut reports = self.reports.lock();
        if let Some((evicted, _)) = reports.push(id, Arc::new(artifact)) {
            if evicted != id {
                debug!("Evicted report {}", evicted);
            }
        }
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<ReportArtifact>> {
        self.reports.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.reports.lock().cap().get()
    }
}
