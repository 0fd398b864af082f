use std::sync::Arc;

use crate::cache::SnapshotCache;
use crate::config::settings;
use crate::db::editor_repo::EditorDirectory;
use crate::db::storage::RosterStorage;
use crate::publish::PublishController;
use crate::query::{EditDistanceMatcher, FuzzyMatcher};
use crate::staging::StagingStore;

/// Everything the HTTP handlers share.
pub struct AppState {
    pub store: Arc<StagingStore>,
    pub cache: Arc<SnapshotCache>,
    pub controller: PublishController,
    pub editors: Arc<dyn EditorDirectory>,
    pub matcher: Arc<dyn FuzzyMatcher>,
    pub jwt_secret: String,
}

impl AppState {
    /// Wire the core around a storage backend using process settings.
    pub fn new(
        storage: Arc<dyn RosterStorage>,
        editors: Arc<dyn EditorDirectory>,
        jwt_secret: String,
    ) -> Self {
        let cfg = settings();
        let store = Arc::new(StagingStore::new(storage));
        let cache = Arc::new(SnapshotCache::new(cfg.snapshot_ttl()));
        let controller = PublishController::new(store.clone(), cache.clone());
        Self {
            store,
            cache,
            controller,
            editors,
            matcher: Arc::new(EditDistanceMatcher::new(cfg.search_threshold)),
            jwt_secret,
        }
    }

    /// Swap the snapshot cache (tests use a zero TTL to always read through).
    pub fn with_cache(mut self, cache: SnapshotCache) -> Self {
        self.cache = Arc::new(cache);
        self.controller = PublishController::new(self.store.clone(), self.cache.clone());
        self
    }
}
