use super::discovery::Discovery;
use super::types::GatewayProfile;

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

struct Snapshot {
    entries: Vec<GatewayProfile>,
    fetched_at: Instant,
}

/// Last discovery result, served until it is older than the TTL.
///
/// Concurrent misses may each scan; the last writer wins. A scan that
/// started before an `invalidate()` is not stored.
pub struct RegistryCache {
    discovery: Discovery,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
    generation: AtomicU64,
}

impl RegistryCache {
    pub fn new(discovery: Discovery, ttl: Duration) -> Self {
        Self {
            discovery,
            ttl,
            snapshot: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Cached entries when fresh, otherwise a new discovery pass.
    pub fn get(&self) -> Vec<GatewayProfile> {
        if let Some(entries) = self.fresh_entries() {
            debug!("Registry cache hit ({} entries)", entries.len());
            return entries;
        }

        debug!("Registry cache miss, scanning profiles");
        let generation = self.generation.load(Ordering::Acquire);
        let entries = self.discovery.scan();

        let mut snapshot = self.snapshot.write();
        if self.generation.load(Ordering::Acquire) == generation {
            *snapshot = Some(Snapshot {
                entries: entries.clone(),
                fetched_at: Instant::now(),
            });
        }
        entries
    }

    /// Drop the snapshot so the next `get()` rescans.
    pub fn invalidate(&self) {
        let mut snapshot = self.snapshot.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        *snapshot = None;
        debug!("Registry cache invalidated");
    }

    /// Invalidate and scan immediately.
    pub fn refresh(&self) -> Vec<GatewayProfile> {
        self.invalidate();
        self.get()
    }

    fn fresh_entries(&self) -> Option<Vec<GatewayProfile>> {
        let snapshot = self.snapshot.read();
        snapshot
            .as_ref()
            .filter(|s| !s.entries.is_empty() && s.fetched_at.elapsed() < self.ttl)
            .map(|s| s.entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::layout::ProfileLayout;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_port(root: &Path, id: &str, port: u16) {
        let dir = root.join(format!(".openclaw-{id}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("openclaw.json"),
            format!(r#"{{"gateway": {{"port": {port}}}}}"#),
        )
        .unwrap();
    }

    fn cache(root: &Path, ttl: Duration) -> RegistryCache {
        RegistryCache::new(Discovery::new(ProfileLayout::new(root)), ttl)
    }

    #[test]
    fn serves_snapshot_within_ttl() {
        let root = TempDir::new().unwrap();
        write_port(root.path(), "a", 18800);
        let cache = cache(root.path(), Duration::from_secs(60));

        let first = cache.get();
        write_port(root.path(), "a", 18801);
        let second = cache.get();

        assert_eq!(first, second);
        assert_eq!(second[0].port, 18800);
    }

    #[test]
    fn invalidate_forces_rescan() {
        let root = TempDir::new().unwrap();
        write_port(root.path(), "a", 18800);
        let cache = cache(root.path(), Duration::from_secs(60));

        cache.get();
        write_port(root.path(), "a", 18801);
        cache.invalidate();
        assert_eq!(cache.get()[0].port, 18801);
    }

    #[test]
    fn expired_snapshot_is_rescanned() {
        let root = TempDir::new().unwrap();
        write_port(root.path(), "a", 18800);
        let cache = cache(root.path(), Duration::ZERO);

        cache.get();
        write_port(root.path(), "a", 18802);
        assert_eq!(cache.get()[0].port, 18802);
    }

    #[test]
    fn refresh_rescans_immediately() {
        let root = TempDir::new().unwrap();
        let cache = cache(root.path(), Duration::from_secs(60));
        assert!(cache.get()[0].placeholder);

        write_port(root.path(), "b", 18803);
        let entries = cache.refresh();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "b");
    }
}
