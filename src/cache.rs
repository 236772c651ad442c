use bytes::Bytes;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// Entry-count bound on the underlying `LruCache`, independent of the byte
/// bounds below. Whichever bound is hit first drives eviction.
pub const CACHE_CAPACITY: usize = 10_000;
/// Default total byte bound across all entries (§3: `MAX_TOTAL`).
pub const MAX_CACHE_BYTES: usize = 200 * 1024 * 1024;
/// Default per-entry byte bound (§3: `MAX_ENTRY`).
pub const MAX_ENTRY_BYTES: usize = 10 * 1024 * 1024;
/// Fixed per-entry accounting overhead folded into `cost`.
const ENTRY_OVERHEAD: usize = 64;

/// A cached response payload plus enough of the original status line and
/// headers to replay it verbatim on a hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedResponse {
    pub status_line: String,
    pub headers: Vec<String>,
    pub body: Bytes,
    pub expires: u64,
}

impl CachedResponse {
    /// `cost = len(payload) + len(key) + fixed overhead` (§3). The key
    /// itself is a fixed-size `u64` hash rather than the raw request bytes,
    /// so its contribution is `size_of::<u64>()`.
    fn cost(&self) -> usize {
        self.status_line.len()
            + self.headers.iter().map(|h| h.len()).sum::<usize>()
            + self.body.len()
            + std::mem::size_of::<u64>()
            + ENTRY_OVERHEAD
    }
}

/// Thread-safe LRU-evicting response cache keyed by request fingerprint.
///
/// All mutation (insert, touch, evict) and lookup go through the single
/// `Mutex`-guarded `LruCache`; `total_bytes` is tracked separately so bound
/// checks don't require walking every entry.
#[derive(Clone)]
pub struct ProxyCache {
    entries: Arc<Mutex<LruCache<u64, CachedResponse>>>,
    total_bytes: Arc<AtomicUsize>,
    max_total: usize,
    max_entry: usize,
}

impl ProxyCache {
    pub fn new() -> Self {
        Self::with_bounds(CACHE_CAPACITY, MAX_CACHE_BYTES, MAX_ENTRY_BYTES)
    }

    /// Builds a cache with explicit bounds, used by tests that exercise
    /// eviction under tight limits (spec §8 scenario 6).
    pub fn with_bounds(capacity: usize, max_total: usize, max_entry: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).expect("cache capacity must be non-zero"),
            ))),
            total_bytes: Arc::new(AtomicUsize::new(0)),
            max_total,
            max_entry,
        }
    }

    /// Looks up `key`, treating an expired hit as a miss and evicting it
    /// eagerly (P4: touches `last_access`/recency on a live hit).
    pub async fn lookup(&self, key: u64) -> Option<CachedResponse> {
        let mut entries = self.entries.lock().await;
        let now = now_secs();

        match entries.get(&key) {
            Some(entry) if entry.expires > now => Some(entry.clone()),
            Some(_) => {
                if let Some(expired) = entries.pop(&key) {
                    self.total_bytes.fetch_sub(expired.cost(), Ordering::Relaxed);
                }
                None
            }
            None => None,
        }
    }

    /// Inserts `response` under `key`. Rejects entries whose cost exceeds
    /// the per-entry bound (P2) without touching the store, then evicts
    /// least-recently-used entries (P3) until the total bound (P1) is
    /// satisfied. Replacing an existing key is treated as a plain update of
    /// its cost accounting, preserving the single-entry-per-key invariant.
    pub async fn insert(&self, key: u64, response: CachedResponse) -> bool {
        let cost = response.cost();
        if cost > self.max_entry {
            return false;
        }

        let mut entries = self.entries.lock().await;

        if let Some(old) = entries.pop(&key) {
            self.total_bytes.fetch_sub(old.cost(), Ordering::Relaxed);
        }

        while self.total_bytes.load(Ordering::Relaxed) + cost > self.max_total && !entries.is_empty() {
            match entries.pop_lru() {
                Some((_, evicted)) => {
                    self.total_bytes.fetch_sub(evicted.cost(), Ordering::Relaxed);
                }
                None => break,
            }
        }

        // `push` (not `put`) because at `CACHE_CAPACITY` it evicts the LRU
        // entry and hands it back instead of silently dropping it — the key
        // was already popped above, so a `Some` here is always a
        // capacity-driven eviction of some other entry, whose cost must
        // still be subtracted to keep total_bytes == Σ cost(entry) (I1).
        if let Some((_, evicted)) = entries.push(key, response) {
            self.total_bytes.fetch_sub(evicted.cost(), Ordering::Relaxed);
        }
        self.total_bytes.fetch_add(cost, Ordering::Relaxed);
        true
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        entries.clear();
        self.total_bytes.store(0, Ordering::Relaxed);
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes.load(Ordering::Relaxed)
    }

    /// Per-entry byte bound this cache enforces (P2), exposed so callers
    /// can avoid capturing response bytes past the point where insertion
    /// would be rejected anyway.
    pub fn max_entry_bytes(&self) -> usize {
        self.max_entry
    }

    /// Marks `key` as most-recently-used without returning its payload,
    /// used by tests to set up a deterministic eviction order (spec §8
    /// scenario 6: "touch k2" before inserting k3).
    pub async fn touch(&self, key: u64) {
        let mut entries = self.entries.lock().await;
        entries.get(&key);
    }

    pub async fn contains(&self, key: u64) -> bool {
        self.entries.lock().await.peek(&key).is_some()
    }
}

impl Default for ProxyCache {
    fn default() -> Self {
        Self::new()
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str, expires: u64) -> CachedResponse {
        CachedResponse {
            status_line: "HTTP/1.1 200 OK\r\n".to_string(),
            headers: vec!["Content-Type: text/plain".to_string()],
            body: Bytes::from(body.to_string()),
            expires,
        }
    }

    #[tokio::test]
    async fn miss_on_empty_cache() {
        let cache = ProxyCache::new();
        assert!(cache.lookup(1).await.is_none());
    }

    #[tokio::test]
    async fn insert_then_lookup_hits() {
        let cache = ProxyCache::new();
        let entry = response("A", u64::MAX);
        assert!(cache.insert(1, entry.clone()).await);
        assert_eq!(cache.lookup(1).await, Some(entry));
    }

    #[tokio::test]
    async fn expired_entry_is_treated_as_miss_and_evicted() {
        let cache = ProxyCache::new();
        let now = now_secs();
        cache.insert(1, response("stale", now.saturating_sub(1))).await;
        assert!(cache.lookup(1).await.is_none());
        assert!(!cache.contains(1).await);
        assert_eq!(cache.total_bytes(), 0);
    }

    #[tokio::test]
    async fn oversized_entry_rejected_without_touching_store() {
        let cache = ProxyCache::with_bounds(100, 10_000_000, 1_000);
        let huge = response(&"x".repeat(2_000), u64::MAX);
        assert!(!cache.insert(1, huge).await);
        assert_eq!(cache.len().await, 0);
        assert_eq!(cache.total_bytes(), 0);
    }

    #[tokio::test]
    async fn total_bytes_never_exceeds_bound_p1() {
        let cache = ProxyCache::with_bounds(100, 3_000, 2_500);
        for i in 0..20u64 {
            cache.insert(i, response(&"x".repeat(500), u64::MAX)).await;
            assert!(cache.total_bytes() <= 3_000);
        }
    }

    #[tokio::test]
    async fn eviction_under_pressure_scenario_6() {
        // MAX_TOTAL = 3 MiB (+ slack for fixed per-entry overhead), MAX_ENTRY
        // = 2 MiB; two 1.5 MiB entries fill the store. Touching k2 then
        // inserting a third 1.5 MiB entry must evict k1, not k2.
        let one_half_mib = 1536 * 1024;
        let cache = ProxyCache::with_bounds(100, 3 * 1024 * 1024 + 8192, 2 * 1024 * 1024);

        let k1 = 1u64;
        let k2 = 2u64;
        let k3 = 3u64;

        assert!(cache.insert(k1, response(&"a".repeat(one_half_mib), u64::MAX)).await);
        assert!(cache.insert(k2, response(&"b".repeat(one_half_mib), u64::MAX)).await);
        cache.touch(k2).await;

        assert!(cache.insert(k3, response(&"c".repeat(one_half_mib), u64::MAX)).await);

        assert!(!cache.contains(k1).await, "k1 should have been evicted");
        assert!(cache.contains(k2).await, "k2 was touched, should survive");
        assert!(cache.contains(k3).await, "k3 was just inserted");
    }

    #[tokio::test]
    async fn replacing_existing_key_updates_cost_accounting() {
        let cache = ProxyCache::new();
        cache.insert(1, response("short", u64::MAX)).await;
        let after_first = cache.total_bytes();
        cache.insert(1, response(&"x".repeat(1000), u64::MAX)).await;
        assert_eq!(cache.len().await, 1);
        assert!(cache.total_bytes() > after_first);
    }

    #[tokio::test]
    async fn clear_resets_len_and_total_bytes() {
        let cache = ProxyCache::new();
        for i in 0..5u64 {
            cache.insert(i, response("x", u64::MAX)).await;
        }
        cache.clear().await;
        assert_eq!(cache.len().await, 0);
        assert_eq!(cache.total_bytes(), 0);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_inserts_stay_consistent() {
        use std::sync::Arc as StdArc;
        let cache = StdArc::new(ProxyCache::new());
        let mut handles = Vec::new();
        for i in 0..50u64 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache.insert(i, response("x", u64::MAX)).await;
                cache.lookup(i).await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert!(cache.len().await > 0);
        assert!(cache.len().await <= 50);
    }
}
