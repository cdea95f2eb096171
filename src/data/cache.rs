//! Local data caching
//!
//! Caches the normalized option chain to avoid hitting the exchange more than
//! once per freshness window. Storage ([`CacheProvider`]) is separate from
//! the freshness policy ([`SnapshotAcquirer`]).

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

use super::nse::{normalize_chain, MarketDataSource};
use crate::core::{AlertError, AlertResult, Snapshot};

/// Cached bytes and the time they were stored
#[derive(Debug, Clone, PartialEq)]
pub struct CachedBlob {
    pub bytes: Vec<u8>,
    pub stored_at: DateTime<Utc>,
}

/// Key/blob storage used by the acquirer
pub trait CacheProvider {
    /// Stored blob for `key`, `None` on a miss
    fn get(&self, key: &str) -> AlertResult<Option<CachedBlob>>;

    /// Store `bytes` under `key`, replacing prior content
    fn put(&self, key: &str, bytes: &[u8]) -> AlertResult<()>;
}

/// File-backed cache, one `<key>.json` file per key.
///
/// Staleness comes from file modification time. There is no locking:
/// concurrent runs sharing a directory race and the last writer wins.
pub struct FileCache {
    cache_dir: PathBuf,
}

impl FileCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> AlertResult<Self> {
        let cache_dir = cache_dir.into();
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir)?;
        }
        Ok(Self { cache_dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }
}

impl CacheProvider for FileCache {
    fn get(&self, key: &str) -> AlertResult<Option<CachedBlob>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let modified: DateTime<Utc> = fs::metadata(&path)?.modified()?.into();
        let bytes = fs::read(&path)?;

        Ok(Some(CachedBlob {
            bytes,
            stored_at: modified,
        }))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> AlertResult<()> {
        let path = self.path_for(key);
        fs::write(&path, bytes)?;
        tracing::info!("Cached {} at {:?}", key, path);
        Ok(())
    }
}

/// In-process cache with caller-controlled timestamps
#[derive(Default)]
pub struct MemoryCache {
    entries: RefCell<HashMap<String, CachedBlob>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry with an explicit store time
    pub fn insert_at(&self, key: &str, bytes: Vec<u8>, stored_at: DateTime<Utc>) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), CachedBlob { bytes, stored_at });
    }
}

impl CacheProvider for MemoryCache {
    fn get(&self, key: &str) -> AlertResult<Option<CachedBlob>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn put(&self, key: &str, bytes: &[u8]) -> AlertResult<()> {
        self.insert_at(key, bytes.to_vec(), Utc::now());
        Ok(())
    }
}

/// Obtains a snapshot, reusing the cache while it is fresh
pub struct SnapshotAcquirer {
    source: Box<dyn MarketDataSource>,
    cache: Box<dyn CacheProvider>,
    symbol: String,
    ttl: Duration,
}

impl SnapshotAcquirer {
    pub fn new(
        source: Box<dyn MarketDataSource>,
        cache: Box<dyn CacheProvider>,
        symbol: impl Into<String>,
        ttl_minutes: i64,
    ) -> Self {
        Self {
            source,
            cache,
            symbol: symbol.into(),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Cache key for this symbol's chain
    pub fn cache_key(&self) -> String {
        format!("{}_chain", self.symbol.to_lowercase())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn acquire(&self) -> AlertResult<Snapshot> {
        self.acquire_at(Utc::now())
    }

    /// Acquire as of `now`.
    ///
    /// A fresh cache entry is returned as-is with no network call. On fetch
    /// failure the cache is left untouched and the error is returned.
    pub fn acquire_at(&self, now: DateTime<Utc>) -> AlertResult<Snapshot> {
        let key = self.cache_key();

        if let Some(snapshot) = self.load_fresh(&key, now) {
            tracing::info!(
                "Loaded {} chain from cache ({} contracts)",
                self.symbol,
                snapshot.len()
            );
            return Ok(snapshot);
        }

        tracing::info!("Fetching fresh {} option chain", self.symbol);
        let response = self.source.fetch_chain(&self.symbol)?;
        let snapshot = normalize_chain(&self.symbol, &response)?;

        match serde_json::to_vec_pretty(&snapshot) {
            Ok(bytes) => {
                if let Err(e) = self.cache.put(&key, &bytes) {
                    tracing::warn!("Failed to write {} cache: {}", key, e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize {} snapshot: {}", self.symbol, e),
        }

        Ok(snapshot)
    }

    /// Cached snapshot if present, younger than the TTL and decodable
    fn load_fresh(&self, key: &str, now: DateTime<Utc>) -> Option<Snapshot> {
        let blob = match self.cache.get(key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        if now - blob.stored_at >= self.ttl {
            tracing::debug!("Cache for {} is stale", key);
            return None;
        }

        match serde_json::from_slice::<Snapshot>(&blob.bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Ignoring corrupt cache {}: {}", key, AlertError::from(e));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContractQuote, OptionType};
    use crate::data::nse::ChainResponse;
    use chrono::NaiveDate;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::tempdir;

    const CHAIN: &str = r#"{"records": {"underlyingValue": 18100.0, "data": [
        {"strikePrice": 18100, "CE": {"lastPrice": 42.5, "impliedVolatility": 11.0,
         "openInterest": 5000, "changeinOpenInterest": 1200, "expiryDate": "28-Nov-2024"}}
    ]}}"#;

    /// Market data double counting calls
    struct MockSource {
        calls: Rc<Cell<usize>>,
        fail: bool,
    }

    impl MarketDataSource for MockSource {
        fn fetch_chain(&self, _symbol: &str) -> AlertResult<ChainResponse> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(AlertError::network("NSE fetch failed: HTTP 401"));
            }
            Ok(serde_json::from_str(CHAIN).unwrap())
        }
    }

    /// Cache handle shared between the test and the acquirer
    #[derive(Clone, Default)]
    struct SharedCache(Rc<MemoryCache>);

    impl CacheProvider for SharedCache {
        fn get(&self, key: &str) -> AlertResult<Option<CachedBlob>> {
            self.0.get(key)
        }

        fn put(&self, key: &str, bytes: &[u8]) -> AlertResult<()> {
            self.0.put(key, bytes)
        }
    }

    fn cached_snapshot() -> Snapshot {
        let mut snap = Snapshot::new("NIFTY", 18000.0);
        let expiry = NaiveDate::from_ymd_opt(2024, 11, 28).unwrap();
        snap.push(ContractQuote::new(18000.0, OptionType::Call, 21.0, 12.5, 1500, 250, expiry, 18000.0));
        snap.push(ContractQuote::new(17950.0, OptionType::Put, 8.25, 13.75, 900, -40, expiry, 18000.0));
        snap
    }

    fn acquirer(cache: SharedCache, fail: bool) -> (SnapshotAcquirer, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let source = MockSource { calls: calls.clone(), fail };
        (SnapshotAcquirer::new(Box::new(source), Box::new(cache), "NIFTY", 10), calls)
    }

    #[test]
    fn test_fresh_cache_skips_network() {
        let cache = SharedCache::default();
        let now = Utc::now();
        let snap = cached_snapshot();
        cache.0.insert_at("nifty_chain", serde_json::to_vec(&snap).unwrap(), now - Duration::minutes(9));

        let (acq, calls) = acquirer(cache, false);
        let loaded = acq.acquire_at(now).unwrap();

        assert_eq!(calls.get(), 0);
        assert_eq!(loaded, snap);
    }

    #[test]
    fn test_stale_cache_refetches_and_overwrites() {
        let cache = SharedCache::default();
        let now = Utc::now();
        let stale = cached_snapshot();
        cache.0.insert_at("nifty_chain", serde_json::to_vec(&stale).unwrap(), now - Duration::minutes(10));

        let (acq, calls) = acquirer(cache.clone(), false);
        let fresh = acq.acquire_at(now).unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(fresh.spot, 18100.0);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh.contracts[0].open_interest_change, 1200);

        let stored = cache.get("nifty_chain").unwrap().unwrap();
        let stored: Snapshot = serde_json::from_slice(&stored.bytes).unwrap();
        assert_eq!(stored, fresh);
    }

    #[test]
    fn test_fetch_failure_leaves_cache_untouched() {
        let cache = SharedCache::default();
        let now = Utc::now();
        let stale_at = now - Duration::hours(2);
        let bytes = serde_json::to_vec(&cached_snapshot()).unwrap();
        cache.0.insert_at("nifty_chain", bytes.clone(), stale_at);

        let (acq, calls) = acquirer(cache.clone(), true);
        let err = acq.acquire_at(now).unwrap_err();

        assert_eq!(calls.get(), 1);
        assert!(err.is_acquisition_failure());
        let blob = cache.get("nifty_chain").unwrap().unwrap();
        assert_eq!(blob.bytes, bytes);
        assert_eq!(blob.stored_at, stale_at);
    }

    #[test]
    fn test_corrupt_cache_is_a_miss() {
        let cache = SharedCache::default();
        cache.0.insert_at("nifty_chain", b"not json".to_vec(), Utc::now());

        let (acq, calls) = acquirer(cache, false);
        let snap = acq.acquire().unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(snap.spot, 18100.0);
    }

    #[test]
    fn test_file_cache_round_trip() {
        let temp_dir = tempdir().unwrap();
        let cache = FileCache::new(temp_dir.path().join("cache")).unwrap();

        assert!(cache.get("nifty_chain").unwrap().is_none());

        let snap = cached_snapshot();
        cache.put("nifty_chain", &serde_json::to_vec(&snap).unwrap()).unwrap();

        let blob = cache.get("nifty_chain").unwrap().unwrap();
        assert!(Utc::now() - blob.stored_at < Duration::minutes(1));
        let loaded: Snapshot = serde_json::from_slice(&blob.bytes).unwrap();
        assert_eq!(loaded, snap);
        assert!(cache.path_for("nifty_chain").exists());
    }

    #[test]
    fn test_file_cache_with_acquirer() {
        let temp_dir = tempdir().unwrap();
        let calls = Rc::new(Cell::new(0));
        let source = MockSource { calls: calls.clone(), fail: false };
        let cache = FileCache::new(temp_dir.path()).unwrap();
        let acq = SnapshotAcquirer::new(Box::new(source), Box::new(cache), "NIFTY", 10);

        let first = acq.acquire().unwrap();
        let second = acq.acquire().unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(first, second);

        // Past the TTL the chain is fetched again
        acq.acquire_at(Utc::now() + Duration::minutes(11)).unwrap();
        assert_eq!(calls.get(), 2);
    }
}
