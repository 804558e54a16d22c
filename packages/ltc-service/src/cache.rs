//! In-process cache of provider responses.
//!
//! Entries expire lazily: an entry older than the TTL is treated as absent and dropped on the
//! next read. There is no background sweep.

use std::sync::{Arc, Mutex, PoisonError};

use ahash::AHashMap;
use time::{Duration, OffsetDateTime};

use ltc_providers::Candidate;

pub const DEFAULT_TTL_HOURS: i64 = 24;

pub trait Clock
where
	Self: Send + Sync,
{
	fn now(&self) -> OffsetDateTime;
}

pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// A clock that only moves when told to.
pub struct ManualClock {
	now: Mutex<OffsetDateTime>,
}
impl ManualClock {
	pub fn new(start: OffsetDateTime) -> Self {
		Self { now: Mutex::new(start) }
	}

	pub fn advance(&self, by: Duration) {
		let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);

		*now += by;
	}
}

impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.now.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

#[derive(Clone, Debug)]
pub struct CacheEntry {
	pub created_at: OffsetDateTime,
	pub candidates: Vec<Candidate>,
}

pub struct ResponseCache {
	ttl: Duration,
	clock: Arc<dyn Clock>,
	entries: Mutex<AHashMap<String, CacheEntry>>,
}
impl ResponseCache {
	pub fn new(ttl: Duration) -> Self {
		Self::with_clock(ttl, Arc::new(SystemClock))
	}

	pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
		Self { ttl, clock, entries: Mutex::new(AHashMap::new()) }
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	pub fn get(&self, key: &str) -> Option<Vec<Candidate>> {
		let now = self.clock.now();
		let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
		let entry = entries.get(key)?;

		if now - entry.created_at > self.ttl {
			entries.remove(key);

			return None;
		}

		Some(entry.candidates.clone())
	}

	/// Last writer wins when concurrent requests populate the same key.
	pub fn insert(&self, key: String, candidates: Vec<Candidate>) {
		let entry = CacheEntry { created_at: self.clock.now(), candidates };

		self.entries.lock().unwrap_or_else(PoisonError::into_inner).insert(key, entry);
	}

	pub fn len(&self) -> usize {
		self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
impl Default for ResponseCache {
	fn default() -> Self {
		Self::new(Duration::hours(DEFAULT_TTL_HOURS))
	}
}

/// Short stable digest of a cache key for log fields.
pub fn cache_key_prefix(key: &str) -> String {
	let digest = blake3::hash(key.as_bytes()).to_hex();

	digest.as_str()[..12].to_string()
}
