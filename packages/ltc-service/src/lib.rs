pub mod aggregate;
pub mod cache;
pub mod expansion;
pub mod outreach;
pub mod search;

mod error;

pub use cache::{Clock, ManualClock, ResponseCache, SystemClock};
pub use error::{Error, Result};
pub use outreach::{ComposeRequest, ComposeResponse, ContactMethod};
pub use search::{PartnerResult, SearchRequest, SearchResponse};

use std::sync::Arc;

use ltc_config::{Config, PolicyMatrix};
use ltc_domain::trust::TrustTuning;
use ltc_providers::{DiscoveryProvider, GeoBackend, curated::CuratedHubs, synthetic::SyntheticProvider};

/// Discovery backends keyed by channel: `geo` serves local partner types and `hubs` serves
/// mail-in channels.
#[derive(Clone)]
pub struct Providers {
	pub geo: Arc<dyn DiscoveryProvider>,
	pub hubs: Arc<dyn DiscoveryProvider>,
}
impl Providers {
	pub fn new(geo: Arc<dyn DiscoveryProvider>, hubs: Arc<dyn DiscoveryProvider>) -> Self {
		Self { geo, hubs }
	}

	pub fn from_config(cfg: &Config) -> ltc_providers::Result<Self> {
		let geo = GeoBackend::from_config(&cfg.discovery)?;

		Ok(Self::new(Arc::new(geo), Arc::new(CuratedHubs)))
	}
}

impl Default for Providers {
	fn default() -> Self {
		Self::new(Arc::new(SyntheticProvider), Arc::new(CuratedHubs))
	}
}

pub struct DispositionService {
	pub matrix: Arc<PolicyMatrix>,
	pub providers: Providers,
	pub cache: Option<ResponseCache>,
	pub tuning: TrustTuning,
	pub clock: Arc<dyn Clock>,
	pub language_code: String,
	pub region_code: String,
}
impl DispositionService {
	/// Synthetic discovery, curated hubs and no cache.
	pub fn new(matrix: Arc<PolicyMatrix>) -> Self {
		Self::with_providers(matrix, Providers::default())
	}

	pub fn with_providers(matrix: Arc<PolicyMatrix>, providers: Providers) -> Self {
		Self {
			matrix,
			providers,
			cache: None,
			tuning: TrustTuning::default(),
			clock: Arc::new(SystemClock),
			language_code: "en".to_string(),
			region_code: "US".to_string(),
		}
	}

	pub fn from_config(cfg: &Config, matrix: PolicyMatrix) -> ltc_providers::Result<Self> {
		let mut service = Self::with_providers(Arc::new(matrix), Providers::from_config(cfg)?)
			.with_locale(&cfg.discovery.language_code, &cfg.discovery.region_code);

		if cfg.cache.enabled {
			let ttl_hours = cfg.cache.ttl_hours.clamp(1, ltc_config::MAX_CACHE_TTL_HOURS);

			service = service.with_cache(ResponseCache::new(time::Duration::hours(ttl_hours)));
		}

		Ok(service)
	}

	pub fn with_cache(mut self, cache: ResponseCache) -> Self {
		self.cache = Some(cache);

		self
	}

	/// Clock used for response timestamps. The cache keeps its own.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	pub fn with_locale(mut self, language_code: &str, region_code: &str) -> Self {
		self.language_code = language_code.to_string();
		self.region_code = region_code.to_string();

		self
	}

	pub fn with_trust_tuning(mut self, tuning: TrustTuning) -> Self {
		self.tuning = tuning;

		self
	}
}
