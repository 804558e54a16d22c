//! Fixtures shared by the workspace's integration tests.

use std::{
	collections::{BTreeMap, HashMap, HashSet},
	sync::{
		Mutex, PoisonError,
		atomic::{AtomicUsize, Ordering},
	},
};

use ltc_config::PolicyMatrix;
use ltc_providers::{
	BoxFuture, Candidate, Contact, DiscoveryProvider, DiscoveryQuery, Error, PLACE_DETAILS,
	REVIEWS_SNIPPET, Result, WEBSITE_SNIPPET, synthetic::SyntheticProvider,
};

pub const BUNDLED_MATRIX_JSON: &str = include_str!("../../../config/disposition_matrix.v1.json");

pub fn bundled_matrix() -> ltc_config::Result<PolicyMatrix> {
	ltc_config::parse_matrix(BUNDLED_MATRIX_JSON)
}

/// A local candidate in Boise, ID whose website snippet is `website_snippet`.
///
/// Contact fields derive from `name` alone, so two candidates with the same name share an
/// identity whatever their ids.
pub fn candidate(partner_id: &str, name: &str, partner_type: &str, website_snippet: &str) -> Candidate {
	let slug = name.to_lowercase().replace(' ', "-");

	Candidate {
		partner_id: partner_id.to_string(),
		name: name.to_string(),
		partner_type: partner_type.to_string(),
		contact: Contact {
			phone: Some("+1-208-555-0100".to_string()),
			website: Some(format!("https://example.com/{slug}")),
			email: None,
			address: Some("100 Main St".to_string()),
			city: Some("Boise".to_string()),
			region: Some("ID".to_string()),
		},
		distance_miles: Some(5.0),
		rating: Some(4.5),
		user_ratings_total: Some(40),
		sources: BTreeMap::from([
			(WEBSITE_SNIPPET.to_string(), website_snippet.to_string()),
			(PLACE_DETAILS.to_string(), format!("{name} serves Boise.")),
			(REVIEWS_SNIPPET.to_string(), "Professional and friendly.".to_string()),
		]),
	}
}

/// A discovery provider that records every call.
///
/// Partner types with scripted candidates return exactly those, failing types return HTTP 503,
/// and every other type falls through to the synthetic backend.
pub struct ScriptedProvider {
	version_tag: String,
	scripted: HashMap<String, Vec<Candidate>>,
	failing: HashSet<String>,
	calls: AtomicUsize,
	queries: Mutex<Vec<DiscoveryQuery>>,
}
impl ScriptedProvider {
	pub fn new() -> Self {
		Self {
			version_tag: "scripted_v1".to_string(),
			scripted: HashMap::new(),
			failing: HashSet::new(),
			calls: AtomicUsize::new(0),
			queries: Mutex::new(Vec::new()),
		}
	}

	pub fn with_candidates(mut self, partner_type: &str, candidates: Vec<Candidate>) -> Self {
		self.scripted.insert(partner_type.to_string(), candidates);

		self
	}

	pub fn failing(mut self, partner_type: &str) -> Self {
		self.failing.insert(partner_type.to_string());

		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn queries(&self) -> Vec<DiscoveryQuery> {
		self.queries.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}

	fn respond(&self, query: &DiscoveryQuery) -> Result<Vec<Candidate>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.queries.lock().unwrap_or_else(PoisonError::into_inner).push(query.clone());

		if self.failing.contains(&query.partner_type) {
			return Err(Error::Upstream {
				status: 503,
				message: format!("Scripted failure for {}.", query.partner_type),
			});
		}

		Ok(match self.scripted.get(&query.partner_type) {
			Some(candidates) => candidates.clone(),
			None => SyntheticProvider::candidates(query),
		})
	}
}

impl Default for ScriptedProvider {
	fn default() -> Self {
		Self::new()
	}
}

impl DiscoveryProvider for ScriptedProvider {
	fn version_tag(&self) -> &str {
		&self.version_tag
	}

	fn search<'a>(&'a self, query: &'a DiscoveryQuery) -> BoxFuture<'a, Result<Vec<Candidate>>> {
		Box::pin(async move { self.respond(query) })
	}
}
