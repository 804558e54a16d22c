use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use ltc_config::{Channel, ChosenPath, Goal, PartnerTypeSpec, SetMembership, ValueBand};
use ltc_domain::{
	ranking::{
		ReasonContext, ScoreParts, build_questions, distance_score, rank, relevance_score,
		review_score, spaced,
	},
	scenario::{ScenarioAttributes, select_scenario},
	trust::{GateResult, Signal, evaluate_trust_with},
};
use ltc_providers::{Candidate, Contact, DiscoveryProvider, DiscoveryQuery, WEBSITE_SNIPPET};

use crate::{
	DispositionService, Error, Result,
	aggregate::{finalize_partner_type, finalize_results},
	cache::cache_key_prefix,
	expansion::{CacheKey, TemplateValues, merge_hints, radius_plan, render_query},
};

pub const SCHEMA_VERSION: u32 = 1;
pub const CLAIM_LEVEL: &str = "claimed";
pub const MAX_SIGNALS: usize = 12;
pub const WHY_RECOMMENDED_REASONS: usize = 2;
pub const DISCLAIMER: &str = "Partner information is best-effort and may be outdated. Verify policies (bonding/insurance/receipts/fees) directly.";

const CACHE_KIND: &str = "discovery";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
	#[serde(default = "default_schema_version")]
	pub schema_version: u32,
	#[serde(default = "default_scope")]
	pub scope: String,
	pub item_id: Option<String>,
	pub plan_id: Option<String>,
	pub chosen_path: ChosenPath,
	#[serde(default)]
	pub scenario: ScenarioInput,
	pub location: LocationInput,
	pub hints: Option<HintsInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioInput {
	pub category: Option<String>,
	pub value_band: Option<ValueBand>,
	pub bulky: Option<bool>,
	pub fragile: Option<bool>,
	pub set_membership: Option<SetMembership>,
	pub goal: Option<Goal>,
	pub constraints: Vec<String>,
	pub brand_hints: Vec<String>,
	pub condition_hint: Option<String>,
	pub quantity_hint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
	pub city: String,
	pub region: String,
	#[serde(default = "default_country_code")]
	pub country_code: String,
	pub postal_code: Option<String>,
	pub radius_miles: Option<u32>,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HintsInput {
	pub keywords: Vec<String>,
	pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
	pub schema_version: u32,
	#[serde(with = "time::serde::rfc3339")]
	pub generated_at: OffsetDateTime,
	pub scenario_id: String,
	pub partner_types: Vec<String>,
	pub results: Vec<PartnerResult>,
	pub disclaimer: String,
	pub recommended_refresh_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerResult {
	pub partner_id: String,
	pub name: String,
	pub partner_type: String,
	pub contact: Contact,
	pub distance_miles: Option<f64>,
	pub rating: Option<f64>,
	pub user_ratings_total: Option<u32>,
	pub trust: TrustDto,
	pub ranking: RankingDto,
	pub why_recommended: String,
	pub questions_to_ask: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustDto {
	pub trust_score: f32,
	pub claim_level: String,
	pub gates: Vec<GateResult>,
	pub signals: Vec<Signal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingDto {
	pub score: f32,
	pub reasons: Vec<String>,
}

struct TypeSearch<'a> {
	request: &'a SearchRequest,
	spec: &'a PartnerTypeSpec,
	hints: &'a [String],
}

impl DispositionService {
	pub async fn search_partners(&self, req: SearchRequest) -> Result<SearchResponse> {
		validate_request(&req)?;

		let attributes = ScenarioAttributes {
			category: req.scenario.category.as_deref(),
			value_band: req.scenario.value_band,
			bulky: req.scenario.bulky,
			fragile: req.scenario.fragile,
			set_membership: req.scenario.set_membership,
			goal: req.scenario.goal,
			chosen_path: Some(req.chosen_path),
		};
		let scenario = select_scenario(&self.matrix, &attributes);

		tracing::info!(
			scenario_id = %scenario.id,
			partner_types = scenario.partner_types.len(),
			chosen_path = req.chosen_path.as_str(),
			"Scenario selected."
		);

		let keywords = req.hints.as_ref().map(|hints| hints.keywords.as_slice()).unwrap_or_default();
		let hints = merge_hints(&req.scenario.brand_hints, keywords);
		let mut partner_types = Vec::with_capacity(scenario.partner_types.len());
		let mut results = Vec::new();
		let mut failures = Vec::new();

		for spec in &scenario.partner_types {
			partner_types.push(spec.partner_type.clone());

			let search = TypeSearch { request: &req, spec, hints: &hints };

			match self.search_partner_type(&search).await {
				Ok(found) => {
					tracing::info!(
						partner_type = %spec.partner_type,
						results = found.len(),
						"Partner type searched."
					);

					results.extend(found);
				},
				Err(err) => {
					tracing::warn!(
						error = %err,
						partner_type = %spec.partner_type,
						"Partner type search failed; continuing without it."
					);

					failures.push(format!("{}: {err}", spec.partner_type));
				},
			}
		}

		if !partner_types.is_empty() && failures.len() == partner_types.len() {
			return Err(Error::UpstreamUnavailable {
				message: format!("All partner type searches failed ({}).", failures.join("; ")),
			});
		}

		let results = finalize_results(results, self.matrix.max_results_total as usize);

		tracing::info!(
			scenario_id = %scenario.id,
			results = results.len(),
			failed_partner_types = failures.len(),
			"Partner search completed."
		);

		Ok(SearchResponse {
			schema_version: SCHEMA_VERSION,
			generated_at: self.clock.now(),
			scenario_id: scenario.id.clone(),
			partner_types,
			results,
			disclaimer: DISCLAIMER.to_string(),
			recommended_refresh_days: self.matrix.recommended_refresh_days,
		})
	}

	async fn search_partner_type(
		&self,
		search: &TypeSearch<'_>,
	) -> ltc_providers::Result<Vec<PartnerResult>> {
		let TypeSearch { request, spec, hints } = *search;
		let plan = radius_plan(
			request.location.radius_miles,
			self.matrix.default_radius_miles,
			self.matrix.max_radius_miles,
		);
		let (provider, radii) = match spec.channel {
			Channel::Local => (self.providers.geo.as_ref(), plan),
			Channel::Hub => (self.providers.hubs.as_ref(), plan.into_iter().take(1).collect()),
		};
		let fallback;
		let templates: Vec<&str> = if spec.queries.is_empty() {
			fallback = format!("{{category}} {} {{city}} {{region}}", spaced(&spec.partner_type));

			vec![fallback.as_str()]
		} else {
			spec.queries.iter().map(|template| template.q.as_str()).collect()
		};
		let values = TemplateValues {
			city: request.location.city.trim(),
			region: request.location.region.trim(),
			category: request.scenario.category.as_deref().map(str::trim).unwrap_or_default(),
		};
		let min_results = self.matrix.min_results as usize;
		let mut found = Vec::new();

		'radii: for radius in radii {
			for template in &templates {
				let text = render_query(template, values, hints);
				let query = self.discovery_query(request, spec, text, radius);
				let candidates = self.discover(provider, &query, request).await?;

				for candidate in candidates {
					let Some(result) = self.assess(candidate, search, &query) else { continue };

					found.push(result);

					if found.len() >= min_results {
						break 'radii;
					}
				}
			}
		}

		Ok(finalize_partner_type(found, self.matrix.max_results_per_type as usize))
	}

	fn discovery_query(
		&self,
		request: &SearchRequest,
		spec: &PartnerTypeSpec,
		query: String,
		radius_miles: u32,
	) -> DiscoveryQuery {
		DiscoveryQuery {
			query,
			city: request.location.city.trim().to_string(),
			region: request.location.region.trim().to_string(),
			radius_miles,
			partner_type: spec.partner_type.clone(),
			latitude: request.location.latitude,
			longitude: request.location.longitude,
			language_code: self.language_code.clone(),
			region_code: self.region_code.clone(),
		}
	}

	async fn discover(
		&self,
		provider: &dyn DiscoveryProvider,
		query: &DiscoveryQuery,
		request: &SearchRequest,
	) -> ltc_providers::Result<Vec<Candidate>> {
		let Some(cache) = self.cache.as_ref() else { return provider.search(query).await };
		let key = CacheKey {
			version_tag: provider.version_tag(),
			partner_type: &query.partner_type,
			query: &query.query,
			city: &query.city,
			region: &query.region,
			country: &request.location.country_code,
			radius_miles: query.radius_miles,
			category: request.scenario.category.as_deref(),
			goal: request.scenario.goal.map(Goal::as_str),
			chosen_path: Some(request.chosen_path.as_str()),
		}
		.render();

		if let Some(candidates) = cache.get(&key) {
			tracing::info!(
				cache_kind = CACHE_KIND,
				cache_key_prefix = cache_key_prefix(&key),
				hit = true,
				candidates = candidates.len(),
				"Cache hit."
			);

			return Ok(candidates);
		}

		tracing::info!(
			cache_kind = CACHE_KIND,
			cache_key_prefix = cache_key_prefix(&key),
			hit = false,
			ttl_hours = cache.ttl().whole_hours(),
			"Cache miss."
		);

		let candidates = provider.search(query).await?;

		cache.insert(key, candidates.clone());

		Ok(candidates)
	}

	/// Gates, scores and explains one candidate. `None` when a required gate failed.
	fn assess(
		&self,
		candidate: Candidate,
		search: &TypeSearch<'_>,
		query: &DiscoveryQuery,
	) -> Option<PartnerResult> {
		let TypeSearch { request, spec, .. } = *search;
		let mut trust =
			evaluate_trust_with(&self.matrix, &candidate.sources, &spec.trust_gates, &self.tuning);

		if !trust.passes_required_gates() {
			tracing::debug!(
				partner_id = %candidate.partner_id,
				partner_type = %spec.partner_type,
				"Candidate excluded by a required gate."
			);

			return None;
		}

		let distance = match spec.channel {
			Channel::Hub => None,
			Channel::Local =>
				Some(candidate.distance_miles.unwrap_or(f64::from(query.radius_miles))),
		};
		let parts = ScoreParts {
			trust: trust.trust_score,
			relevance: relevance_score(&query.query, candidate.source(WEBSITE_SNIPPET)),
			distance: distance_score(distance, query.radius_miles),
			review: review_score(candidate.rating),
		};
		let context = ReasonContext {
			partner_type: &spec.partner_type,
			category: request.scenario.category.as_deref(),
			confirmed_type: trust.has_confirmed_type(),
			relevance: parts.relevance,
			bulky: request.scenario.bulky.unwrap_or(false),
			trust_score: trust.trust_score,
		};
		let ranked = rank(&spec.rank_weights, parts, &context);
		let why_recommended = ranked
			.reasons
			.iter()
			.take(WHY_RECOMMENDED_REASONS)
			.map(String::as_str)
			.collect::<Vec<_>>()
			.join(" ; ");

		trust.signals.truncate(MAX_SIGNALS);

		Some(PartnerResult {
			partner_id: candidate.partner_id,
			name: candidate.name,
			partner_type: spec.partner_type.clone(),
			contact: candidate.contact,
			distance_miles: candidate.distance_miles,
			rating: candidate.rating,
			user_ratings_total: candidate.user_ratings_total,
			trust: TrustDto {
				trust_score: trust.trust_score,
				claim_level: CLAIM_LEVEL.to_string(),
				gates: trust.gates,
				signals: trust.signals,
			},
			ranking: RankingDto { score: ranked.score, reasons: ranked.reasons },
			why_recommended,
			questions_to_ask: build_questions(&spec.partner_type),
		})
	}
}

fn validate_request(req: &SearchRequest) -> Result<()> {
	if req.schema_version != SCHEMA_VERSION {
		return Err(Error::InvalidRequest {
			message: format!("Unsupported schemaVersion {}.", req.schema_version),
		});
	}
	if req.location.city.trim().is_empty() || req.location.region.trim().is_empty() {
		return Err(Error::InvalidRequest {
			message: "location.city and location.region are required.".to_string(),
		});
	}
	if req.location.radius_miles == Some(0) {
		return Err(Error::InvalidRequest {
			message: "location.radiusMiles must be greater than zero.".to_string(),
		});
	}
	if let Some(latitude) = req.location.latitude
		&& !(-90.0..=90.0).contains(&latitude)
	{
		return Err(Error::InvalidRequest {
			message: "location.latitude must be within [-90, 90].".to_string(),
		});
	}
	if let Some(longitude) = req.location.longitude
		&& !(-180.0..=180.0).contains(&longitude)
	{
		return Err(Error::InvalidRequest {
			message: "location.longitude must be within [-180, 180].".to_string(),
		});
	}

	Ok(())
}

fn default_schema_version() -> u32 {
	SCHEMA_VERSION
}

fn default_scope() -> String {
	"item".to_string()
}

fn default_country_code() -> String {
	"US".to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn request() -> SearchRequest {
		serde_json::from_value(serde_json::json!({
			"schemaVersion": 1,
			"chosenPath": "A",
			"scenario": { "category": "Jewelry", "valueBand": "HIGH" },
			"location": { "city": "Boise", "region": "ID" }
		}))
		.expect("Failed to parse test request.")
	}

	#[test]
	fn request_defaults_fill_scope_and_country() {
		let req = request();

		assert_eq!(req.scope, "item");
		assert_eq!(req.location.country_code, "US");
		assert!(req.scenario.brand_hints.is_empty());
		assert!(validate_request(&req).is_ok());
	}

	#[test]
	fn scenario_hints_parse_as_codes() {
		let req: SearchRequest = serde_json::from_value(serde_json::json!({
			"schemaVersion": 1,
			"chosenPath": "B",
			"scenario": {
				"category": "Furniture",
				"conditionHint": "used_good",
				"quantityHint": "multi"
			},
			"location": { "city": "Boise", "region": "ID" }
		}))
		.expect("Failed to parse request with hint codes.");

		assert_eq!(req.scenario.condition_hint.as_deref(), Some("used_good"));
		assert_eq!(req.scenario.quantity_hint.as_deref(), Some("multi"));
		assert!(validate_request(&req).is_ok());
	}

	#[test]
	fn rejects_blank_location_and_bad_coordinates() {
		let mut blank = request();

		blank.location.city = "  ".to_string();

		assert!(matches!(validate_request(&blank), Err(Error::InvalidRequest { .. })));

		let mut far_north = request();

		far_north.location.latitude = Some(91.0);

		assert!(matches!(validate_request(&far_north), Err(Error::InvalidRequest { .. })));

		let mut zero_radius = request();

		zero_radius.location.radius_miles = Some(0);

		assert!(matches!(validate_request(&zero_radius), Err(Error::InvalidRequest { .. })));
	}

	#[test]
	fn rejects_unknown_schema_versions() {
		let mut req = request();

		req.schema_version = 2;

		assert!(matches!(validate_request(&req), Err(Error::InvalidRequest { .. })));
	}

	#[test]
	fn rejects_unknown_chosen_path_codes() {
		let parsed: std::result::Result<SearchRequest, _> = serde_json::from_value(serde_json::json!({
			"chosenPath": "Z",
			"location": { "city": "Boise", "region": "ID" }
		}));

		assert!(parsed.is_err());
	}
}
