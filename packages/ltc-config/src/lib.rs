mod error;
mod matrix;
mod types;

pub use error::{Error, Result};
pub use matrix::{
	Channel, ChosenPath, Constraint, DEFAULT_DISTANCE_WEIGHT, DEFAULT_RELEVANCE_WEIGHT,
	DEFAULT_REVIEW_WEIGHT, DEFAULT_SOURCE_WEIGHT, DEFAULT_TRUST_WEIGHT, DEGENERATE_SCENARIO_ID,
	GateDefinition, GateMode, GateRef, Goal, KeywordAnyGate, PartnerTypeSpec, PolicyMatrix,
	QueryTemplate, RankWeights, Scenario, SetMembership, ValueBand, WILDCARD, When,
};
pub use types::{Cache, Config, Discovery, GooglePlaces, Policy, Service};

use std::{
	collections::HashSet,
	fs,
	path::{Path, PathBuf},
};

pub const PROVIDER_SYNTHETIC: &str = "synthetic";
pub const PROVIDER_GOOGLE_PLACES: &str = "google_places";
pub const MAX_CACHE_TTL_HOURS: i64 = 24 * 365;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg, path.parent());

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.policy.matrix_path.trim().is_empty() {
		return Err(Error::Validation {
			message: "policy.matrix_path must be non-empty.".to_string(),
		});
	}
	if !matches!(cfg.discovery.provider.as_str(), PROVIDER_SYNTHETIC | PROVIDER_GOOGLE_PLACES) {
		return Err(Error::Validation {
			message: "discovery.provider must be one of synthetic or google_places.".to_string(),
		});
	}
	if cfg.discovery.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "discovery.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.discovery.max_attempts == 0 {
		return Err(Error::Validation {
			message: "discovery.max_attempts must be greater than zero.".to_string(),
		});
	}
	if cfg.discovery.provider == PROVIDER_GOOGLE_PLACES {
		let Some(places) = cfg.discovery.google_places.as_ref() else {
			return Err(Error::Validation {
				message: "discovery.google_places is required when provider is google_places."
					.to_string(),
			});
		};

		if places.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: "discovery.google_places.api_key must be non-empty.".to_string(),
			});
		}
		if places.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "discovery.google_places.api_base must be non-empty.".to_string(),
			});
		}
	}
	if cfg.cache.ttl_hours <= 0 {
		return Err(Error::Validation {
			message: "cache.ttl_hours must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.ttl_hours > MAX_CACHE_TTL_HOURS {
		return Err(Error::Validation {
			message: format!("cache.ttl_hours must be at most {MAX_CACHE_TTL_HOURS}."),
		});
	}

	Ok(())
}

pub fn load_matrix(path: &Path) -> Result<PolicyMatrix> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadMatrix { path: path.to_path_buf(), source: err })?;

	parse_matrix(&raw)
}

pub fn parse_matrix(raw: &str) -> Result<PolicyMatrix> {
	let matrix: PolicyMatrix =
		serde_json::from_str(raw).map_err(|err| Error::ParseMatrix { source: err })?;

	validate_matrix(&matrix)?;

	Ok(matrix)
}

pub fn validate_matrix(matrix: &PolicyMatrix) -> Result<()> {
	if matrix.default_radius_miles == 0 {
		return Err(Error::Validation {
			message: "defaultRadiusMiles must be greater than zero.".to_string(),
		});
	}
	if matrix.max_radius_miles < matrix.default_radius_miles {
		return Err(Error::Validation {
			message: "maxRadiusMiles must be at least defaultRadiusMiles.".to_string(),
		});
	}
	if matrix.min_results == 0 {
		return Err(Error::Validation {
			message: "minResults must be greater than zero.".to_string(),
		});
	}
	if matrix.max_results_per_type == 0 || matrix.max_results_total == 0 {
		return Err(Error::Validation {
			message: "maxResultsPerType and maxResultsTotal must be greater than zero."
				.to_string(),
		});
	}

	let mut seen_ids = HashSet::new();

	for scenario in &matrix.scenarios {
		if scenario.id.trim().is_empty() {
			return Err(Error::Validation { message: "Scenario ids must be non-empty.".to_string() });
		}
		if !seen_ids.insert(scenario.id.as_str()) {
			return Err(Error::Validation {
				message: format!("Scenario id {:?} is declared more than once.", scenario.id),
			});
		}

		for spec in &scenario.partner_types {
			validate_partner_type(&scenario.id, spec)?;
		}
	}

	if let Some(default_id) = matrix.default_scenario_id.as_deref()
		&& default_id.trim().is_empty()
	{
		return Err(Error::Validation {
			message: "defaultScenarioId must be non-empty when present.".to_string(),
		});
	}

	for (name, definition) in &matrix.trust_gate_definitions {
		match definition {
			GateDefinition::KeywordAny(gate) => validate_keyword_gate(name, gate)?,
		}
	}

	Ok(())
}

fn validate_partner_type(scenario_id: &str, spec: &PartnerTypeSpec) -> Result<()> {
	if spec.partner_type.trim().is_empty() {
		return Err(Error::Validation {
			message: format!("Scenario {scenario_id:?} declares a partner type with an empty name."),
		});
	}
	if spec.queries.iter().any(|query| query.q.trim().is_empty()) {
		return Err(Error::Validation {
			message: format!(
				"Partner type {:?} in scenario {scenario_id:?} has an empty query template.",
				spec.partner_type
			),
		});
	}

	let weights = spec.rank_weights;

	for (label, weight) in [
		("trustScore", weights.trust_score),
		("relevanceScore", weights.relevance_score),
		("distanceScore", weights.distance_score),
		("reviewScore", weights.review_score),
	] {
		if !weight.is_finite() || weight < 0.0 {
			return Err(Error::Validation {
				message: format!(
					"rankWeights.{label} for partner type {:?} must be a finite number, zero or greater.",
					spec.partner_type
				),
			});
		}
	}

	Ok(())
}

fn validate_keyword_gate(name: &str, gate: &KeywordAnyGate) -> Result<()> {
	if gate.keywords.iter().all(|keyword| keyword.trim().is_empty()) {
		return Err(Error::Validation {
			message: format!("Gate {name:?} must declare at least one keyword."),
		});
	}
	if gate.sources.is_empty() {
		return Err(Error::Validation {
			message: format!("Gate {name:?} must declare at least one evidence source."),
		});
	}

	for (source, weight) in &gate.source_weights {
		if !weight.is_finite() || !(0.0..=1.0).contains(weight) {
			return Err(Error::Validation {
				message: format!(
					"Gate {name:?} sourceWeights.{source} must be in the range 0.0-1.0."
				),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config, base_dir: Option<&Path>) {
	let matrix_path = PathBuf::from(cfg.policy.matrix_path.trim());

	if !matrix_path.as_os_str().is_empty()
		&& matrix_path.is_relative()
		&& let Some(base_dir) = base_dir
		&& !base_dir.as_os_str().is_empty()
	{
		cfg.policy.matrix_path = base_dir.join(matrix_path).to_string_lossy().into_owned();
	}
	if let Some(places) = cfg.discovery.google_places.as_mut() {
		places.api_base = places.api_base.trim().trim_end_matches('/').to_string();
	}

	cfg.discovery.provider = cfg.discovery.provider.trim().to_lowercase();
}
