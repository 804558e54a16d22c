//! Policy matrix schema.
//!
//! The matrix is a versioned JSON document that declares which partner types apply to which
//! item situations, the evidence gates used to judge candidates, and the tunables that bound a
//! search. It is parsed once into these types and never mutated afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

pub const WILDCARD: &str = "*";
pub const DEFAULT_SOURCE_WEIGHT: f32 = 0.5;
pub const DEFAULT_TRUST_WEIGHT: f32 = 0.45;
pub const DEFAULT_RELEVANCE_WEIGHT: f32 = 0.35;
pub const DEFAULT_DISTANCE_WEIGHT: f32 = 0.15;
pub const DEFAULT_REVIEW_WEIGHT: f32 = 0.05;
pub const DEGENERATE_SCENARIO_ID: &str = "default_any";

const REQUIRED_PREFIX: &str = "required:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueBand {
	Low,
	Med,
	High,
	Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetMembership {
	None,
	Possible,
	Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
	MaximizeValue,
	Balanced,
	MinEffort,
}
impl Goal {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::MaximizeValue => "maximize_value",
			Self::Balanced => "balanced",
			Self::MinEffort => "min_effort",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChosenPath {
	A,
	B,
	C,
	Donate,
}
impl ChosenPath {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::A => "A",
			Self::B => "B",
			Self::C => "C",
			Self::Donate => "DONATE",
		}
	}
}

/// A single key of a scenario's `when` predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint<T> {
	/// The key was absent from the predicate.
	Unconstrained,
	/// The key was the wildcard marker or `null`.
	Any,
	OneOf(Vec<T>),
	Exactly(T),
}
impl<T> Default for Constraint<T> {
	fn default() -> Self {
		Self::Unconstrained
	}
}

impl<'de, T> Deserialize<'de> for Constraint<T>
where
	T: DeserializeOwned,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		use serde::de::Error as _;

		match Value::deserialize(deserializer)? {
			Value::Null => Ok(Self::Any),
			Value::String(raw) if raw == WILDCARD => Ok(Self::Any),
			Value::Array(items) => items
				.into_iter()
				.map(|item| serde_json::from_value(item).map_err(D::Error::custom))
				.collect::<Result<Vec<T>, _>>()
				.map(Self::OneOf),
			other => serde_json::from_value(other).map(Self::Exactly).map_err(D::Error::custom),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct When {
	pub categories: Constraint<String>,
	pub value_band: Constraint<ValueBand>,
	pub bulky: Constraint<bool>,
	pub fragile: Constraint<bool>,
	pub set_membership: Constraint<SetMembership>,
	pub goals: Constraint<Goal>,
	pub chosen_paths: Constraint<ChosenPath>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
	pub id: String,
	#[serde(default)]
	pub priority: i64,
	#[serde(default)]
	pub when: When,
	#[serde(default)]
	pub partner_types: Vec<PartnerTypeSpec>,
}
impl Scenario {
	/// The scenario used when a matrix declares no scenarios at all.
	pub fn degenerate() -> Self {
		Self {
			id: DEGENERATE_SCENARIO_ID.to_string(),
			priority: 0,
			when: When::default(),
			partner_types: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
	/// Geographic businesses found through the configured discovery backend.
	#[default]
	Local,
	/// Non-geographic mail-in channels served from the curated hub list.
	Hub,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerTypeSpec {
	#[serde(rename = "type")]
	pub partner_type: String,
	#[serde(default)]
	pub channel: Channel,
	#[serde(default)]
	pub queries: Vec<QueryTemplate>,
	#[serde(default)]
	pub trust_gates: Vec<GateRef>,
	#[serde(default)]
	pub rank_weights: RankWeights,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryTemplate {
	pub q: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
	Required,
	Boost,
}
impl GateMode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Required => "required",
			Self::Boost => "boost",
		}
	}
}

/// Reference from a partner type to a gate definition, written as `"required:<id>"` or `"<id>"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct GateRef {
	pub id: String,
	pub mode: GateMode,
}
impl GateRef {
	pub fn required(id: impl Into<String>) -> Self {
		Self { id: id.into(), mode: GateMode::Required }
	}

	pub fn boost(id: impl Into<String>) -> Self {
		Self { id: id.into(), mode: GateMode::Boost }
	}
}

impl TryFrom<String> for GateRef {
	type Error = String;

	fn try_from(raw: String) -> Result<Self, Self::Error> {
		let (id, mode) = match raw.strip_prefix(REQUIRED_PREFIX) {
			Some(rest) => (rest.trim(), GateMode::Required),
			None => (raw.trim(), GateMode::Boost),
		};

		if id.is_empty() {
			return Err(format!("Gate reference {raw:?} has an empty gate id."));
		}

		Ok(Self { id: id.to_string(), mode })
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RankWeights {
	pub trust_score: f32,
	pub relevance_score: f32,
	pub distance_score: f32,
	pub review_score: f32,
}
impl Default for RankWeights {
	fn default() -> Self {
		Self {
			trust_score: DEFAULT_TRUST_WEIGHT,
			relevance_score: DEFAULT_RELEVANCE_WEIGHT,
			distance_score: DEFAULT_DISTANCE_WEIGHT,
			review_score: DEFAULT_REVIEW_WEIGHT,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GateDefinition {
	KeywordAny(KeywordAnyGate),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordAnyGate {
	pub keywords: Vec<String>,
	pub sources: Vec<String>,
	#[serde(default)]
	pub source_weights: BTreeMap<String, f32>,
}
impl KeywordAnyGate {
	pub fn weight_for(&self, source: &str) -> f32 {
		self.source_weights.get(source).copied().unwrap_or(DEFAULT_SOURCE_WEIGHT)
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyMatrix {
	#[serde(default = "default_version")]
	pub version: u32,
	pub default_scenario_id: Option<String>,
	#[serde(default = "default_radius_miles")]
	pub default_radius_miles: u32,
	#[serde(default = "default_max_radius_miles")]
	pub max_radius_miles: u32,
	#[serde(default = "default_min_results")]
	pub min_results: u32,
	#[serde(default = "default_max_results_per_type")]
	pub max_results_per_type: u32,
	#[serde(default = "default_max_results_total")]
	pub max_results_total: u32,
	#[serde(default = "default_recommended_refresh_days")]
	pub recommended_refresh_days: u32,
	#[serde(default)]
	pub scenarios: Vec<Scenario>,
	#[serde(default)]
	pub trust_gate_definitions: BTreeMap<String, GateDefinition>,
}
impl PolicyMatrix {
	pub fn gate(&self, id: &str) -> Option<&GateDefinition> {
		self.trust_gate_definitions.get(id)
	}
}

fn default_version() -> u32 {
	1
}

fn default_radius_miles() -> u32 {
	25
}

fn default_max_radius_miles() -> u32 {
	100
}

fn default_min_results() -> u32 {
	6
}

fn default_max_results_per_type() -> u32 {
	8
}

fn default_max_results_total() -> u32 {
	15
}

fn default_recommended_refresh_days() -> u32 {
	30
}
