//! Evidence gates and the trust score built from them.
//!
//! A gate reference is either required (a failure excludes the candidate) or a boost (it only
//! lifts the score). Gate ids the matrix does not define evaluate to [`GateStatus::Unknown`],
//! which neither passes nor excludes.

use serde::{Deserialize, Serialize};

use ltc_config::{GateDefinition, GateMode, GateRef, KeywordAnyGate, PolicyMatrix};

use crate::{
	Evidence, normalize,
	score::{clamp_unit, round3},
};

pub const BASE_WITHOUT_REQUIRED: f32 = 0.60;
pub const BASE_ALL_REQUIRED_PASS: f32 = 0.72;
pub const PARTIAL_REQUIRED_SCALE: f32 = 0.10;
pub const REQUIRED_LIFT: f32 = 0.18;
pub const BOOST_LIFT: f32 = 0.18;

/// Tuning constants of the trust score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrustTuning {
	pub base_without_required: f32,
	pub base_all_required_pass: f32,
	pub partial_required_scale: f32,
	pub required_lift: f32,
	pub boost_lift: f32,
}
impl Default for TrustTuning {
	fn default() -> Self {
		Self {
			base_without_required: BASE_WITHOUT_REQUIRED,
			base_all_required_pass: BASE_ALL_REQUIRED_PASS,
			partial_required_scale: PARTIAL_REQUIRED_SCALE,
			required_lift: REQUIRED_LIFT,
			boost_lift: BOOST_LIFT,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
	Pass,
	Fail,
	Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
	TextMatch,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signal {
	#[serde(rename = "type")]
	pub kind: SignalKind,
	pub label: String,
	pub source: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
	pub id: String,
	pub mode: GateMode,
	pub status: GateStatus,
	pub source: Option<String>,
	pub strength: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrustResult {
	pub gates: Vec<GateResult>,
	pub trust_score: f32,
	pub signals: Vec<Signal>,
}
impl TrustResult {
	/// False when any required gate failed; unknown gates never exclude.
	pub fn passes_required_gates(&self) -> bool {
		!self
			.gates
			.iter()
			.any(|gate| gate.mode == GateMode::Required && gate.status == GateStatus::Fail)
	}

	/// True when a required gate passed on an identified evidence source.
	pub fn has_confirmed_type(&self) -> bool {
		self.gates.iter().any(|gate| {
			gate.mode == GateMode::Required
				&& gate.status == GateStatus::Pass
				&& gate.source.is_some()
		})
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GateOutcome {
	pub passed: bool,
	pub source: Option<String>,
	pub strength: f32,
	pub signals: Vec<Signal>,
}

pub trait EvaluateGate {
	fn evaluate(&self, evidence: &Evidence) -> GateOutcome;
}

impl EvaluateGate for GateDefinition {
	fn evaluate(&self, evidence: &Evidence) -> GateOutcome {
		match self {
			Self::KeywordAny(gate) => gate.evaluate(evidence),
		}
	}
}

impl EvaluateGate for KeywordAnyGate {
	fn evaluate(&self, evidence: &Evidence) -> GateOutcome {
		let mut outcome = GateOutcome::default();

		for source in &self.sources {
			let Some(raw) = evidence.get(source) else { continue };
			let text = normalize(raw);

			if text.is_empty() {
				continue;
			}

			for keyword in &self.keywords {
				let needle = normalize(keyword);

				if needle.is_empty() || !text.contains(&needle) || is_negated(&text, &needle) {
					continue;
				}

				let weight = self.weight_for(source);

				if weight > outcome.strength {
					outcome.strength = weight;
					outcome.source = Some(source.clone());
				}

				outcome.signals.push(Signal {
					kind: SignalKind::TextMatch,
					label: keyword.clone(),
					source: source.clone(),
				});
			}
		}

		outcome.passed = outcome.source.is_some();

		outcome
	}
}

/// `not <keyword>` or `no <keyword>` anywhere in the text negates every occurrence.
///
/// Both arguments must already be normalized. Scoring constants were tuned against this exact
/// behavior, including its lack of clause boundaries.
pub fn is_negated(text: &str, keyword: &str) -> bool {
	text.contains(&format!("not {keyword}")) || text.contains(&format!("no {keyword}"))
}

pub fn evaluate_trust(matrix: &PolicyMatrix, evidence: &Evidence, gates: &[GateRef]) -> TrustResult {
	evaluate_trust_with(matrix, evidence, gates, &TrustTuning::default())
}

pub fn evaluate_trust_with(
	matrix: &PolicyMatrix,
	evidence: &Evidence,
	gates: &[GateRef],
	tuning: &TrustTuning,
) -> TrustResult {
	let mut results = Vec::with_capacity(gates.len());
	let mut signals = Vec::new();
	let mut required = Tally::default();
	let mut boost = Tally::default();

	for gate_ref in gates {
		let tally = match gate_ref.mode {
			GateMode::Required => &mut required,
			GateMode::Boost => &mut boost,
		};

		tally.total += 1;

		let Some(definition) = matrix.gate(&gate_ref.id) else {
			results.push(GateResult {
				id: gate_ref.id.clone(),
				mode: gate_ref.mode,
				status: GateStatus::Unknown,
				source: None,
				strength: 0.0,
			});

			continue;
		};
		let outcome = definition.evaluate(evidence);

		if outcome.passed {
			tally.passed += 1;
			tally.strength_sum += outcome.strength;
		}

		results.push(GateResult {
			id: gate_ref.id.clone(),
			mode: gate_ref.mode,
			status: if outcome.passed { GateStatus::Pass } else { GateStatus::Fail },
			source: outcome.source,
			strength: round3(outcome.strength),
		});
		signals.extend(outcome.signals);
	}

	let base = if required.total == 0 {
		tuning.base_without_required
	} else if required.passed == required.total {
		tuning.base_all_required_pass
	} else {
		tuning.partial_required_scale * (required.passed as f32 / required.total as f32)
	};
	let lift = tuning.required_lift * required.average_strength()
		+ tuning.boost_lift * boost.average_strength();

	TrustResult { gates: results, trust_score: round3(clamp_unit(base + lift)), signals }
}

#[derive(Default)]
struct Tally {
	total: u32,
	passed: u32,
	strength_sum: f32,
}
impl Tally {
	fn average_strength(&self) -> f32 {
		if self.passed == 0 {
			return 0.0;
		}

		self.strength_sum / self.passed as f32
	}
}
