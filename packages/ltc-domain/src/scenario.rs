use std::borrow::Cow;

use ltc_config::{
	ChosenPath, Constraint, Goal, PolicyMatrix, Scenario, SetMembership, ValueBand, When,
};

use crate::normalize;

/// The request attributes a scenario predicate can constrain.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScenarioAttributes<'a> {
	pub category: Option<&'a str>,
	pub value_band: Option<ValueBand>,
	pub bulky: Option<bool>,
	pub fragile: Option<bool>,
	pub set_membership: Option<SetMembership>,
	pub goal: Option<Goal>,
	pub chosen_path: Option<ChosenPath>,
}

/// Picks the highest-priority scenario whose predicate holds.
///
/// Falls back to the matrix's default scenario, then to the first scenario by priority, and
/// finally to a degenerate scenario without partner types. Never fails.
pub fn select_scenario<'a>(
	matrix: &'a PolicyMatrix,
	attributes: &ScenarioAttributes<'_>,
) -> Cow<'a, Scenario> {
	let ordered = scenarios_by_priority(matrix);

	if let Some(scenario) =
		ordered.iter().find(|scenario| scenario_matches(&scenario.when, attributes))
	{
		return Cow::Borrowed(*scenario);
	}

	if let Some(default_id) = matrix.default_scenario_id.as_deref()
		&& let Some(scenario) = ordered.iter().find(|scenario| scenario.id == default_id)
	{
		return Cow::Borrowed(*scenario);
	}

	match ordered.first() {
		Some(scenario) => Cow::Borrowed(*scenario),
		None => Cow::Owned(Scenario::degenerate()),
	}
}

pub fn scenario_matches(when: &When, attributes: &ScenarioAttributes<'_>) -> bool {
	category_matches(&when.categories, attributes.category)
		&& code_matches(&when.value_band, attributes.value_band.as_ref())
		&& code_matches(&when.bulky, attributes.bulky.as_ref())
		&& code_matches(&when.fragile, attributes.fragile.as_ref())
		&& code_matches(&when.set_membership, attributes.set_membership.as_ref())
		&& code_matches(&when.goals, attributes.goal.as_ref())
		&& code_matches(&when.chosen_paths, attributes.chosen_path.as_ref())
}

/// Scenarios in descending priority; equal priorities keep declaration order.
fn scenarios_by_priority(matrix: &PolicyMatrix) -> Vec<&Scenario> {
	let mut ordered: Vec<&Scenario> = matrix.scenarios.iter().collect();

	ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

	ordered
}

fn category_matches(constraint: &Constraint<String>, value: Option<&str>) -> bool {
	match constraint {
		Constraint::Unconstrained | Constraint::Any => true,
		Constraint::OneOf(allowed) => value.is_some_and(|value| {
			let value = normalize(value);

			allowed.iter().any(|candidate| normalize(candidate) == value)
		}),
		Constraint::Exactly(expected) =>
			value.is_some_and(|value| normalize(value) == normalize(expected)),
	}
}

fn code_matches<T>(constraint: &Constraint<T>, value: Option<&T>) -> bool
where
	T: PartialEq,
{
	match constraint {
		Constraint::Unconstrained | Constraint::Any => true,
		Constraint::OneOf(allowed) => value.is_some_and(|value| allowed.contains(value)),
		Constraint::Exactly(expected) => value == Some(expected),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn matrix(json: serde_json::Value) -> PolicyMatrix {
		serde_json::from_value(json).expect("Failed to parse test matrix.")
	}

	#[test]
	fn category_membership_ignores_case_and_padding() {
		let when: When =
			serde_json::from_value(serde_json::json!({ "categories": ["Fine Jewelry"] }))
				.expect("parse");
		let attributes =
			ScenarioAttributes { category: Some("  fine JEWELRY "), ..Default::default() };

		assert!(scenario_matches(&when, &attributes));
	}

	#[test]
	fn enumerated_codes_require_exact_membership() {
		let when: When = serde_json::from_value(serde_json::json!({ "valueBand": ["HIGH"] }))
			.expect("parse");

		assert!(scenario_matches(&when, &ScenarioAttributes {
			value_band: Some(ValueBand::High),
			..Default::default()
		}));
		assert!(!scenario_matches(&when, &ScenarioAttributes {
			value_band: Some(ValueBand::Med),
			..Default::default()
		}));
		assert!(!scenario_matches(&when, &ScenarioAttributes::default()));
	}

	#[test]
	fn equal_priorities_keep_declaration_order() {
		let matrix = matrix(serde_json::json!({
			"scenarios": [
				{ "id": "first", "priority": 5 },
				{ "id": "second", "priority": 5 }
			]
		}));

		assert_eq!(select_scenario(&matrix, &ScenarioAttributes::default()).id, "first");
	}

	#[test]
	fn unknown_default_id_falls_back_to_top_priority() {
		let matrix = matrix(serde_json::json!({
			"defaultScenarioId": "missing",
			"scenarios": [
				{ "id": "low", "priority": 1, "when": { "bulky": true } },
				{ "id": "high", "priority": 9, "when": { "bulky": true } }
			]
		}));
		let selected = select_scenario(&matrix, &ScenarioAttributes {
			bulky: Some(false),
			..Default::default()
		});

		assert_eq!(selected.id, "high");
	}
}
