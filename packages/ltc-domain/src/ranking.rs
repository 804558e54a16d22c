use ltc_config::RankWeights;

use crate::{
	normalize,
	score::{clamp_unit, round3},
};

pub const RELEVANCE_FLOOR: f32 = 0.55;
pub const NEUTRAL_SCORE: f32 = 0.5;
pub const STRONG_RELEVANCE: f32 = 0.75;
pub const HIGH_CONFIDENCE: f32 = 0.85;
pub const GOOD_CONFIDENCE: f32 = 0.70;
pub const MAX_REASONS: usize = 4;
pub const MAX_QUESTIONS: usize = 6;

const MIN_TOKEN_CHARS: usize = 4;
const MAX_QUERY_TOKENS: usize = 12;
const COMMON_QUESTIONS: [&str; 2] = [
	"Do you provide receipts or itemized records suitable for estate accounting?",
	"What is your typical timeline and next step to get started?",
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreParts {
	pub trust: f32,
	pub relevance: f32,
	pub distance: f32,
	pub review: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RankResult {
	pub score: f32,
	pub reasons: Vec<String>,
}

/// Inputs of the human-readable reason list.
#[derive(Clone, Copy, Debug)]
pub struct ReasonContext<'a> {
	pub partner_type: &'a str,
	pub category: Option<&'a str>,
	pub confirmed_type: bool,
	pub relevance: f32,
	pub bulky: bool,
	pub trust_score: f32,
}

/// Share of distinct query tokens found in the primary evidence text, mapped into `[0.55, 1.0]`.
///
/// Only tokens of at least four characters count, and only the first twelve of them.
pub fn relevance_score(query: &str, evidence_text: &str) -> f32 {
	let query = normalize(query);
	let text = normalize(evidence_text);
	let mut tokens: Vec<&str> = Vec::new();

	for token in query
		.split_whitespace()
		.filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
		.take(MAX_QUERY_TOKENS)
	{
		if !tokens.contains(&token) {
			tokens.push(token);
		}
	}

	if tokens.is_empty() {
		return RELEVANCE_FLOOR;
	}

	let hits = tokens.iter().filter(|token| text.contains(*token)).count();
	let fraction = hits as f32 / tokens.len() as f32;

	round3(clamp_unit(RELEVANCE_FLOOR + (1.0 - RELEVANCE_FLOOR) * fraction))
}

/// Linear falloff from 1.0 at the origin to 0.0 at the search radius.
///
/// `None` means distance carries no meaning for the candidate and scores neutral.
pub fn distance_score(distance_miles: Option<f64>, radius_miles: u32) -> f32 {
	let Some(distance) = distance_miles else { return NEUTRAL_SCORE };

	if radius_miles == 0 || !distance.is_finite() {
		return NEUTRAL_SCORE;
	}

	let ratio = (distance / f64::from(radius_miles)).clamp(0.0, 1.0);

	round3(clamp_unit((1.0 - ratio) as f32))
}

pub fn review_score(rating: Option<f64>) -> f32 {
	match rating {
		Some(rating) if rating.is_finite() => round3(clamp_unit((rating / 5.0) as f32)),
		_ => NEUTRAL_SCORE,
	}
}

pub fn composite_score(weights: &RankWeights, parts: ScoreParts) -> f32 {
	let score = weights.trust_score * parts.trust
		+ weights.relevance_score * parts.relevance
		+ weights.distance_score * parts.distance
		+ weights.review_score * parts.review;

	round3(clamp_unit(score))
}

pub fn rank(weights: &RankWeights, parts: ScoreParts, context: &ReasonContext<'_>) -> RankResult {
	RankResult { score: composite_score(weights, parts), reasons: build_reasons(context) }
}

pub fn build_reasons(context: &ReasonContext<'_>) -> Vec<String> {
	let mut reasons = Vec::with_capacity(5);
	let category = context.category.map(str::trim).filter(|category| !category.is_empty());

	reasons.push(format!(
		"Matches: {} for {}",
		spaced(context.partner_type),
		category.unwrap_or("item")
	));
	reasons.push(if context.confirmed_type {
		"Business type appears to match (based on public snippets)".to_string()
	} else {
		"Business type is a likely match (verify on their listing/site)".to_string()
	});

	if context.relevance >= STRONG_RELEVANCE {
		reasons.push("Strong keyword match to your situation".to_string());
	}
	if context.bulky {
		reasons.push("Verification needed: ask about pickup/handling for bulky items".to_string());
	}

	let band = if context.trust_score >= HIGH_CONFIDENCE {
		"High match confidence from available evidence"
	} else if context.trust_score >= GOOD_CONFIDENCE {
		"Good match; limited public evidence available"
	} else {
		"Potential match; expect to verify details directly"
	};

	reasons.push(band.to_string());
	reasons.truncate(MAX_REASONS);

	reasons
}

pub fn build_questions(partner_type: &str) -> Vec<String> {
	let specific: &[&str] = match partner_type {
		"consignment" => &[
			"Do you offer pickup for bulky items?",
			"What is your commission and payout schedule?",
			"Do you accept items in my category and condition?",
		],
		"estate_sale" => &[
			"Are you bonded and insured? Can you provide proof?",
			"Do you handle pricing, staging, and advertising?",
			"How do you account for items sold and fees deducted?",
		],
		"auction" => &[
			"What categories perform best at your auctions?",
			"What are seller fees and settlement timing?",
			"Do you offer pickup/transport for larger items?",
		],
		"donation" => &[
			"Do you provide a donation receipt suitable for taxes?",
			"What items do you accept or not accept?",
			"Do you offer pickup?",
		],
		"junk_haul" => &[
			"Can you provide a written estimate and disposal policy?",
			"Are you insured for in-home pickup?",
			"Can you schedule within my timeline?",
		],
		_ => &[],
	};

	specific
		.iter()
		.chain(COMMON_QUESTIONS.iter())
		.take(MAX_QUESTIONS)
		.map(|question| question.to_string())
		.collect()
}

/// `estate_sale` reads as `estate sale`.
pub fn spaced(partner_type: &str) -> String {
	partner_type.replace('_', " ")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn context(trust_score: f32) -> ReasonContext<'static> {
		ReasonContext {
			partner_type: "estate_sale",
			category: Some("Furniture"),
			confirmed_type: true,
			relevance: 0.9,
			bulky: true,
			trust_score,
		}
	}

	#[test]
	fn relevance_counts_distinct_long_tokens() {
		let score = relevance_score(
			"estate estate sale services Boise",
			"Trusted estate services in the valley.",
		);

		// Distinct long tokens: estate, services, boise. Two of three hit.
		assert_eq!(score, round3(0.55 + 0.45 * (2.0 / 3.0)));
	}

	#[test]
	fn relevance_without_usable_tokens_is_the_floor() {
		assert_eq!(relevance_score("a an the", "anything"), RELEVANCE_FLOOR);
		assert_eq!(relevance_score("consignment", ""), RELEVANCE_FLOOR);
	}

	#[test]
	fn distance_falls_off_linearly_and_clamps() {
		assert_eq!(distance_score(Some(0.0), 25), 1.0);
		assert_eq!(distance_score(Some(12.5), 25), 0.5);
		assert_eq!(distance_score(Some(40.0), 25), 0.0);
		assert_eq!(distance_score(Some(5.0), 0), NEUTRAL_SCORE);
		assert_eq!(distance_score(None, 25), NEUTRAL_SCORE);
	}

	#[test]
	fn review_is_rating_over_five() {
		assert_eq!(review_score(Some(4.5)), 0.9);
		assert_eq!(review_score(Some(7.0)), 1.0);
		assert_eq!(review_score(None), NEUTRAL_SCORE);
	}

	#[test]
	fn composite_stays_in_unit_range_for_large_weights() {
		let weights =
			RankWeights { trust_score: 3.0, relevance_score: 2.0, distance_score: 1.0, review_score: 9.0 };
		let parts = ScoreParts { trust: 1.0, relevance: 1.0, distance: 1.0, review: 1.0 };

		assert_eq!(composite_score(&weights, parts), 1.0);
	}

	#[test]
	fn reasons_keep_order_and_cap() {
		let reasons = build_reasons(&context(0.9));

		assert_eq!(reasons.len(), MAX_REASONS);
		assert_eq!(reasons[0], "Matches: estate sale for Furniture");
		assert_eq!(reasons[1], "Business type appears to match (based on public snippets)");
		assert_eq!(reasons[2], "Strong keyword match to your situation");
		assert_eq!(reasons[3], "Verification needed: ask about pickup/handling for bulky items");
	}

	#[test]
	fn confidence_band_follows_trust_score() {
		let quiet = |trust_score| ReasonContext {
			category: None,
			confirmed_type: false,
			relevance: 0.55,
			bulky: false,
			..context(trust_score)
		};

		assert_eq!(build_reasons(&quiet(0.86))[2], "High match confidence from available evidence");
		assert_eq!(build_reasons(&quiet(0.7))[2], "Good match; limited public evidence available");
		assert_eq!(
			build_reasons(&quiet(0.2))[2],
			"Potential match; expect to verify details directly"
		);
		assert_eq!(build_reasons(&quiet(0.2))[0], "Matches: estate sale for item");
	}

	#[test]
	fn questions_combine_specific_and_common_items() {
		let questions = build_questions("donation");

		assert_eq!(questions.len(), 5);
		assert_eq!(questions[0], "Do you provide a donation receipt suitable for taxes?");
		assert_eq!(questions[4], COMMON_QUESTIONS[1]);
		assert_eq!(build_questions("luxury_hub_mailin"), COMMON_QUESTIONS.to_vec());
	}
}
