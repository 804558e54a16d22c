//! Deterministic offline backend.
//!
//! Results depend only on the query, so matrix tuning and client development can run without
//! network access. Evidence text reacts to the query wording so trust gates can be exercised.

use std::collections::BTreeMap;

use crate::{
	BoxFuture, Candidate, Contact, DiscoveryProvider, DiscoveryQuery, PLACE_DETAILS,
	REVIEWS_SNIPPET, Result, WEBSITE_SNIPPET,
};

pub const VERSION_TAG: &str = "synthetic_v1";

const MAX_RESULTS: usize = 8;
const ID_MODULUS: u64 = 10_000_000;

pub struct SyntheticProvider;
impl SyntheticProvider {
	pub fn candidates(query: &DiscoveryQuery) -> Vec<Candidate> {
		let text = query.query.trim().to_lowercase();
		let partner_type = query.partner_type.as_str();
		let insured_phrase = if text.contains("bond") || text.contains("insured") {
			"Bonded and insured."
		} else {
			"Insured and licensed."
		};
		let pickup_phrase = if text.contains("pickup") || text.contains("bulky") {
			"Pickup available for bulky items."
		} else {
			"Drop-off accepted."
		};
		let payout_phrase = if partner_type == "consignment" {
			"Clear payout terms and commission disclosed."
		} else {
			"Transparent process."
		};

		names_for(partner_type)
			.iter()
			.take(MAX_RESULTS)
			.enumerate()
			.map(|(rank, name)| {
				let website_snippet = format!(
					"{name} - {}. {insured_phrase} {pickup_phrase} {payout_phrase}",
					partner_type.replace('_', " ")
				);
				let place_details = if partner_type == "consignment" {
					format!(
						"{name} serves {}, {}. Call for details. Commission terms available.",
						query.city, query.region
					)
				} else {
					format!("{name} serves {}.", query.city)
				};
				let reviews_snippet = if rank % 2 == 0 {
					"Great communication and professional service."
				} else {
					"Fast response and fair process."
				};

				Candidate {
					partner_id: format!("stub:{partner_type}:{}", partner_hash(query, name)),
					name: name.to_string(),
					partner_type: partner_type.to_string(),
					contact: Contact {
						phone: Some(format!("+1-208-555-01{rank:02}")),
						website: Some(format!("https://example.com/{partner_type}/{rank}")),
						email: None,
						address: Some(format!("{} Main St", 100 + rank)),
						city: Some(query.city.clone()),
						region: Some(query.region.clone()),
					},
					distance_miles: Some(f64::from(query.radius_miles.min(5 + 4 * rank as u32))),
					rating: Some(synthetic_rating(rank)),
					user_ratings_total: None,
					sources: BTreeMap::from([
						(WEBSITE_SNIPPET.to_string(), website_snippet),
						(PLACE_DETAILS.to_string(), place_details),
						(REVIEWS_SNIPPET.to_string(), reviews_snippet.to_string()),
					]),
				}
			})
			.collect()
	}
}

impl DiscoveryProvider for SyntheticProvider {
	fn version_tag(&self) -> &str {
		VERSION_TAG
	}

	fn search<'a>(&'a self, query: &'a DiscoveryQuery) -> BoxFuture<'a, Result<Vec<Candidate>>> {
		Box::pin(async move { Ok(Self::candidates(query)) })
	}
}

fn names_for(partner_type: &str) -> &'static [&'static str] {
	match partner_type {
		"consignment" =>
			&["Heritage Consignment", "Treasure Trail Consignments", "Home & Hearth Consignment"],
		"estate_sale" =>
			&["Trusted Estate Services", "Valley Estate Liquidators", "Legacy Estate Sales Co."],
		"auction" => &["Boise Auction House", "Gem State Auctions", "Treasure Valley Auctioneers"],
		"donation" => &["Community Donation Center", "Family Aid Thrift", "Local Housing Charity"],
		"junk_haul" => &["Quick Haul & Remove", "Cleanout Crew", "Same-Day Junk Haul"],
		_ => &["Local Service Provider"],
	}
}

fn synthetic_rating(rank: usize) -> f64 {
	let rating = (4.7 - 0.15 * rank as f64).max(3.6);

	(rating * 10.0).round() / 10.0
}

fn partner_hash(query: &DiscoveryQuery, name: &str) -> u64 {
	let mut hasher = blake3::Hasher::new();

	for part in [query.query.as_str(), name, query.city.as_str(), query.region.as_str()] {
		hasher.update(part.as_bytes());
		hasher.update(&[0x1f]);
	}

	let digest = hasher.finalize();
	let mut prefix = [0_u8; 8];

	prefix.copy_from_slice(&digest.as_bytes()[..8]);

	u64::from_le_bytes(prefix) % ID_MODULUS
}
