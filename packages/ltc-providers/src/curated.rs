//! Nationwide mail-in resale hubs.
//!
//! Hubs have no storefront near the requester, so location and radius are ignored and distance
//! and rating stay unknown.

use std::collections::BTreeMap;

use crate::{
	BoxFuture, Candidate, Contact, DiscoveryProvider, DiscoveryQuery, PLACE_DETAILS,
	REVIEWS_SNIPPET, Result, WEBSITE_SNIPPET,
};

pub const VERSION_TAG: &str = "curated_hubs_v1";
pub const LUXURY_HUB_MAILIN: &str = "luxury_hub_mailin";
pub const COLLECTIBLES_HUB_MAILIN: &str = "collectibles_hub_mailin";

struct Hub {
	slug: &'static str,
	name: &'static str,
	website: &'static str,
	pitch: &'static str,
}

const LUXURY_HUBS: &[Hub] = &[
	Hub {
		slug: "therealreal",
		name: "The RealReal",
		website: "https://www.therealreal.com",
		pitch: "Luxury consignment with in-house authentication. Insured prepaid shipping kits.",
	},
	Hub {
		slug: "fashionphile",
		name: "Fashionphile",
		website: "https://www.fashionphile.com",
		pitch: "Luxury handbag resale with authentication experts. Insured mail-in quotes.",
	},
	Hub {
		slug: "rebag",
		name: "Rebag",
		website: "https://www.rebag.com",
		pitch: "Designer bag buyback and authentication. Insured shipping labels provided.",
	},
	Hub {
		slug: "vestiaire",
		name: "Vestiaire Collective",
		website: "https://www.vestiairecollective.com",
		pitch: "Luxury fashion marketplace with authentication on every order.",
	},
];

const COLLECTIBLES_HUBS: &[Hub] = &[
	Hub {
		slug: "heritage",
		name: "Heritage Auctions",
		website: "https://www.ha.com",
		pitch: "Collectibles auction house with authentication partners. Insured consignment shipping.",
	},
	Hub {
		slug: "goldin",
		name: "Goldin",
		website: "https://goldin.com",
		pitch: "Collectibles marketplace and auctions with authentication. Insured vault intake.",
	},
];

pub struct CuratedHubs;
impl CuratedHubs {
	pub fn candidates(partner_type: &str) -> Vec<Candidate> {
		let hubs = match partner_type {
			LUXURY_HUB_MAILIN => LUXURY_HUBS,
			COLLECTIBLES_HUB_MAILIN => COLLECTIBLES_HUBS,
			_ => return Vec::new(),
		};

		hubs.iter()
			.map(|hub| Candidate {
				partner_id: format!("hub:{partner_type}:{}", hub.slug),
				name: hub.name.to_string(),
				partner_type: partner_type.to_string(),
				contact: Contact { website: Some(hub.website.to_string()), ..Default::default() },
				distance_miles: None,
				rating: None,
				user_ratings_total: None,
				sources: BTreeMap::from([
					(WEBSITE_SNIPPET.to_string(), format!("{} - mail-in resale. {}", hub.name, hub.pitch)),
					(
						PLACE_DETAILS.to_string(),
						"Nationwide mail-in service. Commission and payout terms published online."
							.to_string(),
					),
					(
						REVIEWS_SNIPPET.to_string(),
						"Public reviews vary; confirm payout timing before shipping.".to_string(),
					),
				]),
			})
			.collect()
	}
}

impl DiscoveryProvider for CuratedHubs {
	fn version_tag(&self) -> &str {
		VERSION_TAG
	}

	fn search<'a>(&'a self, query: &'a DiscoveryQuery) -> BoxFuture<'a, Result<Vec<Candidate>>> {
		Box::pin(async move { Ok(Self::candidates(&query.partner_type)) })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn luxury_hubs_have_no_distance_or_rating() {
		let hubs = CuratedHubs::candidates(LUXURY_HUB_MAILIN);

		assert_eq!(hubs.len(), 4);
		assert!(hubs.iter().all(|hub| hub.distance_miles.is_none() && hub.rating.is_none()));
		assert!(hubs.iter().all(|hub| hub.source(WEBSITE_SNIPPET).contains("authentication")));
		assert_eq!(hubs[0].partner_id, "hub:luxury_hub_mailin:therealreal");
	}

	#[test]
	fn unknown_hub_types_are_empty() {
		assert!(CuratedHubs::candidates("consignment").is_empty());
	}
}
