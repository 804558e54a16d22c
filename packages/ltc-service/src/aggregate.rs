use ltc_domain::{dedup::Identity, dedup::dedup_ranked, score::cmp_f32_desc};

use crate::search::PartnerResult;

pub fn fingerprint(result: &PartnerResult) -> String {
	let contact = &result.contact;

	Identity {
		name: &result.name,
		phone: contact.phone.as_deref(),
		website: contact.website.as_deref(),
		address: contact.address.as_deref(),
		city: contact.city.as_deref(),
		region: contact.region.as_deref(),
	}
	.fingerprint()
}

/// Best-first results of one partner type, one per business, at most `max_per_type`.
pub fn finalize_partner_type(results: Vec<PartnerResult>, max_per_type: usize) -> Vec<PartnerResult> {
	let mut results = dedup_ranked(results, |result| result.ranking.score, fingerprint);

	results.truncate(max_per_type);

	results
}

/// Stable global ordering; equal scores keep partner type order.
pub fn finalize_results(mut results: Vec<PartnerResult>, max_total: usize) -> Vec<PartnerResult> {
	results.sort_by(|a, b| cmp_f32_desc(a.ranking.score, b.ranking.score));
	results.truncate(max_total);

	results
}
