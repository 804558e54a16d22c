use std::collections::HashSet;

use ltc_domain::normalize;

pub const MAX_HINTS: usize = 6;
pub const HINTS_PER_QUERY: usize = 2;
pub const RADIUS_CHECKPOINTS: [u32; 2] = [50, 100];

/// Values substituted into query templates.
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateValues<'a> {
	pub city: &'a str,
	pub region: &'a str,
	pub category: &'a str,
}

/// Brand hints followed by free keywords, without blanks or normalized duplicates.
pub fn merge_hints(brand_hints: &[String], keywords: &[String]) -> Vec<String> {
	let mut seen = HashSet::new();
	let mut merged = Vec::new();

	for hint in brand_hints.iter().chain(keywords) {
		let hint = hint.trim();

		if hint.is_empty() || !seen.insert(normalize(hint)) {
			continue;
		}

		merged.push(hint.to_string());

		if merged.len() == MAX_HINTS {
			break;
		}
	}

	merged
}

/// Fills `{city}`, `{region}` and `{category}` and appends the leading hints.
pub fn render_query(template: &str, values: TemplateValues<'_>, hints: &[String]) -> String {
	let filled = template
		.replace("{city}", values.city)
		.replace("{region}", values.region)
		.replace("{category}", values.category);
	let hints = hints.iter().take(HINTS_PER_QUERY).map(String::as_str);

	filled.split_whitespace().chain(hints.flat_map(str::split_whitespace)).collect::<Vec<_>>().join(" ")
}

/// Radii to try in order: the base radius, then each larger checkpoint within the maximum.
pub fn radius_plan(requested: Option<u32>, default_radius: u32, max_radius: u32) -> Vec<u32> {
	let base = requested.filter(|radius| *radius > 0).unwrap_or(default_radius);
	let mut radii = vec![base];

	radii.extend(RADIUS_CHECKPOINTS.iter().copied().filter(|checkpoint| *checkpoint > base));
	radii.retain(|radius| *radius <= max_radius);

	if radii.is_empty() {
		radii.push(max_radius);
	}

	radii
}

/// Identity of one provider call as seen by the response cache.
#[derive(Clone, Copy, Debug)]
pub struct CacheKey<'a> {
	pub version_tag: &'a str,
	pub partner_type: &'a str,
	pub query: &'a str,
	pub city: &'a str,
	pub region: &'a str,
	pub country: &'a str,
	pub radius_miles: u32,
	pub category: Option<&'a str>,
	pub goal: Option<&'a str>,
	pub chosen_path: Option<&'a str>,
}
impl CacheKey<'_> {
	pub fn render(&self) -> String {
		let optional = |value: Option<&str>| normalize(value.unwrap_or_default());

		format!(
			"{}||{}||{}||{}|{}|{}||{}||{}||{}||{}",
			normalize(self.version_tag),
			normalize(self.partner_type),
			normalize(self.query),
			normalize(self.city),
			normalize(self.region),
			normalize(self.country),
			self.radius_miles,
			optional(self.category),
			optional(self.goal),
			optional(self.chosen_path),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn strings(values: &[&str]) -> Vec<String> {
		values.iter().map(|value| value.to_string()).collect()
	}

	#[test]
	fn hints_drop_blanks_and_duplicates_and_cap_at_six() {
		let merged = merge_hints(
			&strings(&["Cartier", "  ", "cartier "]),
			&strings(&["Tiffany", "Rolex", "Omega", "Patek", "Breitling", "Seiko"]),
		);

		assert_eq!(merged, strings(&["Cartier", "Tiffany", "Rolex", "Omega", "Patek", "Breitling"]));
	}

	#[test]
	fn renders_templates_with_hints() {
		let values = TemplateValues { city: "Boise", region: "ID", category: "Jewelry" };
		let query = render_query(
			"{category} auctioneer {city} {region}",
			values,
			&strings(&["Cartier", "Tiffany", "Rolex"]),
		);

		assert_eq!(query, "Jewelry auctioneer Boise ID Cartier Tiffany");
	}

	#[test]
	fn repeated_and_unknown_tokens() {
		let values = TemplateValues { city: "Boise", region: "ID", category: "Rugs" };

		assert_eq!(
			render_query("{city} {category} dealer {zip} near {city}", values, &[]),
			"Boise Rugs dealer {zip} near Boise"
		);
	}

	#[test]
	fn unknown_category_leaves_no_gap() {
		let values = TemplateValues { city: "Boise", region: "ID", category: "" };

		assert_eq!(render_query("{category} consignment {city}", values, &[]), "consignment Boise");
	}

	#[test]
	fn radius_plan_escalates_through_checkpoints() {
		assert_eq!(radius_plan(None, 25, 100), vec![25, 50, 100]);
		assert_eq!(radius_plan(Some(60), 25, 100), vec![60, 100]);
		assert_eq!(radius_plan(Some(25), 25, 60), vec![25, 50]);
		assert_eq!(radius_plan(Some(100), 25, 100), vec![100]);
		assert_eq!(radius_plan(Some(500), 25, 100), vec![100]);
		assert_eq!(radius_plan(Some(0), 30, 100), vec![30, 50, 100]);
	}

	#[test]
	fn cache_key_normalizes_every_part() {
		let key = CacheKey {
			version_tag: "synthetic_v1",
			partner_type: "auction",
			query: "  Estate Jewelry Auction House Boise ID ",
			city: "Boise",
			region: "ID",
			country: "US",
			radius_miles: 25,
			category: Some("Jewelry"),
			goal: Some("maximize_value"),
			chosen_path: None,
		};

		assert_eq!(
			key.render(),
			"synthetic_v1||auction||estate jewelry auction house boise id||boise|id|us||25||jewelry||maximize_value||"
		);
	}
}
