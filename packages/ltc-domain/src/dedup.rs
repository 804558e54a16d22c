use std::collections::HashSet;

use crate::{normalize, score::cmp_f32_desc};

/// Contact fields that identify one real-world business across providers and radii.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity<'a> {
	pub name: &'a str,
	pub phone: Option<&'a str>,
	pub website: Option<&'a str>,
	pub address: Option<&'a str>,
	pub city: Option<&'a str>,
	pub region: Option<&'a str>,
}
impl Identity<'_> {
	pub fn fingerprint(&self) -> String {
		[
			Some(self.name),
			self.phone,
			self.website,
			self.address,
			self.city,
			self.region,
		]
		.into_iter()
		.map(|field| normalize(field.unwrap_or_default()))
		.collect::<Vec<_>>()
		.join("|")
	}
}

/// Sorts by score descending (stable) and keeps the first item of each fingerprint.
pub fn dedup_ranked<T, S, F>(mut items: Vec<T>, score: S, fingerprint: F) -> Vec<T>
where
	S: Fn(&T) -> f32,
	F: Fn(&T) -> String,
{
	items.sort_by(|a, b| cmp_f32_desc(score(a), score(b)));

	let mut seen = HashSet::with_capacity(items.len());

	items.retain(|item| seen.insert(fingerprint(item)));

	items
}
