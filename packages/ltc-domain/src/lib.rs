pub mod dedup;
pub mod ranking;
pub mod scenario;
pub mod score;
pub mod trust;

use std::collections::BTreeMap;

/// Named evidence text fields of a candidate, e.g. `website_snippet` or `reviews_snippet`.
pub type Evidence = BTreeMap<String, String>;

pub fn normalize(raw: &str) -> String {
	raw.trim().to_lowercase()
}
