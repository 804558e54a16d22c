//! Google Places API (New) backend: text search plus per-place detail enrichment.

use std::{collections::BTreeMap, time::Duration};

use reqwest::Client;
use serde_json::Value;

use ltc_config::{Discovery, GooglePlaces};

use crate::{
	BoxFuture, Candidate, Contact, DiscoveryProvider, DiscoveryQuery, Error, PLACE_DETAILS,
	REVIEWS_SNIPPET, Result, WEBSITE_SNIPPET, geo,
};

pub const VERSION_TAG: &str = "google_places_new_v1";

const API_KEY_HEADER: &str = "X-Goog-Api-Key";
const FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";
const MAX_RESULT_COUNT: u32 = 20;
const MAX_ENRICHED: usize = 12;
const PLACE_FIELDS: [&str; 10] = [
	"id",
	"displayName",
	"formattedAddress",
	"location",
	"rating",
	"userRatingCount",
	"googleMapsUri",
	"websiteUri",
	"nationalPhoneNumber",
	"internationalPhoneNumber",
];

/// Attempt budget and linear backoff for the text search call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_attempts: u32,
	pub backoff_base: Duration,
}
impl RetryPolicy {
	pub fn from_config(discovery: &Discovery) -> Self {
		Self {
			max_attempts: discovery.max_attempts.max(1),
			backoff_base: Duration::from_millis(discovery.backoff_base_ms),
		}
	}

	/// Sleep before the attempt following `attempt` (1-based).
	pub fn delay(&self, attempt: u32) -> Duration {
		self.backoff_base.saturating_mul(attempt)
	}
}

pub struct GooglePlacesProvider {
	client: Client,
	api_base: String,
	api_key: String,
	retry: RetryPolicy,
}
impl GooglePlacesProvider {
	pub fn new(places: &GooglePlaces, discovery: &Discovery) -> Result<Self> {
		let api_key = places.api_key.trim();

		if api_key.is_empty() {
			return Err(Error::InvalidConfig {
				message: "discovery.google_places.api_key must be non-empty.".to_string(),
			});
		}

		let client =
			Client::builder().timeout(Duration::from_millis(discovery.timeout_ms)).build()?;

		Ok(Self {
			client,
			api_base: places.api_base.trim_end_matches('/').to_string(),
			api_key: api_key.to_string(),
			retry: RetryPolicy::from_config(discovery),
		})
	}

	pub async fn find(&self, query: &DiscoveryQuery) -> Result<Vec<Candidate>> {
		let places = self.search_text(query).await?;
		let mut candidates = Vec::with_capacity(places.len().min(MAX_ENRICHED));

		for place in places.into_iter().take(MAX_ENRICHED) {
			let details = match place.id.as_deref() {
				Some(id) => self.place_details(id).await,
				None => None,
			};
			let place = match details {
				Some(details) => place.merge(details),
				None => place,
			};

			candidates.push(place.into_candidate(query));
		}

		Ok(candidates)
	}

	async fn search_text(&self, query: &DiscoveryQuery) -> Result<Vec<Place>> {
		let url = format!("{}/v1/places:searchText", self.api_base);
		let field_mask =
			PLACE_FIELDS.iter().map(|field| format!("places.{field}")).collect::<Vec<_>>().join(",");
		let body = search_body(query);
		let mut attempt = 1;

		loop {
			let err = match self
				.client
				.post(&url)
				.header(API_KEY_HEADER, self.api_key.as_str())
				.header(FIELD_MASK_HEADER, field_mask.as_str())
				.json(&body)
				.send()
				.await
			{
				Ok(res) if res.status().is_success() => {
					let json: Value = res.json().await?;

					return parse_search_response(&json);
				},
				Ok(res) => {
					let status = res.status().as_u16();
					let message = res.text().await.unwrap_or_default();

					Error::Upstream { status, message }
				},
				Err(err) => Error::Transport(err),
			};

			if attempt >= self.retry.max_attempts || !err.is_retryable() {
				tracing::warn!(
					attempt,
					max_attempts = self.retry.max_attempts,
					error = %err,
					"Places text search failed."
				);

				return Err(err);
			}

			let delay = self.retry.delay(attempt);

			tracing::info!(
				attempt,
				max_attempts = self.retry.max_attempts,
				delay_ms = delay.as_millis() as u64,
				error = %err,
				"Places text search failed. Retrying."
			);
			tokio::time::sleep(delay).await;

			attempt += 1;
		}
	}

	async fn place_details(&self, place_id: &str) -> Option<Place> {
		match self.fetch_details(place_id).await {
			Ok(json) => Some(Place::from_json(&json)),
			Err(err) => {
				tracing::debug!(place_id, error = %err, "Place details unavailable.");

				None
			},
		}
	}

	async fn fetch_details(&self, place_id: &str) -> reqwest::Result<Value> {
		let url = format!("{}/v1/places/{place_id}", self.api_base);
		let res = self
			.client
			.get(url)
			.header(API_KEY_HEADER, self.api_key.as_str())
			.header(FIELD_MASK_HEADER, PLACE_FIELDS.join(","))
			.send()
			.await?
			.error_for_status()?;

		res.json().await
	}
}

impl DiscoveryProvider for GooglePlacesProvider {
	fn version_tag(&self) -> &str {
		VERSION_TAG
	}

	fn search<'a>(&'a self, query: &'a DiscoveryQuery) -> BoxFuture<'a, Result<Vec<Candidate>>> {
		Box::pin(self.find(query))
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Place {
	id: Option<String>,
	name: Option<String>,
	formatted_address: Option<String>,
	location: Option<(f64, f64)>,
	rating: Option<f64>,
	user_rating_count: Option<u32>,
	maps_uri: Option<String>,
	website_uri: Option<String>,
	national_phone: Option<String>,
	international_phone: Option<String>,
}
impl Place {
	fn from_json(json: &Value) -> Self {
		let text = |key: &str| {
			json.get(key)
				.and_then(|v| v.as_str())
				.map(str::trim)
				.filter(|v| !v.is_empty())
				.map(str::to_string)
		};
		let location = json.get("location").and_then(|loc| {
			Some((
				loc.get("latitude").and_then(|v| v.as_f64())?,
				loc.get("longitude").and_then(|v| v.as_f64())?,
			))
		});

		Self {
			id: text("id"),
			name: json
				.get("displayName")
				.and_then(|v| v.get("text"))
				.and_then(|v| v.as_str())
				.map(str::to_string)
				.filter(|v| !v.trim().is_empty()),
			formatted_address: text("formattedAddress"),
			location,
			rating: json.get("rating").and_then(|v| v.as_f64()),
			user_rating_count: json
				.get("userRatingCount")
				.and_then(|v| v.as_u64())
				.and_then(|v| u32::try_from(v).ok()),
			maps_uri: text("googleMapsUri"),
			website_uri: text("websiteUri"),
			national_phone: text("nationalPhoneNumber"),
			international_phone: text("internationalPhoneNumber"),
		}
	}

	/// Detail fields win over search fields whenever they are present.
	fn merge(self, details: Self) -> Self {
		Self {
			id: self.id,
			name: details.name.or(self.name),
			formatted_address: details.formatted_address.or(self.formatted_address),
			location: details.location.or(self.location),
			rating: details.rating.or(self.rating),
			user_rating_count: details.user_rating_count.or(self.user_rating_count),
			maps_uri: details.maps_uri.or(self.maps_uri),
			website_uri: details.website_uri.or(self.website_uri),
			national_phone: details.national_phone.or(self.national_phone),
			international_phone: details.international_phone.or(self.international_phone),
		}
	}

	fn into_candidate(self, query: &DiscoveryQuery) -> Candidate {
		let name = self.name.unwrap_or_else(|| "(unknown)".to_string());
		let distance = match (query.center(), self.location) {
			(Some(center), Some(location)) => geo::round2(geo::haversine_miles(center, location)),
			_ => f64::from(query.radius_miles),
		};
		let website = self.website_uri.or(self.maps_uri);
		let phone = self.national_phone.or(self.international_phone);
		let address = self.formatted_address;
		let website_snippet = format!(
			"{name} - {}. {}",
			query.partner_type.replace('_', " "),
			address.as_deref().unwrap_or_default()
		)
		.trim()
		.to_string();
		let place_details = format!(
			"Address: {}; Phone: {}; Website: {}",
			address.as_deref().unwrap_or("unknown"),
			phone.as_deref().unwrap_or("unknown"),
			website.as_deref().unwrap_or("unknown")
		);
		let reviews_snippet = match (self.rating, self.user_rating_count) {
			(Some(rating), Some(count)) if count > 0 =>
				format!("Google rating {rating:.1}/5 ({count} ratings)"),
			(Some(rating), _) => format!("Google rating {rating:.1}/5 (ratings)"),
			(None, _) => "Google rating unavailable".to_string(),
		};

		Candidate {
			partner_id: format!("gplaces:{}", self.id.as_deref().unwrap_or("unknown")),
			name,
			partner_type: query.partner_type.clone(),
			contact: Contact {
				phone,
				website,
				email: None,
				address,
				city: Some(query.city.clone()),
				region: Some(query.region.clone()),
			},
			distance_miles: Some(distance),
			rating: self.rating,
			user_ratings_total: self.user_rating_count,
			sources: BTreeMap::from([
				(WEBSITE_SNIPPET.to_string(), website_snippet),
				(PLACE_DETAILS.to_string(), place_details),
				(REVIEWS_SNIPPET.to_string(), reviews_snippet),
			]),
		}
	}
}

fn search_body(query: &DiscoveryQuery) -> Value {
	let mut body = serde_json::json!({
		"textQuery": query.query,
		"languageCode": query.language_code,
		"regionCode": query.region_code,
		"maxResultCount": MAX_RESULT_COUNT,
	});

	if let Some((latitude, longitude)) = query.center() {
		body["locationBias"] = serde_json::json!({
			"circle": {
				"center": { "latitude": latitude, "longitude": longitude },
				"radius": geo::miles_to_meters(query.radius_miles),
			}
		});
	}

	body
}

fn parse_search_response(json: &Value) -> Result<Vec<Place>> {
	let Some(object) = json.as_object() else {
		return Err(Error::InvalidResponse {
			message: "Places search response must be a JSON object.".to_string(),
		});
	};
	let places = match object.get("places") {
		None | Some(Value::Null) => return Ok(Vec::new()),
		Some(Value::Array(items)) => items,
		Some(_) => {
			return Err(Error::InvalidResponse {
				message: "Places search response field places must be an array.".to_string(),
			});
		},
	};

	Ok(places.iter().map(Place::from_json).collect())
}
