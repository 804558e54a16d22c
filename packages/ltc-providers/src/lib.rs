pub mod curated;
pub mod geo;
pub mod google_places;
pub mod synthetic;

mod error;

pub use error::{Error, Result};

use std::{collections::BTreeMap, future::Future, pin::Pin};

use serde::{Deserialize, Serialize};

use ltc_config::{Discovery, PROVIDER_GOOGLE_PLACES, PROVIDER_SYNTHETIC};

use crate::{google_places::GooglePlacesProvider, synthetic::SyntheticProvider};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub const WEBSITE_SNIPPET: &str = "website_snippet";
pub const PLACE_DETAILS: &str = "place_details";
pub const REVIEWS_SNIPPET: &str = "reviews_snippet";

pub trait DiscoveryProvider
where
	Self: Send + Sync,
{
	/// Identifies the backend and its result shape; part of every cache key.
	fn version_tag(&self) -> &str;

	fn search<'a>(&'a self, query: &'a DiscoveryQuery) -> BoxFuture<'a, Result<Vec<Candidate>>>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct DiscoveryQuery {
	pub query: String,
	pub city: String,
	pub region: String,
	pub radius_miles: u32,
	pub partner_type: String,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
	pub language_code: String,
	pub region_code: String,
}
impl DiscoveryQuery {
	pub fn center(&self) -> Option<(f64, f64)> {
		Some((self.latitude?, self.longitude?))
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
	pub phone: Option<String>,
	pub website: Option<String>,
	pub email: Option<String>,
	pub address: Option<String>,
	pub city: Option<String>,
	pub region: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
	pub partner_id: String,
	pub name: String,
	pub partner_type: String,
	pub contact: Contact,
	/// `None` when distance has no meaning, e.g. for mail-in hubs.
	pub distance_miles: Option<f64>,
	pub rating: Option<f64>,
	pub user_ratings_total: Option<u32>,
	/// Evidence text keyed by field name, read by trust gates.
	pub sources: BTreeMap<String, String>,
}
impl Candidate {
	pub fn source(&self, field: &str) -> &str {
		self.sources.get(field).map(String::as_str).unwrap_or_default()
	}
}

/// The geographic discovery backend, chosen once per process from configuration.
pub enum GeoBackend {
	Synthetic(SyntheticProvider),
	GooglePlaces(GooglePlacesProvider),
}
impl GeoBackend {
	pub fn from_config(discovery: &Discovery) -> Result<Self> {
		match discovery.provider.as_str() {
			PROVIDER_SYNTHETIC => Ok(Self::Synthetic(SyntheticProvider)),
			PROVIDER_GOOGLE_PLACES => {
				let Some(places) = discovery.google_places.as_ref() else {
					return Err(Error::InvalidConfig {
						message: "discovery.google_places is required when provider is google_places."
							.to_string(),
					});
				};

				Ok(Self::GooglePlaces(GooglePlacesProvider::new(places, discovery)?))
			},
			other => Err(Error::InvalidConfig {
				message: format!("Unknown discovery provider {other:?}."),
			}),
		}
	}
}

impl DiscoveryProvider for GeoBackend {
	fn version_tag(&self) -> &str {
		match self {
			Self::Synthetic(provider) => provider.version_tag(),
			Self::GooglePlaces(provider) => provider.version_tag(),
		}
	}

	fn search<'a>(&'a self, query: &'a DiscoveryQuery) -> BoxFuture<'a, Result<Vec<Candidate>>> {
		match self {
			Self::Synthetic(provider) => provider.search(query),
			Self::GooglePlaces(provider) => provider.search(query),
		}
	}
}
