use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub policy: Policy,
	pub discovery: Discovery,
	#[serde(default)]
	pub cache: Cache,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	#[serde(default = "default_true")]
	pub bind_localhost_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct Policy {
	/// Path to the versioned policy matrix document. Relative paths resolve against the
	/// directory of the config file.
	pub matrix_path: String,
}

#[derive(Debug, Deserialize)]
pub struct Discovery {
	/// One of "synthetic" or "google_places". Fixed for the lifetime of the process.
	pub provider: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	#[serde(default = "default_backoff_base_ms")]
	pub backoff_base_ms: u64,
	#[serde(default = "default_language_code")]
	pub language_code: String,
	#[serde(default = "default_region_code")]
	pub region_code: String,
	pub google_places: Option<GooglePlaces>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GooglePlaces {
	#[serde(default = "default_places_api_base")]
	pub api_base: String,
	pub api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Cache {
	pub enabled: bool,
	pub ttl_hours: i64,
}
impl Default for Cache {
	fn default() -> Self {
		Self { enabled: true, ttl_hours: 24 }
	}
}

fn default_true() -> bool {
	true
}

fn default_timeout_ms() -> u64 {
	8_000
}

fn default_max_attempts() -> u32 {
	3
}

fn default_backoff_base_ms() -> u64 {
	400
}

fn default_language_code() -> String {
	"en".to_string()
}

fn default_region_code() -> String {
	"US".to_string()
}

fn default_places_api_base() -> String {
	"https://places.googleapis.com".to_string()
}
