use std::{
	future::IntoFuture,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	routing,
};
use serde_json::Value;
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

use ltc_config::{Discovery, GooglePlaces};
use ltc_providers::{
	DiscoveryProvider, DiscoveryQuery, Error, GeoBackend, REVIEWS_SNIPPET,
	curated::CuratedHubs, google_places::GooglePlacesProvider, synthetic::SyntheticProvider,
};

struct Script {
	search_calls: AtomicUsize,
	detail_calls: AtomicUsize,
	failures: usize,
	failure_status: StatusCode,
	stall: Option<Duration>,
}
impl Script {
	fn new(failures: usize, failure_status: StatusCode) -> Arc<Self> {
		Arc::new(Self {
			search_calls: AtomicUsize::new(0),
			detail_calls: AtomicUsize::new(0),
			failures,
			failure_status,
			stall: None,
		})
	}

	/// Every search stalls for `stall` before answering.
	fn stalled(stall: Duration) -> Arc<Self> {
		Arc::new(Self {
			search_calls: AtomicUsize::new(0),
			detail_calls: AtomicUsize::new(0),
			failures: 0,
			failure_status: StatusCode::OK,
			stall: Some(stall),
		})
	}
}

async fn start_places_server(script: Arc<Script>) -> (String, Sender<()>) {
	let app = Router::new()
		.route("/v1/places:searchText", routing::post(search_handler))
		.route("/v1/places/{id}", routing::get(details_handler))
		.with_state(script);
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind places server.");
	let addr = listener.local_addr().expect("Failed to read places server address.");
	let (tx, rx) = oneshot::channel();
	let server = axum::serve(listener, app).with_graceful_shutdown(async move {
		let _ = rx.await;
	});

	tokio::spawn(async move {
		let _ = server.into_future().await;
	});

	(format!("http://{addr}"), tx)
}

async fn search_handler(
	State(script): State<Arc<Script>>,
	Json(payload): Json<Value>,
) -> impl IntoResponse {
	let call_index = script.search_calls.fetch_add(1, Ordering::SeqCst);

	if let Some(stall) = script.stall {
		tokio::time::sleep(stall).await;
	}
	if call_index < script.failures {
		return script.failure_status.into_response();
	}

	assert_eq!(payload["maxResultCount"], 20);

	Json(serde_json::json!({
		"places": [
			{
				"id": "p1",
				"displayName": { "text": "Gem State Auctions" },
				"formattedAddress": "1 Fairview Ave, Boise, ID",
				"rating": 4.5
			},
			{
				"id": "missing",
				"displayName": { "text": "Treasure Valley Auctioneers" }
			}
		]
	}))
	.into_response()
}

async fn details_handler(
	State(script): State<Arc<Script>>,
	Path(id): Path<String>,
) -> impl IntoResponse {
	script.detail_calls.fetch_add(1, Ordering::SeqCst);

	if id != "p1" {
		return StatusCode::NOT_FOUND.into_response();
	}

	Json(serde_json::json!({
		"id": "p1",
		"websiteUri": "https://gemstateauctions.example",
		"userRatingCount": 120
	}))
	.into_response()
}

fn discovery(api_base: &str) -> Discovery {
	Discovery {
		provider: "google_places".to_string(),
		timeout_ms: 2_000,
		max_attempts: 3,
		backoff_base_ms: 1,
		language_code: "en".to_string(),
		region_code: "US".to_string(),
		google_places: Some(GooglePlaces {
			api_base: api_base.to_string(),
			api_key: "test-key".to_string(),
		}),
	}
}

fn provider(discovery: &Discovery) -> GooglePlacesProvider {
	let places = discovery.google_places.as_ref().expect("Missing places config.");

	GooglePlacesProvider::new(places, discovery).expect("Failed to build places provider.")
}

fn query(partner_type: &str) -> DiscoveryQuery {
	DiscoveryQuery {
		query: "estate jewelry auction house Boise ID".to_string(),
		city: "Boise".to_string(),
		region: "ID".to_string(),
		radius_miles: 25,
		partner_type: partner_type.to_string(),
		latitude: None,
		longitude: None,
		language_code: "en".to_string(),
		region_code: "US".to_string(),
	}
}

#[tokio::test]
async fn retries_rate_limits_then_succeeds() {
	let script = Script::new(2, StatusCode::TOO_MANY_REQUESTS);
	let (api_base, shutdown) = start_places_server(script.clone()).await;
	let provider = provider(&discovery(&api_base));
	let candidates = provider.search(&query("auction")).await.expect("Search must succeed.");

	assert_eq!(script.search_calls.load(Ordering::SeqCst), 3);
	assert_eq!(script.detail_calls.load(Ordering::SeqCst), 2);
	assert_eq!(candidates.len(), 2);
	assert_eq!(candidates[0].partner_id, "gplaces:p1");
	assert_eq!(candidates[0].contact.website.as_deref(), Some("https://gemstateauctions.example"));
	assert_eq!(candidates[0].source(REVIEWS_SNIPPET), "Google rating 4.5/5 (120 ratings)");
	assert_eq!(candidates[0].distance_miles, Some(25.0));
	assert_eq!(candidates[1].contact.website, None);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn retries_intermittent_bad_requests_then_succeeds() {
	let script = Script::new(2, StatusCode::BAD_REQUEST);
	let (api_base, shutdown) = start_places_server(script.clone()).await;
	let provider = provider(&discovery(&api_base));
	let candidates = provider.search(&query("auction")).await.expect("Search must succeed.");

	assert_eq!(script.search_calls.load(Ordering::SeqCst), 3);
	assert_eq!(candidates.len(), 2);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn timeouts_are_retried_until_attempts_run_out() {
	let script = Script::stalled(Duration::from_millis(500));
	let (api_base, shutdown) = start_places_server(script.clone()).await;
	let mut discovery = discovery(&api_base);

	discovery.timeout_ms = 50;

	let provider = provider(&discovery);
	let err = provider.search(&query("auction")).await.expect_err("Search must time out.");

	assert!(matches!(&err, Error::Transport(inner) if inner.is_timeout()), "Unexpected error: {err}");
	assert_eq!(script.search_calls.load(Ordering::SeqCst), 3);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn exhausted_retries_surface_the_last_error() {
	let script = Script::new(usize::MAX, StatusCode::SERVICE_UNAVAILABLE);
	let (api_base, shutdown) = start_places_server(script.clone()).await;
	let provider = provider(&discovery(&api_base));
	let err = provider.search(&query("auction")).await.expect_err("Search must fail.");

	assert!(matches!(err, Error::Upstream { status: 503, .. }), "Unexpected error: {err}");
	assert_eq!(script.search_calls.load(Ordering::SeqCst), 3);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn non_retryable_status_fails_immediately() {
	let script = Script::new(usize::MAX, StatusCode::FORBIDDEN);
	let (api_base, shutdown) = start_places_server(script.clone()).await;
	let provider = provider(&discovery(&api_base));
	let err = provider.search(&query("auction")).await.expect_err("Search must fail.");

	assert!(matches!(err, Error::Upstream { status: 403, .. }), "Unexpected error: {err}");
	assert_eq!(script.search_calls.load(Ordering::SeqCst), 1);

	let _ = shutdown.send(());
}

#[test]
fn google_places_requires_an_api_key() {
	let mut discovery = discovery("http://127.0.0.1:9");

	if let Some(places) = discovery.google_places.as_mut() {
		places.api_key = "   ".to_string();
	}

	let err = GeoBackend::from_config(&discovery).err().expect("Blank key must be rejected.");

	assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[tokio::test]
async fn synthetic_backend_is_selected_from_config() {
	let mut discovery = discovery("http://127.0.0.1:9");

	discovery.provider = "synthetic".to_string();

	let backend = GeoBackend::from_config(&discovery).expect("Synthetic backend must build.");
	let candidates = backend.search(&query("auction")).await.expect("Synthetic search failed.");

	assert!(matches!(backend, GeoBackend::Synthetic(_)));
	assert_eq!(backend.version_tag(), SyntheticProvider.version_tag());
	assert_eq!(candidates.len(), 3);
}

#[tokio::test]
async fn curated_hubs_ignore_location() {
	let mut far_away = query("luxury_hub_mailin");

	far_away.city = "Nome".to_string();
	far_away.radius_miles = 1;

	let near = CuratedHubs.search(&query("luxury_hub_mailin")).await.expect("Hub search failed.");
	let far = CuratedHubs.search(&far_away).await.expect("Hub search failed.");

	assert_eq!(near, far);
	assert!(near.iter().all(|hub| hub.distance_miles.is_none()));
}
