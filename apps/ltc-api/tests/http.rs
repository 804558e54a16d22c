use std::{path::Path, sync::Arc};

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use ltc_api::{routes, state::AppState};
use ltc_providers::curated::CuratedHubs;
use ltc_service::{DispositionService, Providers};
use ltc_testkit::{ScriptedProvider, bundled_matrix};

fn app_with(geo: ScriptedProvider) -> Router {
	let matrix = Arc::new(bundled_matrix().expect("Bundled matrix must load."));
	let providers = Providers::new(Arc::new(geo), Arc::new(CuratedHubs));

	routes::router(AppState::new(DispositionService::with_providers(matrix, providers)))
}

fn jewelry_search() -> Value {
	serde_json::json!({
		"schemaVersion": 1,
		"scope": "item",
		"itemId": "item-42",
		"chosenPath": "A",
		"scenario": {
			"category": "Jewelry",
			"valueBand": "HIGH",
			"goal": "maximize_value",
			"brandHints": ["Cartier"]
		},
		"location": { "city": "Boise", "region": "ID", "countryCode": "US", "radiusMiles": 25 }
	})
}

async fn post_json(app: Router, uri: &str, payload: String) -> (StatusCode, Value) {
	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri(uri)
				.header("content-type", "application/json")
				.body(Body::from(payload))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call the router.");
	let status = response.status();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = serde_json::from_slice(&body).expect("Failed to parse response.");

	(status, json)
}

#[tokio::test]
async fn health_ok() {
	let config_path =
		Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/ltc.example.toml");
	let config = ltc_config::load(&config_path).expect("Example config must load.");
	let state = AppState::from_config(&config).expect("Failed to initialize app state.");
	let response = routes::router(state)
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("Failed to build request."))
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_returns_camel_case_results() {
	let app = app_with(ScriptedProvider::new());
	let (status, json) =
		post_json(app, "/v1/disposition/partners/search", jewelry_search().to_string()).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["schemaVersion"], 1);
	assert_eq!(json["scenarioId"], "jewelry_high_value");
	assert_eq!(json["partnerTypes"], serde_json::json!(["consignment", "auction"]));
	assert_eq!(json["recommendedRefreshDays"], 30);
	assert!(json["generatedAt"].as_str().is_some_and(|value| value.ends_with('Z')));

	let first = &json["results"][0];

	assert!(first["partnerId"].as_str().is_some_and(|id| id.starts_with("stub:")));
	assert_eq!(first["trust"]["claimLevel"], "claimed");
	assert_eq!(first["trust"]["gates"][0]["mode"], "required");
	assert_eq!(first["trust"]["gates"][0]["status"], "pass");
	assert_eq!(first["trust"]["signals"][0]["type"], "text_match");
	assert!(first["whyRecommended"].as_str().is_some_and(|why| why.contains(" ; ")));
	assert!(first["questionsToAsk"].as_array().is_some_and(|questions| !questions.is_empty()));
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
	let app = app_with(ScriptedProvider::new());
	let (status, json) =
		post_json(app, "/v1/disposition/partners/search", "{\"chosenPath\":".to_string()).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn blank_city_is_a_bad_request() {
	let app = app_with(ScriptedProvider::new());
	let mut payload = jewelry_search();

	payload["location"]["city"] = Value::from("");

	let (status, json) =
		post_json(app, "/v1/disposition/partners/search", payload.to_string()).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn all_partner_types_failing_is_a_bad_gateway() {
	let app = app_with(ScriptedProvider::new().failing("consignment").failing("auction"));
	let (status, json) =
		post_json(app, "/v1/disposition/partners/search", jewelry_search().to_string()).await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert_eq!(json["error_code"], "UPSTREAM_UNAVAILABLE");
}

#[tokio::test]
async fn compose_returns_an_outreach_packet() {
	let app = app_with(ScriptedProvider::new());
	let payload = serde_json::json!({
		"schemaVersion": 1,
		"itemId": "item-42",
		"partner": {
			"partnerId": "stub:auction:7",
			"name": "Gem State Auctions",
			"partnerType": "auction",
			"contact": { "email": "consign@gemstate.example" }
		},
		"itemSummary": { "title": "Art Deco Ring", "category": "Jewelry" },
		"location": { "city": "Boise", "region": "ID" }
	});
	let (status, json) =
		post_json(app, "/v1/disposition/outreach/compose", payload.to_string()).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["subject"], "Inquiry: Art Deco Ring (Boise)");
	assert_eq!(json["preferredContactMethod"], "email");
	assert_eq!(json["attachments"], serde_json::json!([]));
	assert_eq!(json["followUps"].as_array().map(Vec::len), Some(2));
	assert!(
		json["emailBody"]
			.as_str()
			.is_some_and(|body| body.contains("Estimated value: unknown (happy to provide more details)."))
	);
}
