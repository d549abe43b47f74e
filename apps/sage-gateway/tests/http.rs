use axum::{
	body::{self, Body},
	http::{Request, StatusCode},
};
use tower::util::ServiceExt;

use sage_gateway::{routes, state::AppState};
use sage_testkit::{Harness, TEST_ADMIN_SECRET};

fn app(harness: &Harness) -> axum::Router {
	routes::router(AppState::with_service(harness.service.clone()))
}

fn admin_app(harness: &Harness) -> axum::Router {
	routes::admin_router(AppState::with_service(harness.service.clone()))
}

fn json_post(uri: &str, payload: serde_json::Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

#[tokio::test]
async fn health_ok() {
	let harness = Harness::new();
	let response = app(&harness)
		.oneshot(
			Request::builder()
				.uri("/health")
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn webhook_text_event_replies_through_the_messenger() {
	let harness = Harness::new();

	harness.authenticate("u1").await;
	harness.generator.push_reply("Hi there.");

	let payload = serde_json::json!({
		"user_id": "u1",
		"reply_token": "t1",
		"kind": "text",
		"text": "hello"
	});
	let response =
		app(&harness).oneshot(json_post("/webhook", payload)).await.expect("Failed to call webhook.");

	assert_eq!(response.status(), StatusCode::OK);

	let replies = harness.messenger.replies();

	assert_eq!(replies.len(), 1);
	assert_eq!(replies[0].0, "t1");
	assert_eq!(replies[0].1, vec!["\u{26A1} Hi there.".to_string()]);
}

#[tokio::test]
async fn admin_mints_a_redeemable_code() {
	let harness = Harness::new();
	let payload = serde_json::json!({ "secret": TEST_ADMIN_SECRET });
	let response = admin_app(&harness)
		.oneshot(json_post("/v1/admin/codes", payload))
		.await
		.expect("Failed to call mint.");

	assert_eq!(response.status(), StatusCode::OK);

	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json: serde_json::Value = serde_json::from_slice(&bytes).expect("Failed to parse response.");
	let code = json["code"].as_str().expect("Expected a code field.");

	assert_eq!(code.chars().count(), 8);

	// The minted code authenticates a user.
	use sage_storage::Store;

	assert!(harness.store.redeem_code("u1", code).await.expect("Failed to redeem."));
	assert!(harness.store.is_authenticated("u1").await.expect("Failed to check auth."));
}

#[tokio::test]
async fn admin_rejects_a_bad_secret() {
	let harness = Harness::new();
	let payload = serde_json::json!({ "secret": "wrong" });
	let response = admin_app(&harness)
		.oneshot(json_post("/v1/admin/codes", payload))
		.await
		.expect("Failed to call mint.");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json: serde_json::Value = serde_json::from_slice(&bytes).expect("Failed to parse response.");

	assert_eq!(json["error_code"], "unauthorized");
}
