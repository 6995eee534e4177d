//! Dispatch against a mocked SSR server.

use reinhardt_inertia_conf::SsrConfig;
use reinhardt_inertia_ssr::{Gateway, HasHealthCheck, HttpGateway, SsrResponse};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[fixture]
fn page() -> Value {
	json!({
		"component": "User/Edit",
		"props": {"user": {"name": "Jonathan"}},
		"url": "/user/123",
		"version": "123",
		"clearHistory": false,
		"encryptHistory": false,
	})
}

fn gateway_for(server: &MockServer) -> HttpGateway {
	let config = SsrConfig::enabled(server.uri()).ensure_bundle_exists(false);
	HttpGateway::new(config, ".").unwrap()
}

#[rstest]
#[tokio::test]
async fn test_dispatch_joins_head_lines(page: Value) {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/render"))
		.and(header("content-type", "application/json"))
		.and(body_json(page.clone()))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"head": ["<title>Edit</title>", "<meta name=\"x\" content=\"y\">"],
			"body": "<div id=\"app\">rendered</div>",
		})))
		.expect(1)
		.mount(&server)
		.await;

	let rendered = gateway_for(&server).dispatch(&page).await;

	assert_eq!(
		rendered,
		Some(SsrResponse::new(
			"<title>Edit</title>\n<meta name=\"x\" content=\"y\">",
			"<div id=\"app\">rendered</div>",
		))
	);
}

#[rstest]
#[case(ResponseTemplate::new(500))]
#[case(ResponseTemplate::new(404).set_body_string("missing"))]
#[case(ResponseTemplate::new(200).set_body_string("not json"))]
#[case(ResponseTemplate::new(200).set_body_json(json!({"body": "<div></div>"})))]
#[case(ResponseTemplate::new(200).set_body_json(Value::Null))]
#[tokio::test]
async fn test_dispatch_failures_degrade_to_none(page: Value, #[case] reply: ResponseTemplate) {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/render"))
		.respond_with(reply)
		.mount(&server)
		.await;

	assert_eq!(gateway_for(&server).dispatch(&page).await, None);
}

#[rstest]
#[tokio::test]
async fn test_dispatch_unreachable_server(page: Value) {
	let server = MockServer::start().await;
	let gateway = gateway_for(&server);
	drop(server);

	assert_eq!(gateway.dispatch(&page).await, None);
}

#[rstest]
#[tokio::test]
async fn test_disabled_ssr_sends_nothing(page: Value) {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200))
		.expect(0)
		.mount(&server)
		.await;

	let mut config = SsrConfig::enabled(server.uri()).ensure_bundle_exists(false);
	config.enabled = false;
	let gateway = HttpGateway::new(config, ".").unwrap();

	assert_eq!(gateway.dispatch(&page).await, None);
}

#[rstest]
#[case(200, true)]
#[case(503, false)]
#[tokio::test]
async fn test_health_check(#[case] status: u16, #[case] healthy: bool) {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/health"))
		.respond_with(ResponseTemplate::new(status))
		.mount(&server)
		.await;

	assert_eq!(gateway_for(&server).is_healthy().await, healthy);
}
