//! End-to-end rendering of Inertia responses through the factory.


use fixtures::{data_page, get, inertia, inertia_get, page_json, session, with_session};
use hyper::StatusCode;
use reinhardt_inertia::props::{PropMap, always, defer, defer_in, lazy, merge, optional, provider};
use reinhardt_inertia::props::{ProvidesProps, RenderContext};
use reinhardt_inertia::{CLEAR_HISTORY_SESSION_KEY, Error, Inertia, PaginatedData};
use reinhardt_inertia_conf::{InertiaConfig, PageConfig};
use reinhardt_inertia_http::{MemorySession, Request, Session};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

async fn render(inertia: &Inertia, request: &Request, component: &str, props: PropMap) -> reinhardt_inertia_http::Response {
	let factory = inertia.factory_for(request);
	factory.version("123");
	factory.render(component, props).unwrap().materialize(request).await.unwrap()
}

#[rstest]
#[tokio::test]
async fn test_json_response_for_inertia_request(inertia: Inertia) {
	let request = get("/user/123").header("x-inertia", "true").build().unwrap();
	let props = PropMap::new().with("user", json!({"name": "Jonathan"}));

	let response = render(&inertia, &request, "User/Edit", props).await;

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.header("x-inertia"), Some("true"));
	assert_eq!(response.header("content-type"), Some("application/json"));
	assert_eq!(
		page_json(&response),
		json!({
			"component": "User/Edit",
			"props": {"user": {"name": "Jonathan"}},
			"url": "/user/123",
			"version": "123",
			"clearHistory": false,
			"encryptHistory": false,
		})
	);
}

#[rstest]
#[tokio::test]
async fn test_html_response_for_first_visit(inertia: Inertia) {
	let request = get("/user/123").build().unwrap();
	let props = PropMap::new().with("user", json!({"name": "O'Brien <admin>"}));

	let response = render(&inertia, &request, "User/Edit", props).await;

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.header("content-type"), Some("text/html; charset=utf-8"));
	assert!(response.header("x-inertia").is_none());
	let html = String::from_utf8(response.body.to_vec()).unwrap();
	assert!(html.contains(r#"<div id="app" data-page=""#));
	assert!(!html.contains("O'Brien"));
	let page = data_page(&html);
	assert_eq!(page["props"]["user"]["name"], json!("O'Brien <admin>"));
	assert_eq!(page["version"], json!("123"));
}

#[rstest]
#[tokio::test]
async fn test_deferred_props_are_grouped_and_skipped(inertia: Inertia) {
	let request = inertia_get("/feed").build().unwrap();
	let props = PropMap::new()
		.with("foo", defer(lazy(|_| "bar")))
		.with("stats", defer_in(lazy(|_| 1), "sidebar"));

	let page = page_json(&render(&inertia, &request, "Feed", props).await);

	assert_eq!(page["props"], json!({}));
	assert_eq!(page["deferredProps"], json!({"default": ["foo"], "sidebar": ["stats"]}));
}

#[rstest]
#[tokio::test]
async fn test_merge_directives_in_page(inertia: Inertia) {
	let request = inertia_get("/feed").build().unwrap();
	let props = PropMap::new()
		.with("foo", merge("x").deep_merge().match_on(["k"]))
		.with("bar", merge("y"));

	let page = page_json(&render(&inertia, &request, "Feed", props).await);

	assert_eq!(page["deepMergeProps"], json!(["foo"]));
	assert_eq!(page["mergeProps"], json!(["bar"]));
	assert_eq!(page["matchPropsOn"], json!(["foo.k"]));
	assert_eq!(page["props"], json!({"foo": "x", "bar": "y"}));
}

#[rstest]
#[tokio::test]
async fn test_stale_version_conflicts_before_resolving(inertia: Inertia) {
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();
	let request = get("/users?page=2")
		.header("x-inertia", "true")
		.header("x-inertia-version", "v1")
		.build()
		.unwrap();
	let factory = inertia.factory_for(&request);
	factory.version("v2");
	let props = PropMap::new().with(
		"users",
		lazy(move |_| {
			counter.fetch_add(1, Ordering::SeqCst);
			json!([])
		}),
	);

	let response = factory.render("Users", props).unwrap().materialize(&request).await.unwrap();

	assert_eq!(response.status, StatusCode::CONFLICT);
	assert_eq!(response.header("x-inertia-location"), Some("/users?page=2"));
	assert!(response.body.is_empty());
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[rstest]
#[case("GET", "", StatusCode::OK)]
#[case("GET", "123", StatusCode::OK)]
#[case("POST", "v0", StatusCode::OK)]
#[tokio::test]
async fn test_matching_or_missing_version_is_not_stale(
	inertia: Inertia,
	#[case] method: &str,
	#[case] client: &str,
	#[case] expected: StatusCode,
) {
	let request = Request::builder()
		.method(method.parse().unwrap())
		.uri("/users")
		.header("x-inertia", "true")
		.header("x-inertia-version", client)
		.build()
		.unwrap();

	let response = render(&inertia, &request, "Users", PropMap::new()).await;

	assert_eq!(response.status, expected);
}

#[rstest]
#[tokio::test]
async fn test_partial_only_selects_declared_keys(inertia: Inertia) {
	let request = inertia_get("/users/1")
		.header("x-inertia-partial-component", "User/Show")
		.header("x-inertia-partial-data", "user")
		.build()
		.unwrap();
	let props = PropMap::new()
		.with("user", json!({"id": 1}))
		.with("other", json!({"id": 2}))
		.with("flash", always("Saved"));

	let page = page_json(&render(&inertia, &request, "User/Show", props).await);

	assert_eq!(page["props"], json!({"flash": "Saved", "user": {"id": 1}}));
}

#[rstest]
#[tokio::test]
async fn test_partial_reload_loads_optional_and_deferred(inertia: Inertia) {
	let request = inertia_get("/users")
		.header("x-inertia-partial-component", "Users")
		.header("x-inertia-partial-data", "teams, activity")
		.build()
		.unwrap();
	let props = PropMap::new()
		.with("users", json!([]))
		.with("teams", optional(lazy(|_| json!(["Ops"]))))
		.with("activity", defer(lazy(|_| json!(["login"]))));

	let page = page_json(&render(&inertia, &request, "Users", props).await);

	assert_eq!(page["props"], json!({"teams": ["Ops"], "activity": ["login"]}));
	assert!(page.get("deferredProps").is_none());
}

#[rstest]
#[tokio::test]
async fn test_partial_reload_for_other_component_is_full(inertia: Inertia) {
	let request = inertia_get("/users")
		.header("x-inertia-partial-component", "Dashboard")
		.header("x-inertia-partial-data", "teams")
		.build()
		.unwrap();
	let props = PropMap::new()
		.with("users", json!([]))
		.with("teams", optional(json!(["Ops"])));

	let page = page_json(&render(&inertia, &request, "Users", props).await);

	assert_eq!(page["props"], json!({"users": []}));
}

#[rstest]
#[tokio::test]
async fn test_nested_only_path(inertia: Inertia) {
	let request = inertia_get("/settings")
		.header("x-inertia-partial-component", "Settings")
		.header("x-inertia-partial-data", "auth.user.name")
		.build()
		.unwrap();
	let props = PropMap::new()
		.with("auth", json!({"user": {"name": "Ada", "email": "ada@example.com"}, "token": "t"}))
		.with("menu", json!(["Home"]));

	let page = page_json(&render(&inertia, &request, "Settings", props).await);

	assert_eq!(page["props"], json!({"auth": {"user": {"name": "Ada"}}}));
}

#[rstest]
#[tokio::test]
async fn test_rendering_is_deterministic(inertia: Inertia) {
	let request = inertia_get("/feed").build().unwrap();
	let props = || {
		PropMap::new()
			.with("b", json!({"z": 1, "a": 2}))
			.with("a", lazy(|request| request.path().to_string()))
			.with("c", defer_in(lazy(|_| 1), "x"))
			.with("d", merge(json!([1, 2])))
	};

	let first = render(&inertia, &request, "Feed", props()).await;
	let second = render(&inertia, &request, "Feed", props()).await;

	assert_eq!(first.body, second.body);
}

struct Navigation;

impl ProvidesProps for Navigation {
	fn to_props(&self, context: &RenderContext<'_>) -> PropMap {
		PropMap::new()
			.with("component", context.component)
			.with("path", context.request.path())
	}
}

#[rstest]
#[tokio::test]
async fn test_shared_props_and_providers(inertia: Inertia) {
	let request = inertia_get("/users").build().unwrap();
	let factory = inertia.factory_for(&request);
	factory.share("app.name", "Reinhardt");
	factory.share("app.locale", "en");
	factory.share_provider(Navigation);
	let mut props = PropMap::new().with("nav", provider(Navigation));
	props.push(provider(Navigation));

	let response = factory.render("Users", props).unwrap().materialize(&request).await.unwrap();

	assert_eq!(
		page_json(&response)["props"],
		json!({
			"app": {"name": "Reinhardt", "locale": "en"},
			"component": "Users",
			"path": "/users",
			"nav": {"component": "Users", "path": "/users"},
		})
	);
}

#[rstest]
#[tokio::test]
async fn test_producer_error_propagates(inertia: Inertia) {
	let request = inertia_get("/users").build().unwrap();
	let props = PropMap::new().with(
		"users",
		reinhardt_inertia::props::try_lazy(|_| -> Result<serde_json::Value, std::io::Error> {
			Err(std::io::Error::other("database offline"))
		}),
	);

	let error = inertia
		.factory_for(&request)
		.render("Users", props)
		.unwrap()
		.materialize(&request)
		.await
		.unwrap_err();

	assert!(matches!(error, Error::Prop(_)));
	assert_eq!(error.to_string(), "database offline");
}

#[rstest]
#[tokio::test]
async fn test_url_respects_forwarded_prefix_and_resolver(inertia: Inertia) {
	let request = inertia_get("/users?sort=name")
		.header("x-forwarded-prefix", "/admin/")
		.build()
		.unwrap();

	let page = page_json(&render(&inertia, &request, "Users", PropMap::new()).await);
	assert_eq!(page["url"], json!("/admin/users?sort=name"));

	let factory = inertia.factory_for(&request);
	factory.resolve_url_using(|request| format!("https://app.test{}", request.path()));
	let response = factory.render("Users", PropMap::new()).unwrap().materialize(&request).await.unwrap();
	assert_eq!(page_json(&response)["url"], json!("https://app.test/users"));
}

#[rstest]
#[case("/users/", "/users/")]
#[case("/users/?x=1", "/users/?x=1")]
#[case("/users?x=1", "/users?x=1")]
#[tokio::test]
async fn test_url_keeps_trailing_slash_as_requested(inertia: Inertia, #[case] uri: &str, #[case] expected: &str) {
	let request = inertia_get(uri).build().unwrap();

	let page = page_json(&render(&inertia, &request, "Users", PropMap::new()).await);

	assert_eq!(page["url"], json!(expected));
}

#[rstest]
#[tokio::test]
async fn test_cache_directive_and_view_data(inertia: Inertia) {
	let request = get("/reports").build().unwrap();

	let response = inertia
		.factory_for(&request)
		.render("Reports", PropMap::new())
		.unwrap()
		.with_view_data("title", "Reports")
		.cache([Duration::from_secs(30), Duration::from_secs(300)])
		.materialize(&request)
		.await
		.unwrap();

	let html = String::from_utf8(response.body.to_vec()).unwrap();
	assert!(html.contains("<title>Reports</title>"));
	let page = data_page(&html);
	assert_eq!(page["cache"], json!({"0": 30, "1": 300}));
	assert!(page["props"].get("title").is_none());
}

#[rstest]
#[tokio::test]
async fn test_clear_history_persists_in_session(inertia: Inertia, session: Arc<MemorySession>) {
	let first = with_session(inertia_get("/logout"), &session).build().unwrap();
	let factory = inertia.factory_for(&first);
	factory.clear_history();
	let response = factory.render("Home", PropMap::new()).unwrap().materialize(&first).await.unwrap();
	assert_eq!(page_json(&response)["clearHistory"], json!(true));

	let second = with_session(inertia_get("/"), &session).build().unwrap();
	let response = render(&inertia, &second, "Home", PropMap::new()).await;
	assert_eq!(page_json(&response)["clearHistory"], json!(true));

	session.forget(CLEAR_HISTORY_SESSION_KEY);
	let third = with_session(inertia_get("/"), &session).build().unwrap();
	let response = render(&inertia, &third, "Home", PropMap::new()).await;
	assert_eq!(page_json(&response)["clearHistory"], json!(false));
}

#[rstest]
#[tokio::test]
async fn test_history_encryption_from_config_and_override() {
	let inertia = Inertia::new(InertiaConfig::default().encrypt_history(true));
	let request = inertia_get("/").build().unwrap();

	let page = page_json(&render(&inertia, &request, "Home", PropMap::new()).await);
	assert_eq!(page["encryptHistory"], json!(true));

	let factory = inertia.factory_for(&request);
	factory.encrypt_history(false);
	let response = factory.render("Home", PropMap::new()).unwrap().materialize(&request).await.unwrap();
	assert_eq!(page_json(&response)["encryptHistory"], json!(false));
}

#[rstest]
#[tokio::test]
async fn test_paginated_prop_is_transformed(inertia: Inertia) {
	let request = inertia_get("/users?page=2&sort=name").build().unwrap();
	let users = PaginatedData::new(vec![json!({"id": 3}), json!({"id": 4})], 2, 2, 5);

	let page = page_json(&render(&inertia, &request, "Users", PropMap::new().with("users", users)).await);

	let users = &page["props"]["users"];
	assert_eq!(users["data"], json!([{"id": 3}, {"id": 4}]));
	assert_eq!(users["meta"]["current_page"], json!(2));
	assert_eq!(users["meta"]["last_page"], json!(3));
	assert_eq!(users["meta"]["total"], json!(5));
	assert_eq!(users["links"]["next"], json!("/users?page=3&sort=name"));
	assert_eq!(users["links"]["prev"], json!("/users?page=1&sort=name"));
}

#[rstest]
#[tokio::test]
async fn test_pagination_transform_can_be_disabled() {
	let inertia = Inertia::new(InertiaConfig::default().transform_pagination(false));
	let request = inertia_get("/users").build().unwrap();
	let users = PaginatedData::new(vec![json!({"id": 1})], 1, 10, 1);

	let page = page_json(&render(&inertia, &request, "Users", PropMap::new().with("users", users)).await);

	assert_eq!(page["props"]["users"]["data"], json!([{"id": 1}]));
	assert_eq!(page["props"]["users"]["current_page"], json!(1));
	assert!(page["props"]["users"].get("links").is_none());
}

#[rstest]
#[tokio::test]
async fn test_missing_page_component_fails_render() {
	let pages = tempfile::tempdir().unwrap();
	std::fs::write(pages.path().join("Home.vue"), "").unwrap();
	let inertia = Inertia::new(InertiaConfig::default().with_pages(PageConfig::checked([pages.path()])));
	let request = inertia_get("/").build().unwrap();
	let factory = inertia.factory_for(&request);

	assert!(factory.render("Home", PropMap::new()).is_ok());
	let error = factory.render("Missing", PropMap::new()).unwrap_err();

	assert!(matches!(error, Error::ComponentNotFound { ref component, .. } if component == "Missing"));
}
