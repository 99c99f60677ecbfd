use std::sync::Arc;

use courier::handlers::{self, AppState};
use courier::http::request::{Method, Request, RequestBuilder};
use courier::http::response::{Response, StatusCode};
use courier::server::Router;
use serde_json::Value;

fn app() -> Router {
    handlers::router(Arc::new(AppState::with_image_path("does-not-exist.png")))
}

fn get(path: &str) -> Response {
    let req = RequestBuilder::new().method(Method::GET).path(path).build().unwrap();
    app().dispatch(&req)
}

fn post(path: &str, content_type: &str, body: &str) -> Response {
    let req = RequestBuilder::new()
        .method(Method::POST)
        .path(path)
        .content_type(content_type)
        .body(body.as_bytes().to_vec())
        .build()
        .unwrap();
    app().dispatch(&req)
}

fn post_json(path: &str, body: &str) -> Response {
    post(path, "application/json", body)
}

fn json(response: &Response) -> Value {
    assert_eq!(response.content_type, "application/json");
    serde_json::from_slice(&response.body).unwrap()
}

fn text(response: &Response) -> String {
    String::from_utf8(response.body.clone()).unwrap()
}

#[test]
fn test_registered_get_routes_answer_200() {
    for path in [
        "/",
        "/info",
        "/glossary",
        "/how-it-works",
        "/image",
        "/api/health",
        "/api/users",
        "/api/stats",
        "/api/time",
    ] {
        let response = get(path);
        assert_eq!(response.status, StatusCode::OK, "path {path}");
        assert_eq!(response.status.reason_phrase(), "OK");
    }
}

#[test]
fn test_unknown_routes_answer_404() {
    assert_eq!(get("/nonexistent").status, StatusCode::NOT_FOUND);
    assert_eq!(post_json("/api/health", "{}").status, StatusCode::NOT_FOUND);

    let req = RequestBuilder::new().method(Method::UNKNOWN).path("/").build().unwrap();
    let response = app().dispatch(&req);
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(text(&response).contains("<code>/</code>"));
}

#[test]
fn test_not_found_escapes_path() {
    let response = get("/<script>");
    assert!(text(&response).contains("&lt;script&gt;"));
    assert!(!text(&response).contains("<script>"));
}

#[test]
fn test_health_is_idempotent_in_shape() {
    let first = json(&get("/api/health"));
    let second = json(&get("/api/health"));

    assert_eq!(first["status"], "healthy");
    assert_eq!(first["service"], second["service"]);
    assert_eq!(first["version"], second["version"]);
    let keys = |v: &Value| v.as_object().unwrap().keys().cloned().collect::<Vec<_>>();
    assert_eq!(keys(&first), keys(&second));
}

#[test]
fn test_list_users() {
    let body = json(&get("/api/users"));

    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 3);
    assert_eq!(body["data"][0]["name"], "Alice Johnson");
    assert_eq!(body["data"][2]["email"], "carol@example.com");
}

#[test]
fn test_time_fields() {
    let body = json(&get("/api/time"));
    let data = &body["data"];

    assert_eq!(data["timezone"], "UTC");
    assert!(data["timestamp"].as_u64().unwrap() > 0);
    let iso = data["iso"].as_str().unwrap();
    assert_eq!(iso, format!("{}T{}", data["date"].as_str().unwrap(), data["time"].as_str().unwrap()));
}

#[test]
fn test_calculate_add() {
    let response = post_json("/api/calculate", r#"{"a":10,"b":5,"operation":"add"}"#);
    assert_eq!(response.status, StatusCode::OK);

    let body = json(&response);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["result"].as_f64(), Some(15.0));
}

#[test]
fn test_calculate_operations() {
    let cases = [
        ("subtract", 5.0),
        ("multiply", 50.0),
        ("divide", 2.0),
    ];
    for (op, expected) in cases {
        let body = format!(r#"{{"a":10,"b":5,"operation":"{op}"}}"#);
        let result = json(&post_json("/api/calculate", &body));
        assert_eq!(result["data"]["result"].as_f64(), Some(expected), "operation {op}");
    }

    let result = json(&post_json("/api/calculate", r#"{"a":10,"b":3,"operation":"divide"}"#));
    assert_eq!(result["data"]["result"].as_f64(), Some(3.33));
}

#[test]
fn test_calculate_truncates_fractional_operands() {
    let response = post_json("/api/calculate", r#"{"a":10.5,"b":5,"operation":"add"}"#);
    assert_eq!(response.status, StatusCode::OK);

    let body = json(&response);
    assert_eq!(body["data"]["a"], 10);
    assert_eq!(body["data"]["result"].as_f64(), Some(15.0));

    let response = post_json("/api/calculate", r#"{"a":7,"b":0.9,"operation":"divide"}"#);
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&response)["error"], "Division by zero");
}

#[test]
fn test_calculate_errors() {
    let response = post_json("/api/calculate", r#"{"a":1,"b":0,"operation":"divide"}"#);
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&response)["error"], "Division by zero");

    let response = post_json("/api/calculate", r#"{"a":1,"b":2,"operation":"modulo"}"#);
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = post_json("/api/calculate", r#"{"a":1,"b":2}"#);
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&response)["error"], "Missing operation field");
}

#[test]
fn test_login_success() {
    let response = post_json("/api/login", r#"{"username":"admin","password":"password"}"#);
    assert_eq!(response.status, StatusCode::OK);

    let body = json(&response);
    assert_eq!(body["data"]["user"], "admin");
    assert_eq!(body["data"]["expires_in"], 3600);
}

#[test]
fn test_login_rejects_other_credentials() {
    for body in [
        r#"{"username":"admin","password":"wrong"}"#,
        r#"{"username":"root","password":"password"}"#,
        r#"{"username":"","password":""}"#,
    ] {
        let response = post_json("/api/login", body);
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "body {body}");
        assert_eq!(json(&response)["success"], false);
    }
}

#[test]
fn test_login_missing_fields() {
    let response = post_json("/api/login", r#"{"username":"admin"}"#);
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[test]
fn test_create_user() {
    let response = post_json("/api/users", r#"{"name":"Dana","email":"dana@example.com"}"#);
    assert_eq!(response.status, StatusCode::CREATED);

    let body = json(&response);
    let id = body["data"]["id"].as_u64().unwrap();
    assert!((100..1100).contains(&id));
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(body["data"]["email"], "dana@example.com");
}

#[test]
fn test_create_user_missing_email() {
    let response = post_json("/api/users", r#"{"name":"Dana"}"#);
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let body = json(&response);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("email"));
}

#[test]
fn test_invalid_json_is_bad_request() {
    let response = post_json("/api/users", "{not json");
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&response)["error"], "Invalid JSON body");
}

#[test]
fn test_echo_shows_body() {
    let response = post("/echo", "text/plain", "hi <there>");
    assert_eq!(response.status, StatusCode::OK);

    let html = text(&response);
    assert!(html.contains("text/plain"));
    assert!(html.contains("10 bytes"));
    assert!(html.contains("hi &lt;there&gt;"));
}

#[test]
fn test_echo_without_body() {
    let req = RequestBuilder::new().method(Method::POST).path("/echo").build().unwrap();
    let response = app().dispatch(&req);

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type, "text/plain");
    assert_eq!(text(&response), "No body received in POST request");
}

#[test]
fn test_data_decodes_form_bodies() {
    let response = post("/data", "application/x-www-form-urlencoded", "name=Jane+Doe&city=S%C3%A3o+Paulo");
    assert_eq!(response.status, StatusCode::OK);

    let html = text(&response);
    assert!(html.contains("Jane Doe"));
    assert!(html.contains("São Paulo"));
}

#[test]
fn test_data_without_body_is_404() {
    let req = RequestBuilder::new().method(Method::POST).path("/data").build().unwrap();
    assert_eq!(app().dispatch(&req).status, StatusCode::NOT_FOUND);
}

#[test]
fn test_info_reports_client_ip() {
    let req: Request = RequestBuilder::new()
        .method(Method::GET)
        .path("/info")
        .client_ip("203.0.113.7")
        .build()
        .unwrap();
    let html = text(&app().dispatch(&req));

    assert!(html.contains("203.0.113.7"));
    assert!(text(&get("/info")).contains("unknown"));
}

#[test]
fn test_image_falls_back_to_svg() {
    let response = get("/image");

    assert_eq!(response.content_type, "image/svg+xml");
    assert!(text(&response).starts_with("<svg"));
}

#[test]
fn test_image_is_loaded_at_startup() {
    let path = std::env::temp_dir().join(format!("courier-test-{}.png", std::process::id()));
    let bytes: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0xFF];
    std::fs::write(&path, &bytes).unwrap();

    let router = handlers::router(Arc::new(AppState::with_image_path(&path)));
    // Loaded once at startup: later changes to the file are not seen
    std::fs::remove_file(&path).unwrap();

    let req = RequestBuilder::new().method(Method::GET).path("/image").build().unwrap();
    let response = router.dispatch(&req);

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type, "image/png");
    assert_eq!(response.body, bytes);
}
