use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use document_store::MemoryStore;
use domain_bids::{BidService, handlers};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;

fn app() -> Router {
    handlers::router(BidService::new(MemoryStore::new("bids")))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn place(app: &Router, bid: Value) -> String {
    let (status, body) = send(app, json_request("POST", "/", bid)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    tokio::time::sleep(Duration::from_millis(2)).await;
    body["_id"].as_str().unwrap().to_string()
}

fn bid(name: &str, rate: f64, location: Option<(f64, f64)>) -> Value {
    let mut bid = json!({
        "productId": "prod-1",
        "bidderId": name.to_lowercase().replace(' ', "-"),
        "bidderName": name,
        "rate": rate,
        "currency": "usd",
    });
    if let Some((lat, lng)) = location {
        bid["location"] = json!({ "lat": lat, "lng": lng });
    }
    bid
}

#[tokio::test]
async fn place_and_fetch() {
    let app = app();
    let id = place(&app, bid("Acme Corp", 120.0, None)).await;

    let (status, body) = send(&app, get(&format!("/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["currency"], "USD");
}

#[tokio::test]
async fn rate_range_and_sort() {
    let app = app();
    for (name, rate) in [("Acme", 80.0), ("Globex", 100.0), ("Initech", 150.0), ("Umbrella", 200.0), ("Hooli", 250.0)] {
        place(&app, bid(name, rate, None)).await;
    }

    let (_, body) = send(&app, get("/?rate%5Bgte%5D=100&rate%5Blte%5D=200&sort=-rate")).await;
    assert_eq!(body["meta"]["total"], 3);
    let rates: Vec<f64> = body["result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["rate"].as_f64().unwrap())
        .collect();
    assert_eq!(rates, vec![200.0, 150.0, 100.0]);
}

#[tokio::test]
async fn distance_from_origin() {
    let app = app();
    place(&app, bid("Near", 100.0, Some((0.0, 1.0)))).await;
    place(&app, bid("Nowhere", 100.0, None)).await;

    let (status, body) = send(&app, get("/?lat=0&lng=0&sort=bidderName")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["result"][0]["bidderName"], "Near");
    assert_eq!(body["result"][0]["distanceKm"], 111.19);
    assert!(body["result"][1].get("distanceKm").is_none());

    // invalid coordinates are ignored, never treated as filters
    let (_, body) = send(&app, get("/?lat=north&lng=0")).await;
    assert_eq!(body["meta"]["total"], 2);
    assert!(body["result"][0].get("distanceKm").is_none());
}

#[tokio::test]
async fn decision_and_soft_delete() {
    let app = app();
    let id = place(&app, bid("Acme Corp", 120.0, None)).await;
    place(&app, bid("Globex", 90.0, None)).await;

    let (status, body) = send(
        &app,
        json_request("PATCH", &format!("/{id}"), json!({ "status": "accepted", "rate": 110.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["rate"], 110.0);

    let (status, _) = send(&app, json_request("PATCH", &format!("/{id}"), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Request::delete(format!("/{id}")).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, get("/?searchTerm=acme")).await;
    assert_eq!(body["meta"]["total"], 0);
    let (_, body) = send(&app, get("/")).await;
    assert_eq!(body["meta"]["total"], 1);
}

#[tokio::test]
async fn invalid_bid_is_rejected() {
    let (status, body) = send(&app(), json_request("POST", "/", bid("Acme", -5.0, Some((120.0, 0.0))))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}
