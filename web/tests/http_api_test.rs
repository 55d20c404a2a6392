//! HTTP API tests: the full router backed by the in-memory store.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use slotbook_core::{Branch, Timeslot};
use slotbook_testing::{InMemoryBookingStore, fixtures, stepping_clock};
use slotbook_web::{AppState, CORRELATION_ID_HEADER, build_router};
use std::sync::Arc;
use tower::ServiceExt;

const DAY: &str = "2025-01-15";

async fn setup(capacities: &[u32]) -> (Router, InMemoryBookingStore, Branch, Vec<Timeslot>) {
    fixtures::init_tracing();
    let store = InMemoryBookingStore::new().with_clock(Arc::new(stepping_clock()));
    let (branch, slots) = fixtures::seed_day(&store, DAY, capacities).await;
    let router = build_router(
        AppState::new(Arc::new(store.clone())),
        &["http://localhost:5173".to_string()],
    );
    (router, store, branch, slots)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create(router: &Router, branch: &Branch, slot: &Timeslot, name: &str) -> Response {
    send(
        router,
        Method::POST,
        "/orders",
        Some(json!({
            "branch_id": branch.id.get(),
            "timeslot_id": slot.id.get(),
            "customer_name": name,
        })),
    )
    .await
}

#[tokio::test]
async fn health_and_readiness() {
    let (router, _, _, _) = setup(&[]).await;

    let response = send(&router, Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(CORRELATION_ID_HEADER));
    assert_eq!(json_body(response).await["status"], "ok");

    let response = send(&router, Method::GET, "/ready", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["ready"], true);
}

#[tokio::test]
async fn create_order_returns_201_with_trimmed_name() {
    let (router, store, branch, slots) = setup(&[2]).await;

    let response = create(&router, &branch, &slots[0], "  Ada  ").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["order"]["customer_name"], "Ada");
    assert_eq!(body["order"]["status"], "created");
    assert_eq!(body["order"]["timeslot_id"], slots[0].id.get());
    assert_eq!(store.timeslot(slots[0].id).await.unwrap().reserved, 1);
}

#[tokio::test]
async fn create_order_accepts_json_without_content_type() {
    let (router, store, branch, slots) = setup(&[2]).await;

    let body = json!({
        "branch_id": branch.id.get(),
        "timeslot_id": slots[0].id.get(),
        "customer_name": "Ada",
    });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/orders")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["order"]["customer_name"], "Ada");
    assert_eq!(store.timeslot(slots[0].id).await.unwrap().reserved, 1);
}

#[tokio::test]
async fn create_order_rejects_bad_bodies() {
    let (router, _, branch, slots) = setup(&[2]).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "invalid json body");

    for body in [
        json!({"timeslot_id": slots[0].id.get(), "customer_name": "Ada"}),
        json!({"branch_id": branch.id.get(), "timeslot_id": 0, "customer_name": "Ada"}),
        json!({"branch_id": branch.id.get(), "timeslot_id": slots[0].id.get(), "customer_name": "   "}),
    ] {
        let response = send(&router, Method::POST, "/orders", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["message"],
            "branch_id, timeslot_id, customer_name are required"
        );
    }
}

#[tokio::test]
async fn domain_conflicts_map_to_status_codes() {
    let (router, store, branch, slots) = setup(&[1]).await;

    assert_eq!(
        create(&router, &branch, &slots[0], "First").await.status(),
        StatusCode::CREATED
    );

    let response = create(&router, &branch, &slots[0], "Second").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["code"], "TIMESLOT_FULLY_BOOKED");

    let inactive = store
        .create_timeslot(fixtures::hourly_slot(&branch, fixtures::date(DAY), 14, 3).inactive())
        .await
        .unwrap();
    let response = create(&router, &branch, &inactive, "Ada").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["code"], "TIMESLOT_INACTIVE");

    let response = send(
        &router,
        Method::POST,
        "/orders",
        Some(json!({"branch_id": branch.id.get(), "timeslot_id": 999, "customer_name": "Ada"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["code"], "TIMESLOT_NOT_FOUND");
}

#[tokio::test]
async fn cancel_order_flow() {
    let (router, store, branch, slots) = setup(&[2]).await;
    let body = json_body(create(&router, &branch, &slots[0], "Ada").await).await;
    let order_id = body["order"]["id"].as_i64().unwrap();

    let uri = format!("/orders/{order_id}/cancel");
    let response = send(&router, Method::PATCH, &uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["order"]["status"], "cancelled");
    assert_eq!(store.timeslot(slots[0].id).await.unwrap().reserved, 0);

    let response = send(&router, Method::PATCH, &uri, None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["code"], "ORDER_NOT_CANCELLABLE");

    let response = send(&router, Method::PATCH, "/orders/777/cancel", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    for bad in ["abc", "0", "-3"] {
        let response = send(&router, Method::PATCH, &format!("/orders/{bad}/cancel"), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "invalid order id");
    }
}

#[tokio::test]
async fn store_failure_maps_to_500() {
    let (router, store, branch, slots) = setup(&[2]).await;
    store.fail_next_commit();

    let response = create(&router, &branch, &slots[0], "Ada").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["code"], "STORE_FAILURE");
    assert_eq!(store.timeslot(slots[0].id).await.unwrap().reserved, 0);
}

#[tokio::test]
async fn listings_and_timetable() {
    let (router, _, branch, slots) = setup(&[2, 1]).await;
    let first = json_body(create(&router, &branch, &slots[0], "A").await).await;
    let second = json_body(create(&router, &branch, &slots[0], "B").await).await;
    let cancelled_id = second["order"]["id"].as_i64().unwrap();
    send(&router, Method::PATCH, &format!("/orders/{cancelled_id}/cancel"), None).await;

    let query = format!("branch_id={}&date={DAY}", branch.id.get());

    let branches = json_body(send(&router, Method::GET, "/branches", None).await).await;
    assert_eq!(branches["count"], 1);
    assert_eq!(branches["items"][0]["id"], branch.id.get());

    let timeslots = json_body(send(&router, Method::GET, &format!("/timeslots?{query}"), None).await).await;
    assert_eq!(timeslots["count"], 2);
    assert_eq!(timeslots["items"][0]["start_time"], "09:00:00");
    assert_eq!(timeslots["items"][0]["reserved"], 1);

    let orders = json_body(send(&router, Method::GET, &format!("/orders?{query}"), None).await).await;
    assert_eq!(orders["branch_id"], branch.id.get());
    assert_eq!(orders["date"], DAY);
    assert_eq!(orders["count"], 2);

    let timetable = json_body(send(&router, Method::GET, &format!("/timetable?{query}"), None).await).await;
    assert_eq!(timetable["date"], DAY);
    let items = timetable["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["orders"].as_array().unwrap().len(), 1);
    assert_eq!(items[0]["orders"][0]["id"], first["order"]["id"]);
    assert!(items[1]["orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn query_validation_messages() {
    let (router, _, _, _) = setup(&[]).await;

    let cases = [
        ("/orders", "branch_id and date are required"),
        ("/timeslots?branch_id=1", "branch_id and date are required"),
        ("/timetable?branch_id=x&date=2025-01-15", "branch_id must be a positive integer"),
        ("/orders?branch_id=-1&date=2025-01-15", "branch_id must be a positive integer"),
        ("/orders?branch_id=1&date=15-01-2025", "date must be YYYY-MM-DD"),
        ("/timetable?branch_id=1&date=2025-02-30", "date must be YYYY-MM-DD"),
    ];

    for (uri, message) in cases {
        let response = send(&router, Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json_body(response).await["message"], message, "{uri}");
    }
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let (router, _, _, _) = setup(&[]).await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/orders")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
    assert_eq!(headers.get(header::ACCESS_CONTROL_MAX_AGE).unwrap(), "86400");

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/orders")
        .header(header::ORIGIN, "http://evil.test")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
