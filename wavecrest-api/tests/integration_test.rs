use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wavecrest_api::{app, AppState};
use wavecrest_booking::{AvailabilityEngine, BookingService, MockCheckoutGateway};
use wavecrest_store::MemoryStore;

fn test_state(with_gateway: bool) -> AppState {
    let store = Arc::new(MemoryStore::new());
    let gateway: Option<Arc<dyn wavecrest_core::payment::PaymentGateway>> = if with_gateway {
        Some(Arc::new(MockCheckoutGateway))
    } else {
        None
    };
    AppState {
        catalog: store.clone(),
        ledger: store.clone(),
        engine: AvailabilityEngine::new(store.clone(), store.clone()),
        booking: Arc::new(BookingService::new(store.clone(), store.clone(), gateway)),
    }
}

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn patch_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::PATCH)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn booking_payload(unit_id: &str, start_time: &str) -> Value {
    json!({
        "unit_id": unit_id,
        "date": "2026-03-04",
        "duration_class_id": "ts-60",
        "start_time": start_time,
        "customer_name": "Emily K.",
        "customer_email": "emily@example.com",
        "customer_phone": "555-0123",
    })
}

#[tokio::test]
async fn test_availability_enumerates_the_open_day() {
    let router = app(test_state(false));
    let (status, body) = send(
        &router,
        get("/v1/availability?unit_id=js-1&date=2026-03-04&duration_class_id=ts-60"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let times = body["available_times"].as_array().unwrap();
    assert_eq!(times.len(), 13);
    assert_eq!(times[0], "09:00");
    assert_eq!(times[12], "17:00");
}

#[tokio::test]
async fn test_availability_rejects_unknown_duration_class() {
    let router = app(test_state(false));
    let (status, _) = send(
        &router,
        get("/v1/availability?unit_id=js-1&date=2026-03-04&duration_class_id=ts-999"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_then_conflict() {
    let router = app(test_state(false));

    let (status, body) = send(&router, post_json("/v1/bookings", &booking_payload("js-1", "10:00"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["booking"]["status"], "confirmed");
    assert_eq!(body["booking"]["total_price_cents"], 10000);

    // Same slot again: expected contention outcome, not a server error
    let (status, body) = send(&router, post_json("/v1/bookings", &booking_payload("js-1", "10:30"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "This slot is no longer available");

    // The booked hour disappears from the availability list
    let (_, body) = send(
        &router,
        get("/v1/availability?unit_id=js-1&date=2026-03-04&duration_class_id=ts-60"),
    )
    .await;
    let times = body["available_times"].as_array().unwrap();
    assert!(!times.iter().any(|t| t == "10:00"));
    assert!(times.iter().any(|t| t == "11:00"));
}

#[tokio::test]
async fn test_booking_missing_fields_is_bad_request() {
    let router = app(test_state(false));
    let (status, _) = send(
        &router,
        post_json(
            "/v1/bookings",
            &json!({ "unit_id": "js-1", "date": "2026-03-04" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_unknown_booking_is_not_found() {
    let router = app(test_state(false));
    let (status, _) = send(
        &router,
        patch_json("/v1/bookings/bk-missing", &json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancellation_reopens_the_slot() {
    let router = app(test_state(false));

    let (_, body) = send(&router, post_json("/v1/bookings", &booking_payload("js-1", "10:00"))).await;
    let id = body["booking"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        patch_json(&format!("/v1/bookings/{}", id), &json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["status"], "cancelled");

    let (status, _) = send(&router, post_json("/v1/bookings", &booking_payload("js-1", "10:00"))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_checkout_flow_with_webhook_confirmation() {
    let router = app(test_state(true));

    let (status, body) = send(&router, post_json("/v1/checkout", &booking_payload("__all__", "10:00"))).await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["session_id"].as_str().unwrap().to_string();
    let ids: Vec<String> = body["reservation_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 2);

    // Holds are pending and block the slot
    let (_, body) = send(&router, get("/v1/bookings")).await;
    assert!(body["bookings"]
        .as_array()
        .unwrap()
        .iter()
        .all(|b| b["status"] == "pending"));
    let (status, _) = send(&router, post_json("/v1/bookings", &booking_payload("js-1", "10:00"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Provider completes the session
    let webhook = json!({
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": session_id,
            "metadata": { "reservation_ids": ids.join(",") },
        }},
    });
    let (status, body) = send(&router, post_json("/v1/webhooks/payments", &webhook)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);

    let (_, body) = send(&router, get("/v1/bookings")).await;
    assert!(body["bookings"]
        .as_array()
        .unwrap()
        .iter()
        .all(|b| b["status"] == "confirmed"));
}

#[tokio::test]
async fn test_checkout_session_failure_rolls_back() {
    let router = app(test_state(true));

    let mut payload = booking_payload("js-1", "10:00");
    payload["customer_email"] = json!("fail-gateway@example.com");

    let (status, _) = send(&router, post_json("/v1/checkout", &payload)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, body) = send(&router, get("/v1/bookings")).await;
    assert!(body["bookings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_verify_confirms_paid_session() {
    let router = app(test_state(true));

    let (_, body) = send(&router, post_json("/v1/checkout", &booking_payload("js-1", "10:00"))).await;
    let session_id = body["session_id"].as_str().unwrap();
    let reservation_id = body["reservation_ids"][0].as_str().unwrap();

    let (status, body) = send(
        &router,
        get(&format!(
            "/v1/checkout/verify?session_id={}&reservation_id={}",
            session_id, reservation_id
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["status"], "confirmed");
}

#[tokio::test]
async fn test_inventory_replace_drops_missing_records() {
    let router = app(test_state(false));

    let (_, body) = send(&router, get("/v1/inventory")).await;
    assert_eq!(body["units"].as_array().unwrap().len(), 2);
    assert_eq!(body["duration_classes"].as_array().unwrap().len(), 4);

    let patch = json!({
        "units": [{
            "id": "js-1",
            "name": "Wave Runner 1",
            "description": "Yamaha EX Sport",
            "status": "maintenance",
        }],
        "blackout_dates": [{
            "id": "bd-1",
            "date": "2026-07-04",
            "reason": "Regatta",
        }],
    });
    let (status, body) = send(&router, patch_json("/v1/inventory", &patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["units"].as_array().unwrap().len(), 1);
    assert_eq!(body["units"][0]["status"], "maintenance");
    assert_eq!(body["blackout_dates"].as_array().unwrap().len(), 1);
    // Untouched section survives
    assert_eq!(body["duration_classes"].as_array().unwrap().len(), 4);

    // The lone unit is in maintenance: nothing is bookable
    let (_, body) = send(
        &router,
        get("/v1/availability?unit_id=js-1&date=2026-03-04&duration_class_id=ts-60"),
    )
    .await;
    assert!(body["available_times"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_blackout_date_blocks_booking() {
    let router = app(test_state(false));

    let patch = json!({
        "blackout_dates": [{ "id": "bd-1", "date": "2026-03-04", "reason": "Storm" }],
    });
    send(&router, patch_json("/v1/inventory", &patch)).await;

    let (status, _) = send(&router, post_json("/v1/bookings", &booking_payload("js-2", "10:00"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_settings_partial_update() {
    let router = app(test_state(false));

    let (status, body) = send(
        &router,
        patch_json("/v1/settings", &json!({ "operating_hours_end": "17:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settings"]["operating_hours_end"], "17:00");
    assert_eq!(body["settings"]["operating_hours_start"], "09:00");

    // The shorter day trims the tail of the availability list
    let (_, body) = send(
        &router,
        get("/v1/availability?unit_id=js-1&date=2026-03-04&duration_class_id=ts-60"),
    )
    .await;
    let times = body["available_times"].as_array().unwrap();
    assert_eq!(times.last().unwrap(), "16:00");
}

#[tokio::test]
async fn test_weekend_booking_is_priced_higher() {
    let router = app(test_state(false));

    let mut payload = booking_payload("js-1", "10:00");
    payload["date"] = json!("2026-03-07"); // Saturday
    let (_, body) = send(&router, post_json("/v1/bookings", &payload)).await;
    assert_eq!(body["booking"]["total_price_cents"], 12500);
}
