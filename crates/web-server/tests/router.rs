use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use database::MemoryStore;
use pagination::PageLimits;
use scheduling::Scheduling;
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;

fn app() -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    let service = Scheduling::new(store.clone(), PageLimits::default());
    (web_server::router(service, Duration::from_secs(5)), store)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_reports_store_reachability() {
    let (app, store) = app();
    let (status, body) = call(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    store.set_available(false);
    let (status, body) = call(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "store_unavailable");
}

#[tokio::test]
async fn create_fetch_and_patch_a_team() {
    let (app, _) = app();
    let (status, created) = call(
        &app,
        Method::POST,
        "/api/teams",
        Some(json!({ "name": "Spa", "color": "#AAAAAA", "sortOrder": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["isActive"], true);

    let (status, fetched) = call(&app, Method::GET, "/api/teams/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Spa");

    let (status, patched) = call(
        &app,
        Method::PATCH,
        "/api/teams/1",
        Some(json!({ "description": "Wellness" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["description"], "Wellness");
    assert_eq!(patched["color"], "#AAAAAA");
}

#[tokio::test]
async fn validation_failures_are_unprocessable() {
    let (app, _) = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/shift-types",
        Some(json!({
            "name": "Backwards",
            "defaultStartTime": "17:00:00",
            "defaultEndTime": "09:00:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["error"], "defaultStartTime must not be after defaultEndTime");
}

#[tokio::test]
async fn malformed_bodies_are_unprocessable() {
    let (app, _) = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/teams",
        Some(json!({ "name": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "invalid_body");

    let (status, body) = call(&app, Method::POST, "/api/teams", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "invalid_body");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn bad_ids_and_unknown_routes_answer_in_json() {
    let (app, _) = app();
    let (status, body) = call(&app, Method::GET, "/api/teams/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_path");
    assert!(body["error"].is_string());

    let (status, body) = call(&app, Method::GET, "/api/schedules/1.5/shifts", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_path");

    let (status, body) = call(&app, Method::GET, "/api/rotas", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
    assert_eq!(body["error"], "No route for /api/rotas");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (app, _) = app();
    let (status, body) = call(&app, Method::GET, "/api/schedules/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Schedule 99 not found");
}

#[tokio::test]
async fn collections_are_paginated() {
    let (app, _) = app();
    for i in 0..25 {
        call(
            &app,
            Method::POST,
            "/api/departments",
            Some(json!({ "name": format!("D{i:02}") })),
        )
        .await;
    }

    let (status, page) = call(&app, Method::GET, "/api/departments?page=2&pageSize=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 25);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["offset"], 10);
    assert_eq!(page["hasMore"], true);
    assert_eq!(page["data"].as_array().unwrap().len(), 10);
    assert_eq!(page["data"][0]["name"], "D10");

    let uri = "/api/departments?limit=invalid&offset=invalid";
    let (_, page) = call(&app, Method::GET, uri, None).await;
    assert_eq!(page["limit"], 10);
    assert_eq!(page["offset"], 0);
    assert!(page.get("page").is_none());
}

#[tokio::test]
async fn referenced_records_cannot_be_deleted() {
    let (app, _) = app();
    let (status, _) = call(&app, Method::POST, "/api/admin/seed", None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, Method::DELETE, "/api/shift-types/1", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "dependency_conflict");

    // "On Call" is the only shift type nothing points at.
    let (status, _) = call(&app, Method::DELETE, "/api/shift-types/5", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::GET, "/api/shift-types/5", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_lifecycle_round_trip() {
    let (app, _) = app();
    call(&app, Method::POST, "/api/admin/seed", None).await;

    let (status, body) = call(&app, Method::POST, "/api/admin/seed", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "already_seeded");

    let (status, _) = call(&app, Method::POST, "/api/admin/reset", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, counts) = call(&app, Method::GET, "/api/admin/status", None).await;
    assert!(counts.as_array().unwrap().iter().all(|c| c["rows"] == 0));

    let (status, counts) = call(&app, Method::POST, "/api/admin/reset-and-seed", None).await;
    assert_eq!(status, StatusCode::OK);
    let total: u64 = counts
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["rows"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 34);
}

#[tokio::test]
async fn detail_routes_preload_children() {
    let (app, _) = app();
    call(&app, Method::POST, "/api/admin/seed", None).await;

    let (status, schedule) = call(&app, Method::GET, "/api/schedules/1/shifts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schedule["name"], "Week 1");
    assert_eq!(schedule["shifts"].as_array().unwrap().len(), 5);

    let (_, week) = call(&app, Method::GET, "/api/shift-templates/1/week", None).await;
    assert_eq!(week["days"][0]["weekday"], "monday");
    assert_eq!(week["days"][0]["shiftType"]["name"], "Day");
    assert!(week["days"][6]["shiftType"].is_null());

    let (_, team) = call(&app, Method::GET, "/api/teams/1/members", None).await;
    assert_eq!(team["name"], "Front Desk");
    assert!(team["users"].is_array());
    assert!(team["members"].is_array());
}
