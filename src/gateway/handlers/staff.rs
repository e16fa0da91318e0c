//! Staff surface: applications, availability, assigned bookings, earnings
//! and leave.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use serde_json::Value;

use crate::gateway::handlers::common::{build_query, error_response, missing_field, relay};
use crate::gateway::server::AppState;
use crate::gateway::session::SessionCookies;
use crate::gateway::upstream::RequestOptions;

pub async fn list_applications(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/staff/applications",
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load applications")
}

pub async fn apply(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["businessId"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/staff/applications",
            &cookies,
            RequestOptions::post(payload),
        )
        .await;

    relay(result, "Failed to submit application")
}

pub async fn get_availability(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/staff/availability",
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load availability")
}

pub async fn update_availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/staff/availability",
            &cookies,
            RequestOptions::put(payload),
        )
        .await;

    relay(result, "Failed to update availability")
}

pub async fn list_bank_accounts(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/staff/bank-accounts",
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load bank accounts")
}

pub async fn add_bank_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["accountNumber", "bankName"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/staff/bank-accounts",
            &cookies,
            RequestOptions::post(payload),
        )
        .await;

    relay(result, "Failed to add bank account")
}

pub async fn list_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let query = build_query(&[
        ("status", params.get("status").map(String::as_str)),
        ("date", params.get("date").map(String::as_str)),
    ]);

    let result = state
        .upstream
        .request(
            &format!("/api/v1/staff/bookings{}", query),
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load bookings")
}

pub async fn update_booking_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(booking_id): Path<String>,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["status"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/staff/bookings/{}/status", booking_id),
            &cookies,
            RequestOptions::patch(payload),
        )
        .await;

    relay(result, "Failed to update booking status")
}

pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/staff/dashboard", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load dashboard")
}

pub async fn list_earnings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let query = build_query(&[
        ("from", params.get("from").map(String::as_str)),
        ("to", params.get("to").map(String::as_str)),
    ]);

    let result = state
        .upstream
        .request(
            &format!("/api/v1/staff/earnings{}", query),
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load earnings")
}

pub async fn list_leave(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/staff/leave", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load leave requests")
}

pub async fn request_leave(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["startDate", "endDate", "reason"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/staff/leave",
            &cookies,
            RequestOptions::post(payload),
        )
        .await;

    relay(result, "Failed to request leave")
}

pub async fn list_payments(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/staff/payments", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load payments")
}

pub async fn get_profile(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/staff/profile", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load profile")
}

pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/staff/profile",
            &cookies,
            RequestOptions::put(payload),
        )
        .await;

    relay(result, "Failed to update profile")
}
