//! Customer surface: bookings, cart, checkout, feedback, profile and
//! provider discovery.

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

pub async fn list_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let query = build_query(&[
        ("status", params.get("status").map(String::as_str)),
        ("page", params.get("page").map(String::as_str)),
    ]);

    let result = state
        .upstream
        .request(
            &format!("/api/v1/customer/bookings{}", query),
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load bookings")
}

pub async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["serviceId", "slot"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/customer/bookings",
            &cookies,
            RequestOptions::post(payload),
        )
        .await;

    relay(result, "Failed to create booking")
}

pub async fn get_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(booking_id): Path<String>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/customer/bookings/{}", booking_id),
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load booking")
}

/// Cancellation needs an explanation for the provider.
pub async fn cancel_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(booking_id): Path<String>,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["reason"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/customer/bookings/{}/cancel", booking_id),
            &cookies,
            RequestOptions::patch(payload),
        )
        .await;

    relay(result, "Failed to cancel booking")
}

pub async fn get_cart(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/customer/cart", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load cart")
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["serviceId"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/customer/cart",
            &cookies,
            RequestOptions::post(payload),
        )
        .await;

    relay(result, "Failed to add item to cart")
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(item_id): Path<String>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/customer/cart/{}", item_id),
            &cookies,
            RequestOptions::delete(),
        )
        .await;

    relay(result, "Failed to remove item from cart")
}

pub async fn checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/customer/checkout",
            &cookies,
            RequestOptions::post(payload),
        )
        .await;

    relay(result, "Checkout failed")
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["rating", "comment", "bookingId"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/customer/feedback",
            &cookies,
            RequestOptions::post(payload),
        )
        .await;

    relay(result, "Failed to submit feedback")
}

pub async fn get_profile(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/customer/profile", &cookies, RequestOptions::get())
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
            "/api/v1/customer/profile",
            &cookies,
            RequestOptions::put(payload),
        )
        .await;

    relay(result, "Failed to update profile")
}

pub async fn list_providers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let query = build_query(&[
        ("category", params.get("category").map(String::as_str)),
        ("search", params.get("search").map(String::as_str)),
        ("page", params.get("page").map(String::as_str)),
    ]);

    let result = state
        .upstream
        .request(
            &format!("/api/v1/customer/providers{}", query),
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load providers")
}

pub async fn get_provider(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(provider_id): Path<String>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/customer/providers/{}", provider_id),
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load provider")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::gateway::config::GatewayConfig;
    use crate::gateway::upstream::UpstreamClient;

    // Unroutable upstream: leaking past a guard would produce a 502.
    fn test_state() -> State<AppState> {
        let config = GatewayConfig {
            upstream_base_url: "http://127.0.0.1:9".to_string(),
            ..GatewayConfig::default()
        };
        State(AppState {
            upstream: Arc::new(UpstreamClient::new(&config).unwrap()),
        })
    }

    #[tokio::test]
    async fn feedback_without_required_fields_is_local_400() {
        let response = submit_feedback(
            test_state(),
            HeaderMap::new(),
            Json(json!({"rating": 4, "comment": "great"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn booking_cancel_without_reason_is_local_400() {
        let response = cancel_booking(
            test_state(),
            HeaderMap::new(),
            Path("bk_1".to_string()),
            Json(json!({})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
