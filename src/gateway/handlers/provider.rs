//! Provider surface: business profile, bookings, staffing and billing.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use serde_json::Value;

use crate::gateway::handlers::common::{
    build_query, error_response, missing_field, relay, upstream_message,
};
use crate::gateway::server::AppState;
use crate::gateway::session::SessionCookies;
use crate::gateway::upstream::RequestOptions;

pub async fn get_address(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/provider/address", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load address")
}

pub async fn update_address(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/provider/address",
            &cookies,
            RequestOptions::put(payload),
        )
        .await;

    relay(result, "Failed to update address")
}

pub async fn list_bank_accounts(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/provider/bank-accounts",
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
            "/api/v1/provider/bank-accounts",
            &cookies,
            RequestOptions::post(payload),
        )
        .await;

    relay(result, "Failed to add bank account")
}

pub async fn remove_bank_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(account_id): Path<String>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/provider/bank-accounts/{}", account_id),
            &cookies,
            RequestOptions::delete(),
        )
        .await;

    relay(result, "Failed to remove bank account")
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
        ("page", params.get("page").map(String::as_str)),
    ]);

    let result = state
        .upstream
        .request(
            &format!("/api/v1/provider/bookings{}", query),
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
            &format!("/api/v1/provider/bookings/{}/status", booking_id),
            &cookies,
            RequestOptions::patch(payload),
        )
        .await;

    relay(result, "Failed to update booking status")
}

pub async fn list_cancellations(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/provider/cancellations",
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load cancellation requests")
}

/// Approve or reject a cancellation. `bookingId` names the target, so a
/// missing one never reaches the upstream.
pub async fn decide_cancellation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["bookingId"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/provider/cancellations",
            &cookies,
            RequestOptions::patch(payload),
        )
        .await;

    relay(result, "Failed to update cancellation request")
}

pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/provider/dashboard", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load dashboard")
}

pub async fn list_feedback(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/provider/feedback", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load feedback")
}

pub async fn list_services(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/provider/services", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load services")
}

pub async fn create_service(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["name", "category", "price"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/provider/services",
            &cookies,
            RequestOptions::post(payload),
        )
        .await;

    relay(result, "Failed to create service")
}

pub async fn update_service(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(service_id): Path<String>,
    Json(payload): Json<Value>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/provider/services/{}", service_id),
            &cookies,
            RequestOptions::patch(payload),
        )
        .await;

    relay(result, "Failed to update service")
}

pub async fn delete_service(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(service_id): Path<String>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/provider/services/{}", service_id),
            &cookies,
            RequestOptions::delete(),
        )
        .await;

    relay(result, "Failed to delete service")
}

pub async fn get_slots(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let query = build_query(&[("date", params.get("date").map(String::as_str))]);

    let result = state
        .upstream
        .request(
            &format!("/api/v1/provider/slots{}", query),
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load slots")
}

pub async fn update_slots(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/provider/slots",
            &cookies,
            RequestOptions::put(payload),
        )
        .await;

    relay(result, "Failed to update slots")
}

pub async fn list_staff(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/provider/staff", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load staff")
}

pub async fn add_staff(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["email"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/provider/staff",
            &cookies,
            RequestOptions::post(payload),
        )
        .await;

    relay(result, "Failed to add staff member")
}

pub async fn remove_staff(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(staff_id): Path<String>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/provider/staff/{}", staff_id),
            &cookies,
            RequestOptions::delete(),
        )
        .await;

    relay(result, "Failed to remove staff member")
}

/// Staff leave requests are keyed by business upstream, so this is the one
/// two-call route: fetch the business profile, then that business's leave
/// requests.
pub async fn list_staff_leave(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);

    let profile = match state
        .upstream
        .request(
            "/api/v1/provider/business/profile",
            &cookies,
            RequestOptions::get(),
        )
        .await
    {
        Ok(res) if res.ok => res,
        Ok(res) => {
            let status = res.status;
            return error_response(
                status,
                upstream_message(&res.data, "Failed to load business profile"),
            );
        }
        Err(e) => {
            tracing::warn!("{}", e);
            return error_response(StatusCode::BAD_GATEWAY, "Failed to load business profile");
        }
    };

    let business_id = profile
        .data
        .get("id")
        .and_then(|v| v.as_str().map(str::to_string).or_else(|| v.as_i64().map(|n| n.to_string())));

    let Some(business_id) = business_id else {
        return error_response(
            StatusCode::BAD_GATEWAY,
            "Business profile is missing an id",
        );
    };

    let result = state
        .upstream
        .request(
            &format!("/api/v1/business/{}/leave-requests", business_id),
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load leave requests")
}

pub async fn get_subscription(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/provider/subscription",
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load subscription")
}

pub async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["planId"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/provider/subscription",
            &cookies,
            RequestOptions::post(payload),
        )
        .await;

    relay(result, "Failed to subscribe")
}

pub async fn list_teams(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/provider/teams", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load teams")
}

pub async fn create_team(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["name"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/provider/teams",
            &cookies,
            RequestOptions::post(payload),
        )
        .await;

    relay(result, "Failed to create team")
}

pub async fn update_team(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_id): Path<String>,
    Json(payload): Json<Value>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/provider/teams/{}", team_id),
            &cookies,
            RequestOptions::patch(payload),
        )
        .await;

    relay(result, "Failed to update team")
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
    async fn cancellation_decision_without_booking_id_is_local_400() {
        let response = decide_cancellation(
            test_state(),
            HeaderMap::new(),
            Json(json!({"decision": "approved"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn booking_status_update_without_status_is_local_400() {
        let response = update_booking_status(
            test_state(),
            HeaderMap::new(),
            Path("bk_1".to_string()),
            Json(json!({})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
