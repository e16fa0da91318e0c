//! Admin surface: platform-wide listings plus a handful of mutations.
//! Every handler is a single proxied call; the upstream owns authorization.

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

pub async fn list_businesses(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let query = build_query(&[
        ("status", params.get("status").map(String::as_str)),
        ("search", params.get("search").map(String::as_str)),
        ("page", params.get("page").map(String::as_str)),
    ]);

    let result = state
        .upstream
        .request(
            &format!("/api/v1/admin/businesses{}", query),
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load businesses")
}

pub async fn get_business(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(business_id): Path<String>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/admin/businesses/{}", business_id),
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load business")
}

pub async fn list_categories(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/admin/categories", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load categories")
}

pub async fn create_category(
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
            "/api/v1/admin/categories",
            &cookies,
            RequestOptions::post(payload),
        )
        .await;

    relay(result, "Failed to create category")
}

pub async fn update_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(category_id): Path<String>,
    Json(payload): Json<Value>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/admin/categories/{}", category_id),
            &cookies,
            RequestOptions::patch(payload),
        )
        .await;

    relay(result, "Failed to update category")
}

pub async fn delete_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(category_id): Path<String>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/admin/categories/{}", category_id),
            &cookies,
            RequestOptions::delete(),
        )
        .await;

    relay(result, "Failed to delete category")
}

pub async fn get_content(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/admin/content", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load site content")
}

pub async fn update_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/admin/content",
            &cookies,
            RequestOptions::put(payload),
        )
        .await;

    relay(result, "Failed to update site content")
}

pub async fn dashboard_stats(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/admin/dashboard/stats",
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load dashboard stats")
}

pub async fn list_plans(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/admin/plans", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load plans")
}

pub async fn create_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["name", "price"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/admin/plans", &cookies, RequestOptions::post(payload))
        .await;

    relay(result, "Failed to create plan")
}

pub async fn update_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(plan_id): Path<String>,
    Json(payload): Json<Value>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/admin/plans/{}", plan_id),
            &cookies,
            RequestOptions::patch(payload),
        )
        .await;

    relay(result, "Failed to update plan")
}

pub async fn delete_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(plan_id): Path<String>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/admin/plans/{}", plan_id),
            &cookies,
            RequestOptions::delete(),
        )
        .await;

    relay(result, "Failed to delete plan")
}

pub async fn list_services(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let query = build_query(&[
        ("category", params.get("category").map(String::as_str)),
        ("search", params.get("search").map(String::as_str)),
    ]);

    let result = state
        .upstream
        .request(
            &format!("/api/v1/admin/services{}", query),
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load services")
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
            &format!("/api/v1/admin/services/{}", service_id),
            &cookies,
            RequestOptions::delete(),
        )
        .await;

    relay(result, "Failed to delete service")
}

pub async fn list_staff(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request("/api/v1/admin/staff", &cookies, RequestOptions::get())
        .await;

    relay(result, "Failed to load staff")
}

pub async fn list_subscriptions(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            "/api/v1/admin/subscriptions",
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load subscriptions")
}

pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let query = build_query(&[
        ("role", params.get("role").map(String::as_str)),
        ("status", params.get("status").map(String::as_str)),
        ("search", params.get("search").map(String::as_str)),
        ("page", params.get("page").map(String::as_str)),
    ]);

    let result = state
        .upstream
        .request(
            &format!("/api/v1/admin/users{}", query),
            &cookies,
            RequestOptions::get(),
        )
        .await;

    relay(result, "Failed to load users")
}

/// Restriction requires a reason; forwarded body is relayed verbatim.
pub async fn restrict_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(payload): Json<Value>,
) -> Response {
    if let Some(field) = missing_field(&payload, &["reason"]) {
        return error_response(StatusCode::BAD_REQUEST, format!("{} is required", field));
    }

    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/admin/users/{}/restrict", user_id),
            &cookies,
            RequestOptions::patch(payload),
        )
        .await;

    relay(result, "Failed to restrict user")
}

pub async fn unrestrict_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let result = state
        .upstream
        .request(
            &format!("/api/v1/admin/users/{}/unrestrict", user_id),
            &cookies,
            RequestOptions::patch(Value::Object(Default::default())),
        )
        .await;

    relay(result, "Failed to lift restriction")
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
    async fn restrict_user_without_reason_is_local_400() {
        let response = restrict_user(
            test_state(),
            HeaderMap::new(),
            Path("u_1".to_string()),
            Json(json!({})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn restrict_user_with_blank_reason_is_local_400() {
        let response = restrict_user(
            test_state(),
            HeaderMap::new(),
            Path("u_1".to_string()),
            Json(json!({"reason": "  "})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
