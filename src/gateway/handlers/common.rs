// Shared response shaping for the proxy handlers
// Every resource handler funnels through relay()/relay_with_cookies()

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};
use url::form_urlencoded;

use crate::gateway::upstream::NormalizedResponse;

/// Local-failure body: `{"error": "..."}` with a fixed status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Pull the upstream's own error text out of its body when present
/// (`message` or `msg`), otherwise use the handler's fallback string.
pub fn upstream_message(data: &Value, fallback: &str) -> String {
    for key in ["message", "msg"] {
        if let Some(text) = data.get(key).and_then(Value::as_str) {
            if !text.trim().is_empty() {
                return text.to_string();
            }
        }
    }
    fallback.to_string()
}

/// Build `?a=1&b=2` from the non-empty parameter values only; empty string
/// when nothing survives the filter.
pub fn build_query(params: &[(&str, Option<&str>)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;

    for (name, value) in params {
        if let Some(value) = value {
            if !value.trim().is_empty() {
                serializer.append_pair(name, value);
                any = true;
            }
        }
    }

    if any {
        format!("?{}", serializer.finish())
    } else {
        String::new()
    }
}

/// Map a client result to the outward response: 2xx passes status and body
/// through unchanged; non-2xx keeps the upstream status and wraps its
/// message; a network-level failure becomes a 502.
pub fn relay(result: Result<NormalizedResponse, String>, fallback: &str) -> Response {
    match result {
        Ok(res) if res.ok => (res.status, Json(res.data)).into_response(),
        Ok(res) => error_response(res.status, upstream_message(&res.data, fallback)),
        Err(e) => {
            tracing::warn!("{}", e);
            error_response(StatusCode::BAD_GATEWAY, fallback)
        }
    }
}

/// Same as relay(), but copies every upstream `Set-Cookie` header onto the
/// outward response. Auth endpoints only.
pub fn relay_with_cookies(result: Result<NormalizedResponse, String>, fallback: &str) -> Response {
    let set_cookies: Vec<_> = match &result {
        Ok(res) => res
            .headers
            .get_all(header::SET_COOKIE)
            .iter()
            .cloned()
            .collect(),
        Err(_) => Vec::new(),
    };

    let mut response = relay(result, fallback);
    for value in set_cookies {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// Presence check on required JSON body fields; Some(field) names the first
/// missing or blank one.
pub fn missing_field<'a>(body: &Value, required: &[&'a str]) -> Option<&'a str> {
    required.iter().copied().find(|field| {
        match body.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn upstream(status: u16, data: Value) -> NormalizedResponse {
        let status = StatusCode::from_u16(status).unwrap();
        NormalizedResponse {
            status,
            ok: status.is_success(),
            data,
            headers: axum::http::HeaderMap::new(),
        }
    }

    #[test]
    fn build_query_skips_empty_values() {
        let query = build_query(&[
            ("status", Some("pending")),
            ("search", Some("  ")),
            ("page", None),
            ("category", Some("cleaning")),
        ]);
        assert_eq!(query, "?status=pending&category=cleaning");
    }

    #[test]
    fn build_query_empty_when_nothing_set() {
        assert_eq!(build_query(&[("status", None), ("q", Some(""))]), "");
    }

    #[test]
    fn build_query_encodes_values() {
        assert_eq!(
            build_query(&[("search", Some("deep clean"))]),
            "?search=deep+clean"
        );
    }

    #[test]
    fn upstream_message_prefers_message_field() {
        let data = json!({"message": "booking not found", "msg": "other"});
        assert_eq!(upstream_message(&data, "fallback"), "booking not found");
    }

    #[test]
    fn upstream_message_falls_back_to_msg_then_default() {
        assert_eq!(
            upstream_message(&json!({"msg": "expired session"}), "fallback"),
            "expired session"
        );
        assert_eq!(upstream_message(&json!({"code": 9}), "fallback"), "fallback");
        assert_eq!(
            upstream_message(&Value::String("raw text".into()), "fallback"),
            "fallback"
        );
    }

    #[test]
    fn relay_passes_2xx_status_through() {
        let response = relay(Ok(upstream(201, json!({"id": "bk_1"}))), "failed");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn relay_keeps_upstream_error_status() {
        let response = relay(
            Ok(upstream(404, json!({"message": "not found"}))),
            "failed",
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn relay_maps_network_failure_to_502() {
        let response = relay(Err("connection refused".to_string()), "failed");
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn relay_with_cookies_forwards_set_cookie() {
        let mut res = upstream(200, json!({"user": {"id": 1}}));
        res.headers.append(
            header::SET_COOKIE,
            HeaderValue::from_static("access_token=abc; HttpOnly"),
        );
        res.headers.append(
            header::SET_COOKIE,
            HeaderValue::from_static("refresh_token=def; HttpOnly"),
        );

        let response = relay_with_cookies(Ok(res), "failed");
        let cookies: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 2);
    }

    #[test]
    fn missing_field_flags_absent_null_and_blank() {
        let body = json!({"reason": "", "rating": 4, "comment": null});
        assert_eq!(missing_field(&body, &["rating"]), None);
        assert_eq!(missing_field(&body, &["reason"]), Some("reason"));
        assert_eq!(missing_field(&body, &["comment"]), Some("comment"));
        assert_eq!(missing_field(&body, &["bookingId"]), Some("bookingId"));
    }

    #[test]
    fn missing_field_accepts_non_string_values() {
        let body = json!({"rating": 5, "flags": []});
        assert_eq!(missing_field(&body, &["rating", "flags"]), None);
    }
}
