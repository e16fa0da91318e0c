// Session-forwarding upstream client
// One outbound call per inbound request; the caller's cookie jar rides along

use reqwest::{header, Client, Method, StatusCode};
use serde_json::Value;
use tokio::time::Duration;

use crate::gateway::config::GatewayConfig;
use crate::gateway::session::SessionCookies;

/// Outbound request descriptor, constructed per call and discarded after use.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: header::HeaderMap,
    pub body: Option<Value>,
    /// Forward the caller's cookie jar on the outbound `Cookie` header
    pub include_credentials: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: header::HeaderMap::new(),
            body: None,
            include_credentials: true,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn patch(body: Value) -> Self {
        Self {
            method: Method::PATCH,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn put(body: Value) -> Self {
        Self {
            method: Method::PUT,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn delete() -> Self {
        Self::method(Method::DELETE)
    }
}

/// Uniform shape every upstream response is normalized into. Non-2xx
/// statuses resolve normally; callers branch on `ok`.
#[derive(Debug, Clone)]
pub struct NormalizedResponse {
    pub status: StatusCode,
    pub ok: bool,
    /// Parsed JSON body, raw text when parsing fails, Null when empty
    pub data: Value,
    /// Raw upstream headers, used to extract `Set-Cookie` on auth routes
    pub headers: header::HeaderMap,
}

pub struct UpstreamClient {
    http_client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, String> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(Duration::from_secs(config.request_timeout))
            .no_proxy()
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            http_client,
            base_url: config.upstream_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Join the base URL with a backend-relative path (leading slash).
    fn build_url(base_url: &str, path: &str) -> String {
        format!("{}{}", base_url, path)
    }

    /// Issue one call to the upstream backend.
    ///
    /// The cookie jar is serialized onto the outbound `Cookie` header when
    /// `include_credentials` is set; explicit option headers are merged on
    /// top and may override it. Network-level failures (DNS, refused,
    /// timeout) are the only `Err` case; any HTTP status resolves `Ok`.
    pub async fn request(
        &self,
        path: &str,
        cookies: &SessionCookies,
        options: RequestOptions,
    ) -> Result<NormalizedResponse, String> {
        let url = Self::build_url(&self.base_url, path);

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        if options.include_credentials {
            if let Some(value) = cookies.header_value() {
                if let Ok(value) = header::HeaderValue::from_str(&value) {
                    headers.insert(header::COOKIE, value);
                }
            }
        }

        for (name, value) in options.headers.iter() {
            headers.insert(name, value.clone());
        }

        let mut request = self
            .http_client
            .request(options.method.clone(), &url)
            .headers(headers);

        if let Some(body) = options.body.as_ref() {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("Upstream request failed for {}: {}", path, e))?;

        let status = response.status();
        let response_headers = response.headers().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read upstream body for {}: {}", path, e))?;

        tracing::debug!(
            "upstream {} {} -> {}",
            options.method,
            path,
            status.as_u16()
        );

        Ok(NormalizedResponse {
            status,
            ok: status.is_success(),
            data: normalize_body(&bytes),
            headers: response_headers,
        })
    }
}

/// JSON first, raw text on parse failure, Null when the body is empty.
fn normalize_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(_) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let url = UpstreamClient::build_url("http://backend:5000", "/api/v1/auth/login");
        assert_eq!(url, "http://backend:5000/api/v1/auth/login");
    }

    #[test]
    fn normalize_body_parses_json() {
        let value = normalize_body(br#"{"id": 7, "name": "Deep Clean"}"#);
        assert_eq!(value["id"], 7);
        assert_eq!(value["name"], "Deep Clean");
    }

    #[test]
    fn normalize_body_falls_back_to_text() {
        let value = normalize_body(b"Bad Gateway");
        assert_eq!(value, Value::String("Bad Gateway".to_string()));
    }

    #[test]
    fn normalize_body_empty_is_null() {
        assert_eq!(normalize_body(b""), Value::Null);
    }

    #[test]
    fn default_options_are_get_with_credentials() {
        let options = RequestOptions::default();
        assert_eq!(options.method, Method::GET);
        assert!(options.include_credentials);
        assert!(options.body.is_none());
    }

    #[test]
    fn post_options_carry_body() {
        let options = RequestOptions::post(serde_json::json!({"email": "a@b.c"}));
        assert_eq!(options.method, Method::POST);
        assert_eq!(options.body.unwrap()["email"], "a@b.c");
    }
}
