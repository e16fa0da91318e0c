use axum::http::{header, HeaderMap};

/// The caller's session cookie jar, read once per inbound request and
/// relayed verbatim to the upstream backend. Never mutated in transit.
#[derive(Debug, Clone, Default)]
pub struct SessionCookies {
    cookies: Vec<(String, String)>,
}

impl SessionCookies {
    /// Parse every `Cookie` header on the inbound request. Malformed pairs
    /// (no `=`) are skipped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = Vec::new();

        for value in headers.get_all(header::COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            for pair in raw.split(';') {
                let pair = pair.trim();
                if pair.is_empty() {
                    continue;
                }
                if let Some((name, value)) = pair.split_once('=') {
                    cookies.push((name.trim().to_string(), value.trim().to_string()));
                }
            }
        }

        Self { cookies }
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Serialize the jar back into a single `Cookie` header value,
    /// `"name=value; name2=value2"`. None when the jar is empty.
    pub fn header_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(n, v)| format!("{}={}", n, v))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(raw: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(raw).unwrap());
        headers
    }

    #[test]
    fn parses_and_rejoins_cookie_header() {
        let headers = headers_with_cookie("access_token=abc123; role=customer");
        let jar = SessionCookies::from_headers(&headers);

        assert_eq!(jar.get("access_token"), Some("abc123"));
        assert_eq!(jar.get("role"), Some("customer"));
        assert_eq!(
            jar.header_value().as_deref(),
            Some("access_token=abc123; role=customer")
        );
    }

    #[test]
    fn skips_malformed_pairs() {
        let headers = headers_with_cookie("garbage; access_token=abc; ;");
        let jar = SessionCookies::from_headers(&headers);

        assert_eq!(jar.get("garbage"), None);
        assert_eq!(jar.header_value().as_deref(), Some("access_token=abc"));
    }

    #[test]
    fn empty_jar_yields_no_header() {
        let jar = SessionCookies::from_headers(&HeaderMap::new());
        assert!(jar.is_empty());
        assert_eq!(jar.header_value(), None);
    }

    #[test]
    fn merges_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("b=2"));

        let jar = SessionCookies::from_headers(&headers);
        assert_eq!(jar.header_value().as_deref(), Some("a=1; b=2"));
    }

    #[test]
    fn values_containing_equals_survive() {
        let headers = headers_with_cookie("token=eyJhbGciOi=.payload=");
        let jar = SessionCookies::from_headers(&headers);
        assert_eq!(jar.get("token"), Some("eyJhbGciOi=.payload="));
    }
}
