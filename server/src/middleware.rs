//! Cross-origin handling and request logging.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

const ALLOWED_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";
const ALLOWED_HEADERS: &str = "content-type";

/// Origins that may call the API from a browser.
///
/// A `*` entry allows every origin.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
}

impl CorsPolicy {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    pub fn allow_any() -> Self {
        Self::new(vec!["*".to_string()])
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == "*" || o == origin)
    }

    fn decorate(&self, headers: &mut HeaderMap, origin: &str) {
        if let Ok(v) = HeaderValue::from_str(origin) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, v);
        }
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    }
}

pub async fn cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|o| policy.allows(o));

    if *req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        if let Some(origin) = origin {
            let headers = resp.headers_mut();
            policy.decorate(headers, &origin);
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(ALLOWED_METHODS),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(ALLOWED_HEADERS),
            );
        }
        return resp;
    }

    let mut resp = next.run(req).await;
    if let Some(origin) = origin {
        policy.decorate(resp.headers_mut(), &origin);
    }
    resp
}

pub async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();
    let resp = next.run(req).await;
    tracing::info!(
        %method,
        %path,
        status = resp.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );
    resp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_list_only_allows_listed_origins() {
        let policy = CorsPolicy::new(vec!["http://localhost:3000".to_string()]);
        assert!(policy.allows("http://localhost:3000"));
        assert!(!policy.allows("http://evil.test"));
    }

    #[test]
    fn wildcard_allows_everything() {
        assert!(CorsPolicy::allow_any().allows("http://anything.test"));
    }

    #[test]
    fn empty_policy_allows_nothing() {
        assert!(!CorsPolicy::default().allows("http://localhost:3000"));
    }
}
