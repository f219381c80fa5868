//! Blocking HTTP execution for requests built by `todo-core`.

use thiserror::Error;
use todo_core::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, Error)]
#[error("{method} {url} failed: {source}")]
pub struct TransportError {
    pub method: HttpMethod,
    pub url: String,
    #[source]
    pub source: ureq::Error,
}

/// Performs one HTTP round-trip.
pub trait Exchange {
    fn execute(&mut self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Exchange` over a ureq agent. 4xx/5xx come back as responses, not errors,
/// so the core decides what a status means.
pub struct UreqExchange {
    agent: ureq::Agent,
}

impl UreqExchange {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl Exchange for UreqExchange {
    fn execute(&mut self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method, url, body, ..
        } = req;
        tracing::debug!(%method, %url, "sending request");

        let sent = match (method, body) {
            (HttpMethod::Get, _) => self.agent.get(&url).call(),
            (HttpMethod::Delete, _) => self.agent.delete(&url).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&url).send_empty(),
            (HttpMethod::Put, Some(body)) => self
                .agent
                .put(&url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Put, None) => self.agent.put(&url).send_empty(),
        };
        let fail = |source| TransportError {
            method,
            url: url.clone(),
            source,
        };

        let mut response = sent.map_err(fail)?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().map_err(fail)?;
        tracing::debug!(%method, %url, status, "received response");
        Ok(HttpResponse::new(status, body))
    }
}
