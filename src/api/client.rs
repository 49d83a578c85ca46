//! Dashboard API Client
//!
//! A `reqwest` client for the backend's two API groups, attaching the session's
//! bearer token and wrapping every JSON body in a response envelope.

use crate::api::DashboardApi;
use crate::api::error::ApiError;
use crate::consts::binding_consts::http::{AUTH_ENDPOINT, request_timeout};
use crate::environment::{ApiVersion, Environment};
use crate::session::SessionStore;
use log::{debug, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use serde_json::{Map, Value, json};

// User-Agent string with the crate version
const USER_AGENT: &str = concat!("dashboard-binding/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    client: Client,
    environment: Environment,
    session: SessionStore,
}

impl HttpDashboardApi {
    pub fn new(environment: Environment, session: SessionStore) -> Result<Self, ApiError> {
        let client = ClientBuilder::new()
            .connect_timeout(request_timeout())
            .timeout(request_timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            environment,
            session,
        })
    }

    fn build_url(&self, version: ApiVersion, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.environment.api_url(version).trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Every endpoint except the authentication one carries the bearer token.
    fn requires_token(endpoint: &str) -> bool {
        endpoint.trim_end_matches('/') != AUTH_ENDPOINT
    }

    fn authorize(&self, endpoint: &str, request: RequestBuilder) -> RequestBuilder {
        if !Self::requires_token(endpoint) {
            return request;
        }
        match self.session.token() {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, ApiError> {
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Backend rejected the session token, clearing stored session");
            if let Err(e) = self.session.clear() {
                warn!("Failed to clear session file: {}", e);
            }
            return Err(ApiError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        Ok(response)
    }

    async fn into_envelope(response: Response) -> Result<Value, ApiError> {
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok(json!({ "data": body, "status": status }))
    }
}

/// Flattens JSON query parameters into string pairs; nulls are dropped and arrays repeat the key.
fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = query_text(item) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = query_text(other) {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    pairs
}

fn query_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait::async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn get(
        &self,
        version: ApiVersion,
        endpoint: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        let url = self.build_url(version, endpoint);
        debug!("GET {}", url);
        let request = self.client.get(&url).query(&query_pairs(params));
        let response = self.authorize(endpoint, request).send().await?;

        let response = self.handle_response_status(response).await?;
        Self::into_envelope(response).await
    }

    async fn post(
        &self,
        version: ApiVersion,
        endpoint: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        let url = self.build_url(version, endpoint);
        debug!("POST {}", url);
        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        let response = self.authorize(endpoint, request).send().await?;

        let response = self.handle_response_status(response).await?;
        Self::into_envelope(response).await
    }
}
