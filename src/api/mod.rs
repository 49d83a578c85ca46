use crate::api::error::ApiError;
use crate::environment::ApiVersion;
use serde_json::{Map, Value};

pub(crate) mod client;
pub use client::HttpDashboardApi;
pub mod error;

#[cfg(test)]
use mockall::automock;

/// Backend calls the binding layer depends on.
///
/// Implementations return an axios-style envelope `{"data": <body>, "status": <code>}`
/// so that configured dot paths (`data`, `data.data`, ...) resolve against it.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    /// GET `endpoint` on the selected API group, `params` sent as the query string.
    async fn get(
        &self,
        version: ApiVersion,
        endpoint: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, ApiError>;

    /// POST `body` as JSON to `endpoint` on the selected API group.
    async fn post(
        &self,
        version: ApiVersion,
        endpoint: &str,
        body: &Value,
    ) -> Result<Value, ApiError>;
}
