//! Fetching a single data source with caching and fallback

use crate::api::DashboardApi;
use crate::binding::cache::{CacheEntry, SourceCache};
use crate::binding::descriptor::{ComputedSource, DataSourceConfig, HttpMethod, RemoteSource, SourceKind};
use crate::binding::error::BindingError;
use crate::binding::transform::get_nested_value;
use crate::error_classifier::ErrorClassifier;
use chrono::{DateTime, Utc};
use log::{debug, log};
use serde_json::Value;
use std::sync::Arc;

/// Process-wide switches that change how adapters fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Serve and store results in the cache.
    pub use_cache: bool,
    /// Replace failed remote calls with the source's fallback value.
    pub use_fallback: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            use_fallback: true,
        }
    }
}

/// Result of one `fetch_data` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceData {
    pub value: Value,
    /// When the value was actually fetched (earlier than now for cache hits).
    pub completed_at: DateTime<Utc>,
    pub from_cache: bool,
    /// The value is the configured fallback, not a backend response.
    pub is_fallback: bool,
}

/// Serves exactly one source configuration.
pub struct DataSourceAdapter {
    config: DataSourceConfig,
    cache_key: String,
    cache: SourceCache,
    api: Arc<dyn DashboardApi>,
    options: FetchOptions,
    error_classifier: ErrorClassifier,
}

impl DataSourceAdapter {
    pub fn new(config: DataSourceConfig, api: Arc<dyn DashboardApi>) -> Self {
        Self::with_cache(config, api, SourceCache::new(), FetchOptions::default())
    }

    /// Builds an adapter over an existing (possibly shared) cache store.
    pub fn with_cache(
        config: DataSourceConfig,
        api: Arc<dyn DashboardApi>,
        cache: SourceCache,
        options: FetchOptions,
    ) -> Self {
        Self {
            cache_key: config.cache_key(),
            config,
            cache,
            api,
            options,
            error_classifier: ErrorClassifier::new(),
        }
    }

    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the cached value while it is fresh, otherwise fetches and caches.
    ///
    /// Remote failures resolve to the fallback value unless fallbacks are disabled.
    pub async fn fetch_data(&self) -> Result<SourceData, BindingError> {
        if self.options.use_cache {
            if let Some(entry) = self
                .cache
                .get_fresh(&self.cache_key, self.config.cache_ttl())
                .await
            {
                debug!("Data source '{}' served from cache", self.config.name);
                return Ok(SourceData {
                    value: entry.value,
                    completed_at: entry.completed_at,
                    from_cache: true,
                    is_fallback: entry.is_fallback,
                });
            }
        }

        let (value, is_fallback) = match &self.config.kind {
            SourceKind::Remote(remote) => self.fetch_remote(remote).await?,
            SourceKind::Static { data } => (data.clone(), false),
            SourceKind::Computed(computed) => (self.compute(computed).await?, false),
        };

        let entry = if is_fallback {
            CacheEntry::fallback(value)
        } else {
            CacheEntry::new(value)
        };
        let completed_at = entry.completed_at;
        if self.options.use_cache {
            self.cache
                .insert(self.cache_key.clone(), entry.clone())
                .await;
        }

        Ok(SourceData {
            value: entry.value,
            completed_at,
            from_cache: false,
            is_fallback,
        })
    }

    async fn fetch_remote(&self, remote: &RemoteSource) -> Result<(Value, bool), BindingError> {
        let response = match remote.method {
            HttpMethod::Get => {
                self.api
                    .get(remote.api_version, &remote.endpoint, &remote.params)
                    .await
            }
            HttpMethod::Post => {
                let body = Value::Object(remote.params.clone());
                self.api
                    .post(remote.api_version, &remote.endpoint, &body)
                    .await
            }
        };

        match response {
            Ok(envelope) => {
                let payload = get_nested_value(&envelope, &remote.data_path)
                    .cloned()
                    .unwrap_or(Value::Null);
                Ok((payload, false))
            }
            Err(e) => {
                let level = self.error_classifier.classify_api_error(&e);
                log!(
                    log::Level::from(level),
                    "Fetching '{}' ({} {}) failed: {}",
                    self.config.name,
                    remote.method,
                    remote.endpoint,
                    e
                );
                if self.options.use_fallback {
                    Ok((self.config.fallback.clone(), true))
                } else {
                    Err(BindingError::Source {
                        source_name: self.config.name.clone(),
                        message: e.to_string(),
                    })
                }
            }
        }
    }

    async fn compute(&self, computed: &ComputedSource) -> Result<Value, BindingError> {
        match computed.computation.as_ref().and_then(|c| c.invoke()) {
            Some(future) => future.await,
            None => Err(BindingError::MissingComputation(self.config.name.clone())),
        }
    }

    /// Drops this source's cached entry.
    pub async fn clear_cache(&self) {
        self.cache.remove(&self.cache_key).await;
    }
}
