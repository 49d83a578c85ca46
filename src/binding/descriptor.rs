//! Declarative module and data-source descriptors
//!
//! Descriptors deserialize from the dashboard JSON file. Functions (computed
//! sources, custom transforms) cannot be written in JSON; they are referenced
//! by name and attached from a registry before registration.

use crate::binding::error::BindingError;
use crate::binding::transform::{AggregateRules, FormatRules, Mapping};
use crate::consts::binding_consts::{DEFAULT_CACHE_TTL_MS, DEFAULT_DATA_PATH};
use crate::environment::ApiVersion;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// One dashboard module: its sources, how to shape them, and what to show on failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub data_sources: Vec<DataSourceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_strategy: Option<MergeStrategy>,
    #[serde(default, rename = "fallbackData")]
    pub fallback: Value,
}

/// Field-wise update of a registered module. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ModuleConfigPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub data_sources: Option<Vec<DataSourceConfig>>,
    pub transform: Option<Option<TransformSpec>>,
    pub merge_strategy: Option<Option<MergeStrategy>>,
    pub fallback: Option<Value>,
}

impl ModuleDescriptor {
    pub fn apply(&mut self, patch: ModuleConfigPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(data_sources) = patch.data_sources {
            self.data_sources = data_sources;
        }
        if let Some(transform) = patch.transform {
            self.transform = transform;
        }
        if let Some(merge_strategy) = patch.merge_strategy {
            self.merge_strategy = merge_strategy;
        }
        if let Some(fallback) = patch.fallback {
            self.fallback = fallback;
        }
    }
}

/// How a module combines its source results when it declares no transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Results as an array, in source order.
    #[default]
    Positional,
    /// Shallow merge of object results, later sources winning.
    Assign,
    /// Array results flattened one level.
    Concat,
    /// The first result.
    First,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Mapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<AggregateRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomTransform>,
}

pub type TransformFn = dyn Fn(Value) -> Result<Value, BindingError> + Send + Sync;

/// Last transform stage. Serialized as its registry name only.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CustomTransform {
    pub name: String,
    function: Option<Arc<TransformFn>>,
}

impl CustomTransform {
    pub fn new<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(Value) -> Result<Value, BindingError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            function: Some(Arc::new(function)),
        }
    }

    /// A reference that still has to be resolved against a registry.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            function: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.function.is_some()
    }

    pub fn call(&self, input: Value) -> Result<Value, BindingError> {
        match &self.function {
            Some(function) => function(input),
            None => Err(BindingError::transform(format!(
                "custom transform '{}' is not registered",
                self.name
            ))),
        }
    }
}

impl From<String> for CustomTransform {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

impl From<CustomTransform> for String {
    fn from(transform: CustomTransform) -> Self {
        transform.name
    }
}

impl Debug for CustomTransform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomTransform")
            .field("name", &self.name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: SourceKind,
    #[serde(default, rename = "fallbackData")]
    pub fallback: Value,
    #[serde(default = "default_cache_ttl_ms", alias = "cacheTimeout")]
    pub cache_ttl_ms: u64,
}

fn default_cache_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

impl DataSourceConfig {
    pub fn remote(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::with_kind(name, SourceKind::Remote(RemoteSource::new(endpoint)))
    }

    pub fn fixed(name: impl Into<String>, data: Value) -> Self {
        Self::with_kind(name, SourceKind::Static { data })
    }

    pub fn computed(name: impl Into<String>, computation: Computation) -> Self {
        Self::with_kind(
            name,
            SourceKind::Computed(ComputedSource {
                computation: Some(computation),
            }),
        )
    }

    fn with_kind(name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            fallback: Value::Null,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
        }
    }

    pub fn with_fallback(mut self, fallback: Value) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_ms = ttl.as_millis() as u64;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Serialized form of the configuration, used as its cache key.
    ///
    /// Computed sources serialize only the function name, so the key also
    /// carries the identity of the resolved function.
    pub fn cache_key(&self) -> String {
        let key = serde_json::to_string(self)
            .unwrap_or_else(|_| format!("{}:{:?}", self.name, self.kind));
        match &self.kind {
            SourceKind::Computed(ComputedSource {
                computation: Some(computation),
            }) => match computation.identity() {
                Some(identity) => format!("{}#{:x}", key, identity),
                None => key,
            },
            _ => key,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceKind {
    #[serde(alias = "api")]
    Remote(RemoteSource),
    Static {
        #[serde(default)]
        data: Value,
    },
    Computed(ComputedSource),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSource {
    pub endpoint: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub api_version: ApiVersion,
    #[serde(default = "default_data_path")]
    pub data_path: String,
}

fn default_data_path() -> String {
    DEFAULT_DATA_PATH.to_string()
}

impl RemoteSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: Map::new(),
            method: HttpMethod::default(),
            api_version: ApiVersion::default(),
            data_path: default_data_path(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    #[strum(serialize = "GET")]
    Get,
    #[strum(serialize = "POST")]
    Post,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComputedSource {
    /// Registry name of the function; serialized in place of the function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computation: Option<Computation>,
}

pub type ComputeFuture = BoxFuture<'static, Result<Value, BindingError>>;

/// Zero-argument async function backing a computed source.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Computation {
    pub name: String,
    function: Option<Arc<dyn Fn() -> ComputeFuture + Send + Sync>>,
}

impl Computation {
    pub fn new<F, Fut>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, BindingError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            function: Some(Arc::new(move || function().boxed())),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            function: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.function.is_some()
    }

    /// Address of the resolved function. Clones of one computation share it.
    pub fn identity(&self) -> Option<usize> {
        self.function
            .as_ref()
            .map(|function| Arc::as_ptr(function) as *const () as usize)
    }

    /// Runs the function; `None` when only the name is known.
    pub fn invoke(&self) -> Option<ComputeFuture> {
        self.function.as_ref().map(|function| function())
    }
}

impl From<String> for Computation {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

impl From<Computation> for String {
    fn from(computation: Computation) -> Self {
        computation.name
    }
}

impl Debug for Computation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computation")
            .field("name", &self.name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
