//! One dashboard module: concurrent source loads, merge, transform and state

use crate::api::DashboardApi;
use crate::binding::adapter::{DataSourceAdapter, FetchOptions};
use crate::binding::cache::SourceCache;
use crate::binding::descriptor::{MergeStrategy, ModuleConfigPatch, ModuleDescriptor, TransformSpec};
use crate::binding::error::BindingError;
use crate::binding::transform::{aggregate_data, format_data, map_data};
use crate::error_classifier::ErrorClassifier;
use crate::events::{Event, EventSender, EventType};
use crate::logging::LogLevel;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, log};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Point-in-time view of a module's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStatus {
    pub loading: bool,
    pub error: Option<String>,
    pub has_data: bool,
    /// Completion time of the newest fetch behind the current data.
    pub last_update: Option<DateTime<Utc>>,
}

struct ModuleState {
    config: ModuleDescriptor,
    adapters: Arc<Vec<DataSourceAdapter>>,
    options: FetchOptions,
    data: Option<Value>,
    loading: bool,
    error: Option<BindingError>,
    last_update: Option<DateTime<Utc>>,
    /// Bumped by every load and config change; only the current load may apply.
    generation: u64,
}

pub struct ModuleBinding {
    id: String,
    api: Arc<dyn DashboardApi>,
    cache: SourceCache,
    state: Mutex<ModuleState>,
    event_sender: Option<EventSender>,
    error_classifier: ErrorClassifier,
}

/// Resets `loading` when a load ends in any way, including being dropped.
struct LoadingGuard<'a> {
    binding: &'a ModuleBinding,
    generation: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.binding.lock_state();
        if state.generation == self.generation {
            state.loading = false;
        }
    }
}

/// Outcome of one load, before it is applied to the module state.
enum LoadOutcome {
    Data {
        value: Value,
        completed_at: DateTime<Utc>,
        warning: Option<BindingError>,
    },
    Failed(BindingError),
}

impl ModuleBinding {
    pub fn new(id: impl Into<String>, config: ModuleDescriptor, api: Arc<dyn DashboardApi>) -> Self {
        Self::with_cache(id, config, api, SourceCache::new(), FetchOptions::default())
    }

    /// Builds a binding whose adapters use `cache` as their store.
    pub fn with_cache(
        id: impl Into<String>,
        config: ModuleDescriptor,
        api: Arc<dyn DashboardApi>,
        cache: SourceCache,
        options: FetchOptions,
    ) -> Self {
        let adapters = build_adapters(&config, &api, &cache, options);
        Self {
            id: id.into(),
            api,
            cache,
            state: Mutex::new(ModuleState {
                config,
                adapters,
                options,
                data: None,
                loading: false,
                error: None,
                last_update: None,
                generation: 0,
            }),
            event_sender: None,
            error_classifier: ErrorClassifier::new(),
        }
    }

    pub fn with_events(mut self, event_sender: EventSender) -> Self {
        self.event_sender = Some(event_sender);
        self
    }

    fn lock_state(&self) -> MutexGuard<'_, ModuleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> ModuleDescriptor {
        self.lock_state().config.clone()
    }

    pub fn data(&self) -> Option<Value> {
        self.lock_state().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_state().loading
    }

    pub fn error(&self) -> Option<BindingError> {
        self.lock_state().error.clone()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.lock_state().last_update
    }

    pub fn status(&self) -> ModuleStatus {
        let state = self.lock_state();
        ModuleStatus {
            loading: state.loading,
            error: state.error.as_ref().map(ToString::to_string),
            has_data: state.data.as_ref().is_some_and(|data| !data.is_null()),
            last_update: state.last_update,
        }
    }

    /// Loads every source concurrently and rebuilds the module data.
    ///
    /// Returns the new data, or the module fallback when the pipeline fails.
    /// A load overtaken by a newer load or a config change returns its own
    /// result without touching the module state.
    pub async fn load_data(&self) -> Value {
        let (generation, adapters, config) = {
            let mut state = self.lock_state();
            state.generation += 1;
            state.loading = true;
            state.error = None;
            (state.generation, state.adapters.clone(), state.config.clone())
        };
        let _guard = LoadingGuard {
            binding: self,
            generation,
        };

        let results = join_all(adapters.iter().map(|adapter| adapter.fetch_data())).await;

        let mut collected = Vec::with_capacity(results.len());
        let mut completed_at: Option<DateTime<Utc>> = None;
        let mut first_error = None;
        let mut warning = None;
        let mut fallback_sources = Vec::new();
        for (adapter, result) in adapters.iter().zip(results) {
            match result {
                Ok(source_data) => {
                    if source_data.is_fallback {
                        fallback_sources.push(adapter.name().to_string());
                    }
                    completed_at = completed_at.max(Some(source_data.completed_at));
                    collected.push(source_data.value);
                }
                Err(e) => {
                    let level = self.error_classifier.classify_binding_error(&e);
                    log!(
                        log::Level::from(level),
                        "Module '{}' source '{}' failed: {}",
                        self.id,
                        adapter.name(),
                        e
                    );
                    if e.is_configuration() && warning.is_none() {
                        warning = Some(e.clone());
                    }
                    first_error.get_or_insert(e);
                }
            }
        }

        let outcome = match first_error {
            // Nothing to build from
            Some(e) if collected.is_empty() => LoadOutcome::Failed(e),
            _ => match build_data(&config, collected) {
                Ok(value) => LoadOutcome::Data {
                    value,
                    completed_at: completed_at.unwrap_or_else(Utc::now),
                    warning,
                },
                Err(e) => LoadOutcome::Failed(e),
            },
        };

        let applied = {
            let mut state = self.lock_state();
            if state.generation == generation {
                match &outcome {
                    LoadOutcome::Data {
                        value,
                        completed_at,
                        warning,
                    } => {
                        state.data = Some(value.clone());
                        state.last_update = Some(*completed_at);
                        state.error = warning.clone();
                    }
                    LoadOutcome::Failed(e) => state.error = Some(e.clone()),
                }
                state.loading = false;
                true
            } else {
                false
            }
        };

        if !applied {
            debug!(
                "Module '{}' discarded a stale load (generation {})",
                self.id, generation
            );
        }

        match outcome {
            LoadOutcome::Data { value, warning, .. } => {
                if applied {
                    let (message, event_type, level) = match &warning {
                        Some(e) => (
                            format!("loaded with error: {}", e),
                            EventType::Success,
                            LogLevel::Warn,
                        ),
                        None if !fallback_sources.is_empty() => (
                            format!("fallback data for {}", fallback_sources.join(", ")),
                            EventType::Fallback,
                            LogLevel::Warn,
                        ),
                        None => ("data updated".to_string(), EventType::Success, LogLevel::Info),
                    };
                    debug!("Module '{}' {}", self.id, message);
                    self.emit(message, event_type, level).await;
                }
                value
            }
            LoadOutcome::Failed(e) => {
                let level = self.error_classifier.classify_binding_error(&e);
                log!(log::Level::from(level), "Module '{}' failed to load: {}", self.id, e);
                if applied {
                    self.emit(e.to_string(), EventType::Error, level).await;
                }
                config.fallback
            }
        }
    }

    async fn emit(&self, message: String, event_type: EventType, level: LogLevel) {
        if let Some(sender) = &self.event_sender {
            sender
                .send_event(Event::module_with_level(&self.id, message, event_type, level))
                .await;
        }
    }

    /// Merges `patch` into the descriptor and rebuilds the adapters.
    /// Loads already in flight will not apply their results.
    pub fn update_config(&self, patch: ModuleConfigPatch) {
        let mut state = self.lock_state();
        state.config.apply(patch);
        state.adapters = build_adapters(&state.config, &self.api, &self.cache, state.options);
        state.generation += 1;
        state.loading = false;
    }

    /// Rebuilds the adapters with new cache/fallback switches.
    pub fn set_fetch_options(&self, options: FetchOptions) {
        let mut state = self.lock_state();
        if state.options == options {
            return;
        }
        state.options = options;
        state.adapters = build_adapters(&state.config, &self.api, &self.cache, options);
    }

    pub async fn clear_cache(&self) {
        let adapters = self.lock_state().adapters.clone();
        for adapter in adapters.iter() {
            adapter.clear_cache().await;
        }
    }
}

fn build_adapters(
    config: &ModuleDescriptor,
    api: &Arc<dyn DashboardApi>,
    cache: &SourceCache,
    options: FetchOptions,
) -> Arc<Vec<DataSourceAdapter>> {
    Arc::new(
        config
            .data_sources
            .iter()
            .map(|source| {
                DataSourceAdapter::with_cache(source.clone(), api.clone(), cache.clone(), options)
            })
            .collect(),
    )
}

fn build_data(config: &ModuleDescriptor, collected: Vec<Value>) -> Result<Value, BindingError> {
    match &config.transform {
        Some(spec) => apply_transform(spec, Value::Array(collected)),
        None => Ok(merge_results(
            config.merge_strategy.unwrap_or_default(),
            collected,
        )),
    }
}

/// Runs mapping, aggregate, format and custom stages in that order.
pub fn apply_transform(spec: &TransformSpec, input: Value) -> Result<Value, BindingError> {
    let mut result = input;
    if let Some(mapping) = &spec.mapping {
        result = map_data(&result, Some(mapping));
    }
    if let Some(rules) = &spec.aggregate {
        result = match result {
            Value::Array(items) => aggregate_data(&items, Some(rules)),
            other => aggregate_data(std::slice::from_ref(&other), Some(rules)),
        };
    }
    if let Some(rules) = &spec.format {
        result = format_data(&result, Some(rules));
    }
    if let Some(custom) = &spec.custom {
        result = custom.call(result)?;
    }
    Ok(result)
}

pub fn merge_results(strategy: MergeStrategy, mut results: Vec<Value>) -> Value {
    if strategy == MergeStrategy::Positional {
        return Value::Array(results);
    }
    match results.len() {
        0 => return Value::Null,
        1 => return results.remove(0),
        _ => {}
    }
    match strategy {
        MergeStrategy::Assign => {
            let mut merged = Map::new();
            for result in results {
                if let Value::Object(object) = result {
                    merged.extend(object);
                }
            }
            Value::Object(merged)
        }
        MergeStrategy::Concat => Value::Array(
            results
                .into_iter()
                .flat_map(|result| match result {
                    Value::Array(items) => items,
                    other => vec![other],
                })
                .collect(),
        ),
        MergeStrategy::First | MergeStrategy::Positional => results.remove(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDashboardApi;
    use crate::api::error::ApiError;
    use crate::binding::descriptor::{
        Computation, CustomTransform, DataSourceConfig, SourceKind,
    };
    use crate::binding::transform::AggregateRule;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn remote(name: &str, endpoint: &str, fallback: Value) -> DataSourceConfig {
        DataSourceConfig::remote(name, endpoint).with_fallback(fallback)
    }

    fn descriptor(sources: Vec<DataSourceConfig>) -> ModuleDescriptor {
        ModuleDescriptor {
            name: "test".to_string(),
            data_sources: sources,
            fallback: json!({"fallback": true}),
            ..Default::default()
        }
    }

    #[tokio::test]
    /// One failing source out of three still yields data from all positions.
    async fn test_failing_source_is_isolated() {
        let mut mock = MockDashboardApi::new();
        mock.expect_get().returning(|_, endpoint, _| match endpoint {
            "/two" => Err(ApiError::Http {
                status: 500,
                message: "boom".to_string(),
            }),
            "/one" => Ok(json!({"data": {"n": 1}})),
            _ => Ok(json!({"data": {"n": 3}})),
        });

        let binding = ModuleBinding::new(
            "stats",
            descriptor(vec![
                remote("one", "/one", json!(null)),
                remote("two", "/two", json!({"n": 0})),
                remote("three", "/three", json!(null)),
            ]),
            Arc::new(mock),
        );

        let data = binding.load_data().await;
        assert_eq!(data, json!([{"n": 1}, {"n": 0}, {"n": 3}]));
        assert_eq!(binding.data(), Some(data));
        assert_eq!(binding.error(), None);
        assert!(!binding.is_loading());
    }

    #[tokio::test]
    async fn test_custom_transform_extracts_engine_counts() {
        let mut mock = MockDashboardApi::new();
        mock.expect_get().returning(|_, _, _| {
            Ok(json!({"data": {"data": [
                {"engine_name": "烟雾监测", "detection_count": 1, "camera": "c-1"}
            ]}}))
        });

        let mut source = remote("events", "/dashboard/detection-event-data", json!([]));
        if let SourceKind::Remote(remote) = &mut source.kind {
            remote.data_path = "data.data".to_string();
        }
        let mut config = descriptor(vec![source]);
        config.transform = Some(TransformSpec {
            custom: Some(CustomTransform::new("alertData", |results| {
                let events = results
                    .get(0)
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                Ok(Value::Array(
                    events
                        .iter()
                        .map(|e| {
                            json!({
                                "engine_name": e["engine_name"],
                                "detection_count": e["detection_count"],
                            })
                        })
                        .collect(),
                ))
            })),
            ..Default::default()
        });

        let binding = ModuleBinding::new("alertData", config, Arc::new(mock));
        assert_eq!(
            binding.load_data().await,
            json!([{"engine_name": "烟雾监测", "detection_count": 1}])
        );
    }

    #[tokio::test]
    /// A failing transform keeps the previous data and returns the fallback.
    async fn test_pipeline_error_keeps_previous_data() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut config = descriptor(vec![DataSourceConfig::fixed("rows", json!([1, 2]))]);
        config.transform = Some(TransformSpec {
            custom: Some(CustomTransform::new("flaky", move |input| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(input)
                } else {
                    Err(BindingError::transform("unexpected shape"))
                }
            })),
            ..Default::default()
        });
        let binding = ModuleBinding::new("m", config, Arc::new(MockDashboardApi::new()));

        let first = binding.load_data().await;
        assert_eq!(first, json!([[1, 2]]));
        let first_update = binding.last_update();

        let second = binding.load_data().await;
        assert_eq!(second, json!({"fallback": true}));
        assert_eq!(binding.data(), Some(first));
        assert_eq!(binding.last_update(), first_update);
        assert_eq!(
            binding.error(),
            Some(BindingError::Transform("unexpected shape".to_string()))
        );
        assert!(binding.status().has_data);
        assert!(!binding.is_loading());
    }

    #[tokio::test]
    /// A missing computation is reported while the other sources still load.
    async fn test_configuration_error_surfaces_in_state() {
        let mut config = descriptor(vec![
            DataSourceConfig::fixed("areas", json!(["A区"])),
            serde_json::from_value(json!({
                "name": "queue", "type": "computed", "computation": "unknown"
            }))
            .unwrap(),
        ]);
        config.merge_strategy = Some(MergeStrategy::First);
        let binding = ModuleBinding::new("m", config, Arc::new(MockDashboardApi::new()));

        assert_eq!(binding.load_data().await, json!(["A区"]));
        assert_eq!(binding.data(), Some(json!(["A区"])));
        assert_eq!(
            binding.error(),
            Some(BindingError::MissingComputation("queue".to_string()))
        );
    }

    #[tokio::test]
    /// When every source fails the module reports the error and its fallback.
    async fn test_all_sources_failing_returns_fallback() {
        let mut mock = MockDashboardApi::new();
        mock.expect_get()
            .returning(|_, _, _| Err(ApiError::Unauthorized));
        let binding = ModuleBinding::with_cache(
            "m",
            descriptor(vec![remote("one", "/one", json!([]))]),
            Arc::new(mock),
            SourceCache::new(),
            FetchOptions {
                use_cache: true,
                use_fallback: false,
            },
        );

        assert_eq!(binding.load_data().await, json!({"fallback": true}));
        assert_eq!(binding.data(), None);
        assert!(matches!(binding.error(), Some(BindingError::Source { .. })));
        assert!(!binding.status().has_data);
    }

    #[tokio::test(start_paused = true)]
    /// A slow load started first must not overwrite the result of a later one.
    async fn test_stale_load_is_discarded() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let computation = Computation::new("slow_then_fast", move || {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok(json!("old"))
                } else {
                    Ok(json!("new"))
                }
            }
        });
        let mut config = descriptor(vec![DataSourceConfig::computed("value", computation)]);
        config.merge_strategy = Some(MergeStrategy::First);
        let binding = ModuleBinding::with_cache(
            "m",
            config,
            Arc::new(MockDashboardApi::new()),
            SourceCache::new(),
            FetchOptions {
                use_cache: false,
                use_fallback: true,
            },
        );

        let (slow, fast) = tokio::join!(binding.load_data(), binding.load_data());
        assert_eq!(slow, json!("old"));
        assert_eq!(fast, json!("new"));
        assert_eq!(binding.data(), Some(json!("new")));
        assert!(!binding.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_load_resets_loading() {
        let computation = Computation::new("hang", || async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Value::Null)
        });
        let binding = ModuleBinding::new(
            "m",
            descriptor(vec![DataSourceConfig::computed("value", computation)]),
            Arc::new(MockDashboardApi::new()),
        );

        let timed_out = tokio::time::timeout(Duration::from_millis(10), binding.load_data()).await;
        assert!(timed_out.is_err());
        assert!(!binding.is_loading());
        assert_eq!(binding.data(), None);
    }

    #[tokio::test]
    async fn test_update_config_rebuilds_sources() {
        let binding = ModuleBinding::new(
            "m",
            descriptor(vec![DataSourceConfig::fixed("a", json!(1))]),
            Arc::new(MockDashboardApi::new()),
        );
        assert_eq!(binding.load_data().await, json!([1]));

        binding.update_config(ModuleConfigPatch {
            data_sources: Some(vec![
                DataSourceConfig::fixed("a", json!([1])),
                DataSourceConfig::fixed("b", json!([2, 3])),
            ]),
            merge_strategy: Some(Some(MergeStrategy::Concat)),
            ..Default::default()
        });
        assert_eq!(binding.config().name, "test");
        assert_eq!(binding.load_data().await, json!([1, 2, 3]));
    }

    #[tokio::test(start_paused = true)]
    /// A load still in flight when the config changes leaves the state alone.
    async fn test_update_config_discards_in_flight_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let computation = Computation::new("fast_then_slow", move || {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    Ok(json!("first"))
                } else {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok(json!("stale"))
                }
            }
        });
        let mut config = descriptor(vec![DataSourceConfig::computed("value", computation)]);
        config.merge_strategy = Some(MergeStrategy::First);
        let binding = ModuleBinding::with_cache(
            "m",
            config,
            Arc::new(MockDashboardApi::new()),
            SourceCache::new(),
            FetchOptions {
                use_cache: false,
                use_fallback: true,
            },
        );
        assert_eq!(binding.load_data().await, json!("first"));

        let (in_flight, _) = tokio::join!(binding.load_data(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(binding.is_loading());
            binding.update_config(ModuleConfigPatch {
                data_sources: Some(vec![DataSourceConfig::fixed("value", json!("patched"))]),
                ..Default::default()
            });
            assert!(!binding.is_loading());
        });

        assert_eq!(in_flight, json!("stale"));
        assert_eq!(binding.data(), Some(json!("first")));
        assert!(!binding.is_loading());
        assert_eq!(binding.error(), None);
        assert_eq!(binding.load_data().await, json!("patched"));
    }

    #[tokio::test]
    async fn test_aggregate_stage_after_mapping() {
        let mut aggregate = BTreeMap::new();
        aggregate.insert("total".to_string(), AggregateRule::Count);
        aggregate.insert(
            "byArea".to_string(),
            AggregateRule::Group {
                field: "area".to_string(),
            },
        );
        let mut mapping = BTreeMap::new();
        mapping.insert("area".to_string(), "0.area".to_string());

        let mut config = descriptor(vec![DataSourceConfig::fixed("p", json!({"area": "A区"}))]);
        config.transform = Some(TransformSpec {
            mapping: Some(mapping),
            aggregate: Some(aggregate),
            ..Default::default()
        });
        let binding = ModuleBinding::new("m", config, Arc::new(MockDashboardApi::new()));

        assert_eq!(
            binding.load_data().await,
            json!({"byArea": {"A区": [{"area": "A区"}]}, "total": 1})
        );
    }

    #[tokio::test]
    async fn test_clear_cache_forwards_to_adapters() {
        let mut mock = MockDashboardApi::new();
        mock.expect_get()
            .times(2)
            .returning(|_, _, _| Ok(json!({"data": [1]})));
        let binding = ModuleBinding::new(
            "m",
            descriptor(vec![remote("one", "/one", json!([]))]),
            Arc::new(mock),
        );
        binding.load_data().await;
        binding.load_data().await;
        binding.clear_cache().await;
        binding.load_data().await;
    }

    #[tokio::test]
    async fn test_load_emits_events() {
        let (tx, mut rx) = mpsc::channel(4);
        let binding = ModuleBinding::new(
            "overview",
            descriptor(vec![DataSourceConfig::fixed("a", json!(1))]),
            Arc::new(MockDashboardApi::new()),
        )
        .with_events(EventSender::new(tx));

        binding.load_data().await;
        let event = rx.recv().await.unwrap();
        assert_eq!(event.module.as_deref(), Some("overview"));
        assert_eq!(event.event_type, EventType::Success);
    }

    #[tokio::test]
    /// Source fallbacks and module failures are reported as different events.
    async fn test_fallback_and_error_events() {
        let mut mock = MockDashboardApi::new();
        mock.expect_get()
            .returning(|_, _, _| Err(ApiError::Unauthorized));
        let (tx, mut rx) = mpsc::channel(4);
        let binding = ModuleBinding::new(
            "cameras",
            descriptor(vec![remote("devices", "/devices/", json!([]))]),
            Arc::new(mock),
        )
        .with_events(EventSender::new(tx.clone()));

        binding.load_data().await;
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::Fallback);
        assert!(event.msg.contains("devices"));

        let failing = ModuleBinding::new(
            "queue",
            descriptor(vec![DataSourceConfig::computed(
                "queueData",
                Computation::named("projectQueue"),
            )]),
            Arc::new(MockDashboardApi::new()),
        )
        .with_events(EventSender::new(tx));

        assert_eq!(failing.load_data().await, json!({"fallback": true}));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.module.as_deref(), Some("queue"));
        assert_eq!(event.event_type, EventType::Error);
    }

    #[test]
    fn test_merge_strategies() {
        let objects = vec![json!({"a": 1, "b": 1}), json!({"b": 2})];
        assert_eq!(
            merge_results(MergeStrategy::Assign, objects.clone()),
            json!({"a": 1, "b": 2})
        );
        assert_eq!(
            merge_results(MergeStrategy::Positional, objects.clone()),
            json!([{"a": 1, "b": 1}, {"b": 2}])
        );
        assert_eq!(
            merge_results(MergeStrategy::First, objects),
            json!({"a": 1, "b": 1})
        );
        assert_eq!(
            merge_results(MergeStrategy::Concat, vec![json!([1]), json!(2), json!([3, 4])]),
            json!([1, 2, 3, 4])
        );
        assert_eq!(merge_results(MergeStrategy::Assign, vec![]), Value::Null);
        assert_eq!(merge_results(MergeStrategy::Positional, vec![]), json!([]));
        assert_eq!(merge_results(MergeStrategy::Concat, vec![json!(7)]), json!(7));
    }
}
