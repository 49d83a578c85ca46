//! Registry of dashboard modules, bulk loads and the auto-refresh timer

use crate::api::DashboardApi;
use crate::binding::adapter::FetchOptions;
use crate::binding::cache::SourceCache;
use crate::binding::descriptor::ModuleDescriptor;
use crate::binding::error::BindingError;
use crate::binding::module::{ModuleBinding, ModuleStatus};
use crate::consts::binding_consts::DEFAULT_REFRESH_INTERVAL_MS;
use crate::events::{Event, EventSender};
use futures::future::join_all;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

type Registry = Arc<RwLock<BTreeMap<String, Arc<ModuleBinding>>>>;

/// Process-wide switches shared by every module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalConfig {
    pub auto_refresh: bool,
    #[serde(rename = "refreshInterval")]
    pub refresh_interval_ms: u64,
    pub enable_cache: bool,
    pub enable_fallback: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            enable_cache: true,
            enable_fallback: true,
        }
    }
}

impl GlobalConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            use_cache: self.enable_cache,
            use_fallback: self.enable_fallback,
        }
    }
}

/// Field-wise update of the global configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalConfigPatch {
    pub auto_refresh: Option<bool>,
    pub refresh_interval_ms: Option<u64>,
    pub enable_cache: Option<bool>,
    pub enable_fallback: Option<bool>,
}

impl GlobalConfigPatch {
    fn apply(&self, config: &mut GlobalConfig) {
        if let Some(auto_refresh) = self.auto_refresh {
            config.auto_refresh = auto_refresh;
        }
        if let Some(interval) = self.refresh_interval_ms {
            config.refresh_interval_ms = interval;
        }
        if let Some(enable_cache) = self.enable_cache {
            config.enable_cache = enable_cache;
        }
        if let Some(enable_fallback) = self.enable_fallback {
            config.enable_fallback = enable_fallback;
        }
    }

    fn touches_refresh(&self) -> bool {
        self.auto_refresh.is_some() || self.refresh_interval_ms.is_some()
    }
}

/// Owns every registered module and the single refresh timer.
pub struct DataBindingManager {
    api: Arc<dyn DashboardApi>,
    cache: SourceCache,
    modules: Registry,
    global_config: RwLock<GlobalConfig>,
    refresh_timer: Mutex<Option<CancellationToken>>,
    event_sender: Option<EventSender>,
}

impl DataBindingManager {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self::with_config(api, GlobalConfig::default())
    }

    pub fn with_config(api: Arc<dyn DashboardApi>, global_config: GlobalConfig) -> Self {
        Self {
            api,
            cache: SourceCache::new(),
            modules: Arc::new(RwLock::new(BTreeMap::new())),
            global_config: RwLock::new(global_config),
            refresh_timer: Mutex::new(None),
            event_sender: None,
        }
    }

    /// Modules registered afterwards report load outcomes on `event_sender`.
    pub fn with_events(mut self, event_sender: EventSender) -> Self {
        self.event_sender = Some(event_sender);
        self
    }

    pub fn global_config(&self) -> GlobalConfig {
        *self
            .global_config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_timer(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.refresh_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Vec<Arc<ModuleBinding>> {
        snapshot(&self.modules)
    }

    /// Registers `config` under `id`, replacing any module already there.
    pub fn register_module(&self, id: &str, config: ModuleDescriptor) -> Arc<ModuleBinding> {
        let mut binding = ModuleBinding::with_cache(
            id,
            config,
            self.api.clone(),
            self.cache.clone(),
            self.global_config().fetch_options(),
        );
        if let Some(sender) = &self.event_sender {
            binding = binding.with_events(sender.clone());
        }
        let binding = Arc::new(binding);

        let previous = self
            .modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), binding.clone());
        if previous.is_some() {
            debug!("Module '{}' re-registered", id);
        }
        binding
    }

    pub fn module(&self, id: &str) -> Option<Arc<ModuleBinding>> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn module_ids(&self) -> Vec<String> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Current data of a module, `None` when unregistered or never loaded.
    pub fn module_data(&self, id: &str) -> Option<Value> {
        self.module(id).and_then(|module| module.data())
    }

    /// Loads every module concurrently. A module whose load panics maps to `None`.
    pub async fn load_all_modules(&self) -> BTreeMap<String, Option<Value>> {
        load_all(&self.modules).await
    }

    pub async fn load_module(&self, id: &str) -> Result<Value, BindingError> {
        let module = self
            .module(id)
            .ok_or_else(|| BindingError::ModuleNotFound(id.to_string()))?;
        Ok(module.load_data().await)
    }

    /// Starts the shared refresh timer, replacing a running one.
    ///
    /// Only clears the timer when auto refresh is disabled. The first reload
    /// happens one interval after the call. Must be called inside a Tokio runtime.
    pub fn start_auto_refresh(&self) {
        let mut timer = self.lock_timer();
        if let Some(previous) = timer.take() {
            previous.cancel();
        }

        let config = self.global_config();
        if !config.auto_refresh {
            return;
        }

        let period = config.refresh_interval().max(Duration::from_millis(1));
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let modules = self.modules.clone();
        let event_sender = self.event_sender.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        debug!("Auto refresh tick");
                        if let Some(sender) = &event_sender {
                            sender.send_event(Event::refresh("Refreshing all modules".to_string())).await;
                        }
                        load_all(&modules).await;
                    }
                }
            }
            debug!("Auto refresh stopped");
        });

        info!("Auto refresh every {} ms", period.as_millis());
        *timer = Some(token);
    }

    pub fn stop_auto_refresh(&self) {
        if let Some(token) = self.lock_timer().take() {
            token.cancel();
        }
    }

    pub fn is_auto_refresh_running(&self) -> bool {
        self.lock_timer().is_some()
    }

    /// Merges `patch` and pushes the cache/fallback switches to every module.
    /// Restarts the timer when the patch names `auto_refresh` or the interval.
    pub fn update_global_config(&self, patch: GlobalConfigPatch) {
        let config = {
            let mut config = self
                .global_config
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            patch.apply(&mut config);
            *config
        };

        for module in self.snapshot() {
            module.set_fetch_options(config.fetch_options());
        }

        if patch.touches_refresh() {
            self.start_auto_refresh();
        }
    }

    pub async fn clear_all_cache(&self) {
        for module in self.snapshot() {
            module.clear_cache().await;
        }
        self.cache.clear().await;
    }

    pub fn modules_status(&self) -> BTreeMap<String, ModuleStatus> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, module)| (id.clone(), module.status()))
            .collect()
    }

    /// Stops the timer and drops every registration.
    pub fn destroy(&self) {
        self.stop_auto_refresh();
        self.modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Drop for DataBindingManager {
    fn drop(&mut self) {
        self.stop_auto_refresh();
    }
}

fn snapshot(modules: &Registry) -> Vec<Arc<ModuleBinding>> {
    modules
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .values()
        .cloned()
        .collect()
}

async fn load_all(modules: &Registry) -> BTreeMap<String, Option<Value>> {
    let modules = snapshot(modules);
    let handles = modules.iter().map(|module| {
        let module = module.clone();
        tokio::spawn(async move { module.load_data().await })
    });
    let results = join_all(handles).await;

    modules
        .iter()
        .zip(results)
        .map(|(module, result)| {
            let value = match result {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Module '{}' load aborted: {}", module.id(), e);
                    None
                }
            };
            (module.id().to_string(), value)
        })
        .collect()
}
