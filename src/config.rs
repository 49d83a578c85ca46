//! Dashboard configuration file.

use crate::binding::{BindingError, DataBindingManager, GlobalConfig, ModuleDescriptor};
use crate::consts::binding_consts::{CONFIG_DIR, DASHBOARD_FILE};
use crate::presets::{FunctionRegistry, builtin_modules};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::{fs, path::Path};

/// Global switches plus the module descriptors, keyed by module identifier.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleDescriptor>,
}

/// `$HOME/.dashboard-binding/dashboard.json`
pub fn default_dashboard_path() -> Result<PathBuf, std::io::Error> {
    let home = home::home_dir().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "Home directory not found")
    })?;
    Ok(home.join(CONFIG_DIR).join(DASHBOARD_FILE))
}

impl DashboardConfig {
    /// The stock dashboard: default global switches and the built-in modules.
    pub fn builtin() -> Self {
        DashboardConfig {
            global: GlobalConfig::default(),
            modules: builtin_modules().into_iter().collect(),
        }
    }

    /// Loads configuration from a JSON file at the given path.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if reading from file fails or JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let buf = fs::read(path)?;
        let config: DashboardConfig = serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Saves the configuration to a JSON file at the given path.
    ///
    /// Directories will be created if they don't exist. This method overwrites existing files.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if writing to file fails or serialization fails.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolves function references and registers every module on `manager`.
    ///
    /// Modules whose references cannot be resolved are skipped and returned.
    pub fn register_all(
        self,
        manager: &DataBindingManager,
        registry: &FunctionRegistry,
    ) -> Vec<(String, BindingError)> {
        let mut skipped = Vec::new();
        for (id, mut descriptor) in self.modules {
            match registry.resolve(&mut descriptor) {
                Ok(()) => {
                    manager.register_module(&id, descriptor);
                }
                Err(e) => skipped.push((id, e)),
            }
        }
        skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDashboardApi;
    use serde_json::json;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    // Loading a saved configuration file should return the same configuration.
    fn test_load_recovers_saved_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dashboard.json");

        let config = DashboardConfig::builtin();
        config.save(&path).unwrap();

        let loaded_config = DashboardConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded_config.global, config.global);
        assert_eq!(
            serde_json::to_value(&loaded_config).unwrap(),
            serde_json::to_value(&config).unwrap()
        );
    }

    #[test]
    // Saving a configuration should create directories if they don't exist.
    fn test_save_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent_dir").join("dashboard.json");

        let result = DashboardConfig::default().save(&path);

        assert!(result.is_ok(), "Failed to save config");
        assert!(
            path.parent().unwrap().exists(),
            "Parent directory does not exist"
        );
    }

    #[test]
    // Loading an invalid JSON file should return an error.
    fn test_load_rejects_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid_dashboard.json");

        let mut file = File::create(&path).unwrap();
        writeln!(file, "invalid json").unwrap();

        let result = DashboardConfig::load_from_file(&path);
        assert!(result.is_err());
    }

    #[test]
    // A hand-written file with only the fields it cares about should load.
    fn test_load_minimal_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        fs::write(
            &path,
            json!({
                "global": {"autoRefresh": false},
                "modules": {
                    "areas": {
                        "dataSources": [{"name": "areas", "type": "static", "data": ["A区"]}]
                    }
                }
            })
            .to_string(),
        )
        .unwrap();

        let config = DashboardConfig::load_from_file(&path).unwrap();
        assert!(!config.global.auto_refresh);
        assert!(config.global.enable_cache);
        assert_eq!(config.modules["areas"].data_sources.len(), 1);
    }

    #[tokio::test]
    async fn test_register_all_skips_unresolved() {
        let mut config = DashboardConfig::builtin();
        let mut broken = config.modules["alertData"].clone();
        broken.transform = serde_json::from_value(json!({"custom": "notRegistered"})).unwrap();
        config.modules.insert("broken".to_string(), broken);

        let manager = DataBindingManager::new(Arc::new(MockDashboardApi::new()));
        let skipped = config.register_all(&manager, &FunctionRegistry::builtin());

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, "broken");
        assert_eq!(manager.module_ids().len(), 9);
    }
}
