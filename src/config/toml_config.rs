use crate::core::ConfigProvider;
use crate::domain::model::AutocompleteFilter;
use crate::utils::error::{GroundPlacesError, Result};
use crate::utils::logger;
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub storage: StorageConfig,
    pub replay: Option<ReplayConfig>,
    pub search: Option<SearchConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub base_path: String,
    pub places_file: String,
    pub output_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    pub history_file: Option<String>,
    pub keep_backup: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub query: String,
    pub filters: Option<Vec<String>>,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GroundPlacesError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GroundPlacesError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PLACES_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GroundPlacesError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_path("storage.base_path", &self.storage.base_path)?;

        let mut files = vec![
            self.storage.places_file.as_str(),
            self.storage.output_file.as_str(),
        ];
        if let Some(history_file) = self.history_file() {
            files.push(history_file);
        }
        crate::utils::validation::validate_file_extensions("storage", &files, &["json"])?;

        if let Some(search) = &self.search {
            crate::utils::validation::validate_non_empty_string("search.query", &search.query)?;
        }
        self.autocomplete_filters()?;

        if let Some(level) = self.monitoring.as_ref().and_then(|m| m.log_level.as_deref()) {
            if !LOG_LEVELS.contains(&level) {
                return Err(GroundPlacesError::InvalidConfigValueError {
                    field: "monitoring.log_level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", LOG_LEVELS.join(", ")),
                });
            }
        }

        Ok(())
    }

    pub fn base_path(&self) -> &str {
        &self.storage.base_path
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search.as_ref().map(|search| search.query.as_str())
    }

    pub fn autocomplete_filters(&self) -> Result<Vec<AutocompleteFilter>> {
        let filters = self
            .search
            .as_ref()
            .and_then(|search| search.filters.as_ref());

        filters
            .into_iter()
            .flatten()
            .map(|filter| {
                filter
                    .parse()
                    .map_err(|reason| GroundPlacesError::InvalidConfigValueError {
                        field: "search.filters".to_string(),
                        value: filter.clone(),
                        reason,
                    })
            })
            .collect()
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// Default log filter: `[monitoring]` decides when enabled, `--verbose` otherwise.
    pub fn log_filter(&self, verbose: bool) -> String {
        let level = self
            .monitoring
            .as_ref()
            .filter(|m| m.enabled)
            .and_then(|m| m.log_level.as_deref());

        match level {
            Some(level) => format!("groundplaces={},info", level),
            None if self.monitoring_enabled() => logger::cli_filter(true).to_string(),
            None => logger::cli_filter(verbose).to_string(),
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn places_file(&self) -> &str {
        &self.storage.places_file
    }

    fn history_file(&self) -> Option<&str> {
        self.replay
            .as_ref()
            .and_then(|replay| replay.history_file.as_deref())
    }

    fn output_file(&self) -> &str {
        &self.storage.output_file
    }

    fn keep_backup(&self) -> bool {
        self.replay
            .as_ref()
            .and_then(|replay| replay.keep_backup)
            .unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
