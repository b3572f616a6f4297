//! Runtime settings loader for factcheck-agent.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/settings.yaml`
//! - User overrides:  `<PRJ_CONFIG_HOME>/factcheck/settings.yaml`
//!
//! Merge precedence is user over system. Credentials are not read from
//! settings files; they come from the environment or the CLI.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/settings.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "factcheck/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default)]
    pub factcheck: FactCheckSettings,
    #[serde(default)]
    pub ocr: OcrSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FactCheckSettings {
    pub api_url: Option<String>,
    pub model: Option<String>,
    pub cache_expiry_ms: Option<u64>,
    pub max_entries: Option<usize>,
    pub request_timeout_ms: Option<u64>,
    pub sweep_interval_secs: Option<u64>,
    pub search_domain_filter: Option<Vec<String>>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrSettings {
    pub url: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewaySettings {
    pub bind: Option<String>,
    pub max_concurrent: Option<usize>,
}

impl RuntimeSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            factcheck: self.factcheck.merge(overlay.factcheck),
            ocr: self.ocr.merge(overlay.ocr),
            gateway: self.gateway.merge(overlay.gateway),
        }
    }
}

impl FactCheckSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            api_url: overlay.api_url.or(self.api_url),
            model: overlay.model.or(self.model),
            cache_expiry_ms: overlay.cache_expiry_ms.or(self.cache_expiry_ms),
            max_entries: overlay.max_entries.or(self.max_entries),
            request_timeout_ms: overlay.request_timeout_ms.or(self.request_timeout_ms),
            sweep_interval_secs: overlay.sweep_interval_secs.or(self.sweep_interval_secs),
            search_domain_filter: overlay.search_domain_filter.or(self.search_domain_filter),
            temperature: overlay.temperature.or(self.temperature),
            max_tokens: overlay.max_tokens.or(self.max_tokens),
        }
    }
}

impl OcrSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            url: overlay.url.or(self.url),
            language: overlay.language.or(self.language),
        }
    }
}

impl GatewaySettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            bind: overlay.bind.or(self.bind),
            max_concurrent: overlay.max_concurrent.or(self.max_concurrent),
        }
    }
}

pub fn load_runtime_settings() -> RuntimeSettings {
    let (system_path, user_path) = runtime_settings_paths();
    load_runtime_settings_from_paths(&system_path, &user_path)
}

#[doc(hidden)]
pub fn runtime_settings_paths() -> (PathBuf, PathBuf) {
    let root = project_root();
    let system_path = root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user_path = resolve_config_home(&root).join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    (system_path, user_path)
}

#[doc(hidden)]
pub fn load_runtime_settings_from_paths(system: &Path, user: &Path) -> RuntimeSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> RuntimeSettings {
    if !path.exists() {
        return RuntimeSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                event = "factcheck.config.settings_unreadable",
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return RuntimeSettings::default();
        }
    };
    if raw.trim().is_empty() {
        return RuntimeSettings::default();
    }
    match serde_yaml::from_str::<RuntimeSettings>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                event = "factcheck.config.settings_invalid",
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
            RuntimeSettings::default()
        }
    }
}

fn project_root() -> PathBuf {
    std::env::var("PRJ_ROOT")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map_or_else(
            || std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            PathBuf::from,
        )
}

/// Set config-home override (used by CLI `--conf`).
///
/// The path can be absolute, or relative to `PRJ_ROOT`/cwd.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return;
    }
    if CONFIG_HOME_OVERRIDE.set(path.clone()).is_err()
        && let Some(current) = CONFIG_HOME_OVERRIDE.get()
        && current != &path
    {
        tracing::warn!(
            current = %current.display(),
            ignored = %path.display(),
            "config home override already set; ignoring subsequent value"
        );
    }
}

fn resolve_config_home(project_root: &Path) -> PathBuf {
    if let Some(path) = CONFIG_HOME_OVERRIDE.get() {
        return absolutize(project_root, path.clone());
    }

    let configured = std::env::var("PRJ_CONFIG_HOME")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_HOME_RELATIVE_PATH.to_string());
    absolutize(project_root, PathBuf::from(configured))
}

fn absolutize(project_root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project_root.join(path)
    }
}
