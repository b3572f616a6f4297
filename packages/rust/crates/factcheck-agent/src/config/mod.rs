//! Config namespace: fact-check config and runtime settings loading.

mod checker;
mod settings;

pub use checker::{
    DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_OCR_LANGUAGE, DEFAULT_OCR_URL, FactCheckConfig,
    OcrConfig,
};
pub use settings::{
    FactCheckSettings, GatewaySettings, OcrSettings, RuntimeSettings, load_runtime_settings,
    load_runtime_settings_from_paths, runtime_settings_paths, set_config_home_override,
};
