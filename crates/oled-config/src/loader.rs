//! Load / save hooks the runtime supervisor drives (spec.md §1, §4.11):
//! `parse -> default_apply -> validate` on load, plain serialize on save.

use crate::defaults::apply_defaults;
use crate::error::ConfigError;
use crate::model::{Config, DisplayCfg, PositionCfg, TextCfg, WidgetCfg};
use crate::validate::{TypeRegistry, validate};
use std::path::Path;
use tracing::{info, warn};

/// Loads, defaults, and validates a config from `path`. Missing config
/// files are the caller's responsibility to detect and replace with
/// [`default_single_clock`] (spec.md §7 user-visible behaviour).
pub fn load_from(path: &Path, widget_types: &dyn TypeRegistry, backends: &dyn TypeRegistry) -> Result<Config, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    let mut config: Config =
        serde_json::from_str(&raw).map_err(|e| ConfigError::Parse { path: path.to_path_buf(), reason: e.to_string() })?;
    config.source_path = Some(path.to_path_buf());
    apply_defaults(&mut config);
    validate(&config, widget_types, backends).map_err(|e| match e {
        ConfigError::Validation { field, reason, .. } => ConfigError::Validation { path: Some(path.to_path_buf()), field, reason },
        other => other,
    })?;
    info!(target: "config.load", path = %path.display(), widgets = config.widgets.len(), "config loaded");
    Ok(config)
}

/// Serializes `config` to `path`, pretty-printed.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let raw = serde_json::to_string_pretty(config).map_err(|e| ConfigError::Parse { path: path.to_path_buf(), reason: e.to_string() })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    }
    std::fs::write(path, raw).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })
}

/// A default single-clock configuration on a 128x40 display, generated when
/// no config file exists at the expected path (spec.md §7, scenario S1).
pub fn default_single_clock(width: u32, height: u32) -> Config {
    let mut config = Config {
        config_name: Some("Default".to_string()),
        game_name: "oled-widgets".to_string(),
        game_display_name: "OLED Widgets".to_string(),
        refresh_rate_ms: 100,
        display: DisplayCfg { width, height, background: 0 },
        widgets: vec![WidgetCfg {
            widget_type: "clock".to_string(),
            position: PositionCfg { x: 0, y: 0, w: width, h: height, z: 0 },
            text: Some(TextCfg { format: Some("%H:%M:%S".to_string()), ..Default::default() }),
            ..Default::default()
        }],
        ..Default::default()
    };
    apply_defaults(&mut config);
    config
}

/// Writes the default config to `path` if nothing exists there yet,
/// returning it either way.
pub fn load_or_create_default(
    path: &Path,
    width: u32,
    height: u32,
    widget_types: &dyn TypeRegistry,
    backends: &dyn TypeRegistry,
) -> Result<Config, ConfigError> {
    if !path.exists() {
        warn!(target: "config.load", path = %path.display(), "config missing, generating default single-clock config");
        let config = default_single_clock(width, height);
        save_to(&config, path)?;
    }
    load_from(path, widget_types, backends)
}
