//! Validation against the documented invariants of spec.md §3.2/§6.
//!
//! Widget-type legality is delegated to a caller-supplied [`TypeRegistry`]
//! so this crate never needs to depend on the widget registry that lives in
//! `oled-widgets` (spec.md §9: two parallel, process-wide registries).

use crate::error::ConfigError;
use crate::model::Config;
use std::collections::HashSet;

/// The set of legal tags this config may reference. Implemented by the
/// widget registry and the transport backend registry respectively; kept as
/// a trait here purely to avoid a dependency cycle.
pub trait TypeRegistry {
    fn is_known(&self, tag: &str) -> bool;
}

/// A registry that accepts any tag; useful for tests that don't care about
/// widget-type legality.
pub struct PermissiveRegistry;

impl TypeRegistry for PermissiveRegistry {
    fn is_known(&self, _tag: &str) -> bool {
        true
    }
}

pub fn validate(config: &Config, widget_types: &dyn TypeRegistry, backends: &dyn TypeRegistry) -> Result<(), ConfigError> {
    if config.game_name == config.game_display_name && !config.game_name.is_empty() {
        return Err(ConfigError::validation("game_display_name", "must differ from game_name"));
    }
    if config.refresh_rate_ms == 0 {
        return Err(ConfigError::validation("refresh_rate_ms", "must be positive"));
    }
    if config.display.width == 0 || config.display.height == 0 {
        return Err(ConfigError::validation("display", "width and height must be positive"));
    }
    if let Some(timer) = config.deinitialize_timer_ms {
        if !(1000..=60000).contains(&timer) {
            return Err(ConfigError::validation("deinitialize_timer_ms", "must be in [1000, 60000]"));
        }
    }
    if let Some(batch) = config.event_batch_size {
        if !(1..=100).contains(&batch) {
            return Err(ConfigError::validation("event_batch_size", "must be in [1, 100]"));
        }
    }
    if !config.backend.is_empty() && !backends.is_known(&config.backend) {
        return Err(ConfigError::validation("backend", format!("unknown backend `{}`", config.backend)));
    }
    if config.widgets.is_empty() {
        return Err(ConfigError::validation("widgets", "must be non-empty"));
    }

    let mut seen_ids = HashSet::new();
    for (i, widget) in config.widgets.iter().enumerate() {
        if !widget_types.is_known(&widget.widget_type) {
            return Err(ConfigError::validation(
                format!("widgets[{i}].type"),
                format!("unknown widget type `{}`", widget.widget_type),
            ));
        }
        if widget.position.w == 0 || widget.position.h == 0 {
            return Err(ConfigError::validation(format!("widgets[{i}].position"), "width and height must be positive"));
        }
        if !(-1..=255).contains(&widget.style.border) {
            return Err(ConfigError::validation(format!("widgets[{i}].style.border"), "must be -1 or 0..=255"));
        }
        let id = widget.id.clone().unwrap_or_else(|| format!("{}_{i}", widget.widget_type));
        if !seen_ids.insert(id.clone()) {
            return Err(ConfigError::validation("widgets[].id", format!("duplicate widget id `{id}`")));
        }
    }

    Ok(())
}
