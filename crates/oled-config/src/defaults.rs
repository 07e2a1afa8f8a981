//! Default application: fills widget IDs, merges top-level `defaults` into
//! each widget, and resolves the `event_batching_enabled` / `event_batch_size`
//! ambiguity (spec.md §9 open question).

use crate::model::Config;
use std::collections::HashMap;

/// Applies defaults in place. Idempotent: running twice produces the same
/// result as running once (spec.md testable property 10).
pub fn apply_defaults(config: &mut Config) {
    assign_widget_ids(config);
    apply_event_batching_defaults(config);
    apply_widget_level_defaults(config);
}

/// Auto-assigns `"{type}_{ordinal}"` IDs to widgets missing one, where
/// `ordinal` is the zero-based index of that widget among same-typed
/// widgets in config order (spec.md §3.2, §6, testable property 11).
fn assign_widget_ids(config: &mut Config) {
    let mut next_ordinal: HashMap<String, u32> = HashMap::new();
    for widget in &mut config.widgets {
        let ordinal = next_ordinal.entry(widget.widget_type.clone()).or_insert(0);
        if widget.id.is_none() {
            widget.id = Some(format!("{}_{}", widget.widget_type, *ordinal));
        }
        *ordinal += 1;
    }
}

/// Whenever batching is enabled and the batch size is absent or `0`, fills
/// in `10`. Treated as a defaults-application step, not a validation
/// failure (spec.md §9).
fn apply_event_batching_defaults(config: &mut Config) {
    if config.event_batching_enabled == Some(true) {
        let needs_default = matches!(config.event_batch_size, None | Some(0));
        if needs_default {
            config.event_batch_size = Some(10);
        }
    }
}

fn apply_widget_level_defaults(config: &mut Config) {
    let Some(defaults) = config.defaults.clone() else {
        return;
    };
    for widget in &mut config.widgets {
        if widget.update_interval.is_none() {
            widget.update_interval = defaults.update_interval;
        }
        if let Some(default_text) = &defaults.text {
            match &mut widget.text {
                Some(existing) => merge_text_defaults(existing, default_text),
                None => widget.text = Some(default_text.clone()),
            }
        }
        if let Some(default_colors) = &defaults.colors {
            merge_color_defaults(&mut widget.colors, default_colors);
        }
    }
}

fn merge_text_defaults(existing: &mut crate::model::TextCfg, defaults: &crate::model::TextCfg) {
    if existing.format.is_none() {
        existing.format = defaults.format.clone();
    }
    if existing.font.is_none() {
        existing.font = defaults.font.clone();
    }
    if existing.size.is_none() {
        existing.size = defaults.size;
    }
    if existing.unit.is_none() {
        existing.unit = defaults.unit.clone();
    }
    if existing.show_unit.is_none() {
        existing.show_unit = defaults.show_unit;
    }
}

fn merge_color_defaults(colors: &mut crate::model::ColorsCfg, defaults: &HashMap<String, u8>) {
    macro_rules! fill {
        ($field:ident, $key:literal) => {
            if colors.$field.is_none() {
                colors.$field = defaults.get($key).copied();
            }
        };
    }
    fill!(fill, "fill");
    fill!(arc, "arc");
    fill!(needle, "needle");
    fill!(ticks, "ticks");
    fill!(face, "face");
    fill!(hour, "hour");
    fill!(minute, "minute");
    fill!(second, "second");
    fill!(rx, "rx");
    fill!(tx, "tx");
    fill!(read, "read");
    fill!(write, "write");
    fill!(on, "on");
    fill!(off, "off");
    fill!(left, "left");
    fill!(right, "right");
}

/// Default per-widget `update_interval` when neither the widget nor the
/// top-level `defaults` specify one (spec.md §3.2).
pub const DEFAULT_UPDATE_INTERVAL_SECS: f32 = 1.0;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DisplayCfg, PositionCfg, WidgetCfg};

    fn widget(widget_type: &str) -> WidgetCfg {
        WidgetCfg {
            widget_type: widget_type.to_string(),
            position: PositionCfg { x: 0, y: 0, w: 10, h: 10, z: 0 },
            ..Default::default()
        }
    }

    #[test]
    fn widget_ids_follow_type_ordinal_per_type() {
        let mut cfg = Config {
            display: DisplayCfg { width: 128, height: 40, background: 0 },
            widgets: vec![widget("clock"), widget("cpu"), widget("clock")],
            ..Default::default()
        };
        apply_defaults(&mut cfg);
        assert_eq!(cfg.widgets[0].id.as_deref(), Some("clock_0"));
        assert_eq!(cfg.widgets[1].id.as_deref(), Some("cpu_0"));
        assert_eq!(cfg.widgets[2].id.as_deref(), Some("clock_1"));
    }

    #[test]
    fn existing_ids_are_preserved() {
        let mut w = widget("clock");
        w.id = Some("custom".into());
        let mut cfg = Config { widgets: vec![w], ..Default::default() };
        apply_defaults(&mut cfg);
        assert_eq!(cfg.widgets[0].id.as_deref(), Some("custom"));
    }

    #[test]
    fn batching_enabled_with_zero_size_fills_ten() {
        let mut cfg = Config {
            event_batching_enabled: Some(true),
            event_batch_size: Some(0),
            widgets: vec![widget("clock")],
            ..Default::default()
        };
        apply_defaults(&mut cfg);
        assert_eq!(cfg.event_batch_size, Some(10));
    }

    #[test]
    fn batching_disabled_leaves_batch_size_untouched() {
        let mut cfg = Config {
            event_batching_enabled: Some(false),
            event_batch_size: None,
            widgets: vec![widget("clock")],
            ..Default::default()
        };
        apply_defaults(&mut cfg);
        assert_eq!(cfg.event_batch_size, None);
    }

    #[test]
    fn defaults_apply_is_idempotent() {
        let mut cfg = Config {
            event_batching_enabled: Some(true),
            event_batch_size: None,
            widgets: vec![widget("clock"), widget("clock")],
            ..Default::default()
        };
        apply_defaults(&mut cfg);
        let once = cfg.clone();
        apply_defaults(&mut cfg);
        assert_eq!(once, cfg);
    }
}
