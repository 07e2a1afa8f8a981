//! The transport-backend half of spec.md §9's two parallel registries (the
//! widget-type half lives in [`oled_widgets::registry::WidgetRegistry`]).
//! Actually driving a display over USB/serial/network is out of scope;
//! this only tracks which backend tags a config may legally name.

use oled_config::TypeRegistry;
use std::collections::HashSet;

/// Known transport backend tags. `"null"` (discard frames, used in tests
/// and headless runs) is always registered; real transports register
/// themselves the same way widget types do.
pub struct BackendRegistry {
    known: HashSet<String>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self { known: HashSet::new() }
    }

    pub fn register(&mut self, tag: &str) {
        self.known.insert(tag.to_string());
    }

    pub fn with_builtin_backends() -> Self {
        let mut registry = Self::new();
        registry.register("null");
        registry
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_builtin_backends()
    }
}

impl TypeRegistry for BackendRegistry {
    fn is_known(&self, tag: &str) -> bool {
        self.known.contains(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_knows_null_backend() {
        let registry = BackendRegistry::with_builtin_backends();
        assert!(registry.is_known("null"));
        assert!(!registry.is_known("usb_hid"));
    }
}
