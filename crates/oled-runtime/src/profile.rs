//! Profile discovery and the active-profile pointer (spec.md §6, §4.11):
//! which config file is live, and persisting a switch across restarts.

use crate::error::RuntimeError;
use oled_config::{Config, PersistentState, Profile, TypeRegistry};
use std::path::{Path, PathBuf};

/// Resolves, loads, and persists the active profile under a base directory
/// (spec.md's `profiles/` layout). Doesn't hold any config itself -- callers
/// feed the resolved [`Config`] to [`crate::Supervisor`].
pub struct ProfileManager {
    base_dir: PathBuf,
}

impl ProfileManager {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    /// The profile the persisted state points at, or the main profile if
    /// nothing has been persisted yet.
    pub fn active(&self) -> Result<Profile, RuntimeError> {
        match PersistentState::load(&self.base_dir)? {
            Some(state) => Ok(profile_from_path(&self.base_dir, &state.active_profile_path)),
            None => Ok(Profile::main(&self.base_dir)),
        }
    }

    /// Persists `profile` as the active one; does not itself trigger a
    /// reload -- callers pair this with [`crate::Supervisor::reload`].
    pub fn switch_to(&self, profile: &Profile) -> Result<(), RuntimeError> {
        let state = PersistentState { active_profile_path: profile.path.clone() };
        state.save(&self.base_dir)?;
        Ok(())
    }

    /// Loads (creating a default single-clock config if missing) the config
    /// for `profile`.
    pub fn load_config(
        &self,
        profile: &Profile,
        widget_types: &dyn TypeRegistry,
        backends: &dyn TypeRegistry,
        display_width: u32,
        display_height: u32,
    ) -> Result<Config, RuntimeError> {
        Ok(oled_config::load_or_create_default(&profile.path, display_width, display_height, widget_types, backends)?)
    }
}

fn profile_from_path(base_dir: &Path, path: &Path) -> Profile {
    let main_path = Profile::main(base_dir).path;
    if path == main_path {
        return Profile::main(base_dir);
    }
    let display_name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("profile").to_string();
    Profile { path: path.to_path_buf(), display_name, is_main: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oled_config::PermissiveRegistry;
    use tempfile::tempdir;

    #[test]
    fn active_defaults_to_main_when_nothing_persisted() {
        let dir = tempdir().unwrap();
        let manager = ProfileManager::new(dir.path());
        let profile = manager.active().unwrap();
        assert!(profile.is_main);
    }

    #[test]
    fn switch_to_persists_and_is_recovered_on_next_active_call() {
        let dir = tempdir().unwrap();
        let manager = ProfileManager::new(dir.path());
        let alt = Profile::named(dir.path(), "Racing", "racing");
        manager.switch_to(&alt).unwrap();

        let recovered = manager.active().unwrap();
        assert!(!recovered.is_main);
        assert_eq!(recovered.display_name, "racing");
        assert_eq!(recovered.path, alt.path);
    }

    #[test]
    fn load_config_creates_default_for_new_profile() {
        let dir = tempdir().unwrap();
        let manager = ProfileManager::new(dir.path());
        let profile = manager.active().unwrap();
        let config = manager.load_config(&profile, &PermissiveRegistry, &PermissiveRegistry, 128, 40).unwrap();
        assert_eq!(config.widgets.len(), 1);
        assert!(profile.path.exists());
    }
}
