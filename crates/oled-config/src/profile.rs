//! Profile bookkeeping (spec.md §3.4): the main profile lives at a fixed
//! filename in the base directory; others live under `profiles/`. A small
//! persistent state file records the last active profile path.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MAIN_PROFILE_FILENAME: &str = "config.json";
pub const PROFILES_SUBDIR: &str = "profiles";
const STATE_FILENAME: &str = "state.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub path: PathBuf,
    pub display_name: String,
    pub is_main: bool,
}

impl Profile {
    pub fn main(base_dir: &Path) -> Self {
        Self { path: base_dir.join(MAIN_PROFILE_FILENAME), display_name: "Main".to_string(), is_main: true }
    }

    pub fn named(base_dir: &Path, display_name: impl Into<String>, file_stem: &str) -> Self {
        let display_name = display_name.into();
        Self {
            path: base_dir.join(PROFILES_SUBDIR).join(format!("{file_stem}.json")),
            display_name,
            is_main: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct PersistentStateFile {
    active_profile_path: String,
}

/// The persisted "which profile is active" pointer (spec.md §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentState {
    pub active_profile_path: PathBuf,
}

impl PersistentState {
    pub fn load(base_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let path = base_dir.join(STATE_FILENAME);
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io { path: path.clone(), source })?;
        let parsed: PersistentStateFile =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Parse { path: path.clone(), reason: e.to_string() })?;
        Ok(Some(Self { active_profile_path: PathBuf::from(parsed.active_profile_path) }))
    }

    pub fn save(&self, base_dir: &Path) -> Result<(), ConfigError> {
        let path = base_dir.join(STATE_FILENAME);
        let file = PersistentStateFile { active_profile_path: self.active_profile_path.to_string_lossy().into_owned() };
        let raw = serde_json::to_string_pretty(&file).expect("PersistentStateFile always serializes");
        std::fs::write(&path, raw).map_err(|source| ConfigError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn main_profile_lives_at_fixed_filename() {
        let dir = tempdir().unwrap();
        let profile = Profile::main(dir.path());
        assert_eq!(profile.path, dir.path().join(MAIN_PROFILE_FILENAME));
        assert!(profile.is_main);
    }

    #[test]
    fn named_profiles_live_under_profiles_subdir() {
        let dir = tempdir().unwrap();
        let profile = Profile::named(dir.path(), "Gaming", "gaming");
        assert_eq!(profile.path, dir.path().join("profiles").join("gaming.json"));
        assert!(!profile.is_main);
    }

    #[test]
    fn persistent_state_round_trips() {
        let dir = tempdir().unwrap();
        let state = PersistentState { active_profile_path: dir.path().join("profiles/gaming.json") };
        state.save(dir.path()).unwrap();
        let loaded = PersistentState::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn missing_state_file_returns_none() {
        let dir = tempdir().unwrap();
        assert!(PersistentState::load(dir.path()).unwrap().is_none());
    }
}
