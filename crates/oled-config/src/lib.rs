//! The configuration model: typed, serialisable config tree, default
//! application, validation, profile + persistent-state bookkeeping, and the
//! `StringOrSlice` / `IntOrRange` JSON shape adapters (spec.md §3, §6, §9).

mod defaults;
mod error;
mod loader;
mod model;
mod profile;
mod shape;
mod validate;

pub use defaults::{DEFAULT_UPDATE_INTERVAL_SECS, apply_defaults};
pub use error::ConfigError;
pub use loader::{default_single_clock, load_from, load_or_create_default, save_to};
pub use model::*;
pub use profile::{MAIN_PROFILE_FILENAME, PROFILES_SUBDIR, PersistentState, Profile};
pub use shape::{IntOrRange, StringOrSlice};
pub use validate::{PermissiveRegistry, TypeRegistry, validate};
