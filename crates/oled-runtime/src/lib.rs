//! The process-lifetime supervisor around one [`oled_compositor::Compositor`]
//! (spec.md §4.11, §5): profile resolution, start/stop/reload, and the
//! transport-backend registry half of spec.md §9's two parallel registries.

pub mod backend;
mod error;
pub mod profile;
pub mod supervisor;

pub use backend::BackendRegistry;
pub use error::RuntimeError;
pub use profile::ProfileManager;
pub use supervisor::{SinkFactory, Supervisor};
