//! Static properties used as the placeholder fallback source.
//!
//! Properties are shared across all runs or scoped to a named profile; the
//! active profile wins over shared values.

pub mod loader;
pub mod models;

pub use loader::{load_properties, parse_properties, PropertiesError};
pub use models::{Profile, StaticProperties};
