//! Demonstrations of copy semantics and runtime reflection.
//!
//! - [`copying`]: five ways of producing a second `Human` and how each one
//!   relates to the first.
//! - [`reflection`]: a reflected `Human` reached by type, by instance and by
//!   name, then instantiated and inspected through its descriptor.

pub mod copying;
pub mod reflection;

use refract_runtime::Registry;

/// Register every reflected type in this crate.
pub fn register_all(registry: &Registry) {
    reflection::register(registry);
}
