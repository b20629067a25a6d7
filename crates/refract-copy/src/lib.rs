//! Copy semantics for Refract.
//!
//! Two building blocks:
//!
//! - [`Shared`], a handle that can be aliased. Two handles produced by
//!   [`Shared::alias`] point at the same instance and report the same
//!   [`Identity`]; a mutation through one is visible through the other.
//! - [`Duplicate`], an opt-in shallow duplication capability. The provided
//!   `duplicate` fails with [`CopyError::Unsupported`]; types opt in with
//!   `#[derive(Duplicate)]`, which copies every field verbatim.
//!
//! ```ignore
//! use refract_copy::{Duplicate, Shared};
//!
//! #[derive(Duplicate)]
//! struct Human { name: String, age: i32 }
//!
//! let h1 = Shared::new(Human { name: "lee".into(), age: 20 });
//! let h2 = h1.alias();
//! assert_eq!(h1.identity(), h2.identity());
//!
//! let h3 = h1.try_map(|h| h.duplicate())?;
//! assert_ne!(h1.identity(), h3.identity());
//! ```

mod duplicate;
mod shared;

pub use duplicate::{Duplicate, duplicate_shared};
pub use shared::{Identity, Shared};

/// Errors that can occur while copying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CopyError {
    #[error("Duplication is not supported by '{type_name}'")]
    Unsupported { type_name: &'static str },
}

impl CopyError {
    /// The error for a type that did not opt into duplication.
    pub fn unsupported<T: ?Sized>() -> Self {
        CopyError::Unsupported {
            type_name: std::any::type_name::<T>(),
        }
    }
}

/// Result type for copy operations.
pub type Result<T> = std::result::Result<T, CopyError>;
