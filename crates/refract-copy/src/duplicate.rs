//! Opt-in shallow duplication.

use log::trace;

use crate::{CopyError, Result, Shared};

/// Verbatim, field-for-field duplication.
///
/// Implementing this trait with an empty body opts a type *out*: the provided
/// `duplicate` fails with [`CopyError::Unsupported`]. `#[derive(Duplicate)]`
/// opts in by cloning each field without running any constructor.
///
/// The copy is shallow. A field holding an `Rc<RefCell<_>>` is cloned as a
/// second pointer to the same allocation, so both copies keep observing each
/// other's changes to it.
pub trait Duplicate: Sized {
    fn duplicate(&self) -> Result<Self> {
        Err(CopyError::unsupported::<Self>())
    }
}

/// Duplicate the instance behind `source` into a new, separately owned handle.
pub fn duplicate_shared<T: Duplicate>(source: &Shared<T>) -> Result<Shared<T>> {
    trace!(
        "duplicating {} at {}",
        std::any::type_name::<T>(),
        source.identity()
    );
    source.try_map(T::duplicate)
}
