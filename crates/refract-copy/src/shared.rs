//! Aliasable handles and instance identity.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// The identity of an instance: the address it lives at.
///
/// Two values have the same identity only if they are the same instance.
/// Identities are only meaningful while both instances are alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(usize);

impl Identity {
    /// Identity of a value that is not behind a [`Shared`].
    pub fn of<T: ?Sized>(value: &T) -> Self {
        Identity(value as *const T as *const () as usize)
    }

    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A reference-counted, mutable instance that can be aliased.
pub struct Shared<T> {
    inner: Rc<RefCell<T>>,
}

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    /// Bind another handle to the same instance.
    pub fn alias(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity(Rc::as_ptr(&self.inner) as *const () as usize)
    }

    /// Whether `self` and `other` denote the same instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of handles bound to this instance.
    pub fn alias_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Borrow the instance.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.inner.borrow()
    }

    /// Mutably borrow the instance.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.inner.borrow_mut()
    }

    /// Mutate the instance in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut *self.inner.borrow_mut())
    }

    /// Build a new, separately owned instance from this one.
    pub fn map(&self, f: impl FnOnce(&T) -> T) -> Self {
        Shared::new(f(&*self.inner.borrow()))
    }

    /// Like [`Shared::map`], for fallible copies.
    pub fn try_map<E>(&self, f: impl FnOnce(&T) -> Result<T, E>) -> Result<Self, E> {
        f(&*self.inner.borrow()).map(Shared::new)
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("identity", &self.identity())
            .field("value", &self.inner.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_shares_instance() {
        let a = Shared::new(vec![1, 2]);
        let b = a.alias();

        assert_eq!(a.identity(), b.identity());
        assert!(a.same_instance(&b));
        assert_eq!(a.alias_count(), 2);

        b.borrow_mut().push(3);
        assert_eq!(*a.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_map_builds_new_instance() {
        let a = Shared::new(String::from("lee"));
        let b = a.map(|s| s.clone());

        assert_ne!(a.identity(), b.identity());
        assert!(!a.same_instance(&b));

        a.update(|s| s.push('!'));
        assert_eq!(*b.borrow(), "lee");
    }

    #[test]
    fn test_try_map_propagates_error() {
        let a = Shared::new(1);
        let result: Result<Shared<i32>, &str> = a.try_map(|_| Err("refused"));
        assert_eq!(result.unwrap_err(), "refused");
    }

    #[test]
    fn test_identity_of_plain_values() {
        let a = String::from("x");
        let b = a.clone();
        let a_ref = &a;

        assert_eq!(Identity::of(&a), Identity::of(a_ref));
        assert_ne!(Identity::of(&a), Identity::of(&b));
        assert!(Identity::of(&a).to_string().starts_with("0x"));
    }
}
