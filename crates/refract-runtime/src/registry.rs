//! Name-based class lookup.

use std::collections::BTreeMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use log::debug;

use crate::reflection::Class;
use crate::{Error, Reflect, Result};

/// Maps fully qualified paths to class descriptors.
///
/// A registry plays the part of a loading context: a class is resolvable by
/// name only once it has been registered, and every lookup returns the same
/// descriptor the type itself hands out.
#[derive(Default)]
pub struct Registry {
    classes: RwLock<BTreeMap<String, &'static Class>>,
}

/// Process-wide registry.
static GLOBAL: OnceLock<Registry> = OnceLock::new();

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by [`for_name`].
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    /// Make `T` resolvable by its path. Registering twice is a no-op.
    pub fn register<T: Reflect>(&self) -> &'static Class {
        self.register_class(T::class())
    }

    /// Make an already built descriptor resolvable by its path.
    pub fn register_class(&self, class: &'static Class) -> &'static Class {
        let mut classes = self
            .classes
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if classes.insert(class.path().to_string(), class).is_none() {
            debug!("registered class {} ({:#x})", class.path(), class.identity());
        }
        class
    }

    /// Resolve a class by its fully qualified path.
    pub fn for_name(&self, path: &str) -> Result<&'static Class> {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path.trim())
            .copied()
            .ok_or_else(|| Error::ClassNotFound(path.to_string()))
    }

    /// All registered classes whose path matches `pattern`.
    ///
    /// See [`refract_types::path_matches_pattern`] for the pattern syntax.
    pub fn find(&self, pattern: &str) -> Vec<&'static Class> {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|class| refract_types::path_matches_pattern(class.path(), pattern))
            .copied()
            .collect()
    }

    /// All registered classes, ordered by path.
    pub fn classes(&self) -> Vec<&'static Class> {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve a class by path in the global registry.
pub fn for_name(path: &str) -> Result<&'static Class> {
    Registry::global().for_name(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Members;

    struct Cat;
    struct Dog;

    impl Members for Cat {}

    impl Reflect for Cat {
        fn class() -> &'static Class {
            static CLASS: OnceLock<Class> = OnceLock::new();
            CLASS.get_or_init(|| {
                Class::builder::<Cat>("Cat", "zoo::felines")
                    .constructors(<Cat as Members>::constructors())
                    .build()
            })
        }

        fn get_class(&self) -> &'static Class {
            Self::class()
        }
    }

    impl Reflect for Dog {
        fn class() -> &'static Class {
            static CLASS: OnceLock<Class> = OnceLock::new();
            CLASS.get_or_init(|| Class::builder::<Dog>("Dog", "zoo::canines").build())
        }

        fn get_class(&self) -> &'static Class {
            Self::class()
        }
    }

    #[test]
    fn test_three_paths_share_identity() {
        let registry = Registry::new();
        registry.register::<Cat>();

        let by_type = Cat::class();
        let by_instance = Cat.get_class();
        let by_name = registry.for_name("zoo::felines::Cat").unwrap();

        assert_eq!(by_type.identity(), by_instance.identity());
        assert_eq!(by_type.identity(), by_name.identity());
        assert_eq!(by_type, by_name);
        assert_ne!(Cat::class(), Dog::class());
    }

    #[test]
    fn test_unknown_class() {
        let registry = Registry::new();
        registry.register::<Cat>();

        match registry.for_name("zoo::felines::Lion") {
            Err(Error::ClassNotFound(path)) => assert_eq!(path, "zoo::felines::Lion"),
            other => panic!("Expected ClassNotFound, got {other:?}"),
        }

        // Short names are not resolved
        assert!(registry.for_name("Cat").is_err());
    }

    #[test]
    fn test_unregistered_class_is_not_found() {
        let registry = Registry::new();
        let _ = Dog::class();
        assert!(registry.for_name("zoo::canines::Dog").is_err());
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        registry.register::<Cat>();
        registry.register::<Cat>();
        registry.register::<Dog>();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_find_by_pattern() {
        let registry = Registry::new();
        registry.register::<Cat>();
        registry.register::<Dog>();

        let all = registry.find("zoo::**");
        assert_eq!(all.len(), 2);

        let felines = registry.find("zoo::felines::*");
        assert_eq!(felines.len(), 1);
        assert_eq!(felines[0].name(), "Cat");

        assert!(registry.find("zoo::*").is_empty());
        assert_eq!(registry.classes()[0].path(), "zoo::canines::Dog");
    }

    #[test]
    fn test_global_registry() {
        Registry::global().register::<Dog>();
        let dog = for_name("zoo::canines::Dog").unwrap();
        assert_eq!(dog, Dog::class());
    }
}
