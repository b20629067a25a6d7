//! # Refract - copy semantics and runtime reflection for Rust
//!
//! Refract makes two things explicit that Rust normally leaves implicit: what
//! it means to copy an object, and how to reach a type's description at
//! runtime.
//!
//! ## Copy Semantics
//!
//! [`Shared`] is an aliasable handle with an observable [`Identity`]. Aliasing
//! hands out a second handle to the same instance; `map` builds a new instance
//! through any copy constructor or factory; [`Duplicate`] is an opt-in shallow
//! field-for-field copy whose default refuses:
//!
//! ```ignore
//! use refract::{Duplicate, Shared};
//!
//! #[derive(Duplicate)]
//! struct Human { name: String, age: i32 }
//!
//! let h1 = Shared::new(Human { name: "lee".into(), age: 20 });
//! let alias = h1.alias();                       // same identity
//! let copy = refract::duplicate_shared(&h1)?;   // new identity
//! assert_eq!(h1.identity(), alias.identity());
//! assert_ne!(h1.identity(), copy.identity());
//! ```
//!
//! ## Runtime Reflection
//!
//! `#[derive(Reflect)]` gives a struct one canonical [`Class`] descriptor.
//! `#[reflect_members]` adds its constructors and methods:
//!
//! ```ignore
//! use refract::{Reflect, Registry, ValueType, reflect_members};
//!
//! #[derive(Reflect)]
//! pub struct Human {
//!     name: String,
//!     pub(crate) age: i32,
//!     pub hobby: String,
//! }
//!
//! #[reflect_members]
//! impl Human {
//!     pub fn new() -> Self { /* ... */ }
//!     pub fn with_profile(name: String, age: i32, hobby: String) -> Self { /* ... */ }
//! }
//!
//! let registry = Registry::new();
//! registry.register::<Human>();
//! let class = registry.for_name("my_crate::Human")?;
//! assert_eq!(class, Human::class());
//!
//! let ctor = class.get_constructor(&[ValueType::String, ValueType::I32, ValueType::String])?;
//! let human: Human = ctor.new_instance_of(vec!["Lee".into(), 20.into(), "개발".into()])?;
//! ```
//!
//! ## Architecture
//!
//! - **[`refract_types`]**: serializable descriptor types and path matching
//! - **[`refract_runtime`]**: class descriptors, the registry and dynamic invocation
//! - **[`refract_copy`]**: `Shared`, `Identity` and the `Duplicate` trait
//! - **[`refract_macros`]**: `#[derive(Reflect)]`, `#[reflect_members]`, `#[derive(Duplicate)]`
//! - **`refract-demo`**: demonstrations and a small CLI on top of the above

// Re-export the reflection runtime
pub use refract_runtime::{
    Args, Class, ClassBuilder, Constructor, Error, Field, FieldAccess, FromValue, Members,
    Method, MethodAccess, Reflect, Registry, Result, ToValue, for_name,
};

// Re-export the copy primitives
pub use refract_copy::{CopyError, Duplicate, Identity, Shared, duplicate_shared};

// Re-export the derive and attribute macros
pub use refract_macros::{Duplicate, Reflect, reflect_members};

// Re-export the descriptor types
pub use refract_types::{
    ClassInfo, ConstructorInfo, FieldInfo, MethodInfo, ParamInfo, Receiver, Value, ValueType,
    Visibility, path_matches_pattern,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Reflect)]
    pub struct Counter {
        pub count: i64,
        #[reflect(skip)]
        #[allow(dead_code)]
        history: Vec<i64>,
    }

    impl Members for Counter {}

    #[derive(Debug, PartialEq, Duplicate)]
    struct Pair(i32, String);

    #[test]
    fn test_facade_reflects_without_members() {
        let class = Counter::class();
        assert_eq!(class.path(), "refract::tests::Counter");
        assert_eq!(class.declared_fields().len(), 1);
        assert!(class.constructors().is_empty());
        assert!(class.methods().is_empty());

        let mut counter = Counter::default();
        class
            .get_field("count")
            .unwrap()
            .set(&mut counter, Value::I64(3))
            .unwrap();
        assert_eq!(counter.count, 3);
    }

    #[test]
    fn test_facade_registry() {
        let registry = Registry::new();
        registry.register::<Counter>();
        assert_eq!(registry.for_name("refract::tests::Counter").unwrap(), Counter::class());
        assert!(matches!(
            registry.for_name("refract::tests::Missing"),
            Err(Error::ClassNotFound(_))
        ));
    }

    #[test]
    fn test_facade_duplicate_tuple_struct() {
        let pair = Pair(1, "one".to_string());
        let copy = pair.duplicate().unwrap();
        assert_eq!(pair, copy);
        assert_ne!(Identity::of(&pair), Identity::of(&copy));
    }
}
