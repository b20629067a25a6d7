//! Runtime reflection for Refract.
//!
//! Every type that derives `Reflect` owns exactly one [`Class`] descriptor,
//! built on first use and kept for the life of the process. The descriptor can
//! be reached three ways and all of them yield the same `&'static Class`:
//!
//! ```ignore
//! use refract_runtime::{Reflect, Registry};
//!
//! let by_type = Human::class();
//! let by_instance = Human::new().get_class();
//!
//! let registry = Registry::new();
//! registry.register::<Human>();
//! let by_name = registry.for_name("my_crate::Human")?;
//!
//! assert_eq!(by_type.identity(), by_instance.identity());
//! assert_eq!(by_type.identity(), by_name.identity());
//! ```
//!
//! Constructors and methods are resolved by exact parameter-type signature and
//! invoked with dynamically typed [`Value`] arguments:
//!
//! ```ignore
//! use refract_runtime::{Value, ValueType};
//!
//! let ctor = Human::class().get_constructor(&[ValueType::String, ValueType::I32, ValueType::String])?;
//! let human: Human = ctor.new_instance_of(vec!["Lee".into(), 20.into(), "개발".into()])?;
//! ```

mod registry;
pub mod reflection;
mod value;

pub use refract_types::{
    ClassInfo, ConstructorInfo, FieldInfo, MethodInfo, ParamInfo, Receiver, Value, ValueType,
    Visibility,
};
pub use reflection::{
    Class, ClassBuilder, Constructor, ConstructorFn, Field, FieldAccess, FieldGetter, FieldSetter,
    Method, MethodAccess, MethodFn,
};
pub use registry::{Registry, for_name};
pub use value::{Args, FromValue, ToValue};

/// Errors raised while resolving or invoking reflected members.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Class '{0}' not found")]
    ClassNotFound(String),

    #[error("No public constructor {signature} on '{class}'")]
    NoSuchConstructor { class: String, signature: String },

    #[error("No public method '{name}{signature}' on '{class}'")]
    NoSuchMethod {
        class: String,
        name: String,
        signature: String,
    },

    #[error("No public field '{name}' on '{class}'")]
    NoSuchField { class: String, name: String },

    #[error("Failed to invoke '{member}': {reason}")]
    Invocation { member: String, reason: String },

    #[error("'{member}' is not public; use bypass_visibility() to access it")]
    IllegalAccess { member: String },

    #[error("Target is not an instance of '{expected}'")]
    TargetMismatch { expected: String },

    #[error("Constructor of '{class}' does not build a {requested}")]
    InstanceType {
        class: String,
        requested: &'static str,
    },
}

/// Result type for reflection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A type with a canonical runtime descriptor.
///
/// Implemented by `#[derive(Reflect)]`.
pub trait Reflect: std::any::Any {
    /// The descriptor of `Self`.
    fn class() -> &'static Class
    where
        Self: Sized;

    /// The descriptor of this instance's runtime type.
    fn get_class(&self) -> &'static Class;
}

/// Constructors and methods of a reflected type.
///
/// Implemented by `#[reflect_members]` on an inherent impl block. Types with no
/// reflected members can implement it with an empty body.
pub trait Members {
    fn constructors() -> Vec<Constructor> {
        Vec::new()
    }

    fn methods() -> Vec<Method> {
        Vec::new()
    }
}

/// Check `args` against the expected parameter types of `member`.
pub(crate) fn check_args(member: &str, params: &[ParamInfo], args: &[Value]) -> Result<()> {
    if args.len() != params.len() {
        return Err(Error::Invocation {
            member: member.to_string(),
            reason: format!(
                "wrong number of arguments: expected {}, got {}",
                params.len(),
                args.len()
            ),
        });
    }

    for (index, (param, arg)) in params.iter().zip(args).enumerate() {
        if arg.value_type() != Some(param.ty) {
            return Err(Error::Invocation {
                member: member.to_string(),
                reason: format!(
                    "argument {} ('{}') expects {}, got {}",
                    index,
                    param.name,
                    param.ty,
                    describe_value_type(arg.value_type())
                ),
            });
        }
    }

    Ok(())
}

fn describe_value_type(ty: Option<ValueType>) -> String {
    match ty {
        Some(ty) => ty.to_string(),
        None => "()".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Vec<ParamInfo> {
        vec![
            ParamInfo {
                name: "name".to_string(),
                ty: ValueType::String,
            },
            ParamInfo {
                name: "age".to_string(),
                ty: ValueType::I32,
            },
        ]
    }

    #[test]
    fn test_check_args_accepts_matching_values() {
        let args = vec![Value::from("Lee"), Value::from(20)];
        assert!(check_args("Human::new", &params(), &args).is_ok());
    }

    #[test]
    fn test_check_args_rejects_wrong_arity() {
        let err = check_args("Human::new", &params(), &[Value::from("Lee")]).unwrap_err();
        match err {
            Error::Invocation { member, reason } => {
                assert_eq!(member, "Human::new");
                assert!(reason.contains("expected 2, got 1"));
            }
            other => panic!("Wrong error: {other:?}"),
        }
    }

    #[test]
    fn test_check_args_rejects_wrong_type() {
        let args = vec![Value::from("Lee"), Value::from("twenty")];
        let err = check_args("Human::new", &params(), &args).unwrap_err();
        assert!(err.to_string().contains("argument 1 ('age') expects i32, got String"));
    }

    #[test]
    fn test_error_messages() {
        let err = Error::NoSuchConstructor {
            class: "demo::Human".to_string(),
            signature: "(String, i32)".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No public constructor (String, i32) on 'demo::Human'"
        );
    }
}
