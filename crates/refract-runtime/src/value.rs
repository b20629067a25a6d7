//! Conversions between Rust values and [`Value`].

use refract_types::{Value, ValueType};

use crate::{Error, Result};

/// A type that can be read out as a [`Value`].
pub trait ToValue {
    fn value_type() -> ValueType;

    fn to_value(&self) -> Value;
}

/// A type that can be taken out of a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn value_type() -> ValueType {
        T::value_type()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl ToValue for str {
    fn value_type() -> ValueType {
        ValueType::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

macro_rules! impl_value {
    ($ty:ty, $variant:ident) => {
        impl ToValue for $ty {
            fn value_type() -> ValueType {
                ValueType::$variant
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_value!(String, String);
impl_value!(i32, I32);
impl_value!(i64, I64);
impl_value!(bool, Bool);
impl_value!(f64, F64);

/// Positional argument reader used by generated constructor and method bodies.
pub struct Args {
    member: &'static str,
    values: std::vec::IntoIter<Value>,
    position: usize,
}

impl Args {
    pub fn new(member: &'static str, values: Vec<Value>) -> Self {
        Self {
            member,
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Take the next argument as a `T`.
    pub fn next<T: FromValue + ToValue>(&mut self) -> Result<T> {
        let position = self.position;
        self.position += 1;

        let value = self.values.next().ok_or_else(|| Error::Invocation {
            member: self.member.to_string(),
            reason: format!("missing argument {}", position),
        })?;

        let found = value.value_type();
        T::from_value(value).ok_or_else(|| Error::Invocation {
            member: self.member.to_string(),
            reason: format!(
                "argument {} expects {}, got {:?}",
                position,
                T::value_type(),
                found
            ),
        })
    }
}
