//! Shared descriptor types for Refract reflection.
//!
//! This crate defines the plain-data view of reflected types: visibility,
//! value types, dynamically typed values and serializable snapshots of
//! fields, constructors, methods and classes.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Visibility
// ============================================================================

/// Visibility of a reflected member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// `pub`
    Public,
    /// `pub(crate)`
    Crate,
    /// `pub(super)`, `pub(in path)`
    Restricted { path: String },
    /// No visibility qualifier
    Private,
}

impl Visibility {
    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => f.write_str("pub"),
            Visibility::Crate => f.write_str("pub(crate)"),
            Visibility::Restricted { path } if path == "super" || path == "self" => {
                write!(f, "pub({})", path)
            }
            Visibility::Restricted { path } => write!(f, "pub(in {})", path),
            Visibility::Private => Ok(()),
        }
    }
}

// ============================================================================
// Values
// ============================================================================

/// The type of a value that can cross a reflective call boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    I32,
    I64,
    Bool,
    F64,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "String",
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::Bool => "bool",
            ValueType::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// A dynamically typed argument or return value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    String(String),
    I32(i32),
    I64(i64),
    Bool(bool),
    F64(f64),
    /// Returned by methods without a return type
    Unit,
}

impl Value {
    /// The type of this value, or `None` for [`Value::Unit`].
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::String(_) => Some(ValueType::String),
            Value::I32(_) => Some(ValueType::I32),
            Value::I64(_) => Some(ValueType::I64),
            Value::Bool(_) => Some(ValueType::Bool),
            Value::F64(_) => Some(ValueType::F64),
            Value::Unit => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Unit => f.write_str("()"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

// ============================================================================
// Member Information
// ============================================================================

/// Information about a struct field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    /// Declaration order
    pub index: usize,
    pub ty: ValueType,
    pub visibility: Visibility,
}

/// A named, typed parameter of a constructor or method.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: ValueType,
}

/// Information about a constructor (an associated fn returning `Self`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConstructorInfo {
    pub name: String,
    pub params: Vec<ParamInfo>,
    pub visibility: Visibility,
}

/// How a method takes its receiver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Receiver {
    /// `&self`
    Ref,
    /// `&mut self`
    RefMut,
}

impl fmt::Display for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Receiver::Ref => f.write_str("&self"),
            Receiver::RefMut => f.write_str("&mut self"),
        }
    }
}

/// Information about a method.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    pub receiver: Receiver,
    pub params: Vec<ParamInfo>,
    /// `None` for methods returning `()`
    pub return_ty: Option<ValueType>,
    pub visibility: Visibility,
}

/// Serializable snapshot of a reflected class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    pub path: String,
    pub fields: Vec<FieldInfo>,
    pub constructors: Vec<ConstructorInfo>,
    pub methods: Vec<MethodInfo>,
}

// ============================================================================
// Signatures
// ============================================================================

/// Render a list of value types as `(String, i32, String)`.
pub fn signature_of(types: &[ValueType]) -> String {
    let parts: Vec<String> = types.iter().map(|t| t.to_string()).collect();
    format!("({})", parts.join(", "))
}

/// Render parameters as `name: String, age: i32`.
pub fn render_params(params: &[ParamInfo]) -> String {
    params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.ty))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Pattern Matching for Class Lookup
// ============================================================================

/// Check if a path matches a pattern.
/// Supports:
/// - Exact match: "foo::Bar"
/// - Glob suffix: "foo::*"
/// - Recursive glob: "foo::**"
/// - Wildcards: "foo::Bar*"
pub fn path_matches_pattern(path: &str, pattern: &str) -> bool {
    let pattern = pattern.trim();
    let path = path.trim();

    if pattern == "*" || pattern == "**" {
        return true;
    }

    if let Some(prefix) = pattern.strip_suffix("::**") {
        return path == prefix || path.starts_with(&format!("{}::", prefix));
    }

    if let Some(prefix) = pattern.strip_suffix("::*") {
        return match path.strip_prefix(&format!("{}::", prefix)) {
            Some(rest) => !rest.contains("::"),
            None => false,
        };
    }

    if pattern.contains('*') {
        let parts: Vec<&str> = pattern.split('*').collect();
        if parts.len() != 2 {
            return false; // single wildcard only
        }
        return path.len() >= parts[0].len() + parts[1].len()
            && path.starts_with(parts[0])
            && path.ends_with(parts[1]);
    }

    path == pattern
}
