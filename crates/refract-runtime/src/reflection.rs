//! Class descriptors and member handles.
//!
//! A [`Class`] owns the descriptors of its fields, constructors and methods.
//! Public lookups (`fields`, `constructors`, `get_method`, ...) only see `pub`
//! members; the `declared_*` variants see everything. Reading or invoking a
//! non-public member is refused unless the caller explicitly opts out with
//! `bypass_visibility()`.
//!
//! # Example
//!
//! ```ignore
//! use refract_runtime::{Reflect, ValueType};
//!
//! let class = Human::class();
//! for ctor in class.constructors() {
//!     println!("{}", ctor);
//! }
//!
//! let ctor = class.get_constructor(&[ValueType::String, ValueType::I32, ValueType::String])?;
//! let mut human = ctor.new_instance(vec!["Lee".into(), 20.into(), "개발".into()])?;
//!
//! let hobby = class.get_field("hobby")?.get(human.as_ref())?;
//! class.get_method("speak", &[ValueType::String])?
//!     .invoke(human.as_mut(), vec!["hello".into()])?;
//! ```

use std::any::{Any, TypeId};
use std::fmt;

use log::{trace, warn};
use refract_types::{
    ClassInfo, ConstructorInfo, FieldInfo, MethodInfo, ParamInfo, Value, ValueType, Visibility,
    render_params, signature_of,
};

use crate::{Error, Result, check_args};

/// Builds a boxed instance from checked arguments.
pub type ConstructorFn = fn(Vec<Value>) -> Result<Box<dyn Any>>;

/// Invokes a method on a target with checked arguments.
pub type MethodFn = fn(&mut dyn Any, Vec<Value>) -> Result<Value>;

/// Reads a field; `None` if the target has the wrong type.
pub type FieldGetter = fn(&dyn Any) -> Option<Value>;

/// Writes a field; `None` if the target or value has the wrong type.
pub type FieldSetter = fn(&mut dyn Any, Value) -> Option<()>;

// ============================================================================
// Class
// ============================================================================

/// The runtime descriptor of a reflected type.
///
/// Descriptors are compared by identity: two `&Class` are equal only if they
/// are the same descriptor.
pub struct Class {
    name: String,
    path: String,
    type_id: TypeId,
    type_name: &'static str,
    fields: Vec<Field>,
    constructors: Vec<Constructor>,
    methods: Vec<Method>,
}

impl Class {
    /// Start describing `T`, declared as `name` in `module_path`.
    pub fn builder<T: Any>(name: &str, module_path: &str) -> ClassBuilder {
        ClassBuilder {
            name: name.to_string(),
            path: format!("{}::{}", module_path, name),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// The type's name without its module path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fully qualified path, e.g. `my_crate::model::Human`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Address of this descriptor. Equal for every handle to the same class.
    pub fn identity(&self) -> usize {
        self as *const Class as usize
    }

    /// Whether `value` is an instance of this class.
    pub fn is_instance(&self, value: &dyn Any) -> bool {
        value.type_id() == self.type_id
    }

    // ---- fields ----

    /// Public fields in declaration order.
    pub fn fields(&self) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.is_public()).collect()
    }

    /// All fields, regardless of visibility.
    pub fn declared_fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a public field by name.
    pub fn get_field(&self, name: &str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|f| f.is_public() && f.name() == name)
            .ok_or_else(|| self.no_such_field(name))
    }

    /// Look up any field by name.
    pub fn get_declared_field(&self, name: &str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| self.no_such_field(name))
    }

    // ---- constructors ----

    /// Public constructors.
    pub fn constructors(&self) -> Vec<&Constructor> {
        self.constructors.iter().filter(|c| c.is_public()).collect()
    }

    /// All constructors, regardless of visibility.
    pub fn declared_constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// Resolve the public constructor with exactly these parameter types.
    pub fn get_constructor(&self, param_types: &[ValueType]) -> Result<&Constructor> {
        self.constructors
            .iter()
            .find(|c| c.is_public() && c.param_types() == param_types)
            .ok_or_else(|| self.no_such_constructor(param_types))
    }

    /// Resolve any constructor with exactly these parameter types.
    pub fn get_declared_constructor(&self, param_types: &[ValueType]) -> Result<&Constructor> {
        self.constructors
            .iter()
            .find(|c| c.param_types() == param_types)
            .ok_or_else(|| self.no_such_constructor(param_types))
    }

    // ---- methods ----

    /// Public methods.
    pub fn methods(&self) -> Vec<&Method> {
        self.methods.iter().filter(|m| m.is_public()).collect()
    }

    /// All methods, regardless of visibility.
    pub fn declared_methods(&self) -> &[Method] {
        &self.methods
    }

    /// Resolve a public method by name and parameter types.
    pub fn get_method(&self, name: &str, param_types: &[ValueType]) -> Result<&Method> {
        self.methods
            .iter()
            .find(|m| m.is_public() && m.name() == name && m.param_types() == param_types)
            .ok_or_else(|| self.no_such_method(name, param_types))
    }

    /// Resolve any method by name and parameter types.
    pub fn get_declared_method(&self, name: &str, param_types: &[ValueType]) -> Result<&Method> {
        self.methods
            .iter()
            .find(|m| m.name() == name && m.param_types() == param_types)
            .ok_or_else(|| self.no_such_method(name, param_types))
    }

    /// Serializable snapshot of every declared member.
    pub fn info(&self) -> ClassInfo {
        ClassInfo {
            name: self.name.clone(),
            path: self.path.clone(),
            fields: self.fields.iter().map(|f| f.info.clone()).collect(),
            constructors: self.constructors.iter().map(|c| c.info.clone()).collect(),
            methods: self.methods.iter().map(|m| m.info.clone()).collect(),
        }
    }

    fn no_such_field(&self, name: &str) -> Error {
        Error::NoSuchField {
            class: self.path.clone(),
            name: name.to_string(),
        }
    }

    fn no_such_constructor(&self, param_types: &[ValueType]) -> Error {
        Error::NoSuchConstructor {
            class: self.path.clone(),
            signature: signature_of(param_types),
        }
    }

    fn no_such_method(&self, name: &str, param_types: &[ValueType]) -> Error {
        Error::NoSuchMethod {
            class: self.path.clone(),
            name: name.to_string(),
            signature: signature_of(param_types),
        }
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("path", &self.path)
            .field("identity", &format_args!("{:#x}", self.identity()))
            .field("fields", &self.fields.len())
            .field("constructors", &self.constructors.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "struct {}", self.path)
    }
}

/// Collects the members of a [`Class`].
pub struct ClassBuilder {
    name: String,
    path: String,
    type_id: TypeId,
    type_name: &'static str,
    fields: Vec<Field>,
    constructors: Vec<Constructor>,
    methods: Vec<Method>,
}

impl ClassBuilder {
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn constructors(mut self, constructors: impl IntoIterator<Item = Constructor>) -> Self {
        self.constructors.extend(constructors);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods.extend(methods);
        self
    }

    pub fn build(mut self) -> Class {
        for field in &mut self.fields {
            field.owner = self.path.clone();
        }
        for ctor in &mut self.constructors {
            ctor.owner = self.path.clone();
        }
        for method in &mut self.methods {
            method.owner = self.path.clone();
        }

        Class {
            name: self.name,
            path: self.path,
            type_id: self.type_id,
            type_name: self.type_name,
            fields: self.fields,
            constructors: self.constructors,
            methods: self.methods,
        }
    }
}

// ============================================================================
// Field
// ============================================================================

/// A reflected struct field.
pub struct Field {
    info: FieldInfo,
    owner: String,
    get: FieldGetter,
    set: FieldSetter,
}

impl Field {
    pub fn new(info: FieldInfo, get: FieldGetter, set: FieldSetter) -> Self {
        Self {
            info,
            owner: String::new(),
            get,
            set,
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn ty(&self) -> ValueType {
        self.info.ty
    }

    pub fn visibility(&self) -> &Visibility {
        &self.info.visibility
    }

    pub fn is_public(&self) -> bool {
        self.info.visibility.is_public()
    }

    pub fn info(&self) -> &FieldInfo {
        &self.info
    }

    /// Read this field from `target`. Fails for non-public fields.
    pub fn get(&self, target: &dyn Any) -> Result<Value> {
        FieldAccess::checked(self).get(target)
    }

    /// Write this field on `target`. Fails for non-public fields.
    pub fn set(&self, target: &mut dyn Any, value: Value) -> Result<()> {
        FieldAccess::checked(self).set(target, value)
    }

    /// Access this field without the public-only check.
    pub fn bypass_visibility(&self) -> FieldAccess<'_> {
        warn!(
            "bypassing visibility of field {}::{}",
            self.owner, self.info.name
        );
        FieldAccess {
            field: self,
            bypass: true,
        }
    }

    fn qualified_name(&self) -> String {
        format!("{}::{}", self.owner, self.info.name)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("owner", &self.owner)
            .field("info", &self.info)
            .finish()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_visibility(f, &self.info.visibility)?;
        write!(f, "{}: {}", self.qualified_name(), self.info.ty)
    }
}

/// Read/write access to a [`Field`].
pub struct FieldAccess<'a> {
    field: &'a Field,
    bypass: bool,
}

impl<'a> FieldAccess<'a> {
    fn checked(field: &'a Field) -> Self {
        Self {
            field,
            bypass: false,
        }
    }

    pub fn get(&self, target: &dyn Any) -> Result<Value> {
        self.check_access()?;
        trace!("get {}", self.field.qualified_name());
        (self.field.get)(target).ok_or_else(|| Error::TargetMismatch {
            expected: self.field.owner.clone(),
        })
    }

    pub fn set(&self, target: &mut dyn Any, value: Value) -> Result<()> {
        self.check_access()?;
        if value.value_type() != Some(self.field.info.ty) {
            return Err(Error::Invocation {
                member: self.field.qualified_name(),
                reason: format!("field expects {}, got {}", self.field.info.ty, value),
            });
        }
        trace!("set {} = {}", self.field.qualified_name(), value);
        (self.field.set)(target, value).ok_or_else(|| Error::TargetMismatch {
            expected: self.field.owner.clone(),
        })
    }

    fn check_access(&self) -> Result<()> {
        if self.bypass || self.field.is_public() {
            Ok(())
        } else {
            Err(Error::IllegalAccess {
                member: self.field.qualified_name(),
            })
        }
    }
}

// ============================================================================
// Constructor
// ============================================================================

/// A reflected constructor: an associated fn returning `Self`.
pub struct Constructor {
    info: ConstructorInfo,
    owner: String,
    invoke: ConstructorFn,
}

impl Constructor {
    pub fn new(info: ConstructorInfo, invoke: ConstructorFn) -> Self {
        Self {
            info,
            owner: String::new(),
            invoke,
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn params(&self) -> &[ParamInfo] {
        &self.info.params
    }

    pub fn param_types(&self) -> Vec<ValueType> {
        self.info.params.iter().map(|p| p.ty).collect()
    }

    pub fn arity(&self) -> usize {
        self.info.params.len()
    }

    pub fn visibility(&self) -> &Visibility {
        &self.info.visibility
    }

    pub fn is_public(&self) -> bool {
        self.info.visibility.is_public()
    }

    pub fn info(&self) -> &ConstructorInfo {
        &self.info
    }

    /// Build a new instance from `args`.
    ///
    /// Fails with [`Error::Invocation`] if the number or types of the
    /// arguments do not match the parameters.
    pub fn new_instance(&self, args: Vec<Value>) -> Result<Box<dyn Any>> {
        let member = self.qualified_name();
        check_args(&member, &self.info.params, &args)?;
        trace!("invoke constructor {}", member);
        (self.invoke)(args)
    }

    /// Build a new instance and downcast it to `T`.
    pub fn new_instance_of<T: Any>(&self, args: Vec<Value>) -> Result<T> {
        self.new_instance(args)?
            .downcast::<T>()
            .map(|instance| *instance)
            .map_err(|_| Error::InstanceType {
                class: self.owner.clone(),
                requested: std::any::type_name::<T>(),
            })
    }

    fn qualified_name(&self) -> String {
        format!("{}::{}", self.owner, self.info.name)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("owner", &self.owner)
            .field("info", &self.info)
            .finish()
    }
}

impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_visibility(f, &self.info.visibility)?;
        write!(
            f,
            "fn {}({})",
            self.qualified_name(),
            render_params(&self.info.params)
        )
    }
}

// ============================================================================
// Method
// ============================================================================

/// A reflected method taking `&self` or `&mut self`.
pub struct Method {
    info: MethodInfo,
    owner: String,
    invoke: MethodFn,
}

impl Method {
    pub fn new(info: MethodInfo, invoke: MethodFn) -> Self {
        Self {
            info,
            owner: String::new(),
            invoke,
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn params(&self) -> &[ParamInfo] {
        &self.info.params
    }

    pub fn param_types(&self) -> Vec<ValueType> {
        self.info.params.iter().map(|p| p.ty).collect()
    }

    pub fn return_type(&self) -> Option<ValueType> {
        self.info.return_ty
    }

    pub fn visibility(&self) -> &Visibility {
        &self.info.visibility
    }

    pub fn is_public(&self) -> bool {
        self.info.visibility.is_public()
    }

    pub fn info(&self) -> &MethodInfo {
        &self.info
    }

    /// Invoke this method on `target`. Fails for non-public methods.
    pub fn invoke(&self, target: &mut dyn Any, args: Vec<Value>) -> Result<Value> {
        MethodAccess {
            method: self,
            bypass: false,
        }
        .invoke(target, args)
    }

    /// Invoke without the public-only check.
    pub fn bypass_visibility(&self) -> MethodAccess<'_> {
        warn!(
            "bypassing visibility of method {}",
            self.qualified_name()
        );
        MethodAccess {
            method: self,
            bypass: true,
        }
    }

    fn qualified_name(&self) -> String {
        format!("{}::{}", self.owner, self.info.name)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("owner", &self.owner)
            .field("info", &self.info)
            .finish()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_visibility(f, &self.info.visibility)?;
        write!(f, "fn {}({}", self.qualified_name(), self.info.receiver)?;
        if !self.info.params.is_empty() {
            write!(f, ", {}", render_params(&self.info.params))?;
        }
        f.write_str(")")?;
        if let Some(ret) = self.info.return_ty {
            write!(f, " -> {}", ret)?;
        }
        Ok(())
    }
}

/// Invocation access to a [`Method`].
pub struct MethodAccess<'a> {
    method: &'a Method,
    bypass: bool,
}

impl MethodAccess<'_> {
    pub fn invoke(&self, target: &mut dyn Any, args: Vec<Value>) -> Result<Value> {
        let member = self.method.qualified_name();
        if !self.bypass && !self.method.is_public() {
            return Err(Error::IllegalAccess { member });
        }
        check_args(&member, &self.method.info.params, &args)?;
        trace!("invoke method {}", member);
        (self.method.invoke)(target, args)
    }
}

fn write_visibility(f: &mut fmt::Formatter<'_>, visibility: &Visibility) -> fmt::Result {
    match visibility {
        Visibility::Private => Ok(()),
        vis => write!(f, "{} ", vis),
    }
}
