//! A reflected record with members at every visibility level.

use std::fmt;

use log::info;
use refract_macros::{Reflect, reflect_members};
use refract_runtime::{Class, Reflect, Registry, Result, Value, ValueType};

/// Fully qualified path of [`Human`], as resolved by the registry.
pub const HUMAN_PATH: &str = "refract_demo::reflection::Human";

/// Parameter types of [`Human::with_profile`].
pub const PROFILE_SIGNATURE: [ValueType; 3] = [ValueType::String, ValueType::I32, ValueType::String];

#[derive(Debug, Default, Clone, PartialEq, Eq, Reflect)]
pub struct Human {
    name: String,
    pub(crate) age: i32,
    pub hobby: String,
}

#[reflect_members]
impl Human {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(name: String, age: i32, hobby: String) -> Self {
        Self { name, age, hobby }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn set_age(&mut self, age: i32) {
        self.age = age;
    }

    pub fn hobby(&self) -> &str {
        &self.hobby
    }

    pub fn set_hobby(&mut self, hobby: String) {
        self.hobby = hobby;
    }

    pub fn speak(&self, message: String) {
        println!("{}", message);
    }

    fn secret(&self) -> String {
        let secret = String::from("the password is 0000");
        println!("{}", secret);
        secret
    }
}

impl fmt::Display for Human {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Human{{name='{}', age='{}', hobby='{}'}}",
            self.name, self.age, self.hobby
        )
    }
}

/// Make every reflected type in this module resolvable by name.
pub fn register(registry: &Registry) {
    registry.register::<Human>();
}

/// Identity of the `Human` descriptor reached each way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorIdentities {
    pub by_type: usize,
    pub by_instance: usize,
    pub by_name: usize,
}

impl DescriptorIdentities {
    pub fn all_equal(&self) -> bool {
        self.by_type == self.by_instance && self.by_instance == self.by_name
    }
}

/// Resolve the `Human` descriptor statically, from an instance and by name.
pub fn descriptor_identities(registry: &Registry) -> Result<DescriptorIdentities> {
    let by_type = Human::class();
    info!("by type:     {:#x}", by_type.identity());

    let human = Human::with_profile("Lee".to_string(), 20, "개발".to_string());
    let by_instance = human.get_class();
    info!("by instance: {:#x}", by_instance.identity());

    let by_name = registry.for_name(HUMAN_PATH)?;
    info!("by name:     {:#x}", by_name.identity());

    Ok(DescriptorIdentities {
        by_type: by_type.identity(),
        by_instance: by_instance.identity(),
        by_name: by_name.identity(),
    })
}

/// Build one `Human` through the no-arg constructor and one through the
/// three-argument constructor, both resolved from `class`.
pub fn instantiate(class: &Class) -> Result<(Human, Human)> {
    let default_ctor = class.get_constructor(&[])?;
    let empty: Human = default_ctor.new_instance_of(Vec::new())?;

    let profile_ctor = class.get_constructor(&PROFILE_SIGNATURE)?;
    let full: Human = profile_ctor.new_instance_of(vec![
        Value::from("Lee"),
        Value::from(20),
        Value::from("개발"),
    ])?;

    Ok((empty, full))
}

#[cfg(test)]
mod tests {
    use super::*;
    use refract_runtime::{Error, Receiver, Visibility};

    fn registry() -> Registry {
        let registry = Registry::new();
        register(&registry);
        registry
    }

    #[test]
    fn test_class_instance_identity() {
        let identities = descriptor_identities(&registry()).unwrap();
        assert!(identities.all_equal());

        let human = Human::new();
        assert_eq!(Human::class(), human.get_class());
        assert_eq!(Human::class().path(), HUMAN_PATH);
    }

    #[test]
    fn test_global_lookup() {
        register(Registry::global());
        let class = refract_runtime::for_name(HUMAN_PATH).unwrap();
        assert_eq!(class, Human::class());
    }

    #[test]
    fn test_class_not_found() {
        match registry().for_name("refract_demo::reflection::Robot") {
            Err(Error::ClassNotFound(path)) => assert!(path.ends_with("Robot")),
            other => panic!("Expected ClassNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_public_constructors() {
        let constructors = Human::class().constructors();
        assert_eq!(constructors.len(), 2);

        let mut signatures: Vec<Vec<ValueType>> =
            constructors.iter().map(|c| c.param_types()).collect();
        signatures.sort_by_key(|s| s.len());
        assert_eq!(signatures[0], Vec::<ValueType>::new());
        assert_eq!(signatures[1], PROFILE_SIGNATURE.to_vec());

        for ctor in &constructors {
            println!("{}", ctor);
        }
    }

    #[test]
    fn test_constructor_display() {
        let ctor = Human::class().get_constructor(&PROFILE_SIGNATURE).unwrap();
        assert_eq!(
            ctor.to_string(),
            "pub fn refract_demo::reflection::Human::with_profile(name: String, age: i32, hobby: String)"
        );
    }

    #[test]
    fn test_dynamic_instantiation() {
        let class = Human::new().get_class();
        let (empty, full) = instantiate(class).unwrap();

        assert_eq!(empty, Human::new());
        assert_eq!(full.name(), "Lee");
        assert_eq!(full.age(), 20);
        assert_eq!(full.hobby(), "개발");
        assert_eq!(
            full,
            Human::with_profile("Lee".to_string(), 20, "개발".to_string())
        );
        assert_eq!(full.to_string(), "Human{name='Lee', age='20', hobby='개발'}");
    }

    #[test]
    fn test_no_such_constructor() {
        let err = Human::class()
            .get_constructor(&[ValueType::String, ValueType::I32])
            .unwrap_err();
        match err {
            Error::NoSuchConstructor { class, signature } => {
                assert_eq!(class, HUMAN_PATH);
                assert_eq!(signature, "(String, i32)");
            }
            other => panic!("Expected NoSuchConstructor, got {other:?}"),
        }
    }

    #[test]
    fn test_invocation_error() {
        let ctor = Human::class().get_constructor(&PROFILE_SIGNATURE).unwrap();

        let wrong_types = ctor.new_instance(vec![
            Value::from("Lee"),
            Value::from("twenty"),
            Value::from("개발"),
        ]);
        assert!(matches!(wrong_types, Err(Error::Invocation { .. })));

        let wrong_arity = ctor.new_instance(vec![Value::from("Lee")]);
        assert!(matches!(wrong_arity, Err(Error::Invocation { .. })));
    }

    #[test]
    fn test_field_visibility() {
        let class = Human::class();

        let declared: Vec<(&str, &Visibility)> = class
            .declared_fields()
            .iter()
            .map(|f| (f.name(), f.visibility()))
            .collect();
        assert_eq!(
            declared,
            vec![
                ("name", &Visibility::Private),
                ("age", &Visibility::Crate),
                ("hobby", &Visibility::Public),
            ]
        );

        let public: Vec<&str> = class.fields().iter().map(|f| f.name()).collect();
        assert_eq!(public, vec!["hobby"]);
    }

    #[test]
    fn test_field_access_and_bypass() {
        let class = Human::class();
        let mut human = Human::with_profile("Lee".to_string(), 20, "개발".to_string());

        let hobby = class.get_field("hobby").unwrap();
        assert_eq!(hobby.get(&human).unwrap(), Value::from("개발"));
        hobby.set(&mut human, Value::from("등산")).unwrap();
        assert_eq!(human.hobby(), "등산");

        let name = class.get_declared_field("name").unwrap();
        assert!(matches!(
            name.get(&human),
            Err(Error::IllegalAccess { .. })
        ));
        assert_eq!(
            name.bypass_visibility().get(&human).unwrap(),
            Value::from("Lee")
        );

        let age = class.get_declared_field("age").unwrap();
        age.bypass_visibility()
            .set(&mut human, Value::from(21))
            .unwrap();
        assert_eq!(human.age(), 21);
    }

    #[test]
    fn test_methods() {
        let class = Human::class();
        let mut human = Human::with_profile("Lee".to_string(), 20, "개발".to_string());

        let speak = class.get_method("speak", &[ValueType::String]).unwrap();
        assert_eq!(speak.info().receiver, Receiver::Ref);
        assert_eq!(speak.return_type(), None);
        let result = speak.invoke(&mut human, vec![Value::from("hello")]).unwrap();
        assert_eq!(result, Value::Unit);

        let set_age = class.get_method("set_age", &[ValueType::I32]).unwrap();
        assert_eq!(set_age.info().receiver, Receiver::RefMut);
        set_age.invoke(&mut human, vec![Value::from(30)]).unwrap();

        let age = class.get_method("age", &[]).unwrap();
        assert_eq!(age.invoke(&mut human, vec![]).unwrap(), Value::I32(30));

        let name = class.get_method("name", &[]).unwrap();
        assert_eq!(name.return_type(), Some(ValueType::String));
        assert_eq!(name.invoke(&mut human, vec![]).unwrap(), Value::from("Lee"));
    }

    #[test]
    fn test_hidden_method() {
        let class = Human::class();
        let mut human = Human::new();

        assert!(matches!(
            class.get_method("secret", &[]),
            Err(Error::NoSuchMethod { .. })
        ));
        assert!(class.methods().iter().all(|m| m.name() != "secret"));

        let secret = class.get_declared_method("secret", &[]).unwrap();
        assert_eq!(secret.visibility(), &Visibility::Private);
        assert!(matches!(
            secret.invoke(&mut human, vec![]),
            Err(Error::IllegalAccess { .. })
        ));

        let revealed = secret
            .bypass_visibility()
            .invoke(&mut human, vec![])
            .unwrap();
        assert_eq!(revealed, Value::from("the password is 0000"));
    }

    #[test]
    fn test_method_target_mismatch() {
        let speak = Human::class()
            .get_method("speak", &[ValueType::String])
            .unwrap();
        let mut not_a_human = 42_i32;
        assert!(matches!(
            speak.invoke(&mut not_a_human, vec![Value::from("hi")]),
            Err(Error::TargetMismatch { .. })
        ));
    }

    #[test]
    fn test_class_info_snapshot() {
        let info = Human::class().info();
        assert_eq!(info.name, "Human");
        assert_eq!(info.fields.len(), 3);
        assert_eq!(info.constructors.len(), 2);
        // getters, setters, speak and secret
        assert_eq!(info.methods.len(), 8);

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"with_profile\""));
    }
}
