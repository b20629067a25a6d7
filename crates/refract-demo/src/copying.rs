//! Copy strategies for a simple mutable record.
//!
//! Each strategy produces a second `Human` from a first one. Aliasing hands
//! out another handle to the same instance; every other strategy builds a new
//! instance whose fields start equal and then evolve independently.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use clap::ValueEnum;
use log::debug;
use refract_copy::{CopyError, Duplicate, Identity, Shared, duplicate_shared};
use refract_macros::Duplicate;

/// A person with a name and an age.
#[derive(Debug, Default, PartialEq, Eq, Duplicate)]
pub struct Human {
    name: String,
    age: i32,
}

impl Human {
    pub fn new(name: impl Into<String>, age: i32) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }

    /// A human with no name and age 0.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Copy factory: builds through `empty` and the setters.
    pub fn new_instance(source: &Human) -> Human {
        let mut instance = Human::empty();
        instance.set_name(source.name());
        instance.set_age(source.age());
        instance
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn set_age(&mut self, age: i32) {
        self.age = age;
    }
}

/// Copy constructor.
impl From<&Human> for Human {
    fn from(source: &Human) -> Self {
        Self {
            name: source.name.clone(),
            age: source.age,
        }
    }
}

/// A household whose member list is shared, not owned.
///
/// Duplicating a household copies the `Rc`, so both households keep pointing
/// at the same member list.
#[derive(Debug, Duplicate)]
pub struct Household {
    pub owner: String,
    pub members: Rc<RefCell<Vec<String>>>,
}

impl Household {
    pub fn new(owner: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            owner: owner.into(),
            members: Rc::new(RefCell::new(members)),
        }
    }
}

/// An append-only record that refuses duplication.
#[derive(Debug, Default)]
pub struct Ledger {
    pub entries: Vec<i64>,
}

impl Duplicate for Ledger {}

/// How to produce the second instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CopyStrategy {
    /// Bind a second handle to the same instance
    Alias,
    /// `Human::from(&source)`
    CopyConstruct,
    /// `Human::new_instance(&source)`
    CopyFactory,
    /// Read each getter of the source into a fresh instance
    FieldByField,
    /// `source.duplicate()`
    ShallowDuplicate,
}

impl CopyStrategy {
    pub const ALL: [CopyStrategy; 5] = [
        CopyStrategy::Alias,
        CopyStrategy::CopyConstruct,
        CopyStrategy::CopyFactory,
        CopyStrategy::FieldByField,
        CopyStrategy::ShallowDuplicate,
    ];
}

impl fmt::Display for CopyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CopyStrategy::Alias => "alias",
            CopyStrategy::CopyConstruct => "copy-construct",
            CopyStrategy::CopyFactory => "copy-factory",
            CopyStrategy::FieldByField => "field-by-field",
            CopyStrategy::ShallowDuplicate => "shallow-duplicate",
        };
        f.write_str(name)
    }
}

/// Produce a second handle from `source` using `strategy`.
pub fn copy_with(
    strategy: CopyStrategy,
    source: &Shared<Human>,
) -> Result<Shared<Human>, CopyError> {
    debug!("copying {} with {}", source.identity(), strategy);
    match strategy {
        CopyStrategy::Alias => Ok(source.alias()),
        CopyStrategy::CopyConstruct => Ok(source.map(|human| Human::from(human))),
        CopyStrategy::CopyFactory => Ok(source.map(Human::new_instance)),
        CopyStrategy::FieldByField => Ok(source.map(|human| {
            let mut copy = Human::empty();
            copy.set_name(human.name());
            copy.set_age(human.age());
            copy
        })),
        CopyStrategy::ShallowDuplicate => duplicate_shared(source),
    }
}

/// Outcome of copying `{name: "lee", age: 20}` and then aging the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReport {
    pub strategy: CopyStrategy,
    pub source_identity: Identity,
    pub copy_identity: Identity,
    /// Whether the fields were equal right after copying
    pub equal_after_copy: bool,
    /// The copy's age after the source was set to 21
    pub copy_age_after_mutation: i32,
}

impl CopyReport {
    pub fn shares_identity(&self) -> bool {
        self.source_identity == self.copy_identity
    }

    pub fn mutation_visible(&self) -> bool {
        self.copy_age_after_mutation == PROBE_MUTATED_AGE
    }
}

impl fmt::Display for CopyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<18} source={} copy={} same-identity={} equal-after-copy={} copy.age={} (mutation {})",
            self.strategy.to_string(),
            self.source_identity,
            self.copy_identity,
            self.shares_identity(),
            self.equal_after_copy,
            self.copy_age_after_mutation,
            if self.mutation_visible() {
                "visible"
            } else {
                "not visible"
            }
        )
    }
}

const PROBE_AGE: i32 = 20;
const PROBE_MUTATED_AGE: i32 = 21;

/// Copy a fresh `Human` with `strategy`, mutate the source and report.
pub fn probe(strategy: CopyStrategy) -> Result<CopyReport, CopyError> {
    let source = Shared::new(Human::new("lee", PROBE_AGE));
    let copy = copy_with(strategy, &source)?;

    let equal_after_copy = *source.borrow() == *copy.borrow();
    source.update(|human| human.set_age(PROBE_MUTATED_AGE));
    let copy_age_after_mutation = copy.borrow().age();

    Ok(CopyReport {
        strategy,
        source_identity: source.identity(),
        copy_identity: copy.identity(),
        equal_after_copy,
        copy_age_after_mutation,
    })
}

/// Duplicate a household, add a member through the original and report
/// whether the duplicate sees it.
pub fn probe_household() -> Result<bool, CopyError> {
    let original = Household::new("lee", vec!["lee".to_string()]);
    let duplicate = original.duplicate()?;

    original.members.borrow_mut().push("kim".to_string());
    let shared = duplicate.members.borrow().len() == 2;
    debug!(
        "household duplicate {} the member list",
        if shared { "shares" } else { "owns" }
    );
    Ok(shared)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_shares_identity_and_mutation() {
        let h1 = Shared::new(Human::new("lee", 20));
        let h2 = h1.alias();
        assert_eq!(h1.identity(), h2.identity());

        h1.borrow_mut().set_age(21);
        assert_eq!(h2.borrow().age(), 21);
    }

    #[test]
    fn test_copy_constructor() {
        let mut h1 = Human::new("lee", 20);
        let h2 = Human::from(&h1);
        let h3 = Human::from(&h1);

        assert_ne!(Identity::of(&h1), Identity::of(&h2));
        assert_ne!(Identity::of(&h1), Identity::of(&h3));
        assert_eq!(h1, h2);

        h1.set_age(21);
        assert_ne!(h2.age(), 21);
        assert_ne!(h3.age(), 21);
    }

    #[test]
    fn test_copy_constructor_scenario() {
        let h1 = Shared::new(Human::new("lee", 20));
        let h2 = copy_with(CopyStrategy::CopyConstruct, &h1).unwrap();
        assert_ne!(h1.identity(), h2.identity());

        h1.borrow_mut().set_age(21);
        assert_eq!(h2.borrow().age(), 20);
    }

    #[test]
    fn test_copy_factory() {
        let h1 = Human::new("lee", 20);
        let mut h2 = Human::new_instance(&h1);

        assert_ne!(Identity::of(&h1), Identity::of(&h2));
        assert_eq!(h1, h2);

        h2.set_name("kim");
        assert_eq!(h1.name(), "lee");
    }

    #[test]
    fn test_field_by_field_copy() {
        let mut h1 = Human::new("lee", 20);
        let mut h2 = Human::empty();
        h2.set_age(h1.age());
        h2.set_name(h1.name());

        assert_ne!(Identity::of(&h1), Identity::of(&h2));
        assert_eq!(h1, h2);

        h1.set_age(21);
        assert_ne!(h2.age(), 21);
    }

    #[test]
    fn test_shallow_duplicate() {
        let mut h1 = Human::new("lee", 20);
        let h2 = h1.duplicate().unwrap();

        assert_ne!(Identity::of(&h1), Identity::of(&h2));
        assert_eq!(h1, h2);

        h1.set_age(21);
        assert_eq!(h2.age(), 20);
    }

    #[test]
    fn test_every_copy_strategy_is_independent() {
        for strategy in CopyStrategy::ALL {
            let report = probe(strategy).unwrap();
            assert!(report.equal_after_copy, "{strategy}");

            if strategy == CopyStrategy::Alias {
                assert!(report.shares_identity());
                assert!(report.mutation_visible());
                assert_eq!(report.copy_age_after_mutation, 21);
            } else {
                assert!(!report.shares_identity(), "{strategy}");
                assert!(!report.mutation_visible(), "{strategy}");
                assert_eq!(report.copy_age_after_mutation, 20, "{strategy}");
            }
        }
    }

    #[test]
    fn test_duplicate_unsupported() {
        let ledger = Ledger {
            entries: vec![100, -40],
        };
        match ledger.duplicate() {
            Err(CopyError::Unsupported { type_name }) => assert!(type_name.ends_with("Ledger")),
            Ok(_) => panic!("Ledger must not be duplicable"),
        }
        assert_eq!(ledger.entries.len(), 2);
    }

    #[test]
    fn test_shallow_duplicate_shares_composite_fields() {
        let original = Household::new("lee", vec!["lee".to_string()]);
        let mut duplicate = original.duplicate().unwrap();

        // Plain fields are independent
        duplicate.owner = "kim".to_string();
        assert_eq!(original.owner, "lee");

        // The member list is the same allocation
        assert!(Rc::ptr_eq(&original.members, &duplicate.members));
        original.members.borrow_mut().push("park".to_string());
        assert_eq!(duplicate.members.borrow().len(), 2);

        assert!(probe_household().unwrap());
    }

    #[test]
    fn test_report_display() {
        let report = probe(CopyStrategy::Alias).unwrap();
        let line = report.to_string();
        assert!(line.starts_with("alias"));
        assert!(line.contains("same-identity=true"));
        assert!(line.contains("mutation visible"));
    }
}
