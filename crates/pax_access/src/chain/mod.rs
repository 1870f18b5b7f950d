//! Compose access points into multi-hop property paths.
//!
//! ## Menu
//!
//! - [`AccessorChain`]: Reads through an ordered list of accessors, each link
//!   reading from the value produced by the previous one.
//! - [`AccessorChainMutator`]: Traverses all links but the last, then writes
//!   through a final mutator.
//!
//! - [`NullPolicy`]: What to do when an intermediate link reads nothing:
//!     - [`Fail`]: raise [`AccessError::NullTraversal`] naming the link.
//!     - [`ShortCircuit`]: the whole chain reads absent.
//!     - [`AutoVivify`]: build a default instance, write it back through the
//!       link's mirror, continue.
//!
//! The last link of an accessor chain produces the result, so an absent
//! value there is returned as is, whatever the policy.
//!
//! [`AccessError::NullTraversal`]: crate::AccessError::NullTraversal

// -----------------------------------------------------------------------------
// Modules

mod accessor;
mod mutator;
mod policy;
mod traversal;

// -----------------------------------------------------------------------------
// Exports

pub use accessor::AccessorChain;
pub use mutator::AccessorChainMutator;
pub use policy::{
    AutoVivify, Fail, InstantiateFn, NullAction, NullPolicy, NullPolicyKind, ShortCircuit,
};

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

use pax_reflect::info::Type;

use crate::AccessError;
use crate::point::{AccessKey, AccessKind, AccessPoint, Accessor, Direction};

// -----------------------------------------------------------------------------
// Helpers

/// Renders `input.a.b[0].c`.
fn render_path<'a>(input: &Type, links: impl IntoIterator<Item = &'a dyn AccessPoint>) -> String {
    let mut path = input.to_string();
    for link in links {
        let segment = link.segment();
        if !segment.starts_with('[') {
            path.push('.');
        }
        path.push_str(&segment);
    }
    path
}

fn chain_key<'a>(
    direction: Direction,
    links: impl IntoIterator<Item = &'a dyn AccessPoint>,
) -> AccessKey {
    let keys: Vec<String> = links.into_iter().map(|link| link.key().to_string()).collect();
    AccessKey::new(AccessKind::Chain, direction, keys.join(" -> "))
}

/// Checks that `link` reads the values produced by `previous`.
///
/// Links knowing their exact input type must match the produced Rust type,
/// the others are checked on the erased [`Type`].
fn check_link(previous: &dyn AccessPoint, link: &dyn AccessPoint) -> Result<(), AccessError> {
    let slot = previous.value_slot();
    let exact = link
        .input_type_id()
        .is_none_or(|type_id| type_id == slot.type_id());
    if exact && link.accepts(slot.ty()) {
        return Ok(());
    }
    let found = if exact {
        slot.ty().to_string()
    } else {
        slot.type_name().to_string()
    };
    Err(AccessError::TypeMismatch {
        point: link.description(),
        expected: link.input().to_string(),
        found,
    })
}

#[inline]
fn as_points(links: &[Arc<dyn Accessor>]) -> impl Iterator<Item = &dyn AccessPoint> {
    links.iter().map(|link| link.as_ref() as &dyn AccessPoint)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{AccessorChain, AutoVivify, NullPolicyKind, ShortCircuit};
    use crate::AccessError;
    use crate::fixtures::{self, Address, City, Person, Phone, Team};
    use crate::point::{AccessPoint, Accessor, FieldAccessor, IndexAccessor, MethodAccessor};
    use crate::point::SyntheticAccessor;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use pax_reflect::info::Type;
    use pax_reflect::registry::TypeRegistry;
    use std::collections::HashMap;

    fn city_name(registry: &Arc<TypeRegistry>) -> AccessorChain {
        AccessorChain::new(Arc::new(
            FieldAccessor::new(registry, "fixtures::Person", "address").unwrap(),
        ))
        .then(Arc::new(
            FieldAccessor::new(registry, "fixtures::Address", "city").unwrap(),
        ))
        .unwrap()
        .then(Arc::new(
            FieldAccessor::new(registry, "fixtures::City", "name").unwrap(),
        ))
        .unwrap()
    }

    fn homeless() -> Person {
        Person {
            name: String::from("Sam"),
            ..Person::default()
        }
    }

    #[test]
    fn absent_address_fails_by_default() {
        let registry = fixtures::registry();
        let chain = city_name(&registry);
        assert_eq!(chain.description(), "fixtures::Person.address.city.name");

        let err = chain.read(&homeless()).unwrap_err();
        let AccessError::NullTraversal {
            path,
            position,
            link,
        } = &err
        else {
            panic!("unexpected {err:?}");
        };
        assert_eq!(path, "fixtures::Person.address.city.name");
        assert_eq!(*position, 0);
        assert_eq!(link, "fixtures::Person.address");

        // the mutator names the same link
        let err = chain
            .to_mutator()
            .unwrap()
            .set(&mut homeless(), String::from("Paris"))
            .unwrap_err();
        assert!(matches!(err, AccessError::NullTraversal { position: 0, .. }));
    }

    #[test]
    fn absent_address_short_circuits() {
        let registry = fixtures::registry();
        let chain = city_name(&registry).with_policy(Arc::new(ShortCircuit));
        assert!(chain.read(&homeless()).unwrap().is_none());

        // a write has nowhere to go
        let err = chain
            .to_mutator()
            .unwrap()
            .set(&mut homeless(), String::from("Paris"))
            .unwrap_err();
        let AccessError::NullTraversal { position, link, .. } = &err else {
            panic!("unexpected {err:?}");
        };
        assert_eq!(*position, 0);
        assert_eq!(link, "fixtures::Person.address");
    }

    #[test]
    fn absent_address_is_vivified_on_write() {
        let registry = fixtures::registry();
        let policy = AutoVivify::new().with_registry(registry.clone());
        let chain = city_name(&registry).with_policy(Arc::new(policy));

        let mut person = homeless();
        let mutator = chain.to_mutator().unwrap();
        mutator.set(&mut person, String::from("Paris")).unwrap();
        assert_eq!(
            person.address,
            Some(Address {
                street: String::new(),
                city: Some(City {
                    name: String::from("Paris")
                }),
            })
        );
        assert_eq!(
            mutator.description(),
            "fixtures::Person.address.city => name"
        );

        let value = chain.read(&person).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "Paris");
    }

    #[test]
    fn shared_reads_do_not_persist_vivified_values() {
        let registry = fixtures::registry();
        let policy = AutoVivify::new().with_registry(registry.clone());
        let chain = city_name(&registry).with_policy(Arc::new(policy));

        let person = homeless();
        // `City::default()` has an empty name
        let value = chain.read(&person).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "");
        assert!(person.address.is_none());

        let mut person = homeless();
        assert!(chain.read_mut(&mut person).unwrap().is_some());
        assert!(person.address.unwrap().city.is_some());
    }

    #[test]
    fn chain_reads_like_nested_reads() {
        let registry = fixtures::registry();
        let address = FieldAccessor::new(&registry, "fixtures::Person", "address").unwrap();
        let city = FieldAccessor::new(&registry, "fixtures::Address", "city").unwrap();
        let name = FieldAccessor::new(&registry, "fixtures::City", "name").unwrap();
        let chain = city_name(&registry);

        let person = Person {
            address: Some(Address {
                street: String::from("Main"),
                city: Some(City {
                    name: String::from("Oslo"),
                }),
            }),
            ..Person::default()
        };
        let by_hand = address.read(&person).unwrap().unwrap();
        let by_hand = city.read(by_hand.as_reflect()).unwrap().unwrap();
        let by_hand = name.read(by_hand.as_reflect()).unwrap().unwrap();
        let by_chain = chain.read(&person).unwrap().unwrap();
        assert!(by_chain.as_reflect().reflect_eq(by_hand.as_reflect()));
        assert!(by_chain.is_borrowed());
    }

    #[test]
    fn index_links_and_computed_carriers() {
        let registry = fixtures::registry();
        let number = AccessorChain::new(Arc::new(
            FieldAccessor::new(&registry, "fixtures::Person", "phones").unwrap(),
        ))
        .then(Arc::new(IndexAccessor::<Phone>::new(1)))
        .unwrap()
        .then(Arc::new(
            MethodAccessor::new(&registry, "fixtures::Phone", "get_number").unwrap(),
        ))
        .unwrap();
        assert_eq!(number.description(), "fixtures::Person.phones[1].get_number()");

        let mut person = Person {
            phones: vec![Phone::new("1"), Phone::new("2")],
            ..Person::default()
        };
        let value = number.read(&person).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "2");

        number
            .to_mutator()
            .unwrap()
            .set(&mut person, String::from("22"))
            .unwrap();
        assert_eq!(person.phones[1], Phone::new("22"));

        // a past-the-end index is an absent intermediate value
        person.phones.truncate(1);
        let err = number.read(&person).unwrap_err();
        assert!(matches!(err, AccessError::NullTraversal { position: 1, .. }));
    }

    #[test]
    fn links_must_fit() {
        let registry = fixtures::registry();
        let chain = AccessorChain::new(Arc::new(
            FieldAccessor::new(&registry, "fixtures::Person", "address").unwrap(),
        ));
        let err = chain
            .then(Arc::new(
                FieldAccessor::new(&registry, "fixtures::City", "name").unwrap(),
            ))
            .unwrap_err();
        assert!(matches!(err, AccessError::TypeMismatch { .. }));
    }

    #[test]
    fn links_accept_subtypes() {
        let registry = fixtures::registry();
        let lead_name = AccessorChain::new(Arc::new(
            FieldAccessor::new(&registry, "fixtures::Team", "lead").unwrap(),
        ))
        .then(Arc::new(
            FieldAccessor::new(&registry, "fixtures::Person", "name").unwrap(),
        ))
        .unwrap();
        assert_eq!(lead_name.description(), "fixtures::Team.lead.name");

        let mut team = Team::default();
        lead_name
            .to_mutator()
            .unwrap()
            .set(&mut team, String::from("Ada"))
            .unwrap();
        assert_eq!(team.lead.person.name, "Ada");

        let value = lead_name.read(&team).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "Ada");
    }

    #[test]
    fn generic_arguments_are_compared_when_known() {
        let registry = fixtures::registry();
        let scores = AccessorChain::new(Arc::new(
            FieldAccessor::new(&registry, "fixtures::Team", "scores").unwrap(),
        ));

        let by_byte = SyntheticAccessor::new("len", |map: &HashMap<u8, u32>| Some(map.len()));
        assert_eq!(by_byte.input(), Type::Object("HashMap"));
        let err = scores.clone().then(Arc::new(by_byte)).unwrap_err();
        assert!(matches!(err, AccessError::TypeMismatch { .. }));

        let by_name = SyntheticAccessor::new("len", |map: &HashMap<String, u32>| Some(map.len()));
        let len = scores.then(Arc::new(by_name)).unwrap();
        let team = Team {
            scores: HashMap::from([(String::from("ada"), 3)]),
            ..Team::default()
        };
        let value = len.read(&team).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<usize>(), Some(&1));
    }

    #[test]
    fn link_errors_carry_the_path() {
        let registry = fixtures::registry();
        let count = AccessorChain::new(Arc::new(
            FieldAccessor::new(&registry, "fixtures::Employee", "person").unwrap(),
        ))
        .then(Arc::new(
            MethodAccessor::new(&registry, "fixtures::Person", "phone_count").unwrap(),
        ))
        .unwrap();
        assert!(!count.is_reversible());
        let err = count.to_mutator().unwrap_err();
        assert!(matches!(err, AccessError::NonReversible { .. }));

        let err = count.read(&Person::default()).unwrap_err();
        let AccessError::Chain { path, position, .. } = &err else {
            panic!("unexpected {err:?}");
        };
        assert_eq!(path, "fixtures::Employee.person.phone_count()");
        assert_eq!(*position, 0);
        assert!(err.invocation_kind().is_some());
        assert_eq!(count.policy().kind(), NullPolicyKind::Fail);
    }
}
