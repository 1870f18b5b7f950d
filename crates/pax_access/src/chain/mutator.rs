use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use pax_reflect::Reflect;
use pax_reflect::info::{Type, ValueSlot};

use crate::AccessError;
use crate::chain::traversal::{Reached, Traversal};
use crate::chain::{AccessorChain, Fail, NullPolicy};
use crate::chain::{as_points, chain_key, check_link, render_path};
use crate::point::{AccessKey, AccessPoint, Accessor, Direction, Mutator, Shape, impl_key_eq};

/// Writes a property at the end of a path.
///
/// The head links are traversed mutably under the null policy, so
/// vivified values are stored in the target, then the tail mutator writes
/// into the value reached. The head may be empty.
#[derive(Clone)]
pub struct AccessorChainMutator {
    head: Vec<Arc<dyn Accessor>>,
    tail: Arc<dyn Mutator>,
    policy: Arc<dyn NullPolicy>,
}

impl AccessorChainMutator {
    /// Builds a chain mutator, checking that consecutive links fit.
    pub fn new(head: Vec<Arc<dyn Accessor>>, tail: Arc<dyn Mutator>) -> Result<Self, AccessError> {
        for pair in head.windows(2) {
            check_link(pair[0].as_ref(), pair[1].as_ref())?;
        }
        if let Some(last) = head.last() {
            check_link(last.as_ref(), tail.as_ref())?;
        }
        Ok(Self::from_parts(head, tail, Arc::new(Fail)))
    }

    pub(crate) fn from_parts(
        head: Vec<Arc<dyn Accessor>>,
        tail: Arc<dyn Mutator>,
        policy: Arc<dyn NullPolicy>,
    ) -> Self {
        Self { head, tail, policy }
    }

    #[inline]
    pub fn with_policy(mut self, policy: Arc<dyn NullPolicy>) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn head(&self) -> &[Arc<dyn Accessor>] {
        &self.head
    }

    #[inline]
    pub fn tail(&self) -> &Arc<dyn Mutator> {
        &self.tail
    }

    #[inline]
    pub fn policy(&self) -> &Arc<dyn NullPolicy> {
        &self.policy
    }

    /// The links, tail included.
    fn points(&self) -> impl Iterator<Item = &dyn AccessPoint> {
        as_points(&self.head).chain(core::iter::once(self.tail.as_ref() as &dyn AccessPoint))
    }

    fn head_path(&self) -> String {
        render_path(&self.input(), as_points(&self.head))
    }
}

impl AccessPoint for AccessorChainMutator {
    fn input(&self) -> Type {
        match self.head.first() {
            Some(first) => first.input(),
            None => self.tail.input(),
        }
    }

    fn input_type_id(&self) -> Option<TypeId> {
        match self.head.first() {
            Some(first) => first.input_type_id(),
            None => self.tail.input_type_id(),
        }
    }

    #[inline]
    fn value_slot(&self) -> &ValueSlot {
        self.tail.value_slot()
    }

    fn accepts(&self, input: &Type) -> bool {
        match self.head.first() {
            Some(first) => first.accepts(input),
            None => self.tail.accepts(input),
        }
    }

    /// `<head path> => <tail>`.
    fn description(&self) -> String {
        format!("{} => {}", self.head_path(), self.tail.segment())
    }

    fn segment(&self) -> String {
        let path = render_path(&self.input(), self.points());
        let input = self.input().to_string();
        path.strip_prefix(&input)
            .map(|rest| rest.trim_start_matches('.'))
            .unwrap_or(path.as_str())
            .into()
    }

    fn key(&self) -> AccessKey {
        chain_key(Direction::Write, self.points())
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Chain(self.points().collect())
    }
}

impl Mutator for AccessorChainMutator {
    fn write(
        &self,
        target: &mut dyn Reflect,
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), AccessError> {
        let path = || self.description();
        let traversal = Traversal {
            links: &self.head,
            policy: self.policy.as_ref(),
            path: &path,
            result_last: false,
        };
        match traversal.read_mut(target)? {
            Reached::Value(carrier) => self
                .tail
                .write(carrier, value)
                .map_err(|error| AccessError::in_chain(path(), self.head.len(), error)),
            Reached::Absent { position } => Err(AccessError::NullTraversal {
                path: path(),
                position,
                link: self.head[position].description(),
            }),
        }
    }

    /// Rebuilds the accessor chain, the tail replaced by its mirror.
    fn to_accessor(&self) -> Result<Arc<dyn Accessor>, AccessError> {
        let last = self
            .tail
            .to_accessor()
            .map_err(|_| AccessError::NonReversible {
                point: self.description(),
            })?;
        let mut links = self.head.clone();
        links.push(last);
        let chain = AccessorChain::from_links(links)?.with_policy(self.policy.clone());
        Ok(Arc::new(chain))
    }
}

impl fmt::Debug for AccessorChainMutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorChainMutator")
            .field("path", &self.description())
            .field("policy", &self.policy.kind())
            .finish()
    }
}

impl_key_eq!(AccessorChainMutator);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::AccessorChainMutator;
    use crate::AccessError;
    use crate::chain::AccessorChain;
    use crate::fixtures::{self, Address, City, Person, Phone};
    use crate::point::{AccessPoint, Accessor, BoundParam, FieldAccessor, FieldMutator};
    use crate::point::{MethodAccessor, MethodMutator, Mutator};
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn method_links_with_bound_params() {
        let registry = fixtures::registry();
        let phone = MethodAccessor::with_params(
            &registry,
            "fixtures::Person",
            "phone",
            vec![BoundParam::new(0_usize)],
        )
        .unwrap();
        let number = FieldMutator::new(&registry, "fixtures::Phone", "number").unwrap();
        let phone: Arc<dyn Accessor> = Arc::new(phone);
        let mutator = AccessorChainMutator::new(vec![phone], Arc::new(number)).unwrap();
        assert_eq!(mutator.description(), "fixtures::Person.phone(0) => number");

        let mut person = Person {
            phones: vec![Phone::new("5")],
            ..Person::default()
        };
        mutator
            .write(&mut person, Some(Box::new(String::from("6"))))
            .unwrap();
        assert_eq!(person.phones[0], Phone::new("6"));

        let accessor = mutator.to_accessor().unwrap();
        let value = accessor.read(&person).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "6");
    }

    #[test]
    fn empty_head_writes_directly() {
        let registry = fixtures::registry();
        let name = MethodMutator::new(&registry, "fixtures::Person", "set_name").unwrap();
        let mutator = AccessorChainMutator::new(vec![], Arc::new(name)).unwrap();

        let mut person = Person::default();
        mutator
            .write(&mut person, Some(Box::new(String::from("Kim"))))
            .unwrap();
        assert_eq!(person.name, "Kim");
        let accessor = mutator.to_accessor().unwrap();
        assert_eq!(accessor.description(), "fixtures::Person.get_name()");
    }

    #[test]
    fn tail_errors_name_the_tail_position() {
        let registry = fixtures::registry();
        let address = FieldAccessor::new(&registry, "fixtures::Person", "address").unwrap();
        let city = FieldAccessor::new(&registry, "fixtures::Address", "city").unwrap();
        let chain = AccessorChain::new(Arc::new(address)).then(Arc::new(city)).unwrap();
        let mutator = chain.to_mutator().unwrap();

        let mut person = Person {
            address: Some(Default::default()),
            ..Person::default()
        };
        let err = mutator.set(&mut person, 1_u8).unwrap_err();
        assert!(matches!(err, AccessError::Chain { position: 1, .. }));
    }

    #[test]
    fn shared_mutator_reports_per_call_positions() {
        let registry = fixtures::registry();
        let mutator = AccessorChain::new(Arc::new(
            FieldAccessor::new(&registry, "fixtures::Person", "address").unwrap(),
        ))
        .then(Arc::new(
            FieldAccessor::new(&registry, "fixtures::Address", "city").unwrap(),
        ))
        .unwrap()
        .then(Arc::new(
            FieldAccessor::new(&registry, "fixtures::City", "name").unwrap(),
        ))
        .unwrap()
        .to_mutator()
        .unwrap();

        let write = |person: &mut Person| mutator.set(person, String::from("Oslo"));
        std::thread::scope(|scope| {
            let homeless = scope.spawn(|| {
                (0..100)
                    .map(|_| write(&mut Person::default()))
                    .collect::<Vec<_>>()
            });
            let cityless = scope.spawn(|| {
                (0..100)
                    .map(|_| {
                        let mut person = Person {
                            address: Some(Address::default()),
                            ..Person::default()
                        };
                        write(&mut person)
                    })
                    .collect::<Vec<_>>()
            });
            for result in homeless.join().unwrap() {
                assert!(matches!(result, Err(AccessError::NullTraversal { position: 0, .. })));
            }
            for result in cityless.join().unwrap() {
                assert!(matches!(result, Err(AccessError::NullTraversal { position: 1, .. })));
            }
        });

        let mut person = Person {
            address: Some(Address {
                street: String::new(),
                city: Some(City::default()),
            }),
            ..Person::default()
        };
        write(&mut person).unwrap();
        assert_eq!(person.address.unwrap().city.unwrap().name, "Oslo");
    }

    #[test]
    fn mismatched_tail() {
        let registry = fixtures::registry();
        let address = FieldAccessor::new(&registry, "fixtures::Person", "address").unwrap();
        let number = FieldMutator::new(&registry, "fixtures::Phone", "number").unwrap();
        assert!(matches!(
            AccessorChainMutator::new(vec![Arc::new(address)], Arc::new(number)),
            Err(AccessError::TypeMismatch { .. })
        ));
    }
}
