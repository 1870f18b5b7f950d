use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use pax_reflect::info::{Type, ValueSlot};
use pax_reflect::{Reflect, Value};

use crate::AccessError;
use crate::chain::traversal::{Reached, Traversal};
use crate::chain::{AccessorChainMutator, Fail, NullPolicy};
use crate::chain::{as_points, chain_key, check_link, render_path};
use crate::point::{AccessKey, AccessPoint, Accessor, Direction, Mutator, Shape, impl_key_eq};

/// Reads a property through a path of accessors.
///
/// A chain holds at least one link. Every link must accept the type
/// produced by the link before it, which [`then`](Self::then) checks. The
/// chain is immutable once built and can be shared between threads.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pax_access::chain::{AccessorChain, ShortCircuit};
/// use pax_access::point::{AccessPoint, Accessor, FieldAccessor};
/// use pax_reflect::impl_typed;
/// use pax_reflect::info::{FieldInfo, TypeInfo};
/// use pax_reflect::registry::TypeRegistry;
///
/// #[derive(Debug, Clone, PartialEq, Default)]
/// struct City { name: String }
/// #[derive(Debug, Clone, PartialEq, Default)]
/// struct Address { city: Option<City> }
/// impl_typed!(City as "geo::City", default);
/// impl_typed!(Address as "geo::Address", default);
///
/// let mut registry = TypeRegistry::new();
/// registry.register(TypeInfo::new::<City>().with_field(
///     FieldInfo::required::<City, String>("name", |c| &c.name, |c| &mut c.name),
/// ));
/// registry.register(TypeInfo::new::<Address>().with_field(
///     FieldInfo::optional::<Address, City>("city", |a| &a.city, |a| &mut a.city),
/// ));
/// let registry = Arc::new(registry);
///
/// let city = FieldAccessor::new(&registry, "geo::Address", "city").unwrap();
/// let name = FieldAccessor::new(&registry, "geo::City", "name").unwrap();
/// let chain = AccessorChain::new(Arc::new(city))
///     .then(Arc::new(name))
///     .unwrap()
///     .with_policy(Arc::new(ShortCircuit));
/// assert_eq!(chain.description(), "geo::Address.city.name");
///
/// let address = Address { city: Some(City { name: "Rome".into() }) };
/// let value = chain.read(&address).unwrap().unwrap();
/// assert_eq!(value.downcast_ref::<String>().unwrap(), "Rome");
/// assert!(chain.read(&Address::default()).unwrap().is_none());
/// ```
#[derive(Clone)]
pub struct AccessorChain {
    links: Vec<Arc<dyn Accessor>>,
    policy: Arc<dyn NullPolicy>,
}

impl AccessorChain {
    /// A chain of one link, failing on absent values.
    pub fn new(first: Arc<dyn Accessor>) -> Self {
        Self {
            links: vec![first],
            policy: Arc::new(Fail),
        }
    }

    /// Builds a chain from `links`, checking that consecutive links fit.
    pub fn from_links(links: Vec<Arc<dyn Accessor>>) -> Result<Self, AccessError> {
        let mut links = links.into_iter();
        let Some(first) = links.next() else {
            return Err(AccessError::UnsupportedMemberShape {
                member: String::from("<empty chain>"),
                reason: String::from("a chain needs at least one link"),
            });
        };
        let mut chain = Self::new(first);
        for link in links {
            chain.push(link)?;
        }
        Ok(chain)
    }

    /// Appends `link`.
    ///
    /// Fails with [`AccessError::TypeMismatch`] if `link` cannot read what
    /// the current last link produces. Subtypes of a link's input are
    /// accepted. Generic arguments are only compared for links knowing
    /// their exact input type, such as index and synthetic accessors.
    #[inline]
    pub fn then(mut self, link: Arc<dyn Accessor>) -> Result<Self, AccessError> {
        self.push(link)?;
        Ok(self)
    }

    /// Appends `link` in place.
    pub fn push(&mut self, link: Arc<dyn Accessor>) -> Result<(), AccessError> {
        check_link(self.last().as_ref(), link.as_ref())?;
        self.links.push(link);
        Ok(())
    }

    #[inline]
    pub fn with_policy(mut self, policy: Arc<dyn NullPolicy>) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn links(&self) -> &[Arc<dyn Accessor>] {
        &self.links
    }

    #[inline]
    pub fn policy(&self) -> &Arc<dyn NullPolicy> {
        &self.policy
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Always `false`, a chain has at least one link.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[inline]
    fn first(&self) -> &Arc<dyn Accessor> {
        &self.links[0]
    }

    #[inline]
    fn last(&self) -> &Arc<dyn Accessor> {
        &self.links[self.links.len() - 1]
    }

    fn traversal<'c>(&'c self, path: &'c dyn Fn() -> String) -> Traversal<'c> {
        Traversal {
            links: &self.links,
            policy: self.policy.as_ref(),
            path,
            result_last: true,
        }
    }
}

impl AccessPoint for AccessorChain {
    #[inline]
    fn input(&self) -> Type {
        self.first().input()
    }

    #[inline]
    fn input_type_id(&self) -> Option<TypeId> {
        self.first().input_type_id()
    }

    #[inline]
    fn value_slot(&self) -> &ValueSlot {
        self.last().value_slot()
    }

    #[inline]
    fn accepts(&self, input: &Type) -> bool {
        self.first().accepts(input)
    }

    fn description(&self) -> String {
        render_path(&self.input(), as_points(&self.links))
    }

    fn segment(&self) -> String {
        let path = self.description();
        let input = self.input().to_string();
        path.strip_prefix(&input)
            .map(|rest| rest.trim_start_matches('.'))
            .unwrap_or(path.as_str())
            .into()
    }

    fn key(&self) -> AccessKey {
        chain_key(Direction::Read, as_points(&self.links))
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Chain(as_points(&self.links).collect())
    }
}

impl Accessor for AccessorChain {
    fn read<'a>(&self, target: &'a dyn Reflect) -> Result<Option<Value<'a>>, AccessError> {
        let path = || self.description();
        self.traversal(&path).read(target)
    }

    fn read_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
    ) -> Result<Option<&'a mut dyn Reflect>, AccessError> {
        let path = || self.description();
        match self.traversal(&path).read_mut(target)? {
            Reached::Value(value) => Ok(Some(value)),
            Reached::Absent { .. } => Ok(None),
        }
    }

    /// Keeps every link but the last and writes through the last link's mirror.
    fn to_mutator(&self) -> Result<Arc<dyn Mutator>, AccessError> {
        let tail = self.last().to_mutator().map_err(|_| AccessError::NonReversible {
            point: self.description(),
        })?;
        let head = self.links[..self.links.len() - 1].to_vec();
        let mutator = AccessorChainMutator::from_parts(head, tail, self.policy.clone());
        Ok(Arc::new(mutator))
    }
}

impl fmt::Debug for AccessorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorChain")
            .field("path", &self.description())
            .field("policy", &self.policy.kind())
            .finish()
    }
}

impl_key_eq!(AccessorChain);
