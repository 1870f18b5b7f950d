//! Provide the access points: single-hop readers and writers of a property.
//!
//! ## Menu
//!
//! - [`AccessPoint`]: Metadata shared by both directions (input type, value slot,
//!   description, identity, structure).
//! - [`Accessor`]: Reads a property, [`Mutator`]: writes it. Each can be asked
//!   for its mirror ([`Accessor::to_mutator`], [`Mutator::to_accessor`]).
//!
//! - Variants:
//!     - [`FieldAccessor`] / [`FieldMutator`]: by field, mirror built eagerly.
//!     - [`MethodAccessor`] / [`MethodMutator`]: by method, with bound
//!       parameters, mirror resolved lazily through naming conventions.
//!     - [`ReferenceAccessor`] / [`ReferenceMutator`]: by bound reference,
//!       resolved through a [`MemberResolver`].
//!     - [`IndexAccessor`] / [`IndexMutator`]: a position in a `Vec<T>`.
//!     - [`SyntheticAccessor`]: closure-backed, supplying its own definition.
//!
//! - [`AccessKey`]: The hashable identity of an access point.
//!
//! [`MemberResolver`]: pax_reflect::reference::MemberResolver

// -----------------------------------------------------------------------------
// Modules

mod field;
mod index;
mod key;
mod method;
mod owner;
mod reference;
mod synthetic;

pub mod naming;

// -----------------------------------------------------------------------------
// Exports

pub use field::{FieldAccessor, FieldMutator};
pub use index::{Element, IndexAccessor, IndexMutator};
pub use key::{AccessKey, AccessKind, Direction};
pub use method::{BoundParam, MethodAccessor, MethodMutator};
pub use reference::{ReferenceAccessor, ReferenceMutator};
pub use synthetic::SyntheticAccessor;

pub(crate) use owner::Owner;

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use pax_reflect::info::{FieldInfo, MethodInfo, Type, ValueSlot};
use pax_reflect::{Reflect, Value};

use crate::AccessError;
use crate::definition::AccessorDefinition;

// -----------------------------------------------------------------------------
// Shape

/// The structure an access point exposes for normalization.
pub enum Shape<'a> {
    Field(&'a FieldInfo),
    Method(&'a MethodInfo),
    Index { element: &'a Type, index: usize },
    /// The links of a chain, in order.
    Chain(Vec<&'a dyn AccessPoint>),
    /// Nothing to inspect; the point must supply its own definition.
    Opaque,
}

// -----------------------------------------------------------------------------
// Traits

/// Metadata shared by accessors and mutators.
pub trait AccessPoint: Send + Sync + fmt::Debug + 'static {
    /// The type the point reads from or writes to.
    fn input(&self) -> Type;

    /// Type, nullability and default of the property.
    fn value_slot(&self) -> &ValueSlot;

    /// Returns `true` if values of type `input` can be passed to the point.
    fn accepts(&self, input: &Type) -> bool {
        *input == self.input()
    }

    /// The one Rust type the point reads from, if it accepts no other.
    ///
    /// [`Type`] erases generic arguments, this does not.
    fn input_type_id(&self) -> Option<TypeId> {
        None
    }

    /// Full description, used in error messages.
    fn description(&self) -> String;

    /// Short form used when the point is a chain link.
    fn segment(&self) -> String;

    fn key(&self) -> AccessKey;

    fn shape(&self) -> Shape<'_>;

    /// A definition supplied directly, bypassing structural inspection.
    fn definition(&self) -> Option<AccessorDefinition> {
        None
    }
}

/// Reads a property.
pub trait Accessor: AccessPoint {
    /// Reads the property. `None` if it is absent.
    fn read<'a>(&self, target: &'a dyn Reflect) -> Result<Option<Value<'a>>, AccessError>;

    /// Reads the property as a mutable view into `target`.
    fn read_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
    ) -> Result<Option<&'a mut dyn Reflect>, AccessError>;

    /// Returns the mutator writing the same property.
    fn to_mutator(&self) -> Result<Arc<dyn Mutator>, AccessError> {
        Err(AccessError::NonReversible {
            point: self.description(),
        })
    }

    /// Returns `true` if [`to_mutator`](Self::to_mutator) succeeds.
    fn is_reversible(&self) -> bool {
        self.to_mutator().is_ok()
    }
}

/// Writes a property.
pub trait Mutator: AccessPoint {
    /// Writes the property. `None` clears a nullable property.
    fn write(&self, target: &mut dyn Reflect, value: Option<Box<dyn Reflect>>)
    -> Result<(), AccessError>;

    /// Returns the accessor reading the same property.
    fn to_accessor(&self) -> Result<Arc<dyn Accessor>, AccessError> {
        Err(AccessError::NonReversible {
            point: self.description(),
        })
    }

    fn is_reversible(&self) -> bool {
        self.to_accessor().is_ok()
    }
}

impl dyn Accessor {
    /// Reads the property and clones it out as a `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use pax_access::point::{Accessor, FieldAccessor};
    /// use pax_reflect::impl_typed;
    /// use pax_reflect::info::{FieldInfo, TypeInfo};
    /// use pax_reflect::registry::TypeRegistry;
    ///
    /// #[derive(Debug, Clone, PartialEq, Default)]
    /// struct City { name: String }
    /// impl_typed!(City as "geo::City", default);
    ///
    /// let mut registry = TypeRegistry::new();
    /// registry.register(TypeInfo::new::<City>().with_field(
    ///     FieldInfo::required::<City, String>("name", |c| &c.name, |c| &mut c.name),
    /// ));
    /// let registry = Arc::new(registry);
    ///
    /// let name = FieldAccessor::new(&registry, "geo::City", "name").unwrap();
    /// let name: Arc<dyn Accessor> = Arc::new(name);
    /// let mut city = City { name: "Lyon".into() };
    /// assert_eq!(name.get::<String>(&city).unwrap().as_deref(), Some("Lyon"));
    ///
    /// name.to_mutator().unwrap().set(&mut city, String::from("Nice")).unwrap();
    /// assert_eq!(city.name, "Nice");
    /// ```
    pub fn get<T: Reflect + Clone>(&self, target: &dyn Reflect) -> Result<Option<T>, AccessError> {
        let Some(value) = self.read(target)? else {
            return Ok(None);
        };
        match value.downcast_ref::<T>() {
            Some(value) => Ok(Some(value.clone())),
            None => Err(AccessError::TypeMismatch {
                point: self.description(),
                expected: core::any::type_name::<T>().to_string(),
                found: value.as_reflect().reflect_type_name().to_string(),
            }),
        }
    }
}

impl dyn Mutator {
    /// Writes a typed value.
    #[inline]
    pub fn set<T: Reflect>(&self, target: &mut dyn Reflect, value: T) -> Result<(), AccessError> {
        self.write(target, Some(Box::new(value)))
    }
}

impl PartialEq for dyn AccessPoint {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl PartialEq for dyn Accessor {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl PartialEq for dyn Mutator {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

/// Implements equality and hashing through [`AccessPoint::key`].
macro_rules! impl_key_eq {
    ($($ty:ty),* $(,)?) => {$(
        impl PartialEq for $ty {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                $crate::point::AccessPoint::key(self) == $crate::point::AccessPoint::key(other)
            }
        }

        impl Eq for $ty {}

        impl core::hash::Hash for $ty {
            #[inline]
            fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
                core::hash::Hash::hash(&$crate::point::AccessPoint::key(self), state);
            }
        }
    )*};
}

pub(crate) use impl_key_eq;
