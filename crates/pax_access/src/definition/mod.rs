//! Compare access points by the property they reach, whatever their form.
//!
//! ## Menu
//!
//! - [`AccessorDefinition`]: The canonical `(declaring type, name, member type)`
//!   identity of a property, computed by [`AccessorDefinition::of`].
//! - [`DefinitionCache`]: A bounded cache of computed definitions.
//! - [`AccessPointComparator`]: Orders definitions, name first.
//! - [`AccessorSet`] / [`AccessorMap`]: Ordered containers in which a field
//!   accessor, a method accessor and a reference accessor for the same
//!   property are one key.

// -----------------------------------------------------------------------------
// Modules

mod comparator;
mod containers;

// -----------------------------------------------------------------------------
// Exports

pub use comparator::{AccessPointComparator, DEFAULT_DEFINITION_CACHE_CAPACITY, DefinitionCache};
pub use containers::{AccessorMap, AccessorSet};

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use pax_reflect::info::Type;

use crate::AccessError;
use crate::point::{AccessPoint, Shape, naming};

// -----------------------------------------------------------------------------
// AccessorDefinition

/// The property an access point reaches.
///
/// Field `x`, getter `get_x`, setter `set_x` and a reference to either
/// on the same type all have the same definition.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pax_access::definition::AccessorDefinition;
/// use pax_access::point::{FieldAccessor, MethodAccessor};
/// use pax_reflect::impl_typed;
/// use pax_reflect::info::{FieldInfo, MethodInfo, TypeInfo, Type};
/// use pax_reflect::registry::TypeRegistry;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Phone { number: String }
/// impl_typed!(Phone as "app::Phone");
///
/// let mut registry = TypeRegistry::new();
/// registry.register(
///     TypeInfo::new::<Phone>()
///         .with_field(
///             FieldInfo::required::<Phone, String>("number", |p| &p.number, |p| &mut p.number)
///                 .private(),
///         )
///         .with_method(MethodInfo::getter::<Phone, String>("getNumber", |p| &p.number)),
/// );
/// let registry = Arc::new(registry);
///
/// let field = FieldAccessor::new(&registry, "app::Phone", "number").unwrap();
/// let getter = MethodAccessor::new(&registry, "app::Phone", "getNumber").unwrap();
///
/// let definition = AccessorDefinition::of(&field).unwrap();
/// assert_eq!(definition, AccessorDefinition::of(&getter).unwrap());
/// assert_eq!(definition.to_string(), "app::Phone.number: String");
/// assert_eq!(definition.member_type, Type::Object("String"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessorDefinition {
    pub declaring_type: Type,
    pub name: String,
    pub member_type: Type,
}

impl AccessorDefinition {
    #[inline]
    pub fn new(declaring_type: Type, name: impl Into<String>, member_type: Type) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            member_type,
        }
    }

    /// Computes the definition of `point`.
    ///
    /// A definition supplied by the point itself is used as is. Otherwise:
    ///
    /// | Shape | Declaring type | Name | Member type |
    /// |---|---|---|---|
    /// | field | declaring type | field name | field type |
    /// | method | declaring type | name without `get`/`set`/`is` | property type |
    /// | index | `[T]` | `[i]` | `T` |
    /// | chain | of the first link | link names joined by `.` | of the last link |
    pub fn of(point: &dyn AccessPoint) -> Result<Self, AccessError> {
        if let Some(definition) = point.definition() {
            return Ok(definition);
        }
        match point.shape() {
            Shape::Field(field) => Ok(Self::new(
                Type::Object(field.declaring_type()),
                field.name(),
                field.slot().ty().clone(),
            )),
            Shape::Method(method) => Ok(Self::new(
                Type::Object(method.declaring_type()),
                naming::property_name(method.name()),
                method.property().ty().clone(),
            )),
            Shape::Index { element, index } => Ok(Self::new(
                element.clone().array_of(),
                format!("[{index}]"),
                element.clone(),
            )),
            Shape::Chain(links) => {
                let links = links
                    .into_iter()
                    .map(Self::of)
                    .collect::<Result<Vec<_>, _>>()?;
                let (Some(first), Some(last)) = (links.first(), links.last()) else {
                    return Err(Self::opaque(point));
                };
                let mut name = String::new();
                for link in &links {
                    if !name.is_empty() && !link.name.starts_with('[') {
                        name.push('.');
                    }
                    name.push_str(&link.name);
                }
                Ok(Self::new(
                    first.declaring_type.clone(),
                    name,
                    last.member_type.clone(),
                ))
            }
            Shape::Opaque => Err(Self::opaque(point)),
        }
    }

    fn opaque(point: &dyn AccessPoint) -> AccessError {
        AccessError::UnsupportedMemberShape {
            member: point.description(),
            reason: "nothing to inspect and no definition supplied".to_string(),
        }
    }
}

impl fmt::Display for AccessorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.declaring_type, self.name, self.member_type)
    }
}

// -----------------------------------------------------------------------------
// Tests
