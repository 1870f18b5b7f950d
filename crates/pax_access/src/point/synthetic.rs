use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use core::any::TypeId;
use core::fmt;

use pax_reflect::info::{InvokeFault, Type, Typed, ValueSlot};
use pax_reflect::{Reflect, Value};

use crate::AccessError;
use crate::definition::AccessorDefinition;
use crate::point::{AccessKey, AccessKind, AccessPoint, Accessor, Direction, Shape};

type ReadFn = dyn Fn(&dyn Reflect) -> Result<Option<Box<dyn Reflect>>, InvokeFault> + Send + Sync;

/// A read-only accessor backed by a closure.
///
/// Nothing about a closure can be inspected, so the accessor carries its
/// own [`AccessorDefinition`]: by default the input type, the given name
/// and the produced type. It has no mirror.
///
/// # Examples
///
/// ```
/// use pax_access::definition::AccessorDefinition;
/// use pax_access::point::{AccessPoint, Accessor, SyntheticAccessor};
/// use pax_reflect::info::Type;
///
/// let length = SyntheticAccessor::new("len", |text: &String| Some(text.len()));
/// let text = String::from("four");
/// let value = length.read(&text).unwrap().unwrap();
/// assert_eq!(value.downcast_ref::<usize>(), Some(&4));
///
/// assert_eq!(
///     length.definition(),
///     Some(AccessorDefinition::new(Type::Object("String"), "len", Type::of::<usize>())),
/// );
/// assert!(!length.is_reversible());
/// ```
pub struct SyntheticAccessor {
    input: Type,
    input_type_id: TypeId,
    slot: ValueSlot,
    definition: AccessorDefinition,
    read: Box<ReadFn>,
}

impl SyntheticAccessor {
    pub fn new<S, T, F>(name: impl Into<String>, read: F) -> Self
    where
        S: Typed,
        T: Typed,
        F: Fn(&S) -> Option<T> + Send + Sync + 'static,
    {
        let read = move |target: &dyn Reflect| {
            let Some(source) = target.downcast_ref::<S>() else {
                return Err(InvokeFault::WrongTarget {
                    expected: core::any::type_name::<S>(),
                    found: target.reflect_type_name(),
                });
            };
            Ok(read(source).map(|value| Box::new(value) as Box<dyn Reflect>))
        };
        Self {
            input: S::ty(),
            input_type_id: TypeId::of::<S>(),
            slot: ValueSlot::nullable::<T>(),
            definition: AccessorDefinition::new(S::ty(), name, T::ty()),
            read: Box::new(read),
        }
    }

    /// Replaces the carried definition.
    pub fn with_definition(mut self, definition: AccessorDefinition) -> Self {
        self.definition = definition;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

impl AccessPoint for SyntheticAccessor {
    #[inline]
    fn input(&self) -> Type {
        self.input.clone()
    }

    #[inline]
    fn input_type_id(&self) -> Option<TypeId> {
        Some(self.input_type_id)
    }

    #[inline]
    fn value_slot(&self) -> &ValueSlot {
        &self.slot
    }

    fn description(&self) -> String {
        format!("{}.{}", self.input, self.definition.name)
    }

    fn segment(&self) -> String {
        self.definition.name.clone()
    }

    fn key(&self) -> AccessKey {
        AccessKey::new(
            AccessKind::Synthetic,
            Direction::Read,
            self.definition.to_string(),
        )
    }

    #[inline]
    fn shape(&self) -> Shape<'_> {
        Shape::Opaque
    }

    #[inline]
    fn definition(&self) -> Option<AccessorDefinition> {
        Some(self.definition.clone())
    }
}

impl Accessor for SyntheticAccessor {
    fn read<'a>(&self, target: &'a dyn Reflect) -> Result<Option<Value<'a>>, AccessError> {
        (self.read)(target)
            .map(|value| value.map(Value::Owned))
            .map_err(|fault| AccessError::from_fault(self, target.reflect_type_name(), None, fault))
    }

    fn read_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
    ) -> Result<Option<&'a mut dyn Reflect>, AccessError> {
        let fault = InvokeFault::Unsupported("mutable projection");
        Err(AccessError::from_fault(self, target.reflect_type_name(), None, fault))
    }

    #[inline]
    fn is_reversible(&self) -> bool {
        false
    }
}

impl fmt::Debug for SyntheticAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntheticAccessor")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::SyntheticAccessor;
    use crate::AccessError;
    use crate::error::InvocationKind;
    use crate::fixtures::{Person, Phone};
    use crate::point::{AccessKind, AccessPoint, Accessor};
    use alloc::string::String;
    use alloc::vec;

    #[test]
    fn reads_fresh_values() {
        let first = SyntheticAccessor::new("first_phone", |person: &Person| {
            person.phones.first().cloned()
        });
        assert_eq!(first.key().kind, AccessKind::Synthetic);

        let person = Person {
            phones: vec![Phone::new("7")],
            ..Person::default()
        };
        let value = first.read(&person).unwrap().unwrap();
        assert!(!value.is_borrowed());
        assert_eq!(value.downcast_ref::<Phone>(), Some(&Phone::new("7")));
        assert!(first.read(&Person::default()).unwrap().is_none());
    }

    #[test]
    fn no_mirror_and_no_projection() {
        let upper = SyntheticAccessor::new("upper", |text: &String| Some(text.to_uppercase()));
        assert!(matches!(upper.to_mutator(), Err(AccessError::NonReversible { .. })));

        let err = upper.read_mut(&mut String::new()).unwrap_err();
        assert_eq!(err.invocation_kind(), Some(InvocationKind::Unsupported));

        let err = upper.read(&3_u8).unwrap_err();
        assert_eq!(err.invocation_kind(), Some(InvocationKind::WrongTarget));
    }
}
