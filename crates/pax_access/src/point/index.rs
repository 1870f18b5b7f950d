use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use pax_reflect::info::{InvokeFault, Type, Typed, ValueSlot};
use pax_reflect::{Reflect, Value};

use crate::AccessError;
use crate::point::{AccessKey, AccessKind, AccessPoint, Accessor, Direction, Mutator, Shape};

/// Bounds of the element type of an indexed `Vec`.
pub trait Element: Typed + Clone + PartialEq + fmt::Debug {}

impl<T: Typed + Clone + PartialEq + fmt::Debug> Element for T {}

fn key<T: Element>(index: usize, direction: Direction) -> AccessKey {
    AccessKey::new(AccessKind::Index, direction, Vec::<T>::ty().descriptor())
        .with_params(vec![index.to_string()])
}

fn wrong_target<T: Element>(found: &'static str) -> InvokeFault {
    InvokeFault::WrongTarget {
        expected: core::any::type_name::<Vec<T>>(),
        found,
    }
}

// -----------------------------------------------------------------------------
// IndexAccessor

/// Reads the element at a fixed position of a `Vec<T>`.
///
/// Positions past the end read as absent, so a chain can apply its null
/// policy to them.
///
/// # Examples
///
/// ```
/// use pax_access::point::{AccessPoint, Accessor, IndexAccessor};
///
/// let second = IndexAccessor::<String>::new(1);
/// assert_eq!(second.segment(), "[1]");
///
/// let words = vec![String::from("a"), String::from("b")];
/// let value = second.read(&words).unwrap().unwrap();
/// assert_eq!(value.downcast_ref::<String>().unwrap(), "b");
/// assert!(IndexAccessor::<String>::new(2).read(&words).unwrap().is_none());
/// ```
pub struct IndexAccessor<T> {
    index: usize,
    slot: ValueSlot,
    mirror: Arc<IndexMutator<T>>,
}

impl<T: Element> IndexAccessor<T> {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            slot: ValueSlot::nullable::<T>(),
            mirror: Arc::new(IndexMutator::new(index)),
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T: Element> AccessPoint for IndexAccessor<T> {
    #[inline]
    fn input(&self) -> Type {
        Vec::<T>::ty()
    }

    #[inline]
    fn input_type_id(&self) -> Option<TypeId> {
        Some(TypeId::of::<Vec<T>>())
    }

    #[inline]
    fn value_slot(&self) -> &ValueSlot {
        &self.slot
    }

    fn description(&self) -> String {
        format!("{}[{}]", self.input(), self.index)
    }

    fn segment(&self) -> String {
        format!("[{}]", self.index)
    }

    fn key(&self) -> AccessKey {
        key::<T>(self.index, Direction::Read)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Index {
            element: self.slot.ty(),
            index: self.index,
        }
    }
}

impl<T: Element> Accessor for IndexAccessor<T> {
    fn read<'a>(&self, target: &'a dyn Reflect) -> Result<Option<Value<'a>>, AccessError> {
        let found = target.reflect_type_name();
        let Some(items) = target.downcast_ref::<Vec<T>>() else {
            return Err(AccessError::from_fault(self, found, None, wrong_target::<T>(found)));
        };
        Ok(items
            .get(self.index)
            .map(|item| Value::Borrowed(item as &dyn Reflect)))
    }

    fn read_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
    ) -> Result<Option<&'a mut dyn Reflect>, AccessError> {
        let found = target.reflect_type_name();
        let Some(items) = target.downcast_mut::<Vec<T>>() else {
            return Err(AccessError::from_fault(self, found, None, wrong_target::<T>(found)));
        };
        Ok(items
            .get_mut(self.index)
            .map(|item| item as &mut dyn Reflect))
    }

    #[inline]
    fn to_mutator(&self) -> Result<Arc<dyn Mutator>, AccessError> {
        Ok(self.mirror.clone())
    }

    #[inline]
    fn is_reversible(&self) -> bool {
        true
    }
}

impl<T> fmt::Debug for IndexAccessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexAccessor")
            .field("element", &core::any::type_name::<T>())
            .field("index", &self.index)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// IndexMutator

/// Writes the element at a fixed position of a `Vec<T>`.
///
/// Writing one past the end appends; further positions are out of bounds.
pub struct IndexMutator<T> {
    index: usize,
    slot: ValueSlot,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Element> IndexMutator<T> {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            slot: ValueSlot::of::<T>(),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T: Element> AccessPoint for IndexMutator<T> {
    #[inline]
    fn input(&self) -> Type {
        Vec::<T>::ty()
    }

    #[inline]
    fn input_type_id(&self) -> Option<TypeId> {
        Some(TypeId::of::<Vec<T>>())
    }

    #[inline]
    fn value_slot(&self) -> &ValueSlot {
        &self.slot
    }

    fn description(&self) -> String {
        format!("{}[{}]", self.input(), self.index)
    }

    fn segment(&self) -> String {
        format!("[{}]", self.index)
    }

    fn key(&self) -> AccessKey {
        key::<T>(self.index, Direction::Write)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Index {
            element: self.slot.ty(),
            index: self.index,
        }
    }
}

impl<T: Element> Mutator for IndexMutator<T> {
    fn write(
        &self,
        target: &mut dyn Reflect,
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), AccessError> {
        let found = target.reflect_type_name();
        if let Err(fault) = self.slot.check(value.as_deref()) {
            return Err(AccessError::from_fault(self, found, value.as_deref(), fault));
        }
        let Some(items) = target.downcast_mut::<Vec<T>>() else {
            let fault = wrong_target::<T>(found);
            return Err(AccessError::from_fault(self, found, value.as_deref(), fault));
        };
        let len = items.len();
        if self.index > len {
            let fault = InvokeFault::OutOfBounds {
                index: self.index,
                len,
            };
            return Err(AccessError::from_fault(self, found, value.as_deref(), fault));
        }
        // checked above, only a `T` can be here
        let Some(Ok(item)) = value.map(|value| value.take::<T>()) else {
            return Ok(());
        };
        if self.index == len {
            items.push(item);
        } else {
            items[self.index] = item;
        }
        Ok(())
    }

    #[inline]
    fn to_accessor(&self) -> Result<Arc<dyn Accessor>, AccessError> {
        Ok(Arc::new(IndexAccessor::<T>::new(self.index)))
    }

    #[inline]
    fn is_reversible(&self) -> bool {
        true
    }
}

impl<T> fmt::Debug for IndexMutator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexMutator")
            .field("element", &core::any::type_name::<T>())
            .field("index", &self.index)
            .finish()
    }
}

macro_rules! impl_index_eq {
    ($($ty:ident),*) => {$(
        impl<T: Element> PartialEq for $ty<T> {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                self.index == other.index
            }
        }

        impl<T: Element> Eq for $ty<T> {}

        impl<T: Element> Hash for $ty<T> {
            #[inline]
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.key().hash(state);
            }
        }
    )*};
}

impl_index_eq!(IndexAccessor, IndexMutator);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{IndexAccessor, IndexMutator};
    use crate::error::InvocationKind;
    use crate::fixtures::Phone;
    use crate::point::{AccessPoint, Accessor, Mutator};
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn replace_and_append() {
        let mutator = IndexMutator::<Phone>::new(1);
        let mut phones = vec![Phone::new("1")];
        mutator.write(&mut phones, Some(Box::new(Phone::new("2")))).unwrap();
        assert_eq!(phones, [Phone::new("1"), Phone::new("2")]);

        mutator.write(&mut phones, Some(Box::new(Phone::new("3")))).unwrap();
        assert_eq!(phones[1], Phone::new("3"));

        let err = IndexMutator::<Phone>::new(5)
            .write(&mut phones, Some(Box::new(Phone::new("4"))))
            .unwrap_err();
        assert_eq!(err.invocation_kind(), Some(InvocationKind::OutOfBounds));

        let err = mutator.write(&mut phones, None).unwrap_err();
        assert_eq!(err.invocation_kind(), Some(InvocationKind::IncompatibleValue));
    }

    #[test]
    fn round_trip() {
        let accessor = IndexAccessor::<String>::new(0);
        let mut words: Vec<String> = Vec::new();
        accessor
            .to_mutator()
            .unwrap()
            .set(&mut words, String::from("x"))
            .unwrap();
        let value = accessor.read(&words).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "x");
        assert!(value.is_borrowed());
    }

    #[test]
    fn identity_and_description() {
        let accessor = IndexAccessor::<Phone>::new(2);
        assert_eq!(accessor, IndexAccessor::<Phone>::new(2));
        assert_ne!(accessor, IndexAccessor::<Phone>::new(3));
        assert_eq!(accessor.description(), "[fixtures::Phone][2]");
        assert_eq!(
            accessor.to_mutator().unwrap().to_accessor().unwrap().key(),
            accessor.key()
        );

        let err = accessor.read(&String::new()).unwrap_err();
        assert_eq!(err.invocation_kind(), Some(InvocationKind::WrongTarget));
    }
}
