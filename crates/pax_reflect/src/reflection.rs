use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

// -----------------------------------------------------------------------------
// Reflect

/// A value that can travel through accessors as `dyn Reflect`.
///
/// Implemented for every `Any + Send + Sync + Clone + PartialEq + Debug` type,
/// so plain data types take part without any ceremony. The structural side
/// (fields, methods, constructors) is described separately by
/// [`TypeInfo`](crate::info::TypeInfo).
///
/// # Examples
///
/// ```
/// use pax_reflect::Reflect;
///
/// let value: Box<dyn Reflect> = Box::new(String::from("Paris"));
/// assert!(value.is::<String>());
/// assert!(value.reflect_eq(&String::from("Paris")));
///
/// let text: String = value.take().unwrap();
/// assert_eq!(text, "Paris");
/// ```
pub trait Reflect: Any + Send + Sync {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Converts a boxed value into `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Returns `self` as `&dyn Reflect`.
    fn as_reflect(&self) -> &dyn Reflect;

    /// Returns `self` as `&mut dyn Reflect`.
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect;

    /// Clones the value into a new box.
    fn clone_value(&self) -> Box<dyn Reflect>;

    /// Returns `true` if `other` has the same type and compares equal.
    fn reflect_eq(&self, other: &dyn Reflect) -> bool;

    /// Formats the value with its `Debug` implementation.
    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// Returns the Rust type name, for diagnostics only.
    fn reflect_type_name(&self) -> &'static str;
}

impl<T> Reflect for T
where
    T: Any + Send + Sync + Clone + PartialEq + fmt::Debug,
{
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    #[inline]
    fn as_reflect(&self) -> &dyn Reflect {
        self
    }

    #[inline]
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect {
        self
    }

    #[inline]
    fn clone_value(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    fn reflect_eq(&self, other: &dyn Reflect) -> bool {
        match other.as_any().downcast_ref::<T>() {
            Some(other) => self == other,
            None => false,
        }
    }

    #[inline]
    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }

    #[inline]
    fn reflect_type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }
}

impl dyn Reflect {
    /// Returns `true` if the underlying value is of type `T`.
    #[inline]
    pub fn is<T: Reflect>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts the value to type `T` by reference.
    #[inline]
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcasts the value to type `T` by mutable reference.
    #[inline]
    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Takes the value out of the box, or gives the box back on a type mismatch.
    pub fn take<T: Reflect>(self: Box<Self>) -> Result<T, Box<dyn Reflect>> {
        if !self.is::<T>() {
            return Err(self);
        }
        match self.into_any().downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => unreachable!("type checked above"),
        }
    }
}

impl fmt::Debug for dyn Reflect {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.reflect_debug(f)
    }
}

// -----------------------------------------------------------------------------
// Value

/// The result of reading a property.
///
/// Fields and projecting getters lend out the target's own storage,
/// computing methods hand over a fresh value.
pub enum Value<'a> {
    /// A view into the target's storage.
    Borrowed(&'a dyn Reflect),
    /// A value produced by the read itself.
    Owned(Box<dyn Reflect>),
}

impl<'a> Value<'a> {
    /// Returns the value as `&dyn Reflect`.
    #[inline]
    pub fn as_reflect(&self) -> &dyn Reflect {
        match self {
            Self::Borrowed(value) => *value,
            Self::Owned(value) => value.as_ref(),
        }
    }

    /// Returns `true` if the value borrows the target's storage.
    #[inline]
    pub fn is_borrowed(&self) -> bool {
        matches!(self, Self::Borrowed(_))
    }

    /// Converts into an owned box, cloning borrowed values.
    pub fn into_owned(self) -> Box<dyn Reflect> {
        match self {
            Self::Borrowed(value) => value.clone_value(),
            Self::Owned(value) => value,
        }
    }

    /// Releases the borrow of the target, cloning if necessary.
    #[inline]
    pub fn detach(self) -> Value<'static> {
        Value::Owned(self.into_owned())
    }

    /// Downcasts the value to type `T` by reference.
    #[inline]
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_reflect().downcast_ref::<T>()
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Borrowed(value) => f.debug_tuple("Borrowed").field(value).finish(),
            Self::Owned(value) => f.debug_tuple("Owned").field(value).finish(),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Reflect, Value};
    use alloc::boxed::Box;
    use alloc::string::String;

    #[test]
    fn take_gives_box_back_on_mismatch() {
        let value: Box<dyn Reflect> = Box::new(7_i32);
        let value = value.take::<String>().unwrap_err();
        assert_eq!(value.take::<i32>().unwrap(), 7);
    }

    #[test]
    fn detach_clones_borrowed() {
        let text = String::from("Lyon");
        let value = Value::Borrowed(&text);
        assert!(value.is_borrowed());
        let value = value.detach();
        assert!(!value.is_borrowed());
        assert_eq!(value.downcast_ref::<String>().unwrap(), "Lyon");
    }

    #[test]
    fn reflect_eq_requires_same_type() {
        assert!(1_i32.reflect_eq(&1_i32));
        assert!(!1_i32.reflect_eq(&1_i64));
    }
}
