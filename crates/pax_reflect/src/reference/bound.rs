use alloc::string::String;
use core::fmt;

/// The serialized form of a member reference.
///
/// `signature` is the member's own descriptor. `instantiated_signature` is
/// the descriptor the reference was written against: for methods the
/// receiver comes first, for constructors the constructed type is the
/// return type. The two differ when a subtype's reference points to a
/// member inherited from an ancestor.
///
/// | Reference | `signature` | `instantiated_signature` |
/// |---|---|---|
/// | `Phone::get_number` | `()LString;` | `(Lapp::Phone;)LString;` |
/// | `Phone::set_number` | `(LString;)V` | `(Lapp::Phone;LString;)V` |
/// | `Phone::new` | `(LString;)V` | `(LString;)Lapp::Phone;` |
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SerializedRef {
    pub implementing_type: String,
    pub member_name: String,
    pub signature: String,
    pub instantiated_signature: String,
}

impl fmt::Display for SerializedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}{}",
            self.implementing_type, self.member_name, self.signature
        )
    }
}

/// A callable value that may know which member it was bound to.
///
/// Only reference-like values can describe themselves; arbitrary closures
/// return `None` from [`serialized_form`](Self::serialized_form).
pub trait BoundFunction: Send + Sync {
    /// Returns the member identity of the value, if it is a reference.
    fn serialized_form(&self) -> Option<&SerializedRef>;

    /// Returns the Rust type name of the value, for diagnostics.
    fn type_name(&self) -> &'static str;
}

impl BoundFunction for SerializedRef {
    #[inline]
    fn serialized_form(&self) -> Option<&SerializedRef> {
        Some(self)
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// An arbitrary closure, which cannot describe its target.
///
/// # Examples
///
/// ```
/// use pax_reflect::reference::{BoundFunction, Closure};
///
/// let closure = Closure(|x: &u32| *x + 1);
/// assert!(closure.serialized_form().is_none());
/// assert_eq!((closure.0)(&1), 2);
/// ```
#[derive(Clone, Copy)]
pub struct Closure<F>(pub F);

impl<F: Send + Sync> BoundFunction for Closure<F> {
    #[inline]
    fn serialized_form(&self) -> Option<&SerializedRef> {
        None
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        core::any::type_name::<F>()
    }
}

impl<F> fmt::Debug for Closure<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Closure")
            .field(&core::any::type_name::<F>())
            .finish()
    }
}
