use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use crate::info::{Args, CONSTRUCTOR_NAME, Type, Typed, method_descriptor, path_of};
use crate::reference::{BoundFunction, SerializedRef};

/// A function bound to a known member.
///
/// Rust functions cannot be asked which method they are, so a member
/// reference is built by naming the member next to the function. The
/// descriptor is derived from the function's type, which keeps the two in
/// step.
///
/// # Examples
///
/// ```
/// use pax_reflect::impl_typed;
/// use pax_reflect::reference::{BoundFunction, MemberRef};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Phone { number: String }
/// impl Phone {
///     fn get_number(&self) -> &String { &self.number }
/// }
/// impl_typed!(Phone as "app::Phone");
///
/// let reference = MemberRef::getter::<Phone, String>("get_number", Phone::get_number);
/// let form = reference.serialized_form().unwrap();
/// assert_eq!(form.implementing_type, "app::Phone");
/// assert_eq!(form.signature, "()LString;");
/// assert_eq!(form.instantiated_signature, "(Lapp::Phone;)LString;");
///
/// let get = reference.function::<fn(&Phone) -> &String>().unwrap();
/// assert_eq!(get(&Phone { number: "911".into() }), "911");
/// ```
#[derive(Clone)]
pub struct MemberRef {
    form: SerializedRef,
    function: Arc<dyn Any + Send + Sync>,
}

impl MemberRef {
    fn method<S: Typed>(
        name: &str,
        params: &[Type],
        ret: Option<&Type>,
        function: impl Any + Send + Sync,
    ) -> Self {
        let mut instantiated = alloc::vec![S::ty()];
        instantiated.extend_from_slice(params);
        Self {
            form: SerializedRef {
                implementing_type: path_of::<S>().into(),
                member_name: name.into(),
                signature: method_descriptor(params, ret),
                instantiated_signature: method_descriptor(&instantiated, ret),
            },
            function: Arc::new(function),
        }
    }

    /// A reference to `fn(&self) -> &T`.
    pub fn getter<S: Typed, T: Typed>(name: &str, f: fn(&S) -> &T) -> Self {
        Self::method::<S>(name, &[], Some(&T::ty()), f)
    }

    /// A reference to `fn(&self) -> Option<&T>`.
    pub fn getter_opt<S: Typed, T: Typed>(name: &str, f: fn(&S) -> Option<&T>) -> Self {
        Self::method::<S>(name, &[], Some(&T::ty()), f)
    }

    /// A reference to `fn(&self) -> T`.
    pub fn computed<S: Typed, T: Typed>(name: &str, f: fn(&S) -> T) -> Self {
        Self::method::<S>(name, &[], Some(&T::ty()), f)
    }

    /// A reference to `fn(&self, &K) -> Option<&T>`.
    pub fn lookup<S: Typed, K: Typed, T: Typed>(
        name: &str,
        f: for<'a> fn(&'a S, &K) -> Option<&'a T>,
    ) -> Self {
        Self::method::<S>(name, &[K::ty()], Some(&T::ty()), f)
    }

    /// A reference to `fn(&mut self, T)`.
    pub fn setter<S: Typed, T: Typed>(name: &str, f: fn(&mut S, T)) -> Self {
        Self::method::<S>(name, &[T::ty()], None, f)
    }

    /// A reference to `fn(&mut self, Option<T>)`.
    pub fn setter_opt<S: Typed, T: Typed>(name: &str, f: fn(&mut S, Option<T>)) -> Self {
        Self::method::<S>(name, &[T::ty()], None, f)
    }

    /// A reference to a constructor taking its arguments as a tuple.
    pub fn constructor<S: Typed, A: Args>(f: fn(A) -> S) -> Self {
        let params = A::types();
        Self {
            form: SerializedRef {
                implementing_type: path_of::<S>().into(),
                member_name: CONSTRUCTOR_NAME.into(),
                signature: method_descriptor(&params, None),
                instantiated_signature: method_descriptor(&params, Some(&S::ty())),
            },
            function: Arc::new(f),
        }
    }

    /// A reference with an explicitly given form, such as one received
    /// from another process or produced by a bridge.
    pub fn from_form(form: SerializedRef, function: impl Any + Send + Sync) -> Self {
        Self {
            form,
            function: Arc::new(function),
        }
    }

    /// Records that the reference was written against the subtype `Sub`.
    ///
    /// Only the receiver of the instantiated signature changes, the member
    /// stays the one of the implementing type. Constructor references are
    /// returned unchanged.
    pub fn instantiated_as<Sub: Typed>(mut self) -> Self {
        if self.is_constructor() {
            return self;
        }
        if let Some(end) = self.form.signature.find(')') {
            // `(<params>)<ret>` becomes `(<Sub><params>)<ret>`
            let (params, ret) = self.form.signature.split_at(end);
            self.form.instantiated_signature =
                format!("({}{}{}", Sub::ty().descriptor(), &params[1..], ret);
        }
        self
    }

    /// Returns `true` if the reference targets a constructor.
    #[inline]
    pub fn is_constructor(&self) -> bool {
        self.form.member_name == CONSTRUCTOR_NAME
    }

    #[inline]
    pub fn form(&self) -> &SerializedRef {
        &self.form
    }

    /// Returns the bound function if it has type `F`.
    #[inline]
    pub fn function<F: Any>(&self) -> Option<&F> {
        self.function.downcast_ref::<F>()
    }
}

impl BoundFunction for MemberRef {
    #[inline]
    fn serialized_form(&self) -> Option<&SerializedRef> {
        Some(&self.form)
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

impl fmt::Debug for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MemberRef").field(&self.form).finish()
    }
}

impl PartialEq for MemberRef {
    fn eq(&self, other: &Self) -> bool {
        self.form == other.form
    }
}

impl Eq for MemberRef {}

// -----------------------------------------------------------------------------
// Tests
