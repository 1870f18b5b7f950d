//! Provide the structural description of types taking part in property access.
//!
//! ## Menu
//!
//! - [`Primitive`]: The primitive types with their single-letter descriptor codes.
//! - [`Type`]: A descriptor-level type handle, primitive, object (by path) or array.
//! - [`Typed`]: Static mapping from a Rust type to its [`Type`], see
//!   [`impl_typed!`](crate::impl_typed).
//!
//! - [`ValueSlot`]: Type, nullability and default factory of a value position
//!   (a field, a method return, an assigned value).
//! - [`InvokeFault`]: The low-level failure raised while calling into a member.
//! - [`Args`]: Tuples converted from erased argument lists.
//!
//! - Members:
//!     - [`FieldInfo`]: A named field with typed get / get_mut / set functions.
//!     - [`MethodInfo`]: A query (`&self`) or command (`&mut self`) method.
//!     - [`ConstructorInfo`]: A constructor, possibly a synthetic bridge.
//!     - [`MethodBody`]: The erased body of a method, for custom members.
//!
//! - [`TypeInfo`]: A type with its members, nesting ([`TypeKind`]) and parent.
//! - [`Receiver`]: A chain of upcasts from a subtype to one of its ancestors.

// -----------------------------------------------------------------------------
// Modules

mod args;
mod constructor_info;
mod fault;
mod field_info;
mod method_info;
mod slot;
mod ty;
mod type_info;

// -----------------------------------------------------------------------------
// Exports

pub use args::Args;
pub use constructor_info::{CONSTRUCTOR_NAME, ConstructorInfo};
pub use fault::InvokeFault;
pub use field_info::FieldInfo;
pub use method_info::{MethodBody, MethodInfo, MethodKind};
pub use slot::ValueSlot;
pub use ty::{BUILTIN_OBJECTS, Primitive, Type, Typed, method_descriptor};
pub use type_info::{Receiver, TypeInfo, TypeKind, Upcast, Visibility};

// -----------------------------------------------------------------------------
// Helpers

use crate::Reflect;

/// Returns the registered path of `S`, or its Rust name if `S` is not an object type.
pub(crate) fn path_of<S: Typed>() -> &'static str {
    match S::ty() {
        Type::Object(path) => path,
        _ => core::any::type_name::<S>(),
    }
}

/// Downcasts a call target, reporting the expected and actual types on mismatch.
pub(crate) fn target_ref<S: Reflect>(target: &dyn Reflect) -> Result<&S, InvokeFault> {
    target
        .downcast_ref::<S>()
        .ok_or_else(|| InvokeFault::WrongTarget {
            expected: core::any::type_name::<S>(),
            found: target.reflect_type_name(),
        })
}

/// Mutable counterpart of [`target_ref`].
pub(crate) fn target_mut<S: Reflect>(target: &mut dyn Reflect) -> Result<&mut S, InvokeFault> {
    let found = target.reflect_type_name();
    target
        .downcast_mut::<S>()
        .ok_or(InvokeFault::WrongTarget {
            expected: core::any::type_name::<S>(),
            found,
        })
}

/// Takes an assigned value out of its box.
pub(crate) fn take_value<T: Reflect>(
    value: Option<alloc::boxed::Box<dyn Reflect>>,
) -> Result<T, InvokeFault> {
    let value = value.ok_or(InvokeFault::NullValue {
        expected: core::any::type_name::<T>(),
    })?;
    value.take::<T>().map_err(|value| InvokeFault::Incompatible {
        expected: core::any::type_name::<T>(),
        found: value.reflect_type_name(),
    })
}

/// Takes an optional assigned value out of its box.
pub(crate) fn take_optional<T: Reflect>(
    value: Option<alloc::boxed::Box<dyn Reflect>>,
) -> Result<Option<T>, InvokeFault> {
    match value {
        None => Ok(None),
        Some(value) => take_value::<T>(Some(value)).map(Some),
    }
}

/// Downcasts the argument at `index`.
pub(crate) fn arg_ref<'a, T: Reflect>(
    args: &[&'a dyn Reflect],
    index: usize,
) -> Result<&'a T, InvokeFault> {
    let arg = *args.get(index).ok_or(InvokeFault::Arity {
        expected: index + 1,
        found: args.len(),
    })?;
    arg.downcast_ref::<T>().ok_or_else(|| InvokeFault::Argument {
        index,
        expected: core::any::type_name::<T>(),
        found: arg.reflect_type_name(),
    })
}
