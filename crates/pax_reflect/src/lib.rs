//! Runtime type model for property access.
//!
//! Rust has no runtime reflection, so the structure of every type taking part
//! in property access is described once, explicitly, with [`TypeInfo`]
//! values stored in a [`TypeRegistry`]:
//!
//! - [`info`]: [`Type`] handles, [`Typed`], fields, methods, constructors.
//! - [`registry`]: the [`TypeRegistry`] and optional automatic registration.
//! - [`signature`]: the compact descriptor grammar and its parser.
//! - [`reference`]: reference-like bound functions and the
//!   [`MemberResolver`] recovering the member they were bound to.
//!
//! [`TypeInfo`]: info::TypeInfo
//! [`TypeRegistry`]: registry::TypeRegistry
//! [`Type`]: info::Type
//! [`Typed`]: info::Typed
//! [`MemberResolver`]: reference::MemberResolver

// -----------------------------------------------------------------------------
// Extern Self

// Lets `impl_typed!` expand to `pax_reflect::...` inside this crate's tests.
extern crate self as pax_reflect;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod reflection;

pub mod info;
pub mod reference;
pub mod registry;
pub mod signature;

#[cfg(test)]
mod fixtures;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports {
    pub use alloc::boxed::Box;
    pub use core::option::Option;

    #[cfg(feature = "auto_register")]
    pub use inventory;
}

pub use reflection::{Reflect, Value};
