//! Provide the type registry.
//!
//! ## Menu
//!
//! - [`TypeRegistry`]: The store of [`TypeInfo`]s, by path and by `TypeId`.
//! - [`AutoRegistration`]: A statically submitted `TypeInfo` factory, see
//!   [`auto_register!`](crate::auto_register).
//!
//! ## auto_register
//!
//! See [`TypeRegistry::auto_register`].
//!
//! We use the [`inventory`] crate to collect registrations submitted anywhere
//! in the program. Not all platforms support it (major platforms do); on the
//! others, nothing is collected.
//!
//! [`TypeInfo`]: crate::info::TypeInfo
//! [`inventory`]: https://docs.rs/inventory

// -----------------------------------------------------------------------------
// Modules

mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use type_registry::TypeRegistry;

use crate::info::TypeInfo;

/// A `TypeInfo` factory collected by [`TypeRegistry::auto_register`].
pub struct AutoRegistration(fn() -> TypeInfo);

impl AutoRegistration {
    #[inline]
    pub const fn new(f: fn() -> TypeInfo) -> Self {
        Self(f)
    }

    /// Builds the registration.
    #[inline]
    pub fn type_info(&self) -> TypeInfo {
        (self.0)()
    }
}

#[cfg(feature = "auto_register")]
inventory::collect!(AutoRegistration);

/// Submits a `fn() -> TypeInfo` for [`TypeRegistry::auto_register`].
///
/// Does nothing without the `auto_register` feature.
///
/// # Examples
///
/// ```
/// use pax_reflect::{auto_register, impl_typed};
/// use pax_reflect::info::TypeInfo;
/// use pax_reflect::registry::TypeRegistry;
///
/// #[derive(Debug, Clone, PartialEq, Default)]
/// struct Badge(u32);
/// impl_typed!(Badge as "hr::Badge", default);
///
/// fn badge_info() -> TypeInfo {
///     TypeInfo::new::<Badge>()
/// }
///
/// auto_register!(badge_info);
///
/// let mut registry = TypeRegistry::empty();
/// if registry.auto_register() > 0 {
///     assert!(registry.contains("hr::Badge"));
/// }
/// ```
#[macro_export]
macro_rules! auto_register {
    ($info:path) => {
        $crate::__auto_register_impl!($info);
    };
}

#[cfg(feature = "auto_register")]
#[doc(hidden)]
#[macro_export]
macro_rules! __auto_register_impl {
    ($info:path) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::AutoRegistration::new($info)
        }
    };
}

#[cfg(not(feature = "auto_register"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __auto_register_impl {
    ($info:path) => {};
}
