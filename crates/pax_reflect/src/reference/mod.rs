//! Provide reference-like bound functions and member resolution.
//!
//! ## Menu
//!
//! - [`BoundFunction`]: A callable value that may describe the member it was bound to.
//!     - [`MemberRef`]: A function bound to a named member, carrying its [`SerializedRef`].
//!     - [`Closure`]: An arbitrary closure, which describes nothing.
//!
//! - [`MemberResolver`]: Turns a reference back into the registered [`Member`],
//!   with a bounded LRU cache.
//! - [`ReferenceMetadata`]: The identity of a reference before member lookup.
//! - [`ResolveError`]: Why a reference could not be resolved.

// -----------------------------------------------------------------------------
// Modules

mod bound;
mod error;
mod member;
mod resolver;

// -----------------------------------------------------------------------------
// Exports

pub use bound::{BoundFunction, Closure, SerializedRef};
pub use error::ResolveError;
pub use member::MemberRef;
pub use resolver::{DEFAULT_CACHE_CAPACITY, Member, MemberResolver, ReferenceMetadata};
