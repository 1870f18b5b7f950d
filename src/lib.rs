//! Uniform property access over reflected data.
//!
//! - [`reflect`]: the runtime type model, the descriptor grammar and the
//!   member reference resolver.
//! - [`access`]: accessors, mutators, chains, null policies and
//!   cross-representation identity.
//! - [`utils`]: hash containers and the bounded LRU cache.

pub use pax_access as access;
pub use pax_reflect as reflect;
pub use pax_utils as utils;
