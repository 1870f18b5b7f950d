//! Read and write properties of reflected values, whatever form the
//! property is reached through.
//!
//! - [`point`]: single-hop [`Accessor`](point::Accessor)s and
//!   [`Mutator`](point::Mutator)s, by field, method, bound reference,
//!   position or closure. Every access point can produce its mirror.
//! - [`chain`]: multi-hop paths and the policies deciding what happens
//!   when a link reads nothing.
//! - [`definition`]: the `(declaring type, name, member type)` identity
//!   of a property, the comparator built on it and containers keyed by it.
//! - [`AccessConfig`]: cache capacities and the default null policy.
//!
//! Type structure comes from a [`TypeRegistry`]; see `pax_reflect`.
//!
//! [`TypeRegistry`]: pax_reflect::registry::TypeRegistry

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod config;
mod error;

pub mod chain;
pub mod definition;
pub mod point;

#[cfg(test)]
mod fixtures;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use config::AccessConfig;
pub use error::{AccessError, InvocationError, InvocationKind};
