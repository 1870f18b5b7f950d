//! Containers shared by the `pax` crates.
//!
//! - [`hash`]: `hashbrown` maps with a fixed `foldhash` seed.
//! - [`TypeIdMap`]: a map keyed by [`TypeId`](core::any::TypeId).
//! - [`LruCache`]: a bounded map evicting the least recently touched entry.

// -----------------------------------------------------------------------------
// No STD Support

#![no_std]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod lru;
mod typeid_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use lru::LruCache;
pub use typeid_map::TypeIdMap;
