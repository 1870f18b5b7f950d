//! Provide the descriptor grammar.
//!
//! A descriptor is a run of type codes:
//!
//! - a single letter for a primitive type, see [`Primitive`],
//! - `L<path>;` for an object type registered under `<path>`,
//! - any number of leading `[` for arrays of the following type.
//!
//! A member descriptor wraps the parameter types in parentheses and
//! appends the return type, or `V` for none: `(I[LString;)V`.
//!
//! [`Primitive`]: crate::info::Primitive

// -----------------------------------------------------------------------------
// Modules

mod error;
mod parser;

// -----------------------------------------------------------------------------
// Exports

pub use error::SignatureError;
pub use parser::{MethodSignature, SignatureParser};
