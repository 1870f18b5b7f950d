use alloc::boxed::Box;
use core::error::Error;
use core::fmt;

/// A failure raised while calling into a field, method or constructor.
///
/// Faults are deliberately low-level: they name Rust types, not members.
/// Callers that know which property was being accessed wrap them into a
/// richer error.
#[derive(Debug)]
pub enum InvokeFault {
    /// The target is not an instance of the declaring type.
    WrongTarget {
        expected: &'static str,
        found: &'static str,
    },
    /// The number of arguments does not match the parameter list.
    Arity { expected: usize, found: usize },
    /// An argument has the wrong type.
    Argument {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
    /// The assigned value has the wrong type.
    Incompatible {
        expected: &'static str,
        found: &'static str,
    },
    /// An absent value was assigned to a non-nullable slot.
    NullValue { expected: &'static str },
    /// The target itself is absent.
    NullTarget,
    /// A positional access past the end of a sequence.
    OutOfBounds { index: usize, len: usize },
    /// The member cannot perform the requested operation.
    Unsupported(&'static str),
    /// The member body raised its own error.
    Raised(Box<dyn Error + Send + Sync>),
}

impl InvokeFault {
    /// Wraps an error raised by a member body.
    #[inline]
    pub fn raise(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Raised(error.into())
    }

    /// Returns `true` for faults raised by the member body itself.
    #[inline]
    pub fn is_raised(&self) -> bool {
        matches!(self, Self::Raised(_))
    }
}

impl fmt::Display for InvokeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongTarget { expected, found } => {
                write!(f, "target is a `{found}`, expected a `{expected}`")
            }
            Self::Arity { expected, found } => {
                write!(f, "expected {expected} argument(s), got {found}")
            }
            Self::Argument {
                index,
                expected,
                found,
            } => write!(f, "argument {index} is a `{found}`, expected a `{expected}`"),
            Self::Incompatible { expected, found } => {
                write!(f, "cannot assign a `{found}` to a `{expected}`")
            }
            Self::NullValue { expected } => {
                write!(f, "cannot assign an absent value to a non-nullable `{expected}`")
            }
            Self::NullTarget => f.write_str("target is absent"),
            Self::OutOfBounds { index, len } => {
                write!(f, "index {index} is out of bounds for length {len}")
            }
            Self::Unsupported(operation) => write!(f, "member does not support {operation}"),
            Self::Raised(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl Error for InvokeFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Raised(error) => error.source(),
            _ => None,
        }
    }
}
