use alloc::string::String;
use core::error::Error;
use core::fmt;

/// An error raised while parsing a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The descriptor does not follow the grammar.
    Malformed {
        descriptor: String,
        position: usize,
        reason: &'static str,
    },
    /// The descriptor is well-formed but names an unregistered object type.
    TypeNotFound { name: String },
}

impl SignatureError {
    #[inline]
    pub(crate) fn malformed(descriptor: &str, position: usize, reason: &'static str) -> Self {
        Self::Malformed {
            descriptor: descriptor.into(),
            position,
            reason,
        }
    }

    /// Returns `true` for well-formed descriptors naming an unknown type.
    #[inline]
    pub fn is_type_not_found(&self) -> bool {
        matches!(self, Self::TypeNotFound { .. })
    }
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed {
                descriptor,
                position,
                reason,
            } => write!(
                f,
                "malformed descriptor `{descriptor}` at position {position}: {reason}"
            ),
            Self::TypeNotFound { name } => write!(f, "type `{name}` is not registered"),
        }
    }
}

impl Error for SignatureError {}
