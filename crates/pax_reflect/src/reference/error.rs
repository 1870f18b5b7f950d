use alloc::string::String;
use core::error::Error;
use core::fmt;

use crate::signature::SignatureError;

/// An error raised while resolving a member reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The value is an arbitrary closure, not a member reference.
    UnsupportedReference { type_name: &'static str },
    /// The reference carries an invalid descriptor or names an unknown type.
    Signature(SignatureError),
    /// No member matches the reference.
    MemberNotFound {
        owner: String,
        name: String,
        signature: String,
    },
    /// The member exists but returns another type.
    TypeMismatch {
        member: String,
        expected: String,
        found: String,
    },
    /// The reference points to a bridge or an inner-type member.
    UnsupportedMemberShape { member: String, reason: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedReference { type_name } => write!(
                f,
                "`{type_name}` is not a member reference, only reference-like bound functions expose their target member"
            ),
            Self::Signature(error) => write!(f, "invalid member reference: {error}"),
            Self::MemberNotFound {
                owner,
                name,
                signature,
            } => write!(f, "no member `{owner}::{name}{signature}`"),
            Self::TypeMismatch {
                member,
                expected,
                found,
            } => write!(f, "`{member}` returns `{found}`, the reference expects `{expected}`"),
            Self::UnsupportedMemberShape { member, reason } => {
                write!(f, "cannot resolve `{member}`: {reason}")
            }
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Signature(error) => Some(error),
            _ => None,
        }
    }
}

impl From<SignatureError> for ResolveError {
    #[inline]
    fn from(value: SignatureError) -> Self {
        Self::Signature(value)
    }
}
