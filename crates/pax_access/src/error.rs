use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use core::error::Error;
use core::fmt;

use pax_reflect::Reflect;
use pax_reflect::info::InvokeFault;
use pax_reflect::reference::ResolveError;
use pax_reflect::signature::SignatureError;

use crate::point::AccessPoint;

// -----------------------------------------------------------------------------
// AccessError

/// An error raised by an access point, a chain or a definition lookup.
#[derive(Debug)]
pub enum AccessError {
    /// A bound value is not reference-like and cannot be introspected.
    UnsupportedReference { type_name: &'static str },
    /// A reference carries an invalid descriptor or names an unknown type.
    Signature(SignatureError),
    /// No member with the requested name and shape exists.
    MemberNotFound { owner: String, name: String },
    /// A member or link has another type than the one requested.
    TypeMismatch {
        point: String,
        expected: String,
        found: String,
    },
    /// The opposite-direction access point cannot be produced.
    NonReversible { point: String },
    /// A chain link read nothing and the null policy is fail.
    NullTraversal {
        path: String,
        position: usize,
        link: String,
    },
    /// The underlying read or write failed.
    Invocation(InvocationError),
    /// A reference points to a construct that cannot be unwrapped.
    UnsupportedMemberShape { member: String, reason: String },
    /// No default instance could be built for a vivified link.
    Uninstantiable { ty: String, link: String },
    /// A link of a chain failed.
    Chain {
        path: String,
        position: usize,
        source: Box<AccessError>,
    },
    /// A member body raised its own error.
    Raised(Box<dyn Error + Send + Sync>),
}

impl AccessError {
    /// Classifies a low-level fault raised while accessing `point` on a
    /// value of type `target`.
    ///
    /// Faults raised by member bodies pass through unchanged.
    pub fn from_fault(
        point: &dyn AccessPoint,
        target: &'static str,
        value: Option<&dyn Reflect>,
        fault: InvokeFault,
    ) -> Self {
        Self::from_write_fault(point, target, value.map(render_value), fault)
    }

    /// Like [`from_fault`](Self::from_fault), for a value already rendered
    /// with [`render_value`] before it was moved into the write.
    pub(crate) fn from_write_fault(
        point: &dyn AccessPoint,
        target: &'static str,
        value: Option<String>,
        fault: InvokeFault,
    ) -> Self {
        match (InvocationKind::classify(&fault), fault) {
            (Some(kind), fault) => Self::Invocation(InvocationError {
                kind,
                point: point.description(),
                target,
                value,
                fault,
            }),
            (None, InvokeFault::Raised(error)) => Self::Raised(error),
            (None, fault) => Self::Raised(Box::new(fault)),
        }
    }

    /// Wraps an error raised by link `position` of the chain `path`.
    pub(crate) fn in_chain(path: String, position: usize, source: AccessError) -> Self {
        Self::Chain {
            path,
            position,
            source: Box::new(source),
        }
    }

    /// Returns the error with every chain layer removed.
    pub fn innermost(&self) -> &AccessError {
        let mut error = self;
        while let Self::Chain { source, .. } = error {
            error = source;
        }
        error
    }

    /// Returns the kind of a failed invocation, if this is one.
    pub fn invocation_kind(&self) -> Option<InvocationKind> {
        match self.innermost() {
            Self::Invocation(error) => Some(error.kind),
            _ => None,
        }
    }
}

/// `Debug` rendering of a written value, as carried by [`InvocationError::value`].
pub(crate) fn render_value(value: &dyn Reflect) -> String {
    format!("{value:?}")
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedReference { type_name } => write!(
                f,
                "`{type_name}` is not a member reference, only reference-like bound functions can back an access point"
            ),
            Self::Signature(error) => write!(f, "invalid member reference: {error}"),
            Self::MemberNotFound { owner, name } => {
                write!(f, "no compatible member `{name}` on `{owner}`")
            }
            Self::TypeMismatch {
                point,
                expected,
                found,
            } => write!(f, "`{point}`: expected `{expected}`, found `{found}`"),
            Self::NonReversible { point } => write!(
                f,
                "`{point}` is not reversible: no matching accessor, mutator or field"
            ),
            Self::NullTraversal {
                path,
                position,
                link,
            } => write!(f, "`{path}`: link {position} `{link}` read nothing"),
            Self::Invocation(error) => fmt::Display::fmt(error, f),
            Self::UnsupportedMemberShape { member, reason } => {
                write!(f, "cannot use `{member}`: {reason}")
            }
            Self::Uninstantiable { ty, link } => {
                write!(f, "cannot vivify `{link}`: no default instance of `{ty}`")
            }
            Self::Chain {
                path,
                position,
                source,
            } => write!(f, "`{path}` failed at link {position}: {source}"),
            Self::Raised(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl Error for AccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Signature(error) => Some(error),
            Self::Invocation(error) => Some(error),
            Self::Chain { source, .. } => Some(source.as_ref()),
            Self::Raised(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

impl From<ResolveError> for AccessError {
    fn from(value: ResolveError) -> Self {
        match value {
            ResolveError::UnsupportedReference { type_name } => {
                Self::UnsupportedReference { type_name }
            }
            ResolveError::Signature(error) => Self::Signature(error),
            ResolveError::MemberNotFound {
                owner,
                name,
                signature,
            } => Self::MemberNotFound {
                owner,
                name: format!("{name}{signature}"),
            },
            ResolveError::TypeMismatch {
                member,
                expected,
                found,
            } => Self::TypeMismatch {
                point: member,
                expected,
                found,
            },
            ResolveError::UnsupportedMemberShape { member, reason } => {
                Self::UnsupportedMemberShape { member, reason }
            }
        }
    }
}

impl From<InvocationError> for AccessError {
    #[inline]
    fn from(value: InvocationError) -> Self {
        Self::Invocation(value)
    }
}

// -----------------------------------------------------------------------------
// InvocationError

/// The classes of failed reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationKind {
    NullTarget,
    WrongTarget,
    Arity,
    ArgumentType,
    IncompatibleValue,
    OutOfBounds,
    Unsupported,
}

impl InvocationKind {
    /// Returns `None` for faults raised by the member body.
    pub fn classify(fault: &InvokeFault) -> Option<Self> {
        match fault {
            InvokeFault::NullTarget => Some(Self::NullTarget),
            InvokeFault::WrongTarget { .. } => Some(Self::WrongTarget),
            InvokeFault::Arity { .. } => Some(Self::Arity),
            InvokeFault::Argument { .. } => Some(Self::ArgumentType),
            InvokeFault::Incompatible { .. } | InvokeFault::NullValue { .. } => {
                Some(Self::IncompatibleValue)
            }
            InvokeFault::OutOfBounds { .. } => Some(Self::OutOfBounds),
            InvokeFault::Unsupported(_) => Some(Self::Unsupported),
            InvokeFault::Raised(_) => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::NullTarget => "null target",
            Self::WrongTarget => "wrong declaring type",
            Self::Arity => "wrong argument count",
            Self::ArgumentType => "argument type mismatch",
            Self::IncompatibleValue => "incompatible value",
            Self::OutOfBounds => "index out of bounds",
            Self::Unsupported => "unsupported operation",
        }
    }
}

impl fmt::Display for InvocationKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A read or write that failed inside the accessed member.
///
/// The original [`InvokeFault`] is kept as the [`source`](Error::source).
#[derive(Debug)]
pub struct InvocationError {
    kind: InvocationKind,
    point: String,
    target: &'static str,
    value: Option<String>,
    fault: InvokeFault,
}

impl InvocationError {
    #[inline]
    pub fn kind(&self) -> InvocationKind {
        self.kind
    }

    /// Description of the access point.
    #[inline]
    pub fn point(&self) -> &str {
        &self.point
    }

    /// Type name of the target.
    #[inline]
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// `Debug` rendering of the written value, for writes.
    #[inline]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    #[inline]
    pub fn fault(&self) -> &InvokeFault {
        &self.fault
    }
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in `{}` on `{}`", self.kind, self.point, self.target)?;
        if let Some(value) = &self.value {
            write!(f, " with value `{value}`")?;
        }
        Ok(())
    }
}

impl Error for InvocationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.fault)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{AccessError, InvocationKind};
    use alloc::string::{String, ToString};
    use core::error::Error;
    use pax_reflect::reference::ResolveError;

    #[test]
    fn chain_layers_are_transparent() {
        let inner = AccessError::NullTraversal {
            path: String::from("a.b.c"),
            position: 1,
            link: String::from("b"),
        };
        let outer = AccessError::in_chain(
            String::from("x.a.b.c"),
            0,
            AccessError::in_chain(String::from("a.b.c"), 1, inner),
        );
        assert!(matches!(outer.innermost(), AccessError::NullTraversal { position: 1, .. }));
        assert!(outer.invocation_kind().is_none());
        assert_eq!(
            outer.to_string(),
            "`x.a.b.c` failed at link 0: `a.b.c` failed at link 1: `a.b.c`: link 1 `b` read nothing"
        );
        assert!(outer.source().is_some());
    }

    #[test]
    fn resolve_errors_convert() {
        let error = AccessError::from(ResolveError::MemberNotFound {
            owner: String::from("app::Phone"),
            name: String::from("getNumber"),
            signature: String::from("(Lapp/Phone;)LString;"),
        });
        let AccessError::MemberNotFound { owner, name } = &error else {
            panic!("unexpected {error:?}");
        };
        assert_eq!(owner, "app::Phone");
        assert_eq!(name, "getNumber(Lapp/Phone;)LString;");
    }

    #[test]
    fn kinds_render() {
        assert_eq!(InvocationKind::OutOfBounds.to_string(), "index out of bounds");
    }
}
