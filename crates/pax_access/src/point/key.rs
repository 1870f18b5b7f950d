use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// How an access point reaches its property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessKind {
    Field,
    Method,
    Reference,
    Index,
    Synthetic,
    Chain,
}

/// Whether an access point reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Read,
    Write,
}

/// The identity of an access point.
///
/// Two access points of the same kind and direction are equal when their
/// member signature and bound parameters are equal. Visibility plays no
/// part.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccessKey {
    pub kind: AccessKind,
    pub direction: Direction,
    pub signature: String,
    /// `Debug` renderings of the bound parameters.
    pub params: Vec<String>,
}

impl AccessKey {
    #[inline]
    pub fn new(kind: AccessKind, direction: Direction, signature: String) -> Self {
        Self {
            kind,
            direction,
            signature,
            params: Vec::new(),
        }
    }

    #[inline]
    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }
}

impl fmt::Display for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} {}", self.direction, self.kind, self.signature)?;
        if !self.params.is_empty() {
            write!(f, " [{}]", self.params.join(", "))?;
        }
        Ok(())
    }
}
