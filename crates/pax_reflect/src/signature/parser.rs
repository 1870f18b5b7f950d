use alloc::vec::Vec;
use core::fmt;

use crate::info::{Primitive, Type, method_descriptor};
use crate::registry::TypeRegistry;
use crate::signature::SignatureError;

/// Maximum number of array markers before a base type.
const MAX_ARRAY_DEPTH: usize = 255;

const PARAMS_START: u8 = b'(';
const PARAMS_END: u8 = b')';

// -----------------------------------------------------------------------------
// SignatureParser

/// Parser for type descriptors.
///
/// Object types are looked up in a [`TypeRegistry`], so a well-formed
/// descriptor naming an unknown type fails with
/// [`SignatureError::TypeNotFound`] rather than
/// [`SignatureError::Malformed`].
///
/// # Examples
///
/// ```
/// use pax_reflect::info::{Primitive, Type};
/// use pax_reflect::registry::TypeRegistry;
/// use pax_reflect::signature::SignatureParser;
///
/// let registry = TypeRegistry::new();
/// let parser = SignatureParser::new(&registry);
///
/// let types = parser.parse_types("I[[LString;Z").unwrap();
/// assert_eq!(types, [
///     Type::Primitive(Primitive::I32),
///     Type::Object("String").array_of().array_of(),
///     Type::Primitive(Primitive::Bool),
/// ]);
///
/// assert!(parser.parse_types("").unwrap().is_empty());
/// assert!(parser.parse_types("LNowhere;").unwrap_err().is_type_not_found());
/// ```
#[derive(Clone, Copy)]
pub struct SignatureParser<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> SignatureParser<'r> {
    #[inline]
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Parses a run of type codes. The empty descriptor yields no types.
    pub fn parse_types(&self, descriptor: &str) -> Result<Vec<Type>, SignatureError> {
        let mut cursor = Cursor::new(descriptor);
        let mut types = Vec::new();
        while !cursor.is_done() {
            types.push(self.next_type(&mut cursor)?);
        }
        Ok(types)
    }

    /// Parses a descriptor made of exactly one type.
    pub fn parse_type(&self, descriptor: &str) -> Result<Type, SignatureError> {
        let mut cursor = Cursor::new(descriptor);
        if cursor.is_done() {
            return Err(cursor.error("expected a type"));
        }
        let ty = self.next_type(&mut cursor)?;
        if !cursor.is_done() {
            return Err(cursor.error("trailing characters after type"));
        }
        Ok(ty)
    }

    /// Parses a member descriptor `(<params>)<return>`.
    pub fn parse_method(&self, descriptor: &str) -> Result<MethodSignature, SignatureError> {
        let mut cursor = Cursor::new(descriptor);
        if cursor.peek() != Some(PARAMS_START) {
            return Err(cursor.error("expected `(`"));
        }
        cursor.advance(1);

        let mut params = Vec::new();
        loop {
            match cursor.peek() {
                Some(PARAMS_END) => break,
                Some(_) => params.push(self.next_type(&mut cursor)?),
                None => return Err(cursor.error("unterminated parameter list")),
            }
        }
        cursor.advance(1);

        let ret = match cursor.peek() {
            None => return Err(cursor.error("missing return type")),
            Some(code) if code == Primitive::VOID_CODE as u8 => {
                cursor.advance(1);
                None
            }
            Some(_) => Some(self.next_type(&mut cursor)?),
        };
        if !cursor.is_done() {
            return Err(cursor.error("trailing characters after return type"));
        }
        Ok(MethodSignature { params, ret })
    }

    fn next_type(&self, cursor: &mut Cursor<'_>) -> Result<Type, SignatureError> {
        // Count the array markers, then resolve the base type.
        let mut depth = 0;
        while cursor.peek() == Some(Type::ARRAY_MARKER as u8) {
            depth += 1;
            if depth > MAX_ARRAY_DEPTH {
                return Err(cursor.error("too many array dimensions"));
            }
            cursor.advance(1);
        }

        let mut ty = match cursor.peek() {
            None => return Err(cursor.error("array marker without element type")),
            Some(code) if code == Type::OBJECT_START as u8 => self.next_object(cursor)?,
            Some(code) => match Primitive::from_code(code as char) {
                Some(primitive) => {
                    cursor.advance(1);
                    Type::Primitive(primitive)
                }
                None if code == Primitive::VOID_CODE as u8 => {
                    return Err(cursor.error("`V` is only valid as a return type"));
                }
                None => return Err(cursor.error("unknown type code")),
            },
        };

        for _ in 0..depth {
            ty = ty.array_of();
        }
        Ok(ty)
    }

    fn next_object(&self, cursor: &mut Cursor<'_>) -> Result<Type, SignatureError> {
        let rest = cursor.rest();
        let Some(end) = rest.find(Type::OBJECT_END) else {
            return Err(cursor.error("unterminated object type"));
        };
        // Skip the leading `L`.
        let name = &rest[1..end];
        if name.is_empty() {
            return Err(cursor.error("empty object type name"));
        }
        let path = self
            .registry
            .resolve_path(name)
            .ok_or_else(|| SignatureError::TypeNotFound { name: name.into() })?;
        cursor.advance(end + 1);
        Ok(Type::Object(path))
    }
}

impl fmt::Debug for SignatureParser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureParser").finish_non_exhaustive()
    }
}

struct Cursor<'a> {
    descriptor: &'a str,
    position: usize,
}

impl<'a> Cursor<'a> {
    #[inline]
    fn new(descriptor: &'a str) -> Self {
        Self {
            descriptor,
            position: 0,
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.descriptor.as_bytes().get(self.position).copied()
    }

    #[inline]
    fn rest(&self) -> &'a str {
        &self.descriptor[self.position..]
    }

    #[inline]
    fn advance(&mut self, count: usize) {
        self.position += count;
    }

    #[inline]
    fn is_done(&self) -> bool {
        self.position >= self.descriptor.len()
    }

    #[inline]
    fn error(&self, reason: &'static str) -> SignatureError {
        SignatureError::malformed(self.descriptor, self.position, reason)
    }
}

// -----------------------------------------------------------------------------
// MethodSignature

/// The parsed form of a member descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub params: Vec<Type>,
    /// `None` for `V`.
    pub ret: Option<Type>,
}

impl MethodSignature {
    /// Parses a member descriptor. Same as [`SignatureParser::parse_method`].
    #[inline]
    pub fn parse(descriptor: &str, parser: &SignatureParser<'_>) -> Result<Self, SignatureError> {
        parser.parse_method(descriptor)
    }

    /// Renders the descriptor back.
    #[inline]
    pub fn descriptor(&self) -> alloc::string::String {
        method_descriptor(&self.params, self.ret.as_ref())
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        match &self.ret {
            Some(ret) => write!(f, ") -> {ret}"),
            None => f.write_str(")"),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
