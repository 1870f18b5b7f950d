use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;
use std::collections::{HashMap, HashSet};

use crate::Reflect;

// -----------------------------------------------------------------------------
// Primitive

/// Primitive types and their single-letter descriptor codes.
///
/// | Code | Type | Code | Type |
/// |---|---|---|---|
/// | `Z` | `bool` | `b` | `u8` |
/// | `B` | `i8` | `s` | `u16` |
/// | `S` | `i16` | `i` | `u32` |
/// | `I` | `i32` | `j` | `u64` |
/// | `J` | `i64` | `w` | `usize` |
/// | `F` | `f32` | `W` | `isize` |
/// | `D` | `f64` | `C` | `char` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Primitive {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Char,
}

impl Primitive {
    /// Reserved code for `void`, only valid in return position.
    pub const VOID_CODE: char = 'V';

    /// Returns the descriptor code.
    pub const fn code(self) -> char {
        match self {
            Self::Bool => 'Z',
            Self::I8 => 'B',
            Self::I16 => 'S',
            Self::I32 => 'I',
            Self::I64 => 'J',
            Self::Isize => 'W',
            Self::U8 => 'b',
            Self::U16 => 's',
            Self::U32 => 'i',
            Self::U64 => 'j',
            Self::Usize => 'w',
            Self::F32 => 'F',
            Self::F64 => 'D',
            Self::Char => 'C',
        }
    }

    /// Maps a descriptor code back to its primitive.
    pub const fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'Z' => Self::Bool,
            'B' => Self::I8,
            'S' => Self::I16,
            'I' => Self::I32,
            'J' => Self::I64,
            'W' => Self::Isize,
            'b' => Self::U8,
            's' => Self::U16,
            'i' => Self::U32,
            'j' => Self::U64,
            'w' => Self::Usize,
            'F' => Self::F32,
            'D' => Self::F64,
            'C' => Self::Char,
            _ => return None,
        })
    }

    /// Returns the Rust spelling of the type.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
        }
    }
}

// -----------------------------------------------------------------------------
// Type

/// A type handle as it appears in descriptors.
///
/// Object types are identified by their registered path. Generic arguments
/// are erased: `HashSet<u8>` and `HashSet<String>` are both `HashSet`.
///
/// # Examples
///
/// ```
/// use pax_reflect::info::{Primitive, Type, Typed};
///
/// assert_eq!(i32::ty(), Type::Primitive(Primitive::I32));
/// assert_eq!(<Vec<Vec<String>>>::ty().descriptor(), "[[LString;");
/// assert_eq!(<Vec<u8>>::ty().to_string(), "[u8]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    Primitive(Primitive),
    Object(&'static str),
    Array(Box<Type>),
}

impl Type {
    /// Marker preceding an array's element type.
    pub const ARRAY_MARKER: char = '[';
    /// Marker starting an object type.
    pub const OBJECT_START: char = 'L';
    /// Terminator of an object type.
    pub const OBJECT_END: char = ';';

    /// Returns the type of `T`.
    #[inline]
    pub fn of<T: Typed>() -> Self {
        T::ty()
    }

    /// Wraps the type into an array.
    #[inline]
    pub fn array_of(self) -> Self {
        Self::Array(Box::new(self))
    }

    /// Returns the path of an object type.
    #[inline]
    pub fn object_path(&self) -> Option<&'static str> {
        match self {
            Self::Object(path) => Some(path),
            _ => None,
        }
    }

    /// Returns the element type of an array.
    #[inline]
    pub fn element(&self) -> Option<&Type> {
        match self {
            Self::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Renders the descriptor of this type.
    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    /// Appends the descriptor of this type to `out`.
    pub fn write_descriptor(&self, out: &mut String) {
        match self {
            Self::Primitive(primitive) => out.push(primitive.code()),
            Self::Object(path) => {
                out.push(Self::OBJECT_START);
                out.push_str(path);
                out.push(Self::OBJECT_END);
            }
            Self::Array(element) => {
                out.push(Self::ARRAY_MARKER);
                element.write_descriptor(out);
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => f.write_str(primitive.name()),
            Self::Object(path) => f.write_str(path),
            Self::Array(element) => write!(f, "[{element}]"),
        }
    }
}

/// Renders a member descriptor `(<params>)<return>`, `V` for no return.
pub fn method_descriptor(params: &[Type], ret: Option<&Type>) -> String {
    let mut out = String::from("(");
    for param in params {
        param.write_descriptor(&mut out);
    }
    out.push(')');
    match ret {
        Some(ret) => ret.write_descriptor(&mut out),
        None => out.push(Primitive::VOID_CODE),
    }
    out
}

// -----------------------------------------------------------------------------
// Typed

/// Static mapping from a Rust type to its [`Type`].
///
/// Implement it for your own types with [`impl_typed!`](crate::impl_typed).
pub trait Typed: Reflect + Sized {
    /// Returns the descriptor-level type.
    fn ty() -> Type;

    /// Returns a fresh default instance, if the type has one.
    ///
    /// Used to vivify absent intermediate values.
    #[inline]
    fn default_value() -> Option<Box<dyn Reflect>> {
        None
    }
}

/// Implements [`Typed`] for a type under a fixed path.
///
/// Append `, default` to use the type's `Default` implementation for
/// auto-vivification.
///
/// # Examples
///
/// ```
/// use pax_reflect::impl_typed;
/// use pax_reflect::info::{Type, Typed};
///
/// #[derive(Debug, Clone, PartialEq, Default)]
/// struct City { name: String }
///
/// impl_typed!(City as "geo::City", default);
///
/// assert_eq!(City::ty(), Type::Object("geo::City"));
/// assert!(City::default_value().is_some());
/// ```
#[macro_export]
macro_rules! impl_typed {
    ($ty:ty as $path:literal) => {
        impl $crate::info::Typed for $ty {
            #[inline]
            fn ty() -> $crate::info::Type {
                $crate::info::Type::Object($path)
            }
        }
    };
    ($ty:ty as $path:literal, default) => {
        impl $crate::info::Typed for $ty {
            #[inline]
            fn ty() -> $crate::info::Type {
                $crate::info::Type::Object($path)
            }

            #[inline]
            fn default_value()
            -> $crate::__macro_exports::Option<$crate::__macro_exports::Box<dyn $crate::Reflect>> {
                $crate::__macro_exports::Option::Some($crate::__macro_exports::Box::new(
                    <$ty as ::core::default::Default>::default(),
                ))
            }
        }
    };
}

macro_rules! impl_primitive {
    ($($ty:ty => $primitive:ident),* $(,)?) => {
        $(
            impl Typed for $ty {
                #[inline]
                fn ty() -> Type {
                    Type::Primitive(Primitive::$primitive)
                }

                #[inline]
                fn default_value() -> Option<Box<dyn Reflect>> {
                    Some(Box::new(<$ty>::default()))
                }
            }
        )*
    };
}

impl_primitive! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    char => Char,
}

impl Typed for String {
    #[inline]
    fn ty() -> Type {
        Type::Object("String")
    }

    #[inline]
    fn default_value() -> Option<Box<dyn Reflect>> {
        Some(Box::new(String::new()))
    }
}

impl<T: Typed + Clone + PartialEq + fmt::Debug> Typed for Vec<T> {
    #[inline]
    fn ty() -> Type {
        T::ty().array_of()
    }

    #[inline]
    fn default_value() -> Option<Box<dyn Reflect>> {
        Some(Box::new(Vec::<T>::new()))
    }
}

impl<T: Typed + Clone + PartialEq + fmt::Debug> Typed for VecDeque<T> {
    #[inline]
    fn ty() -> Type {
        Type::Object("VecDeque")
    }

    #[inline]
    fn default_value() -> Option<Box<dyn Reflect>> {
        Some(Box::new(VecDeque::<T>::new()))
    }
}

impl<T: Typed + Clone + Ord + fmt::Debug> Typed for BTreeSet<T> {
    #[inline]
    fn ty() -> Type {
        Type::Object("BTreeSet")
    }

    #[inline]
    fn default_value() -> Option<Box<dyn Reflect>> {
        Some(Box::new(BTreeSet::<T>::new()))
    }
}

impl<K, V> Typed for BTreeMap<K, V>
where
    K: Typed + Clone + Ord + fmt::Debug,
    V: Typed + Clone + PartialEq + fmt::Debug,
{
    #[inline]
    fn ty() -> Type {
        Type::Object("BTreeMap")
    }

    #[inline]
    fn default_value() -> Option<Box<dyn Reflect>> {
        Some(Box::new(BTreeMap::<K, V>::new()))
    }
}

impl<T: Typed + Clone + Eq + Hash + fmt::Debug> Typed for HashSet<T> {
    #[inline]
    fn ty() -> Type {
        Type::Object("HashSet")
    }

    #[inline]
    fn default_value() -> Option<Box<dyn Reflect>> {
        Some(Box::new(HashSet::<T>::new()))
    }
}

impl<K, V> Typed for HashMap<K, V>
where
    K: Typed + Clone + Eq + Hash + fmt::Debug,
    V: Typed + Clone + PartialEq + fmt::Debug,
{
    #[inline]
    fn ty() -> Type {
        Type::Object("HashMap")
    }

    #[inline]
    fn default_value() -> Option<Box<dyn Reflect>> {
        Some(Box::new(HashMap::<K, V>::new()))
    }
}

/// Object types known without registration.
pub const BUILTIN_OBJECTS: &[&str] = &[
    "String", "VecDeque", "BTreeSet", "BTreeMap", "HashSet", "HashMap",
];

// -----------------------------------------------------------------------------
// Tests
