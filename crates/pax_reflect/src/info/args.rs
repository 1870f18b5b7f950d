use alloc::vec;
use alloc::vec::Vec;

use crate::Reflect;
use crate::info::{InvokeFault, Type, Typed, arg_ref};

/// A tuple of typed arguments built from an erased argument list.
///
/// Implemented for `()`, `(A,)`, `(A, B)` and `(A, B, C)`.
///
/// # Examples
///
/// ```
/// use pax_reflect::Reflect;
/// use pax_reflect::info::Args;
///
/// let name = String::from("Lyon");
/// let args: [&dyn Reflect; 2] = [&name, &7_u32];
///
/// let (name, zip) = <(String, u32)>::from_args(&args).unwrap();
/// assert_eq!((name.as_str(), zip), ("Lyon", 7));
/// assert!(<(String,)>::from_args(&args).is_err());
/// ```
pub trait Args: Sized + Send + Sync + 'static {
    /// Number of arguments.
    const ARITY: usize;

    /// Returns the parameter types in order.
    fn types() -> Vec<Type>;

    /// Clones the arguments out of an erased list.
    fn from_args(args: &[&dyn Reflect]) -> Result<Self, InvokeFault>;
}

macro_rules! impl_args {
    ($arity:literal $(, $name:ident : $index:tt)*) => {
        impl<$($name: Typed + Clone),*> Args for ($($name,)*) {
            const ARITY: usize = $arity;

            #[inline]
            fn types() -> Vec<Type> {
                vec![$($name::ty()),*]
            }

            fn from_args(args: &[&dyn Reflect]) -> Result<Self, InvokeFault> {
                if args.len() != $arity {
                    return Err(InvokeFault::Arity {
                        expected: $arity,
                        found: args.len(),
                    });
                }
                Ok(($(arg_ref::<$name>(args, $index)?.clone(),)*))
            }
        }
    };
}

impl_args!(0);
impl_args!(1, A: 0);
impl_args!(2, A: 0, B: 1);
impl_args!(3, A: 0, B: 1, C: 2);
