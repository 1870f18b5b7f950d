use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use crate::Reflect;
use crate::info::{Args, InvokeFault, Type, Typed, Visibility, method_descriptor, path_of};

/// Reserved member name of constructors.
pub const CONSTRUCTOR_NAME: &str = "<init>";

trait ConstructorBody: Send + Sync {
    fn construct(&self, args: &[&dyn Reflect]) -> Result<Box<dyn Reflect>, InvokeFault>;
}

struct FnConstructor<S, A> {
    f: fn(A) -> S,
}

impl<S: Reflect, A: Args> ConstructorBody for FnConstructor<S, A> {
    fn construct(&self, args: &[&dyn Reflect]) -> Result<Box<dyn Reflect>, InvokeFault> {
        let args = A::from_args(args)?;
        Ok(Box::new((self.f)(args)))
    }
}

/// A constructor of a registered type.
///
/// Parameters are given as an [`Args`] tuple, so a constructor with a
/// single `String` parameter takes `(String,)`.
///
/// A constructor marked [`synthetic`](Self::synthetic) stands for a bridge
/// that forwards to a private constructor. Its parameter list is the one of
/// the real constructor followed by one or more synthetic marker types.
///
/// # Examples
///
/// ```
/// use pax_reflect::impl_typed;
/// use pax_reflect::info::ConstructorInfo;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct City { name: String }
/// impl_typed!(City as "geo::City");
///
/// let ctor = ConstructorInfo::new::<City, (String,)>(|(name,)| City { name });
/// assert_eq!(ctor.descriptor(), "(LString;)V");
///
/// let city = ctor.construct(&[&String::from("Oslo")]).unwrap();
/// assert_eq!(city.take::<City>().unwrap().name, "Oslo");
/// ```
pub struct ConstructorInfo {
    declaring_type: &'static str,
    declaring_type_id: TypeId,
    ty: Type,
    params: Vec<Type>,
    visibility: Visibility,
    synthetic: bool,
    body: Box<dyn ConstructorBody>,
}

impl ConstructorInfo {
    /// Creates a constructor from a function taking its arguments as a tuple.
    pub fn new<S: Typed, A: Args>(f: fn(A) -> S) -> Self {
        Self {
            declaring_type: path_of::<S>(),
            declaring_type_id: TypeId::of::<S>(),
            ty: S::ty(),
            params: A::types(),
            visibility: Visibility::Public,
            synthetic: false,
            body: Box::new(FnConstructor { f }),
        }
    }

    /// Marks the constructor as private.
    #[inline]
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Marks the constructor as a bridge to a private constructor.
    #[inline]
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        CONSTRUCTOR_NAME
    }

    #[inline]
    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }

    #[inline]
    pub fn declaring_type_id(&self) -> TypeId {
        self.declaring_type_id
    }

    /// Returns the type of the constructed value.
    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn params(&self) -> &[Type] {
        &self.params
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Returns the member descriptor. Constructors return `V`.
    #[inline]
    pub fn descriptor(&self) -> String {
        method_descriptor(&self.params, None)
    }

    /// Returns `<declaring type>::<init><descriptor>`.
    pub fn signature(&self) -> String {
        alloc::format!(
            "{}::{}{}",
            self.declaring_type,
            CONSTRUCTOR_NAME,
            self.descriptor()
        )
    }

    /// Builds a new instance.
    #[inline]
    pub fn construct(&self, args: &[&dyn Reflect]) -> Result<Box<dyn Reflect>, InvokeFault> {
        self.body.construct(args)
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("signature", &self.signature())
            .field("visibility", &self.visibility)
            .field("synthetic", &self.synthetic)
            .finish()
    }
}
