use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use crate::Reflect;
use crate::info::{ConstructorInfo, FieldInfo, MethodInfo, Type, Typed, path_of};

// -----------------------------------------------------------------------------
// Visibility / TypeKind

/// Member visibility.
///
/// Informational only: access never depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Where a type is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeKind {
    #[default]
    TopLevel,
    /// Declared inside `outer`. Instances of a non-static nested type are
    /// bound to an enclosing instance.
    Nested {
        outer: &'static str,
        is_static: bool,
    },
}

// -----------------------------------------------------------------------------
// Upcast / Receiver

/// Converts a reference to a subtype into a reference to its parent.
pub trait Upcast: Send + Sync {
    /// Returns `true` if `value` is an instance of the subtype.
    fn accepts(&self, value: &dyn Reflect) -> bool;

    fn upcast<'a>(&self, value: &'a dyn Reflect) -> Option<&'a dyn Reflect>;

    fn upcast_mut<'a>(&self, value: &'a mut dyn Reflect) -> Option<&'a mut dyn Reflect>;
}

struct FnUpcast<S, P> {
    up: fn(&S) -> &P,
    up_mut: fn(&mut S) -> &mut P,
}

impl<S: Reflect, P: Reflect> Upcast for FnUpcast<S, P> {
    #[inline]
    fn accepts(&self, value: &dyn Reflect) -> bool {
        value.is::<S>()
    }

    fn upcast<'a>(&self, value: &'a dyn Reflect) -> Option<&'a dyn Reflect> {
        value
            .downcast_ref::<S>()
            .map(|value| (self.up)(value) as &dyn Reflect)
    }

    fn upcast_mut<'a>(&self, value: &'a mut dyn Reflect) -> Option<&'a mut dyn Reflect> {
        value
            .downcast_mut::<S>()
            .map(|value| (self.up_mut)(value) as &mut dyn Reflect)
    }
}

/// The path from a subtype to one of its ancestors, as a chain of upcasts.
///
/// The identity receiver has no steps and leaves every value unchanged.
#[derive(Clone, Default)]
pub struct Receiver {
    steps: Vec<Arc<dyn Upcast>>,
}

impl Receiver {
    #[inline]
    pub fn identity() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of upcasts.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns `true` if `value` is an instance of the subtype this receiver starts from.
    ///
    /// The identity receiver accepts everything.
    #[inline]
    pub fn accepts(&self, value: &dyn Reflect) -> bool {
        self.steps.first().is_none_or(|step| step.accepts(value))
    }

    /// Walks up to the ancestor.
    pub fn apply<'a>(&self, value: &'a dyn Reflect) -> Option<&'a dyn Reflect> {
        self.steps
            .iter()
            .try_fold(value, |value, step| step.upcast(value))
    }

    /// Walks up to the ancestor mutably.
    pub fn apply_mut<'a>(&self, value: &'a mut dyn Reflect) -> Option<&'a mut dyn Reflect> {
        let mut value = value;
        for step in &self.steps {
            value = step.upcast_mut(value)?;
        }
        Some(value)
    }

    pub(crate) fn push(&mut self, step: Arc<dyn Upcast>) {
        self.steps.push(step);
    }
}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("steps", &self.steps.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

pub(crate) struct Parent {
    pub(crate) path: &'static str,
    pub(crate) upcast: Arc<dyn Upcast>,
}

/// The structural description of a registered type.
///
/// # Examples
///
/// ```
/// use pax_reflect::impl_typed;
/// use pax_reflect::info::{FieldInfo, MethodInfo, TypeInfo, TypeKind};
///
/// #[derive(Debug, Clone, PartialEq, Default)]
/// struct Phone { number: String }
/// impl_typed!(Phone as "contact::Phone", default);
///
/// let info = TypeInfo::new::<Phone>()
///     .with_field(
///         FieldInfo::required::<Phone, String>("number", |p| &p.number, |p| &mut p.number)
///             .private(),
///     )
///     .with_method(MethodInfo::getter::<Phone, String>("get_number", |p| &p.number));
///
/// assert_eq!(info.path(), "contact::Phone");
/// assert_eq!(info.kind(), TypeKind::TopLevel);
/// assert!(info.field("number").is_some());
/// assert_eq!(info.methods_named("get_number").count(), 1);
/// assert!(info.default_value().is_some());
/// ```
pub struct TypeInfo {
    path: &'static str,
    type_id: Option<TypeId>,
    type_name: &'static str,
    kind: TypeKind,
    parent: Option<Parent>,
    synthetic: bool,
    fields: Vec<Arc<FieldInfo>>,
    methods: Vec<Arc<MethodInfo>>,
    constructors: Vec<Arc<ConstructorInfo>>,
    default: fn() -> Option<Box<dyn Reflect>>,
}

fn no_default() -> Option<Box<dyn Reflect>> {
    None
}

impl TypeInfo {
    /// Describes `S`, with no members yet.
    pub fn new<S: Typed>() -> Self {
        Self {
            path: path_of::<S>(),
            type_id: Some(TypeId::of::<S>()),
            type_name: core::any::type_name::<S>(),
            kind: TypeKind::TopLevel,
            parent: None,
            synthetic: false,
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            default: S::default_value,
        }
    }

    /// Describes a type known only by its path, such as an erased generic container.
    pub fn opaque(path: &'static str) -> Self {
        Self {
            path,
            type_id: None,
            type_name: path,
            kind: TypeKind::TopLevel,
            parent: None,
            synthetic: false,
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            default: no_default,
        }
    }

    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields.push(Arc::new(field));
        self
    }

    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(Arc::new(method));
        self
    }

    pub fn with_constructor(mut self, constructor: ConstructorInfo) -> Self {
        self.constructors.push(Arc::new(constructor));
        self
    }

    /// Declares the type inside `outer`.
    pub fn nested_in(mut self, outer: &'static str, is_static: bool) -> Self {
        self.kind = TypeKind::Nested { outer, is_static };
        self
    }

    /// Declares `P` as the parent of `S`, reachable through the given upcasts.
    ///
    /// Members of `P` become members of `S` for lookup purposes.
    pub fn extends<S: Typed, P: Typed>(
        mut self,
        up: fn(&S) -> &P,
        up_mut: fn(&mut S) -> &mut P,
    ) -> Self {
        self.parent = Some(Parent {
            path: path_of::<P>(),
            upcast: Arc::new(FnUpcast { up, up_mut }),
        });
        self
    }

    /// Marks the type as a synthetic marker, only ever appearing in bridge signatures.
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    #[inline]
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Returns the [`TypeId`], `None` for opaque types.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the object [`Type`] of this type.
    #[inline]
    pub fn ty(&self) -> Type {
        Type::Object(self.path)
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Returns the enclosing type of a nested type.
    #[inline]
    pub fn outer(&self) -> Option<&'static str> {
        match self.kind {
            TypeKind::Nested { outer, .. } => Some(outer),
            TypeKind::TopLevel => None,
        }
    }

    /// Returns `true` for nested types bound to an enclosing instance.
    #[inline]
    pub fn is_inner(&self) -> bool {
        matches!(self.kind, TypeKind::Nested { is_static: false, .. })
    }

    /// Returns `true` for nested types not bound to an enclosing instance.
    #[inline]
    pub fn is_static_nested(&self) -> bool {
        matches!(self.kind, TypeKind::Nested { is_static: true, .. })
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Returns the path of the parent type.
    #[inline]
    pub fn parent(&self) -> Option<&'static str> {
        self.parent.as_ref().map(|parent| parent.path)
    }

    #[inline]
    pub(crate) fn parent_upcast(&self) -> Option<&Arc<dyn Upcast>> {
        self.parent.as_ref().map(|parent| &parent.upcast)
    }

    #[inline]
    pub fn fields(&self) -> &[Arc<FieldInfo>] {
        &self.fields
    }

    #[inline]
    pub fn methods(&self) -> &[Arc<MethodInfo>] {
        &self.methods
    }

    #[inline]
    pub fn constructors(&self) -> &[Arc<ConstructorInfo>] {
        &self.constructors
    }

    /// Returns the field declared on this type with the given name.
    pub fn field(&self, name: &str) -> Option<&Arc<FieldInfo>> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Iterates over the overloads declared on this type with the given name.
    pub fn methods_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Arc<MethodInfo>> {
        self.methods
            .iter()
            .filter(move |method| method.name() == name)
    }

    /// Returns the method declared on this type with the given name and parameters.
    pub fn method(&self, name: &str, params: &[Type]) -> Option<&Arc<MethodInfo>> {
        self.methods_named(name)
            .find(|method| method.params() == params)
    }

    /// Returns the constructor declared on this type with the given parameters.
    pub fn constructor(&self, params: &[Type]) -> Option<&Arc<ConstructorInfo>> {
        self.constructors
            .iter()
            .find(|constructor| constructor.params() == params)
    }

    /// Builds a default instance, if the type has one.
    #[inline]
    pub fn default_value(&self) -> Option<Box<dyn Reflect>> {
        (self.default)()
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("parent", &self.parent())
            .field("synthetic", &self.synthetic)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .field("constructors", &self.constructors)
            .finish()
    }
}
