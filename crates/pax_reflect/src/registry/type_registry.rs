use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::TypeId;

use pax_utils::TypeIdMap;
use pax_utils::hash::HashMap;

use crate::Reflect;
use crate::info::{BUILTIN_OBJECTS, ConstructorInfo, FieldInfo, MethodInfo, Receiver};
use crate::info::{Type, TypeInfo, Typed};

// -----------------------------------------------------------------------------
// TypeRegistry

/// The central store of [`TypeInfo`]s.
///
/// Types are found by path (as they appear in descriptors) or by
/// [`TypeId`]. Lookups of fields and methods walk up the parent chain, so a
/// subtype exposes the members of its ancestors.
///
/// A registry is filled once and then shared, usually behind an `Arc`.
///
/// # Examples
///
/// ```
/// use pax_reflect::impl_typed;
/// use pax_reflect::info::{MethodInfo, TypeInfo};
/// use pax_reflect::registry::TypeRegistry;
///
/// #[derive(Debug, Clone, PartialEq, Default)]
/// struct Person { name: String }
/// #[derive(Debug, Clone, PartialEq, Default)]
/// struct Employee { person: Person, badge: u32 }
///
/// impl_typed!(Person as "hr::Person", default);
/// impl_typed!(Employee as "hr::Employee", default);
///
/// let mut registry = TypeRegistry::new();
/// registry.register(
///     TypeInfo::new::<Person>()
///         .with_method(MethodInfo::getter::<Person, String>("get_name", |p| &p.name)),
/// );
/// registry.register(
///     TypeInfo::new::<Employee>()
///         .extends::<Employee, Person>(|e| &e.person, |e| &mut e.person),
/// );
///
/// assert!(registry.contains("String"));
/// assert!(registry.is_ancestor("hr::Person", "hr::Employee"));
///
/// // inherited lookup
/// let method = registry.method("hr::Employee", "get_name", &[]).unwrap();
/// assert_eq!(method.declaring_type(), "hr::Person");
/// ```
pub struct TypeRegistry {
    types: HashMap<&'static str, Arc<TypeInfo>>,
    paths: TypeIdMap<&'static str>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates an empty registry. Not even `String` is known.
    #[inline]
    pub fn empty() -> Self {
        Self {
            types: HashMap::default(),
            paths: TypeIdMap::new(),
        }
    }

    /// Creates a registry knowing the built-in object types:
    ///
    /// - `String`
    /// - `VecDeque` `BTreeSet` `BTreeMap` `HashSet` `HashMap` (generics erased)
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(TypeInfo::new::<alloc::string::String>());
        for &path in BUILTIN_OBJECTS {
            if !registry.contains(path) {
                registry.register(TypeInfo::opaque(path));
            }
        }
        registry
    }

    /// Registers a type, replacing any previous registration with the same path.
    ///
    /// Returns the replaced registration.
    pub fn register(&mut self, info: TypeInfo) -> Option<Arc<TypeInfo>> {
        let path = info.path();
        if let Some(type_id) = info.type_id() {
            self.paths.insert(type_id, path);
        }
        self.types.insert(path, Arc::new(info))
    }

    /// Registers every type submitted with [`auto_register!`](crate::auto_register).
    ///
    /// Types already registered are kept. Returns the number of new registrations.
    ///
    /// Without the `auto_register` feature this does nothing and returns `0`.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> usize {
        #[cfg(feature = "auto_register")]
        {
            let mut count = 0;
            for registration in inventory::iter::<super::AutoRegistration> {
                let info = registration.type_info();
                if !self.contains(info.path()) {
                    self.register(info);
                    count += 1;
                }
            }
            log::debug!("auto registered {count} type(s)");
            count
        }
        #[cfg(not(feature = "auto_register"))]
        {
            0
        }
    }

    /// Returns `true` if a type with this path is registered.
    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.types.contains_key(path)
    }

    /// Returns `true` if the Rust type is registered.
    #[inline]
    pub fn contains_type(&self, type_id: TypeId) -> bool {
        self.paths.contains(&type_id)
    }

    #[inline]
    pub fn get(&self, path: &str) -> Option<&Arc<TypeInfo>> {
        self.types.get(path)
    }

    #[inline]
    pub fn get_by_id(&self, type_id: TypeId) -> Option<&Arc<TypeInfo>> {
        self.paths.get(&type_id).and_then(|path| self.get(path))
    }

    #[inline]
    pub fn get_type<T: Typed>(&self) -> Option<&Arc<TypeInfo>> {
        self.get_by_id(TypeId::of::<T>())
    }

    /// Returns the registered path equal to `path`, with a `'static` lifetime.
    #[inline]
    pub fn resolve_path(&self, path: &str) -> Option<&'static str> {
        self.types.get_key_value(path).map(|(path, _)| *path)
    }

    /// Number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeInfo>> {
        self.types.values()
    }

    /// Iterates over the type and its ancestors, nearest first.
    pub fn ancestors<'a>(&'a self, path: &str) -> impl Iterator<Item = &'a Arc<TypeInfo>> {
        let mut next = self.get(path);
        core::iter::from_fn(move || {
            let current = next?;
            next = current.parent().and_then(|parent| self.get(parent));
            Some(current)
        })
    }

    /// Number of ancestors of a type, `0` for a root.
    pub fn depth(&self, path: &str) -> usize {
        self.ancestors(path).count().saturating_sub(1)
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `path`.
    pub fn is_ancestor(&self, ancestor: &str, path: &str) -> bool {
        self.ancestors(path)
            .skip(1)
            .any(|info| info.path() == ancestor)
    }

    /// Returns `true` if values of `from` can be used where `to` is expected.
    #[inline]
    pub fn is_assignable(&self, from: &str, to: &str) -> bool {
        from == to || self.is_ancestor(to, from)
    }

    /// Returns the upcasts leading from `from` to its ancestor `to`.
    pub fn receiver(&self, from: &str, to: &str) -> Option<Receiver> {
        let mut receiver = Receiver::identity();
        for info in self.ancestors(from) {
            if info.path() == to {
                return Some(receiver);
            }
            receiver.push(info.parent_upcast()?.clone());
        }
        None
    }

    /// Finds a field on the type or its ancestors.
    pub fn field(&self, path: &str, name: &str) -> Option<&Arc<FieldInfo>> {
        self.ancestors(path).find_map(|info| info.field(name))
    }

    /// Finds a method on the type or its ancestors by name and parameter types.
    pub fn method(&self, path: &str, name: &str, params: &[Type]) -> Option<&Arc<MethodInfo>> {
        self.ancestors(path)
            .find_map(|info| info.method(name, params))
    }

    /// Iterates over every method with the given name on the type and its ancestors.
    pub fn methods_named<'a>(
        &'a self,
        path: &str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Arc<MethodInfo>> {
        self.ancestors(path)
            .flat_map(move |info| info.methods_named(name))
    }

    /// Finds a constructor declared on the type. Constructors are not inherited.
    pub fn constructor(&self, path: &str, params: &[Type]) -> Option<&Arc<ConstructorInfo>> {
        self.get(path)?.constructor(params)
    }

    /// Returns `true` if the type is a synthetic marker.
    pub fn is_synthetic_marker(&self, ty: &Type) -> bool {
        ty.object_path()
            .and_then(|path| self.get(path))
            .is_some_and(|info| info.is_synthetic())
    }

    /// Builds a fresh instance of a type.
    ///
    /// Uses the type's default value first, then a public zero-argument constructor.
    pub fn instantiate(&self, path: &str) -> Option<Box<dyn Reflect>> {
        let info = self.get(path)?;
        if let Some(value) = info.default_value() {
            return Some(value);
        }
        let constructor = info.constructor(&[])?;
        constructor.construct(&[]).ok()
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.types.keys()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
