use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, trace};
use pax_utils::LruCache;

use crate::info::{CONSTRUCTOR_NAME, ConstructorInfo, MethodInfo, Type, TypeInfo, method_descriptor};
use crate::reference::{BoundFunction, ResolveError, SerializedRef};
use crate::registry::TypeRegistry;
use crate::signature::{MethodSignature, SignatureError, SignatureParser};

/// Default number of members kept by a [`MemberResolver`].
pub const DEFAULT_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::new(256).unwrap();

// -----------------------------------------------------------------------------
// Member

/// The member a reference was bound to.
#[derive(Clone)]
pub enum Member {
    Method(Arc<MethodInfo>),
    Constructor(Arc<ConstructorInfo>),
}

impl Member {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Method(method) => method.name(),
            Self::Constructor(_) => CONSTRUCTOR_NAME,
        }
    }

    #[inline]
    pub fn declaring_type(&self) -> &'static str {
        match self {
            Self::Method(method) => method.declaring_type(),
            Self::Constructor(constructor) => constructor.declaring_type(),
        }
    }

    /// Returns `<declaring type>::<name><descriptor>`.
    pub fn signature(&self) -> String {
        match self {
            Self::Method(method) => method.signature(),
            Self::Constructor(constructor) => constructor.signature(),
        }
    }

    #[inline]
    pub fn as_method(&self) -> Option<&Arc<MethodInfo>> {
        match self {
            Self::Method(method) => Some(method),
            Self::Constructor(_) => None,
        }
    }

    #[inline]
    pub fn as_constructor(&self) -> Option<&Arc<ConstructorInfo>> {
        match self {
            Self::Method(_) => None,
            Self::Constructor(constructor) => Some(constructor),
        }
    }

    /// Returns `true` if both point to the same registered member.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Method(a), Self::Method(b)) => Arc::ptr_eq(a, b),
            (Self::Constructor(a), Self::Constructor(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(method) => f.debug_tuple("Method").field(&method.signature()).finish(),
            Self::Constructor(constructor) => f
                .debug_tuple("Constructor")
                .field(&constructor.signature())
                .finish(),
        }
    }
}

/// What a reference says about itself, before member lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMetadata {
    /// The type declaring the member.
    pub implementing_type: &'static str,
    /// The type the reference was written against, possibly a subtype.
    pub instantiated_type: &'static str,
    pub member_name: String,
    /// The member's own descriptor.
    pub raw_signature: String,
}

// -----------------------------------------------------------------------------
// MemberResolver

/// Recovers the member behind a [`BoundFunction`].
///
/// Resolved members are memoized in a bounded LRU cache keyed by the
/// qualified signature (`<type>::<name><descriptor>`); the cache is shared
/// by every caller of the resolver.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pax_reflect::impl_typed;
/// use pax_reflect::info::{MethodInfo, TypeInfo};
/// use pax_reflect::reference::{Closure, MemberRef, MemberResolver, ResolveError};
/// use pax_reflect::registry::TypeRegistry;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Phone { number: String }
/// impl Phone {
///     fn get_number(&self) -> &String { &self.number }
/// }
/// impl_typed!(Phone as "app::Phone");
///
/// let mut registry = TypeRegistry::new();
/// registry.register(
///     TypeInfo::new::<Phone>()
///         .with_method(MethodInfo::getter::<Phone, String>("get_number", Phone::get_number)),
/// );
/// let resolver = MemberResolver::new(Arc::new(registry));
///
/// let reference = MemberRef::getter::<Phone, String>("get_number", Phone::get_number);
/// let member = resolver.resolve(&reference).unwrap();
/// assert_eq!(member.signature(), "app::Phone::get_number()LString;");
///
/// let closure = Closure(|p: &Phone| p.number.len());
/// assert!(matches!(
///     resolver.resolve(&closure),
///     Err(ResolveError::UnsupportedReference { .. })
/// ));
/// ```
pub struct MemberResolver {
    registry: Arc<TypeRegistry>,
    cache: Mutex<LruCache<String, Member>>,
}

impl MemberResolver {
    /// Creates a resolver with the [default capacity](DEFAULT_CACHE_CAPACITY).
    #[inline]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_capacity(registry, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(registry: Arc<TypeRegistry>, capacity: NonZeroUsize) -> Self {
        Self {
            registry,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    #[inline]
    pub fn capacity(&self) -> NonZeroUsize {
        self.cache().capacity()
    }

    /// Number of cached members.
    #[inline]
    pub fn cached(&self) -> usize {
        self.cache().len()
    }

    /// Returns `true` if the reference's member is cached. Does not touch the entry.
    pub fn is_cached(&self, function: &dyn BoundFunction) -> bool {
        match function.serialized_form() {
            Some(form) => self.cache().contains(&cache_key(form)),
            None => false,
        }
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    fn cache(&self) -> MutexGuard<'_, LruCache<String, Member>> {
        // The cache stays consistent even if a holder panicked.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn form_of(function: &dyn BoundFunction) -> Result<&SerializedRef, ResolveError> {
        function
            .serialized_form()
            .ok_or(ResolveError::UnsupportedReference {
                type_name: function.type_name(),
            })
    }

    /// Reads the identity of a reference without looking up its member.
    pub fn extract_metadata(
        &self,
        function: &dyn BoundFunction,
    ) -> Result<ReferenceMetadata, ResolveError> {
        let form = Self::form_of(function)?;
        let implementing = self.implementing_type(form)?;
        let parser = SignatureParser::new(&self.registry);
        let instantiated = parser.parse_method(&form.instantiated_signature)?;

        let receiver = if form.member_name == CONSTRUCTOR_NAME {
            instantiated.ret
        } else {
            instantiated.params.into_iter().next()
        };
        let instantiated_type = receiver
            .as_ref()
            .and_then(Type::object_path)
            .ok_or_else(|| {
                SignatureError::malformed(
                    &form.instantiated_signature,
                    0,
                    "instantiated signature names no object receiver",
                )
            })?;

        Ok(ReferenceMetadata {
            implementing_type: implementing.path(),
            instantiated_type,
            member_name: form.member_name.clone(),
            raw_signature: form.signature.clone(),
        })
    }

    /// Finds the method or constructor a reference was bound to.
    pub fn resolve(&self, function: &dyn BoundFunction) -> Result<Member, ResolveError> {
        let form = Self::form_of(function)?;
        let key = cache_key(form);

        if let Some(member) = self.cache().get(&key) {
            trace!("member cache hit: {key}");
            return Ok(member.clone());
        }

        debug!("member cache miss: {key}");
        let member = self.lookup(form)?;
        if let Some((evicted, _)) = self.cache().insert(key, member.clone()) {
            debug!("member cache evicted: {evicted}");
        }
        Ok(member)
    }

    fn implementing_type(&self, form: &SerializedRef) -> Result<&Arc<TypeInfo>, ResolveError> {
        self.registry.get(&form.implementing_type).ok_or_else(|| {
            ResolveError::Signature(SignatureError::TypeNotFound {
                name: form.implementing_type.clone(),
            })
        })
    }

    fn lookup(&self, form: &SerializedRef) -> Result<Member, ResolveError> {
        let info = self.implementing_type(form)?;
        let signature = SignatureParser::new(&self.registry).parse_method(&form.signature)?;

        if let Some(outer) = info.outer().filter(|_| info.is_inner()) {
            return Err(ResolveError::UnsupportedMemberShape {
                member: format!("{}::{}{}", info.path(), form.member_name, form.signature),
                reason: format!(
                    "`{}` is a non-static nested type of `{outer}`, its members can only be referenced once it is declared static",
                    info.path()
                ),
            });
        }

        if form.member_name == CONSTRUCTOR_NAME {
            self.lookup_constructor(info, &signature)
        } else {
            self.lookup_method(info, &form.member_name, &signature)
        }
    }

    fn lookup_method(
        &self,
        info: &TypeInfo,
        name: &str,
        signature: &MethodSignature,
    ) -> Result<Member, ResolveError> {
        let method = self
            .registry
            .method(info.path(), name, &signature.params)
            .ok_or_else(|| ResolveError::MemberNotFound {
                owner: info.path().into(),
                name: name.into(),
                signature: signature.descriptor(),
            })?;

        if method.is_synthetic() {
            return Err(ResolveError::UnsupportedMemberShape {
                member: method.signature(),
                reason: "the reference points to a synthetic bridge method".into(),
            });
        }
        if method.ret() != signature.ret.as_ref() {
            return Err(ResolveError::TypeMismatch {
                member: method.signature(),
                expected: return_name(signature.ret.as_ref()),
                found: return_name(method.ret()),
            });
        }
        Ok(Member::Method(method.clone()))
    }

    fn lookup_constructor(
        &self,
        info: &TypeInfo,
        signature: &MethodSignature,
    ) -> Result<Member, ResolveError> {
        if signature.ret.is_some() {
            return Err(ResolveError::TypeMismatch {
                member: format!("{}::{CONSTRUCTOR_NAME}{}", info.path(), signature.descriptor()),
                expected: return_name(signature.ret.as_ref()),
                found: return_name(None),
            });
        }

        let params = &signature.params;
        let constructor = info
            .constructor(params)
            .ok_or_else(|| ResolveError::MemberNotFound {
                owner: info.path().into(),
                name: CONSTRUCTOR_NAME.into(),
                signature: method_descriptor(params, None),
            })?;
        if !constructor.is_synthetic() {
            return Ok(Member::Constructor(constructor.clone()));
        }

        // A bridge to a private constructor of a static nested type forwards
        // the real parameters followed by synthetic markers.
        if !info.is_static_nested() {
            return Err(ResolveError::UnsupportedMemberShape {
                member: constructor.signature(),
                reason: format!(
                    "synthetic constructor bridges are only unwrapped on static nested types, `{}` is not one",
                    info.path()
                ),
            });
        }
        let real: Vec<Type> = params
            .iter()
            .filter(|param| !self.registry.is_synthetic_marker(param))
            .cloned()
            .collect();
        let target = info
            .constructors()
            .iter()
            .find(|candidate| !candidate.is_synthetic() && candidate.params() == real.as_slice())
            .ok_or_else(|| ResolveError::UnsupportedMemberShape {
                member: constructor.signature(),
                reason: "no constructor matches the bridge parameters without their synthetic markers"
                    .into(),
            })?;

        debug!(
            "recovered `{}` behind synthetic bridge `{}`",
            target.signature(),
            constructor.signature()
        );
        Ok(Member::Constructor(target.clone()))
    }
}

impl fmt::Debug for MemberResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberResolver")
            .field("registry", &self.registry)
            .field("cache", &*self.cache())
            .finish()
    }
}

fn cache_key(form: &SerializedRef) -> String {
    form.to_string()
}

fn return_name(ret: Option<&Type>) -> String {
    match ret {
        Some(ty) => ty.to_string(),
        None => "void".into(),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Member, MemberResolver};
    use crate::fixtures::{self, City, Employee, Inner, Nested, NestedAccess, Person, Phone};
    use crate::info::CONSTRUCTOR_NAME;
    use crate::reference::{Closure, MemberRef, ResolveError, SerializedRef};
    use crate::signature::SignatureError;
    use alloc::string::{String, ToString};
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::num::NonZeroUsize;

    fn resolver(capacity: usize) -> MemberResolver {
        MemberResolver::with_capacity(
            Arc::new(fixtures::registry()),
            NonZeroUsize::new(capacity).unwrap(),
        )
    }

    fn number() -> MemberRef {
        MemberRef::getter::<Phone, String>("get_number", Phone::get_number)
    }

    fn name() -> MemberRef {
        MemberRef::getter::<Person, String>("get_name", Person::get_name)
    }

    fn city_name() -> MemberRef {
        MemberRef::getter::<City, String>("get_name", City::get_name)
    }

    #[test]
    fn resolves_methods_and_caches_them() {
        let resolver = resolver(8);
        let first = resolver.resolve(&number()).unwrap();
        assert!(matches!(&first, Member::Method(method) if method.name() == "get_number"));
        assert!(resolver.is_cached(&number()));

        let second = resolver.resolve(&number()).unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(resolver.cached(), 1);
    }

    #[test]
    fn evicts_least_recently_touched() {
        let resolver = resolver(2);
        resolver.resolve(&number()).unwrap();
        resolver.resolve(&name()).unwrap();
        // touch the oldest entry
        resolver.resolve(&number()).unwrap();
        resolver.resolve(&city_name()).unwrap();

        assert_eq!(resolver.cached(), 2);
        assert!(resolver.is_cached(&number()));
        assert!(!resolver.is_cached(&name()));
        assert!(resolver.is_cached(&city_name()));
    }

    #[test]
    fn shared_cache_stays_bounded_across_threads() {
        let resolver = resolver(2);
        let refs = [number(), name(), city_name()];
        let expected: Vec<Member> = refs
            .iter()
            .map(|function| resolver.resolve(function).unwrap())
            .collect();

        std::thread::scope(|scope| {
            for offset in 0..6 {
                let (resolver, refs, expected) = (&resolver, &refs, &expected);
                scope.spawn(move || {
                    for round in 0..50 {
                        let at = (offset + round) % refs.len();
                        let member = resolver.resolve(&refs[at]).unwrap();
                        assert!(member.ptr_eq(&expected[at]));
                        assert!(resolver.cached() <= 2);
                    }
                });
            }
        });
        assert!(resolver.cached() <= 2);
        assert!(resolver.cached() >= 1);
    }

    #[test]
    fn closures_are_rejected() {
        let resolver = resolver(2);
        let closure = Closure(|phone: &Phone| phone.number.clone());
        let err = resolver.resolve(&closure).unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedReference { .. }));
        assert!(matches!(
            resolver.extract_metadata(&closure),
            Err(ResolveError::UnsupportedReference { .. })
        ));
        assert!(!resolver.is_cached(&closure));
    }

    #[test]
    fn metadata_separates_implementing_and_instantiated_type() {
        let resolver = resolver(2);
        let metadata = resolver
            .extract_metadata(&name().instantiated_as::<Employee>())
            .unwrap();
        assert_eq!(metadata.implementing_type, "fixtures::Person");
        assert_eq!(metadata.instantiated_type, "fixtures::Employee");
        assert_eq!(metadata.member_name, "get_name");
        assert_eq!(metadata.raw_signature, "()LString;");

        let ctor = MemberRef::constructor::<City, (String,)>(|(name,)| City { name });
        let metadata = resolver.extract_metadata(&ctor).unwrap();
        assert_eq!(metadata.instantiated_type, "fixtures::City");
        assert_eq!(metadata.member_name, CONSTRUCTOR_NAME);
    }

    #[test]
    fn return_type_is_checked() {
        let resolver = resolver(2);
        let form = SerializedRef {
            implementing_type: "fixtures::Phone".into(),
            member_name: "get_number".into(),
            signature: "()I".into(),
            instantiated_signature: "(Lfixtures::Phone;)I".into(),
        };
        let err = resolver.resolve(&form).unwrap_err();
        assert_eq!(
            err,
            ResolveError::TypeMismatch {
                member: "fixtures::Phone::get_number()LString;".into(),
                expected: "i32".into(),
                found: "String".into(),
            }
        );
    }

    #[test]
    fn unknown_members_and_types() {
        let resolver = resolver(2);
        let mut form = number().form().clone();
        form.member_name = "get_numbers".into();
        assert!(matches!(
            resolver.resolve(&form),
            Err(ResolveError::MemberNotFound { .. })
        ));

        form.implementing_type = "fixtures::Fax".into();
        assert!(matches!(
            resolver.resolve(&form),
            Err(ResolveError::Signature(SignatureError::TypeNotFound { .. }))
        ));
    }

    #[test]
    fn recovers_private_constructor_of_static_nested_type() {
        let resolver = resolver(4);
        // The bridge carries a trailing synthetic marker.
        let bridge = MemberRef::constructor::<Nested, (String, NestedAccess)>(|(label, _)| {
            Nested::new(label)
        });
        let member = resolver.resolve(&bridge).unwrap();
        let constructor = member.as_constructor().unwrap();
        assert!(!constructor.is_synthetic());
        assert_eq!(constructor.descriptor(), "(LString;)V");

        let nested = constructor
            .construct(&[&String::from("x")])
            .unwrap()
            .take::<Nested>()
            .unwrap();
        assert_eq!(nested, Nested::new(String::from("x")));
    }

    #[test]
    fn rejects_members_of_inner_types() {
        let resolver = resolver(4);
        let reference = MemberRef::getter::<Inner, i32>("get_value", Inner::get_value);
        let err = resolver.resolve(&reference).unwrap_err();
        let ResolveError::UnsupportedMemberShape { reason, .. } = &err else {
            panic!("unexpected {err:?}");
        };
        assert!(reason.contains("fixtures::Outer"));
        assert!(err.to_string().contains("static"));
    }
}
