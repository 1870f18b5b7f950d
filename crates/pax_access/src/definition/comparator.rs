use alloc::sync::Arc;
use core::cmp::Ordering;
use core::fmt;
use core::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, trace};
use pax_reflect::info::Type;
use pax_reflect::registry::TypeRegistry;
use pax_utils::LruCache;

use crate::AccessError;
use crate::definition::AccessorDefinition;
use crate::point::{AccessKey, AccessPoint};

/// Capacity of a [`DefinitionCache`] built without one.
pub const DEFAULT_DEFINITION_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::new(256).unwrap();

// -----------------------------------------------------------------------------
// DefinitionCache

/// Memoizes [`AccessorDefinition::of`] per access point identity.
pub struct DefinitionCache {
    cache: Mutex<LruCache<AccessKey, AccessorDefinition>>,
}

impl DefinitionCache {
    #[inline]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    #[inline]
    pub fn capacity(&self) -> NonZeroUsize {
        self.cache().capacity()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cache().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cache().is_empty()
    }

    #[inline]
    pub fn clear(&self) {
        self.cache().clear();
    }

    fn cache(&self) -> MutexGuard<'_, LruCache<AccessKey, AccessorDefinition>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the definition of `point`, computing it on a miss.
    pub fn definition(&self, point: &dyn AccessPoint) -> Result<AccessorDefinition, AccessError> {
        let key = point.key();
        if let Some(definition) = self.cache().get(&key) {
            trace!("definition cache hit: {key}");
            return Ok(definition.clone());
        }
        // Computed outside the lock, chains recurse into their links.
        let definition = AccessorDefinition::of(point)?;
        debug!("definition cache miss: {key} is `{definition}`");
        if let Some((evicted, _)) = self.cache().insert(key, definition.clone()) {
            debug!("definition cache evicted {evicted}");
        }
        Ok(definition)
    }
}

impl Default for DefinitionCache {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_DEFINITION_CACHE_CAPACITY)
    }
}

impl fmt::Debug for DefinitionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.cache();
        f.debug_struct("DefinitionCache")
            .field("len", &cache.len())
            .field("capacity", &cache.capacity())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// AccessPointComparator

/// Orders access points by their [`AccessorDefinition`].
///
/// Definitions are ordered by name, then declaring type, then member type.
/// Object types order by their depth in the type hierarchy, ancestors
/// first, then by descriptor. Two definitions are equal only when all
/// three parts are.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pax_access::definition::{AccessPointComparator, AccessorDefinition};
/// use pax_reflect::info::Type;
/// use pax_reflect::registry::TypeRegistry;
///
/// let comparator = AccessPointComparator::new(Arc::new(TypeRegistry::new()));
/// let name = AccessorDefinition::new(Type::Object("app::City"), "name", Type::Object("String"));
/// let zip = AccessorDefinition::new(Type::Object("app::City"), "zip", Type::of::<u32>());
/// assert!(comparator.compare_definitions(&name, &zip).is_lt());
/// assert!(comparator.compare_definitions(&name, &name.clone()).is_eq());
/// ```
pub struct AccessPointComparator {
    registry: Arc<TypeRegistry>,
    cache: Arc<DefinitionCache>,
}

impl AccessPointComparator {
    /// A comparator with its own default-sized cache.
    #[inline]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_cache(registry, Arc::new(DefinitionCache::default()))
    }

    #[inline]
    pub fn with_cache(registry: Arc<TypeRegistry>, cache: Arc<DefinitionCache>) -> Self {
        Self { registry, cache }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    #[inline]
    pub fn cache(&self) -> &Arc<DefinitionCache> {
        &self.cache
    }

    /// Returns the cached definition of `point`.
    #[inline]
    pub fn definition(&self, point: &dyn AccessPoint) -> Result<AccessorDefinition, AccessError> {
        self.cache.definition(point)
    }

    pub fn compare(
        &self,
        a: &dyn AccessPoint,
        b: &dyn AccessPoint,
    ) -> Result<Ordering, AccessError> {
        Ok(self.compare_definitions(&self.definition(a)?, &self.definition(b)?))
    }

    /// Returns `true` if `a` and `b` reach the same property.
    pub fn equivalent(
        &self,
        a: &dyn AccessPoint,
        b: &dyn AccessPoint,
    ) -> Result<bool, AccessError> {
        self.compare(a, b).map(Ordering::is_eq)
    }

    pub fn compare_definitions(&self, a: &AccessorDefinition, b: &AccessorDefinition) -> Ordering {
        a.name
            .cmp(&b.name)
            .then_with(|| self.compare_types(&a.declaring_type, &b.declaring_type))
            .then_with(|| self.compare_types(&a.member_type, &b.member_type))
    }

    fn compare_types(&self, a: &Type, b: &Type) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let depth = |ty: &Type| ty.object_path().map_or(0, |path| self.registry.depth(path));
        depth(a)
            .cmp(&depth(b))
            .then_with(|| a.descriptor().cmp(&b.descriptor()))
    }
}

impl fmt::Debug for AccessPointComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessPointComparator")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests
