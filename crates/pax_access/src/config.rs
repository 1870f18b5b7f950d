use alloc::sync::Arc;
use core::num::NonZeroUsize;

use pax_reflect::reference::{DEFAULT_CACHE_CAPACITY, MemberResolver};
use pax_reflect::registry::TypeRegistry;

use crate::chain::{AutoVivify, InstantiateFn, NullPolicy, NullPolicyKind};
use crate::definition::{AccessPointComparator, DEFAULT_DEFINITION_CACHE_CAPACITY, DefinitionCache};

/// Settings of the access layer.
///
/// Every field has a default, so a partial document deserializes.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pax_access::AccessConfig;
/// use pax_access::chain::NullPolicyKind;
/// use pax_reflect::registry::TypeRegistry;
///
/// let config = AccessConfig {
///     null_policy: NullPolicyKind::ShortCircuit,
///     ..AccessConfig::default()
/// };
/// let resolver = config.build_resolver(Arc::new(TypeRegistry::new()));
/// assert_eq!(resolver.capacity().get(), 256);
/// assert_eq!(config.build_policy().kind(), NullPolicyKind::ShortCircuit);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AccessConfig {
    /// Capacity of the member resolver's cache.
    pub resolver_cache_capacity: NonZeroUsize,
    /// Capacity of the comparator's definition cache.
    pub definition_cache_capacity: NonZeroUsize,
    pub null_policy: NullPolicyKind,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            resolver_cache_capacity: DEFAULT_CACHE_CAPACITY,
            definition_cache_capacity: DEFAULT_DEFINITION_CACHE_CAPACITY,
            null_policy: NullPolicyKind::Fail,
        }
    }
}

impl AccessConfig {
    #[inline]
    pub fn build_resolver(&self, registry: Arc<TypeRegistry>) -> MemberResolver {
        MemberResolver::with_capacity(registry, self.resolver_cache_capacity)
    }

    #[inline]
    pub fn build_definition_cache(&self) -> DefinitionCache {
        DefinitionCache::new(self.definition_cache_capacity)
    }

    /// A comparator owning a fresh definition cache.
    pub fn build_comparator(&self, registry: Arc<TypeRegistry>) -> AccessPointComparator {
        AccessPointComparator::with_cache(registry, Arc::new(self.build_definition_cache()))
    }

    /// Creates the configured null policy.
    ///
    /// Auto-vivify built this way only knows typed defaults, see
    /// [`build_policy_with`](Self::build_policy_with).
    #[inline]
    pub fn build_policy(&self) -> Arc<dyn NullPolicy> {
        self.null_policy.build()
    }

    /// Creates the configured null policy, letting auto-vivify fall back to
    /// `registry` and try `instantiate` first.
    pub fn build_policy_with(
        &self,
        registry: Arc<TypeRegistry>,
        instantiate: Option<Arc<InstantiateFn>>,
    ) -> Arc<dyn NullPolicy> {
        match self.null_policy {
            NullPolicyKind::AutoVivify => {
                let mut policy = AutoVivify::new().with_registry(registry);
                if let Some(instantiate) = instantiate {
                    policy = policy.with_instantiate(move |ty| (*instantiate)(ty));
                }
                Arc::new(policy)
            }
            kind => kind.build(),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
