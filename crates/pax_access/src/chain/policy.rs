use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use core::fmt;

use pax_reflect::Reflect;
use pax_reflect::info::Type;
use pax_reflect::registry::TypeRegistry;

use crate::AccessError;
use crate::point::Accessor;

/// Builds the instance to vivify for a declared type.
pub type InstantiateFn = dyn Fn(&Type) -> Option<Box<dyn Reflect>> + Send + Sync;

// -----------------------------------------------------------------------------
// NullAction

/// What a chain does after a link read nothing.
pub enum NullAction {
    /// Raise [`AccessError::NullTraversal`].
    Fail,
    /// Stop and return absent.
    ShortCircuit,
    /// Continue with this value, written back when the traversal is mutable.
    Vivify(Box<dyn Reflect>),
}

impl fmt::Debug for NullAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fail => f.write_str("Fail"),
            Self::ShortCircuit => f.write_str("ShortCircuit"),
            Self::Vivify(value) => f.debug_tuple("Vivify").field(value).finish(),
        }
    }
}

// -----------------------------------------------------------------------------
// NullPolicy

/// The built-in null policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NullPolicyKind {
    #[default]
    Fail,
    ShortCircuit,
    AutoVivify,
}

/// Decides how a chain continues when a link reads nothing.
pub trait NullPolicy: Send + Sync + fmt::Debug {
    fn kind(&self) -> NullPolicyKind;

    /// Called with the link that read nothing.
    fn on_null(&self, link: &dyn Accessor) -> Result<NullAction, AccessError>;
}

/// Raises on the first absent link.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fail;

impl NullPolicy for Fail {
    #[inline]
    fn kind(&self) -> NullPolicyKind {
        NullPolicyKind::Fail
    }

    #[inline]
    fn on_null(&self, _: &dyn Accessor) -> Result<NullAction, AccessError> {
        Ok(NullAction::Fail)
    }
}

/// Returns absent from the first absent link on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortCircuit;

impl NullPolicy for ShortCircuit {
    #[inline]
    fn kind(&self) -> NullPolicyKind {
        NullPolicyKind::ShortCircuit
    }

    #[inline]
    fn on_null(&self, _: &dyn Accessor) -> Result<NullAction, AccessError> {
        Ok(NullAction::ShortCircuit)
    }
}

/// Builds a default instance for an absent link.
///
/// The instance comes from, in order: the instantiation override, the
/// link's value slot default (`Typed::default_value`), the registry
/// (`TypeRegistry::instantiate`). The link must be reversible so the
/// instance can be written back.
#[derive(Clone, Default)]
pub struct AutoVivify {
    registry: Option<Arc<TypeRegistry>>,
    instantiate: Option<Arc<InstantiateFn>>,
}

impl AutoVivify {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Falls back to the registry for types without a typed default.
    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Tries `instantiate` before anything else.
    pub fn with_instantiate(
        mut self,
        instantiate: impl Fn(&Type) -> Option<Box<dyn Reflect>> + Send + Sync + 'static,
    ) -> Self {
        self.instantiate = Some(Arc::new(instantiate));
        self
    }

    /// Builds an instance of `ty`, if any source knows how to.
    pub fn instantiate(&self, link: &dyn Accessor) -> Option<Box<dyn Reflect>> {
        let slot = link.value_slot();
        if let Some(value) = self.instantiate.as_ref().and_then(|f| f(slot.ty())) {
            return Some(value);
        }
        if let Some(value) = slot.default_value() {
            return Some(value);
        }
        let path = slot.ty().object_path()?;
        self.registry.as_ref()?.instantiate(path)
    }
}

impl NullPolicy for AutoVivify {
    #[inline]
    fn kind(&self) -> NullPolicyKind {
        NullPolicyKind::AutoVivify
    }

    fn on_null(&self, link: &dyn Accessor) -> Result<NullAction, AccessError> {
        if !link.is_reversible() {
            return Err(AccessError::NonReversible {
                point: link.description(),
            });
        }
        match self.instantiate(link) {
            Some(value) => Ok(NullAction::Vivify(value)),
            None => Err(AccessError::Uninstantiable {
                ty: link.value_slot().ty().to_string(),
                link: link.description(),
            }),
        }
    }
}

impl fmt::Debug for AutoVivify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoVivify")
            .field("registry", &self.registry.is_some())
            .field("instantiate", &self.instantiate.is_some())
            .finish()
    }
}

impl NullPolicyKind {
    /// Creates the policy with default settings.
    pub fn build(self) -> Arc<dyn NullPolicy> {
        match self {
            Self::Fail => Arc::new(Fail),
            Self::ShortCircuit => Arc::new(ShortCircuit),
            Self::AutoVivify => Arc::new(AutoVivify::new()),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{AutoVivify, NullAction, NullPolicy, NullPolicyKind};
    use crate::AccessError;
    use crate::fixtures::{self, Address, City};
    use crate::point::{FieldAccessor, MethodAccessor};
    use alloc::boxed::Box;
    use alloc::string::String;

    #[test]
    fn vivify_sources() {
        let registry = fixtures::registry();
        // `Address` has no typed default, only a registered constructor
        let address = FieldAccessor::new(&registry, "fixtures::Person", "address").unwrap();
        assert!(matches!(
            AutoVivify::new().on_null(&address),
            Err(AccessError::Uninstantiable { .. })
        ));
        let NullAction::Vivify(value) = AutoVivify::new()
            .with_registry(registry.clone())
            .on_null(&address)
            .unwrap()
        else {
            panic!("expected a value");
        };
        assert!(value.is::<Address>());

        // the override comes first
        let city = FieldAccessor::new(&registry, "fixtures::Address", "city").unwrap();
        let policy = AutoVivify::new().with_instantiate(|_| {
            Some(Box::new(City {
                name: String::from("?"),
            }))
        });
        let NullAction::Vivify(value) = policy.on_null(&city).unwrap() else {
            panic!("expected a value");
        };
        assert_eq!(value.downcast_ref::<City>().unwrap().name, "?");
    }

    #[test]
    fn vivify_needs_reversible_link() {
        let registry = fixtures::registry();
        let count = MethodAccessor::new(&registry, "fixtures::Person", "phone_count").unwrap();
        assert!(matches!(
            AutoVivify::new().on_null(&count),
            Err(AccessError::NonReversible { .. })
        ));
    }

    #[test]
    fn kinds() {
        assert_eq!(NullPolicyKind::default(), NullPolicyKind::Fail);
        for kind in [
            NullPolicyKind::Fail,
            NullPolicyKind::ShortCircuit,
            NullPolicyKind::AutoVivify,
        ] {
            assert_eq!(kind.build().kind(), kind);
        }
    }
}
