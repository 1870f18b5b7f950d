use alloc::borrow::Cow;
use alloc::string::ToString;
use alloc::sync::Arc;
use core::any::TypeId;

use pax_reflect::Reflect;
use pax_reflect::info::{InvokeFault, Receiver, Type};
use pax_reflect::registry::TypeRegistry;
use pax_reflect::signature::SignatureError;

use crate::AccessError;

/// The type an access point was built against, and the upcasts leading to
/// the type declaring its member.
#[derive(Clone)]
pub(crate) struct Owner {
    registry: Arc<TypeRegistry>,
    path: &'static str,
    declaring: &'static str,
    type_id: Option<TypeId>,
    receiver: Receiver,
}

impl Owner {
    /// Looks up `path` and the receiver from it to `declaring`.
    pub fn new(
        registry: &Arc<TypeRegistry>,
        path: &str,
        declaring: &'static str,
    ) -> Result<Self, AccessError> {
        let path = Self::resolve(registry, path)?;
        let receiver = registry
            .receiver(path, declaring)
            .ok_or_else(|| AccessError::TypeMismatch {
                point: path.to_string(),
                expected: declaring.to_string(),
                found: path.to_string(),
            })?;
        Ok(Self {
            registry: registry.clone(),
            path,
            declaring,
            type_id: registry.get(path).and_then(|info| info.type_id()),
            receiver,
        })
    }

    /// Returns the registered path for `path`.
    pub fn resolve(registry: &TypeRegistry, path: &str) -> Result<&'static str, AccessError> {
        registry.resolve_path(path).ok_or_else(|| {
            AccessError::Signature(SignatureError::TypeNotFound { name: path.into() })
        })
    }

    #[inline]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    #[inline]
    pub fn path(&self) -> &'static str {
        self.path
    }

    #[inline]
    pub fn declaring(&self) -> &'static str {
        self.declaring
    }

    #[inline]
    pub fn ty(&self) -> Type {
        Type::Object(self.path)
    }

    /// Returns `true` if instances of `input` can be passed as the owner.
    pub fn accepts(&self, input: &Type) -> bool {
        input
            .object_path()
            .is_some_and(|path| self.registry.is_assignable(path, self.path))
    }

    /// Returns the upcasts from the runtime type of `target` to the
    /// declaring type, `None` if `target` is not an instance of the owner
    /// or of one of its registered subtypes.
    fn receiver_for(&self, target: &dyn Reflect) -> Option<Cow<'_, Receiver>> {
        let type_id = target.as_any().type_id();
        if self.type_id == Some(type_id) {
            return Some(Cow::Borrowed(&self.receiver));
        }
        let info = self.registry.get_by_id(type_id)?;
        if !self.registry.is_ancestor(self.path, info.path()) {
            return None;
        }
        self.registry
            .receiver(info.path(), self.declaring)
            .map(Cow::Owned)
    }

    /// Walks up to the declaring type. Other values are returned unchanged
    /// so the member reports the wrong target itself.
    pub fn upcast<'a>(&self, target: &'a dyn Reflect) -> &'a dyn Reflect {
        match self.receiver_for(target) {
            Some(receiver) if !receiver.is_identity() => receiver.apply(target).unwrap_or(target),
            _ => target,
        }
    }

    pub fn upcast_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
    ) -> Result<&'a mut dyn Reflect, InvokeFault> {
        let receiver = match self.receiver_for(&*target) {
            Some(receiver) if !receiver.is_identity() => receiver,
            _ => return Ok(target),
        };
        let found = target.reflect_type_name();
        receiver.apply_mut(target).ok_or(InvokeFault::WrongTarget {
            expected: self.declaring,
            found,
        })
    }
}
