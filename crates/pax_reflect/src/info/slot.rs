use alloc::boxed::Box;
use core::any::TypeId;
use core::fmt;

use crate::Reflect;
use crate::info::{InvokeFault, Type, Typed};

/// A typed position a value can be read from or written to.
///
/// Describes field types, method return types and assigned values alike:
/// the descriptor type, the concrete Rust type, whether the position may be
/// absent, and how to build a default instance.
#[derive(Clone)]
pub struct ValueSlot {
    ty: Type,
    type_id: TypeId,
    type_name: &'static str,
    nullable: bool,
    default: fn() -> Option<Box<dyn Reflect>>,
}

impl ValueSlot {
    /// A slot that always holds a `T`.
    #[inline]
    pub fn of<T: Typed>() -> Self {
        Self {
            ty: T::ty(),
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            nullable: false,
            default: T::default_value,
        }
    }

    /// A slot that holds a `T` or nothing.
    #[inline]
    pub fn nullable<T: Typed>() -> Self {
        Self {
            nullable: true,
            ..Self::of::<T>()
        }
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Builds a default instance of the slot's type, if it has one.
    #[inline]
    pub fn default_value(&self) -> Option<Box<dyn Reflect>> {
        (self.default)()
    }

    /// Returns `true` if `value` is an instance of the slot's type.
    #[inline]
    pub fn accepts(&self, value: &dyn Reflect) -> bool {
        value.as_any().type_id() == self.type_id
    }

    /// Checks that `value` may be stored in this slot.
    pub fn check(&self, value: Option<&dyn Reflect>) -> Result<(), InvokeFault> {
        match value {
            None if self.nullable => Ok(()),
            None => Err(InvokeFault::NullValue {
                expected: self.type_name,
            }),
            Some(value) if self.accepts(value) => Ok(()),
            Some(value) => Err(InvokeFault::Incompatible {
                expected: self.type_name,
                found: value.reflect_type_name(),
            }),
        }
    }
}

impl fmt::Debug for ValueSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSlot")
            .field("ty", &self.ty)
            .field("type_name", &self.type_name)
            .field("nullable", &self.nullable)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ValueSlot {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.nullable == other.nullable
    }
}

impl Eq for ValueSlot {}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ValueSlot;
    use crate::info::InvokeFault;
    use alloc::string::String;

    #[test]
    fn check_nullability_and_type() {
        let slot = ValueSlot::of::<String>();
        assert!(slot.check(Some(&String::from("x"))).is_ok());
        assert!(matches!(
            slot.check(None),
            Err(InvokeFault::NullValue { .. })
        ));
        assert!(matches!(
            slot.check(Some(&3_i32)),
            Err(InvokeFault::Incompatible { .. })
        ));

        let slot = ValueSlot::nullable::<String>();
        assert!(slot.check(None).is_ok());
        assert!(slot.default_value().is_some());
    }
}
