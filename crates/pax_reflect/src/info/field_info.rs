use alloc::boxed::Box;
use core::any::TypeId;
use core::fmt;

use crate::Reflect;
use crate::info::{InvokeFault, Type, Typed, ValueSlot, Visibility};
use crate::info::{path_of, take_optional, take_value, target_mut, target_ref};

// -----------------------------------------------------------------------------
// FieldSlot

/// Erased get / get_mut / set functions of one field.
trait FieldSlot: Send + Sync {
    fn get<'a>(&self, target: &'a dyn Reflect) -> Result<Option<&'a dyn Reflect>, InvokeFault>;

    fn get_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
    ) -> Result<Option<&'a mut dyn Reflect>, InvokeFault>;

    fn set(&self, target: &mut dyn Reflect, value: Option<Box<dyn Reflect>>)
    -> Result<(), InvokeFault>;
}

struct Required<S, T> {
    get: fn(&S) -> &T,
    get_mut: fn(&mut S) -> &mut T,
}

impl<S: Reflect, T: Reflect> FieldSlot for Required<S, T> {
    fn get<'a>(&self, target: &'a dyn Reflect) -> Result<Option<&'a dyn Reflect>, InvokeFault> {
        let target = target_ref::<S>(target)?;
        Ok(Some((self.get)(target)))
    }

    fn get_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
    ) -> Result<Option<&'a mut dyn Reflect>, InvokeFault> {
        let target = target_mut::<S>(target)?;
        Ok(Some((self.get_mut)(target)))
    }

    fn set(
        &self,
        target: &mut dyn Reflect,
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), InvokeFault> {
        let target = target_mut::<S>(target)?;
        *(self.get_mut)(target) = take_value::<T>(value)?;
        Ok(())
    }
}

struct Optional<S, T> {
    get: fn(&S) -> &Option<T>,
    get_mut: fn(&mut S) -> &mut Option<T>,
}

impl<S: Reflect, T: Reflect> FieldSlot for Optional<S, T> {
    fn get<'a>(&self, target: &'a dyn Reflect) -> Result<Option<&'a dyn Reflect>, InvokeFault> {
        let target = target_ref::<S>(target)?;
        Ok((self.get)(target).as_ref().map(|value| value as &dyn Reflect))
    }

    fn get_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
    ) -> Result<Option<&'a mut dyn Reflect>, InvokeFault> {
        let target = target_mut::<S>(target)?;
        Ok((self.get_mut)(target)
            .as_mut()
            .map(|value| value as &mut dyn Reflect))
    }

    fn set(
        &self,
        target: &mut dyn Reflect,
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), InvokeFault> {
        let target = target_mut::<S>(target)?;
        *(self.get_mut)(target) = take_optional::<T>(value)?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// FieldInfo

/// A named field of a registered type.
///
/// Optional fields (`Option<T>`) are described by their inner type `T` and
/// a nullable [`ValueSlot`]; reading an empty one yields `None`.
///
/// # Examples
///
/// ```
/// use pax_reflect::impl_typed;
/// use pax_reflect::info::{FieldInfo, Type};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct City { name: String, zip: Option<u32> }
/// impl_typed!(City as "geo::City");
///
/// let name = FieldInfo::required::<City, String>("name", |c| &c.name, |c| &mut c.name);
/// let zip = FieldInfo::optional::<City, u32>("zip", |c| &c.zip, |c| &mut c.zip);
///
/// let mut city = City { name: "Paris".into(), zip: None };
/// assert_eq!(name.declaring_type(), "geo::City");
/// assert_eq!(name.ty(), &Type::Object("String"));
/// assert!(zip.get(&city).unwrap().is_none());
///
/// zip.set(&mut city, Some(Box::new(75001_u32))).unwrap();
/// assert_eq!(city.zip, Some(75001));
/// ```
pub struct FieldInfo {
    name: &'static str,
    declaring_type: &'static str,
    declaring_type_id: TypeId,
    slot: ValueSlot,
    visibility: Visibility,
    body: Box<dyn FieldSlot>,
}

impl FieldInfo {
    /// A field that always holds a value.
    pub fn required<S: Typed, T: Typed>(
        name: &'static str,
        get: fn(&S) -> &T,
        get_mut: fn(&mut S) -> &mut T,
    ) -> Self {
        Self {
            name,
            declaring_type: path_of::<S>(),
            declaring_type_id: TypeId::of::<S>(),
            slot: ValueSlot::of::<T>(),
            visibility: Visibility::Public,
            body: Box::new(Required { get, get_mut }),
        }
    }

    /// A field stored as `Option<T>`.
    pub fn optional<S: Typed, T: Typed>(
        name: &'static str,
        get: fn(&S) -> &Option<T>,
        get_mut: fn(&mut S) -> &mut Option<T>,
    ) -> Self {
        Self {
            name,
            declaring_type: path_of::<S>(),
            declaring_type_id: TypeId::of::<S>(),
            slot: ValueSlot::nullable::<T>(),
            visibility: Visibility::Public,
            body: Box::new(Optional { get, get_mut }),
        }
    }

    /// Marks the field as private.
    #[inline]
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the path of the type declaring this field.
    #[inline]
    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }

    #[inline]
    pub fn declaring_type_id(&self) -> TypeId {
        self.declaring_type_id
    }

    /// Returns the descriptor type of the field, `T` for `Option<T>`.
    #[inline]
    pub fn ty(&self) -> &Type {
        self.slot.ty()
    }

    #[inline]
    pub fn slot(&self) -> &ValueSlot {
        &self.slot
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Returns `<declaring type>.<name>:<descriptor>`.
    pub fn signature(&self) -> alloc::string::String {
        alloc::format!(
            "{}.{}:{}",
            self.declaring_type,
            self.name,
            self.slot.ty().descriptor()
        )
    }

    /// Reads the field.
    #[inline]
    pub fn get<'a>(&self, target: &'a dyn Reflect) -> Result<Option<&'a dyn Reflect>, InvokeFault> {
        self.body.get(target)
    }

    /// Reads the field mutably.
    #[inline]
    pub fn get_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
    ) -> Result<Option<&'a mut dyn Reflect>, InvokeFault> {
        self.body.get_mut(target)
    }

    /// Assigns the field. `None` clears an optional field.
    #[inline]
    pub fn set(
        &self,
        target: &mut dyn Reflect,
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), InvokeFault> {
        self.body.set(target, value)
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type)
            .field("slot", &self.slot)
            .field("visibility", &self.visibility)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::fixtures::{Address, City, Person};
    use crate::info::{FieldInfo, InvokeFault};
    use alloc::boxed::Box;
    use alloc::string::String;

    fn city_field() -> FieldInfo {
        FieldInfo::optional::<Address, City>("city", |a| &a.city, |a| &mut a.city)
    }

    #[test]
    fn optional_field_reads_none_and_assigns() {
        let field = city_field();
        let mut address = Address::default();
        assert!(field.get(&address).unwrap().is_none());

        let city = City {
            name: String::from("Paris"),
        };
        field.set(&mut address, Some(Box::new(city.clone()))).unwrap();
        assert_eq!(address.city.as_ref(), Some(&city));

        field.set(&mut address, None).unwrap();
        assert!(address.city.is_none());
    }

    #[test]
    fn wrong_target_and_value() {
        let field = city_field();
        let mut person = Person::default();
        assert!(matches!(
            field.get(&person),
            Err(InvokeFault::WrongTarget { .. })
        ));

        let mut address = Address::default();
        assert!(matches!(
            field.set(&mut address, Some(Box::new(1_u8))),
            Err(InvokeFault::Incompatible { .. })
        ));
        assert!(matches!(
            field.set(&mut person, None),
            Err(InvokeFault::WrongTarget { .. })
        ));
    }

    #[test]
    fn required_field_rejects_null() {
        let field = FieldInfo::required::<City, String>("name", |c| &c.name, |c| &mut c.name);
        let mut city = City::default();
        assert!(matches!(
            field.set(&mut city, None),
            Err(InvokeFault::NullValue { .. })
        ));
        assert_eq!(field.signature(), "fixtures::City.name:LString;");
    }
}
