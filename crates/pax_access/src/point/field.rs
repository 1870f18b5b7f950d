use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::fmt;

use pax_reflect::info::{FieldInfo, InvokeFault, Type, ValueSlot};
use pax_reflect::registry::TypeRegistry;
use pax_reflect::{Reflect, Value};

use crate::AccessError;
use crate::error::render_value;
use crate::point::{AccessKey, AccessKind, AccessPoint, Accessor, Direction, Mutator, Owner};
use crate::point::{Shape, impl_key_eq};

struct FieldPoint {
    owner: Owner,
    field: Arc<FieldInfo>,
}

impl FieldPoint {
    fn new(registry: &Arc<TypeRegistry>, owner: &str, name: &str) -> Result<Self, AccessError> {
        let path = Owner::resolve(registry, owner)?;
        let field = registry
            .field(path, name)
            .ok_or_else(|| AccessError::MemberNotFound {
                owner: path.to_string(),
                name: name.to_string(),
            })?;
        Self::with_field(registry, path, field.clone())
    }

    fn with_field(
        registry: &Arc<TypeRegistry>,
        owner: &str,
        field: Arc<FieldInfo>,
    ) -> Result<Self, AccessError> {
        Ok(Self {
            owner: Owner::new(registry, owner, field.declaring_type())?,
            field,
        })
    }

    fn description(&self) -> String {
        format!("{}.{}", self.owner.path(), self.field.name())
    }

    fn key(&self, direction: Direction) -> AccessKey {
        AccessKey::new(AccessKind::Field, direction, self.field.signature())
    }
}

// -----------------------------------------------------------------------------
// FieldAccessor

/// Reads a field.
///
/// The mirror [`FieldMutator`] is built together with the accessor. Fields
/// inherited from an ancestor are reached through the registered upcasts.
#[derive(Clone)]
pub struct FieldAccessor {
    point: Arc<FieldPoint>,
    mirror: Arc<FieldMutator>,
}

impl FieldAccessor {
    /// Looks up the field `name` on `owner` or one of its ancestors.
    pub fn new(registry: &Arc<TypeRegistry>, owner: &str, name: &str) -> Result<Self, AccessError> {
        Ok(Self::from_point(Arc::new(FieldPoint::new(registry, owner, name)?)))
    }

    /// Reads `field` on values of type `owner`.
    pub fn with_field(
        registry: &Arc<TypeRegistry>,
        owner: &str,
        field: Arc<FieldInfo>,
    ) -> Result<Self, AccessError> {
        Ok(Self::from_point(Arc::new(FieldPoint::with_field(
            registry, owner, field,
        )?)))
    }

    fn from_point(point: Arc<FieldPoint>) -> Self {
        Self {
            mirror: Arc::new(FieldMutator {
                point: point.clone(),
            }),
            point,
        }
    }

    #[inline]
    pub fn field(&self) -> &Arc<FieldInfo> {
        &self.point.field
    }

    /// The mirror, without going through [`Accessor::to_mutator`].
    #[inline]
    pub fn mutator(&self) -> &Arc<FieldMutator> {
        &self.mirror
    }
}

impl AccessPoint for FieldAccessor {
    #[inline]
    fn input(&self) -> Type {
        self.point.owner.ty()
    }

    #[inline]
    fn value_slot(&self) -> &ValueSlot {
        self.point.field.slot()
    }

    #[inline]
    fn accepts(&self, input: &Type) -> bool {
        self.point.owner.accepts(input)
    }

    fn description(&self) -> String {
        self.point.description()
    }

    fn segment(&self) -> String {
        self.point.field.name().to_string()
    }

    fn key(&self) -> AccessKey {
        self.point.key(Direction::Read)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Field(&self.point.field)
    }
}

impl Accessor for FieldAccessor {
    fn read<'a>(&self, target: &'a dyn Reflect) -> Result<Option<Value<'a>>, AccessError> {
        self.point
            .field
            .get(self.point.owner.upcast(target))
            .map(|value| value.map(Value::Borrowed))
            .map_err(|fault| AccessError::from_fault(self, target.reflect_type_name(), None, fault))
    }

    fn read_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
    ) -> Result<Option<&'a mut dyn Reflect>, AccessError> {
        let found = target.reflect_type_name();
        let fail = |fault: InvokeFault| AccessError::from_fault(self, found, None, fault);
        let target = self.point.owner.upcast_mut(target).map_err(fail)?;
        self.point.field.get_mut(target).map_err(fail)
    }

    #[inline]
    fn to_mutator(&self) -> Result<Arc<dyn Mutator>, AccessError> {
        Ok(self.mirror.clone())
    }

    #[inline]
    fn is_reversible(&self) -> bool {
        true
    }
}

impl fmt::Debug for FieldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldAccessor")
            .field(&self.point.description())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// FieldMutator

/// Writes a field.
#[derive(Clone)]
pub struct FieldMutator {
    point: Arc<FieldPoint>,
}

impl FieldMutator {
    pub fn new(registry: &Arc<TypeRegistry>, owner: &str, name: &str) -> Result<Self, AccessError> {
        Ok(Self {
            point: Arc::new(FieldPoint::new(registry, owner, name)?),
        })
    }

    pub fn with_field(
        registry: &Arc<TypeRegistry>,
        owner: &str,
        field: Arc<FieldInfo>,
    ) -> Result<Self, AccessError> {
        Ok(Self {
            point: Arc::new(FieldPoint::with_field(registry, owner, field)?),
        })
    }

    #[inline]
    pub fn field(&self) -> &Arc<FieldInfo> {
        &self.point.field
    }
}

impl AccessPoint for FieldMutator {
    #[inline]
    fn input(&self) -> Type {
        self.point.owner.ty()
    }

    #[inline]
    fn value_slot(&self) -> &ValueSlot {
        self.point.field.slot()
    }

    #[inline]
    fn accepts(&self, input: &Type) -> bool {
        self.point.owner.accepts(input)
    }

    fn description(&self) -> String {
        self.point.description()
    }

    fn segment(&self) -> String {
        self.point.field.name().to_string()
    }

    fn key(&self) -> AccessKey {
        self.point.key(Direction::Write)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Field(&self.point.field)
    }
}

impl Mutator for FieldMutator {
    fn write(
        &self,
        target: &mut dyn Reflect,
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), AccessError> {
        let found = target.reflect_type_name();
        let rendered = value.as_deref().map(render_value);
        let fail = |fault: InvokeFault| {
            AccessError::from_write_fault(self, found, rendered.clone(), fault)
        };
        self.point.field.slot().check(value.as_deref()).map_err(fail)?;
        let target = self.point.owner.upcast_mut(target).map_err(fail)?;
        self.point.field.set(target, value).map_err(fail)
    }

    #[inline]
    fn to_accessor(&self) -> Result<Arc<dyn Accessor>, AccessError> {
        Ok(Arc::new(FieldAccessor::from_point(self.point.clone())))
    }

    #[inline]
    fn is_reversible(&self) -> bool {
        true
    }
}

impl fmt::Debug for FieldMutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldMutator")
            .field(&self.point.description())
            .finish()
    }
}

impl_key_eq!(FieldAccessor, FieldMutator);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{FieldAccessor, FieldMutator};
    use crate::error::InvocationKind;
    use crate::fixtures::{self, Address, City, Employee, Person};
    use crate::point::{AccessPoint, Accessor, Mutator};
    use crate::AccessError;
    use alloc::boxed::Box;
    use alloc::string::String;
    use pax_reflect::info::Type;

    #[test]
    fn round_trip_through_eager_mirror() {
        let registry = fixtures::registry();
        let accessor = FieldAccessor::new(&registry, "fixtures::City", "name").unwrap();
        let mutator = accessor.to_mutator().unwrap();

        let mut city = City::default();
        mutator.set(&mut city, String::from("Paris")).unwrap();
        let value = accessor.read(&city).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "Paris");

        let back = mutator.to_accessor().unwrap();
        assert_eq!(back.key(), accessor.key());
    }

    #[test]
    fn optional_field_reads_none() {
        let registry = fixtures::registry();
        let city = FieldAccessor::new(&registry, "fixtures::Address", "city").unwrap();
        assert!(city.read(&Address::default()).unwrap().is_none());
        assert!(city.value_slot().is_nullable());

        let mut address = Address::default();
        city.mutator()
            .write(&mut address, Some(Box::new(City::default())))
            .unwrap();
        assert!(city.read_mut(&mut address).unwrap().is_some());
        city.mutator().write(&mut address, None).unwrap();
        assert!(address.city.is_none());
    }

    #[test]
    fn inherited_field_goes_through_upcast() {
        let registry = fixtures::registry();
        let name = FieldAccessor::new(&registry, "fixtures::Employee", "name").unwrap();
        assert_eq!(name.description(), "fixtures::Employee.name");

        let mut employee = Employee::default();
        name.mutator()
            .write(&mut employee, Some(Box::new(String::from("Ada"))))
            .unwrap();
        assert_eq!(employee.person.name, "Ada");

        // the declaring type itself is accepted as well
        let person = Person {
            name: String::from("Grace"),
            ..Person::default()
        };
        let value = name.read(&person).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "Grace");
    }

    #[test]
    fn subtype_instances_reach_the_declaring_type() {
        let registry = fixtures::registry();
        let name = FieldAccessor::new(&registry, "fixtures::Person", "name").unwrap();
        assert!(name.accepts(&Type::Object("fixtures::Employee")));

        let mut employee = Employee::default();
        name.mutator()
            .write(&mut employee, Some(Box::new(String::from("Ada"))))
            .unwrap();
        assert_eq!(employee.person.name, "Ada");

        let value = name.read(&employee).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "Ada");
        let value = name.read_mut(&mut employee).unwrap().unwrap();
        assert!(value.is::<String>());

        // unrelated types still report the wrong target
        let err = name.read(&City::default()).unwrap_err();
        assert_eq!(err.invocation_kind(), Some(InvocationKind::WrongTarget));
    }

    #[test]
    fn failures_are_classified() {
        let registry = fixtures::registry();
        let mutator = FieldMutator::new(&registry, "fixtures::City", "name").unwrap();

        let mut city = City::default();
        let err = mutator.write(&mut city, Some(Box::new(3_u8))).unwrap_err();
        assert_eq!(err.invocation_kind(), Some(InvocationKind::IncompatibleValue));
        let AccessError::Invocation(invocation) = &err else {
            panic!("unexpected {err:?}");
        };
        assert_eq!(invocation.point(), "fixtures::City.name");
        assert_eq!(invocation.value(), Some("3"));

        let mut address = Address::default();
        let err = mutator
            .write(&mut address, Some(Box::new(String::from("Paris"))))
            .unwrap_err();
        assert_eq!(err.invocation_kind(), Some(InvocationKind::WrongTarget));
        let AccessError::Invocation(invocation) = &err else {
            panic!("unexpected {err:?}");
        };
        assert_eq!(invocation.value(), Some("\"Paris\""));

        let err = mutator.write(&mut city, None).unwrap_err();
        assert_eq!(err.invocation_kind(), Some(InvocationKind::IncompatibleValue));
    }

    #[test]
    fn unknown_fields() {
        let registry = fixtures::registry();
        assert!(matches!(
            FieldAccessor::new(&registry, "fixtures::City", "zip"),
            Err(AccessError::MemberNotFound { .. })
        ));
        assert!(matches!(
            FieldAccessor::new(&registry, "fixtures::Town", "name"),
            Err(AccessError::Signature(_))
        ));
    }
}
