use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use pax_reflect::info::{MethodInfo, Type, ValueSlot};
use pax_reflect::reference::{BoundFunction, Member, MemberResolver, ReferenceMetadata};
use pax_reflect::{Reflect, Value};

use crate::AccessError;
use crate::point::{AccessKey, AccessKind, AccessPoint, Accessor, BoundParam, Direction};
use crate::point::{MethodAccessor, MethodMutator, Mutator, Shape, impl_key_eq};

fn resolve(
    resolver: &MemberResolver,
    function: &dyn BoundFunction,
) -> Result<(ReferenceMetadata, Arc<MethodInfo>), AccessError> {
    let metadata = resolver.extract_metadata(function)?;
    match resolver.resolve(function)? {
        Member::Method(method) => Ok((metadata, method)),
        member @ Member::Constructor(_) => Err(AccessError::UnsupportedMemberShape {
            member: member.signature(),
            reason: "a constructor cannot back an access point".into(),
        }),
    }
}

// -----------------------------------------------------------------------------
// ReferenceAccessor

/// Reads a property through a member reference.
///
/// The reference is resolved once, at construction, against the type it
/// was written for, so a reference instantiated on a subtype reads
/// instances of that subtype.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pax_access::point::{AccessPoint, Accessor, ReferenceAccessor};
/// use pax_reflect::impl_typed;
/// use pax_reflect::info::{MethodInfo, TypeInfo};
/// use pax_reflect::reference::{MemberRef, MemberResolver};
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
/// let number = ReferenceAccessor::new(&resolver, &reference).unwrap();
/// assert_eq!(number.description(), "app::Phone::get_number()");
///
/// let phone = Phone { number: "112".into() };
/// let value = number.read(&phone).unwrap().unwrap();
/// assert_eq!(value.downcast_ref::<String>().unwrap(), "112");
/// ```
#[derive(Clone)]
pub struct ReferenceAccessor {
    metadata: ReferenceMetadata,
    inner: MethodAccessor,
}

impl ReferenceAccessor {
    #[inline]
    pub fn new(
        resolver: &MemberResolver,
        function: &dyn BoundFunction,
    ) -> Result<Self, AccessError> {
        Self::with_params(resolver, function, Vec::new())
    }

    /// Resolves `function` and binds `params` to the resolved query.
    pub fn with_params(
        resolver: &MemberResolver,
        function: &dyn BoundFunction,
        params: Vec<BoundParam>,
    ) -> Result<Self, AccessError> {
        let (metadata, method) = resolve(resolver, function)?;
        let inner = MethodAccessor::with_method(
            resolver.registry(),
            metadata.instantiated_type,
            method,
            params,
        )?;
        Ok(Self { metadata, inner })
    }

    #[inline]
    pub fn metadata(&self) -> &ReferenceMetadata {
        &self.metadata
    }

    #[inline]
    pub fn method(&self) -> &Arc<MethodInfo> {
        self.inner.method()
    }

    #[inline]
    pub fn params(&self) -> &[BoundParam] {
        self.inner.params()
    }

    /// Replaces the bound parameters. The memoized mirror is dropped.
    #[inline]
    pub fn rebind(&mut self, params: Vec<BoundParam>) -> Result<(), AccessError> {
        self.inner.rebind(params)
    }

    /// Reads with call-time parameters instead of the bound ones.
    #[inline]
    pub fn read_with<'a>(
        &self,
        target: &'a dyn Reflect,
        args: &[&dyn Reflect],
    ) -> Result<Option<Value<'a>>, AccessError> {
        self.inner.point().invoke(self, target, args)
    }
}

impl AccessPoint for ReferenceAccessor {
    #[inline]
    fn input(&self) -> Type {
        self.inner.input()
    }

    #[inline]
    fn value_slot(&self) -> &ValueSlot {
        self.inner.value_slot()
    }

    #[inline]
    fn accepts(&self, input: &Type) -> bool {
        self.inner.accepts(input)
    }

    fn description(&self) -> String {
        self.inner.description()
    }

    fn segment(&self) -> String {
        self.inner.segment()
    }

    fn key(&self) -> AccessKey {
        self.inner.point().key(AccessKind::Reference, Direction::Read)
    }

    fn shape(&self) -> Shape<'_> {
        self.inner.shape()
    }
}

impl Accessor for ReferenceAccessor {
    fn read<'a>(&self, target: &'a dyn Reflect) -> Result<Option<Value<'a>>, AccessError> {
        let args: Vec<&dyn Reflect> = self.params().iter().map(BoundParam::value).collect();
        self.inner.point().invoke(self, target, &args)
    }

    fn read_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
    ) -> Result<Option<&'a mut dyn Reflect>, AccessError> {
        let args: Vec<&dyn Reflect> = self.params().iter().map(BoundParam::value).collect();
        self.inner.point().project_mut(self, target, &args)
    }

    /// Shares the mirror memoized by the underlying method accessor.
    #[inline]
    fn to_mutator(&self) -> Result<Arc<dyn Mutator>, AccessError> {
        self.inner.to_mutator()
    }
}

impl fmt::Debug for ReferenceAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceAccessor")
            .field("point", &self.description())
            .field("implementing_type", &self.metadata.implementing_type)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ReferenceMutator

/// Writes a property through a reference to a setter.
#[derive(Clone)]
pub struct ReferenceMutator {
    metadata: ReferenceMetadata,
    inner: MethodMutator,
}

impl ReferenceMutator {
    #[inline]
    pub fn new(
        resolver: &MemberResolver,
        function: &dyn BoundFunction,
    ) -> Result<Self, AccessError> {
        Self::with_params(resolver, function, Vec::new())
    }

    pub fn with_params(
        resolver: &MemberResolver,
        function: &dyn BoundFunction,
        params: Vec<BoundParam>,
    ) -> Result<Self, AccessError> {
        let (metadata, method) = resolve(resolver, function)?;
        let inner = MethodMutator::with_method(
            resolver.registry(),
            metadata.instantiated_type,
            method,
            params,
        )?;
        Ok(Self { metadata, inner })
    }

    #[inline]
    pub fn metadata(&self) -> &ReferenceMetadata {
        &self.metadata
    }

    #[inline]
    pub fn method(&self) -> &Arc<MethodInfo> {
        self.inner.method()
    }

    #[inline]
    pub fn params(&self) -> &[BoundParam] {
        self.inner.params()
    }

    #[inline]
    pub fn rebind(&mut self, params: Vec<BoundParam>) -> Result<(), AccessError> {
        self.inner.rebind(params)
    }

    /// Writes with call-time parameters instead of the bound ones.
    #[inline]
    pub fn write_with(
        &self,
        target: &mut dyn Reflect,
        args: &[&dyn Reflect],
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), AccessError> {
        self.inner.point().assign(self, target, args, value)
    }
}

impl AccessPoint for ReferenceMutator {
    #[inline]
    fn input(&self) -> Type {
        self.inner.input()
    }

    #[inline]
    fn value_slot(&self) -> &ValueSlot {
        self.inner.value_slot()
    }

    #[inline]
    fn accepts(&self, input: &Type) -> bool {
        self.inner.accepts(input)
    }

    fn description(&self) -> String {
        self.inner.description()
    }

    fn segment(&self) -> String {
        self.inner.segment()
    }

    fn key(&self) -> AccessKey {
        self.inner.point().key(AccessKind::Reference, Direction::Write)
    }

    fn shape(&self) -> Shape<'_> {
        self.inner.shape()
    }
}

impl Mutator for ReferenceMutator {
    fn write(
        &self,
        target: &mut dyn Reflect,
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), AccessError> {
        let args: Vec<&dyn Reflect> = self.params().iter().map(BoundParam::value).collect();
        self.inner.point().assign(self, target, &args, value)
    }

    #[inline]
    fn to_accessor(&self) -> Result<Arc<dyn Accessor>, AccessError> {
        self.inner.to_accessor()
    }
}

impl fmt::Debug for ReferenceMutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceMutator")
            .field("point", &self.description())
            .field("implementing_type", &self.metadata.implementing_type)
            .finish()
    }
}

impl_key_eq!(ReferenceAccessor, ReferenceMutator);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ReferenceAccessor, ReferenceMutator};
    use crate::fixtures::{self, Employee, Person, Phone};
    use crate::point::{AccessKind, AccessPoint, Accessor, MethodAccessor, Mutator};
    use crate::AccessError;
    use alloc::string::String;
    use pax_reflect::reference::{Closure, MemberRef, MemberResolver};

    #[test]
    fn getter_reference_round_trip() {
        let resolver = MemberResolver::new(fixtures::registry());
        let reference = MemberRef::getter::<Phone, String>("get_number", Phone::get_number);
        let number = ReferenceAccessor::new(&resolver, &reference).unwrap();
        assert_eq!(number.key().kind, AccessKind::Reference);
        assert_eq!(number.metadata().implementing_type, "fixtures::Phone");

        // no `set_number`, the private field takes over
        let mutator = number.to_mutator().unwrap();
        assert_eq!(mutator.key().kind, AccessKind::Field);

        let mut phone = Phone::default();
        mutator.set(&mut phone, String::from("0800")).unwrap();
        let value = number.read(&phone).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "0800");
    }

    #[test]
    fn reference_on_subtype() {
        let resolver = MemberResolver::new(fixtures::registry());
        let reference = MemberRef::getter::<Person, String>("get_name", Person::get_name)
            .instantiated_as::<Employee>();
        let name = ReferenceAccessor::new(&resolver, &reference).unwrap();
        assert_eq!(name.metadata().instantiated_type, "fixtures::Employee");
        assert_eq!(name.description(), "fixtures::Employee::get_name()");

        let mut employee = Employee::default();
        employee.person.name = String::from("Lin");
        let value = name.read(&employee).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "Lin");
    }

    #[test]
    fn setter_reference() {
        let resolver = MemberResolver::new(fixtures::registry());
        let reference = MemberRef::setter::<Person, String>("set_name", Person::set_name);
        let mutator = ReferenceMutator::new(&resolver, &reference).unwrap();

        let mut person = Person::default();
        mutator.write(&mut person, Some(alloc::boxed::Box::new(String::from("Ana")))).unwrap();
        assert_eq!(person.name, "Ana");

        let accessor = mutator.to_accessor().unwrap();
        assert_eq!(accessor.segment(), "get_name()");

        // a setter cannot back an accessor
        assert!(matches!(
            ReferenceAccessor::new(&resolver, &reference),
            Err(AccessError::UnsupportedMemberShape { .. })
        ));
    }

    #[test]
    fn closures_and_constructors_are_rejected() {
        let resolver = MemberResolver::new(fixtures::registry());
        let closure = Closure(|phone: &Phone| phone.number.len());
        assert!(matches!(
            ReferenceAccessor::new(&resolver, &closure),
            Err(AccessError::UnsupportedReference { .. })
        ));

        let constructor = MemberRef::constructor::<Phone, (String,)>(|(number,)| Phone { number });
        assert!(matches!(
            ReferenceAccessor::new(&resolver, &constructor),
            Err(AccessError::UnsupportedMemberShape { .. })
        ));
    }

    #[test]
    fn reference_and_method_differ_in_identity_only() {
        let registry = fixtures::registry();
        let resolver = MemberResolver::new(registry.clone());
        let reference = MemberRef::getter::<Phone, String>("get_number", Phone::get_number);
        let by_reference = ReferenceAccessor::new(&resolver, &reference).unwrap();
        let by_method = MethodAccessor::new(&registry, "fixtures::Phone", "get_number").unwrap();

        assert_eq!(by_reference.key().signature, by_method.key().signature);
        assert_ne!(by_reference.key(), by_method.key());
    }
}
