use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use std::sync::OnceLock;

use log::debug;
use pax_reflect::info::{InvokeFault, MethodInfo, Type, Typed, ValueSlot};
use pax_reflect::registry::TypeRegistry;
use pax_reflect::{Reflect, Value};

use crate::AccessError;
use crate::error::render_value;
use crate::point::{AccessKey, AccessKind, AccessPoint, Accessor, Direction, Mutator, Owner};
use crate::point::{FieldAccessor, FieldMutator, Shape, impl_key_eq, naming};

// -----------------------------------------------------------------------------
// BoundParam

/// A parameter value bound to a method access point.
pub struct BoundParam {
    ty: Type,
    value: Box<dyn Reflect>,
}

impl BoundParam {
    #[inline]
    pub fn new<T: Typed>(value: T) -> Self {
        Self {
            ty: T::ty(),
            value: Box::new(value),
        }
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn value(&self) -> &dyn Reflect {
        self.value.as_reflect()
    }
}

impl Clone for BoundParam {
    fn clone(&self) -> Self {
        Self {
            ty: self.ty.clone(),
            value: self.value.clone_value(),
        }
    }
}

impl fmt::Debug for BoundParam {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.value, f)
    }
}

impl PartialEq for BoundParam {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.value.reflect_eq(other.value())
    }
}

// -----------------------------------------------------------------------------
// MethodPoint

/// What method accessors, method mutators and references share.
#[derive(Clone)]
pub(crate) struct MethodPoint {
    owner: Owner,
    method: Arc<MethodInfo>,
    params: Vec<BoundParam>,
}

impl MethodPoint {
    pub fn new(
        owner: Owner,
        method: Arc<MethodInfo>,
        params: Vec<BoundParam>,
    ) -> Result<Self, AccessError> {
        Self::check_params(&method, &params)?;
        Ok(Self {
            owner,
            method,
            params,
        })
    }

    fn check_params(method: &MethodInfo, params: &[BoundParam]) -> Result<(), AccessError> {
        let types: Vec<&Type> = params.iter().map(BoundParam::ty).collect();
        if method.bound_params().iter().eq(types.iter().copied()) {
            return Ok(());
        }
        Err(AccessError::TypeMismatch {
            point: method.signature(),
            expected: render_types(method.bound_params().iter()),
            found: render_types(types.into_iter()),
        })
    }

    /// Finds `name` among the methods of `owner` with the given kind and bound parameters.
    fn find(
        registry: &TypeRegistry,
        owner: &str,
        name: &str,
        query: bool,
        params: &[BoundParam],
    ) -> Result<Arc<MethodInfo>, AccessError> {
        let path = Owner::resolve(registry, owner)?;
        registry
            .methods_named(path, name)
            .find(|method| {
                method.is_query() == query
                    && method
                        .bound_params()
                        .iter()
                        .eq(params.iter().map(BoundParam::ty))
            })
            .cloned()
            .ok_or_else(|| AccessError::MemberNotFound {
                owner: path.to_string(),
                name: name.to_string(),
            })
    }

    #[inline]
    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    #[inline]
    pub fn method(&self) -> &Arc<MethodInfo> {
        &self.method
    }

    fn args(&self) -> Vec<&dyn Reflect> {
        self.params.iter().map(BoundParam::value).collect()
    }

    fn rendered_params(&self) -> Vec<String> {
        self.params.iter().map(|param| format!("{param:?}")).collect()
    }

    pub fn segment(&self) -> String {
        format!("{}({})", self.method.name(), self.rendered_params().join(", "))
    }

    pub fn description(&self) -> String {
        format!("{}::{}", self.owner.path(), self.segment())
    }

    pub fn key(&self, kind: AccessKind, direction: Direction) -> AccessKey {
        AccessKey::new(kind, direction, self.method.signature()).with_params(self.rendered_params())
    }

    fn same_property(&self, slot: &ValueSlot) -> bool {
        slot.type_id() == self.method.property().type_id()
    }

    /// Looks for the setter, then the field, matching this getter.
    pub fn find_mutator(&self) -> Option<Arc<dyn Mutator>> {
        let registry = self.owner.registry();
        let property = naming::property_name(self.method.name());
        for name in naming::setter_names(&property) {
            let setter = registry.methods_named(self.owner.path(), &name).find(|setter| {
                setter.is_command()
                    && setter.bound_params() == self.method.bound_params()
                    && self.same_property(setter.property())
            });
            if let Some(setter) = setter {
                let point = Self {
                    owner: self.owner.clone(),
                    method: setter.clone(),
                    params: self.params.clone(),
                };
                return Some(Arc::new(MethodMutator::from_point(point)));
            }
        }
        if !self.params.is_empty() {
            return None;
        }
        let field = registry
            .field(self.owner.path(), &property)
            .filter(|field| self.same_property(field.slot()))?;
        FieldMutator::with_field(registry, self.owner.path(), field.clone())
            .ok()
            .map(|mutator| Arc::new(mutator) as Arc<dyn Mutator>)
    }

    /// Looks for the getter, then the field, matching this setter.
    pub fn find_accessor(&self) -> Option<Arc<dyn Accessor>> {
        let registry = self.owner.registry();
        let property = naming::property_name(self.method.name());
        for name in naming::getter_names(&property) {
            let getter = registry.methods_named(self.owner.path(), &name).find(|getter| {
                getter.is_query()
                    && getter.bound_params() == self.method.bound_params()
                    && self.same_property(getter.property())
            });
            if let Some(getter) = getter {
                let point = Self {
                    owner: self.owner.clone(),
                    method: getter.clone(),
                    params: self.params.clone(),
                };
                return Some(Arc::new(MethodAccessor::from_point(point)));
            }
        }
        if !self.params.is_empty() {
            return None;
        }
        let field = registry
            .field(self.owner.path(), &property)
            .filter(|field| self.same_property(field.slot()))?;
        FieldAccessor::with_field(registry, self.owner.path(), field.clone())
            .ok()
            .map(|accessor| Arc::new(accessor) as Arc<dyn Accessor>)
    }

    pub fn invoke<'a>(
        &self,
        point: &dyn AccessPoint,
        target: &'a dyn Reflect,
        args: &[&dyn Reflect],
    ) -> Result<Option<Value<'a>>, AccessError> {
        let found = target.reflect_type_name();
        self.method
            .invoke(self.owner.upcast(target), args)
            .map_err(|fault| AccessError::from_fault(point, found, None, fault))
    }

    pub fn project_mut<'a>(
        &self,
        point: &dyn AccessPoint,
        target: &'a mut dyn Reflect,
        args: &[&dyn Reflect],
    ) -> Result<Option<&'a mut dyn Reflect>, AccessError> {
        let found = target.reflect_type_name();
        let fail = |fault: InvokeFault| AccessError::from_fault(point, found, None, fault);
        let target = self.owner.upcast_mut(target).map_err(fail)?;
        self.method.project_mut(target, args).map_err(fail)
    }

    pub fn assign(
        &self,
        point: &dyn AccessPoint,
        target: &mut dyn Reflect,
        args: &[&dyn Reflect],
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), AccessError> {
        let found = target.reflect_type_name();
        let rendered = value.as_deref().map(render_value);
        let fail = |fault: InvokeFault| {
            AccessError::from_write_fault(point, found, rendered.clone(), fault)
        };
        self.method.property().check(value.as_deref()).map_err(fail)?;
        let target = self.owner.upcast_mut(target).map_err(fail)?;
        self.method.assign(target, args, value).map_err(fail)
    }
}

fn render_types<'a>(types: impl Iterator<Item = &'a Type>) -> String {
    let types: Vec<String> = types.map(ToString::to_string).collect();
    format!("({})", types.join(", "))
}

// -----------------------------------------------------------------------------
// MethodAccessor

/// Reads a property through a query method.
///
/// Parameters bound at construction are passed on every read;
/// [`read_with`](Self::read_with) passes its own instead. The mirror is
/// resolved on first request: a setter following the naming conventions
/// with the same bound parameters and property type, otherwise a field
/// named after the property.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pax_access::point::{Accessor, BoundParam, MethodAccessor};
/// use pax_reflect::impl_typed;
/// use pax_reflect::info::{MethodInfo, TypeInfo};
/// use pax_reflect::registry::TypeRegistry;
///
/// #[derive(Debug, Clone, PartialEq, Default)]
/// struct Book { pages: Vec<String> }
/// impl_typed!(Book as "lib::Book", default);
///
/// let mut registry = TypeRegistry::new();
/// registry.register(TypeInfo::new::<Book>().with_method(
///     MethodInfo::lookup::<Book, usize, String>("page", |b, i| b.pages.get(*i)),
/// ));
/// let registry = Arc::new(registry);
///
/// let book = Book { pages: vec!["one".into(), "two".into()] };
/// let params = vec![BoundParam::new(1_usize)];
/// let page = MethodAccessor::with_params(&registry, "lib::Book", "page", params).unwrap();
/// let value = page.read(&book).unwrap().unwrap();
/// assert_eq!(value.downcast_ref::<String>().unwrap(), "two");
///
/// // call-time parameters take precedence over the bound ones
/// let value = page.read_with(&book, &[&0_usize]).unwrap().unwrap();
/// assert_eq!(value.downcast_ref::<String>().unwrap(), "one");
/// ```
#[derive(Clone)]
pub struct MethodAccessor {
    point: MethodPoint,
    mirror: OnceLock<Arc<dyn Mutator>>,
}

impl MethodAccessor {
    /// Looks up the query method `name` taking no parameters.
    #[inline]
    pub fn new(registry: &Arc<TypeRegistry>, owner: &str, name: &str) -> Result<Self, AccessError> {
        Self::with_params(registry, owner, name, Vec::new())
    }

    /// Looks up the query method `name` whose parameters match `params`.
    pub fn with_params(
        registry: &Arc<TypeRegistry>,
        owner: &str,
        name: &str,
        params: Vec<BoundParam>,
    ) -> Result<Self, AccessError> {
        let method = MethodPoint::find(registry, owner, name, true, &params)?;
        Self::with_method(registry, owner, method, params)
    }

    /// Reads through `method` on values of type `owner`.
    pub fn with_method(
        registry: &Arc<TypeRegistry>,
        owner: &str,
        method: Arc<MethodInfo>,
        params: Vec<BoundParam>,
    ) -> Result<Self, AccessError> {
        if !method.is_query() {
            return Err(AccessError::UnsupportedMemberShape {
                member: method.signature(),
                reason: "an accessor needs a query method".into(),
            });
        }
        let owner = Owner::new(registry, owner, method.declaring_type())?;
        Ok(Self::from_point(MethodPoint::new(owner, method, params)?))
    }

    pub(crate) fn from_point(point: MethodPoint) -> Self {
        Self {
            point,
            mirror: OnceLock::new(),
        }
    }

    #[inline]
    pub(crate) fn point(&self) -> &MethodPoint {
        &self.point
    }

    #[inline]
    pub fn method(&self) -> &Arc<MethodInfo> {
        self.point.method()
    }

    #[inline]
    pub fn params(&self) -> &[BoundParam] {
        &self.point.params
    }

    /// Replaces the bound parameters. The memoized mirror is dropped.
    pub fn rebind(&mut self, params: Vec<BoundParam>) -> Result<(), AccessError> {
        MethodPoint::check_params(&self.point.method, &params)?;
        self.point.params = params;
        self.mirror = OnceLock::new();
        Ok(())
    }

    /// Reads with call-time parameters instead of the bound ones.
    pub fn read_with<'a>(
        &self,
        target: &'a dyn Reflect,
        args: &[&dyn Reflect],
    ) -> Result<Option<Value<'a>>, AccessError> {
        self.point.invoke(self, target, args)
    }

    /// Projects with call-time parameters instead of the bound ones.
    pub fn read_mut_with<'a>(
        &self,
        target: &'a mut dyn Reflect,
        args: &[&dyn Reflect],
    ) -> Result<Option<&'a mut dyn Reflect>, AccessError> {
        self.point.project_mut(self, target, args)
    }
}

impl AccessPoint for MethodAccessor {
    #[inline]
    fn input(&self) -> Type {
        self.point.owner.ty()
    }

    #[inline]
    fn value_slot(&self) -> &ValueSlot {
        self.point.method.property()
    }

    #[inline]
    fn accepts(&self, input: &Type) -> bool {
        self.point.owner.accepts(input)
    }

    fn description(&self) -> String {
        self.point.description()
    }

    fn segment(&self) -> String {
        self.point.segment()
    }

    fn key(&self) -> AccessKey {
        self.point.key(AccessKind::Method, Direction::Read)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Method(&self.point.method)
    }
}

impl Accessor for MethodAccessor {
    fn read<'a>(&self, target: &'a dyn Reflect) -> Result<Option<Value<'a>>, AccessError> {
        self.point.invoke(self, target, &self.point.args())
    }

    fn read_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
    ) -> Result<Option<&'a mut dyn Reflect>, AccessError> {
        self.point.project_mut(self, target, &self.point.args())
    }

    fn to_mutator(&self) -> Result<Arc<dyn Mutator>, AccessError> {
        if let Some(mirror) = self.mirror.get() {
            return Ok(mirror.clone());
        }
        let found = self.point.find_mutator().ok_or_else(|| AccessError::NonReversible {
            point: self.description(),
        })?;
        debug!(
            "mirror of `{}` resolved to `{}`",
            self.description(),
            found.description()
        );
        // Concurrent first callers all get the mirror stored first.
        Ok(self.mirror.get_or_init(|| found).clone())
    }
}

impl fmt::Debug for MethodAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MethodAccessor")
            .field(&self.point.description())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// MethodMutator

/// Writes a property through a command method.
///
/// The mirror is resolved on first request: a getter named after the
/// property (`get_x`, `is_x`, `x`, `getX`, `isX`) with the same bound
/// parameters, otherwise a field.
#[derive(Clone)]
pub struct MethodMutator {
    point: MethodPoint,
    mirror: OnceLock<Arc<dyn Accessor>>,
}

impl MethodMutator {
    #[inline]
    pub fn new(registry: &Arc<TypeRegistry>, owner: &str, name: &str) -> Result<Self, AccessError> {
        Self::with_params(registry, owner, name, Vec::new())
    }

    /// Looks up the command `name` whose parameters before the value match `params`.
    pub fn with_params(
        registry: &Arc<TypeRegistry>,
        owner: &str,
        name: &str,
        params: Vec<BoundParam>,
    ) -> Result<Self, AccessError> {
        let method = MethodPoint::find(registry, owner, name, false, &params)?;
        Self::with_method(registry, owner, method, params)
    }

    pub fn with_method(
        registry: &Arc<TypeRegistry>,
        owner: &str,
        method: Arc<MethodInfo>,
        params: Vec<BoundParam>,
    ) -> Result<Self, AccessError> {
        if !method.is_command() {
            return Err(AccessError::UnsupportedMemberShape {
                member: method.signature(),
                reason: "a mutator needs a command method".into(),
            });
        }
        let owner = Owner::new(registry, owner, method.declaring_type())?;
        Ok(Self::from_point(MethodPoint::new(owner, method, params)?))
    }

    pub(crate) fn from_point(point: MethodPoint) -> Self {
        Self {
            point,
            mirror: OnceLock::new(),
        }
    }

    #[inline]
    pub(crate) fn point(&self) -> &MethodPoint {
        &self.point
    }

    #[inline]
    pub fn method(&self) -> &Arc<MethodInfo> {
        self.point.method()
    }

    #[inline]
    pub fn params(&self) -> &[BoundParam] {
        &self.point.params
    }

    /// Replaces the bound parameters. The memoized mirror is dropped.
    pub fn rebind(&mut self, params: Vec<BoundParam>) -> Result<(), AccessError> {
        MethodPoint::check_params(&self.point.method, &params)?;
        self.point.params = params;
        self.mirror = OnceLock::new();
        Ok(())
    }

    /// Writes with call-time parameters instead of the bound ones.
    pub fn write_with(
        &self,
        target: &mut dyn Reflect,
        args: &[&dyn Reflect],
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), AccessError> {
        self.point.assign(self, target, args, value)
    }
}

impl AccessPoint for MethodMutator {
    #[inline]
    fn input(&self) -> Type {
        self.point.owner.ty()
    }

    #[inline]
    fn value_slot(&self) -> &ValueSlot {
        self.point.method.property()
    }

    #[inline]
    fn accepts(&self, input: &Type) -> bool {
        self.point.owner.accepts(input)
    }

    fn description(&self) -> String {
        self.point.description()
    }

    fn segment(&self) -> String {
        self.point.segment()
    }

    fn key(&self) -> AccessKey {
        self.point.key(AccessKind::Method, Direction::Write)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Method(&self.point.method)
    }
}

impl Mutator for MethodMutator {
    fn write(
        &self,
        target: &mut dyn Reflect,
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), AccessError> {
        self.point.assign(self, target, &self.point.args(), value)
    }

    fn to_accessor(&self) -> Result<Arc<dyn Accessor>, AccessError> {
        if let Some(mirror) = self.mirror.get() {
            return Ok(mirror.clone());
        }
        let found = self.point.find_accessor().ok_or_else(|| AccessError::NonReversible {
            point: self.description(),
        })?;
        debug!(
            "mirror of `{}` resolved to `{}`",
            self.description(),
            found.description()
        );
        Ok(self.mirror.get_or_init(|| found).clone())
    }
}

impl fmt::Debug for MethodMutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MethodMutator")
            .field(&self.point.description())
            .finish()
    }
}

impl_key_eq!(MethodAccessor, MethodMutator);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{BoundParam, MethodAccessor, MethodMutator};
    use crate::error::InvocationKind;
    use crate::fixtures::{self, Account, Employee, Person, Phone};
    use crate::point::{AccessKind, AccessPoint, Accessor, FieldAccessor, Mutator};
    use crate::AccessError;
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn setter_is_found_by_naming_convention() {
        let registry = fixtures::registry();
        let name = MethodAccessor::new(&registry, "fixtures::Person", "get_name").unwrap();
        let mutator = name.to_mutator().unwrap();
        assert_eq!(mutator.key().kind, AccessKind::Method);
        assert_eq!(mutator.segment(), "set_name()");

        let mut person = Person::default();
        mutator.set(&mut person, String::from("Ada")).unwrap();
        assert_eq!(
            name.read(&person).unwrap().unwrap().downcast_ref::<String>().unwrap(),
            "Ada"
        );

        // memoized
        assert!(Arc::ptr_eq(&mutator, &name.to_mutator().unwrap()));
    }

    #[test]
    fn mirror_is_built_once_across_threads() {
        let registry = fixtures::registry();
        let name = MethodAccessor::new(&registry, "fixtures::Person", "get_name").unwrap();

        let mirrors: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| name.to_mutator().unwrap()))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });
        for mirror in &mirrors[1..] {
            assert!(Arc::ptr_eq(&mirrors[0], mirror));
        }
        assert!(Arc::ptr_eq(&mirrors[0], &name.to_mutator().unwrap()));
    }

    #[test]
    fn subtype_instances_reach_the_declaring_type() {
        let registry = fixtures::registry();
        let name = MethodAccessor::new(&registry, "fixtures::Person", "get_name").unwrap();
        let set_name = MethodMutator::new(&registry, "fixtures::Person", "set_name").unwrap();

        let mut employee = Employee::default();
        set_name
            .write(&mut employee, Some(Box::new(String::from("Ada"))))
            .unwrap();
        assert_eq!(employee.person.name, "Ada");
        let value = name.read(&employee).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "Ada");

        // projecting getters go through the same upcast
        let value = name.read_mut(&mut employee).unwrap().unwrap();
        assert!(value.is::<String>());
    }

    #[test]
    fn write_errors_name_the_value() {
        let registry = fixtures::registry();
        let set_name = MethodMutator::new(&registry, "fixtures::Person", "set_name").unwrap();

        let err = set_name
            .write(&mut Phone::default(), Some(Box::new(String::from("Ada"))))
            .unwrap_err();
        assert_eq!(err.invocation_kind(), Some(InvocationKind::WrongTarget));
        let AccessError::Invocation(invocation) = &err else {
            panic!("unexpected {err:?}");
        };
        assert_eq!(invocation.value(), Some("\"Ada\""));
        assert_eq!(invocation.target(), core::any::type_name::<Phone>());
    }

    #[test]
    fn getter_without_setter_falls_back_to_field() {
        let registry = fixtures::registry();
        let number = MethodAccessor::new(&registry, "fixtures::Phone", "get_number").unwrap();
        let mutator = number.to_mutator().unwrap();
        assert_eq!(mutator.key().kind, AccessKind::Field);

        let mut phone = Phone::default();
        mutator.set(&mut phone, String::from("112")).unwrap();
        assert_eq!(phone.number, "112");
    }

    #[test]
    fn camel_case_pair() {
        let registry = fixtures::registry();
        let balance = MethodMutator::new(&registry, "fixtures::Account", "setBalance").unwrap();
        let accessor = balance.to_accessor().unwrap();
        assert_eq!(accessor.segment(), "getBalance()");

        let mut account = Account::default();
        balance.write(&mut account, Some(Box::new(42_i64))).unwrap();
        assert_eq!(account.balance, 42);

        let active = MethodAccessor::new(&registry, "fixtures::Account", "is_active").unwrap();
        assert!(active.to_mutator().is_ok());
    }

    #[test]
    fn computed_getter_is_not_reversible() {
        let registry = fixtures::registry();
        let count = MethodAccessor::new(&registry, "fixtures::Person", "phone_count").unwrap();
        let err = count.to_mutator().unwrap_err();
        assert!(matches!(
            &err,
            AccessError::NonReversible { point } if point == "fixtures::Person::phone_count()"
        ));
        assert!(!count.is_reversible());

        let person = Person {
            phones: vec![Phone::new("1"), Phone::new("2")],
            ..Person::default()
        };
        let value = count.read(&person).unwrap().unwrap();
        assert!(!value.is_borrowed());
        assert_eq!(value.downcast_ref::<usize>(), Some(&2));
    }

    #[test]
    fn bound_params_and_rebind() {
        let registry = fixtures::registry();
        let params = vec![BoundParam::new(0_usize)];
        let mut phone =
            MethodAccessor::with_params(&registry, "fixtures::Person", "phone", params).unwrap();
        assert_eq!(phone.segment(), "phone(0)");

        let mut person = Person {
            phones: vec![Phone::new("1"), Phone::new("2")],
            ..Person::default()
        };
        let mutator = phone.to_mutator().unwrap();
        assert_eq!(mutator.segment(), "set_phone(0)");
        mutator.set(&mut person, Phone::new("9")).unwrap();
        assert_eq!(person.phones[0], Phone::new("9"));

        // call-time parameters leave the bound ones alone
        let value = phone.read_with(&person, &[&1_usize]).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<Phone>(), Some(&Phone::new("2")));
        assert_eq!(phone.params()[0], BoundParam::new(0_usize));

        phone.rebind(vec![BoundParam::new(1_usize)]).unwrap();
        let value = phone.read(&person).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<Phone>(), Some(&Phone::new("2")));
        assert_eq!(phone.to_mutator().unwrap().segment(), "set_phone(1)");

        assert!(matches!(
            phone.rebind(vec![BoundParam::new(String::new())]),
            Err(AccessError::TypeMismatch { .. })
        ));
        let err = phone.read_with(&person, &[]).unwrap_err();
        assert_eq!(err.invocation_kind(), Some(InvocationKind::Arity));
    }

    #[test]
    fn equality_ignores_visibility_but_not_params() {
        let registry = fixtures::registry();
        let phone = |index: usize| {
            let params = vec![BoundParam::new(index)];
            MethodAccessor::with_params(&registry, "fixtures::Person", "phone", params).unwrap()
        };
        let first = phone(0);
        let same = phone(0);
        let other = phone(1);
        assert_eq!(first, same);
        assert_ne!(first, other);

        // `Phone.number` is private
        let field = FieldAccessor::new(&registry, "fixtures::Phone", "number").unwrap();
        let again = FieldAccessor::new(&registry, "fixtures::Phone", "number").unwrap();
        assert_eq!(field, again);
        let keys: Vec<_> = [field.key(), again.key()].into_iter().collect();
        assert_eq!(keys[0], keys[1]);
    }

    #[test]
    fn wrong_member_kinds() {
        let registry = fixtures::registry();
        assert!(matches!(
            MethodAccessor::new(&registry, "fixtures::Person", "set_name"),
            Err(AccessError::MemberNotFound { .. })
        ));
        let setter = registry
            .method("fixtures::Person", "set_name", &[pax_reflect::info::Type::of::<String>()])
            .unwrap()
            .clone();
        assert!(matches!(
            MethodAccessor::with_method(&registry, "fixtures::Person", setter, Vec::new()),
            Err(AccessError::UnsupportedMemberShape { .. })
        ));
    }
}
