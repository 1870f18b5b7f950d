use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use crate::info::{InvokeFault, Type, Typed, ValueSlot, Visibility, method_descriptor};
use crate::info::{arg_ref, path_of, take_optional, take_value, target_mut, target_ref};
use crate::{Reflect, Value};

// -----------------------------------------------------------------------------
// MethodBody

/// The erased implementation of a method.
///
/// Queries implement [`invoke`](Self::invoke) and, when they hand out a
/// view into the target, [`project_mut`](Self::project_mut). Commands
/// implement [`assign`](Self::assign), receiving the bound arguments and the
/// assigned value separately. Every operation defaults to
/// [`InvokeFault::Unsupported`].
pub trait MethodBody: Send + Sync + 'static {
    /// Calls the method through `&self`.
    fn invoke<'a>(
        &self,
        target: &'a dyn Reflect,
        args: &[&dyn Reflect],
    ) -> Result<Option<Value<'a>>, InvokeFault> {
        let _ = (target, args);
        Err(InvokeFault::Unsupported("shared invocation"))
    }

    /// Returns a mutable view of the value the method reads.
    fn project_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
        args: &[&dyn Reflect],
    ) -> Result<Option<&'a mut dyn Reflect>, InvokeFault> {
        let _ = (target, args);
        Err(InvokeFault::Unsupported("mutable projection"))
    }

    /// Calls the method through `&mut self` with the assigned value.
    fn assign(
        &self,
        target: &mut dyn Reflect,
        args: &[&dyn Reflect],
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), InvokeFault> {
        let _ = (target, args, value);
        Err(InvokeFault::Unsupported("assignment"))
    }

    /// Returns `true` if [`project_mut`](Self::project_mut) is implemented.
    fn can_project(&self) -> bool {
        false
    }
}

struct Getter<S, T> {
    get: fn(&S) -> &T,
    get_mut: Option<fn(&mut S) -> &mut T>,
}

impl<S: Reflect, T: Reflect> MethodBody for Getter<S, T> {
    fn invoke<'a>(
        &self,
        target: &'a dyn Reflect,
        _: &[&dyn Reflect],
    ) -> Result<Option<Value<'a>>, InvokeFault> {
        let target = target_ref::<S>(target)?;
        Ok(Some(Value::Borrowed((self.get)(target))))
    }

    fn project_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
        _: &[&dyn Reflect],
    ) -> Result<Option<&'a mut dyn Reflect>, InvokeFault> {
        let get_mut = self
            .get_mut
            .ok_or(InvokeFault::Unsupported("mutable projection"))?;
        let target = target_mut::<S>(target)?;
        Ok(Some(get_mut(target)))
    }

    fn can_project(&self) -> bool {
        self.get_mut.is_some()
    }
}

struct OptGetter<S, T> {
    get: fn(&S) -> Option<&T>,
    get_mut: Option<fn(&mut S) -> Option<&mut T>>,
}

impl<S: Reflect, T: Reflect> MethodBody for OptGetter<S, T> {
    fn invoke<'a>(
        &self,
        target: &'a dyn Reflect,
        _: &[&dyn Reflect],
    ) -> Result<Option<Value<'a>>, InvokeFault> {
        let target = target_ref::<S>(target)?;
        Ok((self.get)(target).map(|value| Value::Borrowed(value)))
    }

    fn project_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
        _: &[&dyn Reflect],
    ) -> Result<Option<&'a mut dyn Reflect>, InvokeFault> {
        let get_mut = self
            .get_mut
            .ok_or(InvokeFault::Unsupported("mutable projection"))?;
        let target = target_mut::<S>(target)?;
        Ok(get_mut(target).map(|value| value as &mut dyn Reflect))
    }

    fn can_project(&self) -> bool {
        self.get_mut.is_some()
    }
}

struct Computed<S, T> {
    compute: fn(&S) -> T,
}

impl<S: Reflect, T: Reflect> MethodBody for Computed<S, T> {
    fn invoke<'a>(
        &self,
        target: &'a dyn Reflect,
        _: &[&dyn Reflect],
    ) -> Result<Option<Value<'a>>, InvokeFault> {
        let target = target_ref::<S>(target)?;
        Ok(Some(Value::Owned(Box::new((self.compute)(target)))))
    }
}

type LookupFn<S, K, T> = for<'a> fn(&'a S, &K) -> Option<&'a T>;
type LookupMutFn<S, K, T> = for<'a> fn(&'a mut S, &K) -> Option<&'a mut T>;

struct Lookup<S, K, T> {
    get: LookupFn<S, K, T>,
    get_mut: Option<LookupMutFn<S, K, T>>,
}

impl<S: Reflect, K: Reflect, T: Reflect> MethodBody for Lookup<S, K, T> {
    fn invoke<'a>(
        &self,
        target: &'a dyn Reflect,
        args: &[&dyn Reflect],
    ) -> Result<Option<Value<'a>>, InvokeFault> {
        let key = arg_ref::<K>(args, 0)?;
        let target = target_ref::<S>(target)?;
        Ok((self.get)(target, key).map(|value| Value::Borrowed(value)))
    }

    fn project_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
        args: &[&dyn Reflect],
    ) -> Result<Option<&'a mut dyn Reflect>, InvokeFault> {
        let get_mut = self
            .get_mut
            .ok_or(InvokeFault::Unsupported("mutable projection"))?;
        let key = arg_ref::<K>(args, 0)?;
        let target = target_mut::<S>(target)?;
        Ok(get_mut(target, key).map(|value| value as &mut dyn Reflect))
    }

    fn can_project(&self) -> bool {
        self.get_mut.is_some()
    }
}

struct Setter<S, T> {
    set: fn(&mut S, T),
}

impl<S: Reflect, T: Reflect> MethodBody for Setter<S, T> {
    fn assign(
        &self,
        target: &mut dyn Reflect,
        _: &[&dyn Reflect],
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), InvokeFault> {
        let target = target_mut::<S>(target)?;
        (self.set)(target, take_value::<T>(value)?);
        Ok(())
    }
}

struct OptSetter<S, T> {
    set: fn(&mut S, Option<T>),
}

impl<S: Reflect, T: Reflect> MethodBody for OptSetter<S, T> {
    fn assign(
        &self,
        target: &mut dyn Reflect,
        _: &[&dyn Reflect],
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), InvokeFault> {
        let target = target_mut::<S>(target)?;
        (self.set)(target, take_optional::<T>(value)?);
        Ok(())
    }
}

struct Update<S, K, T> {
    update: fn(&mut S, K, T),
}

impl<S: Reflect, K: Reflect + Clone, T: Reflect> MethodBody for Update<S, K, T> {
    fn assign(
        &self,
        target: &mut dyn Reflect,
        args: &[&dyn Reflect],
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), InvokeFault> {
        let key = arg_ref::<K>(args, 0)?.clone();
        let target = target_mut::<S>(target)?;
        (self.update)(target, key, take_value::<T>(value)?);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// MethodInfo

/// Whether a method reads or writes its property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Called through `&self`, returns the property.
    Query,
    /// Called through `&mut self`, assigns the property from its last parameter.
    Command,
}

/// A method of a registered type.
///
/// A method has *bound* parameters (keys, indices) and one *property*: the
/// returned value of a query, the last parameter of a command. A getter has
/// no bound parameters, a keyed lookup `fn(&self, &K) -> Option<&T>` has one.
///
/// # Examples
///
/// ```
/// use pax_reflect::impl_typed;
/// use pax_reflect::info::{MethodInfo, MethodKind};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Phone { number: String }
/// impl_typed!(Phone as "contact::Phone");
///
/// let getter = MethodInfo::getter::<Phone, String>("get_number", |p| &p.number);
/// let setter = MethodInfo::setter::<Phone, String>("set_number", |p, v| p.number = v);
///
/// assert_eq!(getter.descriptor(), "()LString;");
/// assert_eq!(setter.descriptor(), "(LString;)V");
/// assert_eq!(setter.kind(), MethodKind::Command);
///
/// let mut phone = Phone { number: "555".into() };
/// setter.assign(&mut phone, &[], Some(Box::new(String::from("911")))).unwrap();
///
/// let value = getter.invoke(&phone, &[]).unwrap().unwrap();
/// assert_eq!(value.downcast_ref::<String>().unwrap(), "911");
/// ```
pub struct MethodInfo {
    name: &'static str,
    declaring_type: &'static str,
    declaring_type_id: TypeId,
    params: Vec<Type>,
    ret: Option<Type>,
    arity: usize,
    property: ValueSlot,
    kind: MethodKind,
    visibility: Visibility,
    synthetic: bool,
    body: Box<dyn MethodBody>,
}

impl MethodInfo {
    /// A query method with a custom body.
    pub fn query<S: Typed>(
        name: &'static str,
        params: Vec<Type>,
        property: ValueSlot,
        body: impl MethodBody,
    ) -> Self {
        Self {
            name,
            declaring_type: path_of::<S>(),
            declaring_type_id: TypeId::of::<S>(),
            arity: params.len(),
            ret: Some(property.ty().clone()),
            params,
            property,
            kind: MethodKind::Query,
            visibility: Visibility::Public,
            synthetic: false,
            body: Box::new(body),
        }
    }

    /// A command method with a custom body.
    ///
    /// `bound` lists the parameters preceding the assigned value.
    pub fn command<S: Typed>(
        name: &'static str,
        bound: Vec<Type>,
        property: ValueSlot,
        body: impl MethodBody,
    ) -> Self {
        let arity = bound.len();
        let mut params = bound;
        params.push(property.ty().clone());
        Self {
            name,
            declaring_type: path_of::<S>(),
            declaring_type_id: TypeId::of::<S>(),
            params,
            ret: None,
            arity,
            property,
            kind: MethodKind::Command,
            visibility: Visibility::Public,
            synthetic: false,
            body: Box::new(body),
        }
    }

    /// `fn(&self) -> &T`.
    pub fn getter<S: Typed, T: Typed>(name: &'static str, get: fn(&S) -> &T) -> Self {
        let body = Getter { get, get_mut: None };
        Self::query::<S>(name, Vec::new(), ValueSlot::of::<T>(), body)
    }

    /// `fn(&self) -> &T` paired with its `fn(&mut self) -> &mut T` projection.
    pub fn getter_mut<S: Typed, T: Typed>(
        name: &'static str,
        get: fn(&S) -> &T,
        get_mut: fn(&mut S) -> &mut T,
    ) -> Self {
        let body = Getter {
            get,
            get_mut: Some(get_mut),
        };
        Self::query::<S>(name, Vec::new(), ValueSlot::of::<T>(), body)
    }

    /// `fn(&self) -> Option<&T>`.
    pub fn getter_opt<S: Typed, T: Typed>(name: &'static str, get: fn(&S) -> Option<&T>) -> Self {
        let body = OptGetter { get, get_mut: None };
        Self::query::<S>(name, Vec::new(), ValueSlot::nullable::<T>(), body)
    }

    /// `fn(&self) -> Option<&T>` paired with its mutable projection.
    pub fn getter_opt_mut<S: Typed, T: Typed>(
        name: &'static str,
        get: fn(&S) -> Option<&T>,
        get_mut: fn(&mut S) -> Option<&mut T>,
    ) -> Self {
        let body = OptGetter {
            get,
            get_mut: Some(get_mut),
        };
        Self::query::<S>(name, Vec::new(), ValueSlot::nullable::<T>(), body)
    }

    /// `fn(&self) -> T`, producing a fresh value on every call.
    pub fn computed<S: Typed, T: Typed>(name: &'static str, compute: fn(&S) -> T) -> Self {
        Self::query::<S>(name, Vec::new(), ValueSlot::of::<T>(), Computed { compute })
    }

    /// `fn(&self, &K) -> Option<&T>`.
    pub fn lookup<S: Typed, K: Typed, T: Typed>(
        name: &'static str,
        get: for<'a> fn(&'a S, &K) -> Option<&'a T>,
    ) -> Self {
        let body = Lookup { get, get_mut: None };
        Self::query::<S>(name, alloc::vec![K::ty()], ValueSlot::nullable::<T>(), body)
    }

    /// `fn(&self, &K) -> Option<&T>` paired with its mutable projection.
    pub fn lookup_mut<S: Typed, K: Typed, T: Typed>(
        name: &'static str,
        get: for<'a> fn(&'a S, &K) -> Option<&'a T>,
        get_mut: for<'a> fn(&'a mut S, &K) -> Option<&'a mut T>,
    ) -> Self {
        let body = Lookup {
            get,
            get_mut: Some(get_mut),
        };
        Self::query::<S>(name, alloc::vec![K::ty()], ValueSlot::nullable::<T>(), body)
    }

    /// `fn(&mut self, T)`.
    pub fn setter<S: Typed, T: Typed>(name: &'static str, set: fn(&mut S, T)) -> Self {
        Self::command::<S>(name, Vec::new(), ValueSlot::of::<T>(), Setter { set })
    }

    /// `fn(&mut self, Option<T>)`.
    pub fn setter_opt<S: Typed, T: Typed>(name: &'static str, set: fn(&mut S, Option<T>)) -> Self {
        Self::command::<S>(name, Vec::new(), ValueSlot::nullable::<T>(), OptSetter { set })
    }

    /// `fn(&mut self, K, T)`.
    pub fn update<S: Typed, K: Typed + Clone, T: Typed>(
        name: &'static str,
        update: fn(&mut S, K, T),
    ) -> Self {
        let body = Update { update };
        Self::command::<S>(name, alloc::vec![K::ty()], ValueSlot::of::<T>(), body)
    }

    /// Marks the method as private.
    #[inline]
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Marks the method as a compiler-style bridge.
    #[inline]
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }

    #[inline]
    pub fn declaring_type_id(&self) -> TypeId {
        self.declaring_type_id
    }

    /// Returns every parameter type, including the assigned value of a command.
    #[inline]
    pub fn params(&self) -> &[Type] {
        &self.params
    }

    /// Returns the parameters supplied as bound arguments.
    #[inline]
    pub fn bound_params(&self) -> &[Type] {
        &self.params[..self.arity]
    }

    /// Returns the return type, `None` for `void`.
    #[inline]
    pub fn ret(&self) -> Option<&Type> {
        self.ret.as_ref()
    }

    /// Returns the slot of the read or assigned value.
    #[inline]
    pub fn property(&self) -> &ValueSlot {
        &self.property
    }

    #[inline]
    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    #[inline]
    pub fn is_query(&self) -> bool {
        self.kind == MethodKind::Query
    }

    #[inline]
    pub fn is_command(&self) -> bool {
        self.kind == MethodKind::Command
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Returns `true` if the method can hand out a mutable view of its property.
    #[inline]
    pub fn can_project(&self) -> bool {
        self.body.can_project()
    }

    /// Returns the member descriptor, e.g. `(I)LString;`.
    #[inline]
    pub fn descriptor(&self) -> String {
        method_descriptor(&self.params, self.ret.as_ref())
    }

    /// Returns `<declaring type>::<name><descriptor>`.
    pub fn signature(&self) -> String {
        alloc::format!("{}::{}{}", self.declaring_type, self.name, self.descriptor())
    }

    fn check_arity(&self, args: &[&dyn Reflect]) -> Result<(), InvokeFault> {
        if args.len() != self.arity {
            return Err(InvokeFault::Arity {
                expected: self.arity,
                found: args.len(),
            });
        }
        Ok(())
    }

    /// Calls a query method.
    pub fn invoke<'a>(
        &self,
        target: &'a dyn Reflect,
        args: &[&dyn Reflect],
    ) -> Result<Option<Value<'a>>, InvokeFault> {
        self.check_arity(args)?;
        self.body.invoke(target, args)
    }

    /// Projects the property of a query method mutably.
    pub fn project_mut<'a>(
        &self,
        target: &'a mut dyn Reflect,
        args: &[&dyn Reflect],
    ) -> Result<Option<&'a mut dyn Reflect>, InvokeFault> {
        self.check_arity(args)?;
        self.body.project_mut(target, args)
    }

    /// Calls a command method.
    pub fn assign(
        &self,
        target: &mut dyn Reflect,
        args: &[&dyn Reflect],
        value: Option<Box<dyn Reflect>>,
    ) -> Result<(), InvokeFault> {
        self.check_arity(args)?;
        self.property.check(value.as_deref())?;
        self.body.assign(target, args, value)
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("signature", &self.signature())
            .field("kind", &self.kind)
            .field("visibility", &self.visibility)
            .field("synthetic", &self.synthetic)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
