//! Types shared by the tests of this crate.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::collections::HashMap;

use pax_reflect::impl_typed;
use pax_reflect::info::{ConstructorInfo, FieldInfo, MethodInfo, TypeInfo};
use pax_reflect::registry::TypeRegistry;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct City {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Address {
    pub street: String,
    pub city: Option<City>,
}

/// `number` is private and has a getter but no setter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Phone {
    pub number: String,
}

impl Phone {
    pub fn new(number: &str) -> Self {
        Self {
            number: number.into(),
        }
    }

    pub fn get_number(&self) -> &String {
        &self.number
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Person {
    pub name: String,
    pub address: Option<Address>,
    pub phones: Vec<Phone>,
}

impl Person {
    pub fn get_name(&self) -> &String {
        &self.name
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn phone_count(&self) -> usize {
        self.phones.len()
    }

    /// Replaces the phone at `index`, or appends one past the end.
    pub fn set_phone(&mut self, index: usize, phone: Phone) {
        match self.phones.get_mut(index) {
            Some(slot) => *slot = phone,
            None => self.phones.push(phone),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Employee {
    pub person: Person,
    pub badge: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Team {
    pub lead: Employee,
    pub scores: HashMap<String, u32>,
}

/// camelCase accessors, and an `is_active` getter backed by a plain field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Account {
    pub balance: i64,
    pub active: bool,
}

impl_typed!(City as "fixtures::City", default);
// No typed default, only a zero-argument constructor.
impl_typed!(Address as "fixtures::Address");
impl_typed!(Phone as "fixtures::Phone", default);
impl_typed!(Person as "fixtures::Person", default);
impl_typed!(Employee as "fixtures::Employee", default);
impl_typed!(Team as "fixtures::Team", default);
impl_typed!(Account as "fixtures::Account", default);

pub fn registry() -> Arc<TypeRegistry> {
    let mut registry = TypeRegistry::new();

    registry.register(TypeInfo::new::<City>().with_field(FieldInfo::required::<City, String>(
        "name",
        |c| &c.name,
        |c| &mut c.name,
    )));
    registry.register(
        TypeInfo::new::<Address>()
            .with_field(FieldInfo::required::<Address, String>(
                "street",
                |a| &a.street,
                |a| &mut a.street,
            ))
            .with_field(FieldInfo::optional::<Address, City>(
                "city",
                |a| &a.city,
                |a| &mut a.city,
            ))
            .with_constructor(ConstructorInfo::new::<Address, ()>(|()| Address::default())),
    );
    registry.register(
        TypeInfo::new::<Phone>()
            .with_field(
                FieldInfo::required::<Phone, String>("number", |p| &p.number, |p| &mut p.number)
                    .private(),
            )
            .with_method(MethodInfo::getter_mut::<Phone, String>(
                "get_number",
                Phone::get_number,
                |p| &mut p.number,
            ))
            .with_constructor(ConstructorInfo::new::<Phone, (String,)>(|(number,)| Phone {
                number,
            })),
    );
    registry.register(
        TypeInfo::new::<Person>()
            .with_field(FieldInfo::required::<Person, String>(
                "name",
                |p| &p.name,
                |p| &mut p.name,
            ))
            .with_field(FieldInfo::optional::<Person, Address>(
                "address",
                |p| &p.address,
                |p| &mut p.address,
            ))
            .with_field(FieldInfo::required::<Person, Vec<Phone>>(
                "phones",
                |p| &p.phones,
                |p| &mut p.phones,
            ))
            .with_method(MethodInfo::getter_mut::<Person, String>(
                "get_name",
                Person::get_name,
                |p| &mut p.name,
            ))
            .with_method(MethodInfo::setter::<Person, String>("set_name", Person::set_name))
            .with_method(MethodInfo::computed::<Person, usize>(
                "phone_count",
                Person::phone_count,
            ))
            .with_method(MethodInfo::lookup_mut::<Person, usize, Phone>(
                "phone",
                |p, i| p.phones.get(*i),
                |p, i| p.phones.get_mut(*i),
            ))
            .with_method(MethodInfo::update::<Person, usize, Phone>(
                "set_phone",
                Person::set_phone,
            )),
    );
    registry.register(
        TypeInfo::new::<Employee>()
            .extends::<Employee, Person>(|e| &e.person, |e| &mut e.person)
            .with_field(FieldInfo::required::<Employee, Person>(
                "person",
                |e| &e.person,
                |e| &mut e.person,
            ))
            .with_field(FieldInfo::required::<Employee, u32>(
                "badge",
                |e| &e.badge,
                |e| &mut e.badge,
            )),
    );
    registry.register(
        TypeInfo::new::<Team>()
            .with_field(FieldInfo::required::<Team, Employee>(
                "lead",
                |t| &t.lead,
                |t| &mut t.lead,
            ))
            .with_field(FieldInfo::required::<Team, HashMap<String, u32>>(
                "scores",
                |t| &t.scores,
                |t| &mut t.scores,
            )),
    );
    registry.register(
        TypeInfo::new::<Account>()
            .with_field(FieldInfo::required::<Account, bool>(
                "active",
                |a| &a.active,
                |a| &mut a.active,
            ))
            .with_method(MethodInfo::getter::<Account, i64>("getBalance", |a| &a.balance))
            .with_method(MethodInfo::setter::<Account, i64>("setBalance", |a, balance| {
                a.balance = balance;
            }))
            .with_method(MethodInfo::getter::<Account, bool>("is_active", |a| &a.active)),
    );

    Arc::new(registry)
}
