//! Types shared by the tests of this crate.

use alloc::string::String;
use alloc::vec::Vec;

use crate::impl_typed;
use crate::info::{ConstructorInfo, FieldInfo, MethodInfo, TypeInfo};
use crate::registry::TypeRegistry;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct City {
    pub name: String,
}

impl City {
    pub fn get_name(&self) -> &String {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Address {
    pub street: String,
    pub city: Option<City>,
}

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

    pub fn set_number(&mut self, number: String) {
        self.number = number;
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
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Employee {
    pub person: Person,
    pub badge: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outer;

/// Static nested type with a private constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Nested {
    pub label: String,
}

impl Nested {
    pub fn new(label: String) -> Self {
        Self { label }
    }
}

/// Marker appended to the bridge constructor of [`Nested`].
#[derive(Debug, Clone, PartialEq)]
pub struct NestedAccess;

/// Non-static nested type.
#[derive(Debug, Clone, PartialEq)]
pub struct Inner {
    pub value: i32,
}

impl Inner {
    pub fn get_value(&self) -> &i32 {
        &self.value
    }
}

impl_typed!(City as "fixtures::City", default);
// No typed default, only a zero-argument constructor.
impl_typed!(Address as "fixtures::Address");
impl_typed!(Phone as "fixtures::Phone", default);
impl_typed!(Person as "fixtures::Person", default);
impl_typed!(Employee as "fixtures::Employee", default);
impl_typed!(Outer as "fixtures::Outer", default);
impl_typed!(Nested as "fixtures::Nested");
impl_typed!(NestedAccess as "fixtures::NestedAccess");
impl_typed!(Inner as "fixtures::Inner");

pub fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();

    registry.register(
        TypeInfo::new::<City>()
            .with_field(FieldInfo::required::<City, String>(
                "name",
                |c| &c.name,
                |c| &mut c.name,
            ))
            .with_method(MethodInfo::getter::<City, String>("get_name", City::get_name)),
    );
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
            .with_field(FieldInfo::required::<Phone, String>(
                "number",
                |p| &p.number,
                |p| &mut p.number,
            ))
            .with_method(MethodInfo::getter::<Phone, String>("get_number", Phone::get_number))
            .with_method(MethodInfo::setter::<Phone, String>("set_number", Phone::set_number)),
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
            .with_method(MethodInfo::getter::<Person, String>("get_name", Person::get_name))
            .with_method(MethodInfo::lookup::<Person, usize, Phone>("phone", |p, i| {
                p.phones.get(*i)
            })),
    );
    registry.register(
        TypeInfo::new::<Employee>()
            .extends::<Employee, Person>(|e| &e.person, |e| &mut e.person)
            .with_field(FieldInfo::required::<Employee, u32>(
                "badge",
                |e| &e.badge,
                |e| &mut e.badge,
            )),
    );

    registry.register(TypeInfo::new::<Outer>());
    registry.register(TypeInfo::new::<NestedAccess>().synthetic());
    registry.register(
        TypeInfo::new::<Nested>()
            .nested_in("fixtures::Outer", true)
            .with_constructor(
                ConstructorInfo::new::<Nested, (String,)>(|(label,)| Nested::new(label)).private(),
            )
            .with_constructor(
                ConstructorInfo::new::<Nested, (String, NestedAccess)>(|(label, _)| {
                    Nested::new(label)
                })
                .synthetic(),
            ),
    );
    registry.register(
        TypeInfo::new::<Inner>()
            .nested_in("fixtures::Outer", false)
            .with_method(MethodInfo::getter::<Inner, i32>("get_value", Inner::get_value)),
    );

    registry
}
