use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::AccessError;
use crate::definition::{AccessPointComparator, AccessorDefinition};
use crate::point::AccessPoint;

struct Entry<V> {
    definition: AccessorDefinition,
    point: Arc<dyn AccessPoint>,
    value: V,
}

// -----------------------------------------------------------------------------
// AccessorMap

/// A map keyed by the property an access point reaches.
///
/// Entries are kept sorted by [`AccessPointComparator`], so a field
/// accessor, a getter and a reference to that getter are the same key.
/// The first point inserted for a property stays the key; later inserts
/// only replace the value.
///
/// Lookups compute the definition of the point asked for, which fails
/// for points that expose no structure.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pax_access::definition::{AccessPointComparator, AccessorMap};
/// use pax_access::point::{FieldAccessor, MethodAccessor};
/// use pax_reflect::impl_typed;
/// use pax_reflect::info::{FieldInfo, MethodInfo, TypeInfo};
/// use pax_reflect::registry::TypeRegistry;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Phone { number: String }
/// impl_typed!(Phone as "app::Phone");
///
/// let mut registry = TypeRegistry::new();
/// registry.register(
///     TypeInfo::new::<Phone>()
///         .with_field(FieldInfo::required::<Phone, String>(
///             "number",
///             |p| &p.number,
///             |p| &mut p.number,
///         ))
///         .with_method(MethodInfo::getter::<Phone, String>("getNumber", |p| &p.number)),
/// );
/// let registry = Arc::new(registry);
///
/// let mut columns = AccessorMap::new(Arc::new(AccessPointComparator::new(registry.clone())));
/// let field = FieldAccessor::new(&registry, "app::Phone", "number").unwrap();
/// let getter = MethodAccessor::new(&registry, "app::Phone", "getNumber").unwrap();
///
/// columns.insert(Arc::new(field), "number_col").unwrap();
/// assert_eq!(columns.get(&getter).unwrap(), Some(&"number_col"));
/// ```
pub struct AccessorMap<V> {
    comparator: Arc<AccessPointComparator>,
    entries: Vec<Entry<V>>,
}

impl<V> AccessorMap<V> {
    #[inline]
    pub fn new(comparator: Arc<AccessPointComparator>) -> Self {
        Self {
            comparator,
            entries: Vec::new(),
        }
    }

    #[inline]
    pub fn comparator(&self) -> &Arc<AccessPointComparator> {
        &self.comparator
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Position of the entry for `definition`, or where it would go.
    fn search(&self, definition: &AccessorDefinition) -> Result<usize, usize> {
        self.entries.binary_search_by(|entry| {
            self.comparator
                .compare_definitions(&entry.definition, definition)
        })
    }

    fn find(&self, point: &dyn AccessPoint) -> Result<Option<usize>, AccessError> {
        let definition = self.comparator.definition(point)?;
        Ok(self.search(&definition).ok())
    }

    /// Inserts `value` for the property `point` reaches.
    ///
    /// Returns the value replaced, if the property already had one.
    pub fn insert(
        &mut self,
        point: Arc<dyn AccessPoint>,
        value: V,
    ) -> Result<Option<V>, AccessError> {
        let definition = self.comparator.definition(point.as_ref())?;
        match self.search(&definition) {
            Ok(index) => Ok(Some(core::mem::replace(
                &mut self.entries[index].value,
                value,
            ))),
            Err(index) => {
                self.entries.insert(
                    index,
                    Entry {
                        definition,
                        point,
                        value,
                    },
                );
                Ok(None)
            }
        }
    }

    pub fn get(&self, point: &dyn AccessPoint) -> Result<Option<&V>, AccessError> {
        Ok(self.find(point)?.map(|index| &self.entries[index].value))
    }

    pub fn get_mut(&mut self, point: &dyn AccessPoint) -> Result<Option<&mut V>, AccessError> {
        Ok(self.find(point)?.map(|index| &mut self.entries[index].value))
    }

    /// Returns the stored key and value for the property `point` reaches.
    pub fn get_key_value(
        &self,
        point: &dyn AccessPoint,
    ) -> Result<Option<(&Arc<dyn AccessPoint>, &V)>, AccessError> {
        Ok(self.find(point)?.map(|index| {
            let entry = &self.entries[index];
            (&entry.point, &entry.value)
        }))
    }

    #[inline]
    pub fn contains_key(&self, point: &dyn AccessPoint) -> Result<bool, AccessError> {
        Ok(self.find(point)?.is_some())
    }

    /// Removes the entry for the property `point` reaches.
    pub fn remove(
        &mut self,
        point: &dyn AccessPoint,
    ) -> Result<Option<(Arc<dyn AccessPoint>, V)>, AccessError> {
        Ok(self.find(point)?.map(|index| {
            let entry = self.entries.remove(index);
            (entry.point, entry.value)
        }))
    }

    /// Iterates in definition order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Arc<dyn AccessPoint>, &V)> {
        self.entries.iter().map(|entry| (&entry.point, &entry.value))
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &Arc<dyn AccessPoint>> {
        self.entries.iter().map(|entry| &entry.point)
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> {
        self.entries.iter().map(|entry| &entry.value)
    }

    /// Iterates over the definitions of the keys, in order.
    pub fn definitions(&self) -> impl ExactSizeIterator<Item = &AccessorDefinition> {
        self.entries.iter().map(|entry| &entry.definition)
    }
}

impl<V: fmt::Debug> fmt::Debug for AccessorMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|entry| (&entry.definition, &entry.value)))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// AccessorSet

/// A set of access points, one per property.
///
/// See [`AccessorMap`] for the key semantics.
pub struct AccessorSet {
    map: AccessorMap<()>,
}

impl AccessorSet {
    #[inline]
    pub fn new(comparator: Arc<AccessPointComparator>) -> Self {
        Self {
            map: AccessorMap::new(comparator),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Adds `point`, returning `false` if its property is already present.
    pub fn insert(&mut self, point: Arc<dyn AccessPoint>) -> Result<bool, AccessError> {
        if self.map.contains_key(point.as_ref())? {
            return Ok(false);
        }
        self.map.insert(point, ())?;
        Ok(true)
    }

    #[inline]
    pub fn contains(&self, point: &dyn AccessPoint) -> Result<bool, AccessError> {
        self.map.contains_key(point)
    }

    /// Returns the stored point for the property `point` reaches.
    pub fn get(
        &self,
        point: &dyn AccessPoint,
    ) -> Result<Option<&Arc<dyn AccessPoint>>, AccessError> {
        Ok(self.map.get_key_value(point)?.map(|(key, _)| key))
    }

    pub fn remove(
        &mut self,
        point: &dyn AccessPoint,
    ) -> Result<Option<Arc<dyn AccessPoint>>, AccessError> {
        Ok(self.map.remove(point)?.map(|(key, _)| key))
    }

    /// Iterates in definition order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Arc<dyn AccessPoint>> {
        self.map.keys()
    }
}

impl fmt::Debug for AccessorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.map.definitions()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{AccessorMap, AccessorSet};
    use crate::chain::AccessorChain;
    use crate::definition::AccessPointComparator;
    use crate::fixtures::{self, Phone};
    use crate::point::{AccessPoint, FieldAccessor, FieldMutator, MethodAccessor};
    use crate::point::{ReferenceAccessor, SyntheticAccessor};
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use pax_reflect::reference::{MemberRef, MemberResolver};

    #[test]
    fn one_entry_per_property() {
        let registry = fixtures::registry();
        let resolver = MemberResolver::new(registry.clone());
        let comparator = Arc::new(AccessPointComparator::new(registry.clone()));
        let mut set = AccessorSet::new(comparator);

        let field = FieldAccessor::new(&registry, "fixtures::Phone", "number").unwrap();
        let method = MethodAccessor::new(&registry, "fixtures::Phone", "get_number").unwrap();
        let reference = MemberRef::getter::<Phone, String>("get_number", Phone::get_number);
        let reference = ReferenceAccessor::new(&resolver, &reference).unwrap();

        assert!(set.insert(Arc::new(field.clone())).unwrap());
        assert!(!set.insert(Arc::new(method.clone())).unwrap());
        assert!(!set.insert(Arc::new(reference.clone())).unwrap());
        assert_eq!(set.len(), 1);
        assert!(set.contains(&reference).unwrap());

        // the first point inserted stays the key
        let stored = set.get(&method).unwrap().unwrap();
        assert_eq!(stored.key(), field.key());

        // so does a mutator of the same property
        let write = FieldMutator::new(&registry, "fixtures::Phone", "number").unwrap();
        assert!(set.remove(&write).unwrap().is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn map_orders_by_definition() {
        let registry = fixtures::registry();
        let comparator = Arc::new(AccessPointComparator::new(registry.clone()));
        let mut map = AccessorMap::new(comparator);

        let number = FieldAccessor::new(&registry, "fixtures::Phone", "number").unwrap();
        let name = MethodAccessor::new(&registry, "fixtures::Person", "get_name").unwrap();
        let address = FieldAccessor::new(&registry, "fixtures::Person", "address").unwrap();
        let city = FieldAccessor::new(&registry, "fixtures::Address", "city").unwrap();
        let chain = AccessorChain::new(Arc::new(address.clone()))
            .then(Arc::new(city))
            .unwrap();

        assert_eq!(map.insert(Arc::new(number.clone()), 1).unwrap(), None);
        assert_eq!(map.insert(Arc::new(name), 2).unwrap(), None);
        assert_eq!(map.insert(Arc::new(chain), 3).unwrap(), None);
        assert_eq!(map.insert(Arc::new(address), 4).unwrap(), None);
        assert_eq!(map.insert(Arc::new(number.clone()), 10).unwrap(), Some(1));

        let names: Vec<&str> = map.definitions().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["address", "address.city", "name", "number"]);
        assert_eq!(map.values().copied().collect::<Vec<_>>(), [4, 3, 2, 10]);

        *map.get_mut(&number).unwrap().unwrap() += 1;
        assert_eq!(map.get(&number).unwrap(), Some(&11));
        assert!(map.contains_key(&number).unwrap());
        let (key, value) = map.remove(&number).unwrap().unwrap();
        assert_eq!((key.description().as_str(), value), ("fixtures::Phone.number", 11));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn supplied_definitions_are_keys_too() {
        let registry = fixtures::registry();
        let comparator = Arc::new(AccessPointComparator::new(registry.clone()));
        let mut set = AccessorSet::new(comparator);

        let count = SyntheticAccessor::new("phone_count", |person: &fixtures::Person| {
            Some(person.phones.len())
        });
        assert!(set.insert(Arc::new(count)).unwrap());
        let method = MethodAccessor::new(&registry, "fixtures::Person", "phone_count").unwrap();
        assert!(set.contains(&method).unwrap());
    }
}
