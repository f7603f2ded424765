//! Ordered, name-indexed list of metadata objects.

use std::sync::Arc;

use indexmap::IndexMap;

/// Something addressable by name.
pub trait Named {
    /// Short name.
    fn name(&self) -> &str;

    /// Name unique within the owning collection; defaults to [`Named::name`].
    fn unique_name(&self) -> &str {
        self.name()
    }
}

/// Insertion-ordered list keyed by unique name.
#[derive(Debug)]
pub struct NamedList<T> {
    items: IndexMap<String, Arc<T>>,
}

impl<T> Default for NamedList<T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }
}

impl<T> Clone for NamedList<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T: Named> NamedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item. Returns `false`, leaving the list unchanged, when an
    /// item with the same unique name is already present.
    pub fn insert(&mut self, item: Arc<T>) -> bool {
        let key = item.unique_name().to_string();
        if self.items.contains_key(&key) {
            return false;
        }
        self.items.insert(key, item);
        true
    }

    /// Look up by unique name, falling back to the first item with that name.
    pub fn get(&self, name: &str) -> Option<&Arc<T>> {
        self.items
            .get(name)
            .or_else(|| self.items.values().find(|item| item.name() == name))
    }

    /// Whether an item with exactly this unique name is present.
    pub fn contains_unique(&self, unique_name: &str) -> bool {
        self.items.contains_key(unique_name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Item at `index` in insertion order.
    pub fn get_index(&self, index: usize) -> Option<&Arc<T>> {
        self.items.get_index(index).map(|(_, item)| item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.items.values()
    }

    /// Unique names in insertion order.
    pub fn unique_names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Short names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.items.values().map(|item| item.name()).collect()
    }
}

impl<'a, T> IntoIterator for &'a NamedList<T> {
    type Item = &'a Arc<T>;
    type IntoIter = indexmap::map::Values<'a, String, Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.values()
    }
}
