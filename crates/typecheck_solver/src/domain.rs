use std::hash::Hash;

use itertools::Itertools;

/// The ordered candidate values of one variable. Duplicates are dropped, the
/// first occurrence keeps its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain<V> {
    values: Vec<V>,
}

impl<V> Default for Domain<V> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<V: Clone + Eq + Hash> Domain<V> {
    pub fn new(values: impl IntoIterator<Item = V>) -> Self {
        Self {
            values: values.into_iter().unique().collect(),
        }
    }

    pub fn single(value: V) -> Self {
        Self {
            values: vec![value],
        }
    }

    pub fn push(&mut self, value: V) -> bool {
        if self.values.contains(&value) {
            return false;
        }
        self.values.push(value);
        true
    }

    pub fn contains(&self, value: &V) -> bool {
        self.values.contains(value)
    }
}

impl<V> Domain<V> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.values.iter()
    }
}

impl<V: Clone + Eq + Hash> FromIterator<V> for Domain<V> {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        Domain::new(iter)
    }
}

impl<V> IntoIterator for Domain<V> {
    type Item = V;
    type IntoIter = std::vec::IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a Domain<V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
