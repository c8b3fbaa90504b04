//! Ordered, case-insensitive header storage.
//!
//! Header names are normalized to lower case on every insert and lookup. Entries keep
//! their first insertion position, so serialization follows the order in which names
//! were first seen, while a repeated name overwrites the earlier value.

use indexmap::IndexMap;
use indexmap::map::Iter;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    inner: IndexMap<String, String>,
}

impl HeaderFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing any previous value for the same name.
    pub fn insert<K: AsRef<str>, V: Into<String>>(&mut self, name: K, value: V) -> Option<String> {
        self.inner.insert(normalize(name.as_ref()), value.into())
    }

    pub fn get<K: AsRef<str>>(&self, name: K) -> Option<&str> {
        self.inner.get(&normalize(name.as_ref())).map(String::as_str)
    }

    pub fn contains<K: AsRef<str>>(&self, name: K) -> bool {
        self.inner.contains_key(&normalize(name.as_ref()))
    }

    pub fn remove<K: AsRef<str>>(&mut self, name: K) -> Option<String> {
        self.inner.shift_remove(&normalize(name.as_ref()))
    }

    /// Merges every entry of `other` into `self`, last write wins.
    pub fn extend<I, K, V>(&mut self, other: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in other {
            self.insert(name, value);
        }
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.inner.iter()
    }
}

impl<'a> IntoIterator for &'a HeaderFields {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderFields {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut fields = HeaderFields::new();
        fields.extend(iter);
        fields
    }
}

#[inline]
fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
