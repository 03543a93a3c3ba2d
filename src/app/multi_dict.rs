//! Insertion-ordered map with several values per key.

/// Dictionary with multiple values for a key.
///
/// Inserting an existing key appends to its values. [`MultiDict::get`]
/// returns the newest value; [`MultiDict::get_all`] returns all of them
/// in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiDict {
    entries: Vec<(String, Vec<String>)>,
}

impl MultiDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the values of `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// The newest value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values(key).and_then(|v| v.last()).map(String::as_str)
    }

    /// Every value for `key`, oldest first. Empty if the key is missing.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.values(key)
            .map(|v| v.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values(key).is_some()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn values(&self, key: &str) -> Option<&Vec<String>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MultiDict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = MultiDict::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}
