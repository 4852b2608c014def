//! String-keyed scalar storage as persisted by the host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw persisted module values. Every read is a "try" read: missing keys and
/// unparsable values both come back as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldStore {
    values: BTreeMap<String, String>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The raw persisted string, if any.
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Non-empty string value.
    pub fn try_string(&self, key: &str) -> Option<&str> {
        self.get_raw(key).filter(|value| !value.is_empty())
    }

    /// Finite `f64` value.
    pub fn try_f64(&self, key: &str) -> Option<f64> {
        self.get_raw(key)?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }

    /// Finite `f32` value, widened to `f64`.
    pub fn try_f32(&self, key: &str) -> Option<f64> {
        self.get_raw(key)?
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|value| value.is_finite())
            .map(f64::from)
    }

    /// Boolean value; accepts `True`/`False` in any case.
    pub fn try_bool(&self, key: &str) -> Option<bool> {
        let raw = self.get_raw(key)?.trim();
        if raw.eq_ignore_ascii_case("true") {
            Some(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldStore
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = FieldStore::new();
        for (key, value) in iter {
            store.set(key, value);
        }
        store
    }
}
