//! Multi-valued request parameters.
//!
//! [`Params`] is the flat key/value view of a search request. A key may carry
//! several values and their order is kept. Pipeline stages *claim* the keys
//! they understand by popping them, so a stage that runs later only ever sees
//! what nobody else recognized.

/// An ordered multi-map of request parameters.
///
/// # Example
///
/// ```
/// use marginalia_search::Params;
///
/// let mut params = Params::new()
///     .with("tag", "rust")
///     .with("tag", "search")
///     .with("limit", "5");
///
/// assert_eq!(params.get_all("tag"), vec!["rust", "search"]);
/// assert_eq!(params.pop("limit").as_deref(), Some("5"));
/// assert!(!params.contains_key("limit"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value for `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Builder form of [`Params::add`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, value);
        self
    }

    /// Returns the last value given for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value given for `key`, in request order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns true if at least one value is present for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Removes every value of `key` and returns the last one.
    pub fn pop(&mut self, key: &str) -> Option<String> {
        self.pop_all(key).pop()
    }

    /// Removes every value of `key` and returns them in request order.
    pub fn pop_all(&mut self, key: &str) -> Vec<String> {
        let mut claimed = Vec::new();
        self.pairs.retain(|(k, v)| {
            if k == key {
                claimed.push(v.clone());
                false
            } else {
                true
            }
        });
        claimed
    }

    /// Returns the distinct keys in order of first appearance.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for (key, _) in &self.pairs {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.clone());
            }
        }
        keys
    }

    /// Iterates over all `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of `(key, value)` pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there are no parameters left.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
