use std::collections::btree_map;
use std::collections::BTreeMap;

/// Key under which callers pass a title override
pub const TITLE_KEY: &str = "title";
/// Key under which payload builders expose the message text
pub const MESSAGE_KEY: &str = "message";

/// Per-call key/value overrides layered on top of a service's stored config
///
/// Params are consumed by a single `send` and never written back into the
/// service. Iteration order is sorted by key so that overlays are applied
/// deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy every entry of `other` into self, overwriting existing keys
    pub fn extend_from(&mut self, other: &Params) {
        for (k, v) in other.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Params {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let params = Params::new().with("title", "Deploy").with("priority", "5");
        assert_eq!(params.get(TITLE_KEY), Some("Deploy"));
        assert_eq!(params.len(), 2);
        assert!(params.get("missing").is_none());
    }

    #[test]
    fn test_iteration_is_sorted() {
        let params = Params::from([("zeta", "1"), ("alpha", "2")]);
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_extend_from_overwrites() {
        let mut base = Params::from([("title", "a"), ("tags", "x")]);
        base.extend_from(&Params::from([("title", "b")]));
        assert_eq!(base.get("title"), Some("b"));
        assert_eq!(base.get("tags"), Some("x"));
    }
}
