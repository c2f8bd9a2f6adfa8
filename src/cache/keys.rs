//! Cache key derivation.
//!
//! A key is a namespace followed by the form-urlencoded parameter pairs in
//! sorted order, so every permutation of the same query maps to one entry
//! and distinct parameter sets never share one.

use url::form_urlencoded;

use super::pattern::escape_glob;

/// Namespace for cached category responses.
pub const CATEGORIES_NAMESPACE: &str = "categories";
/// Namespace for cached product responses.
pub const PRODUCTS_NAMESPACE: &str = "products";

const NAMESPACE_SEPARATOR: char = ':';

/// Query parameters in the order they were supplied.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a raw query string (without the leading `?`).
    pub fn parse(query: Option<&str>) -> Self {
        let pairs: Vec<(String, String)> = query
            .map(|raw| {
                form_urlencoded::parse(raw.as_bytes())
                    .map(|(name, value)| (name.into_owned(), value.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        Self { pairs }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Last value supplied for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace every value of `name` with a single `value`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.remove(name);
        self.pairs.push((name.to_string(), value.into()));
    }

    pub fn remove(&mut self, name: &str) {
        self.pairs.retain(|(key, _)| key != name);
    }

    /// Form-urlencoded serialisation with pairs sorted by name, then value.
    pub fn encode(&self) -> String {
        let mut sorted: Vec<&(String, String)> = self.pairs.iter().collect();
        sorted.sort();
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(sorted)
            .finish()
    }
}

/// Build the cache key for `params` within `namespace`.
pub fn derive_key(namespace: &str, params: &QueryParams) -> String {
    format!("{namespace}{NAMESPACE_SEPARATOR}{}", params.encode())
}

/// Glob pattern matching every key derived within `namespace`.
pub fn namespace_pattern(namespace: &str) -> String {
    format!("{}{NAMESPACE_SEPARATOR}*", escape_glob(namespace))
}

/// Deployment-wide prefix applied by store adapters to every key and pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPrefix(Option<String>);

impl KeyPrefix {
    pub fn new(prefix: &str) -> Self {
        let trimmed = prefix.trim();
        Self((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }

    pub fn qualify(&self, key: &str) -> String {
        match &self.0 {
            Some(prefix) => format!("{prefix}{NAMESPACE_SEPARATOR}{key}"),
            None => key.to_string(),
        }
    }

    pub fn qualify_pattern(&self, pattern: &str) -> String {
        match &self.0 {
            Some(prefix) => format!("{}{NAMESPACE_SEPARATOR}{pattern}", escape_glob(prefix)),
            None => pattern.to_string(),
        }
    }
}
