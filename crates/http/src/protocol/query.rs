use indexmap::IndexMap;

use crate::protocol::ParseError;

/// Decoded query parameters of a request target, in first-seen order.
///
/// A repeated key keeps the value of its last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    data: IndexMap<String, String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    // a=1&c=2&b=3
    // ""
    // a=1&a=2
    // a&b&c=2
    pub fn parse(str: &str) -> Result<Self, ParseError> {
        let mut query = Query::new();
        if str.is_empty() {
            return Ok(query);
        }

        let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(str)
            .map_err(|e| ParseError::malformed_head(format!("invalid query string {str:?}: {e}")))?;
        for (key, value) in pairs {
            query.insert(key.trim(), value);
        }
        Ok(query)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> Option<String> {
        self.data.insert(key.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Form-encodes the parameters as `k=v&...`, without the leading `?`.
    pub fn encode(&self) -> String {
        let pairs: Vec<(&str, &str)> = self.iter().collect();
        // string pairs always serialize
        serde_urlencoded::to_string(pairs).unwrap_or_default()
    }
}

/// Splits a request target into its path and decoded query.
pub fn split_target(target: &str) -> Result<(&str, Query), ParseError> {
    match target.split_once('?') {
        Some((path, query)) => Ok((path, Query::parse(query)?)),
        None => Ok((target, Query::new())),
    }
}
