use crate::error::SomanaError;

/// Keys that steer the query rather than filter it
pub const RESERVED_KEYS: [&str; 4] = ["page", "sort", "limit", "fields"];

/// The raw, flat key-value parameters of one list request.
///
/// Keys are unique: when a key repeats, the last value wins while the key
/// keeps its first position, matching how a query string collapses into a
/// plain object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    params: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        ListQuery { params: Vec::new() }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut list_query = ListQuery::new();
        for (key, value) in pairs {
            list_query.set(key, value);
        }
        list_query
    }

    /// Parses `key=value` command-line arguments
    pub fn from_args(args: &[String]) -> Result<Self, SomanaError> {
        let mut list_query = ListQuery::new();
        for arg in args {
            let (key, value) = arg.split_once('=').ok_or_else(|| {
                SomanaError::InvalidQuery(format!("Expected key=value, got '{arg}'"))
            })?;
            if key.is_empty() {
                return Err(SomanaError::InvalidQuery(format!(
                    "Missing parameter name in '{arg}'"
                )));
            }
            list_query.set(key, value);
        }
        Ok(list_query)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.params.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Like `get`, but treats an empty or blank value as absent
    pub fn get_non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    pub fn is_reserved(key: &str) -> bool {
        RESERVED_KEYS.contains(&key)
    }

    /// Every entry that is not a reserved key, in request order
    pub fn filter_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .filter(|(k, _)| !Self::is_reserved(k))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
