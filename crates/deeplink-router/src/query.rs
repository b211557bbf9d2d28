//! Query-string parameters carried by a deep link
//!
//! Links arrive with a flat query string. Keys keep the order of their first
//! appearance; a repeated key keeps its **last** value.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::path::split_query;

/// Ordered string-to-string query parameters (last value wins)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    entries: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw query string (without the leading `?`)
    ///
    /// Keys and values are percent-decoded, `+` decodes to a space. A key
    /// without `=` gets an empty value. Invalid UTF-8 escapes keep the raw text.
    ///
    /// # Examples
    ///
    /// ```
    /// use deeplink_router::QueryParams;
    ///
    /// let query = QueryParams::parse("tab=info&id=1&tab=stock&flag");
    /// assert_eq!(query.get("tab"), Some("stock"));
    /// assert_eq!(query.get("flag"), Some(""));
    /// assert_eq!(query.keys().collect::<Vec<_>>(), vec!["tab", "id", "flag"]);
    /// ```
    pub fn parse(query: &str) -> Self {
        query
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .filter(|(key, _)| !key.is_empty())
            .collect()
    }

    /// Parses the query part of a full link, if any
    pub fn from_link(link: &str) -> Self {
        split_query(link)
            .1
            .map(Self::parse)
            .unwrap_or_default()
    }

    /// Inserts a parameter; an existing key keeps its position and takes the new value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the parameters as a percent-encoded query string (no leading `?`)
    ///
    /// # Examples
    ///
    /// ```
    /// use deeplink_router::QueryParams;
    ///
    /// let query = QueryParams::new().with("fallbackUrl", "/details/pharmacy");
    /// assert_eq!(query.to_query_string(), "fallbackUrl=%2Fdetails%2Fpharmacy");
    /// ```
    pub fn to_query_string(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (key, value) in iter {
            let key = key.into();
            let value = value.into();

            match positions.get(&key) {
                Some(&index) => entries[index].1 = value,
                None => {
                    positions.insert(key.clone(), entries.len());
                    entries.push((key, value));
                }
            }
        }

        QueryParams { entries }
    }
}

/// Percent-decodes one query component, falling back to the raw text
pub(crate) fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}
