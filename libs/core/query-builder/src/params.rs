//! Raw query parameters as they arrive from a query string.

use std::collections::BTreeMap;

pub const SEARCH_TERM: &str = "searchTerm";
pub const SORT: &str = "sort";
pub const FIELDS: &str = "fields";
pub const PAGE: &str = "page";
pub const LIMIT: &str = "limit";

/// Parameter names that drive the builder itself and are never filters.
pub const RESERVED_PARAMS: [&str; 5] = [SEARCH_TERM, SORT, FIELDS, PAGE, LIMIT];

/// A parameter value: one string, or every value of a repeated key in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    Many(Vec<String>),
}

impl ParamValue {
    /// First value; repeated reserved parameters are read this way.
    pub fn first(&self) -> &str {
        match self {
            ParamValue::Single(value) => value,
            ParamValue::Many(values) => values.first().map_or("", String::as_str),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            ParamValue::Single(value) => std::slice::from_ref(value),
            ParamValue::Many(values) => values,
        };
        values.iter().map(String::as_str)
    }

    fn append(self, value: String) -> Self {
        match self {
            ParamValue::Single(first) => ParamValue::Many(vec![first, value]),
            ParamValue::Many(mut values) => {
                values.push(value);
                ParamValue::Many(values)
            }
        }
    }
}

/// Untyped `key -> value(s)` mapping, iterated in key order so the
/// composed query is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: BTreeMap<String, ParamValue>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw query string (`a=1&b[gte]=2&b=3`), without the leading `?`.
    ///
    /// Keys and values are percent-decoded and `+` is read as a space.
    /// Malformed escapes are kept verbatim rather than rejected.
    pub fn parse(query: &str) -> Self {
        let mut params = Self::new();
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode(key);
            if key.is_empty() {
                continue;
            }
            params.insert(key, decode(value));
        }
        params
    }

    /// Add a value; a repeated key becomes multi-valued.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        let next = match self.values.remove(&key) {
            Some(existing) => existing.append(value),
            None => ParamValue::Single(value),
        };
        self.values.insert(key, next);
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(ParamValue::first)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn is_reserved(key: &str) -> bool {
        RESERVED_PARAMS.contains(&key)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// OpenAPI description of the listing parameters every list endpoint accepts.
///
/// Not used for extraction; handlers take [`QueryParams`] so that arbitrary
/// `field` and `field[op]` filters pass through.
#[derive(Debug, Default, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
#[allow(non_snake_case, dead_code)]
pub struct ListingParams {
    /// Case-insensitive substring match over the endpoint's searchable fields
    searchTerm: Option<String>,
    /// Comma-separated fields; `-field` sorts descending
    sort: Option<String>,
    /// Comma-separated fields to return; `-field` excludes
    fields: Option<String>,
    /// 1-indexed page number (default 1)
    page: Option<u64>,
    /// Page size (default 10)
    limit: Option<u64>,
}

#[cfg(feature = "axum")]
mod axum_integration {
    use super::QueryParams;
    use axum::{extract::FromRequestParts, http::request::Parts};
    use std::convert::Infallible;

    /// Never rejects: a missing or odd query string is an empty parameter set.
    impl<S> FromRequestParts<S> for QueryParams
    where
        S: Send + Sync,
    {
        type Rejection = Infallible;

        async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
            Ok(parts.uri.query().map(QueryParams::parse).unwrap_or_default())
        }
    }
}
