//! Ordered, case-insensitive header storage.

use std::fmt;

use http::{HeaderName, HeaderValue};

use crate::error::ValidationError;

/// Conversion into the list of values of one header.
///
/// A single value is stored as a one element list.
pub trait IntoHeaderValues {
    fn into_header_values(self) -> Vec<String>;
}

impl IntoHeaderValues for &str {
    fn into_header_values(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoHeaderValues for String {
    fn into_header_values(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoHeaderValues for &String {
    fn into_header_values(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl IntoHeaderValues for Vec<String> {
    fn into_header_values(self) -> Vec<String> {
        self
    }
}

impl IntoHeaderValues for Vec<&str> {
    fn into_header_values(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoHeaderValues for &[&str] {
    fn into_header_values(self) -> Vec<String> {
        self.iter().map(|value| (*value).to_string()).collect()
    }
}

impl<const N: usize> IntoHeaderValues for [&str; N] {
    fn into_header_values(self) -> Vec<String> {
        self.iter().map(|value| (*value).to_string()).collect()
    }
}

/// One header: the name as first registered and its trimmed values.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    values: Vec<String>,
}

/// Header collection keyed case-insensitively, keeping the casing of the
/// first registration and the order in which headers were last written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<Entry>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the collection from scratch. Names colliding case-insensitively
    /// are merged into the first one, in order.
    ///
    /// # Errors
    ///
    /// Fails on a syntactically invalid header name or value.
    pub fn from_pairs<I, N, V>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: IntoHeaderValues,
    {
        let mut headers = Headers::new();
        for (name, values) in pairs {
            let values = normalize(name.as_ref(), values)?;
            headers.append(name.as_ref(), values);
        }
        Ok(headers)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the values of `name`, empty when absent.
    pub fn get(&self, name: &str) -> &[String] {
        self.position(name).map_or(&[][..], |i| self.entries[i].values.as_slice())
    }

    /// Returns the values of `name` joined with `", "`.
    pub fn line(&self, name: &str) -> String {
        self.get(name).join(", ")
    }

    /// Iterates `(original name, values)` in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|entry| (entry.name.as_str(), entry.values.as_slice()))
    }

    /// Iterates the header names in header order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces `name`, moving it to the end under the new casing.
    pub(crate) fn set(&mut self, name: &str, values: Vec<String>) {
        self.remove(name);
        self.entries.push(Entry { name: name.to_string(), values });
    }

    /// Appends to the values of `name`, keeping its position and casing.
    pub(crate) fn append(&mut self, name: &str, values: Vec<String>) {
        match self.position(name) {
            Some(i) => self.entries[i].values.extend(values),
            None => self.entries.push(Entry { name: name.to_string(), values }),
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    /// Replaces `name` and moves it to the front, keeping the registered casing if any.
    pub(crate) fn set_first(&mut self, name: &str, values: Vec<String>) {
        let name = match self.position(name) {
            Some(i) => self.entries.remove(i).name,
            None => name.to_string(),
        };
        self.entries.insert(0, Entry { name, values });
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a [String]);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a [String])> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Renders the headers as they would appear on the wire.
impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, values) in self {
            writeln!(f, "{name}: {}\r", values.join(", "))?;
        }
        Ok(())
    }
}

/// Validates the header name and trims and validates each value.
pub(crate) fn normalize(name: &str, values: impl IntoHeaderValues) -> Result<Vec<String>, ValidationError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| ValidationError::invalid_header_name(name))?;

    values
        .into_header_values()
        .into_iter()
        .map(|value| {
            let trimmed = value.trim_matches([' ', '\t']);
            match HeaderValue::from_str(trimmed) {
                Ok(_) => Ok(trimmed.to_string()),
                Err(_) => Err(ValidationError::invalid_header_value(name, &value)),
            }
        })
        .collect()
}
