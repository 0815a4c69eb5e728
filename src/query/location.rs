//! Navigable locations and the history stack they live on

use crate::error::LocationError;
use once_cell::sync::Lazy;
use url::{form_urlencoded, Url};

/// Origin used to resolve relative hrefs; never rendered back out
static BASE: Lazy<Url> = Lazy::new(|| Url::parse("http://localhost/").unwrap());

/// A path plus ordered, possibly repeated query parameters.
///
/// Mirrors the browser's `URLSearchParams` semantics for the operations the
/// session needs (`get`, `get_all`, `set`, `append`, `delete`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    pairs: Vec<(String, String)>,
}

impl Location {
    /// Create an empty location for a path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            pairs: Vec::new(),
        }
    }

    /// Parse an absolute URL or a relative href such as `/search?q=shoes`
    pub fn parse(href: &str) -> Result<Self, LocationError> {
        let url = Url::options()
            .base_url(Some(&BASE))
            .parse(href)
            .map_err(|source| LocationError::Parse {
                href: href.to_string(),
                source,
            })?;

        Ok(Self {
            path: url.path().to_string(),
            pairs: url.query_pairs().into_owned().collect(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// First value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values for a key, in order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the first value for a key and drop the rest, or append it
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index <= first || k != key;
                    index += 1;
                    keep
                });
            }
            None => self.append(key, value),
        }
    }

    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        self.pairs.push((key.to_string(), value.into()));
    }

    pub fn delete(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// Encoded query string without the leading `?`
    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.pairs)
            .finish()
    }

    /// Relative href, e.g. `/search?q=black+shirt&cat=Accessories`
    pub fn href(&self) -> String {
        if self.pairs.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string())
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.href())
    }
}

/// Session history: a list of entries with a cursor
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Location>,
    index: usize,
}

impl History {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> &Location {
        &self.entries[self.index]
    }

    /// Add an entry after the current one, discarding forward entries
    pub fn push(&mut self, location: Location) {
        self.entries.truncate(self.index + 1);
        self.entries.push(location);
        self.index += 1;
    }

    /// Overwrite the current entry
    pub fn replace(&mut self, location: Location) {
        self.entries[self.index] = location;
    }

    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
