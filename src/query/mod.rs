//! Search state derived from the navigable location
//!
//! The location shape is:
//! - `q`: the trimmed search text (single value)
//! - `cat`: zero or more category labels (repeated parameter)
//!
//! [`SearchState`] is always rebuilt from a [`Location`]; nothing else feeds it.

mod location;

pub use location::{History, Location};

use url::form_urlencoded;

/// Query parameter carrying the search text
pub const QUERY_PARAM: &str = "q";

/// Repeated query parameter carrying the selected categories
pub const CATEGORY_PARAM: &str = "cat";

/// Selected category labels.
///
/// Insertion order is kept for display, duplicates collapse to the first
/// occurrence, and equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct CategorySet(Vec<String>);

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label; blank labels and duplicates are ignored
    pub fn insert(&mut self, label: impl AsRef<str>) -> bool {
        let label = label.as_ref().trim();
        if label.is_empty() || self.contains(label) {
            return false;
        }
        self.0.push(label.to_string());
        true
    }

    pub fn remove(&mut self, label: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c != label.trim());
        self.0.len() != before
    }

    /// Sidebar behaviour: remove if selected, otherwise append
    pub fn toggle(&mut self, label: &str) {
        if !self.remove(label) {
            self.insert(label);
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|c| c == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Labels in display order
    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }

    /// Labels in canonical (sorted) order
    pub fn sorted(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.iter().collect();
        labels.sort_unstable();
        labels
    }
}

impl PartialEq for CategorySet {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Eq for CategorySet {}

impl<S: AsRef<str>> FromIterator<S> for CategorySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

/// The active search: trimmed query text plus the category filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub categories: CategorySet,
}

impl SearchState {
    pub fn new(query: &str, categories: CategorySet) -> Self {
        Self {
            query: query.trim().to_string(),
            categories,
        }
    }

    /// Derive the state from a location
    pub fn from_location(location: &Location) -> Self {
        Self::new(
            location.get(QUERY_PARAM).unwrap_or_default(),
            location.get_all(CATEGORY_PARAM).collect(),
        )
    }

    /// Overwrite `q` and `cat` on an existing location, keeping other params
    pub fn apply_to(&self, location: &mut Location) {
        if self.query.is_empty() {
            location.delete(QUERY_PARAM);
        } else {
            location.set(QUERY_PARAM, self.query.as_str());
        }
        location.delete(CATEGORY_PARAM);
        for category in self.categories.iter() {
            location.append(CATEGORY_PARAM, category);
        }
    }

    /// No active search
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Order-independent string form; two states are the same search iff
    /// their canonical forms are equal
    pub fn canonical(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair(QUERY_PARAM, &self.query);
        for category in self.categories.sorted() {
            serializer.append_pair(CATEGORY_PARAM, category);
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_from_location() {
        let loc = Location::parse("/search?q=++red+shoes+&cat=Men%27s+Shoes&cat=+&cat=Men%27s+Shoes")
            .unwrap();
        let state = SearchState::from_location(&loc);
        assert_eq!(state.query, "red shoes");
        assert_eq!(state.categories.to_vec(), vec!["Men's Shoes"]);
    }

    #[test]
    fn test_missing_query_is_empty_state() {
        let state = SearchState::from_location(&Location::parse("/search?cat=Watches").unwrap());
        assert!(state.is_empty());
        assert_eq!(state.categories.len(), 1);
    }

    #[test]
    fn test_location_round_trip_ignores_category_order() {
        let original = Location::parse("/search?q=watch&cat=Watches&cat=Accessories").unwrap();
        let state = SearchState::from_location(&original);
        let mut rebuilt = Location::new("/search");
        state.apply_to(&mut rebuilt);

        assert_eq!(rebuilt.get("q"), original.get("q"));
        let reordered = Location::parse("/search?cat=Accessories&q=watch&cat=Watches").unwrap();
        assert_eq!(SearchState::from_location(&rebuilt), SearchState::from_location(&reordered));
        assert_eq!(
            SearchState::from_location(&rebuilt).canonical(),
            SearchState::from_location(&reordered).canonical()
        );
    }

    #[test]
    fn test_canonical_form_changes_with_query_or_categories() {
        let base = SearchState::new("lamp", ["Home Decor"].into_iter().collect());
        let other_query = SearchState::new("lamps", base.categories.clone());
        let other_cats = SearchState::new("lamp", CategorySet::new());

        assert_ne!(base.canonical(), other_query.canonical());
        assert_ne!(base.canonical(), other_cats.canonical());
        assert_eq!(base.canonical(), "q=lamp&cat=Home+Decor");
    }

    #[test]
    fn test_apply_keeps_unrelated_params() {
        let mut loc = Location::parse("/search?q=old&page=2&cat=x").unwrap();
        SearchState::new("new", ["y", "z"].into_iter().collect()).apply_to(&mut loc);
        assert_eq!(loc.href(), "/search?q=new&page=2&cat=y&cat=z");
    }

    #[test]
    fn test_category_toggle() {
        let mut cats = CategorySet::new();
        cats.toggle("Electronics");
        cats.toggle("Watches");
        cats.toggle("Electronics");
        assert_eq!(cats.to_vec(), vec!["Watches"]);
        assert!(!cats.insert("Watches"));
        assert!(!cats.insert("   "));
    }
}
