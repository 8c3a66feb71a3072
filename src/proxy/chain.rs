//! Ordered filter chains.

use std::fmt;
use std::sync::Arc;

/// An ordered sequence of filters.
///
/// Filters run in insertion order; there is no priority reordering. Cloning a
/// chain shares the filters, so one configured chain can seed many proxies.
pub struct FilterChain<T: ?Sized> {
    filters: Vec<Arc<T>>,
}

impl<T: ?Sized> FilterChain<T> {
    pub fn new() -> Self {
        Self { filters: Vec::new() }
    }

    /// Append a filter; it runs after every filter already in the chain.
    pub fn push(&mut self, filter: Arc<T>) {
        self.filters.push(filter);
    }

    /// Replace the whole chain.
    pub fn replace<I>(&mut self, filters: I)
    where
        I: IntoIterator<Item = Arc<T>>,
    {
        self.filters = filters.into_iter().collect();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<T>> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<T: ?Sized> Default for FilterChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for FilterChain<T> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for FilterChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("len", &self.filters.len())
            .finish()
    }
}

impl<T: ?Sized> FromIterator<Arc<T>> for FilterChain<T> {
    fn from_iter<I: IntoIterator<Item = Arc<T>>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}

impl<T: ?Sized> IntoIterator for FilterChain<T> {
    type Item = Arc<T>;
    type IntoIter = std::vec::IntoIter<Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.into_iter()
    }
}

impl<'a, T: ?Sized> IntoIterator for &'a FilterChain<T> {
    type Item = &'a Arc<T>;
    type IntoIter = std::slice::Iter<'a, Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut chain: FilterChain<str> = FilterChain::new();
        chain.push(Arc::from("a"));
        chain.push(Arc::from("b"));
        let names: Vec<&str> = chain.iter().map(|s| &**s).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_replace_discards_previous() {
        let mut chain: FilterChain<str> = vec![Arc::from("a"), Arc::from("b")].into_iter().collect();
        chain.replace(vec![Arc::from("c")]);
        assert_eq!(chain.len(), 1);
        assert_eq!(&*chain.iter().next().unwrap().clone(), "c");
    }

    #[test]
    fn test_clone_shares_filters() {
        let chain: FilterChain<str> = vec![Arc::from("a")].into_iter().collect();
        let copy = chain.clone();
        assert!(Arc::ptr_eq(chain.iter().next().unwrap(), copy.iter().next().unwrap()));
    }
}
