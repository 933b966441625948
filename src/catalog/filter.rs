//! List filtering.

use crate::types::{Catalog, Record};

/// Criteria for listing records. Every criterion is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Case-insensitive substring searched in title, developer and description.
    pub query: Option<String>,

    /// Exact console name.
    pub console: Option<String>,

    /// Inclusive lower bound on year.
    pub min_year: Option<i64>,

    /// Inclusive upper bound on year.
    pub max_year: Option<i64>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn console(mut self, console: impl Into<String>) -> Self {
        self.console = Some(console.into());
        self
    }

    pub fn min_year(mut self, year: i64) -> Self {
        self.min_year = Some(year);
        self
    }

    pub fn max_year(mut self, year: i64) -> Self {
        self.max_year = Some(year);
        self
    }

    /// Check a single record against this filter.
    pub fn matches(&self, record: &Record) -> bool {
        Matcher::from(self).matches(record)
    }
}

/// A filter with its text query normalized once up front.
#[derive(Clone, Debug)]
struct Matcher {
    needle: Option<String>,
    console: Option<String>,
    min_year: Option<i64>,
    max_year: Option<i64>,
}

impl From<&ListFilter> for Matcher {
    fn from(filter: &ListFilter) -> Self {
        // Empty strings mean "not given".
        Self {
            needle: filter
                .query
                .as_deref()
                .filter(|q| !q.is_empty())
                .map(str::to_lowercase),
            console: filter.console.clone().filter(|c| !c.is_empty()),
            min_year: filter.min_year,
            max_year: filter.max_year,
        }
    }
}

impl Matcher {
    fn matches(&self, record: &Record) -> bool {
        if let Some(needle) = &self.needle {
            if !record.search_text().contains(needle.as_str()) {
                return false;
            }
        }

        if let Some(console) = &self.console {
            if record.console != *console {
                return false;
            }
        }

        // Records without a year sort as year 0.
        let year = record.year.unwrap_or(0);
        if self.min_year.is_some_and(|min| year < min) {
            return false;
        }
        if self.max_year.is_some_and(|max| year > max) {
            return false;
        }

        true
    }
}

/// A filtered view over a catalog snapshot.
///
/// Filtering happens while iterating, and the view can be iterated any
/// number of times. The snapshot is detached from the store.
#[derive(Clone, Debug)]
pub struct Listing {
    catalog: Catalog,
    matcher: Matcher,
}

impl Listing {
    pub(crate) fn new(catalog: Catalog, filter: &ListFilter) -> Self {
        Self {
            catalog,
            matcher: Matcher::from(filter),
        }
    }

    /// Iterate over matching records in catalog order.
    pub fn iter(&self) -> ListingIter<'_> {
        ListingIter {
            inner: self.catalog.iter(),
            matcher: &self.matcher,
        }
    }

    /// Number of matching records.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Collect matching records.
    pub fn to_vec(&self) -> Vec<Record> {
        self.iter().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a Listing {
    type Item = &'a Record;
    type IntoIter = ListingIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`Listing`].
pub struct ListingIter<'a> {
    inner: std::slice::Iter<'a, Record>,
    matcher: &'a Matcher,
}

impl<'a> Iterator for ListingIter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let matcher = self.matcher;
        self.inner.find(|r| matcher.matches(r))
    }
}
