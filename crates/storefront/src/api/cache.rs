//! Cache types for product listings.

/// Cache key for unfiltered listing pages.
///
/// Searches and filtered listings are never cached; their results change
/// with every keystroke and would only churn the cache.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct ListingKey {
    pub page: u32,
    pub per_page: u32,
}
