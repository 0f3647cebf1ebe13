//! Search and filter record shared by the header, the marketing sections and
//! the shop page.

use serde::{Deserialize, Serialize};

/// Shop sort order. The empty value is the featured ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    #[serde(rename = "")]
    Featured,
    PriceAsc,
    PriceDesc,
    Newest,
}

impl SortOrder {
    /// Value sent as the `sort` query parameter (empty for featured).
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Featured => "",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Newest => "newest",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Featured => "Featured Pieces",
            Self::PriceAsc => "Price: Low to High",
            Self::PriceDesc => "Price: High to Low",
            Self::Newest => "Newest Arrivals",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "featured" => Ok(Self::Featured),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "newest" => Ok(Self::Newest),
            other => Err(format!("invalid sort order: {other}")),
        }
    }
}

/// Free-text query, brand and sort.
///
/// Lives only for the current run; reset whenever navigation returns home.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    pub query: String,
    pub brand: String,
    pub sort: SortOrder,
}

impl SearchFilters {
    /// Whether any filter narrows or reorders the listing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty() || !self.brand.is_empty() || self.sort != SortOrder::Featured
    }

    /// Query parameters for `GET /products`, omitting empty values.
    #[must_use]
    pub fn query_params(&self, page: u32, per_page: u32) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(5);
        let query = self.query.trim();
        if !query.is_empty() {
            params.push(("q", query.to_string()));
        }
        if !self.brand.is_empty() {
            params.push(("brand", self.brand.clone()));
        }
        if self.sort != SortOrder::Featured {
            params.push(("sort", self.sort.as_param().to_string()));
        }
        if page > 0 {
            params.push(("page", page.to_string()));
        }
        if per_page > 0 {
            params.push(("per_page", per_page.to_string()));
        }
        params
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_inactive() {
        assert!(!SearchFilters::default().is_active());
        let blank_query = SearchFilters {
            query: "   ".to_string(),
            ..SearchFilters::default()
        };
        assert!(!blank_query.is_active());
    }

    #[test]
    fn test_params_omit_empty_values() {
        let filters = SearchFilters {
            query: " daytona ".to_string(),
            brand: String::new(),
            sort: SortOrder::PriceDesc,
        };
        assert_eq!(
            filters.query_params(2, 50),
            vec![
                ("q", "daytona".to_string()),
                ("sort", "price_desc".to_string()),
                ("page", "2".to_string()),
                ("per_page", "50".to_string()),
            ]
        );
    }

    #[test]
    fn test_sort_serde_uses_api_values() {
        assert_eq!(serde_json::to_string(&SortOrder::Featured).unwrap(), "\"\"");
        assert_eq!(serde_json::to_string(&SortOrder::PriceAsc).unwrap(), "\"price_asc\"");
        assert_eq!("newest".parse::<SortOrder>(), Ok(SortOrder::Newest));
    }
}
