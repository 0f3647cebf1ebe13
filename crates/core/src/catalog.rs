//! Brand grouping for the unfiltered shop listing.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::Product;

/// House brands in display priority. Also the brand chips offered by the
/// header filter.
pub const BRAND_PRIORITY: [&str; 10] = [
    "Relox",
    "Omega",
    "Patek Philippe",
    "Audemars Piguet",
    "Breguet",
    "Breitling",
    "Maurice Lacroix",
    "Rado",
    "Vacheron Constantin",
    "Tissot",
];

/// Section title for products without a brand.
pub const UNBRANDED: &str = "Other";

/// A brand section of the shop page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandSection {
    pub brand: String,
    pub products: Vec<Product>,
}

fn priority(brand: &str) -> Option<usize> {
    BRAND_PRIORITY.iter().position(|b| *b == brand)
}

fn compare_brands(a: &str, b: &str) -> Ordering {
    match (priority(a), priority(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Group products by brand: house brands first in priority order, then the
/// rest alphabetically. Products keep their listing order within a section.
#[must_use]
pub fn group_by_brand(products: &[Product]) -> Vec<BrandSection> {
    let mut sections: Vec<BrandSection> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for product in products {
        let brand = product
            .brand
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or(UNBRANDED);
        let slot = *index.entry(brand).or_insert_with(|| {
            sections.push(BrandSection {
                brand: brand.to_string(),
                products: Vec::new(),
            });
            sections.len() - 1
        });
        if let Some(section) = sections.get_mut(slot) {
            section.products.push(product.clone());
        }
    }

    sections.sort_by(|a, b| compare_brands(&a.brand, &b.brand));
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Price, ProductId};

    fn product(id: i64, brand: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Watch {id}"),
            brand: brand.map(str::to_string),
            price: Price::ZERO,
            stock: 1,
            image: None,
            description: None,
        }
    }

    #[test]
    fn test_priority_then_alphabetical() {
        let products = vec![
            product(1, Some("Zenith")),
            product(2, Some("Omega")),
            product(3, Some("Cartier")),
            product(4, Some("Relox")),
            product(5, None),
            product(6, Some("Omega")),
        ];

        let sections = group_by_brand(&products);
        let brands: Vec<&str> = sections.iter().map(|s| s.brand.as_str()).collect();
        assert_eq!(brands, ["Relox", "Omega", "Cartier", "Other", "Zenith"]);

        let omega: Vec<i64> = sections[1].products.iter().map(|p| p.id.get()).collect();
        assert_eq!(omega, [2, 6]);
    }

    #[test]
    fn test_empty_listing() {
        assert!(group_by_brand(&[]).is_empty());
    }
}
