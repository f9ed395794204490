use serde::{Deserialize, Serialize};

use crate::product::{Product, ProductCategory, ProductStatus};

/// Filter criteria for listing products. An empty filter matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub category: Option<ProductCategory>,
    pub status: Option<ProductStatus>,
}

impl ProductFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: ProductCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.category.is_none_or(|c| product.category == c)
            && self.status.is_none_or(|s| product.status == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use catalog_core::ProductId;

    use crate::product::NewProduct;

    fn product(category: ProductCategory, status: ProductStatus) -> Product {
        let mut p = NewProduct {
            category,
            title: "Item".to_string(),
            description: String::new(),
            starting_price: Decimal::ONE,
            seller_id: "seller".to_string(),
        }
        .into_product(ProductId::new(), Utc::now());
        p.status = status;
        p
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = ProductFilter::all();
        assert!(f.matches(&product(ProductCategory::Art, ProductStatus::Sold)));
    }

    #[test]
    fn category_and_status_combine() {
        let f = ProductFilter::all()
            .with_category(ProductCategory::Jewelry)
            .with_status(ProductStatus::Available);

        assert!(f.matches(&product(ProductCategory::Jewelry, ProductStatus::Available)));
        assert!(!f.matches(&product(ProductCategory::Jewelry, ProductStatus::Pending)));
        assert!(!f.matches(&product(ProductCategory::Art, ProductStatus::Available)));
    }
}
