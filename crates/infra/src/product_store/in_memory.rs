use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use catalog_core::ProductId;
use catalog_products::{ConditionalUpdate, NewProduct, Product, ProductFilter};

use super::r#trait::{ProductRepository, StoreError};

/// In-memory product repository.
///
/// Intended for tests/dev. Every write runs inside one `RwLock` write section,
/// which is what makes `conditional_transition()` atomic per record.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.products.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: NewProduct) -> Result<ProductId, StoreError> {
        let id = ProductId::new();
        let record = product.into_product(id, Utc::now());

        let mut products = self.products.write().map_err(|_| poisoned())?;
        products.insert(id, record);
        Ok(id)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products.get(&id).cloned())
    }

    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        let mut out: Vec<Product> = products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn replace(&self, product: &Product) -> Result<u64, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        let Some(existing) = products.get_mut(&product.id) else {
            return Ok(0);
        };

        existing.category = product.category;
        existing.title = product.title.clone();
        existing.description = product.description.clone();
        existing.starting_price = product.starting_price;
        existing.status = product.status;
        existing.current_auction_id = product.current_auction_id;
        Ok(1)
    }

    async fn conditional_transition(
        &self,
        id: ProductId,
        update: &ConditionalUpdate,
    ) -> Result<u64, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        match products.get_mut(&id) {
            Some(product) => Ok(u64::from(update.apply_if_matches(product))),
            None => Ok(0),
        }
    }

    async fn delete(&self, id: ProductId) -> Result<u64, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        Ok(u64::from(products.remove(&id).is_some()))
    }
}
