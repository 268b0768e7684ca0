use std::collections::HashSet;

use shared::domain::{Product, ProductId};
use tracing::warn;

/// Client-side copy of the backend's product list.
///
/// The sequence is only ever replaced wholesale. Products with a pending
/// deletion are hidden through an overlay that outlives replacements, so a
/// refresh while a deletion is pending does not bring the row back.
#[derive(Debug, Clone, Default)]
pub struct ProductStore {
    products: Vec<Product>,
    hidden: HashSet<ProductId>,
}

impl ProductStore {
    pub fn new(products: Vec<Product>) -> Self {
        let mut store = Self::default();
        store.replace(products);
        store
    }

    /// Replaces the whole sequence, keeping the first record of any duplicated id.
    pub fn replace(&mut self, products: Vec<Product>) {
        let mut seen = HashSet::with_capacity(products.len());
        let mut kept = Vec::with_capacity(products.len());
        for product in products {
            if seen.insert(product.id) {
                kept.push(product);
            } else {
                warn!("dropping duplicate product id {} from backend list", product.id);
            }
        }
        self.products = kept;
    }

    /// Every stored product, hidden ones included, in backend order.
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn visible(&self) -> Vec<Product> {
        self.products
            .iter()
            .filter(|product| !self.hidden.contains(&product.id))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    pub fn get_visible(&self, id: ProductId) -> Option<&Product> {
        self.get(id).filter(|_| !self.hidden.contains(&id))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn visible_len(&self) -> usize {
        self.products
            .iter()
            .filter(|product| !self.hidden.contains(&product.id))
            .count()
    }

    pub fn is_hidden(&self, id: ProductId) -> bool {
        self.hidden.contains(&id)
    }

    /// Hides a visible product and returns a copy of it.
    pub fn hide(&mut self, id: ProductId) -> Option<Product> {
        let product = self.get_visible(id)?.clone();
        self.hidden.insert(id);
        Some(product)
    }

    pub fn reveal(&mut self, id: ProductId) -> bool {
        self.hidden.remove(&id)
    }

    /// Drops a product locally after the backend confirmed its deletion.
    pub fn forget(&mut self, id: ProductId) {
        self.hidden.remove(&id);
        self.products.retain(|product| product.id != id);
    }
}
