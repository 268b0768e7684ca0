use serde::{Deserialize, Serialize};

use crate::domain::ProductId;

pub const PRODUCTS_PATH: &str = "products/";

pub fn product_path(id: ProductId) -> String {
    format!("products/{}", id.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteProductResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_relative_product_paths() {
        assert_eq!(PRODUCTS_PATH, "products/");
        assert_eq!(product_path(ProductId(12)), "products/12");
    }
}
