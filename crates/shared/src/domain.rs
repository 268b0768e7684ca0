use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map($name)
            }
        }
    };
}

id_newtype!(ProductId);

/// A single inventory record as exchanged with the backend.
///
/// `id` is chosen by the user at creation time and never changes afterwards.
/// `price` and `quantity` stay numeric end to end so that ordering is numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "non_negative_price")]
    pub price: f64,
    pub quantity: u32,
}

fn non_negative_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let price = f64::deserialize(deserializer)?;
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(de::Error::custom(format!(
            "price must be a finite non-negative number, got {price}"
        )))
    }
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        quantity: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            price,
            quantity,
        }
    }

    /// Value of the units currently in stock.
    pub fn stock_value(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_id_serializes_as_plain_number() {
        let product = Product::new(ProductId(7), "Pen", "", 1.5, 3);
        let json = serde_json::to_value(&product).expect("serialize");
        assert_eq!(json["id"], serde_json::json!(7));
        assert_eq!(json["price"], serde_json::json!(1.5));
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let product: Product =
            serde_json::from_str(r#"{"id":1,"name":"Pen","price":10,"quantity":5}"#)
                .expect("decode");
        assert_eq!(product.description, "");
        assert_eq!(product.price, 10.0);
    }

    #[test]
    fn negative_quantity_is_rejected_at_decode() {
        let err = serde_json::from_str::<Product>(
            r#"{"id":1,"name":"Pen","description":"","price":10,"quantity":-1}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn negative_price_is_rejected_at_decode() {
        let err = serde_json::from_str::<Product>(
            r#"{"id":1,"name":"Pen","description":"","price":-5.0,"quantity":1}"#,
        )
        .expect_err("negative price");
        assert!(err.to_string().contains("non-negative"));

        let free: Product =
            serde_json::from_str(r#"{"id":2,"name":"Sticker","price":0,"quantity":1}"#)
                .expect("zero price is allowed");
        assert_eq!(free.price, 0.0);
    }

    #[test]
    fn product_id_parses_trimmed_text() {
        assert_eq!(" 42 ".parse::<ProductId>().expect("parse"), ProductId(42));
        assert!("4x".parse::<ProductId>().is_err());
    }
}
