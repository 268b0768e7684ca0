use shared::domain::{Product, ProductId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} must be a whole number, got '{value}'")]
    NotAnInteger { field: &'static str, value: String },
    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },
    #[error("{0} must not be negative")]
    Negative(&'static str),
}

/// Product form contents exactly as typed, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: String,
}

impl ProductDraft {
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            quantity: product.quantity.to_string(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<Product, ValidationError> {
        let id = required("ID", &self.id)?;
        let id = id
            .parse::<i64>()
            .map(ProductId)
            .map_err(|_| ValidationError::NotAnInteger {
                field: "ID",
                value: id.to_string(),
            })?;

        let name = required("Name", &self.name)?;

        let price = required("Price", &self.price)?;
        let price = price
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ValidationError::NotANumber {
                field: "Price",
                value: price.to_string(),
            })?;
        if price < 0.0 {
            return Err(ValidationError::Negative("Price"));
        }

        let quantity = required("Quantity", &self.quantity)?;
        let quantity = match quantity.parse::<i64>() {
            Ok(value) if value < 0 => return Err(ValidationError::Negative("Quantity")),
            Ok(value) => u32::try_from(value).map_err(|_| ValidationError::NotAnInteger {
                field: "Quantity",
                value: quantity.to_string(),
            })?,
            Err(_) => {
                return Err(ValidationError::NotAnInteger {
                    field: "Quantity",
                    value: quantity.to_string(),
                })
            }
        };

        Ok(Product {
            id,
            name: name.to_string(),
            description: self.description.trim().to_string(),
            price,
            quantity,
        })
    }
}

fn required<'a>(field: &'static str, raw: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Missing(field))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(id: &str, name: &str, price: &str, quantity: &str) -> ProductDraft {
        ProductDraft {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price: price.into(),
            quantity: quantity.into(),
        }
    }

    #[test]
    fn valid_draft_becomes_numeric_product() {
        let product = draft(" 7 ", "Pen", "10.50", "3").validate().expect("valid");
        assert_eq!(product.id, ProductId(7));
        assert_eq!(product.price, 10.5);
        assert_eq!(product.quantity, 3);
        assert_eq!(product.description, "");
    }

    #[test]
    fn required_fields_are_checked_first() {
        assert_eq!(
            draft("", "Pen", "1", "1").validate(),
            Err(ValidationError::Missing("ID"))
        );
        assert_eq!(
            draft("1", "  ", "1", "1").validate(),
            Err(ValidationError::Missing("Name"))
        );
        assert_eq!(
            draft("1", "Pen", "1", "").validate(),
            Err(ValidationError::Missing("Quantity"))
        );
    }

    #[test]
    fn numeric_fields_reject_text_and_negatives() {
        assert!(matches!(
            draft("1.5", "Pen", "1", "1").validate(),
            Err(ValidationError::NotAnInteger { field: "ID", .. })
        ));
        assert!(matches!(
            draft("1", "Pen", "ten", "1").validate(),
            Err(ValidationError::NotANumber { field: "Price", .. })
        ));
        assert!(matches!(
            draft("1", "Pen", "NaN", "1").validate(),
            Err(ValidationError::NotANumber { field: "Price", .. })
        ));
        assert_eq!(
            draft("1", "Pen", "-1", "1").validate(),
            Err(ValidationError::Negative("Price"))
        );
        assert_eq!(
            draft("1", "Pen", "1", "-4").validate(),
            Err(ValidationError::Negative("Quantity"))
        );
        assert!(matches!(
            draft("1", "Pen", "1", "2.5").validate(),
            Err(ValidationError::NotAnInteger { field: "Quantity", .. })
        ));
    }

    #[test]
    fn editing_round_trips_through_the_form() {
        let product = Product::new(ProductId(4), "Pixel", "AI camera", 999.99, 20);
        let draft = ProductDraft::from_product(&product);
        assert_eq!(draft.price, "999.99");
        assert_eq!(draft.validate().expect("valid"), product);
    }
}
