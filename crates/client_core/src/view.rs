//! Filtered and sorted projection of the product store.

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use shared::domain::Product;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Id,
    Name,
    Description,
    Price,
    Quantity,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Id,
        SortField::Name,
        SortField::Description,
        SortField::Price,
        SortField::Quantity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Description => "description",
            Self::Price => "price",
            Self::Quantity => "quantity",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Name => "Name",
            Self::Description => "Description",
            Self::Price => "Price",
            Self::Quantity => "Quantity",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Price => a.price.total_cmp(&b.price),
            Self::Quantity => a.quantity.cmp(&b.quantity),
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::Description => a
                .description
                .to_lowercase()
                .cmp(&b.description.to_lowercase()),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown sort field '{0}' (expected id, name, description, price or quantity)")]
pub struct ParseSortFieldError(String);

impl FromStr for SortField {
    type Err = ParseSortFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseSortFieldError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

/// UI-session scoped parameters of the projection. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewParams {
    pub query: String,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl ViewParams {
    pub fn new(
        query: impl Into<String>,
        sort_field: SortField,
        sort_direction: SortDirection,
    ) -> Self {
        Self {
            query: query.into(),
            sort_field,
            sort_direction,
        }
    }

    /// Column-header click: same column flips direction, a new column starts ascending.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Asc;
        }
    }
}

pub fn matches_query(product: &Product, normalized_query: &str) -> bool {
    normalized_query.is_empty()
        || product.id.to_string() == normalized_query
        || product.name.to_lowercase().contains(normalized_query)
        || product.description.to_lowercase().contains(normalized_query)
}

/// Computes the rows to display. Pure: the input slice is never reordered.
///
/// Ties keep their input order, and `Desc` is the exact mirror of `Asc`
/// (ties included), so the two directions can never disagree.
pub fn project(products: &[Product], params: &ViewParams) -> Vec<Product> {
    let query = params.query.trim().to_lowercase();

    let mut rows: Vec<(usize, &Product)> = products
        .iter()
        .enumerate()
        .filter(|(_, product)| matches_query(product, &query))
        .collect();

    let field = params.sort_field;
    rows.sort_unstable_by(|(ia, a), (ib, b)| field.compare(a, b).then(ia.cmp(ib)));

    if params.sort_direction == SortDirection::Desc {
        rows.reverse();
    }

    rows.into_iter().map(|(_, product)| product.clone()).collect()
}

#[cfg(test)]
mod tests {
    use shared::domain::ProductId;

    use super::*;

    fn product(id: i64, name: &str, description: &str, price: f64, quantity: u32) -> Product {
        Product::new(ProductId(id), name, description, price, quantity)
    }

    fn ids(rows: &[Product]) -> Vec<i64> {
        rows.iter().map(|p| p.id.0).collect()
    }

    fn catalogue() -> Vec<Product> {
        vec![
            product(3, "Stapler", "Heavy duty", 10.0, 4),
            product(1, "Pen", "Blue ink", 10.0, 5),
            product(12, "pencil", "HB graphite", 5.0, 20),
            product(2, "Notebook", "Ruled, pen friendly", 9.0, 4),
            product(21, "Eraser", "", 0.5, 40),
        ]
    }

    #[test]
    fn pen_query_sorted_by_price_puts_pencil_first() {
        let store = vec![
            product(1, "Pen", "", 10.0, 5),
            product(2, "Pencil", "", 5.0, 20),
        ];
        let params = ViewParams::new("pen", SortField::Price, SortDirection::Asc);
        assert_eq!(ids(&project(&store, &params)), vec![2, 1]);
    }

    #[test]
    fn filter_matches_exact_id_or_name_or_description() {
        let store = catalogue();
        let included = |q: &str| {
            let params = ViewParams::new(q, SortField::Id, SortDirection::Asc);
            ids(&project(&store, &params))
        };

        assert_eq!(included(""), vec![1, 2, 3, 12, 21]);
        assert_eq!(included("   "), vec![1, 2, 3, 12, 21]);
        // "1" is an exact id match only; "12" and "21" merely contain it.
        assert_eq!(included("1"), vec![1]);
        assert_eq!(included("PEN"), vec![1, 2, 12]);
        assert_eq!(included("graphite"), vec![12]);
        assert_eq!(included(" heavy "), vec![3]);
        assert_eq!(included("nothing"), Vec::<i64>::new());
    }

    #[test]
    fn inclusion_agrees_with_predicate_for_every_product() {
        let store = catalogue();
        for query in ["", "1", "pen", "INK", "ru", "x", "21"] {
            let params = ViewParams::new(query, SortField::Name, SortDirection::Desc);
            let rows = project(&store, &params);
            for p in &store {
                let expected = query.is_empty()
                    || p.id.to_string() == query.to_lowercase()
                    || p.name.to_lowercase().contains(&query.to_lowercase())
                    || p.description.to_lowercase().contains(&query.to_lowercase());
                assert_eq!(rows.contains(p), expected, "query={query} id={}", p.id);
            }
        }
    }

    #[test]
    fn numeric_fields_sort_numerically() {
        let store = vec![
            product(10, "a", "", 10.0, 100),
            product(9, "b", "", 9.0, 9),
            product(100, "c", "", 100.0, 10),
        ];
        let by = |field| ids(&project(&store, &ViewParams::new("", field, SortDirection::Asc)));
        assert_eq!(by(SortField::Id), vec![9, 10, 100]);
        assert_eq!(by(SortField::Price), vec![9, 10, 100]);
        assert_eq!(by(SortField::Quantity), vec![9, 100, 10]);
    }

    #[test]
    fn text_fields_sort_case_insensitively() {
        let store = catalogue();
        let params = ViewParams::new("", SortField::Name, SortDirection::Asc);
        assert_eq!(ids(&project(&store, &params)), vec![21, 2, 1, 12, 3]);
    }

    #[test]
    fn ties_keep_input_order_and_desc_mirrors_asc() {
        let store = catalogue();
        for field in SortField::ALL {
            let asc = project(&store, &ViewParams::new("", field, SortDirection::Asc));
            let mut desc = project(&store, &ViewParams::new("", field, SortDirection::Desc));
            desc.reverse();
            assert_eq!(ids(&asc), ids(&desc), "field={field}");
        }

        // Stapler and Pen share a price; Stapler comes first in the input.
        let asc = project(&store, &ViewParams::new("", SortField::Price, SortDirection::Asc));
        assert_eq!(ids(&asc), vec![21, 12, 2, 3, 1]);
        let desc = project(&store, &ViewParams::new("", SortField::Price, SortDirection::Desc));
        assert_eq!(ids(&desc), vec![1, 3, 2, 12, 21]);
    }

    #[test]
    fn projection_is_idempotent_and_leaves_input_untouched() {
        let store = catalogue();
        let before = store.clone();
        let params = ViewParams::new("e", SortField::Quantity, SortDirection::Desc);

        let first = project(&store, &params);
        let second = project(&store, &params);

        assert_eq!(first, second);
        assert_eq!(store, before);
    }

    #[test]
    fn header_click_toggles_or_resets_direction() {
        let mut params = ViewParams::default();
        params.toggle_sort(SortField::Id);
        assert_eq!(params.sort_direction, SortDirection::Desc);
        params.toggle_sort(SortField::Price);
        assert_eq!(
            (params.sort_field, params.sort_direction),
            (SortField::Price, SortDirection::Asc)
        );
    }

    #[test]
    fn parses_sort_field_names() {
        assert_eq!("Quantity".parse::<SortField>().expect("parse"), SortField::Quantity);
        assert!("weight".parse::<SortField>().is_err());
    }
}
