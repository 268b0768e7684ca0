use std::{fs, io, path::Path};

use shared::domain::Product;
use thiserror::Error;

pub const CSV_HEADER: &str = "ID,Name,Description,Price,Quantity";
pub const DEFAULT_EXPORT_FILE_NAME: &str = "products.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No products to export")]
    Empty,
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Renders products in the given order as CSV.
///
/// Fields are joined verbatim: a comma or quote inside a name or description
/// is not escaped and will shift columns for that row.
pub fn render_csv(products: &[Product]) -> String {
    let mut out = String::from(CSV_HEADER);
    for p in products {
        out.push('\n');
        out.push_str(&format!(
            "{},{},{},{},{}",
            p.id, p.name, p.description, p.price, p.quantity
        ));
    }
    out
}

pub fn write_csv(path: &Path, products: &[Product]) -> Result<(), ExportError> {
    if products.is_empty() {
        return Err(ExportError::Empty);
    }
    fs::write(path, render_csv(products)).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use shared::domain::ProductId;

    use super::*;

    #[test]
    fn renders_header_and_rows_without_trailing_newline() {
        let products = vec![
            Product::new(ProductId(2), "Pencil", "HB", 5.0, 20),
            Product::new(ProductId(1), "iPhone", "256GB", 1299.99, 25),
        ];
        assert_eq!(
            render_csv(&products),
            "ID,Name,Description,Price,Quantity\n2,Pencil,HB,5,20\n1,iPhone,256GB,1299.99,25"
        );
    }

    #[test]
    fn embedded_commas_are_not_quoted() {
        let products = vec![Product::new(ProductId(3), "Galaxy", "AMOLED, 512GB", 10.5, 1)];
        assert_eq!(
            render_csv(&products).lines().nth(1),
            Some("3,Galaxy,AMOLED, 512GB,10.5,1")
        );
    }

    #[test]
    fn empty_store_is_refused() {
        let path = env::temp_dir().join("tracify_never_written.csv");
        assert!(matches!(write_csv(&path, &[]), Err(ExportError::Empty)));
        assert_eq!(render_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn writes_file_to_disk() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("tracify_export_test_{suffix}.csv"));
        let products = vec![Product::new(ProductId(1), "Pen", "", 1.0, 2)];

        write_csv(&path, &products).expect("write");
        let written = fs::read_to_string(&path).expect("read back");
        assert_eq!(written, "ID,Name,Description,Price,Quantity\n1,Pen,,1,2");

        fs::remove_file(path).expect("cleanup");
    }
}
