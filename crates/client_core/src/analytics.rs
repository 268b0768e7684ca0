use shared::domain::Product;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub title: &'static str,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn max_value(&self) -> f64 {
        self.points
            .iter()
            .map(|point| point.value)
            .fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InventorySummary {
    pub total_products: usize,
    pub total_units: u64,
    pub stock_value: f64,
}

pub fn summarize(products: &[Product]) -> InventorySummary {
    InventorySummary {
        total_products: products.len(),
        total_units: products.iter().map(|p| u64::from(p.quantity)).sum(),
        stock_value: products.iter().map(Product::stock_value).sum(),
    }
}

pub fn price_distribution(products: &[Product]) -> ChartSeries {
    series("Price Distribution", products, |p| p.price)
}

pub fn quantity_distribution(products: &[Product]) -> ChartSeries {
    series("Quantity Distribution", products, |p| f64::from(p.quantity))
}

fn series(title: &'static str, products: &[Product], value: impl Fn(&Product) -> f64) -> ChartSeries {
    ChartSeries {
        title,
        points: products
            .iter()
            .map(|p| ChartPoint {
                label: p.name.clone(),
                value: value(p),
            })
            .collect(),
    }
}

/// Horizontal text bars for terminals; `width` is the length of the longest bar.
pub fn render_text_bars(series: &ChartSeries, width: usize) -> String {
    let max = series.max_value();
    let label_width = series
        .points
        .iter()
        .map(|point| point.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!("{}\n", series.title);
    for point in &series.points {
        let len = if max > 0.0 {
            ((point.value / max) * width as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{:<label_width$} | {} {}\n",
            point.label,
            "#".repeat(len),
            point.value
        ));
    }
    out
}
