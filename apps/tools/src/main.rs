use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, HttpInventoryBackend, InventoryBackend};
use shared::domain::{Product, ProductId};

#[derive(Parser, Debug)]
struct Cli {
    /// Backend base URL; overrides tracify.toml and the environment.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the sample phone catalogue on an empty backend.
    Seed {
        /// Also seed a non-empty backend, skipping ids that already exist.
        #[arg(long)]
        force: bool,
    },
}

fn sample_catalogue() -> Vec<Product> {
    vec![
        Product::new(
            ProductId(1),
            "Apple iPhone 15 Pro Max",
            "6.7-inch OLED display, A17 Pro chip, 256GB storage, triple-camera system",
            1299.99,
            25,
        ),
        Product::new(
            ProductId(2),
            "Samsung Galaxy S24 Ultra",
            "6.8-inch AMOLED 120Hz display, Snapdragon 8 Gen 3, 12GB RAM, 512GB storage",
            1199.99,
            30,
        ),
        Product::new(
            ProductId(3),
            "Google Pixel 8 Pro",
            "6.7-inch LTPO OLED display, Google Tensor G3, 128GB storage, AI camera",
            999.99,
            20,
        ),
        Product::new(
            ProductId(4),
            "OnePlus 12",
            "6.82-inch 120Hz AMOLED, Snapdragon 8 Gen 3, 16GB RAM, 512GB storage",
            899.99,
            35,
        ),
        Product::new(
            ProductId(5),
            "Xiaomi 14 Pro",
            "6.73-inch QHD+ AMOLED, Snapdragon 8 Gen 3, Leica cameras",
            799.99,
            40,
        ),
    ]
}

/// Samples to create given what the backend already lists.
fn plan_seed(existing: &[Product], force: bool) -> Vec<Product> {
    if !existing.is_empty() && !force {
        return Vec::new();
    }
    sample_catalogue()
        .into_iter()
        .filter(|sample| existing.iter().all(|p| p.id != sample.id))
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(api_url) = &cli.api_url {
        settings = settings.with_api_base_url(api_url);
    }
    let backend = HttpInventoryBackend::from_settings(&settings)
        .with_context(|| format!("invalid backend url {}", settings.api_base_url))?;

    match cli.command {
        Command::Seed { force } => {
            let existing = backend.list_products().await?;
            let plan = plan_seed(&existing, force);
            if plan.is_empty() {
                println!(
                    "backend already lists {} products; nothing seeded (use --force to fill gaps)",
                    existing.len()
                );
                return Ok(());
            }
            for product in &plan {
                let created = backend
                    .create_product(product)
                    .await
                    .with_context(|| format!("failed to create product {}", product.id))?;
                println!("created product_id={} name={}", created.id, created.name);
            }
        }
    }

    Ok(())
}
