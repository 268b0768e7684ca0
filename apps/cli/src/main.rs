use std::{
    io::{self, BufRead, BufReader},
    path::PathBuf,
    sync::Arc,
    thread,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    analytics::{price_distribution, quantity_distribution, render_text_bars, summarize},
    display::format_inr,
    export::DEFAULT_EXPORT_FILE_NAME,
    load_settings, HttpInventoryBackend, InventoryController, InventoryEvent, ProductDraft,
    SortDirection, SortField, ViewParams,
};
use shared::domain::{Product, ProductId};
use tokio::sync::{broadcast::error::RecvError, oneshot};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tracify", about = "Manage the product inventory from the terminal")]
struct Cli {
    /// Backend base URL; overrides tracify.toml and the environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List products, optionally filtered and sorted.
    List {
        #[arg(long, short, default_value = "")]
        query: String,
        #[arg(long, default_value = "id")]
        sort: SortField,
        #[arg(long)]
        desc: bool,
    },
    Create {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        quantity: String,
    },
    /// Update a product; fields that are not given keep their current value.
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        quantity: Option<String>,
    },
    /// Delete a product after the undo window; press Enter to undo.
    Delete { id: i64 },
    Export {
        #[arg(long, short, default_value = DEFAULT_EXPORT_FILE_NAME)]
        output: PathBuf,
    },
    /// Totals and price/quantity bar charts.
    Stats {
        #[arg(long, default_value_t = 40)]
        width: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(api_url) = &cli.api_url {
        settings = settings.with_api_base_url(api_url);
    }
    let backend = HttpInventoryBackend::from_settings(&settings)
        .with_context(|| format!("invalid backend url {}", settings.api_base_url))?;
    let controller = InventoryController::new(Arc::new(backend), settings.controller_options());

    match cli.command {
        Command::List { query, sort, desc } => {
            controller.load().await?;
            let direction = if desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            let rows = controller
                .projection(&ViewParams::new(query, sort, direction))
                .await;
            print_table(&rows);
            println!("Total: {}", controller.snapshot().await.total());
        }
        Command::Create {
            id,
            name,
            description,
            price,
            quantity,
        } => {
            let draft = ProductDraft {
                id,
                name,
                description,
                price,
                quantity,
            };
            let saved = controller.submit(&draft, None).await?;
            println!("Product created successfully: {} ({})", saved.name, saved.id);
        }
        Command::Update {
            id,
            name,
            description,
            price,
            quantity,
        } => {
            controller.load().await?;
            let id = ProductId(id);
            let current = controller
                .product(id)
                .await
                .with_context(|| format!("product {id} not found"))?;
            let mut draft = ProductDraft::from_product(&current);
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            if let Some(price) = price {
                draft.price = price;
            }
            if let Some(quantity) = quantity {
                draft.quantity = quantity;
            }
            let saved = controller.submit(&draft, Some(id)).await?;
            println!("Product updated successfully: {} ({})", saved.name, saved.id);
        }
        Command::Delete { id } => {
            controller.load().await?;
            let enter = listen_for_enter(BufReader::new(io::stdin()));
            delete_with_undo(&controller, ProductId(id), enter).await?;
        }
        Command::Export { output } => {
            controller.load().await?;
            let rows = controller.export_csv_to(&output).await?;
            println!("Exported {rows} products to {}", output.display());
        }
        Command::Stats { width } => {
            controller.load().await?;
            let products = controller.snapshot().await.products;
            if products.is_empty() {
                println!("No data yet");
                return Ok(());
            }
            let summary = summarize(&products);
            println!("Total: {}", summary.total_products);
            println!("Units in stock: {}", summary.total_units);
            println!("Stock value: {}", format_inr(summary.stock_value));
            println!();
            print!("{}", render_text_bars(&price_distribution(&products), width));
            println!();
            print!("{}", render_text_bars(&quantity_distribution(&products), width));
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeleteOutcome {
    Undone,
    Deleted,
}

/// True only for a line actually entered; end of input does not count.
fn enter_pressed(input: &mut impl BufRead) -> bool {
    let mut line = String::new();
    matches!(input.read_line(&mut line), Ok(read) if read > 0)
}

/// Resolves once a line is read from `input`; dropped without a value at end of input.
fn listen_for_enter<R>(mut input: R) -> oneshot::Receiver<()>
where
    R: BufRead + Send + 'static,
{
    let (enter_tx, enter_rx) = oneshot::channel();
    // A plain thread so a pending stdin read does not hold the runtime open on exit.
    thread::spawn(move || {
        if enter_pressed(&mut input) {
            let _ = enter_tx.send(());
        }
    });
    enter_rx
}

async fn delete_with_undo(
    controller: &Arc<InventoryController>,
    id: ProductId,
    mut enter_rx: oneshot::Receiver<()>,
) -> Result<DeleteOutcome> {
    let mut events = controller.subscribe();
    if !controller.delete(id).await {
        bail!("product {id} not found");
    }

    if let Some(message) = controller.snapshot().await.message {
        println!("{message}");
    }
    println!(
        "Press Enter within {}s to undo.",
        controller.options().undo_window.as_secs_f32()
    );

    let mut enter_seen = false;
    loop {
        tokio::select! {
            pressed = &mut enter_rx, if !enter_seen => {
                enter_seen = true;
                if pressed.is_ok() {
                    if controller.undo_delete(id).await {
                        println!("Delete undone");
                        return Ok(DeleteOutcome::Undone);
                    }
                    println!("Too late to undo; waiting for the backend...");
                }
            }
            event = events.recv() => match event {
                Ok(InventoryEvent::DeletionConfirmed { id: confirmed }) if confirmed == id => {
                    println!("Deleted product {id}");
                    return Ok(DeleteOutcome::Deleted);
                }
                Ok(InventoryEvent::DeletionFailed { id: failed, message }) if failed == id => {
                    bail!("{message}");
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => bail!("controller shut down before product {id} was deleted"),
            },
        }
    }
}

fn print_table(rows: &[Product]) {
    if rows.is_empty() {
        println!("No products found.");
        return;
    }

    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|p| {
            [
                p.id.to_string(),
                p.name.clone(),
                p.description.clone(),
                format_inr(p.price),
                p.quantity.to_string(),
            ]
        })
        .collect();
    let header = ["ID", "Name", "Description", "Price", "Quantity"];

    let mut widths = header.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |row: [&str; 5]| {
        row.iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };
    println!("{}", line(header));
    for row in &cells {
        println!("{}", line(row.each_ref().map(String::as_str)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io::Cursor, time::Duration};

    use async_trait::async_trait;
    use client_core::{BackendError, ControllerOptions, InventoryBackend};
    use tokio::sync::Mutex;

    struct RecordingBackend {
        products: Mutex<Vec<Product>>,
        deleted: Mutex<Vec<ProductId>>,
    }

    #[async_trait]
    impl InventoryBackend for RecordingBackend {
        async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
            Ok(self.products.lock().await.clone())
        }

        async fn create_product(&self, product: &Product) -> Result<Product, BackendError> {
            Ok(product.clone())
        }

        async fn update_product(
            &self,
            _id: ProductId,
            product: &Product,
        ) -> Result<Product, BackendError> {
            Ok(product.clone())
        }

        async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
            self.deleted.lock().await.push(id);
            self.products.lock().await.retain(|p| p.id != id);
            Ok(())
        }
    }

    async fn loaded() -> (Arc<InventoryController>, Arc<RecordingBackend>) {
        let backend = Arc::new(RecordingBackend {
            products: Mutex::new(vec![
                Product::new(ProductId(1), "Pixel 8", "", 699.0, 3),
                Product::new(ProductId(2), "OnePlus 12", "", 899.99, 35),
            ]),
            deleted: Mutex::new(Vec::new()),
        });
        let options = ControllerOptions {
            undo_window: Duration::from_millis(300),
            ..ControllerOptions::default()
        };
        let controller = InventoryController::new(backend.clone(), options);
        controller.load().await.expect("load");
        (controller, backend)
    }

    #[test]
    fn only_an_entered_line_counts_as_enter() {
        assert!(enter_pressed(&mut Cursor::new("\n")));
        assert!(enter_pressed(&mut Cursor::new("yes\n")));
        assert!(!enter_pressed(&mut Cursor::new("")));
        assert!(!enter_pressed(&mut io::empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn closed_stdin_lets_the_delete_go_through() {
        let (controller, backend) = loaded().await;

        let outcome = delete_with_undo(&controller, ProductId(2), listen_for_enter(io::empty()))
            .await
            .expect("delete");

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(*backend.deleted.lock().await, vec![ProductId(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn enter_inside_the_window_undoes_without_a_backend_call() {
        let (controller, backend) = loaded().await;
        let (enter_tx, enter_rx) = oneshot::channel();
        enter_tx.send(()).expect("send");

        let outcome = delete_with_undo(&controller, ProductId(2), enter_rx)
            .await
            .expect("undo");

        assert_eq!(outcome, DeleteOutcome::Undone);
        assert!(backend.deleted.lock().await.is_empty());
        assert!(controller.product(ProductId(2)).await.is_some());
    }
}
