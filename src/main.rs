use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{error, info};

use price_finder::capture;
use price_finder::inventory::InventoryRow;
use price_finder::{PriceFinder, SearchResult, load_app_config};

#[derive(Debug, Parser)]
#[command(name = "price-finder")]
#[command(about = "Look up retailer prices for a product number or barcode")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search every retailer for one product number
    Lookup {
        product_number: String,
        /// Known brand; "Other" means unknown
        #[arg(long)]
        brand: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read scanned codes from stdin, one per line, and build an inventory
    Scan {
        /// Print the inventory as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_app_config()?;
    let finder = PriceFinder::from_config(&config)?;

    match cli.command {
        Commands::Lookup {
            product_number,
            brand,
            json,
        } => {
            let brand = brand.filter(|b| b != price_finder::inventory::OTHER_BRAND);
            let result = finder.lookup(&product_number, brand.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
        }
        Commands::Scan { json } => {
            let (tx, rx) = mpsc::channel(16);
            let reader = tokio::spawn(async move {
                capture::forward_lines(BufReader::new(tokio::io::stdin()), tx).await
            });

            let mut store = finder.new_store();
            let added = finder.process_captures(rx, &mut store).await;

            match reader.await? {
                Ok(scanned) => info!("Scanned {} codes, added {}", scanned, added),
                Err(e) => error!("Error reading scanned codes: {}", e),
            }

            if json {
                println!("{}", serde_json::to_string_pretty(store.rows())?);
            } else {
                store.rows().iter().for_each(print_row);
            }
        }
    }

    Ok(())
}

fn print_result(result: &SearchResult) {
    let id = result
        .identifier
        .as_ref()
        .map_or_else(String::new, ToString::to_string);
    println!("Product:  {id}");
    println!("Name:     {}", result.product_name.as_deref().unwrap_or("-"));
    println!("Brand:    {}", result.brand.as_deref().unwrap_or("-"));
    println!("Model:    {}", result.model_number.as_deref().unwrap_or("-"));
    println!("Category: {}", result.category.as_deref().unwrap_or("-"));

    println!();
    for (retailer, info) in &result.retailers {
        if info.url.is_empty() {
            println!("{retailer:<10} not found");
        } else {
            println!(
                "{retailer:<10} {:<12} {:<8} {}",
                info.raw_price,
                info.in_stock.as_label(),
                info.url
            );
        }
    }

    if !result.specifications.is_empty() {
        println!();
        for (key, value) in &result.specifications {
            println!("{key}: {value}");
        }
    }

    if let Some(warning) = &result.error {
        println!();
        println!("Some searches failed: {warning}");
    }
}

fn print_row(row: &InventoryRow) {
    let line = row
        .record()
        .into_iter()
        .map(|(header, value)| format!("{header}={value}"))
        .collect::<Vec<_>>()
        .join(" | ");
    println!("{line}");
}
