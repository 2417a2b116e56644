use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shopkeep_catalog::{Inventory, Product};
use shopkeep_store::{Config, FileRepository};

/// Shopkeep - typed inventory tracker with flat-file persistence
#[derive(Parser, Debug)]
#[command(name = "shopkeep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Inventory data file (overrides the configured path)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a product to the inventory
    #[command(subcommand)]
    Add(AddCommand),

    /// Remove a product by id
    Remove { product_id: String },

    /// List every product
    List,

    /// Search products by name substring or by type
    Search {
        /// Case-insensitive substring of the product name
        #[arg(long)]
        name: Option<String>,

        /// Product type: Electronics, Grocery or Clothing (any casing)
        #[arg(long = "type")]
        product_type: Option<String>,
    },

    /// Sell stock of a product
    Sell { product_id: String, quantity: u32 },

    /// Restock a product
    Restock { product_id: String, quantity: u32 },

    /// Report the total value of all stock on hand
    Total,

    /// Remove expired groceries
    RemoveExpired,
}

#[derive(Subcommand, Debug)]
enum AddCommand {
    /// Add an electronics product
    Electronics {
        product_id: String,
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        quantity: u32,
        #[arg(long)]
        brand: String,
        #[arg(long)]
        warranty_years: u32,
    },

    /// Add a grocery product
    Grocery {
        product_id: String,
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        quantity: u32,
        /// Expiry date, YYYY-MM-DD
        #[arg(long)]
        expiry_date: NaiveDate,
    },

    /// Add a clothing product
    Clothing {
        product_id: String,
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        quantity: u32,
        #[arg(long)]
        size: String,
        #[arg(long)]
        material: String,
    },
}

impl AddCommand {
    fn into_product(self) -> Product {
        match self {
            AddCommand::Electronics {
                product_id,
                name,
                price,
                quantity,
                brand,
                warranty_years,
            } => Product::electronics(product_id, name, price, quantity, brand, warranty_years),
            AddCommand::Grocery {
                product_id,
                name,
                price,
                quantity,
                expiry_date,
            } => Product::grocery(product_id, name, price, quantity, expiry_date),
            AddCommand::Clothing {
                product_id,
                name,
                price,
                quantity,
                size,
                material,
            } => Product::clothing(product_id, name, price, quantity, size, material),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_file = match cli.data_file {
        Some(path) => path,
        None => {
            let config = Config::load().context("failed to load configuration")?;
            PathBuf::from(config.store.data_file)
        }
    };
    let repo = FileRepository::new(data_file);

    // A missing or unreadable file at startup just means an empty session
    let mut inventory = Inventory::new();
    if let Err(err) = repo.load_into(&mut inventory) {
        tracing::warn!("Starting with an empty inventory: {}", err);
    }

    match cli.command {
        Commands::Add(add) => {
            let product = add.into_product();
            let line = product.to_string();
            inventory.add(product)?;
            repo.save(&inventory)?;
            println!("Added {line}");
        }
        Commands::Remove { product_id } => match inventory.remove(&product_id) {
            Some(product) => {
                repo.save(&inventory)?;
                println!("Removed {}", product.product_id);
            }
            None => println!("No product with id {product_id}"),
        },
        Commands::List => {
            if inventory.is_empty() {
                println!("Inventory is empty");
            }
            for line in inventory.list_all() {
                println!("{line}");
            }
        }
        Commands::Search { name, product_type } => {
            let matches = match (&name, &product_type) {
                (Some(query), None) => inventory.search_by_name(query),
                (None, Some(type_name)) => inventory.search_by_type(type_name),
                _ => anyhow::bail!("provide exactly one of --name or --type"),
            };

            if matches.is_empty() {
                println!("No matching products");
            }
            for product in matches {
                println!("{product}");
            }
        }
        Commands::Sell {
            product_id,
            quantity,
        } => {
            inventory.sell(&product_id, quantity)?;
            repo.save(&inventory)?;
            let remaining = inventory.get(&product_id).map(|p| p.quantity_in_stock);
            println!(
                "Sold {} of {}, {} left in stock",
                quantity,
                product_id,
                remaining.unwrap_or(0)
            );
        }
        Commands::Restock {
            product_id,
            quantity,
        } => {
            inventory.restock(&product_id, quantity)?;
            repo.save(&inventory)?;
            let stocked = inventory.get(&product_id).map(|p| p.quantity_in_stock);
            println!(
                "Restocked {} by {}, now {} in stock",
                product_id,
                quantity,
                stocked.unwrap_or(0)
            );
        }
        Commands::Total => {
            println!("Total inventory value: {:.2}", inventory.total_value());
        }
        Commands::RemoveExpired => {
            let removed = inventory.remove_expired();
            repo.save(&inventory)?;
            println!("Removed {removed} expired product(s)");
        }
    }

    Ok(())
}
