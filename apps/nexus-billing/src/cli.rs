//! # Command-Line Interface
//!
//! `clap` definitions for the `nexus` binary.
//!
//! ```text
//! nexus products [--search S] [--category C] [--brand B] [--status S] [--featured]
//!                [--min-price N] [--max-price N] [--sort name|price-low|…] [--page N] [--limit N]
//! nexus categories | nexus brands
//! nexus cart show | add <id> | set <id> <qty> | remove <id> | clear | refresh
//! nexus bill customer --name N --phone P [--email E] [--address A]
//! nexus bill rates [--tax PCT] [--discount PCT]
//! nexus bill notes <text>
//! nexus bill save | generate | pay
//! nexus bills list | show <id> | edit <id> | delete <id> | pdf <id> [--out FILE] | print <id>
//! nexus admin product|category|brand create --file F | update <id> --file F | delete <id>
//! nexus config show | init [--force]
//! nexus notices
//! nexus reset
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use nexus_core::catalog::{parse_status_filter, PriceRange};
use nexus_core::error::ValidationResult;
use nexus_core::{Customer, Money, Percent, ProductQuery, ProductSort};

#[derive(Debug, Parser)]
#[command(name = "nexus", version, about = "AutoNexus billing client")]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "NEXUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse the product catalog
    Products(ProductArgs),

    /// List product categories
    Categories,

    /// List product brands
    Brands,

    /// Change the items on the current bill
    #[command(subcommand)]
    Cart(CartCommand),

    /// Customer, rates, notes and saving of the current bill
    #[command(subcommand)]
    Bill(BillCommand),

    /// Stored bills
    #[command(subcommand)]
    Bills(BillsCommand),

    /// Catalog maintenance (administrators only)
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Show or create the config file
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Show the current notices
    Notices,

    /// Discard the saved session
    Reset,
}

#[derive(Debug, Args)]
pub struct ProductArgs {
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub brand: Option<String>,

    /// In Stock, Limited Stock, Out of Stock, Pre-Order or Discontinued
    #[arg(long)]
    pub status: Option<String>,

    /// Only featured products
    #[arg(long)]
    pub featured: bool,

    #[arg(long)]
    pub min_price: Option<Money>,

    #[arg(long)]
    pub max_price: Option<Money>,

    #[arg(long, default_value = "name")]
    pub sort: ProductSort,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = nexus_core::catalog::DEFAULT_PAGE_SIZE)]
    pub limit: u32,
}

impl ProductArgs {
    /// Builds the catalog query. Missing price bounds take the default range.
    pub fn to_query(&self) -> ValidationResult<ProductQuery> {
        let status = match &self.status {
            Some(status) => parse_status_filter(status)?,
            None => None,
        };

        let price_range = if self.min_price.is_some() || self.max_price.is_some() {
            let default = PriceRange::default();
            Some(PriceRange::new(
                self.min_price.unwrap_or(default.min),
                self.max_price.unwrap_or(default.max),
            )?)
        } else {
            None
        };

        let query = ProductQuery {
            category: self.category.clone(),
            brand: self.brand.clone(),
            status,
            featured_only: self.featured,
            price_range,
            sort: self.sort,
            page: self.page,
            limit: self.limit,
            ..ProductQuery::default()
        };
        let query = match &self.search {
            Some(search) => query.with_search(search)?,
            None => query,
        };
        query.validate()?;
        Ok(query)
    }
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Show the current bill
    Show,

    /// Add one unit of a product
    Add { product_id: String },

    /// Set a line's quantity (0 removes it)
    Set {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove a line
    Remove { product_id: String },

    /// Start a new bill
    Clear,

    /// Re-check stock for every line
    Refresh,
}

#[derive(Debug, Subcommand)]
pub enum BillCommand {
    /// Set the customer
    Customer(CustomerArgs),

    /// Set the tax rate and/or discount, in percent
    Rates {
        #[arg(long)]
        tax: Option<Percent>,
        #[arg(long)]
        discount: Option<Percent>,
    },

    /// Set the bill notes
    Notes { text: String },

    /// Save as Draft
    Save,

    /// Save as Pending
    Generate,

    /// Save as Paid
    Pay,
}

#[derive(Debug, Args)]
pub struct CustomerArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long, default_value = "")]
    pub email: String,

    #[arg(long, default_value = "")]
    pub address: String,
}

impl From<CustomerArgs> for Customer {
    fn from(args: CustomerArgs) -> Self {
        Customer {
            name: args.name,
            phone: args.phone,
            email: args.email,
            address: args.address,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum BillsCommand {
    /// Latest bills
    List,

    /// One bill
    Show { id: String },

    /// Load a bill into the current bill for editing
    Edit { id: String },

    /// Delete a bill
    Delete { id: String },

    /// Render a bill to PDF
    Pdf {
        id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print a plain-text receipt
    Print { id: String },
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    #[command(subcommand)]
    Product(EntityCommand),

    #[command(subcommand)]
    Category(EntityCommand),

    #[command(subcommand)]
    Brand(EntityCommand),
}

/// Create/update read the entity from a JSON file.
#[derive(Debug, Subcommand)]
pub enum EntityCommand {
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    Update {
        id: String,
        #[arg(long)]
        file: PathBuf,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
