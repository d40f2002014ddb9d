//! # AutoNexus Billing Library
//!
//! Core library for the `nexus` billing client.
//! This is the entry point that loads configuration and runs one command.
//!
//! ## Module Organization
//! ```text
//! nexus_billing/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── cli.rs          ◄─── clap definitions
//! ├── output.rs       ◄─── Plain-text tables
//! ├── state/
//! │   ├── config.rs   ◄─── AppConfig (toml + NEXUS_* env)
//! │   ├── notice.rs   ◄─── Auto-dismissing notices
//! │   ├── session.rs  ◄─── BillingSession (draft, editing, last bill)
//! │   └── store.rs    ◄─── session.json persistence
//! ├── commands/
//! │   ├── catalog.rs  ◄─── Product/category/brand listings
//! │   ├── cart.rs     ◄─── Line items
//! │   ├── bill.rs     ◄─── Customer, rates, save, bills, PDF
//! │   └── admin.rs    ◄─── Catalog maintenance
//! └── error.rs        ◄─── CommandError for commands
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod state;

#[cfg(test)]
mod fixtures;

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nexus_api::ApiClient;
use nexus_core::{BillStatus, BrandForm, CategoryForm, ProductForm};

use cli::{
    AdminCommand, BillCommand, BillsCommand, CartCommand, Cli, Command, ConfigCommand,
    EntityCommand,
};
use commands::admin::{self, AdminContext};
use commands::{bill, cart, catalog};
use error::{CommandError, CommandResult, ErrorCode};
use state::{AppConfig, BillingSession, NoticeKind, SessionStore};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=nexus_api=trace` - Trace the REST client only
/// - Default: INFO, with debug for the nexus crates
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nexus=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one CLI command.
///
/// ## Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Load AppConfig ─── defaults → config.toml → NEXUS_* → validate      │
/// │  2. Build ApiClient ── base URL + timeout                               │
/// │  3. Restore session ── session.json (fresh if missing)                  │
/// │  4. Dispatch ───────── commands::* against the REST repositories        │
/// │  5. Save session ───── notices included, so `nexus notices` sees them   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> CommandResult<()> {
    if let Command::Config(cmd) = &cli.command {
        return run_config(cmd, cli.config.clone(), cli.json);
    }

    let config = AppConfig::load(cli.config.clone())?;
    if let Command::Reset = cli.command {
        // Before the restore, so an unreadable session file can be cleared
        return run_reset(&config, cli.json);
    }
    info!(api = %config.api.base_url, "Starting AutoNexus billing");

    let api = ApiClient::new(&config.api_config())?;
    let store = SessionStore::new(config.session_path()?);
    let mut session = store.load(&config)?;

    let started = Utc::now();
    let result = dispatch(&cli, &config, &api, &mut session).await;
    store.save(&session)?;

    if !cli.json {
        for notice in session.notices().active(Utc::now()) {
            if notice.kind == NoticeKind::Success && notice.posted_at >= started {
                eprintln!("✓ {}", notice.message);
            }
        }
    }
    result
}

/// Prints `value` as JSON, or the text from `text`.
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> CommandResult<()> {
    if json {
        let out = serde_json::to_string_pretty(value)
            .map_err(|e| CommandError::internal(format!("Output could not be encoded: {}", e)))?;
        println!("{}", out);
    } else {
        print!("{}", text(value));
    }
    Ok(())
}

async fn dispatch(
    cli: &Cli,
    config: &AppConfig,
    api: &ApiClient,
    session: &mut BillingSession,
) -> CommandResult<()> {
    let json = cli.json;
    let currency = config.billing.currency.as_str();

    match &cli.command {
        Command::Products(args) => {
            let query = session.report(args.to_query().map_err(CommandError::from))?;
            let page = catalog::list_products(session, &api.products(), &query).await?;
            emit(json, &page, |p| output::render_products(p, currency))
        }
        Command::Categories => {
            let categories = catalog::list_categories(session, &api.categories()).await?;
            emit(json, &categories, |c| output::render_categories(c))
        }
        Command::Brands => {
            let brands = catalog::list_brands(session, &api.brands()).await?;
            emit(json, &brands, |b| output::render_brands(b))
        }
        Command::Cart(cmd) => run_cart(cmd, json, currency, api, session).await,
        Command::Bill(cmd) => run_bill(cmd, json, currency, api, session).await,
        Command::Bills(cmd) => run_bills(cmd, json, config, api, session).await,
        Command::Admin(cmd) => run_admin(cmd, json, config, api, session).await,
        Command::Notices => {
            session.prune_notices();
            let text = output::render_notices(session.notices(), Utc::now());
            emit(json, &session.notices().active(Utc::now()), |_| text)
        }
        // Handled before the session is loaded
        Command::Config(_) | Command::Reset => Ok(()),
    }
}

async fn run_cart(
    cmd: &CartCommand,
    json: bool,
    currency: &str,
    api: &ApiClient,
    session: &mut BillingSession,
) -> CommandResult<()> {
    match cmd {
        CartCommand::Show => {}
        CartCommand::Add { product_id } => {
            cart::add_to_cart(session, &api.products(), product_id).await?;
        }
        CartCommand::Set {
            product_id,
            quantity,
        } => cart::set_quantity(session, product_id, *quantity)?,
        CartCommand::Remove { product_id } => cart::remove_from_cart(session, product_id)?,
        CartCommand::Clear => cart::clear_cart(session),
        CartCommand::Refresh => {
            let adjustments = cart::refresh_stock(session, &api.products()).await?;
            if !json && !adjustments.is_empty() {
                eprint!("{}", output::render_adjustments(&adjustments));
            }
        }
    }
    emit(json, session.draft(), |_| output::render_cart(session, currency))
}

async fn run_bill(
    cmd: &BillCommand,
    json: bool,
    currency: &str,
    api: &ApiClient,
    session: &mut BillingSession,
) -> CommandResult<()> {
    let status = match cmd {
        BillCommand::Customer(args) => {
            let customer = nexus_core::Customer {
                name: args.name.clone(),
                phone: args.phone.clone(),
                email: args.email.clone(),
                address: args.address.clone(),
            };
            bill::set_customer(session, customer)?;
            None
        }
        BillCommand::Rates { tax, discount } => {
            bill::set_rates(session, *tax, *discount);
            None
        }
        BillCommand::Notes { text } => {
            bill::set_notes(session, text);
            None
        }
        BillCommand::Save => Some(BillStatus::Draft),
        BillCommand::Generate => Some(BillStatus::Pending),
        BillCommand::Pay => Some(BillStatus::Paid),
    };

    match status {
        Some(status) => {
            let saved = bill::save_bill(session, &api.bills(), status).await?;
            emit(json, &saved, |b| {
                format!(
                    "{} {} {}\n",
                    b.label(),
                    b.status,
                    b.total.format_with(currency)
                )
            })
        }
        None => emit(json, session.draft(), |_| output::render_cart(session, currency)),
    }
}

async fn run_bills(
    cmd: &BillsCommand,
    json: bool,
    config: &AppConfig,
    api: &ApiClient,
    session: &mut BillingSession,
) -> CommandResult<()> {
    let bills = api.bills();
    let currency = config.billing.currency.as_str();

    match cmd {
        BillsCommand::List => {
            let list = bill::list_bills(session, &bills).await?;
            emit(json, &list, |l| output::render_bills(l, currency))
        }
        BillsCommand::Show { id } => {
            let found = bill::show_bill(session, &bills, id).await?;
            let receipt =
                nexus_core::receipt::render_receipt(&found, &config.billing.store_name, currency);
            emit(json, &found, |_| receipt)
        }
        BillsCommand::Edit { id } => {
            bill::edit_bill(session, &bills, id).await?;
            emit(json, session.draft(), |_| output::render_cart(session, currency))
        }
        BillsCommand::Delete { id } => {
            bill::delete_bill(session, &bills, id).await?;
            emit(json, &serde_json::json!({ "deleted": id }), |_| String::new())
        }
        BillsCommand::Pdf { id, out } => {
            let path: PathBuf = bill::download_pdf(session, &bills, id, out.as_deref()).await?;
            emit(json, &path, |p| format!("{}\n", p.display()))
        }
        BillsCommand::Print { id } => {
            let receipt = bill::print_receipt(
                session,
                &bills,
                id,
                &config.billing.store_name,
                currency,
            )
            .await?;
            emit(json, &receipt, |r| r.clone())
        }
    }
}

async fn run_admin(
    cmd: &AdminCommand,
    json: bool,
    config: &AppConfig,
    api: &ApiClient,
    session: &mut BillingSession,
) -> CommandResult<()> {
    let policy = config.access_policy();
    let identity = config.identity();
    let ctx = AdminContext::new(&policy, &identity);

    match cmd {
        AdminCommand::Product(entity) => {
            let catalog = api.products();
            match entity {
                EntityCommand::Create { file } => {
                    let form: ProductForm = session.report(ctx.read_form(file))?;
                    let product = admin::create_product(session, ctx, &catalog, &form).await?;
                    emit(json, &product, |p| format!("{} {}\n", p.id, p.name))
                }
                EntityCommand::Update { id, file } => {
                    let form: ProductForm = session.report(ctx.read_form(file))?;
                    let product = admin::update_product(session, ctx, &catalog, id, &form).await?;
                    emit(json, &product, |p| format!("{} {}\n", p.id, p.name))
                }
                EntityCommand::Delete { id } => {
                    admin::delete_product(session, ctx, &catalog, id).await?;
                    emit(json, &serde_json::json!({ "deleted": id }), |_| String::new())
                }
            }
        }
        AdminCommand::Category(entity) => {
            let registry = api.categories();
            match entity {
                EntityCommand::Create { file } => {
                    let form: CategoryForm = session.report(ctx.read_form(file))?;
                    let category = admin::create_category(session, ctx, &registry, &form).await?;
                    emit(json, &category, |c| format!("{} {}\n", c.id, c.name))
                }
                EntityCommand::Update { id, file } => {
                    let form: CategoryForm = session.report(ctx.read_form(file))?;
                    let category =
                        admin::update_category(session, ctx, &registry, id, &form).await?;
                    emit(json, &category, |c| format!("{} {}\n", c.id, c.name))
                }
                EntityCommand::Delete { id } => {
                    admin::delete_category(session, ctx, &registry, id).await?;
                    emit(json, &serde_json::json!({ "deleted": id }), |_| String::new())
                }
            }
        }
        AdminCommand::Brand(entity) => {
            let registry = api.brands();
            match entity {
                EntityCommand::Create { file } => {
                    let form: BrandForm = session.report(ctx.read_form(file))?;
                    let brand = admin::create_brand(session, ctx, &registry, &form).await?;
                    emit(json, &brand, |b| format!("{} {}\n", b.id, b.name))
                }
                EntityCommand::Update { id, file } => {
                    let form: BrandForm = session.report(ctx.read_form(file))?;
                    let brand = admin::update_brand(session, ctx, &registry, id, &form).await?;
                    emit(json, &brand, |b| format!("{} {}\n", b.id, b.name))
                }
                EntityCommand::Delete { id } => {
                    admin::delete_brand(session, ctx, &registry, id).await?;
                    emit(json, &serde_json::json!({ "deleted": id }), |_| String::new())
                }
            }
        }
    }
}

fn run_config(cmd: &ConfigCommand, path: Option<PathBuf>, json: bool) -> CommandResult<()> {
    match cmd {
        ConfigCommand::Show => {
            let config = AppConfig::load(path.clone())?;
            if json {
                return emit(true, &config, |_| String::new());
            }
            let body = toml::to_string_pretty(&config).map_err(state::ConfigError::from)?;
            println!("# {}", AppConfig::describe_source(path.as_deref()));
            print!("{}", body);
            Ok(())
        }
        ConfigCommand::Init { force } => {
            let target = path
                .or_else(AppConfig::default_config_path)
                .ok_or(state::ConfigError::NoConfigDir)?;
            if target.exists() && !force {
                return Err(CommandError::new(
                    ErrorCode::ConfigError,
                    format!(
                        "{} already exists (use --force to overwrite)",
                        target.display()
                    ),
                ));
            }
            let written = AppConfig::default().save(Some(target))?;
            emit(json, &written, |p| format!("{}\n", p.display()))
        }
    }
}

/// Deletes the session file so the next command starts fresh.
fn run_reset(config: &AppConfig, json: bool) -> CommandResult<()> {
    let store = SessionStore::new(config.session_path()?);
    store.reset()?;
    emit(json, &store.path(), |p| {
        format!("Session cleared ({})\n", p.display())
    })
}
