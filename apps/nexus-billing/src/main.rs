//! # AutoNexus Billing Entry Point
//!
//! The `nexus` binary: one invocation runs one command against the REST API.
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AutoNexus Billing                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  main.rs ────► tracing, clap, exit status                        │  │
//! │  │                                                                  │  │
//! │  │  lib.rs ─────► config, session restore/save, dispatch           │  │
//! │  │                                                                  │  │
//! │  │  commands/ ──► add_to_cart, save_bill, download_pdf, ...        │  │
//! │  │                                                                  │  │
//! │  │  state/ ─────► AppConfig, BillingSession, SessionStore          │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  AutoNexus REST API (nexus-api)                  │  │
//! │  │  /products  /categories  /brands  /bills  /bills/{id}/pdf        │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exit Status
//! 0 on success, otherwise the code of the `ErrorCode` category
//! (2 validation, 3 stock, 4 not found, 5 conflict, 6 network,
//! 7 access denied, 78 config, 1 internal).

use std::process::ExitCode;

use clap::Parser;

use nexus_billing::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    nexus_billing::init_tracing();

    let cli = Cli::parse();
    let json = cli.json;

    match nexus_billing::run(cli).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&err)?);
            } else {
                eprintln!("✗ {}", err.message);
            }
            Ok(ExitCode::from(err.code.exit_code()))
        }
    }
}
