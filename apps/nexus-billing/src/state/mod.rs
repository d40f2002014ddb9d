//! # State Module
//!
//! Application state for the billing client.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │    AppConfig     │  │  BillingSession  │  │    SessionStore      │  │
//! │  │                  │  │                  │  │                      │  │
//! │  │  api URL         │  │  BillDraft       │  │  session.json        │  │
//! │  │  currency, tax   │  │  editing target  │  │  (data directory)    │  │
//! │  │  admin policy    │  │  NoticeBoard     │  │                      │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘  │
//! │                                                                         │
//! │  AppConfig is read-only after loading. The session is loaded at the    │
//! │  start of a command and written back when the command returns.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod notice;
pub mod session;
pub mod store;

pub use config::{AppConfig, ConfigError, ConfigResult};
pub use notice::{Notice, NoticeBoard, NoticeKind, DEFAULT_NOTICE_TTL};
pub use session::{BillingSession, EditTarget};
pub use store::SessionStore;
