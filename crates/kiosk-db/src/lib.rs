//! # kiosk-db: Store Database for the Kiosk
//!
//! SQLite storage behind the kiosk's store backend: shopper profiles, the
//! catalog, mobile session carts and completed orders.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kiosk Data Flow                                  │
//! │                                                                         │
//! │  Screen controller ──► StoreBackend (SqliteBackend)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kiosk-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ cart, product │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ order, user   │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (path from KioskConfig)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kiosk_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("kiosk.db")).await?;
//! let lines = db.carts().lines_for_session("sess-42").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::cart::CartRepository;
pub use repository::order::{OrderRepository, StoredOrder};
pub use repository::product::ProductRepository;
pub use repository::user::UserRepository;
