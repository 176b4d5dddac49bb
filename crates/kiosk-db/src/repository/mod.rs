//! # Repository Module
//!
//! Database repositories for the kiosk store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StoreBackend (kiosk app)                                               │
//! │       │                                                                 │
//! │       │  db.carts().lines_for_session("sess-42")                        │
//! │       ▼                                                                 │
//! │  CartRepository / ProductRepository / OrderRepository / UserRepository │
//! │       │                                                                 │
//! │       │  SQL Query + FromRow row struct                                 │
//! │       ▼                                                                 │
//! │  SQLite Database ──► rows converted to kiosk-core types                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Shopper profiles
//! - [`ProductRepository`](product::ProductRepository) - Catalog
//! - [`CartRepository`](cart::CartRepository) - Mobile session carts
//! - [`OrderRepository`](order::OrderRepository) - Orders and order lines

pub mod cart;
pub mod order;
pub mod product;
pub mod user;
