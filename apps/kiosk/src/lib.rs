//! # Store Kiosk Library
//!
//! Session state machine for the in-store fitting-room kiosk: pairing with a
//! shopper's mobile session, locating items, browsing, checkout and the
//! automatic reset back to the home screen.
//!
//! ## Module Organization
//! ```text
//! kiosk_app/
//! ├── lib.rs          ◄─── You are here (startup & wiring)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── kiosk.toml + KIOSK_* overrides
//! │   └── session.rs  ◄─── SessionStore and published snapshots
//! ├── controller/
//! │   ├── mod.rs      ◄─── ScreenController (guards & transitions)
//! │   └── saga.rs     ◄─── Order completion writes
//! ├── backend/
//! │   ├── mod.rs      ◄─── StoreBackend trait
//! │   ├── sqlite.rs   ◄─── Backed by kiosk-db
//! │   └── memory.rs   ◄─── In-memory store with failure injection
//! ├── runtime.rs      ◄─── Event loop + KioskHandle
//! ├── events.rs       ◄─── Shopper and internal events
//! ├── idle.rs         ◄─── Inactivity countdown
//! ├── timer.rs        ◄─── Cancel-on-drop scheduled tasks
//! ├── location.rs     ◄─── Shelf location lookup
//! ├── console.rs      ◄─── Text driver for the screens
//! └── error.rs        ◄─── Guard violations and app errors
//! ```

pub mod backend;
pub mod console;
pub mod controller;
pub mod error;
pub mod events;
pub mod idle;
pub mod location;
pub mod runtime;
pub mod state;
pub mod timer;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use backend::SqliteBackend;
use controller::ScreenController;
use kiosk_core::{DemoPersonalization, NoPersonalization, PersonalizationPolicy};
use kiosk_db::{Database, DbConfig};
use runtime::KioskRuntime;
use state::KioskConfig;

/// Runs one kiosk until the console is closed.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                          Kiosk Startup                                  │
/// │                                                                         │
/// │  1. Open Database ────────────────────────────────────────────────────► │
/// │     • Path from config, else the platform data dir                      │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  2. Build Controller ─────────────────────────────────────────────────► │
/// │     • SqliteBackend as the store collaborator                           │
/// │     • Demo personalization only when demo_mode is on                    │
/// │     • Timing from [timing]                                              │
/// │                                                                         │
/// │  3. Spawn Runtime ────────────────────────────────────────────────────► │
/// │     • Event loop owns the session                                       │
/// │                                                                         │
/// │  4. Console ──────────────────────────────────────────────────────────► │
/// │     • stdin commands until quit / EOF, then graceful shutdown           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(config: KioskConfig) -> anyhow::Result<()> {
    info!(
        kiosk_id = %config.kiosk_id(),
        store = %config.kiosk.store_name,
        demo_mode = config.kiosk.demo_mode,
        "Starting kiosk"
    );

    let db_path = config.database_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path))
        .await
        .context("opening kiosk database")?;
    info!("Database connected and migrations applied");

    let personalization: Arc<dyn PersonalizationPolicy> = if config.kiosk.demo_mode {
        Arc::new(DemoPersonalization)
    } else {
        Arc::new(NoPersonalization)
    };

    let (controller, internal_rx) = ScreenController::new(Arc::new(SqliteBackend::new(db.clone())));
    let controller = controller
        .with_timing(config.timing())
        .with_personalization(personalization);

    let (runtime, handle) = KioskRuntime::new(controller, internal_rx);
    let runtime_task = tokio::spawn(runtime.run());

    let console_result = console::run_console(handle.clone()).await;

    // The loop may already be gone if it stopped on its own.
    let _ = handle.shutdown().await;
    runtime_task.await.context("kiosk runtime panicked")?;
    db.close().await;

    console_result?;
    info!("Kiosk stopped");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=kiosk_app=trace` - Trace the kiosk crate only
/// - Default: INFO, DEBUG for `kiosk_*` targets
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kiosk=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
