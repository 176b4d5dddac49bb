//! # Store Kiosk Entry Point
//!
//! ```bash
//! kiosk                          # kiosk.toml from the platform config dir
//! kiosk --config ./kiosk.toml    # explicit config file
//! RUST_LOG=debug kiosk           # verbose logging
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration (defaults → kiosk.toml → KIOSK_* env)
//! 3. Open database & run migrations
//! 4. Spawn the kiosk runtime
//! 5. Read console commands until quit

use std::path::PathBuf;

use anyhow::{bail, Context};

use kiosk_app::state::KioskConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    kiosk_app::init_tracing();

    let config_path = parse_args(std::env::args().skip(1))?;
    let config = KioskConfig::load(config_path).context("loading kiosk configuration")?;

    kiosk_app::run(config).await
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Option<PathBuf>> {
    let mut config_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().context("--config needs a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                println!("Usage: kiosk [--config <path>]");
                std::process::exit(0);
            }
            other => bail!("unknown argument: {}", other),
        }
    }

    Ok(config_path)
}
