//! Environment check binary - reports which settings the server will see
//!
//! Usage:
//!   cargo run --bin check-env
//!
//! Values are never printed, only whether each variable is set.

use anyhow::Result;
use std::path::Path;
use temple_reunion::config::ENV_VARS;
use tracing::{info, warn};

const REQUIRED: &[&str] = &[
    "AIRTABLE_PERSONAL_ACCESS_TOKEN",
    "AIRTABLE_PLATFORM_CONFIG_BASE_ID",
    "AIRTABLE_TEMPLE_CONTENT_BASE_ID",
    "AIRTABLE_TEMPLE_USERS_BASE_ID",
    "TEMPLE_SITE_ID",
];

fn main() -> Result<()> {
    // Load .env file
    let env_file = Path::new(".env");
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("check_env=info".parse()?),
        )
        .init();

    if env_file.exists() {
        info!("✓ .env file found");
    } else {
        warn!(".env file not found, using process environment only");
    }

    let mut missing = 0;
    for name in ENV_VARS {
        let set = std::env::var(name).map(|v| !v.is_empty()).unwrap_or(false);
        if set {
            info!("[SET] {}", name);
        } else if REQUIRED.contains(name) {
            warn!("[NOT SET] {} (required)", name);
            missing += 1;
        } else {
            info!("[NOT SET] {}", name);
        }
    }

    if missing > 0 {
        warn!("{} required variables missing, Airtable calls will fail", missing);
    } else {
        info!("✓ All required variables set");
    }

    Ok(())
}
