//! One-shot loader for the initial services and doctors catalog.
//!
//! Usage: `cargo run --bin seed [services|doctors|all]` (default: all).
//! Safe to re-run: records are matched by name and updated in place.

use smile_clinic_server::{config::Config, db, seed};

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let target = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());

    let cfg = Config::from_env()?;
    let pool = db::connect_pg(&cfg.database_url).await?;
    db::init_schema(&pool).await?;

    match target.as_str() {
        "services" => {
            seed::seed_services(&pool).await?;
        }
        "doctors" => {
            seed::seed_doctors(&pool).await?;
        }
        "all" => {
            // services first so doctor service references resolve
            seed::seed_services(&pool).await?;
            seed::seed_doctors(&pool).await?;
        }
        other => anyhow::bail!("unknown seed target '{other}' (expected services, doctors or all)"),
    }

    Ok(())
}
