use cert_portal::provision::{AdminSeed, provision_admin};
use cert_portal::{Config, db, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;
    telemetry::init(&cfg.loglevel);

    let seed = AdminSeed::from_config(&cfg)?;
    let store = db::connect(&cfg.database_url).await?;
    let result = provision_admin(&store, &seed).await;
    store.close().await;

    let outcome = result?;
    info!(id = outcome.id, created = outcome.created, "admin provisioning complete");
    Ok(())
}
