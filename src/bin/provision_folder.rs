use cert_portal::api::cloudinary_api::CloudinaryClient;
use cert_portal::provision::provision_folder;
use cert_portal::{Config, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;
    telemetry::init(&cfg.loglevel);

    let client = CloudinaryClient::from_config(&cfg)?;
    provision_folder(&client, &cfg.media_folder).await?;
    Ok(())
}
