use log::info;

use ayurplan::{load_config, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = load_config()?;
    info!(
        "Starting with provider '{}' on {}:{}",
        config.default_provider, config.server.host, config.server.port
    );

    server::serve(&config).await?;
    Ok(())
}
