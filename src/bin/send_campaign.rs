use anyhow::Context;

use smartrisk::campaign;
use smartrisk::configuration::get_configuration;
use smartrisk::startup::get_connection_pool;
use smartrisk::telemetry::{get_subscriber, init_subscriber};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber(
        "send_campaign".into(),
        "send_campaign=info,smartrisk=info".into(),
        std::io::stdout,
    );
    init_subscriber(subscriber);

    let configuration = get_configuration().expect("Failed to read configuration.");
    let connection = get_connection_pool(&configuration.database)
        .await
        .context("Failed to connect to Postgres")?;
    let email_client = configuration.email_client.client()?;

    let summary = campaign::run(&connection, &email_client, &configuration.campaign).await?;
    tracing::info!("Campaign finished: {}", summary);
    Ok(())
}
