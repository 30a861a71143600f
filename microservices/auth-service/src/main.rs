//! Auth Service binary

use auth_service::SERVICE_NAME;
use ticketing_core::{shutdown_signal, BootstrapSequencer};
use ticketing_store::PoolConnector;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Existing process variables win over .env entries.
    dotenvy::dotenv().ok();

    let _telemetry = ticketing_telemetry::init(SERVICE_NAME)?;

    let mut sequencer = BootstrapSequencer::from_process(SERVICE_NAME)?;
    let booted = match sequencer.run(&PoolConnector).await {
        Ok(booted) => booted,
        Err(e) => {
            error!(state = ?sequencer.state(), error = %e, "Startup aborted");
            return Err(e.into());
        }
    };

    auth_service::serve(booted, shutdown_signal()).await?;

    info!("Auth service stopped");
    Ok(())
}
