//! Tickets Service binary

use ticketing_core::{shutdown_signal, BootstrapSequencer};
use ticketing_store::PgConnector;
use tickets_service::SERVICE_NAME;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Existing process variables win over .env entries.
    dotenvy::dotenv().ok();

    let _telemetry = ticketing_telemetry::init(SERVICE_NAME)?;

    let mut sequencer = BootstrapSequencer::from_process(SERVICE_NAME)?;
    let booted = match sequencer.run(&PgConnector).await {
        Ok(booted) => booted,
        Err(e) => {
            error!(state = ?sequencer.state(), error = %e, "Startup aborted");
            return Err(e.into());
        }
    };

    tickets_service::serve(booted, shutdown_signal()).await?;

    info!("Tickets service stopped");
    Ok(())
}
