use std::sync::Arc;

use clap::Parser;
use fleetlink::utils::{logger, validation::Validate};
use fleetlink::{
    router, serve_with_registration, shutdown_signal, AppState, CliConfig, ConsulDiscovery,
    Registrar, ServiceConfig,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    logger::init_service_logger(cli.verbose, cli.log_json);

    tracing::info!("Starting fleetlink");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match ServiceConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Could not load configuration: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let discovery = Arc::new(ConsulDiscovery::with_timeout(
        &config.registry.url,
        config.registry_timeout(),
    ));

    let state = AppState::new(discovery.clone(), config.call_timeout());
    let app = router(state);

    // Bind before advertising, so the health check never probes a dead
    // port.
    let listener = TcpListener::bind(config.bind_addr()).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("🚀 {} listening on {}", config.service.name, local_addr);

    let registrar = Registrar::new(discovery, config.registration());

    serve_with_registration(listener, app, registrar, shutdown_signal()).await?;

    tracing::info!("✅ {} stopped cleanly", config.service.name);
    Ok(())
}
