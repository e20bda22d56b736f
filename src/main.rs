use anyhow::Context;
use clap::Parser;
use sensorlink::bootstrap::{app_state, build_pool};
use sensorlink::{init_logging, list_ports, server, Config, SerialPortOpener};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Relay sensor and voice events to serial displays")]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(short, long, value_name = "FILE", env = "SENSORLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// TCP port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Print serial ports that look like boards and exit
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if cli.list_ports {
        for port in list_ports()? {
            println!("{}\t{}", port.port_name, port.description);
        }
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    init_logging(&config.logging)?;
    tracing::info!(
        "SensorLink {} (built {}) starting",
        sensorlink::VERSION,
        sensorlink::BUILD_DATE
    );

    let pool_config = config.clone();
    let pool = tokio::task::spawn_blocking(move || {
        build_pool(&pool_config, Arc::new(SerialPortOpener))
    })
    .await
    .context("Failed to connect displays")?;
    let pool = Arc::new(pool);

    let app = server::router(app_state(&config, pool.clone()));
    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Shutting down");
    tokio::task::spawn_blocking(move || pool.close_all()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
