use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;

use pirate_ledger::{
    api::{create_router, LedgerApiState},
    config::LedgerConfig,
    store::{EntityStore, KeyValueStore, MemoryEntityStore, MemoryKeyValueStore, PgEntityStore},
    ProfileService, ProgressionLedger,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first - this validates all settings
    let config = LedgerConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {:#}", e);
        eprintln!("Please check PIRATE_* environment variables.");
        e
    })?;

    init_logging(&config)?;

    info!("Starting Pirate Ledger server");

    let ledger = ProgressionLedger::default();
    info!(
        tiers = ledger.tiers().len(),
        fee_basis_points = ledger.fee_rate().basis_points(),
        starting_points = config.progression.starting_points,
        "Progression ledger initialized"
    );

    // Balances stay in process memory in every mode
    let kv = MemoryKeyValueStore::new();

    let app = if config.database.postgres_enabled {
        let store = PgEntityStore::connect(
            &config.database.postgres_url,
            config.database.max_connections,
        )
        .await?;
        store.init_schema().await?;
        info!("Using PostgreSQL entity store");

        build_app(store, kv, ledger, &config)
    } else {
        warn!("PostgreSQL disabled, using in-memory entity store (data is lost on restart)");
        build_app(MemoryEntityStore::new(), kv, ledger, &config)
    };

    let bind_addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    info!("Pirate Ledger listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_app<S, K>(store: S, kv: K, ledger: ProgressionLedger, config: &LedgerConfig) -> Router
where
    S: EntityStore + 'static,
    K: KeyValueStore + 'static,
{
    let service = ProfileService::new(store, kv, ledger, config.progression.starting_points);

    create_router(LedgerApiState::new(service)).layer(TraceLayer::new_for_http())
}

/// Initialize logging from configuration
fn init_logging(config: &LedgerConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(if config.logging.log_requests {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
