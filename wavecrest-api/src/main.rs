use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wavecrest_api::{app, AppState};
use wavecrest_booking::{AvailabilityEngine, BookingService, MockCheckoutGateway};
use wavecrest_catalog::CatalogRepository;
use wavecrest_core::payment::PaymentGateway;
use wavecrest_ledger::ReservationRepository;
use wavecrest_store::app_config::{Config, PaymentMode};
use wavecrest_store::{MemoryStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wavecrest_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Wavecrest API on port {}", config.server.port);

    let (catalog, ledger) = connect_store(&config).await;

    let gateway: Option<Arc<dyn PaymentGateway>> = match config.payment.mode {
        PaymentMode::Disabled => None,
        PaymentMode::Mock => Some(Arc::new(MockCheckoutGateway)),
    };

    let booking = Arc::new(BookingService::new(
        catalog.clone(),
        ledger.clone(),
        gateway,
    ));
    let engine = AvailabilityEngine::new(catalog.clone(), ledger.clone());

    let state = AppState {
        catalog,
        ledger,
        engine,
        booking,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}

/// Use Postgres when configured and reachable; otherwise run on the
/// in-memory store so the service stays bookable.
async fn connect_store(
    config: &Config,
) -> (Arc<dyn CatalogRepository>, Arc<dyn ReservationRepository>) {
    if let Some(url) = config.database.url.as_deref().filter(|u| !u.is_empty()) {
        match PgStore::connect(url).await {
            Ok(store) => {
                store.migrate().await.expect("Failed to ensure schema");
                store
                    .seed_defaults()
                    .await
                    .expect("Failed to seed default catalog");
                let store = Arc::new(store);
                return (store.clone(), store);
            }
            Err(err) => {
                tracing::warn!(
                    "Database unreachable ({}), falling back to in-memory store",
                    err
                );
            }
        }
    } else {
        tracing::info!("No database configured, using in-memory store");
    }

    let store = Arc::new(MemoryStore::new());
    (store.clone(), store)
}
