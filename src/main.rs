use {
    payhook::{
        AppState,
        adapters::stripe_client::StripeCustomers,
        config::{Config, mask_key},
        domain::store::PaymentStore,
        infra::{memory::MemoryPaymentStore, postgres::payment_repo::PgPaymentStore},
    },
    sqlx::postgres::PgPoolOptions,
    std::{sync::Arc, time::Duration},
    tokio::signal,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();
    tracing::debug!(?config, "configuration loaded");

    let store: Arc<dyn PaymentStore> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(20)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
                .expect("failed to connect to database");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("failed to run migrations");
            Arc::new(PgPaymentStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, payments are kept in memory only");
            Arc::new(MemoryPaymentStore::new())
        }
    };

    let secret_key = config.stripe_secret_key();
    match secret_key {
        Some(key) => {
            tracing::info!(mode = %config.stripe_mode, key = %mask_key(key), "stripe configured")
        }
        None => tracing::warn!(
            mode = %config.stripe_mode,
            "stripe secret key not configured, customer lookups disabled"
        ),
    }

    let state = AppState {
        store,
        customers: Arc::new(StripeCustomers::new(secret_key, config.stripe_mode)),
    };

    let app = payhook::app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind listener");
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
