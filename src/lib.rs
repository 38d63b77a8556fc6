pub mod adapters;
pub mod config;
pub mod domain;
pub mod infra;
pub mod services;

use {
    axum::{
        Router,
        extract::DefaultBodyLimit,
        routing::{get, post},
    },
    domain::{customer::CustomerDirectory, store::PaymentStore},
    std::{sync::Arc, time::Duration},
    tower_http::timeout::TimeoutLayer,
};

/// Per-request ceiling; matches the Stripe client timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest accepted webhook body. Stripe events are typically under 20 KB.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PaymentStore>,
    pub customers: Arc<dyn CustomerDirectory>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route(
            "/webhook/v1/payment",
            post(adapters::stripe::webhook::payment_webhook_handler),
        )
        .route(
            "/payments/{payment_id}",
            get(adapters::payments::get_payment_handler),
        )
        .route(
            "/stripe/connection",
            get(adapters::payments::stripe_connection_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .with_state(state)
}
