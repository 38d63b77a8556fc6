use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::payment::PaymentRecord,
        services::payment_pipeline::find_payment,
    },
    axum::{
        Json,
        extract::{Path, State},
    },
};

pub async fn get_payment_handler(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<Json<PaymentRecord>, ApiError> {
    let record = find_payment(state.store.as_ref(), &payment_id).await?;
    Ok(Json(record))
}

/// Verifies the active Stripe secret key against the customers API.
pub async fn stripe_connection_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let status = state.customers.check_connection().await;
    Json(serde_json::json!({
        "success": status.success,
        "message": status.message,
    }))
}
