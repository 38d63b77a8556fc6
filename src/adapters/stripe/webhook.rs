use {
    crate::{
        AppState,
        adapters::{api_errors::ApiError, notification::Notification},
        domain::payment::ProcessResult,
        services::payment_pipeline::record_payment,
    },
    axum::{
        Json,
        body::Bytes,
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    chrono::Utc,
};

#[tracing::instrument(
    name = "webhook",
    skip_all,
    fields(event_id = tracing::field::Empty, event_type = tracing::field::Empty)
)]
pub async fn payment_webhook_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    tracing::debug!(body = %String::from_utf8_lossy(&body), "webhook received");

    let notification = Notification::classify(&body);

    let span = tracing::Span::current();
    span.record("event_type", tracing::field::display(notification.event_type()));
    if let Some(event_id) = notification.event_id() {
        span.record("event_id", tracing::field::display(event_id));
    }

    let inbound = notification.into_inbound(Utc::now().date_naive())?;

    let response = match record_payment(state.store.as_ref(), state.customers.as_ref(), inbound)
        .await?
    {
        ProcessResult::Ignored { event_type } => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": format!("Event type not processed: {event_type}"),
                "processed": false,
            })),
        ),
        ProcessResult::Duplicate(id) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Payment already exists",
                "post_id": id,
            })),
        ),
        ProcessResult::Created { id, has_email } => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Payment created successfully",
                "post_id": id,
                "email_fetched": if has_email { "yes" } else { "no" },
            })),
        ),
    };

    Ok(response.into_response())
}
