use {
    crate::adapters::sanitize,
    crate::domain::customer::CustomerDirectory,
    crate::domain::error::PipelineError,
    crate::domain::id::PaymentId,
    crate::domain::payment::{InsertOutcome, Inbound, PaymentDraft, PaymentRecord, ProcessResult},
    crate::domain::store::PaymentStore,
};

/// Take an inbound notification to a terminal state: ignored, duplicate or
/// created. A missing payment_id is rejected before any lookup or write.
pub async fn record_payment(
    store: &dyn PaymentStore,
    customers: &dyn CustomerDirectory,
    inbound: Inbound,
) -> Result<ProcessResult, PipelineError> {
    let mut draft = match inbound {
        Inbound::Unsupported { event_type } => {
            tracing::info!(event_type = %event_type, "event type not processed");
            return Ok(ProcessResult::Ignored { event_type });
        }
        Inbound::Draft(draft) => draft,
    };

    if draft.payment_id.trim().is_empty() {
        tracing::warn!("notification without payment id rejected");
        return Err(PipelineError::MissingPaymentId);
    }

    let email_fetched = enrich_email(customers, &mut draft).await;

    let record = draft.into_new_record()?;
    match store.insert_if_absent(&record).await? {
        InsertOutcome::Created(id) => {
            tracing::info!(
                record_id = %id,
                payment_id = %record.payment_id(),
                status = %record.payment_status(),
                amount = %record.amount(),
                email_fetched,
                "payment recorded"
            );
            Ok(ProcessResult::Created {
                id,
                has_email: !record.email().is_empty(),
            })
        }
        InsertOutcome::Existing(id) => {
            tracing::info!(record_id = %id, payment_id = %record.payment_id(), "payment already exists");
            Ok(ProcessResult::Duplicate(id))
        }
    }
}

/// Fill an empty email from the provider's customer record. Failures are
/// logged and leave the email empty. Returns whether an email was filled in.
pub async fn enrich_email(customers: &dyn CustomerDirectory, draft: &mut PaymentDraft) -> bool {
    if !draft.email.is_empty() {
        return false;
    }
    let Some(customer_id) = draft.customer_id.clone() else {
        return false;
    };

    tracing::info!(customer_id = %customer_id, "no email in notification, fetching customer");
    match customers.fetch_customer(&customer_id).await {
        Ok(customer) => {
            let email = customer
                .email
                .as_deref()
                .map(sanitize::email)
                .unwrap_or_default();
            if email.is_empty() {
                tracing::warn!(customer_id = %customer_id, "customer has no usable email");
                return false;
            }
            tracing::info!(customer_id = %customer_id, "fetched customer email");
            draft.email = email;
            true
        }
        Err(e) => {
            tracing::warn!(customer_id = %customer_id, error = %e, "customer lookup failed");
            false
        }
    }
}

pub async fn find_payment(
    store: &dyn PaymentStore,
    payment_id: &str,
) -> Result<PaymentRecord, PipelineError> {
    let id = PaymentId::new(payment_id)?;
    store
        .find_by_payment_id(&id)
        .await?
        .ok_or_else(|| PipelineError::NotFound(format!("payment {id}")))
}
