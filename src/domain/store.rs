use {
    super::error::PipelineError,
    super::id::PaymentId,
    super::payment::{InsertOutcome, NewPaymentRecord, PaymentRecord},
    std::{future::Future, pin::Pin},
};

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PipelineError>> + Send + 'a>>;

/// Persistence for payment records, keyed uniquely by `payment_id`.
pub trait PaymentStore: Send + Sync {
    /// Atomically insert the record unless one with the same `payment_id`
    /// exists. An existing record is never modified.
    fn insert_if_absent<'a>(
        &'a self,
        record: &'a NewPaymentRecord,
    ) -> StoreFuture<'a, InsertOutcome>;

    fn find_by_payment_id<'a>(
        &'a self,
        id: &'a PaymentId,
    ) -> StoreFuture<'a, Option<PaymentRecord>>;
}
