use {
    crate::domain::{
        id::PaymentId,
        payment::{InsertOutcome, NewPaymentRecord, PaymentRecord},
        store::{PaymentStore, StoreFuture},
    },
    chrono::Utc,
    std::{
        collections::{HashMap, hash_map::Entry},
        sync::{Mutex, MutexGuard, PoisonError},
    },
};

/// Process-local store. The map lock makes check-and-insert a single step.
#[derive(Default)]
pub struct MemoryPaymentStore {
    records: Mutex<HashMap<PaymentId, PaymentRecord>>,
}

impl MemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<PaymentId, PaymentRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    fn insert_sync(&self, record: &NewPaymentRecord) -> InsertOutcome {
        match self.records().entry(record.payment_id().clone()) {
            Entry::Occupied(existing) => InsertOutcome::Existing(existing.get().id),
            Entry::Vacant(slot) => {
                let stored = slot.insert(record.clone().into_record(Utc::now()));
                InsertOutcome::Created(stored.id)
            }
        }
    }
}

impl PaymentStore for MemoryPaymentStore {
    fn insert_if_absent<'a>(
        &'a self,
        record: &'a NewPaymentRecord,
    ) -> StoreFuture<'a, InsertOutcome> {
        let outcome = self.insert_sync(record);
        Box::pin(async move { Ok(outcome) })
    }

    fn find_by_payment_id<'a>(
        &'a self,
        id: &'a PaymentId,
    ) -> StoreFuture<'a, Option<PaymentRecord>> {
        let found = self.records().get(id).cloned();
        Box::pin(async move { Ok(found) })
    }
}
