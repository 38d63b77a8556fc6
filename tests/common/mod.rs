#![allow(dead_code)]

use {
    axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    },
    payhook::{
        AppState,
        domain::{
            customer::{ConnectionStatus, CustomerDirectory, FetchedCustomer},
            error::PipelineError,
            id::{CustomerId, PaymentId},
            payment::{InsertOutcome, NewPaymentRecord, PaymentRecord},
            store::{PaymentStore, StoreFuture},
        },
        infra::memory::MemoryPaymentStore,
    },
    serde_json::Value,
    std::{
        collections::HashMap,
        future::Future,
        pin::Pin,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    },
    tower::ServiceExt,
};

/// Customer directory with canned answers. Unknown ids fail like a 404.
#[derive(Default)]
pub struct ScriptedCustomers {
    emails: HashMap<String, Option<String>>,
    calls: AtomicUsize,
}

impl ScriptedCustomers {
    pub fn with(entries: &[(&str, Option<&str>)]) -> Self {
        Self {
            emails: entries
                .iter()
                .map(|(id, email)| (id.to_string(), email.map(str::to_string)))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CustomerDirectory for ScriptedCustomers {
    fn fetch_customer(
        &self,
        id: &CustomerId,
    ) -> Pin<Box<dyn Future<Output = Result<FetchedCustomer, PipelineError>> + Send + '_>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = match self.emails.get(id.as_str()) {
            Some(email) => Ok(FetchedCustomer {
                email: email.clone(),
            }),
            None => Err(PipelineError::Provider(format!(
                "Stripe API: HTTP 404 - no such customer: {id}"
            ))),
        };
        Box::pin(async move { result })
    }

    fn check_connection(&self) -> Pin<Box<dyn Future<Output = ConnectionStatus> + Send + '_>> {
        Box::pin(async {
            ConnectionStatus {
                success: true,
                message: "Test Mode - API key is valid".into(),
            }
        })
    }
}

/// Store whose writes always fail, as if the pool were exhausted.
pub struct FailingStore;

impl PaymentStore for FailingStore {
    fn insert_if_absent<'a>(
        &'a self,
        _record: &'a NewPaymentRecord,
    ) -> StoreFuture<'a, InsertOutcome> {
        Box::pin(async { Err(PipelineError::Database(sqlx::Error::PoolTimedOut)) })
    }

    fn find_by_payment_id<'a>(
        &'a self,
        _id: &'a PaymentId,
    ) -> StoreFuture<'a, Option<PaymentRecord>> {
        Box::pin(async { Ok(None) })
    }
}

/// Router backed by `store` instead of the in-memory one.
pub fn router_with_store(store: Arc<dyn PaymentStore>, customers: ScriptedCustomers) -> Router {
    payhook::app(AppState {
        store,
        customers: Arc::new(customers),
    })
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryPaymentStore>,
    pub customers: Arc<ScriptedCustomers>,
}

pub fn test_app(customers: ScriptedCustomers) -> TestApp {
    let store = Arc::new(MemoryPaymentStore::new());
    let customers = Arc::new(customers);
    let router = payhook::app(AppState {
        store: store.clone(),
        customers: customers.clone(),
    });
    TestApp {
        router,
        store,
        customers,
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn post_webhook(router: &Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/webhook/v1/payment")
        .header("Content-Type", "application/json")
        .body(body.into())
        .unwrap();
    send(router, request).await
}

pub async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

/// Provider envelope around `object`.
pub fn envelope(event_id: &str, event_type: &str, object: Value) -> String {
    serde_json::json!({
        "id": event_id,
        "object": "event",
        "type": event_type,
        "created": 1_700_000_000,
        "livemode": false,
        "data": {"object": object}
    })
    .to_string()
}
