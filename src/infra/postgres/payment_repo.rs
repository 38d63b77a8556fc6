use {
    crate::domain::{
        error::PipelineError,
        id::{CustomerId, PaymentId},
        money::MajorAmount,
        payment::{InsertOutcome, NewPaymentRecord, PaymentRecord, PaymentStatus},
        store::{PaymentStore, StoreFuture},
    },
    chrono::{DateTime, NaiveDate, Utc},
    rust_decimal::Decimal,
    sqlx::PgPool,
    uuid::Uuid,
};

#[derive(Clone)]
pub struct PgPaymentStore {
    pool: PgPool,
}

impl PgPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl PaymentStore for PgPaymentStore {
    fn insert_if_absent<'a>(
        &'a self,
        record: &'a NewPaymentRecord,
    ) -> StoreFuture<'a, InsertOutcome> {
        Box::pin(insert_if_absent(&self.pool, record))
    }

    fn find_by_payment_id<'a>(
        &'a self,
        id: &'a PaymentId,
    ) -> StoreFuture<'a, Option<PaymentRecord>> {
        Box::pin(find_by_payment_id(&self.pool, id))
    }
}

/// Insert unless a row with the same payment_id exists. The unique
/// constraint on payment_id makes concurrent deliveries race-free: exactly
/// one insert wins, the rest read back the winner's id.
pub async fn insert_if_absent(
    pool: &PgPool,
    record: &NewPaymentRecord,
) -> Result<InsertOutcome, PipelineError> {
    let inserted = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO payments
            (id, title, payment_id, email, amount, payment_date, product,
             payment_status, stripe_event_id, customer_id, invoice_pdf)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (payment_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(record.id())
    .bind(record.title())
    .bind(record.payment_id().as_str())
    .bind(record.email())
    .bind(record.amount().value())
    .bind(record.payment_date())
    .bind(record.product())
    .bind(record.payment_status().as_str())
    .bind(record.stripe_event_id())
    .bind(record.customer_id().map(CustomerId::as_str))
    .bind(record.invoice_pdf())
    .fetch_optional(pool)
    .await?;

    if let Some(id) = inserted {
        return Ok(InsertOutcome::Created(id));
    }

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM payments WHERE payment_id = $1")
        .bind(record.payment_id().as_str())
        .fetch_one(pool)
        .await?;

    Ok(InsertOutcome::Existing(existing))
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    title: String,
    payment_id: String,
    email: String,
    amount: Decimal,
    payment_date: NaiveDate,
    product: String,
    payment_status: String,
    stripe_event_id: Option<String>,
    customer_id: Option<String>,
    invoice_pdf: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = PipelineError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(PaymentRecord {
            id: row.id,
            title: row.title,
            payment_id: PaymentId::new(row.payment_id)?,
            email: row.email,
            amount: MajorAmount::new(row.amount)?,
            payment_date: row.payment_date,
            product: row.product,
            payment_status: PaymentStatus::try_from(row.payment_status.as_str())?,
            stripe_event_id: row.stripe_event_id,
            customer_id: row.customer_id.and_then(CustomerId::parse),
            invoice_pdf: row.invoice_pdf,
            created_at: row.created_at,
        })
    }
}

pub async fn find_by_payment_id(
    pool: &PgPool,
    id: &PaymentId,
) -> Result<Option<PaymentRecord>, PipelineError> {
    let row = sqlx::query_as::<_, PaymentRow>(
        r#"
        SELECT id, title, payment_id, email, amount, payment_date, product,
               payment_status, stripe_event_id, customer_id, invoice_pdf, created_at
        FROM payments
        WHERE payment_id = $1
        "#,
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(PaymentRecord::try_from).transpose()
}
