use {
    super::error::PipelineError,
    super::id::{CustomerId, PaymentId},
    super::money::MajorAmount,
    chrono::{DateTime, NaiveDate, Utc},
    serde::{Deserialize, Serialize},
    std::fmt,
    uuid::Uuid,
};

/// Display format for `payment_date` (day/month/year).
pub const PAYMENT_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Paid,
    Pending,
    Failed,
    Refunded,
    Canceled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Pending => "pending",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
            Self::Canceled => "canceled",
        }
    }

    /// Maps a provider status string onto the record status. Missing or
    /// unrecognized values fall back to `Paid`.
    pub fn from_provider(status: Option<&str>) -> Self {
        let Some(raw) = status.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Paid;
        };
        match raw.to_ascii_lowercase().as_str() {
            "paid" | "succeeded" => Self::Paid,
            "pending" | "processing" | "open" | "draft" => Self::Pending,
            s if s.starts_with("requires_") => Self::Pending,
            "failed" | "uncollectible" => Self::Failed,
            "refunded" => Self::Refunded,
            "canceled" | "cancelled" | "void" => Self::Canceled,
            other => {
                tracing::warn!(status = other, "unknown payment status, defaulting to paid");
                Self::Paid
            }
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = PipelineError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "paid" => Ok(Self::Paid),
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            "canceled" => Ok(Self::Canceled),
            other => Err(PipelineError::Validation(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

mod display_date {
    use {
        super::PAYMENT_DATE_FORMAT,
        chrono::NaiveDate,
        serde::{Deserialize, Deserializer, Serializer, de::Error},
    };

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format(PAYMENT_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDate::parse_from_str(&raw, PAYMENT_DATE_FORMAT).map_err(D::Error::custom)
    }
}

/// Stored payment record (for reads).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub title: String,
    pub payment_id: PaymentId,
    pub email: String,
    pub amount: MajorAmount,
    #[serde(with = "display_date")]
    pub payment_date: NaiveDate,
    pub product: String,
    pub payment_status: PaymentStatus,
    pub stripe_event_id: Option<String>,
    pub customer_id: Option<CustomerId>,
    pub invoice_pdf: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewPaymentParams {
    pub payment_id: PaymentId,
    pub email: String,
    pub amount: MajorAmount,
    pub payment_date: NaiveDate,
    pub product: String,
    pub payment_status: PaymentStatus,
    pub stripe_event_id: Option<String>,
    pub customer_id: Option<CustomerId>,
    pub invoice_pdf: Option<String>,
}

/// For INSERT. The id is generated in Rust via Uuid::now_v7().
#[derive(Debug, Clone)]
pub struct NewPaymentRecord {
    id: Uuid,
    title: String,
    payment_id: PaymentId,
    email: String,
    amount: MajorAmount,
    payment_date: NaiveDate,
    product: String,
    payment_status: PaymentStatus,
    stripe_event_id: Option<String>,
    customer_id: Option<CustomerId>,
    invoice_pdf: Option<String>,
}

impl NewPaymentRecord {
    pub fn new(p: NewPaymentParams) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: format!("{} - {}", p.product, p.payment_id),
            payment_id: p.payment_id,
            email: p.email,
            amount: p.amount,
            payment_date: p.payment_date,
            product: p.product,
            payment_status: p.payment_status,
            stripe_event_id: p.stripe_event_id.filter(|s| !s.is_empty()),
            customer_id: p.customer_id,
            invoice_pdf: p.invoice_pdf.filter(|s| !s.is_empty()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn payment_id(&self) -> &PaymentId {
        &self.payment_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn amount(&self) -> MajorAmount {
        self.amount
    }

    pub fn payment_date(&self) -> NaiveDate {
        self.payment_date
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn stripe_event_id(&self) -> Option<&str> {
        self.stripe_event_id.as_deref()
    }

    pub fn customer_id(&self) -> Option<&CustomerId> {
        self.customer_id.as_ref()
    }

    pub fn invoice_pdf(&self) -> Option<&str> {
        self.invoice_pdf.as_deref()
    }

    pub fn into_record(self, created_at: DateTime<Utc>) -> PaymentRecord {
        PaymentRecord {
            id: self.id,
            title: self.title,
            payment_id: self.payment_id,
            email: self.email,
            amount: self.amount,
            payment_date: self.payment_date,
            product: self.product,
            payment_status: self.payment_status,
            stripe_event_id: self.stripe_event_id,
            customer_id: self.customer_id,
            invoice_pdf: self.invoice_pdf,
            created_at,
        }
    }
}

/// Fields pulled out of an inbound notification, before the payment_id
/// precondition and enrichment have run.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDraft {
    pub payment_id: String,
    pub email: String,
    pub amount: MajorAmount,
    pub payment_date: NaiveDate,
    pub product: String,
    pub payment_status: PaymentStatus,
    pub stripe_event_id: Option<String>,
    pub customer_id: Option<CustomerId>,
    pub invoice_pdf: Option<String>,
}

impl PaymentDraft {
    pub fn into_new_record(self) -> Result<NewPaymentRecord, PipelineError> {
        Ok(NewPaymentRecord::new(NewPaymentParams {
            payment_id: PaymentId::new(self.payment_id)?,
            email: self.email,
            amount: self.amount,
            payment_date: self.payment_date,
            product: self.product,
            payment_status: self.payment_status,
            stripe_event_id: self.stripe_event_id,
            customer_id: self.customer_id,
            invoice_pdf: self.invoice_pdf,
        }))
    }
}

/// What the webhook adapter hands to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Provider event outside the accepted set; acknowledged, not recorded.
    Unsupported { event_type: String },
    Draft(PaymentDraft),
}

/// Result of the store's atomic insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created(Uuid),
    /// A record with this payment_id already existed; nothing was written.
    Existing(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// Provider event type outside the accepted set.
    Ignored { event_type: String },
    /// New record stored.
    Created { id: Uuid, has_email: bool },
    /// payment_id already recorded (duplicate delivery).
    Duplicate(Uuid),
}
