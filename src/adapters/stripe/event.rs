use {
    crate::{
        adapters::sanitize,
        domain::{
            error::PipelineError,
            id::CustomerId,
            money::MoneyAmount,
            payment::{PaymentDraft, PaymentStatus},
        },
    },
    chrono::{DateTime, NaiveDate},
    serde::{Deserialize, Deserializer, de::DeserializeOwned},
    serde_json::{Map, Value},
    std::collections::HashMap,
};

/// Event types we record. Everything else is acknowledged and ignored.
pub const SUPPORTED_EVENTS: [(stripe::EventType, EventKind); 3] = [
    (stripe::EventType::InvoicePaymentSucceeded, EventKind::InvoicePaymentSucceeded),
    (stripe::EventType::ChargeSucceeded, EventKind::ChargeSucceeded),
    (stripe::EventType::PaymentIntentSucceeded, EventKind::PaymentIntentSucceeded),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Subscription payments.
    InvoicePaymentSucceeded,
    /// One-off charges; carries the billing email.
    ChargeSucceeded,
    /// One-off payments; may embed the charge list.
    PaymentIntentSucceeded,
}

impl EventKind {
    pub fn lookup(event_type: &str) -> Option<Self> {
        let event_type: stripe::EventType =
            serde_json::from_value(Value::String(event_type.to_owned())).ok()?;
        SUPPORTED_EVENTS
            .iter()
            .find(|(supported, _)| *supported == event_type)
            .map(|(_, kind)| *kind)
    }

    fn fallback_product(self) -> &'static str {
        match self {
            Self::InvoicePaymentSucceeded => "Subscription",
            Self::ChargeSucceeded | Self::PaymentIntentSucceeded => "Payment",
        }
    }
}

/// A field that fails to parse as `T` reads as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keeps the list entries that parse; anything but an array is empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[derive(Debug, Default, Deserialize)]
pub struct EventEnvelope {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>, // evt_xxx
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<EventData>,
}

impl EventEnvelope {
    /// Reads the envelope fields; ones with the wrong shape are left empty.
    pub fn from_map(map: Map<String, Value>) -> Self {
        serde_json::from_value(Value::Object(map)).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "unreadable event envelope");
            Self::default()
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub object: Value,
}

/// Either a bare customer id or an expanded customer object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CustomerRef {
    Id(String),
    Object(ExpandedCustomer),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpandedCustomer {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
}

impl CustomerRef {
    fn id(&self) -> Option<CustomerId> {
        match self {
            Self::Id(id) => CustomerId::parse(sanitize::text(id)),
            Self::Object(c) => c.id.as_deref().and_then(|id| CustomerId::parse(sanitize::text(id))),
        }
    }

    fn email(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Object(c) => c.email.as_deref(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BillingDetails {
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct List<T> {
    #[serde(default, deserialize_with = "lenient_list")]
    pub data: Vec<T>,
}

type Metadata = HashMap<String, Value>;

#[derive(Debug, Default, Deserialize)]
pub struct Charge {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub amount: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub created: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub receipt_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub customer: Option<CustomerRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<Metadata>,
    #[serde(default, deserialize_with = "lenient")]
    pub billing_details: Option<BillingDetails>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Price {
    #[serde(default, deserialize_with = "lenient")]
    pub nickname: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceLine {
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<Price>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Invoice {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub amount_paid: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub created: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub invoice_pdf: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub customer: Option<CustomerRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub customer_email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<Metadata>,
    #[serde(default, deserialize_with = "lenient")]
    pub lines: Option<List<InvoiceLine>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentIntent {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub amount: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub created: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub customer: Option<CustomerRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<Metadata>,
    #[serde(default, deserialize_with = "lenient")]
    pub charges: Option<List<Charge>>,
}

/// The event's `data.object`, typed by event kind.
#[derive(Debug)]
pub enum EventObject {
    Charge(Charge),
    Invoice(Invoice),
    PaymentIntent(PaymentIntent),
}

impl EventObject {
    /// Anything but a JSON object is read as an empty one.
    pub fn parse(kind: EventKind, object: Value) -> Self {
        let object = match object {
            Value::Object(map) => Value::Object(map),
            Value::Null => Value::Object(Map::new()),
            other => {
                tracing::warn!(object = %other, "event object is not a JSON object");
                Value::Object(Map::new())
            }
        };
        match kind {
            EventKind::ChargeSucceeded => Self::Charge(parse_or_empty(object)),
            EventKind::InvoicePaymentSucceeded => Self::Invoice(parse_or_empty(object)),
            EventKind::PaymentIntentSucceeded => Self::PaymentIntent(parse_or_empty(object)),
        }
    }
}

fn parse_or_empty<T: DeserializeOwned + Default>(object: Value) -> T {
    serde_json::from_value(object).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "unreadable event object");
        T::default()
    })
}

fn non_empty_text(raw: Option<&str>) -> Option<String> {
    raw.map(sanitize::text).filter(|s| !s.is_empty())
}

fn non_empty_email(raw: Option<&str>) -> Option<String> {
    raw.map(sanitize::email).filter(|s| !s.is_empty())
}

fn metadata_product(metadata: Option<&Metadata>) -> Option<&str> {
    metadata?.get("product_name")?.as_str()
}

fn amount_from_minor(amount: Option<i64>) -> Result<MoneyAmount, PipelineError> {
    amount.map_or(Ok(MoneyAmount::zero()), MoneyAmount::new)
}

fn date_from_unix(ts: Option<i64>, today: NaiveDate) -> NaiveDate {
    ts.and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.date_naive())
        .unwrap_or(today)
}

fn product_label(kind: EventKind, candidates: &[Option<&str>]) -> String {
    candidates
        .iter()
        .find_map(|c| non_empty_text(*c))
        .unwrap_or_else(|| kind.fallback_product().to_string())
}

/// Pull a draft record out of an accepted provider event.
pub fn extract(
    event_id: Option<&str>,
    object: &EventObject,
    today: NaiveDate,
) -> Result<PaymentDraft, PipelineError> {
    let stripe_event_id = non_empty_text(event_id);

    let draft = match object {
        EventObject::Charge(ch) => PaymentDraft {
            payment_id: non_empty_text(ch.id.as_deref()).unwrap_or_default(),
            email: non_empty_email(
                ch.billing_details.as_ref().and_then(|b| b.email.as_deref()),
            )
            .or_else(|| non_empty_email(ch.customer.as_ref().and_then(CustomerRef::email)))
            .unwrap_or_default(),
            amount: amount_from_minor(ch.amount)?.to_major(),
            payment_date: date_from_unix(ch.created, today),
            product: product_label(
                EventKind::ChargeSucceeded,
                &[ch.description.as_deref(), metadata_product(ch.metadata.as_ref())],
            ),
            payment_status: PaymentStatus::from_provider(ch.status.as_deref()),
            stripe_event_id,
            customer_id: ch.customer.as_ref().and_then(CustomerRef::id),
            invoice_pdf: ch.receipt_url.as_deref().map(sanitize::url),
        },
        EventObject::Invoice(inv) => {
            let first_line = inv.lines.as_ref().and_then(|l| l.data.first());
            PaymentDraft {
                payment_id: non_empty_text(inv.id.as_deref()).unwrap_or_default(),
                email: non_empty_email(inv.customer_email.as_deref())
                    .or_else(|| {
                        non_empty_email(inv.customer.as_ref().and_then(CustomerRef::email))
                    })
                    .unwrap_or_default(),
                amount: amount_from_minor(inv.amount_paid)?.to_major(),
                payment_date: date_from_unix(inv.created, today),
                product: product_label(
                    EventKind::InvoicePaymentSucceeded,
                    &[
                        inv.description.as_deref(),
                        metadata_product(inv.metadata.as_ref()),
                        first_line
                            .and_then(|l| l.price.as_ref())
                            .and_then(|p| p.nickname.as_deref()),
                        first_line.and_then(|l| l.description.as_deref()),
                    ],
                ),
                payment_status: PaymentStatus::from_provider(inv.status.as_deref()),
                stripe_event_id,
                customer_id: inv.customer.as_ref().and_then(CustomerRef::id),
                invoice_pdf: inv.invoice_pdf.as_deref().map(sanitize::url),
            }
        }
        EventObject::PaymentIntent(pi) => {
            let charge_email = pi
                .charges
                .as_ref()
                .and_then(|c| c.data.first())
                .and_then(|c| c.billing_details.as_ref())
                .and_then(|b| b.email.as_deref());
            PaymentDraft {
                payment_id: non_empty_text(pi.id.as_deref()).unwrap_or_default(),
                email: non_empty_email(charge_email)
                    .or_else(|| non_empty_email(pi.customer.as_ref().and_then(CustomerRef::email)))
                    .unwrap_or_default(),
                amount: amount_from_minor(pi.amount)?.to_major(),
                payment_date: date_from_unix(pi.created, today),
                product: product_label(
                    EventKind::PaymentIntentSucceeded,
                    &[pi.description.as_deref(), metadata_product(pi.metadata.as_ref())],
                ),
                payment_status: PaymentStatus::from_provider(pi.status.as_deref()),
                stripe_event_id,
                customer_id: pi.customer.as_ref().and_then(CustomerRef::id),
                invoice_pdf: None,
            }
        }
    };

    Ok(draft)
}
