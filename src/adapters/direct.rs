//! Flat, non-provider payloads used for manual submissions and testing.

use {
    crate::{
        adapters::sanitize,
        domain::{
            error::PipelineError,
            id::CustomerId,
            money::MajorAmount,
            payment::{PAYMENT_DATE_FORMAT, PaymentDraft, PaymentStatus},
        },
    },
    chrono::NaiveDate,
    rust_decimal::Decimal,
    serde_json::{Map, Value},
    std::str::FromStr,
};

/// Scalar value under `key` as a string. Numbers and booleans are rendered.
fn scalar<'a>(map: &'a Map<String, Value>, key: &str) -> Option<std::borrow::Cow<'a, str>> {
    match map.get(key)? {
        Value::String(s) => Some(s.as_str().into()),
        Value::Number(n) => Some(n.to_string().into()),
        Value::Bool(b) => Some(b.to_string().into()),
        _ => None,
    }
}

fn text(map: &Map<String, Value>, key: &str) -> String {
    scalar(map, key).map(|s| sanitize::text(&s)).unwrap_or_default()
}

fn amount(map: &Map<String, Value>) -> Result<MajorAmount, PipelineError> {
    let Some(raw) = scalar(map, "amount") else {
        return Ok(MajorAmount::zero());
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(MajorAmount::zero());
    }
    match Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)) {
        Ok(value) => MajorAmount::new(value),
        Err(_) => {
            tracing::warn!(amount = raw, "amount is not a number, using 0");
            Ok(MajorAmount::zero())
        }
    }
}

/// `dd/mm/YYYY` or ISO `YYYY-MM-DD`; anything else is today.
fn payment_date(raw: &str, today: NaiveDate) -> NaiveDate {
    NaiveDate::parse_from_str(raw, PAYMENT_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .unwrap_or_else(|_| {
            if !raw.is_empty() {
                tracing::warn!(payment_date = raw, "unparseable payment_date, using today");
            }
            today
        })
}

pub fn extract(map: &Map<String, Value>, today: NaiveDate) -> Result<PaymentDraft, PipelineError> {
    let status = scalar(map, "payment_status");

    Ok(PaymentDraft {
        payment_id: text(map, "payment_id"),
        email: scalar(map, "email").map(|s| sanitize::email(&s)).unwrap_or_default(),
        amount: amount(map)?,
        payment_date: payment_date(&text(map, "payment_date"), today),
        product: text(map, "product"),
        payment_status: PaymentStatus::from_provider(status.as_deref()),
        stripe_event_id: None,
        customer_id: CustomerId::parse(text(map, "customer_id")),
        invoice_pdf: scalar(map, "invoice_pdf").map(|s| sanitize::url(&s)),
    })
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn reads_every_field_by_name() {
        let d = extract(
            &map(json!({
                "payment_id": "manual_1",
                "email": "a@b.com",
                "amount": 12.5,
                "payment_date": "02/03/2024",
                "product": "Consulting",
                "customer_id": "cus_7",
                "payment_status": "pending",
                "invoice_pdf": "https://example.com/invoice.pdf"
            })),
            today(),
        )
        .unwrap();

        assert_eq!(d.payment_id, "manual_1");
        assert_eq!(d.email, "a@b.com");
        assert_eq!(d.amount.to_string(), "12.50");
        assert_eq!(d.payment_date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(d.product, "Consulting");
        assert_eq!(d.customer_id.unwrap().as_str(), "cus_7");
        assert_eq!(d.payment_status, PaymentStatus::Pending);
        assert_eq!(d.invoice_pdf.as_deref(), Some("https://example.com/invoice.pdf"));
        assert!(d.stripe_event_id.is_none());
    }

    #[test]
    fn empty_map_defaults() {
        let d = extract(&Map::new(), today()).unwrap();
        assert!(d.payment_id.is_empty());
        assert!(d.email.is_empty());
        assert_eq!(d.amount.to_string(), "0.00");
        assert_eq!(d.payment_date, today());
        assert_eq!(d.payment_status, PaymentStatus::Paid);
        assert!(d.customer_id.is_none());
    }

    #[test]
    fn numeric_strings_and_ids() {
        let d = extract(
            &map(json!({"payment_id": 42, "amount": "19.99", "payment_date": "2024-12-31"})),
            today(),
        )
        .unwrap();
        assert_eq!(d.payment_id, "42");
        assert_eq!(d.amount.to_string(), "19.99");
        assert_eq!(d.payment_date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn garbage_date_is_today() {
        let d = extract(&map(json!({"payment_date": "yesterday-ish"})), today()).unwrap();
        assert_eq!(d.payment_date, today());
    }

    #[test]
    fn unreadable_amount_is_zero() {
        for raw in [json!("abc"), json!("n/a"), json!({"value": 5}), json!(null)] {
            let d = extract(&map(json!({"payment_id": "m_1", "amount": raw})), today()).unwrap();
            assert_eq!(d.amount.to_string(), "0.00");
        }
    }

    #[test]
    fn negative_amount_rejected() {
        assert!(matches!(
            extract(&map(json!({"amount": -3})), today()),
            Err(PipelineError::Validation(_))
        ));
        assert!(extract(&map(json!({"amount": "-0.01"})), today()).is_err());
    }
}
