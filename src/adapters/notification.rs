use {
    crate::{
        adapters::{
            direct,
            stripe::event::{self, EventEnvelope, EventKind, EventObject},
        },
        domain::{error::PipelineError, payment::Inbound},
    },
    chrono::NaiveDate,
    serde_json::{Map, Value},
};

/// A parsed webhook body, before event-type dispatch.
#[derive(Debug)]
pub enum Notification {
    /// Provider envelope (`"object": "event"`).
    Provider {
        event_id: Option<String>,
        event_type: String,
        object: Value,
    },
    /// Flat payload. Unparseable bodies land here as an empty map.
    Direct(Map<String, Value>),
}

impl Notification {
    pub fn classify(body: &[u8]) -> Self {
        let map = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => {
                tracing::warn!(error = %e, "webhook body is not valid JSON, treating as empty payload");
                Map::new()
            }
        };

        if map.get("object").and_then(Value::as_str) != Some("event") {
            return Self::Direct(map);
        }

        let envelope = EventEnvelope::from_map(map);
        Self::Provider {
            event_id: envelope.id,
            event_type: envelope.event_type.unwrap_or_default(),
            object: envelope.data.unwrap_or_default().object,
        }
    }

    pub fn event_id(&self) -> Option<&str> {
        match self {
            Self::Provider { event_id, .. } => event_id.as_deref(),
            Self::Direct(_) => None,
        }
    }

    pub fn event_type(&self) -> &str {
        match self {
            Self::Provider { event_type, .. } => event_type,
            Self::Direct(_) => "direct",
        }
    }

    /// Dispatch on event type and extract a draft record.
    pub fn into_inbound(self, today: NaiveDate) -> Result<Inbound, PipelineError> {
        match self {
            Self::Provider {
                event_id,
                event_type,
                object,
            } => {
                let Some(kind) = EventKind::lookup(&event_type) else {
                    return Ok(Inbound::Unsupported { event_type });
                };
                let object = EventObject::parse(kind, object);
                Ok(Inbound::Draft(event::extract(event_id.as_deref(), &object, today)?))
            }
            Self::Direct(map) => Ok(Inbound::Draft(direct::extract(&map, today)?)),
        }
    }
}
