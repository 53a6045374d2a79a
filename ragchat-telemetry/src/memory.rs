use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{Level, Subscriber};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

/// A log event recorded by [`EventCapture`]
#[derive(Debug, Clone, Serialize)]
pub struct CapturedEvent {
    pub level: String,
    pub target: String,
    /// The event's `message` field, empty if it had none
    pub message: String,
    pub fields: HashMap<String, serde_json::Value>,
}

impl CapturedEvent {
    pub fn is_level(&self, level: Level) -> bool {
        self.level == level.as_str()
    }
}

/// A tracing layer that keeps every event in memory.
///
/// Cloning shares the underlying storage, so keep one clone to inspect after
/// handing the other to a subscriber.
#[derive(Debug, Clone, Default)]
pub struct EventCapture {
    events: Arc<RwLock<Vec<CapturedEvent>>>,
}

impl EventCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events captured so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.read().map(|events| events.clone()).unwrap_or_default()
    }

    /// Events at `level` whose message contains `needle`
    pub fn find(&self, level: Level, needle: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.is_level(level) && e.message.contains(needle))
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }
}

impl<S> Layer<S> for EventCapture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);
        let mut fields = visitor.0;

        let message = match fields.remove("message") {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let metadata = event.metadata();
        let captured = CapturedEvent {
            level: metadata.level().as_str().to_string(),
            target: metadata.target().to_string(),
            message,
            fields,
        };

        if let Ok(mut events) = self.events.write() {
            events.push(captured);
        }
    }
}

#[derive(Default)]
struct JsonVisitor(HashMap<String, serde_json::Value>);

impl tracing::field::Visit for JsonVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::Value::Bool(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn captures_events_with_fields() {
        let capture = EventCapture::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(result_count = 3u64, threshold = 0.5, "search completed");
            tracing::warn!(distance = 3.0, "distance outside cosine range");
        });

        let events = capture.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "search completed");
        assert_eq!(events[0].fields["result_count"], 3);
        assert_eq!(events[0].fields["threshold"], 0.5);
        assert!(events[1].is_level(Level::WARN));
        assert_eq!(capture.find(Level::WARN, "cosine range").len(), 1);
        assert!(capture.find(Level::ERROR, "cosine range").is_empty());

        capture.clear();
        assert!(capture.events().is_empty());
    }

    #[test]
    fn events_outside_the_subscriber_are_not_captured() {
        let capture = EventCapture::new();
        tracing::info!("nobody is listening");
        assert!(capture.events().is_empty());
    }
}
