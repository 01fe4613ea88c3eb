use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entry::FieldMap;
use crate::level::Level;

use super::{Hook, HookError};

/// Destination for republished [`Track`](Level::Track) events. Returns the
/// bus-assigned event id.
pub trait Publisher: Send + Sync {
    fn publish(
        &self,
        event: &BusEvent,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

/// Identity of the publishing service inside a bus event.
#[derive(Debug, Clone, Serialize)]
pub struct Emitter {
    pub system: String,
    pub component: String,
}

/// The wire shape handed to a [`Publisher`].
#[derive(Debug, Clone, Serialize)]
pub struct BusEvent {
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub emitter: Emitter,
    pub emit_timestamp: DateTime<Utc>,
    pub name: String,
    pub keys: FieldMap,
    pub data: FieldMap,
}

/// Republishes audit events to an external event bus.
///
/// Only [`Track`](Level::Track) events are forwarded; everything else is
/// ignored. Fields whose key ends in `_id` go into the event's `keys` bag,
/// the rest into `data`. A two-segment dotted message (`component.event`)
/// is split: the first segment becomes the emitter component and the second
/// the event name.
pub struct BusHook {
    publisher: Box<dyn Publisher>,
    system: String,
    version: String,
}

impl BusHook {
    pub fn new<P: Publisher + 'static>(
        publisher: P,
        system: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            publisher: Box::new(publisher),
            system: system.into(),
            version: version.into(),
        }
    }
}

impl Hook for BusHook {
    fn write(&self, level: Level, message: &str, fields: &FieldMap) -> Result<(), HookError> {
        if level != Level::Track {
            return Ok(());
        }

        let mut keys = FieldMap::new();
        let mut data = FieldMap::new();
        for (key, value) in fields {
            if key.ends_with("_id") {
                keys.insert(key.clone(), value.clone());
            } else {
                data.insert(key.clone(), value.clone());
            }
        }

        let mut component = String::new();
        let mut name = message.to_string();
        let parts: Vec<&str> = message.split('.').collect();
        if parts.len() == 2 {
            component = parts[0].to_string();
            name = parts[1].to_string();
        }

        let event = BusEvent {
            version: self.version.clone(),
            kind: "system".into(),
            emitter: Emitter {
                system: self.system.clone(),
                component,
            },
            emit_timestamp: Utc::now(),
            name,
            keys,
            data,
        };

        self.publisher
            .publish(&event)
            .map(|_| ())
            .map_err(HookError::Publish)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingPublisher {
        events: Arc<Mutex<Vec<BusEvent>>>,
    }

    impl Publisher for RecordingPublisher {
        fn publish(
            &self,
            event: &BusEvent,
        ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            self.events.lock().unwrap().push(event.clone());
            Ok("evt-1".into())
        }
    }

    struct RefusingPublisher;

    impl Publisher for RefusingPublisher {
        fn publish(
            &self,
            _event: &BusEvent,
        ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            Err("bus unreachable".into())
        }
    }

    fn tracked(publisher: RecordingPublisher, message: &str, fields: FieldMap) -> BusEvent {
        let hook = BusHook::new(publisher.clone(), "billing", "1.1");
        hook.write(Level::Track, message, &fields).unwrap();
        let events = publisher.events.lock().unwrap();
        events[0].clone()
    }

    #[test]
    fn test_only_track_is_forwarded() {
        let publisher = RecordingPublisher::default();
        let hook = BusHook::new(publisher.clone(), "billing", "1.1");

        for level in [Level::Debug, Level::Info, Level::Warn, Level::Error] {
            hook.write(level, "ignored", &FieldMap::new()).unwrap();
        }
        assert!(publisher.events.lock().unwrap().is_empty());

        hook.write(Level::Track, "kept", &FieldMap::new()).unwrap();
        assert_eq!(publisher.events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_id_fields_split_into_keys() {
        let mut fields = FieldMap::new();
        fields.insert("user_id".into(), json!("u-9"));
        fields.insert("invoice_id".into(), json!(204));
        fields.insert("amount".into(), json!(19.5));

        let event = tracked(RecordingPublisher::default(), "paid", fields);
        assert_eq!(event.keys["user_id"], "u-9");
        assert_eq!(event.keys["invoice_id"], 204);
        assert_eq!(event.data["amount"], 19.5);
        assert!(!event.data.contains_key("user_id"));
    }

    #[test]
    fn test_two_segment_name_split() {
        let event = tracked(
            RecordingPublisher::default(),
            "invoices.paid",
            FieldMap::new(),
        );
        assert_eq!(event.emitter.component, "invoices");
        assert_eq!(event.name, "paid");
    }

    #[test]
    fn test_other_name_shapes_unchanged() {
        let event = tracked(RecordingPublisher::default(), "paid", FieldMap::new());
        assert_eq!(event.emitter.component, "");
        assert_eq!(event.name, "paid");

        let event = tracked(RecordingPublisher::default(), "a.b.c", FieldMap::new());
        assert_eq!(event.emitter.component, "");
        assert_eq!(event.name, "a.b.c");
    }

    #[test]
    fn test_wire_schema() {
        let event = tracked(RecordingPublisher::default(), "invoices.paid", FieldMap::new());
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["version"], "1.1");
        assert_eq!(value["type"], "system");
        assert_eq!(value["emitter"]["system"], "billing");
        assert_eq!(value["emitter"]["component"], "invoices");
        assert!(value["emit_timestamp"].is_string());
        assert_eq!(value["name"], "paid");
        assert!(value["keys"].is_object());
        assert!(value["data"].is_object());
    }

    #[test]
    fn test_publisher_failure_surfaces_as_hook_error() {
        let hook = BusHook::new(RefusingPublisher, "billing", "1.1");
        let err = hook
            .write(Level::Track, "paid", &FieldMap::new())
            .unwrap_err();
        assert!(matches!(err, HookError::Publish(_)));
    }
}
