use serde::{Deserialize, Serialize};

/// Вид изменения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// Событие изменения, рассылаемое подписчикам (WebSocket /api/live)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Имя коллекции: "data_type", "data_category", "data_entry"
    pub collection: String,
    pub kind: ChangeKind,
    pub id: String,
    /// Новое состояние записи; для удаления отсутствует
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl ChangeEvent {
    pub fn created<T: Serialize>(collection: &str, id: String, item: &T) -> Self {
        Self {
            collection: collection.to_string(),
            kind: ChangeKind::Created,
            id,
            payload: serde_json::to_value(item).ok(),
        }
    }

    pub fn updated<T: Serialize>(collection: &str, id: String, item: &T) -> Self {
        Self {
            collection: collection.to_string(),
            kind: ChangeKind::Updated,
            id,
            payload: serde_json::to_value(item).ok(),
        }
    }

    pub fn deleted(collection: &str, id: String) -> Self {
        Self {
            collection: collection.to_string(),
            kind: ChangeKind::Deleted,
            id,
            payload: None,
        }
    }

    /// Влияет ли изменение на данные графика
    pub fn affects_chart(&self) -> bool {
        matches!(
            self.collection.as_str(),
            "data_entry" | "data_category" | "data_type"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleted_event_wire_format() {
        let event = ChangeEvent::deleted("data_entry", "42".into());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "deleted");
        assert!(json.get("payload").is_none());
        assert!(event.affects_chart());
    }

    #[test]
    fn test_created_event_carries_payload() {
        let event = ChangeEvent::created("data_type", "1".into(), &serde_json::json!({"name": "Mood"}));
        assert_eq!(event.kind, ChangeKind::Created);
        assert_eq!(event.payload.unwrap()["name"], "Mood");
    }
}
