//! Shared record metadata: identity, audit stamps, optimistic-lock version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata embedded (flattened) into every persisted record.
///
/// The audit fields are stamped by [`Meta::stamp`] on each save path with an
/// explicit actor, rather than read from any ambient request context. The
/// `version` counter is managed by the store: `None` means the record has
/// never been persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Record key. Assigned by the save path when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Entity discriminator (e.g. `"PRODUCT"`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    /// Optimistic concurrency counter, incremented by the store per write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

impl Meta {
    /// Stamp audit fields before a write.
    ///
    /// Sets `createdAt`/`createdBy` only on first write, and always refreshes
    /// `updatedAt`/`updatedBy` with the given actor and the current time.
    pub fn stamp(&mut self, kind: &str, actor: &str) {
        let now = Utc::now();
        if self.kind.is_none() {
            self.kind = Some(kind.to_owned());
        }
        if self.created_at.is_none() {
            self.created_at = Some(now);
        }
        self.updated_at = Some(now);
        if self.created_by.is_none() {
            self.created_by = Some(actor.to_owned());
        }
        self.updated_by = Some(actor.to_owned());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_first_write_sets_created_fields() {
        let mut meta = Meta::default();
        meta.stamp("PRODUCT", "alice");

        assert_eq!(meta.kind.as_deref(), Some("PRODUCT"));
        assert!(meta.created_at.is_some());
        assert_eq!(meta.created_at, meta.updated_at);
        assert_eq!(meta.created_by.as_deref(), Some("alice"));
        assert_eq!(meta.updated_by.as_deref(), Some("alice"));
    }

    #[test]
    fn test_stamp_later_write_preserves_created_fields() {
        let mut meta = Meta::default();
        meta.stamp("PRODUCT", "alice");
        let created_at = meta.created_at;

        meta.stamp("PRODUCT", "bob");

        assert_eq!(meta.created_at, created_at);
        assert_eq!(meta.created_by.as_deref(), Some("alice"));
        assert_eq!(meta.updated_by.as_deref(), Some("bob"));
        assert!(meta.updated_at >= created_at);
    }

    #[test]
    fn test_serde_shape() {
        let meta = Meta {
            id: Some("P1".into()),
            kind: Some("PRODUCT".into()),
            version: Some(3),
            ..Meta::default()
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["id"], "P1");
        assert_eq!(value["type"], "PRODUCT");
        assert_eq!(value["version"], 3);
        // Unset audit fields are omitted entirely.
        assert!(value.get("createdAt").is_none());
    }
}
