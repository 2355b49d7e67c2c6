//! Browsing and purchase history fed into the analysis endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A snapshot of one user's interactions with the catalog.
///
/// This is a request payload rather than a stored entity; callers assemble
/// it client-side and post it to the analysis routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBehavior {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub viewed_products: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub purchased_products: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub category_views: BTreeMap<String, i32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub price_range_preferences: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_queries: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_from_sparse_payload() {
        let behavior: UserBehavior =
            serde_json::from_str(r#"{"userId":"u-1","categoryViews":{"ELECTRONICS":4}}"#).unwrap();

        assert_eq!(behavior.user_id.as_deref(), Some("u-1"));
        assert_eq!(behavior.category_views.get("ELECTRONICS"), Some(&4));
        assert!(behavior.viewed_products.is_empty());
    }
}
