//! Synthetic behavior analysis.
//!
//! Stands in for a hosted inference endpoint. Outputs are fabricated from
//! fixed baselines with light randomization so responses vary between calls
//! without any model behind them.

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;

use crate::models::UserBehavior;

/// Segment analysis result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentAnalysis {
    pub user_id: Option<String>,
    pub segment: String,
    pub confidence: f64,
    pub metrics: BTreeMap<String, f64>,
    pub predictions: BTreeMap<String, f64>,
}

/// Category preference scores for one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencePrediction {
    pub user_id: String,
    pub preferences: BTreeMap<String, f64>,
}

/// Recommended product ids for one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub user_id: String,
    pub product_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisService;

impl AnalysisService {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Category affinity scores, jittered around fixed baselines and
    /// clamped to `[0, 1]`.
    #[must_use]
    pub fn predict_user_preferences(
        &self,
        user_id: &str,
        _behavior: &UserBehavior,
    ) -> PreferencePrediction {
        let mut rng = rand::rng();
        let mut preferences = BTreeMap::new();
        for (category, base) in [
            ("ELECTRONICS", 0.85),
            ("BOOKS", 0.65),
            ("CLOTHING", 0.45),
            ("HOME", 0.35),
        ] {
            let jitter: f64 = rng.random_range(-0.05..=0.05);
            preferences.insert(category.to_owned(), (base + jitter).clamp(0.0, 1.0));
        }
        PreferencePrediction {
            user_id: user_id.to_owned(),
            preferences,
        }
    }

    /// Five synthetic product ids.
    #[must_use]
    pub fn get_product_recommendations(
        &self,
        user_id: &str,
        _behavior: &UserBehavior,
    ) -> Recommendations {
        let mut rng = rand::rng();
        let product_ids = (0..5)
            .map(|_| format!("PROD_{}", rng.random_range(0..1000)))
            .collect();
        Recommendations {
            user_id: user_id.to_owned(),
            product_ids,
        }
    }

    /// A canned segment with jittered confidence and metrics.
    #[must_use]
    pub fn analyze_user_segment(&self, behavior: &UserBehavior) -> SegmentAnalysis {
        let mut rng = rand::rng();
        let mut metrics = BTreeMap::new();
        metrics.insert("purchaseFrequency".to_owned(), rng.random_range(0.0..10.0));
        metrics.insert("avgOrderValue".to_owned(), rng.random_range(20.0..200.0));
        metrics.insert("engagementScore".to_owned(), rng.random_range(0.0..1.0));

        let mut predictions = BTreeMap::new();
        predictions.insert("churnRisk".to_owned(), rng.random_range(0.0..1.0));
        predictions.insert("upsellProbability".to_owned(), rng.random_range(0.0..1.0));

        SegmentAnalysis {
            user_id: behavior.user_id.clone(),
            segment: "HIGH_VALUE_CUSTOMER".to_owned(),
            confidence: 0.15_f64.mul_add(rng.random_range(0.0..1.0), 0.85),
            metrics,
            predictions,
        }
    }
}
