//! Domain definitions for health-impact inference: the feature schema, the
//! class table and the shapes handed between validation and the responder.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Model inputs in training order.
pub const FEATURE_SCHEMA: [&str; 10] = [
    "AQI",
    "PM10",
    "PM2_5",
    "NO2",
    "SO2",
    "O3",
    "Temperature",
    "Humidity",
    "WindSpeed",
    "HospitalAdmissions",
];

pub const NUM_MODEL_FEATURES: usize = FEATURE_SCHEMA.len();

/// Accepted but not fed to the model; filled with 0.0 when absent.
pub const DEFAULTABLE_FEATURES: [&str; 2] = ["RespiratoryCases", "CardiovascularCases"];

pub const DEFAULT_FEATURE_VALUE: f64 = 0.0;

/// Used when the classifier exposes no probability estimate.
pub const FALLBACK_CONFIDENCE: f64 = 85.0;

/// Every accepted field: the schema first, then the defaultable fields.
pub fn accepted_fields() -> impl Iterator<Item = &'static str> {
    FEATURE_SCHEMA
        .iter()
        .chain(DEFAULTABLE_FEATURES.iter())
        .copied()
}

/// Severity label and advice for one class index.
#[derive(Copy, Clone, Debug)]
pub struct ClassInfo {
    pub label: &'static str,
    pub recommendations: &'static [&'static str],
}

pub const UNKNOWN_CLASS: ClassInfo = ClassInfo {
    label: "Unknown",
    recommendations: &[],
};

/// Indexed by class: 0 is the most severe impact, 4 the mildest.
pub const CLASS_TABLE: [ClassInfo; 5] = [
    ClassInfo {
        label: "Very High",
        recommendations: &[
            "Immediate medical evaluation recommended",
            "Evacuate to areas with clean air if possible",
            "Use N95/KN95 masks at all times outdoors",
            "Monitor vital signs closely",
            "Prepare emergency medical supplies",
            "Follow emergency evacuation procedures",
        ],
    },
    ClassInfo {
        label: "High",
        recommendations: &[
            "Seek medical advice for vulnerable individuals",
            "Avoid all outdoor activities",
            "Use air purifiers indoors",
            "Wear N95 masks for any outdoor exposure",
            "Monitor symptoms daily",
            "Keep emergency contacts readily available",
        ],
    },
    ClassInfo {
        label: "Moderate",
        recommendations: &[
            "Limit outdoor activities to essential only",
            "Vulnerable groups should stay indoors",
            "Consider wearing masks outdoors",
            "Use air purifiers if available",
            "Monitor air quality updates regularly",
            "Keep windows closed during peak pollution hours",
        ],
    },
    ClassInfo {
        label: "Low",
        recommendations: &[
            "Sensitive groups should consider limiting prolonged outdoor exertion",
            "Monitor air quality if you have respiratory conditions",
            "Normal activities for general population",
            "Good ventilation recommended",
            "Stay hydrated and maintain healthy practices",
        ],
    },
    ClassInfo {
        label: "Very Low",
        recommendations: &[
            "Air quality is good for all outdoor activities",
            "Excellent time for exercise and recreation",
            "No restrictions necessary",
            "Maintain routine health practices",
            "Enjoy outdoor activities freely",
        ],
    },
];

/// Look up a class index, degrading to `Unknown` for anything outside the table.
pub fn class_info(class: i64) -> ClassInfo {
    usize::try_from(class)
        .ok()
        .and_then(|idx| CLASS_TABLE.get(idx))
        .copied()
        .unwrap_or(UNKNOWN_CLASS)
}

/// Ordered name/value pairs, serialized as a JSON object in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureSet {
    entries: Vec<(&'static str, f64)>,
}

impl FeatureSet {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            entries: Vec::with_capacity(cap),
        }
    }

    pub fn push(&mut self, name: &'static str, value: f64) {
        self.entries.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl Serialize for FeatureSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Output of validation: the fixed-width model input plus every coerced field.
#[derive(Clone, Debug, PartialEq)]
pub struct AssembledFeatures {
    pub model_vector: [f64; NUM_MODEL_FEATURES],
    pub full_features: FeatureSet,
}

/// Response bundle for a successful prediction.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PredictionResult {
    pub success: bool,
    pub health_impact_class: i64,
    pub class_label: &'static str,
    pub confidence: f64,
    pub recommendations: &'static [&'static str],
    pub input_features: FeatureSet,
    pub latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_class_has_label_and_advice() {
        for (idx, info) in CLASS_TABLE.iter().enumerate() {
            assert!(!info.label.is_empty(), "class {idx} has no label");
            assert!(!info.recommendations.is_empty(), "class {idx} has no advice");
        }
        assert_eq!(class_info(0).label, "Very High");
        assert_eq!(class_info(4).label, "Very Low");
    }

    #[test]
    fn unknown_class_degrades() {
        for class in [-1, 5, 42, i64::MAX, i64::MIN] {
            let info = class_info(class);
            assert_eq!(info.label, "Unknown");
            assert!(info.recommendations.is_empty());
        }
    }

    #[test]
    fn accepted_fields_put_schema_first() {
        let fields: Vec<_> = accepted_fields().collect();
        assert_eq!(fields.len(), 12);
        assert_eq!(&fields[..NUM_MODEL_FEATURES], &FEATURE_SCHEMA[..]);
        assert_eq!(&fields[NUM_MODEL_FEATURES..], &DEFAULTABLE_FEATURES[..]);
    }

    #[test]
    fn feature_set_serializes_in_insertion_order() {
        let mut set = FeatureSet::default();
        set.push("PM10", 2.0);
        set.push("AQI", 1.5);
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"{"PM10":2.0,"AQI":1.5}"#
        );
        assert_eq!(set.get("AQI"), Some(1.5));
        assert_eq!(set.get("O3"), None);
    }
}
