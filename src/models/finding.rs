//! Finding schema
//!
//! The structured alert record emitted by detection rules. Downstream
//! consumers key on these exact fields, so the shape is stable: name,
//! description, alert id, severity, type, labels and string-only metadata.
//! Findings are immutable once constructed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Alert severity, serialized in the uppercase wire form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// Alert classification, serialized in the uppercase wire form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FindingType {
    Suspicious,
    Exploit,
    Info,
    Degraded,
}

/// What kind of on-chain entity a label points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Address,
    Transaction,
}

/// A labelled entity attached to a finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub entity_type: EntityType,
    /// Lower-case canonical address or transaction hash
    pub entity: String,
    pub label: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub remove: bool,
}

impl Label {
    pub fn address(entity: impl Into<String>, label: impl Into<String>, confidence: f64) -> Self {
        Self {
            entity_type: EntityType::Address,
            entity: entity.into(),
            label: label.into(),
            confidence,
            remove: false,
        }
    }

    pub fn transaction(
        entity: impl Into<String>,
        label: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            entity_type: EntityType::Transaction,
            entity: entity.into(),
            label: label.into(),
            confidence,
            remove: false,
        }
    }
}

/// A structured alert emitted by a detection rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub name: String,
    pub description: String,
    /// Stable per-rule identifier, e.g. "RUG-1"
    pub alert_id: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: FindingType,
    pub labels: Vec<Label>,
    /// All values serialized as strings; nested structures JSON-encoded
    pub metadata: BTreeMap<String, String>,
}

impl Finding {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        alert_id: impl Into<String>,
        severity: Severity,
        kind: FindingType,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            alert_id: alert_id.into(),
            severity,
            kind,
            labels: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach a non-string metadata value, JSON-encoded for transport uniformity
    pub fn with_json_metadata<T: Serialize>(self, key: impl Into<String>, value: &T) -> Self {
        let encoded = serde_json::to_string(value).unwrap_or_else(|_| "null".to_string());
        self.with_metadata(key, encoded)
    }
}
