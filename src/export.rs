//! Export types for serializing knowledge base state.
//!
//! These types give a human-readable, name-resolved view of individuals,
//! facts, and parameter links suitable for JSON export.

use serde::{Deserialize, Serialize};

/// Exported individual with resolved names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualExport {
    /// Numeric individual ID.
    pub id: u64,
    /// Individual name (e.g. `DenseLayer`, `Dense__units`).
    pub name: String,
    /// Ontology class name.
    pub class: String,
    /// Creation timestamp (seconds since UNIX epoch).
    pub created_at: u64,
    /// Literal facts in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facts: Vec<FactExport>,
    /// Names of linked hyperparameters, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
}

/// Exported literal fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactExport {
    /// Property name (e.g. `hasMaxIntValue`).
    pub property: String,
    /// Literal value.
    pub value: crate::ontology::Literal,
}

/// Full knowledge base snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeExport {
    /// Individuals in creation order.
    pub individuals: Vec<IndividualExport>,
}
