//! Parent-mapping table: component name pattern → extra adapter bases.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CodegenError, CodegenResult};

/// Bases every adapter carries, in this order.
pub const UNIVERSAL_BASES: [&str; 2] = ["BaseObject", "LayerWrapper"];

/// One row of the table as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentMappingConfig {
    pub pattern: String,
    pub bases: Vec<String>,
}

impl ParentMappingConfig {
    pub fn new(pattern: &str, bases: &[&str]) -> Self {
        Self {
            pattern: pattern.to_string(),
            bases: bases.iter().map(|b| b.to_string()).collect(),
        }
    }
}

/// The table shipped by default.
pub fn default_parent_mappings() -> Vec<ParentMappingConfig> {
    vec![
        ParentMappingConfig::new("Bert", &["NnPreprocessor"]),
        ParentMappingConfig::new(
            "Dense",
            &[
                "NnPreprocessor",
                "NnReduction",
                "NnAbstractFeatures",
                "ComposeClassifier",
            ],
        ),
        ParentMappingConfig::new("Softmax", &["NnClassifier"]),
        ParentMappingConfig::new("Conv", &["NnReduction"]),
    ]
}

#[derive(Debug, Clone)]
struct ParentMapping {
    pattern: Regex,
    bases: Vec<String>,
}

/// Ordered pattern table. The first pattern matching at the start of a
/// component name decides its extra bases.
#[derive(Debug, Clone, Default)]
pub struct ParentMappings {
    entries: Vec<ParentMapping>,
}

impl ParentMappings {
    /// Compile a table. Patterns are anchored at the start of the name.
    pub fn compile(rows: &[ParentMappingConfig]) -> CodegenResult<Self> {
        let entries = rows
            .iter()
            .map(|row| {
                let pattern = Regex::new(&format!("^(?:{})", row.pattern)).map_err(|e| {
                    CodegenError::InvalidPattern {
                        pattern: row.pattern.clone(),
                        message: e.to_string(),
                    }
                })?;
                Ok(ParentMapping {
                    pattern,
                    bases: row.bases.clone(),
                })
            })
            .collect::<CodegenResult<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Extra bases for `name` from the first matching row, if any.
    pub fn matched(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.pattern.is_match(name))
            .map(|e| e.bases.as_slice())
    }

    /// Full base list: the universal bases, then the first match's bases.
    pub fn resolve(&self, name: &str) -> Vec<String> {
        let mut bases: Vec<String> = UNIVERSAL_BASES.iter().map(|b| b.to_string()).collect();
        for base in self.matched(name).unwrap_or_default() {
            if !bases.contains(base) {
                bases.push(base.clone());
            }
        }
        bases
    }
}
