//! Pipeline configuration, persisted as TOML.
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! stock pipeline: default exclusions, the `[1.33, 32]` grid, a `[1]` input
//! shape, and the shipped parent-mapping table.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::DEFAULT_EXCLUSIONS;
use crate::codegen::CodegenConfig;
use crate::component::ProbeInput;
use crate::metadata::{RangePolicy, Scalar};
use crate::probe::DEFAULT_GRID;

/// Errors from loading configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(layerscope::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(layerscope::config::parse),
        help(
            "Check the TOML syntax. Grid values must be numbers; `32` is an integer, \
             `32.0` is real."
        )
    )]
    Parse { path: String, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerscopeConfig {
    /// Library members never admitted into the catalog.
    #[serde(default = "default_exclusions")]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub codegen: CodegenConfig,
    #[serde(default)]
    pub ontology: OntologyConfig,
}

fn default_exclusions() -> Vec<String> {
    DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect()
}

impl Default for LayerscopeConfig {
    fn default() -> Self {
        Self {
            exclusions: default_exclusions(),
            probe: ProbeConfig::default(),
            codegen: CodegenConfig::default(),
            ontology: OntologyConfig::default(),
        }
    }
}

impl LayerscopeConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

/// Prober settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Candidate values; each grid point draws from these with replacement.
    #[serde(default = "default_grid")]
    pub grid: Vec<Scalar>,
    /// Canonical probe input shape, batch axis excluded.
    #[serde(default = "default_input_shape")]
    pub input_shape: Vec<usize>,
}

fn default_grid() -> Vec<Scalar> {
    DEFAULT_GRID.to_vec()
}

fn default_input_shape() -> Vec<usize> {
    ProbeInput::default().shape
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            grid: default_grid(),
            input_shape: default_input_shape(),
        }
    }
}

impl ProbeConfig {
    pub fn input(&self) -> ProbeInput {
        ProbeInput::new(self.input_shape.clone())
    }
}

/// Ontology population settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyConfig {
    /// Bounds written as hyperparameter facts.
    #[serde(default = "RangePolicy::ontology_default")]
    pub ranges: RangePolicy,
    /// Directory of the persistent RDF mirror. In-memory only when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for OntologyConfig {
    fn default() -> Self {
        Self {
            ranges: RangePolicy::ontology_default(),
            data_dir: None,
        }
    }
}
