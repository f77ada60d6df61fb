//! Runtime support for generated layer adapters.
//!
//! A generated module does `use layerscope::adapter::*;` and
//! `use layerscope::adapter::nn::*;`, then declares one struct per probed
//! component. Each struct captures its keyword arguments at construction time
//! and implements [`LayerWrapper`], so the underlying component can be built
//! on demand.

use serde::Serialize;

use crate::catalog::CatalogBuilder;
use crate::error::LibraryResult;

pub use crate::component::{Kwargs, Layer};
pub use crate::metadata::Scalar;

/// Bounded domain of one adapter hyperparameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Domain {
    Discrete { min: i64, max: i64 },
    Continuous { min: f64, max: f64 },
}

impl Domain {
    /// Whether `value` has the right kind and lies within the bounds.
    pub fn contains(&self, value: Scalar) -> bool {
        match (*self, value) {
            (Domain::Discrete { min, max }, Scalar::Integer(v)) => (min..=max).contains(&v),
            (Domain::Continuous { min, max }, Scalar::Real(v)) => v >= min && v <= max,
            _ => false,
        }
    }
}

/// Marker for every generated object that can be composed into a model.
pub trait BaseObject {}

/// A component plus keyword arguments fixed at construction time.
pub trait LayerWrapper {
    /// Name of the wrapped component.
    fn component(&self) -> &str;

    /// Arguments captured at construction time.
    fn kwargs(&self) -> &Kwargs;

    /// Construct the wrapped component with the captured arguments.
    fn build(&self, catalog: &CatalogBuilder) -> LibraryResult<Box<dyn Layer>> {
        catalog.resolve(self.component())?.construct(self.kwargs())
    }
}

/// Role markers attached to adapters through the parent-mapping table.
pub mod nn {
    /// Turns raw input into a representation (embeddings, dense stems).
    pub trait NnPreprocessor {}
    /// Reduces dimensionality.
    pub trait NnReduction {}
    /// Produces abstract features.
    pub trait NnAbstractFeatures {}
    /// Final classification head.
    pub trait NnClassifier {}
    /// Head that composes with a classifier.
    pub trait ComposeClassifier {}
}

/// One registered adapter type.
#[derive(Debug, Clone, Serialize)]
pub struct AdapterEntry {
    pub adapter: &'static str,
    pub component: &'static str,
    pub hyperparameters: &'static [(&'static str, Domain)],
}

/// Registry populated by a generated module's `register_all`.
#[derive(Debug, Default)]
pub struct AdapterRegistry {
    entries: Vec<AdapterEntry>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        adapter: &'static str,
        component: &'static str,
        hyperparameters: &'static [(&'static str, Domain)],
    ) {
        self.entries.push(AdapterEntry {
            adapter,
            component,
            hyperparameters,
        });
    }

    pub fn get(&self, adapter: &str) -> Option<&AdapterEntry> {
        self.entries.iter().find(|e| e.adapter == adapter)
    }

    pub fn entries(&self) -> &[AdapterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
