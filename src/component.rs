//! The seam between layerscope and a component library.
//!
//! The numerical-modeling library is never linked directly. An adapter
//! implements [`ComponentLibrary`] to expose its namespace, and one
//! [`Constructor`] per component type. Constructed [`Layer`]s are only ever
//! invoked against a [`ProbeInput`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::LibraryResult;
use crate::metadata::Scalar;
use crate::signature::ParamSpec;

/// Read-only view of a library namespace.
pub trait ComponentLibrary: Send + Sync {
    /// Every member name in the namespace, in enumeration order.
    fn member_names(&self) -> Vec<String>;

    /// Resolve a member name to its constructor.
    fn resolve(&self, name: &str) -> LibraryResult<Arc<dyn Constructor>>;

    /// Whether the member is a strict subtype of the library's base layer type.
    ///
    /// Errors when the member is not a type at all.
    fn is_layer_subtype(&self, name: &str) -> LibraryResult<bool>;
}

/// Constructor handle for one component type.
pub trait Constructor: Send + Sync {
    /// Type name of the component.
    fn name(&self) -> &str;

    /// Declared constructor signature, in declaration order.
    fn parameters(&self) -> Vec<ParamSpec>;

    /// Construct the component with the given keyword arguments.
    fn construct(&self, kwargs: &Kwargs) -> LibraryResult<Box<dyn Layer>>;
}

/// A constructed component.
pub trait Layer {
    /// Apply the layer to `input`, returning the output shape (batch axis excluded).
    fn invoke(&self, input: &ProbeInput) -> LibraryResult<Vec<usize>>;
}

/// Minimal-shape input used to check that a constructed layer is usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeInput {
    /// Shape without the batch axis.
    pub shape: Vec<usize>,
}

impl ProbeInput {
    pub fn new(shape: Vec<usize>) -> Self {
        Self { shape }
    }

    /// Rank including the symbolic batch axis.
    pub fn rank(&self) -> usize {
        self.shape.len() + 1
    }
}

impl Default for ProbeInput {
    fn default() -> Self {
        Self { shape: vec![1] }
    }
}

/// Ordered keyword arguments for a constructor call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Kwargs(Vec<(String, Scalar)>);

impl Kwargs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing an earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: Scalar) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<Scalar> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Scalar)> {
        self.0.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Kwargs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

/// One candidate component for the duration of a pipeline run.
#[derive(Clone)]
pub struct ComponentDescriptor {
    pub name: String,
    pub constructor: Arc<dyn Constructor>,
}

impl ComponentDescriptor {
    /// Describe a constructor under its own type name.
    pub fn new(constructor: Arc<dyn Constructor>) -> Self {
        Self {
            name: constructor.name().to_string(),
            constructor,
        }
    }
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .finish()
    }
}
