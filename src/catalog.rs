//! Component catalog: best-effort discovery of layer components.
//!
//! The [`CatalogBuilder`] walks a [`ComponentLibrary`] namespace, keeps the
//! members that look like layer types, and appends manually registered
//! components that the namespace does not expose.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::component::{ComponentDescriptor, ComponentLibrary, Constructor};
use crate::embedding::BertEmbedding;
use crate::error::LibraryResult;

/// Members that are never instantiable layers.
pub const DEFAULT_EXCLUSIONS: [&str; 6] = [
    "Lambda",
    "Layer",
    "Highway",
    "MaxoutDense",
    "Input",
    "InputLayer",
];

/// Builds the component catalog for one pipeline run.
pub struct CatalogBuilder {
    library: Arc<dyn ComponentLibrary>,
    exclusions: BTreeSet<String>,
    manual: Vec<ComponentDescriptor>,
}

impl CatalogBuilder {
    /// A builder with the default exclusion set and no manual components.
    pub fn new(library: Arc<dyn ComponentLibrary>) -> Self {
        Self {
            library,
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            manual: Vec::new(),
        }
    }

    /// A builder with the default exclusions and the hand-built embedding registered.
    pub fn with_defaults(library: Arc<dyn ComponentLibrary>) -> Self {
        Self::new(library).register(ComponentDescriptor::new(Arc::new(BertEmbedding)))
    }

    /// Replace the exclusion set.
    pub fn with_exclusions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions = names.into_iter().map(Into::into).collect();
        self
    }

    /// Add one name to the exclusion set.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclusions.insert(name.into());
        self
    }

    /// Register a component appended after everything discovered.
    ///
    /// A library member of the same name is no longer discovered, and an
    /// earlier registration of the same name is replaced.
    pub fn register(mut self, descriptor: ComponentDescriptor) -> Self {
        match self.manual.iter_mut().find(|d| d.name == descriptor.name) {
            Some(existing) => *existing = descriptor,
            None => self.manual.push(descriptor),
        }
        self
    }

    fn is_manual(&self, name: &str) -> bool {
        self.manual.iter().any(|d| d.name == name)
    }

    /// Resolve a component by name, manual registrations first.
    pub fn resolve(&self, name: &str) -> LibraryResult<Arc<dyn Constructor>> {
        if let Some(d) = self.manual.iter().find(|d| d.name == name) {
            return Ok(Arc::clone(&d.constructor));
        }
        self.library.resolve(name)
    }

    /// Lazily enumerate the catalog.
    pub fn build(&self) -> Catalog<'_> {
        Catalog {
            builder: self,
            names: self.library.member_names().into_iter(),
            manual: self.manual.iter(),
        }
    }

    fn admit(&self, name: &str) -> Option<ComponentDescriptor> {
        if self.exclusions.contains(name) {
            return None;
        }
        if self.is_manual(name) {
            tracing::debug!(member = name, "shadowed by manual registration");
            return None;
        }
        if !name.chars().next().is_some_and(char::is_uppercase) {
            return None;
        }
        match self.check(name) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::debug!(member = name, error = %e, "skipping member");
                None
            }
        }
    }

    fn check(&self, name: &str) -> LibraryResult<Option<ComponentDescriptor>> {
        let constructor = self.library.resolve(name)?;
        if !self.library.is_layer_subtype(name)? {
            tracing::debug!(member = name, "not a layer subtype");
            return Ok(None);
        }
        Ok(Some(ComponentDescriptor {
            name: name.to_string(),
            constructor,
        }))
    }
}

/// Finite, single-pass sequence of discovered components.
pub struct Catalog<'a> {
    builder: &'a CatalogBuilder,
    names: std::vec::IntoIter<String>,
    manual: std::slice::Iter<'a, ComponentDescriptor>,
}

impl Iterator for Catalog<'_> {
    type Item = ComponentDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        for name in self.names.by_ref() {
            if let Some(descriptor) = self.builder.admit(&name) {
                return Some(descriptor);
            }
        }
        self.manual.next().cloned()
    }
}
