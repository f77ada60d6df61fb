//! In-memory knowledge base of layer and hyperparameter individuals.
//!
//! Individuals are indexed both by ID and by name using `DashMap`s, so the
//! knowledge base can be shared behind `&self`. An optional [`RdfMirror`]
//! receives every write as RDF triples.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};

use crate::error::{OntologyError, OntologyResult};
use crate::export::{FactExport, IndividualExport, KnowledgeExport};

use super::{IndividualId, Literal, Ontology, OntologyClass, Property, RdfMirror};

/// A named member of an ontology class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    pub id: IndividualId,
    pub class: OntologyClass,
    pub name: String,
    /// Creation timestamp (seconds since UNIX epoch).
    pub created_at: u64,
}

impl Individual {
    fn new(id: IndividualId, class: OntologyClass, name: &str) -> Self {
        Self {
            id,
            class,
            name: name.to_string(),
            created_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        }
    }
}

/// Knowledge base backing [`Ontology`] writes.
pub struct KnowledgeBase {
    next: AtomicU64,
    individuals: DashMap<IndividualId, Individual>,
    by_name: DashMap<String, IndividualId>,
    facts: DashMap<IndividualId, Vec<(Property, Literal)>>,
    parameters: DashMap<IndividualId, Vec<IndividualId>>,
    mirror: Option<RdfMirror>,
}

impl KnowledgeBase {
    /// Create an empty knowledge base with no RDF mirror.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
            individuals: DashMap::new(),
            by_name: DashMap::new(),
            facts: DashMap::new(),
            parameters: DashMap::new(),
            mirror: None,
        }
    }

    /// Create an empty knowledge base that mirrors every write into `mirror`.
    pub fn with_mirror(mirror: RdfMirror) -> Self {
        Self {
            mirror: Some(mirror),
            ..Self::new()
        }
    }

    /// Create an empty knowledge base mirrored into the store at `data_dir`.
    ///
    /// Triples from earlier runs are cleared first, so the store only ever
    /// describes the current population.
    pub fn persistent(data_dir: &Path) -> OntologyResult<Self> {
        Ok(Self::with_mirror(RdfMirror::open_fresh(data_dir)?))
    }

    pub fn mirror(&self) -> Option<&RdfMirror> {
        self.mirror.as_ref()
    }

    fn next_id(&self) -> OntologyResult<IndividualId> {
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        IndividualId::new(raw).ok_or(OntologyError::AllocatorExhausted)
    }

    fn name_of(&self, id: IndividualId) -> OntologyResult<String> {
        self.individuals
            .get(&id)
            .map(|r| r.value().name.clone())
            .ok_or(OntologyError::UnknownIndividual { id: id.get() })
    }

    /// Look up an individual ID by exact name.
    pub fn lookup(&self, name: &str) -> Option<IndividualId> {
        self.by_name.get(name).map(|r| *r.value())
    }

    pub fn get(&self, id: IndividualId) -> Option<Individual> {
        self.individuals.get(&id).map(|r| r.value().clone())
    }

    /// All individuals in creation order.
    pub fn individuals(&self) -> Vec<Individual> {
        let mut all: Vec<Individual> = self.individuals.iter().map(|r| r.value().clone()).collect();
        all.sort_by_key(|i| i.id);
        all
    }

    /// Individuals of one class in creation order.
    pub fn individuals_of(&self, class: OntologyClass) -> Vec<Individual> {
        let mut all: Vec<Individual> = self
            .individuals
            .iter()
            .filter(|r| r.value().class == class)
            .map(|r| r.value().clone())
            .collect();
        all.sort_by_key(|i| i.id);
        all
    }

    /// Facts attached to an individual, in insertion order.
    pub fn facts_of(&self, id: IndividualId) -> Vec<(Property, Literal)> {
        self.facts
            .get(&id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Most recently set value of `property` on an individual.
    pub fn fact(&self, id: IndividualId, property: Property) -> Option<Literal> {
        self.facts.get(&id).and_then(|r| {
            r.value()
                .iter()
                .rev()
                .find(|(p, _)| *p == property)
                .map(|(_, v)| *v)
        })
    }

    /// Hyperparameters linked to a layer, in link order.
    pub fn parameters_of(&self, layer: IndividualId) -> Vec<Individual> {
        self.parameters
            .get(&layer)
            .map(|r| r.value().iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Name-resolved snapshot of the whole knowledge base.
    pub fn export(&self) -> KnowledgeExport {
        let individuals = self
            .individuals()
            .into_iter()
            .map(|ind| IndividualExport {
                id: ind.id.get(),
                class: ind.class.as_str().to_string(),
                created_at: ind.created_at,
                facts: self
                    .facts_of(ind.id)
                    .into_iter()
                    .map(|(property, value)| FactExport {
                        property: property.as_str().to_string(),
                        value,
                    })
                    .collect(),
                parameters: self
                    .parameters_of(ind.id)
                    .into_iter()
                    .map(|p| p.name)
                    .collect(),
                name: ind.name,
            })
            .collect();
        KnowledgeExport { individuals }
    }

    /// Write [`export`](Self::export) as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> OntologyResult<()> {
        let json = serde_json::to_string_pretty(&self.export()).map_err(|e| {
            OntologyError::Serialization {
                message: e.to_string(),
            }
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| OntologyError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, json).map_err(|e| OntologyError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), individuals = self.len(), "exported knowledge base");
        Ok(())
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("individuals", &self.individuals.len())
            .field("mirrored", &self.mirror.is_some())
            .finish()
    }
}

impl Ontology for KnowledgeBase {
    fn create_individual(&self, class: OntologyClass, name: &str) -> OntologyResult<IndividualId> {
        match self.by_name.entry(name.to_string()) {
            Entry::Occupied(existing) => Err(OntologyError::DuplicateIndividual {
                name: name.to_string(),
                existing_id: existing.get().get(),
            }),
            Entry::Vacant(slot) => {
                if let Some(mirror) = &self.mirror {
                    mirror.insert_individual(name, class)?;
                }
                let id = self.next_id()?;
                slot.insert(id);
                self.individuals.insert(id, Individual::new(id, class, name));
                Ok(id)
            }
        }
    }

    fn set_fact(
        &self,
        individual: IndividualId,
        property: Property,
        value: Literal,
    ) -> OntologyResult<()> {
        let name = self.name_of(individual)?;
        if let Some(mirror) = &self.mirror {
            mirror.insert_fact(&name, property, value)?;
        }
        self.facts.entry(individual).or_default().push((property, value));
        Ok(())
    }

    fn append_parameter(&self, layer: IndividualId, parameter: IndividualId) -> OntologyResult<()> {
        let layer_name = self.name_of(layer)?;
        let parameter_name = self.name_of(parameter)?;
        if let Some(mirror) = &self.mirror {
            mirror.insert_link(&layer_name, &parameter_name)?;
        }
        self.parameters.entry(layer).or_default().push(parameter);
        Ok(())
    }
}
