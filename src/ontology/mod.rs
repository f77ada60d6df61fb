//! Ontology population: layer and hyperparameter individuals.
//!
//! The [`Ontology`] trait is the narrow interface to a knowledge base. The
//! [`OntologyPopulator`] walks a [`ProbeRun`] and creates, for every probed
//! component, one `NeuralNetworkLayer` individual and one discrete or
//! continuous hyperparameter individual per inferred parameter.
//!
//! - **In-memory knowledge base** ([`KnowledgeBase`]): `DashMap`-indexed individuals
//! - **RDF mirror** ([`RdfMirror`]): `oxigraph` store for SPARQL queries and durability

pub mod knowledge;
pub mod rdf;

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::error::OntologyResult;
use crate::metadata::{Bounds, ParamKind, RangePolicy};
use crate::probe::ProbeRun;

pub use knowledge::{Individual, KnowledgeBase};
pub use rdf::RdfMirror;

/// Unique, niche-optimized identifier for an individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct IndividualId(NonZeroU64);

impl IndividualId {
    /// Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(IndividualId)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for IndividualId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ind:{}", self.0)
    }
}

/// Ontology classes individuals are created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OntologyClass {
    NeuralNetworkLayer,
    DiscreteHyperParameter,
    ContinuousHyperParameter,
}

impl OntologyClass {
    /// Hyperparameter class for an inferred kind.
    pub fn for_kind(kind: ParamKind) -> Self {
        match kind {
            ParamKind::IntegerLike => OntologyClass::DiscreteHyperParameter,
            ParamKind::RealValued => OntologyClass::ContinuousHyperParameter,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OntologyClass::NeuralNetworkLayer => "NeuralNetworkLayer",
            OntologyClass::DiscreteHyperParameter => "DiscreteHyperParameter",
            OntologyClass::ContinuousHyperParameter => "ContinuousHyperParameter",
        }
    }
}

impl std::fmt::Display for OntologyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data properties carrying hyperparameter bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    HasMinIntValue,
    HasMaxIntValue,
    HasMinFloatValue,
    HasMaxFloatValue,
}

impl Property {
    pub fn as_str(self) -> &'static str {
        match self {
            Property::HasMinIntValue => "hasMinIntValue",
            Property::HasMaxIntValue => "hasMaxIntValue",
            Property::HasMinFloatValue => "hasMinFloatValue",
            Property::HasMaxFloatValue => "hasMaxFloatValue",
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal fact value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Int(i64),
    Float(f64),
}

/// Object property linking a layer to its hyperparameters.
pub const HAS_PARAMETER: &str = "hasParameter";

/// Mutation interface of a knowledge base.
pub trait Ontology {
    /// Create a named individual of `class`.
    fn create_individual(&self, class: OntologyClass, name: &str) -> OntologyResult<IndividualId>;

    /// Attach a literal fact to an individual.
    fn set_fact(
        &self,
        individual: IndividualId,
        property: Property,
        value: Literal,
    ) -> OntologyResult<()>;

    /// Append `parameter` to the ordered parameter list of `layer`.
    fn append_parameter(&self, layer: IndividualId, parameter: IndividualId)
    -> OntologyResult<()>;
}

/// Counts of individuals created by one population pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopulationReport {
    pub layers: usize,
    pub hyperparameters: usize,
}

/// Name of the layer individual for a component.
pub fn layer_individual_name(component: &str) -> String {
    format!("{component}Layer")
}

/// Name of the hyperparameter individual for a component parameter.
pub fn hyperparameter_individual_name(component: &str, param: &str) -> String {
    format!("{component}__{param}")
}

/// Writes layer and hyperparameter individuals for a probe run.
#[derive(Debug, Clone)]
pub struct OntologyPopulator {
    ranges: RangePolicy,
}

impl OntologyPopulator {
    pub fn new(ranges: RangePolicy) -> Self {
        Self { ranges }
    }

    /// Populate `ontology` from `run.supported`, in discovery order.
    ///
    /// Not transactional: on error, individuals created so far stay in place.
    pub fn populate(
        &self,
        ontology: &dyn Ontology,
        run: &ProbeRun,
    ) -> OntologyResult<PopulationReport> {
        let mut report = PopulationReport::default();

        for component in &run.supported {
            let name = component.name();
            let layer = ontology.create_individual(
                OntologyClass::NeuralNetworkLayer,
                &layer_individual_name(name),
            )?;
            report.layers += 1;
            tracing::info!(component = name, %layer, "created layer individual");

            for (param, kind) in component.metadata.iter() {
                let parameter = ontology.create_individual(
                    OntologyClass::for_kind(kind),
                    &hyperparameter_individual_name(name, param),
                )?;
                let (min, max) = match self.ranges.bounds(kind) {
                    Bounds::Int { min, max } => (
                        (Property::HasMinIntValue, Literal::Int(min)),
                        (Property::HasMaxIntValue, Literal::Int(max)),
                    ),
                    Bounds::Real { min, max } => (
                        (Property::HasMinFloatValue, Literal::Float(min)),
                        (Property::HasMaxFloatValue, Literal::Float(max)),
                    ),
                };
                ontology.set_fact(parameter, min.0, min.1)?;
                ontology.set_fact(parameter, max.0, max.1)?;
                tracing::debug!(component = name, param, %kind, "created hyperparameter");
                ontology.append_parameter(layer, parameter)?;
                report.hyperparameters += 1;
            }
        }

        Ok(report)
    }
}

impl Default for OntologyPopulator {
    fn default() -> Self {
        Self::new(RangePolicy::ontology_default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::Arc;

    use super::*;
    use crate::component::ComponentDescriptor;
    use crate::embedding::BertEmbedding;
    use crate::error::OntologyError;
    use crate::probe::ProbedComponent;

    fn probed(name: &str, params: &[(&str, ParamKind)]) -> ProbedComponent {
        ProbedComponent {
            descriptor: ComponentDescriptor {
                name: name.to_string(),
                constructor: Arc::new(BertEmbedding),
            },
            metadata: params.iter().map(|(n, k)| (n.to_string(), *k)).collect(),
        }
    }

    /// Records every call and fails after `fail_after` creations.
    #[derive(Default)]
    struct Recording {
        created: RefCell<Vec<(OntologyClass, String)>>,
        fail_after: Option<usize>,
    }

    impl Ontology for Recording {
        fn create_individual(
            &self,
            class: OntologyClass,
            name: &str,
        ) -> OntologyResult<IndividualId> {
            let mut created = self.created.borrow_mut();
            if self.fail_after.is_some_and(|n| created.len() >= n) {
                return Err(OntologyError::Rdf {
                    message: "store unreachable".into(),
                });
            }
            created.push((class, name.to_string()));
            Ok(IndividualId::new(created.len() as u64).unwrap())
        }

        fn set_fact(&self, _: IndividualId, _: Property, _: Literal) -> OntologyResult<()> {
            Ok(())
        }

        fn append_parameter(&self, _: IndividualId, _: IndividualId) -> OntologyResult<()> {
            Ok(())
        }
    }

    #[test]
    fn individual_id_niche_optimization() {
        assert_eq!(
            std::mem::size_of::<Option<IndividualId>>(),
            std::mem::size_of::<IndividualId>()
        );
        assert!(IndividualId::new(0).is_none());
    }

    #[test]
    fn creates_layers_then_hyperparameters_in_order() {
        let onto = Recording::default();
        let run = ProbeRun {
            supported: vec![
                probed("Dense", &[("units", ParamKind::IntegerLike)]),
                probed(
                    "Mixed",
                    &[("rate", ParamKind::RealValued), ("axis", ParamKind::IntegerLike)],
                ),
            ],
            unsupported: vec!["Conv2D".into()],
        };
        let report = OntologyPopulator::default().populate(&onto, &run).unwrap();
        assert_eq!(report, PopulationReport { layers: 2, hyperparameters: 3 });
        assert_eq!(
            onto.created.into_inner(),
            vec![
                (OntologyClass::NeuralNetworkLayer, "DenseLayer".to_string()),
                (OntologyClass::DiscreteHyperParameter, "Dense__units".to_string()),
                (OntologyClass::NeuralNetworkLayer, "MixedLayer".to_string()),
                (OntologyClass::ContinuousHyperParameter, "Mixed__rate".to_string()),
                (OntologyClass::DiscreteHyperParameter, "Mixed__axis".to_string()),
            ]
        );
    }

    #[test]
    fn failure_midway_keeps_earlier_individuals() {
        let onto = Recording {
            fail_after: Some(3),
            ..Default::default()
        };
        let run = ProbeRun {
            supported: vec![
                probed("Dense", &[("units", ParamKind::IntegerLike)]),
                probed("Dropout", &[("rate", ParamKind::RealValued)]),
            ],
            unsupported: vec![],
        };
        assert!(OntologyPopulator::default().populate(&onto, &run).is_err());
        assert_eq!(onto.created.borrow().len(), 3);
    }

    #[test]
    fn class_for_kind() {
        assert_eq!(
            OntologyClass::for_kind(ParamKind::IntegerLike),
            OntologyClass::DiscreteHyperParameter
        );
        assert_eq!(
            OntologyClass::for_kind(ParamKind::RealValued),
            OntologyClass::ContinuousHyperParameter
        );
    }
}
