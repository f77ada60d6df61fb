//! RDF mirror of the knowledge base backed by oxigraph.
//!
//! Every individual, fact, and parameter link written to a [`KnowledgeBase`]
//! can be mirrored here, which gives SPARQL access and on-disk durability.
//! RDF has no list order, so `hasParameter` order lives only in the
//! knowledge base itself.
//!
//! [`KnowledgeBase`]: super::KnowledgeBase

use oxigraph::model::vocab::rdf;
use oxigraph::model::{GraphNameRef, Literal as RdfLiteral, NamedNode, Quad, Term};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

use crate::error::{OntologyError, OntologyResult};

use super::{HAS_PARAMETER, Literal, OntologyClass, Property};

/// IRI namespace for classes, properties, and individuals.
pub const ONTO_NS: &str = "https://layerscope.dev/onto#";

/// SPARQL-capable RDF store holding a copy of the ontology facts.
pub struct RdfMirror {
    store: Store,
}

impl RdfMirror {
    /// Create a new in-memory store (no persistence).
    pub fn in_memory() -> OntologyResult<Self> {
        let store = Store::new().map_err(|e| OntologyError::Rdf {
            message: format!("failed to create oxigraph store: {e}"),
        })?;
        Ok(Self { store })
    }

    /// Open or create a persistent store at the given path.
    pub fn open(path: &std::path::Path) -> OntologyResult<Self> {
        std::fs::create_dir_all(path).map_err(|e| OntologyError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let store = Store::open(path).map_err(|e| OntologyError::Rdf {
            message: format!("failed to open oxigraph store at {}: {e}", path.display()),
        })?;
        Ok(Self { store })
    }

    /// Open the store at `path` and drop everything a previous run left in it.
    pub fn open_fresh(path: &std::path::Path) -> OntologyResult<Self> {
        let mirror = Self::open(path)?;
        let stale = mirror.len()?;
        mirror.clear()?;
        if stale > 0 {
            tracing::info!(path = %path.display(), triples = stale, "cleared RDF mirror");
        }
        Ok(mirror)
    }

    /// Remove every triple.
    pub fn clear(&self) -> OntologyResult<()> {
        self.store.clear().map_err(|e| OntologyError::Rdf {
            message: format!("clear failed: {e}"),
        })
    }

    /// IRI for a local name in the ontology namespace.
    pub fn iri(local: &str) -> OntologyResult<NamedNode> {
        NamedNode::new(format!("{ONTO_NS}{local}")).map_err(|e| OntologyError::Rdf {
            message: format!("invalid IRI for \"{local}\": {e}"),
        })
    }

    fn insert(
        &self,
        subject: NamedNode,
        predicate: NamedNode,
        object: impl Into<Term>,
    ) -> OntologyResult<()> {
        let quad = Quad::new(subject, predicate, object, GraphNameRef::DefaultGraph);
        self.store.insert(&quad).map_err(|e| OntologyError::Rdf {
            message: format!("insert failed: {e}"),
        })?;
        Ok(())
    }

    /// `name rdf:type class`.
    pub fn insert_individual(&self, name: &str, class: OntologyClass) -> OntologyResult<()> {
        self.insert(Self::iri(name)?, rdf::TYPE.into(), Self::iri(class.as_str())?)
    }

    /// `name property "value"^^xsd:…`.
    pub fn insert_fact(
        &self,
        name: &str,
        property: Property,
        value: Literal,
    ) -> OntologyResult<()> {
        let literal = match value {
            Literal::Int(v) => RdfLiteral::from(v),
            Literal::Float(v) => RdfLiteral::from(v),
        };
        self.insert(Self::iri(name)?, Self::iri(property.as_str())?, literal)
    }

    /// `layer hasParameter parameter`.
    pub fn insert_link(&self, layer: &str, parameter: &str) -> OntologyResult<()> {
        self.insert(Self::iri(layer)?, Self::iri(HAS_PARAMETER)?, Self::iri(parameter)?)
    }

    /// Execute a SPARQL SELECT query and return results as Vec of binding maps.
    pub fn query_select(&self, sparql: &str) -> OntologyResult<Vec<Vec<(String, String)>>> {
        let results = self.store.query(sparql).map_err(|e| OntologyError::Rdf {
            message: format!("SPARQL query failed: {e}"),
        })?;

        match results {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(|e| OntologyError::Rdf {
                        message: format!("solution error: {e}"),
                    })?;
                    let row = solution
                        .iter()
                        .map(|(var, term)| (var.as_str().to_string(), term.to_string()))
                        .collect();
                    rows.push(row);
                }
                Ok(rows)
            }
            QueryResults::Boolean(b) => Ok(vec![vec![("result".to_string(), b.to_string())]]),
            QueryResults::Graph(_) => Err(OntologyError::Rdf {
                message: "CONSTRUCT/DESCRIBE queries not supported via query_select".into(),
            }),
        }
    }

    /// Execute a SPARQL ASK query.
    pub fn query_ask(&self, sparql: &str) -> OntologyResult<bool> {
        let results = self.store.query(sparql).map_err(|e| OntologyError::Rdf {
            message: format!("SPARQL query failed: {e}"),
        })?;
        match results {
            QueryResults::Boolean(b) => Ok(b),
            _ => Err(OntologyError::Rdf {
                message: "expected boolean result from ASK query".into(),
            }),
        }
    }

    /// Number of triples in the store.
    pub fn len(&self) -> OntologyResult<usize> {
        self.store.len().map_err(|e| OntologyError::Rdf {
            message: format!("count failed: {e}"),
        })
    }

    pub fn is_empty(&self) -> OntologyResult<bool> {
        self.len().map(|n| n == 0)
    }
}

impl std::fmt::Debug for RdfMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RdfMirror").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn individual_is_typed() {
        let mirror = RdfMirror::in_memory().unwrap();
        mirror
            .insert_individual("DenseLayer", OntologyClass::NeuralNetworkLayer)
            .unwrap();
        let typed = mirror
            .query_ask(&format!(
                "ASK {{ <{ONTO_NS}DenseLayer> a <{ONTO_NS}NeuralNetworkLayer> }}"
            ))
            .unwrap();
        assert!(typed);
        assert_eq!(mirror.len().unwrap(), 1);
    }

    #[test]
    fn facts_are_typed_literals() {
        let mirror = RdfMirror::in_memory().unwrap();
        mirror
            .insert_fact("Dense__units", Property::HasMaxIntValue, Literal::Int(100))
            .unwrap();
        mirror
            .insert_fact("Dropout__rate", Property::HasMaxFloatValue, Literal::Float(100.0))
            .unwrap();
        let bounded = mirror
            .query_ask(&format!(
                "ASK {{ <{ONTO_NS}Dense__units> <{ONTO_NS}hasMaxIntValue> 100 }}"
            ))
            .unwrap();
        assert!(bounded);
        let rows = mirror
            .query_select(&format!(
                "SELECT ?v WHERE {{ <{ONTO_NS}Dropout__rate> <{ONTO_NS}hasMaxFloatValue> ?v }}"
            ))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0][0].1.contains("double"));
    }

    #[test]
    fn links_are_queryable() {
        let mirror = RdfMirror::in_memory().unwrap();
        mirror.insert_link("DenseLayer", "Dense__units").unwrap();
        let rows = mirror
            .query_select(&format!(
                "SELECT ?p WHERE {{ <{ONTO_NS}DenseLayer> <{ONTO_NS}hasParameter> ?p }}"
            ))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0][0].1.ends_with("Dense__units>"));
    }

    #[test]
    fn open_fresh_discards_previous_contents() {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let mirror = RdfMirror::open(dir.path()).unwrap();
            mirror.insert_link("DenseLayer", "Dense__units").unwrap();
        }
        {
            let reopened = RdfMirror::open(dir.path()).unwrap();
            assert_eq!(reopened.len().unwrap(), 1);
        }
        let fresh = RdfMirror::open_fresh(dir.path()).unwrap();
        assert!(fresh.is_empty().unwrap());
    }

    #[test]
    fn invalid_local_name_is_an_error() {
        assert!(RdfMirror::iri("has space").is_err());
    }
}
