//! The full analysis pipeline: discover, probe once, emit twice.
//!
//! A [`Pipeline`] owns one catalog builder for its whole lifetime. Probing
//! produces a [`ProbeRun`] that both emitters consume, so the adapter module
//! and the knowledge base always describe the same set of components.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::catalog::CatalogBuilder;
use crate::codegen::CodeGenerator;
use crate::component::ComponentLibrary;
use crate::config::LayerscopeConfig;
use crate::error::LayerscopeResult;
use crate::ontology::{Ontology, OntologyPopulator, PopulationReport};
use crate::probe::{ProbeRun, Prober};

/// Outcome of [`Pipeline::run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Path of the written adapter module.
    pub output: PathBuf,
    pub supported: usize,
    pub unsupported: Vec<String>,
    pub population: PopulationReport,
}

pub struct Pipeline {
    catalog: CatalogBuilder,
    prober: Prober,
    codegen: CodeGenerator,
    populator: OntologyPopulator,
}

impl Pipeline {
    /// Assemble a pipeline over `library` from configuration.
    ///
    /// Fails only if a parent-mapping pattern does not compile.
    pub fn new(
        library: Arc<dyn ComponentLibrary>,
        config: &LayerscopeConfig,
    ) -> LayerscopeResult<Self> {
        let catalog = CatalogBuilder::with_defaults(library)
            .with_exclusions(config.exclusions.iter().cloned());
        let prober = Prober::new(config.probe.grid.clone(), config.probe.input());
        let codegen = CodeGenerator::new(config.codegen.clone())?;
        let populator = OntologyPopulator::new(config.ontology.ranges);
        Ok(Self {
            catalog,
            prober,
            codegen,
            populator,
        })
    }

    pub fn catalog(&self) -> &CatalogBuilder {
        &self.catalog
    }

    pub fn codegen(&self) -> &CodeGenerator {
        &self.codegen
    }

    /// Names of every catalog component, in discovery order.
    pub fn discover(&self) -> Vec<String> {
        let names: Vec<String> = self.catalog.build().map(|d| d.name).collect();
        tracing::info!(components = names.len(), "discovered components");
        names
    }

    /// Probe the whole catalog once.
    pub fn probe(&self) -> ProbeRun {
        let run = self.prober.probe_all(self.catalog.build());
        tracing::info!(
            supported = run.supported.len(),
            unsupported = run.unsupported.len(),
            "probe complete"
        );
        run
    }

    /// Write the adapter module for `run` to the configured output.
    pub fn generate(&self, run: &ProbeRun) -> LayerscopeResult<PathBuf> {
        Ok(self.codegen.write(run)?)
    }

    /// Populate `ontology` from `run`.
    pub fn populate(
        &self,
        run: &ProbeRun,
        ontology: &dyn Ontology,
    ) -> LayerscopeResult<PopulationReport> {
        let report = self.populator.populate(ontology, run)?;
        tracing::info!(
            layers = report.layers,
            hyperparameters = report.hyperparameters,
            "populated ontology"
        );
        Ok(report)
    }

    /// Probe once, then generate the adapter module and populate `ontology`.
    pub fn run(&self, ontology: &dyn Ontology) -> LayerscopeResult<RunReport> {
        let run = self.probe();
        let output = self.generate(&run)?;
        let population = self.populate(&run, ontology)?;
        Ok(RunReport {
            output,
            supported: run.supported.len(),
            unsupported: run.unsupported,
            population,
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("prober", &self.prober)
            .field("codegen", &self.codegen)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayerscopeError;
    use crate::library::ManifestLibrary;

    fn library() -> Arc<dyn ComponentLibrary> {
        Arc::new(
            ManifestLibrary::from_toml_str(
                r#"
                [[component]]
                name = "Dense"
                [[component.params]]
                name = "units"
                accepts = ["integer"]

                [[component]]
                name = "Lambda"
                "#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn discover_appends_manual_components_after_library() {
        let pipeline = Pipeline::new(library(), &LayerscopeConfig::default()).unwrap();
        assert_eq!(pipeline.discover(), vec!["Dense", "Bert"]);
    }

    #[test]
    fn configured_exclusions_replace_defaults() {
        let config = LayerscopeConfig {
            exclusions: vec!["Dense".into()],
            ..Default::default()
        };
        let pipeline = Pipeline::new(library(), &config).unwrap();
        assert_eq!(pipeline.discover(), vec!["Lambda", "Bert"]);
    }

    #[test]
    fn bad_parent_pattern_fails_construction() {
        let mut config = LayerscopeConfig::default();
        config.codegen.parent_mappings[0].pattern = "(".into();
        assert!(matches!(
            Pipeline::new(library(), &config),
            Err(LayerscopeError::Codegen(_))
        ));
    }
}
