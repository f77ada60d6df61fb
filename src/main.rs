//! layerscope CLI: layer discovery, kind probing, adapter generation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use layerscope::config::LayerscopeConfig;
use layerscope::library::ManifestLibrary;
use layerscope::ontology::{KnowledgeBase, OntologyClass};
use layerscope::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "layerscope", version, about = "Layer discovery and hyperparameter inference")]
struct Cli {
    /// Pipeline configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Component library manifest (TOML).
    #[arg(long, global = true, default_value = "layers.toml")]
    library: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List discovered components in discovery order.
    Catalog,

    /// Probe every component and print the inferred parameter kinds.
    Probe {
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write the adapter module.
    Generate {
        /// Output file, overriding `codegen.output`.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Populate a knowledge base with layer and hyperparameter individuals.
    Populate {
        /// Persistent RDF mirror directory, overriding `ontology.data_dir`.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Write the populated knowledge base as JSON.
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Probe once, then generate the adapter module and populate the knowledge base.
    Run,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => LayerscopeConfig::load(path)?,
        None => LayerscopeConfig::default(),
    };
    let library = Arc::new(ManifestLibrary::load(&cli.library)?);

    match cli.command {
        Commands::Catalog => {
            let pipeline = Pipeline::new(library, &config)?;
            for name in pipeline.discover() {
                println!("{name}");
            }
        }

        Commands::Probe { json } => {
            let pipeline = Pipeline::new(library, &config)?;
            let run = pipeline.probe();
            if json {
                let text = serde_json::to_string_pretty(&run.summary()).into_diagnostic()?;
                println!("{text}");
            } else {
                println!("Supported components: {}", run.supported.len());
                for component in &run.supported {
                    let params: Vec<String> = component
                        .metadata
                        .iter()
                        .map(|(name, kind)| format!("{name}: {kind}"))
                        .collect();
                    println!("  {} ({})", component.name(), params.join(", "));
                }
                if !run.unsupported.is_empty() {
                    println!("Unsupported components: {}", run.unsupported.len());
                    for name in &run.unsupported {
                        println!("  {name}");
                    }
                }
            }
        }

        Commands::Generate { output } => {
            if let Some(output) = output {
                config.codegen.output = output;
            }
            let pipeline = Pipeline::new(library, &config)?;
            let run = pipeline.probe();
            let path = pipeline.generate(&run)?;
            println!(
                "Wrote {} adapters to {}",
                run.supported.len(),
                path.display()
            );
        }

        Commands::Populate { data_dir, export } => {
            let data_dir = data_dir.or_else(|| config.ontology.data_dir.clone());
            let kb = open_knowledge_base(data_dir.as_deref())?;
            let pipeline = Pipeline::new(library, &config)?;
            let run = pipeline.probe();
            let report = pipeline.populate(&run, &kb)?;
            println!(
                "Created {} layer and {} hyperparameter individuals",
                report.layers, report.hyperparameters
            );
            for layer in kb.individuals_of(OntologyClass::NeuralNetworkLayer) {
                let params: Vec<String> =
                    kb.parameters_of(layer.id).into_iter().map(|p| p.name).collect();
                println!("  {} [{}]", layer.name, params.join(", "));
            }
            if let Some(path) = export {
                kb.write_json(&path)?;
                println!("Exported knowledge base to {}", path.display());
            }
        }

        Commands::Run => {
            let kb = open_knowledge_base(config.ontology.data_dir.as_deref())?;
            let pipeline = Pipeline::new(library, &config)?;
            let report = pipeline.run(&kb)?;
            println!(
                "Wrote {} adapters to {}",
                report.supported,
                report.output.display()
            );
            println!(
                "Created {} layer and {} hyperparameter individuals",
                report.population.layers, report.population.hyperparameters
            );
            if !report.unsupported.is_empty() {
                println!("Unsupported: {}", report.unsupported.join(", "));
            }
        }
    }

    Ok(())
}

fn open_knowledge_base(data_dir: Option<&Path>) -> Result<KnowledgeBase> {
    Ok(match data_dir {
        Some(dir) => KnowledgeBase::persistent(dir)?,
        None => KnowledgeBase::new(),
    })
}
