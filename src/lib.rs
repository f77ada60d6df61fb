// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # layerscope
//!
//! Discovers the layer components a library exposes, infers the kind of
//! every required constructor parameter by brute-force probing, and emits
//! the result twice: as a generated Rust adapter module and as individuals
//! in an ontology knowledge base.
//!
//! ## Architecture
//!
//! - **Catalog** (`catalog`): Filtered walk of a component library plus manual components
//! - **Signatures** (`signature`): Required-parameter extraction from constructor signatures
//! - **Prober** (`probe`): Joint grid search over `[1.33, 32]`, one `ProbeRun` per pipeline
//! - **Code generator** (`codegen`): `syn`-validated adapter module with regex parent mappings
//! - **Ontology** (`ontology`): `DashMap` knowledge base with an optional `oxigraph` mirror
//!
//! ## Library usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use layerscope::config::LayerscopeConfig;
//! use layerscope::library::ManifestLibrary;
//! use layerscope::ontology::KnowledgeBase;
//! use layerscope::pipeline::Pipeline;
//!
//! let library = ManifestLibrary::load(std::path::Path::new("layers.toml")).unwrap();
//! let pipeline = Pipeline::new(Arc::new(library), &LayerscopeConfig::default()).unwrap();
//! let kb = KnowledgeBase::new();
//! let report = pipeline.run(&kb).unwrap();
//! println!("wrote {} adapters to {}", report.supported, report.output.display());
//! ```

pub mod adapter;
pub mod catalog;
pub mod codegen;
pub mod component;
pub mod config;
pub mod embedding;
pub mod error;
pub mod export;
pub mod library;
pub mod metadata;
pub mod ontology;
pub mod pipeline;
pub mod probe;
pub mod signature;
