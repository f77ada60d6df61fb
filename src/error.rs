//! Rich diagnostic error types for layerscope.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::library::ManifestError;
use crate::metadata::ParamKind;

/// Top-level error type for layerscope.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum LayerscopeError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Codegen(#[from] CodegenError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ontology(#[from] OntologyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Library errors
// ---------------------------------------------------------------------------

/// Failures reported by a component library adapter.
///
/// During probing these are expected and suppressed per grid point; they only
/// surface to the user when a generated adapter is built outside the probe.
#[derive(Debug, Error, Diagnostic)]
pub enum LibraryError {
    #[error("no member named \"{name}\" in the component library")]
    #[diagnostic(
        code(layerscope::library::unknown_member),
        help("Check the component name against the library manifest.")
    )]
    UnknownMember { name: String },

    #[error("member \"{name}\" is not a component type")]
    #[diagnostic(
        code(layerscope::library::not_a_type),
        help("Only component types can be checked against the base layer abstraction.")
    )]
    NotAType { name: String },

    #[error("{component}: missing required argument \"{param}\"")]
    #[diagnostic(
        code(layerscope::library::missing_argument),
        help("Every parameter without a default must be supplied as a keyword argument.")
    )]
    MissingArgument { component: String, param: String },

    #[error("{component}: unexpected keyword argument \"{param}\"")]
    #[diagnostic(
        code(layerscope::library::unexpected_argument),
        help("The constructor declares no such parameter and does not accept extra keywords.")
    )]
    UnexpectedArgument { component: String, param: String },

    #[error("{component}: argument \"{param}\" does not accept {kind} values")]
    #[diagnostic(
        code(layerscope::library::kind_rejected),
        help("Supply a value of one of the kinds the parameter accepts.")
    )]
    KindRejected {
        component: String,
        param: String,
        kind: ParamKind,
    },

    #[error("{component}: argument \"{param}\" = {value} is out of range")]
    #[diagnostic(
        code(layerscope::library::out_of_range),
        help("The value lies outside the range declared for this parameter.")
    )]
    OutOfRange {
        component: String,
        param: String,
        value: String,
    },

    #[error("{component}: expected input of rank {expected}, got rank {actual}")]
    #[diagnostic(
        code(layerscope::library::input_rank),
        help("The layer cannot be applied to an input of this shape.")
    )]
    InputRank {
        component: String,
        expected: String,
        actual: usize,
    },
}

/// Convenience alias for library adapter results.
pub type LibraryResult<T> = std::result::Result<T, LibraryError>;

// ---------------------------------------------------------------------------
// Code generation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CodegenError {
    #[error("invalid parent mapping pattern \"{pattern}\": {message}")]
    #[diagnostic(
        code(layerscope::codegen::invalid_pattern),
        help(
            "Parent mapping patterns are regular expressions matched at the start of the \
             component name."
        )
    )]
    InvalidPattern { pattern: String, message: String },

    #[error("generated module is not valid Rust: {message}")]
    #[diagnostic(
        code(layerscope::codegen::invalid_output),
        help(
            "The rendered adapter module failed to parse. Check that base names in \
             `codegen.parent_mappings` and paths in `codegen.imports` are valid Rust."
        )
    )]
    InvalidOutput { message: String },

    #[error("failed to write generated module: {path}")]
    #[diagnostic(
        code(layerscope::codegen::io),
        help("Ensure the output directory is writable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type CodegenResult<T> = std::result::Result<T, CodegenError>;

// ---------------------------------------------------------------------------
// Ontology errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum OntologyError {
    #[error("duplicate individual \"{name}\" (existing id {existing_id})")]
    #[diagnostic(
        code(layerscope::ontology::duplicate_individual),
        help("Populate a fresh knowledge base; individuals are never updated in place.")
    )]
    DuplicateIndividual { name: String, existing_id: u64 },

    #[error("individual {id} not found")]
    #[diagnostic(
        code(layerscope::ontology::unknown_individual),
        help("Create the individual before attaching facts or parameters to it.")
    )]
    UnknownIndividual { id: u64 },

    #[error("individual id allocator exhausted")]
    #[diagnostic(code(layerscope::ontology::exhausted))]
    AllocatorExhausted,

    #[error("RDF store error: {message}")]
    #[diagnostic(
        code(layerscope::ontology::rdf),
        help("The oxigraph mirror failed. Check that the data directory is writable.")
    )]
    Rdf { message: String },

    #[error("failed to serialize knowledge base: {message}")]
    #[diagnostic(code(layerscope::ontology::serialization))]
    Serialization { message: String },

    #[error("failed to write knowledge base export: {path}")]
    #[diagnostic(
        code(layerscope::ontology::io),
        help("Ensure the export path is writable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type OntologyResult<T> = std::result::Result<T, OntologyError>;

/// Convenience alias for functions returning layerscope results.
pub type LayerscopeResult<T> = std::result::Result<T, LayerscopeError>;
