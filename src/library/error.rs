//! Rich diagnostic error types for library manifests.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from loading a component library manifest.
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    #[error("failed to read library manifest: {path}")]
    #[diagnostic(
        code(layerscope::manifest::io),
        help("Ensure the manifest file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse library manifest {path}: {message}")]
    #[diagnostic(
        code(layerscope::manifest::parse),
        help(
            "Check the TOML syntax. Each component is a `[[component]]` table with a \
             `name` and optional `[[component.params]]` entries."
        )
    )]
    Parse { path: String, message: String },

    #[error("duplicate component \"{name}\" in library manifest")]
    #[diagnostic(
        code(layerscope::manifest::duplicate),
        help("Component names must be unique within one library.")
    )]
    DuplicateComponent { name: String },

    #[error("component \"{component}\" declares parameter \"{param}\" twice")]
    #[diagnostic(code(layerscope::manifest::duplicate_param))]
    DuplicateParam { component: String, param: String },
}

/// Convenience alias for manifest results.
pub type ManifestResult<T> = std::result::Result<T, ManifestError>;
