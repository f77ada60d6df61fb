//! Component library adapters.
//!
//! A [`ManifestLibrary`] describes a layer namespace declaratively in TOML:
//! each component lists its constructor parameters, the value kinds and ranges
//! it accepts, and the input ranks it can be applied to. Constructors built
//! from it behave like the real library's would under trial construction.

pub mod error;
pub mod manifest;

pub use error::{ManifestError, ManifestResult};
pub use manifest::{ManifestComponent, ManifestLibrary, ManifestParam, MemberKind};
