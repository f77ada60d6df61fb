//! Declarative component library backed by a TOML manifest.
//!
//! ```toml
//! [[component]]
//! name = "Layer"
//! base = true
//!
//! [[component]]
//! name = "Dense"
//! kwargs = true
//! min_input_rank = 2
//!
//! [[component.params]]
//! name = "units"
//! accepts = ["integer"]
//! min = 1
//!
//! [[component.params]]
//! name = "activation"
//! default = "linear"
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::component::{ComponentLibrary, Constructor, Kwargs, Layer, ProbeInput};
use crate::error::{LibraryError, LibraryResult};
use crate::metadata::ParamKind;
use crate::signature::{DefaultValue, ParamSpec};

use super::error::{ManifestError, ManifestResult};

/// What a namespace member is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    /// A type that can be constructed.
    #[default]
    Class,
    /// A free function; resolvable but never a layer type.
    Function,
}

/// One constructor parameter in a manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestParam {
    pub name: String,
    /// Declared default; absent means the parameter is required.
    #[serde(default)]
    pub default: Option<DefaultValue>,
    /// Value kinds the constructor accepts for this parameter.
    #[serde(default = "all_kinds")]
    pub accepts: Vec<ParamKind>,
    /// Inclusive lower bound on supplied values.
    #[serde(default)]
    pub min: Option<f64>,
    /// Inclusive upper bound on supplied values.
    #[serde(default)]
    pub max: Option<f64>,
}

fn all_kinds() -> Vec<ParamKind> {
    vec![ParamKind::IntegerLike, ParamKind::RealValued]
}

fn default_true() -> bool {
    true
}

/// One namespace member in a manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestComponent {
    pub name: String,
    #[serde(default)]
    pub kind: MemberKind,
    /// Whether the type derives from the base layer type.
    #[serde(default = "default_true")]
    pub layer: bool,
    /// Whether this *is* the base layer type.
    #[serde(default)]
    pub base: bool,
    #[serde(default)]
    pub params: Vec<ManifestParam>,
    /// Accepts `*args`.
    #[serde(default)]
    pub var_args: bool,
    /// Accepts `**kwargs`; unknown keywords are then tolerated.
    #[serde(default)]
    pub kwargs: bool,
    /// Smallest input rank (batch axis included) the layer can be applied to.
    #[serde(default)]
    pub min_input_rank: usize,
    #[serde(default)]
    pub max_input_rank: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ManifestToml {
    #[serde(default)]
    component: Vec<ManifestComponent>,
}

/// A component library described by a TOML manifest.
#[derive(Debug, Clone)]
pub struct ManifestLibrary {
    components: Vec<Arc<ManifestComponent>>,
}

impl ManifestLibrary {
    /// Build a library from components, rejecting duplicate names.
    pub fn new(components: Vec<ManifestComponent>) -> ManifestResult<Self> {
        let mut seen = HashSet::new();
        for c in &components {
            if !seen.insert(c.name.as_str()) {
                return Err(ManifestError::DuplicateComponent {
                    name: c.name.clone(),
                });
            }
            let mut params = HashSet::new();
            for p in &c.params {
                if !params.insert(p.name.as_str()) {
                    return Err(ManifestError::DuplicateParam {
                        component: c.name.clone(),
                        param: p.name.clone(),
                    });
                }
            }
        }
        Ok(Self {
            components: components.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn from_toml_str(source: &str) -> ManifestResult<Self> {
        Self::parse(source, "(inline)")
    }

    /// Load a manifest file.
    pub fn load(path: &Path) -> ManifestResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let library = Self::parse(&source, &path.display().to_string())?;
        tracing::info!(
            path = %path.display(),
            members = library.components.len(),
            "loaded library manifest"
        );
        Ok(library)
    }

    fn parse(source: &str, origin: &str) -> ManifestResult<Self> {
        let parsed: ManifestToml = toml::from_str(source).map_err(|e| ManifestError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        Self::new(parsed.component)
    }

    fn find(&self, name: &str) -> LibraryResult<&Arc<ManifestComponent>> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| LibraryError::UnknownMember {
                name: name.to_string(),
            })
    }
}

impl ComponentLibrary for ManifestLibrary {
    fn member_names(&self) -> Vec<String> {
        self.components.iter().map(|c| c.name.clone()).collect()
    }

    fn resolve(&self, name: &str) -> LibraryResult<Arc<dyn Constructor>> {
        let component = self.find(name)?;
        Ok(Arc::new(ManifestConstructor(Arc::clone(component))))
    }

    fn is_layer_subtype(&self, name: &str) -> LibraryResult<bool> {
        let component = self.find(name)?;
        if component.kind != MemberKind::Class {
            return Err(LibraryError::NotAType {
                name: name.to_string(),
            });
        }
        Ok(component.layer && !component.base)
    }
}

/// Constructor that validates keyword arguments against a manifest entry.
#[derive(Debug)]
struct ManifestConstructor(Arc<ManifestComponent>);

impl ManifestConstructor {
    fn reject(&self, param: &str) -> LibraryError {
        LibraryError::UnexpectedArgument {
            component: self.0.name.clone(),
            param: param.to_string(),
        }
    }
}

impl Constructor for ManifestConstructor {
    fn name(&self) -> &str {
        &self.0.name
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        let c = &self.0;
        let mut specs = vec![ParamSpec::receiver()];
        specs.extend(c.params.iter().map(|p| match &p.default {
            Some(default) => ParamSpec::optional(p.name.clone(), default.clone()),
            None => ParamSpec::required(p.name.clone()),
        }));
        if c.var_args {
            specs.push(ParamSpec::var_positional());
        }
        if c.kwargs {
            specs.push(ParamSpec::var_keyword());
        }
        specs
    }

    fn construct(&self, kwargs: &Kwargs) -> LibraryResult<Box<dyn Layer>> {
        let c = &self.0;

        for (name, value) in kwargs.iter() {
            let Some(param) = c.params.iter().find(|p| p.name == name) else {
                if c.kwargs {
                    continue;
                }
                return Err(self.reject(name));
            };
            if !param.accepts.contains(&value.kind()) {
                return Err(LibraryError::KindRejected {
                    component: c.name.clone(),
                    param: name.to_string(),
                    kind: value.kind(),
                });
            }
            let v = value.as_f64();
            if param.min.is_some_and(|min| v < min) || param.max.is_some_and(|max| v > max) {
                return Err(LibraryError::OutOfRange {
                    component: c.name.clone(),
                    param: name.to_string(),
                    value: value.to_string(),
                });
            }
        }

        if let Some(missing) = c
            .params
            .iter()
            .find(|p| p.default.is_none() && kwargs.get(&p.name).is_none())
        {
            return Err(LibraryError::MissingArgument {
                component: c.name.clone(),
                param: missing.name.clone(),
            });
        }

        Ok(Box::new(ManifestLayer(Arc::clone(c))))
    }
}

/// A constructed manifest component. Shape-preserving when applicable.
#[derive(Debug)]
struct ManifestLayer(Arc<ManifestComponent>);

impl Layer for ManifestLayer {
    fn invoke(&self, input: &ProbeInput) -> LibraryResult<Vec<usize>> {
        let c = &self.0;
        let rank = input.rank();
        let too_high = c.max_input_rank.is_some_and(|max| rank > max);
        if rank < c.min_input_rank || too_high {
            let expected = match c.max_input_rank {
                Some(max) => format!("{}..={max}", c.min_input_rank),
                None => format!(">= {}", c.min_input_rank),
            };
            return Err(LibraryError::InputRank {
                component: c.name.clone(),
                expected,
                actual: rank,
            });
        }
        Ok(input.shape.clone())
    }
}
