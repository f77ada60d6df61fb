//! Constructor signatures and required-parameter extraction.

use serde::{Deserialize, Serialize};

use crate::component::{Constructor, Kwargs};
use crate::metadata::Scalar;

/// Names that never denote a real constructor parameter.
const SLOT_NAMES: [&str; 3] = ["self", "args", "kwargs"];

/// Which slot of a signature a parameter occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamSlot {
    /// The receiver (`self`).
    Receiver,
    /// An ordinary named parameter.
    Named,
    /// Variadic positional arguments.
    VarPositional,
    /// Variadic keyword arguments.
    VarKeyword,
}

/// A declared default. Non-scalar defaults are kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Scalar(Scalar),
    Bool(bool),
    Opaque(String),
}

/// One parameter of a constructor signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub slot: ParamSlot,
    pub default: Option<DefaultValue>,
}

impl ParamSpec {
    /// A named parameter without a default.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: ParamSlot::Named,
            default: None,
        }
    }

    /// A named parameter with a default.
    pub fn optional(name: impl Into<String>, default: DefaultValue) -> Self {
        Self {
            name: name.into(),
            slot: ParamSlot::Named,
            default: Some(default),
        }
    }

    pub fn receiver() -> Self {
        Self {
            name: "self".into(),
            slot: ParamSlot::Receiver,
            default: None,
        }
    }

    pub fn var_positional() -> Self {
        Self {
            name: "args".into(),
            slot: ParamSlot::VarPositional,
            default: None,
        }
    }

    pub fn var_keyword() -> Self {
        Self {
            name: "kwargs".into(),
            slot: ParamSlot::VarKeyword,
            default: None,
        }
    }

    /// Whether a caller must supply this parameter.
    pub fn is_required(&self) -> bool {
        self.slot == ParamSlot::Named
            && self.default.is_none()
            && !SLOT_NAMES.contains(&self.name.as_str())
    }
}

/// Names of required parameters, in declared constructor order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementSet {
    names: Vec<String>,
}

impl RequirementSet {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Assign `values` positionally to the required names.
    ///
    /// Extra values are ignored; missing values leave names unassigned.
    pub fn assign(&self, values: &[Scalar]) -> Kwargs {
        let mut kwargs = Kwargs::new();
        for (name, value) in self.names.iter().zip(values) {
            kwargs.insert(name.clone(), *value);
        }
        kwargs
    }
}

impl FromIterator<String> for RequirementSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// Parameters of `constructor` that carry no default value.
pub fn required_parameters(constructor: &dyn Constructor) -> RequirementSet {
    constructor
        .parameters()
        .into_iter()
        .filter(ParamSpec::is_required)
        .map(|p| p.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Layer;
    use crate::error::LibraryResult;

    struct Signature(Vec<ParamSpec>);

    impl Constructor for Signature {
        fn name(&self) -> &str {
            "Signature"
        }

        fn parameters(&self) -> Vec<ParamSpec> {
            self.0.clone()
        }

        fn construct(&self, _kwargs: &Kwargs) -> LibraryResult<Box<dyn Layer>> {
            unreachable!("extraction never constructs")
        }
    }

    #[test]
    fn keeps_parameters_without_defaults_in_order() {
        let ctor = Signature(vec![
            ParamSpec::receiver(),
            ParamSpec::required("filters"),
            ParamSpec::optional("activation", DefaultValue::Opaque("linear".into())),
            ParamSpec::required("kernel_size"),
            ParamSpec::optional("use_bias", DefaultValue::Bool(true)),
            ParamSpec::var_keyword(),
        ]);
        let req = required_parameters(&ctor);
        assert_eq!(req.names(), ["filters", "kernel_size"]);
    }

    #[test]
    fn slot_names_are_excluded() {
        let ctor = Signature(vec![
            ParamSpec::required("self"),
            ParamSpec::required("args"),
            ParamSpec::required("kwargs"),
            ParamSpec::var_positional(),
            ParamSpec::required("units"),
        ]);
        assert_eq!(required_parameters(&ctor).names(), ["units"]);
    }

    #[test]
    fn no_required_parameters_is_empty_not_an_error() {
        let ctor = Signature(vec![
            ParamSpec::receiver(),
            ParamSpec::optional("n_fine_tune_layers", DefaultValue::Scalar(Scalar::Integer(10))),
            ParamSpec::var_keyword(),
        ]);
        assert!(required_parameters(&ctor).is_empty());
    }

    #[test]
    fn assign_is_positional() {
        let req: RequirementSet = vec!["alpha".to_string(), "beta".to_string()]
            .into_iter()
            .collect();
        let kwargs = req.assign(&[Scalar::Real(1.33), Scalar::Integer(32)]);
        assert_eq!(kwargs.get("alpha"), Some(Scalar::Real(1.33)));
        assert_eq!(kwargs.get("beta"), Some(Scalar::Integer(32)));
    }
}
