//! Inferred parameter metadata shared by the prober and both emitters.
//!
//! A [`Scalar`] is a value handed to a constructor; its variant decides the
//! [`ParamKind`] reported for the parameter it was assigned to. A
//! [`RangePolicy`] turns a kind into the default [`Bounds`] an emitter attaches.

use serde::{Deserialize, Serialize};

/// A scalar constructor argument.
///
/// Deserializes untagged, so TOML `32` is `Integer` and `1.33` (or `32.0`) is
/// `Real`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Real(f64),
}

impl Scalar {
    /// The primitive kind of this value.
    pub fn kind(self) -> ParamKind {
        match self {
            Scalar::Integer(_) => ParamKind::IntegerLike,
            Scalar::Real(_) => ParamKind::RealValued,
        }
    }

    /// Widen to `f64` for range comparisons.
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Integer(v) => v as f64,
            Scalar::Real(v) => v,
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Integer(v) => write!(f, "{v}"),
            // Debug keeps the trailing `.0` on whole reals.
            Scalar::Real(v) => write!(f, "{v:?}"),
        }
    }
}

/// Primitive kind inferred for a required parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamKind {
    #[serde(alias = "integer", alias = "int")]
    IntegerLike,
    #[serde(alias = "real", alias = "float")]
    RealValued,
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamKind::IntegerLike => write!(f, "integer-like"),
            ParamKind::RealValued => write!(f, "real-valued"),
        }
    }
}

/// Parameter name → inferred kind, in declared constructor order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferredMetadata {
    params: Vec<(String, ParamKind)>,
}

impl InferredMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter. Order of calls is the order reported downstream.
    pub fn push(&mut self, name: impl Into<String>, kind: ParamKind) {
        self.params.push((name.into(), kind));
    }

    /// Kind recorded for `name`, if any.
    pub fn get(&self, name: &str) -> Option<ParamKind> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, kind)| *kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamKind)> {
        self.params.iter().map(|(n, k)| (n.as_str(), *k))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl Serialize for InferredMetadata {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.params.len()))?;
        for (name, kind) in &self.params {
            map.serialize_entry(name, kind)?;
        }
        map.end()
    }
}

impl FromIterator<(String, ParamKind)> for InferredMetadata {
    fn from_iter<I: IntoIterator<Item = (String, ParamKind)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

/// A bounded numeric domain attached to one hyperparameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Bounds {
    Int { min: i64, max: i64 },
    Real { min: f64, max: f64 },
}

/// Default bounds per inferred kind.
///
/// Each emitter owns its own policy; see [`RangePolicy::codegen_default`] and
/// [`RangePolicy::ontology_default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangePolicy {
    /// `[min, max]` for integer-like parameters.
    pub integer: (i64, i64),
    /// `[min, max]` for real-valued parameters.
    pub real: (f64, f64),
}

impl RangePolicy {
    /// Bounds written into generated adapter declarations.
    pub fn codegen_default() -> Self {
        Self {
            integer: (0, 100),
            real: (0.0, 1.0),
        }
    }

    /// Bounds written as hyperparameter facts into the ontology.
    pub fn ontology_default() -> Self {
        Self {
            integer: (0, 100),
            real: (0.0, 100.0),
        }
    }

    pub fn bounds(&self, kind: ParamKind) -> Bounds {
        match kind {
            ParamKind::IntegerLike => Bounds::Int {
                min: self.integer.0,
                max: self.integer.1,
            },
            ParamKind::RealValued => Bounds::Real {
                min: self.real.0,
                max: self.real.1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_kind_follows_variant() {
        assert_eq!(Scalar::Integer(32).kind(), ParamKind::IntegerLike);
        assert_eq!(Scalar::Real(1.33).kind(), ParamKind::RealValued);
        assert_eq!(Scalar::Real(32.0).kind(), ParamKind::RealValued);
    }

    #[test]
    fn scalar_display_keeps_real_marker() {
        assert_eq!(Scalar::Integer(32).to_string(), "32");
        assert_eq!(Scalar::Real(1.33).to_string(), "1.33");
        assert_eq!(Scalar::Real(1.0).to_string(), "1.0");
    }

    #[test]
    fn scalar_deserializes_untagged() {
        #[derive(Deserialize)]
        struct Grid {
            grid: Vec<Scalar>,
        }
        let parsed: Grid = toml::from_str("grid = [1.33, 32, 4.0]").unwrap();
        assert_eq!(
            parsed.grid,
            vec![Scalar::Real(1.33), Scalar::Integer(32), Scalar::Real(4.0)]
        );
    }

    #[test]
    fn param_kind_accepts_short_aliases() {
        #[derive(Deserialize)]
        struct Accepts {
            accepts: Vec<ParamKind>,
        }
        let parsed: Accepts =
            toml::from_str(r#"accepts = ["integer", "real-valued", "float"]"#).unwrap();
        assert_eq!(
            parsed.accepts,
            vec![
                ParamKind::IntegerLike,
                ParamKind::RealValued,
                ParamKind::RealValued
            ]
        );
    }

    #[test]
    fn metadata_preserves_insertion_order() {
        let mut meta = InferredMetadata::new();
        meta.push("filters", ParamKind::IntegerLike);
        meta.push("rate", ParamKind::RealValued);
        meta.push("axis", ParamKind::IntegerLike);
        let names: Vec<&str> = meta.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["filters", "rate", "axis"]);
        assert_eq!(meta.get("rate"), Some(ParamKind::RealValued));
        assert_eq!(meta.get("missing"), None);
    }

    #[test]
    fn metadata_serializes_as_ordered_map() {
        let mut meta = InferredMetadata::new();
        meta.push("units", ParamKind::IntegerLike);
        meta.push("rate", ParamKind::RealValued);
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"units":"integer-like","rate":"real-valued"}"#);
    }

    #[test]
    fn default_policies_diverge_only_on_real_upper_bound() {
        let code = RangePolicy::codegen_default();
        let onto = RangePolicy::ontology_default();
        assert_eq!(
            code.bounds(ParamKind::IntegerLike),
            onto.bounds(ParamKind::IntegerLike)
        );
        assert_eq!(
            code.bounds(ParamKind::RealValued),
            Bounds::Real { min: 0.0, max: 1.0 }
        );
        assert_eq!(
            onto.bounds(ParamKind::RealValued),
            Bounds::Real {
                min: 0.0,
                max: 100.0
            }
        );
    }
}
