//! Hand-built BERT embedding component.
//!
//! Not exposed by any library namespace, so the catalog appends it
//! explicitly. Its only named parameter has a default, which makes it
//! trivially probable.

use crate::component::{Constructor, Kwargs, Layer, ProbeInput};
use crate::error::{LibraryError, LibraryResult};
use crate::metadata::{ParamKind, Scalar};
use crate::signature::{DefaultValue, ParamSpec};

/// Width of the pooled BERT output.
pub const OUTPUT_SIZE: usize = 768;

/// Number of encoder layers fine-tuned unless told otherwise.
pub const DEFAULT_FINE_TUNE_LAYERS: i64 = 10;

/// Constructor for [`BertLayer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BertEmbedding;

impl Constructor for BertEmbedding {
    fn name(&self) -> &str {
        "Bert"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::receiver(),
            ParamSpec::optional(
                "n_fine_tune_layers",
                DefaultValue::Scalar(Scalar::Integer(DEFAULT_FINE_TUNE_LAYERS)),
            ),
            ParamSpec::var_keyword(),
        ]
    }

    fn construct(&self, kwargs: &Kwargs) -> LibraryResult<Box<dyn Layer>> {
        let n_fine_tune_layers = match kwargs.get("n_fine_tune_layers") {
            None => DEFAULT_FINE_TUNE_LAYERS,
            Some(Scalar::Integer(n)) if n >= 0 => n,
            Some(Scalar::Integer(n)) => {
                return Err(LibraryError::OutOfRange {
                    component: "Bert".into(),
                    param: "n_fine_tune_layers".into(),
                    value: n.to_string(),
                });
            }
            Some(Scalar::Real(_)) => {
                return Err(LibraryError::KindRejected {
                    component: "Bert".into(),
                    param: "n_fine_tune_layers".into(),
                    kind: ParamKind::RealValued,
                });
            }
        };
        Ok(Box::new(BertLayer { n_fine_tune_layers }))
    }
}

/// A constructed embedding: pools any token sequence into a fixed-width vector.
#[derive(Debug, Clone)]
pub struct BertLayer {
    pub n_fine_tune_layers: i64,
}

impl Layer for BertLayer {
    fn invoke(&self, input: &ProbeInput) -> LibraryResult<Vec<usize>> {
        if input.shape.is_empty() {
            return Err(LibraryError::InputRank {
                component: "Bert".into(),
                expected: ">= 2".into(),
                actual: input.rank(),
            });
        }
        Ok(vec![OUTPUT_SIZE])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::required_parameters;

    #[test]
    fn has_no_required_parameters() {
        assert!(required_parameters(&BertEmbedding).is_empty());
    }

    #[test]
    fn constructs_with_default_fine_tune_layers() {
        let layer = BertEmbedding.construct(&Kwargs::new()).unwrap();
        assert_eq!(layer.invoke(&ProbeInput::default()).unwrap(), vec![OUTPUT_SIZE]);
    }

    #[test]
    fn rejects_real_fine_tune_layers() {
        let mut kwargs = Kwargs::new();
        kwargs.insert("n_fine_tune_layers", Scalar::Real(2.5));
        assert!(matches!(
            BertEmbedding.construct(&kwargs),
            Err(LibraryError::KindRejected { .. })
        ));
    }

    #[test]
    fn rejects_scalar_input() {
        let layer = BertEmbedding.construct(&Kwargs::new()).unwrap();
        assert!(layer.invoke(&ProbeInput::new(vec![])).is_err());
    }
}
