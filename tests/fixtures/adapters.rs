// AUTOGENERATED ON 2024-01-02 03:04:05.000006
// DO NOT MODIFY THIS FILE MANUALLY

use layerscope::adapter::*;
use layerscope::adapter::nn::*;

/// Adapter for the `Dense` component.
pub struct DenseLayer {
    kwargs: Kwargs,
}

impl DenseLayer {
    pub const COMPONENT: &'static str = "Dense";
    pub const HYPERPARAMETERS: &'static [(&'static str, Domain)] = &[
        ("units", Domain::Discrete { min: 0, max: 100 }),
    ];

    pub fn new(units: i64) -> Self {
        let mut kwargs = Kwargs::new();
        kwargs.insert("units", Scalar::Integer(units));
        Self { kwargs }
    }
}

impl BaseObject for DenseLayer {}

impl LayerWrapper for DenseLayer {
    fn component(&self) -> &str {
        Self::COMPONENT
    }

    fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }
}

impl NnPreprocessor for DenseLayer {}

impl NnReduction for DenseLayer {}

impl NnAbstractFeatures for DenseLayer {}

impl ComposeClassifier for DenseLayer {}

/// Adapter for the `Dropout` component.
pub struct DropoutLayer {
    kwargs: Kwargs,
}

impl DropoutLayer {
    pub const COMPONENT: &'static str = "Dropout";
    pub const HYPERPARAMETERS: &'static [(&'static str, Domain)] = &[
        ("rate", Domain::Continuous { min: 0.0, max: 1.0 }),
    ];

    pub fn new(rate: f64) -> Self {
        let mut kwargs = Kwargs::new();
        kwargs.insert("rate", Scalar::Real(rate));
        Self { kwargs }
    }
}

impl BaseObject for DropoutLayer {}

impl LayerWrapper for DropoutLayer {
    fn component(&self) -> &str {
        Self::COMPONENT
    }

    fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }
}

/// Adapter for the `Bert` component.
pub struct BertLayer {
    kwargs: Kwargs,
}

impl BertLayer {
    pub const COMPONENT: &'static str = "Bert";
    pub const HYPERPARAMETERS: &'static [(&'static str, Domain)] = &[];

    pub fn new() -> Self {
        Self { kwargs: Kwargs::new() }
    }
}

impl BaseObject for BertLayer {}

impl LayerWrapper for BertLayer {
    fn component(&self) -> &str {
        Self::COMPONENT
    }

    fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }
}

impl NnPreprocessor for BertLayer {}

/// Register every generated adapter.
pub fn register_all(registry: &mut AdapterRegistry) {
    registry.register("DenseLayer", DenseLayer::COMPONENT, DenseLayer::HYPERPARAMETERS);
    registry.register("DropoutLayer", DropoutLayer::COMPONENT, DropoutLayer::HYPERPARAMETERS);
    registry.register("BertLayer", BertLayer::COMPONENT, BertLayer::HYPERPARAMETERS);
}
