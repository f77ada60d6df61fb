//! Type/range prober: infer parameter kinds by trial construction.
//!
//! For a component with `n` required parameters the prober walks every
//! combination-with-replacement of length `n` drawn from a small candidate
//! grid. Each grid point is assigned positionally to the required names, the
//! component is constructed with those keyword arguments and invoked against
//! the canonical [`ProbeInput`]. The first grid point that survives both steps
//! decides the kind of *every* parameter at once.

use serde::Serialize;

use crate::component::{ComponentDescriptor, Kwargs, ProbeInput};
use crate::error::LibraryResult;
use crate::metadata::{InferredMetadata, Scalar};
use crate::signature::{RequirementSet, required_parameters};

/// Candidate values tried by default: one fractional, one integral.
pub const DEFAULT_GRID: [Scalar; 2] = [Scalar::Real(1.33), Scalar::Integer(32)];

/// Combinations with replacement of `grid`, in lexicographic index order.
///
/// For `[a, b]` and length 2 this yields `(a, a)`, `(a, b)`, `(b, b)`.
pub struct GridPoints<'a> {
    grid: &'a [Scalar],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> GridPoints<'a> {
    pub fn new(grid: &'a [Scalar], len: usize) -> Self {
        Self {
            grid,
            indices: vec![0; len],
            done: grid.is_empty() && len > 0,
        }
    }
}

impl Iterator for GridPoints<'_> {
    type Item = Vec<Scalar>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let point = self.indices.iter().map(|&i| self.grid[i]).collect();

        let last = self.grid.len().saturating_sub(1);
        match self.indices.iter().rposition(|&i| i < last) {
            Some(pos) => {
                let next = self.indices[pos] + 1;
                for slot in &mut self.indices[pos..] {
                    *slot = next;
                }
            }
            None => self.done = true,
        }
        Some(point)
    }
}

/// A component together with the metadata inferred for it.
#[derive(Debug, Clone)]
pub struct ProbedComponent {
    pub descriptor: ComponentDescriptor,
    pub metadata: InferredMetadata,
}

impl ProbedComponent {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

/// Result of probing a whole catalog, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct ProbeRun {
    pub supported: Vec<ProbedComponent>,
    pub unsupported: Vec<String>,
}

impl ProbeRun {
    /// Serializable summary for reporting.
    pub fn summary(&self) -> ProbeSummary<'_> {
        ProbeSummary {
            supported: self
                .supported
                .iter()
                .map(|c| ComponentSummary {
                    component: c.name(),
                    parameters: &c.metadata,
                })
                .collect(),
            unsupported: &self.unsupported,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProbeSummary<'a> {
    pub supported: Vec<ComponentSummary<'a>>,
    pub unsupported: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct ComponentSummary<'a> {
    pub component: &'a str,
    pub parameters: &'a InferredMetadata,
}

/// Brute-force kind inference over a fixed candidate grid.
#[derive(Debug, Clone)]
pub struct Prober {
    grid: Vec<Scalar>,
    input: ProbeInput,
}

impl Prober {
    pub fn new(grid: Vec<Scalar>, input: ProbeInput) -> Self {
        Self { grid, input }
    }

    /// Infer kinds for `requirements`, or `None` if no grid point works.
    ///
    /// An empty requirement set succeeds without constructing anything.
    pub fn probe(
        &self,
        descriptor: &ComponentDescriptor,
        requirements: &RequirementSet,
    ) -> Option<InferredMetadata> {
        if requirements.is_empty() {
            return Some(InferredMetadata::new());
        }

        let mut last = Kwargs::new();
        for (attempt, point) in GridPoints::new(&self.grid, requirements.len()).enumerate() {
            let kwargs = requirements.assign(&point);
            match self.try_point(descriptor, &kwargs) {
                Ok(()) => {
                    tracing::debug!(
                        component = %descriptor.name,
                        args = %kwargs,
                        attempt,
                        "grid point accepted"
                    );
                    return Some(
                        kwargs
                            .iter()
                            .map(|(name, value)| (name.to_string(), value.kind()))
                            .collect(),
                    );
                }
                Err(e) => {
                    tracing::trace!(
                        component = %descriptor.name,
                        args = %kwargs,
                        error = %e,
                        "grid point rejected"
                    );
                }
            }
            last = kwargs;
        }

        tracing::warn!(
            component = %descriptor.name,
            args = %last,
            "component unsupported: no grid point constructs and invokes"
        );
        None
    }

    /// Extract requirements and probe in one step.
    pub fn probe_component(&self, descriptor: &ComponentDescriptor) -> Option<InferredMetadata> {
        let requirements = required_parameters(descriptor.constructor.as_ref());
        self.probe(descriptor, &requirements)
    }

    /// Probe every component of a catalog, preserving discovery order.
    pub fn probe_all<I>(&self, catalog: I) -> ProbeRun
    where
        I: IntoIterator<Item = ComponentDescriptor>,
    {
        let mut run = ProbeRun::default();
        for descriptor in catalog {
            match self.probe_component(&descriptor) {
                Some(metadata) => {
                    tracing::info!(
                        component = %descriptor.name,
                        params = metadata.len(),
                        "probed component"
                    );
                    run.supported.push(ProbedComponent {
                        descriptor,
                        metadata,
                    });
                }
                None => run.unsupported.push(descriptor.name),
            }
        }
        run
    }

    fn try_point(&self, descriptor: &ComponentDescriptor, kwargs: &Kwargs) -> LibraryResult<()> {
        let layer = descriptor.constructor.construct(kwargs)?;
        layer.invoke(&self.input)?;
        Ok(())
    }
}

impl Default for Prober {
    fn default() -> Self {
        Self::new(DEFAULT_GRID.to_vec(), ProbeInput::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::component::{Constructor, Layer};
    use crate::error::LibraryError;
    use crate::metadata::ParamKind;
    use crate::signature::ParamSpec;

    type Accept = fn(&Kwargs) -> bool;

    /// Constructor that accepts exactly the kwargs `accept` approves of.
    struct Scripted {
        params: Vec<&'static str>,
        accept: Accept,
        calls: AtomicUsize,
    }

    struct Accepting;

    impl Layer for Accepting {
        fn invoke(&self, input: &ProbeInput) -> LibraryResult<Vec<usize>> {
            Ok(input.shape.clone())
        }
    }

    impl Constructor for Scripted {
        fn name(&self) -> &str {
            "Scripted"
        }

        fn parameters(&self) -> Vec<ParamSpec> {
            self.params.iter().map(|p| ParamSpec::required(*p)).collect()
        }

        fn construct(&self, kwargs: &Kwargs) -> LibraryResult<Box<dyn Layer>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if (self.accept)(kwargs) {
                Ok(Box::new(Accepting))
            } else {
                Err(LibraryError::OutOfRange {
                    component: "Scripted".into(),
                    param: "*".into(),
                    value: kwargs.to_string(),
                })
            }
        }
    }

    fn scripted(params: Vec<&'static str>, accept: Accept) -> (Arc<Scripted>, ComponentDescriptor) {
        let ctor = Arc::new(Scripted {
            params,
            accept,
            calls: AtomicUsize::new(0),
        });
        let descriptor = ComponentDescriptor::new(ctor.clone());
        (ctor, descriptor)
    }

    fn grid(len: usize) -> Vec<Vec<Scalar>> {
        GridPoints::new(&DEFAULT_GRID, len).collect()
    }

    #[test]
    fn grid_is_combinations_with_replacement() {
        let a = Scalar::Real(1.33);
        let b = Scalar::Integer(32);
        assert_eq!(grid(1), vec![vec![a], vec![b]]);
        assert_eq!(grid(2), vec![vec![a, a], vec![a, b], vec![b, b]]);
        assert_eq!(grid(3).len(), 4);
        assert_eq!(grid(3).last().unwrap(), &vec![b, b, b]);
    }

    #[test]
    fn grid_of_three_values() {
        let values = [Scalar::Integer(1), Scalar::Integer(2), Scalar::Integer(3)];
        let points: Vec<_> = GridPoints::new(&values, 2).collect();
        assert_eq!(points.len(), 6);
        assert_eq!(points[2], vec![Scalar::Integer(1), Scalar::Integer(3)]);
        assert_eq!(points[3], vec![Scalar::Integer(2), Scalar::Integer(2)]);
    }

    #[test]
    fn empty_grid_yields_nothing() {
        assert_eq!(GridPoints::new(&[], 2).count(), 0);
    }

    #[test]
    fn zero_parameters_succeed_without_constructing() {
        let (ctor, descriptor) = scripted(vec![], |_| false);
        let meta = Prober::default().probe_component(&descriptor).unwrap();
        assert!(meta.is_empty());
        assert_eq!(ctor.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn integral_grid_value_yields_integer_like() {
        let (ctor, descriptor) =
            scripted(vec!["units"], |k| matches!(k.get("units"), Some(Scalar::Integer(_))));
        let meta = Prober::default().probe_component(&descriptor).unwrap();
        assert_eq!(meta.get("units"), Some(ParamKind::IntegerLike));
        // (1.33,) failed, (32,) succeeded.
        assert_eq!(ctor.calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn first_success_wins_for_all_parameters_jointly() {
        let (_, descriptor) = scripted(vec!["alpha", "beta"], |_| true);
        let meta = Prober::default().probe_component(&descriptor).unwrap();
        assert_eq!(meta.get("alpha"), Some(ParamKind::RealValued));
        assert_eq!(meta.get("beta"), Some(ParamKind::RealValued));
    }

    #[test]
    fn mixed_grid_point_reports_each_assigned_kind() {
        let (_, descriptor) = scripted(vec!["rate", "units"], |k| {
            k.get("units") == Some(Scalar::Integer(32))
        });
        let meta = Prober::default().probe_component(&descriptor).unwrap();
        let kinds: Vec<_> = meta.iter().collect();
        assert_eq!(
            kinds,
            vec![
                ("rate", ParamKind::RealValued),
                ("units", ParamKind::IntegerLike)
            ]
        );
    }

    #[test]
    fn parameters_needing_distinct_points_are_rejected() {
        // Requires (32, 1.33), which combinations with replacement never produce.
        let (ctor, descriptor) = scripted(vec!["alpha", "beta"], |k| {
            k.get("alpha") == Some(Scalar::Integer(32)) && k.get("beta") == Some(Scalar::Real(1.33))
        });
        assert!(Prober::default().probe_component(&descriptor).is_none());
        assert_eq!(ctor.calls.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn probe_all_splits_supported_and_unsupported() {
        let (_, dense) = scripted(vec!["units"], |_| true);
        let (_, broken) = scripted(vec!["alpha", "beta"], |_| false);
        let dense = ComponentDescriptor {
            name: "Dense".into(),
            ..dense
        };
        let broken = ComponentDescriptor {
            name: "Broken".into(),
            ..broken
        };
        let run = Prober::default().probe_all(vec![dense, broken]);
        assert_eq!(run.supported.len(), 1);
        assert_eq!(run.supported[0].name(), "Dense");
        assert_eq!(run.unsupported, vec!["Broken".to_string()]);
    }

    #[test]
    fn invocation_failure_discards_grid_point() {
        struct RankTwo;
        impl Layer for RankTwo {
            fn invoke(&self, input: &ProbeInput) -> LibraryResult<Vec<usize>> {
                Err(LibraryError::InputRank {
                    component: "RankTwo".into(),
                    expected: ">= 4".into(),
                    actual: input.rank(),
                })
            }
        }
        struct Conv;
        impl Constructor for Conv {
            fn name(&self) -> &str {
                "Conv2D"
            }
            fn parameters(&self) -> Vec<ParamSpec> {
                vec![ParamSpec::required("filters")]
            }
            fn construct(&self, _: &Kwargs) -> LibraryResult<Box<dyn Layer>> {
                Ok(Box::new(RankTwo))
            }
        }
        let descriptor = ComponentDescriptor::new(Arc::new(Conv));
        assert!(Prober::default().probe_component(&descriptor).is_none());
    }
}
