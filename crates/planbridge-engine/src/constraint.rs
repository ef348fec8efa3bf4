//! Minimal constraint streams for the engine collaborator.
//!
//! A constraint provider receives a [`ConstraintFactory`] handle and returns
//! the constraints it defines; the bridge adapts that sequence into the
//! fixed-size array this contract requires. Filter predicates are
//! single-method functional objects, which is how host callables arrive here
//! after passing through the functional adapter.

use std::fmt;
use std::sync::Arc;

use planbridge_core::{BridgeError, HardSoftScore, Result, Value};

use crate::callbacks::{NativeFn1, NativeFn2};
use crate::class::NativeClassHandle;

/// Whether a constraint subtracts or adds its weight per match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactType {
    /// Matches subtract the weight.
    Penalty,
    /// Matches add the weight.
    Reward,
}

/// A constraint provider, already adapted to the engine contract.
pub type ConstraintProviderFn =
    Arc<dyn Fn(&ConstraintFactory) -> Result<Box<[Constraint]>> + Send + Sync>;

/// Supplies the entity/fact proxies of a class during evaluation.
pub trait EntitySource {
    /// The registered proxies of the given class, empty if none.
    fn entities(&self, class: NativeClassHandle) -> &[Value];
}

/// The factory handle passed to constraint providers.
#[derive(Debug, Default)]
pub struct ConstraintFactory {
    _private: (),
}

impl ConstraintFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Streams every registered object of a class.
    pub fn for_each(&self, class: NativeClassHandle) -> UniStream {
        UniStream {
            class,
            filters: Vec::new(),
        }
    }

    /// Streams every unordered distinct pair of objects of a class.
    pub fn for_each_unique_pair(&self, class: NativeClassHandle) -> BiStream {
        BiStream {
            class,
            filters: Vec::new(),
        }
    }
}

/// A stream of single objects.
#[derive(Clone)]
pub struct UniStream {
    class: NativeClassHandle,
    filters: Vec<NativeFn1>,
}

impl UniStream {
    /// Keeps only objects for which the predicate returns true.
    pub fn filter(mut self, predicate: NativeFn1) -> Self {
        self.filters.push(predicate);
        self
    }

    /// Terminates the stream, penalizing each match with `weight`.
    pub fn penalize(self, name: impl Into<Arc<str>>, weight: HardSoftScore) -> Constraint {
        self.terminate(name, weight, ImpactType::Penalty)
    }

    /// Terminates the stream, rewarding each match with `weight`.
    pub fn reward(self, name: impl Into<Arc<str>>, weight: HardSoftScore) -> Constraint {
        self.terminate(name, weight, ImpactType::Reward)
    }

    fn terminate(
        self,
        name: impl Into<Arc<str>>,
        weight: HardSoftScore,
        impact: ImpactType,
    ) -> Constraint {
        Constraint {
            name: name.into(),
            weight,
            impact,
            selector: Selector::Uni {
                class: self.class,
                filters: self.filters,
            },
        }
    }
}

/// A stream of unordered distinct pairs.
#[derive(Clone)]
pub struct BiStream {
    class: NativeClassHandle,
    filters: Vec<NativeFn2>,
}

impl BiStream {
    /// Keeps only pairs for which the predicate returns true.
    pub fn filter(mut self, predicate: NativeFn2) -> Self {
        self.filters.push(predicate);
        self
    }

    /// Terminates the stream, penalizing each match with `weight`.
    pub fn penalize(self, name: impl Into<Arc<str>>, weight: HardSoftScore) -> Constraint {
        self.terminate(name, weight, ImpactType::Penalty)
    }

    /// Terminates the stream, rewarding each match with `weight`.
    pub fn reward(self, name: impl Into<Arc<str>>, weight: HardSoftScore) -> Constraint {
        self.terminate(name, weight, ImpactType::Reward)
    }

    fn terminate(
        self,
        name: impl Into<Arc<str>>,
        weight: HardSoftScore,
        impact: ImpactType,
    ) -> Constraint {
        Constraint {
            name: name.into(),
            weight,
            impact,
            selector: Selector::Pair {
                class: self.class,
                filters: self.filters,
            },
        }
    }
}

#[derive(Clone)]
enum Selector {
    Uni {
        class: NativeClassHandle,
        filters: Vec<NativeFn1>,
    },
    Pair {
        class: NativeClassHandle,
        filters: Vec<NativeFn2>,
    },
}

/// A fully defined constraint, ready for evaluation.
#[derive(Clone)]
pub struct Constraint {
    name: Arc<str>,
    weight: HardSoftScore,
    impact: ImpactType,
    selector: Selector,
}

impl Constraint {
    /// The constraint's name, used in diagnostics.
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Evaluates this constraint: weight scaled by match count, negated for
    /// penalties.
    pub fn evaluate(&self, source: &dyn EntitySource) -> Result<HardSoftScore> {
        let matches = match &self.selector {
            Selector::Uni { class, filters } => {
                let mut count = 0i64;
                for value in source.entities(*class) {
                    if passes_uni(filters, value)? {
                        count += 1;
                    }
                }
                count
            }
            Selector::Pair { class, filters } => {
                let values = source.entities(*class);
                let mut count = 0i64;
                for i in 0..values.len() {
                    for j in (i + 1)..values.len() {
                        if passes_bi(filters, &values[i], &values[j])? {
                            count += 1;
                        }
                    }
                }
                count
            }
        };
        let magnitude = self.weight.scale(matches);
        Ok(match self.impact {
            ImpactType::Penalty => -magnitude,
            ImpactType::Reward => magnitude,
        })
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .field("impact", &self.impact)
            .finish()
    }
}

fn passes_uni(filters: &[NativeFn1], value: &Value) -> Result<bool> {
    for filter in filters {
        if !as_predicate_bool(filter.apply(value.clone())?)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn passes_bi(filters: &[NativeFn2], a: &Value, b: &Value) -> Result<bool> {
    for filter in filters {
        if !as_predicate_bool(filter.apply(a.clone(), b.clone())?)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn as_predicate_bool(value: Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| {
        BridgeError::Marshal(format!("constraint predicate returned non-boolean {value:?}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        class: NativeClassHandle,
        values: Vec<Value>,
    }

    impl EntitySource for FixedSource {
        fn entities(&self, class: NativeClassHandle) -> &[Value] {
            if class == self.class {
                &self.values
            } else {
                &[]
            }
        }
    }

    fn source(values: Vec<Value>) -> (FixedSource, NativeClassHandle) {
        let class = NativeClassHandle(0);
        (FixedSource { class, values }, class)
    }

    #[test]
    fn test_uni_penalize_counts_matches() {
        let (source, class) = source(vec![Value::I64(1), Value::I64(-2), Value::I64(-3)]);
        let factory = ConstraintFactory::new();

        let negative = factory
            .for_each(class)
            .filter(NativeFn1::new(|v| {
                Ok(Value::Bool(v.as_i64().unwrap() < 0))
            }))
            .penalize("negative", HardSoftScore::ONE_HARD);

        assert_eq!(
            negative.evaluate(&source).unwrap(),
            HardSoftScore::of_hard(-2)
        );
    }

    #[test]
    fn test_pair_stream_visits_unique_pairs() {
        let (source, class) = source(vec![Value::I64(5), Value::I64(5), Value::I64(7)]);
        let factory = ConstraintFactory::new();

        let conflict = factory
            .for_each_unique_pair(class)
            .filter(NativeFn2::new(|a, b| Ok(Value::Bool(a == b))))
            .penalize("conflict", HardSoftScore::ONE_HARD);

        // Only the (5, 5) pair matches out of three unique pairs.
        assert_eq!(
            conflict.evaluate(&source).unwrap(),
            HardSoftScore::of_hard(-1)
        );
    }

    #[test]
    fn test_reward_adds_weight() {
        let (source, class) = source(vec![Value::I64(1), Value::I64(2)]);
        let factory = ConstraintFactory::new();

        let any = factory
            .for_each(class)
            .reward("present", HardSoftScore::of_soft(3));
        assert_eq!(any.evaluate(&source).unwrap(), HardSoftScore::of_soft(6));
    }

    #[test]
    fn test_non_boolean_predicate_is_a_marshal_error() {
        let (source, class) = source(vec![Value::I64(1)]);
        let factory = ConstraintFactory::new();

        let broken = factory
            .for_each(class)
            .filter(NativeFn1::new(|_| Ok(Value::I64(1))))
            .penalize("broken", HardSoftScore::ONE_SOFT);
        assert!(matches!(
            broken.evaluate(&source).unwrap_err(),
            BridgeError::Marshal(_)
        ));
    }
}
