//! The solve loop: best-fit construction plus steepest-descent local search.
//!
//! Every read, write and clone of domain state in this module goes through
//! the installed host callbacks; the engine only ever holds proxy identities.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use planbridge_core::{
    BridgeError, ForeignObjectId, HardSoftScore, Marker, Result, RoleKind, Value,
};

use crate::class::NativeClassHandle;
use crate::config::SolverConfig;
use crate::console;
use crate::constraint::{Constraint, ConstraintFactory, EntitySource};
use crate::engine::Engine;

/// Result of a solve run.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Proxy of the best solution clone found.
    pub solution: Value,
    /// The score of the best solution.
    pub score: HardSoftScore,
    /// Total time spent solving.
    pub duration: Duration,
    /// Number of accepted local-search steps.
    pub steps: u64,
    /// Number of moves evaluated across both phases.
    pub moves_evaluated: u64,
}

impl SolveOutcome {
    /// Returns true if the solution breaks no hard constraints.
    pub fn is_feasible(&self) -> bool {
        self.score.is_feasible()
    }
}

struct VariableSpec {
    name: Arc<str>,
    values: Vec<Value>,
}

struct EntityClassPlan {
    handle: NativeClassHandle,
    variables: Vec<VariableSpec>,
    entities: Vec<Value>,
    ids: Vec<ForeignObjectId>,
}

struct WorkingModel {
    solution: ForeignObjectId,
    score_member: Arc<str>,
    classes: Vec<EntityClassPlan>,
    facts: HashMap<NativeClassHandle, Vec<Value>>,
    constraints: Box<[Constraint]>,
}

impl EntitySource for WorkingModel {
    fn entities(&self, class: NativeClassHandle) -> &[Value] {
        if let Some(plan) = self.classes.iter().find(|p| p.handle == class) {
            return &plan.entities;
        }
        self.facts.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }
}

// A change move: assign values[value_idx] to variable var_idx of entity
// entity_idx in class class_idx.
#[derive(Clone, Copy)]
struct ChangeMove {
    class_idx: usize,
    entity_idx: usize,
    var_idx: usize,
    value_idx: usize,
}

impl Engine {
    /// Solves the problem behind `problem` (a solution-class proxy) and
    /// returns the best solution clone found.
    pub fn solve(&self, config: &SolverConfig, problem: Value) -> Result<SolveOutcome> {
        let terminate = AtomicBool::new(false);
        self.solve_with_controls(config, problem, &terminate)
    }

    /// Solves with an external termination flag.
    pub fn solve_with_controls(
        &self,
        config: &SolverConfig,
        problem: Value,
        terminate: &AtomicBool,
    ) -> Result<SolveOutcome> {
        console::init();
        let start = Instant::now();

        let solution_id = problem.as_proxy().ok_or_else(|| {
            BridgeError::Config("the problem instance must cross as a proxy".into())
        })?;
        let model = self.prepare(config, solution_id)?;

        let entity_count: usize = model.classes.iter().map(|p| p.entities.len()).sum();
        info!(
            event = "solve_start",
            solution = %solution_id,
            entity_count = entity_count,
            constraint_count = model.constraints.len(),
            time_limit_secs = config.time_limit.as_secs(),
        );

        let mut moves_evaluated = 0u64;
        self.construct(&model, &mut moves_evaluated)?;

        let mut current_score = self.score(&model)?;
        let mut best_score = current_score;
        let mut best = self.snapshot(&model, best_score)?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut moves = all_moves(&model);
        let mut steps = 0u64;

        loop {
            if terminate.load(Ordering::Relaxed) || start.elapsed() >= config.time_limit {
                break;
            }
            if config.step_limit.is_some_and(|limit| steps >= limit) {
                break;
            }

            moves.shuffle(&mut rng);
            let step_best = self.steepest(&model, &moves, &mut moves_evaluated)?;
            match step_best {
                Some((mv, score)) if score > current_score => {
                    self.apply(&model, mv)?;
                    current_score = score;
                    steps += 1;
                    debug!(event = "step", step = steps, score = %score);
                    if score > best_score {
                        best_score = score;
                        best = self.snapshot(&model, best_score)?;
                    }
                }
                // Local optimum: steepest descent has nothing left to take.
                _ => break,
            }
        }

        let duration = start.elapsed();
        info!(
            event = "solve_end",
            score = %best_score,
            feasible = best_score.is_feasible(),
            duration_ms = duration.as_millis() as u64,
            steps = steps,
            moves_evaluated = moves_evaluated,
        );

        Ok(SolveOutcome {
            solution: best,
            score: best_score,
            duration,
            steps,
            moves_evaluated,
        })
    }

    // Reads the solution shape through its shadow-class markers and
    // materializes the working model. All failures here are configuration
    // errors surfaced before search starts.
    fn prepare(&self, config: &SolverConfig, solution_id: ForeignObjectId) -> Result<WorkingModel> {
        let cb = self.callbacks();

        let solution_class = self.class(config.solution_class)?;
        if solution_class.role() != RoleKind::PlanningSolution {
            return Err(BridgeError::Config(format!(
                "class `{}` is a {}, not a PlanningSolution",
                solution_class.name(),
                solution_class.role()
            )));
        }

        let provider_class = self.class(config.constraint_provider)?;
        let provider = provider_class.provider().cloned().ok_or_else(|| {
            BridgeError::Config(format!(
                "class `{}` is not a ConstraintProvider",
                provider_class.name()
            ))
        })?;
        let constraints = provider(&ConstraintFactory::new())?;

        // Registration already guarantees exactly one score member.
        let score_member = solution_class
            .members_with(|m| matches!(m, Marker::PlanningScore))
            .first()
            .map(|m| m.name.clone())
            .ok_or_else(|| BridgeError::Internal("solution class lost its score member".into()))?;

        let mut ranges: Vec<(Option<Arc<str>>, Vec<Value>)> = Vec::new();
        for member in solution_class.members() {
            let provider_id = member.markers.iter().find_map(|m| match m {
                Marker::ValueRangeProvider { id } => Some(id.clone()),
                _ => None,
            });
            if let Some(id) = provider_id {
                let raw = (cb.get_attribute)(solution_id, &member.name)?;
                let values = (cb.array_to_refs)(raw)?;
                ranges.push((id, values));
            }
        }

        let collection_members =
            solution_class.members_with(|m| matches!(m, Marker::PlanningEntityCollectionProperty));
        if collection_members.len() != config.entity_classes.len() {
            return Err(BridgeError::Config(format!(
                "{} entity-collection members but {} configured entity classes",
                collection_members.len(),
                config.entity_classes.len()
            )));
        }

        let mut classes = Vec::new();
        for (member, &handle) in collection_members.iter().zip(&config.entity_classes) {
            let entity_class = self.class(handle)?;
            if entity_class.role() != RoleKind::PlanningEntity {
                return Err(BridgeError::Config(format!(
                    "class `{}` is a {}, not a PlanningEntity",
                    entity_class.name(),
                    entity_class.role()
                )));
            }

            let raw = (cb.get_attribute)(solution_id, &member.name)?;
            let entities = (cb.array_to_refs)(raw)?;
            let ids = entities
                .iter()
                .map(|e| {
                    e.as_proxy().ok_or_else(|| {
                        BridgeError::Config(format!(
                            "member `{}` holds a non-object element",
                            member.name
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let mut variables = Vec::new();
            for var_member in entity_class.members() {
                let refs = var_member.markers.iter().find_map(|m| match m {
                    Marker::PlanningVariable { value_range_refs } => Some(value_range_refs),
                    _ => None,
                });
                if let Some(refs) = refs {
                    let values =
                        resolve_value_range(&ranges, refs, entity_class.name(), &var_member.name)?;
                    variables.push(VariableSpec {
                        name: var_member.name.clone(),
                        values,
                    });
                }
            }

            classes.push(EntityClassPlan {
                handle,
                variables,
                entities,
                ids,
            });
        }

        let fact_members =
            solution_class.members_with(|m| matches!(m, Marker::ProblemFactCollectionProperty));
        if fact_members.len() != config.fact_classes.len() {
            return Err(BridgeError::Config(format!(
                "{} fact-collection members but {} configured fact classes",
                fact_members.len(),
                config.fact_classes.len()
            )));
        }
        let mut facts = HashMap::new();
        for (member, &handle) in fact_members.iter().zip(&config.fact_classes) {
            let raw = (cb.get_attribute)(solution_id, &member.name)?;
            facts.insert(handle, (cb.array_to_refs)(raw)?);
        }

        Ok(WorkingModel {
            solution: solution_id,
            score_member,
            classes,
            facts,
            constraints,
        })
    }

    // Best-fit construction: assign every uninitialized variable the value
    // that scores best at that point.
    fn construct(&self, model: &WorkingModel, moves_evaluated: &mut u64) -> Result<()> {
        let cb = self.callbacks();
        for plan in &model.classes {
            for &id in &plan.ids {
                for var in &plan.variables {
                    let current = (cb.get_attribute)(id, &var.name)?;
                    if !current.is_none() {
                        continue;
                    }
                    let mut best: Option<(Value, HardSoftScore)> = None;
                    for candidate in &var.values {
                        (cb.set_attribute)(id, &var.name, candidate.clone())?;
                        let score = self.score(model)?;
                        *moves_evaluated += 1;
                        if best.as_ref().map_or(true, |(_, b)| score > *b) {
                            best = Some((candidate.clone(), score));
                        }
                    }
                    let chosen = best.map(|(v, _)| v).unwrap_or(Value::None);
                    (cb.set_attribute)(id, &var.name, chosen)?;
                }
            }
        }
        Ok(())
    }

    // Evaluates all moves and returns the highest-scoring one.
    fn steepest(
        &self,
        model: &WorkingModel,
        moves: &[ChangeMove],
        moves_evaluated: &mut u64,
    ) -> Result<Option<(ChangeMove, HardSoftScore)>> {
        let cb = self.callbacks();
        let mut best: Option<(ChangeMove, HardSoftScore)> = None;
        for &mv in moves {
            let plan = &model.classes[mv.class_idx];
            let id = plan.ids[mv.entity_idx];
            let var = &plan.variables[mv.var_idx];
            let candidate = &var.values[mv.value_idx];

            let current = (cb.get_attribute)(id, &var.name)?;
            if current == *candidate {
                continue;
            }
            (cb.set_attribute)(id, &var.name, candidate.clone())?;
            let score = self.score(model)?;
            *moves_evaluated += 1;
            (cb.set_attribute)(id, &var.name, current)?;

            if best.as_ref().map_or(true, |(_, b)| score > *b) {
                best = Some((mv, score));
            }
        }
        Ok(best)
    }

    fn apply(&self, model: &WorkingModel, mv: ChangeMove) -> Result<()> {
        let cb = self.callbacks();
        let plan = &model.classes[mv.class_idx];
        let var = &plan.variables[mv.var_idx];
        (cb.set_attribute)(
            plan.ids[mv.entity_idx],
            &var.name,
            var.values[mv.value_idx].clone(),
        )
    }

    fn score(&self, model: &WorkingModel) -> Result<HardSoftScore> {
        model
            .constraints
            .iter()
            .try_fold(HardSoftScore::ZERO, |acc, c| Ok(acc + c.evaluate(model)?))
    }

    // Writes the score into the solution, then clones it through the host
    // deep-clone bridge so the snapshot survives further working mutation.
    fn snapshot(&self, model: &WorkingModel, score: HardSoftScore) -> Result<Value> {
        let cb = self.callbacks();
        (cb.set_attribute)(model.solution, &model.score_member, Value::Score(score))?;
        (cb.deep_clone)(model.solution)
    }
}

fn all_moves(model: &WorkingModel) -> Vec<ChangeMove> {
    let mut moves = Vec::new();
    for (class_idx, plan) in model.classes.iter().enumerate() {
        for entity_idx in 0..plan.ids.len() {
            for (var_idx, var) in plan.variables.iter().enumerate() {
                for value_idx in 0..var.values.len() {
                    moves.push(ChangeMove {
                        class_idx,
                        entity_idx,
                        var_idx,
                        value_idx,
                    });
                }
            }
        }
    }
    moves
}

fn resolve_value_range(
    ranges: &[(Option<Arc<str>>, Vec<Value>)],
    refs: &[Arc<str>],
    class_name: &str,
    member_name: &str,
) -> Result<Vec<Value>> {
    if refs.is_empty() {
        return match ranges {
            [(_, values)] => Ok(values.clone()),
            [] => Err(BridgeError::Config(format!(
                "variable `{class_name}.{member_name}` has no value range to draw from"
            ))),
            _ => Err(BridgeError::Config(format!(
                "variable `{class_name}.{member_name}` must name one of the {} value ranges",
                ranges.len()
            ))),
        };
    }
    let mut values = Vec::new();
    for wanted in refs {
        let found = ranges
            .iter()
            .find(|(id, _)| id.as_deref() == Some(wanted.as_ref()))
            .map(|(_, v)| v)
            .ok_or_else(|| {
                BridgeError::Config(format!(
                    "variable `{class_name}.{member_name}` references unknown value range `{wanted}`"
                ))
            })?;
        values.extend(found.iter().cloned());
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_value_range_sole_provider() {
        let ranges = vec![(None, vec![Value::I64(0), Value::I64(1)])];
        let values = resolve_value_range(&ranges, &[], "Lesson", "slot").unwrap();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_resolve_value_range_by_name() {
        let ranges = vec![
            (Some(Arc::from("rooms")), vec![Value::I64(0)]),
            (Some(Arc::from("slots")), vec![Value::I64(1), Value::I64(2)]),
        ];
        let values =
            resolve_value_range(&ranges, &[Arc::from("slots")], "Lesson", "slot").unwrap();
        assert_eq!(values, vec![Value::I64(1), Value::I64(2)]);
    }

    #[test]
    fn test_resolve_value_range_errors() {
        let ranges: Vec<(Option<Arc<str>>, Vec<Value>)> = Vec::new();
        assert!(resolve_value_range(&ranges, &[], "Lesson", "slot").is_err());

        let ranges = vec![
            (Some(Arc::from("a")), vec![]),
            (Some(Arc::from("b")), vec![]),
        ];
        // Ambiguous without a reference, unknown with a bad one.
        assert!(resolve_value_range(&ranges, &[], "Lesson", "slot").is_err());
        assert!(resolve_value_range(&ranges, &[Arc::from("c")], "Lesson", "slot").is_err());
    }
}
