//! Configuration for a solve run.

use std::time::Duration;

use crate::class::NativeClassHandle;

/// Configuration handed to [`crate::Engine::solve`].
///
/// Entity and fact class handles are paired, in order, with the solution
/// class's entity-collection and fact-collection members; a count mismatch is
/// a configuration error at solve preparation.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// The configured solution class.
    pub solution_class: NativeClassHandle,
    /// The configured constraint provider class.
    pub constraint_provider: NativeClassHandle,
    /// Entity classes, one per entity-collection member of the solution.
    pub entity_classes: Vec<NativeClassHandle>,
    /// Fact classes, one per fact-collection member of the solution.
    pub fact_classes: Vec<NativeClassHandle>,
    /// Maximum time to spend solving.
    pub time_limit: Duration,
    /// Maximum local-search steps, unlimited when absent.
    pub step_limit: Option<u64>,
    /// Seed for move-order shuffling.
    pub seed: u64,
}

impl SolverConfig {
    /// Creates a config with default termination (30s, no step limit).
    pub fn new(solution_class: NativeClassHandle, constraint_provider: NativeClassHandle) -> Self {
        Self {
            solution_class,
            constraint_provider,
            entity_classes: Vec::new(),
            fact_classes: Vec::new(),
            time_limit: Duration::from_secs(30),
            step_limit: None,
            seed: 0,
        }
    }

    /// Appends an entity class, paired with the next entity-collection member.
    pub fn with_entity_class(mut self, class: NativeClassHandle) -> Self {
        self.entity_classes.push(class);
        self
    }

    /// Appends a fact class, paired with the next fact-collection member.
    pub fn with_fact_class(mut self, class: NativeClassHandle) -> Self {
        self.fact_classes.push(class);
        self
    }

    /// Sets the time limit.
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Sets the local-search step limit.
    pub fn with_step_limit(mut self, step_limit: u64) -> Self {
        self.step_limit = Some(step_limit);
        self
    }

    /// Sets the shuffle seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
