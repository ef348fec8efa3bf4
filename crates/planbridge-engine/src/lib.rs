//! The native-runtime engine collaborator for Planbridge.
//!
//! This crate plays the role of the external solving engine: it consumes
//! synthesized shadow classes and a table of host callbacks, and during
//! solving reads, writes and clones domain state exclusively through those
//! callbacks. It never holds a host reference; everything it touches is an
//! opaque proxy identity.
//!
//! The solver itself is deliberately small (best-fit construction plus
//! steepest-descent change moves); the interesting contract is that every
//! field access crosses the boundary.

mod callbacks;
mod class;
pub mod console;
mod config;
mod constraint;
mod engine;
mod solve;

pub use callbacks::{HostCallbacks, NativeFn1, NativeFn2, NativeFn3};
pub use class::{NativeClass, NativeClassHandle};
pub use config::SolverConfig;
pub use constraint::{
    BiStream, Constraint, ConstraintFactory, ConstraintProviderFn, EntitySource, ImpactType,
    UniStream,
};
pub use engine::Engine;
pub use solve::SolveOutcome;
