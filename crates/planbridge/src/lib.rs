//! Planbridge - a foreign-object bridge for a native planning engine.
//!
//! Domain objects live in a dynamically-typed host object model; the solving
//! engine is native and only understands synthesized shadow classes and
//! opaque proxies. This crate is the bridge between the two: it registers
//! host classes (mining their domain markers into native class metadata),
//! services the engine's attribute/clone callbacks, marshals aggregates
//! across the boundary, and serializes every crossing into host logic behind
//! one reentrant lock.
//!
//! ```no_run
//! use std::sync::Arc;
//! use planbridge::{Bridge, HostClass, HostMember, Marker, TypeHint};
//!
//! # fn main() -> planbridge::Result<()> {
//! let bridge = Bridge::new();
//! let lesson = Arc::new(HostClass::new(
//!     "Lesson",
//!     vec![
//!         HostMember::new("id").with_marker(Marker::PlanningId),
//!         HostMember::new("slot")
//!             .with_hint(TypeHint::I64)
//!             .with_marker(Marker::PlanningVariable { value_range_refs: vec![] }),
//!     ],
//! ));
//! let lesson_class = bridge.planning_entity_class(&lesson)?;
//! # let _ = lesson_class;
//! # Ok(())
//! # }
//! ```

mod attribute;
mod bridge;
mod clone;
mod functional;
mod manager;
mod marshal;
mod registry;
mod synthesize;

pub use bridge::Bridge;
pub use manager::{SolveStatus, SolverManager};
pub use registry::IdentityRegistry;

pub use planbridge_core::{
    BridgeError, ForeignObjectId, HardSoftScore, HostCallable, HostClass, HostMember, HostObject,
    HostRef, Marker, MemberMeta, Result, RoleKind, TypeHint, Value,
};
pub use planbridge_engine::{
    console, BiStream, Constraint, ConstraintFactory, Engine, NativeClassHandle, NativeFn1,
    NativeFn2, NativeFn3, SolveOutcome, SolverConfig, UniStream,
};
