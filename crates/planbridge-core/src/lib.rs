//! Planbridge Core - Shared types for the foreign-object bridge
//!
//! This crate provides the fundamental abstractions for Planbridge:
//! - Boundary value types crossing between the host object model and the engine
//! - Score types for representing solution quality
//! - The marker vocabulary mined from host classes at registration time
//! - The host-side dynamic object model (objects, classes, callables)

pub mod domain;
pub mod error;
pub mod marker;
pub mod score;
pub mod value;

pub use domain::{HostCallable, HostClass, HostMember, HostObject, HostRef};
pub use error::{BridgeError, Result};
pub use marker::{Marker, MemberMeta, RoleKind, TypeHint};
pub use score::HardSoftScore;
pub use value::{ForeignObjectId, Value};
