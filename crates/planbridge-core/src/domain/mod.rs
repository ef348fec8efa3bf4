//! The host-side dynamic object model.
//!
//! The host language is dynamically typed and cooperatively scheduled; this
//! module models its objects as [`HostObject`] values behind shared
//! [`HostRef`] handles with reference-identity semantics. A [`HostClass`] is
//! the registration-time dispatch table standing in for reflective attribute
//! lookup: attribute access goes through it by name, so computed (getter
//! style) members work the same as stored fields.

mod callable;
mod class;
mod object;

pub use callable::HostCallable;
pub use class::{Accessor, HostClass, HostMember};
pub use object::{HostObject, HostRef};
