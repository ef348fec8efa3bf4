//! The callback table the bridge installs into the engine, and the
//! functional-interface types host callables are adapted into.

use std::fmt;
use std::sync::Arc;

use planbridge_core::{ForeignObjectId, Result, Value};

/// A single-method functional object of arity 1.
#[derive(Clone)]
pub struct NativeFn1(Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>);

impl NativeFn1 {
    /// Wraps a closure as a functional object.
    pub fn new(f: impl Fn(Value) -> Result<Value> + Send + Sync + 'static) -> Self {
        NativeFn1(Arc::new(f))
    }

    /// Invokes the wrapped function.
    pub fn apply(&self, a: Value) -> Result<Value> {
        (self.0)(a)
    }
}

/// A single-method functional object of arity 2.
#[derive(Clone)]
pub struct NativeFn2(Arc<dyn Fn(Value, Value) -> Result<Value> + Send + Sync>);

impl NativeFn2 {
    /// Wraps a closure as a functional object.
    pub fn new(f: impl Fn(Value, Value) -> Result<Value> + Send + Sync + 'static) -> Self {
        NativeFn2(Arc::new(f))
    }

    /// Invokes the wrapped function.
    pub fn apply(&self, a: Value, b: Value) -> Result<Value> {
        (self.0)(a, b)
    }
}

/// A single-method functional object of arity 3.
#[derive(Clone)]
pub struct NativeFn3(Arc<dyn Fn(Value, Value, Value) -> Result<Value> + Send + Sync>);

impl NativeFn3 {
    /// Wraps a closure as a functional object.
    pub fn new(f: impl Fn(Value, Value, Value) -> Result<Value> + Send + Sync + 'static) -> Self {
        NativeFn3(Arc::new(f))
    }

    /// Invokes the wrapped function.
    pub fn apply(&self, a: Value, b: Value, c: Value) -> Result<Value> {
        (self.0)(a, b, c)
    }
}

macro_rules! impl_fn_debug {
    ($($ty:ident),*) => {
        $(impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(stringify!($ty))
            }
        })*
    };
}

impl_fn_debug!(NativeFn1, NativeFn2, NativeFn3);

/// The four boundary operations the engine needs from the host side.
///
/// Installed once at engine construction; every call is synchronous and
/// blocks the calling engine thread until the host call returns. The bridge
/// guarantees at most one in-flight host call at a time.
#[derive(Clone)]
pub struct HostCallbacks {
    /// Reads a named attribute of the object behind an identity.
    pub get_attribute: Arc<dyn Fn(ForeignObjectId, &str) -> Result<Value> + Send + Sync>,
    /// Writes a named attribute of the object behind an identity.
    pub set_attribute: Arc<dyn Fn(ForeignObjectId, &str, Value) -> Result<()> + Send + Sync>,
    /// Deep-clones the object behind an identity, returning a proxy for the
    /// rooted clone.
    pub deep_clone: Arc<dyn Fn(ForeignObjectId) -> Result<Value> + Send + Sync>,
    /// Converts a host sequence (crossed as a reference) into an array of
    /// native values, one object reference per element.
    pub array_to_refs: Arc<dyn Fn(Value) -> Result<Vec<Value>> + Send + Sync>,
}

impl fmt::Debug for HostCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HostCallbacks")
    }
}
