//! Adapting host callables into the engine's functional-interface objects.

use std::sync::Arc;

use planbridge_core::{BridgeError, HostCallable, Result};
use planbridge_engine::{NativeFn1, NativeFn2, NativeFn3};

use crate::bridge::Bridge;

fn check_arity(callable: &HostCallable, expected: usize) -> Result<()> {
    if callable.arity() != expected {
        return Err(BridgeError::Config(format!(
            "callable `{}` has arity {}, expected {}",
            callable.name(),
            callable.arity(),
            expected
        )));
    }
    Ok(())
}

impl Bridge {
    /// Adapts a unary host callable into a native functional object.
    ///
    /// Every invocation takes the boundary lock, invokes the callable with
    /// the arguments unmodified and returns the result unmodified. The
    /// engine may call the adapter from any of its threads.
    pub fn native_fn1(self: &Arc<Self>, callable: HostCallable) -> Result<NativeFn1> {
        check_arity(&callable, 1)?;
        let bridge = Arc::clone(self);
        Ok(NativeFn1::new(move |a| {
            bridge.host_call(|| callable.call(&[a]))
        }))
    }

    /// Adapts a binary host callable into a native functional object.
    pub fn native_fn2(self: &Arc<Self>, callable: HostCallable) -> Result<NativeFn2> {
        check_arity(&callable, 2)?;
        let bridge = Arc::clone(self);
        Ok(NativeFn2::new(move |a, b| {
            bridge.host_call(|| callable.call(&[a, b]))
        }))
    }

    /// Adapts a ternary host callable into a native functional object.
    pub fn native_fn3(self: &Arc<Self>, callable: HostCallable) -> Result<NativeFn3> {
        check_arity(&callable, 3)?;
        let bridge = Arc::clone(self);
        Ok(NativeFn3::new(move |a, b, c| {
            bridge.host_call(|| callable.call(&[a, b, c]))
        }))
    }
}
