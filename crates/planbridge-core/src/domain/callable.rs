//! Host callables: fixed-arity host logic the engine can invoke back into.

use std::fmt;
use std::sync::Arc;

use crate::error::{BridgeError, Result};
use crate::value::Value;

type CallFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// A host-language callable of fixed arity (1, 2 or 3).
///
/// Invocations forward all arguments unmodified and return the result
/// unmodified. Concurrency safety is whatever the wrapped closure provides;
/// the bridge's functional adapter serializes calls at the boundary anyway.
#[derive(Clone)]
pub struct HostCallable {
    name: Arc<str>,
    arity: usize,
    call: CallFn,
}

impl HostCallable {
    /// Wraps a one-argument host function.
    pub fn unary(
        name: impl Into<Arc<str>>,
        f: impl Fn(Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity: 1,
            call: Arc::new(move |args| f(args[0].clone())),
        }
    }

    /// Wraps a two-argument host function.
    pub fn binary(
        name: impl Into<Arc<str>>,
        f: impl Fn(Value, Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity: 2,
            call: Arc::new(move |args| f(args[0].clone(), args[1].clone())),
        }
    }

    /// Wraps a three-argument host function.
    pub fn ternary(
        name: impl Into<Arc<str>>,
        f: impl Fn(Value, Value, Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity: 3,
            call: Arc::new(move |args| f(args[0].clone(), args[1].clone(), args[2].clone())),
        }
    }

    /// The callable's name, used in diagnostics.
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// The fixed arity this callable accepts.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Invokes the callable. The argument count must match the arity.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        if args.len() != self.arity {
            return Err(BridgeError::Internal(format!(
                "callable `{}` expects {} arguments, got {}",
                self.name,
                self.arity,
                args.len()
            )));
        }
        (self.call)(args)
    }
}

impl fmt::Debug for HostCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostCallable({}/{})", self.name, self.arity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarding_is_unmodified() {
        let add = HostCallable::binary("add", |a, b| {
            Ok(Value::I64(a.as_i64().unwrap() + b.as_i64().unwrap()))
        });
        assert_eq!(add.arity(), 2);
        let out = add.call(&[Value::I64(2), Value::I64(40)]).unwrap();
        assert_eq!(out, Value::I64(42));
    }

    #[test]
    fn test_arity_mismatch_is_an_error() {
        let ident = HostCallable::unary("ident", Ok);
        assert!(ident.call(&[]).is_err());
        assert!(ident.call(&[Value::None, Value::None]).is_err());
    }

    #[test]
    fn test_repeated_invocation() {
        let neg = HostCallable::unary("neg", |v| Ok(Value::I64(-v.as_i64().unwrap())));
        for i in 0..10 {
            assert_eq!(neg.call(&[Value::I64(i)]).unwrap(), Value::I64(-i));
        }
    }
}
