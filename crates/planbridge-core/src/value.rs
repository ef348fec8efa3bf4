//! Boundary value types crossing between the host object model and the engine.

use std::fmt;
use std::sync::Arc;

use crate::domain::HostRef;
use crate::score::HardSoftScore;

/// Opaque identity of one host object (or aggregate) for the duration it
/// participates in native-runtime computation.
///
/// Two crossings of the same host object yield the same id; the id stays
/// valid as long as the identity registry holds the entry (process lifetime,
/// see [`crate::domain`] docs on the known unbounded-growth characteristic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForeignObjectId(u64);

impl ForeignObjectId {
    /// Creates an id from a raw counter value.
    pub const fn new(raw: u64) -> Self {
        ForeignObjectId(raw)
    }

    /// Returns the raw id value.
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ForeignObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A value at the host/native boundary.
///
/// Scalars (`I64`, `F64`, `Bool`, `Str`, `Score`) cross the boundary as raw
/// boxed values. `Object` is a host-side reference and never leaves the host
/// side; its native-side stand-in is `Proxy`, which holds only the identity,
/// never a reference, so the native side can drop proxies freely.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// No value assigned (uninitialized planning variable, absent attribute).
    #[default]
    None,
    /// 64-bit signed integer.
    I64(i64),
    /// 64-bit floating point.
    F64(f64),
    /// Boolean value.
    Bool(bool),
    /// String value.
    Str(Arc<str>),
    /// A domain score value. Scores are scalars at the boundary.
    Score(HardSoftScore),
    /// Sequence of values.
    List(Vec<Value>),
    /// Ordered mapping. Pairs rather than a hash map: `F64` keys are legal.
    Map(Vec<(Value, Value)>),
    /// Host-side object reference.
    Object(HostRef),
    /// Native-side stand-in for a registered host object or aggregate.
    Proxy(ForeignObjectId),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => {
                (a - b).abs() < f64::EPSILON || (a.is_nan() && b.is_nan())
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Score(a), Value::Score(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Reference equality: two host references are equal only when they
            // denote the same object.
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Proxy(a), Value::Proxy(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Returns true if this value is `None`.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns true for values that cross the boundary as raw boxed scalars.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::I64(_) | Value::F64(_) | Value::Bool(_) | Value::Str(_) | Value::Score(_)
        )
    }

    /// A short name for the value's shape, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::I64(_) => "i64",
            Value::F64(_) => "f64",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::Score(_) => "score",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::Proxy(_) => "proxy",
        }
    }

    /// Attempts to extract an i64 value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to extract an f64 value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            Value::I64(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Attempts to extract a bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to extract a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a score value.
    pub fn as_score(&self) -> Option<HardSoftScore> {
        match self {
            Value::Score(s) => Some(*s),
            _ => None,
        }
    }

    /// Attempts to extract a sequence.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    /// Attempts to extract a mapping.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Attempts to extract a host object reference.
    pub fn as_object(&self) -> Option<&HostRef> {
        match self {
            Value::Object(r) => Some(r),
            _ => None,
        }
    }

    /// Attempts to extract a proxy identity.
    pub fn as_proxy(&self) -> Option<ForeignObjectId> {
        match self {
            Value::Proxy(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl From<HardSoftScore> for Value {
    fn from(v: HardSoftScore) -> Self {
        Value::Score(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<HostRef> for Value {
    fn from(v: HostRef) -> Self {
        Value::Object(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HostClass, HostObject};

    #[test]
    fn test_scalar_accessors() {
        let v = Value::I64(42);
        assert!(v.is_scalar());
        assert_eq!(v.as_i64(), Some(42));
        assert_eq!(v.as_f64(), Some(42.0));

        let v = Value::None;
        assert!(v.is_none());
        assert_eq!(v.as_i64(), None);

        let v: Value = "queen".into();
        assert_eq!(v.as_str(), Some("queen"));
        assert!(!Value::List(vec![]).is_scalar());
    }

    #[test]
    fn test_object_equality_is_identity() {
        let class = Arc::new(HostClass::new("Thing", vec![]));
        let a = HostObject::new(Arc::clone(&class)).into_ref();
        let b = HostObject::new(class).into_ref();

        assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
        assert_ne!(Value::Object(a), Value::Object(b));
    }

    #[test]
    fn test_nested_equality() {
        let a = Value::List(vec![
            Value::I64(1),
            Value::Map(vec![(Value::from("k"), Value::F64(2.0))]),
        ]);
        let b = Value::List(vec![
            Value::I64(1),
            Value::Map(vec![(Value::from("k"), Value::F64(2.0))]),
        ]);
        assert_eq!(a, b);
    }
}
