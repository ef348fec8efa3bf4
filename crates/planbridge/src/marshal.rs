//! Aggregate marshaling between host values and native values.
//!
//! Scalars cross unchanged in both directions. Host objects inside an
//! aggregate are registered and replaced by proxies on the way out; proxies
//! inside a native aggregate are resolved back to the host values they denote
//! on the way in. Conversion is recursive, so nesting depth is preserved.

use planbridge_core::{BridgeError, Result, Value};

use crate::bridge::Bridge;
use crate::registry::IdentityRegistry;

/// Converts a host value into its native-side form.
pub(crate) fn to_native(registry: &mut IdentityRegistry, value: &Value) -> Result<Value> {
    match value {
        Value::Object(object) => Ok(Value::Proxy(registry.id_for_object(object))),
        Value::List(items) => to_native_list(registry, items),
        Value::Map(pairs) => to_native_map(registry, pairs),
        other => Ok(other.clone()),
    }
}

pub(crate) fn to_native_list(registry: &mut IdentityRegistry, items: &[Value]) -> Result<Value> {
    items
        .iter()
        .map(|v| to_native(registry, v))
        .collect::<Result<Vec<_>>>()
        .map(Value::List)
}

pub(crate) fn to_native_map(
    registry: &mut IdentityRegistry,
    pairs: &[(Value, Value)],
) -> Result<Value> {
    pairs
        .iter()
        .map(|(k, v)| Ok((to_native(registry, k)?, to_native(registry, v)?)))
        .collect::<Result<Vec<_>>>()
        .map(Value::Map)
}

/// Converts a native value back into its host-side form.
pub(crate) fn to_host(registry: &IdentityRegistry, value: &Value) -> Result<Value> {
    match value {
        Value::Proxy(id) => registry.resolve(*id),
        Value::List(items) => items
            .iter()
            .map(|v| to_host(registry, v))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        Value::Map(pairs) => pairs
            .iter()
            .map(|(k, v)| Ok((to_host(registry, k)?, to_host(registry, v)?)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Map),
        other => Ok(other.clone()),
    }
}

impl Bridge {
    /// Marshals a host sequence into a native sequence.
    pub fn to_native_list(&self, items: &[Value]) -> Result<Value> {
        self.with_registry(|reg| to_native_list(reg, items))
    }

    /// Marshals a host mapping into a native mapping.
    pub fn to_native_map(&self, pairs: &[(Value, Value)]) -> Result<Value> {
        self.with_registry(|reg| to_native_map(reg, pairs))
    }

    /// Marshals a native value back into its host form.
    pub fn to_host(&self, value: &Value) -> Result<Value> {
        self.with_registry(|reg| to_host(reg, value))
    }

    /// Marshals a native sequence into a vector of host values, resolving a
    /// proxy to a registered sequence first. A non-sequence is a marshal
    /// error.
    pub fn to_host_array(&self, value: &Value) -> Result<Vec<Value>> {
        self.with_registry(|reg| {
            let resolved = reg.resolve_value(value)?;
            let items = resolved.as_list().ok_or_else(|| {
                BridgeError::Marshal(format!(
                    "expected a sequence to convert, got {}",
                    resolved.kind()
                ))
            })?;
            items.iter().map(|v| to_host(reg, v)).collect()
        })
    }

    /// The engine's array callback: flattens a host sequence (crossed either
    /// raw or as a proxy to a registered sequence) into one native value per
    /// element.
    pub(crate) fn array_to_refs(&self, value: Value) -> Result<Vec<Value>> {
        self.with_registry(|reg| {
            let resolved = reg.resolve_value(&value)?;
            let items = resolved.as_list().ok_or_else(|| {
                BridgeError::Marshal(format!(
                    "expected a sequence to convert, got {}",
                    resolved.kind()
                ))
            })?;
            // Work on a copy: registering elements needs the registry mutably.
            let items = items.to_vec();
            items.iter().map(|v| to_native(reg, v)).collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planbridge_core::{HostClass, HostRef};
    use std::sync::Arc;

    fn object() -> HostRef {
        HostRef::of_class(Arc::new(HostClass::new("Fact", vec![])))
    }

    #[test]
    fn test_nested_round_trip_preserves_structure() {
        let bridge = Bridge::new();
        let obj = object();
        // Five levels deep, objects at the leaves.
        let host = Value::List(vec![Value::Map(vec![(
            Value::from("k"),
            Value::List(vec![Value::Map(vec![(
                Value::I64(1),
                Value::List(vec![Value::Object(obj.clone()), Value::I64(7)]),
            )])]),
        )])]);

        let native = bridge.to_native_list(host.as_list().unwrap()).unwrap();
        // No host reference survives on the native side.
        fn assert_no_objects(v: &Value) {
            match v {
                Value::Object(_) => panic!("host reference leaked across the boundary"),
                Value::List(items) => items.iter().for_each(assert_no_objects),
                Value::Map(pairs) => pairs.iter().for_each(|(k, v)| {
                    assert_no_objects(k);
                    assert_no_objects(v);
                }),
                _ => {}
            }
        }
        assert_no_objects(&native);

        let back = bridge.to_host(&native).unwrap();
        assert_eq!(back, host);
    }

    #[test]
    fn test_object_elements_keep_identity() {
        let bridge = Bridge::new();
        let obj = object();
        let a = bridge
            .to_native_list(&[Value::Object(obj.clone())])
            .unwrap();
        let b = bridge
            .to_native_list(&[Value::Object(obj.clone())])
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_array_to_refs() {
        let bridge = Bridge::new();
        let obj = object();
        let list = Value::List(vec![Value::Object(obj.clone()), Value::I64(2)]);
        let id = bridge
            .with_registry(|reg| Ok(reg.id_for_value(list)))
            .unwrap();

        let refs = bridge.array_to_refs(Value::Proxy(id)).unwrap();
        assert_eq!(refs.len(), 2);
        assert!(refs[0].as_proxy().is_some());
        assert_eq!(refs[1], Value::I64(2));

        assert!(matches!(
            bridge.array_to_refs(Value::I64(3)),
            Err(BridgeError::Marshal(_))
        ));
    }

    #[test]
    fn test_to_host_array_restores_host_references() {
        let bridge = Bridge::new();
        let obj = object();
        let native = bridge
            .to_native_list(&[Value::Object(obj.clone()), Value::I64(2)])
            .unwrap();

        let back = bridge.to_host_array(&native).unwrap();
        assert_eq!(back.len(), 2);
        assert!(back[0].as_object().unwrap().ptr_eq(&obj));
        assert_eq!(back[1], Value::I64(2));

        assert!(matches!(
            bridge.to_host_array(&Value::Bool(true)),
            Err(BridgeError::Marshal(_))
        ));
    }
}
