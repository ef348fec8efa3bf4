//! Attribute access on behalf of the engine: the get/set callback pair.

use planbridge_core::{BridgeError, ForeignObjectId, Result, Value};

use crate::bridge::Bridge;

impl Bridge {
    /// Reads a named attribute of the host object behind `id`.
    ///
    /// Scalars and `None` cross back as raw values; anything else is
    /// registered and crosses as a proxy, so the native side never holds a
    /// host reference.
    pub fn get_attribute(&self, id: ForeignObjectId, name: &str) -> Result<Value> {
        let target = self.with_registry(|reg| reg.resolve(id))?;
        let object = match target {
            Value::Object(object) => object,
            other => {
                return Err(BridgeError::AttributeNotFound {
                    class: other.kind().to_string(),
                    name: name.to_string(),
                })
            }
        };
        let raw = self.host_call(|| object.get(name))?;
        if raw.is_none() || raw.is_scalar() {
            return Ok(raw);
        }
        self.with_registry(|reg| Ok(Value::Proxy(reg.id_for_value(raw))))
    }

    /// Writes a named attribute of the host object behind `id`.
    ///
    /// A top-level proxy argument is unwrapped to the host value it denotes
    /// before the write, so host objects never store proxies to other host
    /// objects.
    pub fn set_attribute(&self, id: ForeignObjectId, name: &str, value: Value) -> Result<()> {
        let (object, unwrapped) = self.with_registry(|reg| {
            let object = reg.resolve_object(id)?;
            let unwrapped = reg.resolve_value(&value)?;
            Ok((object, unwrapped))
        })?;
        self.host_call(|| object.set(name, unwrapped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planbridge_core::{HostClass, HostMember, HostRef};
    use std::sync::Arc;

    fn lesson() -> HostRef {
        HostRef::of_class(Arc::new(HostClass::new(
            "Lesson",
            vec![
                HostMember::new("slot"),
                HostMember::new("teacher"),
                HostMember::new("tags"),
            ],
        )))
    }

    #[test]
    fn test_scalar_round_trip() {
        let bridge = Bridge::new();
        let obj = lesson();
        let id = bridge
            .with_registry(|reg| Ok(reg.id_for_object(&obj)))
            .unwrap();

        bridge.set_attribute(id, "slot", Value::I64(3)).unwrap();
        assert_eq!(bridge.get_attribute(id, "slot").unwrap(), Value::I64(3));
        assert!(bridge.get_attribute(id, "teacher").unwrap().is_none());
    }

    #[test]
    fn test_object_attribute_crosses_as_proxy() {
        let bridge = Bridge::new();
        let outer = lesson();
        let inner = lesson();
        outer.set("tags", Value::Object(inner.clone())).unwrap();
        let id = bridge
            .with_registry(|reg| Ok(reg.id_for_object(&outer)))
            .unwrap();

        let crossed = bridge.get_attribute(id, "tags").unwrap();
        let inner_id = crossed.as_proxy().expect("objects cross as proxies");

        // Repeated reads keep the same identity.
        assert_eq!(bridge.get_attribute(id, "tags").unwrap(), crossed);
        let resolved = bridge
            .with_registry(|reg| reg.resolve_object(inner_id))
            .unwrap();
        assert!(resolved.ptr_eq(&inner));
    }

    #[test]
    fn test_set_unwraps_top_level_proxy() {
        let bridge = Bridge::new();
        let outer = lesson();
        let inner = lesson();
        let (outer_id, inner_id) = bridge
            .with_registry(|reg| Ok((reg.id_for_object(&outer), reg.id_for_object(&inner))))
            .unwrap();

        bridge
            .set_attribute(outer_id, "tags", Value::Proxy(inner_id))
            .unwrap();
        let stored = outer.get("tags").unwrap();
        assert!(stored.as_object().unwrap().ptr_eq(&inner));
    }

    #[test]
    fn test_attribute_errors_propagate() {
        let bridge = Bridge::new();
        let obj = lesson();
        let id = bridge
            .with_registry(|reg| Ok(reg.id_for_object(&obj)))
            .unwrap();

        assert!(matches!(
            bridge.get_attribute(id, "room"),
            Err(BridgeError::AttributeNotFound { .. })
        ));
        assert!(matches!(
            bridge.get_attribute(ForeignObjectId::new(999), "slot"),
            Err(BridgeError::UnknownObject(_))
        ));
    }
}
