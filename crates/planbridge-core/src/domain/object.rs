//! Host objects and the deep-copy contract the clone bridge relies on.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::{BridgeError, Result};
use crate::value::Value;

use super::class::HostClass;

/// A host-language object: a class reference plus named field storage.
///
/// All attribute access goes through the class dispatch table. Unknown names
/// fail with [`BridgeError::AttributeNotFound`] on both paths; a declared but
/// never-written stored field reads as [`Value::None`].
#[derive(Debug, Clone)]
pub struct HostObject {
    class: Arc<HostClass>,
    fields: HashMap<Arc<str>, Value>,
}

impl HostObject {
    /// Creates an object of the given class with all stored fields unset.
    pub fn new(class: Arc<HostClass>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    /// The object's class.
    pub fn class(&self) -> &Arc<HostClass> {
        &self.class
    }

    /// Reads an attribute through the accessor convention: computed members
    /// run their accessor, stored members read the field map.
    pub fn get(&self, name: &str) -> Result<Value> {
        let member = self
            .class
            .member(name)
            .ok_or_else(|| self.attribute_not_found(name))?;
        if let Some(accessor) = member.accessor() {
            return accessor(self);
        }
        Ok(self.fields.get(name).cloned().unwrap_or(Value::None))
    }

    /// Writes a stored attribute. Computed members have no mutator.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let member = self
            .class
            .member(name)
            .ok_or_else(|| self.attribute_not_found(name))?;
        if member.is_computed() {
            return Err(self.attribute_not_found(name));
        }
        self.fields.insert(member.name().clone(), value);
        Ok(())
    }

    /// Wraps this object in a shared reference handle.
    pub fn into_ref(self) -> HostRef {
        HostRef(Arc::new(Mutex::new(self)))
    }

    fn attribute_not_found(&self, name: &str) -> BridgeError {
        BridgeError::AttributeNotFound {
            class: self.class.name().to_string(),
            name: name.to_string(),
        }
    }

    fn from_parts(class: Arc<HostClass>, fields: HashMap<Arc<str>, Value>) -> Self {
        Self { class, fields }
    }
}

/// A shared handle to a host object, with reference-identity semantics.
#[derive(Clone)]
pub struct HostRef(Arc<Mutex<HostObject>>);

impl HostRef {
    /// Creates a handle for a fresh object of the given class.
    pub fn of_class(class: Arc<HostClass>) -> Self {
        HostObject::new(class).into_ref()
    }

    /// Returns true if both handles denote the same object.
    pub fn ptr_eq(&self, other: &HostRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// A stable address usable as an identity key while the object lives.
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// The name of the object's class.
    pub fn class_name(&self) -> Arc<str> {
        self.0.lock().unwrap().class().name().clone()
    }

    /// Reads an attribute by name.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.0.lock().unwrap().get(name)
    }

    /// Writes an attribute by name.
    pub fn set(&self, name: &str, value: Value) -> Result<()> {
        self.0.lock().unwrap().set(name, value)
    }

    /// The host deep-copy contract.
    ///
    /// Shallow-copies the object, then recursively deep-copies every
    /// attribute value that is not an opaque native-runtime object.
    /// `Value::Proxy` attributes stay aliased: they point back into the
    /// native runtime's own managed graph (score objects and the like),
    /// which the native side's own cloning mechanism handles. A memo map
    /// preserves aliasing within the copied graph and terminates cycles.
    pub fn deep_copy(&self) -> Result<HostRef> {
        let mut memo = HashMap::new();
        self.deep_copy_memo(&mut memo)
    }

    fn deep_copy_memo(&self, memo: &mut HashMap<usize, HostRef>) -> Result<HostRef> {
        if let Some(existing) = memo.get(&self.addr()) {
            return Ok(existing.clone());
        }
        // Snapshot under the object lock, then copy without holding it so
        // nested objects can be visited.
        let (class, fields) = {
            let guard = self.0.lock().unwrap();
            (guard.class.clone(), guard.fields.clone())
        };
        let clone = HostObject::from_parts(class, fields.clone()).into_ref();
        memo.insert(self.addr(), clone.clone());
        for (name, value) in &fields {
            let copied = deep_copy_value(value, memo)?;
            clone.0.lock().unwrap().fields.insert(name.clone(), copied);
        }
        Ok(clone)
    }
}

fn deep_copy_value(value: &Value, memo: &mut HashMap<usize, HostRef>) -> Result<Value> {
    match value {
        Value::Object(r) => Ok(Value::Object(r.deep_copy_memo(memo)?)),
        Value::List(items) => items
            .iter()
            .map(|v| deep_copy_value(v, memo))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        Value::Map(pairs) => pairs
            .iter()
            .map(|(k, v)| Ok((deep_copy_value(k, memo)?, deep_copy_value(v, memo)?)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Map),
        // Native-owned: stays shared, not copied.
        Value::Proxy(_) => Ok(value.clone()),
        other => Ok(other.clone()),
    }
}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostRef({} @ {:#x})", self.class_name(), self.addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HostMember;
    use crate::marker::Marker;
    use crate::value::ForeignObjectId;

    fn lesson_class() -> Arc<HostClass> {
        Arc::new(HostClass::new(
            "Lesson",
            vec![
                HostMember::new("id").with_marker(Marker::PlanningId),
                HostMember::new("slot"),
                HostMember::new("tags"),
                HostMember::new("score"),
            ],
        ))
    }

    #[test]
    fn test_get_set_round_trip() {
        let obj = HostRef::of_class(lesson_class());
        assert!(obj.get("slot").unwrap().is_none());

        obj.set("slot", Value::I64(3)).unwrap();
        assert_eq!(obj.get("slot").unwrap(), Value::I64(3));
    }

    #[test]
    fn test_unknown_attribute_propagates() {
        let obj = HostRef::of_class(lesson_class());
        let err = obj.get("room").unwrap_err();
        assert!(matches!(err, BridgeError::AttributeNotFound { .. }));
        assert!(obj.set("room", Value::I64(1)).is_err());
    }

    #[test]
    fn test_computed_member_has_no_mutator() {
        let class = Arc::new(HostClass::new(
            "Derived",
            vec![
                HostMember::new("base"),
                HostMember::computed("doubled", |obj| {
                    let base = obj.get("base")?.as_i64().unwrap_or(0);
                    Ok(Value::I64(base * 2))
                }),
            ],
        ));
        let obj = HostRef::of_class(class);
        obj.set("base", Value::I64(21)).unwrap();
        assert_eq!(obj.get("doubled").unwrap(), Value::I64(42));
        assert!(obj.set("doubled", Value::I64(0)).is_err());
    }

    #[test]
    fn test_deep_copy_host_owned_fields_do_not_alias() {
        let outer = HostRef::of_class(lesson_class());
        let inner = HostRef::of_class(lesson_class());
        inner.set("slot", Value::I64(1)).unwrap();
        outer.set("tags", Value::Object(inner.clone())).unwrap();
        outer
            .set("slot", Value::List(vec![Value::I64(1), Value::I64(2)]))
            .unwrap();

        let copy = outer.deep_copy().unwrap();
        let copied_inner = copy.get("tags").unwrap();
        let copied_inner = copied_inner.as_object().unwrap();
        assert!(!copied_inner.ptr_eq(&inner));

        copied_inner.set("slot", Value::I64(99)).unwrap();
        assert_eq!(inner.get("slot").unwrap(), Value::I64(1));
    }

    #[test]
    fn test_deep_copy_native_owned_fields_stay_shared() {
        let obj = HostRef::of_class(lesson_class());
        obj.set("score", Value::Proxy(ForeignObjectId::new(7)))
            .unwrap();

        let copy = obj.deep_copy().unwrap();
        assert_eq!(
            copy.get("score").unwrap(),
            Value::Proxy(ForeignObjectId::new(7))
        );
    }

    #[test]
    fn test_deep_copy_preserves_internal_aliasing_and_cycles() {
        let a = HostRef::of_class(lesson_class());
        let b = HostRef::of_class(lesson_class());
        a.set("tags", Value::Object(b.clone())).unwrap();
        b.set("tags", Value::Object(a.clone())).unwrap();

        let copy_a = a.deep_copy().unwrap();
        let copy_b = copy_a.get("tags").unwrap();
        let copy_b = copy_b.as_object().unwrap().clone();
        let back = copy_b.get("tags").unwrap();
        assert!(back.as_object().unwrap().ptr_eq(&copy_a));
    }
}
