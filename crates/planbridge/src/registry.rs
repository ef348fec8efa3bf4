//! The identity registry: the sole strong-reference holder on the host side.

use std::collections::HashMap;

use planbridge_core::{BridgeError, ForeignObjectId, HostRef, Result, Value};

/// Maps native identities to the host values behind them.
///
/// Host objects get one id per identity: re-crossing the same object yields
/// the same id and resolving that id yields the identical host reference,
/// which is what lets the engine compare identities for change detection.
/// Aggregates (sequences, mappings) have value semantics on the host side
/// and get a fresh id per crossing.
///
/// Entries are created lazily on first crossing and never deleted: native
/// proxies hold only the id, so the registry is the one strong holder, and
/// with no expiration policy its growth is unbounded for process lifetime.
/// That is a known, accepted resource characteristic of the design, not
/// something callers should try to work around per call.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    next_id: u64,
    by_id: HashMap<ForeignObjectId, Value>,
    id_by_addr: HashMap<usize, ForeignObjectId>,
    // Deep-clone roots, kept alive until process exit (the native side may
    // hold their proxies indefinitely).
    retained: Vec<HostRef>,
}

impl IdentityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The id for a host object, assigning one on first crossing.
    pub fn id_for_object(&mut self, object: &HostRef) -> ForeignObjectId {
        if let Some(&id) = self.id_by_addr.get(&object.addr()) {
            return id;
        }
        let id = self.fresh();
        self.id_by_addr.insert(object.addr(), id);
        self.by_id.insert(id, Value::Object(object.clone()));
        id
    }

    /// Registers an arbitrary host value and returns its id. Objects are
    /// routed through [`Self::id_for_object`]; other values get a fresh
    /// entry per call.
    pub fn id_for_value(&mut self, value: Value) -> ForeignObjectId {
        if let Value::Object(ref object) = value {
            return self.id_for_object(object);
        }
        let id = self.fresh();
        self.by_id.insert(id, value);
        id
    }

    /// The host value registered under an id.
    pub fn resolve(&self, id: ForeignObjectId) -> Result<Value> {
        self.by_id
            .get(&id)
            .cloned()
            .ok_or(BridgeError::UnknownObject(id))
    }

    /// The host object registered under an id; fails if the entry is not an
    /// object.
    pub fn resolve_object(&self, id: ForeignObjectId) -> Result<HostRef> {
        match self.resolve(id)? {
            Value::Object(object) => Ok(object),
            other => Err(BridgeError::Internal(format!(
                "id {id} denotes a {}, not an object",
                other.kind()
            ))),
        }
    }

    /// Resolves a native value to its host-side form: proxies are looked up,
    /// everything else crosses unchanged.
    pub fn resolve_value(&self, value: &Value) -> Result<Value> {
        match value {
            Value::Proxy(id) => self.resolve(*id),
            other => Ok(other.clone()),
        }
    }

    /// Roots a deep-clone result so it outlives the working graph.
    pub fn retain(&mut self, object: HostRef) {
        self.retained.push(object);
    }

    /// Number of live entries, for diagnostics.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if nothing has crossed yet.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    fn fresh(&mut self) -> ForeignObjectId {
        let id = ForeignObjectId::new(self.next_id);
        self.next_id += 1;
        id
    }
}
