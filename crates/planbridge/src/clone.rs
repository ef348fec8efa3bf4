//! The clone callback: snapshots of the working solution for the engine.

use planbridge_core::{ForeignObjectId, Result, Value};

use crate::bridge::Bridge;

impl Bridge {
    /// Deep-clones the host object behind `id` and returns a proxy for the
    /// clone.
    ///
    /// The clone follows the host deep-copy contract (host-owned values
    /// copied, native-owned proxies kept shared) and is rooted in the
    /// registry so it stays alive however long the engine keeps the proxy.
    pub fn deep_clone(&self, id: ForeignObjectId) -> Result<Value> {
        let object = self.with_registry(|reg| reg.resolve_object(id))?;
        let clone = self.host_call(|| object.deep_copy())?;
        self.with_registry(|reg| {
            reg.retain(clone.clone());
            Ok(Value::Proxy(reg.id_for_object(&clone)))
        })
    }
}
