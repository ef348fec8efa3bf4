//! The bridge itself: boundary lock, engine wiring, and the solve surface.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::{Arc, Weak};

use parking_lot::ReentrantMutex;
use tracing::info;

use planbridge_core::{BridgeError, HostRef, Result, Value};
use planbridge_engine::{Engine, HostCallbacks, SolveOutcome, SolverConfig};

use crate::registry::IdentityRegistry;

/// The coordinating component of the bridge.
///
/// Owns the identity registry behind the global boundary lock, the engine
/// (with this bridge's callbacks installed) and the shadow-class name
/// counter. The host side runs cooperatively on one logical thread, so every
/// crossing from native code into host logic takes the boundary lock first:
/// at most one host call is in flight at a time, however many threads the
/// engine uses. The lock is reentrant because host callables invoked by the
/// engine legitimately read attributes back through the bridge on the same
/// thread.
pub struct Bridge {
    engine: Arc<Engine>,
    host: ReentrantMutex<RefCell<IdentityRegistry>>,
    pub(crate) class_counter: AtomicU64,
}

impl Bridge {
    /// Creates a bridge with a fresh engine wired to its callbacks.
    pub fn new() -> Arc<Bridge> {
        Arc::new_cyclic(|weak: &Weak<Bridge>| {
            let callbacks = HostCallbacks {
                get_attribute: {
                    let weak = weak.clone();
                    Arc::new(move |id, name| upgrade(&weak)?.get_attribute(id, name))
                },
                set_attribute: {
                    let weak = weak.clone();
                    Arc::new(move |id, name, value| upgrade(&weak)?.set_attribute(id, name, value))
                },
                deep_clone: {
                    let weak = weak.clone();
                    Arc::new(move |id| upgrade(&weak)?.deep_clone(id))
                },
                array_to_refs: {
                    let weak = weak.clone();
                    Arc::new(move |value| upgrade(&weak)?.array_to_refs(value))
                },
            };
            Bridge {
                engine: Arc::new(Engine::new(callbacks)),
                host: ReentrantMutex::new(RefCell::new(IdentityRegistry::new())),
                class_counter: AtomicU64::new(0),
            }
        })
    }

    /// The engine this bridge feeds.
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Registers a host object and returns the proxy the native side sees.
    ///
    /// Idempotent per identity: wrapping the same object again returns the
    /// same proxy.
    pub fn wrap_object(&self, object: &HostRef) -> Value {
        let guard = self.host.lock();
        let id = guard.borrow_mut().id_for_object(object);
        Value::Proxy(id)
    }

    /// Solves `problem` (a host object satisfying the solution contract) and
    /// returns the best solution found, unwrapped back to host identity.
    pub fn solve(&self, config: &SolverConfig, problem: &HostRef) -> Result<HostRef> {
        let terminate = AtomicBool::new(false);
        self.solve_with_controls(config, problem, &terminate)
    }

    /// Solves with an external termination flag.
    pub fn solve_with_controls(
        &self,
        config: &SolverConfig,
        problem: &HostRef,
        terminate: &AtomicBool,
    ) -> Result<HostRef> {
        let outcome = self.solve_for_outcome(config, problem, terminate)?;
        self.unwrap_value(&outcome.solution)
    }

    /// Solves and returns the engine outcome (score, stats, best proxy).
    pub fn solve_for_outcome(
        &self,
        config: &SolverConfig,
        problem: &HostRef,
        terminate: &AtomicBool,
    ) -> Result<SolveOutcome> {
        let proxy = self.wrap_object(problem);
        info!(event = "problem_registered", class = %problem.class_name());
        self.engine.solve_with_controls(config, proxy, terminate)
    }

    /// Unwraps a native value back to the host object it stands for.
    pub fn unwrap_value(&self, value: &Value) -> Result<HostRef> {
        let id = value.as_proxy().ok_or_else(|| {
            BridgeError::Internal(format!(
                "expected a proxy to unwrap, got {}",
                value.kind()
            ))
        })?;
        self.with_registry(|reg| reg.resolve_object(id))
    }

    // Runs registry work under the boundary lock. The closure must not call
    // into host logic: reentrant crossings re-borrow the registry, so the
    // borrow must never be live across a host call.
    pub(crate) fn with_registry<R>(
        &self,
        f: impl FnOnce(&mut IdentityRegistry) -> Result<R>,
    ) -> Result<R> {
        let guard = self.host.lock();
        let mut registry = guard.borrow_mut();
        f(&mut registry)
    }

    // Runs host logic under the boundary lock without touching the registry.
    pub(crate) fn host_call<R>(&self, f: impl FnOnce() -> Result<R>) -> Result<R> {
        let _guard = self.host.lock();
        f()
    }
}

fn upgrade(weak: &Weak<Bridge>) -> Result<Arc<Bridge>> {
    weak.upgrade()
        .ok_or_else(|| BridgeError::Internal("bridge dropped while engine still running".into()))
}
