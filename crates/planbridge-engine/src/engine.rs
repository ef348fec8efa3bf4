//! The engine coordinator: class registry plus installed host callbacks.

use std::sync::{Arc, Mutex};

use tracing::debug;

use planbridge_core::{MemberMeta, Result, RoleKind};

use crate::callbacks::HostCallbacks;
use crate::class::{ClassRegistry, NativeClass, NativeClassHandle};
use crate::constraint::ConstraintProviderFn;

/// The native-runtime engine.
///
/// Owns the process-scoped state the bridge used to keep in ambient globals:
/// the generated class registry and the installed host callbacks. Constructed
/// once and shared by reference with everything that needs it.
#[derive(Debug)]
pub struct Engine {
    classes: Mutex<ClassRegistry>,
    callbacks: HostCallbacks,
}

impl Engine {
    /// Creates an engine with the given host callback table.
    pub fn new(callbacks: HostCallbacks) -> Self {
        Self {
            classes: Mutex::new(ClassRegistry::default()),
            callbacks,
        }
    }

    /// The installed host callbacks.
    pub fn callbacks(&self) -> &HostCallbacks {
        &self.callbacks
    }

    /// Generates a native problem-fact class from marker metadata.
    pub fn define_problem_fact_class(
        &self,
        name: Arc<str>,
        members: Vec<MemberMeta>,
    ) -> Result<NativeClassHandle> {
        self.define(name, RoleKind::ProblemFact, members)
    }

    /// Generates a native planning-entity class from marker metadata.
    pub fn define_planning_entity_class(
        &self,
        name: Arc<str>,
        members: Vec<MemberMeta>,
    ) -> Result<NativeClassHandle> {
        self.define(name, RoleKind::PlanningEntity, members)
    }

    /// Generates a native planning-solution class from marker metadata.
    pub fn define_planning_solution_class(
        &self,
        name: Arc<str>,
        members: Vec<MemberMeta>,
    ) -> Result<NativeClassHandle> {
        self.define(name, RoleKind::PlanningSolution, members)
    }

    /// Generates a native constraint-provider class around an adapted
    /// provider callable.
    pub fn define_constraint_provider_class(
        &self,
        name: Arc<str>,
        provider: ConstraintProviderFn,
    ) -> Result<NativeClassHandle> {
        let handle = self
            .classes
            .lock()
            .unwrap()
            .define_provider(name.clone(), provider)?;
        debug!(event = "class_defined", class = %name, role = %RoleKind::ConstraintProvider);
        Ok(handle)
    }

    /// Looks up a generated class by handle.
    pub fn class(&self, handle: NativeClassHandle) -> Result<NativeClass> {
        self.classes.lock().unwrap().get(handle).cloned()
    }

    fn define(
        &self,
        name: Arc<str>,
        role: RoleKind,
        members: Vec<MemberMeta>,
    ) -> Result<NativeClassHandle> {
        let handle = self
            .classes
            .lock()
            .unwrap()
            .define(name.clone(), role, members)?;
        debug!(event = "class_defined", class = %name, role = %role);
        Ok(handle)
    }
}
