//! Shadow class synthesis: host registration surface for the native engine.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};

use tracing::debug;

use planbridge_core::{BridgeError, HostClass, MemberMeta, Result};
use planbridge_engine::{Constraint, ConstraintFactory, NativeClassHandle};

use crate::bridge::Bridge;

impl Bridge {
    /// Registers a host class as a native problem-fact class.
    pub fn problem_fact_class(&self, class: &Arc<HostClass>) -> Result<NativeClassHandle> {
        let name = self.unique_name(class.name());
        self.engine()
            .define_problem_fact_class(name, collect_members(class))
    }

    /// Registers a host class as a native planning-entity class.
    pub fn planning_entity_class(&self, class: &Arc<HostClass>) -> Result<NativeClassHandle> {
        let name = self.unique_name(class.name());
        self.engine()
            .define_planning_entity_class(name, collect_members(class))
    }

    /// Registers a host class as a native planning-solution class.
    pub fn planning_solution_class(&self, class: &Arc<HostClass>) -> Result<NativeClassHandle> {
        let name = self.unique_name(class.name());
        self.engine()
            .define_planning_solution_class(name, collect_members(class))
    }

    /// Registers a host constraint provider as a native constraint-provider
    /// class. The provider runs as host logic under the boundary lock
    /// whenever the engine asks for the constraint set.
    pub fn constraint_provider<F>(
        self: &Arc<Self>,
        name: &str,
        provider: F,
    ) -> Result<NativeClassHandle>
    where
        F: Fn(&ConstraintFactory) -> Result<Vec<Constraint>> + Send + Sync + 'static,
    {
        let unique = self.unique_name(name);
        let weak: Weak<Bridge> = Arc::downgrade(self);
        self.engine().define_constraint_provider_class(
            unique,
            Arc::new(move |factory| {
                let bridge = weak.upgrade().ok_or_else(|| {
                    BridgeError::Internal("bridge dropped while engine still running".into())
                })?;
                bridge
                    .host_call(|| provider(factory))
                    .map(Vec::into_boxed_slice)
            }),
        )
    }

    // Shadow class names get a monotonically increasing suffix so the same
    // host class name can be registered more than once per process.
    fn unique_name(&self, base: &str) -> Arc<str> {
        let n = self.class_counter.fetch_add(1, Ordering::Relaxed);
        let name = format!("{base}{n}");
        debug!(event = "class_synthesized", base, name = %name);
        Arc::from(name)
    }
}

fn collect_members(class: &Arc<HostClass>) -> Vec<MemberMeta> {
    // Only marker-bearing members are visible to the engine.
    class
        .members()
        .iter()
        .filter(|m| m.has_markers())
        .map(|m| MemberMeta::new(m.name().clone(), m.type_hint(), m.markers().to_vec()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use planbridge_core::{HostMember, Marker, RoleKind, TypeHint};

    fn lesson_class() -> Arc<HostClass> {
        Arc::new(HostClass::new(
            "Lesson",
            vec![
                HostMember::new("id").with_marker(Marker::PlanningId),
                HostMember::new("slot")
                    .with_hint(TypeHint::I64)
                    .with_marker(Marker::PlanningVariable {
                        value_range_refs: vec![],
                    }),
                HostMember::new("teacher"),
            ],
        ))
    }

    #[test]
    fn test_markerless_members_stay_invisible() {
        let bridge = Bridge::new();
        let handle = bridge.planning_entity_class(&lesson_class()).unwrap();
        let class = bridge.engine().class(handle).unwrap();

        assert_eq!(class.role(), RoleKind::PlanningEntity);
        assert_eq!(class.members().len(), 2);
        assert!(class.members().iter().all(|m| m.name.as_ref() != "teacher"));
    }

    #[test]
    fn test_same_host_name_yields_distinct_classes() {
        let bridge = Bridge::new();
        let a = bridge.planning_entity_class(&lesson_class()).unwrap();
        let b = bridge.planning_entity_class(&lesson_class()).unwrap();

        assert_ne!(a, b);
        let name_a = bridge.engine().class(a).unwrap().name().clone();
        let name_b = bridge.engine().class(b).unwrap().name().clone();
        assert_ne!(name_a, name_b);
        assert!(name_a.starts_with("Lesson"));
        assert!(name_b.starts_with("Lesson"));
    }

    #[test]
    fn test_validation_failures_surface_at_registration() {
        let bridge = Bridge::new();
        let no_variables = Arc::new(HostClass::new(
            "Lesson",
            vec![HostMember::new("id").with_marker(Marker::PlanningId)],
        ));
        assert!(matches!(
            bridge.planning_entity_class(&no_variables),
            Err(BridgeError::ClassSynthesis(_))
        ));
    }

    #[test]
    fn test_constraint_provider_runs_under_the_bridge() {
        let bridge = Bridge::new();
        let handle = bridge
            .constraint_provider("MyConstraints", |_factory| Ok(Vec::new()))
            .unwrap();
        let class = bridge.engine().class(handle).unwrap();
        assert_eq!(class.role(), RoleKind::ConstraintProvider);
        assert!(class.provider().is_some());
    }
}
