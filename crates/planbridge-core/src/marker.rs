//! Marker vocabulary mined from host classes.
//!
//! Markers are the domain metadata a host class attaches to its members
//! (roles, id/variable/score fields, value-range providers). The shadow class
//! synthesizer collects them reflectively at registration time and hands them
//! to the native class generator as [`MemberMeta`] tuples.

use std::fmt;
use std::sync::Arc;

/// The role a host class plays in the planning domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    /// Immutable problem data.
    ProblemFact,
    /// An object with planning variables the engine may reassign.
    PlanningEntity,
    /// The aggregate the engine scores and clones.
    PlanningSolution,
    /// A callable producing the constraint set.
    ConstraintProvider,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoleKind::ProblemFact => "ProblemFact",
            RoleKind::PlanningEntity => "PlanningEntity",
            RoleKind::PlanningSolution => "PlanningSolution",
            RoleKind::ConstraintProvider => "ConstraintProvider",
        };
        f.write_str(name)
    }
}

/// A single domain marker, optionally carrying configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// Role marker for entity classes. Only valid at class level.
    PlanningEntity,
    /// Role marker for solution classes. Only valid at class level.
    PlanningSolution,
    /// Role marker for fact classes. Only valid at class level.
    ProblemFact,
    /// The member holding the entity's unique id.
    PlanningId,
    /// A member the engine may reassign during solving. Optionally names the
    /// value-range providers it draws from; when empty, the sole provider on
    /// the solution class is used.
    PlanningVariable {
        /// Named value-range references this variable draws from.
        value_range_refs: Vec<Arc<str>>,
    },
    /// The member holding the solution score.
    PlanningScore,
    /// A member holding a single problem fact.
    ProblemFactProperty,
    /// A member holding a collection of problem facts.
    ProblemFactCollectionProperty,
    /// A member holding the collection of planning entities.
    PlanningEntityCollectionProperty,
    /// A member providing candidate values for planning variables.
    ValueRangeProvider {
        /// Optional id other markers refer to this provider by.
        id: Option<Arc<str>>,
    },
}

impl Marker {
    /// The marker's name as it appears in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Marker::PlanningEntity => "PlanningEntity",
            Marker::PlanningSolution => "PlanningSolution",
            Marker::ProblemFact => "ProblemFact",
            Marker::PlanningId => "PlanningId",
            Marker::PlanningVariable { .. } => "PlanningVariable",
            Marker::PlanningScore => "PlanningScore",
            Marker::ProblemFactProperty => "ProblemFactProperty",
            Marker::ProblemFactCollectionProperty => "ProblemFactCollectionProperty",
            Marker::PlanningEntityCollectionProperty => "PlanningEntityCollectionProperty",
            Marker::ValueRangeProvider { .. } => "ValueRangeProvider",
        }
    }

    /// Returns true for markers that only make sense at class level.
    pub fn is_role_marker(&self) -> bool {
        matches!(
            self,
            Marker::PlanningEntity | Marker::PlanningSolution | Marker::ProblemFact
        )
    }
}

/// Best-effort declared shape of a member's value.
///
/// Hints are optional; a missing hint falls back to [`TypeHint::Object`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeHint {
    I64,
    F64,
    Bool,
    Str,
    Score,
    List,
    Map,
    /// Generic object shape, used when the host member declares nothing.
    #[default]
    Object,
}

/// The metadata tuple extracted per marker-bearing host member:
/// (member name, declared return-type hint, ordered marker list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberMeta {
    /// Host member name; the shadow class forwards accesses under this name.
    pub name: Arc<str>,
    /// Declared return-type hint, absent if the host member declares none.
    pub type_hint: Option<TypeHint>,
    /// Ordered set of markers found on the member.
    pub markers: Vec<Marker>,
}

impl MemberMeta {
    /// Creates a metadata tuple.
    pub fn new(
        name: impl Into<Arc<str>>,
        type_hint: Option<TypeHint>,
        markers: Vec<Marker>,
    ) -> Self {
        Self {
            name: name.into(),
            type_hint,
            markers,
        }
    }

    /// The effective shape of this member, falling back to a generic object.
    pub fn effective_hint(&self) -> TypeHint {
        self.type_hint.unwrap_or_default()
    }

    /// Returns true if any marker matches the predicate.
    pub fn has_marker(&self, pred: impl Fn(&Marker) -> bool) -> bool {
        self.markers.iter().any(pred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_names() {
        assert_eq!(Marker::PlanningId.name(), "PlanningId");
        assert_eq!(
            Marker::PlanningVariable {
                value_range_refs: vec![]
            }
            .name(),
            "PlanningVariable"
        );
        assert!(Marker::PlanningSolution.is_role_marker());
        assert!(!Marker::PlanningScore.is_role_marker());
    }

    #[test]
    fn test_effective_hint_falls_back_to_object() {
        let meta = MemberMeta::new("slot", None, vec![]);
        assert_eq!(meta.effective_hint(), TypeHint::Object);

        let meta = MemberMeta::new("slot", Some(TypeHint::I64), vec![]);
        assert_eq!(meta.effective_hint(), TypeHint::I64);
    }
}
