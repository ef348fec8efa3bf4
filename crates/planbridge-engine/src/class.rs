//! Native (shadow) class definitions and the registry generating them.

use std::fmt;
use std::sync::Arc;

use planbridge_core::{BridgeError, Marker, MemberMeta, Result, RoleKind};

use crate::constraint::ConstraintProviderFn;

/// Handle to a generated native class, usable wherever the engine expects a
/// configured domain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeClassHandle(pub(crate) usize);

impl fmt::Display for NativeClassHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class[{}]", self.0)
    }
}

/// A native class generated from host marker metadata.
///
/// Created once at registration time, immutable thereafter. Every marked
/// member forwards reads/writes through the host callbacks; the role and
/// member markers are what the engine's configuration discovers, exactly as
/// for a natively authored domain class.
#[derive(Clone)]
pub struct NativeClass {
    name: Arc<str>,
    role: RoleKind,
    members: Vec<MemberMeta>,
    provider: Option<ConstraintProviderFn>,
}

impl NativeClass {
    /// The synthesized unique class name.
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// The domain role this class plays.
    pub fn role(&self) -> RoleKind {
        self.role
    }

    /// Marker metadata per member, in host declaration order.
    pub fn members(&self) -> &[MemberMeta] {
        &self.members
    }

    /// Members carrying a marker matching the predicate.
    pub fn members_with(&self, pred: impl Fn(&Marker) -> bool + Copy) -> Vec<&MemberMeta> {
        self.members
            .iter()
            .filter(|m| m.has_marker(pred))
            .collect()
    }

    /// The wrapped constraint provider, for `ConstraintProvider` classes.
    pub fn provider(&self) -> Option<&ConstraintProviderFn> {
        self.provider.as_ref()
    }
}

impl fmt::Debug for NativeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeClass")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("members", &self.members.len())
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

/// The class generator: validates marker metadata and stores the immutable
/// class definitions. Rejections surface at registration time, never during
/// solving.
#[derive(Debug, Default)]
pub(crate) struct ClassRegistry {
    classes: Vec<NativeClass>,
}

impl ClassRegistry {
    pub(crate) fn get(&self, handle: NativeClassHandle) -> Result<&NativeClass> {
        self.classes.get(handle.0).ok_or_else(|| {
            BridgeError::Config(format!("no native class registered for {handle}"))
        })
    }

    pub(crate) fn define(
        &mut self,
        name: Arc<str>,
        role: RoleKind,
        members: Vec<MemberMeta>,
    ) -> Result<NativeClassHandle> {
        validate_members(&name, role, &members)?;
        self.push(NativeClass {
            name,
            role,
            members,
            provider: None,
        })
    }

    pub(crate) fn define_provider(
        &mut self,
        name: Arc<str>,
        provider: ConstraintProviderFn,
    ) -> Result<NativeClassHandle> {
        self.push(NativeClass {
            name,
            role: RoleKind::ConstraintProvider,
            members: Vec::new(),
            provider: Some(provider),
        })
    }

    fn push(&mut self, class: NativeClass) -> Result<NativeClassHandle> {
        if self.classes.iter().any(|c| c.name == class.name) {
            return Err(BridgeError::ClassSynthesis(format!(
                "duplicate native class name `{}`",
                class.name
            )));
        }
        let handle = NativeClassHandle(self.classes.len());
        self.classes.push(class);
        Ok(handle)
    }
}

fn validate_members(name: &str, role: RoleKind, members: &[MemberMeta]) -> Result<()> {
    let reject = |msg: String| Err(BridgeError::ClassSynthesis(format!("class `{name}`: {msg}")));

    for member in members {
        if let Some(marker) = member.markers.iter().find(|m| m.is_role_marker()) {
            return reject(format!(
                "role marker {} is not valid on member `{}`",
                marker.name(),
                member.name
            ));
        }
    }

    let count = |pred: fn(&Marker) -> bool| {
        members
            .iter()
            .filter(|m| m.has_marker(|mk| pred(mk)))
            .count()
    };
    let score_members = count(|m| matches!(m, Marker::PlanningScore));
    let id_members = count(|m| matches!(m, Marker::PlanningId));
    let variable_members = count(|m| matches!(m, Marker::PlanningVariable { .. }));
    let entity_collections = count(|m| matches!(m, Marker::PlanningEntityCollectionProperty));

    match role {
        RoleKind::PlanningEntity => {
            if variable_members == 0 {
                return reject("a PlanningEntity needs at least one PlanningVariable".into());
            }
            if id_members > 1 {
                return reject("at most one PlanningId member is allowed".into());
            }
            if score_members > 0 {
                return reject("PlanningScore belongs on the solution, not an entity".into());
            }
        }
        RoleKind::PlanningSolution => {
            if score_members != 1 {
                return reject(format!(
                    "a PlanningSolution needs exactly one PlanningScore member, found {score_members}"
                ));
            }
            if entity_collections == 0 {
                return reject(
                    "a PlanningSolution needs a PlanningEntityCollectionProperty member".into(),
                );
            }
            if variable_members > 0 {
                return reject("PlanningVariable is not valid on a solution class".into());
            }
        }
        RoleKind::ProblemFact => {
            if variable_members > 0 || score_members > 0 {
                return reject("a ProblemFact carries no planning variables or score".into());
            }
        }
        RoleKind::ConstraintProvider => {
            return reject("constraint providers carry a callable, not members".into());
        }
    }
    Ok(())
}
