//! Host class descriptors: the per-type dispatch table built at registration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::marker::{Marker, TypeHint};
use crate::value::Value;

use super::object::HostObject;

/// A computed accessor for a host member.
///
/// Runs as host logic under the boundary lock; it must not assume any
/// particular caller thread.
pub type Accessor = Arc<dyn Fn(&HostObject) -> Result<Value> + Send + Sync>;

/// One named member of a host class.
///
/// A member is either a stored field (the default) or a computed accessor.
/// Markers and the optional type hint are what the shadow class synthesizer
/// mines at registration time; members without markers are invisible to it.
#[derive(Clone)]
pub struct HostMember {
    name: Arc<str>,
    type_hint: Option<TypeHint>,
    markers: Vec<Marker>,
    computed: Option<Accessor>,
}

impl HostMember {
    /// Creates a stored-field member.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
            markers: Vec::new(),
            computed: None,
        }
    }

    /// Creates a computed member backed by an accessor function.
    ///
    /// Computed members have no mutator; writing to one fails with
    /// `AttributeNotFound`.
    pub fn computed(
        name: impl Into<Arc<str>>,
        accessor: impl Fn(&HostObject) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
            markers: Vec::new(),
            computed: Some(Arc::new(accessor)),
        }
    }

    /// Attaches a declared return-type hint.
    pub fn with_hint(mut self, hint: TypeHint) -> Self {
        self.type_hint = Some(hint);
        self
    }

    /// Attaches a domain marker. Order of attachment is preserved.
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// The member name.
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// The declared type hint, if any.
    pub fn type_hint(&self) -> Option<TypeHint> {
        self.type_hint
    }

    /// The markers attached to this member.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Returns true if at least one marker is attached.
    pub fn has_markers(&self) -> bool {
        !self.markers.is_empty()
    }

    /// The computed accessor, if this member is computed.
    pub fn accessor(&self) -> Option<&Accessor> {
        self.computed.as_ref()
    }

    /// Returns true if this member is computed rather than stored.
    pub fn is_computed(&self) -> bool {
        self.computed.is_some()
    }
}

impl fmt::Debug for HostMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostMember")
            .field("name", &self.name)
            .field("type_hint", &self.type_hint)
            .field("markers", &self.markers)
            .field("computed", &self.computed.is_some())
            .finish()
    }
}

/// A host class: name plus ordered members with a by-name index.
#[derive(Debug, Clone)]
pub struct HostClass {
    name: Arc<str>,
    members: Vec<HostMember>,
    index: HashMap<Arc<str>, usize>,
}

impl HostClass {
    /// Creates a host class from its members.
    pub fn new(name: impl Into<Arc<str>>, members: Vec<HostMember>) -> Self {
        let index = members
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();
        Self {
            name: name.into(),
            members,
            index,
        }
    }

    /// The class name.
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// All members in declaration order.
    pub fn members(&self) -> &[HostMember] {
        &self.members
    }

    /// Looks up a member by name.
    pub fn member(&self, name: &str) -> Option<&HostMember> {
        self.index.get(name).map(|&i| &self.members[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_lookup() {
        let class = HostClass::new(
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
        );

        assert_eq!(class.name().as_ref(), "Lesson");
        assert_eq!(class.members().len(), 3);
        assert!(class.member("slot").unwrap().has_markers());
        assert!(!class.member("teacher").unwrap().has_markers());
        assert!(class.member("room").is_none());
    }
}
