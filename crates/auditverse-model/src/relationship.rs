//! Directed, typed edges between entities

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Relationship type
///
/// Known types get their own variant; anything else round-trips through
/// [`RelationType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationType {
    MitigatedBy,
    AssessedBy,
    Causes,
    RealizedIn,
    OwnedBy,
    Requires,
    VerifiedBy,
    Other(String),
}

impl RelationType {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::MitigatedBy => "mitigated_by",
            Self::AssessedBy => "assessed_by",
            Self::Causes => "causes",
            Self::RealizedIn => "realized_in",
            Self::OwnedBy => "owned_by",
            Self::Requires => "requires",
            Self::VerifiedBy => "verified_by",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for RelationType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "mitigated_by" => Self::MitigatedBy,
            "assessed_by" => Self::AssessedBy,
            "causes" => Self::Causes,
            "realized_in" => Self::RealizedIn,
            "owned_by" => Self::OwnedBy,
            "requires" => Self::Requires,
            "verified_by" => Self::VerifiedBy,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for RelationType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<RelationType> for String {
    fn from(t: RelationType) -> Self {
        match t {
            RelationType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed, typed edge `{source, target, type}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source entity id
    pub source: EntityId,
    /// Target entity id
    pub target: EntityId,
    /// Edge type; absent in some exports and never filled in
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RelationType>,
    /// Optional strength in `[0, 1]`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::number::serialize_opt_f64"
    )]
    pub strength: Option<f64>,
    /// Pass-through attributes
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Relationship {
    /// Create relationship
    #[must_use]
    pub fn new(
        source: impl Into<EntityId>,
        target: impl Into<EntityId>,
        kind: impl Into<RelationType>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: Some(kind.into()),
            strength: None,
            extra: BTreeMap::new(),
        }
    }

    /// With strength
    #[inline]
    #[must_use]
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Edge has the given type
    #[inline]
    #[must_use]
    pub fn is(&self, kind: &RelationType) -> bool {
        self.kind.as_ref() == Some(kind)
    }

    /// Same `(source, target, type)` triple
    #[inline]
    #[must_use]
    pub fn same_edge(&self, other: &Relationship) -> bool {
        self.source == other.source && self.target == other.target && self.kind == other.kind
    }

    /// Connects `a` and `b` in either direction, any type
    #[inline]
    #[must_use]
    pub fn connects(&self, a: &EntityId, b: &EntityId) -> bool {
        (self.source == *a && self.target == *b) || (self.source == *b && self.target == *a)
    }

    /// `id` is the source or the target
    #[inline]
    #[must_use]
    pub fn touches(&self, id: &EntityId) -> bool {
        self.source == *id || self.target == *id
    }
}
