//! Entity categories and the collections that hold them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The seven fixed kinds of entity in the knowledge graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Risk,
    Control,
    Issue,
    Incident,
    BusinessUnit,
    Standard,
    Audit,
}

impl Category {
    /// All categories
    pub const ALL: [Category; 7] = [
        Category::Risk,
        Category::Control,
        Category::Issue,
        Category::Incident,
        Category::BusinessUnit,
        Category::Standard,
        Category::Audit,
    ];

    /// Singular name as used in event `entityType` fields
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Risk => "risk",
            Self::Control => "control",
            Self::Issue => "issue",
            Self::Incident => "incident",
            Self::BusinessUnit => "businessUnit",
            Self::Standard => "standard",
            Self::Audit => "audit",
        }
    }

    /// Collection a freshly added entity of this category lands in
    #[inline]
    #[must_use]
    pub const fn collection(self) -> Collection {
        match self {
            Self::Risk => Collection::Risks,
            Self::Control => Collection::Controls,
            Self::Issue => Collection::Issues,
            Self::Incident => Collection::Incidents,
            Self::BusinessUnit => Collection::BusinessUnits,
            Self::Standard => Collection::Standards,
            Self::Audit => Collection::Audits,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Array names a snapshot stores entities under
///
/// Business units appear under two names: `entities` (the export shape) and
/// `businessUnits` (the shape historical datasets use).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Risks,
    Controls,
    Issues,
    Incidents,
    Entities,
    Standards,
    Audits,
    BusinessUnits,
}

impl Collection {
    /// All collections in canonical scan order
    pub const ALL: [Collection; 8] = [
        Collection::Risks,
        Collection::Controls,
        Collection::Issues,
        Collection::Incidents,
        Collection::Entities,
        Collection::Standards,
        Collection::Audits,
        Collection::BusinessUnits,
    ];

    /// Key used in serialized snapshots
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Risks => "risks",
            Self::Controls => "controls",
            Self::Issues => "issues",
            Self::Incidents => "incidents",
            Self::Entities => "entities",
            Self::Standards => "standards",
            Self::Audits => "audits",
            Self::BusinessUnits => "businessUnits",
        }
    }

    /// Category of the records held by this collection
    #[inline]
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Risks => Category::Risk,
            Self::Controls => Category::Control,
            Self::Issues => Category::Issue,
            Self::Incidents => Category::Incident,
            Self::Entities | Self::BusinessUnits => Category::BusinessUnit,
            Self::Standards => Category::Standard,
            Self::Audits => Category::Audit,
        }
    }

    /// Resolve a collection from an event `entityType`
    ///
    /// Returns `None` when the pluralized name is not a known collection.
    #[must_use]
    pub fn for_entity_type(entity_type: &str) -> Option<Self> {
        collection_name(entity_type).parse().ok()
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown category or collection name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection: '{0}'")]
pub struct CategoryParseError(pub String);

impl FromStr for Collection {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

/// Map a singular event `entityType` to its plural collection name
///
/// Known types use a fixed table; anything else gets an `s` appended.
#[must_use]
pub fn collection_name(entity_type: &str) -> String {
    match entity_type {
        "risk" => "risks".to_string(),
        "control" => "controls".to_string(),
        "issue" => "issues".to_string(),
        "incident" => "incidents".to_string(),
        "audit" => "audits".to_string(),
        "standard" => "standards".to_string(),
        "businessUnit" => "businessUnits".to_string(),
        "entity" => "entities".to_string(),
        other => format!("{other}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_name_table() {
        assert_eq!(collection_name("risk"), "risks");
        assert_eq!(collection_name("businessUnit"), "businessUnits");
        assert_eq!(collection_name("entity"), "entities");
        assert_eq!(collection_name("vendor"), "vendors");
    }

    #[test]
    fn collection_for_entity_type() {
        assert_eq!(Collection::for_entity_type("control"), Some(Collection::Controls));
        assert_eq!(Collection::for_entity_type("entity"), Some(Collection::Entities));
        assert_eq!(Collection::for_entity_type("vendor"), None);
    }

    #[test]
    fn collection_parse_roundtrip() {
        for c in Collection::ALL {
            assert_eq!(c.as_str().parse::<Collection>().unwrap(), c);
        }
        assert!("risk".parse::<Collection>().is_err());
    }

    #[test]
    fn business_unit_collections_share_category() {
        assert_eq!(Collection::Entities.category(), Category::BusinessUnit);
        assert_eq!(Collection::BusinessUnits.category(), Category::BusinessUnit);
    }
}
