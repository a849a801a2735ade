//! Graph snapshots
//!
//! A [`GraphSnapshot`] is the full graph at one instant: per-collection entity
//! sequences plus relationships. Collections are optional; an absent
//! collection is distinct from an empty one. Entity sequences are
//! [`im::Vector`]s, so `clone()` shares structure and later edits to either
//! copy never show through the other.

use crate::category::Collection;
use crate::decode::{records, vector};
use crate::entity::{
    Audit, BusinessUnit, Control, EntityId, EntityRecord, EntityView, Incident, Issue, Risk,
    Standard,
};
use crate::relationship::Relationship;
use im::Vector;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entities and relationships at one instant
///
/// Collections decode element by element: a record that cannot decode is
/// dropped with a warning instead of failing the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "records")]
    pub risks: Option<Vector<Risk>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "records")]
    pub controls: Option<Vector<Control>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "records")]
    pub issues: Option<Vector<Issue>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "records")]
    pub incidents: Option<Vector<Incident>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "records")]
    pub entities: Option<Vector<BusinessUnit>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "records")]
    pub standards: Option<Vector<Standard>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "records")]
    pub audits: Option<Vector<Audit>>,
    #[serde(
        rename = "businessUnits",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "records"
    )]
    pub business_units: Option<Vector<BusinessUnit>>,
    #[serde(default, skip_serializing_if = "Vector::is_empty", deserialize_with = "vector")]
    pub relationships: Vector<Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Generic read access to one collection slot
pub trait CollectionVisitor {
    fn visit<T: EntityRecord>(&mut self, collection: Collection, slot: &Option<Vector<T>>);
}

/// Generic write access to one collection slot
pub trait CollectionVisitorMut {
    fn visit_mut<T: EntityRecord>(&mut self, collection: Collection, slot: &mut Option<Vector<T>>);
}

impl GraphSnapshot {
    /// Create empty snapshot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch the typed slot for `collection` to a visitor
    pub fn visit<V: CollectionVisitor>(&self, collection: Collection, visitor: &mut V) {
        match collection {
            Collection::Risks => visitor.visit(collection, &self.risks),
            Collection::Controls => visitor.visit(collection, &self.controls),
            Collection::Issues => visitor.visit(collection, &self.issues),
            Collection::Incidents => visitor.visit(collection, &self.incidents),
            Collection::Entities => visitor.visit(collection, &self.entities),
            Collection::Standards => visitor.visit(collection, &self.standards),
            Collection::Audits => visitor.visit(collection, &self.audits),
            Collection::BusinessUnits => visitor.visit(collection, &self.business_units),
        }
    }

    /// Dispatch the typed slot for `collection` to a mutating visitor
    pub fn visit_mut<V: CollectionVisitorMut>(&mut self, collection: Collection, visitor: &mut V) {
        match collection {
            Collection::Risks => visitor.visit_mut(collection, &mut self.risks),
            Collection::Controls => visitor.visit_mut(collection, &mut self.controls),
            Collection::Issues => visitor.visit_mut(collection, &mut self.issues),
            Collection::Incidents => visitor.visit_mut(collection, &mut self.incidents),
            Collection::Entities => visitor.visit_mut(collection, &mut self.entities),
            Collection::Standards => visitor.visit_mut(collection, &mut self.standards),
            Collection::Audits => visitor.visit_mut(collection, &mut self.audits),
            Collection::BusinessUnits => visitor.visit_mut(collection, &mut self.business_units),
        }
    }

    /// Visit every collection in canonical order
    pub fn visit_all<V: CollectionVisitor>(&self, visitor: &mut V) {
        for collection in Collection::ALL {
            self.visit(collection, visitor);
        }
    }

    /// Visit every collection mutably in canonical order
    pub fn visit_all_mut<V: CollectionVisitorMut>(&mut self, visitor: &mut V) {
        for collection in Collection::ALL {
            self.visit_mut(collection, visitor);
        }
    }

    /// Whether the collection is present (possibly empty)
    #[must_use]
    pub fn has_collection(&self, collection: Collection) -> bool {
        self.collection_len(collection).is_some()
    }

    /// Length of a collection, `None` when absent
    #[must_use]
    pub fn collection_len(&self, collection: Collection) -> Option<usize> {
        struct Len(Option<usize>);
        impl CollectionVisitor for Len {
            fn visit<T: EntityRecord>(&mut self, _: Collection, slot: &Option<Vector<T>>) {
                self.0 = slot.as_ref().map(Vector::len);
            }
        }

        let mut len = Len(None);
        self.visit(collection, &mut len);
        len.0
    }

    /// Ids held by a collection, in order
    #[must_use]
    pub fn ids(&self, collection: Collection) -> Vec<EntityId> {
        struct Ids(Vec<EntityId>);
        impl CollectionVisitor for Ids {
            fn visit<T: EntityRecord>(&mut self, _: Collection, slot: &Option<Vector<T>>) {
                if let Some(items) = slot {
                    self.0.extend(items.iter().map(|e| e.id().clone()));
                }
            }
        }

        let mut ids = Ids(Vec::new());
        self.visit(collection, &mut ids);
        ids.0
    }

    /// Every entity id across every collection
    #[must_use]
    pub fn all_ids(&self) -> Vec<EntityId> {
        Collection::ALL.into_iter().flat_map(|c| self.ids(c)).collect()
    }

    /// Whether any collection holds `id`
    #[must_use]
    pub fn contains_id(&self, id: &EntityId) -> bool {
        Collection::ALL
            .into_iter()
            .any(|c| self.ids(c).iter().any(|candidate| candidate == id))
    }

    /// First collection (canonical order) that holds `id`
    #[must_use]
    pub fn collection_of(&self, id: &EntityId) -> Option<Collection> {
        Collection::ALL
            .into_iter()
            .find(|c| self.ids(*c).iter().any(|candidate| candidate == id))
    }

    /// Total number of entities across collections
    #[must_use]
    pub fn entity_count(&self) -> usize {
        Collection::ALL
            .into_iter()
            .filter_map(|c| self.collection_len(c))
            .sum()
    }

    /// Business units from `businessUnits`, falling back to `entities`
    #[must_use]
    pub fn business_units_or_entities(&self) -> Option<&Vector<BusinessUnit>> {
        self.business_units.as_ref().or(self.entities.as_ref())
    }
}
