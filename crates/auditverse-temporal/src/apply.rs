//! Event application
//!
//! Applies one event to a snapshot in place. Each rule is typed: attribute
//! changes decode into the category's patch type, adds decode into the
//! category's record type. Failures come back as [`ApplyError`] and leave the
//! snapshot untouched.

use crate::error::ApplyError;
use auditverse_model::{
    Collection, CollectionVisitorMut, EntityId, EntityRecord, Event, EventKind, GraphSnapshot,
    Relationship,
};
use im::Vector;
use serde_json::{Map, Value};

/// Resolve the target collection of an entity event
fn target_collection(event: &Event, kind: &EventKind) -> Result<Collection, ApplyError> {
    let entity_type = event
        .entity_type
        .as_deref()
        .ok_or_else(|| ApplyError::missing_field(kind.as_str(), "entityType"))?;
    Collection::for_entity_type(entity_type)
        .ok_or_else(|| ApplyError::UnknownCollection(entity_type.to_string()))
}

fn subject_id<'a>(event: &'a Event, kind: &EventKind) -> Result<&'a EntityId, ApplyError> {
    event
        .id
        .as_ref()
        .ok_or_else(|| ApplyError::missing_field(kind.as_str(), "id"))
}

/// Shallow merge of `changes` onto an existing entity
struct MergeChanges<'a> {
    id: &'a EntityId,
    changes: &'a Map<String, Value>,
    result: Result<(), ApplyError>,
}

impl CollectionVisitorMut for MergeChanges<'_> {
    fn visit_mut<T: EntityRecord>(&mut self, collection: Collection, slot: &mut Option<Vector<T>>) {
        let Some(items) = slot else {
            self.result = Err(ApplyError::MissingCollection(collection));
            return;
        };
        let Some(entity) = items.iter_mut().find(|e| e.id() == self.id) else {
            self.result = Err(ApplyError::not_found(self.id.clone(), collection));
            return;
        };

        // null means "no change", same as an absent key
        let changes: Map<String, Value> = self
            .changes
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        match serde_json::from_value::<T::Patch>(Value::Object(changes)) {
            Ok(patch) => entity.merge(patch),
            Err(source) => {
                self.result = Err(ApplyError::InvalidPayload {
                    id: self.id.clone(),
                    source,
                });
            }
        }
    }
}

/// Append a record unless its id is already present
struct AddEntity<'a> {
    id: Option<&'a EntityId>,
    data: &'a Value,
    result: Result<(), ApplyError>,
}

impl CollectionVisitorMut for AddEntity<'_> {
    fn visit_mut<T: EntityRecord>(&mut self, _: Collection, slot: &mut Option<Vector<T>>) {
        let record = match T::from_json(self.data.clone()) {
            Ok(record) => record,
            Err(source) => {
                let id = self
                    .id
                    .cloned()
                    .or_else(|| self.data.get("id").and_then(Value::as_str).map(EntityId::from))
                    .unwrap_or_else(|| EntityId::from(""));
                self.result = Err(ApplyError::InvalidPayload { id, source });
                return;
            }
        };

        let id = self.id.cloned().unwrap_or_else(|| record.id().clone());
        let items = slot.get_or_insert_with(Vector::new);
        if !items.iter().any(|e| *e.id() == id) {
            items.push_back(record);
        }
    }
}

/// Drop every record with the id
struct RemoveEntity<'a> {
    id: &'a EntityId,
}

impl CollectionVisitorMut for RemoveEntity<'_> {
    fn visit_mut<T: EntityRecord>(&mut self, _: Collection, slot: &mut Option<Vector<T>>) {
        if let Some(items) = slot {
            items.retain(|e| e.id() != self.id);
        }
    }
}

fn apply_change(state: &mut GraphSnapshot, event: &Event, kind: &EventKind) -> Result<(), ApplyError> {
    let collection = target_collection(event, kind)?;
    let id = subject_id(event, kind)?;
    let changes = event
        .changes
        .as_ref()
        .ok_or_else(|| ApplyError::missing_field(kind.as_str(), "changes"))?;

    let mut merge = MergeChanges {
        id,
        changes,
        result: Ok(()),
    };
    state.visit_mut(collection, &mut merge);
    merge.result
}

fn apply_add(state: &mut GraphSnapshot, event: &Event, kind: &EventKind) -> Result<(), ApplyError> {
    let collection = target_collection(event, kind)?;
    let data = event
        .data
        .as_ref()
        .ok_or_else(|| ApplyError::missing_field(kind.as_str(), "data"))?;

    let mut add = AddEntity {
        id: event.id.as_ref(),
        data,
        result: Ok(()),
    };
    state.visit_mut(collection, &mut add);
    add.result
}

fn apply_removal(state: &mut GraphSnapshot, event: &Event, kind: &EventKind) -> Result<(), ApplyError> {
    let id = subject_id(event, kind)?;
    state.relationships.retain(|r| !r.touches(id));

    let collection = target_collection(event, kind)?;
    state.visit_mut(collection, &mut RemoveEntity { id });
    Ok(())
}

fn relationship_of<'a>(event: &'a Event, kind: &EventKind) -> Result<&'a Relationship, ApplyError> {
    event
        .relationship
        .as_ref()
        .ok_or_else(|| ApplyError::missing_field(kind.as_str(), "relationship"))
}

/// Apply one event to `state` in place
///
/// Attribute changes merge onto an existing entity, adds append unless the id
/// is present, removals also strip every relationship touching the id, and
/// relationship events add or remove an exact `(source, target, type)` edge.
///
/// # Errors
/// Returns [`ApplyError`] when the event cannot be applied; `state` is left
/// as it was, except that a removal strips relationships before resolving
/// its collection.
pub fn apply_event(state: &mut GraphSnapshot, event: &Event) -> Result<(), ApplyError> {
    let kind = event.kind.as_ref().ok_or(ApplyError::MissingKind)?;

    match kind {
        k if k.is_attribute_change() => apply_change(state, event, kind),
        k if k.is_entity_add() => apply_add(state, event, kind),
        EventKind::EntityRemoved => apply_removal(state, event, kind),
        EventKind::RelationshipAdded => {
            let rel = relationship_of(event, kind)?;
            if !state.relationships.iter().any(|r| r.same_edge(rel)) {
                state.relationships.push_back(rel.clone());
            }
            Ok(())
        }
        EventKind::RelationshipRemoved => {
            let rel = relationship_of(event, kind)?;
            state.relationships.retain(|r| !r.same_edge(rel));
            Ok(())
        }
        other => Err(ApplyError::UnknownKind(other.as_str().to_string())),
    }
}
