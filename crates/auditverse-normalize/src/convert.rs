//! Conversion between normalized and denormalized graphs
//!
//! Normalized graphs keep entities and relationships apart. Denormalized
//! graphs embed each entity's connections as `connectedEntities`, a map from
//! a collection-ish key to the display labels of the connected entities.

use auditverse_model::{
    Collection, CollectionVisitor, CollectionVisitorMut, ConnectedEntities, EntityId,
    EntityRecord, GraphSnapshot, RelationType, Relationship,
};
use im::Vector;
use indexmap::IndexMap;
use tracing::debug;

/// Suffix marking a reverse connection key
pub const RELATED_SUFFIX: &str = "_related";

/// Key used when a relationship endpoint is not in the graph
pub const UNKNOWN_KEY: &str = "unknown";

/// Id, labels and embedded connections of one entity
#[derive(Debug, Clone)]
struct Indexed {
    id: EntityId,
    name: Option<String>,
    title: Option<String>,
    connections: Option<ConnectedEntities>,
}

impl Indexed {
    fn matches(&self, label: &str) -> bool {
        self.name.as_deref() == Some(label) || self.title.as_deref() == Some(label)
    }

    fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or_else(|| self.id.as_str())
    }
}

/// Every entity of a graph, grouped by collection in canonical order
#[derive(Debug, Default)]
struct GraphIndex {
    collections: IndexMap<Collection, Vec<Indexed>>,
}

impl CollectionVisitor for GraphIndex {
    fn visit<T: EntityRecord>(&mut self, collection: Collection, slot: &Option<Vector<T>>) {
        if let Some(items) = slot {
            let indexed = items
                .iter()
                .map(|e| Indexed {
                    id: e.id().clone(),
                    name: e.name().map(str::to_string),
                    title: e.title().map(str::to_string),
                    connections: e.connected_entities().cloned(),
                })
                .collect();
            self.collections.insert(collection, indexed);
        }
    }
}

impl GraphIndex {
    fn build(graph: &GraphSnapshot) -> Self {
        let mut index = Self::default();
        graph.visit_all(&mut index);
        index
    }

    fn find_by_label(&self, collection: Collection, label: &str) -> Option<&EntityId> {
        self.collections
            .get(&collection)?
            .iter()
            .find(|e| e.matches(label))
            .map(|e| &e.id)
    }

    /// Resolve a connection label, preferring the collection named by `key`
    fn resolve(&self, key: &str, label: &str) -> Option<&EntityId> {
        let preferred = key
            .parse::<Collection>()
            .ok()
            .and_then(|c| self.find_by_label(c, label));
        preferred.or_else(|| {
            Collection::ALL
                .into_iter()
                .find_map(|c| self.find_by_label(c, label))
        })
    }

    /// First entity with `id`, scanning collections in canonical order
    fn locate(&self, id: &EntityId) -> Option<(Collection, &Indexed)> {
        self.collections.iter().find_map(|(collection, items)| {
            items
                .iter()
                .find(|e| e.id == *id)
                .map(|e| (*collection, e))
        })
    }

    fn collection_key(&self, id: &EntityId) -> String {
        self.locate(id)
            .map_or_else(|| UNKNOWN_KEY.to_string(), |(c, _)| c.as_str().to_string())
    }

    fn label_of(&self, id: &EntityId) -> String {
        self.locate(id)
            .map_or_else(|| id.as_str().to_string(), |(_, e)| e.label().to_string())
    }
}

/// Strips embedded connections from every record
struct StripConnections;

impl CollectionVisitorMut for StripConnections {
    fn visit_mut<T: EntityRecord>(&mut self, _: Collection, slot: &mut Option<Vector<T>>) {
        if let Some(items) = slot {
            for item in items.iter_mut() {
                item.set_connected_entities(None);
            }
        }
    }
}

/// Attaches computed connections to matching records
struct EmbedConnections<'a> {
    by_id: &'a IndexMap<EntityId, ConnectedEntities>,
}

impl CollectionVisitorMut for EmbedConnections<'_> {
    fn visit_mut<T: EntityRecord>(&mut self, _: Collection, slot: &mut Option<Vector<T>>) {
        if let Some(items) = slot {
            for item in items.iter_mut() {
                if let Some(connections) = self.by_id.get(item.id()) {
                    item.set_connected_entities(Some(connections.clone()));
                }
            }
        }
    }
}

/// Whether any entity carries a non-empty `connectedEntities`
#[must_use]
pub fn is_denormalized(graph: &GraphSnapshot) -> bool {
    struct AnyConnected(bool);
    impl CollectionVisitor for AnyConnected {
        fn visit<T: EntityRecord>(&mut self, _: Collection, slot: &Option<Vector<T>>) {
            if let Some(items) = slot {
                self.0 |= items
                    .iter()
                    .any(|e| e.connected_entities().is_some_and(|c| !c.is_empty()));
            }
        }
    }

    let mut found = AnyConnected(false);
    graph.visit_all(&mut found);
    found.0
}

/// Convert embedded connections into a relationship list
///
/// Every connection label is resolved to an id by exact `name`/`title` match,
/// first within the collection named by the key (with `_related` removed),
/// then across all collections. Unresolved labels are dropped. A resolved
/// connection is skipped when the pair is already connected in either
/// direction, whatever the type.
#[must_use]
pub fn to_normalized(graph: &GraphSnapshot) -> GraphSnapshot {
    let index = GraphIndex::build(graph);
    let mut relationships: Vector<Relationship> = Vector::new();
    let mut dropped = 0usize;

    for source in index.collections.values().flatten() {
        let Some(connections) = &source.connections else {
            continue;
        };
        for (key, labels) in connections {
            let kind = key.replacen(RELATED_SUFFIX, "", 1);
            for label in labels {
                let Some(target) = index.resolve(&kind, label) else {
                    debug!(source = %source.id, %key, %label, "unresolved connection dropped");
                    dropped += 1;
                    continue;
                };
                if relationships.iter().any(|r| r.connects(&source.id, target)) {
                    continue;
                }
                relationships.push_back(Relationship::new(
                    source.id.clone(),
                    target.clone(),
                    RelationType::from(kind.as_str()),
                ));
            }
        }
    }

    let mut normalized = graph.clone();
    normalized.visit_all_mut(&mut StripConnections);
    normalized.relationships = relationships;

    debug!(
        relationships = normalized.relationships.len(),
        dropped, "normalized graph"
    );
    normalized
}

/// Embed relationships into their endpoint entities
///
/// The source gets the target's label under the target's collection name
/// (`unknown` when absent). The target gets the source's label under
/// `<sourceCollection>_related`. Labels fall back to the raw id.
#[must_use]
pub fn to_denormalized(graph: &GraphSnapshot) -> GraphSnapshot {
    let index = GraphIndex::build(graph);
    let mut by_id: IndexMap<EntityId, ConnectedEntities> = IndexMap::new();

    for rel in &graph.relationships {
        let forward_key = index.collection_key(&rel.target);
        push_unique(
            &mut by_id,
            &rel.source,
            forward_key,
            index.label_of(&rel.target),
        );

        let reverse_key = format!("{}{RELATED_SUFFIX}", index.collection_key(&rel.source));
        push_unique(
            &mut by_id,
            &rel.target,
            reverse_key,
            index.label_of(&rel.source),
        );
    }

    let mut denormalized = graph.clone();
    denormalized.visit_all_mut(&mut EmbedConnections { by_id: &by_id });
    denormalized.relationships = Vector::new();

    debug!(entities = by_id.len(), "denormalized graph");
    denormalized
}

fn push_unique(
    by_id: &mut IndexMap<EntityId, ConnectedEntities>,
    id: &EntityId,
    key: String,
    label: String,
) {
    let labels = by_id.entry(id.clone()).or_default().entry(key).or_default();
    if !labels.contains(&label) {
        labels.push(label);
    }
}
