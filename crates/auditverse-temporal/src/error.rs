//! Error types for timeline loading and event application

use auditverse_model::{Collection, EntityId};

/// Why a single event could not be applied
///
/// Never fatal: the engine logs the error and moves on to the next event.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// Event has no `type`
    #[error("event has no type")]
    MissingKind,

    /// Event type is not one the engine knows
    #[error("unknown event type: '{0}'")]
    UnknownKind(String),

    /// A field the event type needs is absent
    #[error("{kind} event is missing '{field}'")]
    MissingField { kind: String, field: &'static str },

    /// `entityType` does not name a known collection
    #[error("unknown collection: '{0}'")]
    UnknownCollection(String),

    /// Collection is absent from the snapshot
    #[error("collection not present: {0}")]
    MissingCollection(Collection),

    /// No entity with the id in the collection
    #[error("entity not found: {id} in {collection}")]
    EntityNotFound { id: EntityId, collection: Collection },

    /// `changes` or `data` does not fit the record type
    #[error("invalid payload for {id}: {source}")]
    InvalidPayload {
        id: EntityId,
        #[source]
        source: serde_json::Error,
    },
}

impl ApplyError {
    /// Create missing field error
    pub fn missing_field(kind: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            kind: kind.into(),
            field,
        }
    }

    /// Create entity not found error
    pub fn not_found(id: impl Into<EntityId>, collection: Collection) -> Self {
        Self::EntityNotFound {
            id: id.into(),
            collection,
        }
    }
}

/// Errors loading a historical dataset
#[derive(Debug, thiserror::Error)]
pub enum TemporalError {
    /// Payload failed structural validation
    #[error("invalid dataset: {}", .0.join("; "))]
    InvalidShape(Vec<String>),

    /// Payload passed validation but does not decode
    #[error("failed to decode dataset: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type alias for temporal operations
pub type TemporalResult<T> = Result<T, TemporalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_error_display() {
        let err = ApplyError::not_found("R9", Collection::Risks);
        assert_eq!(err.to_string(), "entity not found: R9 in risks");

        let err = ApplyError::missing_field("control_added", "data");
        assert_eq!(err.to_string(), "control_added event is missing 'data'");
    }

    #[test]
    fn shape_error_joins_messages() {
        let err = TemporalError::InvalidShape(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "invalid dataset: a; b");
    }
}
