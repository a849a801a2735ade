//! Typed entity records
//!
//! Every category gets its own record type sharing a common base (`id`,
//! `name`, `title`, embedded connections, pass-through extras) plus typed
//! category attributes, and a matching patch type used for attribute merges.

use crate::category::Category;
use crate::number::Measure;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Entity identifier, unique within its category
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EntityId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EntityId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Embedded connections of a denormalized entity
///
/// Keyed by a collection-ish label (`controls`, `risks_related`, ...), each
/// value lists display names of connected entities. Insertion order is kept.
pub type ConnectedEntities = IndexMap<String, Vec<String>>;

/// Keys a patch may never write through its extras
const RESERVED_KEYS: [&str; 2] = ["id", "connectedEntities"];

/// Read-only view shared by every record type (object safe)
pub trait EntityView {
    /// Identifier
    fn id(&self) -> &EntityId;

    /// Display name
    fn name(&self) -> Option<&str>;

    /// Alternate display title
    fn title(&self) -> Option<&str>;

    /// Embedded connections (denormalized form only)
    fn connected_entities(&self) -> Option<&ConnectedEntities>;

    /// Display label: name, else title, else id
    fn label(&self) -> &str {
        self.name()
            .or_else(|| self.title())
            .unwrap_or_else(|| self.id().as_str())
    }

    /// Exact match against name or title
    fn matches_label(&self, label: &str) -> bool {
        self.name() == Some(label) || self.title() == Some(label)
    }
}

/// Typed record for one category
pub trait EntityRecord:
    EntityView + Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned
{
    /// Partial update applied by attribute-change events
    type Patch: Default + fmt::Debug + Serialize + DeserializeOwned;

    /// Category of this record type
    const CATEGORY: Category;

    /// Merge a partial update; `id` and category never change
    fn merge(&mut self, patch: Self::Patch);

    /// Replace the embedded connections
    fn set_connected_entities(&mut self, connections: Option<ConnectedEntities>);

    /// Untyped attributes carried through
    fn extra_mut(&mut self) -> &mut BTreeMap<String, Value>;

    /// Decode from JSON, keeping attributes whose type does not fit untyped
    ///
    /// # Errors
    /// Fails when `id` is missing or not a string, or the value is not an
    /// object.
    fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        crate::decode::decode_record(value)
    }

    /// Wrap into the cross-category union
    fn into_entity(self) -> Entity;
}

macro_rules! entity_record {
    (
        $(#[$meta:meta])*
        $name:ident / $patch:ident => $category:ident {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            /// Identifier, unique within the category
            pub id: EntityId,
            /// Display name
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub name: Option<String>,
            /// Alternate display title
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub title: Option<String>,
            $(
                $(#[$fmeta])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
            /// Embedded connections (denormalized form only)
            #[serde(
                rename = "connectedEntities",
                default,
                skip_serializing_if = "Option::is_none",
                deserialize_with = "crate::decode::connections"
            )]
            pub connected_entities: Option<ConnectedEntities>,
            /// Attributes without a typed field, carried through untouched
            #[serde(flatten)]
            pub extra: BTreeMap<String, Value>,
        }

        #[doc = concat!("Partial update for [`", stringify!($name), "`]")]
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $patch {
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub name: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub title: Option<String>,
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
            #[serde(flatten)]
            pub extra: BTreeMap<String, Value>,
        }

        impl $name {
            /// Create a record with only an id
            #[must_use]
            pub fn new(id: impl Into<EntityId>) -> Self {
                Self {
                    id: id.into(),
                    name: None,
                    title: None,
                    $( $field: None, )*
                    connected_entities: None,
                    extra: BTreeMap::new(),
                }
            }

            /// With display name
            #[inline]
            #[must_use]
            pub fn with_name(mut self, name: impl Into<String>) -> Self {
                self.name = Some(name.into());
                self
            }

            /// With an untyped extra attribute
            #[inline]
            #[must_use]
            pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
                self.extra.insert(key.into(), value);
                self
            }
        }

        impl EntityView for $name {
            fn id(&self) -> &EntityId {
                &self.id
            }

            fn name(&self) -> Option<&str> {
                self.name.as_deref()
            }

            fn title(&self) -> Option<&str> {
                self.title.as_deref()
            }

            fn connected_entities(&self) -> Option<&ConnectedEntities> {
                self.connected_entities.as_ref()
            }
        }

        impl EntityRecord for $name {
            type Patch = $patch;

            const CATEGORY: Category = Category::$category;

            fn merge(&mut self, patch: $patch) {
                if let Some(v) = patch.name {
                    self.name = Some(v);
                }
                if let Some(v) = patch.title {
                    self.title = Some(v);
                }
                $(
                    if let Some(v) = patch.$field {
                        self.$field = Some(v);
                    }
                )*
                for (key, value) in patch.extra {
                    if !RESERVED_KEYS.contains(&key.as_str()) {
                        self.extra.insert(key, value);
                    }
                }
            }

            fn set_connected_entities(&mut self, connections: Option<ConnectedEntities>) {
                self.connected_entities = connections;
            }

            fn extra_mut(&mut self) -> &mut BTreeMap<String, Value> {
                &mut self.extra
            }

            fn into_entity(self) -> Entity {
                Entity::$category(self)
            }
        }
    };
}

entity_record! {
    /// A risk with inherent and residual ratings
    Risk / RiskPatch => Risk {
        #[serde(serialize_with = "crate::number::serialize_opt_f64")]
        inherent_likelihood: f64,
        #[serde(serialize_with = "crate::number::serialize_opt_f64")]
        inherent_severity: f64,
        #[serde(serialize_with = "crate::number::serialize_opt_f64")]
        inherent_rating: f64,
        #[serde(serialize_with = "crate::number::serialize_opt_f64")]
        residual_likelihood: f64,
        #[serde(serialize_with = "crate::number::serialize_opt_f64")]
        residual_severity: f64,
        #[serde(serialize_with = "crate::number::serialize_opt_f64")]
        residual_rating: f64,
        category: String,
        owner: String,
        trend: String,
        last_assessment: String,
        /// Subject to regulatory oversight
        regulatory: bool,
    }
}

entity_record! {
    /// A control mitigating one or more risks
    Control / ControlPatch => Control {
        status: String,
        test_result: String,
        owner: String,
        /// Number in some exports (`85`), text in others
        effectiveness: Measure,
        #[serde(serialize_with = "crate::number::serialize_opt_f64")]
        effectiveness_score: f64,
    }
}

entity_record! {
    /// An open or closed issue
    Issue / IssuePatch => Issue {
        status: String,
        severity: String,
        owner: String,
        due_date: String,
    }
}

entity_record! {
    /// A realized risk event
    Incident / IncidentPatch => Incident {
        severity: String,
        status: String,
        date: String,
        #[serde(serialize_with = "crate::number::serialize_opt_f64")]
        financial_impact: f64,
    }
}

entity_record! {
    /// An organizational unit owning risks
    BusinessUnit / BusinessUnitPatch => BusinessUnit {
        owner: String,
        division: String,
        #[serde(serialize_with = "crate::number::serialize_opt_f64")]
        risk_score: f64,
    }
}

entity_record! {
    /// A regulatory or internal standard
    Standard / StandardPatch => Standard {
        framework: String,
        regulatory_importance: String,
    }
}

entity_record! {
    /// An audit engagement
    Audit / AuditPatch => Audit {
        status: String,
        date_performed: String,
        findings: u32,
        critical_findings: u32,
    }
}

/// Any entity, tagged by category
///
/// Serializes as the bare record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Risk(Risk),
    Control(Control),
    Issue(Issue),
    Incident(Incident),
    BusinessUnit(BusinessUnit),
    Standard(Standard),
    Audit(Audit),
}

impl Entity {
    /// Decode a record of the given category from untyped JSON
    ///
    /// # Errors
    /// See [`EntityRecord::from_json`].
    pub fn from_value(category: Category, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match category {
            Category::Risk => Self::Risk(Risk::from_json(value)?),
            Category::Control => Self::Control(Control::from_json(value)?),
            Category::Issue => Self::Issue(Issue::from_json(value)?),
            Category::Incident => Self::Incident(Incident::from_json(value)?),
            Category::BusinessUnit => Self::BusinessUnit(BusinessUnit::from_json(value)?),
            Category::Standard => Self::Standard(Standard::from_json(value)?),
            Category::Audit => Self::Audit(Audit::from_json(value)?),
        })
    }

    /// Category tag
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            Self::Risk(_) => Category::Risk,
            Self::Control(_) => Category::Control,
            Self::Issue(_) => Category::Issue,
            Self::Incident(_) => Category::Incident,
            Self::BusinessUnit(_) => Category::BusinessUnit,
            Self::Standard(_) => Category::Standard,
            Self::Audit(_) => Category::Audit,
        }
    }

    /// Borrow the shared view
    #[must_use]
    pub fn view(&self) -> &dyn EntityView {
        match self {
            Self::Risk(e) => e,
            Self::Control(e) => e,
            Self::Issue(e) => e,
            Self::Incident(e) => e,
            Self::BusinessUnit(e) => e,
            Self::Standard(e) => e,
            Self::Audit(e) => e,
        }
    }

    /// Identifier
    #[must_use]
    pub fn id(&self) -> &EntityId {
        self.view().id()
    }

    /// Display label
    #[must_use]
    pub fn label(&self) -> &str {
        self.view().label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn label_falls_back_to_title_then_id() {
        let named = Risk::new("R1").with_name("Fraud");
        assert_eq!(named.label(), "Fraud");

        let mut titled = Issue::new("I1");
        titled.title = Some("Late patching".to_string());
        assert_eq!(titled.label(), "Late patching");

        assert_eq!(Audit::new("A1").label(), "A1");
    }

    #[test]
    fn record_keeps_unknown_attributes() {
        let risk: Risk = serde_json::from_value(json!({
            "id": "R1",
            "name": "Fraud",
            "residual_rating": 5,
            "entity": "Retail"
        }))
        .unwrap();

        assert_eq!(risk.residual_rating, Some(5.0));
        assert_eq!(risk.extra.get("entity"), Some(&json!("Retail")));

        let back = serde_json::to_value(&risk).unwrap();
        assert_eq!(back["entity"], json!("Retail"));
        assert_eq!(back["residual_rating"], json!(5));
        assert!(back.get("connectedEntities").is_none());
    }

    #[test]
    fn merge_updates_typed_and_extra_fields() {
        let mut control = Control::new("C1").with_name("Firewall");
        let patch: ControlPatch = serde_json::from_value(json!({
            "status": "effective",
            "effectiveness_score": 0.9,
            "reviewer": "QA"
        }))
        .unwrap();

        control.merge(patch);

        assert_eq!(control.status.as_deref(), Some("effective"));
        assert_eq!(control.effectiveness_score, Some(0.9));
        assert_eq!(control.extra.get("reviewer"), Some(&json!("QA")));
        assert_eq!(control.name.as_deref(), Some("Firewall"));
    }

    #[test]
    fn merge_never_changes_id() {
        let mut risk = Risk::new("R1");
        let patch: RiskPatch = serde_json::from_value(json!({"id": "R2", "residual_rating": 3}))
            .unwrap();

        risk.merge(patch);

        assert_eq!(risk.id, "R1");
        assert!(!risk.extra.contains_key("id"));
        let value = serde_json::to_value(&risk).unwrap();
        assert_eq!(value["id"], json!("R1"));
    }

    #[test]
    fn entity_union_decodes_by_category() {
        let entity =
            Entity::from_value(Category::Control, json!({"id": "C1", "name": "Firewall"}))
                .unwrap();
        assert_eq!(entity.category(), Category::Control);
        assert_eq!(entity.label(), "Firewall");
        assert_eq!(
            serde_json::to_value(&entity).unwrap(),
            json!({"id": "C1", "name": "Firewall"})
        );
    }

    #[test]
    fn ratings_keep_their_written_form() {
        let risk: Risk = serde_json::from_value(json!({
            "id": "R1",
            "inherent_rating": 7.5,
            "residual_rating": 8
        }))
        .unwrap();

        assert_eq!(
            serde_json::to_string(&risk).unwrap(),
            r#"{"id":"R1","inherent_rating":7.5,"residual_rating":8}"#
        );
    }

    #[test]
    fn connections_skip_non_array_entries() {
        let risk: Risk = serde_json::from_value(json!({
            "id": "R1",
            "connectedEntities": {
                "controls": ["Firewall", 3, null],
                "notes": "see appendix",
                "audits": {"A1": true}
            }
        }))
        .unwrap();

        let connections = risk.connected_entities.unwrap();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections["controls"], vec!["Firewall".to_string()]);
    }

    #[test]
    fn effectiveness_accepts_numbers_and_text() {
        let numeric = Entity::from_value(
            Category::Control,
            json!({"id": "C001", "effectiveness": 85, "type": "Preventive"}),
        )
        .unwrap();
        let Entity::Control(numeric) = numeric else {
            panic!("expected a control");
        };
        assert_eq!(numeric.effectiveness.as_ref().and_then(Measure::as_f64), Some(85.0));
        assert_eq!(serde_json::to_value(&numeric).unwrap()["effectiveness"], json!(85));

        let text: Control =
            serde_json::from_value(json!({"id": "C2", "effectiveness": "High"})).unwrap();
        assert_eq!(text.effectiveness, Some(Measure::from("High")));
    }
}
