//! Built-in preset views
//!
//! Every filter is pure: it reads a normalized graph and returns the nodes,
//! links and viewer filters to show. A graph without the primary collection
//! yields an empty [`ViewResult`].

use crate::view::{PresetView, Priority, ViewCategory, ViewContext, ViewInfo, ViewNode, ViewResult};
use auditverse_model::{
    number_value, parse_instant, Audit, BusinessUnit, Collection, Control, EntityId, EntityRecord,
    GraphSnapshot, Incident, Issue, RelationType, Relationship, Risk, Standard,
};
use chrono::{DateTime, Months, Utc};
use im::Vector;
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::cmp::Ordering;

const TOP_RISKS: usize = 10;
const TOP_HOTSPOTS: usize = 20;
const CRITICAL: &str = "critical";
const HIGH: &str = "high";
const SEVERE_INHERENT_RATING: f64 = 8.0;
const IMPORTANCE_ORDER: [&str; 4] = ["critical", "high", "medium", "low"];
const WEAK_TEST_RESULTS: [&str; 2] = ["partial", "ineffective"];

fn residual(risk: &Risk) -> f64 {
    risk.residual_rating.unwrap_or(0.0)
}

fn by_residual_desc(a: &&Risk, b: &&Risk) -> Ordering {
    residual(b).total_cmp(&residual(a))
}

fn items<T: Clone>(slot: Option<&Vector<T>>) -> impl Iterator<Item = &T> {
    slot.into_iter().flatten()
}

fn active(collections: &[Collection]) -> IndexSet<Collection> {
    collections.iter().copied().collect()
}

/// Records of `pool` reached from `sources` over `kind` edges, and those edges
///
/// Records are deduplicated by id in first-reached order.
fn reached<'a, T: EntityRecord>(
    data: &'a GraphSnapshot,
    pool: Option<&'a Vector<T>>,
    sources: &IndexSet<&EntityId>,
    kind: &RelationType,
) -> (Vec<&'a T>, Vec<Relationship>) {
    let mut found: IndexMap<&EntityId, &T> = IndexMap::new();
    for rel in data.relationships.iter().filter(|r| r.is(kind) && sources.contains(&r.source)) {
        if let Some(record) = items(pool).find(|e| *e.id() == rel.target) {
            found.entry(record.id()).or_insert(record);
        }
    }
    let links = data
        .relationships
        .iter()
        .filter(|r| r.is(kind) && sources.contains(&r.source) && found.contains_key(&r.target))
        .cloned()
        .collect();
    (found.into_values().collect(), links)
}

/// Count `kind` edges from `id` whose target is in `pool`
fn edges_into<'a, T: EntityRecord>(
    data: &'a GraphSnapshot,
    id: &EntityId,
    kind: &RelationType,
    pool: Option<&'a Vector<T>>,
) -> Vec<&'a T> {
    data.relationships
        .iter()
        .filter(|r| r.source == *id && r.is(kind))
        .filter_map(|r| items(pool).find(|e| *e.id() == r.target))
        .collect()
}

fn uncontrolled_risks(data: &GraphSnapshot, _: &ViewContext) -> ViewResult {
    let Some(risks) = data.risks.as_ref() else {
        return ViewResult::default();
    };

    let mut uncontrolled: Vec<&Risk> = risks
        .iter()
        .filter(|risk| edges_into(data, &risk.id, &RelationType::MitigatedBy, data.controls.as_ref()).is_empty())
        .collect();
    uncontrolled.sort_by(by_residual_desc);

    ViewResult {
        message: format!("{} risk(s) without controls", uncontrolled.len()),
        nodes: uncontrolled.into_iter().map(ViewNode::new).collect(),
        links: Vec::new(),
        active_filters: active(&[Collection::Risks]),
        ..ViewResult::default()
    }
}

/// `(inherent - residual) / inherent * 100`, or 0 when either rating is missing or zero
fn control_effectiveness(risk: &Risk) -> f64 {
    match (risk.inherent_rating, risk.residual_rating) {
        (Some(inherent), Some(residual)) if inherent != 0.0 && residual != 0.0 => {
            (inherent - residual) / inherent * 100.0
        }
        _ => 0.0,
    }
}

fn high_residual_risk(data: &GraphSnapshot, ctx: &ViewContext) -> ViewResult {
    let Some(risks) = data.risks.as_ref() else {
        return ViewResult::default();
    };

    let mut high: Vec<&Risk> = risks
        .iter()
        .filter(|r| residual(r) >= ctx.high_residual_threshold)
        .collect();
    high.sort_by(by_residual_desc);

    let ids: IndexSet<&EntityId> = high.iter().map(|r| &r.id).collect();
    let (controls, links) = reached(data, data.controls.as_ref(), &ids, &RelationType::MitigatedBy);

    let mut nodes: Vec<ViewNode> = high
        .iter()
        .map(|r| {
            ViewNode::new(*r).with("controlEffectiveness", number_value(control_effectiveness(r)))
        })
        .collect();
    nodes.extend(controls.into_iter().map(ViewNode::new));

    ViewResult {
        message: format!("{} high residual risk(s)", high.len()),
        nodes,
        links,
        active_filters: active(&[Collection::Risks, Collection::Controls]),
        ..ViewResult::default()
    }
}

fn enterprise_risk_profile(data: &GraphSnapshot, _: &ViewContext) -> ViewResult {
    let Some(risks) = data.risks.as_ref() else {
        return ViewResult::default();
    };

    let mut top: Vec<&Risk> = risks.iter().collect();
    top.sort_by(by_residual_desc);
    top.truncate(TOP_RISKS);

    let ids: IndexSet<&EntityId> = top.iter().map(|r| &r.id).collect();
    let (controls, links) = reached(data, data.controls.as_ref(), &ids, &RelationType::MitigatedBy);

    let mut nodes: Vec<ViewNode> = top
        .iter()
        .map(|r| {
            let count = data
                .relationships
                .iter()
                .filter(|rel| rel.source == r.id && rel.is(&RelationType::MitigatedBy))
                .count();
            ViewNode::new(*r).with("controlCount", count)
        })
        .collect();
    nodes.extend(controls.into_iter().map(ViewNode::new));

    ViewResult {
        message: format!("Top {TOP_RISKS} enterprise risks"),
        nodes,
        links,
        active_filters: active(&[Collection::Risks, Collection::Controls]),
        ..ViewResult::default()
    }
}

fn high_issue_risks(data: &GraphSnapshot, _: &ViewContext) -> ViewResult {
    let Some(risks) = data.risks.as_ref() else {
        return ViewResult::default();
    };

    let mut counted: Vec<(&Risk, usize)> = risks
        .iter()
        .map(|r| (r, edges_into(data, &r.id, &RelationType::Causes, data.issues.as_ref()).len()))
        .filter(|(_, n)| *n > 0)
        .collect();
    counted.sort_by(|a, b| b.1.cmp(&a.1));
    counted.truncate(TOP_HOTSPOTS);

    let ids: IndexSet<&EntityId> = counted.iter().map(|(r, _)| &r.id).collect();
    let (issues, links): (Vec<&Issue>, _) =
        reached(data, data.issues.as_ref(), &ids, &RelationType::Causes);

    let mut nodes: Vec<ViewNode> = counted
        .iter()
        .map(|(r, n)| ViewNode::new(*r).with("issueCount", *n))
        .collect();
    nodes.extend(issues.into_iter().map(ViewNode::new));

    ViewResult {
        message: format!("Top {} risks by issue count", counted.len()),
        nodes,
        links,
        active_filters: active(&[Collection::Risks, Collection::Issues]),
        ..ViewResult::default()
    }
}

fn high_incident_risks(data: &GraphSnapshot, _: &ViewContext) -> ViewResult {
    let Some(risks) = data.risks.as_ref() else {
        return ViewResult::default();
    };

    let mut counted: Vec<(&Risk, usize, usize)> = risks
        .iter()
        .map(|r| {
            let incidents: Vec<&Incident> =
                edges_into(data, &r.id, &RelationType::RealizedIn, data.incidents.as_ref());
            let critical = incidents
                .iter()
                .filter(|i| i.severity.as_deref() == Some(CRITICAL))
                .count();
            (r, incidents.len(), critical)
        })
        .filter(|(_, n, _)| *n > 0)
        .collect();
    counted.sort_by(|a, b| b.2.cmp(&a.2).then(b.1.cmp(&a.1)));
    counted.truncate(TOP_HOTSPOTS);

    let ids: IndexSet<&EntityId> = counted.iter().map(|(r, _, _)| &r.id).collect();
    let (incidents, links) = reached(data, data.incidents.as_ref(), &ids, &RelationType::RealizedIn);

    let mut nodes: Vec<ViewNode> = counted
        .iter()
        .map(|(r, n, critical)| {
            ViewNode::new(*r)
                .with("incidentCount", *n)
                .with("criticalIncidentCount", *critical)
        })
        .collect();
    nodes.extend(incidents.into_iter().map(ViewNode::new));

    ViewResult {
        message: format!("Top {} risks by incident count", counted.len()),
        nodes,
        links,
        active_filters: active(&[Collection::Risks, Collection::Incidents]),
        ..ViewResult::default()
    }
}

struct ControlFailure<'a> {
    control: &'a Control,
    risks: Vec<&'a Risk>,
    issues: usize,
    high_residual: usize,
}

impl ControlFailure<'_> {
    fn score(&self) -> usize {
        self.issues + 2 * self.high_residual
    }

    fn weak_test(&self) -> bool {
        self.control
            .test_result
            .as_deref()
            .is_some_and(|t| WEAK_TEST_RESULTS.contains(&t))
    }
}

fn failed_controls(data: &GraphSnapshot, ctx: &ViewContext) -> ViewResult {
    let Some(controls) = data.controls.as_ref() else {
        return ViewResult::default();
    };

    let mut failures: Vec<ControlFailure<'_>> = controls
        .iter()
        .map(|control| {
            let risks: Vec<&Risk> = data
                .relationships
                .iter()
                .filter(|r| r.target == control.id && r.is(&RelationType::MitigatedBy))
                .filter_map(|r| items(data.risks.as_ref()).find(|risk| risk.id == r.source))
                .collect();
            let issues = risks
                .iter()
                .map(|risk| edges_into(data, &risk.id, &RelationType::Causes, data.issues.as_ref()).len())
                .sum();
            let high_residual = risks
                .iter()
                .filter(|risk| residual(risk) >= ctx.high_residual_threshold)
                .count();
            ControlFailure {
                control,
                risks,
                issues,
                high_residual,
            }
        })
        .filter(|f| f.score() > 0 || f.weak_test())
        .collect();
    failures.sort_by_key(|f| std::cmp::Reverse(f.score()));

    let control_ids: IndexSet<&EntityId> = failures.iter().map(|f| &f.control.id).collect();
    let mut related: IndexMap<&EntityId, &Risk> = IndexMap::new();
    for risk in failures.iter().flat_map(|f| f.risks.iter()) {
        related.entry(&risk.id).or_insert(risk);
    }
    let links = data
        .relationships
        .iter()
        .filter(|r| {
            r.is(&RelationType::MitigatedBy)
                && control_ids.contains(&r.target)
                && related.contains_key(&r.source)
        })
        .cloned()
        .collect();

    let mut nodes: Vec<ViewNode> = failures
        .iter()
        .map(|f| {
            ViewNode::new(f.control)
                .with("issueCount", f.issues)
                .with("highResidualCount", f.high_residual)
                .with("failureScore", f.score())
        })
        .collect();
    nodes.extend(related.into_values().map(ViewNode::new));

    ViewResult {
        message: format!("{} control(s) with effectiveness issues", failures.len()),
        nodes,
        links,
        active_filters: active(&[Collection::Controls, Collection::Risks]),
        ..ViewResult::default()
    }
}

/// Audit linked to `rel` at either end
fn audit_at<'a>(data: &'a GraphSnapshot, rel: &Relationship) -> Option<&'a Audit> {
    items(data.audits.as_ref()).find(|a| a.id == rel.target || a.id == rel.source)
}

/// `kind` edges touching `id` at either end with an audit on one side
fn audit_edges<'a>(
    data: &'a GraphSnapshot,
    id: &'a EntityId,
    kind: &'a RelationType,
) -> impl Iterator<Item = &'a Relationship> {
    data.relationships
        .iter()
        .filter(move |r| (r.source == *id || r.target == *id) && r.is(kind))
        .filter(move |r| audit_at(data, r).is_some())
}

/// Business units, read from `businessUnits` or else `entities`
fn units(data: &GraphSnapshot) -> Option<&Vector<BusinessUnit>> {
    data.business_units.as_ref().or(data.entities.as_ref())
}

fn unaudited_risks(data: &GraphSnapshot, ctx: &ViewContext) -> ViewResult {
    let Some(risks) = data.risks.as_ref() else {
        return ViewResult::default();
    };
    let cutoff = ctx
        .reference_instant()
        .checked_sub_months(Months::new(ctx.audit_recency_months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut unaudited: Vec<&Risk> = risks
        .iter()
        .filter(|risk| {
            !audit_edges(data, &risk.id, &RelationType::AssessedBy).any(|rel| {
                audit_at(data, rel)
                    .and_then(|a| a.date_performed.as_deref())
                    .and_then(parse_instant)
                    .is_some_and(|performed| performed > cutoff)
            })
        })
        .collect();
    unaudited.sort_by(by_residual_desc);

    ViewResult {
        message: format!("{} risk(s) without recent audits", unaudited.len()),
        nodes: unaudited.into_iter().map(ViewNode::new).collect(),
        links: Vec::new(),
        active_filters: active(&[Collection::Risks]),
        ..ViewResult::default()
    }
}

/// Share of a population touched by audits
struct Coverage {
    audited: usize,
    total: usize,
}

impl Coverage {
    /// Percentage to one decimal, `None` for an empty population
    #[allow(clippy::cast_precision_loss)]
    fn percent(&self) -> Option<String> {
        (self.total > 0).then(|| format!("{:.1}", self.audited as f64 / self.total as f64 * 100.0))
    }

    fn label(&self) -> String {
        self.percent().unwrap_or_else(|| "0".to_string())
    }

    fn value(&self) -> Value {
        self.percent().map_or(Value::from(0), Value::String)
    }
}

fn audit_universe_coverage(data: &GraphSnapshot, _: &ViewContext) -> ViewResult {
    let Some(risks) = data.risks.as_ref() else {
        return ViewResult::default();
    };

    let mut audited_risks: IndexSet<&EntityId> = IndexSet::new();
    let mut audited_standards: IndexSet<&EntityId> = IndexSet::new();
    for rel in &data.relationships {
        if rel.is(&RelationType::AssessedBy) && risks.iter().any(|r| r.id == rel.source) {
            audited_risks.insert(&rel.source);
        }
        if rel.is(&RelationType::VerifiedBy)
            && items(data.standards.as_ref()).any(|s| s.id == rel.source)
        {
            audited_standards.insert(&rel.source);
        }
    }
    let audited_units = items(units(data))
        .filter(|unit| {
            data.relationships.iter().any(|r| {
                r.is(&RelationType::OwnedBy)
                    && r.target == unit.id
                    && audited_risks.contains(&r.source)
            })
        })
        .count();

    let risk_coverage = Coverage {
        audited: audited_risks.len(),
        total: risks.len(),
    };
    let unit_coverage = Coverage {
        audited: audited_units,
        total: units(data).map_or(0, Vector::len),
    };
    let standard_coverage = Coverage {
        audited: audited_standards.len(),
        total: data.standards.as_ref().map_or(0, Vector::len),
    };

    let links: Vec<Relationship> = data
        .relationships
        .iter()
        .filter(|r| audit_at(data, r).is_some())
        .cloned()
        .collect();
    let mut related: IndexMap<&EntityId, &Risk> = IndexMap::new();
    for rel in links.iter().filter(|r| r.is(&RelationType::AssessedBy)) {
        if let Some(risk) = risks.iter().find(|r| r.id == rel.source) {
            related.entry(&risk.id).or_insert(risk);
        }
    }

    let mut nodes: Vec<ViewNode> = items(data.audits.as_ref()).map(ViewNode::new).collect();
    nodes.extend(related.into_values().map(ViewNode::new));

    let metrics = IndexMap::from([
        ("riskCoverage".to_string(), risk_coverage.value()),
        ("unitCoverage".to_string(), unit_coverage.value()),
        ("standardCoverage".to_string(), standard_coverage.value()),
        ("totalRisks".to_string(), risk_coverage.total.into()),
        ("auditedRisks".to_string(), risk_coverage.audited.into()),
        ("totalUnits".to_string(), unit_coverage.total.into()),
        ("auditedUnits".to_string(), unit_coverage.audited.into()),
        ("totalStandards".to_string(), standard_coverage.total.into()),
        ("auditedStandards".to_string(), standard_coverage.audited.into()),
    ]);

    ViewResult {
        message: format!(
            "Coverage: {}% risks, {}% units, {}% standards audited",
            risk_coverage.label(),
            unit_coverage.label(),
            standard_coverage.label()
        ),
        nodes,
        links,
        active_filters: active(&[Collection::Audits, Collection::Risks]),
        metrics: Some(metrics),
    }
}

struct Violation<'a> {
    standard: &'a Standard,
    risks: Vec<&'a Risk>,
    issues: usize,
    critical: usize,
    high: usize,
}

fn standard_violations(data: &GraphSnapshot, _: &ViewContext) -> ViewResult {
    let Some(standards) = data.standards.as_ref() else {
        return ViewResult::default();
    };

    let mut violations: Vec<Violation<'_>> = standards
        .iter()
        .map(|standard| {
            let risks: Vec<&Risk> = data
                .relationships
                .iter()
                .filter(|r| r.is(&RelationType::Requires) && r.target == standard.id)
                .filter_map(|r| items(data.risks.as_ref()).find(|risk| risk.id == r.source))
                .collect();
            let issues: Vec<&Issue> = risks
                .iter()
                .flat_map(|risk| edges_into(data, &risk.id, &RelationType::Causes, data.issues.as_ref()))
                .collect();
            let with_severity = |level: &str| {
                issues
                    .iter()
                    .filter(|i| i.severity.as_deref() == Some(level))
                    .count()
            };
            Violation {
                standard,
                critical: with_severity(CRITICAL),
                high: with_severity(HIGH),
                issues: issues.len(),
                risks,
            }
        })
        .filter(|v| v.issues > 0)
        .collect();
    violations.sort_by(|a, b| {
        b.critical
            .cmp(&a.critical)
            .then(b.high.cmp(&a.high))
            .then(b.issues.cmp(&a.issues))
    });

    let standard_ids: IndexSet<&EntityId> = violations.iter().map(|v| &v.standard.id).collect();
    let mut related: IndexMap<&EntityId, &Risk> = IndexMap::new();
    for risk in violations.iter().flat_map(|v| v.risks.iter()) {
        related.entry(&risk.id).or_insert(risk);
    }
    let links: Vec<Relationship> = data
        .relationships
        .iter()
        .filter(|r| {
            (r.is(&RelationType::Requires) && standard_ids.contains(&r.target))
                || (r.is(&RelationType::Causes) && related.contains_key(&r.source))
        })
        .cloned()
        .collect();
    let mut issues: IndexMap<&EntityId, &Issue> = IndexMap::new();
    for rel in links.iter().filter(|r| r.is(&RelationType::Causes)) {
        if let Some(issue) = items(data.issues.as_ref()).find(|i| i.id == rel.target) {
            issues.entry(&issue.id).or_insert(issue);
        }
    }

    let mut nodes: Vec<ViewNode> = violations
        .iter()
        .map(|v| {
            ViewNode::new(v.standard)
                .with("issueCount", v.issues)
                .with("criticalCount", v.critical)
                .with("highCount", v.high)
        })
        .collect();
    nodes.extend(related.into_values().map(ViewNode::new));
    nodes.extend(issues.into_values().map(ViewNode::new));

    ViewResult {
        message: format!("{} standard(s) with violations", violations.len()),
        nodes,
        links,
        active_filters: active(&[Collection::Standards, Collection::Risks, Collection::Issues]),
        ..ViewResult::default()
    }
}

/// Rank of a standard's regulatory importance, unknown last
fn importance_rank(standard: &Standard) -> usize {
    standard
        .regulatory_importance
        .as_deref()
        .and_then(|level| IMPORTANCE_ORDER.iter().position(|known| *known == level))
        .unwrap_or(IMPORTANCE_ORDER.len())
}

fn unmonitored_standards(data: &GraphSnapshot, _: &ViewContext) -> ViewResult {
    let Some(standards) = data.standards.as_ref() else {
        return ViewResult::default();
    };

    let mut unmonitored: Vec<&Standard> = standards
        .iter()
        .filter(|s| audit_edges(data, &s.id, &RelationType::VerifiedBy).next().is_none())
        .collect();
    unmonitored.sort_by_key(|s| importance_rank(s));

    ViewResult {
        message: format!("{} standard(s) without audit coverage", unmonitored.len()),
        nodes: unmonitored.into_iter().map(ViewNode::new).collect(),
        links: Vec::new(),
        active_filters: active(&[Collection::Standards]),
        ..ViewResult::default()
    }
}

fn audit_blind_spots(data: &GraphSnapshot, _: &ViewContext) -> ViewResult {
    let Some(all_units) = units(data) else {
        return ViewResult::default();
    };

    let mut blind: Vec<&BusinessUnit> = all_units
        .iter()
        .filter(|unit| {
            let mut owned = data
                .relationships
                .iter()
                .filter(|r| r.is(&RelationType::OwnedBy) && r.target == unit.id)
                .map(|r| &r.source)
                .peekable();
            owned.peek().is_some()
                && owned.all(|id| audit_edges(data, id, &RelationType::AssessedBy).next().is_none())
        })
        .collect();
    blind.sort_by(|a, b| {
        b.risk_score
            .unwrap_or(0.0)
            .total_cmp(&a.risk_score.unwrap_or(0.0))
    });

    let unit_ids: IndexSet<&EntityId> = blind.iter().map(|u| &u.id).collect();
    let mut owned: IndexMap<&EntityId, &Risk> = IndexMap::new();
    for rel in data
        .relationships
        .iter()
        .filter(|r| r.is(&RelationType::OwnedBy) && unit_ids.contains(&r.target))
    {
        if let Some(risk) = items(data.risks.as_ref()).find(|r| r.id == rel.source) {
            owned.entry(&risk.id).or_insert(risk);
        }
    }
    let links = data
        .relationships
        .iter()
        .filter(|r| {
            r.is(&RelationType::OwnedBy)
                && unit_ids.contains(&r.target)
                && owned.contains_key(&r.source)
        })
        .cloned()
        .collect();

    let mut nodes: Vec<ViewNode> = blind.iter().map(|u| ViewNode::new(*u)).collect();
    nodes.extend(owned.into_values().map(ViewNode::new));

    ViewResult {
        message: format!("{} business unit(s) without audits", blind.len()),
        nodes,
        links,
        active_filters: active(&[Collection::Entities, Collection::Risks]),
        ..ViewResult::default()
    }
}

fn regulatory_exposure(data: &GraphSnapshot, ctx: &ViewContext) -> ViewResult {
    let Some(risks) = data.risks.as_ref() else {
        return ViewResult::default();
    };

    let mut exposed: Vec<&Risk> = risks
        .iter()
        .filter(|risk| {
            let regulated = risk.regulatory == Some(true)
                || edges_into(data, &risk.id, &RelationType::Requires, data.standards.as_ref())
                    .iter()
                    .any(|s| s.regulatory_importance.as_deref() == Some(CRITICAL));
            let severe = residual(risk) >= ctx.high_residual_threshold
                || risk.inherent_rating.unwrap_or(0.0) >= SEVERE_INHERENT_RATING;
            regulated && severe
        })
        .collect();
    exposed.sort_by(by_residual_desc);

    let ids: IndexSet<&EntityId> = exposed.iter().map(|r| &r.id).collect();
    let (standards, links) = reached(data, data.standards.as_ref(), &ids, &RelationType::Requires);

    let mut nodes: Vec<ViewNode> = exposed.iter().map(|r| ViewNode::new(*r)).collect();
    nodes.extend(standards.into_iter().map(ViewNode::new));

    ViewResult {
        message: format!("{} high-severity regulatory risk(s)", exposed.len()),
        nodes,
        links,
        active_filters: active(&[Collection::Risks, Collection::Standards]),
        ..ViewResult::default()
    }
}

/// The built-in views, in listing order
#[must_use]
pub fn builtin_views() -> Vec<PresetView> {
    vec![
        PresetView::new(
            ViewInfo {
                id: "uncontrolled-risks",
                name: "Uncontrolled Risks",
                description: "Risks without any mitigating controls",
                priority: Priority::Critical,
                category: ViewCategory::Coverage,
            },
            uncontrolled_risks,
        ),
        PresetView::new(
            ViewInfo {
                id: "unaudited-risks",
                name: "Unaudited Risks",
                description: "Risks that have never been audited or lack recent audit coverage",
                priority: Priority::High,
                category: ViewCategory::Coverage,
            },
            unaudited_risks,
        ),
        PresetView::new(
            ViewInfo {
                id: "high-residual-risk",
                name: "High Residual Risk",
                description: "Risks that remain high after controls",
                priority: Priority::Critical,
                category: ViewCategory::Planning,
            },
            high_residual_risk,
        ),
        PresetView::new(
            ViewInfo {
                id: "enterprise-risk-profile",
                name: "Enterprise Risk Profile",
                description: "Top risks by residual rating",
                priority: Priority::High,
                category: ViewCategory::Executive,
            },
            enterprise_risk_profile,
        ),
        PresetView::new(
            ViewInfo {
                id: "high-issue-risks",
                name: "High Issue Risks",
                description: "Risks with the most associated issues",
                priority: Priority::High,
                category: ViewCategory::Hotspot,
            },
            high_issue_risks,
        ),
        PresetView::new(
            ViewInfo {
                id: "high-incident-risks",
                name: "High Incident Risks",
                description: "Risks with the most incidents (proven problems)",
                priority: Priority::High,
                category: ViewCategory::Hotspot,
            },
            high_incident_risks,
        ),
        PresetView::new(
            ViewInfo {
                id: "audit-universe-coverage",
                name: "Audit Universe Coverage",
                description: "Overall coverage metrics",
                priority: Priority::High,
                category: ViewCategory::Executive,
            },
            audit_universe_coverage,
        ),
        PresetView::new(
            ViewInfo {
                id: "standard-violations",
                name: "Standard Violations",
                description: "Standards with most non-compliance issues",
                priority: Priority::High,
                category: ViewCategory::Compliance,
            },
            standard_violations,
        ),
        PresetView::new(
            ViewInfo {
                id: "unmonitored-standards",
                name: "Unmonitored Standards",
                description: "Compliance standards without audit coverage",
                priority: Priority::High,
                category: ViewCategory::Coverage,
            },
            unmonitored_standards,
        ),
        PresetView::new(
            ViewInfo {
                id: "audit-blind-spots",
                name: "Audit Blind Spots",
                description: "Business units without any audit activity",
                priority: Priority::High,
                category: ViewCategory::Coverage,
            },
            audit_blind_spots,
        ),
        PresetView::new(
            ViewInfo {
                id: "regulatory-exposure",
                name: "Regulatory Exposure",
                description: "High-severity risks in regulated areas",
                priority: Priority::High,
                category: ViewCategory::Compliance,
            },
            regulatory_exposure,
        ),
        PresetView::new(
            ViewInfo {
                id: "failed-controls",
                name: "Failed Controls",
                description: "Controls with effectiveness issues",
                priority: Priority::Medium,
                category: ViewCategory::Hotspot,
            },
            failed_controls,
        ),
    ]
}
