use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::objective::{Objective, ObjectiveId};

/// Candidate replacement for an objective's content fields. Never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AiSuggestion {
    pub verb: String,
    pub task: String,
    pub condition: String,
    pub criteria: String,
}

/// One structured revision proposed in detailed feedback. Every field is optional;
/// `note` carries suggestions the model phrased as plain prose.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSuggestion {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub objective_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl FeedbackSuggestion {
    /// True when the suggestion changes at least one objective field.
    pub fn is_applicable(&self) -> bool {
        self.objective_type.is_some()
            || self.level.is_some()
            || self.verb.is_some()
            || self.task.is_some()
            || self.condition.is_some()
            || self.criteria.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetailedFeedback {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<FeedbackSuggestion>,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentReport {
    pub alignment_issues: Vec<String>,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoverageRecord {
    pub covered: bool,
    pub locations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

/// Result of comparing a body of content against a set of objectives.
/// Recomputed on demand, never patched incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub coverage: BTreeMap<ObjectiveId, CoverageRecord>,
    pub gaps: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageStatus {
    Covered,
    Uncovered,
    /// The analysis did not mention this objective.
    NotAssessed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageDisplay {
    pub objective_id: ObjectiveId,
    pub task: String,
    pub status: CoverageStatus,
    pub locations: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Joins objectives with their coverage records, in objective order.
/// Coverage entries for ids not in `objectives` are ignored.
pub fn derive_coverage_summary(
    objectives: &[Objective],
    analysis: &ContentAnalysis,
) -> Vec<CoverageDisplay> {
    objectives
        .iter()
        .map(|obj| match analysis.coverage.get(&obj.id) {
            Some(record) => CoverageDisplay {
                objective_id: obj.id,
                task: obj.task.clone(),
                status: if record.covered {
                    CoverageStatus::Covered
                } else {
                    CoverageStatus::Uncovered
                },
                locations: record.locations.clone(),
                suggestions: record.suggestions.clone().unwrap_or_default(),
            },
            None => CoverageDisplay {
                objective_id: obj.id,
                task: obj.task.clone(),
                status: CoverageStatus::NotAssessed,
                locations: Vec::new(),
                suggestions: Vec::new(),
            },
        })
        .collect()
}
