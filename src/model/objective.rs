use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use super::analysis::{AiSuggestion, FeedbackSuggestion};
use super::taxonomy;

pub type ObjectiveId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveType {
    /// Final, top-level outcome.
    Terminal,
    /// Supporting step toward a terminal objective.
    Enabling,
}

/// Cognitive taxonomy levels, ordered from lower- to higher-order thinking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CognitiveLevel {
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl CognitiveLevel {
    pub const ALL: [CognitiveLevel; 6] = [
        CognitiveLevel::Remember,
        CognitiveLevel::Understand,
        CognitiveLevel::Apply,
        CognitiveLevel::Analyze,
        CognitiveLevel::Evaluate,
        CognitiveLevel::Create,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CognitiveLevel::Remember => "remember",
            CognitiveLevel::Understand => "understand",
            CognitiveLevel::Apply => "apply",
            CognitiveLevel::Analyze => "analyze",
            CognitiveLevel::Evaluate => "evaluate",
            CognitiveLevel::Create => "create",
        }
    }
}

impl ObjectiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveType::Terminal => "terminal",
            ObjectiveType::Enabling => "enabling",
        }
    }
}

impl fmt::Display for CognitiveLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ObjectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CognitiveLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CognitiveLevel::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownLevel(s.to_string()))
    }
}

impl FromStr for ObjectiveType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terminal" => Ok(ObjectiveType::Terminal),
            "enabling" => Ok(ObjectiveType::Enabling),
            _ => Err(ValidationError::UnknownType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    EmptyField(&'static str),
    #[error("unknown cognitive level '{0}'")]
    UnknownLevel(String),
    #[error("unknown objective type '{0}'")]
    UnknownType(String),
}

/// User- or model-supplied fields for a new objective, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveFields {
    pub objective_type: ObjectiveType,
    pub level: String,
    pub verb: String,
    pub task: String,
    pub condition: String,
    pub criteria: String,
    pub parent_id: Option<ObjectiveId>,
}

impl Default for ObjectiveFields {
    fn default() -> Self {
        Self {
            objective_type: ObjectiveType::Terminal,
            level: String::new(),
            verb: String::new(),
            task: String::new(),
            condition: String::new(),
            criteria: String::new(),
            parent_id: None,
        }
    }
}

/// A single instructional statement.
///
/// `id` and `timestamp` are fixed at creation. `parent_id` is a lookup
/// reference only; removing the parent leaves it dangling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: ObjectiveId,
    #[serde(rename = "type")]
    pub objective_type: ObjectiveType,
    pub level: CognitiveLevel,
    pub verb: String,
    pub task: String,
    #[serde(default)]
    pub condition: String,
    pub criteria: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ObjectiveId>,
}

/// Validates `fields` and builds an objective with a fresh id and the current time.
pub fn create_objective(fields: ObjectiveFields) -> Result<Objective, ValidationError> {
    create_objective_at(fields, Uuid::new_v4(), Utc::now())
}

/// Same validation as [`create_objective`], with identity supplied by the caller.
/// Used when an AI revision must keep the original id and timestamp.
pub fn create_objective_at(
    fields: ObjectiveFields,
    id: ObjectiveId,
    timestamp: DateTime<Utc>,
) -> Result<Objective, ValidationError> {
    let level: CognitiveLevel = fields.level.parse()?;
    let verb = required("verb", fields.verb)?;
    let task = required("task", fields.task)?;
    let criteria = required("criteria", fields.criteria)?;

    Ok(Objective {
        id,
        objective_type: fields.objective_type,
        level,
        verb,
        task,
        condition: fields.condition.trim().to_string(),
        criteria,
        timestamp,
        parent_id: fields.parent_id,
    })
}

fn required(name: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(name));
    }
    Ok(trimmed.to_string())
}

impl Objective {
    /// Learner-facing sentence, e.g.
    /// "Given a schematic, identify each component with 90% accuracy".
    pub fn statement(&self) -> String {
        let core = format!("{} {} {}", self.verb, self.task, self.criteria);
        if self.condition.is_empty() {
            core
        } else {
            format!("{}, {}", self.condition, core)
        }
    }

    /// Advisory only: authoring stays permissive about off-table verbs.
    pub fn verb_matches_level(&self) -> bool {
        taxonomy::is_conventional_verb(self.level, &self.verb)
    }

    pub fn fields(&self) -> ObjectiveFields {
        ObjectiveFields {
            objective_type: self.objective_type,
            level: self.level.as_str().to_string(),
            verb: self.verb.clone(),
            task: self.task.clone(),
            condition: self.condition.clone(),
            criteria: self.criteria.clone(),
            parent_id: self.parent_id,
        }
    }

    /// Replaces the four content fields. Blank suggestion fields keep the current value
    /// for verb, task and criteria so the objective stays valid.
    pub fn apply_suggestion(&mut self, suggestion: &AiSuggestion) {
        replace_if_present(&mut self.verb, &suggestion.verb);
        replace_if_present(&mut self.task, &suggestion.task);
        self.condition = suggestion.condition.trim().to_string();
        replace_if_present(&mut self.criteria, &suggestion.criteria);
    }

    /// Overrides every field the suggestion carries. Unparseable type or level
    /// values leave the current value in place.
    pub fn apply_feedback_suggestion(&mut self, suggestion: &FeedbackSuggestion) {
        if let Some(kind) = suggestion.objective_type.as_deref() {
            if let Ok(parsed) = kind.parse() {
                self.objective_type = parsed;
            }
        }
        if let Some(level) = suggestion.level.as_deref() {
            if let Ok(parsed) = level.parse() {
                self.level = parsed;
            }
        }
        if let Some(verb) = &suggestion.verb {
            replace_if_present(&mut self.verb, verb);
        }
        if let Some(task) = &suggestion.task {
            replace_if_present(&mut self.task, task);
        }
        if let Some(condition) = &suggestion.condition {
            self.condition = condition.trim().to_string();
        }
        if let Some(criteria) = &suggestion.criteria {
            replace_if_present(&mut self.criteria, criteria);
        }
    }
}

fn replace_if_present(slot: &mut String, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        *slot = value.to_string();
    }
}
