//! Normalization between raw model output and the canonical model types.
//!
//! The model is only *asked* for JSON. Everything it returns passes through
//! here: code fences are stripped, keys are matched without regard to case or
//! underscores, and any shape mismatch becomes `AiFailure::MalformedJson`.

use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

use crate::model::{
    AiSuggestion, AlignmentReport, ContentAnalysis, CoverageRecord, DetailedFeedback,
    FeedbackSuggestion, Objective, ObjectiveFields, ObjectiveType,
};
use crate::services::llm::AiFailure;

fn malformed(msg: impl Into<String>) -> AiFailure {
    AiFailure::MalformedJson(msg.into())
}

/// Removes a surrounding Markdown code fence (```json ... ```), if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parses model text as JSON. Blank text yields `empty` instead of an error.
pub fn parse_json(text: &str, empty: Value) -> Result<Value, AiFailure> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Ok(empty);
    }
    serde_json::from_str(body).map_err(|e| malformed(e.to_string()))
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Looks a field up by `names` in priority order, ignoring case and `_`/`-`.
/// Null values count as absent, so a null alias never hides a later one.
fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| {
        let wanted = normalize_key(name);
        obj.iter()
            .find(|(k, v)| !v.is_null() && normalize_key(k) == wanted)
            .map(|(_, v)| v)
    })
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, AiFailure> {
    value
        .as_object()
        .ok_or_else(|| malformed(format!("expected {} to be an object", what)))
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_field(obj: &Map<String, Value>, names: &[&str]) -> Result<String, AiFailure> {
    match field(obj, names) {
        None => Ok(String::new()),
        Some(v) => scalar_string(v)
            .ok_or_else(|| malformed(format!("field '{}' is not text", names[0]))),
    }
}

fn optional_text(obj: &Map<String, Value>, names: &[&str]) -> Result<Option<String>, AiFailure> {
    Ok(Some(text_field(obj, names)?).filter(|s| !s.is_empty()))
}

/// A list of strings. A lone string counts as a one-element list, null as empty.
pub fn string_list(value: Option<&Value>) -> Result<Vec<String>, AiFailure> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| scalar_string(v).ok_or_else(|| malformed("expected a list of strings")))
            .collect(),
        Some(other) => scalar_string(other)
            .map(|s| vec![s])
            .ok_or_else(|| malformed("expected a list of strings")),
    }
}

/// Top-level array, or an object wrapping it under `key`.
fn list_of<'a>(value: &'a Value, key: &str) -> Result<&'a Vec<Value>, AiFailure> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(obj) => field(obj, &[key])
            .and_then(Value::as_array)
            .ok_or_else(|| malformed(format!("expected an array of {}", key))),
        _ => Err(malformed(format!("expected an array of {}", key))),
    }
}

fn objective_fields(
    obj: &Map<String, Value>,
    default_type: ObjectiveType,
) -> Result<ObjectiveFields, AiFailure> {
    let objective_type = match optional_text(obj, &["type", "objectiveType", "kind"])? {
        Some(t) => t.parse().map_err(|e| malformed(format!("{}", e)))?,
        None => default_type,
    };
    Ok(ObjectiveFields {
        objective_type,
        level: text_field(obj, &["level", "bloomsLevel", "cognitiveLevel"])?,
        verb: text_field(obj, &["verb", "actionVerb"])?,
        task: text_field(obj, &["task"])?,
        condition: text_field(obj, &["condition", "conditions"])?,
        criteria: text_field(obj, &["criteria", "criterion"])?,
        parent_id: None,
    })
}

/// One generated objective before ids are assigned.
#[derive(Debug, Clone)]
pub struct GeneratedEntry {
    pub fields: ObjectiveFields,
    pub reference: Option<String>,
    pub parent: Option<ParentRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    Index(usize),
    Label(String),
}

pub fn generated_entries(value: &Value) -> Result<Vec<GeneratedEntry>, AiFailure> {
    list_of(value, "objectives")?
        .iter()
        .map(|item| {
            let obj = as_object(item, "objective")?;
            let parent = match field(obj, &["parentRef", "parentIndex", "parentId", "parent"]) {
                Some(Value::Number(n)) => n.as_u64().map(|i| ParentRef::Index(i as usize)),
                Some(Value::String(s)) if !s.trim().is_empty() => {
                    Some(ParentRef::Label(s.trim().to_string()))
                }
                _ => None,
            };
            let default_type = if parent.is_some() {
                ObjectiveType::Enabling
            } else {
                ObjectiveType::Terminal
            };
            Ok(GeneratedEntry {
                fields: objective_fields(obj, default_type)?,
                reference: optional_text(obj, &["ref", "id", "label"])?,
                parent,
            })
        })
        .collect()
}

/// Resolves each entry's parent reference to a position in `entries`.
/// Only terminal objectives are valid targets; terminal entries never get a parent.
pub fn resolve_parents(entries: &[GeneratedEntry]) -> Vec<Option<usize>> {
    let by_label: HashMap<&str, usize> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.reference.as_deref().map(|r| (r, i)))
        .collect();
    let is_terminal = |i: usize| {
        entries
            .get(i)
            .map(|e| e.fields.objective_type == ObjectiveType::Terminal)
            .unwrap_or(false)
    };

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            if entry.fields.objective_type == ObjectiveType::Terminal {
                return None;
            }
            let target = match entry.parent.as_ref()? {
                ParentRef::Index(idx) => Some(*idx),
                ParentRef::Label(label) => by_label
                    .get(label.as_str())
                    .copied()
                    .or_else(|| label.parse::<usize>().ok()),
            };
            match target {
                Some(t) if t != i && is_terminal(t) => Some(t),
                _ => {
                    warn!("Dropped unresolvable parent reference on generated objective {}", i);
                    None
                }
            }
        })
        .collect()
}

/// Revised fields for `improve`, in response order.
pub fn revised_fields(value: &Value) -> Result<Vec<ObjectiveFields>, AiFailure> {
    list_of(value, "objectives")?
        .iter()
        .map(|item| objective_fields(as_object(item, "objective")?, ObjectiveType::Terminal))
        .collect()
}

pub fn validation_suggestions(value: &Value) -> Result<Vec<String>, AiFailure> {
    match value {
        Value::Object(obj) => string_list(field(obj, &["suggestions", "improvements"])),
        other => string_list(Some(other)),
    }
}

pub fn alignment_report(value: &Value) -> Result<AlignmentReport, AiFailure> {
    let obj = as_object(value, "alignment analysis")?;
    Ok(AlignmentReport {
        alignment_issues: string_list(field(obj, &["alignmentIssues", "issues"]))?,
        improvements: string_list(field(obj, &["improvements", "suggestions"]))?,
    })
}

fn feedback_suggestion(value: &Value) -> Result<FeedbackSuggestion, AiFailure> {
    match value {
        Value::String(s) => Ok(FeedbackSuggestion {
            note: Some(s.trim().to_string()),
            ..Default::default()
        }),
        Value::Object(obj) => Ok(FeedbackSuggestion {
            objective_type: optional_text(obj, &["type"])?,
            level: optional_text(obj, &["level"])?,
            verb: optional_text(obj, &["verb"])?,
            task: optional_text(obj, &["task"])?,
            condition: optional_text(obj, &["condition"])?,
            criteria: optional_text(obj, &["criteria"])?,
            note: optional_text(obj, &["note", "explanation", "rationale"])?,
        }),
        _ => Err(malformed("expected feedback suggestions to be objects or strings")),
    }
}

pub fn detailed_feedback(value: &Value) -> Result<DetailedFeedback, AiFailure> {
    let obj = as_object(value, "feedback")?;
    let suggestions = match field(obj, &["suggestions"]) {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter(|v| !v.is_null())
            .map(feedback_suggestion)
            .collect::<Result<_, _>>()?,
        Some(single) => vec![feedback_suggestion(single)?],
    };
    Ok(DetailedFeedback {
        strengths: string_list(field(obj, &["strengths"]))?,
        weaknesses: string_list(field(obj, &["weaknesses"]))?,
        suggestions,
        examples: string_list(field(obj, &["examples"]))?,
    })
}

pub fn suggestion(value: &Value) -> Result<AiSuggestion, AiFailure> {
    let obj = as_object(value, "suggestion")?;
    let suggestion = AiSuggestion {
        verb: text_field(obj, &["verb"])?,
        task: text_field(obj, &["task"])?,
        condition: text_field(obj, &["condition"])?,
        criteria: text_field(obj, &["criteria"])?,
    };
    if suggestion.verb.is_empty() || suggestion.task.is_empty() || suggestion.criteria.is_empty() {
        return Err(malformed("suggestion is missing verb, task or criteria"));
    }
    Ok(suggestion)
}

/// Coverage keys may be objective ids or the 1-based numbers used in the prompt.
/// Keys matching neither are dropped.
pub fn content_analysis(
    value: &Value,
    objectives: &[Objective],
) -> Result<ContentAnalysis, AiFailure> {
    let obj = as_object(value, "content analysis")?;
    let mut analysis = ContentAnalysis {
        gaps: string_list(field(obj, &["gaps"]))?,
        suggestions: string_list(field(obj, &["suggestions"]))?,
        ..Default::default()
    };

    let Some(coverage) = field(obj, &["coverage"]) else {
        return Ok(analysis);
    };
    let coverage = as_object(coverage, "coverage")?;

    for (key, record) in coverage {
        let id = match Uuid::parse_str(key.trim()) {
            Ok(id) if objectives.iter().any(|o| o.id == id) => Some(id),
            _ => key
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| objectives.get(i))
                .map(|o| o.id),
        };
        let Some(id) = id else {
            warn!("Dropped coverage entry for unknown objective key");
            continue;
        };

        let record = as_object(record, "coverage record")?;
        let covered = match field(record, &["covered"]) {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(malformed("'covered' is not a boolean")),
        };
        let suggestions = string_list(field(record, &["suggestions"]))?;
        analysis.coverage.insert(
            id,
            CoverageRecord {
                covered,
                locations: string_list(field(record, &["locations"]))?,
                suggestions: Some(suggestions).filter(|s| !s.is_empty()),
            },
        );
    }
    Ok(analysis)
}
