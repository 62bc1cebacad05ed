use serde::{Deserialize, Serialize};

use crate::model::Objective;

/// The downloadable artifact: `{ "course": ..., "objectives": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub course: String,
    pub objectives: Vec<Objective>,
}

impl ExportDocument {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// `<course>-objectives.json`, or `learning-objectives.json` without a course.
pub fn export_file_name(course: &str) -> String {
    let course = course.trim();
    let stem = if course.is_empty() { "learning" } else { course };
    // Path separators would escape the target directory
    let stem: String = stem
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    format!("{}-objectives.json", stem)
}
