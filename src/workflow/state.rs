use std::collections::HashMap;

use super::requests::RequestKey;
use super::view::View;
use crate::model::{
    AiSuggestion, AlignmentReport, ContentAnalysis, DetailedFeedback, Objective, ObjectiveId,
};

/// Uploader panel draft. Lives only while the uploader is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadDraft {
    pub file_name: Option<String>,
    pub course_name: String,
    pub content: String,
    pub error: Option<String>,
}

/// Strict state delta. This is the ONLY way state mutates.
#[derive(Debug, Clone)]
pub enum StateDelta {
    ObjectivesAdded(Vec<Objective>),
    ObjectiveRemoved(ObjectiveId),
    ObjectiveReplaced(Objective),
    /// Whole-batch replacement by id; caller guarantees every id exists.
    ObjectivesRevised(Vec<Objective>),
    CourseSet(String),
    ViewChanged(View),
    UploadCourseSet(String),
    UploadLoaded { file_name: String, content: String },
    UploadFailed(String),
    FeedbackReceived { id: ObjectiveId, feedback: DetailedFeedback },
    ValidationReceived { id: ObjectiveId, suggestions: Vec<String> },
    SuggestionReceived { id: ObjectiveId, suggestion: AiSuggestion },
    AlignmentReceived(AlignmentReport),
    ContentAnalysisReceived { content: String, analysis: ContentAnalysis },
    RequestFailed { key: RequestKey, message: String },
}

/// Everything the authoring session knows. Owned by the controller,
/// read by the driver through accessors.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    objectives: Vec<Objective>,
    course: String,
    view: View,
    upload: UploadDraft,
    feedback: HashMap<ObjectiveId, DetailedFeedback>,
    validation: HashMap<ObjectiveId, Vec<String>>,
    suggestions: HashMap<ObjectiveId, AiSuggestion>,
    alignment: Option<AlignmentReport>,
    content_analysis: Option<(String, ContentAnalysis)>,
    errors: HashMap<RequestKey, String>,
    /// Bumped whenever the objective collection itself changes.
    pub collection_version: u64,
    /// Bumped on every reduction.
    pub version: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(&mut self, delta: StateDelta) {
        self.version += 1;

        match delta {
            StateDelta::ObjectivesAdded(new_objectives) => {
                self.objectives.extend(new_objectives);
                self.collection_version += 1;
            }
            StateDelta::ObjectiveRemoved(id) => {
                let before = self.objectives.len();
                self.objectives.retain(|o| o.id != id);
                if self.objectives.len() != before {
                    self.collection_version += 1;
                }
                self.forget_objective(id);
            }
            StateDelta::ObjectiveReplaced(objective) => {
                let id = objective.id;
                if let Some(slot) = self.objectives.iter_mut().find(|o| o.id == id) {
                    *slot = objective;
                    self.collection_version += 1;
                    self.forget_objective(id);
                }
            }
            StateDelta::ObjectivesRevised(revised) => {
                for objective in revised {
                    let id = objective.id;
                    if let Some(slot) = self.objectives.iter_mut().find(|o| o.id == id) {
                        *slot = objective;
                    }
                    self.forget_objective(id);
                }
                self.collection_version += 1;
            }
            StateDelta::CourseSet(course) => {
                self.course = course.trim().to_string();
            }
            StateDelta::ViewChanged(view) => {
                if view == View::ShowingUploader {
                    self.upload = UploadDraft {
                        course_name: self.course.clone(),
                        ..Default::default()
                    };
                    self.errors.remove(&RequestKey::Generation);
                } else if view == View::Idle {
                    self.upload = UploadDraft::default();
                }
                self.view = view;
            }
            StateDelta::UploadCourseSet(name) => {
                self.upload.course_name = name.trim().to_string();
            }
            StateDelta::UploadLoaded { file_name, content } => {
                self.upload.file_name = Some(file_name);
                self.upload.content = content;
                self.upload.error = None;
            }
            StateDelta::UploadFailed(message) => {
                self.upload.content.clear();
                self.upload.error = Some(message);
            }
            StateDelta::FeedbackReceived { id, feedback } => {
                self.errors.remove(&RequestKey::Feedback(id));
                self.feedback.insert(id, feedback);
            }
            StateDelta::ValidationReceived { id, suggestions } => {
                self.errors.remove(&RequestKey::Validation(id));
                self.validation.insert(id, suggestions);
            }
            StateDelta::SuggestionReceived { id, suggestion } => {
                self.errors.remove(&RequestKey::Suggestion(id));
                self.suggestions.insert(id, suggestion);
            }
            StateDelta::AlignmentReceived(report) => {
                self.errors.remove(&RequestKey::Alignment);
                self.alignment = Some(report);
            }
            StateDelta::ContentAnalysisReceived { content, analysis } => {
                self.errors.remove(&RequestKey::ContentAnalysis);
                self.content_analysis = Some((content, analysis));
            }
            StateDelta::RequestFailed { key, message } => {
                if key == RequestKey::Generation {
                    self.upload.error = Some(message.clone());
                }
                self.errors.insert(key, message);
            }
        }
    }

    /// Drops per-objective results that no longer describe the stored objective.
    fn forget_objective(&mut self, id: ObjectiveId) {
        self.feedback.remove(&id);
        self.validation.remove(&id);
        self.suggestions.remove(&id);
        self.errors.retain(|key, _| key.objective() != Some(id));
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn objective(&self, id: ObjectiveId) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.id == id)
    }

    /// Enabling objectives that point at `parent`.
    pub fn children_of(&self, parent: ObjectiveId) -> Vec<&Objective> {
        self.objectives
            .iter()
            .filter(|o| o.parent_id == Some(parent))
            .collect()
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn upload(&self) -> &UploadDraft {
        &self.upload
    }

    pub fn feedback(&self, id: ObjectiveId) -> Option<&DetailedFeedback> {
        self.feedback.get(&id)
    }

    pub fn validation(&self, id: ObjectiveId) -> Option<&[String]> {
        self.validation.get(&id).map(Vec::as_slice)
    }

    pub fn suggestion(&self, id: ObjectiveId) -> Option<&AiSuggestion> {
        self.suggestions.get(&id)
    }

    pub fn alignment(&self) -> Option<&AlignmentReport> {
        self.alignment.as_ref()
    }

    /// Last analyzed content together with its analysis.
    pub fn content_analysis(&self) -> Option<(&str, &ContentAnalysis)> {
        self.content_analysis.as_ref().map(|(c, a)| (c.as_str(), a))
    }

    pub fn error(&self, key: RequestKey) -> Option<&str> {
        self.errors.get(&key).map(String::as_str)
    }
}
