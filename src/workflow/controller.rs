use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::export::{export_file_name, ExportDocument};
use super::requests::{RequestKey, RequestRegistry, Ticket};
use super::state::{AppState, StateDelta};
use super::view::{View, ViewCommand};
use crate::extract::{course_name_from_file, extract_text, ExtractionError, FileDescriptor};
use crate::model::{
    create_objective, AiSuggestion, AlignmentReport, ContentAnalysis, DetailedFeedback, Objective,
    ObjectiveFields, ObjectiveId, ValidationError,
};
use crate::services::ai::{AiService, AiServiceError};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("cannot {command:?} while the {from} view is open")]
    InvalidTransition { from: View, command: ViewCommand },
    #[error("this action needs the {expected} view, but the {actual} view is open")]
    WrongView { expected: View, actual: View },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("no text content could be extracted from the file")]
    EmptyContent,
    #[error("a course name is required")]
    MissingCourseName,
    #[error("no objective with id {0}")]
    UnknownObjective(ObjectiveId),
    #[error("at least {required} objectives are needed, found {actual}")]
    NotEnoughObjectives { required: usize, actual: usize },
    #[error("please provide both content and objectives to analyze")]
    MissingAnalysisInput,
    #[error("no suggestion is available for objective {0}")]
    NoSuggestion(ObjectiveId),
    #[error("suggestion {0} does not change any objective field")]
    SuggestionNotApplicable(usize),
    #[error("failed to serialize objectives: {0}")]
    Export(#[from] serde_json::Error),
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// What happened when a finished AI request was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowNotice {
    ObjectivesGenerated { count: usize },
    FeedbackReady(ObjectiveId),
    ValidationReady(ObjectiveId),
    SuggestionReady(ObjectiveId),
    AlignmentReady,
    ObjectivesImproved { count: usize },
    ContentAnalyzed,
    Failed { key: RequestKey, message: String },
    /// Superseded, invalidated, or computed against a collection that has since changed.
    Discarded(RequestKey),
}

enum Outcome {
    Generated {
        course: String,
        result: Result<Vec<Objective>, AiServiceError>,
    },
    Feedback(Result<DetailedFeedback, AiServiceError>),
    Validation(Result<Vec<String>, AiServiceError>),
    Suggestion(Result<AiSuggestion, AiServiceError>),
    Alignment(Result<AlignmentReport, AiServiceError>),
    Improved {
        collection_version: u64,
        result: Result<Vec<Objective>, AiServiceError>,
    },
    ContentAnalyzed {
        content: String,
        result: Result<ContentAnalysis, AiServiceError>,
    },
}

struct Completion {
    ticket: Ticket,
    outcome: Outcome,
}

/// Authoring workflow over one in-memory objective collection.
///
/// AI requests run as spawned tasks and report back on a channel. Nothing they
/// return touches state until the driver calls [`process_completions`] or
/// [`next_completion`], so every mutation happens on the caller's task, in order.
///
/// [`process_completions`]: WorkflowController::process_completions
/// [`next_completion`]: WorkflowController::next_completion
pub struct WorkflowController {
    state: AppState,
    ai: AiService,
    requests: RequestRegistry,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl WorkflowController {
    pub fn new(state: AppState, ai: AiService) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state,
            ai,
            requests: RequestRegistry::new(),
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn is_in_flight(&self, key: RequestKey) -> bool {
        self.requests.is_in_flight(&key)
    }

    pub fn pending_requests(&self) -> usize {
        self.requests.in_flight_count()
    }

    // === View ===

    fn transition(&mut self, command: ViewCommand) -> Result<View, WorkflowError> {
        let from = self.state.view();
        let to = from
            .transition(command)
            .ok_or(WorkflowError::InvalidTransition { from, command })?;
        debug!("View {} -> {} ({:?})", from, to, command);
        self.state.reduce(StateDelta::ViewChanged(to));
        Ok(to)
    }

    fn require_view(&self, expected: View) -> Result<(), WorkflowError> {
        let actual = self.state.view();
        if actual != expected {
            return Err(WorkflowError::WrongView { expected, actual });
        }
        Ok(())
    }

    pub fn start_upload(&mut self) -> Result<(), WorkflowError> {
        self.transition(ViewCommand::StartUpload).map(|_| ())
    }

    pub fn start_manual_add(&mut self) -> Result<(), WorkflowError> {
        self.transition(ViewCommand::StartManualAdd).map(|_| ())
    }

    /// Closes the open panel. A pending generation from the uploader is discarded.
    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        if self.state.view() == View::ShowingUploader {
            self.requests.invalidate(RequestKey::Generation);
        }
        self.transition(ViewCommand::Cancel).map(|_| ())
    }

    // === Collection ===

    pub fn set_course(&mut self, course: &str) {
        self.state.reduce(StateDelta::CourseSet(course.to_string()));
    }

    /// Appends in input order. No content deduplication.
    pub fn add_objectives(&mut self, objectives: Vec<Objective>) {
        if objectives.is_empty() {
            return;
        }
        info!("Adding {} objectives", objectives.len());
        self.state.reduce(StateDelta::ObjectivesAdded(objectives));
    }

    /// Removes the objective; false when it was not present.
    pub fn delete_objective(&mut self, id: ObjectiveId) -> bool {
        if self.state.objective(id).is_none() {
            return false;
        }
        self.requests.invalidate_objective(id);
        self.state.reduce(StateDelta::ObjectiveRemoved(id));
        info!("Deleted objective {}", id);
        true
    }

    /// Creates an objective from form input and closes the form.
    /// Invalid input leaves the form open and never reaches the AI layer.
    pub fn submit_form(&mut self, fields: ObjectiveFields) -> Result<ObjectiveId, WorkflowError> {
        self.require_view(View::ShowingForm)?;
        let objective = create_objective(fields)?;
        let id = objective.id;
        self.add_objectives(vec![objective]);
        self.transition(ViewCommand::Complete)?;
        Ok(id)
    }

    pub fn export_collection(&self) -> Result<String, WorkflowError> {
        let document = ExportDocument {
            course: self.state.course().to_string(),
            objectives: self.state.objectives().to_vec(),
        };
        Ok(document.to_json()?)
    }

    pub fn export_file_name(&self) -> String {
        export_file_name(self.state.course())
    }

    pub fn export_to(&self, dir: &Path) -> Result<PathBuf, WorkflowError> {
        let path = dir.join(self.export_file_name());
        std::fs::write(&path, self.export_collection()?)?;
        info!("Exported {} objectives", self.state.objectives().len());
        Ok(path)
    }

    // === Uploader ===

    pub fn set_upload_course(&mut self, name: &str) -> Result<(), WorkflowError> {
        self.require_view(View::ShowingUploader)?;
        self.state.reduce(StateDelta::UploadCourseSet(name.to_string()));
        Ok(())
    }

    /// Extracts the file into the uploader draft. Returns the extracted length in chars.
    /// Failures are also kept as the uploader's error message.
    pub fn load_upload(&mut self, file: &FileDescriptor) -> Result<usize, WorkflowError> {
        self.require_view(View::ShowingUploader)?;

        let text = match extract_text(file) {
            Ok(text) => text,
            Err(e) => {
                self.state.reduce(StateDelta::UploadFailed(e.to_string()));
                return Err(e.into());
            }
        };
        if text.trim().is_empty() {
            let err = WorkflowError::EmptyContent;
            self.state.reduce(StateDelta::UploadFailed(err.to_string()));
            return Err(err);
        }

        if self.state.upload().course_name.is_empty() {
            let course = course_name_from_file(&file.name);
            self.state.reduce(StateDelta::UploadCourseSet(course));
        }
        let chars = text.chars().count();
        self.state.reduce(StateDelta::UploadLoaded {
            file_name: file.name.clone(),
            content: text,
        });
        Ok(chars)
    }

    pub fn generate_from_upload(&mut self) -> Result<(), WorkflowError> {
        self.require_view(View::ShowingUploader)?;
        let upload = self.state.upload();
        if upload.content.trim().is_empty() {
            return Err(WorkflowError::EmptyContent);
        }
        if upload.course_name.is_empty() {
            return Err(WorkflowError::MissingCourseName);
        }
        let content = upload.content.clone();
        let course = upload.course_name.clone();

        if let Some(ticket) = self.requests.begin(RequestKey::Generation) {
            let ai = self.ai.clone();
            self.spawn(ticket, async move {
                let result = ai.generate_objectives(&content, Some(&course)).await;
                Outcome::Generated { course, result }
            });
        }
        Ok(())
    }

    // === Per-objective AI requests ===

    fn objective_for_request(&self, id: ObjectiveId) -> Result<Objective, WorkflowError> {
        self.state
            .objective(id)
            .cloned()
            .ok_or(WorkflowError::UnknownObjective(id))
    }

    /// Starts a detailed-feedback request. `Ok(false)` when one is already in
    /// flight for this objective; the trigger is then a no-op.
    pub fn request_feedback(&mut self, id: ObjectiveId) -> Result<bool, WorkflowError> {
        let objective = self.objective_for_request(id)?;
        let Some(ticket) = self.requests.begin(RequestKey::Feedback(id)) else {
            debug!("Feedback for {} already in flight", id);
            return Ok(false);
        };
        let ai = self.ai.clone();
        self.spawn(ticket, async move {
            Outcome::Feedback(ai.get_detailed_feedback(&objective).await)
        });
        Ok(true)
    }

    pub fn request_validation(&mut self, id: ObjectiveId) -> Result<bool, WorkflowError> {
        let objective = self.objective_for_request(id)?;
        let Some(ticket) = self.requests.begin(RequestKey::Validation(id)) else {
            return Ok(false);
        };
        let ai = self.ai.clone();
        self.spawn(ticket, async move {
            Outcome::Validation(ai.validate_objective(&objective).await)
        });
        Ok(true)
    }

    pub fn request_suggestion(&mut self, id: ObjectiveId) -> Result<bool, WorkflowError> {
        let objective = self.objective_for_request(id)?;
        let Some(ticket) = self.requests.begin(RequestKey::Suggestion(id)) else {
            return Ok(false);
        };
        let ai = self.ai.clone();
        self.spawn(ticket, async move {
            Outcome::Suggestion(ai.suggest_improvement(&objective).await)
        });
        Ok(true)
    }

    /// Applies the `index`-th structured suggestion from the stored feedback.
    pub fn apply_feedback_suggestion(
        &mut self,
        id: ObjectiveId,
        index: usize,
    ) -> Result<(), WorkflowError> {
        let mut objective = self.objective_for_request(id)?;
        let suggestion = self
            .state
            .feedback(id)
            .and_then(|f| f.suggestions.get(index))
            .ok_or(WorkflowError::NoSuggestion(id))?;
        if !suggestion.is_applicable() {
            return Err(WorkflowError::SuggestionNotApplicable(index));
        }
        objective.apply_feedback_suggestion(suggestion);
        self.replace_objective(objective);
        Ok(())
    }

    pub fn apply_suggestion(&mut self, id: ObjectiveId) -> Result<(), WorkflowError> {
        let mut objective = self.objective_for_request(id)?;
        let suggestion = self.state.suggestion(id).ok_or(WorkflowError::NoSuggestion(id))?;
        objective.apply_suggestion(suggestion);
        self.replace_objective(objective);
        Ok(())
    }

    /// Requests still in flight describe the old content and must not land.
    fn replace_objective(&mut self, objective: Objective) {
        self.requests.invalidate_objective(objective.id);
        self.state.reduce(StateDelta::ObjectiveReplaced(objective));
    }

    // === Collection-wide AI requests ===

    /// Rejected before any network call when fewer than two objectives exist.
    pub fn request_alignment(&mut self) -> Result<(), WorkflowError> {
        let objectives = self.state.objectives().to_vec();
        if objectives.len() < 2 {
            return Err(WorkflowError::NotEnoughObjectives {
                required: 2,
                actual: objectives.len(),
            });
        }
        if let Some(ticket) = self.requests.begin(RequestKey::Alignment) {
            let ai = self.ai.clone();
            self.spawn(ticket, async move {
                Outcome::Alignment(ai.analyze_objective_alignment(&objectives).await)
            });
        }
        Ok(())
    }

    pub fn request_improvement(&mut self) -> Result<(), WorkflowError> {
        let objectives = self.state.objectives().to_vec();
        if objectives.is_empty() {
            return Err(WorkflowError::NotEnoughObjectives { required: 1, actual: 0 });
        }
        let collection_version = self.state.collection_version;
        if let Some(ticket) = self.requests.begin(RequestKey::Improve) {
            let ai = self.ai.clone();
            self.spawn(ticket, async move {
                let result = ai.improve_objectives(&objectives).await;
                Outcome::Improved { collection_version, result }
            });
        }
        Ok(())
    }

    pub fn request_content_analysis(&mut self, content: String) -> Result<(), WorkflowError> {
        let objectives = self.state.objectives().to_vec();
        if content.trim().is_empty() || objectives.is_empty() {
            return Err(WorkflowError::MissingAnalysisInput);
        }
        if let Some(ticket) = self.requests.begin(RequestKey::ContentAnalysis) {
            let ai = self.ai.clone();
            self.spawn(ticket, async move {
                let result = ai.analyze_content(&content, &objectives).await;
                Outcome::ContentAnalyzed { content, result }
            });
        }
        Ok(())
    }

    // === Completions ===

    fn spawn<F>(&self, ticket: Ticket, work: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        info!("Dispatched {:?} (generation {})", ticket.key, ticket.generation);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = work.await;
            // Receiver only disappears with the controller
            let _ = tx.send(Completion { ticket, outcome });
        });
    }

    /// Applies every completion that has already arrived, without waiting.
    pub fn process_completions(&mut self) -> Vec<WorkflowNotice> {
        let mut notices = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            notices.push(self.apply(completion));
        }
        notices
    }

    /// Waits for the next completion and applies it.
    /// `None` when nothing is in flight and nothing is queued.
    pub async fn next_completion(&mut self) -> Option<WorkflowNotice> {
        if self.requests.in_flight_count() == 0 {
            return self.rx.try_recv().ok().map(|c| self.apply(c));
        }
        let completion = self.rx.recv().await?;
        Some(self.apply(completion))
    }

    fn apply(&mut self, completion: Completion) -> WorkflowNotice {
        let Completion { ticket, outcome } = completion;
        let key = ticket.key;
        if !self.requests.finish(ticket) {
            info!("Discarded stale {:?} (generation {})", key, ticket.generation);
            return WorkflowNotice::Discarded(key);
        }

        match outcome {
            Outcome::Generated { course, result } => match result {
                Ok(objectives) => {
                    let count = objectives.len();
                    self.add_objectives(objectives);
                    self.set_course(&course);
                    if self.state.view() == View::ShowingUploader {
                        self.state.reduce(StateDelta::ViewChanged(View::Idle));
                    }
                    WorkflowNotice::ObjectivesGenerated { count }
                }
                Err(e) => self.fail(key, e),
            },
            Outcome::Feedback(result) => match (result, key.objective()) {
                (Ok(feedback), Some(id)) => {
                    self.state.reduce(StateDelta::FeedbackReceived { id, feedback });
                    WorkflowNotice::FeedbackReady(id)
                }
                (Err(e), _) => self.fail(key, e),
                (Ok(_), None) => WorkflowNotice::Discarded(key),
            },
            Outcome::Validation(result) => match (result, key.objective()) {
                (Ok(suggestions), Some(id)) => {
                    self.state.reduce(StateDelta::ValidationReceived { id, suggestions });
                    WorkflowNotice::ValidationReady(id)
                }
                (Err(e), _) => self.fail(key, e),
                (Ok(_), None) => WorkflowNotice::Discarded(key),
            },
            Outcome::Suggestion(result) => match (result, key.objective()) {
                (Ok(suggestion), Some(id)) => {
                    self.state.reduce(StateDelta::SuggestionReceived { id, suggestion });
                    WorkflowNotice::SuggestionReady(id)
                }
                (Err(e), _) => self.fail(key, e),
                (Ok(_), None) => WorkflowNotice::Discarded(key),
            },
            Outcome::Alignment(result) => match result {
                Ok(report) => {
                    self.state.reduce(StateDelta::AlignmentReceived(report));
                    WorkflowNotice::AlignmentReady
                }
                Err(e) => self.fail(key, e),
            },
            Outcome::Improved { collection_version, result } => match result {
                // Revisions computed against an older collection are not merged
                Ok(_) if collection_version != self.state.collection_version => {
                    warn!("Discarded improvement computed for a changed collection");
                    WorkflowNotice::Discarded(key)
                }
                Ok(revised) => {
                    let count = revised.len();
                    for objective in &revised {
                        self.requests.invalidate_objective(objective.id);
                    }
                    self.state.reduce(StateDelta::ObjectivesRevised(revised));
                    WorkflowNotice::ObjectivesImproved { count }
                }
                Err(e) => self.fail(key, e),
            },
            Outcome::ContentAnalyzed { content, result } => match result {
                Ok(analysis) => {
                    self.state.reduce(StateDelta::ContentAnalysisReceived { content, analysis });
                    WorkflowNotice::ContentAnalyzed
                }
                Err(e) => self.fail(key, e),
            },
        }
    }

    fn fail(&mut self, key: RequestKey, error: AiServiceError) -> WorkflowNotice {
        let message = error.to_string();
        self.state.reduce(StateDelta::RequestFailed {
            key,
            message: message.clone(),
        });
        WorkflowNotice::Failed { key, message }
    }
}
