use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{prompts, response, AiOperation, AiServiceError};
use crate::model::{
    create_objective_at, AiSuggestion, AlignmentReport, ContentAnalysis, DetailedFeedback,
    Objective,
};
use crate::services::llm::{AiFailure, ChatBackend};

/// Orchestrates prompt -> model -> validated result for every AI-assisted operation.
/// Each call is one round trip; nothing is retried and nothing is applied partially.
#[derive(Clone)]
pub struct AiService {
    backend: Arc<dyn ChatBackend>,
}

impl AiService {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    async fn round_trip(
        &self,
        operation: AiOperation,
        prompt: String,
        empty: Value,
    ) -> Result<Value, AiServiceError> {
        info!("AI {} request ({} prompt chars)", operation, prompt.len());
        let text = self
            .backend
            .complete(&prompt)
            .await
            .map_err(|cause| fail(operation, cause))?;
        response::parse_json(&text, empty).map_err(|cause| fail(operation, cause))
    }

    pub async fn generate_objectives(
        &self,
        content: &str,
        course: Option<&str>,
    ) -> Result<Vec<Objective>, AiServiceError> {
        let op = AiOperation::GenerateObjectives;
        let value = self
            .round_trip(op, prompts::generate_objectives(content, course), json!([]))
            .await?;
        let entries = response::generated_entries(&value).map_err(|c| fail(op, c))?;
        let parents = response::resolve_parents(&entries);

        let now = Utc::now();
        let ids: Vec<Uuid> = entries.iter().map(|_| Uuid::new_v4()).collect();
        let mut objectives = Vec::with_capacity(entries.len());
        for (i, entry) in entries.into_iter().enumerate() {
            let mut fields = entry.fields;
            fields.parent_id = parents[i].map(|p| ids[p]);
            let objective = create_objective_at(fields, ids[i], now)
                .map_err(|e| {
                    fail(op, AiFailure::MalformedJson(format!("objective {}: {}", i + 1, e)))
                })?;
            objectives.push(objective);
        }

        info!("AI {} produced {} objectives", op, objectives.len());
        Ok(objectives)
    }

    pub async fn validate_objective(
        &self,
        objective: &Objective,
    ) -> Result<Vec<String>, AiServiceError> {
        let op = AiOperation::ValidateObjective;
        let value = self
            .round_trip(op, prompts::validate_objective(objective), json!([]))
            .await?;
        response::validation_suggestions(&value).map_err(|c| fail(op, c))
    }

    /// Callers gate this on at least two objectives; fewer make the analysis meaningless.
    pub async fn analyze_objective_alignment(
        &self,
        objectives: &[Objective],
    ) -> Result<AlignmentReport, AiServiceError> {
        let op = AiOperation::AnalyzeAlignment;
        let value = self
            .round_trip(op, prompts::analyze_alignment(objectives), json!({}))
            .await?;
        response::alignment_report(&value).map_err(|c| fail(op, c))
    }

    /// Returns revisions in input order, each keeping the original id, timestamp and
    /// parent link. A reply with a different count fails the whole batch.
    pub async fn improve_objectives(
        &self,
        objectives: &[Objective],
    ) -> Result<Vec<Objective>, AiServiceError> {
        let op = AiOperation::ImproveObjectives;
        let value = self
            .round_trip(op, prompts::improve_objectives(objectives), json!([]))
            .await?;
        let revisions = response::revised_fields(&value).map_err(|c| fail(op, c))?;

        if revisions.len() != objectives.len() {
            warn!(
                "AI {} returned {} objectives for {} inputs",
                op,
                revisions.len(),
                objectives.len()
            );
            return Err(fail(
                op,
                AiFailure::MalformedJson(format!(
                    "expected {} objectives, got {}",
                    objectives.len(),
                    revisions.len()
                )),
            ));
        }

        objectives
            .iter()
            .zip(revisions)
            .enumerate()
            .map(|(i, (original, mut fields))| {
                fields.parent_id = original.parent_id;
                create_objective_at(fields, original.id, original.timestamp).map_err(|e| {
                    fail(op, AiFailure::MalformedJson(format!("objective {}: {}", i + 1, e)))
                })
            })
            .collect()
    }

    pub async fn get_detailed_feedback(
        &self,
        objective: &Objective,
    ) -> Result<DetailedFeedback, AiServiceError> {
        let op = AiOperation::DetailedFeedback;
        let value = self
            .round_trip(op, prompts::detailed_feedback(objective), json!({}))
            .await?;
        response::detailed_feedback(&value).map_err(|c| fail(op, c))
    }

    pub async fn analyze_content(
        &self,
        content: &str,
        objectives: &[Objective],
    ) -> Result<ContentAnalysis, AiServiceError> {
        let op = AiOperation::AnalyzeContent;
        let value = self
            .round_trip(op, prompts::analyze_content(content, objectives), json!({}))
            .await?;
        response::content_analysis(&value, objectives).map_err(|c| fail(op, c))
    }

    pub async fn suggest_improvement(
        &self,
        objective: &Objective,
    ) -> Result<AiSuggestion, AiServiceError> {
        let op = AiOperation::SuggestImprovement;
        let value = self
            .round_trip(op, prompts::suggest_improvement(objective), json!({}))
            .await?;
        response::suggestion(&value).map_err(|c| fail(op, c))
    }
}

fn fail(operation: AiOperation, cause: AiFailure) -> AiServiceError {
    warn!("AI {} failed: {}", operation, cause);
    AiServiceError { operation, cause }
}
