//! AI Orchestration Service
//!
//! Every operation follows the same shape: render a prompt, make one model
//! call, parse the reply as JSON, normalize it, map it into model types.
//! Any failure along the way is an [`AiServiceError`] and nothing is applied.

pub mod prompts;
pub mod response;
pub mod service;

pub use service::AiService;

use std::fmt;
use thiserror::Error;

use crate::services::llm::AiFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiOperation {
    GenerateObjectives,
    ValidateObjective,
    AnalyzeAlignment,
    ImproveObjectives,
    DetailedFeedback,
    AnalyzeContent,
    SuggestImprovement,
}

impl AiOperation {
    /// Short message shown to the user when the operation fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            AiOperation::GenerateObjectives => "Failed to generate objectives from content",
            AiOperation::ValidateObjective => "Failed to validate objective",
            AiOperation::AnalyzeAlignment => "Failed to analyze alignment",
            AiOperation::ImproveObjectives => "Failed to improve objectives",
            AiOperation::DetailedFeedback => "Failed to get detailed feedback",
            AiOperation::AnalyzeContent => "Failed to analyze content",
            AiOperation::SuggestImprovement => "Failed to generate AI suggestion",
        }
    }
}

impl fmt::Display for AiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AiOperation::GenerateObjectives => "generate-objectives",
            AiOperation::ValidateObjective => "validate-objective",
            AiOperation::AnalyzeAlignment => "analyze-alignment",
            AiOperation::ImproveObjectives => "improve-objectives",
            AiOperation::DetailedFeedback => "detailed-feedback",
            AiOperation::AnalyzeContent => "analyze-content",
            AiOperation::SuggestImprovement => "suggest-improvement",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .operation.failure_message())]
pub struct AiServiceError {
    pub operation: AiOperation,
    #[source]
    pub cause: AiFailure,
}
