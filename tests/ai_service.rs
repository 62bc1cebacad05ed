mod common;

use common::{objective, StubBackend};
use objective_studio::model::ObjectiveType;
use objective_studio::services::ai::{AiOperation, AiService};
use objective_studio::services::llm::AiFailure;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn generated_parents_are_remapped_to_new_ids() {
    let backend = StubBackend::replying(
        r#"{"objectives": [
            {"type": "terminal", "level": "create", "verb": "design", "task": "a lesson plan", "condition": "", "criteria": "meeting the rubric"},
            {"type": "enabling", "parentIndex": 0, "level": "understand", "verb": "explain", "task": "backward design", "condition": "", "criteria": "in own words"},
            {"type": "terminal", "parentIndex": 0, "level": "evaluate", "verb": "critique", "task": "a peer plan", "condition": "", "criteria": "using the rubric"},
            {"type": "enabling", "parentIndex": 1, "level": "remember", "verb": "list", "task": "design stages", "condition": "", "criteria": "all three"}
        ]}"#,
    );
    let ai = AiService::new(backend.clone());

    let objectives = ai
        .generate_objectives("Lesson planning notes", Some("Teaching 201"))
        .await
        .unwrap();

    assert_eq!(objectives.len(), 4);
    assert_eq!(objectives[1].parent_id, Some(objectives[0].id));
    // Terminal objectives never get a parent
    assert_eq!(objectives[2].objective_type, ObjectiveType::Terminal);
    assert_eq!(objectives[2].parent_id, None);
    // Enabling objectives only hang off terminal ones
    assert_eq!(objectives[3].parent_id, None);
    assert!(objectives.iter().all(|o| o.timestamp == objectives[0].timestamp));

    let prompt = &backend.prompts()[0];
    assert!(prompt.contains("Teaching 201"));
    assert!(prompt.contains("Lesson planning notes"));
}

#[tokio::test]
async fn blank_generation_reply_yields_nothing() {
    let ai = AiService::new(StubBackend::replying("   "));
    let objectives = ai.generate_objectives("content", None).await.unwrap();
    assert!(objectives.is_empty());
}

#[tokio::test]
async fn generated_objective_with_unknown_level_fails_the_batch() {
    let ai = AiService::new(StubBackend::replying(
        r#"[{"type": "terminal", "level": "synthesis", "verb": "build", "task": "x", "condition": "", "criteria": "y"}]"#,
    ));
    let err = ai.generate_objectives("content", None).await.unwrap_err();
    assert_eq!(err.operation, AiOperation::GenerateObjectives);
    assert!(matches!(err.cause, AiFailure::MalformedJson(_)));
}

#[tokio::test]
async fn malformed_reply_is_reported_with_operation_message() {
    let ai = AiService::new(StubBackend::replying("Sure! Here are some objectives:"));
    let err = ai.analyze_objective_alignment(&[objective("A"), objective("B")]).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to analyze alignment");
    assert!(matches!(err.cause, AiFailure::MalformedJson(_)));
}

#[tokio::test]
async fn endpoint_errors_pass_through() {
    let ai = AiService::new(StubBackend::failing(AiFailure::NonSuccess {
        status: 429,
        body: "rate limited".to_string(),
    }));
    let err = ai.get_detailed_feedback(&objective("A")).await.unwrap_err();
    assert_eq!(err.operation, AiOperation::DetailedFeedback);
    assert_eq!(
        err.cause,
        AiFailure::NonSuccess {
            status: 429,
            body: "rate limited".to_string()
        }
    );
}

#[tokio::test]
async fn validation_accepts_bare_list_or_wrapped_object() {
    let ai = AiService::new(StubBackend::replying(r#"["Add a measurable criterion"]"#));
    assert_eq!(
        ai.validate_objective(&objective("A")).await.unwrap(),
        vec!["Add a measurable criterion"]
    );

    let ai = AiService::new(StubBackend::replying(r#"{"suggestions": ["Use an observable verb"]}"#));
    assert_eq!(
        ai.validate_objective(&objective("A")).await.unwrap(),
        vec!["Use an observable verb"]
    );
}

#[tokio::test]
async fn feedback_suggestions_may_be_plain_strings() {
    let ai = AiService::new(StubBackend::replying(
        r#"{"strengths": [], "weaknesses": ["vague criteria"], "suggestions": ["Quantify the criteria"], "examples": null}"#,
    ));
    let feedback = ai.get_detailed_feedback(&objective("A")).await.unwrap();
    assert_eq!(feedback.weaknesses, vec!["vague criteria"]);
    assert_eq!(feedback.suggestions[0].note.as_deref(), Some("Quantify the criteria"));
    assert!(!feedback.suggestions[0].is_applicable());
    assert!(feedback.examples.is_empty());
}

#[tokio::test]
async fn suggestion_without_task_is_rejected() {
    let ai = AiService::new(StubBackend::replying(r#"{"verb": "Compute", "criteria": "exactly"}"#));
    let err = ai.suggest_improvement(&objective("A")).await.unwrap_err();
    assert_eq!(err.operation, AiOperation::SuggestImprovement);
}

#[tokio::test]
async fn coverage_keys_resolve_by_id_and_unknown_keys_are_dropped() {
    let a = objective("A");
    let b = objective("B");
    let reply = format!(
        r#"{{"coverage": {{
            "{}": {{"covered": false, "locations": [], "suggestions": ["Add a worked example"]}},
            "not-an-objective": {{"covered": true, "locations": ["p. 3"]}}
        }}, "gaps": [], "suggestions": []}}"#,
        b.id
    );
    let ai = AiService::new(StubBackend::replying(&reply));

    let analysis = ai.analyze_content("text", &[a.clone(), b.clone()]).await.unwrap();
    assert_eq!(analysis.coverage.len(), 1);
    let record = &analysis.coverage[&b.id];
    assert!(!record.covered);
    assert_eq!(record.suggestions, Some(vec!["Add a worked example".to_string()]));
}
