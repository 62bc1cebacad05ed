use objective_studio::model::taxonomy::{guidance_for, verbs_for};
use objective_studio::model::{
    create_objective, AiSuggestion, CognitiveLevel, ObjectiveFields, ObjectiveType, ValidationError,
};
use chrono::Utc;
use pretty_assertions::assert_eq;

fn fields() -> ObjectiveFields {
    ObjectiveFields {
        objective_type: ObjectiveType::Terminal,
        level: "Analyze".to_string(),
        verb: " differentiate ".to_string(),
        task: "between series and parallel circuits ".to_string(),
        condition: " given a schematic".to_string(),
        criteria: "with 90% accuracy".to_string(),
        parent_id: None,
    }
}

#[test]
fn created_objectives_get_distinct_ids() {
    let a = create_objective(fields()).unwrap();
    let b = create_objective(fields()).unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(a.level, CognitiveLevel::Analyze);
    assert_eq!(a.verb, "differentiate");
    assert_eq!(a.condition, "given a schematic");
}

#[test]
fn timestamp_is_never_in_the_future() {
    let before = Utc::now();
    let objective = create_objective(fields()).unwrap();
    assert!(before <= objective.timestamp);
    assert!(objective.timestamp <= Utc::now());
}

#[test]
fn required_fields_are_checked() {
    let mut f = fields();
    f.verb.clear();
    assert_eq!(create_objective(f), Err(ValidationError::EmptyField("verb")));

    let mut f = fields();
    f.task = "  ".to_string();
    assert_eq!(create_objective(f), Err(ValidationError::EmptyField("task")));

    let mut f = fields();
    f.criteria.clear();
    assert_eq!(create_objective(f), Err(ValidationError::EmptyField("criteria")));
}

#[test]
fn condition_may_be_empty() {
    let mut f = fields();
    f.condition = String::new();
    let objective = create_objective(f).unwrap();
    assert_eq!(
        objective.statement(),
        "differentiate between series and parallel circuits with 90% accuracy"
    );
}

#[test]
fn unknown_level_is_rejected() {
    let mut f = fields();
    f.level = "synthesize".to_string();
    assert_eq!(
        create_objective(f),
        Err(ValidationError::UnknownLevel("synthesize".to_string()))
    );
}

#[test]
fn off_table_verbs_are_allowed_but_flagged() {
    let mut f = fields();
    f.level = "remember".to_string();
    f.verb = "design".to_string();
    let objective = create_objective(f).unwrap();
    assert!(!objective.verb_matches_level());
    assert!(verbs_for(CognitiveLevel::Create).contains(&"design"));
}

#[test]
fn enabling_objective_keeps_parent_reference() {
    let parent = create_objective(fields()).unwrap();
    let mut f = fields();
    f.objective_type = ObjectiveType::Enabling;
    f.parent_id = Some(parent.id);
    let child = create_objective(f).unwrap();
    assert_eq!(child.parent_id, Some(parent.id));

    let json = serde_json::to_value(&child).unwrap();
    assert_eq!(json["parentId"], parent.id.to_string());
    assert_eq!(json["type"], "enabling");
}

#[test]
fn statement_includes_condition_first() {
    let objective = create_objective(fields()).unwrap();
    assert_eq!(
        objective.statement(),
        "given a schematic, differentiate between series and parallel circuits with 90% accuracy"
    );
}

#[test]
fn applying_a_suggestion_keeps_identity() {
    let mut objective = create_objective(fields()).unwrap();
    let (id, timestamp) = (objective.id, objective.timestamp);
    objective.apply_suggestion(&AiSuggestion {
        verb: "Classify".to_string(),
        task: "each circuit".to_string(),
        condition: String::new(),
        criteria: " ".to_string(),
    });
    assert_eq!(objective.id, id);
    assert_eq!(objective.timestamp, timestamp);
    assert_eq!(objective.verb, "Classify");
    assert_eq!(objective.condition, "");
    // Blank criteria would make the objective invalid
    assert_eq!(objective.criteria, "with 90% accuracy");
}

#[test]
fn type_guidance_has_examples() {
    for kind in [ObjectiveType::Terminal, ObjectiveType::Enabling] {
        let guidance = guidance_for(kind);
        assert!(!guidance.description.is_empty());
        assert!(!guidance.examples.is_empty());
    }
}
