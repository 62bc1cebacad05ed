use crate::model::Objective;

/// Upper bound on content embedded in a single prompt, in chars.
pub const MAX_CONTENT_CHARS: usize = 48_000;

const JSON_ONLY: &str = "Respond with JSON only. Do not wrap it in Markdown or add commentary.";

fn describe(obj: &Objective) -> String {
    let mut block = format!(
        "Type: {}\nLevel: {}\nVerb: {}\nTask: {}\nCondition: {}\nCriteria: {}",
        obj.objective_type, obj.level, obj.verb, obj.task, obj.condition, obj.criteria
    );
    if let Some(parent) = obj.parent_id {
        block.push_str(&format!("\nParent ID: {}", parent));
    }
    block
}

fn describe_all(objectives: &[Objective]) -> String {
    objectives
        .iter()
        .enumerate()
        .map(|(i, obj)| format!("Objective {} (ID: {})\n{}", i + 1, obj.id, describe(obj)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Truncates on a char boundary so multi-byte text never splits.
fn clip(content: &str) -> &str {
    match content.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

pub fn generate_objectives(content: &str, course: Option<&str>) -> String {
    let course_line = course
        .filter(|c| !c.trim().is_empty())
        .map(|c| format!("Course: {}\n", c.trim()))
        .unwrap_or_default();

    format!(
        "Analyze this content and generate appropriate learning objectives. Create both terminal and enabling objectives. \
Terminal objectives should be high-level outcomes, while enabling objectives should be specific steps to achieve the terminal objectives.\n\
Return a JSON array of objects, each with:\n\
{{\n  \"ref\": short unique label such as \"T1\" or \"E3\",\n  \"type\": \"terminal\" or \"enabling\",\n  \
\"level\": one of remember, understand, apply, analyze, evaluate, create,\n  \"verb\": action verb suited to the level,\n  \
\"task\": specific learning task,\n  \"condition\": learning conditions,\n  \"criteria\": measurable success criteria,\n  \
\"parentRef\": null for terminal objectives, the \"ref\" of the supported terminal objective for enabling ones\n}}\n\
{}\n\n{}Content to analyze:\n{}",
        JSON_ONLY,
        course_line,
        clip(content)
    )
}

pub fn validate_objective(obj: &Objective) -> String {
    format!(
        "Analyze this learning objective and provide specific improvement suggestions:\n{}\n\n\
Consider:\n\
1. SMART criteria (Specific, Measurable, Achievable, Relevant, Time-bound)\n\
2. Appropriate use of Bloom's taxonomy verbs\n\
3. Clarity and precision of language\n\
4. Measurability of success criteria\n\
5. Alignment with objective type (terminal vs enabling)\n\n\
Return a JSON array of specific, actionable suggestion strings. {}",
        describe(obj),
        JSON_ONLY
    )
}

pub fn analyze_alignment(objectives: &[Objective]) -> String {
    format!(
        "Analyze these learning objectives for alignment and completeness:\n\n{}\n\n\
Evaluate:\n\
1. Do enabling objectives properly support their terminal objectives?\n\
2. Are there any gaps in the learning progression?\n\
3. Is there appropriate coverage of all necessary skills/knowledge?\n\
4. Are the objectives properly sequenced?\n\n\
Return JSON with:\n{{\n  \"alignmentIssues\": [specific alignment problems],\n  \"improvements\": [suggested improvements]\n}}\n{}",
        describe_all(objectives),
        JSON_ONLY
    )
}

pub fn improve_objectives(objectives: &[Objective]) -> String {
    format!(
        "Improve these learning objectives while maintaining their relationships:\n\n{}\n\n\
Return a JSON array with exactly {} objects, in the same order as above, each with \
\"type\", \"level\", \"verb\", \"task\", \"condition\" and \"criteria\", but better:\n\
1. More precise verbs from Bloom's taxonomy\n\
2. Clearer task descriptions\n\
3. More specific conditions\n\
4. More measurable criteria\n\
5. Maintained relationships between terminal and enabling objectives\n{}",
        describe_all(objectives),
        objectives.len(),
        JSON_ONLY
    )
}

pub fn detailed_feedback(obj: &Objective) -> String {
    format!(
        "Provide detailed feedback for this learning objective:\n{}\n\n\
Return JSON with:\n{{\n  \"strengths\": [specific strong points],\n  \"weaknesses\": [areas needing improvement],\n  \
\"suggestions\": [objects with any of \"type\", \"level\", \"verb\", \"task\", \"condition\", \"criteria\" holding a revised value],\n  \
\"examples\": [example revisions as full sentences]\n}}\n{}",
        describe(obj),
        JSON_ONLY
    )
}

pub fn suggest_improvement(obj: &Objective) -> String {
    format!(
        "Suggest one improved version of this learning objective, keeping its type and level:\n{}\n\n\
Return JSON with:\n{{\n  \"verb\": action verb,\n  \"task\": task,\n  \"condition\": condition,\n  \"criteria\": criteria\n}}\n{}",
        describe(obj),
        JSON_ONLY
    )
}

pub fn analyze_content(content: &str, objectives: &[Objective]) -> String {
    format!(
        "Check whether this training content covers the learning objectives below.\n\n\
Objectives:\n{}\n\n\
Return JSON with:\n{{\n  \"coverage\": {{ \"<objective ID>\": {{ \"covered\": true or false, \"locations\": [short excerpts from the content], \
\"suggestions\": [how to cover it better] }} }},\n  \"gaps\": [topics the objectives need but the content lacks],\n  \
\"suggestions\": [overall improvement suggestions]\n}}\n{}\n\nContent:\n{}",
        describe_all(objectives),
        JSON_ONLY,
        clip(content)
    )
}
