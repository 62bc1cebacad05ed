use super::objective::{CognitiveLevel, ObjectiveType};

/// Conventional action verbs per cognitive level.
/// Some verbs legitimately appear under more than one level.
pub fn verbs_for(level: CognitiveLevel) -> &'static [&'static str] {
    match level {
        CognitiveLevel::Remember => &[
            "define", "describe", "identify", "label", "list", "match", "name", "recall",
            "recognize", "state", "arrange", "duplicate", "memorize", "order", "relate",
            "repeat", "reproduce", "select",
        ],
        CognitiveLevel::Understand => &[
            "classify", "compare", "explain", "illustrate", "interpret", "outline",
            "summarize", "translate", "convert", "defend", "distinguish", "estimate",
            "extend", "generalize", "give examples", "infer", "paraphrase", "predict",
            "rewrite", "discuss",
        ],
        CognitiveLevel::Apply => &[
            "apply", "demonstrate", "implement", "modify", "operate", "practice",
            "solve", "use", "calculate", "change", "choose", "complete", "compute",
            "construct", "determine", "develop", "experiment", "illustrate", "manipulate",
            "prepare", "produce", "relate", "show", "sketch",
        ],
        CognitiveLevel::Analyze => &[
            "analyze", "categorize", "compare", "contrast", "differentiate", "examine",
            "investigate", "organize", "appraise", "break down", "calculate", "criticize",
            "diagram", "discriminate", "distinguish", "experiment", "identify", "illustrate",
            "infer", "outline", "point out", "relate", "select", "separate", "subdivide", "test",
        ],
        CognitiveLevel::Evaluate => &[
            "appraise", "argue", "critique", "defend", "evaluate", "judge", "justify",
            "support", "assess", "choose", "compare", "conclude", "contrast", "criticize",
            "decide", "discriminate", "estimate", "explain", "interpret", "measure", "rate",
            "recommend", "revise", "score", "select", "summarize", "value",
        ],
        CognitiveLevel::Create => &[
            "compose", "construct", "create", "design", "develop", "formulate", "plan",
            "produce", "arrange", "assemble", "categorize", "collect", "combine",
            "compile", "devise", "explain", "generate", "manage", "modify", "organize",
            "perform", "prepare", "propose", "rearrange", "reconstruct", "relate",
            "reorganize", "revise", "rewrite", "set up", "summarize", "synthesize", "tell", "write",
        ],
    }
}

/// Case-insensitive membership check against the verb table.
pub fn is_conventional_verb(level: CognitiveLevel, verb: &str) -> bool {
    let verb = verb.trim();
    verbs_for(level).iter().any(|v| v.eq_ignore_ascii_case(verb))
}

/// Every level a verb conventionally belongs to, in taxonomy order.
pub fn levels_for_verb(verb: &str) -> Vec<CognitiveLevel> {
    CognitiveLevel::ALL
        .iter()
        .copied()
        .filter(|level| is_conventional_verb(*level, verb))
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct TypeGuidance {
    pub description: &'static str,
    pub examples: &'static [&'static str],
}

pub fn guidance_for(kind: ObjectiveType) -> TypeGuidance {
    match kind {
        ObjectiveType::Terminal => TypeGuidance {
            description: "Terminal objectives are the final learning outcomes that learners should achieve by the end of the instruction.",
            examples: &[
                "By the end of this course, learners will be able to develop a complete project management plan.",
                "Learners will successfully troubleshoot and repair common network issues.",
            ],
        },
        ObjectiveType::Enabling => TypeGuidance {
            description: "Enabling objectives are the smaller, intermediate learning steps needed to achieve the terminal objective.",
            examples: &[
                "Define the key components of a project management plan",
                "Identify common network troubleshooting tools",
            ],
        },
    }
}
