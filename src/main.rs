use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use objective_studio::extract::{extract_text, FileDescriptor};
use objective_studio::logging::init_logging;
use objective_studio::model::taxonomy::{guidance_for, levels_for_verb, verbs_for};
use objective_studio::model::{
    derive_coverage_summary, CognitiveLevel, CoverageStatus, ObjectiveFields, ObjectiveId,
    ObjectiveType,
};
use objective_studio::workflow::{View, WorkflowNotice};
use objective_studio::{AiService, Config, OpenAiChatClient, WorkflowController};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  upload <path>          open the uploader and extract a document
  course <name>          set the course (uploader course while uploading)
  generate               generate objectives from the uploaded document
  add <type>|<level>|<verb>|<task>|<condition>|<criteria>[|<parent #>]
  list                   show the collection
  verbs <level>          conventional verbs for a cognitive level
  guide <type>           what terminal and enabling objectives are
  delete <#>             remove an objective
  feedback <#>           detailed feedback for an objective
  validate <#>           quick validation suggestions
  suggest <#>            ask for a rewritten objective
  apply <#> [k]          apply the rewrite, or feedback suggestion k
  align                  analyze alignment across the collection
  improve                revise every objective in one batch
  analyze <path>         map a content document against the objectives
  export [dir]           write the collection as JSON
  cancel                 close the uploader or form
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_with_dotenv().context("loading configuration")?;
    init_logging("objective_studio=info");
    tracing::info!("Objective Studio starting (model {})", config.model);

    let client = OpenAiChatClient::new(&config);
    if !client.has_api_key() {
        tracing::warn!("No API key configured; AI commands will fail");
    }
    let ai = AiService::new(Arc::new(client));
    let mut controller = WorkflowController::new(Default::default(), ai);

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match run_command(&mut controller, line.trim()) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => println!("error: {:#}", e),
                }
            }
            Some(notice) = controller.next_completion(), if controller.pending_requests() > 0 => {
                report(&controller, &notice);
            }
        }

        for notice in controller.process_completions() {
            report(&controller, &notice);
        }
    }

    tracing::info!("Objective Studio stopped");
    Ok(())
}

/// Returns `Ok(false)` when the session should end.
fn run_command(controller: &mut WorkflowController, line: &str) -> anyhow::Result<bool> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "" => {}
        "help" => println!("{}", HELP),
        "quit" | "exit" => return Ok(false),
        "upload" => {
            if controller.state().view() != View::ShowingUploader {
                controller.start_upload()?;
            }
            let file = FileDescriptor::from_path(Path::new(rest))
                .with_context(|| format!("reading {}", rest))?;
            let chars = controller.load_upload(&file)?;
            println!(
                "loaded {} ({} chars), course: '{}'",
                file.name,
                chars,
                controller.state().upload().course_name
            );
        }
        "course" => {
            if controller.state().view() == View::ShowingUploader {
                controller.set_upload_course(rest)?;
            } else {
                controller.set_course(rest);
            }
        }
        "generate" => {
            controller.generate_from_upload()?;
            println!("generating objectives...");
        }
        "add" => {
            let fields = parse_fields(controller, rest)?;
            controller.start_manual_add()?;
            match controller.submit_form(fields) {
                Ok(id) => println!("added {}", id),
                Err(e) => {
                    controller.cancel()?;
                    return Err(e.into());
                }
            }
        }
        "list" => list(controller),
        "verbs" => {
            let level: CognitiveLevel = rest.parse()?;
            println!("{}: {}", level, verbs_for(level).join(", "));
        }
        "guide" => {
            let kind: ObjectiveType = rest.parse()?;
            let guidance = guidance_for(kind);
            println!("{}", guidance.description);
            for example in guidance.examples {
                println!("  e.g. {}", example);
            }
        }
        "delete" => {
            let id = objective_at(controller, rest)?;
            controller.delete_objective(id);
        }
        "feedback" => {
            let id = objective_at(controller, rest)?;
            if !controller.request_feedback(id)? {
                println!("feedback already requested");
            }
        }
        "validate" => {
            let id = objective_at(controller, rest)?;
            controller.request_validation(id)?;
        }
        "suggest" => {
            let id = objective_at(controller, rest)?;
            controller.request_suggestion(id)?;
        }
        "apply" => {
            let mut args = rest.split_whitespace();
            let id = objective_at(controller, args.next().unwrap_or(""))?;
            match args.next() {
                Some(k) => {
                    let k: usize = k.parse().context("suggestion number")?;
                    controller.apply_feedback_suggestion(id, k.saturating_sub(1))?;
                }
                None => controller.apply_suggestion(id)?,
            }
            list(controller);
        }
        "align" => controller.request_alignment()?,
        "improve" => controller.request_improvement()?,
        "analyze" => {
            let file = FileDescriptor::from_path(Path::new(rest))
                .with_context(|| format!("reading {}", rest))?;
            let content = extract_text(&file)?;
            controller.request_content_analysis(content)?;
        }
        "export" => {
            let dir = if rest.is_empty() { "." } else { rest };
            let path = controller.export_to(Path::new(dir))?;
            println!("wrote {}", path.display());
        }
        "cancel" => controller.cancel()?,
        other => bail!("unknown command '{}', try 'help'", other),
    }
    Ok(true)
}

/// Accepts a list number or a full objective id.
fn objective_at(controller: &WorkflowController, arg: &str) -> anyhow::Result<ObjectiveId> {
    if let Ok(id) = arg.parse::<ObjectiveId>() {
        if controller.state().objective(id).is_none() {
            bail!("no objective with id {}", id);
        }
        return Ok(id);
    }
    let n: usize = arg.parse().with_context(|| format!("'{}' is not an objective number", arg))?;
    let objectives = controller.state().objectives();
    match n.checked_sub(1).and_then(|i| objectives.get(i)) {
        Some(objective) => Ok(objective.id),
        None => bail!("no objective #{} (have {})", n, objectives.len()),
    }
}

fn parse_fields(controller: &WorkflowController, rest: &str) -> anyhow::Result<ObjectiveFields> {
    let parts: Vec<&str> = rest.split('|').map(str::trim).collect();
    if parts.len() < 6 {
        bail!("expected type|level|verb|task|condition|criteria");
    }
    let parent_id = match parts.get(6) {
        Some(p) if !p.is_empty() => Some(objective_at(controller, p)?),
        _ => None,
    };
    Ok(ObjectiveFields {
        objective_type: parts[0].parse()?,
        level: parts[1].to_string(),
        verb: parts[2].to_string(),
        task: parts[3].to_string(),
        condition: parts[4].to_string(),
        criteria: parts[5].to_string(),
        parent_id,
    })
}

fn list(controller: &WorkflowController) {
    let state = controller.state();
    if !state.course().is_empty() {
        println!("course: {}", state.course());
    }
    if state.objectives().is_empty() {
        println!("(no objectives)");
    }
    for (i, objective) in state.objectives().iter().enumerate() {
        let indent = if objective.parent_id.is_some() { "    " } else { "" };
        let flag = if objective.verb_matches_level() {
            String::new()
        } else {
            let usual: Vec<&str> =
                levels_for_verb(&objective.verb).iter().map(|l| l.as_str()).collect();
            if usual.is_empty() {
                " [uncommon verb]".to_string()
            } else {
                format!(" [verb usually {}]", usual.join("/"))
            }
        };
        println!(
            "{}{}. [{} / {}] {}{}",
            indent,
            i + 1,
            objective.objective_type,
            objective.level,
            objective.statement(),
            flag
        );
    }
}

fn report(controller: &WorkflowController, notice: &WorkflowNotice) {
    let state = controller.state();
    match notice {
        WorkflowNotice::ObjectivesGenerated { count } => {
            println!("generated {} objectives", count);
            list(controller);
        }
        WorkflowNotice::FeedbackReady(id) => {
            if let Some(feedback) = state.feedback(*id) {
                print_section("strengths", &feedback.strengths);
                print_section("weaknesses", &feedback.weaknesses);
                for (k, s) in feedback.suggestions.iter().enumerate() {
                    let note = s.note.as_deref().unwrap_or("");
                    let mark = if s.is_applicable() { " (apply)" } else { "" };
                    println!("  suggestion {}{}: {}", k + 1, mark, note);
                }
                print_section("examples", &feedback.examples);
            }
        }
        WorkflowNotice::ValidationReady(id) => {
            print_section("validation", state.validation(*id).unwrap_or_default());
        }
        WorkflowNotice::SuggestionReady(id) => {
            if let Some(s) = state.suggestion(*id) {
                println!("suggested: {} {}, {}, {}", s.verb, s.task, s.condition, s.criteria);
            }
        }
        WorkflowNotice::AlignmentReady => {
            if let Some(report) = state.alignment() {
                print_section("alignment issues", &report.alignment_issues);
                print_section("improvements", &report.improvements);
            }
        }
        WorkflowNotice::ObjectivesImproved { count } => {
            println!("revised {} objectives", count);
            list(controller);
        }
        WorkflowNotice::ContentAnalyzed => {
            if let Some((_, analysis)) = state.content_analysis() {
                for row in derive_coverage_summary(state.objectives(), analysis) {
                    let status = match row.status {
                        CoverageStatus::Covered => "covered",
                        CoverageStatus::Uncovered => "not covered",
                        CoverageStatus::NotAssessed => "not assessed",
                    };
                    println!("  {}: {}", row.task, status);
                    for location in &row.locations {
                        println!("      at {}", location);
                    }
                }
                print_section("gaps", &analysis.gaps);
                print_section("suggestions", &analysis.suggestions);
            }
        }
        WorkflowNotice::Failed { message, .. } => println!("error: {}", message),
        WorkflowNotice::Discarded(key) => tracing::debug!("Dropped stale {:?} result", key),
    }
}

fn print_section(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}:", title);
    for item in items {
        println!("  - {}", item);
    }
}
