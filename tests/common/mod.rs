#![allow(dead_code)]

use async_trait::async_trait;
use objective_studio::model::{create_objective, Objective, ObjectiveFields, ObjectiveType};
use objective_studio::services::llm::{AiFailure, ChatBackend};
use objective_studio::{AiService, WorkflowController};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

type Reply = Box<dyn Fn(&str) -> Result<String, AiFailure> + Send + Sync>;

/// Scripted model endpoint. Counts calls, records prompts, and can hold
/// every reply until the test releases it.
pub struct StubBackend {
    reply: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    gate: Option<Semaphore>,
}

impl StubBackend {
    pub fn replying(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Self::with(move |_| Ok(text.clone()))
    }

    pub fn failing(failure: AiFailure) -> Arc<Self> {
        Self::with(move |_| Err(failure.clone()))
    }

    pub fn with(reply: impl Fn(&str) -> Result<String, AiFailure> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    /// Replies are held until [`StubBackend::release`] hands out permits.
    pub fn gated(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Arc::new(Self {
            reply: Box::new(move |_| Ok(text.clone())),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            gate: Some(Semaphore::new(0)),
        })
    }

    pub fn release(&self, replies: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(replies);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for StubBackend {
    async fn complete(&self, prompt: &str) -> Result<String, AiFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        (self.reply)(prompt)
    }
}

pub fn controller(backend: Arc<StubBackend>) -> WorkflowController {
    WorkflowController::new(Default::default(), AiService::new(backend))
}

pub fn fields(task: &str) -> ObjectiveFields {
    ObjectiveFields {
        objective_type: ObjectiveType::Terminal,
        level: "apply".to_string(),
        verb: "calculate".to_string(),
        task: task.to_string(),
        condition: "given a circuit diagram".to_string(),
        criteria: "within 5% error".to_string(),
        parent_id: None,
    }
}

pub fn objective(task: &str) -> Objective {
    create_objective(fields(task)).unwrap()
}
