pub mod config;
pub mod extract;
pub mod logging;
pub mod model;
pub mod services;
pub mod workflow;

// Re-export the pieces a driver needs to assemble a session
pub use config::Config;
pub use services::ai::AiService;
pub use services::llm::OpenAiChatClient;
pub use workflow::WorkflowController;
