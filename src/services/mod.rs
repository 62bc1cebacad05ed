pub mod ai;
pub mod llm;
