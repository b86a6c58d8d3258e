pub mod llm;
pub mod retry;
