pub mod driver;
pub mod engine;
pub mod llm_client;
pub mod loader;
pub mod prompt_builder;
pub mod transcript_writer;
