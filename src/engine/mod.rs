pub mod engine;
pub mod protocol;

pub mod llm_client;
pub mod narrative_parser;
pub mod prompt_builder;
pub mod save_store;
pub mod session;

#[cfg(test)]
pub mod testing;
