pub mod bundle;
pub mod handlers;
pub mod orchestrator;
pub mod producer;
pub mod prompts;
pub mod stages;
pub mod store;
pub mod taxonomy;
