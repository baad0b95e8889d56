pub mod credential;
pub mod orchestrator;
pub mod resolver;
pub mod slug;
pub mod stats;
