pub mod api;
pub mod core;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod stores;
