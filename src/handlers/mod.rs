pub mod classrooms;
pub mod fallback;
pub mod health;
pub mod homework;
pub mod metrics;
pub mod session;
pub mod stats;
