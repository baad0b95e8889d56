pub mod assignment_cache;
pub mod cache_log;
pub mod classroom_views;
