pub mod assignment;
pub mod classroom;
pub mod level;
pub mod response;
pub mod stats;
pub mod student;
