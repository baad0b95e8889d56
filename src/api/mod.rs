pub mod assignments;
pub mod classroom;
pub mod client;
pub mod users;

#[cfg(test)]
pub(crate) mod mock;
