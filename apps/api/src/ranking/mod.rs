pub mod corpus;
pub mod error;
pub mod handlers;
pub mod locks;
pub mod models;
pub mod orchestrator;
pub mod store;

#[cfg(test)]
pub mod testing;
