//! Domains module containing business logic organized by bounded contexts.
//!
//! - **tools**: the toolsets (controller, EDA, Galaxy, lint, docs) callable by clients
//! - **resources**: read-only JSON documents describing the server setup

pub mod resources;
pub mod tools;
