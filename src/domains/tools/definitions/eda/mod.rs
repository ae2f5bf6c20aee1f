//! Event-Driven Ansible toolset.
//!
//! Rulebook activations, rulebooks, projects and decision environments on
//! the EDA REST API (`EDA_URL`, e.g. `https://aap.example.com/api/eda/v1`).

mod activations;
mod catalog;

pub use activations::{
    CreateActivationTool, DeleteActivationTool, DisableActivationTool, EnableActivationTool,
    GetActivationTool, ListActivationsTool, RestartActivationTool,
};
pub use catalog::{ListDecisionEnvironmentsTool, ListEdaProjectsTool, ListRulebooksTool};

toolset!(
    ListActivationsTool,
    GetActivationTool,
    CreateActivationTool,
    EnableActivationTool,
    DisableActivationTool,
    RestartActivationTool,
    DeleteActivationTool,
    ListRulebooksTool,
    ListEdaProjectsTool,
    ListDecisionEnvironmentsTool,
);
