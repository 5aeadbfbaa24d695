//! Messaging core for the social backend: accounts, connections, groups,
//! conversations, and the recipe-removal cascade.

pub mod config;
pub mod domain;
pub mod outbound;

pub use config::CascadeSettings;
