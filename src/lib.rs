pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod graph;
pub mod terminal;
pub mod tickets;
pub mod workflow;
