//! # Vitrina application library
//!
//! The server, CLI and configuration pieces of the `vitrina` binary,
//! exposed as a library so integration tests can drive the HTTP API.

pub mod api;
pub mod cli;
pub mod config;
pub mod fetch;
