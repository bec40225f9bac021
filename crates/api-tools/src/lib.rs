//! Transport-agnostic core of `apibridge`.
//!
//! This crate turns a named tool invocation into a concrete HTTP request
//! against the target API and normalizes the response or failure into a
//! uniform result. It intentionally contains **no** MCP protocol logic and
//! **no** process/serving concerns; those live in `apibridge-server`.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod registry;
pub mod translate;
