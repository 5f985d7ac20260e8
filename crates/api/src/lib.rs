//! QuickAI API server library.
//!
//! Exposes the building blocks (config, state, error handling, the caller
//! gate, the generation engine, routes) so integration tests and the
//! binary entrypoint assemble the exact same application.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
