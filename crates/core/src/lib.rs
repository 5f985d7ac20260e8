//! Domain logic for the QuickAI generation service.
//!
//! Everything in this crate is pure: no I/O, no async. The HTTP layer,
//! identity store and completion provider live in their own crates and
//! call into these rules.

pub mod creation;
pub mod error;
pub mod generation;
pub mod plan;
pub mod types;
