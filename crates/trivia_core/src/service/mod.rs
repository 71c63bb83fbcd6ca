//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record-store reads and selector calls into use cases.
//! - Own the "empty result means not found" policy.
//! - Keep API/CLI layers decoupled from storage details.

pub mod trivia_service;
