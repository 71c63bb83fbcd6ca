//! Trivia domain model.
//!
//! # Responsibility
//! - Define the question/category records shared by selector, store and API.
//! - Keep write-side validation next to the record shapes.
//!
//! # Invariants
//! - Every question is identified by a stable integer `QuestionId`.
//! - A question's `category` references an existing category; the store
//!   enforces this, the model does not.

pub mod category;
pub mod question;
