//! Question selection entry points.
//!
//! # Responsibility
//! - Paginate, filter and randomly pick questions from a store snapshot.
//!
//! # Invariants
//! - Selection is total: no operation fails or panics on empty input.
//! - Inputs are borrowed and never mutated.

pub mod question_selector;
