//! Record store contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the read/write contracts the service layer depends on.
//! - Isolate SQL details from selection and use-case orchestration.
//!
//! # Invariants
//! - Repositories borrow an explicit connection handle; there is no global
//!   session.
//! - Write paths validate input before SQL mutations.
//! - Repository APIs return semantic errors (`QuestionNotFound`,
//!   `Constraint`) in addition to DB transport errors.

pub mod category_repo;
pub mod question_repo;
