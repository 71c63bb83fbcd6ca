//! Pure selection logic over an ordered question snapshot.
//!
//! # Responsibility
//! - Slice stable pages out of an id-ordered question list.
//! - Filter by case-insensitive substring and by category.
//! - Pick the next quiz question under an exclusion set.
//!
//! # Invariants
//! - Output preserves input order.
//! - Empty results mean "nothing matched", never an error; callers decide
//!   whether that maps to not-found.
//! - Randomness comes only from the caller-provided generator.

use crate::model::category::CategoryId;
use crate::model::question::{Question, QuestionId};
use rand::seq::SliceRandom;
use rand::Rng;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Questions per page used by list endpoints.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Returns page `page_number` (1-based) of `all_questions`.
///
/// `all_questions` must already be ordered by id ascending. Page `0`,
/// `page_size == 0` and pages past the end all yield an empty slice.
pub fn list_page(all_questions: &[Question], page_number: u32, page_size: usize) -> &[Question] {
    if page_number == 0 || page_size == 0 {
        return &[];
    }

    let offset = (page_number as usize - 1).saturating_mul(page_size);
    if offset >= all_questions.len() {
        return &[];
    }

    let end = offset.saturating_add(page_size).min(all_questions.len());
    &all_questions[offset..end]
}

/// Number of pages needed to show `total` items, `ceil(total / page_size)`.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Case-insensitive substring search against question text.
///
/// An empty `term` matches every question.
pub fn search<'a>(all_questions: &'a [Question], term: &str) -> Vec<&'a Question> {
    match literal_matcher(term) {
        Some(matcher) => all_questions
            .iter()
            .filter(|question| matcher.is_match(&question.text))
            .collect(),
        None => {
            let needle = term.to_lowercase();
            all_questions
                .iter()
                .filter(|question| question.text.to_lowercase().contains(&needle))
                .collect()
        }
    }
}

/// Questions whose `category` equals `category_id`.
///
/// Does not check whether the category exists.
pub fn by_category(all_questions: &[Question], category_id: CategoryId) -> Vec<&Question> {
    all_questions
        .iter()
        .filter(|question| question.category == category_id)
        .collect()
}

/// Picks one unseen question uniformly at random.
///
/// Filters to `category_id` when provided, then drops any id present in
/// `previous_question_ids`. Returns `None` once the quiz is exhausted.
pub fn next_quiz_question<'a, R>(
    all_questions: &'a [Question],
    previous_question_ids: &[QuestionId],
    category_id: Option<CategoryId>,
    rng: &mut R,
) -> Option<&'a Question>
where
    R: Rng + ?Sized,
{
    let seen = previous_question_ids.iter().copied().collect::<HashSet<_>>();
    let candidates = all_questions
        .iter()
        .filter(|question| category_id.map_or(true, |id| question.category == id))
        .filter(|question| !seen.contains(&question.id))
        .collect::<Vec<_>>();

    candidates.choose(rng).copied()
}

fn literal_matcher(term: &str) -> Option<Regex> {
    // Falls back to lowercase `contains` if the escaped literal exceeds
    // regex size limits.
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .ok()
}
