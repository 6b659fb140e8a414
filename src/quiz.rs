use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::db::Question;

/// Which questions are eligible for a quiz. Category id `0` is reserved for "all".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(i64),
}

impl From<i64> for CategoryFilter {
    fn from(id: i64) -> Self {
        match id {
            0 => CategoryFilter::All,
            id => CategoryFilter::Only(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizOutcome<'a> {
    Selected(&'a Question),
    Exhausted,
}

/// Draws one question from `pool` whose id is not in `served`, uniformly over
/// the unserved ones.
pub fn select_next<'a, R>(pool: &'a [Question], served: &HashSet<i64>, rng: &mut R) -> QuizOutcome<'a>
where
    R: Rng + ?Sized,
{
    let remaining: Vec<&Question> = pool.iter().filter(|q| !served.contains(&q.id)).collect();
    match remaining.choose(rng) {
        Some(&question) => QuizOutcome::Selected(question),
        None => QuizOutcome::Exhausted,
    }
}
