use std::{
    cmp::Ordering,
    iter,
    ops::{Add, AddAssign, Sub},
};

use serde::Serialize;

/// Lexicographic (hard, soft) cost, lower is better. Any positive hard
/// score means a hard constraint is violated.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Score {
    pub hard_score: f64,
    pub soft_score: f64,
}

impl Score {
    pub const ZERO: Score = Score {
        hard_score: 0.0,
        soft_score: 0.0,
    };

    pub fn new(hard_score: f64, soft_score: f64) -> Self {
        Score {
            hard_score,
            soft_score,
        }
    }

    pub fn hard(hard_score: f64) -> Self {
        Score {
            hard_score,
            soft_score: 0.0,
        }
    }

    pub fn soft(soft_score: f64) -> Self {
        Score {
            hard_score: 0.0,
            soft_score,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.hard_score > 0.0
    }
}

impl Eq for Score {}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hard_score
            .total_cmp(&other.hard_score)
            .then_with(|| self.soft_score.total_cmp(&other.soft_score))
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl iter::Sum for Score {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Score::ZERO, |acc, score| acc + score)
    }
}

impl Add<Score> for Score {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Score {
            hard_score: self.hard_score + other.hard_score,
            soft_score: self.soft_score + other.soft_score,
        }
    }
}

impl AddAssign<Score> for Score {
    fn add_assign(&mut self, other: Score) {
        self.hard_score += other.hard_score;
        self.soft_score += other.soft_score;
    }
}

impl Sub<Score> for Score {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Score {
            hard_score: self.hard_score - other.hard_score,
            soft_score: self.soft_score - other.soft_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_sum() {
        let scores = vec![Score::hard(10.0), Score::soft(5.0), Score::hard(-3.0)];
        let total: Score = scores.into_iter().sum();
        assert_eq!(total.hard_score, 7.0);
        assert_eq!(total.soft_score, 5.0);
    }

    #[test]
    fn test_hard_dominates_soft() {
        assert!(Score::hard(1.0) > Score::soft(1e12));
        assert!(Score::new(2.0, 2.0) < Score::hard(10.0));
        assert!(Score::soft(3.0) < Score::soft(4.0));
        assert_eq!(Score::soft(1.0) - Score::soft(1.0), Score::ZERO);
        assert!(Score::hard(0.5).is_failure());
        assert!(!Score::soft(1e9).is_failure());
    }
}
