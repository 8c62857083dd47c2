use tracing::{debug, info};

use crate::error::AppError;
use crate::model::{Goal, GoalInput};
use crate::store::{self, StorePaths};

/// Ordered goals plus the running score.
///
/// `total_score` is the sum of every delta ever awarded, not the sum of the
/// goals' current points: an unachieved simple goal already holds its points.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ledger {
    goals: Vec<Goal>,
    total_score: i64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goal(&self, index: usize) -> Result<&Goal, AppError> {
        self.goals.get(index).ok_or(AppError::OutOfRange {
            position: index + 1,
            len: self.goals.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn total_score(&self) -> i64 {
        self.total_score
    }

    pub fn add_goal(&mut self, input: GoalInput) -> Result<&Goal, AppError> {
        let goal = input.build()?;
        debug!(kind = goal.kind().as_str(), name = goal.name(), "goal added");
        self.goals.push(goal);
        self.goals
            .last()
            .ok_or_else(|| AppError::NotFound("goal not found after insert".to_string()))
    }

    /// Records one achievement against the goal at `index` (0-based) and
    /// returns the points awarded. On error the ledger is unchanged.
    pub fn record_achievement(&mut self, index: usize) -> Result<i64, AppError> {
        let len = self.goals.len();
        let goal = self.goals.get_mut(index).ok_or(AppError::OutOfRange {
            position: index + 1,
            len,
        })?;
        let mut updated = goal.clone();
        let delta = updated.record_achievement()?;
        let total_score = self.total_score.checked_add(delta).ok_or_else(|| {
            AppError::Overflow(format!("total score cannot grow past {}", i64::MAX))
        })?;
        *goal = updated;
        self.total_score = total_score;
        debug!(
            name = goal.name(),
            delta,
            complete = goal.is_complete(),
            total_score = self.total_score,
            "achievement recorded"
        );
        Ok(delta)
    }

    pub fn save(&self, destination: &StorePaths) -> Result<(), AppError> {
        store::write_ledger(destination, &self.goals, self.total_score)?;
        info!(
            goals = %destination.goals.display(),
            score = %destination.score.display(),
            count = self.goals.len(),
            "ledger saved"
        );
        Ok(())
    }

    /// Replaces the ledger with the saved one. On any error the ledger is
    /// left exactly as it was.
    pub fn load(&mut self, source: &StorePaths) -> Result<(), AppError> {
        let (goals, total_score) = store::read_ledger(source)?;
        self.goals = goals;
        self.total_score = total_score;
        info!(
            goals = %source.goals.display(),
            count = self.goals.len(),
            total_score,
            "ledger loaded"
        );
        Ok(())
    }
}
