use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Key of the variant discriminator in a persisted goal record.
pub const GOAL_TAG: &str = "type";
pub const ETERNAL_INCREMENT: i64 = 100;
pub const DEFAULT_CHECKLIST_BONUS: i64 = 500;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GoalKind {
    Simple,
    Eternal,
    Checklist,
}

impl GoalKind {
    pub const ALL: [GoalKind; 3] = [Self::Simple, Self::Eternal, Self::Checklist];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Eternal => "eternal",
            Self::Checklist => "checklist",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
    }
}

/// A trackable objective. The serde tag doubles as the persisted
/// discriminator, so it must stay in sync with `GoalKind::as_str`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Goal {
    Simple(SimpleGoal),
    Eternal(EternalGoal),
    Checklist(ChecklistGoal),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SimpleGoal {
    name: String,
    points: i64,
    complete: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EternalGoal {
    name: String,
    points: i64,
    #[serde(default)]
    complete: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChecklistGoal {
    name: String,
    points: i64,
    complete: bool,
    total_count: u32,
    completed_count: u32,
    points_per_check: i64,
    bonus: i64,
}

impl SimpleGoal {
    pub fn new(name: impl Into<String>, points: i64) -> Self {
        Self {
            name: name.into(),
            points,
            complete: false,
        }
    }

    // Points are fixed at creation; the first achievement awards them once.
    fn record_achievement(&mut self) -> Result<i64, AppError> {
        if self.complete {
            return Ok(0);
        }
        self.complete = true;
        Ok(self.points)
    }
}

impl EternalGoal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: 0,
            complete: false,
        }
    }

    fn record_achievement(&mut self) -> Result<i64, AppError> {
        self.points = checked_points(&self.name, self.points, ETERNAL_INCREMENT)?;
        Ok(ETERNAL_INCREMENT)
    }
}

impl ChecklistGoal {
    pub fn new(name: impl Into<String>, total_count: u32, points_per_check: i64, bonus: i64) -> Self {
        Self {
            name: name.into(),
            points: 0,
            complete: false,
            total_count,
            completed_count: 0,
            points_per_check,
            bonus,
        }
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn completed_count(&self) -> u32 {
        self.completed_count
    }

    pub fn points_per_check(&self) -> i64 {
        self.points_per_check
    }

    pub fn bonus(&self) -> i64 {
        self.bonus
    }

    // All arithmetic is checked before any field changes.
    fn record_achievement(&mut self) -> Result<i64, AppError> {
        if self.complete {
            return Ok(0);
        }
        let completed_count = self.completed_count + 1;
        let finished = completed_count == self.total_count;
        let delta = if finished {
            checked_points(&self.name, self.points_per_check, self.bonus)?
        } else {
            self.points_per_check
        };
        self.points = checked_points(&self.name, self.points, delta)?;
        self.completed_count = completed_count;
        self.complete = finished;
        Ok(delta)
    }
}

impl Goal {
    pub fn kind(&self) -> GoalKind {
        match self {
            Self::Simple(_) => GoalKind::Simple,
            Self::Eternal(_) => GoalKind::Eternal,
            Self::Checklist(_) => GoalKind::Checklist,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Simple(goal) => &goal.name,
            Self::Eternal(goal) => &goal.name,
            Self::Checklist(goal) => &goal.name,
        }
    }

    pub fn points(&self) -> i64 {
        match self {
            Self::Simple(goal) => goal.points,
            Self::Eternal(goal) => goal.points,
            Self::Checklist(goal) => goal.points,
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            Self::Simple(goal) => goal.complete,
            Self::Eternal(_) => false,
            Self::Checklist(goal) => goal.complete,
        }
    }

    /// Applies one achievement and returns the points it awarded.
    /// Completed goals are left untouched and award nothing. A goal whose
    /// points would overflow is left untouched and reports `Overflow`.
    pub fn record_achievement(&mut self) -> Result<i64, AppError> {
        match self {
            Self::Simple(goal) => goal.record_achievement(),
            Self::Eternal(goal) => goal.record_achievement(),
            Self::Checklist(goal) => goal.record_achievement(),
        }
    }

    pub fn status(&self) -> String {
        match self {
            Self::Simple(goal) => format!("{} {}", checkbox(goal.complete), goal.name),
            Self::Eternal(goal) => format!("[∞] {} (Points Earned: {})", goal.name, goal.points),
            Self::Checklist(goal) => format!(
                "{} {} (Completed {}/{})",
                checkbox(goal.complete),
                goal.name,
                goal.completed_count,
                goal.total_count
            ),
        }
    }

    /// Checks the invariants of a goal restored from storage.
    pub fn validate(&self) -> Result<(), AppError> {
        let label = format!("{} goal '{}'", self.kind().as_str(), self.name());
        ensure_non_empty("goal name", self.name())?;
        ensure_non_negative(&format!("{label} points"), self.points())?;
        match self {
            Self::Simple(_) => {}
            Self::Eternal(goal) => {
                if goal.complete {
                    return Err(AppError::InvalidInput(format!(
                        "{label} cannot be complete"
                    )));
                }
            }
            Self::Checklist(goal) => {
                if goal.total_count == 0 {
                    return Err(AppError::InvalidInput(format!(
                        "{label} total count must be greater than 0"
                    )));
                }
                if goal.completed_count > goal.total_count {
                    return Err(AppError::InvalidInput(format!(
                        "{label} completed count {} exceeds total count {}",
                        goal.completed_count, goal.total_count
                    )));
                }
                if goal.complete != (goal.completed_count == goal.total_count) {
                    return Err(AppError::InvalidInput(format!(
                        "{label} completion flag does not match {}/{}",
                        goal.completed_count, goal.total_count
                    )));
                }
                ensure_non_negative(&format!("{label} points per check"), goal.points_per_check)?;
                ensure_non_negative(&format!("{label} bonus"), goal.bonus)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct GoalInput {
    pub kind: GoalKind,
    pub name: String,
    pub points: Option<i64>,
    pub total_count: Option<i64>,
    pub points_per_check: Option<i64>,
    pub bonus: Option<i64>,
}

impl GoalInput {
    pub fn simple(name: impl Into<String>, points: i64) -> Self {
        Self {
            points: Some(points),
            ..Self::bare(GoalKind::Simple, name)
        }
    }

    pub fn eternal(name: impl Into<String>) -> Self {
        Self::bare(GoalKind::Eternal, name)
    }

    pub fn checklist(
        name: impl Into<String>,
        total_count: i64,
        points_per_check: i64,
        bonus: Option<i64>,
    ) -> Self {
        Self {
            total_count: Some(total_count),
            points_per_check: Some(points_per_check),
            bonus,
            ..Self::bare(GoalKind::Checklist, name)
        }
    }

    fn bare(kind: GoalKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            points: None,
            total_count: None,
            points_per_check: None,
            bonus: None,
        }
    }

    /// Builds an input from free-form text, as typed at a prompt.
    /// `params` are positional: `[points]` for simple goals and
    /// `[total, per_check, bonus]` for checklists; a blank bonus keeps the default.
    pub fn from_raw(kind: &str, name: &str, params: &[&str]) -> Result<Self, AppError> {
        let kind = GoalKind::parse(kind).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "goal type '{}' is invalid (expected simple, eternal or checklist)",
                kind.trim()
            ))
        })?;
        let param = |idx: usize, label: &str| parse_amount(label, params.get(idx).copied());
        let input = match kind {
            GoalKind::Simple => {
                let points = param(0, "points")?.ok_or_else(|| missing(kind, "points"))?;
                Self::simple(name, points)
            }
            GoalKind::Eternal => Self::eternal(name),
            GoalKind::Checklist => {
                let total = param(0, "total count")?.ok_or_else(|| missing(kind, "total count"))?;
                let per_check = param(1, "points per check")?
                    .ok_or_else(|| missing(kind, "points per check"))?;
                Self::checklist(name, total, per_check, param(2, "bonus")?)
            }
        };
        Ok(input)
    }

    pub fn build(self) -> Result<Goal, AppError> {
        let name = self.name.trim();
        ensure_non_empty("goal name", name)?;
        let goal = match self.kind {
            GoalKind::Simple => {
                let points = self.points.ok_or_else(|| missing(self.kind, "points"))?;
                ensure_non_negative("points", points)?;
                Goal::Simple(SimpleGoal::new(name, points))
            }
            GoalKind::Eternal => Goal::Eternal(EternalGoal::new(name)),
            GoalKind::Checklist => {
                let total = self
                    .total_count
                    .ok_or_else(|| missing(self.kind, "total count"))?;
                if total <= 0 {
                    return Err(AppError::InvalidInput(
                        "checklist total count must be greater than 0".to_string(),
                    ));
                }
                let total = u32::try_from(total).map_err(|_| {
                    AppError::InvalidInput(format!("checklist total count {total} is too large"))
                })?;
                let per_check = self
                    .points_per_check
                    .ok_or_else(|| missing(self.kind, "points per check"))?;
                ensure_non_negative("points per check", per_check)?;
                let bonus = self.bonus.unwrap_or(DEFAULT_CHECKLIST_BONUS);
                ensure_non_negative("bonus", bonus)?;
                Goal::Checklist(ChecklistGoal::new(name, total, per_check, bonus))
            }
        };
        Ok(goal)
    }
}

fn checkbox(complete: bool) -> &'static str {
    if complete {
        "[X]"
    } else {
        "[ ]"
    }
}

fn checked_points(name: &str, points: i64, delta: i64) -> Result<i64, AppError> {
    points.checked_add(delta).ok_or_else(|| {
        AppError::Overflow(format!("points of goal '{name}' cannot grow past {}", i64::MAX))
    })
}

fn missing(kind: GoalKind, label: &str) -> AppError {
    AppError::InvalidInput(format!("{} goal requires {label}", kind.as_str()))
}

fn parse_amount(label: &str, value: Option<&str>) -> Result<Option<i64>, AppError> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::InvalidInput(format!("{label} '{value}' is not a number")))
}

fn ensure_non_empty(label: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{label} cannot be empty")));
    }
    Ok(())
}

fn ensure_non_negative(label: &str, value: i64) -> Result<(), AppError> {
    if value < 0 {
        return Err(AppError::InvalidInput(format!(
            "{label} cannot be negative (got {value})"
        )));
    }
    Ok(())
}
