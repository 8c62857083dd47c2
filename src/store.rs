use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::error::AppError;
use crate::model::{Goal, GoalKind, GOAL_TAG};

pub const GOALS_FILE: &str = "goals.json";
pub const SCORE_FILE: &str = "score.txt";

/// Locations of the two artifacts a ledger is saved to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StorePaths {
    pub goals: PathBuf,
    pub score: PathBuf,
}

impl StorePaths {
    pub fn new(goals: impl Into<PathBuf>, score: impl Into<PathBuf>) -> Self {
        Self {
            goals: goals.into(),
            score: score.into(),
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(GOALS_FILE), dir.join(SCORE_FILE))
    }
}

pub fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn lock_path(paths: &StorePaths) -> PathBuf {
    paths.goals.with_extension("lock")
}

pub fn open_lock(paths: &StorePaths) -> Result<fd_lock::RwLock<File>, AppError> {
    let lock_path = lock_path(paths);
    ensure_parent_dir(&lock_path)?;
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(lock_path)?;
    Ok(fd_lock::RwLock::new(file))
}

/// Lock for readers. Creates nothing: returns `None` when there is no goal
/// document to read, and only creates the lock file beside an existing one.
pub fn open_read_lock(paths: &StorePaths) -> Result<Option<fd_lock::RwLock<File>>, AppError> {
    if !paths.goals.is_file() {
        return Ok(None);
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(lock_path(paths))?;
    Ok(Some(fd_lock::RwLock::new(file)))
}

pub fn encode_goals(goals: &[Goal]) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(goals)?)
}

/// Decodes a goal document. Nothing is returned unless every record decodes.
pub fn decode_goals(text: &str) -> Result<Vec<Goal>, AppError> {
    let records: Vec<Value> = serde_json::from_str(text)?;
    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| decode_record(idx + 1, record))
        .collect()
}

fn decode_record(position: usize, record: Value) -> Result<Goal, AppError> {
    let tag = record
        .get(GOAL_TAG)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AppError::InvalidInput(format!(
                "goal record {position} has no \"{GOAL_TAG}\" discriminator"
            ))
        })?;
    if !GoalKind::ALL.iter().any(|kind| kind.as_str() == tag) {
        return Err(AppError::UnknownGoalType(format!(
            "'{tag}' (goal record {position})"
        )));
    }
    let goal: Goal = serde_json::from_value(record)?;
    goal.validate()?;
    Ok(goal)
}

pub fn decode_score(text: &str) -> Result<i64, AppError> {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| AppError::InvalidInput(format!("score '{trimmed}' is not an integer")))
}

pub fn write_ledger(paths: &StorePaths, goals: &[Goal], score: i64) -> Result<(), AppError> {
    let document = encode_goals(goals)?;
    write_replace(&paths.goals, &document)?;
    write_replace(&paths.score, &score.to_string())?;
    Ok(())
}

/// Reads both artifacts. The goal document must exist; a missing score file
/// next to it reads as a score of 0.
pub fn read_ledger(paths: &StorePaths) -> Result<(Vec<Goal>, i64), AppError> {
    let document = read_artifact(&paths.goals)?;
    let goals = decode_goals(&document)?;
    let score = match read_artifact(&paths.score) {
        Ok(text) => decode_score(&text)?,
        Err(AppError::NotFound(path)) => {
            warn!(path = %path, "score file missing, starting score at 0");
            0
        }
        Err(err) => return Err(err),
    };
    Ok((goals, score))
}

fn read_artifact(path: &Path) -> Result<String, AppError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            Err(AppError::NotFound(path.display().to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

// Readers never observe a half-written artifact: write a sibling, then rename.
fn write_replace(path: &Path, contents: &str) -> Result<(), AppError> {
    ensure_parent_dir(path)?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GoalInput;
    use tempfile::TempDir;

    fn sample_goals() -> Vec<Goal> {
        let mut simple = GoalInput::simple("Run a marathon", 1000).build().expect("simple");
        simple.record_achievement().expect("record");
        let mut eternal = GoalInput::eternal("Journal").build().expect("eternal");
        eternal.record_achievement().expect("record");
        eternal.record_achievement().expect("record");
        let mut checklist = GoalInput::checklist("Temple", 3, 50, Some(500))
            .build()
            .expect("checklist");
        checklist.record_achievement().expect("record");
        let mut finished = GoalInput::checklist("Tithing", 2, 10, Some(100))
            .build()
            .expect("checklist");
        finished.record_achievement().expect("record");
        finished.record_achievement().expect("record");
        vec![simple, eternal, checklist, finished]
    }

    #[test]
    fn write_then_read_restores_everything() {
        let dir = TempDir::new().expect("temp dir");
        let paths = StorePaths::in_dir(&dir.path().join("nested"));
        let goals = sample_goals();

        write_ledger(&paths, &goals, 1250).expect("write");
        let (restored, score) = read_ledger(&paths).expect("read");
        assert_eq!(restored, goals);
        assert_eq!(score, 1250);
        assert_eq!(fs::read_to_string(&paths.score).expect("score"), "1250");
    }

    #[test]
    fn document_is_tagged_array() {
        let text = encode_goals(&sample_goals()).expect("encode");
        let value: Value = serde_json::from_str(&text).expect("json");
        let records = value.as_array().expect("array");
        assert_eq!(records.len(), 4);
        assert_eq!(records[0][GOAL_TAG], "simple");
        assert_eq!(records[0]["complete"], true);
        assert_eq!(records[1][GOAL_TAG], "eternal");
        assert_eq!(records[1]["points"], 200);
        assert_eq!(records[2][GOAL_TAG], "checklist");
        assert_eq!(records[2]["completed_count"], 1);
        assert_eq!(records[2]["total_count"], 3);
        assert_eq!(records[2]["points_per_check"], 50);
        assert_eq!(records[2]["bonus"], 500);
        assert_eq!(records[2]["complete"], false);
        assert_eq!(records[3]["completed_count"], 2);
        assert_eq!(records[3]["points"], 120);
        assert_eq!(records[3]["complete"], true);
    }

    #[test]
    fn unknown_discriminator_is_reported() {
        let text = r#"[
            {"type": "simple", "name": "Hike", "points": 50, "complete": false},
            {"type": "weekly", "name": "Call home", "points": 0, "complete": false}
        ]"#;
        match decode_goals(text).unwrap_err() {
            AppError::UnknownGoalType(message) => {
                assert!(message.contains("'weekly'"), "message: {message}");
                assert!(message.contains("goal record 2"), "message: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_discriminator_is_invalid_input() {
        let text = r#"[{"name": "Hike", "points": 50, "complete": false}]"#;
        assert!(matches!(
            decode_goals(text),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn missing_goal_document_is_not_found() {
        let dir = TempDir::new().expect("temp dir");
        let paths = StorePaths::in_dir(dir.path());
        match read_ledger(&paths).unwrap_err() {
            AppError::NotFound(message) => assert!(message.ends_with(GOALS_FILE)),
            other => panic!("unexpected error: {other}"),
        }

        fs::write(&paths.score, "70").expect("write score");
        assert!(matches!(read_ledger(&paths), Err(AppError::NotFound(_))));
    }

    #[test]
    fn missing_score_reads_as_zero() {
        let dir = TempDir::new().expect("temp dir");
        let paths = StorePaths::in_dir(dir.path());
        let goals = sample_goals();
        write_ledger(&paths, &goals, 1250).expect("write");
        fs::remove_file(&paths.score).expect("remove score");

        let (restored, score) = read_ledger(&paths).expect("read");
        assert_eq!(restored, goals);
        assert_eq!(score, 0);
    }

    #[test]
    fn score_tolerates_whitespace_but_not_text() {
        assert_eq!(decode_score(" 42\n").expect("score"), 42);
        assert!(matches!(
            decode_score("forty-two"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn write_leaves_no_temporary_files() {
        let dir = TempDir::new().expect("temp dir");
        let paths = StorePaths::in_dir(dir.path());
        write_ledger(&paths, &sample_goals(), 0).expect("write");
        write_ledger(&paths, &[], 0).expect("overwrite");

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec![GOALS_FILE.to_string(), SCORE_FILE.to_string()]);
        assert_eq!(fs::read_to_string(&paths.goals).expect("goals"), "[]");
    }

    #[test]
    fn lock_file_sits_next_to_goals() {
        let dir = TempDir::new().expect("temp dir");
        let paths = StorePaths::in_dir(dir.path());
        let mut lock = open_lock(&paths).expect("open lock");
        let _guard = lock.write().expect("lock");
        assert!(dir.path().join("goals.lock").exists());
    }

    #[test]
    fn read_lock_creates_nothing_without_goals() {
        let dir = TempDir::new().expect("temp dir");
        let paths = StorePaths::in_dir(&dir.path().join("missing"));
        assert!(open_read_lock(&paths).expect("open lock").is_none());
        assert!(!dir.path().join("missing").exists());

        let paths = StorePaths::in_dir(dir.path());
        write_ledger(&paths, &[], 0).expect("write");
        let lock = open_read_lock(&paths).expect("open lock").expect("lock");
        let _guard = lock.read().expect("lock");
        assert!(dir.path().join("goals.lock").exists());
    }
}
