use std::io::{BufRead, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AppError;
use crate::ledger::Ledger;
use crate::model::{GoalInput, GoalKind};
use crate::store::{self, StorePaths};
use crate::util::format_goal_list;

const MENU_OPTIONS: &str = "1. Add Goal\n2. Record Achievement\n3. Save Goals\n4. Load Goals\n5. Exit";

enum Flow {
    Continue,
    Exit,
}

/// Interactive loop over a caller-owned ledger. Errors from an option are
/// reported and the loop carries on; end of input exits.
pub struct Menu<'a, R, W> {
    ledger: &'a mut Ledger,
    input: R,
    output: W,
    paths: StorePaths,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(ledger: &'a mut Ledger, input: R, output: W, paths: StorePaths) -> Self {
        Self {
            ledger,
            input,
            output,
            paths,
        }
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        loop {
            self.show_board()?;
            let choice = match self.prompt("Choose an option: ") {
                Ok(Some(choice)) => choice,
                Ok(None) => {
                    writeln!(self.output)?;
                    return Ok(());
                }
                Err(err @ AppError::InvalidInput(_)) => {
                    writeln!(self.output, "Error: {err}")?;
                    writeln!(self.output)?;
                    continue;
                }
                Err(err) => return Err(err),
            };
            let result = match choice.as_str() {
                "1" => self.add_goal(),
                "2" => self.record_achievement(),
                "3" => self.save(),
                "4" => self.load(),
                "5" => return Ok(()),
                _ => {
                    writeln!(self.output, "Invalid option.")?;
                    Ok(Flow::Continue)
                }
            };
            match result {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => {
                    writeln!(self.output)?;
                    return Ok(());
                }
                Err(err) => {
                    debug!(error = %err, "menu option failed");
                    writeln!(self.output, "Error: {err}")?;
                }
            }
            writeln!(self.output)?;
        }
    }

    fn show_board(&mut self) -> Result<(), AppError> {
        writeln!(self.output, "=== Eternal Quest Goals Tracker ===")?;
        writeln!(self.output, "Total Score: {}", self.ledger.total_score())?;
        writeln!(self.output)?;
        if self.ledger.is_empty() {
            writeln!(self.output, "No goals yet.")?;
        } else {
            writeln!(self.output, "{}", format_goal_list(self.ledger.goals()))?;
        }
        writeln!(self.output)?;
        writeln!(self.output, "{MENU_OPTIONS}")?;
        Ok(())
    }

    fn add_goal(&mut self) -> Result<Flow, AppError> {
        let Some(kind) = self.prompt("Enter goal type (simple/eternal/checklist): ")? else {
            return Ok(Flow::Exit);
        };
        let Some(parsed) = GoalKind::parse(&kind) else {
            return Err(AppError::InvalidInput(format!(
                "goal type '{kind}' is invalid (expected simple, eternal or checklist)"
            )));
        };
        let Some(name) = self.prompt("Enter goal name: ")? else {
            return Ok(Flow::Exit);
        };

        let labels: &[&str] = match parsed {
            GoalKind::Simple => &["Enter points for completion: "],
            GoalKind::Eternal => &[],
            GoalKind::Checklist => &[
                "Enter total number of completions required: ",
                "Enter points per completion: ",
                "Enter bonus points (blank for 500): ",
            ],
        };
        let mut params = Vec::with_capacity(labels.len());
        for label in labels {
            let Some(value) = self.prompt(label)? else {
                return Ok(Flow::Exit);
            };
            params.push(value);
        }
        let params: Vec<&str> = params.iter().map(String::as_str).collect();

        let input = GoalInput::from_raw(&kind, &name, &params)?;
        let status = self.ledger.add_goal(input)?.status();
        writeln!(self.output, "Added goal #{}: {}", self.ledger.len(), status)?;
        Ok(Flow::Continue)
    }

    fn record_achievement(&mut self) -> Result<Flow, AppError> {
        if self.ledger.is_empty() {
            writeln!(self.output, "No goals yet.")?;
            return Ok(Flow::Continue);
        }
        writeln!(self.output, "Select a goal to record an achievement:")?;
        writeln!(self.output, "{}", format_goal_list(self.ledger.goals()))?;
        let Some(selection) = self.prompt("Goal number: ")? else {
            return Ok(Flow::Exit);
        };
        let position = parse_position(&selection)?;
        let delta = self.ledger.record_achievement(position - 1)?;
        writeln!(self.output, "You earned {delta} points!")?;
        Ok(Flow::Continue)
    }

    fn save(&mut self) -> Result<Flow, AppError> {
        let Some(paths) = self.prompt_paths()? else {
            return Ok(Flow::Exit);
        };
        let mut lock = store::open_lock(&paths)?;
        let _guard = lock.write()?;
        self.ledger.save(&paths)?;
        writeln!(self.output, "Goals and score saved successfully.")?;
        self.paths = paths;
        Ok(Flow::Continue)
    }

    fn load(&mut self) -> Result<Flow, AppError> {
        let Some(paths) = self.prompt_paths()? else {
            return Ok(Flow::Exit);
        };
        let lock = store::open_read_lock(&paths)?;
        let _guard = lock.as_ref().map(|lock| lock.read()).transpose()?;
        self.ledger.load(&paths)?;
        writeln!(
            self.output,
            "Loaded {} goals (total score {}).",
            self.ledger.len(),
            self.ledger.total_score()
        )?;
        self.paths = paths;
        Ok(Flow::Continue)
    }

    fn prompt_paths(&mut self) -> Result<Option<StorePaths>, AppError> {
        let goals_label = format!("Goals file [{}]: ", self.paths.goals.display());
        let Some(goals) = self.prompt(&goals_label)? else {
            return Ok(None);
        };
        let score_label = format!("Score file [{}]: ", self.paths.score.display());
        let Some(score) = self.prompt(&score_label)? else {
            return Ok(None);
        };
        Ok(Some(StorePaths::new(
            or_default(&goals, &self.paths.goals),
            or_default(&score, &self.paths.score),
        )))
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>, AppError> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(line.trim().to_string())),
            Err(err) if err.kind() == ErrorKind::InvalidData => Err(AppError::InvalidInput(
                "input is not valid UTF-8".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }
}

pub fn parse_position(value: &str) -> Result<usize, AppError> {
    let position = value
        .trim()
        .parse::<usize>()
        .map_err(|_| AppError::InvalidInput(format!("selection '{}' is not a number", value.trim())))?;
    if position == 0 {
        return Err(AppError::InvalidInput("position starts at 1".to_string()));
    }
    Ok(position)
}

fn or_default(value: &str, default: &Path) -> PathBuf {
    if value.is_empty() {
        default.to_path_buf()
    } else {
        PathBuf::from(value)
    }
}
