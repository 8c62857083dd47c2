use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "questlog",
    version,
    about = "Track simple, eternal and checklist goals and the points they earn"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Directory holding goals.json and score.txt"
    )]
    pub data_dir: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH", help = "Goal document path")]
    pub goals: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH", help = "Score file path")]
    pub score: Option<PathBuf>,
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Verbosity level (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Menu(MenuArgs),
    #[command(subcommand)]
    Goal(GoalCommand),
    Score(ScoreArgs),
}

#[derive(Subcommand, Debug)]
pub enum GoalCommand {
    Add(GoalAdd),
    List(GoalList),
    Show(GoalShow),
    Record(GoalRecord),
}

#[derive(Args, Debug, Default)]
pub struct MenuArgs {
    #[arg(long, help = "Start with an empty ledger instead of loading saved goals")]
    pub fresh: bool,
}

#[derive(Args, Debug)]
pub struct GoalAdd {
    #[arg(value_enum)]
    pub kind: GoalKindArg,
    pub name: String,
    #[arg(long, help = "Points awarded on completion (simple goals)")]
    pub points: Option<i64>,
    #[arg(long, help = "Completions required (checklist goals)")]
    pub total: Option<i64>,
    #[arg(long, help = "Points per completion (checklist goals)")]
    pub per_check: Option<i64>,
    #[arg(long, help = "Bonus on the final completion (checklist goals, default 500)")]
    pub bonus: Option<i64>,
}

#[derive(Args, Debug)]
pub struct GoalList {}

#[derive(Args, Debug)]
pub struct GoalShow {
    pub position: usize,
}

#[derive(Args, Debug)]
pub struct GoalRecord {
    pub position: usize,
}

#[derive(Args, Debug)]
pub struct ScoreArgs {}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum GoalKindArg {
    Simple,
    Eternal,
    Checklist,
}
