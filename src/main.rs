mod cli;
mod error;
mod ledger;
mod menu;
mod model;
mod store;
mod util;

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::{
    Cli, Command, GoalAdd, GoalCommand, GoalKindArg, GoalRecord, GoalShow, MenuArgs,
};
use crate::error::AppError;
use crate::ledger::Ledger;
use crate::menu::Menu;
use crate::model::{GoalInput, GoalKind};
use crate::store::StorePaths;
use crate::util::{format_goal_detail, format_goal_table};

const DATA_DIR_FLAG: &str = "--data-dir";
const QUESTLOG_HOME_ENV: &str = "QUESTLOG_HOME";
const DEFAULT_DATA_DIR: &str = ".questlog";

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let Cli {
        data_dir,
        goals,
        score,
        verbose,
        command,
    } = Cli::parse();
    init_tracing(verbose);

    let data_dir = resolve_data_dir(data_dir)?;
    let defaults = StorePaths::in_dir(&data_dir);
    let paths = StorePaths::new(
        goals.unwrap_or(defaults.goals),
        score.unwrap_or(defaults.score),
    );

    match command.unwrap_or(Command::Menu(MenuArgs::default())) {
        Command::Menu(args) => handle_menu(paths, args),
        Command::Goal(command @ (GoalCommand::Add(_) | GoalCommand::Record(_))) => {
            let mut lock = store::open_lock(&paths)?;
            let _guard = lock.write()?;
            let mut ledger = load_or_empty(&paths)?;
            handle_goal(&mut ledger, &paths, command)
        }
        command => {
            // Read-only commands must not create the data directory.
            let lock = store::open_read_lock(&paths)?;
            let _guard = lock.as_ref().map(|lock| lock.read()).transpose()?;
            let mut ledger = load_or_empty(&paths)?;
            match command {
                Command::Goal(command) => handle_goal(&mut ledger, &paths, command),
                Command::Score(_) => {
                    println!("Total Score: {}", ledger.total_score());
                    Ok(())
                }
                Command::Menu(_) => Ok(()),
            }
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(dir) = flag {
        if dir.as_os_str().is_empty() {
            return Err(AppError::InvalidInput(format!("{DATA_DIR_FLAG} is empty")));
        }
        return Ok(dir);
    }

    if let Ok(dir) = std::env::var(QUESTLOG_HOME_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home).join(DEFAULT_DATA_DIR));
    }

    Err(AppError::InvalidInput(format!(
        "unable to resolve data directory; set {QUESTLOG_HOME_ENV} or pass {DATA_DIR_FLAG}"
    )))
}

fn load_or_empty(paths: &StorePaths) -> Result<Ledger, AppError> {
    let mut ledger = Ledger::new();
    match ledger.load(paths) {
        Ok(()) => Ok(ledger),
        Err(AppError::NotFound(path)) => {
            warn!(%path, "no saved ledger; starting empty");
            Ok(ledger)
        }
        Err(err) => Err(err),
    }
}

fn handle_menu(paths: StorePaths, args: MenuArgs) -> Result<(), AppError> {
    let mut ledger = if args.fresh {
        Ledger::new()
    } else {
        let lock = store::open_read_lock(&paths)?;
        let _guard = lock.as_ref().map(|lock| lock.read()).transpose()?;
        match load_or_empty(&paths) {
            Ok(ledger) => ledger,
            Err(err) => {
                eprintln!("Error: {err}");
                Ledger::new()
            }
        }
    };

    let stdin = io::stdin();
    Menu::new(&mut ledger, stdin.lock(), io::stdout(), paths).run()
}

fn handle_goal(
    ledger: &mut Ledger,
    paths: &StorePaths,
    command: GoalCommand,
) -> Result<(), AppError> {
    match command {
        GoalCommand::Add(args) => handle_goal_add(ledger, paths, args),
        GoalCommand::List(_) => {
            if ledger.is_empty() {
                println!("No goals found.");
            } else {
                println!("{}", format_goal_table(ledger.goals()));
            }
            Ok(())
        }
        GoalCommand::Show(args) => handle_goal_show(ledger, args),
        GoalCommand::Record(args) => handle_goal_record(ledger, paths, args),
    }
}

fn handle_goal_add(ledger: &mut Ledger, paths: &StorePaths, args: GoalAdd) -> Result<(), AppError> {
    let status = ledger
        .add_goal(GoalInput {
            kind: goal_kind_from_arg(args.kind),
            name: args.name,
            points: args.points,
            total_count: args.total,
            points_per_check: args.per_check,
            bonus: args.bonus,
        })?
        .status();
    ledger.save(paths)?;
    println!("Created goal #{}: {}", ledger.len(), status);
    Ok(())
}

fn handle_goal_show(ledger: &Ledger, args: GoalShow) -> Result<(), AppError> {
    let index = require_position(args.position)?;
    let goal = ledger.goal(index)?;
    println!("{}", format_goal_detail(args.position, goal));
    Ok(())
}

fn handle_goal_record(
    ledger: &mut Ledger,
    paths: &StorePaths,
    args: GoalRecord,
) -> Result<(), AppError> {
    let index = require_position(args.position)?;
    let delta = ledger.record_achievement(index)?;
    ledger.save(paths)?;
    println!("You earned {delta} points!");
    println!("Total Score: {}", ledger.total_score());
    Ok(())
}

fn require_position(position: usize) -> Result<usize, AppError> {
    if position == 0 {
        return Err(AppError::InvalidInput("position starts at 1".to_string()));
    }
    Ok(position - 1)
}

fn goal_kind_from_arg(arg: GoalKindArg) -> GoalKind {
    match arg {
        GoalKindArg::Simple => GoalKind::Simple,
        GoalKindArg::Eternal => GoalKind::Eternal,
        GoalKindArg::Checklist => GoalKind::Checklist,
    }
}
