//! OpenLearn: a local learning journal for developer-assistant tooling.
//!
//! **All state lives in one JSON document shared by every process that uses
//! the same storage directory.**
//!
//! # Architecture
//!
//! ## Storage
//!
//! - **Document** (`<dir>/openlearn.json`): topics, learnings, objectives,
//!   gate results and per-collection id counters
//! - **Lock** (`<dir>/openlearn.lock/`): directory-as-mutex across processes
//! - **Legacy** (`<dir>/openlearn.db`): SQLite file imported once if no
//!   document exists
//!
//! `<dir>` is `OPENLEARN_STORAGE_DIR` when set, otherwise
//! `<project-root>/.opencode/openlearn/`.
//!
//! ## The Thin Waist
//!
//! All mutations route through [`core::storage::Storage::with_write`]:
//! lock, reload from disk, mutate, write atomically, refresh cache, unlock.
//! Reads go through [`core::storage::Storage::snapshot`], which serves a copy
//! of the cached document until the file on disk changes.
//!
//! ## Subsystems (Plugins)
//!
//! - `topics`: case-insensitive encounter counts
//! - `learnings`: journal entries, optionally tagged with a topic
//! - `objectives`: active -> completed goals
//! - `gates`: quality-gate scores and pass rate
//! - `stats`: aggregate counts over the whole document
//!
//! # Examples
//!
//! ```bash
//! openlearn init
//! openlearn topic record React
//! openlearn learning save --task "Build todo app" --topic "React Hooks" --what-learned useState
//! openlearn learning search todo
//! openlearn gate record --task-name "Todo app" --gate-name ownership --score 85 --passed true
//! openlearn stats
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: storage engine, document model, validation
//! - [`plugins`]: domain API per collection

pub mod core;
pub mod plugins;

mod cli;
mod subsystems;

use crate::cli::{
    Cli, Command, GateCommand, LearningCommand, ObjectiveCommand, TopicCommand,
};
use crate::core::error::{self, OpenLearnError};
use crate::core::storage::Storage;
use crate::core::{time, validators};
use crate::plugins::gates::{self, NewGateResult};
use crate::plugins::learnings::{self, NewLearning};
use crate::plugins::{objectives, stats, topics};
use clap::Parser;
use colored::Colorize;
use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> Result<(), OpenLearnError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_storage(cli: &Cli) -> Result<Storage, OpenLearnError> {
    match &cli.dir {
        Some(dir) => Storage::open(dir),
        None => Storage::discover(),
    }
}

pub fn run() -> Result<(), error::OpenLearnError> {
    let cli = Cli::parse();
    // Resolving storage only computes paths; nothing is created until a command reads or writes.
    let storage = open_storage(&cli)?;

    match cli.command {
        Command::Init => {
            storage.initialize_schema()?;
            println!(
                "{} Storage ready at {}",
                "✓".bright_green(),
                storage.storage_path().display()
            );
        }
        Command::Path => println!("{}", storage.storage_path().display()),
        Command::Topic(topic_cli) => match topic_cli.command {
            TopicCommand::Record { name } => {
                topics::record_topic(&storage, &name)?;
                println!("{} Recorded topic {}", "✓".bright_green(), name.trim().to_lowercase().bold());
            }
            TopicCommand::List => print_json(&topics::get_topics(&storage)?)?,
            TopicCommand::Recent { days } => print_json(&topics::get_recent_topics(&storage, days)?)?,
        },
        Command::Learning(learning_cli) => match learning_cli.command {
            LearningCommand::Save {
                task,
                what_learned,
                timestamp,
                topic,
                mistakes,
            } => {
                let learning = NewLearning {
                    timestamp: timestamp.unwrap_or_else(time::now_iso),
                    task,
                    topic,
                    what_learned,
                    mistakes,
                };
                let id = learnings::save_learning(&storage, &learning)?;
                println!("{} Saved learning #{}", "✓".bright_green(), id);
            }
            LearningCommand::List { limit } => print_json(&learnings::get_learnings(&storage, limit)?)?,
            LearningCommand::Search { query } => {
                print_json(&learnings::search_learnings(&storage, &query)?)?
            }
            LearningCommand::ByTopic { topic } => {
                print_json(&learnings::get_learnings_by_topic(&storage, &topic)?)?
            }
            LearningCommand::Recent { days } => {
                print_json(&learnings::get_recent_learnings(&storage, days)?)?
            }
        },
        Command::Objective(objective_cli) => match objective_cli.command {
            ObjectiveCommand::Add { objective } => {
                let id = objectives::add_objective(&storage, &objective)?;
                println!("{} Added objective #{}", "✓".bright_green(), id);
            }
            ObjectiveCommand::List => print_json(&objectives::get_active_objectives(&storage)?)?,
            ObjectiveCommand::Complete { id } => {
                objectives::complete_objective(&storage, id)?;
                println!("{} Completed objective #{}", "✓".bright_green(), id);
            }
        },
        Command::Gate(gate_cli) => match gate_cli.command {
            GateCommand::Record {
                task_name,
                gate_name,
                score,
                passed,
                feedback,
            } => {
                let result = NewGateResult {
                    task_name,
                    gate_name,
                    score,
                    passed: validators::validate_boolean(&passed, "Passed")?,
                    feedback,
                };
                let id = gates::record_gate_result(&storage, &result)?;
                let verdict = if result.passed {
                    "passed".bright_green()
                } else {
                    "failed".bright_red()
                };
                println!(
                    "{} Recorded gate {} #{} ({}/100, {})",
                    "✓".bright_green(),
                    result.gate_name,
                    id,
                    result.score,
                    verdict
                );
            }
            GateCommand::Stats => print_json(&gates::get_gate_stats(&storage)?)?,
        },
        Command::Stats => print_json(&stats::get_learning_stats(&storage)?)?,
        Command::Schema { subsystem } => print_json(&subsystems::schemas(subsystem.as_deref()))?,
    }

    Ok(())
}
