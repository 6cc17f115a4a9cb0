//! CLI struct definitions for the OpenLearn command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use crate::plugins::learnings::{DEFAULT_LIST_LIMIT, DEFAULT_RECENT_DAYS};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "openlearn",
    version = env!("CARGO_PKG_VERSION"),
    about = "Local learning journal: topics, learnings, objectives and quality-gate scores."
)]
pub(crate) struct Cli {
    /// Storage directory (overrides OPENLEARN_STORAGE_DIR and project discovery).
    #[clap(long, global = true)]
    pub dir: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Create the storage document if needed and stamp its schema version
    Init,
    /// Print the path of the storage document
    Path,
    /// Record and list topics
    Topic(TopicCli),
    /// Save and query learnings
    Learning(LearningCli),
    /// Manage learning objectives
    Objective(ObjectiveCli),
    /// Record and summarize quality-gate results
    Gate(GateCli),
    /// Show aggregate learning statistics
    Stats,
    /// Print subsystem command schemas as JSON
    Schema {
        /// Optional: filter by subsystem name
        #[clap(long)]
        subsystem: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
pub(crate) struct TopicCli {
    #[clap(subcommand)]
    pub command: TopicCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum TopicCommand {
    /// Count an encounter of a topic
    Record { name: String },
    /// List topics by count, then recency
    List,
    /// Topics seen within the last N days
    Recent {
        #[clap(long, default_value_t = DEFAULT_RECENT_DAYS, allow_negative_numbers = true)]
        days: i64,
    },
}

#[derive(clap::Args, Debug)]
pub(crate) struct LearningCli {
    #[clap(subcommand)]
    pub command: LearningCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum LearningCommand {
    /// Save a learning
    Save {
        #[clap(long)]
        task: String,
        #[clap(long)]
        what_learned: String,
        /// ISO-8601 timestamp (defaults to now)
        #[clap(long)]
        timestamp: Option<String>,
        #[clap(long)]
        topic: Option<String>,
        #[clap(long)]
        mistakes: Option<String>,
    },
    /// Newest learnings first
    List {
        #[clap(long, default_value_t = DEFAULT_LIST_LIMIT, allow_negative_numbers = true)]
        limit: i64,
    },
    /// Case-insensitive search over topic, task and content
    Search { query: String },
    /// Learnings tagged with a topic
    ByTopic { topic: String },
    /// Learnings within the last N days
    Recent {
        #[clap(long, default_value_t = DEFAULT_RECENT_DAYS, allow_negative_numbers = true)]
        days: i64,
    },
}

#[derive(clap::Args, Debug)]
pub(crate) struct ObjectiveCli {
    #[clap(subcommand)]
    pub command: ObjectiveCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ObjectiveCommand {
    /// Add an active objective
    Add { objective: String },
    /// List active objectives
    List,
    /// Mark an objective completed
    Complete {
        #[clap(allow_negative_numbers = true)]
        id: i64,
    },
}

#[derive(clap::Args, Debug)]
pub(crate) struct GateCli {
    #[clap(subcommand)]
    pub command: GateCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum GateCommand {
    /// Record a gate score
    Record {
        #[clap(long)]
        task_name: String,
        #[clap(long)]
        gate_name: String,
        /// Integer score, 0-100
        #[clap(long, allow_negative_numbers = true)]
        score: i64,
        /// 'true' or 'false'
        #[clap(long)]
        passed: String,
        #[clap(long)]
        feedback: Option<String>,
    },
    /// Totals, pass count and average score
    Stats,
}
