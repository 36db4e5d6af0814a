use std::{io, path::PathBuf};

use clap::{Parser, Subcommand};
use colored::*;

use crate::{
    clock::SystemClock,
    config::Config,
    models::{habit::DEFAULT_TARGET_DAYS, task::Priority},
    services::{habits::AddHabitParameters, tasks::AddTaskParameters},
    shell::Shell,
    storage::{json::JsonFileStorage, load_or_fresh},
};

mod clock;
mod commands;
mod config;
mod models;
mod services;
mod shell;
mod storage;
mod ui;

#[derive(Parser)]
#[command(
    name = "studytrack",
    version,
    about = "Study tasks and daily habits with streaks, points and levels"
)]
struct Cli {
    /// Path of the JSON store
    #[arg(long, global = true, env = "STUDYTRACK_STORE")]
    store: Option<PathBuf>,

    /// Log debug information to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show pending tasks, most urgent first
    Tasks {
        /// Only show tasks in this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Add a new task
    Add {
        /// Task title
        title: String,

        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: String,

        /// Priority: high, medium or low
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Category, e.g. "Maths" (defaults to General)
        #[arg(short, long)]
        category: Option<String>,

        /// Add notes
        #[arg(short = 'n', long, default_value = "")]
        description: String,
    },

    /// Complete a task
    Done { id: u64 },

    /// Show habits and their streaks
    Habits,

    /// Add a new habit
    HabitAdd {
        /// Habit name
        name: String,

        /// Goal of consecutive days
        #[arg(short, long, default_value_t = DEFAULT_TARGET_DAYS)]
        target_days: u32,

        /// Add notes
        #[arg(short = 'n', long, default_value = "")]
        description: String,
    },

    /// Mark a habit as done today
    HabitDone { id: u64 },

    /// Show totals, points and level
    Stats,

    /// Interactive menu (default)
    Menu,
}

fn main() {
    let cli = Cli::parse();

    let config = Config::new(cli.store, cli.verbose);
    config.init_logging();

    // A missing directory only makes saves fail, which are reported as they happen
    if let Err(e) = config.ensure_store_dir() {
        tracing::error!(
            path = %config.store_path.display(),
            error = %e,
            "failed to create data directory"
        );
    }

    let storage = JsonFileStorage::new(config.store_path.clone());
    tracing::debug!(path = %storage.path().display(), "using store");

    let mut store = load_or_fresh(&storage);
    let clock = SystemClock;

    let succeeded = match cli.command.unwrap_or(Commands::Menu) {
        Commands::Tasks { category } => {
            commands::list_tasks(&store, &clock, category.as_deref());
            true
        }
        Commands::Add {
            title,
            due,
            priority,
            category,
            description,
        } => {
            let parameters = AddTaskParameters {
                title,
                description,
                priority: Priority::from(priority),
                due_date: due,
                category,
            };
            commands::run_add_task(&mut store, &storage, &clock, parameters)
        }
        Commands::Done { id } => commands::run_complete_task(&mut store, &storage, &clock, id),
        Commands::Habits => {
            commands::list_habits(&store, &clock);
            true
        }
        Commands::HabitAdd {
            name,
            target_days,
            description,
        } => {
            let parameters = AddHabitParameters {
                name,
                description,
                target_days,
            };
            commands::run_add_habit(&mut store, &storage, &clock, parameters)
        }
        Commands::HabitDone { id } => {
            commands::run_complete_habit(&mut store, &storage, &clock, id)
        }
        Commands::Stats => {
            commands::show_stats(&store, &clock);
            true
        }
        Commands::Menu => {
            let stdin = io::stdin();
            match Shell::new(&mut store, &storage, &clock, stdin.lock()).run() {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                    false
                }
            }
        }
    };

    if !succeeded {
        std::process::exit(1);
    }
}
