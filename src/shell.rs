use std::io::{self, BufRead, Write};

use colored::*;

use crate::{
    clock::Clock,
    commands,
    models::{habit::DEFAULT_TARGET_DAYS, store::Store, task::Priority},
    services::{habits::AddHabitParameters, tasks::AddTaskParameters},
    storage::Storage,
    ui,
};

enum MenuChoice {
    ListTasks,
    AddTask,
    CompleteTask,
    ListHabits,
    AddHabit,
    CompleteHabit,
    Stats,
    Exit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<MenuChoice> {
        match input.trim() {
            "1" => Some(MenuChoice::ListTasks),
            "2" => Some(MenuChoice::AddTask),
            "3" => Some(MenuChoice::CompleteTask),
            "4" => Some(MenuChoice::ListHabits),
            "5" => Some(MenuChoice::AddHabit),
            "6" => Some(MenuChoice::CompleteHabit),
            "7" => Some(MenuChoice::Stats),
            "8" | "q" | "quit" | "exit" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Menu digits 1-3 pick a priority; anything else means Medium.
fn priority_from_menu(input: &str) -> Priority {
    match input.trim() {
        "1" => Priority::High,
        "3" => Priority::Low,
        _ => Priority::Medium,
    }
}

fn target_days_from_menu(input: &str) -> u32 {
    input
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_TARGET_DAYS)
}

fn print_menu() {
    println!("\n{}", "═".repeat(40).dimmed());
    println!("  {}", "studytrack".cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!("  1. Pending tasks");
    println!("  2. Add task");
    println!("  3. Complete task");
    println!("  4. Habits");
    println!("  5. Add habit");
    println!("  6. Complete habit for today");
    println!("  7. Stats");
    println!("  8. Exit");
}

/// Interactive numbered menu over the tracker. Ends on "8" or end of input.
pub struct Shell<'a, S: Storage, C: Clock, R: BufRead> {
    store: &'a mut Store,
    storage: &'a S,
    clock: &'a C,
    input: R,
}

impl<'a, S: Storage, C: Clock, R: BufRead> Shell<'a, S, C, R> {
    pub fn new(store: &'a mut Store, storage: &'a S, clock: &'a C, input: R) -> Self {
        Self {
            store,
            storage,
            clock,
            input,
        }
    }

    /// Prints `label` and reads one line. `None` at end of input.
    /// A line that is not valid UTF-8 comes back empty, like a blank answer.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        print!("{}", label);
        io::stdout().flush()?;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(line.trim().to_string())),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                eprintln!("{} input is not valid UTF-8", "Error:".red().bold());
                Ok(Some(String::new()))
            }
            Err(e) => Err(e),
        }
    }

    fn prompt_id(&mut self, label: &str) -> io::Result<Option<u64>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match raw.parse::<u64>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                eprintln!("{} '{}' is not a valid id", "Error:".red().bold(), raw);
                Ok(None)
            }
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            print_menu();
            ui::render_progress(&self.store.stats(self.clock.today()));

            let Some(choice) = self.prompt("\n> ")? else {
                return Ok(());
            };

            match MenuChoice::parse(&choice) {
                Some(MenuChoice::ListTasks) => {
                    commands::list_tasks(self.store, self.clock, None);
                }
                Some(MenuChoice::AddTask) => {
                    if let Some(parameters) = self.read_task()? {
                        commands::run_add_task(self.store, self.storage, self.clock, parameters);
                    }
                }
                Some(MenuChoice::CompleteTask) => {
                    commands::list_tasks(self.store, self.clock, None);
                    if self.store.pending_tasks(self.clock.today()).is_empty() {
                        continue;
                    }
                    if let Some(id) = self.prompt_id("\nTask id: ")? {
                        commands::run_complete_task(self.store, self.storage, self.clock, id);
                    }
                }
                Some(MenuChoice::ListHabits) => {
                    commands::list_habits(self.store, self.clock);
                }
                Some(MenuChoice::AddHabit) => {
                    if let Some(parameters) = self.read_habit()? {
                        commands::run_add_habit(self.store, self.storage, self.clock, parameters);
                    }
                }
                Some(MenuChoice::CompleteHabit) => {
                    commands::list_habits(self.store, self.clock);
                    if self.store.habits.is_empty() {
                        continue;
                    }
                    if let Some(id) = self.prompt_id("\nHabit id: ")? {
                        commands::run_complete_habit(self.store, self.storage, self.clock, id);
                    }
                }
                Some(MenuChoice::Stats) => {
                    commands::show_stats(self.store, self.clock);
                }
                Some(MenuChoice::Exit) => {
                    println!("Bye! Keep it up.");
                    return Ok(());
                }
                None => {
                    eprintln!("{} Unknown option '{}'", "Error:".red().bold(), choice);
                }
            }
        }
    }

    fn read_task(&mut self) -> io::Result<Option<AddTaskParameters>> {
        let Some(title) = self.prompt("Title: ")? else {
            return Ok(None);
        };
        let Some(description) = self.prompt("Description: ")? else {
            return Ok(None);
        };
        let Some(priority) = self.prompt("Priority (1=High, 2=Medium, 3=Low): ")? else {
            return Ok(None);
        };
        let Some(due_date) = self.prompt("Due date (YYYY-MM-DD): ")? else {
            return Ok(None);
        };
        let Some(category) = self.prompt("Category (empty for General): ")? else {
            return Ok(None);
        };

        Ok(Some(AddTaskParameters {
            title,
            description,
            priority: priority_from_menu(&priority),
            due_date,
            category: Some(category),
        }))
    }

    fn read_habit(&mut self) -> io::Result<Option<AddHabitParameters>> {
        let Some(name) = self.prompt("Name: ")? else {
            return Ok(None);
        };
        let Some(description) = self.prompt("Description: ")? else {
            return Ok(None);
        };
        let Some(target_days) = self.prompt("Target days in a row (default 7): ")? else {
            return Ok(None);
        };

        Ok(Some(AddHabitParameters {
            name,
            description,
            target_days: target_days_from_menu(&target_days),
        }))
    }
}
