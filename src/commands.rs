use colored::*;

use crate::{
    clock::Clock,
    models::store::Store,
    services::{
        habits::{AddHabitParameters, CompleteHabitParameters, add_habit, complete_habit},
        tasks::{AddTaskParameters, CompleteTaskParameters, add_task, complete_task},
    },
    storage::Storage,
    ui,
};

fn report_error(error: &dyn std::error::Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}

pub fn list_tasks(store: &Store, clock: &impl Clock, category: Option<&str>) {
    let today = clock.today();
    let pending = match category {
        Some(category) => store.pending_tasks_in_category(today, category),
        None => store.pending_tasks(today),
    };

    if pending.is_empty() {
        println!("No pending tasks. Nice work!");
        return;
    }

    let title = match category {
        Some(category) => format!("Pending · {}", category),
        None => String::from("Pending"),
    };
    ui::render_view_header(&title, pending.len(), "task");
    for task in pending {
        ui::render_task_line(task, today);
    }
}

pub fn list_habits(store: &Store, clock: &impl Clock) {
    if store.habits.is_empty() {
        println!("No habits yet");
        return;
    }

    let today = clock.today();
    ui::render_view_header("Habits", store.habits.len(), "habit");
    for habit in &store.habits {
        ui::render_habit_line(habit, today);
    }
}

pub fn show_stats(store: &Store, clock: &impl Clock) {
    ui::render_stats(&store.stats(clock.today()));
}

pub fn run_add_task(
    store: &mut Store,
    storage: &impl Storage,
    clock: &impl Clock,
    parameters: AddTaskParameters,
) -> bool {
    match add_task(store, storage, clock, parameters) {
        Ok(task) => {
            println!("✓ Task added: {}", task.title);
            println!("  #{}", task.id);
            true
        }
        Err(e) => {
            report_error(&e);
            false
        }
    }
}

pub fn run_complete_task(
    store: &mut Store,
    storage: &impl Storage,
    clock: &impl Clock,
    id: u64,
) -> bool {
    match complete_task(store, storage, clock, CompleteTaskParameters { id }) {
        Ok(completion) => {
            let bonus = if completion.early_bonus {
                " (early bonus)"
            } else {
                ""
            };
            println!("✓ Task completed: {}", completion.task.title);
            println!("  +{} points{}", completion.points_earned, bonus);
            if let Some(level_up) = completion.level_up {
                ui::render_level_up(&level_up);
            }
            true
        }
        Err(e) => {
            report_error(&e);
            false
        }
    }
}

pub fn run_add_habit(
    store: &mut Store,
    storage: &impl Storage,
    clock: &impl Clock,
    parameters: AddHabitParameters,
) -> bool {
    match add_habit(store, storage, clock, parameters) {
        Ok(habit) => {
            println!("✓ Habit added: {}", habit.name);
            println!("  #{}", habit.id);
            true
        }
        Err(e) => {
            report_error(&e);
            false
        }
    }
}

pub fn run_complete_habit(
    store: &mut Store,
    storage: &impl Storage,
    clock: &impl Clock,
    id: u64,
) -> bool {
    match complete_habit(store, storage, clock, CompleteHabitParameters { id }) {
        Ok(completion) => {
            println!("✓ Habit done: {}", completion.habit.name);
            println!(
                "  streak {} · +{} points",
                completion.habit.current_streak, completion.points_earned
            );
            if let Some(level_up) = completion.level_up {
                ui::render_level_up(&level_up);
            }
            true
        }
        Err(e) => {
            report_error(&e);
            false
        }
    }
}
