use thiserror::Error;

use crate::{
    clock::Clock,
    models::{
        store::{LevelUp, Store},
        task::{Priority, Task},
    },
    services::persist,
    storage::Storage,
};

/// Extra points for finishing a task before the day it is due.
pub const EARLY_COMPLETION_BONUS: u64 = 10;

#[derive(Debug, Error)]
pub enum AddTaskError {
    #[error("Task title cannot be empty")]
    EmptyTitle,
}

pub struct AddTaskParameters {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: String,
    pub category: Option<String>,
}

pub fn add_task(
    store: &mut Store,
    storage: &impl Storage,
    clock: &impl Clock,
    parameters: AddTaskParameters,
) -> Result<Task, AddTaskError> {
    let title = parameters.title.trim().to_string();
    if title.is_empty() {
        return Err(AddTaskError::EmptyTitle);
    }

    // The due date is stored as typed; an unreadable one only affects sorting
    let task = Task::new(
        0,
        title,
        parameters.description,
        parameters.priority,
        parameters.due_date,
        parameters.category,
        clock.today(),
    );

    let task = store.add_task(task).clone();
    tracing::info!(task_id = task.id, title = %task.title, "task added");

    persist(store, storage);

    Ok(task)
}

#[derive(Debug, Error)]
pub enum CompleteTaskError {
    #[error("Task #{0} not found")]
    TaskNotFound(u64),

    #[error("Task #{0} is already completed")]
    TaskAlreadyCompleted(u64),
}

pub struct CompleteTaskParameters {
    pub id: u64,
}

#[derive(Debug)]
pub struct TaskCompletion {
    pub task: Task,
    pub points_earned: u64,
    pub early_bonus: bool,
    pub level_up: Option<LevelUp>,
}

pub fn complete_task(
    store: &mut Store,
    storage: &impl Storage,
    clock: &impl Clock,
    parameters: CompleteTaskParameters,
) -> Result<TaskCompletion, CompleteTaskError> {
    let today = clock.today();

    let task = store
        .get_task_mut(parameters.id)
        .ok_or(CompleteTaskError::TaskNotFound(parameters.id))?;

    // Decided before the task is touched
    let early_bonus = task.days_until_due(today) > 0;

    if !task.complete() {
        return Err(CompleteTaskError::TaskAlreadyCompleted(parameters.id));
    }

    let mut points_earned = task.priority.points();
    if early_bonus {
        points_earned += EARLY_COMPLETION_BONUS;
    }
    let task = task.clone();

    let level_up = store.add_points(points_earned);
    tracing::info!(task_id = task.id, points_earned, early_bonus, "task completed");

    persist(store, storage);

    Ok(TaskCompletion {
        task,
        points_earned,
        early_bonus,
        level_up,
    })
}
