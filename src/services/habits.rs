use thiserror::Error;

use crate::{
    clock::Clock,
    models::{
        habit::Habit,
        store::{LevelUp, Store},
    },
    services::persist,
    storage::Storage,
};

pub const HABIT_BASE_POINTS: u64 = 15;
pub const STREAK_BONUS_PER_DAY: u64 = 5;

#[derive(Debug, Error)]
pub enum AddHabitError {
    #[error("Habit name cannot be empty")]
    EmptyName,

    #[error("Target days must be at least 1")]
    ZeroTargetDays,
}

pub struct AddHabitParameters {
    pub name: String,
    pub description: String,
    pub target_days: u32,
}

pub fn add_habit(
    store: &mut Store,
    storage: &impl Storage,
    clock: &impl Clock,
    parameters: AddHabitParameters,
) -> Result<Habit, AddHabitError> {
    let name = parameters.name.trim().to_string();
    if name.is_empty() {
        return Err(AddHabitError::EmptyName);
    }
    if parameters.target_days == 0 {
        return Err(AddHabitError::ZeroTargetDays);
    }

    let habit = Habit::new(
        0,
        name,
        parameters.description,
        parameters.target_days,
        clock.today(),
    );

    let habit = store.add_habit(habit).clone();
    tracing::info!(habit_id = habit.id, name = %habit.name, "habit added");

    persist(store, storage);

    Ok(habit)
}

#[derive(Debug, Error)]
pub enum CompleteHabitError {
    #[error("Habit #{0} not found")]
    HabitNotFound(u64),

    #[error("Habit '{0}' was already completed today")]
    AlreadyCompletedToday(String),
}

pub struct CompleteHabitParameters {
    pub id: u64,
}

#[derive(Debug)]
pub struct HabitCompletion {
    pub habit: Habit,
    pub points_earned: u64,
    pub level_up: Option<LevelUp>,
}

/// Points for a completion, given the streak right after it.
pub fn habit_points(current_streak: u32) -> u64 {
    HABIT_BASE_POINTS + u64::from(current_streak) * STREAK_BONUS_PER_DAY
}

pub fn complete_habit(
    store: &mut Store,
    storage: &impl Storage,
    clock: &impl Clock,
    parameters: CompleteHabitParameters,
) -> Result<HabitCompletion, CompleteHabitError> {
    let today = clock.today();

    let habit = store
        .get_habit_mut(parameters.id)
        .ok_or(CompleteHabitError::HabitNotFound(parameters.id))?;

    if !habit.mark_completed(today, today) {
        return Err(CompleteHabitError::AlreadyCompletedToday(habit.name.clone()));
    }

    let points_earned = habit_points(habit.current_streak);
    let habit = habit.clone();

    let level_up = store.add_points(points_earned);
    tracing::info!(
        habit_id = habit.id,
        current_streak = habit.current_streak,
        points_earned,
        "habit completed"
    );

    persist(store, storage);

    Ok(HabitCompletion {
        habit,
        points_earned,
        level_up,
    })
}
