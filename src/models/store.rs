use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use slug::slugify;

use crate::models::{habit::Habit, task::Task};

/// Current schema version
pub const CURRENT_VERSION: u32 = 1;

pub const POINTS_PER_LEVEL: u64 = 100;

fn first_level() -> u64 {
    1
}

/// Levels start at 1 and go up every [`POINTS_PER_LEVEL`] points.
pub fn level_for_points(points: u64) -> u64 {
    points / POINTS_PER_LEVEL + 1
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Store {
    pub version: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub habits: Vec<Habit>,
    /// Cumulative, never spent
    #[serde(default)]
    pub points: u64,
    /// Cache of `level_for_points(points)`
    #[serde(default = "first_level")]
    pub level: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            tasks: vec![],
            habits: vec![],
            points: 0,
            level: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub from: u64,
    pub to: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub overdue_tasks: usize,
    pub total_habits: usize,
    pub points: u64,
    pub level: u64,
    pub points_to_next_level: u64,
}

impl Store {
    fn next_task_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    fn next_habit_id(&self) -> u64 {
        self.habits.iter().map(|h| h.id).max().unwrap_or(0) + 1
    }

    /// Appends the task under a freshly allocated id.
    pub fn add_task(&mut self, mut task: Task) -> &Task {
        task.id = self.next_task_id();
        tracing::debug!(task_id = task.id, "allocated task id");
        let index = self.tasks.len();
        self.tasks.push(task);
        &self.tasks[index]
    }

    /// Appends the habit under a freshly allocated id.
    pub fn add_habit(&mut self, mut habit: Habit) -> &Habit {
        habit.id = self.next_habit_id();
        tracing::debug!(habit_id = habit.id, "allocated habit id");
        let index = self.habits.len();
        self.habits.push(habit);
        &self.habits[index]
    }

    pub fn get_task_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn get_habit_mut(&mut self, id: u64) -> Option<&mut Habit> {
        self.habits.iter_mut().find(|h| h.id == id)
    }

    /// Adds points and re-derives the level. Returns the level change, if any.
    pub fn add_points(&mut self, amount: u64) -> Option<LevelUp> {
        let previous = self.level;
        self.points = self.points.saturating_add(amount);
        self.level = level_for_points(self.points);

        if self.level > previous {
            tracing::info!(from = previous, to = self.level, "level up");
            Some(LevelUp {
                from: previous,
                to: self.level,
            })
        } else {
            None
        }
    }

    /// Brings the cached level back in line with the points total.
    pub fn reconcile_level(&mut self) {
        let derived = level_for_points(self.points);
        if derived != self.level {
            tracing::debug!(
                cached = self.level,
                derived,
                "stored level disagrees with points, using derived level"
            );
            self.level = derived;
        }
    }

    /// Incomplete tasks, most urgent priority first, then soonest due.
    pub fn pending_tasks(&self, today: Date) -> Vec<&Task> {
        let mut pending: Vec<_> = self.tasks.iter().filter(|t| !t.completed).collect();
        pending.sort_by_key(|t| (t.priority.rank(), t.days_until_due(today)));
        pending
    }

    /// Same order as [`Store::pending_tasks`], restricted to one category.
    /// Categories match by slug, so case and accents are ignored.
    pub fn pending_tasks_in_category(&self, today: Date, category: &str) -> Vec<&Task> {
        let wanted = slugify(category);
        self.pending_tasks(today)
            .into_iter()
            .filter(|t| slugify(&t.category) == wanted)
            .collect()
    }

    pub fn stats(&self, today: Date) -> Stats {
        let total_tasks = self.tasks.len();
        let completed_tasks = self.tasks.iter().filter(|t| t.completed).count();
        let overdue_tasks = self.tasks.iter().filter(|t| t.is_overdue(today)).count();

        Stats {
            total_tasks,
            completed_tasks,
            pending_tasks: total_tasks - completed_tasks,
            overdue_tasks,
            total_habits: self.habits.len(),
            points: self.points,
            level: self.level,
            points_to_next_level: (self.level * POINTS_PER_LEVEL).saturating_sub(self.points),
        }
    }
}
