use std::collections::BTreeSet;

use jiff::civil::Date;
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_TARGET_DAYS: u32 = 7;

fn default_target_days() -> u32 {
    DEFAULT_TARGET_DAYS
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Habit {
    /// Sequential id, unique within the store
    pub id: u64,
    /// Name of the habit
    pub name: String,
    /// Free text notes of the habit
    pub description: String,
    /// Goal of consecutive days. Informational only
    #[serde(default = "default_target_days")]
    pub target_days: u32,
    /// Distinct days on which the habit was done, kept in calendar order
    #[serde(default, deserialize_with = "deserialize_completed_dates")]
    pub completed_dates: BTreeSet<Date>,
    /// Length of the run ending today or yesterday, 0 once lapsed
    #[serde(default)]
    pub current_streak: u32,
    /// Longest run ever seen. Never decreases
    #[serde(default)]
    pub best_streak: u32,
    /// When the habit was created
    pub created_at: Date,
}

impl Habit {
    pub fn new(
        id: u64,
        name: String,
        description: String,
        target_days: u32,
        created_at: Date,
    ) -> Habit {
        Habit {
            id,
            name,
            description,
            target_days,
            completed_dates: BTreeSet::new(),
            current_streak: 0,
            best_streak: 0,
            created_at,
        }
    }

    pub fn completed_on(&self, date: Date) -> bool {
        self.completed_dates.contains(&date)
    }

    /// Logs `date` as done. Returns false if it was already logged.
    pub fn mark_completed(&mut self, date: Date, today: Date) -> bool {
        if !self.completed_dates.insert(date) {
            return false;
        }
        self.recompute_streaks(today);
        true
    }

    /// Rebuilds both streaks from `completed_dates` as seen from `today`.
    pub fn recompute_streaks(&mut self, today: Date) {
        let Some(&last) = self.completed_dates.last() else {
            self.current_streak = 0;
            return;
        };

        let (trailing_run, longest_run) = scan_runs(&self.completed_dates);

        self.current_streak = if is_live(last, today) {
            trailing_run
        } else {
            0
        };
        self.best_streak = self.best_streak.max(longest_run);

        tracing::debug!(
            habit_id = self.id,
            current_streak = self.current_streak,
            best_streak = self.best_streak,
            "recomputed habit streaks"
        );
    }
}

/// Walks sorted dates and returns (run ending at the last date, longest run).
fn scan_runs(dates: &BTreeSet<Date>) -> (u32, u32) {
    let mut run = 0;
    let mut longest = 0;
    let mut previous: Option<Date> = None;

    for &date in dates {
        run = match previous {
            Some(prev) if prev.tomorrow().ok() == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }

    (run, longest)
}

/// A run stays live while its last day is today or yesterday.
fn is_live(last: Date, today: Date) -> bool {
    today
        .yesterday()
        .map_or(true, |yesterday| last >= yesterday)
}

fn deserialize_completed_dates<'de, D>(deserializer: D) -> Result<BTreeSet<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|text| match Date::strptime("%Y-%m-%d", text.trim()) {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::warn!(date = %text, error = %e, "skipping malformed habit completion date");
                None
            }
        })
        .collect())
}
