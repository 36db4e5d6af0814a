use colored::*;
use jiff::civil::Date;

use crate::models::{
    habit::Habit,
    store::{LevelUp, Stats},
    task::{DueDateError, Priority, Task},
};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Get the status glyph for a task's priority
pub fn get_priority_glyph(priority: &Priority) -> ColoredString {
    match priority {
        Priority::High => "●".red(),
        Priority::Medium => "●".yellow(),
        Priority::Low => "●".green(),
        Priority::Unrecognized(_) => "○".normal(),
    }
}

/// Describe how far away the due date is (e.g., "overdue by 2 days", "due tomorrow")
pub fn describe_due(task: &Task, today: Date) -> ColoredString {
    match task.due() {
        Err(DueDateError::Missing) => "no due date".dimmed(),
        Err(DueDateError::Malformed(raw)) => format!("unreadable due date '{}'", raw).yellow(),
        Ok(_) if task.is_overdue(today) => {
            let days = -task.days_until_due(today);
            format!("overdue by {} {}", days, plural(days, "day")).red().bold()
        }
        Ok(_) => match task.days_until_due(today) {
            0 => "due today".yellow(),
            1 => "due tomorrow".normal(),
            days => format!("due in {} days", days).normal(),
        },
    }
}

fn plural(count: i64, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// Print `left` with `right` pushed to the terminal's right edge when it fits
fn print_aligned(left: ColoredString, left_visible_len: usize, right: &str) {
    let terminal_width = get_terminal_width();
    let right_visible_len = right.chars().count();
    let total_content = left_visible_len + right_visible_len;

    if !right.is_empty() && total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        println!("{}{}{}", left, " ".repeat(padding), right.dimmed());
    } else {
        println!("{}", left);
    }
}

/// Render a pending task: id, priority glyph, title and category, then its due status
pub fn render_task_line(task: &Task, today: Date) {
    let id_str = format!("{:>3}", task.id);
    let left_section = format!("  {}  {}  [{}] {}", id_str, " ", task.priority, task.title);
    let styled_left = format!(
        "  {}  {}  [{}] {}",
        id_str.dimmed(),
        get_priority_glyph(&task.priority),
        task.priority,
        task.title.bold()
    );

    print_aligned(
        styled_left.normal(),
        left_section.chars().count(),
        &task.category,
    );

    println!("        {} · {}", describe_due(task, today), task.due_date.dimmed());
    if !task.description.is_empty() {
        println!("        {}", task.description.dimmed());
    }
}

/// Render a habit with its streaks and whether it was done today
pub fn render_habit_line(habit: &Habit, today: Date) {
    let id_str = format!("{:>3}", habit.id);
    let (glyph, status) = if habit.completed_on(today) {
        ("✓".green(), "done today".green())
    } else {
        ("○".normal(), "pending".yellow())
    };
    let left_section = format!("  {}  {}  {}", id_str, " ", habit.name);
    let styled_left = format!("  {}  {}  {}", id_str.dimmed(), glyph, habit.name.bold());
    let goal = format!("goal {} {}", habit.target_days, plural(habit.target_days.into(), "day"));

    print_aligned(styled_left.normal(), left_section.chars().count(), &goal);

    println!(
        "        {} · streak {} · best {}",
        status,
        habit.current_streak.to_string().bold(),
        habit.best_streak
    );
    if !habit.description.is_empty() {
        println!("        {}", habit.description.dimmed());
    }
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize, noun: &str) {
    println!(
        "\n  {} ({} {})\n",
        title.cyan().bold(),
        count,
        plural(count as i64, noun)
    );
}

pub fn render_stats(stats: &Stats) {
    println!("\n  {}\n", "Stats".cyan().bold());
    println!("  Tasks      {}", stats.total_tasks);
    println!("  Completed  {}", stats.completed_tasks.to_string().green());
    println!("  Pending    {}", stats.pending_tasks);
    let overdue = stats.overdue_tasks.to_string();
    if stats.overdue_tasks > 0 {
        println!("  Overdue    {}", overdue.red().bold());
    } else {
        println!("  Overdue    {}", overdue);
    }
    println!("  Habits     {}", stats.total_habits);
    println!("  Level      {}", stats.level.to_string().bold());
    println!("  Points     {}", stats.points);
    println!(
        "\n  {} points to level {}",
        stats.points_to_next_level,
        stats.level + 1
    );
}

/// One-line banner with level and points
pub fn render_progress(stats: &Stats) {
    println!(
        "  {} {} · {} points",
        "Level".bold(),
        stats.level.to_string().bold(),
        stats.points
    );
}

pub fn render_level_up(level_up: &LevelUp) {
    println!(
        "  {} Level up! {} → {}",
        "★".yellow().bold(),
        level_up.from,
        level_up.to.to_string().bold()
    );
}
