use crate::tracker::TaskSummary;

pub fn format_list_line(summary: &TaskSummary) -> String {
    format!(
        " - {}  (current: {}, best: {}, total days: {})",
        summary.name, summary.streaks.current, summary.streaks.best, summary.total_days
    )
}

pub fn format_streak_line(summary: &TaskSummary) -> String {
    format!(
        "{} → current: {}, best: {}, total days: {}",
        summary.name, summary.streaks.current, summary.streaks.best, summary.total_days
    )
}

pub fn format_stats_line(summary: &TaskSummary) -> String {
    format!(
        " - {}: {} marks (current {}, best {})",
        summary.name, summary.total_days, summary.streaks.current, summary.streaks.best
    )
}
