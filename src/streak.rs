//! Habit streak and completion statistics
//!
//! Every calculator here is a pure function of a check-in list and an explicit `today`.
//! Dates are compared as `YYYY-MM-DD` strings; several entries for the same date count
//! as one completed day when any of them is completed.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::model::CheckIn;

/// Days covered by the habit heat-map
pub const HEATMAP_DAYS: u64 = 28;

/// Canonical string form of a calendar day
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Distinct dates with at least one completed entry, in ascending order
pub fn completed_dates(check_ins: &[CheckIn]) -> BTreeSet<&str> {
    check_ins
        .iter()
        .filter(|c| c.completed)
        .map(|c| c.date.as_str())
        .collect()
}

/// Consecutive completed days ending today or yesterday.
///
/// Today never breaks the streak: when it has no completed entry (missing, or explicitly
/// marked incomplete) the walk starts from yesterday instead.
pub fn current_streak(check_ins: &[CheckIn], today: NaiveDate) -> u32 {
    let done = completed_dates(check_ins);
    let mut streak = 0;
    let mut day = today;

    loop {
        if done.contains(day_key(day).as_str()) {
            streak += 1;
        } else if day != today {
            break;
        }
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }

    streak
}

/// Longest run of consecutive completed days anywhere in the history.
///
/// A date that does not parse ends the current run and starts a run of one.
pub fn longest_streak(check_ins: &[CheckIn]) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for date in completed_dates(check_ins) {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok();
        let consecutive = match (prev, parsed) {
            (Some(p), Some(d)) => p.succ_opt() == Some(d),
            _ => false,
        };
        run = if consecutive { run + 1 } else { 1 };
        longest = longest.max(run);
        prev = parsed;
    }

    longest
}

/// Percentage of the trailing `days` days (today included) with a completed entry.
///
/// Rounded half-up; future-dated entries are ignored and `days == 0` yields 0.
pub fn rolling_rate(check_ins: &[CheckIn], today: NaiveDate, days: u64) -> u32 {
    if days == 0 {
        return 0;
    }
    let done = completed_dates(check_ins);
    let hits = trailing_days(today, days)
        .filter(|day| done.contains(day_key(*day).as_str()))
        .count() as u64;
    ((200 * hits + days) / (2 * days)) as u32
}

pub fn weekly_rate(check_ins: &[CheckIn], today: NaiveDate) -> u32 {
    rolling_rate(check_ins, today, 7)
}

pub fn monthly_rate(check_ins: &[CheckIn], today: NaiveDate) -> u32 {
    rolling_rate(check_ins, today, 30)
}

/// One cell of the habit heat-map
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapDay {
    pub date: String,
    pub completed: bool,
}

/// Completion flags for the trailing 28 days, oldest first
pub fn heatmap(check_ins: &[CheckIn], today: NaiveDate) -> Vec<HeatmapDay> {
    let done = completed_dates(check_ins);
    trailing_days(today, HEATMAP_DAYS)
        .map(|day| {
            let date = day_key(day);
            let completed = done.contains(date.as_str());
            HeatmapDay { date, completed }
        })
        .collect()
}

/// Calendar days from `today - (days - 1)` through `today`, oldest first
pub(crate) fn trailing_days(today: NaiveDate, days: u64) -> impl Iterator<Item = NaiveDate> {
    (0..days)
        .rev()
        .filter_map(move |offset| today.checked_sub_days(Days::new(offset)))
}

/// Everything shown for a habit, computed from one check-in history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub weekly_rate: u32,
    pub monthly_rate: u32,
    pub total_completed: usize,
    pub heatmap: Vec<HeatmapDay>,
}

impl HabitStats {
    pub fn compute(check_ins: &[CheckIn], today: NaiveDate) -> Self {
        Self {
            current_streak: current_streak(check_ins, today),
            longest_streak: longest_streak(check_ins),
            weekly_rate: weekly_rate(check_ins, today),
            monthly_rate: monthly_rate(check_ins, today),
            total_completed: completed_dates(check_ins).len(),
            heatmap: heatmap(check_ins, today),
        }
    }
}

/// Toggle the check-in for `date`, keeping at most one entry per date.
///
/// An existing entry is flipped and any duplicates of it are dropped; a missing entry is
/// appended as completed. Returns the new completion state.
pub fn toggle_check_in(check_ins: &mut Vec<CheckIn>, date: &str) -> bool {
    let Some(pos) = check_ins.iter().position(|c| c.date == date) else {
        check_ins.push(CheckIn::new(date, true));
        return true;
    };

    let was_completed = check_ins
        .iter()
        .filter(|c| c.date == date)
        .any(|c| c.completed);
    let mut index = 0;
    check_ins.retain(|c| {
        let keep = c.date != date || index == pos;
        index += 1;
        keep
    });
    check_ins[pos].completed = !was_completed;
    !was_completed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn done(dates: &[&str]) -> Vec<CheckIn> {
        dates.iter().map(|d| CheckIn::new(*d, true)).collect()
    }

    // ========== Streak Tests ==========

    #[test]
    fn three_day_run_ending_today() {
        let check_ins = done(&["2024-01-01", "2024-01-02", "2024-01-03"]);
        let today = day(2024, 1, 3);

        assert_eq!(current_streak(&check_ins, today), 3);
        assert_eq!(longest_streak(&check_ins), 3);
    }

    #[test]
    fn gap_breaks_run() {
        let check_ins = done(&["2024-01-01", "2024-01-03"]);
        let today = day(2024, 1, 3);

        assert_eq!(current_streak(&check_ins, today), 1);
        assert_eq!(longest_streak(&check_ins), 1);
    }

    #[test]
    fn missing_today_does_not_break_streak() {
        let check_ins = done(&["2024-01-01", "2024-01-02"]);
        assert_eq!(current_streak(&check_ins, day(2024, 1, 3)), 2);
        // Two days without a check-in does break it
        assert_eq!(current_streak(&check_ins, day(2024, 1, 4)), 0);
    }

    #[test]
    fn incomplete_today_is_treated_like_missing_today() {
        // Product intent is unconfirmed: an explicit "not done" today is indistinguishable
        // from "not checked yet", so the streak through yesterday survives either way.
        let mut check_ins = done(&["2024-01-01", "2024-01-02"]);
        check_ins.push(CheckIn::new("2024-01-03", false));

        assert_eq!(current_streak(&check_ins, day(2024, 1, 3)), 2);
    }

    #[test]
    fn incomplete_entries_never_count() {
        let check_ins = vec![
            CheckIn::new("2024-01-01", false),
            CheckIn::new("2024-01-02", false),
        ];
        assert_eq!(current_streak(&check_ins, day(2024, 1, 2)), 0);
        assert_eq!(longest_streak(&check_ins), 0);
    }

    #[test]
    fn longest_streak_spans_month_boundary() {
        let check_ins = done(&["2024-03-01", "2024-02-28", "2024-02-29", "2024-03-05"]);
        assert_eq!(longest_streak(&check_ins), 3);
    }

    #[test]
    fn longest_covers_current_on_same_data() {
        let check_ins = done(&["2024-05-01", "2024-05-02", "2024-05-08", "2024-05-09", "2024-05-10"]);
        let today = day(2024, 5, 10);

        let current = current_streak(&check_ins, today);
        let longest = longest_streak(&check_ins);
        assert_eq!(current, 3);
        assert!(longest >= current);
    }

    #[test]
    fn duplicate_dates_do_not_inflate_or_break_runs() {
        let check_ins = done(&["2024-01-01", "2024-01-02", "2024-01-02", "2024-01-03"]);
        assert_eq!(longest_streak(&check_ins), 3);
        assert_eq!(current_streak(&check_ins, day(2024, 1, 3)), 3);
    }

    #[test]
    fn malformed_dates_are_tolerated() {
        let check_ins = done(&["not-a-date", "2024-01-01", "2024-01-02", "", "2024-13-40"]);
        assert_eq!(longest_streak(&check_ins), 2);
        assert_eq!(current_streak(&check_ins, day(2024, 1, 2)), 2);
    }

    #[test]
    fn empty_history_is_all_zero() {
        let stats = HabitStats::compute(&[], day(2024, 1, 1));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 0);
        assert_eq!(stats.weekly_rate, 0);
        assert_eq!(stats.monthly_rate, 0);
        assert_eq!(stats.total_completed, 0);
        assert_eq!(stats.heatmap.len(), 28);
        assert!(stats.heatmap.iter().all(|d| !d.completed));
    }

    #[test]
    fn earliest_representable_day_terminates() {
        let check_ins = vec![CheckIn::new(day_key(NaiveDate::MIN), true)];
        assert_eq!(current_streak(&check_ins, NaiveDate::MIN), 1);
        assert_eq!(heatmap(&check_ins, NaiveDate::MIN).len(), 1);
    }

    #[test]
    fn repeated_computation_is_identical() {
        let check_ins = done(&["2024-01-01", "2024-01-03", "2024-01-04"]);
        let today = day(2024, 1, 4);
        assert_eq!(
            HabitStats::compute(&check_ins, today),
            HabitStats::compute(&check_ins, today)
        );
    }

    // ========== Rate Tests ==========

    #[test]
    fn weekly_rate_rounds_half_up() {
        let check_ins = done(&["2024-01-10", "2024-01-09", "2024-01-05"]);
        // 3 of 7 = 42.86%
        assert_eq!(weekly_rate(&check_ins, day(2024, 1, 10)), 43);
        // The window opens on 2024-01-04
        let edge = done(&["2024-01-03", "2024-01-04"]);
        assert_eq!(weekly_rate(&edge, day(2024, 1, 10)), 14);
    }

    #[test]
    fn rates_never_exceed_full_completion() {
        let mut check_ins = Vec::new();
        for d in 1..=31 {
            let date = format!("2024-01-{d:02}");
            check_ins.push(CheckIn::new(date.clone(), true));
            check_ins.push(CheckIn::new(date, true));
        }
        let today = day(2024, 1, 31);
        assert_eq!(weekly_rate(&check_ins, today), 100);
        assert_eq!(monthly_rate(&check_ins, today), 100);
    }

    #[test]
    fn future_entries_are_ignored() {
        let check_ins = done(&["2024-01-11", "2024-01-12"]);
        assert_eq!(weekly_rate(&check_ins, day(2024, 1, 10)), 0);
    }

    #[test]
    fn zero_window_is_zero() {
        let check_ins = done(&["2024-01-10"]);
        assert_eq!(rolling_rate(&check_ins, day(2024, 1, 10), 0), 0);
    }

    #[test]
    fn half_month_rounds_to_fifty() {
        let check_ins: Vec<CheckIn> = (1..=15)
            .map(|d| CheckIn::new(format!("2024-06-{d:02}"), true))
            .collect();
        assert_eq!(monthly_rate(&check_ins, day(2024, 6, 30)), 50);
    }

    // ========== Heat-map Tests ==========

    #[test]
    fn heatmap_is_oldest_first() {
        let check_ins = done(&["2024-02-01", "2024-02-28"]);
        let cells = heatmap(&check_ins, day(2024, 2, 28));

        assert_eq!(cells.len(), 28);
        assert_eq!(cells[0].date, "2024-02-01");
        assert!(cells[0].completed);
        assert_eq!(cells[27].date, "2024-02-28");
        assert!(cells[27].completed);
        assert_eq!(cells.iter().filter(|c| c.completed).count(), 2);
    }

    // ========== Toggle Tests ==========

    #[test]
    fn toggling_new_day_appends_completed() {
        let mut check_ins = Vec::new();
        assert!(toggle_check_in(&mut check_ins, "2024-01-01"));
        assert_eq!(check_ins, vec![CheckIn::new("2024-01-01", true)]);
    }

    #[test]
    fn toggling_existing_day_flips_it() {
        let mut check_ins = done(&["2024-01-01"]);
        assert!(!toggle_check_in(&mut check_ins, "2024-01-01"));
        assert_eq!(check_ins, vec![CheckIn::new("2024-01-01", false)]);
        assert!(toggle_check_in(&mut check_ins, "2024-01-01"));
        assert_eq!(check_ins, vec![CheckIn::new("2024-01-01", true)]);
    }

    #[test]
    fn toggling_collapses_duplicates() {
        let mut check_ins = vec![
            CheckIn::new("2024-01-01", false),
            CheckIn::new("2024-01-02", true),
            CheckIn::new("2024-01-01", true),
        ];
        // Any completed duplicate makes the day count as done, so the toggle clears it
        assert!(!toggle_check_in(&mut check_ins, "2024-01-01"));
        assert_eq!(
            check_ins,
            vec![
                CheckIn::new("2024-01-01", false),
                CheckIn::new("2024-01-02", true),
            ]
        );
    }

    #[test]
    fn stats_serialize_camel_case() {
        let stats = HabitStats::compute(&done(&["2024-01-01"]), day(2024, 1, 1));
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["currentStreak"], 1);
        assert_eq!(json["totalCompleted"], 1);
        assert_eq!(json["heatmap"][27]["date"], "2024-01-01");
    }
}
