//! Derived metrics
//!
//! Display-ready aggregates computed from the connector graph on demand. The only value
//! ever written back to the board is a goal's `progress`, and that write happens in
//! [`crate::board::Board::toggle_task`] using the updates produced here.

use chrono::NaiveDate;
use serde::Serialize;

use crate::graph::{goals_of_task, neighbors, neighbors_with_goal_tasks};
use crate::model::{
    BudgetEntryType, ChartType, Connector, DataPoint, FollowerCountProps, GoalStatus, Node,
    NodeLookup, NodeProps,
};
use crate::streak::{day_key, trailing_days};

/// Characters of a task title kept in a bar label
const TASK_LABEL_CHARS: usize = 8;

/// Rounded percentage of `done` out of `total`, or `None` when there is nothing to count
pub fn percent(done: usize, total: usize) -> Option<u32> {
    if total == 0 {
        return None;
    }
    let (done, total) = (done as u64, total as u64);
    Some(((200 * done + total) / (2 * total)) as u32)
}

/// Progress of a goal derived from its directly connected tasks.
///
/// `None` when the goal has no connected tasks; its manual progress then stands.
pub fn goal_progress<L>(goal_id: &str, nodes: &L, connectors: &[Connector]) -> Option<u32>
where
    L: NodeLookup + ?Sized,
{
    let hood = neighbors(goal_id, nodes, connectors);
    let tasks = hood.tasks();
    let done = tasks
        .iter()
        .filter(|t| t.as_task().is_some_and(|p| p.completed))
        .count();
    percent(done, tasks.len())
}

/// New progress value for one goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub goal_id: String,
    pub progress: u32,
}

/// Progress values for every goal connected to `task_id`, as if the task's completion
/// flag were already `completed`.
///
/// The board itself is not modified; goals with no connected tasks produce no update.
pub fn progress_updates_for_task<L>(
    task_id: &str,
    completed: bool,
    nodes: &L,
    connectors: &[Connector],
) -> Vec<ProgressUpdate>
where
    L: NodeLookup + ?Sized,
{
    goals_of_task(task_id, nodes, connectors)
        .into_iter()
        .filter_map(|goal| {
            let hood = neighbors(&goal.id, nodes, connectors);
            let tasks = hood.tasks();
            let done = tasks
                .iter()
                .filter(|t| {
                    if t.id == task_id {
                        completed
                    } else {
                        t.as_task().is_some_and(|p| p.completed)
                    }
                })
                .count();
            percent(done, tasks.len()).map(|progress| ProgressUpdate {
                goal_id: goal.id.clone(),
                progress,
            })
        })
        .collect()
}

/// Where a chart's series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Habits,
    Tasks,
    Manual,
}

/// Series shown by a chart node after resolving its connections
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub chart_id: String,
    pub title: String,
    pub chart_type: ChartType,
    pub source: DataSource,
    /// Human-readable source, e.g. "2 Habits" or "1 Goal → 3 Tasks"
    pub source_label: String,
    pub points: Vec<DataPoint>,
}

impl ChartSeries {
    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|p| p.value).fold(0.0, f64::max)
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count > 1 {
        format!("{count} {noun}s")
    } else {
        format!("{count} {noun}")
    }
}

/// Completed-habit count per day over the trailing week, oldest first, labelled by weekday
pub fn habit_week_series(habits: &[&Node], today: NaiveDate) -> Vec<DataPoint> {
    trailing_days(today, 7)
        .map(|day| {
            let key = day_key(day);
            let count = habits
                .iter()
                .filter_map(|h| h.as_habit())
                .filter(|h| h.check_ins.iter().any(|c| c.completed && c.date == key))
                .count();
            DataPoint::new(day.format("%a").to_string(), count as f64)
        })
        .collect()
}

/// Task completion as a Done/Pending split for pies, or one 0/100 bar per task otherwise
pub fn task_series(tasks: &[&Node], chart_type: ChartType) -> Vec<DataPoint> {
    let is_done = |t: &Node| t.as_task().is_some_and(|p| p.completed);

    if chart_type == ChartType::Pie {
        let done = tasks.iter().filter(|t| is_done(**t)).count();
        return vec![
            DataPoint::new("Done", done as f64),
            DataPoint::new("Pending", (tasks.len() - done) as f64),
        ];
    }

    tasks
        .iter()
        .map(|t| {
            let value = if is_done(*t) { 100.0 } else { 0.0 };
            DataPoint::new(task_label(&t.display_title()), value)
        })
        .collect()
}

/// Bar label for a task: the first eight characters, with `..` when truncated
pub fn task_label(title: &str) -> String {
    let mut chars = title.chars();
    let head: String = chars.by_ref().take(TASK_LABEL_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}..")
    } else {
        head
    }
}

/// Resolve the series a chart node displays.
///
/// Connected habits win over connected tasks and goals (whose tasks are pulled in
/// through one extra hop); with neither, the chart's manual data is used.
/// Returns `None` when `chart` is not a chart node.
pub fn chart_series<L>(
    chart: &Node,
    nodes: &L,
    connectors: &[Connector],
    today: NaiveDate,
) -> Option<ChartSeries>
where
    L: NodeLookup + ?Sized,
{
    let props = chart.as_chart()?;
    let hood = neighbors_with_goal_tasks(&chart.id, nodes, connectors);
    let habits = hood.habits();
    let goals = hood.goals();
    let tasks = hood.tasks();

    let (source, source_label, points) = if !habits.is_empty() {
        (
            DataSource::Habits,
            plural(habits.len(), "Habit"),
            habit_week_series(habits, today),
        )
    } else if !tasks.is_empty() || !goals.is_empty() {
        let tasks_label = plural(tasks.len(), "Task");
        let label = if goals.is_empty() {
            tasks_label
        } else {
            format!("{} → {tasks_label}", plural(goals.len(), "Goal"))
        };
        (DataSource::Tasks, label, task_series(tasks, props.chart_type))
    } else {
        (
            DataSource::Manual,
            "Manual Data".to_string(),
            props.data.clone(),
        )
    };

    Some(ChartSeries {
        chart_id: chart.id.clone(),
        title: chart.display_title(),
        chart_type: props.chart_type,
        source,
        source_label,
        points,
    })
}

/// Overview of one goal and its connected work
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    pub id: String,
    pub title: String,
    pub quarter: String,
    pub status: GoalStatus,
    /// Stored progress
    pub progress: u32,
    /// Progress implied by connected tasks, if any are connected
    pub derived_progress: Option<u32>,
    pub task_count: usize,
    pub completed_tasks: usize,
    pub milestone_count: usize,
    pub completed_milestones: usize,
}

impl GoalSummary {
    /// Whether the stored progress disagrees with connected task state
    pub fn is_stale(&self) -> bool {
        self.derived_progress.is_some_and(|p| p != self.progress)
    }
}

/// Summarize a goal node; `None` for other kinds
pub fn goal_summary<L>(goal: &Node, nodes: &L, connectors: &[Connector]) -> Option<GoalSummary>
where
    L: NodeLookup + ?Sized,
{
    let props = goal.as_goal()?;
    let hood = neighbors(&goal.id, nodes, connectors);
    let tasks = hood.tasks();
    let completed_tasks = tasks
        .iter()
        .filter(|t| t.as_task().is_some_and(|p| p.completed))
        .count();

    Some(GoalSummary {
        id: goal.id.clone(),
        title: goal.display_title(),
        quarter: props.quarter.clone(),
        status: props.status,
        progress: props.progress.min(100),
        derived_progress: percent(completed_tasks, tasks.len()),
        task_count: tasks.len(),
        completed_tasks,
        milestone_count: props.milestones.len(),
        completed_milestones: props.milestones.iter().filter(|m| m.completed).count(),
    })
}

/// Income and expense totals over all budget nodes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
    pub entries: usize,
}

pub fn budget_summary(nodes: &[Node]) -> BudgetSummary {
    let mut summary = BudgetSummary::default();
    for node in nodes {
        let NodeProps::Budget(b) = &node.props else {
            continue;
        };
        let amount = if b.amount.is_finite() { b.amount.abs() } else { 0.0 };
        match b.entry_type {
            BudgetEntryType::Income => summary.income += amount,
            BudgetEntryType::Expense => summary.expense += amount,
        }
        summary.entries += 1;
    }
    summary.net = summary.income - summary.expense;
    summary
}

/// Change in follower count since the previous sync
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowerGrowth {
    pub change: i64,
    /// Percent change with one decimal; 0.0 when there is no previous count
    pub percent: f64,
}

pub fn follower_growth(props: &FollowerCountProps) -> FollowerGrowth {
    let diff = i128::from(props.current_count) - i128::from(props.previous_count);
    // Saturate: the difference of two u64 can exceed i64
    let change = i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX });
    let percent = if props.previous_count > 0 {
        (diff as f64 / props.previous_count as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };
    FollowerGrowth { change, percent }
}
