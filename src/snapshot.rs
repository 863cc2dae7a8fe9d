//! Whole-board statistics
//!
//! A `BoardSnapshot` gathers every derived metric for one board at one date. It backs the
//! `stats` command, the JSON stats output and the HTML dashboard.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::geometry::{Rect, bounds};
use crate::graph::dangling;
use crate::metrics::{
    BudgetSummary, ChartSeries, FollowerGrowth, GoalSummary, budget_summary, chart_series,
    follower_growth, goal_summary,
};
use crate::model::{Board, NodeKind, NodeLookup, NodeProps};
use crate::streak::{HabitStats, day_key};

/// Statistics for one habit node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitSummary {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(flatten)]
    pub stats: HabitStats,
}

/// Growth figures for one follower-count node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowerSummary {
    pub id: String,
    pub platform: String,
    pub username: String,
    pub current_count: u64,
    #[serde(flatten)]
    pub growth: FollowerGrowth,
}

/// A connector whose endpoints do not all resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingConnector {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    /// Endpoint ids that no longer exist
    pub missing: Vec<String>,
}

/// Derived statistics for a whole board
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    /// Board title shown in reports
    pub title: String,

    /// Date the statistics were computed for (`YYYY-MM-DD`)
    pub today: String,

    pub node_count: usize,
    pub connector_count: usize,

    /// Node count per kind; kinds with no nodes are omitted
    pub kinds: BTreeMap<NodeKind, usize>,

    pub goals: Vec<GoalSummary>,
    pub habits: Vec<HabitSummary>,
    pub charts: Vec<ChartSeries>,
    pub budget: BudgetSummary,
    pub followers: Vec<FollowerSummary>,
    pub dangling: Vec<DanglingConnector>,

    /// Union of all node rectangles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,

    /// Version of the stats format
    pub format_version: String,
}

impl BoardSnapshot {
    pub const FORMAT_VERSION: &'static str = "1.0";

    /// Compute every derived metric of `board` as of `today`
    pub fn compute(board: &Board, today: NaiveDate) -> Self {
        let nodes = board.nodes.as_slice();
        let connectors = board.connectors.as_slice();

        let mut kinds = BTreeMap::new();
        for node in nodes {
            *kinds.entry(node.kind()).or_insert(0) += 1;
        }

        let goals = nodes
            .iter()
            .filter_map(|n| goal_summary(n, nodes, connectors))
            .collect();

        let habits = nodes
            .iter()
            .filter_map(|n| match &n.props {
                NodeProps::Habit(h) => Some(HabitSummary {
                    id: n.id.clone(),
                    name: n.display_title(),
                    color: h.color.clone(),
                    stats: HabitStats::compute(&h.check_ins, today),
                }),
                _ => None,
            })
            .collect();

        let charts = nodes
            .iter()
            .filter_map(|n| chart_series(n, nodes, connectors, today))
            .collect();

        let followers = nodes
            .iter()
            .filter_map(|n| match &n.props {
                NodeProps::FollowerCount(f) => Some(FollowerSummary {
                    id: n.id.clone(),
                    platform: f.platform.clone(),
                    username: f.username.clone(),
                    current_count: f.current_count,
                    growth: follower_growth(f),
                }),
                _ => None,
            })
            .collect();

        let dangling: Vec<DanglingConnector> = dangling(connectors, nodes)
            .into_iter()
            .map(|c| {
                let missing = [&c.from_id, &c.to_id]
                    .into_iter()
                    .filter(|id| nodes.node(id).is_none())
                    .cloned()
                    .collect();
                DanglingConnector {
                    id: c.id.clone(),
                    from_id: c.from_id.clone(),
                    to_id: c.to_id.clone(),
                    missing,
                }
            })
            .collect();
        for c in &dangling {
            warn!(connector = %c.id, missing = ?c.missing, "connector endpoint not found");
        }

        Self {
            title: board.display_title().to_string(),
            today: day_key(today),
            node_count: nodes.len(),
            connector_count: connectors.len(),
            kinds,
            goals,
            habits,
            charts,
            budget: budget_summary(nodes),
            followers,
            dangling,
            bounds: bounds(nodes),
            format_version: Self::FORMAT_VERSION.to_string(),
        }
    }

    /// Plain-text summary for terminals
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "{} ({})", self.title, self.today)?;
        writeln!(
            out,
            "{} nodes, {} connectors",
            self.node_count, self.connector_count
        )?;

        if !self.goals.is_empty() {
            writeln!(out, "\nGoals")?;
            for g in &self.goals {
                write!(
                    out,
                    "  {}: {}% ({}/{} tasks",
                    g.title, g.progress, g.completed_tasks, g.task_count
                )?;
                if g.milestone_count > 0 {
                    write!(
                        out,
                        ", {}/{} milestones",
                        g.completed_milestones, g.milestone_count
                    )?;
                }
                writeln!(out, ")")?;
            }
        }

        if !self.habits.is_empty() {
            writeln!(out, "\nHabits")?;
            for h in &self.habits {
                writeln!(
                    out,
                    "  {}: streak {} (best {}), week {}%, month {}%",
                    h.name,
                    h.stats.current_streak,
                    h.stats.longest_streak,
                    h.stats.weekly_rate,
                    h.stats.monthly_rate
                )?;
            }
        }

        if !self.charts.is_empty() {
            writeln!(out, "\nCharts")?;
            for c in &self.charts {
                let points: Vec<String> = c
                    .points
                    .iter()
                    .map(|p| format!("{} {}", p.label, p.value))
                    .collect();
                writeln!(
                    out,
                    "  {} [{}] {}: {}",
                    c.title,
                    c.chart_type.as_str(),
                    c.source_label,
                    points.join(", ")
                )?;
            }
        }

        if self.budget.entries > 0 {
            writeln!(out, "\nBudget")?;
            writeln!(
                out,
                "  income {:.2}, expense {:.2}, net {:.2}",
                self.budget.income, self.budget.expense, self.budget.net
            )?;
        }

        if !self.followers.is_empty() {
            writeln!(out, "\nFollowers")?;
            for f in &self.followers {
                writeln!(
                    out,
                    "  {} {}: {} ({:+}, {:.1}%)",
                    f.platform, f.username, f.current_count, f.growth.change, f.growth.percent
                )?;
            }
        }

        if !self.dangling.is_empty() {
            writeln!(out, "\nDangling connectors")?;
            for d in &self.dangling {
                writeln!(out, "  {}: {} -> {}", d.id, d.from_id, d.to_id)?;
            }
        }

        Ok(())
    }
}
