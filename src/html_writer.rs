//! HTML dashboard writer
//!
//! Renders a [`BoardSnapshot`] into a single static `index.html` using Askama templates.
//! All numbers are formatted here so the template only places strings.

use std::fs;
use std::path::Path;

use askama::Template;

use crate::io::{IoError, IoResult, ReportWriter};
use crate::metrics::ChartSeries;
use crate::model::GoalStatus;
use crate::settings::ReportSettings;
use crate::snapshot::BoardSnapshot;

/// File name written inside the output directory
pub const INDEX_FILE: &str = "index.html";

/// Writer that renders a board dashboard as HTML
pub struct HtmlWriter {
    show_heatmap: bool,
    title: Option<String>,
}

impl HtmlWriter {
    /// Create a writer with default settings
    pub fn new() -> Self {
        Self {
            show_heatmap: true,
            title: None,
        }
    }

    /// Create a writer honoring report settings
    pub fn with_settings(settings: &ReportSettings) -> Self {
        Self {
            show_heatmap: settings.heatmap,
            title: settings.title.clone(),
        }
    }

    /// Render the dashboard to a string
    pub fn render(&self, snapshot: &BoardSnapshot) -> IoResult<String> {
        let data = DashboardData::from_snapshot(snapshot);
        let template = DashboardTemplate {
            title: self.title.as_deref().unwrap_or(&snapshot.title),
            today: &snapshot.today,
            node_count: snapshot.node_count,
            connector_count: snapshot.connector_count,
            show_heatmap: self.show_heatmap,
            goals: &data.goals,
            habits: &data.habits,
            charts: &data.charts,
            budget: data.budget.as_ref(),
            followers: &data.followers,
            dangling: &data.dangling,
        };
        template.render().map_err(|e| IoError::Write(e.to_string()))
    }
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportWriter for HtmlWriter {
    fn write(&self, snapshot: &BoardSnapshot, output: &Path) -> IoResult<()> {
        fs::create_dir_all(output).map_err(IoError::Io)?;
        let html = self.render(snapshot)?;
        fs::write(output.join(INDEX_FILE), html).map_err(IoError::Io)?;
        Ok(())
    }

    fn format_id(&self) -> &str {
        "html"
    }
}

// ========== Template data ==========

struct GoalCard {
    id: String,
    title: String,
    quarter: String,
    status: &'static str,
    progress: u32,
    tasks: String,
    milestones: Option<String>,
    /// Set when the stored progress disagrees with the connected tasks
    derived: Option<u32>,
}

struct HeatCell {
    date: String,
    class: &'static str,
}

struct HabitCard {
    id: String,
    name: String,
    color: String,
    current_streak: u32,
    longest_streak: u32,
    weekly_rate: u32,
    monthly_rate: u32,
    total_completed: usize,
    cells: Vec<HeatCell>,
}

struct Bar {
    label: String,
    value: String,
    /// Height as a percentage of the tallest bar
    height: u32,
}

struct ChartCard {
    id: String,
    title: String,
    chart_type: &'static str,
    source_label: String,
    bars: Vec<Bar>,
}

struct BudgetCard {
    income: String,
    expense: String,
    net: String,
    net_class: &'static str,
    entries: usize,
}

struct FollowerRow {
    platform: String,
    username: String,
    count: u64,
    change: String,
    percent: String,
}

struct DanglingRow {
    id: String,
    missing: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate<'a> {
    title: &'a str,
    today: &'a str,
    node_count: usize,
    connector_count: usize,
    show_heatmap: bool,
    goals: &'a [GoalCard],
    habits: &'a [HabitCard],
    charts: &'a [ChartCard],
    budget: Option<&'a BudgetCard>,
    followers: &'a [FollowerRow],
    dangling: &'a [DanglingRow],
}

struct DashboardData {
    goals: Vec<GoalCard>,
    habits: Vec<HabitCard>,
    charts: Vec<ChartCard>,
    budget: Option<BudgetCard>,
    followers: Vec<FollowerRow>,
    dangling: Vec<DanglingRow>,
}

impl DashboardData {
    fn from_snapshot(snapshot: &BoardSnapshot) -> Self {
        let goals = snapshot
            .goals
            .iter()
            .map(|g| GoalCard {
                id: g.id.clone(),
                title: g.title.clone(),
                quarter: g.quarter.clone(),
                status: status_label(g.status),
                progress: g.progress.min(100),
                tasks: format!("{}/{} tasks", g.completed_tasks, g.task_count),
                milestones: (g.milestone_count > 0).then(|| {
                    format!(
                        "{}/{} milestones",
                        g.completed_milestones, g.milestone_count
                    )
                }),
                derived: g.derived_progress.filter(|_| g.is_stale()),
            })
            .collect();

        let habits = snapshot
            .habits
            .iter()
            .map(|h| HabitCard {
                id: h.id.clone(),
                name: h.name.clone(),
                color: h.color.clone(),
                current_streak: h.stats.current_streak,
                longest_streak: h.stats.longest_streak,
                weekly_rate: h.stats.weekly_rate,
                monthly_rate: h.stats.monthly_rate,
                total_completed: h.stats.total_completed,
                cells: h
                    .stats
                    .heatmap
                    .iter()
                    .map(|d| HeatCell {
                        date: d.date.clone(),
                        class: if d.completed { "cell done" } else { "cell" },
                    })
                    .collect(),
            })
            .collect();

        let budget = (snapshot.budget.entries > 0).then(|| BudgetCard {
            income: money(snapshot.budget.income),
            expense: money(snapshot.budget.expense),
            net: signed_money(snapshot.budget.net),
            net_class: if snapshot.budget.net < 0.0 {
                "negative"
            } else {
                "positive"
            },
            entries: snapshot.budget.entries,
        });

        let followers = snapshot
            .followers
            .iter()
            .map(|f| FollowerRow {
                platform: f.platform.clone(),
                username: f.username.clone(),
                count: f.current_count,
                change: format!("{:+}", f.growth.change),
                percent: format!("{:.1}%", f.growth.percent),
            })
            .collect();

        let dangling = snapshot
            .dangling
            .iter()
            .map(|c| DanglingRow {
                id: c.id.clone(),
                missing: c.missing.join(", "),
            })
            .collect();

        Self {
            goals,
            habits,
            charts: snapshot.charts.iter().map(chart_card).collect(),
            budget,
            followers,
            dangling,
        }
    }
}

fn chart_card(series: &ChartSeries) -> ChartCard {
    let max = series.max_value();
    let bars = series
        .points
        .iter()
        .map(|p| Bar {
            label: p.label.clone(),
            value: trim_number(p.value),
            height: if max > 0.0 {
                (p.value.max(0.0) / max * 100.0).round() as u32
            } else {
                0
            },
        })
        .collect();

    ChartCard {
        id: series.chart_id.clone(),
        title: series.title.clone(),
        chart_type: series.chart_type.as_str(),
        source_label: series.source_label.clone(),
        bars,
    }
}

fn status_label(status: GoalStatus) -> &'static str {
    match status {
        GoalStatus::Active => "active",
        GoalStatus::Completed => "completed",
        GoalStatus::Archived => "archived",
    }
}

fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

fn signed_money(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("+${:.2}", amount)
    }
}

/// Whole numbers print without a fractional part
fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board_reader::YamlReader;
    use crate::io::Reader;
    use crate::model::Board;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn fixture_snapshot() -> BoardSnapshot {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("board.yaml");
        let board = YamlReader::new().read(&path).unwrap();
        BoardSnapshot::compute(&board, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap())
    }

    // ========== Formatting Tests ==========

    #[test]
    fn numbers_are_formatted_for_display() {
        assert_eq!(money(3000.0), "$3000.00");
        assert_eq!(signed_money(-12.5), "-$12.50");
        assert_eq!(signed_money(1799.5), "+$1799.50");
        assert_eq!(trim_number(2.0), "2");
        assert_eq!(trim_number(2.5), "2.50");
    }

    #[test]
    fn chart_bars_scale_to_tallest_point() {
        let snapshot = fixture_snapshot();
        let habits = snapshot
            .charts
            .iter()
            .find(|c| c.chart_id == "chart-habits")
            .unwrap();
        let card = chart_card(habits);

        let heights: Vec<u32> = card.bars.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![50, 100, 50, 0, 100, 50, 50]);
        assert_eq!(card.chart_type, "bar");
    }

    // ========== Writer Tests ==========

    #[test]
    fn html_writer_format_id() {
        assert_eq!(HtmlWriter::new().format_id(), "html");
    }

    #[test]
    fn render_includes_every_section() {
        let html = HtmlWriter::new().render(&fixture_snapshot()).unwrap();

        assert!(html.contains("<title>Q1 plan</title>"));
        assert!(html.contains("Ship the book"));
        assert!(html.contains("1/3 tasks"));
        assert!(html.contains("1/2 milestones"));
        assert!(html.contains("Morning run"));
        assert!(html.contains("1 Goal → 3 Tasks"));
        assert!(html.contains("+$1799.50"));
        assert!(html.contains("+150"));
        assert!(html.contains("c-stale"));
        assert!(html.contains("class=\"heatmap\""));
    }

    #[test]
    fn settings_override_title_and_hide_heatmap() {
        let settings = ReportSettings {
            title: Some("My quarter".to_string()),
            heatmap: false,
            ..ReportSettings::default()
        };
        let html = HtmlWriter::with_settings(&settings)
            .render(&fixture_snapshot())
            .unwrap();

        assert!(html.contains("<title>My quarter</title>"));
        assert!(!html.contains("class=\"heatmap\""));
    }

    #[test]
    fn empty_board_renders_placeholder() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let snapshot = BoardSnapshot::compute(&Board::new(""), today);
        let html = HtmlWriter::new().render(&snapshot).unwrap();

        assert!(html.contains("Untitled board"));
        assert!(html.contains("Nothing on this board yet"));
    }

    #[test]
    fn write_creates_index_html() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("site");

        HtmlWriter::new()
            .write(&fixture_snapshot(), &output)
            .unwrap();

        let html = fs::read_to_string(output.join(INDEX_FILE)).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
