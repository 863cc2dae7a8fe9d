//! Board document model
//!
//! A board is an unordered collection of positioned, typed nodes plus the connectors
//! drawn between them. Connectors reference nodes by id only; a connector whose endpoint
//! has been deleted stays on the board and is ignored by geometry and aggregation.
//!
//! The serialized form uses camelCase field names and an internal `kind` tag on nodes,
//! so a board file reads like:
//!
//! ```yaml
//! name: Q1 plan
//! nodes:
//!   - id: goal-1
//!     kind: goal
//!     x: 0
//!     y: 0
//!     title: Ship the book
//! connectors:
//!   - id: c-1
//!     fromId: goal-1
//!     toId: task-1
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Keys a board document carries that this model has no field for.
///
/// They are kept on read and written back unchanged, so editing a board never drops data
/// written by other tools.
pub type Extra = BTreeMap<String, serde_json::Value>;

/// Width substituted when a node has no usable width.
pub const DEFAULT_WIDTH: f64 = 200.0;

/// Height substituted when a node has no usable height.
pub const DEFAULT_HEIGHT: f64 = 100.0;

/// Kind tag of a canvas entity.
///
/// `Connection` is the kind reported for connectors; every other variant names a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Text,
    Goal,
    Habit,
    Task,
    Video,
    Budget,
    Learning,
    ContentIdea,
    Chart,
    CalendarEvent,
    FollowerCount,
    Connection,
}

impl NodeKind {
    /// All node kinds that can be placed on the board (excludes `Connection`)
    pub const NODE_KINDS: [NodeKind; 11] = [
        NodeKind::Text,
        NodeKind::Goal,
        NodeKind::Habit,
        NodeKind::Task,
        NodeKind::Video,
        NodeKind::Budget,
        NodeKind::Learning,
        NodeKind::ContentIdea,
        NodeKind::Chart,
        NodeKind::CalendarEvent,
        NodeKind::FollowerCount,
    ];

    /// Serialized tag (e.g. "content-idea")
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Text => "text",
            NodeKind::Goal => "goal",
            NodeKind::Habit => "habit",
            NodeKind::Task => "task",
            NodeKind::Video => "video",
            NodeKind::Budget => "budget",
            NodeKind::Learning => "learning",
            NodeKind::ContentIdea => "content-idea",
            NodeKind::Chart => "chart",
            NodeKind::CalendarEvent => "calendar-event",
            NodeKind::FollowerCount => "follower-count",
            NodeKind::Connection => "connection",
        }
    }

    /// Short human-readable label used in listings
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Text => "Text",
            NodeKind::Goal => "Goal",
            NodeKind::Habit => "Habit",
            NodeKind::Task => "Task",
            NodeKind::Video => "Video",
            NodeKind::Budget => "Budget",
            NodeKind::Learning => "Learning",
            NodeKind::ContentIdea => "Content",
            NodeKind::Chart => "Chart",
            NodeKind::CalendarEvent => "Event",
            NodeKind::FollowerCount => "Followers",
            NodeKind::Connection => "Connection",
        }
    }

    /// Size given to a freshly created node of this kind
    pub fn default_size(&self) -> (f64, f64) {
        match self {
            NodeKind::Text => (200.0, 100.0),
            NodeKind::Goal => (280.0, 200.0),
            NodeKind::Habit => (300.0, 160.0),
            NodeKind::Task => (240.0, 120.0),
            NodeKind::Video => (320.0, 240.0),
            NodeKind::Budget => (240.0, 140.0),
            NodeKind::Learning => (280.0, 160.0),
            NodeKind::ContentIdea => (260.0, 180.0),
            NodeKind::Chart => (320.0, 220.0),
            NodeKind::CalendarEvent => (260.0, 160.0),
            NodeKind::FollowerCount => (240.0, 180.0),
            NodeKind::Connection => (DEFAULT_WIDTH, DEFAULT_HEIGHT),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::NODE_KINDS
            .iter()
            .chain(std::iter::once(&NodeKind::Connection))
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown node kind: {s}"))
    }
}

/// Named attachment point on a node's bounding box.
///
/// Unrecognized names deserialize as `Center`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Anchor {
    Top,
    Right,
    Bottom,
    Left,
    Center,
}

impl Anchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::Top => "top",
            Anchor::Right => "right",
            Anchor::Bottom => "bottom",
            Anchor::Left => "left",
            Anchor::Center => "center",
        }
    }

    /// The side facing this one (`Center` faces itself)
    pub fn opposite(&self) -> Anchor {
        match self {
            Anchor::Top => Anchor::Bottom,
            Anchor::Right => Anchor::Left,
            Anchor::Bottom => Anchor::Top,
            Anchor::Left => Anchor::Right,
            Anchor::Center => Anchor::Center,
        }
    }

    fn parse(s: &str) -> Option<Anchor> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Some(Anchor::Top),
            "right" => Some(Anchor::Right),
            "bottom" => Some(Anchor::Bottom),
            "left" => Some(Anchor::Left),
            "center" => Some(Anchor::Center),
            _ => None,
        }
    }
}

impl From<String> for Anchor {
    fn from(s: String) -> Self {
        Anchor::parse(&s).unwrap_or(Anchor::Center)
    }
}

impl FromStr for Anchor {
    type Err = String;

    /// Strict parse for user input; documents on disk go through the lenient `From<String>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Anchor::parse(s).ok_or_else(|| format!("unknown anchor: {s}"))
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stroke style of a connector. Unrecognized names deserialize as `Solid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl From<String> for LineStyle {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "dashed" => LineStyle::Dashed,
            "dotted" => LineStyle::Dotted,
            _ => LineStyle::Solid,
        }
    }
}

/// A directed, styled edge between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub id: String,
    /// Declared origin of the connector shape; drawing happens relative to it
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub from_id: String,
    pub to_id: String,
    #[serde(default = "default_from_anchor")]
    pub from_anchor: Anchor,
    #[serde(default = "default_to_anchor")]
    pub to_anchor: Anchor,
    #[serde(default = "default_connector_color")]
    pub color: String,
    #[serde(default)]
    pub style: LineStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

fn default_from_anchor() -> Anchor {
    Anchor::Right
}

fn default_to_anchor() -> Anchor {
    Anchor::Left
}

fn default_connector_color() -> String {
    "zinc".to_string()
}

impl Connector {
    /// Create a connector with default styling
    pub fn new(
        id: impl Into<String>,
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        from_anchor: Anchor,
        to_anchor: Anchor,
    ) -> Self {
        Self {
            id: id.into(),
            x: 0.0,
            y: 0.0,
            from_id: from_id.into(),
            to_id: to_id.into(),
            from_anchor,
            to_anchor,
            color: default_connector_color(),
            style: LineStyle::Solid,
            label: None,
            extra: Extra::new(),
        }
    }

    /// Whether either endpoint is `id`
    pub fn touches(&self, id: &str) -> bool {
        self.from_id == id || self.to_id == id
    }

    /// The endpoint opposite `id`, if the connector touches it
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.from_id == id {
            Some(&self.to_id)
        } else if self.to_id == id {
            Some(&self.from_id)
        } else {
            None
        }
    }
}

/// Habit check-in for one calendar day (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub date: String,
    #[serde(default)]
    pub completed: bool,
}

impl CheckIn {
    pub fn new(date: impl Into<String>, completed: bool) -> Self {
        Self {
            date: date.into(),
            completed,
        }
    }
}

/// Sub-goal owned by a goal node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
}

/// Dated progress note recorded on a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalCheckIn {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub progress: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One labeled value in a chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetEntryType {
    Income,
    #[default]
    Expense,
}

/// Rendering style of a chart node. Unrecognized names deserialize as `Bar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Area,
    Pie,
}

impl From<String> for ChartType {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "line" => ChartType::Line,
            "area" => ChartType::Area,
            "pie" => ChartType::Pie,
            _ => ChartType::Bar,
        }
    }
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Pie => "pie",
        }
    }

    /// Next type in the bar → line → area → pie cycle
    pub fn next(&self) -> ChartType {
        match self {
            ChartType::Bar => ChartType::Line,
            ChartType::Line => ChartType::Area,
            ChartType::Area => ChartType::Pie,
            ChartType::Pie => ChartType::Bar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextProps {
    pub text: String,
    pub color: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: "white".to_string(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoalProps {
    pub title: String,
    pub description: String,
    /// Quarter label, e.g. "Q1 2026"
    pub quarter: String,
    pub target_date: String,
    /// Completion percentage; overwritten from connected tasks when there are any
    pub progress: u32,
    pub status: GoalStatus,
    pub color: String,
    pub rolled_over_from: String,
    pub milestones: Vec<Milestone>,
    pub check_ins: Vec<GoalCheckIn>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for GoalProps {
    fn default() -> Self {
        Self {
            title: "New Goal".to_string(),
            description: String::new(),
            quarter: String::new(),
            target_date: String::new(),
            progress: 0,
            status: GoalStatus::Active,
            color: "blue".to_string(),
            rolled_over_from: String::new(),
            milestones: Vec::new(),
            check_ins: Vec::new(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HabitProps {
    pub name: String,
    pub color: String,
    pub check_ins: Vec<CheckIn>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for HabitProps {
    fn default() -> Self {
        Self {
            name: "New Habit".to_string(),
            color: "green".to_string(),
            check_ins: Vec::new(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskProps {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub due_date: String,
    pub priority: Priority,
    pub color: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for TaskProps {
    fn default() -> Self {
        Self {
            title: "New Task".to_string(),
            description: String::new(),
            completed: false,
            due_date: String::new(),
            priority: Priority::Medium,
            color: "blue".to_string(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoProps {
    pub title: String,
    /// Pipeline state: empty, uploading, uploaded, processing, completed, failed
    pub status: String,
    pub source_url: String,
    pub output_url: String,
    pub thumbnail_url: String,
    pub duration: f64,
    pub file_size: u64,
    /// Percent of the source file uploaded
    pub upload_progress: f64,
    pub processing_progress: f64,
    /// Last pipeline error, empty when none
    pub error: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for VideoProps {
    fn default() -> Self {
        Self {
            title: "New Video".to_string(),
            status: "empty".to_string(),
            source_url: String::new(),
            output_url: String::new(),
            thumbnail_url: String::new(),
            duration: 0.0,
            file_size: 0,
            upload_progress: 0.0,
            processing_progress: 0.0,
            error: String::new(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BudgetProps {
    pub title: String,
    #[serde(rename = "type")]
    pub entry_type: BudgetEntryType,
    pub amount: f64,
    pub category: String,
    pub date: String,
    pub description: String,
    pub color: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for BudgetProps {
    fn default() -> Self {
        Self {
            title: "New Transaction".to_string(),
            entry_type: BudgetEntryType::Expense,
            amount: 0.0,
            category: String::new(),
            date: String::new(),
            description: String::new(),
            color: "emerald".to_string(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LearningProps {
    pub title: String,
    /// Resource type: article, video, course, book, podcast
    #[serde(rename = "type")]
    pub resource_type: String,
    pub url: String,
    pub thumbnail_url: String,
    pub notes: String,
    pub color: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for LearningProps {
    fn default() -> Self {
        Self {
            title: "New Resource".to_string(),
            resource_type: "article".to_string(),
            url: String::new(),
            thumbnail_url: String::new(),
            notes: String::new(),
            color: "cyan".to_string(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentIdeaProps {
    pub title: String,
    pub platform: String,
    pub caption: String,
    /// Workflow state: idea, drafting, scheduled, posted
    pub status: String,
    pub scheduled_date: String,
    pub hashtags: Vec<String>,
    pub color: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for ContentIdeaProps {
    fn default() -> Self {
        Self {
            title: "New Content Idea".to_string(),
            platform: "instagram".to_string(),
            caption: String::new(),
            status: "idea".to_string(),
            scheduled_date: String::new(),
            hashtags: Vec::new(),
            color: "pink".to_string(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartProps {
    pub title: String,
    pub chart_type: ChartType,
    /// Manually entered series, used when nothing relevant is connected
    pub data: Vec<DataPoint>,
    pub color: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for ChartProps {
    fn default() -> Self {
        let sample = [
            ("Mon", 30.0),
            ("Tue", 45.0),
            ("Wed", 60.0),
            ("Thu", 35.0),
            ("Fri", 80.0),
            ("Sat", 55.0),
            ("Sun", 40.0),
        ];
        Self {
            title: "New Chart".to_string(),
            chart_type: ChartType::Bar,
            data: sample
                .iter()
                .map(|(label, value)| DataPoint::new(*label, *value))
                .collect(),
            color: "violet".to_string(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarEventProps {
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub is_all_day: bool,
    /// Whether the event has been pushed to an external calendar
    pub is_synced: bool,
    pub google_event_id: String,
    pub color: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for CalendarEventProps {
    fn default() -> Self {
        Self {
            title: "New Event".to_string(),
            description: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            location: String::new(),
            is_all_day: false,
            is_synced: false,
            google_event_id: String::new(),
            color: "sky".to_string(),
            extra: Extra::new(),
        }
    }
}

/// Follower count sample at a date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerSample {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FollowerCountProps {
    pub platform: String,
    pub username: String,
    pub current_count: u64,
    pub previous_count: u64,
    pub last_synced: String,
    pub history: Vec<FollowerSample>,
    pub color: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for FollowerCountProps {
    fn default() -> Self {
        Self {
            platform: "instagram".to_string(),
            username: String::new(),
            current_count: 0,
            previous_count: 0,
            last_synced: String::new(),
            history: Vec::new(),
            color: "pink".to_string(),
            extra: Extra::new(),
        }
    }
}

/// Kind-specific fields of a node, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodeProps {
    Text(TextProps),
    Goal(GoalProps),
    Habit(HabitProps),
    Task(TaskProps),
    Video(VideoProps),
    Budget(BudgetProps),
    Learning(LearningProps),
    ContentIdea(ContentIdeaProps),
    Chart(ChartProps),
    CalendarEvent(CalendarEventProps),
    FollowerCount(FollowerCountProps),
}

impl NodeProps {
    /// Default fields for a newly created node of `kind`.
    ///
    /// Date-bearing kinds are stamped with `today`; goals get the current quarter.
    /// Returns `None` for `NodeKind::Connection`, which is not a node.
    pub fn defaults(kind: NodeKind, today: NaiveDate) -> Option<NodeProps> {
        let day = today.format("%Y-%m-%d").to_string();
        let props = match kind {
            NodeKind::Text => NodeProps::Text(TextProps::default()),
            NodeKind::Goal => NodeProps::Goal(GoalProps {
                quarter: format!("Q{} {}", today.month0() / 3 + 1, today.year()),
                ..GoalProps::default()
            }),
            NodeKind::Habit => NodeProps::Habit(HabitProps::default()),
            NodeKind::Task => NodeProps::Task(TaskProps::default()),
            NodeKind::Video => NodeProps::Video(VideoProps::default()),
            NodeKind::Budget => NodeProps::Budget(BudgetProps {
                date: day,
                ..BudgetProps::default()
            }),
            NodeKind::Learning => NodeProps::Learning(LearningProps::default()),
            NodeKind::ContentIdea => NodeProps::ContentIdea(ContentIdeaProps::default()),
            NodeKind::Chart => NodeProps::Chart(ChartProps::default()),
            NodeKind::CalendarEvent => NodeProps::CalendarEvent(CalendarEventProps {
                start_date: day.clone(),
                end_date: day,
                ..CalendarEventProps::default()
            }),
            NodeKind::FollowerCount => NodeProps::FollowerCount(FollowerCountProps::default()),
            NodeKind::Connection => return None,
        };
        Some(props)
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeProps::Text(_) => NodeKind::Text,
            NodeProps::Goal(_) => NodeKind::Goal,
            NodeProps::Habit(_) => NodeKind::Habit,
            NodeProps::Task(_) => NodeKind::Task,
            NodeProps::Video(_) => NodeKind::Video,
            NodeProps::Budget(_) => NodeKind::Budget,
            NodeProps::Learning(_) => NodeKind::Learning,
            NodeProps::ContentIdea(_) => NodeKind::ContentIdea,
            NodeProps::Chart(_) => NodeKind::Chart,
            NodeProps::CalendarEvent(_) => NodeKind::CalendarEvent,
            NodeProps::FollowerCount(_) => NodeKind::FollowerCount,
        }
    }
}

/// A positioned rectangular entity on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(flatten)]
    pub props: NodeProps,
}

impl Node {
    /// Create a node with explicit geometry
    pub fn new(id: impl Into<String>, x: f64, y: f64, w: f64, h: f64, props: NodeProps) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w: Some(w),
            h: Some(h),
            props,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.props.kind()
    }

    /// Width and height with the 200×100 fallback for missing, zero or non-finite values
    pub fn size(&self) -> (f64, f64) {
        let usable = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0);
        (
            usable(self.w).unwrap_or(DEFAULT_WIDTH),
            usable(self.h).unwrap_or(DEFAULT_HEIGHT),
        )
    }

    /// Title shown for the node, falling back to an "Untitled" label per kind
    pub fn display_title(&self) -> String {
        fn or(value: &str, fallback: &str) -> String {
            if value.trim().is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        }

        match &self.props {
            NodeProps::Text(p) => or(&p.text.chars().take(50).collect::<String>(), "Empty text"),
            NodeProps::Goal(p) => or(&p.title, "Untitled Goal"),
            NodeProps::Habit(p) => or(&p.name, "Untitled Habit"),
            NodeProps::Task(p) => or(&p.title, "Untitled Task"),
            NodeProps::Video(p) => or(&p.title, "Untitled Video"),
            NodeProps::Budget(p) => or(&p.title, "Untitled Transaction"),
            NodeProps::Learning(p) => or(&p.title, "Untitled Resource"),
            NodeProps::ContentIdea(p) => or(&p.title, "Untitled Idea"),
            NodeProps::Chart(p) => or(&p.title, "Untitled Chart"),
            NodeProps::CalendarEvent(p) => or(&p.title, "Untitled Event"),
            NodeProps::FollowerCount(p) => {
                if !p.username.is_empty() {
                    p.username.clone()
                } else {
                    or(&p.platform, "Follower Count")
                }
            }
        }
    }

    pub fn as_goal(&self) -> Option<&GoalProps> {
        match &self.props {
            NodeProps::Goal(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_goal_mut(&mut self) -> Option<&mut GoalProps> {
        match &mut self.props {
            NodeProps::Goal(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_task(&self) -> Option<&TaskProps> {
        match &self.props {
            NodeProps::Task(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_task_mut(&mut self) -> Option<&mut TaskProps> {
        match &mut self.props {
            NodeProps::Task(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_habit(&self) -> Option<&HabitProps> {
        match &self.props {
            NodeProps::Habit(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_habit_mut(&mut self) -> Option<&mut HabitProps> {
        match &mut self.props {
            NodeProps::Habit(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_chart(&self) -> Option<&ChartProps> {
        match &self.props {
            NodeProps::Chart(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_chart_mut(&mut self) -> Option<&mut ChartProps> {
        match &mut self.props {
            NodeProps::Chart(p) => Some(p),
            _ => None,
        }
    }
}

/// Read access to nodes by id.
///
/// This is the only way geometry and traversal code reaches a node from a connector,
/// so a deleted node simply resolves to `None`.
pub trait NodeLookup {
    fn node(&self, id: &str) -> Option<&Node>;
}

impl NodeLookup for [Node] {
    fn node(&self, id: &str) -> Option<&Node> {
        self.iter().find(|n| n.id == id)
    }
}

impl NodeLookup for Vec<Node> {
    fn node(&self, id: &str) -> Option<&Node> {
        self.as_slice().node(id)
    }
}

impl NodeLookup for HashMap<String, Node> {
    fn node(&self, id: &str) -> Option<&Node> {
        self.get(id)
    }
}

/// A whole canvas: nodes plus connectors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connectors: Vec<Connector>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Board {
    /// Create an empty board
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            connectors: Vec::new(),
            extra: Extra::new(),
        }
    }

    /// Returns the display title (name if set, otherwise "Untitled board")
    pub fn display_title(&self) -> &str {
        if self.name.is_empty() {
            "Untitled board"
        } else {
            &self.name
        }
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn connector(&self, id: &str) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.id == id)
    }

    /// Nodes of one kind, in board order
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }
}

impl NodeLookup for Board {
    fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.as_slice().node(id)
    }
}
