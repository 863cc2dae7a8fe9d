//! Board commands
//!
//! Explicit, validated mutations of a [`Board`]. Each command takes `&mut Board`, so the
//! read of current state and the write-back of derived values (goal progress after a task
//! toggle) happen under one exclusive borrow.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::geometry::{Point, Rect, infer_anchors};
use crate::metrics::{ProgressUpdate, progress_updates_for_task};
use crate::model::{
    Anchor, Board, ChartType, Connector, GoalCheckIn, GoalStatus, Node, NodeKind, NodeLookup,
    NodeProps,
};
use crate::streak::{day_key, toggle_check_in};

/// Errors raised by board commands
#[derive(Error, Debug, PartialEq)]
pub enum BoardError {
    /// No node with this id exists
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// No connector with this id exists
    #[error("unknown connector: {0}")]
    UnknownConnector(String),

    /// The node exists but is not of the kind the command needs
    #[error("node {id} is a {found}, expected a {expected}")]
    WrongKind {
        id: String,
        expected: NodeKind,
        found: NodeKind,
    },

    /// The kind cannot be created as a node
    #[error("cannot create a node of kind {0}")]
    NotANode(NodeKind),

    /// A connector would start and end on the same node
    #[error("cannot connect node {0} to itself")]
    SelfConnection(String),

    /// A node cannot be placed at a non-finite coordinate
    #[error("invalid position ({x}, {y})")]
    InvalidPosition { x: f64, y: f64 },

    /// The goal's quarter is empty or not of the form `Q<n> <year>`
    #[error("goal {id} has no valid quarter: {quarter:?}")]
    InvalidQuarter { id: String, quarter: String },
}

/// Result type for board commands
pub type BoardResult<T> = Result<T, BoardError>;

/// Outcome of toggling a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskToggle {
    pub completed: bool,
    /// Goals whose progress was rewritten
    pub updates: Vec<ProgressUpdate>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The quarter after `quarter` (`"Q4 2024"` -> `"Q1 2025"`), or `None` if it does not parse
pub fn next_quarter(quarter: &str) -> Option<String> {
    let mut parts = quarter.split_whitespace();
    let q: u32 = parts
        .next()?
        .strip_prefix(['Q', 'q'])?
        .parse()
        .ok()
        .filter(|q| (1..=4).contains(q))?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(if q == 4 {
        format!("Q1 {}", year.checked_add(1)?)
    } else {
        format!("Q{} {year}", q + 1)
    })
}

impl Board {
    fn expect_kind(&self, id: &str, expected: NodeKind) -> BoardResult<&Node> {
        let node = self
            .node(id)
            .ok_or_else(|| BoardError::UnknownNode(id.to_string()))?;
        if node.kind() != expected {
            return Err(BoardError::WrongKind {
                id: id.to_string(),
                expected,
                found: node.kind(),
            });
        }
        Ok(node)
    }

    /// Add a node of `kind` with its default fields and size, centered on `center`.
    ///
    /// Returns the new node's id.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        center: Point,
        today: NaiveDate,
    ) -> BoardResult<String> {
        if !(center.x.is_finite() && center.y.is_finite()) {
            return Err(BoardError::InvalidPosition {
                x: center.x,
                y: center.y,
            });
        }
        let props = NodeProps::defaults(kind, today).ok_or(BoardError::NotANode(kind))?;
        let (w, h) = kind.default_size();
        let id = new_id();

        self.nodes.push(Node::new(
            id.clone(),
            center.x - w / 2.0,
            center.y - h / 2.0,
            w,
            h,
            props,
        ));
        debug!(%id, %kind, "added node");
        Ok(id)
    }

    /// Apply an in-place edit to a node
    pub fn update_node<F>(&mut self, id: &str, edit: F) -> BoardResult<()>
    where
        F: FnOnce(&mut Node),
    {
        let node = self
            .node_mut(id)
            .ok_or_else(|| BoardError::UnknownNode(id.to_string()))?;
        edit(node);
        Ok(())
    }

    /// Remove a node. Connectors that reference it are left in place.
    pub fn delete_node(&mut self, id: &str) -> BoardResult<Node> {
        let pos = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| BoardError::UnknownNode(id.to_string()))?;
        debug!(%id, "deleted node");
        Ok(self.nodes.remove(pos))
    }

    /// Remove a connector
    pub fn delete_connector(&mut self, id: &str) -> BoardResult<Connector> {
        let pos = self
            .connectors
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| BoardError::UnknownConnector(id.to_string()))?;
        debug!(%id, "deleted connector");
        Ok(self.connectors.remove(pos))
    }

    /// Connect two existing nodes.
    ///
    /// With `anchors` unset the anchor pair is inferred from the nodes' relative position.
    /// The connector's origin is the top-left-most corner of the two nodes.
    pub fn connect(
        &mut self,
        from_id: &str,
        to_id: &str,
        anchors: Option<(Anchor, Anchor)>,
    ) -> BoardResult<String> {
        if from_id == to_id {
            return Err(BoardError::SelfConnection(from_id.to_string()));
        }
        let from = self
            .node(from_id)
            .ok_or_else(|| BoardError::UnknownNode(from_id.to_string()))?;
        let to = self
            .node(to_id)
            .ok_or_else(|| BoardError::UnknownNode(to_id.to_string()))?;

        let (from_anchor, to_anchor) =
            anchors.unwrap_or_else(|| infer_anchors(&Rect::of_node(from), &Rect::of_node(to)));
        let mut connector = Connector::new(new_id(), from_id, to_id, from_anchor, to_anchor);
        connector.x = from.x.min(to.x);
        connector.y = from.y.min(to.y);

        let id = connector.id.clone();
        debug!(%id, from = from_id, to = to_id, %from_anchor, %to_anchor, "connected nodes");
        self.connectors.push(connector);
        Ok(id)
    }

    /// Set a task's completion flag and rewrite the progress of every connected goal
    pub fn set_task_completed(
        &mut self,
        task_id: &str,
        completed: bool,
    ) -> BoardResult<TaskToggle> {
        self.expect_kind(task_id, NodeKind::Task)?;

        let updates = progress_updates_for_task(task_id, completed, &self.nodes, &self.connectors);
        if let Some(task) = self.node_mut(task_id).and_then(Node::as_task_mut) {
            task.completed = completed;
        }
        for update in &updates {
            if let Some(goal) = self.node_mut(&update.goal_id).and_then(Node::as_goal_mut) {
                debug!(goal = %update.goal_id, progress = update.progress, "goal progress updated");
                goal.progress = update.progress;
            }
        }

        Ok(TaskToggle { completed, updates })
    }

    /// Flip a task's completion flag; see [`Board::set_task_completed`]
    pub fn toggle_task(&mut self, task_id: &str) -> BoardResult<TaskToggle> {
        let completed = self
            .expect_kind(task_id, NodeKind::Task)?
            .as_task()
            .is_some_and(|t| t.completed);
        self.set_task_completed(task_id, !completed)
    }

    /// Toggle a habit's check-in for `date`; returns the new completion state
    pub fn toggle_check_in(&mut self, habit_id: &str, date: NaiveDate) -> BoardResult<bool> {
        self.expect_kind(habit_id, NodeKind::Habit)?;
        let key = day_key(date);
        let habit = self
            .node_mut(habit_id)
            .and_then(Node::as_habit_mut)
            .ok_or_else(|| BoardError::UnknownNode(habit_id.to_string()))?;
        let completed = toggle_check_in(&mut habit.check_ins, &key);
        debug!(habit = habit_id, date = %key, completed, "toggled check-in");
        Ok(completed)
    }

    /// Move a goal into the following quarter.
    ///
    /// The old quarter is recorded in `rolled_over_from`; progress and check-ins restart and
    /// the goal becomes active again. Milestones are kept. Returns the new quarter.
    pub fn rollover_goal(&mut self, goal_id: &str) -> BoardResult<String> {
        self.expect_kind(goal_id, NodeKind::Goal)?;
        let goal = self
            .node_mut(goal_id)
            .and_then(Node::as_goal_mut)
            .ok_or_else(|| BoardError::UnknownNode(goal_id.to_string()))?;
        let next = next_quarter(&goal.quarter).ok_or_else(|| BoardError::InvalidQuarter {
            id: goal_id.to_string(),
            quarter: goal.quarter.clone(),
        })?;

        goal.rolled_over_from = std::mem::replace(&mut goal.quarter, next.clone());
        goal.progress = 0;
        goal.check_ins.clear();
        goal.status = GoalStatus::Active;
        debug!(goal = goal_id, from = %goal.rolled_over_from, to = %next, "rolled over goal");
        Ok(next)
    }

    /// Record a progress check-in on a goal and make it the goal's current progress.
    ///
    /// Progress is capped at 100. Returns the check-in id.
    pub fn add_goal_check_in(
        &mut self,
        goal_id: &str,
        date: NaiveDate,
        progress: u32,
        notes: Option<String>,
    ) -> BoardResult<String> {
        self.expect_kind(goal_id, NodeKind::Goal)?;
        let goal = self
            .node_mut(goal_id)
            .and_then(Node::as_goal_mut)
            .ok_or_else(|| BoardError::UnknownNode(goal_id.to_string()))?;

        let progress = progress.min(100);
        let id = new_id();
        goal.check_ins.push(GoalCheckIn {
            id: id.clone(),
            date: day_key(date),
            progress,
            notes: notes.filter(|n| !n.trim().is_empty()),
        });
        goal.progress = progress;
        debug!(goal = goal_id, progress, "goal check-in");
        Ok(id)
    }

    /// Advance a chart to the next chart type; returns the new type
    pub fn cycle_chart_type(&mut self, chart_id: &str) -> BoardResult<ChartType> {
        self.expect_kind(chart_id, NodeKind::Chart)?;
        let chart = self
            .node_mut(chart_id)
            .and_then(Node::as_chart_mut)
            .ok_or_else(|| BoardError::UnknownNode(chart_id.to_string()))?;
        chart.chart_type = chart.chart_type.next();
        Ok(chart.chart_type)
    }
}
