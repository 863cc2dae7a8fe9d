//! Node search
//!
//! Case-insensitive substring search over a title and a short preview derived per node
//! kind. Results keep board order and are capped at [`MAX_RESULTS`].

use serde::Serialize;

use crate::model::{BudgetEntryType, Node, NodeKind, NodeProps};

/// Most results a search returns
pub const MAX_RESULTS: usize = 20;

/// Characters of free text kept in a preview
const PREVIEW_CHARS: usize = 100;

/// One matching node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub kind: NodeKind,
    pub title: String,
    pub preview: String,
    pub x: f64,
    pub y: f64,
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Group digits in threes: 1234567 -> "1,234,567"
fn grouped(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Short secondary line describing a node
pub fn preview(node: &Node) -> String {
    match &node.props {
        NodeProps::Text(p) => truncate(&p.text, PREVIEW_CHARS),
        NodeProps::Goal(p) => truncate(&p.description, PREVIEW_CHARS),
        NodeProps::Habit(p) => {
            let done = p.check_ins.iter().filter(|c| c.completed).count();
            format!("{done} completions")
        }
        NodeProps::Task(p) if p.description.is_empty() => {
            let state = if p.completed { "Completed" } else { "Pending" };
            state.to_string()
        }
        NodeProps::Task(p) => truncate(&p.description, PREVIEW_CHARS),
        NodeProps::Video(p) if p.status.is_empty() => "No video".to_string(),
        NodeProps::Video(p) => p.status.clone(),
        NodeProps::Budget(p) => {
            let sign = match p.entry_type {
                BudgetEntryType::Income => '+',
                BudgetEntryType::Expense => '-',
            };
            format!("{sign}${}", p.amount)
        }
        NodeProps::Learning(p) if p.resource_type.is_empty() => "Resource".to_string(),
        NodeProps::Learning(p) => p.resource_type.clone(),
        NodeProps::ContentIdea(p) => format!("{} - {}", p.platform, p.status),
        NodeProps::Chart(p) => p.chart_type.as_str().to_string(),
        NodeProps::CalendarEvent(p) if p.start_date.is_empty() => "No date".to_string(),
        NodeProps::CalendarEvent(p) => p.start_date.clone(),
        NodeProps::FollowerCount(p) => format!("{} followers", grouped(p.current_count)),
    }
}

/// Search `nodes` for `query`, optionally restricted to one kind.
///
/// An empty query matches every node of the requested kind.
pub fn search(nodes: &[Node], query: &str, kind: Option<NodeKind>) -> Vec<SearchResult> {
    let needle = query.trim().to_lowercase();

    nodes
        .iter()
        .filter(|n| kind.is_none_or(|k| n.kind() == k))
        .filter_map(|n| {
            let title = n.display_title();
            let preview = preview(n);
            let matches = needle.is_empty()
                || title.to_lowercase().contains(&needle)
                || preview.to_lowercase().contains(&needle);
            matches.then(|| SearchResult {
                id: n.id.clone(),
                kind: n.kind(),
                title,
                preview,
                x: n.x,
                y: n.y,
            })
        })
        .take(MAX_RESULTS)
        .collect()
}
