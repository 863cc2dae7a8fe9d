//! lifecanvas - derived statistics, connector geometry and board commands for a
//! life-organization canvas.
//!
//! A board is a set of typed nodes (goals, tasks, habits, charts, ...) joined by connectors.
//! This crate computes everything that is derived from that graph: goal progress from
//! connected tasks, chart series from connected habits or tasks, habit streaks and rates,
//! and the line segments connectors are drawn along. Boards are read from and written to
//! JSON or YAML, and can be rendered to a static HTML dashboard.

pub mod board;
pub mod board_reader;
pub mod board_writer;
pub mod geometry;
pub mod graph;
pub mod html_writer;
pub mod io;
pub mod metrics;
pub mod model;
pub mod search;
pub mod server;
pub mod settings;
pub mod snapshot;
pub mod stats_writer;
pub mod streak;
