use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const TODAY: &str = "2024-01-07";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Copy a fixture into a scratch directory so commands can write it back
fn scratch_board(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    fs::copy(fixture(name), &path).expect("Failed to copy fixture");
    (dir, path)
}

fn lifecanvas(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lifecanvas"))
        .args(args)
        .args(["--today", TODAY])
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute lifecanvas")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "lifecanvas failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn board_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path).expect("Failed to read board");
    serde_json::from_str(&text).expect("Board is not valid JSON")
}

fn node<'a>(board: &'a serde_json::Value, id: &str) -> &'a serde_json::Value {
    board["nodes"]
        .as_array()
        .and_then(|nodes| nodes.iter().find(|n| n["id"] == id))
        .unwrap_or_else(|| panic!("node {id} not found"))
}

// ========== Stats ==========

#[test]
fn stats_prints_text_summary() {
    let path = fixture("board.yaml");
    let out = stdout(&lifecanvas(&["stats", "--board", path.to_str().unwrap()]));

    assert!(out.starts_with("Q1 plan (2024-01-07)\n12 nodes, 7 connectors\n"));
    assert!(out.contains("  Ship the book: 33% (1/3 tasks, 1/2 milestones)"));
    assert!(out.contains("  Morning run: streak 3 (best 3), week 86%, month 20%"));
    assert!(out.contains("  Read 20 pages: streak 0 (best 1), week 29%, month 7%"));
    assert!(out.contains("  Book tasks [pie] 1 Goal → 3 Tasks: Done 1, Pending 2"));
    assert!(out.contains("  income 3000.00, expense 1200.50, net 1799.50"));
    assert!(out.contains("  instagram lifecanvas: 1150 (+150, 15.0%)"));
    assert!(out.contains("  c-stale: note -> removed-node"));
}

#[test]
fn stats_json_matches_for_both_formats() {
    let from_json = stdout(&lifecanvas(&[
        "stats",
        "--json",
        "--board",
        fixture("board.json").to_str().unwrap(),
    ]));
    let from_yaml = stdout(&lifecanvas(&[
        "stats",
        "--json",
        "--board",
        fixture("board.yaml").to_str().unwrap(),
    ]));
    assert_eq!(from_json, from_yaml);

    let stats: serde_json::Value = serde_json::from_str(&from_json).unwrap();
    assert_eq!(stats["today"], TODAY);
    assert_eq!(stats["nodeCount"], 12);
    assert_eq!(stats["kinds"]["task"], 3);

    let run = &stats["habits"][0];
    assert_eq!(run["name"], "Morning run");
    assert_eq!(run["currentStreak"], 3);
    assert_eq!(run["totalCompleted"], 6);
    assert_eq!(run["heatmap"].as_array().unwrap().len(), 28);

    let week = &stats["charts"][0];
    assert_eq!(week["chartId"], "chart-habits");
    assert_eq!(week["sourceLabel"], "2 Habits");
    let values: Vec<f64> = week["points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["value"].as_f64().unwrap())
        .collect();
    assert_eq!(values, vec![1.0, 2.0, 1.0, 0.0, 2.0, 1.0, 1.0]);
}

#[test]
fn stats_reports_missing_file() {
    let output = lifecanvas(&["stats", "--board", "does-not-exist.json"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load board"), "stderr: {stderr}");
}

// ========== Report ==========

#[test]
fn report_writes_dashboard_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("site");
    let settings = dir.path().join("settings.yaml");
    fs::write(&settings, "title: Winter focus\nheatmap: false\n").unwrap();

    stdout(&lifecanvas(&[
        "report",
        "--board",
        fixture("board.json").to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--settings",
        settings.to_str().unwrap(),
    ]));

    let html = fs::read_to_string(output.join("index.html")).unwrap();
    assert!(html.contains("<title>Winter focus</title>"));
    assert!(html.contains("Ship the book"));
    assert!(!html.contains("class=\"heatmap\""));

    let stats: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join("stats.json")).unwrap()).unwrap();
    assert_eq!(stats["title"], "Q1 plan");
    assert_eq!(stats["dangling"][0]["missing"][0], "removed-node");
}

#[test]
fn report_title_flag_overrides_settings() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("site");
    let settings = dir.path().join("settings.yaml");
    fs::write(&settings, "title: Winter focus\n").unwrap();

    stdout(&lifecanvas(&[
        "report",
        "--board",
        fixture("board.yaml").to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--settings",
        settings.to_str().unwrap(),
        "--title",
        "Spring review",
    ]));

    let html = fs::read_to_string(output.join("index.html")).unwrap();
    assert!(html.contains("<title>Spring review</title>"));
    assert!(!html.contains("Winter focus"));
}

#[test]
fn report_rejects_invalid_settings() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("settings.yaml");
    fs::write(&settings, "theme: dark\n").unwrap();

    let output = lifecanvas(&[
        "report",
        "--board",
        fixture("board.json").to_str().unwrap(),
        "--output",
        dir.path().join("site").to_str().unwrap(),
        "--settings",
        settings.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
}

// ========== Board commands ==========

#[test]
fn toggle_task_updates_connected_goal() {
    let (_dir, path) = scratch_board("board.json");
    let out = stdout(&lifecanvas(&[
        "toggle-task",
        "--board",
        path.to_str().unwrap(),
        "--id",
        "task-draft",
    ]));
    assert_eq!(out, "task-draft: done\ngoal-book: 67%\n");

    let board = board_json(&path);
    assert_eq!(node(&board, "task-draft")["completed"], true);
    assert_eq!(node(&board, "goal-book")["progress"], 67);
}

#[test]
fn toggle_task_rejects_non_task() {
    let (_dir, path) = scratch_board("board.json");
    let before = fs::read_to_string(&path).unwrap();

    let output = lifecanvas(&[
        "toggle-task",
        "--board",
        path.to_str().unwrap(),
        "--id",
        "habit-run",
    ]);
    assert!(!output.status.success());
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn check_in_toggles_and_keeps_yaml_format() {
    let (_dir, path) = scratch_board("board.yaml");
    let board = path.to_str().unwrap();

    let out = stdout(&lifecanvas(&[
        "check-in", "--board", board, "--id", "habit-read", "--date", "2024-01-06",
    ]));
    assert_eq!(out, "habit-read 2024-01-06: checked in\n");

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("kind: habit"), "board should stay YAML");

    let stats = stdout(&lifecanvas(&["stats", "--board", board]));
    assert!(stats.contains("  Read 20 pages: streak 2 (best 2), week 43%, month 10%"));

    let out = stdout(&lifecanvas(&[
        "check-in", "--board", board, "--id", "habit-read", "--date", "2024-01-06",
    ]));
    assert_eq!(out, "habit-read 2024-01-06: cleared\n");
}

#[test]
fn add_and_connect_nodes() {
    let (_dir, path) = scratch_board("board.json");
    let board = path.to_str().unwrap();

    let id = stdout(&lifecanvas(&[
        "add", "--board", board, "--kind", "task", "--x", "520", "--y", "860",
    ]));
    let id = id.trim().to_string();

    let saved = board_json(&path);
    let added = node(&saved, &id);
    assert_eq!(added["kind"], "task");
    assert_eq!(added["title"], "New Task");
    assert_eq!(added["x"], 400.0);
    assert_eq!(added["y"], 800.0);

    let connector = stdout(&lifecanvas(&[
        "connect",
        "--board",
        board,
        "--from",
        "goal-book",
        "--to",
        &id,
    ]));
    let connector = connector.trim();

    let saved = board_json(&path);
    let created = saved["connectors"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == connector)
        .unwrap();
    assert_eq!(created["fromAnchor"], "bottom");
    assert_eq!(created["toAnchor"], "top");
    assert_eq!(created["color"], "zinc");

    let stats = stdout(&lifecanvas(&["stats", "--board", board]));
    assert!(stats.contains("Ship the book: 33% (1/4 tasks"));
}

#[test]
fn disconnect_removes_connector_only() {
    let (_dir, path) = scratch_board("board.json");
    let board = path.to_str().unwrap();

    let out = stdout(&lifecanvas(&["disconnect", "--board", board, "--id", "c-draft"]));
    assert_eq!(out, "c-draft: removed\n");

    let saved = board_json(&path);
    let connectors = saved["connectors"].as_array().unwrap();
    assert_eq!(connectors.len(), 6);
    assert!(connectors.iter().all(|c| c["id"] != "c-draft"));
    assert_eq!(node(&saved, "task-draft")["kind"], "task");

    let output = lifecanvas(&["disconnect", "--board", board, "--id", "c-draft"]);
    assert!(!output.status.success());
}

#[test]
fn goal_check_in_and_rollover() {
    let (_dir, path) = scratch_board("board.yaml");
    let board = path.to_str().unwrap();

    let out = stdout(&lifecanvas(&[
        "goal-check-in",
        "--board",
        board,
        "--id",
        "goal-book",
        "--progress",
        "55",
        "--notes",
        "chapter two done",
    ]));
    assert_eq!(out, "goal-book 2024-01-07: 55%\n");

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("chapter two done"));
    assert!(text.contains("progress: 55"));

    let out = stdout(&lifecanvas(&["rollover-goal", "--board", board, "--id", "goal-book"]));
    assert_eq!(out, "goal-book: Q2 2024\n");

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("quarter: Q2 2024"));
    assert!(text.contains("rolledOverFrom: Q1 2024"));
    assert!(!text.contains("chapter two done"));

    let output = lifecanvas(&["rollover-goal", "--board", board, "--id", "task-draft"]);
    assert!(!output.status.success());
}

#[test]
fn connect_rejects_self_connection() {
    let (_dir, path) = scratch_board("board.json");
    let output = lifecanvas(&[
        "connect",
        "--board",
        path.to_str().unwrap(),
        "--from",
        "note",
        "--to",
        "note",
    ]);
    assert!(!output.status.success());
}

// ========== Search ==========

#[test]
fn search_filters_by_text_and_kind() {
    let path = fixture("board.yaml");
    let board = path.to_str().unwrap();

    let out = stdout(&lifecanvas(&["search", "--board", board, "--query", "DRAFT"]));
    assert_eq!(out, "task\ttask-draft\tWrite first draft\tPending\n");

    let out = stdout(&lifecanvas(&["search", "--board", board, "--kind", "habit"]));
    let ids: Vec<&str> = out.lines().filter_map(|l| l.split('\t').nth(1)).collect();
    assert_eq!(ids, vec!["habit-run", "habit-read"]);
}
