//! Development server
//!
//! Serves the generated dashboard, rebuilds it whenever the board file changes and
//! reloads connected browsers.

use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::Router;
use notify::{Event, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_livereload::LiveReloadLayer;
use tracing::{error, info};

use crate::html_writer::HtmlWriter;
use crate::io::{FormatRegistry, ReportWriter};
use crate::settings::ReportSettings;
use crate::snapshot::BoardSnapshot;

/// Load the board and write the dashboard and stats into `output`
pub fn regenerate(board: &Path, output: &Path, settings: &ReportSettings) -> anyhow::Result<()> {
    let registry = FormatRegistry::with_defaults();
    let board = registry
        .load_board(board)
        .with_context(|| format!("failed to load board {}", board.display()))?;

    let snapshot = BoardSnapshot::compute(&board, settings.today());

    HtmlWriter::with_settings(settings)
        .write(&snapshot, output)
        .context("failed to write dashboard")?;
    registry
        .report_writer_for_format("stats-json")
        .context("stats writer not registered")?
        .write(&snapshot, output)
        .context("failed to write stats")?;
    Ok(())
}

/// Start the development server with live reload
pub async fn serve(
    board: &Path,
    output: &Path,
    port: u16,
    settings: ReportSettings,
) -> anyhow::Result<()> {
    regenerate(board, output, &settings)?;
    info!(output = %output.display(), "generated dashboard");

    let (tx, mut rx) = mpsc::channel::<()>(1);

    let board_name = board.file_name().map(|n| n.to_os_string());
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            let touches_board = event
                .paths
                .iter()
                .any(|p| p.file_name().map(|n| n.to_os_string()) == board_name);
            if touches_board && (event.kind.is_modify() || event.kind.is_create()) {
                let _ = tx.blocking_send(());
            }
        }
    })?;

    // Editors often replace the file, so watch its directory
    let watch_path = board
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;

    let board_path = board.to_path_buf();
    let output_path = output.to_path_buf();
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            // Debounce bursts of write events
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            while rx.try_recv().is_ok() {}

            match regenerate(&board_path, &output_path, &settings) {
                Ok(()) => info!("regenerated dashboard"),
                Err(e) => error!("error regenerating: {e:#}"),
            }
        }
    });

    let livereload = LiveReloadLayer::new();
    let reloader = livereload.reloader();

    let mut output_watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() {
                reloader.reload();
            }
        }
    })?;
    output_watcher.watch(output, RecursiveMode::Recursive)?;

    let app = Router::new()
        .fallback_service(ServeDir::new(output))
        .layer(livereload);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("dashboard running at http://localhost:{port}");
    info!(board = %board.display(), "watching for changes, press Ctrl+C to stop");

    // Watchers stop when dropped
    let _watcher = watcher;
    let _output_watcher = output_watcher;

    axum::serve(listener, app).await?;

    Ok(())
}
