use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lifecanvas::geometry::Point;
use lifecanvas::io::FormatRegistry;
use lifecanvas::model::{Anchor, Board, NodeKind};
use lifecanvas::search::search;
use lifecanvas::server;
use lifecanvas::settings::ReportSettings;
use lifecanvas::snapshot::BoardSnapshot;
use lifecanvas::stats_writer::StatsWriter;

/// Goals, tasks and habits on a canvas: derived stats, dashboards and board edits.
#[derive(Parser)]
#[command(name = "lifecanvas")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Date to compute statistics for (YYYY-MM-DD); defaults to the local date
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print derived statistics for a board
    Stats {
        /// Board file (.json, .yaml or .yml)
        #[arg(short, long)]
        board: PathBuf,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate the HTML dashboard and stats.json
    Report {
        #[arg(short, long)]
        board: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Report settings file (.yaml)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Dashboard title; overrides the settings file and the board name
        #[arg(long)]
        title: Option<String>,
    },
    /// Serve the dashboard and rebuild it when the board changes
    Serve {
        #[arg(short, long)]
        board: PathBuf,

        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Port to run the server on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        #[arg(short, long)]
        settings: Option<PathBuf>,

        #[arg(long)]
        title: Option<String>,
    },
    /// Add a node with its kind's default fields, centered on a point
    Add {
        #[arg(short, long)]
        board: PathBuf,

        /// Node kind, e.g. goal, task, habit, chart
        #[arg(short, long)]
        kind: NodeKind,

        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        #[arg(long, allow_hyphen_values = true)]
        y: f64,
    },
    /// Connect two nodes
    Connect {
        #[arg(short, long)]
        board: PathBuf,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Anchor on the source node; inferred from node positions when omitted
        #[arg(long, requires = "to_anchor")]
        from_anchor: Option<Anchor>,

        /// Anchor on the target node
        #[arg(long, requires = "from_anchor")]
        to_anchor: Option<Anchor>,
    },
    /// Remove a connector; the nodes it joined are kept
    Disconnect {
        #[arg(short, long)]
        board: PathBuf,

        /// Connector id
        #[arg(long)]
        id: String,
    },
    /// Flip a task's completion and update the progress of connected goals
    ToggleTask {
        #[arg(short, long)]
        board: PathBuf,

        /// Task node id
        #[arg(long)]
        id: String,
    },
    /// Toggle a habit's check-in for a day
    CheckIn {
        #[arg(short, long)]
        board: PathBuf,

        /// Habit node id
        #[arg(long)]
        id: String,

        /// Day to toggle; defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Carry a goal over into the next quarter
    RolloverGoal {
        #[arg(short, long)]
        board: PathBuf,

        /// Goal node id
        #[arg(long)]
        id: String,
    },
    /// Record a progress check-in on a goal
    GoalCheckIn {
        #[arg(short, long)]
        board: PathBuf,

        /// Goal node id
        #[arg(long)]
        id: String,

        /// Progress in percent; values above 100 are capped
        #[arg(long)]
        progress: u32,

        #[arg(long)]
        notes: Option<String>,

        /// Day of the check-in; defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Find nodes by text
    Search {
        #[arg(short, long)]
        board: PathBuf,

        /// Case-insensitive text to look for; empty matches every node
        #[arg(short, long, default_value = "")]
        query: String,

        /// Only return nodes of this kind
        #[arg(short, long)]
        kind: Option<NodeKind>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "lifecanvas=debug"
    } else {
        "lifecanvas=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(registry: &FormatRegistry, path: &Path) -> anyhow::Result<Board> {
    registry
        .load_board(path)
        .with_context(|| format!("failed to load board {}", path.display()))
}

fn save(registry: &FormatRegistry, board: &Board, path: &Path) -> anyhow::Result<()> {
    registry
        .save_board(board, path)
        .with_context(|| format!("failed to save board {}", path.display()))?;
    info!(path = %path.display(), "saved board");
    Ok(())
}

fn report_settings(
    path: Option<&Path>,
    title: Option<String>,
    today: Option<NaiveDate>,
) -> anyhow::Result<ReportSettings> {
    let settings = match path {
        Some(path) => ReportSettings::load(path)
            .with_context(|| format!("failed to load settings {}", path.display()))?,
        None => ReportSettings::default(),
    };
    Ok(settings.with_overrides(title, today))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = FormatRegistry::with_defaults();
    let today = report_settings(None, None, cli.today)?.today();

    match cli.command {
        Commands::Stats { board, json } => {
            let board = load(&registry, &board)?;
            let snapshot = BoardSnapshot::compute(&board, today);
            if json {
                println!("{}", StatsWriter::to_json(&snapshot)?);
            } else {
                print!("{}", snapshot.render_text());
            }
        }
        Commands::Report {
            board,
            output,
            settings,
            title,
        } => {
            let settings = report_settings(settings.as_deref(), title, cli.today)?;
            server::regenerate(&board, &output, &settings)?;
            println!("Generated dashboard in {}", output.display());
        }
        Commands::Serve {
            board,
            output,
            port,
            settings,
            title,
        } => {
            let settings = report_settings(settings.as_deref(), title, cli.today)?;
            server::serve(&board, &output, port, settings).await?;
        }
        Commands::Add { board: path, kind, x, y } => {
            let mut board = load(&registry, &path)?;
            let id = board.add_node(kind, Point::new(x, y), today)?;
            save(&registry, &board, &path)?;
            println!("{id}");
        }
        Commands::Connect {
            board: path,
            from,
            to,
            from_anchor,
            to_anchor,
        } => {
            let mut board = load(&registry, &path)?;
            let anchors = from_anchor.zip(to_anchor);
            let id = board.connect(&from, &to, anchors)?;
            save(&registry, &board, &path)?;
            println!("{id}");
        }
        Commands::Disconnect { board: path, id } => {
            let mut board = load(&registry, &path)?;
            board.delete_connector(&id)?;
            save(&registry, &board, &path)?;
            println!("{id}: removed");
        }
        Commands::ToggleTask { board: path, id } => {
            let mut board = load(&registry, &path)?;
            let toggle = board.toggle_task(&id)?;
            save(&registry, &board, &path)?;
            let state = if toggle.completed { "done" } else { "pending" };
            println!("{id}: {state}");
            for update in &toggle.updates {
                println!("{}: {}%", update.goal_id, update.progress);
            }
        }
        Commands::CheckIn {
            board: path,
            id,
            date,
        } => {
            let mut board = load(&registry, &path)?;
            let date = date.unwrap_or(today);
            let completed = board.toggle_check_in(&id, date)?;
            save(&registry, &board, &path)?;
            let state = if completed { "checked in" } else { "cleared" };
            println!("{id} {date}: {state}");
        }
        Commands::RolloverGoal { board: path, id } => {
            let mut board = load(&registry, &path)?;
            let quarter = board.rollover_goal(&id)?;
            save(&registry, &board, &path)?;
            println!("{id}: {quarter}");
        }
        Commands::GoalCheckIn {
            board: path,
            id,
            progress,
            notes,
            date,
        } => {
            let mut board = load(&registry, &path)?;
            let date = date.unwrap_or(today);
            board.add_goal_check_in(&id, date, progress, notes)?;
            save(&registry, &board, &path)?;
            println!("{id} {date}: {}%", progress.min(100));
        }
        Commands::Search { board, query, kind } => {
            let board = load(&registry, &board)?;
            for hit in search(&board.nodes, &query, kind) {
                println!("{}\t{}\t{}\t{}", hit.kind, hit.id, hit.title, hit.preview);
            }
        }
    }

    Ok(())
}
