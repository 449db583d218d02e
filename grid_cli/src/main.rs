//! # Baygrid CLI Application
//!
//! Inspect and edit a grid snapshot from the terminal.
//!
//! ```text
//! baygrid-cli show
//! baygrid-cli grow cols 2
//! baygrid-cli set beam beam1A --depth 650
//! baygrid-cli insert beamAA 150
//! baygrid-cli load column --width 400 --height 400
//! ```
//!
//! Editing commands take the snapshot's file lock, apply the change through
//! an [`EditSession`] that saves on commit, then print the load schedule
//! (or the snapshot JSON with `--json`).

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grid_core::config::EditorConfig;
use grid_core::errors::{GridError, GridResult};
use grid_core::file_io::{load_or_default, FileLock, SnapshotFileStore};
use grid_core::loads::{load_breakdown, load_schedule};
use grid_core::members::{DimensionPatch, MemberDimensions, MemberKind};
use grid_core::session::{EditSession, NullSink, SnapshotSink};
use grid_core::snapshot::GridSnapshot;

#[derive(Debug, Parser)]
#[command(name = "baygrid-cli", about = "Inspect and edit Baygrid grid snapshots", version)]
pub struct Cli {
    /// Snapshot file (default: $BAYGRID_SNAPSHOT, then baygrid.json)
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the load schedule of the snapshot.
    Show,

    /// Add row or column lines (at most 100 per command).
    Grow {
        axis: Axis,
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=100))]
        count: u32,
    },

    /// Remove row or column lines from the far edge (at most 100 per command).
    Shrink {
        axis: Axis,
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=100))]
        count: u32,
    },

    /// Change the dimensions of one member.
    Set {
        kind: MemberKind,
        /// `2B`, `1A-2B` or `beam1A`
        key: String,
        #[command(flatten)]
        dims: DimensionArgs,
    },

    /// Place a column on a beam, DISTANCE_MM along it.
    Insert {
        beam_id: String,
        #[arg(allow_negative_numbers = true)]
        distance_mm: f64,
    },

    /// Estimate the load of a member without touching any snapshot.
    Load {
        kind: MemberKind,
        #[command(flatten)]
        dims: DimensionArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Axis {
    Rows,
    Cols,
}

#[derive(Debug, Clone, Default, Args)]
#[group(required = true, multiple = true)]
struct DimensionArgs {
    /// Width in mm
    #[arg(long)]
    width: Option<f64>,
    /// Height in mm
    #[arg(long)]
    height: Option<f64>,
    /// Depth in mm (beams)
    #[arg(long)]
    depth: Option<f64>,
    /// Breadth in mm (beams)
    #[arg(long)]
    breadth: Option<f64>,
    /// Rotation in degrees (columns)
    #[arg(long, allow_negative_numbers = true)]
    rotation: Option<f64>,
}

impl DimensionArgs {
    fn patch(&self) -> DimensionPatch {
        DimensionPatch {
            width: self.width,
            height: self.height,
            depth: self.depth,
            breadth: self.breadth,
            rotation: self.rotation,
        }
    }
}

fn main() -> ExitCode {
    let config = EditorConfig::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(&cli, &config) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            if let Ok(json) = serde_json::to_string(&err) {
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

/// Execute one command and return what to print
fn run(cli: &Cli, config: &EditorConfig) -> GridResult<String> {
    let path = cli.snapshot.clone().unwrap_or_else(|| config.snapshot_path.clone());

    match &cli.command {
        Commands::Show => {
            let snapshot = load_or_default(&path)?;
            if cli.json {
                to_json(&load_schedule(&snapshot))
            } else {
                Ok(schedule_table(&snapshot, &path))
            }
        }
        Commands::Load { kind, dims } => {
            let breakdown = load_breakdown(*kind, &MemberDimensions::from(&dims.patch()));
            if cli.json {
                to_json(&breakdown)
            } else {
                Ok(format!(
                    "{}: dead {:.2} kN, live {:.2} kN, factored {}\n",
                    kind.display_name(),
                    breakdown.dead_kn,
                    breakdown.live_kn,
                    breakdown.factored()
                ))
            }
        }
        Commands::Grow { axis, count } => edit(cli, config, &path, |session| {
            match axis {
                Axis::Rows => session.grow_rows(*count),
                Axis::Cols => session.grow_cols(*count),
            }
            Ok(())
        }),
        Commands::Shrink { axis, count } => edit(cli, config, &path, |session| {
            match axis {
                Axis::Rows => session.shrink_rows(*count),
                Axis::Cols => session.shrink_cols(*count),
            }
            Ok(())
        }),
        Commands::Set { kind, key, dims } => edit(cli, config, &path, |session| {
            session.on_dimension_changed(key, *kind, &dims.patch())
        }),
        Commands::Insert { beam_id, distance_mm } => edit(cli, config, &path, |session| {
            session.on_column_insert_requested(beam_id, *distance_mm).map(|_| ())
        }),
    }
}

/// Lock, load, apply `change` through a session that saves on commit, report
fn edit(
    cli: &Cli,
    config: &EditorConfig,
    path: &Path,
    change: impl FnOnce(&mut EditSession) -> GridResult<()>,
) -> GridResult<String> {
    let _lock = FileLock::acquire(path, config.user_id.clone())?;
    let snapshot = load_or_default(path)?;

    let sink: Box<dyn SnapshotSink> = if config.autosave {
        Box::new(SnapshotFileStore::new(path))
    } else {
        warn!("autosave is off, the change will not be written");
        Box::new(NullSink)
    };
    let mut session = EditSession::new(snapshot, sink);
    change(&mut session)?;
    session.flush()?;

    if cli.json {
        to_json(session.current())
    } else {
        Ok(schedule_table(session.current(), path))
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> GridResult<String> {
    serde_json::to_string_pretty(value)
        .map(|json| json + "\n")
        .map_err(|e| GridError::serialization(e.to_string()))
}

fn schedule_table(snapshot: &GridSnapshot, path: &Path) -> String {
    let schedule = load_schedule(snapshot);
    let mut out = String::new();

    let _ = writeln!(out, "Grid {} x {}  ({})", snapshot.rows, snapshot.cols, path.display());
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<10} {:<7} {:>10} {:>10} {:>12}",
        "Member", "Kind", "Dead kN", "Live kN", "Factored kN"
    );
    for entry in &schedule.entries {
        let _ = writeln!(
            out,
            "{:<10} {:<7} {:>10.2} {:>10.2} {:>12.2}",
            entry.element.to_string(),
            entry.element.kind().to_string(),
            entry.load.dead_kn,
            entry.load.live_kn,
            entry.load.factored_kn
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<10} {:>12.2} kN", "Panels", schedule.panel_total_kn);
    let _ = writeln!(out, "{:<10} {:>12.2} kN", "Beams", schedule.beam_total_kn);
    let _ = writeln!(out, "{:<10} {:>12.2} kN", "Columns", schedule.column_total_kn);
    let _ = writeln!(out, "{:<10} {:>12.2} kN", "Total", schedule.total_kn());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_core::addressing::{position_key, row_beam_key};
    use grid_core::file_io::load_snapshot;
    use tempfile::tempdir;

    fn config() -> EditorConfig {
        EditorConfig {
            user_id: "cli-test".to_string(),
            ..EditorConfig::default()
        }
    }

    fn cli(path: &Path, args: &[&str]) -> Cli {
        let mut argv = vec!["baygrid-cli", "--snapshot"];
        let path = path.to_str().unwrap();
        argv.push(path);
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        let parsed = Cli::try_parse_from(["baygrid-cli", "grow", "cols", "2", "--json"]).unwrap();
        assert!(parsed.json);
        assert!(matches!(parsed.command, Commands::Grow { axis: Axis::Cols, count: 2 }));

        let argv = ["baygrid-cli", "set", "slab", "1A-2B", "--width", "8000"];
        let parsed = Cli::try_parse_from(argv).unwrap();
        match parsed.command {
            Commands::Set { kind, key, dims } => {
                assert_eq!(kind, MemberKind::Panel);
                assert_eq!(key, "1A-2B");
                assert_eq!(dims.patch().width, Some(8000.0));
            }
            other => panic!("unexpected {:?}", other),
        }

        let parsed = Cli::try_parse_from(["baygrid-cli", "insert", "beam1A", "-5"]).unwrap();
        assert!(matches!(
            parsed.command,
            Commands::Insert { distance_mm, .. } if distance_mm == -5.0
        ));
    }

    #[test]
    fn test_resize_count_is_bounded() {
        for count in ["0", "101", "4000000000"] {
            assert!(
                Cli::try_parse_from(["baygrid-cli", "grow", "rows", count]).is_err(),
                "grow rows {} parsed",
                count
            );
            assert!(Cli::try_parse_from(["baygrid-cli", "shrink", "cols", count]).is_err());
        }
        let parsed = Cli::try_parse_from(["baygrid-cli", "grow", "rows", "100"]).unwrap();
        assert!(matches!(parsed.command, Commands::Grow { axis: Axis::Rows, count: 100 }));
    }

    #[test]
    fn test_set_requires_a_dimension() {
        assert!(Cli::try_parse_from(["baygrid-cli", "set", "column", "2B"]).is_err());
        let unknown_kind = ["baygrid-cli", "set", "girder", "2B", "--width", "1"];
        assert!(Cli::try_parse_from(unknown_kind).is_err());
    }

    #[test]
    fn test_load_command() {
        let argv = ["baygrid-cli", "load", "column", "--width", "300", "--height", "300"];
        let cli = Cli::try_parse_from(argv).unwrap();
        let out = run(&cli, &config()).unwrap();
        assert!(out.contains("factored 10.17 kN"), "{}", out);
    }

    #[test]
    fn test_show_default_grid() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("show.json");
        let out = run(&cli(&path, &["show"]), &config()).unwrap();
        assert!(out.starts_with("Grid 3 x 3"));
        assert!(out.contains("beam1A"));
        // show never creates the file
        assert!(!path.exists());
    }

    #[test]
    fn test_edits_are_saved() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("edits.json");

        run(&cli(&path, &["grow", "rows"]), &config()).unwrap();
        run(&cli(&path, &["set", "beam", "beam1A", "--depth", "650"]), &config()).unwrap();
        let json = run(&cli(&path, &["--json", "insert", "beam1A", "250"]), &config()).unwrap();
        assert!(json.contains("\"rows\": 4"));

        let saved = load_snapshot(&path).unwrap();
        assert_eq!(saved.rows, 4);
        assert_eq!(saved.beam_dimensions[&row_beam_key(1)].depth, 650.0);
        assert!(saved.column_dimensions.contains_key(&position_key(1, 2)));
    }

    #[test]
    fn test_rejected_edit_is_an_error() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("rejected.json");

        let set = cli(&path, &["set", "column", "9Z", "--width", "1"]);
        let err = run(&set, &config()).unwrap_err();
        assert!(matches!(err, GridError::OutOfRange { .. }));
        let err = run(&cli(&path, &["insert", "beam1A", "-5"]), &config()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DISTANCE");
        assert!(!path.exists());
    }
}
