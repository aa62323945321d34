// ============================================================================
// TilePaint CLI — headless gesture-script replay
// ============================================================================
//
// Usage examples:
//   TilePaint --input sprite.png --script outline.txt --output result.png
//   TilePaint --new 32 --script smiley.txt --output smiley.png
//   TilePaint -i "tiles/*.png" --script recolor.txt --output-dir out/
//   TilePaint --recent --script touchup.txt
//
// No window is opened. Every input runs through a fresh editing session on
// the current thread; the script's events are replayed exactly as pointer
// and keyboard input would be.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::events::EditorEvent;
use crate::notice::{Notice, Severity};
use crate::ops::scripting::parse_script;
use crate::project::EditorSession;
use crate::settings::AppSettings;
use crate::shell::{FileHandler, UnsavedChoice};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// TilePaint headless pixel editor.
///
/// Replay recorded gestures (paint, fill, select, copy/paste, undo, …)
/// against PNG files without opening the editor window.
#[derive(Parser, Debug)]
#[command(
    name = "TilePaint",
    about = "TilePaint headless gesture replay",
    long_about = "Replay a gesture script against PNG files and save the result with\n\
                  embedded editor metadata.\n\n\
                  Example:\n  \
                  TilePaint --input sprite.png --script outline.txt --output out.png\n  \
                  TilePaint --new 32 --script smiley.txt --output smiley.png"
)]
pub struct CliArgs {
    /// Input PNG file(s). Glob patterns accepted (e.g. "*.png", "tiles/*.png").
    #[arg(short, long, num_args = 1..)]
    pub input: Vec<String>,

    /// Start from an empty canvas of this side length instead of a file.
    #[arg(long, value_name = "SIZE", conflicts_with_all = ["input", "recent"])]
    pub new: Option<u32>,

    /// Use the most recently opened or saved file as input.
    #[arg(long, conflicts_with = "input")]
    pub recent: bool,

    /// Gesture script to replay (one event per line).
    /// If omitted, inputs are only loaded and re-saved.
    #[arg(short, long, value_name = "SCRIPT.txt")]
    pub script: Option<PathBuf>,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing; files keep their stem.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Grid spacing applied before the script runs.
    #[arg(long, value_name = "PX")]
    pub grid: Option<u32>,

    /// Print every status notice and per-file timing.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Where a session's pixels come from.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Source {
    Blank(u32),
    File(PathBuf),
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs, settings: &mut AppSettings) -> ExitCode {
    let sources: Vec<Source> = if let Some(size) = args.new {
        vec![Source::Blank(size)]
    } else if args.recent {
        match &settings.last_file {
            Some(path) => vec![Source::File(path.clone())],
            None => {
                eprintln!("error: no recent file remembered.");
                return ExitCode::FAILURE;
            }
        }
    } else {
        resolve_inputs(&args.input).into_iter().map(Source::File).collect()
    };
    if sources.is_empty() {
        eprintln!("error: no input files matched (use --input, --new or --recent).");
        return ExitCode::FAILURE;
    }

    if sources.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            sources.len()
        );
        return ExitCode::FAILURE;
    }

    let events = match &args.script {
        Some(path) => match load_script(path) {
            Ok(events) => events,
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Vec::new(),
    };

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("error: could not create output directory '{}': {}", dir.display(), e);
        return ExitCode::FAILURE;
    }

    let total = sources.len();
    let multi = total > 1;
    let mut any_failure = false;
    let mut shell = FileHandler::headless(UnsavedChoice::DiscardAndOpen);

    for (idx, source) in sources.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, describe(source));
        }
        let file_start = Instant::now();

        let Some(output_path) = build_output_path(source, args.output.as_deref(), args.output_dir.as_deref())
        else {
            eprintln!("  error: cannot determine output path for {}.", describe(source));
            any_failure = true;
            continue;
        };

        let mut session = EditorSession::from_settings(settings);
        let result = run_one(&mut session, &mut shell, source, &output_path, &events, args.grid, args.verbose);
        // Remember (or forget) the recent file exactly as the session did.
        settings.last_file = session.recent_file.clone();

        match result {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if let Err(e) = settings.save() {
        log::warn!("settings not saved: {}", e);
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

fn run_one(
    session: &mut EditorSession,
    shell: &mut FileHandler,
    source: &Source,
    output: &Path,
    events: &[EditorEvent],
    grid: Option<u32>,
    verbose: bool,
) -> Result<(), String> {
    // -- Step 1: Load ----------------------------------------------------
    match source {
        Source::Blank(size) => {
            session.resize_canvas(*size);
            session.mark_clean();
        }
        Source::File(path) => match session.open(shell, Some(path)) {
            Notice::Opened { .. } => {}
            other => return Err(format!("load failed: {}", other)),
        },
    }
    if let Some(spacing) = grid {
        session.set_grid_spacing(spacing);
    }

    // -- Step 2: Replay --------------------------------------------------
    for event in events {
        let dispatch = session.handle_event(*event);
        if verbose
            && let Some(notice) = &dispatch.notice
        {
            println!("  [{:?}] {}", notice.severity(), notice);
        }
    }
    // A block still floating at the end of the script stays where it is.
    if session.canvas.floating.is_some() {
        session.finalize_floating();
    }

    // -- Step 3: Save ----------------------------------------------------
    session.path = Some(output.to_path_buf());
    match session.save(shell, false) {
        Notice::Saved { .. } => Ok(()),
        other if other.severity() == Severity::Error => Err(other.to_string()),
        other => Err(format!("save did not complete: {}", other)),
    }
}

fn load_script(path: &Path) -> Result<Vec<EditorEvent>, String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read script '{}': {}", path.display(), e))?;
    parse_script(&source).map_err(|e| format!("{}: {}", path.display(), e))
}

// ============================================================================
// Helpers
// ============================================================================

fn describe(source: &Source) -> String {
    match source {
        Source::Blank(size) => format!("new {}×{} canvas", size, size),
        Source::File(path) => path.display().to_string(),
    }
}

/// Input files in argument order, each listed once. An argument naming an
/// existing file is taken as-is; anything else is treated as a glob.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut inputs: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let matched = expand_pattern(pattern);
        if matched.is_empty() {
            eprintln!("warning: '{}' matched no files.", pattern);
        }
        for path in matched {
            if !inputs.contains(&path) {
                inputs.push(path);
            }
        }
    }
    inputs
}

fn expand_pattern(pattern: &str) -> Vec<PathBuf> {
    let literal = Path::new(pattern);
    if literal.is_file() {
        return vec![literal.to_path_buf()];
    }
    match glob::glob(pattern) {
        Ok(paths) => paths.filter_map(Result::ok).filter(|p| p.is_file()).collect(),
        Err(e) => {
            log::warn!("invalid glob '{}': {}", pattern, e);
            Vec::new()
        }
    }
}

/// Compute the output path for a single source.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (batch directory, derives filename from input stem)
/// 3. Fallback: next to the input with an `_out` suffix; `untitled.png`
///    in the working directory for a blank canvas
fn build_output_path(source: &Source, output: Option<&Path>, output_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let stem = match source {
        Source::Blank(_) => "untitled".to_string(),
        Source::File(input) => input.file_stem()?.to_string_lossy().into_owned(),
    };

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.png", stem)));
    }

    match source {
        Source::Blank(_) => Some(PathBuf::from(format!("{}.png", stem))),
        Source::File(input) => {
            let parent = input.parent().unwrap_or(Path::new("."));
            Some(parent.join(format!("{}_out.png", stem)))
        }
    }
}
