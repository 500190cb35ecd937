// ============================================================================
// PixelPicker CLI: headless editing session driven by a command script
// ============================================================================
//
// Usage examples:
//   PixelPicker photo.png --script edits.txt --save
//   PixelPicker photo.png --paint --brush-size 20 < strokes.txt
//   echo "click 500 400" | PixelPicker photo.png --viewport 1000x800
//
// Every script line is one UI event (see `commands`). Notifications are
// printed to stdout, malformed lines to stderr.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use crate::commands::{self, ScriptReport};
use crate::components::tools::{MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
use crate::session::EditorSession;
use crate::settings::EditorSettings;
use crate::viewport::ViewportSize;
use crate::{log_err, log_info, logger};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Pick colors from and paint on an image, one UI event per script line.
#[derive(Parser, Debug)]
#[command(
    name = "PixelPicker",
    about = "Headless pixel color picker and painter",
    long_about = "Open an image and replay pointer, brush, undo/redo and save events\n\
                  from a command script (or stdin) as if they came from the editor\n\
                  window.\n\n\
                  Example:\n  \
                  PixelPicker photo.png --script edits.txt --save"
)]
pub struct CliArgs {
    /// Image to open (PNG, JPEG, WEBP, BMP, TGA, ICO, TIFF).
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Command script. Read from stdin when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Widget size pointer coordinates refer to, e.g. 1000x800.
    #[arg(long, value_name = "WxH", value_parser = parse_viewport)]
    pub viewport: Option<ViewportSize>,

    /// Brush diameter control (1–50).
    #[arg(short, long, value_name = "1-50",
          value_parser = clap::value_parser!(u32).range(MIN_BRUSH_SIZE as i64..=MAX_BRUSH_SIZE as i64))]
    pub brush_size: Option<u32>,

    /// Start in paint mode instead of color picking.
    #[arg(short, long)]
    pub paint: bool,

    /// Settings file to use instead of the per-user one.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Save next to the image after the script finishes.
    #[arg(long)]
    pub save: bool,

    /// Write the effective settings (file plus flags) back to the settings
    /// file, or to --config when given.
    #[arg(long)]
    pub save_config: bool,

    /// Echo the session log to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// `WIDTHxHEIGHT`, both positive.
fn parse_viewport(s: &str) -> Result<ViewportSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w: i32 = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
    let h: i32 = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
    if w <= 0 || h <= 0 {
        return Err(format!("viewport must be positive, got {}x{}", w, h));
    }
    Ok(ViewportSize::new(w, h))
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the session and return an OS exit code.
/// `0` = image loaded, every script line parsed and the optional save worked.
pub fn run(args: CliArgs) -> ExitCode {
    if run_session(&args) { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn run_session(args: &CliArgs) -> bool {
    logger::set_echo(args.verbose);
    if args.verbose
        && let Some(path) = logger::log_path()
    {
        eprintln!("log: {}", path.display());
    }

    let settings = effective_settings(args);
    if args.save_config && !persist_settings(&settings, args.config.as_deref()) {
        return false;
    }
    let mut session = match EditorSession::open(&args.image, &settings) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            return false;
        }
    };

    let source = match read_script(args.script.as_deref()) {
        Ok(src) => src,
        Err(e) => {
            eprintln!("error: could not read script: {}", e);
            log_err!("could not read script: {}", e);
            return false;
        }
    };

    let mut viewport = settings.viewport;
    let stdout = io::stdout();
    let report = match commands::run_script(&mut session, &mut viewport, &source, &mut stdout.lock()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}", e);
            return false;
        }
    };
    print_errors(&report);

    let mut ok = report.is_clean();
    if args.save {
        match session.save() {
            Ok(path) => println!("saved: {}", path.display()),
            Err(e) => {
                eprintln!("error: {}", e);
                ok = false;
            }
        }
    }

    log_info!(
        "Session {} finished: {} commands, {} rejected",
        session.id(),
        report.executed,
        report.errors.len()
    );
    ok
}

/// Settings file (explicit or per-user) with command-line flags applied on top.
fn effective_settings(args: &CliArgs) -> EditorSettings {
    let mut settings = match &args.config {
        Some(path) => EditorSettings::load_from(path),
        None => EditorSettings::load(),
    };
    if let Some(size) = args.brush_size {
        settings.brush_size = size;
    }
    if args.paint {
        settings.paint_mode = true;
    }
    if let Some(vp) = args.viewport {
        settings.viewport = vp;
    }
    settings
}

/// Store `settings` at `explicit` or the per-user settings path.
fn persist_settings(settings: &EditorSettings, explicit: Option<&Path>) -> bool {
    let Some(path) = explicit.map(Path::to_path_buf).or_else(EditorSettings::settings_path) else {
        eprintln!("error: no settings location available");
        return false;
    };
    match settings.save_to(&path) {
        Ok(()) => {
            log_info!("Settings written to {}", path.display());
            true
        }
        Err(e) => {
            eprintln!("error: could not write settings '{}': {}", path.display(), e);
            log_err!("could not write settings {}: {}", path.display(), e);
            false
        }
    }
}

fn read_script(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p),
        None => {
            let mut src = String::new();
            io::stdin().read_to_string(&mut src)?;
            Ok(src)
        }
    }
}

fn print_errors(report: &ScriptReport) {
    for (line, e) in &report.errors {
        eprintln!("  line {}: {}", line, e);
    }
}
