// ============================================================================
// Command scripts: one UI event per line, replayed against an EditorSession
// ============================================================================
//
//   viewport 400 100     # widget size used for the following pointer events
//   paint on
//   brush 6
//   press 120 40
//   move 130 42
//   release 130 42
//   click 10 10          # press + release
//   sample 3 4           # pick by image coordinates
//   pixel 3 4            # paint one pixel
//   undo
//   save out/edited.png
//
// Keywords are case-insensitive. `#` at the start of a line or after
// whitespace starts a comment.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use crate::log_warn;
use crate::session::{EditorSession, Notification};
use crate::viewport::ViewportSize;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Viewport(ViewportSize),
    Press(f64, f64),
    Move(f64, f64),
    Release(f64, f64),
    Click(f64, f64),
    Sample(i64, i64),
    Pixel(i64, i64),
    Brush(u32),
    Radius(u32),
    /// `None` toggles.
    Paint(Option<bool>),
    Undo,
    Redo,
    /// `None` writes next to the opened image.
    Save(Option<PathBuf>),
    Open(PathBuf),
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    UnknownCommand(String),
    MissingArgument { command: &'static str, expected: &'static str },
    InvalidArgument { command: &'static str, value: String },
    TrailingInput { command: &'static str, rest: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownCommand(word) => write!(f, "unknown command '{}'", word),
            ParseError::MissingArgument { command, expected } => {
                write!(f, "'{}' expects {}", command, expected)
            }
            ParseError::InvalidArgument { command, value } => {
                write!(f, "'{}': invalid argument '{}'", command, value)
            }
            ParseError::TrailingInput { command, rest } => {
                write!(f, "'{}': unexpected '{}'", command, rest)
            }
        }
    }
}

impl std::error::Error for ParseError {}

// ============================================================================
// PARSING
// ============================================================================

/// Parse one script line. Blank and comment-only lines give `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseError> {
    let line = strip_comment(line).trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let mut args = Args { command: "", rest };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "viewport" => {
            args.command = "viewport";
            let (w, h): (i32, i32) = args.pair("WIDTH HEIGHT")?;
            if w <= 0 || h <= 0 {
                return Err(args.invalid(format!("{} {}", w, h)));
            }
            Command::Viewport(ViewportSize::new(w, h))
        }
        "press" => {
            args.command = "press";
            let (x, y) = args.pair("X Y")?;
            Command::Press(x, y)
        }
        "move" => {
            args.command = "move";
            let (x, y) = args.pair("X Y")?;
            Command::Move(x, y)
        }
        "release" => {
            args.command = "release";
            let (x, y) = args.pair("X Y")?;
            Command::Release(x, y)
        }
        "click" => {
            args.command = "click";
            let (x, y) = args.pair("X Y")?;
            Command::Click(x, y)
        }
        "sample" => {
            args.command = "sample";
            let (x, y) = args.pair("X Y")?;
            Command::Sample(x, y)
        }
        "pixel" => {
            args.command = "pixel";
            let (x, y) = args.pair("X Y")?;
            Command::Pixel(x, y)
        }
        "brush" => {
            args.command = "brush";
            Command::Brush(args.single("SIZE")?)
        }
        "radius" => {
            args.command = "radius";
            Command::Radius(args.single("RADIUS")?)
        }
        "paint" => {
            args.command = "paint";
            match args.rest.to_ascii_lowercase().as_str() {
                "" | "toggle" => Command::Paint(None),
                "on" | "true" | "1" => Command::Paint(Some(true)),
                "off" | "false" | "0" => Command::Paint(Some(false)),
                other => return Err(args.invalid(other.to_string())),
            }
        }
        "undo" => {
            args.command = "undo";
            args.none()?;
            Command::Undo
        }
        "redo" => {
            args.command = "redo";
            args.none()?;
            Command::Redo
        }
        "info" => {
            args.command = "info";
            args.none()?;
            Command::Info
        }
        "save" => Command::Save((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "open" => {
            if rest.is_empty() {
                return Err(ParseError::MissingArgument { command: "open", expected: "PATH" });
            }
            Command::Open(PathBuf::from(rest))
        }
        _ => return Err(ParseError::UnknownCommand(word.to_string())),
    };
    Ok(Some(cmd))
}

fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'#' && i > 0 && bytes[i - 1].is_ascii_whitespace() {
            return &line[..i];
        }
    }
    line
}

struct Args<'a> {
    command: &'static str,
    rest: &'a str,
}

impl Args<'_> {
    fn invalid(&self, value: String) -> ParseError {
        ParseError::InvalidArgument { command: self.command, value }
    }

    fn number<T: std::str::FromStr>(&self, tok: Option<&str>, expected: &'static str) -> Result<T, ParseError> {
        let tok = tok.ok_or(ParseError::MissingArgument { command: self.command, expected })?;
        tok.parse().map_err(|_| self.invalid(tok.to_string()))
    }

    fn pair<A: std::str::FromStr, B: std::str::FromStr>(
        &self,
        expected: &'static str,
    ) -> Result<(A, B), ParseError> {
        let mut toks = self.rest.split_whitespace();
        let a = self.number(toks.next(), expected)?;
        let b = self.number(toks.next(), expected)?;
        self.finish(toks)?;
        Ok((a, b))
    }

    fn single<T: std::str::FromStr>(&self, expected: &'static str) -> Result<T, ParseError> {
        let mut toks = self.rest.split_whitespace();
        let v = self.number(toks.next(), expected)?;
        self.finish(toks)?;
        Ok(v)
    }

    fn none(&self) -> Result<(), ParseError> {
        self.finish(self.rest.split_whitespace())
    }

    fn finish<'t>(&self, toks: impl Iterator<Item = &'t str>) -> Result<(), ParseError> {
        let extra: Vec<&str> = toks.collect();
        if extra.is_empty() {
            Ok(())
        } else {
            Err(ParseError::TrailingInput { command: self.command, rest: extra.join(" ") })
        }
    }
}

// ============================================================================
// EXECUTION
// ============================================================================

/// Dispatch one command as the matching UI event. `viewport` is the current
/// widget size; `viewport` commands update it.
pub fn execute(
    session: &mut EditorSession,
    viewport: &mut ViewportSize,
    command: Command,
) -> Vec<Notification> {
    match command {
        Command::Viewport(size) => {
            *viewport = size;
            Vec::new()
        }
        Command::Press(x, y) => session.on_pointer_press(x, y, *viewport),
        Command::Move(x, y) => session.on_pointer_move(x, y, *viewport),
        Command::Release(x, y) => session.on_pointer_release(x, y),
        Command::Click(x, y) => {
            let mut notes = session.on_pointer_press(x, y, *viewport);
            notes.extend(session.on_pointer_release(x, y));
            notes
        }
        Command::Sample(x, y) => session.on_sample_color_at(x, y),
        Command::Pixel(x, y) => session.on_paint_pixel(x, y),
        Command::Brush(size) => {
            session.set_brush_size(size);
            vec![Notification::Status(format!("Brush radius: {}", session.brush().radius()))]
        }
        Command::Radius(radius) => {
            session.set_brush_radius(radius);
            vec![Notification::Status(format!("Brush radius: {}", session.brush().radius()))]
        }
        Command::Paint(None) => session.on_toggle_paint_mode(),
        Command::Paint(Some(on)) => {
            if session.paint_mode() != on {
                session.on_toggle_paint_mode()
            } else {
                Vec::new()
            }
        }
        Command::Undo => session.on_undo(),
        Command::Redo => session.on_redo(),
        Command::Save(path) => {
            let result = match path {
                Some(p) => session.save_as(&p).map(|_| p),
                None => session.save(),
            };
            match result {
                Ok(p) => vec![Notification::Status(format!("Image saved successfully: {}", p.display()))],
                Err(e) => vec![Notification::Status(e.to_string())],
            }
        }
        Command::Open(path) => match session.replace_image(&path) {
            Ok(()) => vec![
                Notification::BufferChanged { region: None },
                Notification::Status(format!("Opened {}", path.display())),
            ],
            Err(e) => vec![Notification::Status(e.to_string())],
        },
        Command::Info => vec![Notification::Status(describe(session))],
    }
}

fn describe(session: &EditorSession) -> String {
    let buf = session.buffer();
    let history = session.history();
    format!(
        "{}x{} ({} ch) | color {} {} | brush {} px (radius {}) | paint {} | undo {} redo {} ({} KB){}",
        buf.width(),
        buf.height(),
        buf.channels(),
        session.selected_color(),
        session.selected_color().hex(),
        session.brush().footprint(),
        session.brush().radius(),
        if session.paint_mode() { "on" } else { "off" },
        history.undo_count(),
        history.redo_count(),
        history.memory_usage() / 1024,
        if session.is_dirty() { " | modified" } else { "" },
    )
}

/// Outcome of a whole script.
#[derive(Debug, Default)]
pub struct ScriptReport {
    pub executed: usize,
    /// 1-based line number and what was wrong with it.
    pub errors: Vec<(usize, ParseError)>,
}

impl ScriptReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run every line of `source`, writing each notification to `out`.
/// Malformed lines are skipped and collected; they never stop the script.
pub fn run_script<W: Write>(
    session: &mut EditorSession,
    viewport: &mut ViewportSize,
    source: &str,
    out: &mut W,
) -> std::io::Result<ScriptReport> {
    let mut report = ScriptReport::default();
    for (idx, line) in source.lines().enumerate() {
        match parse_line(line) {
            Ok(None) => {}
            Ok(Some(cmd)) => {
                for note in execute(session, viewport, cmd) {
                    writeln!(out, "{}", note)?;
                }
                report.executed += 1;
            }
            Err(e) => {
                log_warn!("script line {}: {}", idx + 1, e);
                report.errors.push((idx + 1, e));
            }
        }
    }
    Ok(report)
}
