use std::fmt;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::canvas::{PixelBuffer, PixelError};
use crate::components::colors::Rgb;
use crate::components::history::HistoryManager;
use crate::components::tools::{self, BrushSettings, DirtyRect};
use crate::io::{self, ImageIoError};
use crate::settings::EditorSettings;
use crate::viewport::{self, MapError, ViewportSize};
use crate::{log_err, log_info, log_warn};

// ============================================================================
// EVENTS OUT / ERRORS
// ============================================================================

/// What the host has to react to after an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// Re-render. `region` is the touched area, `None` for the whole image.
    BufferChanged { region: Option<DirtyRect> },
    /// The selected color changed; `label` is the text for the color label.
    ColorChanged { color: Rgb, label: String },
    /// Feedback line for the status/label area.
    Status(String),
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::BufferChanged { region: Some(r) } => write!(
                f,
                "changed ({}, {})..=({}, {})",
                r.min_x, r.min_y, r.max_x, r.max_y
            ),
            Notification::BufferChanged { region: None } => write!(f, "changed (whole image)"),
            Notification::ColorChanged { color, label } => write!(f, "{} {}", label, color.hex()),
            Notification::Status(msg) => write!(f, "{}", msg),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryDirection {
    Undo,
    Redo,
}

#[derive(Debug)]
pub enum EditorError {
    Map(MapError),
    Pixel(PixelError),
    EmptyHistory(HistoryDirection),
    /// The buffer was not loaded from a file, so there is no directory to save into.
    NoImagePath,
    Io(ImageIoError),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::Map(MapError::OutOfBounds { .. }) => write!(f, "Out of bounds"),
            EditorError::Map(e) => write!(f, "{}", e),
            EditorError::Pixel(e) => write!(f, "{}", e),
            EditorError::EmptyHistory(HistoryDirection::Undo) => write!(f, "Undo stack is empty."),
            EditorError::EmptyHistory(HistoryDirection::Redo) => write!(f, "Redo stack is empty."),
            EditorError::NoImagePath => write!(f, "No image loaded to save."),
            EditorError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EditorError::Map(e) => Some(e),
            EditorError::Pixel(e) => Some(e),
            EditorError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MapError> for EditorError {
    fn from(e: MapError) -> Self {
        EditorError::Map(e)
    }
}

impl From<PixelError> for EditorError {
    fn from(e: PixelError) -> Self {
        EditorError::Pixel(e)
    }
}

impl From<ImageIoError> for EditorError {
    fn from(e: ImageIoError) -> Self {
        EditorError::Io(e)
    }
}

// ============================================================================
// EDITOR SESSION
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeState {
    Idle,
    /// Pointer held down with paint mode on.
    Stroking,
}

/// The single open image plus everything the UI can change about it.
///
/// Each UI event maps to one `on_*` method, which runs to completion and
/// reports what changed. Failures are turned into `Status` notifications and
/// never leave the session half-modified.
pub struct EditorSession {
    id: Uuid,
    buffer: PixelBuffer,
    history: HistoryManager,
    source_path: Option<PathBuf>,
    output_file_name: String,

    selected_color: Rgb,
    brush: BrushSettings,
    paint_mode: bool,
    painting: bool,
    is_dirty: bool,
}

impl EditorSession {
    pub fn new(buffer: PixelBuffer, source_path: Option<PathBuf>, settings: &EditorSettings) -> Self {
        let id = Uuid::new_v4();
        let (w, h) = buffer.dimensions();
        log_info!(
            "Session {}: {}×{} image, {} channels, stride {}",
            id,
            w,
            h,
            buffer.channels(),
            buffer.stride()
        );
        Self {
            id,
            buffer,
            history: HistoryManager::new(settings.max_undo_steps),
            source_path,
            output_file_name: settings.output_file_name.clone(),
            selected_color: Rgb::BLACK,
            brush: BrushSettings::from_size(settings.brush_size),
            paint_mode: settings.paint_mode,
            painting: false,
            is_dirty: false,
        }
    }

    /// Load `path` and start a session on it.
    pub fn open(path: &Path, settings: &EditorSettings) -> Result<Self, ImageIoError> {
        let buffer = io::load_image(path).inspect_err(|e| log_err!("{}", e))?;
        Ok(Self::new(buffer, Some(path.to_path_buf()), settings))
    }

    /// Swap in a different image. History belongs to the old image and is
    /// dropped; on failure nothing changes.
    pub fn replace_image(&mut self, path: &Path) -> Result<(), ImageIoError> {
        let buffer = io::load_image(path).inspect_err(|e| log_err!("{}", e))?;
        self.buffer = buffer;
        self.history.clear();
        self.source_path = Some(path.to_path_buf());
        self.painting = false;
        self.is_dirty = false;
        log_info!("Session {}: opened {}", self.id, path.display());
        Ok(())
    }

    // ---- pointer events -----------------------------------------------------

    /// Pointer pressed at widget position (`px`, `py`). In paint mode this
    /// starts a stroke: one undo snapshot, then a stamp under the pointer.
    /// Otherwise the color under the pointer is picked.
    pub fn on_pointer_press(&mut self, px: f64, py: f64, viewport: ViewportSize) -> Vec<Notification> {
        let (wx, wy) = (px as i32, py as i32);
        if self.paint_mode {
            self.painting = true;
            self.history.snapshot(&self.buffer);
            let result = self.paint_at(wx, wy, viewport);
            self.report(result)
        } else {
            let result = self.pick_at(wx, wy, viewport);
            self.report(result)
        }
    }

    /// Pointer moved. Only paints while a stroke is active.
    pub fn on_pointer_move(&mut self, px: f64, py: f64, viewport: ViewportSize) -> Vec<Notification> {
        if !(self.painting && self.paint_mode) {
            return Vec::new();
        }
        let result = self.paint_at(px as i32, py as i32, viewport);
        self.report(result)
    }

    pub fn on_pointer_release(&mut self, _px: f64, _py: f64) -> Vec<Notification> {
        self.painting = false;
        Vec::new()
    }

    fn paint_at(&mut self, wx: i32, wy: i32, viewport: ViewportSize) -> Result<Vec<Notification>, EditorError> {
        let (ix, iy) = viewport::map_to_image(wx, wy, viewport, self.buffer.dimensions())?;
        let color = self.selected_color;
        let region = tools::stamp(&mut self.buffer, ix as i64, iy as i64, self.brush.radius(), color);
        self.is_dirty = true;
        log_info!(
            "Painted at (Widget: {}, {}) -> (Image: {}, {}) with {}",
            wx,
            wy,
            ix,
            iy,
            color
        );
        Ok(vec![Notification::BufferChanged { region }])
    }

    fn pick_at(&mut self, wx: i32, wy: i32, viewport: ViewportSize) -> Result<Vec<Notification>, EditorError> {
        let (ix, iy) = viewport::map_to_image(wx, wy, viewport, self.buffer.dimensions())?;
        let color = self.select_color_at(ix as i64, iy as i64)?;
        log_info!(
            "Clicked on (Widget: {}, {}) -> (Image: {}, {}) -> {}",
            wx,
            wy,
            ix,
            iy,
            color
        );
        Ok(self.color_changed())
    }

    // ---- direct image-coordinate operations ---------------------------------

    /// Pick the color at image coordinates (no viewport mapping).
    pub fn sample_color_at(&mut self, x: i64, y: i64) -> Result<Rgb, EditorError> {
        let color = self.select_color_at(x, y)?;
        log_info!("Manual input: ({}, {}) -> {}", x, y, color);
        Ok(color)
    }

    pub fn on_sample_color_at(&mut self, x: i64, y: i64) -> Vec<Notification> {
        let result = self.sample_color_at(x, y).map(|_| self.color_changed());
        self.report(result)
    }

    fn select_color_at(&mut self, x: i64, y: i64) -> Result<Rgb, EditorError> {
        let color = self.buffer.get(x, y)?;
        self.selected_color = color;
        Ok(color)
    }

    fn color_changed(&self) -> Vec<Notification> {
        vec![Notification::ColorChanged {
            color: self.selected_color,
            label: self.selected_color.label(),
        }]
    }

    /// Set one pixel to the selected color as its own undo step.
    pub fn paint_pixel(&mut self, x: i64, y: i64) -> Result<DirtyRect, EditorError> {
        if !self.buffer.contains(x, y) {
            let (width, height) = self.buffer.dimensions();
            return Err(PixelError::IndexOutOfRange { x, y, width, height }.into());
        }
        self.history.snapshot(&self.buffer);
        let rect = tools::paint_pixel(&mut self.buffer, x, y, self.selected_color)?;
        self.is_dirty = true;
        log_info!("Painted pixel at ({}, {}) with {}", x, y, self.selected_color);
        Ok(rect)
    }

    pub fn on_paint_pixel(&mut self, x: i64, y: i64) -> Vec<Notification> {
        let result = self
            .paint_pixel(x, y)
            .map(|rect| vec![Notification::BufferChanged { region: Some(rect) }]);
        self.report(result)
    }

    // ---- history ------------------------------------------------------------

    pub fn undo(&mut self) -> Result<(), EditorError> {
        let previous = self
            .history
            .undo(&self.buffer)
            .ok_or(EditorError::EmptyHistory(HistoryDirection::Undo))?;
        self.buffer = previous;
        self.is_dirty = true;
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EditorError> {
        let next = self
            .history
            .redo(&self.buffer)
            .ok_or(EditorError::EmptyHistory(HistoryDirection::Redo))?;
        self.buffer = next;
        self.is_dirty = true;
        Ok(())
    }

    pub fn on_undo(&mut self) -> Vec<Notification> {
        let result = self.undo().map(|_| vec![Notification::BufferChanged { region: None }]);
        self.report(result)
    }

    pub fn on_redo(&mut self) -> Vec<Notification> {
        let result = self.redo().map(|_| vec![Notification::BufferChanged { region: None }]);
        self.report(result)
    }

    // ---- tool state ---------------------------------------------------------

    /// Flip paint mode. Turning it off mid-stroke ends the stroke.
    pub fn toggle_paint_mode(&mut self) -> bool {
        self.set_paint_mode(!self.paint_mode);
        self.paint_mode
    }

    pub fn set_paint_mode(&mut self, enabled: bool) {
        self.paint_mode = enabled;
        if !enabled {
            self.painting = false;
        }
        log_info!("Paint mode {}.", if enabled { "activated" } else { "deactivated" });
    }

    pub fn on_toggle_paint_mode(&mut self) -> Vec<Notification> {
        let on = self.toggle_paint_mode();
        vec![Notification::Status(
            if on { "Paint mode activated." } else { "Paint mode deactivated." }.to_string(),
        )]
    }

    /// Brush diameter control (1..=50).
    pub fn set_brush_size(&mut self, size: u32) {
        self.brush = BrushSettings::from_size(size);
        log_info!("Brush size: {} (radius {})", size, self.brush.radius());
    }

    pub fn set_brush_radius(&mut self, radius: u32) {
        self.brush = BrushSettings::from_radius(radius);
        log_info!("Brush radius: {}", self.brush.radius());
    }

    // ---- persistence --------------------------------------------------------

    /// Write the buffer as PNG next to the opened image, using the configured
    /// output file name. Returns the written path.
    pub fn save(&mut self) -> Result<PathBuf, EditorError> {
        let source = self.source_path.as_deref().ok_or(EditorError::NoImagePath)?;
        let path = io::sibling_path(source, &self.output_file_name);
        self.save_as(&path)?;
        Ok(path)
    }

    pub fn save_as(&mut self, path: &Path) -> Result<(), EditorError> {
        match io::save_png(&self.buffer, path) {
            Ok(()) => {
                self.is_dirty = false;
                log_info!("Image saved successfully: {}", path.display());
                Ok(())
            }
            Err(e) => {
                log_err!("{}", e);
                Err(e.into())
            }
        }
    }

    // ---- accessors ----------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn selected_color(&self) -> Rgb {
        self.selected_color
    }

    pub fn brush(&self) -> BrushSettings {
        self.brush
    }

    pub fn paint_mode(&self) -> bool {
        self.paint_mode
    }

    pub fn is_painting(&self) -> bool {
        self.painting
    }

    pub fn state(&self) -> StrokeState {
        if self.painting && self.paint_mode {
            StrokeState::Stroking
        } else {
            StrokeState::Idle
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Turn an operation result into notifications, logging failures.
    fn report(&self, result: Result<Vec<Notification>, EditorError>) -> Vec<Notification> {
        match result {
            Ok(notes) => notes,
            Err(e) => {
                match &e {
                    EditorError::Map(MapError::OutOfBounds { ix, iy }) => {
                        let (w, h) = self.buffer.dimensions();
                        log_warn!(
                            "Click: Coordinates out of bounds ({}, {}). Image size: {} x {}",
                            ix,
                            iy,
                            w,
                            h
                        );
                    }
                    other => log_warn!("{}", other),
                }
                vec![Notification::Status(e.to_string())]
            }
        }
    }
}
