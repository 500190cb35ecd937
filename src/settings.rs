use std::path::{Path, PathBuf};

use crate::components::tools::{DEFAULT_BRUSH_SIZE, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
use crate::io::PAINTED_FILE_NAME;
use crate::log_warn;
use crate::viewport::ViewportSize;

/// Editor preferences that persist across sessions.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorSettings {
    /// Brush diameter control, 1..=50.
    pub brush_size: u32,
    /// Start with paint mode on instead of color picking.
    pub paint_mode: bool,
    /// Maximum number of undo steps (0 = unlimited)
    pub max_undo_steps: usize,
    /// Viewport assumed until the host reports its real size.
    pub viewport: ViewportSize,
    /// File name "Save" writes next to the opened image.
    pub output_file_name: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            brush_size: DEFAULT_BRUSH_SIZE,
            paint_mode: false,
            max_undo_steps: 0,
            viewport: ViewportSize::default(),
            output_file_name: PAINTED_FILE_NAME.to_string(),
        }
    }
}

impl EditorSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/pixelpicker/pixelpicker_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\PixelPicker\pixelpicker_settings.cfg
    /// On macOS:   ~/Library/Application Support/PixelPicker/pixelpicker_settings.cfg
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").ok()?;
            return Some(PathBuf::from(appdata).join("PixelPicker").join("pixelpicker_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("PixelPicker")
                    .join("pixelpicker_settings.cfg"),
            );
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
                .ok()?;
            Some(config_dir.join("pixelpicker").join("pixelpicker_settings.cfg"))
        }
    }

    /// Load from the default location (defaults if missing or unreadable).
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    /// Parse `key=value` lines. Unknown keys and unparsable values are skipped
    /// and leave the default in place.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let (key, val) = (key.trim(), val.trim());
            match key {
                "brush_size" => match val.parse::<u32>() {
                    Ok(v) => s.brush_size = v.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE),
                    Err(_) => log_warn!("settings: bad brush_size '{}'", val),
                },
                "paint_mode" => s.paint_mode = val == "true",
                "max_undo_steps" => match val.parse::<usize>() {
                    Ok(v) => s.max_undo_steps = v,
                    Err(_) => log_warn!("settings: bad max_undo_steps '{}'", val),
                },
                "viewport_width" => match val.parse::<i32>() {
                    Ok(v) if v > 0 => s.viewport.width = v,
                    _ => log_warn!("settings: bad viewport_width '{}'", val),
                },
                "viewport_height" => match val.parse::<i32>() {
                    Ok(v) if v > 0 => s.viewport.height = v,
                    _ => log_warn!("settings: bad viewport_height '{}'", val),
                },
                "output_file_name" => {
                    if !val.is_empty() {
                        s.output_file_name = val.to_string();
                    }
                }
                _ => log_warn!("settings: unknown key '{}'", key),
            }
        }
        s
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "brush_size={}\n\
             paint_mode={}\n\
             max_undo_steps={}\n\
             viewport_width={}\n\
             viewport_height={}\n\
             output_file_name={}\n",
            self.brush_size,
            self.paint_mode,
            self.max_undo_steps,
            self.viewport.width,
            self.viewport.height,
            self.output_file_name,
        )
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_config_string())
    }
}
