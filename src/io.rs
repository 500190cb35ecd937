use image::codecs::png::PngEncoder;
use image::{ImageEncoder, ImageError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::canvas::PixelBuffer;

/// File name written by "Save", next to the image that was opened.
pub const PAINTED_FILE_NAME: &str = "painted_image.png";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum ImageIoError {
    NotFound(PathBuf),
    /// Decoder message, passed through unchanged.
    Decode(String),
    /// Encoder message, passed through unchanged.
    Encode(String),
    Io(std::io::Error),
}

impl std::fmt::Display for ImageIoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageIoError::NotFound(p) => write!(f, "File not found: {}", p.display()),
            ImageIoError::Decode(e) => write!(f, "Failed to load image: {}", e),
            ImageIoError::Encode(e) => write!(f, "Failed to save image: {}", e),
            ImageIoError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ImageIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageIoError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ImageIoError {
    fn from(e: std::io::Error) -> Self {
        ImageIoError::Io(e)
    }
}

// ============================================================================
// LOAD / SAVE
// ============================================================================

/// Decode any raster format the `image` crate understands into a pixel
/// buffer with the file's native dimensions.
pub fn load_image(path: &Path) -> Result<PixelBuffer, ImageIoError> {
    if !path.exists() {
        return Err(ImageIoError::NotFound(path.to_path_buf()));
    }

    let img = image::open(path).map_err(|e| match e {
        ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
            ImageIoError::NotFound(path.to_path_buf())
        }
        ImageError::IoError(io) => ImageIoError::Io(io),
        other => ImageIoError::Decode(other.to_string()),
    })?;

    PixelBuffer::from_dynamic(&img).map_err(|e| ImageIoError::Decode(e.to_string()))
}

/// `file_name` inside the directory that holds `original`. A bare file name
/// resolves to the current directory.
pub fn sibling_path(original: &Path, file_name: &str) -> PathBuf {
    let dir = original
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    dir.join(file_name)
}

/// Encode `buffer` as PNG at `path`, replacing any existing file. Row padding
/// is dropped; 4-channel buffers keep their alpha.
pub fn save_png(buffer: &PixelBuffer, path: &Path) -> Result<(), ImageIoError> {
    let img = buffer
        .to_dynamic()
        .map_err(|e| ImageIoError::Encode(e.to_string()))?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    PngEncoder::new(&mut writer)
        .write_image(img.as_bytes(), img.width(), img.height(), img.color())
        .map_err(|e| match e {
            ImageError::IoError(io) => ImageIoError::Io(io),
            other => ImageIoError::Encode(other.to_string()),
        })?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::colors::Rgb;
    use tempfile::tempdir;

    #[test]
    fn painted_path_sits_next_to_original() {
        assert_eq!(
            sibling_path(Path::new("/tmp/shots/cat.jpg"), PAINTED_FILE_NAME),
            PathBuf::from("/tmp/shots/painted_image.png")
        );
        assert_eq!(
            sibling_path(Path::new("cat.jpg"), PAINTED_FILE_NAME),
            PathBuf::from("./painted_image.png")
        );
    }

    #[test]
    fn save_then_load_keeps_pixels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");

        let mut buf = PixelBuffer::filled(5, 3, 3, Rgb::new(10, 20, 30)).unwrap();
        buf.set(4, 2, Rgb::new(200, 100, 0)).unwrap();
        save_png(&buf, &path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.dimensions(), (5, 3));
        assert_eq!(loaded.channels(), 3);
        assert_eq!(loaded.get(4, 2).unwrap(), Rgb::new(200, 100, 0));
        assert_eq!(loaded.get(0, 0).unwrap(), Rgb::new(10, 20, 30));
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(PAINTED_FILE_NAME);
        std::fs::write(&path, b"stale").unwrap();

        let buf = PixelBuffer::filled(2, 2, 4, Rgb::WHITE).unwrap();
        save_png(&buf, &path).unwrap();
        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.channels(), 4);
        assert_eq!(loaded.get(1, 1).unwrap(), Rgb::WHITE);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = load_image(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, ImageIoError::NotFound(_)));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, ImageIoError::Decode(_)), "got {:?}", err);
    }

    #[test]
    fn unwritable_target_reports_io() {
        let dir = tempdir().unwrap();
        let buf = PixelBuffer::new(1, 1, 3).unwrap();
        let err = save_png(&buf, &dir.path().join("missing_dir").join("x.png")).unwrap_err();
        assert!(matches!(err, ImageIoError::Io(_)));
    }
}
