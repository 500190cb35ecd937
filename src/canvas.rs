use std::fmt;

use image::{DynamicImage, RgbImage, RgbaImage};
use rayon::prelude::*;

use crate::components::colors::Rgb;

/// Row alignment used for buffers built from decoded images.
pub const ROW_ALIGN: usize = 4;

// ============================================================================
// PIXEL BUFFER – flat RGB / RGBA raster with explicit row stride
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelError {
    /// Pixel coordinates outside `[0, width) × [0, height)`.
    IndexOutOfRange { x: i64, y: i64, width: u32, height: u32 },
    /// Dimensions, channel count, stride or byte length don't describe a raster.
    InvalidLayout(String),
}

impl fmt::Display for PixelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelError::IndexOutOfRange { x, y, width, height } => write!(
                f,
                "Coordinates out of bounds: ({}, {}). Image size: {} x {}",
                x, y, width, height
            ),
            PixelError::InvalidLayout(e) => write!(f, "Invalid pixel layout: {}", e),
        }
    }
}

impl std::error::Error for PixelError {}

/// Mutable raster of 8-bit samples. Pixel (x, y) lives at byte offset
/// `y * stride + x * channels`; the first three samples are R, G, B and a
/// fourth (when present) is alpha. Bytes past `width * channels` in a row are
/// padding.
///
/// `Clone` is a full deep copy, which is what history snapshots rely on.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u8,
    stride: usize,
    data: Vec<u8>,
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .field("stride", &self.stride)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl PixelBuffer {
    // ---- construction -------------------------------------------------------

    /// Zero-filled buffer with an aligned stride. Alpha (if any) starts opaque.
    pub fn new(width: u32, height: u32, channels: u8) -> Result<Self, PixelError> {
        Self::filled(width, height, channels, Rgb::BLACK)
    }

    /// Buffer where every pixel is `color` (alpha 255 for 4-channel buffers).
    pub fn filled(width: u32, height: u32, channels: u8, color: Rgb) -> Result<Self, PixelError> {
        check_dimensions(width, height, channels)?;
        let stride = aligned_stride(width, channels);
        let n = channels as usize;
        let mut data = vec![0u8; stride * height as usize];
        for row in data.chunks_mut(stride) {
            for px in row[..width as usize * n].chunks_exact_mut(n) {
                px[..3].copy_from_slice(&color.to_array());
                if n == 4 {
                    px[3] = 255;
                }
            }
        }
        Ok(Self { width, height, channels, stride, data })
    }

    /// Wrap existing bytes. `stride` must cover a full row and `bytes` must
    /// cover `height` rows.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: u8,
        stride: usize,
        bytes: Vec<u8>,
    ) -> Result<Self, PixelError> {
        check_dimensions(width, height, channels)?;
        let row_bytes = width as usize * channels as usize;
        if stride < row_bytes {
            return Err(PixelError::InvalidLayout(format!(
                "stride {} shorter than row ({} bytes)",
                stride, row_bytes
            )));
        }
        let needed = stride * height as usize;
        if bytes.len() < needed {
            return Err(PixelError::InvalidLayout(format!(
                "expected at least {} bytes, got {}",
                needed,
                bytes.len()
            )));
        }
        Ok(Self { width, height, channels, stride, data: bytes })
    }

    /// Import a decoded image. Images with an alpha channel become 4-channel
    /// buffers, everything else 3-channel. Rows are copied in parallel.
    pub fn from_dynamic(img: &DynamicImage) -> Result<Self, PixelError> {
        let (width, height) = (img.width(), img.height());
        let (channels, packed): (u8, Vec<u8>) = if img.color().has_alpha() {
            (4, img.to_rgba8().into_raw())
        } else {
            (3, img.to_rgb8().into_raw())
        };
        check_dimensions(width, height, channels)?;

        let stride = aligned_stride(width, channels);
        let row_bytes = width as usize * channels as usize;
        let mut data = vec![0u8; stride * height as usize];
        data.par_chunks_mut(stride)
            .zip(packed.par_chunks(row_bytes))
            .for_each(|(dst, src)| dst[..row_bytes].copy_from_slice(src));

        Ok(Self { width, height, channels, stride, data })
    }

    /// Export as a tightly packed `image` buffer (padding dropped).
    pub fn to_dynamic(&self) -> Result<DynamicImage, PixelError> {
        let row_bytes = self.row_bytes();
        let mut packed = vec![0u8; row_bytes * self.height as usize];
        packed
            .par_chunks_mut(row_bytes)
            .zip(self.data.par_chunks(self.stride))
            .for_each(|(dst, src)| dst.copy_from_slice(&src[..row_bytes]));

        let layout_err = || PixelError::InvalidLayout("packed size mismatch".to_string());
        match self.channels {
            4 => RgbaImage::from_raw(self.width, self.height, packed)
                .map(DynamicImage::ImageRgba8)
                .ok_or_else(layout_err),
            _ => RgbImage::from_raw(self.width, self.height, packed)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(layout_err),
        }
    }

    // ---- pixel access -------------------------------------------------------

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    fn offset(&self, x: i64, y: i64) -> Result<usize, PixelError> {
        if !self.contains(x, y) {
            return Err(PixelError::IndexOutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.stride + x as usize * self.channels as usize)
    }

    pub fn get(&self, x: i64, y: i64) -> Result<Rgb, PixelError> {
        let o = self.offset(x, y)?;
        Ok(Rgb::new(self.data[o], self.data[o + 1], self.data[o + 2]))
    }

    /// Overwrite the color samples of one pixel; alpha is left as is.
    pub fn set(&mut self, x: i64, y: i64, color: Rgb) -> Result<(), PixelError> {
        let o = self.offset(x, y)?;
        self.data[o..o + 3].copy_from_slice(&color.to_array());
        Ok(())
    }

    // ---- metadata -----------------------------------------------------------

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Heap bytes held by this buffer (used for history accounting).
    pub fn memory_bytes(&self) -> usize {
        self.data.len()
    }
}

fn check_dimensions(width: u32, height: u32, channels: u8) -> Result<(), PixelError> {
    if width == 0 || height == 0 {
        return Err(PixelError::InvalidLayout(format!(
            "image must have positive dimensions, got {}×{}",
            width, height
        )));
    }
    if channels != 3 && channels != 4 {
        return Err(PixelError::InvalidLayout(format!(
            "unsupported channel count {}",
            channels
        )));
    }
    Ok(())
}

fn aligned_stride(width: u32, channels: u8) -> usize {
    let row = width as usize * channels as usize;
    (row + ROW_ALIGN - 1) & !(ROW_ALIGN - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_respect_bounds() {
        let mut buf = PixelBuffer::new(4, 3, 3).unwrap();
        let red = Rgb::new(255, 0, 0);
        buf.set(3, 2, red).unwrap();
        assert_eq!(buf.get(3, 2), Ok(red));
        assert_eq!(buf.get(0, 0), Ok(Rgb::BLACK));

        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 3)] {
            assert!(matches!(buf.get(x, y), Err(PixelError::IndexOutOfRange { .. })));
            assert!(buf.set(x, y, red).is_err());
        }
    }

    #[test]
    fn stride_is_aligned_and_padding_is_not_a_pixel() {
        // 3 px × 3 channels = 9 bytes per row, padded to 12.
        let mut buf = PixelBuffer::new(3, 2, 3).unwrap();
        assert_eq!(buf.stride(), 12);
        assert_eq!(buf.as_bytes().len(), 24);
        buf.set(0, 1, Rgb::new(1, 2, 3)).unwrap();
        assert_eq!(&buf.as_bytes()[12..15], &[1, 2, 3]);
        assert!(buf.get(3, 0).is_err());
    }

    #[test]
    fn set_leaves_alpha_untouched() {
        let mut buf = PixelBuffer::filled(2, 2, 4, Rgb::new(9, 9, 9)).unwrap();
        let o = buf.stride() + 4;
        let mut bytes = buf.as_bytes().to_vec();
        bytes[o + 3] = 17;
        buf = PixelBuffer::from_raw(2, 2, 4, buf.stride(), bytes).unwrap();

        buf.set(1, 1, Rgb::new(10, 20, 30)).unwrap();
        assert_eq!(&buf.as_bytes()[o..o + 4], &[10, 20, 30, 17]);
    }

    #[test]
    fn clone_is_independent() {
        let mut live = PixelBuffer::new(2, 2, 3).unwrap();
        let snapshot = live.clone();
        live.set(0, 0, Rgb::new(200, 100, 50)).unwrap();
        assert_eq!(snapshot.get(0, 0), Ok(Rgb::BLACK));
        assert_ne!(live, snapshot);
    }

    #[test]
    fn from_raw_validates_layout() {
        assert!(PixelBuffer::from_raw(2, 2, 3, 5, vec![0; 20]).is_err());
        assert!(PixelBuffer::from_raw(2, 2, 3, 6, vec![0; 11]).is_err());
        assert!(PixelBuffer::from_raw(2, 2, 2, 6, vec![0; 12]).is_err());
        assert!(PixelBuffer::from_raw(0, 2, 3, 6, vec![0; 12]).is_err());
        assert!(PixelBuffer::from_raw(2, 2, 3, 6, vec![0; 12]).is_ok());
    }

    #[test]
    fn dynamic_image_conversion_keeps_channel_layout() {
        let rgba = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 4]));
        let buf = PixelBuffer::from_dynamic(&DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!(buf.channels(), 4);
        assert_eq!(buf.get(2, 1), Ok(Rgb::new(1, 2, 3)));

        let rgb = RgbImage::from_pixel(3, 2, image::Rgb([7, 8, 9]));
        let buf = PixelBuffer::from_dynamic(&DynamicImage::ImageRgb8(rgb.clone())).unwrap();
        assert_eq!(buf.channels(), 3);
        assert_eq!(buf.stride(), 12);
        match buf.to_dynamic().unwrap() {
            DynamicImage::ImageRgb8(out) => assert_eq!(out, rgb),
            other => panic!("unexpected color type {:?}", other.color()),
        }
    }
}
