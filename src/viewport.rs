// ============================================================================
// VIEWPORT MAPPING – letterboxed widget coordinates → image pixel coordinates
// ============================================================================
//
// The picture widget scales the image to fit one axis and centers it on the
// other, leaving bars on the axis with slack. Every pointer event arrives in
// widget space and must be mapped back into image space before the pixel
// buffer is touched.
//
// Integer divisions below truncate toward zero. A press that lands less than
// one image pixel inside a bar therefore still maps to column/row 0; this is
// a known half-pixel bias kept for compatibility with existing click targets.

use std::fmt;

/// Size of the rendering surface in widget pixels. Supplied per call because
/// the window may have been resized since the last event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: i32,
    pub height: i32,
}

impl ViewportSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(1000, 800)
    }
}

/// Which pair of edges carries the letterbox bars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarAxis {
    /// Image is relatively wider than the viewport: bars above and below.
    TopBottom,
    /// Image is relatively taller (or the aspects match): bars left and right.
    LeftRight,
}

/// Placement of the scaled image inside the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Letterbox {
    pub bars: BarAxis,
    /// Bar thickness on the leading edge (top or left), in widget pixels.
    pub offset: i64,
    /// Scaled image extent along the barred axis, in widget pixels.
    pub scaled_extent: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapError {
    /// The mapped point falls outside the image (including the bars).
    OutOfBounds { ix: i64, iy: i64 },
    /// Viewport or image has a zero/negative dimension.
    InvalidGeometry,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::OutOfBounds { ix, iy } => {
                write!(f, "coordinates out of bounds ({}, {})", ix, iy)
            }
            MapError::InvalidGeometry => write!(f, "invalid viewport or image geometry"),
        }
    }
}

impl std::error::Error for MapError {}

/// Compute where an `image`-sized picture sits inside `viewport`.
pub fn letterbox(viewport: ViewportSize, image: (u32, u32)) -> Result<Letterbox, MapError> {
    let (vw, vh) = (viewport.width as i64, viewport.height as i64);
    let (iw, ih) = (image.0 as i64, image.1 as i64);
    if vw <= 0 || vh <= 0 || iw <= 0 || ih <= 0 {
        return Err(MapError::InvalidGeometry);
    }

    let img_aspect = iw as f64 / ih as f64;
    let view_aspect = vw as f64 / vh as f64;

    let placement = if img_aspect > view_aspect {
        let scale = vw as f64 / iw as f64;
        let scaled_h = (ih as f64 * scale).round() as i64;
        Letterbox {
            bars: BarAxis::TopBottom,
            offset: (vh - scaled_h) / 2,
            scaled_extent: scaled_h,
        }
    } else {
        let scale = vh as f64 / ih as f64;
        let scaled_w = (iw as f64 * scale).round() as i64;
        Letterbox {
            bars: BarAxis::LeftRight,
            offset: (vw - scaled_w) / 2,
            scaled_extent: scaled_w,
        }
    };

    if placement.scaled_extent <= 0 {
        return Err(MapError::InvalidGeometry);
    }
    Ok(placement)
}

/// Map a widget-space point to the image pixel under it.
pub fn map_to_image(
    px: i32,
    py: i32,
    viewport: ViewportSize,
    image: (u32, u32),
) -> Result<(u32, u32), MapError> {
    let placement = letterbox(viewport, image)?;
    let (px, py) = (px as i64, py as i64);
    let (vw, vh) = (viewport.width as i64, viewport.height as i64);
    let (iw, ih) = (image.0 as i64, image.1 as i64);

    let (ix, iy) = match placement.bars {
        BarAxis::TopBottom => (
            px * iw / vw,
            (py - placement.offset) * ih / placement.scaled_extent,
        ),
        BarAxis::LeftRight => (
            (px - placement.offset) * iw / placement.scaled_extent,
            py * ih / vh,
        ),
    };

    if ix < 0 || iy < 0 || ix >= iw || iy >= ih {
        return Err(MapError::OutOfBounds { ix, iy });
    }
    Ok((ix as u32, iy as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_viewport_puts_bars_left_and_right() {
        // 200×100 image (aspect 2) in a 400×100 viewport (aspect 4): the image
        // is drawn 200 px wide, centered with 100 px bars on each side.
        let vp = ViewportSize::new(400, 100);
        let lb = letterbox(vp, (200, 100)).unwrap();
        assert_eq!(lb.bars, BarAxis::LeftRight);
        assert_eq!(lb.offset, 100);
        assert_eq!(map_to_image(100, 50, vp, (200, 100)), Ok((0, 50)));
        assert_eq!(map_to_image(200, 50, vp, (200, 100)), Ok((100, 50)));
    }

    #[test]
    fn matching_aspect_has_no_offset() {
        let vp = ViewportSize::new(400, 200);
        assert_eq!(letterbox(vp, (200, 100)).unwrap().offset, 0);
        assert_eq!(map_to_image(100, 50, vp, (200, 100)), Ok((50, 25)));
        assert_eq!(map_to_image(100, 50, ViewportSize::new(200, 100), (200, 100)), Ok((100, 50)));
    }

    #[test]
    fn square_image_in_wide_viewport() {
        let vp = ViewportSize::new(200, 100);
        let lb = letterbox(vp, (100, 100)).unwrap();
        assert_eq!(lb.scaled_extent, 100);
        assert_eq!(lb.offset, 50);
        assert_eq!(map_to_image(50, 50, vp, (100, 100)), Ok((0, 50)));
        assert!(matches!(
            map_to_image(25, 50, vp, (100, 100)),
            Err(MapError::OutOfBounds { .. })
        ));
        assert!(matches!(
            map_to_image(150, 50, vp, (100, 100)),
            Err(MapError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn tall_viewport_puts_bars_top_and_bottom() {
        // 100×50 image in 100×100: drawn 100×50 with 25 px bars.
        let vp = ViewportSize::new(100, 100);
        let lb = letterbox(vp, (100, 50)).unwrap();
        assert_eq!(lb.bars, BarAxis::TopBottom);
        assert_eq!(lb.offset, 25);
        assert_eq!(map_to_image(10, 25, vp, (100, 50)), Ok((10, 0)));
        assert_eq!(map_to_image(99, 74, vp, (100, 50)), Ok((99, 49)));
        assert!(map_to_image(10, 10, vp, (100, 50)).is_err());
        assert!(map_to_image(10, 80, vp, (100, 50)).is_err());
    }

    #[test]
    fn scaled_extent_is_rounded() {
        // 300×100 in 200×200: scale 2/3, 100 * 0.666… = 66.67 → 67.
        let lb = letterbox(ViewportSize::new(200, 200), (300, 100)).unwrap();
        assert_eq!(lb.scaled_extent, 67);
        assert_eq!(lb.offset, 66);
    }

    #[test]
    fn division_truncates_toward_zero_near_bar_edge() {
        // 10×10 image in 200×100: 100 px wide, 50 px bar on the left.
        // px = 45 gives (−5 * 10) / 100 = 0 under truncation, not −1.
        let vp = ViewportSize::new(200, 100);
        assert_eq!(map_to_image(45, 0, vp, (10, 10)), Ok((0, 0)));
        assert!(map_to_image(40, 0, vp, (10, 10)).is_err());
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        let image = (10, 10);
        assert_eq!(
            map_to_image(0, 0, ViewportSize::new(0, 100), image),
            Err(MapError::InvalidGeometry)
        );
        assert_eq!(
            map_to_image(0, 0, ViewportSize::new(100, -4), image),
            Err(MapError::InvalidGeometry)
        );
        assert_eq!(
            map_to_image(0, 0, ViewportSize::new(100, 100), (0, 10)),
            Err(MapError::InvalidGeometry)
        );
        // 1000×1 image squeezed into 1 px of width rounds to zero height.
        assert_eq!(
            letterbox(ViewportSize::new(1, 100), (1000, 1)),
            Err(MapError::InvalidGeometry)
        );
    }
}
