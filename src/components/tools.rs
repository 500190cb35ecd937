use crate::canvas::{PixelBuffer, PixelError};
use crate::components::colors::Rgb;

/// Range of the brush size (diameter) control.
pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 50;
pub const DEFAULT_BRUSH_SIZE: u32 = 10;
/// Largest radius `from_radius` accepts.
pub const MAX_BRUSH_RADIUS: u32 = 4096;

// ============================================================================
// BRUSH SETTINGS
// ============================================================================

/// Brush shape state. The UI exposes a diameter slider; painting works in
/// terms of the radius, which never drops below 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrushSettings {
    radius: u32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self::from_size(DEFAULT_BRUSH_SIZE)
    }
}

impl BrushSettings {
    /// Build from the diameter control, clamped to its range.
    pub fn from_size(size: u32) -> Self {
        let size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
        Self { radius: (size / 2).max(1) }
    }

    pub fn from_radius(radius: u32) -> Self {
        Self { radius: radius.clamp(1, MAX_BRUSH_RADIUS) }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Diameter covered by the disc, `2r + 1` pixels across.
    pub fn footprint(&self) -> u32 {
        self.radius.saturating_mul(2).saturating_add(1)
    }
}

// ============================================================================
// STAMPING
// ============================================================================

/// Inclusive pixel rectangle touched by a paint operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyRect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl DirtyRect {
    fn point(x: u32, y: u32) -> Self {
        Self { min_x: x, min_y: y, max_x: x, max_y: y }
    }

    fn include(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

/// Paint a hard-edged filled disc of `radius` centered on (`cx`, `cy`).
///
/// A pixel at offset (dx, dy) belongs to the disc when
/// `dx² + dy² <= radius²`, so points exactly `radius` away are painted.
/// Parts of the disc outside the buffer are clipped. Returns the painted
/// region, or `None` when nothing landed inside the buffer.
pub fn stamp(
    buffer: &mut PixelBuffer,
    cx: i64,
    cy: i64,
    radius: u32,
    color: Rgb,
) -> Option<DirtyRect> {
    let r = radius as i64;
    // Squared distances can exceed i64 for radii near u32::MAX.
    let r_sq = (r as i128) * (r as i128);
    let (w, h) = (buffer.width() as i64, buffer.height() as i64);

    // Clip the bounding square before walking it.
    let min_dx = (-r).max(cx.saturating_neg());
    let max_dx = r.min((w - 1).saturating_sub(cx));
    let min_dy = (-r).max(cy.saturating_neg());
    let max_dy = r.min((h - 1).saturating_sub(cy));
    if min_dx > max_dx || min_dy > max_dy {
        return None;
    }

    let mut dirty: Option<DirtyRect> = None;
    for dy in min_dy..=max_dy {
        for dx in min_dx..=max_dx {
            if (dx as i128) * (dx as i128) + (dy as i128) * (dy as i128) > r_sq {
                continue;
            }
            let (nx, ny) = (cx + dx, cy + dy);
            if buffer.set(nx, ny, color).is_ok() {
                let (ux, uy) = (nx as u32, ny as u32);
                match dirty.as_mut() {
                    Some(rect) => rect.include(ux, uy),
                    None => dirty = Some(DirtyRect::point(ux, uy)),
                }
            }
        }
    }
    dirty
}

/// Paint exactly one pixel. Unlike `stamp`, an out-of-range target is an error.
pub fn paint_pixel(
    buffer: &mut PixelBuffer,
    x: i64,
    y: i64,
    color: Rgb,
) -> Result<DirtyRect, PixelError> {
    buffer.set(x, y, color)?;
    Ok(DirtyRect::point(x as u32, y as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgb = Rgb::new(250, 10, 10);

    fn painted(buf: &PixelBuffer) -> Vec<(i64, i64)> {
        let mut out = Vec::new();
        for y in 0..buf.height() as i64 {
            for x in 0..buf.width() as i64 {
                if buf.get(x, y).unwrap() == INK {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn radius_two_disc_membership() {
        let mut buf = PixelBuffer::new(10, 10, 3).unwrap();
        let rect = stamp(&mut buf, 5, 5, 2, INK).unwrap();
        assert_eq!(rect, DirtyRect { min_x: 3, min_y: 3, max_x: 7, max_y: 7 });

        let hits = painted(&buf);
        for &(x, y) in &hits {
            let (dx, dy) = (x - 5, y - 5);
            assert!(dx * dx + dy * dy <= 4, "({}, {}) outside disc", x, y);
        }
        // 13 integer points satisfy dx² + dy² <= 4.
        assert_eq!(hits.len(), 13);
        assert_eq!(buf.get(5, 7).unwrap(), INK);
        assert_eq!(buf.get(7, 5).unwrap(), INK);
        assert_eq!(buf.get(7, 7).unwrap(), Rgb::BLACK);
        assert_eq!(buf.get(6, 7).unwrap(), Rgb::BLACK);
    }

    #[test]
    fn stamp_at_origin_is_clipped_to_quadrant() {
        let mut buf = PixelBuffer::new(8, 8, 4).unwrap();
        let rect = stamp(&mut buf, 0, 0, 5, INK).unwrap();
        assert_eq!(rect, DirtyRect { min_x: 0, min_y: 0, max_x: 5, max_y: 5 });
        for (x, y) in painted(&buf) {
            assert!((0..=5).contains(&x) && (0..=5).contains(&y));
            assert!(x * x + y * y <= 25);
        }
        assert_eq!(buf.get(5, 0).unwrap(), INK);
        assert_eq!(buf.get(4, 4).unwrap(), Rgb::BLACK);
    }

    #[test]
    fn stamp_near_far_corner_on_small_buffer() {
        let mut buf = PixelBuffer::new(3, 2, 3).unwrap();
        stamp(&mut buf, 2, 1, 5, INK);
        assert_eq!(painted(&buf).len(), 6);
    }

    #[test]
    fn stamp_fully_outside_touches_nothing() {
        let mut buf = PixelBuffer::new(4, 4, 3).unwrap();
        let before = buf.clone();
        assert_eq!(stamp(&mut buf, -10, 2, 3, INK), None);
        assert_eq!(stamp(&mut buf, 2, 20, 3, INK), None);
        assert_eq!(buf, before);
    }

    #[test]
    fn stamp_overlapping_edge_from_outside() {
        let mut buf = PixelBuffer::new(4, 4, 3).unwrap();
        // Center one pixel left of the buffer; only the column x = 0 is in reach.
        let rect = stamp(&mut buf, -1, 1, 1, INK).unwrap();
        assert_eq!(rect, DirtyRect::point(0, 1));
    }

    #[test]
    fn brush_size_maps_to_radius() {
        assert_eq!(BrushSettings::default().radius(), 5);
        assert_eq!(BrushSettings::from_size(1).radius(), 1);
        assert_eq!(BrushSettings::from_size(0).radius(), 1);
        assert_eq!(BrushSettings::from_size(7).radius(), 3);
        assert_eq!(BrushSettings::from_size(500).radius(), 25);
        assert_eq!(BrushSettings::from_radius(0).radius(), 1);
        assert_eq!(BrushSettings::from_radius(3).footprint(), 7);
    }

    #[test]
    fn huge_radius_is_capped_and_fills_buffer() {
        let brush = BrushSettings::from_radius(u32::MAX);
        assert_eq!(brush.radius(), MAX_BRUSH_RADIUS);
        assert_eq!(brush.footprint(), 2 * MAX_BRUSH_RADIUS + 1);

        let mut buf = PixelBuffer::new(6, 4, 3).unwrap();
        let rect = stamp(&mut buf, 2, 2, u32::MAX, INK).unwrap();
        assert_eq!(rect, DirtyRect { min_x: 0, min_y: 0, max_x: 5, max_y: 3 });
        assert_eq!(painted(&buf).len(), 24);

        let mut buf = PixelBuffer::new(4, 4, 3).unwrap();
        assert_eq!(stamp(&mut buf, i64::MIN, i64::MAX, u32::MAX, INK), None);
    }

    #[test]
    fn single_pixel_paint_is_bounds_checked() {
        let mut buf = PixelBuffer::new(2, 2, 3).unwrap();
        assert_eq!(paint_pixel(&mut buf, 1, 0, INK), Ok(DirtyRect::point(1, 0)));
        assert_eq!(painted(&buf), vec![(1, 0)]);
        assert!(paint_pixel(&mut buf, 2, 0, INK).is_err());
    }
}
