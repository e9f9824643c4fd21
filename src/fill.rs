//! Scanline flood fill.

use image::{Rgba, RgbaImage};

use crate::raster::RasterBuffer;

/// Per-channel RGB comparison. Alpha is not considered.
pub fn rgb_within(a: Rgba<u8>, b: Rgba<u8>, tolerance: u8) -> bool {
    (0..3).all(|c| a[c].abs_diff(b[c]) <= tolerance)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillParams {
    /// Fill is skipped when the clicked color is this close to the fill color.
    pub noop_tolerance: u8,
    /// Neighbours this close to the clicked color join the region.
    pub match_tolerance: u8,
}

impl Default for FillParams {
    fn default() -> Self {
        Self {
            noop_tolerance: 1,
            match_tolerance: 32,
        }
    }
}

/// Fills the 4-connected region around `(x, y)` with `color`.
///
/// Coordinates are buffer coordinates (origin top-left). Returns the number
/// of pixels written; zero means the canvas was not touched.
pub fn flood_fill(canvas: &mut RasterBuffer, x: i64, y: i64, color: Rgba<u8>, params: FillParams) -> usize {
    let Some(target) = canvas.pixel(x, y) else {
        log::debug!("Fill at ({x}, {y}) is outside the canvas");
        return 0;
    };
    if rgb_within(target, color, params.noop_tolerance) {
        log::debug!("Fill color matches target {:?}, skipping", target);
        return 0;
    }

    // Read from a fresh copy so already-filled pixels never feed back into matching.
    let source = canvas.image().clone();
    let mut filled = 0;
    let _ = canvas.composite_over(|dst| {
        filled = scanline_fill(&source, dst, x as u32, y as u32, target, color, params.match_tolerance);
    });
    log::info!("Filled {filled} pixels from ({x}, {y})");
    filled
}

fn scanline_fill(
    source: &RgbaImage,
    dst: &mut RgbaImage,
    seed_x: u32,
    seed_y: u32,
    target: Rgba<u8>,
    color: Rgba<u8>,
    tolerance: u8,
) -> usize {
    let width = source.width() as usize;
    let height = source.height() as usize;
    let mut visited = vec![false; width * height];
    let matches = |x: usize, y: usize, visited: &[bool]| {
        !visited[y * width + x] && rgb_within(*source.get_pixel(x as u32, y as u32), target, tolerance)
    };

    let mut filled = 0;
    let mut stack = vec![(seed_x as usize, seed_y as usize)];
    while let Some((x, y)) = stack.pop() {
        if !matches(x, y, &visited) {
            continue;
        }

        let mut left = x;
        while left > 0 && matches(left - 1, y, &visited) {
            left -= 1;
        }
        let mut right = x;
        while right + 1 < width && matches(right + 1, y, &visited) {
            right += 1;
        }

        for xx in left..=right {
            visited[y * width + xx] = true;
            dst.put_pixel(xx as u32, y as u32, color);
        }
        filled += right - left + 1;

        // One seed per contiguous matching run on the neighbouring rows.
        let neighbours = [y.checked_sub(1), (y + 1 < height).then_some(y + 1)];
        for ny in neighbours.into_iter().flatten() {
            let mut in_run = false;
            for xx in left..=right {
                if matches(xx, ny, &visited) {
                    if !in_run {
                        stack.push((xx, ny));
                        in_run = true;
                    }
                } else {
                    in_run = false;
                }
            }
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn fills_whole_blank_canvas() {
        let mut canvas = RasterBuffer::new(10, 10);
        assert_eq!(flood_fill(&mut canvas, 5, 5, RED, FillParams::default()), 100);
        assert!(canvas.image().pixels().all(|p| *p == RED));
    }

    #[test]
    fn second_identical_fill_is_a_noop() {
        let mut canvas = RasterBuffer::new(10, 10);
        flood_fill(&mut canvas, 5, 5, RED, FillParams::default());
        let before = canvas.snapshot();
        let version = canvas.version();
        assert_eq!(flood_fill(&mut canvas, 5, 5, RED, FillParams::default()), 0);
        assert_eq!(canvas.snapshot(), before);
        assert_eq!(canvas.version(), version);
    }

    #[test]
    fn walls_stop_the_fill() {
        let mut canvas = RasterBuffer::new(10, 10);
        let _ = canvas.composite_over(|img| {
            for y in 0..10 {
                img.put_pixel(4, y, BLACK);
            }
        });
        let filled = flood_fill(&mut canvas, 0, 0, RED, FillParams::default());
        assert_eq!(filled, 40);
        assert_eq!(canvas.pixel(3, 9), Some(RED));
        assert_eq!(canvas.pixel(4, 9), Some(BLACK));
        assert_eq!(canvas.pixel(5, 0), Some(crate::raster::WHITE));
    }

    #[test]
    fn fills_around_concave_shapes() {
        // A U-shaped wall: the region inside and outside the U stays connected below it.
        let mut canvas = RasterBuffer::new(12, 12);
        let _ = canvas.composite_over(|img| {
            for y in 2..8 {
                img.put_pixel(3, y, BLACK);
                img.put_pixel(8, y, BLACK);
            }
            for x in 3..=8 {
                img.put_pixel(x, 2, BLACK);
            }
        });
        let filled = flood_fill(&mut canvas, 5, 5, RED, FillParams::default());
        assert_eq!(filled, 144 - 6 - 6 - 4);
        assert_eq!(canvas.pixel(0, 0), Some(RED));
    }

    #[test]
    fn out_of_bounds_is_a_noop() {
        let mut canvas = RasterBuffer::new(10, 10);
        assert_eq!(flood_fill(&mut canvas, -1, 3, RED, FillParams::default()), 0);
        assert_eq!(flood_fill(&mut canvas, 3, 10, RED, FillParams::default()), 0);
        assert!(canvas.image().pixels().all(|p| *p == crate::raster::WHITE));
    }
}
