use crate::bitmap::{Bitmap, Rgba};
use crate::rgb_to_u32;
use crate::vec2d::Vec2D;

use nalgebra::Point2;

pub const CLEAR_COLOR: Rgba = [255, 255, 255, 255];

/// Dash pattern for stroked lines, in pixels along the segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Dash {
    pub on: f32,
    pub off: f32,
    pub phase: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Paint {
    pub color: Rgba,
    pub stroke_width: f32,
    pub dash: Option<Dash>,
}

impl Paint {
    pub fn stroke(stroke_width: f32) -> Paint {
        Paint {
            color: [0, 0, 0, 255],
            stroke_width,
            dash: None,
        }
    }

    pub fn colored(color: Rgba, stroke_width: f32) -> Paint {
        Paint {
            color,
            stroke_width,
            dash: None,
        }
    }

    pub fn with_dash(mut self, dash: Dash) -> Paint {
        self.dash = Some(dash);
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointMode {
    /// each point stamped as a square of the stroke width
    Points,
    /// consecutive points connected
    Polyline,
    /// points paired off into disconnected segments
    Lines,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn create(top_left: Point2<f32>, width: f32, height: f32) -> Rect {
        Rect {
            left: top_left.x,
            top: top_left.y,
            width,
            height,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

/// Multiplies bitmap pixels channel-wise before blitting. With a white tint
/// this reproduces a destination-in blend against the tint alpha.
#[derive(Copy, Clone, Debug)]
pub struct ColorFilter {
    pub tint: Rgba,
}

impl ColorFilter {
    pub fn blend_alpha(alpha: u8) -> ColorFilter {
        ColorFilter {
            tint: [255, 255, 255, alpha],
        }
    }

    fn apply(&self, pixel: Rgba) -> Rgba {
        let scale = |value: u8, factor: u8| ((value as u16 * factor as u16) / 255) as u8;
        [
            scale(pixel[0], self.tint[0]),
            scale(pixel[1], self.tint[1]),
            scale(pixel[2], self.tint[2]),
            scale(pixel[3], self.tint[3]),
        ]
    }
}

/// Fixed-size raster surface with a persistent backing buffer. Every
/// primitive clips; out-of-range or non-finite coordinates are skipped,
/// never a panic.
pub struct Surface {
    pixels: Vec2D<Rgba>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Surface {
        Surface {
            pixels: Vec2D::new(width, height, CLEAR_COLOR),
        }
    }

    pub fn width(&self) -> usize {
        self.pixels.width
    }

    pub fn height(&self) -> usize {
        self.pixels.height
    }

    pub fn at(&self, x: usize, y: usize) -> Rgba {
        self.pixels.at(x, y)
    }

    pub fn clear(&mut self) {
        self.pixels.fill(CLEAR_COLOR);
    }

    pub fn draw_line(&mut self, p0: Point2<f32>, p1: Point2<f32>, paint: &Paint) {
        if !(p0.x.is_finite() && p0.y.is_finite() && p1.x.is_finite() && p1.y.is_finite()) {
            return;
        }
        let (width, height) = (self.width() as f32, self.height() as f32);
        let Some((t0, t1)) = clip_segment(p0, p1, width, height) else {
            return;
        };
        let (dx, dy) = (p1.x - p0.x, p1.y - p0.y);
        let segment_length = (dx * dx + dy * dy).sqrt();
        let (ax, ay) = (p0.x + t0 * dx, p0.y + t0 * dy);
        let (bx, by) = (p0.x + t1 * dx, p0.y + t1 * dy);
        let steps = ((bx - ax).abs().max((by - ay).abs()).ceil() as i32).max(0);
        let half = (paint.stroke_width / 2.0).floor().max(0.0) as i32;

        for i in 0..=steps {
            let s = if steps == 0 {
                0.0
            } else {
                i as f32 / steps as f32
            };
            if let Some(dash) = paint.dash {
                let period = dash.on + dash.off;
                if period > 0.0 {
                    // dash distance measured from the unclipped start
                    let travelled =
                        (t0 + s * (t1 - t0)) * segment_length + dash.phase;
                    if travelled.rem_euclid(period) >= dash.on {
                        continue;
                    }
                }
            }
            let cx = (ax + s * (bx - ax)).round() as i32;
            let cy = (ay + s * (by - ay)).round() as i32;
            self.stamp(cx, cy, half, paint.color);
        }
    }

    pub fn draw_points(&mut self, points: &[Point2<f32>], mode: PointMode, paint: &Paint) {
        match mode {
            PointMode::Points => {
                let half = (paint.stroke_width / 2.0).floor().max(0.0) as i32;
                for p in points {
                    if p.x.is_finite() && p.y.is_finite() {
                        self.stamp(p.x.round() as i32, p.y.round() as i32, half, paint.color);
                    }
                }
            }
            PointMode::Polyline => {
                for pair in points.windows(2) {
                    self.draw_line(pair[0], pair[1], paint);
                }
            }
            PointMode::Lines => {
                for pair in points.chunks_exact(2) {
                    self.draw_line(pair[0], pair[1], paint);
                }
            }
        }
    }

    /// Nearest-neighbour blit of `bitmap` scaled into `dest`, source-over
    /// blended, optionally filtered.
    pub fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: Rect, filter: Option<ColorFilter>) {
        if bitmap.width() == 0 || bitmap.height() == 0 {
            return;
        }
        if !dest.is_finite() || dest.width <= 0.0 || dest.height <= 0.0 {
            return;
        }
        let x_start = (dest.left.floor() as i64).max(0);
        let y_start = (dest.top.floor() as i64).max(0);
        let x_end = ((dest.left + dest.width).ceil() as i64).min(self.width() as i64);
        let y_end = ((dest.top + dest.height).ceil() as i64).min(self.height() as i64);

        for y in y_start..y_end {
            let v = (y as f32 - dest.top) / dest.height;
            let sy = ((v * bitmap.height() as f32) as usize).min(bitmap.height() - 1);
            for x in x_start..x_end {
                let u = (x as f32 - dest.left) / dest.width;
                let sx = ((u * bitmap.width() as f32) as usize).min(bitmap.width() - 1);
                let mut pixel = bitmap.pixels.at(sx, sy);
                if let Some(filter) = filter {
                    pixel = filter.apply(pixel);
                }
                self.blend_pixel(x as i32, y as i32, pixel);
            }
        }
    }

    /// Packs the backing buffer into the 0RGB words minifb presents.
    pub fn present_into(&self, out: &mut [u32]) {
        debug_assert_eq!(out.len(), self.pixels.total_pixels());
        for (slot, pixel) in out.iter_mut().zip(self.pixels.buffer.iter()) {
            *slot = rgb_to_u32(pixel[0], pixel[1], pixel[2]);
        }
    }

    fn stamp(&mut self, cx: i32, cy: i32, half: i32, color: Rgba) {
        for oy in -half..=half {
            for ox in -half..=half {
                self.blend_pixel(cx + ox, cy + oy, color);
            }
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x as usize >= self.width() || y as usize >= self.height() {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let src_a = color[3] as f32 / 255.0;
        if src_a >= 1.0 {
            self.pixels.write_at(x, y, color);
            return;
        }
        if src_a <= 0.0 {
            return;
        }
        let dst = self.pixels.at(x, y);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let blend = |s: u8, d: u8| -> u8 {
            ((s as f32 * src_a + d as f32 * dst_a * (1.0 - src_a)) / out_a)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        self.pixels.write_at(
            x,
            y,
            [
                blend(color[0], dst[0]),
                blend(color[1], dst[1]),
                blend(color[2], dst[2]),
                (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
            ],
        );
    }
}

/// Liang-Barsky clip of the segment `p0..p1` against `[0,w] x [0,h]`.
/// Returns the clipped parameter range along the segment.
fn clip_segment(p0: Point2<f32>, p1: Point2<f32>, w: f32, h: f32) -> Option<(f32, f32)> {
    let (dx, dy) = (p1.x - p0.x, p1.y - p0.y);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    for (p, q) in [
        (-dx, p0.x),
        (dx, w - p0.x),
        (-dy, p0.y),
        (dy, h - p0.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                if r > t0 {
                    t0 = r;
                }
            } else {
                if r < t0 {
                    return None;
                }
                if r < t1 {
                    t1 = r;
                }
            }
        }
    }
    Some((t0, t1))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clear_resets_buffer() {
        let mut surface = Surface::new(8, 8);
        surface.draw_line(
            Point2::new(0.0, 4.0),
            Point2::new(8.0, 4.0),
            &Paint::stroke(2.0),
        );
        assert_ne!(surface.at(4, 4), CLEAR_COLOR);
        surface.clear();
        assert_eq!(surface.at(4, 4), CLEAR_COLOR);
    }

    #[test]
    fn test_horizontal_line_writes_pixels() {
        let mut surface = Surface::new(16, 16);
        surface.draw_line(
            Point2::new(0.0, 8.0),
            Point2::new(16.0, 8.0),
            &Paint::colored([255, 0, 0, 255], 2.0),
        );
        for x in 0..16 {
            assert_eq!(surface.at(x, 8), [255, 0, 0, 255]);
        }
    }

    #[test]
    fn test_non_finite_endpoints_are_skipped() {
        let mut surface = Surface::new(8, 8);
        surface.draw_line(
            Point2::new(f32::INFINITY, 0.0),
            Point2::new(4.0, f32::NAN),
            &Paint::stroke(2.0),
        );
        surface.draw_points(
            &[Point2::new(f32::NAN, 1.0)],
            PointMode::Points,
            &Paint::stroke(10.0),
        );
        assert!(surface.pixels.buffer.iter().all(|&p| p == CLEAR_COLOR));
    }

    #[test]
    fn test_far_off_canvas_segment_is_cheap_and_clean() {
        let mut surface = Surface::new(8, 8);
        surface.draw_line(
            Point2::new(1.0e30, 2.0e30),
            Point2::new(3.0e30, 2.0e30),
            &Paint::stroke(2.0),
        );
        assert!(surface.pixels.buffer.iter().all(|&p| p == CLEAR_COLOR));
    }

    #[test]
    fn test_dashed_line_leaves_gaps() {
        let mut surface = Surface::new(64, 8);
        let paint = Paint::colored([0, 0, 255, 255], 1.0).with_dash(Dash {
            on: 5.0,
            off: 5.0,
            phase: 20.0,
        });
        surface.draw_line(Point2::new(0.0, 4.0), Point2::new(64.0, 4.0), &paint);
        let written = (0..64).filter(|&x| surface.at(x, 4) != CLEAR_COLOR).count();
        assert!(written > 0);
        assert!(written < 64);
    }

    #[test]
    fn test_blit_clips_to_canvas() {
        let mut bitmap = Bitmap::new(2, 2);
        bitmap.pixels.fill([0, 255, 0, 255]);
        let mut surface = Surface::new(4, 4);
        surface.draw_bitmap(
            &bitmap,
            Rect::create(Point2::new(-10.0, -10.0), 100.0, 100.0),
            None,
        );
        assert_eq!(surface.at(0, 0), [0, 255, 0, 255]);
        assert_eq!(surface.at(3, 3), [0, 255, 0, 255]);
    }

    #[test]
    fn test_blit_skips_non_finite_rect() {
        let mut bitmap = Bitmap::new(2, 2);
        bitmap.pixels.fill([0, 255, 0, 255]);
        let mut surface = Surface::new(4, 4);
        surface.draw_bitmap(
            &bitmap,
            Rect::create(Point2::new(f32::INFINITY, 0.0), f32::NAN, 2.0),
            None,
        );
        assert!(surface.pixels.buffer.iter().all(|&p| p == CLEAR_COLOR));
    }

    #[test]
    fn test_color_filter_scales_alpha() {
        let filter = ColorFilter::blend_alpha(192);
        let filtered = filter.apply([255, 128, 0, 255]);
        assert_eq!(filtered[3], 192);
        assert_eq!(filtered[0], 255);
        assert_eq!(filtered[1], 128);
    }
}
