use crate::bitmap::{Bitmap, Rgba};
use crate::optics::{self, OpticalType};
use crate::surface::{ColorFilter, Dash, Paint, PointMode, Rect, Surface};

use anyhow::Context;
use nalgebra::{Point2, Vector2};

use std::path::{Path, PathBuf};

/// Icons ship at half display size and are upscaled once at load.
pub const ICON_SCALE: u32 = 2;

const ORANGE: Rgba = [255, 165, 0, 255];
const GREEN: Rgba = [0, 128, 0, 255];
const BLUE: Rgba = [0, 0, 255, 255];
const DEEP_PINK: Rgba = [255, 20, 147, 255];

const VIRTUAL_DASH: Dash = Dash {
    on: 5.0,
    off: 5.0,
    phase: 20.0,
};

/// semi-transparent blend applied to the computed image so it reads as
/// distinct from the solid object
const IMAGE_BLEND_ALPHA: u8 = 192;

/// Object bitmap plus the three variants the compositing table selects
/// from. Replaced wholesale whenever the object path changes.
#[derive(Debug)]
pub struct ObjectSet {
    pub original: Bitmap,
    pub horizontal: Bitmap,
    pub vertical: Bitmap,
    pub reverse: Bitmap,
}

impl ObjectSet {
    fn from_source(original: Bitmap) -> ObjectSet {
        ObjectSet {
            horizontal: original.horizontal_flip(),
            vertical: original.vertical_flip(),
            reverse: original.pixel_reverse(),
            original,
        }
    }
}

/// The ray-diagram engine: optical selection, scalar parameters, cached
/// bitmaps, and the per-frame render over a `Surface`.
///
/// The derived values (`b`, `m`, `image_size`) are pure functions of the
/// inputs, refreshed at the top of every `render` and never mutated
/// independently.
#[derive(Debug)]
pub struct RayDiagram {
    optical: OpticalType,
    icon: Bitmap,
    object: Option<ObjectSet>,
    asset_dir: PathBuf,

    a: f32,
    f: f32,
    object_size: f32,

    b: f32,
    m: f32,
    image_size: f32,
}

impl RayDiagram {
    pub fn new<P: Into<PathBuf>>(asset_dir: P, optical: OpticalType) -> anyhow::Result<RayDiagram> {
        let asset_dir = asset_dir.into();
        let icon = load_icon(&asset_dir, optical)?;
        Ok(RayDiagram {
            optical,
            icon,
            object: None,
            asset_dir,
            a: 0.0,
            f: 0.0,
            object_size: 100.0,
            b: 0.0,
            m: 0.0,
            image_size: 0.0,
        })
    }

    pub fn optical(&self) -> OpticalType {
        self.optical
    }

    /// Switches the element class and synchronously reloads its icon.
    /// A missing icon asset is fatal.
    pub fn set_optical(&mut self, optical: OpticalType) -> anyhow::Result<()> {
        self.icon = load_icon(&self.asset_dir, optical)?;
        self.optical = optical;
        Ok(())
    }

    /// Loads the object bitmap and eagerly derives its three variants.
    /// A missing or unreadable file clears the object instead of failing.
    pub fn set_object_path<P: AsRef<Path>>(&mut self, path: P) {
        self.object = Bitmap::open(path).map(ObjectSet::from_source);
    }

    pub fn set_object_distance(&mut self, a: f32) {
        self.a = a;
    }

    pub fn set_focal_length(&mut self, f: f32) {
        self.f = f;
    }

    pub fn set_object_size(&mut self, object_size: f32) {
        self.object_size = object_size;
    }

    pub fn has_object(&self) -> bool {
        self.object.is_some()
    }

    pub fn image_distance(&self) -> f32 {
        self.b
    }

    pub fn magnification(&self) -> f32 {
        self.m
    }

    pub fn image_size(&self) -> f32 {
        self.image_size
    }

    /// Recomputes the derived optics and issues the full frame's draw calls.
    pub fn render(&mut self, surface: &mut Surface) {
        self.b = optics::image_distance(self.optical, self.a, self.f);
        self.m = self.b / self.a;
        self.image_size = self.object_size * self.m.abs();

        let origin = Point2::new(
            surface.width() as f32 / 2.0,
            surface.height() as f32 / 2.0,
        );
        let layout = optics::ray_layout(self.optical, origin, self.a, self.f, self.object_size);

        surface.clear();

        // optical axis
        surface.draw_line(
            Point2::new(0.0, origin.y),
            Point2::new(surface.width() as f32, origin.y),
            &Paint::stroke(2.0),
        );
        surface.draw_points(&layout.focal_points, PointMode::Points, &Paint::stroke(10.0));

        surface.draw_points(&layout.ray_1, PointMode::Polyline, &Paint::colored(ORANGE, 2.0));
        surface.draw_points(&layout.ray_2, PointMode::Polyline, &Paint::colored(GREEN, 2.0));
        surface.draw_points(&layout.ray_3, PointMode::Lines, &Paint::colored(BLUE, 2.0));
        surface.draw_points(
            &layout.ray_4,
            PointMode::Polyline,
            &Paint::colored(DEEP_PINK, 2.0),
        );

        for (segment, color) in [
            (&layout.virtual_1, ORANGE),
            (&layout.virtual_2, GREEN),
            (&layout.virtual_3, BLUE),
            (&layout.virtual_4, DEEP_PINK),
        ] {
            if let Some([from, to]) = segment {
                surface.draw_line(
                    *from,
                    *to,
                    &Paint::colored(color, 2.0).with_dash(VIRTUAL_DASH),
                );
            }
        }

        // element icon, centred on the origin at its pre-scaled size
        let icon_top_left = origin
            + Vector2::new(
                -(self.icon.width() as f32) / 2.0,
                -(self.icon.height() as f32) / 2.0,
            );
        surface.draw_bitmap(
            &self.icon,
            Rect::create(icon_top_left, self.icon.width() as f32, self.icon.height() as f32),
            None,
        );

        if let Some(object) = &self.object {
            let object_width = scaled_width(&object.original, self.object_size);
            surface.draw_bitmap(
                &object.original,
                Rect::create(
                    origin + Vector2::new(-self.a - object_width / 2.0, -self.object_size),
                    object_width,
                    self.object_size,
                ),
                None,
            );

            let filter = Some(ColorFilter::blend_alpha(IMAGE_BLEND_ALPHA));
            if self.optical.is_lens() {
                if self.m > 0.0 {
                    let width = scaled_width(&object.reverse, self.image_size);
                    surface.draw_bitmap(
                        &object.reverse,
                        Rect::create(
                            origin + Vector2::new(-self.b - width / 2.0, 0.0),
                            width,
                            self.image_size,
                        ),
                        filter,
                    );
                } else if self.m < 0.0 {
                    let width = scaled_width(&object.horizontal, self.image_size);
                    surface.draw_bitmap(
                        &object.horizontal,
                        Rect::create(
                            origin + Vector2::new(-self.b - width / 2.0, -self.image_size),
                            width,
                            self.image_size,
                        ),
                        filter,
                    );
                }
            } else if self.m > 0.0 {
                let width = scaled_width(&object.vertical, self.image_size);
                surface.draw_bitmap(
                    &object.vertical,
                    Rect::create(
                        origin + Vector2::new(self.b - width / 2.0, 0.0),
                        width,
                        self.image_size,
                    ),
                    filter,
                );
            } else if self.m < 0.0 {
                let width = scaled_width(&object.original, self.image_size);
                surface.draw_bitmap(
                    &object.original,
                    Rect::create(
                        origin + Vector2::new(self.b - width / 2.0, -self.image_size),
                        width,
                        self.image_size,
                    ),
                    filter,
                );
            }
            // m == 0 draws no image
        }
    }
}

/// Width that keeps the bitmap's aspect ratio at the requested height.
fn scaled_width(bitmap: &Bitmap, height: f32) -> f32 {
    height / bitmap.height() as f32 * bitmap.width() as f32
}

fn load_icon(asset_dir: &Path, optical: OpticalType) -> anyhow::Result<Bitmap> {
    let path = asset_dir.join(format!("{}.png", optical.asset_name()));
    Bitmap::load_scaled(&path, ICON_SCALE)
        .with_context(|| format!("element icon for {:?} missing from {}", optical, asset_dir.display()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::surface::CLEAR_COLOR;

    fn diagram() -> RayDiagram {
        RayDiagram::new("assets", OpticalType::ConvergingLens)
            .expect("icon assets present in the repository")
    }

    #[test]
    fn test_missing_asset_dir_is_fatal_with_diagnostic() {
        let err = RayDiagram::new("no_such_assets", OpticalType::ConvergingLens).unwrap_err();
        assert!(format!("{:#}", err).contains("no_such_assets"));
    }

    #[test]
    fn test_derived_values_follow_parameters() {
        let mut diagram = diagram();
        diagram.set_object_distance(300.0);
        diagram.set_focal_length(100.0);
        diagram.set_object_size(50.0);
        let mut surface = Surface::new(800, 600);
        diagram.render(&mut surface);
        assert!((diagram.image_distance() - 150.0).abs() < 1.0e-4);
        assert!((diagram.magnification() - 0.5).abs() < 1.0e-4);
        assert!((diagram.image_size() - 25.0).abs() < 1.0e-4);
    }

    #[test]
    fn test_virtual_case_derived_values() {
        let mut diagram = diagram();
        diagram.set_object_distance(50.0);
        diagram.set_focal_length(100.0);
        diagram.set_object_size(50.0);
        let mut surface = Surface::new(800, 600);
        diagram.render(&mut surface);
        assert!((diagram.image_distance() + 100.0).abs() < 1.0e-4);
        assert!((diagram.magnification() + 2.0).abs() < 1.0e-4);
        assert!((diagram.image_size() - 100.0).abs() < 1.0e-4);
    }

    #[test]
    fn test_missing_object_path_renders_geometry_only() {
        let mut diagram = diagram();
        diagram.set_object_path("no/such/object.png");
        assert!(!diagram.has_object());
        diagram.set_object_distance(300.0);
        diagram.set_focal_length(100.0);
        let mut surface = Surface::new(800, 600);
        diagram.render(&mut surface);
        // the axis is still drawn through the canvas centre
        assert_ne!(surface.at(10, 300), CLEAR_COLOR);
    }

    #[test]
    fn test_singular_parameters_do_not_panic() {
        let mut diagram = diagram();
        diagram.set_object_distance(100.0);
        diagram.set_focal_length(100.0);
        let mut surface = Surface::new(800, 600);
        diagram.render(&mut surface);
        assert!(diagram.image_distance().is_infinite());
        assert!(!diagram.image_size().is_finite());
    }

    #[test]
    fn test_zero_parameters_do_not_panic() {
        let mut diagram = diagram();
        diagram.set_object_distance(0.0);
        diagram.set_focal_length(0.0);
        diagram.set_object_size(0.0);
        let mut surface = Surface::new(800, 600);
        diagram.render(&mut surface);
        assert!(diagram.magnification().is_nan());
    }

    #[test]
    fn test_type_change_swaps_icon() {
        let mut diagram = diagram();
        assert!(diagram.set_optical(OpticalType::DivergingMirror).is_ok());
        assert_eq!(diagram.optical(), OpticalType::DivergingMirror);
    }
}
