use nalgebra::{Point2, Vector2};
use serde::Deserialize;

/// The four supported element classes. Selects the conjugate formula, the
/// ray construction rules, focal point placement, the icon asset and the
/// image compositing rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpticalType {
    ConvergingLens,
    DivergingLens,
    ConvergingMirror,
    DivergingMirror,
}

impl OpticalType {
    pub fn asset_name(self) -> &'static str {
        match self {
            OpticalType::ConvergingLens => "converging_lens",
            OpticalType::DivergingLens => "diverging_lens",
            OpticalType::ConvergingMirror => "converging_mirror",
            OpticalType::DivergingMirror => "diverging_mirror",
        }
    }

    pub fn converging(self) -> bool {
        matches!(
            self,
            OpticalType::ConvergingLens | OpticalType::ConvergingMirror
        )
    }

    /// Lens-family compositing: image forms on the object side of the axis
    /// origin. Mirror-family elements form it on the element side.
    pub fn is_lens(self) -> bool {
        matches!(self, OpticalType::ConvergingLens | OpticalType::DivergingLens)
    }
}

/// Image distance for object distance `a` and focal length `f`.
///
/// No validation: `a == f` (converging) and `a == -f` (diverging) divide by
/// zero and propagate IEEE infinities. The surface treats non-finite
/// geometry as off-canvas, so the singular configurations render as "rays
/// never converge" rather than crashing.
pub fn image_distance(optical: OpticalType, a: f32, f: f32) -> f32 {
    if optical.converging() {
        a * f / (a - f)
    } else {
        a * -f / (a + f)
    }
}

/// Control points for one frame of the diagram. Offsets are relative to the
/// canvas-centre origin; y grows downward. Fully recomputed per frame,
/// nothing persists.
#[derive(Clone, Debug)]
pub struct RayLayout {
    /// primary and secondary focal / centre-of-curvature marks on the axis
    pub focal_points: [Point2<f32>; 2],
    pub ray_1: [Point2<f32>; 3],
    pub ray_2: [Point2<f32>; 3],
    pub ray_3: [Point2<f32>; 2],
    pub ray_4: [Point2<f32>; 3],
    pub virtual_1: Option<[Point2<f32>; 2]>,
    pub virtual_2: Option<[Point2<f32>; 2]>,
    pub virtual_3: Option<[Point2<f32>; 2]>,
    pub virtual_4: Option<[Point2<f32>; 2]>,
}

/// Derives the per-frame ray geometry. The literal proportional offsets
/// (`10f`, `9*size`, `2f`, ...) fix where off-canvas ray endpoints land and
/// are part of the visual contract.
pub fn ray_layout(
    optical: OpticalType,
    origin: Point2<f32>,
    a: f32,
    f: f32,
    size: f32,
) -> RayLayout {
    let at = |dx: f32, dy: f32| origin + Vector2::new(dx, dy);
    let object_point = at(-a, -size);
    let bend_1 = at(0.0, -size);

    let mut layout = RayLayout {
        focal_points: [Point2::origin(); 2],
        ray_1: [object_point, bend_1, Point2::origin()],
        ray_2: [object_point, Point2::origin(), Point2::origin()],
        ray_3: [Point2::origin(); 2],
        ray_4: [object_point, origin, Point2::origin()],
        virtual_1: None,
        virtual_2: None,
        virtual_3: None,
        virtual_4: None,
    };

    match optical {
        OpticalType::ConvergingLens => {
            layout.ray_1[2] = at(-10.0 * f, 9.0 * size);
            layout.ray_2[1] = at(0.0, size * f / (a - f));
            layout.ray_2[2] = at(-10.0 * f, size * f / (a - f));
            layout.ray_3[0] = object_point;
            layout.ray_3[1] = at(0.0, 2.0 * size * f / (a - 2.0 * f));
            layout.ray_4[2] = at(-10.0 * f, 10.0 * size * f / a);

            if a < f {
                layout.virtual_1 = Some([layout.ray_1[1], at(10.0 * f, -11.0 * size)]);
                layout.virtual_2 = Some([layout.ray_2[1], at(10.0 * f, size * f / (a - f))]);
                layout.virtual_3 = Some([
                    layout.ray_3[1],
                    at(10.0 * f, 12.0 * size * f / (a - 2.0 * f)),
                ]);
                layout.virtual_4 = Some([layout.ray_4[1], at(10.0 * f, -10.0 * size * f / a)]);
            } else if a < 2.0 * f {
                layout.virtual_3 = Some([
                    layout.ray_3[0],
                    at(-10.0 * f, -8.0 * size * f / (a - 2.0 * f)),
                ]);
            }

            layout.focal_points = [at(-f, 0.0), at(-2.0 * f, 0.0)];
        }
        OpticalType::DivergingLens => {
            layout.ray_1[2] = at(-f, -2.0 * size);
            layout.ray_2[1] = at(0.0, -size * f / (a + f));
            layout.ray_2[2] = at(-2.0 * f, -size * f / (a + f));
            layout.ray_3[0] = object_point;
            layout.ray_3[1] = at(0.0, -2.0 * size * f / (a + 2.0 * f));
            layout.ray_4[2] = at(-2.0 * f, 2.0 * size * f / a);

            // a diverging lens always forms a virtual image
            layout.virtual_1 = Some([layout.ray_1[1], at(f, 0.0)]);
            layout.virtual_2 = Some([layout.ray_2[1], at(10.0 * f, -size * f / (a + f))]);
            layout.virtual_3 = Some([layout.ray_3[1], at(2.0 * f, 0.0)]);
            layout.virtual_4 = Some([layout.ray_4[1], at(10.0 * f, -10.0 * size * f / a)]);

            layout.focal_points = [at(f, 0.0), at(2.0 * f, 0.0)];
        }
        OpticalType::ConvergingMirror => {
            layout.ray_1[2] = at(10.0 * f, 9.0 * size);
            layout.ray_2[1] = at(0.0, size * f / (a - f));
            layout.ray_2[2] = at(10.0 * f, size * f / (a - f));
            layout.ray_4[2] = at(10.0 * f, 10.0 * size * f / a);

            if a < f {
                layout.virtual_1 = Some([layout.ray_1[1], at(-10.0 * f, -11.0 * size)]);
                layout.virtual_2 = Some([layout.ray_2[1], at(-10.0 * f, size * f / (a - f))]);
                layout.virtual_4 = Some([layout.ray_4[1], at(-10.0 * f, -10.0 * size * f / a)]);
            }

            layout.focal_points = [at(f, 0.0), at(-f, 0.0)];
        }
        OpticalType::DivergingMirror => {
            layout.ray_1[2] = at(2.0 * f, -3.0 * size);
            layout.ray_2[1] = at(0.0, -size * f / (a + f));
            layout.ray_2[2] = at(2.0 * f, -size * f / (a + f));
            layout.ray_4[2] = at(2.0 * f, 2.0 * size * f / a);

            layout.virtual_1 = Some([layout.ray_1[1], at(-f, 0.0)]);
            layout.virtual_2 = Some([layout.ray_2[1], at(-2.0 * f, -size * f / (a + f))]);

            layout.focal_points = [at(-f, 0.0), at(f, 0.0)];
        }
    }

    layout
}

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f32 = 1.0e-4;

    fn close(left: f32, right: f32) -> bool {
        (left - right).abs() < EPS
    }

    #[test]
    fn test_converging_image_distance_sweep() {
        for optical in [OpticalType::ConvergingLens, OpticalType::ConvergingMirror] {
            // a > 2f: real, diminished
            assert!(close(image_distance(optical, 300.0, 100.0), 150.0));
            // f < a < 2f: real, enlarged
            assert!(close(image_distance(optical, 150.0, 100.0), 300.0));
            // a < f: virtual, negative image distance
            assert!(close(image_distance(optical, 50.0, 100.0), -100.0));
        }
    }

    #[test]
    fn test_diverging_image_distance_is_always_negative() {
        for optical in [OpticalType::DivergingLens, OpticalType::DivergingMirror] {
            for a in [10.0f32, 50.0, 100.0, 250.0, 1000.0] {
                for f in [10.0f32, 100.0, 300.0] {
                    let b = image_distance(optical, a, f);
                    assert!(b < 0.0, "a={} f={} gave b={}", a, f, b);
                    assert!(close(b, a * -f / (a + f)));
                }
            }
        }
    }

    #[test]
    fn test_magnification_signs() {
        // real image: inverted
        let b = image_distance(OpticalType::ConvergingLens, 300.0, 100.0);
        assert!(close(b / 300.0, 0.5));
        // object inside focal length: virtual, m = -2
        let b = image_distance(OpticalType::ConvergingLens, 50.0, 100.0);
        assert!(close(b / 50.0, -2.0));
    }

    #[test]
    fn test_singularity_propagates_infinity() {
        let b = image_distance(OpticalType::ConvergingLens, 100.0, 100.0);
        assert!(b.is_infinite());
        let b = image_distance(OpticalType::DivergingMirror, 100.0, -100.0);
        assert!(b.is_infinite());
    }

    fn layout_for(optical: OpticalType, a: f32, f: f32) -> RayLayout {
        ray_layout(optical, Point2::new(400.0, 300.0), a, f, 50.0)
    }

    #[test]
    fn test_converging_lens_virtual_ray_table() {
        // a >= 2f: none
        let layout = layout_for(OpticalType::ConvergingLens, 200.0, 100.0);
        assert!(layout.virtual_1.is_none());
        assert!(layout.virtual_2.is_none());
        assert!(layout.virtual_3.is_none());
        assert!(layout.virtual_4.is_none());
        // f <= a < 2f: only the back-trace of ray 3
        let layout = layout_for(OpticalType::ConvergingLens, 150.0, 100.0);
        assert!(layout.virtual_1.is_none());
        assert!(layout.virtual_3.is_some());
        let layout = layout_for(OpticalType::ConvergingLens, 100.0, 100.0);
        assert!(layout.virtual_3.is_some());
        assert!(layout.virtual_4.is_none());
        // a < f: all four
        let layout = layout_for(OpticalType::ConvergingLens, 99.0, 100.0);
        assert!(layout.virtual_1.is_some());
        assert!(layout.virtual_2.is_some());
        assert!(layout.virtual_3.is_some());
        assert!(layout.virtual_4.is_some());
    }

    #[test]
    fn test_diverging_lens_virtual_rays_always_present() {
        for a in [50.0f32, 100.0, 150.0, 300.0] {
            let layout = layout_for(OpticalType::DivergingLens, a, 100.0);
            assert!(layout.virtual_1.is_some());
            assert!(layout.virtual_2.is_some());
            assert!(layout.virtual_3.is_some());
            assert!(layout.virtual_4.is_some());
        }
    }

    #[test]
    fn test_converging_mirror_virtual_ray_table() {
        let layout = layout_for(OpticalType::ConvergingMirror, 99.0, 100.0);
        assert!(layout.virtual_1.is_some());
        assert!(layout.virtual_2.is_some());
        assert!(layout.virtual_3.is_none());
        assert!(layout.virtual_4.is_some());
        // at and past the focal length: none
        for a in [100.0f32, 150.0, 300.0] {
            let layout = layout_for(OpticalType::ConvergingMirror, a, 100.0);
            assert!(layout.virtual_1.is_none());
            assert!(layout.virtual_2.is_none());
            assert!(layout.virtual_4.is_none());
        }
    }

    #[test]
    fn test_diverging_mirror_virtual_ray_table() {
        for a in [50.0f32, 100.0, 300.0] {
            let layout = layout_for(OpticalType::DivergingMirror, a, 100.0);
            assert!(layout.virtual_1.is_some());
            assert!(layout.virtual_2.is_some());
            assert!(layout.virtual_3.is_none());
            assert!(layout.virtual_4.is_none());
        }
    }

    #[test]
    fn test_converging_lens_control_points() {
        let origin = Point2::new(400.0, 300.0);
        let (a, f, size) = (300.0, 100.0, 50.0);
        let layout = ray_layout(OpticalType::ConvergingLens, origin, a, f, size);

        assert_eq!(layout.ray_1[0], origin + Vector2::new(-a, -size));
        assert_eq!(layout.ray_1[1], origin + Vector2::new(0.0, -size));
        assert_eq!(layout.ray_1[2], origin + Vector2::new(-1000.0, 450.0));
        assert_eq!(layout.ray_2[1], origin + Vector2::new(0.0, 25.0));
        assert_eq!(layout.ray_2[2], origin + Vector2::new(-1000.0, 25.0));
        assert_eq!(layout.ray_3[1], origin + Vector2::new(0.0, 100.0));
        assert_eq!(layout.ray_4[1], origin);
        assert_eq!(
            layout.ray_4[2],
            origin + Vector2::new(-1000.0, 10.0 * size * f / a)
        );
        assert_eq!(
            layout.focal_points,
            [
                origin + Vector2::new(-100.0, 0.0),
                origin + Vector2::new(-200.0, 0.0)
            ]
        );
    }

    #[test]
    fn test_mirror_ray_3_stays_degenerate() {
        let layout = layout_for(OpticalType::ConvergingMirror, 300.0, 100.0);
        assert_eq!(layout.ray_3, [Point2::origin(); 2]);
        let layout = layout_for(OpticalType::DivergingMirror, 300.0, 100.0);
        assert_eq!(layout.ray_3, [Point2::origin(); 2]);
    }

    #[test]
    fn test_layout_survives_singular_parameters() {
        // a == f divides by zero; points go non-finite but nothing panics
        let layout = layout_for(OpticalType::ConvergingLens, 100.0, 100.0);
        assert!(!layout.ray_2[1].y.is_finite());
        // a == 0 gives NaN in the chief-ray endpoint
        let layout = layout_for(OpticalType::ConvergingLens, 0.0, 100.0);
        assert!(layout.ray_4[2].y.is_nan());
    }
}
