pub use crate::bitmap::{Bitmap, Rgba};
pub use crate::diagram::RayDiagram;
pub use crate::optics::{OpticalType, RayLayout};
pub use crate::rgb_to_u32;
pub use crate::surface::{Dash, Paint, PointMode, Rect, Surface};
pub use crate::vec2d::Vec2D;

pub use nalgebra::{Point2, Vector2};
