#[macro_use]
extern crate log;

extern crate image;

pub mod bitmap;
pub mod controls;
pub mod diagram;
pub mod optics;
pub mod parsing;
pub mod prelude;
pub mod surface;
pub mod vec2d;

pub use vec2d::Vec2D;

pub fn rgb_to_u32(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}
