use crate::vec2d::Vec2D;

use anyhow::Context;
use image::imageops::FilterType;
use image::RgbaImage;

use std::path::Path;

pub type Rgba = [u8; 4];

/// Straight-alpha RGBA bitmap, row-major.
#[derive(Clone, Debug)]
pub struct Bitmap {
    pub pixels: Vec2D<Rgba>,
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Bitmap {
        Bitmap {
            pixels: Vec2D::new(width, height, [0, 0, 0, 0]),
        }
    }

    pub fn width(&self) -> usize {
        self.pixels.width
    }

    pub fn height(&self) -> usize {
        self.pixels.height
    }

    pub fn from_rgba_image(img: RgbaImage) -> Bitmap {
        let (width, height) = img.dimensions();
        let mut bitmap = Bitmap::new(width as usize, height as usize);
        for (x, y, pixel) in img.enumerate_pixels() {
            bitmap.pixels.write_at(x as usize, y as usize, pixel.0);
        }
        bitmap
    }

    /// Decodes an object image. A missing or undecodable file is the normal
    /// "no object loaded" state, not an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Option<Bitmap> {
        let path = path.as_ref();
        if !path.is_file() {
            info!("no object image at {}", path.display());
            return None;
        }
        match image::open(path) {
            Ok(img) => Some(Bitmap::from_rgba_image(img.into_rgba8())),
            Err(e) => {
                warn!("failed to decode object image {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Loads an element icon, upscaled by an integer factor with Lanczos3
    /// resampling. A missing icon is a packaging defect and propagates.
    pub fn load_scaled<P: AsRef<Path>>(path: P, factor: u32) -> anyhow::Result<Bitmap> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("failed to load icon at {}", path.display()))?;
        let rgba = img.into_rgba8();
        let (width, height) = rgba.dimensions();
        let resized = image::imageops::resize(
            &rgba,
            width * factor,
            height * factor,
            FilterType::Lanczos3,
        );
        Ok(Bitmap::from_rgba_image(resized))
    }

    pub fn horizontal_flip(&self) -> Bitmap {
        let (width, height) = (self.width(), self.height());
        let mut out = Bitmap::new(width, height);
        for y in 0..height {
            for x in 0..width {
                out.pixels.write_at(x, y, self.pixels.at(width - 1 - x, y));
            }
        }
        out
    }

    pub fn vertical_flip(&self) -> Bitmap {
        let (width, height) = (self.width(), self.height());
        let mut out = Bitmap::new(width, height);
        for y in 0..height {
            for x in 0..width {
                out.pixels.write_at(x, y, self.pixels.at(x, height - 1 - y));
            }
        }
        out
    }

    /// Reverses the flat pixel sequence. This is deliberately the literal
    /// reversal, not a rotation; the compositing offsets downstream assume
    /// exactly this transform.
    pub fn pixel_reverse(&self) -> Bitmap {
        Bitmap {
            pixels: Vec2D {
                buffer: self.pixels.buffer.iter().rev().copied().collect(),
                width: self.width(),
                height: self.height(),
            },
        }
    }
}
