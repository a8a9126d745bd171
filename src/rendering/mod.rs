//! Schematic rendering pipeline for the built-in HTTP backend
//!
//! This is deliberately not an HTML renderer: pages are reduced to stacked
//! text blocks, painted as a small command set, and rasterized into an RGBA
//! frame. Backends with a real renderer (the CDP adapter) bypass it and
//! produce frames directly.

#[cfg(feature = "http")]
pub mod layout;
pub mod paint;
pub mod raster;

use image::RgbaImage;

use crate::error::{Error, Result};

/// An RGBA8 raster of the live viewport
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, `width * height * 4` bytes
    pub pixels: Vec<u8>,
}

impl Frame {
    /// A solid-white frame, the paint of an empty viewport
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0xff; (width as usize) * (height as usize) * 4],
        }
    }

    /// RGBA value at a pixel; panics when out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height);
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn into_image(self) -> Result<RgbaImage> {
        let (w, h) = (self.width, self.height);
        RgbaImage::from_raw(w, h, self.pixels)
            .ok_or_else(|| Error::Render(format!("frame buffer does not match {}x{}", w, h)))
    }

    pub fn from_image(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }
}
