//! Snapshot capture: scale the live viewport onto an output surface of
//! arbitrary dimensions and encode it as a PNG with alpha.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageError, ImageOutputFormat, RgbaImage};
use log::debug;

use crate::error::{Error, Result};
use crate::rendering::Frame;

/// How the live viewport is mapped onto the output surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalePolicy {
    /// Independent per-axis factors; content fills the whole surface
    #[default]
    PerAxis,
    /// Historic behavior: one uniform factor applied to both axes, chosen by
    /// comparing live width and height (`scale_x` when width < height, else
    /// `scale_y`). Content is drawn at the origin; the rest of the surface
    /// stays transparent and overflow is cropped.
    UniformLegacy,
}

/// Scale `frame` to exactly `width x height` under the given policy.
pub fn snapshot_image(
    frame: &Frame,
    width: u32,
    height: u32,
    policy: ScalePolicy,
) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(Error::Config(format!(
            "snapshot dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }
    let live = frame.clone().into_image()?;
    let (live_w, live_h) = live.dimensions();

    let out = match policy {
        ScalePolicy::PerAxis => imageops::resize(&live, width, height, FilterType::Triangle),
        ScalePolicy::UniformLegacy => {
            let scale_x = width as f64 / live_w as f64;
            let scale_y = height as f64 / live_h as f64;
            let factor = if live_w < live_h { scale_x } else { scale_y };
            let scaled_w = ((live_w as f64 * factor).round() as u32).max(1);
            let scaled_h = ((live_h as f64 * factor).round() as u32).max(1);
            debug!(
                "legacy uniform scale {:.3} -> content {}x{} on {}x{} surface",
                factor, scaled_w, scaled_h, width, height
            );
            let content = imageops::resize(&live, scaled_w, scaled_h, FilterType::Triangle);
            let mut surface = RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 0]));
            imageops::overlay(&mut surface, &content, 0, 0);
            surface
        }
    };
    Ok(out)
}

/// Render the frame at `width x height` and write it as a PNG at `path`.
///
/// Filesystem failures surface as [`Error::Io`]; encoder failures as
/// [`Error::Encode`].
pub fn write_snapshot<P: AsRef<Path>>(
    frame: &Frame,
    path: P,
    width: u32,
    height: u32,
    policy: ScalePolicy,
) -> Result<()> {
    let image = snapshot_image(frame, width, height, policy)?;
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    image
        .write_to(&mut writer, ImageOutputFormat::Png)
        .map_err(|e| match e {
            ImageError::IoError(io) => Error::Io(io),
            other => Error::Encode(other.to_string()),
        })?;
    debug!(
        "snapshot {}x{} written to {}",
        width,
        height,
        path.as_ref().display()
    );
    Ok(())
}
