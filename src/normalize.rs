//! Canvas normalization for a batch of rendered slides.
//!
//! Every image is letterboxed onto a canvas as large as the biggest width
//! and the biggest height in the batch, scaled without distortion and
//! centered on a solid background.

use crate::{Error, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Solid RGB background used for padding and transparency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background(pub [u8; 3]);

impl Default for Background {
    fn default() -> Self {
        Background([10, 15, 26])
    }
}

impl Background {
    pub fn rgb(self) -> Rgb<u8> {
        Rgb(self.0)
    }
}

impl FromStr for Background {
    type Err = Error;

    /// Accepts `#rrggbb`, `rrggbb` or `r,g,b`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::ConfigError(format!("Invalid background color '{}'", s));

        if s.contains(',') {
            let parts = s
                .split(',')
                .map(|p| p.trim().parse::<u8>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| invalid())?;
            return match parts.as_slice() {
                [r, g, b] => Ok(Background([*r, *g, *b])),
                _ => Err(invalid()),
            };
        }

        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Background([channel(0)?, channel(2)?, channel(4)?]))
    }
}

/// Width and height of an image on disk, without decoding pixels
pub fn image_dimensions(path: &Path) -> Option<(u32, u32)> {
    match image::image_dimensions(path) {
        Ok(dims) => Some(dims),
        Err(e) => {
            warn!("Could not read dimensions of {}: {}", path.display(), e);
            None
        }
    }
}

/// Largest width and largest height across the readable images
pub fn canvas_target(paths: &[PathBuf]) -> Option<(u32, u32)> {
    let (w, h) = paths
        .iter()
        .filter_map(|p| image_dimensions(p))
        .fold((0, 0), |(mw, mh), (w, h)| (mw.max(w), mh.max(h)));
    (w > 0 && h > 0).then_some((w, h))
}

/// Letterbox every image of the batch onto a common canvas, in place.
///
/// Returns the canvas size, or `None` when no image could be read. Images
/// that fail to process are logged and left untouched.
pub fn normalize(paths: &[PathBuf], background: Background) -> Option<(u32, u32)> {
    let (width, height) = canvas_target(paths)?;
    debug!("Normalizing {} image(s) to {}x{}", paths.len(), width, height);

    for path in paths {
        if let Err(e) = fit_to_canvas(path, width, height, None, background) {
            warn!(
                "Could not resize image {} to {}x{}: {}",
                path.display(),
                width,
                height,
                e
            );
        }
    }

    Some((width, height))
}

/// Scale one image to fit `width` x `height`, center it on a background
/// canvas and save it as PNG to `output` (or over the source).
pub fn fit_to_canvas(
    path: &Path,
    width: u32,
    height: u32,
    output: Option<&Path>,
    background: Background,
) -> Result<PathBuf> {
    if width == 0 || height == 0 {
        return Err(Error::Other(format!("Empty canvas {}x{}", width, height)));
    }

    let source = image::open(path)?;
    let rgb = flatten(source, background);
    let canvas = letterbox(&rgb, width, height, background);

    let output = output.unwrap_or(path).to_path_buf();
    canvas.save_with_format(&output, ImageFormat::Png)?;
    Ok(output)
}

/// Composite an image onto the background at its own size, producing RGB.
///
/// Images with an alpha channel are blended using it as the mask; other
/// non-RGB modes are converted opaquely.
pub fn flatten(image: DynamicImage, background: Background) -> RgbImage {
    if let DynamicImage::ImageRgb8(rgb) = image {
        return rgb;
    }
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let [r, g, b] = background.0;
    let rgba = image.to_rgba8();
    let mut canvas = RgbaImage::from_pixel(rgba.width(), rgba.height(), Rgba([r, g, b, 255]));
    imageops::overlay(&mut canvas, &rgba, 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

/// Size of `(w, h)` scaled uniformly to fit inside `(width, height)`
pub fn fitted_size(w: u32, h: u32, width: u32, height: u32) -> (u32, u32) {
    let scale = f64::min(width as f64 / w as f64, height as f64 / h as f64);
    let sw = ((w as f64 * scale).round() as u32).clamp(1, width);
    let sh = ((h as f64 * scale).round() as u32).clamp(1, height);
    (sw, sh)
}

/// Scale `image` to fit and paste it centered on a `width` x `height` canvas
pub fn letterbox(image: &RgbImage, width: u32, height: u32, background: Background) -> RgbImage {
    let (sw, sh) = fitted_size(image.width(), image.height(), width, height);

    let mut canvas = RgbImage::from_pixel(width, height, background.rgb());
    let x = ((width - sw) / 2) as i64;
    let y = ((height - sh) / 2) as i64;

    if (sw, sh) == image.dimensions() {
        imageops::overlay(&mut canvas, image, x, y);
    } else {
        let scaled = imageops::resize(image, sw, sh, FilterType::Lanczos3);
        imageops::overlay(&mut canvas, &scaled, x, y);
    }
    canvas
}
