//! Per-pixel colour adjustments.

use blockflow_core::ImageData;

use crate::to_channel;

/// Maps the RGB channels of every pixel, keeping alpha.
fn map_rgb(image: &ImageData, f: impl Fn(u8) -> u8) -> ImageData {
    ImageData::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.pixel(x, y);
        [f(r), f(g), f(b), a]
    })
}

/// Luminance-weighted grayscale: `0.299 R + 0.587 G + 0.114 B`.
pub fn grayscale(image: &ImageData) -> ImageData {
    ImageData::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.pixel(x, y);
        let gray = to_channel(0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64);
        [gray, gray, gray, a]
    })
}

/// Shifts every channel by `intensity` percent of the full range.
pub fn brightness(image: &ImageData, intensity: f64) -> ImageData {
    let shift = intensity / 100.0 * 255.0;
    map_rgb(image, |c| to_channel(c as f64 + shift))
}

/// Scales every channel around mid-gray by `1 + intensity / 100`.
pub fn contrast(image: &ImageData, intensity: f64) -> ImageData {
    let factor = 1.0 + intensity / 100.0;
    let intercept = 128.0 * (1.0 - factor);
    map_rgb(image, |c| to_channel(factor * c as f64 + intercept))
}
