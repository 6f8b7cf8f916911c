//! Pixel kernels applied by filter nodes.
//!
//! Every kernel reads an [`ImageData`] and returns a new image of the same
//! size. Channel arithmetic is done in `f64`, then rounded and clamped into
//! `0..=255`. Alpha passes through unchanged except in edge detection,
//! which writes an opaque magnitude image.

pub mod blur;
pub mod color;
pub mod edge;

use blockflow_core::{ImageData, ImageFilter};

pub use blur::box_blur;
pub use color::{brightness, contrast, grayscale};
pub use edge::detect_edges;

/// Runs `filter` over `image`.
///
/// `intensity` is ignored by filters that do not take one.
pub fn apply(filter: ImageFilter, image: &ImageData, intensity: f64) -> ImageData {
    match filter {
        ImageFilter::Grayscale => grayscale(image),
        ImageFilter::Brightness => brightness(image, intensity),
        ImageFilter::Contrast => contrast(image, intensity),
        ImageFilter::Blur => box_blur(image, intensity),
        ImageFilter::EdgeDetect { algorithm } => detect_edges(image, algorithm),
    }
}

/// Rounds a channel value and clamps it into a byte.
pub(crate) fn to_channel(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}
