//! Gradient-magnitude edge detection.
//!
//! Works on the per-pixel luminance `(R + G + B) / 3`. The output is an
//! opaque gray image whose value is `min(255, sqrt(gx^2 + gy^2))`. Pixels
//! where the kernel would leave the image get magnitude 0.

use blockflow_core::{EdgeAlgorithm, ImageData};

use crate::to_channel;

type Kernel3 = [[f64; 3]; 3];

const SOBEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];
const PREWITT_X: Kernel3 = [[-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0]];
const PREWITT_Y: Kernel3 = [[-1.0, -1.0, -1.0], [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];

/// Row-major luminance plane.
struct Luma {
    width: usize,
    values: Vec<f64>,
}

impl Luma {
    fn of(image: &ImageData) -> Self {
        let values = image
            .data()
            .chunks_exact(4)
            .map(|px| (px[0] as f64 + px[1] as f64 + px[2] as f64) / 3.0)
            .collect();
        Luma {
            width: image.width() as usize,
            values,
        }
    }

    fn at(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    /// Correlates a 3x3 kernel centred on `(x, y)`; caller keeps it in bounds.
    fn correlate(&self, kernel: &Kernel3, x: usize, y: usize) -> f64 {
        let mut acc = 0.0;
        for (ky, row) in kernel.iter().enumerate() {
            for (kx, weight) in row.iter().enumerate() {
                acc += weight * self.at(x + kx - 1, y + ky - 1);
            }
        }
        acc
    }
}

/// Computes the edge-magnitude image of `image` with the given kernel family.
pub fn detect_edges(image: &ImageData, algorithm: EdgeAlgorithm) -> ImageData {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let luma = Luma::of(image);

    ImageData::from_fn(image.width(), image.height(), |x, y| {
        let gradient = match algorithm {
            EdgeAlgorithm::Sobel => interior3(x, y, w, h)
                .then(|| (luma.correlate(&SOBEL_X, x, y), luma.correlate(&SOBEL_Y, x, y))),
            EdgeAlgorithm::Prewitt => interior3(x, y, w, h).then(|| {
                (
                    luma.correlate(&PREWITT_X, x, y),
                    luma.correlate(&PREWITT_Y, x, y),
                )
            }),
            EdgeAlgorithm::Roberts => (x + 1 < w && y + 1 < h).then(|| {
                (
                    luma.at(x, y) - luma.at(x + 1, y + 1),
                    luma.at(x + 1, y) - luma.at(x, y + 1),
                )
            }),
        };
        let magnitude =
            gradient.map_or(0, |(gx, gy)| to_channel((gx * gx + gy * gy).sqrt().min(255.0)));
        [magnitude, magnitude, magnitude, 255]
    })
}

/// Returns `true` if a 3x3 window centred on `(x, y)` fits in the image.
fn interior3(x: usize, y: usize, w: usize, h: usize) -> bool {
    x >= 1 && y >= 1 && x + 1 < w && y + 1 < h
}
