//! Box blur over a summed-area table.
//!
//! Each output channel is the rounded mean of the in-bounds pixels in a
//! `(2r+1) x (2r+1)` window centred on the pixel. Windows are clipped at the
//! borders, so edge pixels average fewer samples. One table per RGB channel
//! makes every window sum O(1).

use blockflow_core::ImageData;

use crate::to_channel;

/// Window radius for a blur intensity: `max(1, floor(intensity / 10))`.
pub fn blur_radius(intensity: f64) -> usize {
    let r = (intensity / 10.0).floor();
    if r >= 1.0 {
        r as usize
    } else {
        1
    }
}

/// Inclusive prefix sums of one channel, padded with a zero row and column.
struct SummedArea {
    stride: usize,
    sums: Vec<u64>,
}

impl SummedArea {
    fn build(image: &ImageData, channel: usize) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let stride = w + 1;
        let mut sums = vec![0u64; stride * (h + 1)];
        for y in 0..h {
            let mut row = 0u64;
            for x in 0..w {
                row += image.pixel(x, y)[channel] as u64;
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }
        SummedArea { stride, sums }
    }

    /// Sum over the half-open rectangle `[x0, x1) x [y0, y1)`.
    fn window(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let at = |x: usize, y: usize| self.sums[y * self.stride + x];
        at(x1, y1) + at(x0, y0) - at(x0, y1) - at(x1, y0)
    }
}

/// Blurs `image` with a radius derived from `intensity`.
pub fn box_blur(image: &ImageData, intensity: f64) -> ImageData {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let radius = blur_radius(intensity).min(w.max(h));
    let tables = [0, 1, 2].map(|c| SummedArea::build(image, c));

    ImageData::from_fn(image.width(), image.height(), |x, y| {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius + 1).min(w);
        let y1 = (y + radius + 1).min(h);
        let count = ((x1 - x0) * (y1 - y0)) as f64;
        let mean = |t: &SummedArea| to_channel(t.window(x0, y0, x1, y1) as f64 / count);
        [
            mean(&tables[0]),
            mean(&tables[1]),
            mean(&tables[2]),
            image.pixel(x, y)[3],
        ]
    })
}
