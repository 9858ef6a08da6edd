//! Otsu thresholding into an ink mask.

use image::GrayImage;

/// Row-major boolean mask; `true` marks an ink (dark) pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InkMask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl InkMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, ink: bool) {
        let idx = self.index(x, y);
        self.data[idx] = ink;
    }

    pub fn ink_count(&self) -> usize {
        self.data.iter().filter(|&&ink| ink).count()
    }
}

/// Otsu's threshold: the gray level maximizing between-class variance.
pub fn otsu_level(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }

    let weighted_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut background_weight = 0u64;
    let mut background_sum = 0f64;
    let mut best_level = 0u8;
    let mut best_variance = -1f64;

    for (level, &count) in histogram.iter().enumerate() {
        background_weight += count;
        if background_weight == 0 {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0 {
            break;
        }

        background_sum += level as f64 * count as f64;
        let background_mean = background_sum / background_weight as f64;
        let foreground_mean = (weighted_sum - background_sum) / foreground_weight as f64;
        let diff = background_mean - foreground_mean;
        let variance = background_weight as f64 * foreground_weight as f64 * diff * diff;

        if variance > best_variance {
            best_variance = variance;
            best_level = level as u8;
        }
    }

    best_level
}

/// Inverted binarization: pixels at or below the Otsu level become ink.
pub fn binarize_inverted(image: &GrayImage) -> InkMask {
    let level = otsu_level(image);
    let mut mask = InkMask::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        mask.set(x, y, pixel.0[0] <= level);
    }
    mask
}
