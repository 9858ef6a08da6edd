//! Line-kernel morphological opening and ink projections.
//!
//! Opening a binary mask with a `1 x k` (or `k x 1`) rectangle keeps exactly the ink
//! runs of length `>= k` along that axis, so the opening is computed run-by-run instead
//! of as an erosion/dilation pair.

use super::binarize::InkMask;

/// Keeps only vertical ink runs at least `kernel` pixels tall.
pub fn open_vertical(mask: &InkMask, kernel: u32) -> InkMask {
    let mut out = InkMask::new(mask.width(), mask.height());
    for x in 0..mask.width() {
        let mut run_start: Option<u32> = None;
        for y in 0..=mask.height() {
            let ink = y < mask.height() && mask.get(x, y);
            match (ink, run_start) {
                (true, None) => run_start = Some(y),
                (false, Some(start)) => {
                    if y - start >= kernel {
                        for yy in start..y {
                            out.set(x, yy, true);
                        }
                    }
                    run_start = None;
                }
                _ => {}
            }
        }
    }
    out
}

/// Keeps only horizontal ink runs at least `kernel` pixels wide.
pub fn open_horizontal(mask: &InkMask, kernel: u32) -> InkMask {
    let mut out = InkMask::new(mask.width(), mask.height());
    for y in 0..mask.height() {
        let mut run_start: Option<u32> = None;
        for x in 0..=mask.width() {
            let ink = x < mask.width() && mask.get(x, y);
            match (ink, run_start) {
                (true, None) => run_start = Some(x),
                (false, Some(start)) => {
                    if x - start >= kernel {
                        for xx in start..x {
                            out.set(xx, y, true);
                        }
                    }
                    run_start = None;
                }
                _ => {}
            }
        }
    }
    out
}

/// Ink pixel count per column.
pub fn column_projection(mask: &InkMask) -> Vec<u32> {
    (0..mask.width())
        .map(|x| (0..mask.height()).filter(|&y| mask.get(x, y)).count() as u32)
        .collect()
}

/// Ink pixel count per row.
pub fn row_projection(mask: &InkMask) -> Vec<u32> {
    (0..mask.height())
        .map(|y| (0..mask.width()).filter(|&x| mask.get(x, y)).count() as u32)
        .collect()
}

/// Merges sorted pixel positions whose successive gap is `<= max_gap` and returns the
/// (floored) mean of each cluster.
pub fn cluster_positions(positions: &[u32], max_gap: u32) -> Vec<u32> {
    let mut centers = Vec::new();
    let mut cluster: Vec<u32> = Vec::new();

    for &pos in positions {
        if let Some(&last) = cluster.last()
            && pos - last > max_gap
        {
            centers.push(mean_floor(&cluster));
            cluster.clear();
        }
        cluster.push(pos);
    }
    if !cluster.is_empty() {
        centers.push(mean_floor(&cluster));
    }

    centers
}

fn mean_floor(values: &[u32]) -> u32 {
    let sum: u64 = values.iter().map(|&v| v as u64).sum();
    (sum / values.len() as u64) as u32
}
