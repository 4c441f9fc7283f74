//! Gaussian smoothing of a binary mask followed by re-thresholding.

use crate::core::Mask;

/// Blur the 0/255 version of `mask` and threshold it back at `cut`.
///
/// A lower cut grows shapes slightly and rounds concave corners; a higher
/// cut shrinks them. Borders replicate, so a full mask stays full.
pub fn smooth_mask(mask: &Mask, sigma: f64, cut: u8) -> Mask {
    if sigma <= 0.0 {
        return mask.clone();
    }
    let w = mask.width() as usize;
    let h = mask.height() as usize;
    let kernel = gaussian_kernel(sigma);
    let r = kernel.len() / 2;

    let src: Vec<f32> = mask.to_gray().into_iter().map(f32::from).collect();
    let mut tmp = vec![0.0_f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (k, &kv) in kernel.iter().enumerate() {
                let sx = (x as isize + k as isize - r as isize).clamp(0, w as isize - 1) as usize;
                acc += src[y * w + sx] * kv;
            }
            tmp[y * w + x] = acc;
        }
    }

    let mut gray = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (k, &kv) in kernel.iter().enumerate() {
                let sy = (y as isize + k as isize - r as isize).clamp(0, h as isize - 1) as usize;
                acc += tmp[sy * w + x] * kv;
            }
            gray[y * w + x] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }

    Mask::from_gray(mask.width(), mask.height(), &gray, cut)
}

/// Normalized 1D kernel with radius `ceil(3 * sigma)`.
fn gaussian_kernel(sigma: f64) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil().max(1.0) as isize;
    let denom = 2.0 * sigma * sigma;
    let raw: Vec<f64> = (-radius..=radius)
        .map(|i| (-(i * i) as f64 / denom).exp())
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|v| (v / sum) as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_normalized() {
        let k = gaussian_kernel(1.5);
        assert_eq!(k.len(), 11);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(k[5] > k[4] && k[4] > k[3]);
    }

    #[test]
    fn test_full_and_empty_are_stable() {
        assert!(smooth_mask(&Mask::full(10, 10), 2.0, 100).is_full());
        assert!(smooth_mask(&Mask::new(10, 10), 2.0, 100).is_empty());
    }

    #[test]
    fn test_rounds_square_corners() {
        let square = Mask::from_fn(30, 30, |x, y| (8..22).contains(&x) && (8..22).contains(&y));
        let smoothed = smooth_mask(&square, 2.0, 128);
        // corner pixel falls below the cut, the center stays
        assert!(!smoothed.get(8, 8));
        assert!(smoothed.get(15, 15));
    }

    #[test]
    fn test_lower_cut_grows_shape() {
        let disc = Mask::from_fn(40, 40, |x, y| {
            let dx = x as i32 - 20;
            let dy = y as i32 - 20;
            dx * dx + dy * dy < 64
        });
        let low = smooth_mask(&disc, 2.0, 60).count();
        let high = smooth_mask(&disc, 2.0, 200).count();
        assert!(low > high);
    }
}
