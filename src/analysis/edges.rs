//! Sobel gradient field over grayscale luminance.

use rayon::prelude::*;

/// Sobel magnitude above which a pixel counts as an edge.
///
/// A clean step of 24 gray levels between two flat areas yields 96.
pub const EDGE_THRESHOLD: f32 = 96.0;

/// Below this magnitude a pixel is considered flat.
pub const FLAT_THRESHOLD: f32 = 2.0;

const PARALLEL_PIXEL_THRESHOLD: usize = 32 * 1024;

/// Per-pixel Sobel responses, row-major.
#[derive(Debug, Clone)]
pub struct Gradients {
    pub width: u32,
    pub height: u32,
    pub gx: Vec<f32>,
    pub gy: Vec<f32>,
    pub magnitude: Vec<f32>,
}

impl Gradients {
    /// Run 3x3 Sobel kernels with replicated borders.
    pub fn compute(luma: &[f32], width: u32, height: u32) -> Self {
        let w = width as usize;
        let h = height as usize;
        let len = w * h;
        let mut gx = vec![0.0_f32; len];
        let mut gy = vec![0.0_f32; len];

        let at = |x: isize, y: isize| -> f32 {
            let x = x.clamp(0, w as isize - 1) as usize;
            let y = y.clamp(0, h as isize - 1) as usize;
            luma[y * w + x]
        };

        let row_pass = |y: usize, gx_row: &mut [f32], gy_row: &mut [f32]| {
            let yi = y as isize;
            for x in 0..w {
                let xi = x as isize;
                let tl = at(xi - 1, yi - 1);
                let tc = at(xi, yi - 1);
                let tr = at(xi + 1, yi - 1);
                let ml = at(xi - 1, yi);
                let mr = at(xi + 1, yi);
                let bl = at(xi - 1, yi + 1);
                let bc = at(xi, yi + 1);
                let br = at(xi + 1, yi + 1);
                gx_row[x] = (tr + 2.0 * mr + br) - (tl + 2.0 * ml + bl);
                gy_row[x] = (bl + 2.0 * bc + br) - (tl + 2.0 * tc + tr);
            }
        };

        if len >= PARALLEL_PIXEL_THRESHOLD {
            gx.par_chunks_mut(w)
                .zip(gy.par_chunks_mut(w))
                .enumerate()
                .for_each(|(y, (gx_row, gy_row))| row_pass(y, gx_row, gy_row));
        } else {
            for (y, (gx_row, gy_row)) in gx.chunks_mut(w).zip(gy.chunks_mut(w)).enumerate() {
                row_pass(y, gx_row, gy_row);
            }
        }

        let magnitude = gx
            .iter()
            .zip(&gy)
            .map(|(a, b)| (a * a + b * b).sqrt())
            .collect();

        Self {
            width,
            height,
            gx,
            gy,
            magnitude,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.magnitude.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.magnitude.is_empty()
    }

    /// Binary edge map at [`EDGE_THRESHOLD`].
    pub fn edge_map(&self) -> Vec<bool> {
        self.magnitude.iter().map(|&m| m >= EDGE_THRESHOLD).collect()
    }

    /// Gradient direction in radians folded into `[0, PI)`.
    #[inline]
    pub fn orientation(&self, index: usize) -> f32 {
        let theta = self.gy[index].atan2(self.gx[index]);
        theta.rem_euclid(std::f32::consts::PI)
    }
}
