//! Palette extraction.
//!
//! ```text
//! PixelImage ──► sample (≤ sample_cap, seeded) ──► k-means++ per size ──► Palette(k)
//!           └──► exact color frequencies ──► LAB merge ──► Palette(dominant)
//! ```
//!
//! Palette sizes are independent, so they are clustered on the rayon pool.
//! Each size seeds its own generator, which keeps results identical no
//! matter how the work is scheduled.

mod cache;
mod dominant;
mod kmeans;

pub use cache::{ImageHash, PaletteCache};
pub use dominant::dominant_colors;
pub use kmeans::{Cluster, kmeans};

use crate::core::{Lcg, PixelImage, Rgb};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Cluster counts offered as palette suggestions.
pub const PALETTE_SIZES: [usize; 10] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 12];

/// Ordered colors, most dominant first. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn first(&self) -> Option<Rgb> {
        self.colors.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rgb> {
        self.colors.iter()
    }
}

impl From<Vec<Rgb>> for Palette {
    fn from(colors: Vec<Rgb>) -> Self {
        Self::new(colors)
    }
}

/// Key of a palette suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PaletteLabel {
    Size(usize),
    Dominant,
}

impl fmt::Display for PaletteLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Size(k) => write!(f, "{k}"),
            Self::Dominant => f.write_str("dominant"),
        }
    }
}

pub type PaletteSet = BTreeMap<PaletteLabel, Palette>;

/// Extractor tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteOptions {
    /// Upper bound on pixels fed to clustering.
    pub sample_cap: usize,
    pub seed: u64,
    pub max_iterations: usize,
    /// Size of the frequency-counted palette.
    pub dominant_count: usize,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            sample_cap: 10_000,
            seed: 42,
            max_iterations: 24,
            dominant_count: 8,
        }
    }
}

impl PaletteOptions {
    fn salt(&self) -> Vec<u8> {
        let mut salt = Vec::with_capacity(32);
        salt.extend_from_slice(&(self.sample_cap as u64).to_le_bytes());
        salt.extend_from_slice(&self.seed.to_le_bytes());
        salt.extend_from_slice(&(self.max_iterations as u64).to_le_bytes());
        salt.extend_from_slice(&(self.dominant_count as u64).to_le_bytes());
        salt
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PaletteExtractor {
    options: PaletteOptions,
}

impl PaletteExtractor {
    pub fn new(options: PaletteOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PaletteOptions {
        &self.options
    }

    /// Palettes for every requested size plus the dominant palette.
    pub fn extract(&self, image: &PixelImage, sizes: &[usize]) -> PaletteSet {
        let samples = self.sample(image);
        let clustered: Vec<(PaletteLabel, Palette)> = sizes
            .par_iter()
            .map(|&k| (PaletteLabel::Size(k), self.cluster_samples(&samples, k)))
            .collect();

        let mut set: PaletteSet = clustered.into_iter().collect();
        set.insert(PaletteLabel::Dominant, self.dominant(image));
        set
    }

    /// Same as [`extract`](Self::extract), memoized by image content.
    pub fn extract_cached(
        &self,
        cache: &PaletteCache,
        image: &PixelImage,
        sizes: &[usize],
    ) -> std::sync::Arc<PaletteSet> {
        let mut salt = self.options.salt();
        for k in sizes {
            salt.extend_from_slice(&(*k as u64).to_le_bytes());
        }
        let key = ImageHash::of(image).with_salt(&salt);
        cache.get_or_insert_with(key, || self.extract(image, sizes))
    }

    /// Single k-means palette.
    pub fn cluster(&self, image: &PixelImage, k: usize) -> Palette {
        self.cluster_samples(&self.sample(image), k)
    }

    /// Frequency-counted palette.
    pub fn dominant(&self, image: &PixelImage) -> Palette {
        Palette::new(dominant_colors(image, self.options.dominant_count))
    }

    fn cluster_samples(&self, samples: &[Rgb], k: usize) -> Palette {
        let clusters = kmeans(samples, k, self.options.seed, self.options.max_iterations);
        Palette::new(clusters.into_iter().map(|c| c.color).collect())
    }

    /// Uniform sample of at most `sample_cap` pixels.
    ///
    /// Small images are used whole. Larger ones draw indices from a
    /// generator seeded by the options, so the sample is reproducible.
    pub fn sample(&self, image: &PixelImage) -> Vec<Rgb> {
        let total = image.pixel_count();
        let cap = self.options.sample_cap.max(1);
        if total <= cap {
            return image.pixels().collect();
        }
        let mut rng = Lcg::new(self.options.seed);
        let mut indices: Vec<usize> = (0..cap).map(|_| rng.below(total)).collect();
        indices.sort_unstable();
        indices.into_iter().map(|i| image.pixel_at(i)).collect()
    }
}

/// Palette size closest to `wanted` among [`PALETTE_SIZES`].
pub fn nearest_size(wanted: usize) -> usize {
    PALETTE_SIZES
        .iter()
        .copied()
        .min_by_key(|&k| (k as isize - wanted as isize).unsigned_abs())
        .unwrap_or(2)
}
