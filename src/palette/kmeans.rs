//! Seeded k-means++ over RGB samples.

use crate::core::{Lcg, Rgb};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// Sample count above which the assignment step runs on the rayon pool.
const PARALLEL_SAMPLE_THRESHOLD: usize = 4096;

/// A cluster center and the number of samples assigned to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    pub color: Rgb,
    pub population: usize,
}

/// Cluster `samples` into at most `k` colors, most populated first.
///
/// When the samples hold no more than `k` distinct colors, those colors
/// are returned exactly; asking for more clusters than colors is fine.
pub fn kmeans(samples: &[Rgb], k: usize, seed: u64, max_iterations: usize) -> Vec<Cluster> {
    if samples.is_empty() || k == 0 {
        return Vec::new();
    }

    let distinct = distinct_counts(samples);
    if distinct.len() <= k {
        return distinct;
    }

    let points: Vec<[f32; 3]> = samples.iter().map(|c| to_f32(*c)).collect();
    let mut rng = Lcg::new(seed ^ (k as u64).wrapping_mul(0x100_0000_01B3));
    let mut centers = seed_centers(&points, k, &mut rng);
    let mut assignment = vec![usize::MAX; points.len()];

    for _ in 0..max_iterations.max(1) {
        let next = assign(&points, &centers);
        let changed = next != assignment;
        assignment = next;
        centers = recompute(&points, &assignment, &centers);
        if !changed {
            break;
        }
    }

    let mut population = vec![0usize; centers.len()];
    for &a in &assignment {
        population[a] += 1;
    }

    let mut clusters: Vec<(usize, Cluster)> = centers
        .iter()
        .zip(&population)
        .enumerate()
        .filter(|(_, (_, n))| **n > 0)
        .map(|(i, (c, n))| {
            (
                i,
                Cluster {
                    color: to_rgb(*c),
                    population: *n,
                },
            )
        })
        .collect();
    clusters.sort_by(|a, b| b.1.population.cmp(&a.1.population).then(a.0.cmp(&b.0)));
    clusters.into_iter().map(|(_, c)| c).collect()
}

/// Exact color counts, most frequent first, ties by packed value.
fn distinct_counts(samples: &[Rgb]) -> Vec<Cluster> {
    let mut counts: FxHashMap<u32, usize> = FxHashMap::default();
    for c in samples {
        *counts.entry(c.packed()).or_insert(0) += 1;
    }
    let mut out: Vec<Cluster> = counts
        .into_iter()
        .map(|(packed, population)| Cluster {
            color: Rgb::from_packed(packed),
            population,
        })
        .collect();
    out.sort_by(|a, b| {
        b.population
            .cmp(&a.population)
            .then(a.color.packed().cmp(&b.color.packed()))
    });
    out
}

/// k-means++ seeding: each new center is drawn with probability
/// proportional to its squared distance from the nearest chosen one.
fn seed_centers(points: &[[f32; 3]], k: usize, rng: &mut Lcg) -> Vec<[f32; 3]> {
    let mut centers = Vec::with_capacity(k);
    centers.push(points[rng.below(points.len())]);
    let mut nearest: Vec<f32> = points.iter().map(|p| dist_sq(p, &centers[0])).collect();

    while centers.len() < k {
        let total: f64 = nearest.iter().map(|&d| f64::from(d)).sum();
        if total <= 0.0 {
            break;
        }
        let target = rng.next_f64() * total;
        let mut acc = 0.0;
        let mut chosen = points.len() - 1;
        for (i, &d) in nearest.iter().enumerate() {
            acc += f64::from(d);
            if acc >= target && d > 0.0 {
                chosen = i;
                break;
            }
        }
        let center = points[chosen];
        for (n, p) in nearest.iter_mut().zip(points) {
            *n = n.min(dist_sq(p, &center));
        }
        centers.push(center);
    }
    centers
}

fn assign(points: &[[f32; 3]], centers: &[[f32; 3]]) -> Vec<usize> {
    let nearest = |p: &[f32; 3]| {
        let mut best = 0;
        let mut best_d = f32::INFINITY;
        for (i, c) in centers.iter().enumerate() {
            let d = dist_sq(p, c);
            if d < best_d {
                best_d = d;
                best = i;
            }
        }
        best
    };
    if points.len() >= PARALLEL_SAMPLE_THRESHOLD {
        points.par_iter().map(nearest).collect()
    } else {
        points.iter().map(nearest).collect()
    }
}

fn recompute(points: &[[f32; 3]], assignment: &[usize], old: &[[f32; 3]]) -> Vec<[f32; 3]> {
    let mut sums = vec![[0.0_f64; 3]; old.len()];
    let mut counts = vec![0usize; old.len()];
    for (p, &a) in points.iter().zip(assignment) {
        for ch in 0..3 {
            sums[a][ch] += f64::from(p[ch]);
        }
        counts[a] += 1;
    }
    old.iter()
        .zip(sums.iter().zip(&counts))
        .map(|(prev, (sum, &n))| {
            if n == 0 {
                *prev
            } else {
                let n = n as f64;
                [(sum[0] / n) as f32, (sum[1] / n) as f32, (sum[2] / n) as f32]
            }
        })
        .collect()
}

#[inline]
fn dist_sq(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    d0 * d0 + d1 * d1 + d2 * d2
}

#[inline]
fn to_f32(c: Rgb) -> [f32; 3] {
    [f32::from(c.r()), f32::from(c.g()), f32::from(c.b())]
}

#[inline]
fn to_rgb(c: [f32; 3]) -> Rgb {
    Rgb::new(
        c[0].round().clamp(0.0, 255.0) as u8,
        c[1].round().clamp(0.0, 255.0) as u8,
        c[2].round().clamp(0.0, 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_samples(rng: &mut Lcg) -> Vec<Rgb> {
        let bases = [Rgb::new(220, 30, 30), Rgb::new(30, 30, 220), Rgb::new(240, 240, 240)];
        let weights = [600, 300, 100];
        let mut out = Vec::new();
        for (base, n) in bases.iter().zip(weights) {
            for _ in 0..n {
                let jitter = |v: u8, rng: &mut Lcg| {
                    (i32::from(v) + (rng.next_u32() % 9) as i32 - 4).clamp(0, 255) as u8
                };
                out.push(Rgb::new(
                    jitter(base.r(), rng),
                    jitter(base.g(), rng),
                    jitter(base.b(), rng),
                ));
            }
        }
        out
    }

    #[test]
    fn test_clusters_ordered_by_population() {
        let mut rng = Lcg::new(11);
        let samples = noisy_samples(&mut rng);
        let clusters = kmeans(&samples, 3, 42, 30);
        assert_eq!(clusters.len(), 3);
        assert!(clusters[0].population >= clusters[1].population);
        assert!(clusters[1].population >= clusters[2].population);
        assert!(clusters[0].color.distance_sq(Rgb::new(220, 30, 30)) < 100);
        assert!(clusters[2].color.distance_sq(Rgb::new(240, 240, 240)) < 100);
    }

    #[test]
    fn test_deterministic() {
        let mut rng = Lcg::new(5);
        let samples = noisy_samples(&mut rng);
        assert_eq!(kmeans(&samples, 4, 42, 30), kmeans(&samples, 4, 42, 30));
    }

    #[test]
    fn test_more_clusters_than_colors() {
        let samples = vec![Rgb::BLACK, Rgb::WHITE, Rgb::WHITE];
        let clusters = kmeans(&samples, 12, 42, 30);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].color, Rgb::WHITE);
        assert_eq!(clusters[0].population, 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(kmeans(&[], 3, 1, 10).is_empty());
        assert!(kmeans(&[Rgb::BLACK], 0, 1, 10).is_empty());
    }
}
