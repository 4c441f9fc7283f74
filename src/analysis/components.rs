//! Connected-component labeling over boolean masks.
//!
//! Shared by the analyzer (text-like edge blobs), the contour pipeline
//! (speckle removal) and text-region refinement.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Four,
    Eight,
}

/// Summary of one connected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub label: u32,
    pub pixel_count: usize,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Component {
    #[inline]
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Width over height.
    #[inline]
    pub fn aspect(&self) -> f64 {
        f64::from(self.width()) / f64::from(self.height())
    }

    /// Fraction of the bounding box covered by the component.
    #[inline]
    pub fn fill_ratio(&self) -> f64 {
        self.pixel_count as f64 / (f64::from(self.width()) * f64::from(self.height()))
    }
}

/// Component labels per pixel (`0` = background, components start at 1).
pub struct Labeling {
    pub labels: Vec<u32>,
    pub components: Vec<Component>,
}

/// BFS labeling of the set pixels of `mask`.
pub fn label_components(
    mask: &[bool],
    width: u32,
    height: u32,
    connectivity: Connectivity,
) -> Labeling {
    let w = width as usize;
    let h = height as usize;
    let mut labels = vec![0u32; w * h];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    const N4: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
    const N8: [(isize, isize); 8] = [
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];
    let neighbors: &[(isize, isize)] = match connectivity {
        Connectivity::Four => &N4,
        Connectivity::Eight => &N8,
    };

    for start in 0..w * h {
        if !mask[start] || labels[start] != 0 {
            continue;
        }
        let label = components.len() as u32 + 1;
        let sx = (start % w) as u32;
        let sy = (start / w) as u32;
        let mut comp = Component {
            label,
            pixel_count: 0,
            min_x: sx,
            min_y: sy,
            max_x: sx,
            max_y: sy,
        };

        labels[start] = label;
        queue.push_back(start);
        while let Some(idx) = queue.pop_front() {
            let x = idx % w;
            let y = idx / w;
            comp.pixel_count += 1;
            comp.min_x = comp.min_x.min(x as u32);
            comp.min_y = comp.min_y.min(y as u32);
            comp.max_x = comp.max_x.max(x as u32);
            comp.max_y = comp.max_y.max(y as u32);

            for &(dx, dy) in neighbors {
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let n = ny as usize * w + nx as usize;
                if mask[n] && labels[n] == 0 {
                    labels[n] = label;
                    queue.push_back(n);
                }
            }
        }
        components.push(comp);
    }

    Labeling { labels, components }
}
