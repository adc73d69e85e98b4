use std::cell::Cell;

use polis_geom::{Aabb, Ray, Triangle, Vec3};

#[derive(Clone, Copy, Debug)]
enum Link {
    Leaf { start: u32, count: u32 },
    Inner { left: u32, right: u32 },
}

#[derive(Clone, Copy, Debug)]
struct Node {
    bounds: Aabb,
    link: Link,
}

/// Median-split bounding volume hierarchy over a triangle slice. Stores
/// triangle indices only; the triangles stay with the caller.
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    nodes: Vec<Node>,
    order: Vec<u32>,
}

impl Bvh {
    pub fn build(tris: &[Triangle], leaf_size: usize) -> Self {
        let mut bvh = Bvh {
            nodes: Vec::with_capacity(tris.len().max(1) * 2 / leaf_size.max(1) + 1),
            order: (0..tris.len() as u32).collect(),
        };
        if tris.is_empty() {
            return bvh;
        }
        let centroids: Vec<Vec3> = tris.iter().map(Triangle::centroid).collect();
        let bounds: Vec<Aabb> = tris.iter().map(Triangle::aabb).collect();
        bvh.split(0, tris.len(), leaf_size.max(1), &centroids, &bounds);
        bvh
    }

    fn split(&mut self, start: usize, end: usize, leaf: usize, centroids: &[Vec3], bounds: &[Aabb]) -> u32 {
        let range = &mut self.order[start..end];
        let node_bounds = range
            .iter()
            .fold(Aabb::EMPTY, |acc, &i| acc.union(&bounds[i as usize]));
        let index = self.nodes.len() as u32;
        self.nodes.push(Node {
            bounds: node_bounds,
            link: Link::Leaf {
                start: start as u32,
                count: (end - start) as u32,
            },
        });
        if end - start <= leaf {
            return index;
        }

        let spread = Aabb::from_points(range.iter().map(|&i| centroids[i as usize])).extents();
        let axis = if spread.x >= spread.y && spread.x >= spread.z {
            0
        } else if spread.y >= spread.z {
            1
        } else {
            2
        };
        let mid = (end - start) / 2;
        range.select_nth_unstable_by(mid, |&a, &b| {
            centroids[a as usize]
                .axis(axis)
                .total_cmp(&centroids[b as usize].axis(axis))
        });

        let left = self.split(start, start + mid, leaf, centroids, bounds);
        let right = self.split(start + mid, end, leaf, centroids, bounds);
        self.nodes[index as usize].link = Link::Inner { left, right };
        index
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn bounds(&self) -> Aabb {
        self.nodes.first().map_or(Aabb::EMPTY, |n| n.bounds)
    }

    /// Closest hit within `max_t`. `hit` tests one triangle index and returns its distance.
    pub fn raycast(&self, ray: &Ray, max_t: f32, mut hit: impl FnMut(u32) -> Option<f32>) -> Option<(u32, f32)> {
        let mut best: Option<(u32, f32)> = None;
        let limit = Cell::new(max_t);
        self.walk(
            |b| b.ray_entry(ray, limit.get()).is_some(),
            |tri| {
                if let Some(t) = hit(tri) {
                    if t <= limit.get() {
                        limit.set(t);
                        best = Some((tri, t));
                    }
                }
            },
        );
        best
    }

    /// Visits every triangle index whose leaf overlaps `query`.
    pub fn query_aabb(&self, query: &Aabb, mut visit: impl FnMut(u32)) {
        self.walk(|b| b.intersects(query), |tri| visit(tri));
    }

    /// Closest triangle to `p` within `max_dist`. `dist_sq` measures one triangle.
    pub fn nearest(&self, p: Vec3, max_dist: f32, mut dist_sq: impl FnMut(u32) -> f32) -> Option<(u32, f32)> {
        let mut best: Option<(u32, f32)> = None;
        let limit = Cell::new(max_dist * max_dist);
        self.walk(
            |b| b.distance_sq(p) <= limit.get(),
            |tri| {
                let d = dist_sq(tri);
                if d <= limit.get() {
                    limit.set(d);
                    best = Some((tri, d));
                }
            },
        );
        best.map(|(i, d)| (i, d.sqrt()))
    }

    // `enter` is re-evaluated per node; `leaf` may tighten what it tests.
    fn walk(&self, mut enter: impl FnMut(&Aabb) -> bool, mut leaf: impl FnMut(u32)) {
        if self.nodes.is_empty() {
            return;
        }
        let mut stack = vec![0u32];
        while let Some(i) = stack.pop() {
            let node = self.nodes[i as usize];
            if !enter(&node.bounds) {
                continue;
            }
            match node.link {
                Link::Leaf { start, count } => {
                    for &tri in &self.order[start as usize..(start + count) as usize] {
                        leaf(tri);
                    }
                }
                Link::Inner { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
    }
}
