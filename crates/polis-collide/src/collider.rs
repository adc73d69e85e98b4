use hashbrown::HashMap;
use polis_geom::{Aabb, Capsule, Ray, Triangle, Vec3};
use serde::Deserialize;

use crate::bvh::Bvh;
use crate::scene::{CollidableMesh, NodeId, Scene};

#[derive(Clone, Debug, Deserialize)]
pub struct ColliderConfig {
    #[serde(default = "default_leaf_size")]
    pub leaf_size: usize,
    /// Resolution passes for `capsule_push_out`.
    #[serde(default = "default_push_iterations")]
    pub push_iterations: usize,
    /// Extra separation added to every push so resolved shapes stop touching.
    #[serde(default = "default_skin")]
    pub skin: f32,
}

fn default_leaf_size() -> usize {
    4
}
fn default_push_iterations() -> usize {
    8
}
fn default_skin() -> f32 {
    1e-3
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self {
            leaf_size: default_leaf_size(),
            push_iterations: default_push_iterations(),
            skin: default_skin(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    /// Faces the ray origin.
    pub normal: Vec3,
    pub node: NodeId,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePoint {
    pub point: Vec3,
    pub distance: f32,
    pub normal: Vec3,
    pub node: NodeId,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub point: Vec3,
    /// Unit direction from the surface toward the sphere center.
    pub normal: Vec3,
    pub depth: f32,
    pub node: NodeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Unchanged,
    Appended(usize),
    Rebuilt,
}

/// Merged world-space triangles of every collidable scene mesh.
#[derive(Clone, Debug, Default)]
pub struct EnvironmentCollider {
    config: ColliderConfig,
    tris: Vec<Triangle>,
    owners: Vec<NodeId>,
    bvh: Bvh,
    sources: HashMap<NodeId, u64>,
}

impl EnvironmentCollider {
    pub fn new(config: ColliderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.tris.len()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.sources.contains_key(&id)
    }

    pub fn bounds(&self) -> Aabb {
        self.bvh.bounds()
    }

    /// Discards everything and re-collects every collidable mesh in `scene`.
    pub fn rebuild_from_static_scene(&mut self, scene: &Scene) {
        self.tris.clear();
        self.owners.clear();
        self.sources.clear();
        let meshes = scene.collidable_meshes();
        for m in &meshes {
            self.push_mesh(m);
        }
        self.bvh = Bvh::build(&self.tris, self.config.leaf_size);
        log::info!(
            "collider rebuilt: {} triangles from {} nodes ({} bvh nodes)",
            self.tris.len(),
            self.sources.len(),
            self.bvh.node_count()
        );
    }

    /// Appends meshes added since the last build when nothing already merged
    /// changed or disappeared; otherwise rebuilds from scratch.
    pub fn refresh(&mut self, scene: &Scene) -> RefreshOutcome {
        let meshes = scene.collidable_meshes();
        let current: HashMap<NodeId, u64> = meshes.iter().map(|m| (m.id, m.revision)).collect();
        let stale = self
            .sources
            .iter()
            .any(|(id, rev)| current.get(id) != Some(rev));
        if stale {
            log::debug!("collider refresh: merged nodes changed, rebuilding");
            self.rebuild_from_static_scene(scene);
            return RefreshOutcome::Rebuilt;
        }
        let before = self.sources.len();
        let fresh: Vec<&CollidableMesh<'_>> = meshes
            .iter()
            .filter(|m| !self.sources.contains_key(&m.id))
            .collect();
        for m in fresh {
            self.push_mesh(m);
        }
        let added = self.sources.len() - before;
        if added == 0 {
            return RefreshOutcome::Unchanged;
        }
        self.bvh = Bvh::build(&self.tris, self.config.leaf_size);
        log::debug!("collider refresh: appended {added} nodes, {} triangles", self.tris.len());
        RefreshOutcome::Appended(added)
    }

    fn push_mesh(&mut self, m: &CollidableMesh<'_>) {
        for tri in m.mesh.triangles() {
            let world = Triangle::new(m.to_world(tri.a), m.to_world(tri.b), m.to_world(tri.c));
            if !(world.a.is_finite() && world.b.is_finite() && world.c.is_finite()) {
                continue;
            }
            self.tris.push(world);
            self.owners.push(m.id);
        }
        self.sources.insert(m.id, m.revision);
    }

    pub fn raycast(&self, ray: &Ray, max_dist: f32) -> Option<RayHit> {
        if ray.is_degenerate() || !(max_dist > 0.0) {
            return None;
        }
        let (i, t) = self
            .bvh
            .raycast(ray, max_dist, |i| self.tris[i as usize].intersect_ray(ray))?;
        let tri = &self.tris[i as usize];
        let mut normal = tri.normal();
        if normal.dot(ray.dir) > 0.0 {
            normal = -normal;
        }
        Some(RayHit {
            distance: t,
            point: ray.at(t),
            normal,
            node: self.owners[i as usize],
        })
    }

    pub fn nearest_surface(&self, p: Vec3, max_dist: f32) -> Option<SurfacePoint> {
        if !p.is_finite() || !(max_dist >= 0.0) {
            return None;
        }
        let (i, distance) = self.bvh.nearest(p, max_dist, |i| {
            let q = self.tris[i as usize].closest_point(p);
            let d = p - q;
            d.dot(d)
        })?;
        let tri = &self.tris[i as usize];
        let point = tri.closest_point(p);
        Some(SurfacePoint {
            point,
            distance,
            normal: self.facing_normal(tri, point, p),
            node: self.owners[i as usize],
        })
    }

    /// Every triangle the sphere penetrates, deepest first.
    pub fn sphere_contacts(&self, center: Vec3, radius: f32) -> Vec<Contact> {
        let mut out = Vec::new();
        if !center.is_finite() || !(radius > 0.0) {
            return out;
        }
        let query = Aabb::new(center, center).expanded(radius);
        self.bvh.query_aabb(&query, |i| {
            let tri = &self.tris[i as usize];
            let q = tri.closest_point(center);
            let d = center.distance(q);
            if d < radius {
                out.push(Contact {
                    point: q,
                    normal: self.facing_normal(tri, q, center),
                    depth: radius - d,
                    node: self.owners[i as usize],
                });
            }
        });
        out.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        out
    }

    /// Offset that moves the capsule out of all geometry, or `None` when it
    /// already is clear. The capsule is resolved as overlapping spheres spaced
    /// along its core segment.
    pub fn capsule_push_out(&self, capsule: &Capsule) -> Option<Vec3> {
        if self.is_empty() || !(capsule.radius > 0.0) {
            return None;
        }
        let axis = capsule.b - capsule.a;
        let steps = ((axis.length() / capsule.radius).ceil() as usize).clamp(1, 64);
        let mut offset = Vec3::ZERO;
        for _ in 0..self.config.push_iterations.max(1) {
            let deepest = (0..=steps)
                .filter_map(|k| {
                    let center = capsule.a + axis * (k as f32 / steps as f32) + offset;
                    self.sphere_contacts(center, capsule.radius).into_iter().next()
                })
                .max_by(|a, b| a.depth.total_cmp(&b.depth));
            match deepest {
                Some(c) => offset += c.normal * (c.depth + self.config.skin),
                None => break,
            }
        }
        (offset.length() > 0.0).then_some(offset)
    }

    fn facing_normal(&self, tri: &Triangle, surface: Vec3, toward: Vec3) -> Vec3 {
        let d = toward - surface;
        if d.length() > 1e-5 {
            return d.normalized();
        }
        tri.normal()
    }
}
