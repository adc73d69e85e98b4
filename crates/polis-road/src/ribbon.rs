use polis_geom::{MeshData, Vec2, Vec3};
use polis_terrain::HeightSampler;

use crate::curve::RoadCurve;

/// Road strip draped on the terrain. `uvs[i]` is `[across, meters along]`.
#[derive(Clone, Debug, Default)]
pub struct RibbonMesh {
    pub mesh: MeshData,
    pub uvs: Vec<[f32; 2]>,
}

impl RoadCurve {
    /// Builds `segments` quads along the curve. Edge heights come from `sampler`
    /// (curve height where the terrain has no sample) plus `lift`.
    pub fn to_ribbon_mesh<S>(
        &self,
        width_fn: impl Fn(f32) -> f32,
        sampler: &S,
        segments: u32,
        lift: f32,
    ) -> RibbonMesh
    where
        S: HeightSampler + ?Sized,
    {
        let segments = segments.max(1) as usize;
        let mut positions = Vec::with_capacity((segments + 1) * 2);
        let mut uvs = Vec::with_capacity((segments + 1) * 2);
        let mut along = 0.0f32;
        let mut prev_center: Option<Vec3> = None;

        for i in 0..=segments {
            let u = i as f32 / segments as f32;
            let center = self.point_at(u);
            let mut dir = self.tangent_at(u).xz().normalized();
            if dir.length() < 1e-6 {
                dir = Vec2::new(1.0, 0.0);
            }
            let side = dir.perp();
            let half = width_fn(u).max(0.0) * 0.5;
            if let Some(prev) = prev_center {
                along += prev.distance(center);
            }
            prev_center = Some(center);

            for (k, edge) in [center.xz() + side * half, center.xz() - side * half]
                .into_iter()
                .enumerate()
            {
                let y = sampler.sample(edge.x, edge.y).unwrap_or(center.y) + lift;
                positions.push(Vec3::new(edge.x, y, edge.y));
                uvs.push([k as f32, along]);
            }
        }

        let mut indices = Vec::with_capacity(segments * 6);
        for i in 0..segments as u32 {
            let l0 = i * 2;
            let r0 = l0 + 1;
            let l1 = l0 + 2;
            let r1 = l0 + 3;
            indices.extend_from_slice(&[l0, l1, r0, r0, l1, r1]);
        }

        RibbonMesh {
            mesh: MeshData { positions, indices },
            uvs,
        }
    }
}
