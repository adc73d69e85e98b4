use polis_geom::{MeshData, Vec3};

use crate::field::{HeightField, SurfaceWeights};

impl HeightField {
    /// World-space vertex grid with two triangles per cell (+Y facing).
    pub fn to_mesh(&self) -> MeshData {
        let n = self.segments() as usize + 1;
        let half = self.half_extent();
        let cell = self.cell_size();
        let xf = self.transform();
        let mut positions = Vec::with_capacity(n * n);
        for j in 0..n {
            for i in 0..n {
                let w = xf.to_world(-half + i as f32 * cell, -half + j as f32 * cell);
                let h = self.vertex_height(i, j).unwrap_or(0.0);
                positions.push(Vec3::new(w.x, h, w.y));
            }
        }
        let seg = n - 1;
        let mut indices = Vec::with_capacity(seg * seg * 6);
        for j in 0..seg {
            for i in 0..seg {
                let a = (j * n + i) as u32;
                let b = a + 1;
                let c = a + n as u32;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }
        MeshData { positions, indices }
    }

    /// Per-vertex blend weights aligned with [`HeightField::to_mesh`] positions.
    pub fn surface_weight_grid(&self) -> Vec<SurfaceWeights> {
        self.to_mesh()
            .positions
            .iter()
            .map(|p| self.surface_weights(p.x, p.z))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::HeightField;

    #[test]
    fn mesh_vertices_match_samples() {
        let field = HeightField::from_fn(20.0, 10, |x, z| x * 0.5 + z * 0.25);
        let mesh = field.to_mesh();
        assert_eq!(mesh.vertex_count(), 11 * 11);
        assert_eq!(mesh.triangle_count(), 10 * 10 * 2);
        for p in &mesh.positions {
            let h = field.sample_height(p.x, p.z).unwrap();
            assert!((h - p.y).abs() < 1e-4);
        }
        for tri in mesh.triangles() {
            assert!(tri.normal().y > 0.0);
        }
    }
}
