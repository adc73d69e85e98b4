use crate::{Aabb, Triangle, Vec3};

/// Indexed triangle list. Positions are in whatever space the owner declares
/// (local for scene nodes, world for terrain and road exports).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.len() < 3
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Triangles whose indices are all in range; malformed trailing indices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.chunks_exact(3).filter_map(move |tri| {
            let a = *self.positions.get(tri[0] as usize)?;
            let b = *self.positions.get(tri[1] as usize)?;
            let c = *self.positions.get(tri[2] as usize)?;
            Some(Triangle::new(a, b, c))
        })
    }

    pub fn append(&mut self, other: &MeshData) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    pub fn map_positions(&self, f: impl Fn(Vec3) -> Vec3) -> MeshData {
        MeshData {
            positions: self.positions.iter().map(|p| f(*p)).collect(),
            indices: self.indices.clone(),
        }
    }

    /// Axis-aligned box centered on the origin.
    pub fn cuboid(half: Vec3) -> MeshData {
        let (x, y, z) = (half.x, half.y, half.z);
        let positions = vec![
            Vec3::new(-x, -y, -z),
            Vec3::new(x, -y, -z),
            Vec3::new(x, y, -z),
            Vec3::new(-x, y, -z),
            Vec3::new(-x, -y, z),
            Vec3::new(x, -y, z),
            Vec3::new(x, y, z),
            Vec3::new(-x, y, z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // -z
            4, 5, 6, 4, 6, 7, // +z
            0, 1, 5, 0, 5, 4, // -y
            3, 7, 6, 3, 6, 2, // +y
            0, 4, 7, 0, 7, 3, // -x
            1, 2, 6, 1, 6, 5, // +x
        ];
        MeshData { positions, indices }
    }

    /// Flat disc in the XZ plane, facing +Y.
    pub fn disc(radius: f32, segments: u32) -> MeshData {
        let segments = segments.max(3);
        let mut positions = Vec::with_capacity(segments as usize + 1);
        positions.push(Vec3::ZERO);
        for i in 0..segments {
            let a = i as f32 / segments as f32 * std::f32::consts::TAU;
            positions.push(Vec3::new(a.cos() * radius, 0.0, a.sin() * radius));
        }
        let mut indices = Vec::with_capacity(segments as usize * 3);
        for i in 0..segments {
            let next = (i + 1) % segments;
            indices.extend_from_slice(&[0, next + 1, i + 1]);
        }
        MeshData { positions, indices }
    }

    /// Flat quad in the XZ plane, facing +Y.
    pub fn quad(half_x: f32, half_z: f32) -> MeshData {
        MeshData {
            positions: vec![
                Vec3::new(-half_x, 0.0, -half_z),
                Vec3::new(half_x, 0.0, -half_z),
                Vec3::new(half_x, 0.0, half_z),
                Vec3::new(-half_x, 0.0, half_z),
            ],
            indices: vec![0, 2, 1, 0, 3, 2],
        }
    }
}
