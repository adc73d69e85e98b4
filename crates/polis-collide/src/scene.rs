//! Static scene graph handed to the collider and the renderer.

use polis_geom::{MeshData, Vec3};

pub type NodeId = u32;

/// Translation, yaw about +Y and per-axis scale, applied scale first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub yaw: f32,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        yaw: 0.0,
        scale: Vec3::new(1.0, 1.0, 1.0),
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Local point to parent space. Local +Z maps to `(sin yaw, cos yaw)` in XZ.
    #[inline]
    pub fn apply(&self, p: Vec3) -> Vec3 {
        let s = Vec3::new(p.x * self.scale.x, p.y * self.scale.y, p.z * self.scale.z);
        rotate_yaw(s, self.yaw) + self.translation
    }
}

#[inline]
pub fn rotate_yaw(v: Vec3, yaw: f32) -> Vec3 {
    let (s, c) = yaw.sin_cos();
    Vec3::new(v.x * c + v.z * s, v.y, -v.x * s + v.z * c)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    #[default]
    Group,
    Terrain,
    Road,
    Plaza,
    Building,
    Water,
    Vegetation,
    Prop,
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    id: NodeId,
    revision: u64,
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub mesh: Option<MeshData>,
    /// Cleared for decorative geometry; applies to the whole subtree.
    pub collidable: bool,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: 0,
            revision: 0,
            name: name.into(),
            kind,
            transform: Transform::IDENTITY,
            mesh: None,
            collidable: true,
            children: Vec::new(),
        }
    }

    pub fn with_mesh(mut self, mesh: MeshData) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_collidable(mut self, collidable: bool) -> Self {
        self.collidable = collidable;
        self
    }

    pub fn non_collidable(self) -> Self {
        self.with_collidable(false)
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Assigned when the node is added to a [`Scene`]; 0 before that.
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn assign_ids(&mut self, next: &mut NodeId) {
        *next += 1;
        self.id = *next;
        self.revision = 1;
        for child in &mut self.children {
            child.assign_ids(next);
        }
    }

    fn bump(&mut self) {
        self.revision += 1;
        for child in &mut self.children {
            child.bump();
        }
    }

    fn find(&self, id: NodeId) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    fn find_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::count).sum::<usize>()
    }
}

/// A mesh reachable through a fully collidable ancestor chain.
pub struct CollidableMesh<'a> {
    pub id: NodeId,
    pub revision: u64,
    pub mesh: &'a MeshData,
    /// Innermost first.
    pub chain: Vec<Transform>,
}

impl CollidableMesh<'_> {
    pub fn to_world(&self, p: Vec3) -> Vec3 {
        self.chain.iter().fold(p, |acc, t| t.apply(acc))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    roots: Vec<SceneNode>,
    next_id: NodeId,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subtree at the root and returns the id given to its top node.
    pub fn add(&mut self, mut node: SceneNode) -> NodeId {
        node.assign_ids(&mut self.next_id);
        let id = node.id;
        self.roots.push(node);
        id
    }

    /// Adds `node` under `parent`; `None` when the parent does not exist.
    pub fn add_child(&mut self, parent: NodeId, mut node: SceneNode) -> Option<NodeId> {
        let mut next = self.next_id;
        let parent = self.roots.iter_mut().find_map(|r| r.find_mut(parent))?;
        node.assign_ids(&mut next);
        let id = node.id;
        parent.children.push(node);
        self.next_id = next;
        Some(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.roots.iter().find_map(|r| r.find(id))
    }

    /// Mutates a node and marks it and its subtree as changed.
    pub fn modify(&mut self, id: NodeId, f: impl FnOnce(&mut SceneNode)) -> bool {
        match self.roots.iter_mut().find_map(|r| r.find_mut(id)) {
            Some(node) => {
                f(node);
                node.bump();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        if let Some(i) = self.roots.iter().position(|r| r.id == id) {
            return Some(self.roots.remove(i));
        }
        fn take(node: &mut SceneNode, id: NodeId) -> Option<SceneNode> {
            if let Some(i) = node.children.iter().position(|c| c.id == id) {
                return Some(node.children.remove(i));
            }
            node.children.iter_mut().find_map(|c| take(c, id))
        }
        self.roots.iter_mut().find_map(|r| take(r, id))
    }

    pub fn roots(&self) -> &[SceneNode] {
        &self.roots
    }

    pub fn node_count(&self) -> usize {
        self.roots.iter().map(SceneNode::count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Every mesh-bearing node whose whole ancestor chain is collidable.
    pub fn collidable_meshes(&self) -> Vec<CollidableMesh<'_>> {
        fn walk<'a>(node: &'a SceneNode, parents: &[Transform], out: &mut Vec<CollidableMesh<'a>>) {
            if !node.collidable {
                return;
            }
            let mut chain = Vec::with_capacity(parents.len() + 1);
            chain.push(node.transform);
            chain.extend_from_slice(parents);
            if let Some(mesh) = node.mesh.as_ref() {
                if !mesh.is_empty() {
                    out.push(CollidableMesh {
                        id: node.id,
                        revision: node.revision,
                        mesh,
                        chain: chain.clone(),
                    });
                }
            }
            for child in &node.children {
                walk(child, &chain, out);
            }
        }
        let mut out = Vec::new();
        for root in &self.roots {
            walk(root, &[], &mut out);
        }
        out
    }
}
