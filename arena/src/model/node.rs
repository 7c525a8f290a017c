use bevy::prelude::*;

use super::geometry::Geometry;
use super::part::PartTag;

/// Surface description of a mesh node.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSpec {
    pub base_color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub metallic: f32,
    pub roughness: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub double_sided: bool,
    pub wireframe: bool,
}

impl Default for MaterialSpec {
    fn default() -> Self {
        Self {
            base_color: Color::WHITE,
            emissive: Color::BLACK,
            emissive_intensity: 0.0,
            metallic: 0.3,
            roughness: 0.4,
            opacity: 1.0,
            transparent: false,
            double_sided: false,
            wireframe: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshSpec {
    pub geometry: Geometry,
    pub material: MaterialSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Joint wrapper inserted so a limb rotates about its anatomical root.
    Pivot,
    Group,
    Mesh(MeshSpec),
}

/// Built, mutable scene hierarchy of one character.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub transform: Transform,
    pub kind: NodeKind,
    pub part: Option<PartTag>,
    /// Declared y at construction.
    pub base_y: f32,
    /// Declared Euler rotation (XYZ) at construction.
    pub base_rotation: Vec3,
    pub children: Vec<RenderNode>,
}

impl RenderNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            transform: Transform::IDENTITY,
            kind,
            part: None,
            base_y: 0.0,
            base_rotation: Vec3::ZERO,
            children: Vec::new(),
        }
    }

    pub fn mesh(&self) -> Option<&MeshSpec> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn is_pivot(&self) -> bool {
        matches!(self.kind, NodeKind::Pivot)
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    pub fn mesh_count(&self) -> usize {
        usize::from(self.mesh().is_some())
            + self.children.iter().map(Self::mesh_count).sum::<usize>()
    }

    /// Visits every node with its world transform and its parent, parents first.
    pub fn walk<'a>(
        &'a self,
        parent_world: GlobalTransform,
        parent: Option<&'a RenderNode>,
        visitor: &mut impl FnMut(&'a RenderNode, &GlobalTransform, Option<&'a RenderNode>),
    ) {
        let world = parent_world.mul_transform(self.transform);
        visitor(self, &world, parent);
        for child in &self.children {
            child.walk(world, Some(self), visitor);
        }
    }

    /// World-space bounds of every mesh in the hierarchy, treating `self`
    /// as a scene root.
    pub fn world_bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut bounds: Option<(Vec3, Vec3)> = None;
        self.walk(GlobalTransform::IDENTITY, None, &mut |node, world, _| {
            let Some(mesh) = node.mesh() else {
                return;
            };
            let half = mesh.geometry.half_extents();
            for corner in box_corners(half) {
                let point = world.transform_point(corner);
                bounds = Some(match bounds {
                    Some((min, max)) => (min.min(point), max.max(point)),
                    None => (point, point),
                });
            }
        });
        bounds
    }

    /// First node in depth-first order matching `predicate`.
    pub fn find(&self, predicate: &impl Fn(&RenderNode) -> bool) -> Option<&RenderNode> {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(predicate))
    }

    /// World transform of the first node matching `predicate`.
    pub fn find_world(&self, predicate: &impl Fn(&RenderNode) -> bool) -> Option<GlobalTransform> {
        let mut found = None;
        self.walk(GlobalTransform::IDENTITY, None, &mut |node, world, _| {
            if found.is_none() && predicate(node) {
                found = Some(*world);
            }
        });
        found
    }
}

fn box_corners(half: Vec3) -> [Vec3; 8] {
    [
        Vec3::new(-half.x, -half.y, -half.z),
        Vec3::new(half.x, -half.y, -half.z),
        Vec3::new(-half.x, half.y, -half.z),
        Vec3::new(half.x, half.y, -half.z),
        Vec3::new(-half.x, -half.y, half.z),
        Vec3::new(half.x, -half.y, half.z),
        Vec3::new(-half.x, half.y, half.z),
        Vec3::new(half.x, half.y, half.z),
    ]
}
