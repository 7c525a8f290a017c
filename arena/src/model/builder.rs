//! Scene graph compiler: declarative [`SceneNode`] trees to [`RenderNode`]
//! hierarchies.
//!
//! Limb-like parts are wrapped in a pivot placed at the anatomical joint, with
//! the mesh shifted back by the same offset, so rotating the pivot swings the
//! limb about its root instead of its centre.

use bevy::prelude::*;
use protocol::SceneNode;

use super::geometry::Geometry;
use super::node::{MaterialSpec, MeshSpec, NodeKind, RenderNode};
use super::part::PartTag;

/// Distance between a wing group's declared position and its root joint.
pub const WING_GROUP_PIVOT_OFFSET: f32 = 0.3;
const EMISSIVE_INTENSITY: f32 = 0.6;

/// Compiles a scene node tree. Never fails: malformed input falls back to
/// identity transforms and unit boxes.
pub fn build(node: &SceneNode) -> RenderNode {
    let part = node.part_tag.as_deref().and_then(PartTag::parse);
    if node.shape.is_group() {
        build_group(node, part)
    } else {
        build_leaf(node, part)
    }
}

fn euler(rotation: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z)
}

fn build_group(node: &SceneNode, part: Option<PartTag>) -> RenderNode {
    let rotation = node.rotation.map(Vec3::from_array).unwrap_or(Vec3::ZERO);
    let mut group = RenderNode::new(NodeKind::Group);
    group.children = node.children.iter().map(build).collect();

    if let (Some(tag @ (PartTag::WingL | PartTag::WingR)), Some(position)) = (part, node.position) {
        let position = Vec3::from_array(position);
        // The joint sits toward the body midline; the wing hangs back outward.
        let toward_midline = if tag == PartTag::WingL {
            WING_GROUP_PIVOT_OFFSET
        } else {
            -WING_GROUP_PIVOT_OFFSET
        };
        group.transform = Transform::from_xyz(-toward_midline, 0.0, 0.0).with_rotation(euler(rotation));
        group.base_rotation = rotation;

        let mut pivot = RenderNode::new(NodeKind::Pivot);
        pivot.transform = Transform::from_translation(position + Vec3::X * toward_midline);
        pivot.part = Some(tag);
        pivot.base_y = position.y;
        pivot.children.push(group);
        return pivot;
    }

    if let Some(position) = node.position {
        group.transform.translation = Vec3::from_array(position);
    }
    group.transform.rotation = euler(rotation);
    if let Some(scale) = node.scale {
        group.transform.scale = Vec3::from_array(scale);
    }
    group.part = part;
    group.base_y = group.transform.translation.y;
    group.base_rotation = rotation;
    group
}

fn build_leaf(node: &SceneNode, part: Option<PartTag>) -> RenderNode {
    let scale = Vec3::from_array(node.scale.unwrap_or([1.0, 1.0, 1.0]));
    let rotation = node.rotation.map(Vec3::from_array).unwrap_or(Vec3::ZERO);
    let squash = sphere_squash(node, scale);

    let mut mesh = RenderNode::new(NodeKind::Mesh(MeshSpec {
        geometry: Geometry::for_node(node),
        material: material_for(node),
    }));
    mesh.transform.scale = squash;

    if let (Some(tag), Some(position)) = (part.filter(|tag| tag.needs_pivot()), node.position) {
        let position = Vec3::from_array(position);
        let (joint, mesh_offset) = joint_offsets(tag, scale);

        let mut pivot = RenderNode::new(NodeKind::Pivot);
        pivot.transform.translation = position + joint;
        pivot.part = Some(tag);
        pivot.base_y = position.y;
        pivot.base_rotation = Vec3::new(0.0, 0.0, rotation.z);

        mesh.transform.translation = mesh_offset;
        if tag.is_arm() {
            // Arms keep their splay on the joint so idle swings preserve it.
            pivot.transform.rotation = Quat::from_rotation_z(rotation.z);
        } else {
            mesh.transform.rotation = euler(rotation);
            mesh.base_rotation = rotation;
        }
        mesh.base_y = mesh_offset.y;

        pivot.children.push(mesh);
        return pivot;
    }

    if let Some(position) = node.position {
        mesh.transform.translation = Vec3::from_array(position);
    }
    mesh.transform.rotation = euler(rotation);
    mesh.part = part;
    mesh.base_y = node.position.map_or(0.0, |position| position[1]);
    mesh.base_rotation = rotation;
    mesh
}

/// Joint offset from the declared position, and the mesh offset from the joint.
fn joint_offsets(tag: PartTag, scale: Vec3) -> (Vec3, Vec3) {
    let offset = match tag {
        tag if tag.is_arm() || tag.is_leg() => Vec3::Y * (scale.y * 0.5),
        PartTag::WingL => Vec3::X * (scale.x * 0.5),
        PartTag::WingR => Vec3::X * (-scale.x * 0.5),
        PartTag::Tail => Vec3::Z * (scale.y * 0.3),
        _ => Vec3::ZERO,
    };
    (offset, -offset)
}

/// Raw-scale spheres are generated with radius `scale.x` and stretched along
/// y and z to honour a non-uniform scale.
fn sphere_squash(node: &SceneNode, scale: Vec3) -> Vec3 {
    let non_uniform = scale.x != scale.y || scale.y != scale.z;
    if node.shape == protocol::ShapeKind::Sphere && node.raw_scale && non_uniform && scale.x != 0.0 {
        Vec3::new(1.0, scale.y / scale.x, scale.z / scale.x)
    } else {
        Vec3::ONE
    }
}

pub fn parse_color(hex: Option<&str>, fallback: Color) -> Color {
    hex.and_then(|hex| Srgba::hex(hex.trim()).ok())
        .map(Color::from)
        .unwrap_or(fallback)
}

fn material_for(node: &SceneNode) -> MaterialSpec {
    let defaults = MaterialSpec::default();
    MaterialSpec {
        base_color: parse_color(node.color.as_deref(), Color::WHITE),
        emissive: parse_color(node.emissive_color.as_deref(), Color::BLACK),
        emissive_intensity: match node.emissive_color {
            Some(_) => node.emissive_intensity.unwrap_or(EMISSIVE_INTENSITY),
            None => 0.0,
        },
        metallic: node.metalness.unwrap_or(defaults.metallic),
        roughness: node.roughness.unwrap_or(defaults.roughness),
        opacity: node.opacity.unwrap_or(1.0),
        transparent: node.opacity.is_some(),
        double_sided: node.double_sided,
        wireframe: node.wireframe,
    }
}
