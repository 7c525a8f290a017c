use bevy::pbr::wireframe::Wireframe;
use bevy::prelude::*;
use bevy::render::render_resource::Face;

use super::mesh::mesh_for;
use super::node::{MaterialSpec, RenderNode};
use super::part::PartTag;

/// Anatomical metadata carried by tagged nodes, read by the idle animator.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ModelPart {
    pub tag: PartTag,
    pub base_y: f32,
    pub base_rotation: Vec3,
}

/// Mesh entity belonging to a spawned model.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ModelMesh;

/// Spawns `node` and its descendants, returning the root entity. Every mesh
/// gets its own material asset so per-character tints never bleed across
/// models.
pub fn spawn_render_node(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    node: &RenderNode,
) -> Entity {
    let mut entity = commands.spawn((node.transform, Visibility::default()));
    if let Some(tag) = node.part {
        entity.insert(ModelPart {
            tag,
            base_y: node.base_y,
            base_rotation: node.base_rotation,
        });
    }
    if let Some(mesh) = node.mesh() {
        entity.insert((
            ModelMesh,
            Mesh3d(meshes.add(mesh_for(&mesh.geometry))),
            MeshMaterial3d(materials.add(standard_material(&mesh.material))),
        ));
        if mesh.material.wireframe {
            entity.insert(Wireframe);
        }
    }
    let id = entity.id();

    for child in &node.children {
        let child_id = spawn_render_node(commands, meshes, materials, child);
        commands.entity(id).add_child(child_id);
    }
    id
}

pub fn standard_material(spec: &MaterialSpec) -> StandardMaterial {
    StandardMaterial {
        base_color: spec.base_color.with_alpha(spec.opacity),
        emissive: LinearRgba::from(spec.emissive) * spec.emissive_intensity,
        metallic: spec.metallic,
        perceptual_roughness: spec.roughness,
        alpha_mode: if spec.transparent {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        },
        double_sided: spec.double_sided,
        cull_mode: if spec.double_sided {
            None
        } else {
            Some(Face::Back)
        },
        ..default()
    }
}
