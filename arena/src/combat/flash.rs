use bevy::prelude::*;

/// Colours a mesh had before it was flashed.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct FlashSaved {
    pub base_color: Color,
    pub emissive: LinearRgba,
}

pub fn flash_color() -> Color {
    Color::WHITE
}

pub fn flash_emissive() -> LinearRgba {
    Color::srgb_u8(0xff, 0x44, 0x44).to_linear()
}

/// Turns every mesh under `root` into the hit flash, remembering the original
/// colours on the mesh entity. Meshes already flashed are left alone so the
/// saved colours stay the originals.
pub fn flash_model(
    commands: &mut Commands,
    root: Entity,
    children: &Query<&Children>,
    meshes: &Query<(&MeshMaterial3d<StandardMaterial>, Option<&FlashSaved>)>,
    materials: &mut Assets<StandardMaterial>,
) {
    for entity in std::iter::once(root).chain(children.iter_descendants(root)) {
        let Ok((handle, saved)) = meshes.get(entity) else {
            continue;
        };
        if saved.is_some() {
            continue;
        }
        let Some(material) = materials.get_mut(&handle.0) else {
            continue;
        };
        commands.entity(entity).insert(FlashSaved {
            base_color: material.base_color,
            emissive: material.emissive,
        });
        let alpha = material.base_color.alpha();
        material.base_color = flash_color().with_alpha(alpha);
        material.emissive = flash_emissive();
    }
}

/// Puts the saved colours back on every flashed mesh under `root`.
pub fn restore_model(
    commands: &mut Commands,
    root: Entity,
    children: &Query<&Children>,
    meshes: &Query<(&MeshMaterial3d<StandardMaterial>, Option<&FlashSaved>)>,
    materials: &mut Assets<StandardMaterial>,
) {
    for entity in std::iter::once(root).chain(children.iter_descendants(root)) {
        let Ok((handle, Some(saved))) = meshes.get(entity) else {
            continue;
        };
        if let Some(material) = materials.get_mut(&handle.0) {
            material.base_color = saved.base_color;
            material.emissive = saved.emissive;
        }
        commands.entity(entity).remove::<FlashSaved>();
    }
}
