use bevy::prelude::*;
use protocol::CharacterDefinition;
use rand::Rng;

use super::types::{CharacterRoot, Creature, RestHeight};
use crate::model::{self, CompiledModel, spawn_render_node};

/// Golden angle in degrees, used to spread new characters around the field.
pub const GOLDEN_ANGLE_DEG: f32 = 137.5;

pub struct CharacterFactory;

impl CharacterFactory {
    /// Compiles the character's scene graph, logging what the cleanup passes did.
    pub fn compile(definition: &CharacterDefinition) -> CompiledModel {
        let compiled = model::compile(&definition.model);
        info!(
            "Compiled '{}': {} nodes, {} meshes, {} floating parts pruned",
            definition.stats.name,
            compiled.root.node_count(),
            compiled.root.mesh_count(),
            compiled.pruned
        );
        compiled
    }

    /// Spawns a compiled character. The root keeps the ground-adjusted height
    /// and is moved horizontally by `offset`.
    pub fn spawn(
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
        definition: &CharacterDefinition,
        compiled: &CompiledModel,
        offset: Vec2,
    ) -> Entity {
        let root = spawn_render_node(commands, meshes, materials, &compiled.root);
        let mut transform = compiled.root.transform;
        transform.translation.x += offset.x;
        transform.translation.z += offset.y;

        commands.entity(root).insert((
            Name::new(definition.stats.name.clone()),
            transform,
            CharacterRoot,
            Creature {
                definition: definition.clone(),
            },
            RestHeight(compiled.base_y()),
        ));
        root
    }
}

/// Horizontal slot of the `index`-th character on a golden-angle spiral,
/// jittered by up to one unit on each axis.
pub fn spiral_slot<R: Rng + ?Sized>(index: usize, rng: &mut R) -> Vec2 {
    let angle = (index as f32 * GOLDEN_ANGLE_DEG).to_radians();
    let radius = 2.0 + (index / 6) as f32 * 2.5;
    Vec2::new(
        angle.cos() * radius + rng.gen_range(-1.0..1.0),
        angle.sin() * radius + rng.gen_range(-1.0..1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn spiral_rings_grow_every_six_characters() {
        let mut rng = StdRng::seed_from_u64(5);
        for index in 0..18 {
            let slot = spiral_slot(index, &mut rng);
            let ring = 2.0 + (index / 6) as f32 * 2.5;
            let distance = slot.length();
            assert!(distance >= ring - 1.5 && distance <= ring + 1.5, "{index}: {distance}");
        }
    }
}
