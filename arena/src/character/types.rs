use bevy::prelude::*;
use protocol::CharacterDefinition;

/// Marker for the root entity of a spawned character model.
#[derive(Component, Debug, Default)]
pub struct CharacterRoot;

/// The definition a character was built from; kept so it can be rebuilt
/// (failed fusions clone their first pick).
#[derive(Component, Debug, Clone)]
pub struct Creature {
    pub definition: CharacterDefinition,
}

impl Creature {
    pub fn name(&self) -> &str {
        &self.definition.stats.name
    }
}

/// Height of the root after ground adjustment.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct RestHeight(pub f32);

/// Character that lives on the field between battles.
#[derive(Component, Debug, Default)]
pub struct FieldCharacter;

/// Bobs the root vertically around `base_y`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Floating {
    pub base_y: f32,
    pub amplitude: f32,
}
